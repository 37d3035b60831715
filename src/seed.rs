//! Demo catalogue: four houses in Riace, a handful of bookings around
//! November/December 2024, two holidays and one manager account.

use chrono::{DateTime, NaiveDate, Utc};
use tracing::info;

use crate::engine::{Engine, EngineError};
use crate::model::*;
use crate::store::{Collection, Expected, save_typed};

pub const MANAGER_EMAIL: &str = "gestore@cittafutura.it";
pub const MANAGER_PASSWORD: &str = "Gestore123";

fn date(y: i32, m: u32, d: u32) -> CalendarDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default()
}

fn seeded_at() -> DateTime<Utc> {
    date(2024, 9, 26).and_hms_opt(0, 0, 0).unwrap_or_default().and_utc()
}

fn images(seed: &str, n: usize) -> Vec<String> {
    (1..=n)
        .map(|i| format!("https://picsum.photos/seed/{seed}{i}/800/600"))
        .collect()
}

#[allow(clippy::too_many_arguments)]
fn house(
    id: &str,
    title: &str,
    summary: &str,
    capacity: u32,
    bedrooms: u32,
    bathrooms: u32,
    amenities: &[Amenity],
    image_seed: &str,
    image_count: usize,
    (lat, lng): (f64, f64),
    address: &str,
) -> House {
    House {
        id: id.into(),
        title: title.into(),
        summary: summary.into(),
        description: summary.into(),
        capacity,
        bedrooms,
        bathrooms,
        amenities: amenities.to_vec(),
        images: images(image_seed, image_count),
        location: Location {
            lat,
            lng,
            address: address.into(),
        },
        active: true,
        updated_at: seeded_at(),
    }
}

#[rustfmt::skip]
pub fn demo_houses() -> Vec<House> {
    use Amenity::*;
    vec![
        house(
            "casa-ulivo",
            "Casa dell'Ulivo",
            "Stone house in the old village with a shaded patio, good for families.",
            4, 2, 1,
            &[Cucina, WiFi, AriaCondizionata],
            "ulivo", 3,
            (38.4183, 16.4833),
            "Via Garibaldi, Riace (RC)",
        ),
        house(
            "la-terrazza-sul-mare",
            "La Terrazza sul Mare",
            "Bright flat with a large terrace facing the Ionian coast.",
            5, 2, 2,
            &[Cucina, WiFi, AriaCondizionata, VistaMare, Accessibile],
            "mare", 3,
            (38.4195, 16.4850),
            "Vico Ionio, Riace (RC)",
        ),
        house(
            "il-rifugio-del-poeta",
            "Il Rifugio del Poeta",
            "Small studio in a former workshop, for couples or solo travellers.",
            2, 1, 1,
            &[Cucina, WiFi, Parcheggio],
            "poeta", 2,
            (38.4179, 16.4821),
            "Piazza dei Sogni, Riace (RC)",
        ),
        house(
            "la-casa-grande",
            "La Casa Grande",
            "Large house with a shared garden, for groups and residential workshops.",
            8, 4, 3,
            &[Cucina, WiFi, Parcheggio, Accessibile],
            "grande", 4,
            (38.4200, 16.4800),
            "Via della Comunità, Riace (RC)",
        ),
    ]
}

fn title_of(houses: &[House], id: &str) -> String {
    houses
        .iter()
        .find(|h| h.id == id)
        .map(|h| h.title.clone())
        .unwrap_or_default()
}

#[rustfmt::skip]
pub fn demo_bookings() -> Vec<Booking> {
    let houses = demo_houses();
    let rows: [(&str, &str, CalendarDate, CalendarDate, u32, &str, &str, &str, BookingStatus); 7] = [
        ("b1", "casa-ulivo", date(2024, 11, 10), date(2024, 11, 15), 2, "Maria Bianchi", "maria@example.com", "", BookingStatus::Approved),
        ("b2", "casa-ulivo", date(2024, 11, 25), date(2024, 11, 28), 4, "Famiglia Verdi", "verdi@example.com", "Two small children.", BookingStatus::Approved),
        ("b3", "la-terrazza-sul-mare", date(2024, 12, 1), date(2024, 12, 8), 3, "Luca Rossi", "luca@example.com", "", BookingStatus::Approved),
        ("b4", "il-rifugio-del-poeta", date(2024, 11, 18), date(2024, 11, 22), 1, "Giulia Neri", "giulia@example.com", "Writing retreat.", BookingStatus::Approved),
        ("b5", "la-casa-grande", date(2024, 12, 10), date(2024, 12, 15), 6, "Gruppo Amici", "amici@example.com", "University students.", BookingStatus::Pending),
        ("b6", "la-terrazza-sul-mare", date(2024, 12, 20), date(2024, 12, 27), 2, "Marco Gialli", "marco@example.com", "Christmas stay.", BookingStatus::Pending),
        ("b7", "casa-ulivo", date(2025, 2, 1), date(2025, 2, 3), 2, "Anna Blu", "anna@example.com", "", BookingStatus::Denied),
    ];
    rows.into_iter()
        .enumerate()
        .map(|(i, (id, house_id, from, to, guests, name, email, notes, status))| Booking {
            id: id.into(),
            house_id: house_id.into(),
            house_title: title_of(&houses, house_id),
            range: DateRange::new(from, to),
            guests,
            requester: Requester {
                name: name.into(),
                email: email.into(),
                user_id: Some(format!("guest-{}", i + 1)),
            },
            notes: notes.into(),
            status,
        })
        .collect()
}

pub fn demo_holidays() -> Vec<Holiday> {
    vec![
        Holiday {
            id: "h1".into(),
            house_id: "casa-ulivo".into(),
            range: DateRange::new(date(2024, 12, 24), date(2024, 12, 26)),
        },
        Holiday {
            id: "h2".into(),
            house_id: "la-terrazza-sul-mare".into(),
            range: DateRange::new(date(2025, 1, 1), date(2025, 1, 1)),
        },
    ]
}

/// Write the demo catalogue into any collection that was never saved.
/// Returns the collections that were filled.
pub async fn seed_if_empty(engine: &Engine) -> Result<Vec<Collection>, EngineError> {
    let store = engine.store();
    let mut seeded = Vec::new();

    for collection in Collection::ALL {
        if store.load(collection).await?.version.is_some() {
            continue;
        }
        let expected = Expected::Matches(None);
        match collection {
            Collection::Houses => {
                save_typed(store, collection, &demo_houses(), expected).await?;
            }
            Collection::Bookings => {
                save_typed(store, collection, &demo_bookings(), expected).await?;
            }
            Collection::Holidays => {
                save_typed(store, collection, &demo_holidays(), expected).await?;
            }
            Collection::Users => {
                engine
                    .insert_user("Gestore", MANAGER_EMAIL, MANAGER_PASSWORD, Role::Manager)
                    .await?;
            }
        }
        info!("seeded {collection}");
        seeded.push(collection);
    }
    Ok(seeded)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bookings_point_at_known_houses() {
        let houses = demo_houses();
        for b in demo_bookings() {
            assert!(houses.iter().any(|h| h.id == b.house_id), "{}", b.id);
            assert!(!b.house_title.is_empty());
            assert!(b.range.from < b.range.to);
        }
    }

    #[test]
    fn house_ids_are_slugs_of_titles_or_unique() {
        let houses = demo_houses();
        let mut ids: Vec<_> = houses.iter().map(|h| h.id.as_str()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), houses.len());
        assert_eq!(slugify(&houses[3].title), houses[3].id);
    }

    #[test]
    fn seeded_timestamp() {
        assert_eq!(seeded_at().to_rfc3339(), "2024-09-26T00:00:00+00:00");
    }
}
