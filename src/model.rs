use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Year/month/day with no time-of-day and no offset. The only date type.
pub type CalendarDate = NaiveDate;

pub type HouseId = String;

/// Boundary format for calendar days.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

pub fn parse_date(s: &str) -> chrono::ParseResult<CalendarDate> {
    NaiveDate::parse_from_str(s.trim(), DATE_FORMAT)
}

pub fn format_date(day: CalendarDate) -> String {
    day.format(DATE_FORMAT).to_string()
}

/// Inclusive interval `[from, to]` of calendar days.
///
/// `from > to` is representable and means "no days": expanding such a range
/// yields nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateRange {
    pub from: CalendarDate,
    pub to: CalendarDate,
}

impl DateRange {
    pub fn new(from: CalendarDate, to: CalendarDate) -> Self {
        Self { from, to }
    }

    pub fn is_empty(&self) -> bool {
        self.from > self.to
    }

    /// Every day from `from` to `to`, both included.
    pub fn days(&self) -> impl Iterator<Item = CalendarDate> + use<> {
        let to = self.to;
        std::iter::successors(Some(self.from), |d| d.succ_opt()).take_while(move |d| *d <= to)
    }

    /// Number of days covered (0 for an empty range).
    pub fn len_days(&self) -> usize {
        if self.is_empty() {
            0
        } else {
            (self.to - self.from).num_days() as usize + 1
        }
    }

    /// Nights between check-in and check-out.
    pub fn nights(&self) -> i64 {
        (self.to - self.from).num_days().max(0)
    }

    pub fn contains(&self, day: CalendarDate) -> bool {
        self.from <= day && day <= self.to
    }

    /// Inclusive overlap: sharing a single day counts.
    pub fn overlaps(&self, other: &DateRange) -> bool {
        !self.is_empty() && !other.is_empty() && self.from <= other.to && other.from <= self.to
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", format_date(self.from), format_date(self.to))
    }
}

// ── Bookings & holidays ──────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Pending,
    Approved,
    Denied,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Approved => "approved",
            BookingStatus::Denied => "denied",
        }
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Requester {
    pub name: String,
    pub email: String,
    pub user_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: String,
    pub house_id: HouseId,
    pub house_title: String,
    #[serde(flatten)]
    pub range: DateRange,
    pub guests: u32,
    pub requester: Requester,
    #[serde(default)]
    pub notes: String,
    pub status: BookingStatus,
}

impl Booking {
    pub fn is_approved(&self) -> bool {
        self.status == BookingStatus::Approved
    }
}

/// A blocked range set by the manager. Always occupies its days.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Holiday {
    pub id: String,
    pub house_id: HouseId,
    #[serde(flatten)]
    pub range: DateRange,
}

/// What a guest submits alongside the selected dates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingRequest {
    pub house_id: HouseId,
    pub guests: u32,
    pub requester: Requester,
    pub notes: String,
}

// ── Listings ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Amenity {
    Cucina,
    WiFi,
    Accessibile,
    AriaCondizionata,
    Parcheggio,
    VistaMare,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub lat: f64,
    pub lng: f64,
    pub address: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct House {
    pub id: HouseId,
    pub title: String,
    pub summary: String,
    pub description: String,
    pub capacity: u32,
    pub bedrooms: u32,
    pub bathrooms: u32,
    pub amenities: Vec<Amenity>,
    pub images: Vec<String>,
    pub location: Location,
    pub active: bool,
    pub updated_at: DateTime<Utc>,
}

/// A listing before it has an id.
#[derive(Debug, Clone, PartialEq)]
pub struct HouseDraft {
    pub title: String,
    pub summary: String,
    pub description: String,
    pub capacity: u32,
    pub bedrooms: u32,
    pub bathrooms: u32,
    pub amenities: Vec<Amenity>,
    pub images: Vec<String>,
    pub location: Location,
    pub active: bool,
}

impl HouseDraft {
    pub fn into_house(self, id: HouseId, updated_at: DateTime<Utc>) -> House {
        House {
            id,
            title: self.title,
            summary: self.summary,
            description: self.description,
            capacity: self.capacity,
            bedrooms: self.bedrooms,
            bathrooms: self.bathrooms,
            amenities: self.amenities,
            images: self.images,
            location: self.location,
            active: self.active,
            updated_at,
        }
    }
}

/// Listing id derived from its title: lowercase, whitespace runs become `-`.
pub fn slugify(title: &str) -> String {
    title
        .split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("-")
}

// ── Users ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Guest,
    Manager,
}

/// Stored user record. `password_hash` never leaves the store layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
}

impl From<&User> for UserProfile {
    fn from(u: &User) -> Self {
        Self {
            id: u.id.clone(),
            name: u.name.clone(),
            email: u.email.clone(),
            role: u.role,
        }
    }
}

// ── Change events ────────────────────────────────────────────────

/// Per-house change notifications. Calendars rebuild their occupancy on these.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    BookingRequested {
        id: String,
        house_id: HouseId,
        range: DateRange,
    },
    BookingStatusChanged {
        id: String,
        house_id: HouseId,
        status: BookingStatus,
    },
    HolidayAdded {
        id: String,
        house_id: HouseId,
        range: DateRange,
    },
    HolidayRemoved {
        id: String,
        house_id: HouseId,
    },
    HouseUpdated {
        house_id: HouseId,
    },
    HouseDeleted {
        house_id: HouseId,
    },
}

impl Event {
    pub fn house_id(&self) -> &str {
        match self {
            Event::BookingRequested { house_id, .. }
            | Event::BookingStatusChanged { house_id, .. }
            | Event::HolidayAdded { house_id, .. }
            | Event::HolidayRemoved { house_id, .. }
            | Event::HouseUpdated { house_id }
            | Event::HouseDeleted { house_id } => house_id,
        }
    }

    /// True if the event can change which days are occupied.
    pub fn affects_occupancy(&self) -> bool {
        match self {
            Event::BookingStatusChanged { .. }
            | Event::HolidayAdded { .. }
            | Event::HolidayRemoved { .. }
            | Event::HouseDeleted { .. } => true,
            Event::BookingRequested { .. } | Event::HouseUpdated { .. } => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> CalendarDate {
        parse_date(s).unwrap()
    }

    #[test]
    fn range_days_inclusive() {
        let r = DateRange::new(d("2024-11-10"), d("2024-11-15"));
        let days: Vec<_> = r.days().collect();
        assert_eq!(days.len(), 6);
        assert_eq!(days[0], d("2024-11-10"));
        assert_eq!(days[5], d("2024-11-15"));
        assert_eq!(r.len_days(), 6);
        assert_eq!(r.nights(), 5);
    }

    #[test]
    fn inverted_range_is_empty() {
        let r = DateRange::new(d("2024-11-15"), d("2024-11-10"));
        assert!(r.is_empty());
        assert_eq!(r.days().count(), 0);
        assert_eq!(r.len_days(), 0);
        assert_eq!(r.nights(), 0);
    }

    #[test]
    fn range_crosses_month_and_year() {
        let r = DateRange::new(d("2024-12-30"), d("2025-01-02"));
        let days: Vec<_> = r.days().map(format_date).collect();
        assert_eq!(days, vec!["2024-12-30", "2024-12-31", "2025-01-01", "2025-01-02"]);
    }

    #[test]
    fn overlap_is_inclusive() {
        let a = DateRange::new(d("2024-11-10"), d("2024-11-15"));
        let b = DateRange::new(d("2024-11-15"), d("2024-11-20"));
        let c = DateRange::new(d("2024-11-16"), d("2024-11-20"));
        assert!(a.overlaps(&b));
        assert!(!a.overlaps(&c));
        assert!(a.contains(d("2024-11-15")));
        assert!(!a.contains(d("2024-11-16")));
    }

    #[test]
    fn parse_rejects_time_component() {
        assert!(parse_date("2024-11-10T00:00:00").is_err());
        assert!(parse_date("10/11/2024").is_err());
        assert_eq!(format_date(d(" 2024-02-29 ")), "2024-02-29");
    }

    #[test]
    fn booking_json_shape() {
        let json = r#"{
            "id": "b1", "houseId": "casa-ulivo", "houseTitle": "Casa dell'Ulivo",
            "from": "2024-11-10", "to": "2024-11-15", "guests": 2,
            "requester": { "name": "Maria", "email": "maria@example.com", "userId": null },
            "notes": "", "status": "approved"
        }"#;
        let b: Booking = serde_json::from_str(json).unwrap();
        assert_eq!(b.range, DateRange::new(d("2024-11-10"), d("2024-11-15")));
        assert!(b.is_approved());

        let back = serde_json::to_value(&b).unwrap();
        assert_eq!(back["from"], "2024-11-10");
        assert_eq!(back["houseId"], "casa-ulivo");
        assert_eq!(back["requester"]["userId"], serde_json::Value::Null);
    }

    #[test]
    fn amenity_names() {
        let json = serde_json::to_string(&[Amenity::WiFi, Amenity::AriaCondizionata, Amenity::VistaMare]).unwrap();
        assert_eq!(json, r#"["wi-fi","aria-condizionata","vista-mare"]"#);
    }

    #[test]
    fn slug_from_title() {
        assert_eq!(slugify("La Casa  Grande"), "la-casa-grande");
        assert_eq!(slugify("   "), "");
    }

    #[test]
    fn event_house_and_occupancy_flag() {
        let e = Event::HolidayRemoved { id: "h1".into(), house_id: "casa".into() };
        assert_eq!(e.house_id(), "casa");
        assert!(e.affects_occupancy());
        assert!(!Event::HouseUpdated { house_id: "casa".into() }.affects_occupancy());
    }
}
