use chrono::Utc;
use tracing::info;
use ulid::Ulid;

use crate::limits::*;
use crate::model::*;
use crate::observability::{BOOKING_STATUS_CHANGES_TOTAL, BOOKINGS_CREATED_TOTAL, BOOKINGS_REJECTED_TOTAL};
use crate::store::Collection;

use super::availability::OccupancySet;
use super::conflict::check_no_conflict;
use super::selector::SelectionState;
use super::validate::{reverify, validate};
use super::{Engine, EngineError, retrying};

fn rejection_reason(e: &EngineError) -> &'static str {
    match e {
        EngineError::MissingDates => "missing_dates",
        EngineError::InvertedRange => "inverted_range",
        EngineError::RangeNoLongerAvailable(_) => "no_longer_available",
        EngineError::RangeInPast => "in_past",
        EngineError::InvalidGuests { .. } => "guests",
        EngineError::MissingRequester => "requester",
        EngineError::NotFound(_) => "house_not_found",
        _ => "other",
    }
}

fn check_request(request: &BookingRequest) -> Result<(), EngineError> {
    let r = &request.requester;
    if r.name.trim().is_empty() || r.email.trim().is_empty() {
        return Err(EngineError::MissingRequester);
    }
    if r.name.len() > MAX_NAME_LEN || r.email.len() > MAX_NAME_LEN {
        return Err(EngineError::LimitExceeded("requester name or email too long"));
    }
    if request.notes.len() > MAX_NOTES_LEN {
        return Err(EngineError::LimitExceeded("notes too long"));
    }
    Ok(())
}

impl Engine {
    // ── Booking requests ─────────────────────────────────────

    /// Submit the guest's selection as a pending booking.
    ///
    /// The selection is validated, then re-checked against the bookings and
    /// holidays as they are now, inside the same write that appends it.
    pub async fn create_booking(
        &self,
        request: BookingRequest,
        selection: &SelectionState,
        today: CalendarDate,
    ) -> Result<Booking, EngineError> {
        let result = self.try_create_booking(request, selection, today).await;
        match &result {
            Ok(b) => {
                metrics::counter!(BOOKINGS_CREATED_TOTAL).increment(1);
                info!("booking {} requested for {} ({})", b.id, b.house_id, b.range);
                self.publish(Event::BookingRequested {
                    id: b.id.clone(),
                    house_id: b.house_id.clone(),
                    range: b.range,
                });
            }
            Err(e) => {
                metrics::counter!(BOOKINGS_REJECTED_TOTAL, "reason" => rejection_reason(e)).increment(1);
                info!("booking request rejected: {e}");
            }
        }
        result
    }

    async fn try_create_booking(
        &self,
        request: BookingRequest,
        selection: &SelectionState,
        today: CalendarDate,
    ) -> Result<Booking, EngineError> {
        let range = validate(selection)?;
        if range.from < today {
            return Err(EngineError::RangeInPast);
        }
        check_request(&request)?;

        let house = self
            .house(&request.house_id)
            .await?
            .ok_or_else(|| EngineError::NotFound(request.house_id.clone()))?;
        let max_guests = house.capacity.min(MAX_GUESTS);
        if request.guests == 0 || request.guests > max_guests {
            return Err(EngineError::InvalidGuests {
                guests: request.guests,
                capacity: max_guests,
            });
        }

        // Holidays live in another collection, so they are re-read on every
        // attempt rather than once up front.
        for attempt in 1..=MAX_WRITE_RETRIES {
            let holidays = self.fetch_holidays(&house.id).await?;
            let appended = self
                .try_update(Collection::Bookings, |bookings: &mut Vec<Booking>| {
                    let approved: Vec<Booking> = bookings
                        .iter()
                        .filter(|b| b.house_id == house.id && b.is_approved())
                        .cloned()
                        .collect();
                    let occupancy = OccupancySet::build(house.id.clone(), &approved, &holidays);
                    reverify(&range, &occupancy)?;

                    let booking = Booking {
                        id: Ulid::new().to_string(),
                        house_id: house.id.clone(),
                        house_title: house.title.clone(),
                        range,
                        guests: request.guests,
                        requester: request.requester.clone(),
                        notes: request.notes.clone(),
                        status: BookingStatus::Pending,
                    };
                    bookings.push(booking.clone());
                    Ok(booking)
                })
                .await?;
            if let Some(booking) = appended {
                return Ok(booking);
            }
            retrying(Collection::Bookings, attempt);
        }
        Err(EngineError::LimitExceeded("too many concurrent writers"))
    }

    // ── Manager decisions ────────────────────────────────────

    /// Approve or deny (or reopen) a booking. Approval is refused if it would
    /// double-book the house.
    pub async fn update_booking_status(&self, id: &str, status: BookingStatus) -> Result<Booking, EngineError> {
        let holidays = self.all_holidays().await?;
        let updated = self
            .update_collection(Collection::Bookings, |bookings: &mut Vec<Booking>| {
                let idx = bookings
                    .iter()
                    .position(|b| b.id == id)
                    .ok_or_else(|| EngineError::NotFound(id.to_string()))?;
                if status == BookingStatus::Approved && !bookings[idx].is_approved() {
                    let all: &[Booking] = bookings;
                    check_no_conflict(&all[idx], all, &holidays)?;
                }
                bookings[idx].status = status;
                Ok(bookings[idx].clone())
            })
            .await?;

        metrics::counter!(BOOKING_STATUS_CHANGES_TOTAL, "status" => status.as_str()).increment(1);
        info!("booking {id} is now {status}");
        self.publish(Event::BookingStatusChanged {
            id: updated.id.clone(),
            house_id: updated.house_id.clone(),
            status,
        });
        Ok(updated)
    }

    // ── Holidays ─────────────────────────────────────────────

    pub async fn add_holiday(&self, house_id: &str, range: DateRange) -> Result<Holiday, EngineError> {
        if range.is_empty() {
            return Err(EngineError::InvertedRange);
        }
        if range.len_days() > MAX_RANGE_DAYS {
            return Err(EngineError::LimitExceeded("holiday too long"));
        }
        if self.house(house_id).await?.is_none() {
            return Err(EngineError::NotFound(house_id.to_string()));
        }

        let holiday = Holiday {
            id: Ulid::new().to_string(),
            house_id: house_id.to_string(),
            range,
        };
        self.update_collection(Collection::Holidays, |holidays: &mut Vec<Holiday>| {
            holidays.push(holiday.clone());
            Ok(())
        })
        .await?;

        info!("holiday {} added to {house_id} ({range})", holiday.id);
        self.publish(Event::HolidayAdded {
            id: holiday.id.clone(),
            house_id: holiday.house_id.clone(),
            range,
        });
        Ok(holiday)
    }

    pub async fn remove_holiday(&self, id: &str) -> Result<Holiday, EngineError> {
        let removed = self
            .update_collection(Collection::Holidays, |holidays: &mut Vec<Holiday>| {
                let idx = holidays
                    .iter()
                    .position(|h| h.id == id)
                    .ok_or_else(|| EngineError::NotFound(id.to_string()))?;
                Ok(holidays.remove(idx))
            })
            .await?;

        info!("holiday {id} removed from {}", removed.house_id);
        self.publish(Event::HolidayRemoved {
            id: removed.id.clone(),
            house_id: removed.house_id.clone(),
        });
        Ok(removed)
    }

    // ── Listings ─────────────────────────────────────────────

    pub async fn create_house(&self, draft: HouseDraft) -> Result<House, EngineError> {
        let id = slugify(&draft.title);
        if id.is_empty() {
            return Err(EngineError::InvalidInput("house title is empty"));
        }
        if draft.capacity == 0 {
            return Err(EngineError::InvalidInput("house capacity must be at least 1"));
        }
        let house = draft.into_house(id, Utc::now());

        self.update_collection(Collection::Houses, |houses: &mut Vec<House>| {
            if houses.iter().any(|h| h.id == house.id) {
                return Err(EngineError::AlreadyExists(house.id.clone()));
            }
            houses.push(house.clone());
            Ok(())
        })
        .await?;

        info!("house {} created", house.id);
        self.publish(Event::HouseUpdated {
            house_id: house.id.clone(),
        });
        Ok(house)
    }

    pub async fn update_house(&self, mut house: House) -> Result<House, EngineError> {
        if house.capacity == 0 {
            return Err(EngineError::InvalidInput("house capacity must be at least 1"));
        }
        house.updated_at = Utc::now();

        self.update_collection(Collection::Houses, |houses: &mut Vec<House>| {
            let slot = houses
                .iter_mut()
                .find(|h| h.id == house.id)
                .ok_or_else(|| EngineError::NotFound(house.id.clone()))?;
            *slot = house.clone();
            Ok(())
        })
        .await?;

        info!("house {} updated", house.id);
        self.publish(Event::HouseUpdated {
            house_id: house.id.clone(),
        });
        Ok(house)
    }

    pub async fn delete_house(&self, id: &str) -> Result<(), EngineError> {
        self.update_collection(Collection::Houses, |houses: &mut Vec<House>| {
            let before = houses.len();
            houses.retain(|h| h.id != id);
            if houses.len() == before {
                return Err(EngineError::NotFound(id.to_string()));
            }
            Ok(())
        })
        .await?;

        info!("house {id} deleted");
        self.publish(Event::HouseDeleted {
            house_id: id.to_string(),
        });
        self.notify.remove(id);
        Ok(())
    }
}
