use std::cmp::Reverse;

use crate::model::*;
use crate::store::Collection;

use super::availability::OccupancySet;
use super::{Engine, EngineError};

/// All bookings split by status, each list newest check-in first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookingsByStatus {
    pub pending: Vec<Booking>,
    pub approved: Vec<Booking>,
    pub denied: Vec<Booking>,
}

impl Engine {
    // ── Listings ─────────────────────────────────────────────

    /// Active listings only.
    pub async fn houses(&self) -> Result<Vec<House>, EngineError> {
        let mut houses = self.all_houses().await?;
        houses.retain(|h| h.active);
        Ok(houses)
    }

    pub async fn all_houses(&self) -> Result<Vec<House>, EngineError> {
        self.load_all(Collection::Houses).await
    }

    pub async fn house(&self, id: &str) -> Result<Option<House>, EngineError> {
        let houses: Vec<House> = self.load_all(Collection::Houses).await?;
        Ok(houses.into_iter().find(|h| h.id == id))
    }

    // ── Occupancy inputs ─────────────────────────────────────

    pub async fn fetch_approved_bookings(&self, house_id: &str) -> Result<Vec<Booking>, EngineError> {
        let mut bookings: Vec<Booking> = self.load_all(Collection::Bookings).await?;
        bookings.retain(|b| b.house_id == house_id && b.is_approved());
        Ok(bookings)
    }

    pub async fn fetch_holidays(&self, house_id: &str) -> Result<Vec<Holiday>, EngineError> {
        let mut holidays: Vec<Holiday> = self.load_all(Collection::Holidays).await?;
        holidays.retain(|h| h.house_id == house_id);
        Ok(holidays)
    }

    /// Fetch both inputs concurrently, then build. The set is tagged with
    /// `house_id` so a caller that has moved on can discard it.
    pub async fn load_availability(&self, house_id: &str) -> Result<OccupancySet, EngineError> {
        let (bookings, holidays) = tokio::try_join!(
            self.fetch_approved_bookings(house_id),
            self.fetch_holidays(house_id),
        )?;
        Ok(OccupancySet::build(house_id, &bookings, &holidays))
    }

    // ── Manager views ────────────────────────────────────────

    /// Every booking, latest check-in first.
    pub async fn all_bookings(&self) -> Result<Vec<Booking>, EngineError> {
        let mut bookings: Vec<Booking> = self.load_all(Collection::Bookings).await?;
        bookings.sort_by_key(|b| Reverse(b.range.from));
        Ok(bookings)
    }

    pub async fn booking(&self, id: &str) -> Result<Option<Booking>, EngineError> {
        let bookings: Vec<Booking> = self.load_all(Collection::Bookings).await?;
        Ok(bookings.into_iter().find(|b| b.id == id))
    }

    pub async fn bookings_by_status(&self) -> Result<BookingsByStatus, EngineError> {
        let mut grouped = BookingsByStatus::default();
        for b in self.all_bookings().await? {
            match b.status {
                BookingStatus::Pending => grouped.pending.push(b),
                BookingStatus::Approved => grouped.approved.push(b),
                BookingStatus::Denied => grouped.denied.push(b),
            }
        }
        Ok(grouped)
    }

    pub async fn all_holidays(&self) -> Result<Vec<Holiday>, EngineError> {
        self.load_all(Collection::Holidays).await
    }
}
