use std::collections::BTreeSet;

use crate::limits::MAX_RANGE_DAYS;
use crate::model::*;
use crate::observability::OCCUPANCY_BUILDS_TOTAL;

// ── Availability Index ────────────────────────────────────────────

/// Expand inclusive ranges into the set of days they cover.
///
/// Order does not matter and overlapping ranges collapse. A range with
/// `from > to` contributes nothing.
pub fn build<'a>(ranges: impl IntoIterator<Item = &'a DateRange>) -> BTreeSet<CalendarDate> {
    let mut days = BTreeSet::new();
    for range in ranges {
        if range.len_days() > MAX_RANGE_DAYS {
            tracing::debug!("expanding long range {range} ({} days)", range.len_days());
        }
        days.extend(range.days());
    }
    days
}

/// The days of one house that cannot be booked, tagged with that house.
///
/// Pure function of the approved bookings and holidays it was built from:
/// rebuild it whenever those are reloaded, never patch it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OccupancySet {
    house_id: HouseId,
    booked: BTreeSet<CalendarDate>,
    holidays: BTreeSet<CalendarDate>,
}

impl OccupancySet {
    /// `bookings` must already be filtered to approved bookings of this house.
    pub fn build(house_id: impl Into<HouseId>, bookings: &[Booking], holidays: &[Holiday]) -> Self {
        metrics::counter!(OCCUPANCY_BUILDS_TOTAL).increment(1);
        Self {
            house_id: house_id.into(),
            booked: build(bookings.iter().map(|b| &b.range)),
            holidays: build(holidays.iter().map(|h| &h.range)),
        }
    }

    pub fn from_ranges(house_id: impl Into<HouseId>, booked: &[DateRange], holidays: &[DateRange]) -> Self {
        metrics::counter!(OCCUPANCY_BUILDS_TOTAL).increment(1);
        Self {
            house_id: house_id.into(),
            booked: build(booked),
            holidays: build(holidays),
        }
    }

    pub fn house_id(&self) -> &str {
        &self.house_id
    }

    pub fn is_booked(&self, day: CalendarDate) -> bool {
        self.booked.contains(&day)
    }

    pub fn is_holiday(&self, day: CalendarDate) -> bool {
        self.holidays.contains(&day)
    }

    pub fn contains(&self, day: CalendarDate) -> bool {
        self.is_booked(day) || self.is_holiday(day)
    }

    /// Not occupied and not before `today`.
    pub fn is_available(&self, day: CalendarDate, today: CalendarDate) -> bool {
        day >= today && !self.contains(day)
    }

    /// All occupied days, ascending, without duplicates.
    pub fn days(&self) -> impl Iterator<Item = &CalendarDate> {
        self.booked.union(&self.holidays)
    }

    pub fn len(&self) -> usize {
        self.days().count()
    }

    pub fn is_empty(&self) -> bool {
        self.booked.is_empty() && self.holidays.is_empty()
    }

    /// First occupied day inside `range`, if any.
    pub fn first_occupied_in(&self, range: &DateRange) -> Option<CalendarDate> {
        if range.is_empty() {
            return None;
        }
        let booked = self.booked.range(range.from..=range.to).next();
        let holiday = self.holidays.range(range.from..=range.to).next();
        match (booked, holiday) {
            (Some(a), Some(b)) => Some(*a.min(b)),
            (Some(d), None) | (None, Some(d)) => Some(*d),
            (None, None) => None,
        }
    }
}

/// What a calendar knows about one house: still fetching, or a built set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Availability {
    Loading { house_id: HouseId },
    Ready(OccupancySet),
}

impl Availability {
    pub fn loading(house_id: impl Into<HouseId>) -> Self {
        Availability::Loading {
            house_id: house_id.into(),
        }
    }

    pub fn house_id(&self) -> &str {
        match self {
            Availability::Loading { house_id } => house_id,
            Availability::Ready(set) => set.house_id(),
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Availability::Loading { .. })
    }

    pub fn occupancy(&self) -> Option<&OccupancySet> {
        match self {
            Availability::Loading { .. } => None,
            Availability::Ready(set) => Some(set),
        }
    }

    /// Install a freshly built set. A set built for another house is stale
    /// (the caller moved on while it was fetching) and is dropped.
    pub fn apply(&mut self, set: OccupancySet) -> bool {
        if set.house_id() != self.house_id() {
            tracing::debug!(
                "discarding stale occupancy for {} (showing {})",
                set.house_id(),
                self.house_id()
            );
            return false;
        }
        *self = Availability::Ready(set);
        true
    }

    /// Every day is unavailable while loading.
    pub fn is_available(&self, day: CalendarDate, today: CalendarDate) -> bool {
        match self {
            Availability::Loading { .. } => false,
            Availability::Ready(set) => set.is_available(day, today),
        }
    }
}
