use crate::model::*;

use super::EngineError;

/// Local calendar day. Only the binary reads the clock; the engine takes
/// `today` as an argument.
pub fn local_today() -> CalendarDate {
    chrono::Local::now().date_naive()
}

/// Approving `candidate` must not double-book the house: reject if its days
/// touch another approved booking or a holiday of the same house.
pub(crate) fn check_no_conflict(
    candidate: &Booking,
    bookings: &[Booking],
    holidays: &[Holiday],
) -> Result<(), EngineError> {
    let clash = bookings.iter().find(|b| {
        b.id != candidate.id
            && b.house_id == candidate.house_id
            && b.is_approved()
            && b.range.overlaps(&candidate.range)
    });
    if let Some(other) = clash {
        return Err(EngineError::Conflict(other.id.clone()));
    }

    let blocked = holidays
        .iter()
        .find(|h| h.house_id == candidate.house_id && h.range.overlaps(&candidate.range));
    if let Some(holiday) = blocked {
        return Err(EngineError::Conflict(holiday.id.clone()));
    }
    Ok(())
}
