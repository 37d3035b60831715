use crate::limits::MAX_BOOKING_NIGHTS;
use crate::model::{CalendarDate, DateRange};

use super::availability::{Availability, OccupancySet};
use super::selector::SelectionState;
use super::EngineError;

/// Structural check of a selection before it is submitted.
///
/// Stricter than the selector: a one-day selection (`from == to`) is a valid
/// selection but not a bookable stay, which needs at least one night.
pub fn validate(selection: &SelectionState) -> Result<DateRange, EngineError> {
    validate_endpoints(selection.from(), selection.to())
}

pub fn validate_endpoints(
    from: Option<CalendarDate>,
    to: Option<CalendarDate>,
) -> Result<DateRange, EngineError> {
    let (Some(from), Some(to)) = (from, to) else {
        return Err(EngineError::MissingDates);
    };
    if to <= from {
        return Err(EngineError::InvertedRange);
    }
    let range = DateRange::new(from, to);
    if range.nights() > MAX_BOOKING_NIGHTS {
        return Err(EngineError::LimitExceeded("stay too long"));
    }
    Ok(range)
}

/// Re-check a validated range against a freshly fetched occupancy set, for
/// data that changed between selection and submission.
pub fn reverify(range: &DateRange, occupancy: &OccupancySet) -> Result<(), EngineError> {
    match occupancy.first_occupied_in(range) {
        Some(day) => Err(EngineError::RangeNoLongerAvailable(day)),
        None => Ok(()),
    }
}

/// Why clicking `range.from` then `range.to` left the selection incomplete.
pub fn explain_incomplete(range: &DateRange, availability: &Availability, today: CalendarDate) -> EngineError {
    if range.is_empty() {
        return EngineError::InvertedRange;
    }
    match range.days().find(|day| !availability.is_available(*day, today)) {
        Some(day) => EngineError::RangeUnavailable(day),
        None => EngineError::MissingDates,
    }
}

/// `2024-11-16..2024-11-20 (4 nights)`
pub fn describe_stay(range: &DateRange) -> String {
    match range.nights() {
        1 => format!("{range} (1 night)"),
        n => format!("{range} ({n} nights)"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::parse_date;

    fn d(s: &str) -> CalendarDate {
        parse_date(s).unwrap()
    }

    #[test]
    fn missing_endpoints() {
        assert!(matches!(validate(&SelectionState::Empty), Err(EngineError::MissingDates)));
        assert!(matches!(
            validate(&SelectionState::PartialFrom { from: d("2024-11-16") }),
            Err(EngineError::MissingDates)
        ));
        assert!(matches!(
            validate_endpoints(None, Some(d("2024-11-16"))),
            Err(EngineError::MissingDates)
        ));
    }

    #[test]
    fn same_day_rejected_next_day_accepted() {
        let day = d("2024-11-16");
        let same = SelectionState::Complete { from: day, to: day };
        assert!(matches!(validate(&same), Err(EngineError::InvertedRange)));

        let next = SelectionState::Complete {
            from: day,
            to: day.succ_opt().unwrap(),
        };
        let range = validate(&next).unwrap();
        assert_eq!(range.nights(), 1);
    }

    #[test]
    fn backwards_endpoints_rejected() {
        assert!(matches!(
            validate_endpoints(Some(d("2024-11-20")), Some(d("2024-11-16"))),
            Err(EngineError::InvertedRange)
        ));
    }

    #[test]
    fn overlong_stay_rejected() {
        assert!(matches!(
            validate_endpoints(Some(d("2024-01-01")), Some(d("2024-06-01"))),
            Err(EngineError::LimitExceeded(_))
        ));
    }

    #[test]
    fn reverify_reports_first_taken_day() {
        let occ = OccupancySet::from_ranges(
            "casa",
            &[DateRange::new(d("2024-11-18"), d("2024-11-19"))],
            &[],
        );
        let ok = DateRange::new(d("2024-11-10"), d("2024-11-17"));
        assert!(reverify(&ok, &occ).is_ok());

        let taken = DateRange::new(d("2024-11-16"), d("2024-11-20"));
        match reverify(&taken, &occ) {
            Err(EngineError::RangeNoLongerAvailable(day)) => assert_eq!(day, d("2024-11-18")),
            other => panic!("expected RangeNoLongerAvailable, got {other:?}"),
        }
    }

    #[test]
    fn incomplete_clicks_explained() {
        let today = d("2024-11-01");
        let avail = Availability::Ready(OccupancySet::from_ranges(
            "casa-ulivo",
            &[DateRange::new(d("2024-11-10"), d("2024-11-15"))],
            &[],
        ));

        let across = DateRange::new(d("2024-11-08"), d("2024-11-20"));
        let mut s = SelectionState::Empty;
        for day in [across.from, across.to] {
            s = crate::engine::transition(s, day, &avail, today, true);
        }
        assert!(!s.is_complete());
        match explain_incomplete(&across, &avail, today) {
            EngineError::RangeUnavailable(day) => assert_eq!(day, d("2024-11-10")),
            other => panic!("expected RangeUnavailable, got {other:?}"),
        }

        let backwards = DateRange::new(d("2024-11-20"), d("2024-11-16"));
        assert!(matches!(explain_incomplete(&backwards, &avail, today), EngineError::InvertedRange));

        let past = DateRange::new(d("2024-10-30"), d("2024-11-03"));
        assert!(matches!(
            explain_incomplete(&past, &avail, today),
            EngineError::RangeUnavailable(day) if day == d("2024-10-30")
        ));
    }

    #[test]
    fn stay_description() {
        let r = DateRange::new(d("2024-11-16"), d("2024-11-20"));
        assert_eq!(describe_stay(&r), "2024-11-16..2024-11-20 (4 nights)");
        let one = DateRange::new(d("2024-11-16"), d("2024-11-17"));
        assert_eq!(describe_stay(&one), "2024-11-16..2024-11-17 (1 night)");
    }
}
