use crate::model::{CalendarDate, format_date};
use crate::store::StoreError;

#[derive(Debug)]
pub enum EngineError {
    /// A selection without both check-in and check-out.
    MissingDates,
    /// Check-out not after check-in (also: a holiday ending before it starts).
    InvertedRange,
    /// A day of the range became occupied after it was selected.
    RangeNoLongerAvailable(CalendarDate),
    RangeInPast,
    /// Two clicks that would enclose an unavailable day.
    RangeUnavailable(CalendarDate),
    DataFetchFailed(StoreError),
    NotFound(String),
    AlreadyExists(String),
    /// Approving would double-book against this booking or holiday.
    Conflict(String),
    InvalidGuests {
        guests: u32,
        capacity: u32,
    },
    MissingRequester,
    InvalidDate(String),
    InvalidInput(&'static str),
    LimitExceeded(&'static str),
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineError::MissingDates => write!(f, "select both check-in and check-out dates"),
            EngineError::InvertedRange => {
                write!(f, "check-out must be after check-in")
            }
            EngineError::RangeNoLongerAvailable(day) => {
                write!(f, "the selected dates are no longer available ({} is taken)", format_date(*day))
            }
            EngineError::RangeInPast => write!(f, "the selected dates are in the past"),
            EngineError::RangeUnavailable(day) => {
                write!(f, "the range crosses unavailable days ({} cannot be booked)", format_date(*day))
            }
            EngineError::DataFetchFailed(e) => write!(f, "data fetch failed: {e}"),
            EngineError::NotFound(id) => write!(f, "not found: {id}"),
            EngineError::AlreadyExists(id) => write!(f, "already exists: {id}"),
            EngineError::Conflict(id) => write!(f, "conflicts with {id}"),
            EngineError::InvalidGuests { guests, capacity } => {
                write!(f, "{guests} guests requested, house sleeps 1 to {capacity}")
            }
            EngineError::MissingRequester => write!(f, "name and email are required"),
            EngineError::InvalidDate(s) => write!(f, "invalid date {s:?}, expected YYYY-MM-DD"),
            EngineError::InvalidInput(msg) => write!(f, "invalid input: {msg}"),
            EngineError::LimitExceeded(msg) => write!(f, "limit exceeded: {msg}"),
        }
    }
}

impl std::error::Error for EngineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EngineError::DataFetchFailed(e) => Some(e),
            _ => None,
        }
    }
}

impl From<StoreError> for EngineError {
    fn from(e: StoreError) -> Self {
        EngineError::DataFetchFailed(e)
    }
}
