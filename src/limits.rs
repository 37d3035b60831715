/// Longest holiday a manager can add. Stored ranges of any length are still
/// expanded in full when building occupancy.
pub const MAX_RANGE_DAYS: usize = 366;

/// Longest stay a guest may request.
pub const MAX_BOOKING_NIGHTS: i64 = 90;

pub const MAX_GUESTS: u32 = 32;

pub const MAX_NOTES_LEN: usize = 2_000;

pub const MAX_NAME_LEN: usize = 200;

/// Attempts at a read-modify-write of a collection before giving up on a
/// contended version token.
pub const MAX_WRITE_RETRIES: usize = 3;
