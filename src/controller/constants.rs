//! Constants exposed as part of the controller's contract surface.

/// Minimum wait between commit and reveal (1 hour)
pub const MIN_COMMITMENT_AGE: u64 = 60 * 60;

/// A commitment older than this can no longer be revealed (48 hours)
pub const MAX_COMMITMENT_AGE: u64 = 48 * 60 * 60;

/// Shortest registration period accepted (28 days)
pub const MIN_REGISTRATION_DURATION: u64 = 28 * 24 * 60 * 60;

/// Names must be strictly longer than this many characters
pub const MIN_NAME_LENGTH: usize = 6;
