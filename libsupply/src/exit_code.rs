//! Exit code constants for the supply phase.

pub(crate) const GENERIC_SUCCESS: i32 = 0;
pub(crate) const GENERIC_UNSPECIFIED_ERROR: i32 = 1;
