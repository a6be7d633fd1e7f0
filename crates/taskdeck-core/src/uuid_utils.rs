//! UUID helpers.
//!
//! Records use UUIDv7 so ids sort by creation time, which gives the
//! project listing a stable tiebreak when two rows share a timestamp.

use uuid::Uuid;

use crate::error::{Error, Result};

/// Generate a new UUIDv7 identifier.
#[inline]
pub fn new_v7() -> Uuid {
    Uuid::now_v7()
}

/// Parse a caller-supplied identifier, reporting `kind` on failure.
///
/// ```
/// use taskdeck_core::uuid_utils::parse_id;
///
/// assert!(parse_id("project", "not-a-uuid").is_err());
/// ```
pub fn parse_id(kind: &'static str, raw: &str) -> Result<Uuid> {
    Uuid::parse_str(raw.trim()).map_err(|_| Error::InvalidId {
        kind,
        value: raw.to_string(),
    })
}
