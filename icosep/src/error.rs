use crate::entry::{EntryId, Location};
use common::shapes::Vec3;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum IndexError {
    #[error("query radius must be finite and positive (radius: {radius})")]
    InvalidQuery { radius: f32 },

    #[error("entry radius must be finite and non-negative (radius: {radius})")]
    InvalidRadius { radius: f32 },

    #[error("position must be finite (x: {x}, y: {y}, z: {z})")]
    InvalidPosition { x: f32, y: f32, z: f32 },

    #[error("invalid config: {reason}")]
    InvalidConfig { reason: &'static str },

    /// Unknown or already removed entry id.
    #[error("unknown entry {id:?}")]
    UnknownEntry { id: EntryId },

    /// The entry was not found where its backlink says it lives.
    #[error("entry {id:?} is missing from its recorded location {location:?}")]
    InvariantViolation { id: EntryId, location: Location },
}

pub type IndexResult<T> = Result<T, IndexError>;

#[inline(always)]
pub(crate) fn validate_query_radius(radius: f32) -> IndexResult<()> {
    if radius.is_finite() && radius > 0.0 {
        Ok(())
    } else {
        Err(IndexError::InvalidQuery { radius })
    }
}

#[inline(always)]
pub(crate) fn validate_position(position: &Vec3) -> IndexResult<()> {
    if position.iter().all(|v| v.is_finite()) {
        Ok(())
    } else {
        Err(IndexError::InvalidPosition {
            x: position.x,
            y: position.y,
            z: position.z,
        })
    }
}

#[inline(always)]
pub(crate) fn validate_sphere(position: &Vec3, radius: f32) -> IndexResult<()> {
    validate_position(position)?;
    if radius.is_finite() && radius >= 0.0 {
        Ok(())
    } else {
        Err(IndexError::InvalidRadius { radius })
    }
}
