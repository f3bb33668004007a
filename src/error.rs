//! Construction-time failures
//!
//! Expected gameplay outcomes (already hit, already maxed, out of range) are
//! plain enums. Only malformed input that would poison the simulation with
//! NaN ends up here.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    /// A position had a NaN or infinite component
    #[error("non-finite position ({x}, {y}) for {what}")]
    NonFinitePosition { what: &'static str, x: f32, y: f32 },

    /// A scalar input (speed, damage, health) was NaN, infinite or out of range
    #[error("invalid {what}: {value}")]
    NonFiniteValue { what: &'static str, value: f32 },

    /// Tuning values failed validation
    #[error("invalid tuning: {0}")]
    InvalidTuning(String),

    /// Tuning JSON could not be parsed
    #[error("failed to parse tuning: {0}")]
    TuningParse(#[from] serde_json::Error),
}

impl SimError {
    /// Reject positions with NaN/infinite components
    pub fn check_position(what: &'static str, pos: glam::Vec2) -> Result<(), SimError> {
        if crate::is_finite_vec(pos) {
            Ok(())
        } else {
            Err(SimError::NonFinitePosition {
                what,
                x: pos.x,
                y: pos.y,
            })
        }
    }

    /// Reject non-finite or negative scalars
    pub fn check_non_negative(what: &'static str, value: f32) -> Result<(), SimError> {
        if value.is_finite() && value >= 0.0 {
            Ok(())
        } else {
            Err(SimError::NonFiniteValue { what, value })
        }
    }
}
