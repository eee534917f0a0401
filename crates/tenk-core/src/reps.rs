//! Countdown repetition counter.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Preset targets offered alongside a custom one.
pub const PRESET_TARGETS: [u32; 2] = [5, 20];

/// Counts down from a target to zero, one tap per repetition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepCounter {
    pub target: u32,
    pub remaining: u32,
}

impl Default for RepCounter {
    fn default() -> Self {
        Self::new(PRESET_TARGETS[0])
    }
}

impl RepCounter {
    pub fn new(target: u32) -> Self {
        Self {
            target,
            remaining: target,
        }
    }

    /// Switch to a new target and start over. Zero is rejected.
    pub fn set_target(&mut self, target: u32) -> Result<(), ValidationError> {
        if target == 0 {
            return Err(ValidationError::InvalidValue {
                field: "target".into(),
                message: "must be at least 1".into(),
            });
        }
        *self = Self::new(target);
        Ok(())
    }

    /// One repetition done. Stays at zero once reached.
    pub fn tap(&mut self) -> u32 {
        self.remaining = self.remaining.saturating_sub(1);
        self.remaining
    }

    pub fn reset(&mut self) {
        self.remaining = self.target;
    }

    pub fn is_done(&self) -> bool {
        self.remaining == 0
    }
}
