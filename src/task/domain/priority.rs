//! Task priority levels.

use super::TaskDomainError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Priority level in the closed range `1..=5`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub struct Priority(u8);

impl Priority {
    /// Lowest priority.
    pub const LOW: Self = Self(1);
    /// Between low and normal.
    pub const BELOW_NORMAL: Self = Self(2);
    /// Default priority for new tasks.
    pub const NORMAL: Self = Self(3);
    /// First level counted as high priority.
    pub const HIGH: Self = Self(4);
    /// Highest priority.
    pub const CRITICAL: Self = Self(5);

    /// Creates a validated priority.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::PriorityOutOfRange`] for values outside
    /// `1..=5`.
    pub const fn new(value: i32) -> Result<Self, TaskDomainError> {
        match value {
            1 => Ok(Self::LOW),
            2 => Ok(Self::BELOW_NORMAL),
            3 => Ok(Self::NORMAL),
            4 => Ok(Self::HIGH),
            5 => Ok(Self::CRITICAL),
            _ => Err(TaskDomainError::PriorityOutOfRange(value)),
        }
    }

    /// Returns the numeric level.
    #[must_use]
    pub const fn value(self) -> u8 {
        self.0
    }

    /// Returns `true` for high and critical priorities.
    #[must_use]
    pub const fn is_high(self) -> bool {
        self.0 >= Self::HIGH.0
    }
}

impl Default for Priority {
    fn default() -> Self {
        Self::NORMAL
    }
}

impl TryFrom<i32> for Priority {
    type Error = TaskDomainError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Priority> for i32 {
    fn from(priority: Priority) -> Self {
        Self::from(priority.0)
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
