//! Security-system state as stored in the hub's `SecuritySystem` variable.

use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;

/// Name of the hub variable holding the security state.
pub const SECURITY_VARIABLE: &str = "SecuritySystem";

/// Name of the synthesized security accessory.
pub const SECURITY_ACCESSORY_NAME: &str = "SecuritySystem";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SecurityState {
    StayArmed,
    AwayArmed,
    NightArmed,
    Disarmed,
    AlarmTriggered,
}

impl SecurityState {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::StayArmed => "StayArmed",
            Self::AwayArmed => "AwayArmed",
            Self::NightArmed => "NightArmed",
            Self::Disarmed => "Disarmed",
            Self::AlarmTriggered => "AlarmTriggered",
        }
    }

    /// Host code for the current-state facet.
    #[must_use]
    pub const fn current_code(self) -> i64 {
        match self {
            Self::StayArmed => 0,
            Self::AwayArmed => 1,
            Self::NightArmed => 2,
            Self::Disarmed => 3,
            Self::AlarmTriggered => 4,
        }
    }

    /// Host code for the target-state facet; a triggered alarm is not a
    /// target.
    #[must_use]
    pub const fn target_code(self) -> Option<i64> {
        match self {
            Self::AlarmTriggered => None,
            other => Some(other.current_code()),
        }
    }

    /// Inverse of [`SecurityState::target_code`].
    #[must_use]
    pub const fn from_target_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(Self::StayArmed),
            1 => Some(Self::AwayArmed),
            2 => Some(Self::NightArmed),
            3 => Some(Self::Disarmed),
            _ => None,
        }
    }

    /// Scene the hub runs to enter this state.
    #[must_use]
    pub fn scene_name(self) -> String {
        format!("Set{}", self.as_str())
    }
}

impl fmt::Display for SecurityState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SecurityState {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        [
            Self::StayArmed,
            Self::AwayArmed,
            Self::NightArmed,
            Self::Disarmed,
            Self::AlarmTriggered,
        ]
        .into_iter()
        .find(|state| state.as_str() == s.trim())
        .ok_or_else(|| ValidationError::UnknownSecurityState(s.to_string()))
    }
}
