//! Availability value object for the on-device model capability

use serde::{Deserialize, Serialize};

/// Result of probing whether the on-device model is usable (Value Object)
///
/// `Unsupported` means the host capability is absent entirely (no runtime
/// installed), while `Unavailable` means the runtime exists but reports the
/// model as not usable. Both disable the chat; the distinction only affects
/// the notice shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Availability {
    Available,
    Unavailable,
    Unsupported,
}

impl Availability {
    /// Get the string identifier for this availability state
    pub fn as_str(&self) -> &'static str {
        match self {
            Availability::Available => "available",
            Availability::Unavailable => "unavailable",
            Availability::Unsupported => "unsupported",
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, Availability::Available)
    }
}

impl std::fmt::Display for Availability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Availability {
    type Err = std::convert::Infallible;

    /// Unknown strings fail closed to `Unavailable`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "available" => Availability::Available,
            "unsupported" => Availability::Unsupported,
            _ => Availability::Unavailable,
        })
    }
}
