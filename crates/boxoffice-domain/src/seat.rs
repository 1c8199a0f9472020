//! Seat lifecycle states and the legal-transition table.

use serde::{Deserialize, Serialize};

/// Current state of a purchasable seat within one session.
///
/// Nothing transitions out of `Sold` in normal flow; a sold seat stays sold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeatStatus {
    Available,
    Reserved,
    Sold,
    Blocked,
    Maintenance,
}

impl SeatStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::Reserved => "reserved",
            Self::Sold => "sold",
            Self::Blocked => "blocked",
            Self::Maintenance => "maintenance",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "available" => Some(Self::Available),
            "reserved" => Some(Self::Reserved),
            "sold" => Some(Self::Sold),
            "blocked" => Some(Self::Blocked),
            "maintenance" => Some(Self::Maintenance),
            _ => None,
        }
    }

    /// Whether `self -> to` is a legal transition.
    pub fn can_transition(self, to: SeatStatus) -> bool {
        use SeatStatus::{Available, Blocked, Maintenance, Reserved, Sold};
        matches!(
            (self, to),
            (Available, Reserved)
                | (Reserved, Sold)
                | (Reserved, Available)
                | (Available, Blocked)
                | (Blocked, Available)
                | (Available, Maintenance)
                | (Maintenance, Available)
        )
    }

    /// Validate a transition, returning the target state on success.
    pub fn checked_transition(self, to: SeatStatus) -> Result<SeatStatus, InvalidTransition> {
        if self.can_transition(to) {
            Ok(to)
        } else {
            Err(InvalidTransition { from: self, to })
        }
    }
}

/// A transition not present in the legal-transition table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("illegal seat transition {from:?} -> {to:?}")]
pub struct InvalidTransition {
    pub from: SeatStatus,
    pub to: SeatStatus,
}
