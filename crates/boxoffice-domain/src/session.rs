//! Event-session states as seen by the reservation service.

use serde::{Deserialize, Serialize};

/// Sales state of an event session. Owned by the catalog service; this
/// service only reads it to decide whether seats are reservable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Draft,
    OnSale,
    Closed,
}

impl SessionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::OnSale => "on_sale",
            Self::Closed => "closed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "draft" => Some(Self::Draft),
            "on_sale" => Some(Self::OnSale),
            "closed" => Some(Self::Closed),
            _ => None,
        }
    }

    pub fn is_reservable(self) -> bool {
        matches!(self, Self::OnSale)
    }
}
