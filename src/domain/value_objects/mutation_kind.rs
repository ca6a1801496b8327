use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// The closed set of user actions the engine applies optimistically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MutationKind {
    Like,
    Vote,
    SendMessage,
    AdjustQuantity,
    RemoveItem,
}

impl MutationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MutationKind::Like => "like",
            MutationKind::Vote => "vote",
            MutationKind::SendMessage => "send_message",
            MutationKind::AdjustQuantity => "adjust_quantity",
            MutationKind::RemoveItem => "remove_item",
        }
    }
}

impl fmt::Display for MutationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MutationKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "like" => Ok(MutationKind::Like),
            "vote" => Ok(MutationKind::Vote),
            "send_message" => Ok(MutationKind::SendMessage),
            "adjust_quantity" => Ok(MutationKind::AdjustQuantity),
            "remove_item" => Ok(MutationKind::RemoveItem),
            _ => Err(()),
        }
    }
}
