use super::entity::Entity;
use crate::domain::value_objects::PageCursor;
use serde::{Deserialize, Serialize};

/// One backend page. Empty `items` with no `next_cursor` signals the end
/// of the list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    pub items: Vec<Entity>,
    pub next_cursor: Option<PageCursor>,
}

impl Page {
    pub fn new(items: Vec<Entity>, next_cursor: Option<PageCursor>) -> Self {
        Self { items, next_cursor }
    }

    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            next_cursor: None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.items.is_empty() || self.next_cursor.is_none()
    }
}
