//! Detail navigator - which item the detail view shows, with prev/next stepping

use serde::{Deserialize, Serialize};

use crate::state::Item;
use crate::store::CollectionStore;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum NavError {
    #[error("item {0} is not loaded")]
    NotFound(u32),
}

/// Only the selected id is stored; the index is always looked up against the
/// current store so it stays right after merges reorder the sequence.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetailNavigator {
    selected_id: Option<u32>,
}

impl DetailNavigator {
    pub fn selected_id(&self) -> Option<u32> {
        self.selected_id
    }

    pub fn is_open(&self) -> bool {
        self.selected_id.is_some()
    }

    pub fn open(&mut self, store: &CollectionStore, id: u32) -> Result<(), NavError> {
        if store.find_index_by_id(id).is_none() {
            return Err(NavError::NotFound(id));
        }
        self.selected_id = Some(id);
        Ok(())
    }

    /// Move by `direction` positions; out-of-range targets leave the selection as is.
    pub fn step(&mut self, store: &CollectionStore, direction: i32) -> bool {
        let Some(current) = self.current_index(store) else {
            return false;
        };
        let Some(target) = current.checked_add_signed(direction as isize) else {
            return false;
        };
        match store.snapshot().get(target) {
            Some(item) => {
                self.selected_id = Some(item.id);
                true
            }
            None => false,
        }
    }

    pub fn close(&mut self) {
        self.selected_id = None;
    }

    pub fn current_index(&self, store: &CollectionStore) -> Option<usize> {
        store.find_index_by_id(self.selected_id?)
    }

    pub fn current<'a>(&self, store: &'a CollectionStore) -> Option<&'a Item> {
        store.get(self.selected_id?)
    }

    pub fn can_prev(&self, store: &CollectionStore) -> bool {
        matches!(self.current_index(store), Some(index) if index > 0)
    }

    pub fn can_next(&self, store: &CollectionStore) -> bool {
        matches!(self.current_index(store), Some(index) if index + 1 < store.len())
    }
}
