//! Collection store - every item loaded so far, deduplicated and ordered by id

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::state::Item;

/// Items keyed by id, exposed as one ascending-id sequence.
///
/// The ordered sequence is the only shape callers see; the id index is an
/// internal lookup table rebuilt after every merge. Serializes as the plain
/// ordered list so debug snapshots stay readable.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<Item>", into = "Vec<Item>")]
pub struct CollectionStore {
    items: Vec<Item>,
    index: HashMap<u32, usize>,
}

impl CollectionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite each item by id, then restore ascending-id order.
    ///
    /// Returns how many ids were not present before.
    pub fn merge(&mut self, new_items: impl IntoIterator<Item = Item>) -> usize {
        let mut added = 0;
        for item in new_items {
            match self.index.get(&item.id) {
                Some(&position) => self.items[position] = item,
                None => {
                    self.index.insert(item.id, self.items.len());
                    self.items.push(item);
                    added += 1;
                }
            }
        }
        self.items.sort_by_key(|item| item.id);
        self.rebuild_index();
        added
    }

    pub fn snapshot(&self) -> &[Item] {
        &self.items
    }

    pub fn find_index_by_id(&self, id: u32) -> Option<usize> {
        self.index.get(&id).copied()
    }

    pub fn get(&self, id: u32) -> Option<&Item> {
        self.find_index_by_id(id).map(|position| &self.items[position])
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn reset(&mut self) {
        self.items.clear();
        self.index.clear();
    }

    fn rebuild_index(&mut self) {
        self.index = self
            .items
            .iter()
            .enumerate()
            .map(|(position, item)| (item.id, position))
            .collect();
    }
}

impl From<Vec<Item>> for CollectionStore {
    fn from(items: Vec<Item>) -> Self {
        let mut store = Self::new();
        store.merge(items);
        store
    }
}

impl From<CollectionStore> for Vec<Item> {
    fn from(store: CollectionStore) -> Self {
        store.items
    }
}
