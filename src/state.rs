use serde::{Deserialize, Serialize};
use tui_dispatch_debug::debug::{ron_string, DebugSection, DebugState};

use crate::navigator::DetailNavigator;
use crate::pagination::{LoadMoreButton, Pagination};
use crate::search::{self, SearchView};
use crate::store::CollectionStore;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ItemStat {
    pub name: String,
    pub value: u32,
}

/// One normalized catalog entry.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: u32,
    pub name: String,
    pub image_ref: String,
    /// Primary type first; never empty.
    pub types: Vec<String>,
    pub abilities: Vec<String>,
    pub stats: Vec<ItemStat>,
    /// Decimetres.
    pub height: u32,
    /// Hectograms.
    pub weight: u32,
}

impl Item {
    pub fn primary_type(&self) -> &str {
        self.types.first().map(String::as_str).unwrap_or_default()
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchState {
    /// Input box has focus.
    pub active: bool,
    pub query: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AppState {
    pub terminal_size: (u16, u16),
    pub store: CollectionStore,
    pub pagination: Pagination,
    pub search: SearchState,
    pub navigator: DetailNavigator,
    /// Card under the cursor, as a position in the current view.
    pub cursor: usize,
    pub message: Option<String>,
    pub tick: u64,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(Pagination::default())
    }
}

impl AppState {
    pub fn new(pagination: Pagination) -> Self {
        Self {
            terminal_size: (80, 24),
            store: CollectionStore::new(),
            pagination,
            search: SearchState::default(),
            navigator: DetailNavigator::default(),
            cursor: 0,
            message: None,
            tick: 0,
        }
    }

    pub fn with_page_size(page_size: usize) -> Self {
        Self::new(Pagination::new(page_size))
    }

    /// A non-empty query owns the card area; pagination is suspended meanwhile.
    pub fn search_active(&self) -> bool {
        !self.search.query.trim().is_empty()
    }

    pub fn view(&self) -> SearchView<'_> {
        search::filter(&self.search.query, self.store.snapshot())
    }

    pub fn selected_card(&self) -> Option<&Item> {
        self.view().results.get(self.cursor).copied()
    }

    pub fn load_more_button(&self) -> LoadMoreButton {
        self.pagination.load_more_button(self.search_active())
    }

    pub fn detail(&self) -> Option<&Item> {
        self.navigator.current(&self.store)
    }

    pub fn set_cursor(&mut self, index: usize) -> bool {
        let len = self.view().results.len();
        let bounded = index.min(len.saturating_sub(1));
        if bounded != self.cursor {
            self.cursor = bounded;
            return true;
        }
        false
    }

    /// Put the cursor on `id` if it is part of the current view.
    pub fn sync_cursor_to(&mut self, id: u32) {
        if let Some(position) = self.view().results.iter().position(|item| item.id == id) {
            self.cursor = position;
        }
    }

    pub fn clamp_cursor(&mut self) {
        let len = self.view().results.len();
        if self.cursor >= len {
            self.cursor = len.saturating_sub(1);
        }
    }
}

impl DebugState for AppState {
    fn debug_sections(&self) -> Vec<DebugSection> {
        vec![
            DebugSection::new("Catalog")
                .entry("loaded", ron_string(&self.store.len()))
                .entry("cursor", ron_string(&self.cursor))
                .entry("detail", ron_string(&self.navigator.selected_id())),
            DebugSection::new("Pagination")
                .entry("phase", ron_string(&self.pagination.phase()))
                .entry("offset", ron_string(&self.pagination.offset()))
                .entry("page_size", ron_string(&self.pagination.page_size()))
                .entry("generation", ron_string(&self.pagination.generation())),
            DebugSection::new("Search")
                .entry("query", ron_string(&self.search.query))
                .entry("active", ron_string(&self.search.active))
                .entry("status", ron_string(&self.view().status)),
            DebugSection::new("Status").entry("message", ron_string(&self.message)),
        ]
    }
}

#[cfg(test)]
pub(crate) fn test_item(id: u32, name: &str) -> Item {
    Item {
        id,
        name: name.to_string(),
        image_ref: format!("https://img/{id}.png"),
        types: vec!["normal".to_string()],
        abilities: Vec::new(),
        stats: Vec::new(),
        height: 10,
        weight: 100,
    }
}
