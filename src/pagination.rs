//! Pagination controller - offset cursor, load phase and stale-result guard

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::api::{Cursor, Page};
use crate::store::CollectionStore;

pub const DEFAULT_PAGE_SIZE: usize = 20;

pub const LABEL_LOAD_MORE: &str = "Load more Pokémon";
pub const LABEL_LOADING: &str = "Loading...";
pub const LABEL_ALL_LOADED: &str = "All Pokémon loaded";
pub const LABEL_LOAD_ERROR: &str = "Load error (r to retry)";

const NOTHING_LOADED: &str = "no entry on this page could be loaded";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoadPhase {
    #[default]
    Idle,
    Loading,
    Loaded,
    Exhausted,
    Error,
}

/// Parameters for one page load, tagged with the generation it belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    pub generation: u64,
    pub limit: usize,
    pub offset: usize,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Result belonged to an older generation and was dropped.
    Stale,
    /// Items merged; `added` counts ids that were new to the store.
    Merged { added: usize },
    Exhausted,
    Failed(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoadMoreButton {
    pub visible: bool,
    pub enabled: bool,
    pub label: &'static str,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    page_size: usize,
    offset: usize,
    phase: LoadPhase,
    generation: u64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl Pagination {
    pub fn new(page_size: usize) -> Self {
        Self {
            page_size: page_size.max(1),
            offset: 0,
            phase: LoadPhase::Idle,
            generation: 0,
        }
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn phase(&self) -> LoadPhase {
        self.phase
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_loading(&self) -> bool {
        self.phase == LoadPhase::Loading
    }

    pub fn has_more(&self) -> bool {
        matches!(self.phase, LoadPhase::Idle | LoadPhase::Loaded)
    }

    /// Start the next page load, or `None` when one is in flight or nothing is left.
    pub fn begin_load(&mut self) -> Option<PageRequest> {
        if !self.has_more() {
            return None;
        }
        Some(self.start())
    }

    /// Re-issue the page that failed. Only valid from `Error`.
    pub fn retry(&mut self) -> Option<PageRequest> {
        if self.phase != LoadPhase::Error {
            return None;
        }
        Some(self.start())
    }

    fn start(&mut self) -> PageRequest {
        self.phase = LoadPhase::Loading;
        debug!(offset = self.offset, generation = self.generation, "page load started");
        PageRequest {
            generation: self.generation,
            limit: self.page_size,
            offset: self.offset,
        }
    }

    /// Apply a settled page. The offset only moves after the merge succeeded.
    pub fn complete(
        &mut self,
        generation: u64,
        page: Page,
        store: &mut CollectionStore,
    ) -> LoadOutcome {
        if generation != self.generation || self.phase != LoadPhase::Loading {
            debug!(generation, current = self.generation, "dropping stale page");
            return LoadOutcome::Stale;
        }

        let Page { items, cursor } = page;
        if !items.is_empty() {
            let added = store.merge(items);
            self.offset += self.page_size;
            self.phase = if cursor.has_more() {
                LoadPhase::Loaded
            } else {
                LoadPhase::Exhausted
            };
            info!(offset = self.offset, added, phase = ?self.phase, "page merged");
            return LoadOutcome::Merged { added };
        }

        match cursor {
            Cursor::End => {
                self.phase = LoadPhase::Exhausted;
                info!(offset = self.offset, "catalog exhausted");
                LoadOutcome::Exhausted
            }
            Cursor::Failed(err) => {
                self.phase = LoadPhase::Error;
                info!(offset = self.offset, error = %err, "page load failed");
                LoadOutcome::Failed(err.to_string())
            }
            Cursor::More(_) => {
                self.phase = LoadPhase::Error;
                info!(offset = self.offset, "no entry on the page could be loaded");
                LoadOutcome::Failed(NOTHING_LOADED.to_string())
            }
        }
    }

    /// A `Loading` phase with no task behind it (restored from a saved
    /// session) goes back to `Idle` so the same offset can be requested again.
    pub fn resume_interrupted(&mut self) -> bool {
        if self.phase != LoadPhase::Loading {
            return false;
        }
        self.phase = LoadPhase::Idle;
        debug!(offset = self.offset, "resuming interrupted page load");
        true
    }

    /// Back to a fresh session; anything still in flight becomes stale.
    pub fn reset(&mut self) {
        self.offset = 0;
        self.phase = LoadPhase::Idle;
        self.generation += 1;
    }

    pub fn load_more_button(&self, search_active: bool) -> LoadMoreButton {
        let (enabled, label) = match self.phase {
            LoadPhase::Idle | LoadPhase::Loaded => (true, LABEL_LOAD_MORE),
            LoadPhase::Loading => (false, LABEL_LOADING),
            LoadPhase::Exhausted => (false, LABEL_ALL_LOADED),
            LoadPhase::Error => (false, LABEL_LOAD_ERROR),
        };
        LoadMoreButton {
            visible: !search_active,
            enabled: enabled && !search_active,
            label,
        }
    }
}
