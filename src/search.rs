//! Client-side name search over the loaded snapshot

use serde::{Deserialize, Serialize};

use crate::state::Item;

/// Queries shorter than this (after trimming) only prompt for more input.
pub const MIN_QUERY_CHARS: usize = 3;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SearchStatus {
    ShowAll,
    TooShort,
    Filtered,
    NoMatches,
}

/// A borrowed view over the input; never a copy with its own lifecycle.
#[derive(Clone, Debug, PartialEq)]
pub struct SearchView<'a> {
    pub status: SearchStatus,
    pub results: Vec<&'a Item>,
}

impl SearchView<'_> {
    pub fn ids(&self) -> Vec<u32> {
        self.results.iter().map(|item| item.id).collect()
    }
}

pub fn filter<'a>(query: &str, items: &'a [Item]) -> SearchView<'a> {
    let query = query.trim();
    let length = query.chars().count();

    if length == 0 {
        return SearchView {
            status: SearchStatus::ShowAll,
            results: items.iter().collect(),
        };
    }
    if length < MIN_QUERY_CHARS {
        return SearchView {
            status: SearchStatus::TooShort,
            results: Vec::new(),
        };
    }

    let needle = query.to_lowercase();
    let results: Vec<&Item> = items
        .iter()
        .filter(|item| item.name.to_lowercase().contains(&needle))
        .collect();
    let status = if results.is_empty() {
        SearchStatus::NoMatches
    } else {
        SearchStatus::Filtered
    };
    SearchView { status, results }
}
