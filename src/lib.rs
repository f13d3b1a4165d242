//! Pokecards - paginated Pokemon card catalog for the terminal
//!
//! Pages are fetched from PokeAPI, normalized into [`state::Item`]s and merged
//! into a single id-ordered [`store::CollectionStore`]. Search, the card grid
//! and the detail overlay all read from that store.

pub mod action;
pub mod api;
pub mod config;
pub mod effect;
pub mod logging;
pub mod navigator;
pub mod normalize;
pub mod pagination;
pub mod reducer;
pub mod search;
pub mod state;
pub mod store;
pub mod ui;
