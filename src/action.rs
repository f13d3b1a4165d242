use serde::{Deserialize, Serialize};

use crate::api::Page;

#[derive(tui_dispatch::Action, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[action(infer_categories)]
pub enum Action {
    Init,
    PageDidLoad { generation: u64, page: Page },

    LoadMore,
    LoadRetry,
    CatalogReload,

    CursorMove(i16),
    CursorSet(usize),

    SearchStart,
    SearchCancel,
    SearchSubmit,
    SearchInput(char),
    SearchBackspace,

    DetailOpen(u32),
    DetailOpenSelected,
    DetailNext,
    DetailPrev,
    DetailClose,

    UiTerminalResize(u16, u16),
    Tick,
    Quit,
}
