//! Actions - intents from the UI and results from async tasks

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::state::{CityRecord, SortColumn};

/// Application actions with automatic category inference
#[derive(tui_dispatch::Action, Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
#[action(infer_categories)]
pub enum Action {
    // ===== Page category =====
    /// Intent: fetch the page at the current cursor (also the start-up action)
    PageFetch,

    /// Intent: advance the cursor by one page and fetch it
    PageRequestNext,

    /// Result: a page arrived; an empty batch means there is no more data
    PageDidLoad { page: u32, records: Vec<CityRecord> },

    /// Result: fetching a page failed
    PageDidError { page: u32, error: String },

    // ===== Search category =====
    /// Move keyboard focus to the search input
    SearchFocus,

    /// Return keyboard focus to the table
    SearchBlur,

    /// Search query text changed
    SearchQueryChange(String),

    /// Clear the query
    SearchClear,

    // ===== Sort category =====
    /// Reorder the collection by a column
    SortBy(SortColumn),

    // ===== Selection category =====
    /// Move the selection by a number of rows
    SelectionMove(i16),

    /// Select a visible row by index
    SelectionSet(usize),

    SelectionJumpTop,

    SelectionJumpBottom,

    // ===== City category =====
    /// Open the weather route of the selected city
    CityOpen,

    // ===== Uncategorized (global) =====
    /// Force a re-render (for cursor movement, etc.)
    Render,

    /// Periodic tick for the loading spinner
    Tick,

    /// Exit the application
    Quit,
}
