//! Application state - single source of truth

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::collate::{contains_ignore_case, sort_key};

/// Rows requested per page unless configured otherwise.
pub const DEFAULT_PAGE_SIZE: u32 = 50;

/// Spinner timing while a page is in flight.
pub const LOADING_TICK_MS: u64 = 90;

/// One city as returned by the dataset
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct CityRecord {
    pub id: String,
    pub name: String,
    pub country: String,
    pub timezone: String,
}

impl CityRecord {
    pub fn field(&self, column: SortColumn) -> &str {
        match column {
            SortColumn::Name => &self.name,
            SortColumn::Country => &self.country,
            SortColumn::Timezone => &self.timezone,
        }
    }

    /// Detail route for this city's weather view
    pub fn route(&self) -> String {
        weather_route(&self.name)
    }
}

/// Build the `/weather/{city}` route, percent-encoding the city name.
pub fn weather_route(city: &str) -> String {
    format!("/weather/{}", urlencoding::encode(city))
}

/// Sortable table columns
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum SortColumn {
    Name,
    Country,
    Timezone,
}

impl SortColumn {
    pub const ALL: [SortColumn; 3] = [SortColumn::Name, SortColumn::Country, SortColumn::Timezone];

    pub fn title(&self) -> &'static str {
        match self {
            SortColumn::Name => "City Name",
            SortColumn::Country => "Country",
            SortColumn::Timezone => "Timezone",
        }
    }

    pub fn index(&self) -> usize {
        match self {
            SortColumn::Name => 0,
            SortColumn::Country => 1,
            SortColumn::Timezone => 2,
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }
}

/// Which widget receives typed keys
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum Focus {
    #[default]
    Table,
    Search,
}

/// Application state - everything the UI needs to render
#[derive(Clone, Debug, tui_dispatch::DebugState, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct AppState {
    // --- Pagination ---
    /// Accumulated cities in arrival order, or sorted order after a sort
    #[debug(skip)]
    pub cities: Vec<CityRecord>,

    /// Zero-based page index; offset = cursor * page_size
    #[debug(section = "Pages", label = "Cursor")]
    pub cursor: u32,

    #[debug(section = "Pages", label = "Page size")]
    pub page_size: u32,

    /// Set once a page comes back empty; never cleared
    #[debug(section = "Pages", label = "End of data")]
    pub end_of_data: bool,

    /// Page whose fetch is outstanding
    #[debug(section = "Pages", label = "In flight", debug_fmt)]
    pub in_flight: Option<u32>,

    // --- Search ---
    #[debug(section = "Search", label = "Query", debug_fmt)]
    pub query: String,

    /// Indices into `cities` matching `query`, in collection order
    #[debug(skip)]
    pub filtered: Vec<usize>,

    // --- Table ---
    #[debug(section = "Table", label = "Sorted by", debug_fmt)]
    pub sort: Option<SortColumn>,

    /// Index into the visible rows
    #[debug(section = "Table", label = "Selected")]
    pub selected: usize,

    #[debug(section = "Table", label = "Focus", debug_fmt)]
    pub focus: Focus,

    /// Last opened detail route
    #[debug(section = "Table", label = "Route", debug_fmt)]
    pub route: Option<String>,

    #[debug(skip)]
    pub tick_count: u32,
}

impl AppState {
    pub fn new(page_size: u32) -> Self {
        Self {
            cities: Vec::new(),
            cursor: 0,
            page_size: page_size.max(1),
            end_of_data: false,
            in_flight: None,
            query: String::new(),
            filtered: Vec::new(),
            sort: None,
            selected: 0,
            focus: Focus::default(),
            route: None,
            tick_count: 0,
        }
    }

    /// Row offset of the page at `cursor`
    pub fn page_start(&self, cursor: u32) -> u64 {
        u64::from(cursor) * u64::from(self.page_size)
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight.is_some()
    }

    /// More pages may exist and none is being fetched
    pub fn can_request_more(&self) -> bool {
        !self.end_of_data && self.in_flight.is_none()
    }

    pub fn has_query(&self) -> bool {
        !self.query.is_empty()
    }

    /// Number of rows the table shows
    pub fn visible_len(&self) -> usize {
        if self.has_query() {
            self.filtered.len()
        } else {
            self.cities.len()
        }
    }

    /// Rows the table shows: the filtered view while a query is active,
    /// the whole collection otherwise.
    pub fn visible(&self) -> Vec<&CityRecord> {
        if self.has_query() {
            self.filtered
                .iter()
                .filter_map(|&index| self.cities.get(index))
                .collect()
        } else {
            self.cities.iter().collect()
        }
    }

    pub fn visible_at(&self, position: usize) -> Option<&CityRecord> {
        if self.has_query() {
            self.filtered
                .get(position)
                .and_then(|&index| self.cities.get(index))
        } else {
            self.cities.get(position)
        }
    }

    pub fn selected_city(&self) -> Option<&CityRecord> {
        self.visible_at(self.selected)
    }

    /// Recompute the filtered view with a full scan of the collection.
    pub fn rebuild_filtered(&mut self) {
        let query = &self.query;
        self.filtered = if query.is_empty() {
            Vec::new()
        } else {
            self.cities
                .iter()
                .enumerate()
                .filter(|(_, city)| contains_ignore_case(&city.name, query))
                .map(|(index, _)| index)
                .collect()
        };
        self.clamp_selection();
    }

    /// Reorder the collection ascending by `column`.
    pub fn sort_by(&mut self, column: SortColumn) {
        self.cities
            .sort_by_cached_key(|city| sort_key(city.field(column)));
        self.sort = Some(column);
        self.rebuild_filtered();
    }

    /// Row a relative move of `delta` lands on, clamped to the visible rows.
    pub fn selection_target(&self, delta: i16) -> usize {
        let target = if delta < 0 {
            self.selected.saturating_sub(usize::from(delta.unsigned_abs()))
        } else {
            self.selected.saturating_add(delta.unsigned_abs().into())
        };
        target.min(self.visible_len().saturating_sub(1))
    }

    /// Returns true if the selection moved.
    pub fn set_selected(&mut self, index: usize) -> bool {
        let last = self.visible_len().saturating_sub(1);
        let index = index.min(last);
        if index == self.selected {
            return false;
        }
        self.selected = index;
        true
    }

    pub fn clamp_selection(&mut self) {
        let last = self.visible_len().saturating_sub(1);
        if self.selected > last {
            self.selected = last;
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}
