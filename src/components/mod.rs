pub mod cities_view;
pub mod city_table;
pub mod infinite_scroll;
pub mod search_bar;

// Re-export core Component trait
pub use tui_dispatch::Component;

pub use cities_view::{CitiesView, CitiesViewProps};
pub use city_table::{CityTable, CityTableProps, END_LABEL, LOADING_LABEL};
pub use infinite_scroll::InfiniteScroll;
pub use search_bar::{SEARCH_PLACEHOLDER, SearchBar, SearchBarProps};
