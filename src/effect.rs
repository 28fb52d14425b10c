//! Effects - side effects declared by the reducer

/// Side effects that can be triggered by actions
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Fetch one page of cities starting at row `start`
    FetchPage { page: u32, start: u64, rows: u32 },
    /// Hand a detail route to whoever renders it
    OpenRoute { route: String },
}
