/// Rows from the end at which more data is requested.
pub const DEFAULT_NEAR_END_ROWS: usize = 5;

/// Near-end detection for a growing list.
///
/// Knows nothing about rendering or data loading: callers report where the
/// viewer is and get the callback's value back when more data is wanted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InfiniteScroll {
    threshold: usize,
}

impl Default for InfiniteScroll {
    fn default() -> Self {
        Self::new(DEFAULT_NEAR_END_ROWS)
    }
}

impl InfiniteScroll {
    pub fn new(threshold: usize) -> Self {
        Self { threshold }
    }

    /// An empty list is always at its end.
    pub fn is_near_end(&self, position: usize, len: usize) -> bool {
        let remaining = len.saturating_sub(position.saturating_add(1));
        len == 0 || remaining < self.threshold
    }

    /// Invoke `on_near_end` when `position` is close to the end of `len`
    /// rows and more data may exist.
    pub fn on_near_end<A>(
        &self,
        position: usize,
        len: usize,
        has_more: bool,
        on_near_end: impl FnOnce() -> A,
    ) -> Option<A> {
        if has_more && self.is_near_end(position, len) {
            Some(on_near_end())
        } else {
            None
        }
    }
}
