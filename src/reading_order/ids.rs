//! Synthetic id allocation for generated groups and columns.

/// Hands out ids for nodes that have no natural id.
///
/// One allocator is owned by one ordering run, so ids are stable only within
/// that run.
///
/// # Examples
///
/// ```
/// use page_order::reading_order::IdAllocator;
///
/// let mut ids = IdAllocator::new();
/// assert_eq!(ids.next_id("g"), "g0");
/// assert_eq!(ids.next_id("g"), "g1");
/// assert_eq!(ids.next_free("c", |id| id == "c2"), "c3");
/// ```
#[derive(Debug, Clone, Default)]
pub struct IdAllocator {
    next: u64,
}

impl IdAllocator {
    /// Create an allocator starting at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Next id with the given prefix.
    pub fn next_id(&mut self, prefix: &str) -> String {
        let id = format!("{}{}", prefix, self.next);
        self.next += 1;
        id
    }

    /// Next id with the given prefix that `taken` does not reject.
    pub fn next_free<F>(&mut self, prefix: &str, taken: F) -> String
    where
        F: Fn(&str) -> bool,
    {
        loop {
            let id = self.next_id(prefix);
            if !taken(&id) {
                return id;
            }
        }
    }
}
