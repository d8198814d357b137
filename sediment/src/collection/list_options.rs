use crate::common::{DEFAULT_PAGE, DEFAULT_PAGE_SIZE};
use crate::store::RangeOrder;

/// Listing direction over a sorted index.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ListOrder {
    /// Highest score first (the default: newest first for time scores).
    #[default]
    NewestFirst,
    /// Lowest score first ("normal" rank order: oldest first).
    Earliest,
}

impl ListOrder {
    pub(crate) fn range_order(&self) -> RangeOrder {
        match self {
            ListOrder::NewestFirst => RangeOrder::Descending,
            ListOrder::Earliest => RangeOrder::Ascending,
        }
    }
}

/// Options for paginated listings over a sorted index.
///
/// Supports method chaining for convenient configuration.
///
/// # Examples
///
/// ```rust,ignore
/// use sediment::collection::{ListOptions, ListOrder};
///
/// // second page of ten, oldest first
/// let options = ListOptions::new()
///     .page(2)
///     .size(10)
///     .order(ListOrder::Earliest);
///
/// // convenience constructors
/// let options = page(3);
/// let options = sized(25);
/// ```
#[derive(Clone, Debug)]
pub struct ListOptions {
    pub(crate) index: Option<String>,
    pub(crate) page: u64,
    pub(crate) size: u64,
    pub(crate) order: ListOrder,
}

/// Creates `ListOptions` positioned at a page.
pub fn page(page: u64) -> ListOptions {
    ListOptions::new().page(page)
}

/// Creates `ListOptions` with a page size.
pub fn sized(size: u64) -> ListOptions {
    ListOptions::new().size(size)
}

/// Creates `ListOptions` listing oldest first.
pub fn earliest() -> ListOptions {
    ListOptions::new().order(ListOrder::Earliest)
}

impl ListOptions {
    /// Creates options with the defaults: page 1, size 50, newest first,
    /// over the collection's default chronological index.
    pub fn new() -> ListOptions {
        ListOptions {
            index: None,
            page: DEFAULT_PAGE,
            size: DEFAULT_PAGE_SIZE,
            order: ListOrder::default(),
        }
    }

    /// Names the sorted index key to list from instead of the default
    /// chronological index.
    pub fn index(mut self, index: &str) -> ListOptions {
        self.index = Some(index.to_string());
        self
    }

    /// Sets the one-based page number. Page 0 is coerced to 1.
    pub fn page(mut self, page: u64) -> ListOptions {
        self.page = page.max(DEFAULT_PAGE);
        self
    }

    /// Sets the page size.
    pub fn size(mut self, size: u64) -> ListOptions {
        self.size = size;
        self
    }

    /// Sets the listing direction.
    pub fn order(mut self, order: ListOrder) -> ListOptions {
        self.order = order;
        self
    }

    /// Computes the zero-based inclusive rank range `[start, end]` for the
    /// configured page: `[(page-1)*size, page*size-1]`.
    ///
    /// Returns `None` for a zero page size, which can never address a rank,
    /// and for page/size combinations whose range would overflow `u64`.
    pub fn rank_range(&self) -> Option<(u64, u64)> {
        if self.size == 0 {
            return None;
        }
        let start = (self.page - 1).checked_mul(self.size)?;
        let end = self.page.checked_mul(self.size)?.checked_sub(1)?;
        Some((start, end))
    }
}

impl Default for ListOptions {
    fn default() -> Self {
        ListOptions::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = ListOptions::new();
        assert_eq!(options.page, 1);
        assert_eq!(options.size, 50);
        assert_eq!(options.order, ListOrder::NewestFirst);
        assert!(options.index.is_none());
    }

    #[test]
    fn test_default_rank_range() {
        let options = ListOptions::new();
        assert_eq!(options.rank_range(), Some((0, 49)));
    }

    #[test]
    fn test_page_two_of_ten() {
        let options = ListOptions::new().page(2).size(10);
        assert_eq!(options.rank_range(), Some((10, 19)));
    }

    #[test]
    fn test_page_zero_coerced_to_one() {
        let options = ListOptions::new().page(0).size(10);
        assert_eq!(options.rank_range(), Some((0, 9)));
    }

    #[test]
    fn test_zero_size_has_no_range() {
        let options = ListOptions::new().size(0);
        assert_eq!(options.rank_range(), None);
    }

    #[test]
    fn test_overflowing_range_is_empty() {
        let options = ListOptions::new().page(u64::MAX).size(2);
        assert_eq!(options.rank_range(), None);

        let options = ListOptions::new().page(2).size(u64::MAX);
        assert_eq!(options.rank_range(), None);
    }

    #[test]
    fn test_order_maps_to_range_order() {
        assert_eq!(ListOrder::NewestFirst.range_order(), RangeOrder::Descending);
        assert_eq!(ListOrder::Earliest.range_order(), RangeOrder::Ascending);
    }

    #[test]
    fn test_free_constructors() {
        assert_eq!(page(3).page, 3);
        assert_eq!(sized(25).size, 25);
        assert_eq!(earliest().order, ListOrder::Earliest);
    }

    #[test]
    fn test_index_override() {
        let options = ListOptions::new().index("users:modified");
        assert_eq!(options.index.as_deref(), Some("users:modified"));
    }
}
