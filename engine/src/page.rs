//! Page requests and page slices.
//!
//! A [`PageRequest`] is a validated pair of page number and page size. Both
//! values are clamped when they are assigned, never when they are read, so an
//! out-of-range write is silently corrected instead of rejected.
//!
//! A [`PageSlice`] is one bounded page of a larger counted sequence, plus the
//! metadata describing where the page sits in the whole.

use crate::{error::Result, Error};
use serde::{Deserialize, Serialize};

/// Largest page size a request may ask for.
pub const MAX_PAGE_SIZE: u64 = 50;

/// Page number used when none is given.
pub const DEFAULT_PAGE_NUMBER: u64 = 1;

/// Page size used when none is given.
pub const DEFAULT_PAGE_SIZE: u64 = 1;

/// Raw wire form of a page request, before clamping.
///
/// Signed so that `pageNumber=-3` deserializes and is clamped rather than
/// failing the whole request.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPageRequest {
    page_number: Option<i64>,
    page_size: Option<i64>,
}

impl From<RawPageRequest> for PageRequest {
    fn from(raw: RawPageRequest) -> Self {
        let mut request = PageRequest::default();
        if let Some(number) = raw.page_number {
            request.set_page_number(number);
        }
        if let Some(size) = raw.page_size {
            request.set_page_size(size);
        }
        request
    }
}

/// A request for one page.
///
/// Invariants held after every assignment:
/// - `page_number >= 1`
/// - `1 <= page_size <= MAX_PAGE_SIZE`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawPageRequest", rename_all = "camelCase")]
pub struct PageRequest {
    page_number: u64,
    page_size: u64,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page_number: DEFAULT_PAGE_NUMBER,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PageRequest {
    /// Create a request, clamping both values.
    pub fn new(page_number: i64, page_size: i64) -> Self {
        let mut request = Self::default();
        request.set_page_number(page_number);
        request.set_page_size(page_size);
        request
    }

    /// Set the page number. Values below 1 become 1.
    pub fn set_page_number(&mut self, page_number: i64) {
        self.page_number = page_number.max(1) as u64;
    }

    /// Set the page size. Values are clamped to `[1, MAX_PAGE_SIZE]`.
    pub fn set_page_size(&mut self, page_size: i64) {
        self.page_size = page_size.clamp(1, MAX_PAGE_SIZE as i64) as u64;
    }

    /// Builder form of [`set_page_number`](Self::set_page_number).
    pub fn with_page_number(mut self, page_number: i64) -> Self {
        self.set_page_number(page_number);
        self
    }

    /// Builder form of [`set_page_size`](Self::set_page_size).
    pub fn with_page_size(mut self, page_size: i64) -> Self {
        self.set_page_size(page_size);
        self
    }

    /// The 1-indexed page number.
    pub fn page_number(&self) -> u64 {
        self.page_number
    }

    /// The page size.
    pub fn page_size(&self) -> u64 {
        self.page_size
    }

    /// Number of items to skip before this page starts.
    pub fn skip(&self) -> u64 {
        (self.page_number - 1).saturating_mul(self.page_size)
    }

    /// Number of items this page may hold.
    pub fn take(&self) -> u64 {
        self.page_size
    }
}

/// Pagination metadata sent alongside a page, e.g. in a response header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationHeader {
    pub current_page: u64,
    pub items_per_page: u64,
    pub total_items: u64,
    pub total_pages: u64,
}

/// Wire form of a page, checked through [`PageSlice::new`] on the way in.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPageSlice<T> {
    items: Vec<T>,
    current_page: u64,
    page_size: u64,
    total_count: u64,
    total_pages: u64,
}

impl<T> TryFrom<RawPageSlice<T>> for PageSlice<T> {
    type Error = Error;

    fn try_from(raw: RawPageSlice<T>) -> Result<Self> {
        if raw.current_page == 0 {
            return Err(Error::InconsistentPage("currentPage is 0".into()));
        }

        let page = PageSlice::new(raw.items, raw.total_count, raw.current_page, raw.page_size)?;
        if page.total_pages != raw.total_pages {
            return Err(Error::InconsistentPage(format!(
                "totalPages is {}, expected {}",
                raw.total_pages, page.total_pages
            )));
        }
        Ok(page)
    }
}

/// One page of a counted sequence.
///
/// Invariants, also enforced when deserializing:
/// - `items.len() <= page_size` and `items.len() <= total_count`
/// - `current_page >= 1`
/// - `total_pages == ceil(total_count / page_size)`, so an empty sequence has
///   no pages and no items
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawPageSlice<T>", rename_all = "camelCase")]
pub struct PageSlice<T> {
    items: Vec<T>,
    current_page: u64,
    page_size: u64,
    total_count: u64,
    total_pages: u64,
}

impl<T> PageSlice<T> {
    /// Build a page from an already-sliced item vector.
    ///
    /// `page_size` must be non-zero and `items` must fit both in it and in
    /// `count`. A `page_number` of 0 is treated as page 1.
    pub fn new(items: Vec<T>, count: u64, page_number: u64, page_size: u64) -> Result<Self> {
        if page_size == 0 {
            return Err(Error::ZeroPageSize);
        }
        if items.len() as u64 > page_size {
            return Err(Error::PageOverflow {
                len: items.len(),
                page_size,
            });
        }
        if items.len() as u64 > count {
            return Err(Error::ItemsExceedCount {
                len: items.len(),
                count,
            });
        }

        Ok(Self {
            items,
            current_page: page_number.max(1),
            page_size,
            total_count: count,
            total_pages: count.div_ceil(page_size),
        })
    }

    /// Items on this page.
    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Consume the page and return its items.
    pub fn into_items(self) -> Vec<T> {
        self.items
    }

    /// The 1-indexed page number.
    pub fn current_page(&self) -> u64 {
        self.current_page
    }

    /// The page size this page was fetched with.
    pub fn page_size(&self) -> u64 {
        self.page_size
    }

    /// Total items in the whole sequence.
    pub fn total_count(&self) -> u64 {
        self.total_count
    }

    /// Total number of pages.
    pub fn total_pages(&self) -> u64 {
        self.total_pages
    }

    /// Number of items on this page.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether this page holds no items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn has_previous(&self) -> bool {
        self.current_page > 1
    }

    pub fn has_next(&self) -> bool {
        self.current_page < self.total_pages
    }

    /// Metadata for this page.
    pub fn header(&self) -> PaginationHeader {
        PaginationHeader {
            current_page: self.current_page,
            items_per_page: self.page_size,
            total_items: self.total_count,
            total_pages: self.total_pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_request() {
        let request = PageRequest::default();
        assert_eq!(request.page_number(), 1);
        assert_eq!(request.page_size(), 1);
        assert_eq!(request.skip(), 0);
    }

    #[test]
    fn page_size_clamped_on_write() {
        let mut request = PageRequest::default();
        request.set_page_size(200);
        assert_eq!(request.page_size(), MAX_PAGE_SIZE);

        // Reading again does not change anything
        assert_eq!(request.page_size(), 50);

        request.set_page_size(0);
        assert_eq!(request.page_size(), 1);

        request.set_page_size(-7);
        assert_eq!(request.page_size(), 1);
    }

    #[test]
    fn page_number_clamped_to_one() {
        let request = PageRequest::new(-4, 10);
        assert_eq!(request.page_number(), 1);
        assert_eq!(request.skip(), 0);

        let request = PageRequest::new(0, 10);
        assert_eq!(request.page_number(), 1);
    }

    #[test]
    fn skip_and_take() {
        let request = PageRequest::new(3, 20);
        assert_eq!(request.skip(), 40);
        assert_eq!(request.take(), 20);
    }

    #[test]
    fn request_deserialization_clamps() {
        let request: PageRequest =
            serde_json::from_str(r#"{"pageNumber": -2, "pageSize": 500}"#).unwrap();
        assert_eq!(request.page_number(), 1);
        assert_eq!(request.page_size(), 50);

        let request: PageRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(request, PageRequest::default());
    }

    #[test]
    fn total_pages_rounds_up() {
        let page = PageSlice::new(vec![1, 2], 101, 3, 50).unwrap();
        assert_eq!(page.total_pages(), 3);
        assert_eq!(page.total_count(), 101);
        assert!(page.has_previous());
        assert!(!page.has_next());
    }

    #[test]
    fn empty_source_has_no_pages() {
        let page: PageSlice<u32> = PageSlice::new(vec![], 0, 1, 10).unwrap();
        assert_eq!(page.total_pages(), 0);
        assert!(page.is_empty());
        assert!(!page.has_next());
        assert!(!page.has_previous());
    }

    #[test]
    fn zero_page_size_rejected() {
        let result: Result<PageSlice<u32>> = PageSlice::new(vec![], 10, 1, 0);
        assert_eq!(result, Err(Error::ZeroPageSize));
    }

    #[test]
    fn oversized_items_rejected() {
        let result = PageSlice::new(vec![1, 2, 3], 3, 1, 2);
        assert_eq!(
            result,
            Err(Error::PageOverflow {
                len: 3,
                page_size: 2
            })
        );
    }

    #[test]
    fn items_beyond_count_rejected() {
        let result = PageSlice::new(vec![1], 0, 1, 10);
        assert_eq!(result, Err(Error::ItemsExceedCount { len: 1, count: 0 }));

        let result = PageSlice::new(vec![1, 2, 3], 2, 1, 10);
        assert_eq!(result, Err(Error::ItemsExceedCount { len: 3, count: 2 }));
    }

    #[test]
    fn deserialization_checks_invariants() {
        let page: PageSlice<u32> = serde_json::from_str(
            r#"{"items":[4,5],"currentPage":2,"pageSize":3,"totalCount":5,"totalPages":2}"#,
        )
        .unwrap();
        assert_eq!(page, PageSlice::new(vec![4, 5], 5, 2, 3).unwrap());

        let bad = [
            // Items on an empty sequence
            r#"{"items":[1],"currentPage":1,"pageSize":10,"totalCount":0,"totalPages":0}"#,
            // Wrong page total
            r#"{"items":[],"currentPage":1,"pageSize":10,"totalCount":25,"totalPages":2}"#,
            r#"{"items":[],"currentPage":1,"pageSize":0,"totalCount":0,"totalPages":0}"#,
            r#"{"items":[1,2],"currentPage":1,"pageSize":1,"totalCount":2,"totalPages":2}"#,
            r#"{"items":[],"currentPage":0,"pageSize":5,"totalCount":0,"totalPages":0}"#,
        ];
        for raw in bad {
            assert!(serde_json::from_str::<PageSlice<u32>>(raw).is_err(), "{}", raw);
        }
    }

    #[test]
    fn header_format() {
        let page = PageSlice::new(vec!["a"; 10], 25, 2, 10).unwrap();
        let header = page.header();
        assert_eq!(
            header,
            PaginationHeader {
                current_page: 2,
                items_per_page: 10,
                total_items: 25,
                total_pages: 3,
            }
        );

        let json = serde_json::to_string(&header).unwrap();
        assert!(json.contains("\"currentPage\":2"));
        assert!(json.contains("\"itemsPerPage\":10"));
        assert!(json.contains("\"totalItems\":25"));
        assert!(json.contains("\"totalPages\":3"));
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn prop_total_pages_is_ceiling(count in 0u64..100_000, page_size in 1u64..=50) {
                let page: PageSlice<u8> = PageSlice::new(vec![], count, 1, page_size).unwrap();
                let expected = (count as f64 / page_size as f64).ceil() as u64;
                prop_assert_eq!(page.total_pages(), expected);
            }

            #[test]
            fn prop_page_size_always_in_bounds(size in any::<i64>()) {
                let request = PageRequest::default().with_page_size(size);
                prop_assert!(request.page_size() >= 1);
                prop_assert!(request.page_size() <= MAX_PAGE_SIZE);

                // Clamping is idempotent
                let again = request.with_page_size(request.page_size() as i64);
                prop_assert_eq!(again.page_size(), request.page_size());
            }

            #[test]
            fn prop_page_number_always_positive(number in any::<i64>()) {
                let request = PageRequest::default().with_page_number(number);
                prop_assert!(request.page_number() >= 1);
            }
        }
    }
}
