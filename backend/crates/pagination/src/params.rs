//! Numbered page request parameters.

use serde::{Deserialize, Serialize};

/// Page size applied when the client does not ask for one.
pub const DEFAULT_PAGE_SIZE: u32 = 20;
/// Largest page size a client may request.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Errors raised while validating page parameters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PageParamsError {
    /// Pages are numbered from one.
    #[error("page must be at least 1, got {page}")]
    PageOutOfRange {
        /// Rejected page number.
        page: u32,
    },
    /// Page size must be between one and [`MAX_PAGE_SIZE`].
    #[error("page size must be between 1 and {max}, got {page_size}")]
    PageSizeOutOfRange {
        /// Rejected page size.
        page_size: u32,
        /// Largest accepted page size.
        max: u32,
    },
}

/// Validated one-based page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageParams {
    page: u32,
    page_size: u32,
}

impl Default for PageParams {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PageParams {
    /// Validate optional query values, applying defaults for missing ones.
    ///
    /// # Errors
    ///
    /// Returns [`PageParamsError`] when the page is zero or the page size is
    /// outside `1..=MAX_PAGE_SIZE`.
    pub fn new(page: Option<u32>, page_size: Option<u32>) -> Result<Self, PageParamsError> {
        let page = page.unwrap_or(1);
        let page_size = page_size.unwrap_or(DEFAULT_PAGE_SIZE);
        if page == 0 {
            return Err(PageParamsError::PageOutOfRange { page });
        }
        if page_size == 0 || page_size > MAX_PAGE_SIZE {
            return Err(PageParamsError::PageSizeOutOfRange {
                page_size,
                max: MAX_PAGE_SIZE,
            });
        }
        Ok(Self { page, page_size })
    }

    /// One-based page number.
    #[must_use]
    pub const fn page(&self) -> u32 {
        self.page
    }

    /// Number of items per page.
    #[must_use]
    pub const fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Number of items to skip before this page.
    #[must_use]
    pub const fn offset(&self) -> u64 {
        (self.page as u64 - 1) * self.page_size as u64
    }

    /// Page size as a SQL `LIMIT` value.
    #[must_use]
    pub const fn limit(&self) -> i64 {
        self.page_size as i64
    }

    /// Slice an already filtered, already ordered collection to this page.
    #[must_use]
    pub fn slice<T>(&self, items: Vec<T>) -> Vec<T> {
        let skip = usize::try_from(self.offset()).unwrap_or(usize::MAX);
        items
            .into_iter()
            .skip(skip)
            .take(self.page_size as usize)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    //! Validation coverage for page parameters.

    use super::*;
    use rstest::rstest;

    #[rstest]
    fn defaults_apply_when_missing() {
        let params = PageParams::new(None, None).expect("defaults are valid");
        assert_eq!(params.page(), 1);
        assert_eq!(params.page_size(), DEFAULT_PAGE_SIZE);
        assert_eq!(params.offset(), 0);
    }

    #[rstest]
    #[case(Some(0), None)]
    #[case(None, Some(0))]
    #[case(None, Some(MAX_PAGE_SIZE + 1))]
    fn rejects_out_of_range_values(#[case] page: Option<u32>, #[case] page_size: Option<u32>) {
        assert!(PageParams::new(page, page_size).is_err());
    }

    #[rstest]
    fn slice_returns_requested_window() {
        let params = PageParams::new(Some(2), Some(3)).expect("valid params");
        let items: Vec<u32> = (1..=8).collect();
        assert_eq!(params.slice(items), vec![4, 5, 6]);
    }

    #[rstest]
    fn slice_past_end_is_empty() {
        let params = PageParams::new(Some(5), Some(3)).expect("valid params");
        assert!(params.slice(vec![1, 2, 3]).is_empty());
    }
}
