//! Response envelopes for numbered pages.

use serde::{Deserialize, Serialize};
use url::Url;
use utoipa::ToSchema;

use crate::params::PageParams;

/// One page of results together with the totals clients need to render
/// pagers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Paginated<T> {
    /// Items on this page.
    pub data: Vec<T>,
    /// Number of items across all pages.
    pub total: u64,
    /// One-based page number.
    pub page: u32,
    /// Requested page size.
    pub page_size: u32,
    /// Number of pages available for `total` items.
    pub total_pages: u32,
    /// Navigation links, present once [`Paginated::with_links`] is applied.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub links: Option<PageLinks>,
}

impl<T> Paginated<T> {
    /// Wrap a page of items.
    #[must_use]
    pub fn new(data: Vec<T>, total: u64, params: PageParams) -> Self {
        let page_size = u64::from(params.page_size());
        let pages = total.div_ceil(page_size);
        Self {
            data,
            total,
            page: params.page(),
            page_size: params.page_size(),
            total_pages: u32::try_from(pages).unwrap_or(u32::MAX),
            links: None,
        }
    }

    /// Slice a complete, ordered result set into the requested page.
    #[must_use]
    pub fn from_full(items: Vec<T>, params: PageParams) -> Self {
        let total = items.len() as u64;
        Self::new(params.slice(items), total, params)
    }

    /// Convert every item while keeping the page metadata.
    #[must_use]
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Paginated<U> {
        Paginated {
            data: self.data.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            page_size: self.page_size,
            total_pages: self.total_pages,
            links: self.links,
        }
    }

    /// Attach navigation links derived from the request URL.
    #[must_use]
    pub fn with_links(mut self, base: &Url) -> Self {
        self.links = Some(PageLinks::for_page(base, &self));
        self
    }

    /// Whether a further page exists.
    #[must_use]
    pub const fn has_next(&self) -> bool {
        self.page < self.total_pages
    }
}

/// Navigation links derived from the request URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PageLinks {
    /// Link to the current page.
    #[serde(rename = "self")]
    pub self_: String,
    /// Link to the following page, when one exists.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
    /// Link to the preceding page, when one exists.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prev: Option<String>,
}

impl PageLinks {
    /// Build links by rewriting the `page` and `pageSize` query parameters
    /// of `base` while keeping every other parameter.
    #[must_use]
    pub fn for_page<T>(base: &Url, page: &Paginated<T>) -> Self {
        let link = |number: u32| with_page(base, number, page.page_size).to_string();
        Self {
            self_: link(page.page),
            next: page.has_next().then(|| link(page.page + 1)),
            prev: (page.page > 1).then(|| link(page.page - 1)),
        }
    }
}

fn with_page(base: &Url, page: u32, page_size: u32) -> Url {
    let retained: Vec<(String, String)> = base
        .query_pairs()
        .filter(|(key, _)| key != "page" && key != "pageSize")
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();
    let mut url = base.clone();
    {
        let mut query = url.query_pairs_mut();
        query.clear();
        for (key, value) in &retained {
            query.append_pair(key, value);
        }
        query.append_pair("page", &page.to_string());
        query.append_pair("pageSize", &page_size.to_string());
    }
    url
}

#[cfg(test)]
mod tests {
    //! Envelope arithmetic and link rewriting.

    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0, 0)]
    #[case(1, 1)]
    #[case(10, 1)]
    #[case(11, 2)]
    fn total_pages_rounds_up(#[case] total: u64, #[case] expected: u32) {
        let params = PageParams::new(Some(1), Some(10)).expect("valid params");
        let page: Paginated<u8> = Paginated::new(Vec::new(), total, params);
        assert_eq!(page.total_pages, expected);
    }

    #[rstest]
    fn from_full_counts_every_item() {
        let params = PageParams::new(Some(2), Some(2)).expect("valid params");
        let page = Paginated::from_full(vec![1, 2, 3, 4, 5], params);
        assert_eq!(page.data, vec![3, 4]);
        assert_eq!(page.total, 5);
        assert!(page.has_next());
    }

    #[rstest]
    fn links_keep_filters_and_step_pages() {
        let base = Url::parse("https://api.test/v1/products?category=FEED&page=2&pageSize=5")
            .expect("valid url");
        let params = PageParams::new(Some(2), Some(5)).expect("valid params");
        let page: Paginated<u8> = Paginated::new(Vec::new(), 12, params);

        let links = PageLinks::for_page(&base, &page);

        assert_eq!(
            links.self_,
            "https://api.test/v1/products?category=FEED&page=2&pageSize=5"
        );
        assert_eq!(
            links.next.as_deref(),
            Some("https://api.test/v1/products?category=FEED&page=3&pageSize=5")
        );
        assert_eq!(
            links.prev.as_deref(),
            Some("https://api.test/v1/products?category=FEED&page=1&pageSize=5")
        );
    }

    #[rstest]
    fn last_page_has_no_next_link() {
        let base = Url::parse("https://api.test/v1/vets").expect("valid url");
        let params = PageParams::new(Some(1), Some(20)).expect("valid params");
        let page = Paginated::new(vec![1_u8], 1, params).with_links(&base);

        let links = page.links.expect("links attached");
        assert!(links.next.is_none());
        assert!(links.prev.is_none());
        assert_eq!(links.self_, "https://api.test/v1/vets?page=1&pageSize=20");
    }
}
