//! Pagination primitives shared by AniLink HTTP endpoints.
//!
//! Two styles are supported:
//!
//! - numbered pages ([`PageParams`] + [`Paginated`]) for directory and
//!   marketplace searches where clients jump between pages;
//! - opaque keyset cursors ([`Cursor`]) for append-only feeds such as
//!   notifications, where offsets drift as new rows arrive.
//!
//! # Example
//!
//! ```
//! use pagination::{PageParams, Paginated};
//!
//! let params = PageParams::new(Some(2), Some(10)).expect("valid params");
//! let page = Paginated::new(vec!["a", "b"], 12, params);
//! assert_eq!(page.total_pages, 2);
//! ```

mod cursor;
mod envelope;
mod params;

pub use cursor::{Cursor, CursorError};
pub use envelope::{PageLinks, Paginated};
pub use params::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE, PageParams, PageParamsError};
