//! Shared query helpers for Diesel repository implementations.

use pagination::PageParams;

/// Build an `ILIKE` pattern that matches `needle` anywhere in a column.
///
/// Wildcards in the needle are escaped so user input is matched literally.
pub fn contains_pattern(needle: &str) -> String {
    let mut pattern = String::with_capacity(needle.len() + 2);
    pattern.push('%');
    for ch in needle.trim().chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

/// Offset and limit for a page, as Postgres expects them.
pub fn page_window(page: PageParams) -> (i64, i64) {
    (i64::try_from(page.offset()).unwrap_or(i64::MAX), page.limit())
}

/// Convert a `COUNT(*)` result into an unsigned total.
pub fn count_to_u64(count: i64) -> u64 {
    u64::try_from(count).unwrap_or_default()
}
