//! Page slicing.

use std::ops::Range;

/// Returns the index range of a 1-based page within `len` items.
///
/// Pages past the end produce an empty range. Page 0 is treated as page 1.
pub fn page_range(len: usize, page: usize, per_page: usize) -> Range<usize> {
    let start = page.saturating_sub(1).saturating_mul(per_page).min(len);
    let end = start.saturating_add(per_page).min(len);
    start..end
}

/// Returns the items of a 1-based page.
pub fn paginate<T>(items: &[T], page: usize, per_page: usize) -> &[T] {
    &items[page_range(items.len(), page, per_page)]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pages() {
        let items: Vec<u32> = (1..=25).collect();
        assert_eq!(paginate(&items, 1, 10), &items[0..10]);
        assert_eq!(paginate(&items, 3, 10), &[21, 22, 23, 24, 25]);
        assert!(paginate(&items, 4, 10).is_empty());
    }

    #[test]
    fn test_degenerate_inputs() {
        let items = [1, 2, 3];
        assert_eq!(paginate(&items, 0, 2), &[1, 2]);
        assert!(paginate(&items, 1, 0).is_empty());
        assert!(paginate::<u32>(&[], 1, 10).is_empty());
        assert!(paginate(&items, usize::MAX, usize::MAX).is_empty());
    }
}
