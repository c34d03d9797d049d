//! Page arithmetic for the board.

use std::ops::Range;

/// Number of pages needed to show `count` flights, `per_page` at a time.
#[must_use]
pub fn total_pages(count: usize, per_page: usize) -> usize {
    if per_page == 0 {
        return 0;
    }
    count.div_ceil(per_page)
}

/// Index range of `page`, clipped to `count`.
#[must_use]
pub fn page_range(page: usize, per_page: usize, count: usize) -> Range<usize> {
    let start = page.saturating_mul(per_page).min(count);
    let end = start.saturating_add(per_page).min(count);
    start..end
}

/// The flights shown on `page`.
#[must_use]
pub fn page_slice<T>(items: &[T], page: usize, per_page: usize) -> &[T] {
    &items[page_range(page, per_page, items.len())]
}

/// The page after `current`, wrapping around; unchanged with one page or none.
#[must_use]
pub fn next_page(current: usize, total: usize) -> usize {
    if total > 1 {
        (current + 1) % total
    } else {
        current
    }
}

/// Keep `current` when it still exists, otherwise go back to the first page.
#[must_use]
pub fn clamp_page(current: usize, total: usize) -> usize {
    if current < total {
        current
    } else {
        0
    }
}
