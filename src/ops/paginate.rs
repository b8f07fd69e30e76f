/// Page sizes offered by the UI
pub const PAGE_SIZES: [usize; 4] = [10, 25, 50, 100];

pub const DEFAULT_PAGE_SIZE: usize = 25;

/// How many page numbers to show on each side of the current page
const WINDOW_RADIUS: usize = 2;

/// Page size and 1-based current page over a filtered row list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pager {
    page_size: usize,
    current_page: usize,
}

impl Default for Pager {
    fn default() -> Self {
        Pager::new(DEFAULT_PAGE_SIZE)
    }
}

/// One entry in the page navigation strip
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageButton {
    Page { number: usize, current: bool },
    Ellipsis,
}

impl Pager {
    pub fn new(page_size: usize) -> Self {
        Pager {
            page_size: page_size.max(1),
            current_page: 1,
        }
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    /// `ceil(total / page_size)`; zero rows means zero pages
    pub fn total_pages(&self, total: usize) -> usize {
        total.div_ceil(self.page_size)
    }

    /// Change the page size and go back to page 1
    pub fn set_page_size(&mut self, page_size: usize) {
        self.page_size = page_size.max(1);
        self.current_page = 1;
    }

    /// Step to the next size in [`PAGE_SIZES`], wrapping around
    pub fn cycle_page_size(&mut self) {
        let next = PAGE_SIZES
            .iter()
            .copied()
            .find(|&size| size > self.page_size)
            .unwrap_or(PAGE_SIZES[0]);
        self.set_page_size(next);
    }

    pub fn reset(&mut self) {
        self.current_page = 1;
    }

    /// Go to `page`, clamped to `[1, max(1, total_pages)]`
    pub fn go_to(&mut self, page: usize, total: usize) {
        let last = self.total_pages(total).max(1);
        self.current_page = page.clamp(1, last);
    }

    pub fn next(&mut self, total: usize) {
        self.go_to(self.current_page + 1, total);
    }

    pub fn prev(&mut self, total: usize) {
        self.go_to(self.current_page.saturating_sub(1), total);
    }

    /// Re-clamp after the row count changed
    pub fn clamp(&mut self, total: usize) {
        self.go_to(self.current_page, total);
    }

    /// Index range of the current page within `total` rows
    pub fn bounds(&self, total: usize) -> std::ops::Range<usize> {
        let start = ((self.current_page - 1) * self.page_size).min(total);
        let end = (start + self.page_size).min(total);
        start..end
    }

    /// The current page's slice of `rows`
    pub fn slice<'a, T>(&self, rows: &'a [T]) -> &'a [T] {
        &rows[self.bounds(rows.len())]
    }

    /// `Showing 26-30 of 30 tasks`; `Showing 0-0 of 0 tasks` when empty
    pub fn range_text(&self, total: usize) -> String {
        let range = self.bounds(total);
        let first = if range.is_empty() { 0 } else { range.start + 1 };
        format!("Showing {}-{} of {} tasks", first, range.end, total)
    }

    /// Page strip: first page, current +/- 2, last page, with gaps as
    /// ellipses. Empty when everything fits on one page.
    pub fn buttons(&self, total: usize) -> Vec<PageButton> {
        let pages = self.total_pages(total);
        if pages <= 1 {
            return Vec::new();
        }
        let current = self.current_page.min(pages);
        let start = current.saturating_sub(WINDOW_RADIUS).max(1);
        let end = (current + WINDOW_RADIUS).min(pages);
        let page = |number| PageButton::Page {
            number,
            current: number == current,
        };

        let mut buttons = Vec::new();
        if start > 1 {
            buttons.push(page(1));
            if start > 2 {
                buttons.push(PageButton::Ellipsis);
            }
        }
        buttons.extend((start..=end).map(page));
        if end < pages {
            if end < pages - 1 {
                buttons.push(PageButton::Ellipsis);
            }
            buttons.push(page(pages));
        }
        buttons
    }
}
