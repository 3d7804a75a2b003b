/// Pagination state for one query: the request (page size and index), the
/// count result and the derived navigation window.
///
/// Page indexes are 1-based everywhere. A page size of zero is rejected so a
/// populated `Page` can never divide by zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    page_size: u32,
    page_index: u32,
    total_count: u64,
    page_count: u32,
    begin: u32,
    end: u32,
    count_failed: bool,
}

impl Default for Page {
    fn default() -> Self {
        Self {
            page_size: 20,
            page_index: 1,
            total_count: 0,
            page_count: 0,
            begin: 1,
            end: 10,
            count_failed: false,
        }
    }
}

impl Page {
    pub fn new(page_index: u32, page_size: u32) -> Self {
        let mut page = Self::default();
        page.set_page_size(page_size);
        page.set_page_index(page_index);
        page
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Zero is ignored, the current size stays in effect.
    pub fn set_page_size(&mut self, page_size: u32) {
        if page_size > 0 {
            self.page_size = page_size;
        }
    }

    pub fn page_index(&self) -> u32 {
        self.page_index
    }

    /// Clamped to at least 1, and to the last page once the count is known.
    pub fn set_page_index(&mut self, page_index: u32) {
        self.page_index = page_index.max(1);
        if self.page_count > 0 && self.page_index > self.page_count {
            self.page_index = self.page_count;
        }
    }

    pub fn total_count(&self) -> u64 {
        self.total_count
    }

    /// Records the count query result, derives the page count, re-clamps the
    /// index and recenters the navigation window around it.
    pub fn set_total_count(&mut self, total_count: u64) {
        self.total_count = total_count;
        self.page_count = total_count.div_ceil(self.page_size as u64) as u32;
        if self.page_count > 0 && self.page_index > self.page_count {
            self.page_index = self.page_count;
        }
        self.recenter();
    }

    pub fn page_count(&self) -> u32 {
        self.page_count
    }

    /// Zero based row offset of the current page.
    pub fn offset(&self) -> u64 {
        (self.page_index as u64 - 1) * self.page_size as u64
    }

    /// First page of the navigation window.
    pub fn begin(&self) -> u32 {
        self.begin
    }

    /// Last page of the navigation window, inclusive.
    pub fn end(&self) -> u32 {
        self.end
    }

    pub fn first_page(&self) -> u32 {
        1
    }

    pub fn last_page(&self) -> u32 {
        self.page_count
    }

    pub fn next_page(&self) -> u32 {
        if self.page_count > 0 && self.page_index >= self.page_count {
            self.page_count
        } else {
            self.page_index + 1
        }
    }

    pub fn previous_page(&self) -> u32 {
        self.page_index.saturating_sub(1).max(1)
    }

    /// Whether the live count failed; the page then holds rows for the
    /// requested window but no trustworthy totals.
    pub fn count_failed(&self) -> bool {
        self.count_failed
    }

    pub(crate) fn mark_count_failed(&mut self) {
        self.count_failed = true;
    }

    /// Slides the begin..=end window so the current index sits in its
    /// middle, pinning at either boundary.
    fn recenter(&mut self) {
        if self.page_count == 0 {
            self.begin = 1;
            return;
        }
        let index = self.page_index as i64;
        let page_count = self.page_count as i64;
        let begin = self.begin as i64;
        let end = (self.end as i64).min(page_count);
        let interval = end - begin;
        let anchor = interval / 2 + 1;
        let mut begin = begin + index - anchor;
        let mut end = end + index - anchor;
        if begin < 1 {
            begin = 1;
            end = interval + 1;
        }
        if end > page_count {
            end = page_count;
            begin = end - interval;
        }
        if begin < 1 {
            begin = 1;
        }
        self.begin = begin as u32;
        self.end = end as u32;
    }
}
