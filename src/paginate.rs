//! Fixed-size pages of raw trips.

use crate::filter::FilteredView;
use crate::record::TripRecord;

pub const DEFAULT_PAGE_SIZE: usize = 5;

/// Up to `size` records starting at `offset`. Past the end, returns fewer
/// records or none.
pub fn window<'a>(view: &FilteredView<'a>, offset: usize, size: usize) -> Vec<&'a TripRecord> {
    (offset..offset.saturating_add(size))
        .map_while(|i| view.get(i))
        .collect()
}

/// Walks a view page by page.
#[derive(Debug)]
pub struct Pager<'v, 'a> {
    view: &'v FilteredView<'a>,
    offset: usize,
    size: usize,
}

impl<'v, 'a> Pager<'v, 'a> {
    /// A `size` of zero is treated as [`DEFAULT_PAGE_SIZE`].
    pub fn new(view: &'v FilteredView<'a>, size: usize) -> Self {
        let size = if size == 0 { DEFAULT_PAGE_SIZE } else { size };
        Self {
            view,
            offset: 0,
            size,
        }
    }

    /// Index of the first record of the next page.
    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn is_exhausted(&self) -> bool {
        self.offset >= self.view.len()
    }
}

impl<'a> Iterator for Pager<'_, 'a> {
    type Item = Vec<&'a TripRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.is_exhausted() {
            return None;
        }
        let page = window(self.view, self.offset, self.size);
        self.offset += page.len();
        Some(page)
    }
}
