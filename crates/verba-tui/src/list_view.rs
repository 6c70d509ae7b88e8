// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

//! Windowed list geometry. Only rows inside the viewport (plus a small
//! overscan margin) are ever produced, so scrolling a list of thousands of
//! items costs the same as scrolling a list of twenty.

use std::ops::Range;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisibleRow {
    pub index: usize,
    /// Offset of the row's first line from the top of the viewport. Negative
    /// for overscan rows above the viewport.
    pub top: isize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListView {
    item_count: usize,
    item_size: usize,
    height: usize,
    overscan: usize,
    scroll_offset: usize,
}

impl Default for ListView {
    fn default() -> Self {
        Self::new(1, 3)
    }
}

impl ListView {
    pub fn new(item_size: usize, overscan: usize) -> Self {
        Self {
            item_count: 0,
            item_size: item_size.max(1),
            height: 0,
            overscan,
            scroll_offset: 0,
        }
    }

    pub fn item_count(&self) -> usize {
        self.item_count
    }

    pub fn item_size(&self) -> usize {
        self.item_size
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn overscan(&self) -> usize {
        self.overscan
    }

    pub fn scroll_offset(&self) -> usize {
        self.scroll_offset
    }

    pub fn set_item_count(&mut self, item_count: usize) {
        self.item_count = item_count;
        self.clamp_scroll();
    }

    pub fn set_height(&mut self, height: usize) {
        self.height = height;
        self.clamp_scroll();
    }

    pub fn max_scroll(&self) -> usize {
        self.content_height().saturating_sub(self.height)
    }

    pub fn scroll_to(&mut self, offset: usize) {
        self.scroll_offset = offset.min(self.max_scroll());
    }

    pub fn scroll_by(&mut self, delta: isize) {
        let target = self.scroll_offset.saturating_add_signed(delta);
        self.scroll_to(target);
    }

    /// Item indices to realize: those intersecting the viewport widened by
    /// `overscan` on both sides and clamped to the collection.
    pub fn visible_range(&self) -> Range<usize> {
        if self.item_count == 0 {
            return 0..0;
        }
        let first = (self.scroll_offset / self.item_size).min(self.item_count);
        let bottom = self.scroll_offset.saturating_add(self.height);
        let last = bottom.div_ceil(self.item_size).min(self.item_count);

        let start = first.saturating_sub(self.overscan);
        let end = last.saturating_add(self.overscan).min(self.item_count);
        start..end
    }

    pub fn rows(&self) -> impl Iterator<Item = VisibleRow> + '_ {
        self.visible_range().map(move |index| VisibleRow {
            index,
            top: (index * self.item_size) as isize - self.scroll_offset as isize,
        })
    }

    /// Invoke `render` once for every realized row, in order.
    pub fn render_with<T, F>(&self, render: F) -> Vec<T>
    where
        F: FnMut(VisibleRow) -> T,
    {
        self.rows().map(render).collect()
    }

    /// Index of the item under viewport line `y`, if any.
    pub fn row_at(&self, y: usize) -> Option<usize> {
        if y >= self.height {
            return None;
        }
        let index = (self.scroll_offset + y) / self.item_size;
        (index < self.item_count).then_some(index)
    }

    /// Scroll the least amount needed to bring `index` fully into view.
    pub fn ensure_visible(&mut self, index: usize) {
        if index >= self.item_count {
            return;
        }
        let top = index * self.item_size;
        let bottom = top + self.item_size;
        if top < self.scroll_offset {
            self.scroll_to(top);
        } else if bottom > self.scroll_offset + self.height {
            self.scroll_to(bottom.saturating_sub(self.height));
        }
    }

    fn content_height(&self) -> usize {
        self.item_count.saturating_mul(self.item_size)
    }

    fn clamp_scroll(&mut self) {
        self.scroll_offset = self.scroll_offset.min(self.max_scroll());
    }
}
