// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::{
    DetailFetch, DocumentDetail, DocumentDetailStore, DocumentId, FocusController, ResultItem,
    ResultSet,
};

/// The rows one view shows, plus the focus and detail derived from them.
/// Each view owns its own pane so a listing never replaces query chunks.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Pane {
    pub(crate) results: ResultSet,
    pub(crate) focus: FocusController,
    focused_row: Option<usize>,
}

impl Pane {
    pub fn results(&self) -> &ResultSet {
        &self.results
    }

    pub fn focus(&self) -> &FocusController {
        &self.focus
    }

    pub fn detail(&self) -> &DocumentDetailStore {
        self.focus.detail()
    }

    /// Row of the result set the current focus was taken from, if any.
    pub fn focused_row(&self) -> Option<usize> {
        self.focus.focused_id()?;
        self.focused_row
    }

    pub fn focused_item(&self) -> Option<&ResultItem> {
        self.results.get(self.focused_row()?)
    }

    /// The accepted detail, but only while something is focused. After focus
    /// is cleared the stored payload no longer describes any visible row.
    pub fn shown_detail(&self) -> Option<&DocumentDetail> {
        self.focus.focused_id()?;
        self.detail().current()
    }

    pub(crate) fn focus_row(&mut self, id: DocumentId, row: Option<usize>) -> DetailFetch {
        self.focused_row = row;
        self.focus.set_focus(id)
    }

    /// Returns whether anything was focused before.
    pub(crate) fn clear_focus(&mut self) -> bool {
        let had_focus = self.focus.focused_id().is_some();
        self.focus.clear();
        self.focused_row = None;
        had_focus
    }
}
