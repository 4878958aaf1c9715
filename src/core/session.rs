//! Per-user analysis state.
//!
//! `Idle -> FilesUploaded -> Merged -> (Searched)*`. A successful submission
//! always lands in `Merged` with fresh data; a failed one changes nothing.

use crate::domain::model::{MergedTable, SearchResult, UploadSet};
use crate::utils::error::{LedgerError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    FilesUploaded,
    Merged,
    Searched,
}

#[derive(Debug, Default)]
pub struct Session {
    uploads: Option<UploadSet>,
    merged: Option<MergedTable>,
    last_search: Option<SearchResult>,
    pending_submit: bool,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> SessionState {
        if self.pending_submit || (self.uploads.is_some() && self.merged.is_none()) {
            SessionState::FilesUploaded
        } else if self.last_search.is_some() {
            SessionState::Searched
        } else if self.merged.is_some() {
            SessionState::Merged
        } else {
            SessionState::Idle
        }
    }

    /// Records a new pair of files. Previously merged data stays readable
    /// until the new files are merged successfully.
    pub fn upload(&mut self, uploads: UploadSet) {
        tracing::debug!(
            "📥 Upload: ledger={}, price={}",
            uploads.ledger.path,
            uploads.price.path
        );
        self.uploads = Some(uploads);
        self.pending_submit = true;
    }

    pub fn uploads(&self) -> Result<&UploadSet> {
        self.uploads.as_ref().ok_or(LedgerError::NoUploads)
    }

    /// Replaces the merged table and drops any earlier search result.
    pub fn commit(&mut self, merged: MergedTable) {
        self.merged = Some(merged);
        self.last_search = None;
        self.pending_submit = false;
    }

    pub fn merged(&self) -> Result<&MergedTable> {
        self.merged.as_ref().ok_or(LedgerError::NotMerged)
    }

    pub fn record_search(&mut self, result: SearchResult) -> Result<&SearchResult> {
        if self.merged.is_none() {
            return Err(LedgerError::NotMerged);
        }
        Ok(self.last_search.insert(result))
    }

    pub fn last_search(&self) -> Option<&SearchResult> {
        self.last_search.as_ref()
    }
}
