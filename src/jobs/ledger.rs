//! Job state ledger: notification counts and their persistence.

use tracing::debug;

use crate::config::{ConfigDocument, ConfigStore, JobSpec, ServerPolicy};
use crate::error::NotifyError;

/// Owns the configuration document for the duration of a pass.
///
/// All count mutation goes through here. Counts only ever move forward,
/// and every advance rewrites the whole document through the store's
/// temp-file-and-rename path. A crash between increment and rewrite loses
/// at most that one increment; the document on disk is never half-written.
pub struct JobLedger {
    doc: ConfigDocument,
    store: ConfigStore,
}

impl JobLedger {
    pub fn new(doc: ConfigDocument, store: ConfigStore) -> Self {
        Self { doc, store }
    }

    pub fn servers(&self) -> &ServerPolicy {
        &self.doc.servers
    }

    pub fn job(&self, index: usize) -> &JobSpec {
        &self.doc.jobs[index]
    }

    pub fn len(&self) -> usize {
        self.doc.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.doc.jobs.is_empty()
    }

    /// True when a positive ceiling is configured and the job's count has
    /// reached it. Checked before any fetch so exhausted jobs never touch
    /// the provider.
    pub fn is_exhausted(&self, index: usize) -> bool {
        let max = self.doc.servers.max_notifications;
        max > 0 && self.doc.jobs[index].notified_count >= max
    }

    /// Advance a job's count by exactly one and persist the document.
    ///
    /// The in-memory count moves first. When the rewrite fails the caller
    /// reports it and the pass keeps going with the advanced count.
    pub fn record_success(&mut self, index: usize) -> Result<(), NotifyError> {
        self.doc.jobs[index].notified_count += 1;
        debug!(
            job = index,
            count = self.doc.jobs[index].notified_count,
            "Job #{} notification count advanced to {}",
            index,
            self.doc.jobs[index].notified_count
        );
        self.store.save(&self.doc).map_err(NotifyError::Persistence)
    }
}
