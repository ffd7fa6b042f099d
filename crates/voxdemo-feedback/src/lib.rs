//! Fire-and-forget feedback submission.
//!
//! Independent of the call lifecycle: a single JSON POST of the user's notes
//! to a configured webhook URL. Success is any 2xx; failures are surfaced to
//! the caller and never retried.

use tracing::{info, warn};
use voxdemo_core::{FeedbackNote, VoxdemoError, VoxdemoResult};

/// Sends [`FeedbackNote`]s to a webhook.
pub struct FeedbackSubmitter {
    http: reqwest::Client,
    webhook_url: String,
}

impl FeedbackSubmitter {
    /// Creates a submitter targeting `webhook_url`.
    pub fn new(webhook_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            webhook_url: webhook_url.into(),
        }
    }

    /// Submits `notes` for `agent_id`.
    ///
    /// Blank notes are rejected before any request goes out. The caller
    /// should clear its note buffer only when this returns `Ok`.
    pub async fn submit(&self, agent_id: &str, notes: &str) -> VoxdemoResult<()> {
        if notes.trim().is_empty() {
            return Err(VoxdemoError::Feedback(
                "Please write some notes before submitting".into(),
            ));
        }

        let note = FeedbackNote::new(agent_id, notes);
        let resp = self
            .http
            .post(&self.webhook_url)
            .json(&note)
            .send()
            .await
            .map_err(|e| VoxdemoError::Feedback(format!("Failed to submit feedback: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            warn!(status = %status, "feedback webhook rejected the submission");
            return Err(VoxdemoError::Feedback(format!(
                "Failed to submit feedback: {status}"
            )));
        }

        info!(agent_id = %agent_id, notes_len = notes.len(), "feedback submitted");
        Ok(())
    }
}
