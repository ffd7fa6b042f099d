//! Core types and error definitions shared across the voxdemo crates.
//!
//! # Main types
//!
//! - [`VoxdemoError`] — Unified error enum for all voxdemo subsystems.
//! - [`VoxdemoResult`] — Convenience alias for `Result<T, VoxdemoError>`.
//! - [`TranscriptRole`] — Who spoke a transcript turn (agent or user).
//! - [`TranscriptEntry`] — One turn of speech-to-text output.
//! - [`FeedbackNote`] — A free-text feedback submission payload.

/// Shareable demo-link construction.
pub mod link;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

// --- Error types ---

/// Top-level error type for the voxdemo toolkit.
///
/// Each variant corresponds to a subsystem that can produce errors.
#[derive(Debug, thiserror::Error)]
pub enum VoxdemoError {
    /// An error in the call lifecycle (coordinator, client adapter).
    #[error("Call error: {0}")]
    Call(String),

    /// An error from the backend call proxy (network, HTTP, malformed body).
    #[error("{0}")]
    Proxy(String),

    /// An error from the provider REST API (legacy direct path).
    #[error("Provider error: {0}")]
    Provider(String),

    /// An error submitting feedback to the webhook.
    #[error("Feedback error: {0}")]
    Feedback(String),

    /// An error in configuration parsing, validation, or credentials.
    #[error("Config error: {0}")]
    Config(String),

    /// An error from an outbound HTTP request.
    #[error("HTTP error: {0}")]
    Http(String),

    /// A JSON serialization or deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A standard I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A convenience `Result` alias using [`VoxdemoError`].
pub type VoxdemoResult<T> = Result<T, VoxdemoError>;

// --- Transcript types ---

/// The speaker of a [`TranscriptEntry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TranscriptRole {
    /// The conversational voice-AI agent.
    Agent,
    /// The human caller.
    User,
}

impl fmt::Display for TranscriptRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TranscriptRole::Agent => write!(f, "agent"),
            TranscriptRole::User => write!(f, "user"),
        }
    }
}

/// One turn of speech-to-text output, attributed to either side of the call.
///
/// Entries are ephemeral and kept only for display. They are forwarded in
/// arrival order and never reordered or deduplicated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptEntry {
    /// Who spoke this turn.
    pub role: TranscriptRole,
    /// The transcribed text.
    pub content: String,
    /// When the provider produced this turn.
    pub timestamp: DateTime<Utc>,
}

impl TranscriptEntry {
    /// Creates an entry timestamped now.
    pub fn new(role: TranscriptRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }
}

// --- Feedback types ---

/// A free-text feedback submission, serialized with the webhook's camelCase
/// field names. Constructed once per submission and not retained afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackNote {
    /// The agent the feedback refers to.
    #[serde(rename = "agentId")]
    pub agent_id: String,
    /// The user's notes, verbatim.
    pub notes: String,
    /// Submission time (ISO-8601 on the wire).
    pub timestamp: DateTime<Utc>,
}

impl FeedbackNote {
    /// Creates a note timestamped now.
    pub fn new(agent_id: impl Into<String>, notes: impl Into<String>) -> Self {
        Self {
            agent_id: agent_id.into(),
            notes: notes.into(),
            timestamp: Utc::now(),
        }
    }
}
