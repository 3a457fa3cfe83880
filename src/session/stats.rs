use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Statistics about a capture session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionStats {
    /// Whether the session is currently streaming
    pub is_running: bool,

    /// When the session started
    pub started_at: DateTime<Utc>,

    /// Total duration in seconds
    pub duration_secs: f64,

    /// Frames handed to the transport
    pub frames_sent: usize,

    /// Frames the transport dropped (channel not open)
    pub frames_dropped: usize,

    /// Reconciled transcript segments so far
    pub segment_count: usize,

    /// Objections detected so far
    pub objection_count: usize,

    /// Backend-reported errors so far
    pub error_count: usize,
}
