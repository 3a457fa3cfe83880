use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::transport::endpoint_url;

/// Configuration for a capture session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Unique session identifier (e.g., "call-2f9d...")
    pub session_id: String,

    /// Target sample rate for outbound audio (the backend expects 16kHz)
    pub sample_rate: u32,

    /// Samples per outbound frame
    pub frame_size: usize,

    /// WebSocket endpoint of the speech backend
    pub endpoint: String,
}

impl SessionConfig {
    /// Derive a session config from the service configuration file.
    pub fn from_config(config: &Config) -> Self {
        Self {
            sample_rate: config.audio.sample_rate,
            frame_size: config.audio.frame_size,
            endpoint: endpoint_url(
                &config.backend.host,
                config.backend.port,
                &config.backend.path,
                config.backend.tls,
            ),
            ..Self::default()
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            session_id: format!("call-{}", uuid::Uuid::new_v4()),
            sample_rate: 16000, // Speech backend expects 16kHz
            frame_size: 4096,
            endpoint: "ws://localhost:8000/ws/audio".to_string(),
        }
    }
}
