//! Capture session management
//!
//! This module provides the `CallSession` abstraction that manages:
//! - Microphone capture and conversion to 16kHz mono frames
//! - Streaming frames to the speech backend over one WebSocket
//! - Reconciling inbound transcript/analysis events
//! - Session statistics and lifecycle

mod config;
mod session;
mod stats;

pub use config::SessionConfig;
pub use session::CallSession;
pub use stats::SessionStats;
