use thiserror::Error;
use tokio::sync::mpsc;

/// A raw block of mono samples at the device's native rate, as delivered
/// by the capture backend's periodic callback.
#[derive(Debug, Clone)]
pub struct CaptureBlock {
    /// Mono samples (first channel of an interleaved device)
    pub samples: Vec<f32>,
    /// Native sample rate of the device in Hz
    pub sample_rate: u32,
}

/// Errors that abort session start. Steady-state capture problems are
/// logged and absorbed, not surfaced here.
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("microphone access denied")]
    PermissionDenied,

    #[error("no audio input device available")]
    DeviceUnavailable,

    #[error("audio backend error: {0}")]
    Backend(String),
}

/// Audio capture backend trait
///
/// Implementations own the device lifecycle and deliver raw native-rate
/// blocks over a channel. The microphone backend is the production
/// implementation; tests drive the pipeline with scripted blocks instead.
#[async_trait::async_trait]
pub trait CaptureBackend: Send + Sync {
    /// Acquire the device and start the periodic capture callback.
    ///
    /// Returns a channel receiver that will receive raw sample blocks.
    async fn start(&mut self) -> Result<mpsc::Receiver<CaptureBlock>, CaptureError>;

    /// Release the device. Idempotent.
    async fn stop(&mut self);

    /// Check if the backend is currently capturing
    fn is_capturing(&self) -> bool;

    /// Get backend name for logging
    fn name(&self) -> &str;
}
