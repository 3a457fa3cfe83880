pub mod audio;
pub mod config;
pub mod reconcile;
pub mod session;
pub mod transport;

pub use audio::{
    resample, AudioFrame, CaptureBackend, CaptureBlock, CaptureError, CaptureSource,
    FrameAggregator, MicrophoneBackend,
};
pub use config::Config;
pub use reconcile::{
    segment_key, AnalysisSnapshot, ErrorEvent, ObjectionEvent, SegmentReconciler,
    TranscriptSegment,
};
pub use session::{CallSession, SessionConfig, SessionStats};
pub use transport::{endpoint_url, ConnectionState, ServerMessage, StreamClient, TransportError};
