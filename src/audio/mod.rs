pub mod backend;
pub mod capture;
pub mod frame;
pub mod mic;
pub mod resample;

pub use backend::{CaptureBackend, CaptureBlock, CaptureError};
pub use capture::CaptureSource;
pub use frame::{AudioFrame, FrameAggregator};
pub use mic::MicrophoneBackend;
pub use resample::resample;
