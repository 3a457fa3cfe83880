// Capture pipeline: raw device blocks -> target-rate frames
//
// CaptureSource drives a capture backend and, for every raw block it
// delivers, resamples to the target rate and feeds the frame aggregator.
// Complete frames come out over a channel; the partial remainder is
// discarded on stop, never sent.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use super::backend::{CaptureBackend, CaptureError};
use super::frame::{AudioFrame, FrameAggregator};
use super::resample::resample;

pub struct CaptureSource {
    backend: Box<dyn CaptureBackend>,
    target_sample_rate: u32,
    frame_size: usize,
    is_capturing: Arc<AtomicBool>,
    pipeline_task: Option<JoinHandle<()>>,
}

impl CaptureSource {
    pub fn new(backend: Box<dyn CaptureBackend>, target_sample_rate: u32, frame_size: usize) -> Self {
        Self {
            backend,
            target_sample_rate,
            frame_size,
            is_capturing: Arc::new(AtomicBool::new(false)),
            pipeline_task: None,
        }
    }

    /// Acquire the device and start producing frames.
    ///
    /// Fails with `PermissionDenied` or `DeviceUnavailable` when the
    /// microphone cannot be acquired; both are fatal to session start.
    pub async fn start(&mut self) -> Result<mpsc::Receiver<AudioFrame>, CaptureError> {
        if self.is_capturing.load(Ordering::SeqCst) {
            return Err(CaptureError::Backend("already capturing".into()));
        }

        let mut block_rx = self.backend.start().await?;
        self.is_capturing.store(true, Ordering::SeqCst);

        info!(
            "Capture pipeline started via {} ({}Hz, frame size {})",
            self.backend.name(),
            self.target_sample_rate,
            self.frame_size
        );

        let (frame_tx, frame_rx) = mpsc::channel(16);
        let target_rate = self.target_sample_rate;
        let mut aggregator = FrameAggregator::new(self.frame_size, target_rate);
        let is_capturing = Arc::clone(&self.is_capturing);

        let task = tokio::spawn(async move {
            while let Some(block) = block_rx.recv().await {
                if !is_capturing.load(Ordering::SeqCst) {
                    break;
                }

                let converted = resample(&block.samples, block.sample_rate, target_rate);

                for frame in aggregator.push(&converted) {
                    // Frames produced after stop are dropped, not queued.
                    if !is_capturing.load(Ordering::SeqCst) {
                        break;
                    }
                    if frame_tx.send(frame).await.is_err() {
                        return;
                    }
                }
            }

            let remainder = aggregator.buffered();
            if remainder > 0 {
                debug!("Discarding {} buffered samples on stop", remainder);
            }
            aggregator.reset();
        });

        self.pipeline_task = Some(task);

        Ok(frame_rx)
    }

    /// Stop capturing and release the device. Idempotent; any partial
    /// frame is discarded.
    pub async fn stop(&mut self) {
        if !self.is_capturing.swap(false, Ordering::SeqCst) {
            return;
        }

        self.backend.stop().await;

        if let Some(task) = self.pipeline_task.take() {
            let _ = task.await;
        }

        info!("Capture pipeline stopped");
    }

    pub fn is_capturing(&self) -> bool {
        self.is_capturing.load(Ordering::SeqCst)
    }
}
