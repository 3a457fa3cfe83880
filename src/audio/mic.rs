// Microphone capture backend using cpal
//
// cpal streams are not Send, so the stream lives on a dedicated thread
// for the whole capture. The thread owns the device handle and drops it
// on every exit path; raw blocks are handed off through a bounded channel
// and a block that cannot be queued is dropped (real-time loss).

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, info, warn};

use super::backend::{CaptureBackend, CaptureBlock, CaptureError};

/// Queue depth for raw blocks between the audio thread and the pipeline.
const BLOCK_QUEUE_DEPTH: usize = 32;

/// Default-input microphone backend.
pub struct MicrophoneBackend {
    stop_flag: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
    capturing: bool,
}

impl MicrophoneBackend {
    pub fn new() -> Self {
        Self {
            stop_flag: Arc::new(AtomicBool::new(false)),
            thread: None,
            capturing: false,
        }
    }
}

impl Default for MicrophoneBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl CaptureBackend for MicrophoneBackend {
    async fn start(&mut self) -> Result<mpsc::Receiver<CaptureBlock>, CaptureError> {
        if self.capturing {
            return Err(CaptureError::Backend("already capturing".into()));
        }

        let (block_tx, block_rx) = mpsc::channel(BLOCK_QUEUE_DEPTH);
        let (ready_tx, ready_rx) = oneshot::channel();

        self.stop_flag.store(false, Ordering::SeqCst);
        let stop_flag = Arc::clone(&self.stop_flag);

        let thread = std::thread::spawn(move || {
            run_capture_thread(block_tx, ready_tx, stop_flag);
        });

        // The thread reports exactly one startup result before entering
        // its capture loop.
        match ready_rx.await {
            Ok(Ok(sample_rate)) => {
                info!("Microphone capture started ({}Hz native)", sample_rate);
                self.thread = Some(thread);
                self.capturing = true;
                Ok(block_rx)
            }
            Ok(Err(e)) => {
                let _ = thread.join();
                Err(e)
            }
            Err(_) => {
                let _ = thread.join();
                Err(CaptureError::Backend("capture thread exited early".into()))
            }
        }
    }

    async fn stop(&mut self) {
        if !self.capturing {
            return;
        }

        info!("Stopping microphone capture");
        self.stop_flag.store(true, Ordering::SeqCst);

        if let Some(handle) = self.thread.take() {
            let join = tokio::task::spawn_blocking(move || handle.join());
            if let Ok(Err(_)) = join.await {
                error!("Capture thread panicked");
            }
        }

        self.capturing = false;
        info!("Microphone capture stopped");
    }

    fn is_capturing(&self) -> bool {
        self.capturing
    }

    fn name(&self) -> &str {
        "cpal microphone"
    }
}

/// Body of the capture thread: open the default input device, run the
/// stream until the stop flag is set, then drop it (releasing the device).
fn run_capture_thread(
    block_tx: mpsc::Sender<CaptureBlock>,
    ready_tx: oneshot::Sender<Result<u32, CaptureError>>,
    stop_flag: Arc<AtomicBool>,
) {
    let host = cpal::default_host();

    let device = match host.default_input_device() {
        Some(device) => device,
        None => {
            let _ = ready_tx.send(Err(CaptureError::DeviceUnavailable));
            return;
        }
    };

    let supported = match device.default_input_config() {
        Ok(config) => config,
        Err(e) => {
            let _ = ready_tx.send(Err(map_config_error(e)));
            return;
        }
    };

    let sample_rate = supported.sample_rate().0;
    let channels = supported.channels() as usize;
    let sample_format = supported.sample_format();
    let config: cpal::StreamConfig = supported.into();

    debug!(
        "Input device: {} ({}Hz, {} channels, {:?})",
        device.name().unwrap_or_else(|_| "unknown".into()),
        sample_rate,
        channels,
        sample_format
    );

    let err_fn = |e| error!("Audio stream error: {}", e);

    let stream = match sample_format {
        cpal::SampleFormat::F32 => device.build_input_stream(
            &config,
            move |data: &[f32], _: &cpal::InputCallbackInfo| {
                forward_block(&block_tx, data.to_vec(), channels, sample_rate);
            },
            err_fn,
            None,
        ),
        cpal::SampleFormat::I16 => device.build_input_stream(
            &config,
            move |data: &[i16], _: &cpal::InputCallbackInfo| {
                let samples = data.iter().map(|&s| s as f32 / i16::MAX as f32).collect();
                forward_block(&block_tx, samples, channels, sample_rate);
            },
            err_fn,
            None,
        ),
        cpal::SampleFormat::U16 => device.build_input_stream(
            &config,
            move |data: &[u16], _: &cpal::InputCallbackInfo| {
                let samples = data
                    .iter()
                    .map(|&s| (s as f32 - 32768.0) / 32768.0)
                    .collect();
                forward_block(&block_tx, samples, channels, sample_rate);
            },
            err_fn,
            None,
        ),
        other => {
            let _ = ready_tx.send(Err(CaptureError::Backend(format!(
                "unsupported sample format: {:?}",
                other
            ))));
            return;
        }
    };

    let stream = match stream {
        Ok(stream) => stream,
        Err(e) => {
            let _ = ready_tx.send(Err(map_build_error(e)));
            return;
        }
    };

    if let Err(e) = stream.play() {
        let _ = ready_tx.send(Err(CaptureError::Backend(e.to_string())));
        return;
    }

    let _ = ready_tx.send(Ok(sample_rate));

    while !stop_flag.load(Ordering::SeqCst) {
        std::thread::sleep(Duration::from_millis(50));
    }

    // Dropping the stream here releases the device.
    drop(stream);
}

/// Extract the first channel of an interleaved block and hand it to the
/// pipeline. The callback runs on the real-time audio thread, so a full
/// queue means the block is dropped rather than blocking.
fn forward_block(
    block_tx: &mpsc::Sender<CaptureBlock>,
    samples: Vec<f32>,
    channels: usize,
    sample_rate: u32,
) {
    let mono: Vec<f32> = if channels > 1 {
        samples.iter().step_by(channels).copied().collect()
    } else {
        samples
    };

    if mono.is_empty() {
        return;
    }

    let rms = (mono.iter().map(|s| s * s).sum::<f32>() / mono.len() as f32).sqrt();
    debug!("Captured block: {} samples, level {:.4}", mono.len(), rms);

    let block = CaptureBlock {
        samples: mono,
        sample_rate,
    };

    if block_tx.try_send(block).is_err() {
        warn!("Capture queue full, dropping block");
    }
}

fn map_config_error(e: cpal::DefaultStreamConfigError) -> CaptureError {
    match e {
        cpal::DefaultStreamConfigError::DeviceNotAvailable => CaptureError::DeviceUnavailable,
        other => classify_backend_error(other.to_string()),
    }
}

fn map_build_error(e: cpal::BuildStreamError) -> CaptureError {
    match e {
        cpal::BuildStreamError::DeviceNotAvailable => CaptureError::DeviceUnavailable,
        other => classify_backend_error(other.to_string()),
    }
}

/// OS permission failures surface as backend-specific errors; classify by
/// message so the caller sees `PermissionDenied` rather than an opaque
/// string.
fn classify_backend_error(message: String) -> CaptureError {
    let lower = message.to_lowercase();
    if lower.contains("permission") || lower.contains("denied") {
        CaptureError::PermissionDenied
    } else {
        CaptureError::Backend(message)
    }
}
