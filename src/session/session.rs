use super::config::SessionConfig;
use super::stats::SessionStats;
use crate::audio::{CaptureBackend, CaptureSource, MicrophoneBackend};
use crate::reconcile::{AnalysisSnapshot, SegmentReconciler, TranscriptSegment};
use crate::transport::{ServerMessage, StreamClient};
use anyhow::{Context, Result};
use chrono::Utc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// A capture session that streams microphone audio to the speech backend
/// and reconciles its incremental responses.
///
/// Owns every dependent component for its lifetime: the capture source,
/// the channel, and the reconciler are created with the session and
/// discarded with it. There is no ambient singleton; the caller owns the
/// lifecycle through `start` and `stop`.
pub struct CallSession {
    /// Session configuration
    config: SessionConfig,

    /// WebSocket transport for frames out / events in
    transport: Arc<StreamClient>,

    /// Microphone capture pipeline
    capture: Mutex<CaptureSource>,

    /// Reconciled presentation state
    reconciler: Arc<Mutex<SegmentReconciler>>,

    /// When the session started
    started_at: chrono::DateTime<chrono::Utc>,

    /// Whether the session is currently streaming
    is_running: Arc<AtomicBool>,

    /// Frames handed to the transport
    frames_sent: Arc<AtomicUsize>,

    /// Handle for the frame forwarding task
    audio_task_handle: Mutex<Option<JoinHandle<()>>>,

    /// Handle for the inbound event task
    event_task_handle: Mutex<Option<JoinHandle<()>>>,
}

impl CallSession {
    /// Create a session capturing from the default microphone.
    pub fn new(config: SessionConfig) -> Self {
        Self::with_backend(config, Box::new(MicrophoneBackend::new()))
    }

    /// Create a session with an explicit capture backend.
    pub fn with_backend(config: SessionConfig, backend: Box<dyn CaptureBackend>) -> Self {
        let capture = CaptureSource::new(backend, config.sample_rate, config.frame_size);

        Self {
            config,
            transport: Arc::new(StreamClient::new()),
            capture: Mutex::new(capture),
            reconciler: Arc::new(Mutex::new(SegmentReconciler::new())),
            started_at: Utc::now(),
            is_running: Arc::new(AtomicBool::new(false)),
            frames_sent: Arc::new(AtomicUsize::new(0)),
            audio_task_handle: Mutex::new(None),
            event_task_handle: Mutex::new(None),
        }
    }

    /// Open the channel, acquire the microphone, and start streaming.
    ///
    /// A channel or capture failure aborts startup and is reported once;
    /// no frames are streamed on the failure path.
    pub async fn start(&self) -> Result<()> {
        if self.is_running.load(Ordering::SeqCst) {
            warn!("Session already running");
            return Ok(());
        }

        info!("Starting session: {}", self.config.session_id);

        self.transport
            .open(&self.config.endpoint)
            .await
            .context("Failed to open channel to speech backend")?;

        let event_rx = self
            .transport
            .subscribe()
            .await
            .context("Failed to subscribe to backend events")?;

        let frame_rx = {
            let mut capture = self.capture.lock().await;
            match capture.start().await {
                Ok(rx) => rx,
                Err(e) => {
                    // The session must not begin without the microphone.
                    self.transport.close().await;
                    return Err(e).context("Failed to start audio capture");
                }
            }
        };

        self.is_running.store(true, Ordering::SeqCst);

        // Frame forwarding task: capture -> transport, FIFO, no queueing.
        let transport = Arc::clone(&self.transport);
        let is_running = Arc::clone(&self.is_running);
        let frames_sent = Arc::clone(&self.frames_sent);

        let audio_task = tokio::spawn(async move {
            info!("Frame forwarding task started");

            let mut frame_rx = frame_rx;
            while let Some(frame) = frame_rx.recv().await {
                if !is_running.load(Ordering::SeqCst) {
                    break;
                }

                transport.send_frame(&frame).await;
                frames_sent.fetch_add(1, Ordering::SeqCst);
            }

            info!("Frame forwarding task stopped");
        });

        {
            let mut handle = self.audio_task_handle.lock().await;
            *handle = Some(audio_task);
        }

        // Event task: inbound protocol events -> reconciler.
        let reconciler = Arc::clone(&self.reconciler);

        let event_task = tokio::spawn(async move {
            info!("Event task started");

            let mut event_rx = event_rx;
            while let Some(event) = event_rx.recv().await {
                render_event(&event);
                reconciler.lock().await.apply(event);
            }

            info!("Event task stopped");
        });

        {
            let mut handle = self.event_task_handle.lock().await;
            *handle = Some(event_task);
        }

        info!("Session started successfully");

        Ok(())
    }

    /// Stop streaming, release the microphone, and close the channel.
    /// Idempotent.
    pub async fn stop(&self) -> Result<SessionStats> {
        if !self.is_running.swap(false, Ordering::SeqCst) {
            warn!("Session not running");
            return Ok(self.stats().await);
        }

        info!("Stopping session: {}", self.config.session_id);

        {
            let mut capture = self.capture.lock().await;
            capture.stop().await;
        }

        self.transport.close().await;

        {
            let mut handle = self.audio_task_handle.lock().await;
            if let Some(task) = handle.take() {
                if let Err(e) = task.await {
                    error!("Frame forwarding task panicked: {}", e);
                }
            }
        }

        {
            let mut handle = self.event_task_handle.lock().await;
            if let Some(task) = handle.take() {
                if let Err(e) = task.await {
                    error!("Event task panicked: {}", e);
                }
            }
        }

        info!("Session stopped successfully");

        Ok(self.stats().await)
    }

    /// Current session statistics.
    pub async fn stats(&self) -> SessionStats {
        let duration = Utc::now().signed_duration_since(self.started_at);
        let reconciler = self.reconciler.lock().await;

        SessionStats {
            is_running: self.is_running.load(Ordering::SeqCst),
            started_at: self.started_at,
            duration_secs: duration.num_milliseconds() as f64 / 1000.0,
            frames_sent: self.frames_sent.load(Ordering::SeqCst),
            frames_dropped: self.transport.frames_dropped(),
            segment_count: reconciler.segments().len(),
            objection_count: reconciler.objections().len(),
            error_count: reconciler.errors().len(),
        }
    }

    /// Reconciled transcript so far, in arrival order.
    pub async fn transcript(&self) -> Vec<TranscriptSegment> {
        self.reconciler.lock().await.segments().to_vec()
    }

    /// Latest analysis snapshot.
    pub async fn analysis(&self) -> AnalysisSnapshot {
        self.reconciler.lock().await.analysis().clone()
    }
}

/// Console rendering of inbound events. Stands in for the presentation
/// layer, which owns actual display.
fn render_event(event: &ServerMessage) {
    match event {
        ServerMessage::Transcript {
            text, is_final, ..
        } => {
            if *is_final {
                info!("Transcript: {}", text);
            } else {
                debug!("Transcript (partial): {}", text);
            }
        }
        ServerMessage::Analysis {
            script_location,
            suggestion,
            ..
        } => {
            if let Some(location) = script_location {
                info!("Script location: {}", location);
            }
            if let Some(suggestion) = suggestion {
                info!("Suggestion: {}", suggestion);
            }
        }
        ServerMessage::Objection { text, response } => {
            info!("Objection detected: {} -> {}", text, response);
        }
        ServerMessage::Error { error } => {
            error!("Backend error: {}", error);
        }
    }
}
