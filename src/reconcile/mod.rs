//! Incremental-event reconciliation
//!
//! The backend re-sends transcript updates for the same utterance window
//! with start times that are close but not bit-identical, and updates can
//! arrive repeatedly or out of order. The reconciler collapses them into
//! one stable record per utterance: rounding the start time to 100ms
//! granularity gives each window a stable key, and applying a message is
//! an idempotent upsert on that key.

use serde::Serialize;
use std::collections::HashMap;

use crate::transport::ServerMessage;

/// One reconciled transcript entry. Identity is the rounded start time;
/// later updates for the same key replace `text` and `is_final` in place.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TranscriptSegment {
    /// Start time rounded to 100ms granularity
    pub key: i64,
    /// Start time in seconds, as first received
    pub start: f64,
    pub text: String,
    pub is_final: bool,
}

/// Latest derived insight. Single slot, last-write-wins per field, no
/// history.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AnalysisSnapshot {
    pub script_location: Option<String>,
    pub key_points: Vec<String>,
    pub suggestion: Option<String>,
}

/// A detected objection with its suggested rebuttal. Immutable once
/// recorded.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ObjectionEvent {
    pub text: String,
    pub response: String,
}

/// A failure reported by the backend. Non-fatal to the session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorEvent {
    pub message: String,
}

/// Derive the segment identity from a start time.
///
/// 100ms granularity: repeated updates for one utterance carry start
/// times that differ in the low decimals, and rounding collapses them
/// while keeping genuinely distinct utterances apart.
pub fn segment_key(start: f64) -> i64 {
    (start * 10.0).round() as i64
}

/// Reconciles inbound protocol events into a stable presentation state.
#[derive(Default)]
pub struct SegmentReconciler {
    segments: Vec<TranscriptSegment>,
    by_key: HashMap<i64, usize>,
    analysis: AnalysisSnapshot,
    objections: Vec<ObjectionEvent>,
    errors: Vec<ErrorEvent>,
}

impl SegmentReconciler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one inbound event. Idempotent for transcript updates:
    /// applying the same message twice leaves the same state as once.
    pub fn apply(&mut self, message: ServerMessage) {
        match message {
            ServerMessage::Transcript {
                start,
                text,
                is_final,
            } => self.apply_transcript(start, text, is_final),

            ServerMessage::Analysis {
                script_location,
                key_points,
                suggestion,
            } => {
                // Partial update: absent fields leave the slot unchanged.
                if let Some(location) = script_location {
                    self.analysis.script_location = Some(location);
                }
                if let Some(points) = key_points {
                    self.analysis.key_points = points;
                }
                if let Some(suggestion) = suggestion {
                    self.analysis.suggestion = Some(suggestion);
                }
            }

            ServerMessage::Objection { text, response } => {
                self.objections.push(ObjectionEvent { text, response });
            }

            ServerMessage::Error { error } => {
                self.errors.push(ErrorEvent { message: error });
            }
        }
    }

    fn apply_transcript(&mut self, start: f64, text: String, is_final: bool) {
        let key = segment_key(start);
        // The upstream final flag is unreliable on its own; a trailing
        // sentence terminator also marks the segment final.
        let is_final = is_final || ends_sentence(&text);

        match self.by_key.get(&key) {
            Some(&index) => {
                let segment = &mut self.segments[index];
                segment.text = text;
                segment.is_final = is_final;
            }
            None => {
                // Insertion order is arrival order, not start-time order.
                self.by_key.insert(key, self.segments.len());
                self.segments.push(TranscriptSegment {
                    key,
                    start,
                    text,
                    is_final,
                });
            }
        }
    }

    /// Reconciled segments in arrival order.
    pub fn segments(&self) -> &[TranscriptSegment] {
        &self.segments
    }

    pub fn analysis(&self) -> &AnalysisSnapshot {
        &self.analysis
    }

    pub fn objections(&self) -> &[ObjectionEvent] {
        &self.objections
    }

    pub fn errors(&self) -> &[ErrorEvent] {
        &self.errors
    }
}

fn ends_sentence(text: &str) -> bool {
    text.ends_with(['.', '!', '?'])
}
