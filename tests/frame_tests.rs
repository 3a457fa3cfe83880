// Unit tests for fixed-size frame aggregation.
//
// The aggregator must emit identical frames regardless of how the input
// stream is split across push calls, and must never emit a short frame.

use pitch_assist::{AudioFrame, FrameAggregator};

fn ramp(len: usize) -> Vec<f32> {
    (0..len).map(|i| i as f32 / 100.0).collect()
}

#[test]
fn test_exact_frame_boundary() {
    let mut agg = FrameAggregator::new(4, 16000);
    let frames = agg.push(&ramp(4));

    assert_eq!(frames.len(), 1);
    assert_eq!(frames[0].samples.len(), 4);
    assert_eq!(frames[0].sample_rate, 16000);
    assert_eq!(agg.buffered(), 0);
}

#[test]
fn test_remainder_is_retained_not_emitted() {
    let mut agg = FrameAggregator::new(4, 16000);

    let frames = agg.push(&ramp(6));
    assert_eq!(frames.len(), 1, "Only the complete frame is emitted");
    assert_eq!(agg.buffered(), 2);

    // The retained remainder completes the next frame.
    let frames = agg.push(&[9.0, 9.0]);
    assert_eq!(frames.len(), 1);
    assert_eq!(agg.buffered(), 0);
    assert_eq!(frames[0].samples[2..], [9.0, 9.0]);
}

#[test]
fn test_single_push_can_emit_multiple_frames() {
    let mut agg = FrameAggregator::new(3, 16000);
    let frames = agg.push(&ramp(10));

    assert_eq!(frames.len(), 3);
    assert_eq!(agg.buffered(), 1);
}

#[test]
fn test_split_invariance_over_chunking() {
    let stream = ramp(100);

    let mut whole = FrameAggregator::new(16, 16000);
    let whole_frames = whole.push(&stream);

    let mut chunked = FrameAggregator::new(16, 16000);
    let mut chunked_frames = Vec::new();
    for chunk in stream.chunks(7) {
        chunked_frames.extend(chunked.push(chunk));
    }

    assert_eq!(
        whole_frames, chunked_frames,
        "Frame sequence must not depend on input chunking"
    );
    assert_eq!(whole.buffered(), chunked.buffered());
}

#[test]
fn test_reset_discards_partial_buffer() {
    let mut agg = FrameAggregator::new(4, 16000);

    agg.push(&ramp(3));
    assert_eq!(agg.buffered(), 3);

    agg.reset();
    assert_eq!(agg.buffered(), 0);

    // Samples buffered before reset never appear in later frames.
    let frames = agg.push(&[5.0, 5.0, 5.0, 5.0]);
    assert_eq!(frames.len(), 1);
    assert_eq!(frames[0].samples, vec![5.0, 5.0, 5.0, 5.0]);
}

#[test]
fn test_frame_wire_encoding_is_little_endian_f32() {
    let frame = AudioFrame {
        samples: vec![1.0, -1.0, 0.5],
        sample_rate: 16000,
    };

    let bytes = frame.to_le_bytes();
    assert_eq!(bytes.len(), 12, "4 bytes per sample, no header");

    let mut expected = Vec::new();
    expected.extend_from_slice(&1.0f32.to_le_bytes());
    expected.extend_from_slice(&(-1.0f32).to_le_bytes());
    expected.extend_from_slice(&0.5f32.to_le_bytes());
    assert_eq!(bytes, expected);
}
