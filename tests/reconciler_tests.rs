// Tests for the segment reconciler: idempotent, order-tolerant merging of
// repeated transcript updates, analysis snapshots, and appended events.

use pitch_assist::{segment_key, SegmentReconciler, ServerMessage};

fn transcript(start: f64, text: &str, is_final: bool) -> ServerMessage {
    ServerMessage::Transcript {
        start,
        text: text.to_string(),
        is_final,
    }
}

#[test]
fn test_segment_key_rounds_to_100ms() {
    assert_eq!(segment_key(1.01), 10);
    assert_eq!(segment_key(1.04), 10);
    assert_eq!(segment_key(1.06), 11);
    assert_eq!(segment_key(0.0), 0);
}

#[test]
fn test_applying_same_message_twice_is_idempotent() {
    let mut reconciler = SegmentReconciler::new();

    reconciler.apply(transcript(2.5, "hello world", false));
    let once: Vec<_> = reconciler.segments().to_vec();

    reconciler.apply(transcript(2.5, "hello world", false));

    assert_eq!(reconciler.segments(), once.as_slice());
    assert_eq!(reconciler.segments().len(), 1);
}

#[test]
fn test_nearby_start_times_merge_into_one_segment() {
    let mut reconciler = SegmentReconciler::new();

    // 1.01 and 1.04 both round to key 10: same utterance window.
    reconciler.apply(transcript(1.01, "I was", false));
    reconciler.apply(transcript(1.04, "I was thinking", false));

    assert_eq!(reconciler.segments().len(), 1);
    assert_eq!(reconciler.segments()[0].text, "I was thinking");
}

#[test]
fn test_distinct_start_times_stay_separate() {
    let mut reconciler = SegmentReconciler::new();

    // 1.04 -> 10 but 1.06 -> 11: distinct windows.
    reconciler.apply(transcript(1.04, "first", false));
    reconciler.apply(transcript(1.06, "second", false));

    assert_eq!(reconciler.segments().len(), 2);
}

#[test]
fn test_insertion_order_is_arrival_order() {
    let mut reconciler = SegmentReconciler::new();

    reconciler.apply(transcript(5.0, "later utterance", false));
    reconciler.apply(transcript(1.0, "earlier utterance", false));

    assert_eq!(reconciler.segments()[0].text, "later utterance");
    assert_eq!(reconciler.segments()[1].text, "earlier utterance");
}

#[test]
fn test_finality_from_flag_or_punctuation() {
    let mut reconciler = SegmentReconciler::new();

    reconciler.apply(transcript(1.0, "Hello there.", false));
    reconciler.apply(transcript(2.0, "Hello", true));
    reconciler.apply(transcript(3.0, "Hello", false));

    assert!(reconciler.segments()[0].is_final, "Trailing period marks final");
    assert!(reconciler.segments()[1].is_final, "Explicit flag marks final");
    assert!(!reconciler.segments()[2].is_final);
}

#[test]
fn test_later_update_overwrites_text_and_finality() {
    let mut reconciler = SegmentReconciler::new();

    reconciler.apply(transcript(4.0, "Done.", false));
    assert!(reconciler.segments()[0].is_final);

    // Last write wins, including the finality decision.
    reconciler.apply(transcript(4.0, "Done and", false));
    assert_eq!(reconciler.segments()[0].text, "Done and");
    assert!(!reconciler.segments()[0].is_final);
}

#[test]
fn test_analysis_partial_update_keeps_absent_fields() {
    let mut reconciler = SegmentReconciler::new();

    reconciler.apply(ServerMessage::Analysis {
        script_location: Some("discovery".to_string()),
        key_points: Some(vec!["budget".to_string(), "timeline".to_string()]),
        suggestion: None,
    });
    reconciler.apply(ServerMessage::Analysis {
        script_location: None,
        key_points: None,
        suggestion: Some("probe on timeline".to_string()),
    });

    let analysis = reconciler.analysis();
    assert_eq!(analysis.script_location.as_deref(), Some("discovery"));
    assert_eq!(analysis.key_points, vec!["budget", "timeline"]);
    assert_eq!(analysis.suggestion.as_deref(), Some("probe on timeline"));
}

#[test]
fn test_key_points_are_replaced_wholesale_when_present() {
    let mut reconciler = SegmentReconciler::new();

    reconciler.apply(ServerMessage::Analysis {
        script_location: None,
        key_points: Some(vec!["a".to_string(), "b".to_string()]),
        suggestion: None,
    });
    reconciler.apply(ServerMessage::Analysis {
        script_location: None,
        key_points: Some(vec!["c".to_string()]),
        suggestion: None,
    });

    assert_eq!(reconciler.analysis().key_points, vec!["c"]);
}

#[test]
fn test_objections_and_errors_append_without_dedup() {
    let mut reconciler = SegmentReconciler::new();

    let objection = ServerMessage::Objection {
        text: "no budget".to_string(),
        response: "offer pilot".to_string(),
    };
    reconciler.apply(objection.clone());
    reconciler.apply(objection);

    reconciler.apply(ServerMessage::Error {
        error: "backend hiccup".to_string(),
    });

    assert_eq!(reconciler.objections().len(), 2, "Events are never deduplicated");
    assert_eq!(reconciler.errors().len(), 1);
    assert_eq!(reconciler.errors()[0].message, "backend hiccup");
}

#[test]
fn test_out_of_order_updates_do_not_corrupt_other_segments() {
    let mut reconciler = SegmentReconciler::new();

    reconciler.apply(transcript(1.0, "one", false));
    reconciler.apply(transcript(2.0, "two", false));
    // A late update for the first window only touches that segment.
    reconciler.apply(transcript(1.0, "one updated.", false));

    assert_eq!(reconciler.segments().len(), 2);
    assert_eq!(reconciler.segments()[0].text, "one updated.");
    assert_eq!(reconciler.segments()[1].text, "two");
}
