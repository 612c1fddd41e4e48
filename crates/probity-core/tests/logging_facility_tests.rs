//! Canonical logging macros, observed through the capture layer

use probity_core::errors::{ExError, ExErrorKind};
use probity_core::logging_facility::init_test_capture;
use probity_core::{log_op_end, log_op_error, log_op_start};

#[test]
fn test_start_and_end_events_are_captured() {
    let capture = init_test_capture();

    log_op_start!("test_start_end", snapshot_id = "snap-start-end");
    log_op_end!("test_start_end", duration_ms = 5u64, snapshot_id = "snap-start-end");

    capture.assert_event_exists("test_start_end", "start");
    capture.assert_event_exists("test_start_end", "end");

    let end = capture
        .events_with("snapshot_id", "snap-start-end")
        .into_iter()
        .find(|e| e.event.as_deref() == Some("end"))
        .expect("end event");
    assert_eq!(end.field("duration_ms"), Some("5"));
}

#[test]
fn test_error_event_carries_code_and_stage() {
    let capture = init_test_capture();

    let err = ExError::new(ExErrorKind::Conflict).with_stage("vendors");
    log_op_error!("test_error_event", err, duration_ms = 1u64);

    let events: Vec<_> = capture
        .events()
        .into_iter()
        .filter(|e| e.op.as_deref() == Some("test_error_event"))
        .collect();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].field("err_code"), Some("ERR_CONFLICT"));
    assert_eq!(events[0].field("stage"), Some("vendors"));
    assert_eq!(events[0].level, tracing::Level::ERROR);
}
