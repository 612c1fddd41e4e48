//! Canonical schema constants for structured logging and events
//!
//! Every log line emitted by the snapshot engine uses these keys so that
//! operators can filter one snapshot run by organization, snapshot or stage.

// Envelope
pub const FIELD_COMPONENT: &str = "component";
pub const FIELD_OP: &str = "op";
pub const FIELD_EVENT: &str = "event";
pub const FIELD_DURATION_MS: &str = "duration_ms";
pub const FIELD_REQUEST_ID: &str = "request_id";
pub const FIELD_TRACE_ID: &str = "trace_id";

// Identities
pub const FIELD_TENANT_ID: &str = "tenant_id";
pub const FIELD_ORGANIZATION_ID: &str = "organization_id";
pub const FIELD_SNAPSHOT_ID: &str = "snapshot_id";
pub const FIELD_SNAPSHOT_KIND: &str = "snapshot_kind";
pub const FIELD_STAGE: &str = "stage";

// Row counts
pub const FIELD_ROWS_INSERTED: &str = "rows_inserted";
pub const FIELD_ROWS_DROPPED: &str = "rows_dropped";

// Errors
pub const FIELD_ERR_KIND: &str = "err_kind";
pub const FIELD_ERR_CODE: &str = "err_code";

// Events
pub const EVENT_START: &str = "start";
pub const EVENT_END: &str = "end";
pub const EVENT_END_ERROR: &str = "end_error";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_names_are_distinct() {
        assert_ne!(EVENT_START, EVENT_END);
        assert_ne!(EVENT_START, EVENT_END_ERROR);
        assert_ne!(EVENT_END, EVENT_END_ERROR);
    }
}
