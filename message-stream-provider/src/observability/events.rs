//! Canonical structured event names used across `message-stream-provider`.

// Lifecycle events.
pub const PROVIDER_INIT_START: &str = "provider_init_start";
pub const PROVIDER_INIT_OK: &str = "provider_init_ok";
pub const PROVIDER_INIT_FAILED: &str = "provider_init_failed";
pub const PROVIDER_START_OK: &str = "provider_start_ok";
pub const PROVIDER_CLOSE_OK: &str = "provider_close_ok";
pub const PROVIDER_TRANSITION_SKIPPED: &str = "provider_transition_skipped";

// Stream directory events.
pub const STREAM_HANDLE_CREATE: &str = "stream_handle_create";
pub const STREAM_HANDLE_TYPE_MISMATCH: &str = "stream_handle_type_mismatch";
pub const STREAM_RESOLVE_NOT_INITIALIZED: &str = "stream_resolve_not_initialized";
pub const STREAM_ITEM_COPY_FAILED: &str = "stream_item_copy_failed";

// Producer events.
pub const PRODUCER_SEND_ATTEMPT: &str = "producer_send_attempt";
pub const PRODUCER_SEND_OK: &str = "producer_send_ok";
pub const PRODUCER_SEND_FAILED: &str = "producer_send_failed";
pub const PRODUCER_SEND_DROPPED: &str = "producer_send_dropped";

// Consumer events.
pub const CONSUMER_SUBSCRIBE_OK: &str = "consumer_subscribe_ok";
pub const CONSUMER_SUBSCRIBE_FAILED: &str = "consumer_subscribe_failed";
pub const CONSUMER_UNSUBSCRIBE_OK: &str = "consumer_unsubscribe_ok";
pub const CONSUMER_UNSUBSCRIBE_FAILED: &str = "consumer_unsubscribe_failed";
pub const CONSUMER_DROP_UNEXPECTED_PAYLOAD: &str = "consumer_drop_unexpected_payload";
