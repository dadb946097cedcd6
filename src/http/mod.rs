//! HTTP layer every registry request goes through: JSON GETs with retry
//! and transient/permanent error classification.

mod client;
mod retry;

pub use client::HttpClient;
pub use retry::{MAX_RETRIES, NonRetryableError, RETRY_DELAY_MS, check_retryable, classify_error};
