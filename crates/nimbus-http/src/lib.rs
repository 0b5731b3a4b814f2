//! HTTP plumbing for Nimbus: a JSON GET client with linear-backoff retry and
//! the classifier that reduces its failures to an [`ErrorCategory`].
//!
//! [`ErrorCategory`]: nimbus_core::ErrorCategory

pub mod classify;
pub mod client;
pub mod error;
pub mod retry;

pub use classify::{classify, classify_anyhow, classify_error};
pub use client::{HttpClient, HttpConfig};
pub use error::HttpError;
pub use retry::{with_retry, RetryPolicy};
