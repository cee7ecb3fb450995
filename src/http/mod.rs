//! HTTP transport and server error retry policy.

mod client;
mod retry;

#[cfg(test)]
pub use client::MockTransport;
pub use client::{HttpTransport, Method, RawResponse, Request, Transport};
pub(crate) use retry::Backoff;
pub use retry::{MAX_RETRIES, RETRY_DELAY_MS, ServerErrorPolicy};
