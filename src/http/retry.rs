//! Handling of HTTP 500 responses.

use log::warn;
use std::time::Duration;

/// Maximum number of attempts for a request answered with HTTP 500.
pub const MAX_RETRIES: u32 = 3;

/// Delay between server error retries in milliseconds.
pub const RETRY_DELAY_MS: u64 = 1000;

/// What to do when the service answers HTTP 500.
///
/// [`Reauthenticate`](Self::Reauthenticate) is the classic mapping of a 500 to
/// an expired session, the same as an `Invalid Token` answer. The default is
/// [`Backoff`](Self::Backoff), which repeats the request without logging in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerErrorPolicy {
    /// Treat the failure like an expired session: log in again and retry,
    /// counting against the relogin depth.
    Reauthenticate,
    /// Repeat the same request after `delay`, up to `attempts` requests in
    /// total, without logging in again.
    Backoff { attempts: u32, delay: Duration },
}

impl Default for ServerErrorPolicy {
    fn default() -> Self {
        ServerErrorPolicy::Backoff {
            attempts: MAX_RETRIES,
            delay: Duration::from_millis(RETRY_DELAY_MS),
        }
    }
}

impl ServerErrorPolicy {
    pub fn backoff(attempts: u32, delay: Duration) -> Self {
        ServerErrorPolicy::Backoff {
            attempts: attempts.max(1),
            delay,
        }
    }
}

/// Counts HTTP 500 responses within one call and decides whether to try again.
#[derive(Debug)]
pub(crate) struct Backoff {
    attempts: u32,
    delay: Duration,
    failures: u32,
}

impl Backoff {
    pub fn new(attempts: u32, delay: Duration) -> Self {
        Self {
            attempts,
            delay,
            failures: 0,
        }
    }

    pub fn failures(&self) -> u32 {
        self.failures
    }

    /// Records one failure. Sleeps and returns `true` if another attempt is allowed.
    pub fn retry(&mut self, operation_name: &str) -> bool {
        self.failures += 1;
        if self.failures >= self.attempts {
            return false;
        }
        warn!(
            "{}: attempt {}/{} failed (HTTP 500), retrying in {}ms...",
            operation_name,
            self.failures,
            self.attempts,
            self.delay.as_millis()
        );
        std::thread::sleep(self.delay);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy_is_backoff() {
        assert_eq!(
            ServerErrorPolicy::default(),
            ServerErrorPolicy::Backoff {
                attempts: 3,
                delay: Duration::from_millis(1000)
            }
        );
    }

    #[test]
    fn test_backoff_constructor_keeps_at_least_one_attempt() {
        assert_eq!(
            ServerErrorPolicy::backoff(0, Duration::ZERO),
            ServerErrorPolicy::Backoff {
                attempts: 1,
                delay: Duration::ZERO
            }
        );
    }

    #[test]
    fn test_backoff_exhausts_after_attempts() {
        let mut backoff = Backoff::new(3, Duration::ZERO);
        assert!(backoff.retry("test"));
        assert!(backoff.retry("test"));
        assert!(!backoff.retry("test"));
        assert_eq!(backoff.failures(), 3);
    }

    #[test]
    fn test_single_attempt_never_retries() {
        let mut backoff = Backoff::new(1, Duration::from_secs(60));
        let start = std::time::Instant::now();
        assert!(!backoff.retry("test"));
        assert!(start.elapsed() < Duration::from_millis(500));
    }
}
