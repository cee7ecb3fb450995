//! Relogin depth accounting per operation.

use log::debug;
use std::collections::HashMap;

use super::Endpoint;
use crate::error::{Error, Result};

/// Bounds consecutive attempts of each operation that are driven by
/// re-authentication.
///
/// Counters are keyed by [`Endpoint`] and owned by a single client, so
/// interleaved calls to different operations and separate clients never share
/// budget.
#[derive(Debug)]
pub struct RetryGovernor {
    max_depth: u32,
    attempts: HashMap<Endpoint, u32>,
}

impl RetryGovernor {
    pub fn new(max_depth: u32) -> Self {
        Self {
            max_depth,
            attempts: HashMap::new(),
        }
    }

    /// Attempts counted so far for the in-flight call of `endpoint`.
    pub fn attempts(&self, endpoint: Endpoint) -> u32 {
        self.attempts.get(&endpoint).copied().unwrap_or(0)
    }

    /// Claims one attempt, failing once the depth has been used up.
    pub fn acquire(&mut self, endpoint: Endpoint) -> Result<u32> {
        let count = self.attempts.entry(endpoint).or_insert(0);
        if *count >= self.max_depth {
            return Err(Error::ReloginDepthReached {
                endpoint,
                attempts: *count,
            });
        }
        *count += 1;
        debug!("{}: attempt {}/{}", endpoint, count, self.max_depth);
        Ok(*count)
    }

    /// Returns an attempt that was not spent on re-authentication.
    pub fn refund(&mut self, endpoint: Endpoint) {
        if let Some(count) = self.attempts.get_mut(&endpoint) {
            *count = count.saturating_sub(1);
        }
    }

    pub fn reset(&mut self, endpoint: Endpoint) {
        self.attempts.remove(&endpoint);
    }
}
