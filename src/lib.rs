//! Blocking client for the EodData financial market data web service.
//!
//! The service speaks XML over HTTP. [`EodDataClient`] logs in, attaches the
//! session token to every request, renews the session when the service says
//! it expired (bounded by [`ClientConfig::max_relogin_depth`]) and decodes
//! responses into [`Country`], [`Exchange`], [`QuoteExtended`] and
//! [`QuoteCompact`] records.
//!
//! ```rust,no_run
//! use eoddata::{EodDataClient, Period};
//! use chrono::NaiveDate;
//!
//! let mut client = EodDataClient::new("login", "password")?;
//! let start = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
//! let end = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();
//! let bars = client.symbol_history_period_by_range("NASDAQ", "MSFT", start, end, Period::Week)?;
//! println!("{} weekly bars", bars.len());
//! # Ok::<(), eoddata::Error>(())
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod model;

pub use client::{EodDataClient, Endpoint, Session};
pub use config::ClientConfig;
pub use error::{DomainError, Error, Result};
pub use http::{HttpTransport, RawResponse, Request, ServerErrorPolicy, Transport};
pub use model::{Country, Exchange, Period, QuoteCompact, QuoteExtended};
