//! The EodData web service client.
//!
//! [`EodDataClient`] owns a [`Session`], a [`RetryGovernor`] and a
//! [`Transport`]. Every data operation runs through [`EodDataClient::call`]:
//!
//! 1. the governor claims an attempt for the operation,
//! 2. the request is sent with the current token attached,
//! 3. the response is classified,
//! 4. on success the payload element is decoded; on an expired session the
//!    client logs in again and repeats from step 1; domain errors are returned
//!    as they are.
//!
//! # Example
//!
//! ```rust,no_run
//! use chrono::NaiveDate;
//! use eoddata::{ClientConfig, EodDataClient};
//!
//! let mut client = EodDataClient::from_config(ClientConfig::from_env()?)?;
//! client.login()?;
//!
//! let date = NaiveDate::from_ymd_opt(2024, 3, 4).unwrap();
//! for quote in client.quote_list_by_date("nasdaq", date)? {
//!     println!("{} {}", quote, quote.close);
//! }
//! # Ok::<(), eoddata::Error>(())
//! ```

mod classify;
mod endpoint;
mod governor;
mod session;

use chrono::NaiveDate;
use log::{debug, warn};
use roxmltree::{Document, Node};

pub use classify::{Outcome, classify, classify_document, payload};
pub use endpoint::Endpoint;
pub(crate) use endpoint::Params;
pub use governor::RetryGovernor;
pub use session::{Session, mask_token};

use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::http::{Backoff, HttpTransport, Method, Request, ServerErrorPolicy, Transport};
use crate::model::{
    Country, Exchange, FromXml, Period, QuoteCompact, QuoteExtended, decode_children,
};

const COUNTRIES: &str = "COUNTRIES";
const VERSION: &str = "VERSION";
const EXCHANGE: &str = "EXCHANGE";
const EXCHANGES: &str = "EXCHANGES";
const QUOTE: &str = "QUOTE";
const QUOTES: &str = "QUOTES";
const QUOTES2: &str = "QUOTES2";

/// Result of a single request within a governed call.
enum Attempt<T> {
    Done(T),
    NeedsReauth,
    ServerError(u16),
}

/// Blocking client for the EodData web service.
///
/// Operations take `&mut self`: one client serves one call at a time. Wrap it
/// in a `Mutex` to share it between threads.
pub struct EodDataClient<T: Transport = HttpTransport> {
    transport: T,
    session: Session,
    governor: RetryGovernor,
    server_errors: ServerErrorPolicy,
}

impl EodDataClient<HttpTransport> {
    /// Creates a client for the default service address.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Result<Self> {
        Self::from_config(ClientConfig::new(username, password))
    }

    pub fn from_config(config: ClientConfig) -> Result<Self> {
        let transport = config.transport()?;
        Self::with_transport(config, transport)
    }
}

impl<T: Transport> EodDataClient<T> {
    /// Creates a client that sends requests through `transport`.
    pub fn with_transport(config: ClientConfig, transport: T) -> Result<Self> {
        let base_url = config.validate()?;
        debug!("EodData client for {} at {}", config.username, base_url);

        Ok(Self {
            transport,
            session: Session::new(config.username, config.password, base_url),
            governor: RetryGovernor::new(config.max_relogin_depth),
            server_errors: config.server_errors,
        })
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Token attached to outgoing requests, if logged in.
    pub fn token(&self) -> Option<&str> {
        self.session.current_token()
    }

    /// Relogin attempts counted for an operation's in-flight call; zero between calls.
    pub fn retry_attempts(&self, endpoint: Endpoint) -> u32 {
        self.governor.attempts(endpoint)
    }

    /// Logs in to the service. See [`Session::login`].
    pub fn login(&mut self) -> Result<bool> {
        self.session.login(&self.transport)
    }

    /// Returns the available countries as (code, name) records.
    #[tracing::instrument(skip(self))]
    pub fn country_list(&mut self) -> Result<Vec<Country>> {
        self.call(Endpoint::CountryList, Params::new(), |root| {
            decode_children(payload(root, COUNTRIES)?)
        })
    }

    /// Returns the latest version string of the EodData Data Client.
    #[tracing::instrument(skip(self))]
    pub fn data_client_latest_version(&mut self) -> Result<String> {
        self.call(Endpoint::DataClientLatestVersion, Params::new(), |root| {
            let node = payload(root, VERSION)?;
            match node.text().map(str::trim) {
                Some(version) if !version.is_empty() => Ok(version.to_string()),
                _ => Err(Error::malformed(node.tag_name().name(), "empty version")),
            }
        })
    }

    /// Returns detailed information about one exchange.
    #[tracing::instrument(skip(self))]
    pub fn exchange_detail(&mut self, exchange_code: &str) -> Result<Exchange> {
        let params = Params::new().exchange(exchange_code);
        self.call(Endpoint::ExchangeGet, params, |root| {
            Exchange::from_xml(payload(root, EXCHANGE)?)
        })
    }

    /// Returns all available exchanges.
    #[tracing::instrument(skip(self))]
    pub fn exchange_list(&mut self) -> Result<Vec<Exchange>> {
        self.call(Endpoint::ExchangeList, Params::new(), |root| {
            decode_children(payload(root, EXCHANGES)?)
        })
    }

    /// Returns the end of day quote for one symbol.
    #[tracing::instrument(skip(self))]
    pub fn quote_detail(&mut self, exchange_code: &str, symbol: &str) -> Result<QuoteExtended> {
        let params = Params::new().exchange(exchange_code).symbol(symbol);
        self.call(Endpoint::QuoteGet, params, |root| {
            QuoteExtended::from_xml(payload(root, QUOTE)?)
        })
    }

    /// Returns the end of day quotes for an entire exchange.
    #[tracing::instrument(skip(self))]
    pub fn quote_list(&mut self, exchange_code: &str) -> Result<Vec<QuoteExtended>> {
        let params = Params::new().exchange(exchange_code);
        self.call(Endpoint::QuoteList, params, extended_quotes)
    }

    /// Returns the end of day quotes for specific symbols.
    #[tracing::instrument(skip(self, symbols))]
    pub fn quote_list_specific<S: AsRef<str>>(
        &mut self,
        exchange_code: &str,
        symbols: &[S],
    ) -> Result<Vec<QuoteExtended>> {
        if symbols.is_empty() {
            return Err(Error::Config("symbol list must not be empty".to_string()));
        }
        let params = Params::new().exchange(exchange_code).symbols(symbols);
        self.call(Endpoint::QuoteList2, params, extended_quotes)
    }

    /// Returns the end of day quotes for an entire exchange on a date.
    #[tracing::instrument(skip(self))]
    pub fn quote_list_by_date(
        &mut self,
        exchange_code: &str,
        date: NaiveDate,
    ) -> Result<Vec<QuoteExtended>> {
        let params = Params::new().exchange(exchange_code).date("QuoteDate", date);
        self.call(Endpoint::QuoteListByDate, params, extended_quotes)
    }

    /// Compact-format variant of [`quote_list_by_date`](Self::quote_list_by_date).
    #[tracing::instrument(skip(self))]
    pub fn quote_list_by_date_compact(
        &mut self,
        exchange_code: &str,
        date: NaiveDate,
    ) -> Result<Vec<QuoteCompact>> {
        let params = Params::new().exchange(exchange_code).date("QuoteDate", date);
        self.call(Endpoint::QuoteListByDate2, params, compact_quotes)
    }

    /// Returns the quotes for an entire exchange on a date, in bars of `period`.
    #[tracing::instrument(skip(self))]
    pub fn quote_list_by_date_period(
        &mut self,
        exchange_code: &str,
        date: NaiveDate,
        period: Period,
    ) -> Result<Vec<QuoteExtended>> {
        let params = Params::new()
            .exchange(exchange_code)
            .date("QuoteDate", date)
            .period(period);
        self.call(Endpoint::QuoteListByDatePeriod, params, extended_quotes)
    }

    /// Compact-format variant of [`quote_list_by_date_period`](Self::quote_list_by_date_period).
    #[tracing::instrument(skip(self))]
    pub fn quote_list_by_date_period_compact(
        &mut self,
        exchange_code: &str,
        date: NaiveDate,
        period: Period,
    ) -> Result<Vec<QuoteCompact>> {
        let params = Params::new()
            .exchange(exchange_code)
            .date("QuoteDate", date)
            .period(period);
        self.call(Endpoint::QuoteListByDatePeriod2, params, compact_quotes)
    }

    /// Returns daily history of a symbol from `start_date` up to today.
    #[tracing::instrument(skip(self))]
    pub fn symbol_history(
        &mut self,
        exchange_code: &str,
        symbol: &str,
        start_date: NaiveDate,
    ) -> Result<Vec<QuoteExtended>> {
        let params = Params::new()
            .exchange(exchange_code)
            .date("StartDate", start_date)
            .symbol(symbol);
        self.call(Endpoint::SymbolHistory, params, extended_quotes)
    }

    /// Returns the history of a symbol for one date in bars of `period`.
    #[tracing::instrument(skip(self))]
    pub fn symbol_history_period(
        &mut self,
        exchange_code: &str,
        symbol: &str,
        date: NaiveDate,
        period: Period,
    ) -> Result<Vec<QuoteExtended>> {
        let params = Params::new()
            .exchange(exchange_code)
            .date("Date", date)
            .symbol(symbol)
            .period(period);
        self.call(Endpoint::SymbolHistoryPeriod, params, extended_quotes)
    }

    /// Returns the history of a symbol between two dates in bars of `period`.
    #[tracing::instrument(skip(self))]
    pub fn symbol_history_period_by_range(
        &mut self,
        exchange_code: &str,
        symbol: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
        period: Period,
    ) -> Result<Vec<QuoteExtended>> {
        if end_date < start_date {
            return Err(Error::Config(format!(
                "end date {} is before start date {}",
                end_date, start_date
            )));
        }
        let params = Params::new()
            .exchange(exchange_code)
            .date("StartDate", start_date)
            .date("EndDate", end_date)
            .symbol(symbol)
            .period(period);
        self.call(Endpoint::SymbolHistoryPeriodByDateRange, params, extended_quotes)
    }

    /// Runs one logical operation under the relogin bound.
    ///
    /// The operation's counter starts at zero and is cleared again when the
    /// call returns, whatever the result.
    pub(crate) fn call<R, F>(&mut self, endpoint: Endpoint, params: Params, extract: F) -> Result<R>
    where
        F: Fn(Node<'_, '_>) -> Result<R>,
    {
        self.governor.reset(endpoint);
        let result = self.call_governed(endpoint, &params, &extract);
        self.governor.reset(endpoint);
        result
    }

    fn call_governed<R, F>(&mut self, endpoint: Endpoint, params: &Params, extract: &F) -> Result<R>
    where
        F: Fn(Node<'_, '_>) -> Result<R>,
    {
        let mut backoff = match self.server_errors {
            ServerErrorPolicy::Backoff { attempts, delay } => Some(Backoff::new(attempts, delay)),
            ServerErrorPolicy::Reauthenticate => None,
        };

        loop {
            self.governor.acquire(endpoint)?;

            let status = match self.attempt(endpoint, params, extract)? {
                Attempt::Done(value) => return Ok(value),
                Attempt::NeedsReauth => None,
                Attempt::ServerError(status) => Some(status),
            };

            match (status, backoff.as_mut()) {
                (Some(status), Some(backoff)) => {
                    if !backoff.retry(endpoint.as_str()) {
                        return Err(Error::ServerError {
                            endpoint,
                            status,
                            attempts: backoff.failures(),
                        });
                    }
                    self.governor.refund(endpoint);
                }
                _ => self.relogin(endpoint)?,
            }
        }
    }

    fn relogin(&mut self, endpoint: Endpoint) -> Result<()> {
        debug!("{}: session expired, logging in again", endpoint);
        if !self.session.login(&self.transport)? {
            warn!("{}: relogin failed, retrying with the previous token", endpoint);
        }
        Ok(())
    }

    /// Sends one request and classifies the answer.
    fn attempt<R, F>(&self, endpoint: Endpoint, params: &Params, extract: &F) -> Result<Attempt<R>>
    where
        F: Fn(Node<'_, '_>) -> Result<R>,
    {
        let request = Request {
            endpoint,
            method: Method::Get,
            url: self.session.url(endpoint),
            params: params.with_token(self.session.current_token()),
        };

        let response = self.transport.send(&request)?;

        if response.status != 200 {
            return match classify(response.status, None, None)? {
                Outcome::ServerError(status) => Ok(Attempt::ServerError(status)),
                _ => Err(Error::UnexpectedStatus {
                    endpoint,
                    status: response.status,
                }),
            };
        }

        let doc = Document::parse(&response.body)?;
        match classify_document(&doc)? {
            Outcome::Success => extract(doc.root_element()).map(Attempt::Done),
            Outcome::NeedsReauth => Ok(Attempt::NeedsReauth),
            Outcome::DomainError(kind) => Err(Error::Domain(kind)),
            Outcome::SuccessWithToken(_) => Err(Error::malformed(
                doc.root_element().tag_name().name(),
                format!("{} answered with a login response", endpoint),
            )),
            Outcome::ServerError(status) | Outcome::UnexpectedStatus(status) => {
                Err(Error::UnexpectedStatus { endpoint, status })
            }
        }
    }
}

fn extended_quotes(root: Node<'_, '_>) -> Result<Vec<QuoteExtended>> {
    decode_children(payload(root, QUOTES)?)
}

fn compact_quotes(root: Node<'_, '_>) -> Result<Vec<QuoteCompact>> {
    decode_children(payload(root, QUOTES2)?)
}
