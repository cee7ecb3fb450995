use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::model::{Period, encode_date};

/// Web service actions supported by the client, named as on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Endpoint {
    Login,
    CountryList,
    DataClientLatestVersion,
    ExchangeGet,
    ExchangeList,
    QuoteGet,
    QuoteList,
    QuoteList2,
    QuoteListByDate,
    QuoteListByDate2,
    QuoteListByDatePeriod,
    QuoteListByDatePeriod2,
    SymbolHistory,
    SymbolHistoryPeriod,
    SymbolHistoryPeriodByDateRange,
}

impl Endpoint {
    /// Path segment appended to the service base URL.
    pub fn as_str(&self) -> &'static str {
        match self {
            Endpoint::Login => "Login",
            Endpoint::CountryList => "CountryList",
            Endpoint::DataClientLatestVersion => "DataClientLatestVersion",
            Endpoint::ExchangeGet => "ExchangeGet",
            Endpoint::ExchangeList => "ExchangeList",
            Endpoint::QuoteGet => "QuoteGet",
            Endpoint::QuoteList => "QuoteList",
            Endpoint::QuoteList2 => "QuoteList2",
            Endpoint::QuoteListByDate => "QuoteListByDate",
            Endpoint::QuoteListByDate2 => "QuoteListByDate2",
            Endpoint::QuoteListByDatePeriod => "QuoteListByDatePeriod",
            Endpoint::QuoteListByDatePeriod2 => "QuoteListByDatePeriod2",
            Endpoint::SymbolHistory => "SymbolHistory",
            Endpoint::SymbolHistoryPeriod => "SymbolHistoryPeriod",
            Endpoint::SymbolHistoryPeriodByDateRange => "SymbolHistoryPeriodByDateRange",
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Request parameters in wire form: codes upper-cased, dates as `YYYYMMDD`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params(Vec<(String, String)>);

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(mut self, key: &str, value: String) -> Self {
        self.0.push((key.to_string(), value));
        self
    }

    pub fn exchange(self, code: &str) -> Self {
        self.push("Exchange", code.trim().to_uppercase())
    }

    pub fn symbol(self, symbol: &str) -> Self {
        self.push("Symbol", symbol.trim().to_uppercase())
    }

    pub fn symbols<S: AsRef<str>>(self, symbols: &[S]) -> Self {
        let joined = symbols
            .iter()
            .map(|s| s.as_ref().trim().to_uppercase())
            .collect::<Vec<_>>()
            .join(",");
        self.push("Symbols", joined)
    }

    pub fn date(self, key: &str, date: NaiveDate) -> Self {
        self.push(key, encode_date(date))
    }

    pub fn period(self, period: Period) -> Self {
        self.push("Period", period.as_str().to_string())
    }

    /// Prepends the session token, if any, so it leads the query string.
    pub fn with_token(&self, token: Option<&str>) -> Vec<(String, String)> {
        let mut pairs = Vec::with_capacity(self.0.len() + 1);
        if let Some(token) = token {
            pairs.push(("Token".to_string(), token.to_string()));
        }
        pairs.extend(self.0.iter().cloned());
        pairs
    }
}
