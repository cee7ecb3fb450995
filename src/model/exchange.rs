use chrono::NaiveDateTime;
use roxmltree::Node;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::xml::{Attrs, FromXml};
use crate::error::Result;

/// A stock exchange as described by `ExchangeGet` / `ExchangeList`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exchange {
    pub code: String,
    pub name: String,
    /// Datetime of the last trade
    pub last_trade_time: NaiveDateTime,
    /// Code of the country where this exchange is situated
    pub country_code: String,
    pub currency: String,
    pub advances: u32,
    pub declines: u32,
    pub suffix: String,
    pub timezone: String,
    /// Intraday data is available for this exchange
    pub is_intraday: bool,
    pub intraday_start_date: Option<NaiveDateTime>,
    /// EodData sells an intraday product for this exchange
    pub has_intraday: bool,
}

impl FromXml for Exchange {
    fn from_xml(node: Node<'_, '_>) -> Result<Self> {
        let a = Attrs::new(node);
        Ok(Exchange {
            code: a.string("Code")?,
            name: a.string("Name")?,
            last_trade_time: a.datetime("LastTradeDateTime")?,
            country_code: a.string("Country")?,
            currency: a.string("Currency")?,
            advances: a.parse("Advances")?,
            declines: a.parse("Declines")?,
            suffix: a.string_or_default("Suffix"),
            timezone: a.string("TimeZone")?,
            is_intraday: a.flag("IsIntraday")?,
            intraday_start_date: a.optional_datetime("IntradayStartDate")?,
            has_intraday: a.flag("HasIntradayProduct")?,
        })
    }
}

impl fmt::Display for Exchange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.code, self.name)
    }
}
