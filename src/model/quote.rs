use chrono::NaiveDateTime;
use roxmltree::Node;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::xml::{Attrs, FromXml};
use crate::error::Result;

/// End of day quote in the extended format (`QUOTE` elements).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteExtended {
    pub symbol: String,
    pub quote_datetime: NaiveDateTime,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
    pub open_interest: u64,
    /// Previous close price
    pub previous: f64,
    /// Change from previous close
    pub change: f64,
    pub bid: f64,
    pub ask: f64,
    pub previous_close: f64,
    pub next_open: f64,
    /// Time of the last update for this security
    pub modified: NaiveDateTime,
    pub name: String,
    pub description: String,
}

impl FromXml for QuoteExtended {
    fn from_xml(node: Node<'_, '_>) -> Result<Self> {
        let a = Attrs::new(node);
        Ok(QuoteExtended {
            symbol: a.string("Symbol")?,
            quote_datetime: a.datetime("DateTime")?,
            open: a.parse("Open")?,
            high: a.parse("High")?,
            low: a.parse("Low")?,
            close: a.parse("Close")?,
            volume: a.parse("Volume")?,
            open_interest: a.parse("OpenInterest")?,
            previous: a.parse("Previous")?,
            change: a.parse("Change")?,
            bid: a.parse("Bid")?,
            ask: a.parse("Ask")?,
            previous_close: a.parse_or("PreviousClose", 0.0)?,
            next_open: a.parse_or("NextOpen", 0.0)?,
            modified: a.datetime("Modified")?,
            name: a.string_or_default("Name"),
            description: a.string_or_default("Description"),
        })
    }
}

impl fmt::Display for QuoteExtended {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} | {}", self.symbol, self.quote_datetime)
    }
}

/// End of day quote in the compact format (`QUOTE2` elements, one-letter attributes).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteCompact {
    pub symbol: String,
    pub quote_datetime: NaiveDateTime,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
    pub open_interest: u64,
    pub before: f64,
    pub after: f64,
}

impl FromXml for QuoteCompact {
    fn from_xml(node: Node<'_, '_>) -> Result<Self> {
        let a = Attrs::new(node);
        Ok(QuoteCompact {
            symbol: a.string("s")?,
            quote_datetime: a.datetime("d")?,
            open: a.parse("o")?,
            high: a.parse("h")?,
            low: a.parse("l")?,
            close: a.parse("c")?,
            volume: a.parse("v")?,
            open_interest: a.parse("i")?,
            before: a.parse("b")?,
            after: a.parse("a")?,
        })
    }
}

impl fmt::Display for QuoteCompact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} | {}", self.symbol, self.quote_datetime)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_quote_extended_from_xml() {
        let xml = r#"<QUOTE Symbol="MSFT" Description="Microsoft Corp" Name="Microsoft"
            DateTime="2024-03-04T00:00:00" Open="413.44" High="417.35" Low="412.32"
            Close="414.92" Volume="17596000" OpenInterest="0" Previous="415.5"
            Change="-0.58" Bid="0" Ask="0" PreviousClose="415.5" NextOpen="0"
            Modified="2024-03-04T17:10:23.393"/>"#;
        let doc = roxmltree::Document::parse(xml).unwrap();
        let quote = QuoteExtended::from_xml(doc.root_element()).unwrap();

        assert_eq!(quote.symbol, "MSFT");
        assert_eq!(quote.close, 414.92);
        assert_eq!(quote.volume, 17_596_000);
        assert_eq!(quote.change, -0.58);
        assert_eq!(quote.name, "Microsoft");
        assert_eq!(quote.to_string(), "MSFT | 2024-03-04 00:00:00");
    }

    #[test]
    fn test_quote_extended_optional_fields_default() {
        let xml = r#"<QUOTE Symbol="AAPL" DateTime="2024-03-04T00:00:00" Open="1"
            High="2" Low="0.5" Close="1.5" Volume="10" OpenInterest="0" Previous="1"
            Change="0.5" Bid="0" Ask="0" Modified="2024-03-04T00:00:00"/>"#;
        let doc = roxmltree::Document::parse(xml).unwrap();
        let quote = QuoteExtended::from_xml(doc.root_element()).unwrap();

        assert_eq!(quote.previous_close, 0.0);
        assert_eq!(quote.next_open, 0.0);
        assert!(quote.name.is_empty());
        assert!(quote.description.is_empty());
    }

    #[test]
    fn test_quote_compact_from_xml() {
        let xml = r#"<QUOTE2 s="AMZN" d="2024-03-04T00:00:00" o="177.53" h="180.14"
            l="177.49" c="177.58" v="37381500" i="0" b="0" a="0"/>"#;
        let doc = roxmltree::Document::parse(xml).unwrap();
        let quote = QuoteCompact::from_xml(doc.root_element()).unwrap();

        assert_eq!(quote.symbol, "AMZN");
        assert_eq!(quote.high, 180.14);
        assert_eq!(quote.volume, 37_381_500);
    }

    #[test]
    fn test_quote_compact_bad_number_is_malformed() {
        let xml = r#"<QUOTE2 s="AMZN" d="2024-03-04T00:00:00" o="n/a" h="1" l="1"
            c="1" v="1" i="0" b="0" a="0"/>"#;
        let doc = roxmltree::Document::parse(xml).unwrap();
        let err = QuoteCompact::from_xml(doc.root_element()).unwrap_err();
        match err {
            Error::MalformedResponse { element, reason } => {
                assert_eq!(element, "QUOTE2");
                assert!(reason.contains("`o`"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
