//! Typed records returned by the EodData service and their XML decoders.

mod datetime;
mod exchange;
mod period;
mod quote;
pub(crate) mod xml;

use roxmltree::Node;
use serde::{Deserialize, Serialize};
use std::fmt;

pub use datetime::{encode_date, parse_datetime};
pub use exchange::Exchange;
pub use period::Period;
pub use quote::{QuoteCompact, QuoteExtended};
pub use xml::{FromXml, decode_children};

use crate::error::Result;
use xml::Attrs;

/// A country supported by the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Country {
    pub code: String,
    pub name: String,
}

impl FromXml for Country {
    fn from_xml(node: Node<'_, '_>) -> Result<Self> {
        let a = Attrs::new(node);
        Ok(Country {
            code: a.string("Code")?,
            name: a.string("Name")?,
        })
    }
}

impl fmt::Display for Country {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.code, self.name)
    }
}
