//! Typed attribute access on XML elements.

use chrono::NaiveDateTime;
use roxmltree::Node;
use std::str::FromStr;

use super::datetime::parse_datetime;
use crate::error::{Error, Result};

/// Record types that decode from a single XML element's attributes.
pub trait FromXml: Sized {
    fn from_xml(node: Node<'_, '_>) -> Result<Self>;
}

/// Decodes every element child of `parent` as `T`.
pub fn decode_children<T: FromXml>(parent: Node<'_, '_>) -> Result<Vec<T>> {
    parent
        .children()
        .filter(|n| n.is_element())
        .map(T::from_xml)
        .collect()
}

/// Attribute reader that turns missing or unparsable values into
/// [`Error::MalformedResponse`] naming the element.
pub(crate) struct Attrs<'a, 'input> {
    node: Node<'a, 'input>,
}

impl<'a, 'input> Attrs<'a, 'input> {
    pub fn new(node: Node<'a, 'input>) -> Self {
        Self { node }
    }

    fn element(&self) -> &str {
        self.node.tag_name().name()
    }

    pub fn optional(&self, name: &str) -> Option<&'a str> {
        self.node.attribute(name)
    }

    pub fn required(&self, name: &str) -> Result<&'a str> {
        self.optional(name)
            .ok_or_else(|| Error::malformed(self.element(), format!("missing attribute `{}`", name)))
    }

    pub fn string(&self, name: &str) -> Result<String> {
        self.required(name).map(str::to_string)
    }

    pub fn string_or_default(&self, name: &str) -> String {
        self.optional(name).unwrap_or_default().to_string()
    }

    pub fn parse<T: FromStr>(&self, name: &str) -> Result<T> {
        let raw = self.required(name)?;
        self.parse_value(name, raw)
    }

    pub fn parse_or<T: FromStr>(&self, name: &str, default: T) -> Result<T> {
        match self.optional(name) {
            Some(raw) if !raw.trim().is_empty() => self.parse_value(name, raw),
            _ => Ok(default),
        }
    }

    fn parse_value<T: FromStr>(&self, name: &str, raw: &str) -> Result<T> {
        raw.trim().parse::<T>().map_err(|_| {
            Error::malformed(
                self.element(),
                format!("attribute `{}` has unparsable value {:?}", name, raw),
            )
        })
    }

    pub fn datetime(&self, name: &str) -> Result<NaiveDateTime> {
        let raw = self.required(name)?;
        self.datetime_value(name, raw)
    }

    pub fn optional_datetime(&self, name: &str) -> Result<Option<NaiveDateTime>> {
        match self.optional(name) {
            Some(raw) if !raw.trim().is_empty() => self.datetime_value(name, raw).map(Some),
            _ => Ok(None),
        }
    }

    fn datetime_value(&self, name: &str, raw: &str) -> Result<NaiveDateTime> {
        parse_datetime(raw.trim()).map_err(|e| {
            Error::malformed(
                self.element(),
                format!("attribute `{}` is not an ISO 8601 datetime ({}): {:?}", name, e, raw),
            )
        })
    }

    /// Parses `true`/`false` (any case) and `1`/`0`; absent means `false`.
    pub fn flag(&self, name: &str) -> Result<bool> {
        match self.optional(name).map(str::trim) {
            None | Some("") => Ok(false),
            Some(v) if v.eq_ignore_ascii_case("true") || v == "1" => Ok(true),
            Some(v) if v.eq_ignore_ascii_case("false") || v == "0" => Ok(false),
            Some(v) => Err(Error::malformed(
                self.element(),
                format!("attribute `{}` is not a boolean: {:?}", name, v),
            )),
        }
    }
}
