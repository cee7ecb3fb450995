//! Blocking HTTP transport for the EodData web service.

use log::debug;
use reqwest::blocking::Client;
use std::fmt;

use crate::client::Endpoint;
use crate::error::Result;

/// HTTP method used for an endpoint call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// Query-string parameters
    Get,
    /// Form-encoded body
    Post,
}

/// One outgoing call, fully resolved against the base URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub endpoint: Endpoint,
    pub method: Method,
    pub url: String,
    pub params: Vec<(String, String)>,
}

impl Request {
    /// Returns the value of the first parameter named `key`.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Logs parameter names with credentials masked.
impl fmt::Display for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let method = match self.method {
            Method::Get => "GET",
            Method::Post => "POST",
        };
        write!(f, "{} {}", method, self.url)?;
        for (i, (key, value)) in self.params.iter().enumerate() {
            let sep = if i == 0 { " [" } else { ", " };
            match key.as_str() {
                "Token" | "Password" => write!(f, "{}{}=***", sep, key)?,
                _ => write!(f, "{}{}={}", sep, key, value)?,
            }
        }
        if !self.params.is_empty() {
            write!(f, "]")?;
        }
        Ok(())
    }
}

/// Status and body of one HTTP exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

/// Issues a single request and returns the raw response.
///
/// Non-200 statuses are returned as responses, not errors; only network
/// failures are errors here.
#[cfg_attr(test, mockall::automock)]
pub trait Transport {
    fn send(&self, request: &Request) -> Result<RawResponse>;
}

/// [`Transport`] over a blocking reqwest client.
#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Creates a new transport wrapping the given reqwest Client.
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

impl Transport for HttpTransport {
    #[tracing::instrument(skip(self, request), fields(endpoint = %request.endpoint))]
    fn send(&self, request: &Request) -> Result<RawResponse> {
        debug!("{}", request);

        let builder = match request.method {
            Method::Get => self.client.get(&request.url).query(&request.params),
            Method::Post => self.client.post(&request.url).form(&request.params),
        };

        let response = builder.send()?;
        let status = response.status().as_u16();
        let body = response.text()?;

        debug!("{} answered HTTP {} ({} bytes)", request.endpoint, status, body.len());

        Ok(RawResponse { status, body })
    }
}
