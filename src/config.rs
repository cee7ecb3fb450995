use log::debug;
use reqwest::blocking::Client;
use std::env;
use std::fmt;
use std::time::Duration;

use crate::error::{Error, Result};
use crate::http::{HttpTransport, ServerErrorPolicy};

/// Default EodData web service address.
pub const DEFAULT_BASE_URL: &str = "http://ws.eoddata.com/data.asmx/";

/// Default number of relogin attempts per call.
pub const DEFAULT_MAX_RELOGIN_DEPTH: u32 = 3;

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

pub const ENV_USERNAME: &str = "EOD_DATA_LOGIN";
pub const ENV_PASSWORD: &str = "EOD_DATA_PASSWORD";
pub const ENV_BASE_URL: &str = "EOD_DATA_URL";

/// Settings for [`EodDataClient`](crate::EodDataClient).
#[derive(Clone)]
pub struct ClientConfig {
    pub username: String,
    pub password: String,
    pub base_url: String,
    pub max_relogin_depth: u32,
    pub timeout: Duration,
    pub user_agent: String,
    pub server_errors: ServerErrorPolicy,
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("username", &self.username)
            .field("password", &"***")
            .field("base_url", &self.base_url)
            .field("max_relogin_depth", &self.max_relogin_depth)
            .field("timeout", &self.timeout)
            .field("user_agent", &self.user_agent)
            .field("server_errors", &self.server_errors)
            .finish()
    }
}

impl ClientConfig {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            max_relogin_depth: DEFAULT_MAX_RELOGIN_DEPTH,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: format!("eoddata-rs/{}", env!("CARGO_PKG_VERSION")),
            server_errors: ServerErrorPolicy::default(),
        }
    }

    /// Reads credentials from `EOD_DATA_LOGIN` / `EOD_DATA_PASSWORD` and an
    /// optional base URL from `EOD_DATA_URL`.
    pub fn from_env() -> Result<Self> {
        let username = env::var(ENV_USERNAME)
            .map_err(|_| Error::Config(format!("{} is not set", ENV_USERNAME)))?;
        let password = env::var(ENV_PASSWORD)
            .map_err(|_| Error::Config(format!("{} is not set", ENV_PASSWORD)))?;

        let mut config = Self::new(username, password);
        if let Ok(url) = env::var(ENV_BASE_URL) {
            debug!("Using {} from environment: {}", ENV_BASE_URL, url);
            config = config.with_base_url(url);
        }
        Ok(config)
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_max_relogin_depth(mut self, depth: u32) -> Self {
        self.max_relogin_depth = depth;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn with_server_errors(mut self, policy: ServerErrorPolicy) -> Self {
        self.server_errors = policy;
        self
    }

    /// Checks the settings and returns the base URL with a trailing `/`.
    pub fn validate(&self) -> Result<String> {
        if self.username.is_empty() {
            return Err(Error::Config("username must not be empty".to_string()));
        }
        if self.max_relogin_depth == 0 {
            return Err(Error::Config(
                "max relogin depth must be at least 1".to_string(),
            ));
        }

        let base_url = self.base_url.trim();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(Error::Config(format!(
                "base URL must be http(s): {:?}",
                self.base_url
            )));
        }

        Ok(if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{}/", base_url)
        })
    }

    /// Builds the blocking HTTP transport described by this configuration.
    pub fn transport(&self) -> Result<HttpTransport> {
        let client = Client::builder()
            .user_agent(self.user_agent.clone())
            .timeout(self.timeout)
            .build()?;
        Ok(HttpTransport::new(client))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::Endpoint;
    use crate::http::{Method, Request, Transport};

    #[test]
    fn test_defaults() {
        let config = ClientConfig::new("user", "pass");
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.max_relogin_depth, 3);
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.server_errors, ServerErrorPolicy::default());
    }

    #[test]
    fn test_validate_appends_trailing_slash() {
        let config = ClientConfig::new("user", "pass").with_base_url("http://localhost:8080/data.asmx");
        assert_eq!(config.validate().unwrap(), "http://localhost:8080/data.asmx/");

        let config = ClientConfig::new("user", "pass");
        assert_eq!(config.validate().unwrap(), DEFAULT_BASE_URL);
    }

    #[test]
    fn test_validate_rejects_bad_settings() {
        let config = ClientConfig::new("", "pass");
        assert!(matches!(config.validate(), Err(Error::Config(_))));

        let config = ClientConfig::new("user", "pass").with_max_relogin_depth(0);
        assert!(matches!(config.validate(), Err(Error::Config(_))));

        let config = ClientConfig::new("user", "pass").with_base_url("ws.eoddata.com");
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    // Must stay the only test that touches the EOD_DATA_* variables.
    #[test]
    fn test_from_env() {
        unsafe {
            env::remove_var(ENV_USERNAME);
            env::remove_var(ENV_PASSWORD);
        }
        assert!(matches!(ClientConfig::from_env(), Err(Error::Config(_))));

        unsafe {
            env::set_var(ENV_USERNAME, "env-user");
            env::set_var(ENV_PASSWORD, "env-pass");
            env::set_var(ENV_BASE_URL, "http://localhost:9000/");
        }
        let config = ClientConfig::from_env().unwrap();
        assert_eq!(config.username, "env-user");
        assert_eq!(config.password, "env-pass");
        assert_eq!(config.base_url, "http://localhost:9000/");

        unsafe {
            env::remove_var(ENV_USERNAME);
            env::remove_var(ENV_PASSWORD);
            env::remove_var(ENV_BASE_URL);
        }
    }

    #[test]
    fn test_debug_masks_password() {
        let config = ClientConfig::new("user", "hunter2");
        let shown = format!("{:?}", config);
        assert!(shown.contains("user"));
        assert!(!shown.contains("hunter2"));
    }

    #[test]
    fn test_transport_sends_user_agent() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("GET", "/CountryList")
            .match_header("user-agent", "eoddata-test")
            .with_status(200)
            .with_body("<RESPONSE Message=\"Success\"/>")
            .create();

        let config = ClientConfig::new("user", "pass").with_user_agent("eoddata-test");
        let transport = config.transport().unwrap();
        let request = Request {
            endpoint: Endpoint::CountryList,
            method: Method::Get,
            url: format!("{}/CountryList", server.url()),
            params: Vec::new(),
        };
        let response = transport.send(&request).unwrap();

        mock.assert();
        assert_eq!(response.status, 200);
    }
}
