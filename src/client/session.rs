//! Session state and the login handshake.

use log::{info, warn};
use roxmltree::Document;
use std::fmt;

use super::Endpoint;
use super::classify::{Outcome, classify, classify_document};
use crate::error::{DomainError, Error, Result};
use crate::http::{Method, Request, Transport};

/// Credentials, base URL and the token issued by the most recent login.
pub struct Session {
    username: String,
    password: String,
    base_url: String,
    token: Option<String>,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("username", &self.username)
            .field("base_url", &self.base_url)
            .field("token", &self.token.as_deref().map(mask_token))
            .finish()
    }
}

impl Session {
    /// `base_url` must already end with `/`.
    pub fn new(
        username: impl Into<String>,
        password: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            base_url: base_url.into(),
            token: None,
        }
    }

    /// Token to attach to the next request, if a login has succeeded.
    pub fn current_token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn url(&self, endpoint: Endpoint) -> String {
        format!("{}{}", self.base_url, endpoint.as_str())
    }

    /// Performs the login handshake.
    ///
    /// Returns `Ok(true)` and stores the new token on success, `Ok(false)` for
    /// any other service answer, and [`DomainError::InvalidCredentials`] when
    /// the service rejects the username or password. The stored token is left
    /// untouched on failure.
    #[tracing::instrument(skip(self, transport), fields(username = %self.username))]
    pub fn login<T: Transport + ?Sized>(&mut self, transport: &T) -> Result<bool> {
        let request = Request {
            endpoint: Endpoint::Login,
            method: Method::Post,
            url: self.url(Endpoint::Login),
            params: vec![
                ("Username".to_string(), self.username.clone()),
                ("Password".to_string(), self.password.clone()),
            ],
        };

        let response = transport.send(&request)?;

        let outcome = if response.status == 200 {
            let doc = Document::parse(&response.body)?;
            classify_document(&doc)?
        } else {
            classify(response.status, None, None)?
        };

        match outcome {
            Outcome::SuccessWithToken(token) => {
                info!("Logged in as {} (token {})", self.username, mask_token(&token));
                self.token = Some(token);
                Ok(true)
            }
            Outcome::DomainError(DomainError::InvalidCredentials) => {
                warn!("Login rejected for {}: invalid username or password", self.username);
                Err(Error::Domain(DomainError::InvalidCredentials))
            }
            other => {
                warn!("Login failed for {}: {:?}", self.username, other);
                Ok(false)
            }
        }
    }
}

/// Shows the first and last four characters of a token.
pub fn mask_token(token: &str) -> String {
    let chars: Vec<char> = token.chars().collect();
    if chars.len() <= 8 {
        return "*********".to_string();
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}*********{}", head, tail)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::{MockTransport, RawResponse};

    fn session() -> Session {
        Session::new("user", "pass", "http://ws.test/data.asmx/")
    }

    #[test]
    fn test_login_stores_token() {
        let mut transport = MockTransport::new();
        transport
            .expect_send()
            .withf(|r| {
                r.endpoint == Endpoint::Login
                    && r.method == Method::Post
                    && r.url == "http://ws.test/data.asmx/Login"
                    && r.param("Username") == Some("user")
                    && r.param("Password") == Some("pass")
            })
            .times(1)
            .returning(|_| {
                Ok(RawResponse::new(
                    200,
                    r#"<LOGINRESPONSE Message="Login Successful" Token="abc123"/>"#,
                ))
            });

        let mut session = session();
        assert_eq!(session.current_token(), None);
        assert!(session.login(&transport).unwrap());
        assert_eq!(session.current_token(), Some("abc123"));
    }

    #[test]
    fn test_login_failure_keeps_previous_token() {
        let mut transport = MockTransport::new();
        let mut responses = vec![
            RawResponse::new(500, ""),
            RawResponse::new(200, r#"<LOGINRESPONSE Message="Login Successful" Token="first"/>"#),
        ];
        transport
            .expect_send()
            .times(2)
            .returning(move |_| Ok(responses.pop().unwrap()));

        let mut session = session();
        assert!(session.login(&transport).unwrap());
        assert!(!session.login(&transport).unwrap());
        assert_eq!(session.current_token(), Some("first"));
    }

    #[test]
    fn test_login_invalid_credentials_is_error() {
        let mut transport = MockTransport::new();
        transport.expect_send().times(1).returning(|_| {
            Ok(RawResponse::new(
                200,
                r#"<LOGINRESPONSE Message="Invalid Username or Password"/>"#,
            ))
        });

        let mut session = session();
        let err = session.login(&transport).unwrap_err();
        assert_eq!(err.domain(), Some(&DomainError::InvalidCredentials));
        assert_eq!(session.current_token(), None);
    }

    #[test]
    fn test_login_other_message_is_false() {
        let mut transport = MockTransport::new();
        transport.expect_send().times(1).returning(|_| {
            Ok(RawResponse::new(200, r#"<LOGINRESPONSE Message="Service Unavailable"/>"#))
        });

        let mut session = session();
        assert!(!session.login(&transport).unwrap());
    }

    #[test]
    fn test_mask_token() {
        assert_eq!(mask_token("0123456789ABCDEF"), "0123*********CDEF");
        assert_eq!(mask_token("short"), "*********");
    }

    #[test]
    fn test_debug_hides_password_and_token() {
        let mut session = session();
        session.token = Some("0123456789ABCDEF".to_string());
        let shown = format!("{:?}", session);
        assert!(!shown.contains("pass\""));
        assert!(!shown.contains("0123456789ABCDEF"));
    }
}
