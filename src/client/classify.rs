//! Response classification.
//!
//! Every EodData response is an XML document whose root element carries a
//! `Message` attribute. Together with the HTTP status it decides whether the
//! payload can be decoded, the session has to be renewed, or the service
//! rejected the request.

use roxmltree::{Document, Node};

use crate::error::{DomainError, Error, Result};

pub const MSG_SUCCESS: &str = "Success";
pub const MSG_LOGIN_SUCCESSFUL: &str = "Login Successful";
pub const MSG_INVALID_TOKEN: &str = "Invalid Token";
pub const MSG_NOT_LOGGED_IN: &str = "Not logged in";
pub const MSG_INVALID_EXCHANGE: &str = "Invalid Exchange Code";
pub const MSG_INVALID_SYMBOL: &str = "Invalid Symbol Code";
pub const MSG_INVALID_CREDENTIALS: &str = "Invalid Username or Password";

/// Category of one HTTP exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Success,
    SuccessWithToken(String),
    NeedsReauth,
    DomainError(DomainError),
    /// HTTP 500. The client maps it to a relogin or a backoff retry
    /// according to its [`ServerErrorPolicy`](crate::ServerErrorPolicy).
    ServerError(u16),
    /// Any other non-200 status
    UnexpectedStatus(u16),
}

/// Classifies a response from its HTTP status, the root `Message` attribute
/// and the root `Token` attribute.
///
/// `message` is only consulted for status 200; a 200 without a message, or a
/// login success without a token, is a malformed response.
pub fn classify(status: u16, message: Option<&str>, token: Option<&str>) -> Result<Outcome> {
    match status {
        200 => {}
        500 => return Ok(Outcome::ServerError(status)),
        other => return Ok(Outcome::UnexpectedStatus(other)),
    }

    let message = message
        .ok_or_else(|| Error::malformed("root", "missing attribute `Message`"))?
        .trim();

    let outcome = match message {
        MSG_SUCCESS => Outcome::Success,
        MSG_LOGIN_SUCCESSFUL => match token.map(str::trim) {
            Some(token) if !token.is_empty() => Outcome::SuccessWithToken(token.to_string()),
            _ => {
                return Err(Error::malformed(
                    "root",
                    "login succeeded without a `Token` attribute",
                ));
            }
        },
        MSG_INVALID_TOKEN | MSG_NOT_LOGGED_IN => Outcome::NeedsReauth,
        MSG_INVALID_EXCHANGE => Outcome::DomainError(DomainError::InvalidExchangeCode),
        MSG_INVALID_SYMBOL => Outcome::DomainError(DomainError::InvalidSymbolCode),
        MSG_INVALID_CREDENTIALS => Outcome::DomainError(DomainError::InvalidCredentials),
        other => Outcome::DomainError(DomainError::Unknown(other.to_string())),
    };

    Ok(outcome)
}

/// Classifies a 200 response document by its root element.
///
/// Malformed responses name the root element.
pub fn classify_document(doc: &Document<'_>) -> Result<Outcome> {
    let root = doc.root_element();
    classify(200, root.attribute("Message"), root.attribute("Token")).map_err(|err| match err {
        Error::MalformedResponse { reason, .. } => Error::malformed(root.tag_name().name(), reason),
        other => other,
    })
}

/// Returns the first child of `root` whose local tag name ends with `suffix`.
pub fn payload<'a, 'input>(root: Node<'a, 'input>, suffix: &str) -> Result<Node<'a, 'input>> {
    root.children()
        .filter(|n| n.is_element())
        .find(|n| n.tag_name().name().ends_with(suffix))
        .ok_or_else(|| {
            Error::malformed(
                root.tag_name().name(),
                format!("no child element ending with `{}`", suffix),
            )
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_success_messages() {
        assert_eq!(classify(200, Some("Success"), None).unwrap(), Outcome::Success);
        assert_eq!(
            classify(200, Some("Login Successful"), Some("abc123")).unwrap(),
            Outcome::SuccessWithToken("abc123".to_string())
        );
    }

    #[test]
    fn test_classify_reauth_messages() {
        assert_eq!(classify(200, Some("Invalid Token"), None).unwrap(), Outcome::NeedsReauth);
        assert_eq!(classify(200, Some("Not logged in"), None).unwrap(), Outcome::NeedsReauth);
    }

    #[test]
    fn test_classify_domain_errors() {
        assert_eq!(
            classify(200, Some("Invalid Exchange Code"), None).unwrap(),
            Outcome::DomainError(DomainError::InvalidExchangeCode)
        );
        assert_eq!(
            classify(200, Some("Invalid Symbol Code"), None).unwrap(),
            Outcome::DomainError(DomainError::InvalidSymbolCode)
        );
        assert_eq!(
            classify(200, Some("Invalid Username or Password"), None).unwrap(),
            Outcome::DomainError(DomainError::InvalidCredentials)
        );
        assert_eq!(
            classify(200, Some("Exchange Closed"), None).unwrap(),
            Outcome::DomainError(DomainError::Unknown("Exchange Closed".to_string()))
        );
    }

    #[test]
    fn test_classify_status_codes() {
        assert_eq!(classify(500, None, None).unwrap(), Outcome::ServerError(500));
        assert_eq!(classify(404, Some("Success"), None).unwrap(), Outcome::UnexpectedStatus(404));
        assert_eq!(classify(503, None, None).unwrap(), Outcome::UnexpectedStatus(503));
    }

    #[test]
    fn test_classify_malformed() {
        assert!(matches!(
            classify(200, None, None),
            Err(Error::MalformedResponse { .. })
        ));
        assert!(matches!(
            classify(200, Some("Login Successful"), Some("  ")),
            Err(Error::MalformedResponse { .. })
        ));
    }

    #[test]
    fn test_classify_is_idempotent() {
        let body = r#"<RESPONSE Message="Invalid Exchange Code"/>"#;
        let doc = Document::parse(body).unwrap();
        let first = classify_document(&doc).unwrap();
        let second = classify_document(&doc).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_classify_document_reads_namespaced_root() {
        let body = r#"<LOGINRESPONSE xmlns="http://ws.eoddata.com/Data" Message="Login Successful" Token="T0K"/>"#;
        let doc = Document::parse(body).unwrap();
        assert_eq!(
            classify_document(&doc).unwrap(),
            Outcome::SuccessWithToken("T0K".to_string())
        );
    }

    #[test]
    fn test_classify_document_names_root_when_malformed() {
        let doc = Document::parse(r#"<LOGINRESPONSE Message="Login Successful"/>"#).unwrap();
        match classify_document(&doc) {
            Err(Error::MalformedResponse { element, reason }) => {
                assert_eq!(element, "LOGINRESPONSE");
                assert!(reason.contains("Token"));
            }
            other => panic!("unexpected result: {other:?}"),
        }

        let doc = Document::parse(r#"<RESPONSE xmlns="http://ws.eoddata.com/Data"/>"#).unwrap();
        match classify_document(&doc) {
            Err(Error::MalformedResponse { element, .. }) => assert_eq!(element, "RESPONSE"),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_payload_matches_suffix() {
        let body = r#"<RESPONSE xmlns="http://ws.eoddata.com/Data" Message="Success">
            <QUOTES2><QUOTE2 s="A"/></QUOTES2>
            <QUOTES><QUOTE Symbol="B"/></QUOTES>
        </RESPONSE>"#;
        let doc = Document::parse(body).unwrap();
        let root = doc.root_element();

        assert_eq!(payload(root, "QUOTES").unwrap().tag_name().name(), "QUOTES");
        assert_eq!(payload(root, "QUOTES2").unwrap().tag_name().name(), "QUOTES2");
        assert!(matches!(
            payload(root, "EXCHANGES"),
            Err(Error::MalformedResponse { .. })
        ));
    }
}
