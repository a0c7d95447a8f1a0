//! Error types for the wikitext document model, parser and API glue.
//!
//! All fallible operations in the crate share one error enum, `WikiError`,
//! plus the `Result<T>` alias. Variants carry enough context to be useful in
//! logs (template/parameter names, nesting depth, underlying causes).
//!
//! Absence is not an error for `pop`, `contains` and `has_key`; those
//! return `Option`/`bool` instead of using this type.

use std::error::Error;
use std::fmt;

/// The canonical result type used across the crate.
pub type Result<T> = std::result::Result<T, WikiError>;

/// Crate-wide error with rich variants.
///
/// - `Parse` - a malformed tagged tree or parsetree XML payload.
/// - `DepthExceeded` - the tagged tree nested deeper than the configured
///    maximum; carries both the offending depth and the limit.
/// - `ParameterNotFound` - an indexed parameter lookup on a template whose
///    parameter list does not contain the key.
/// - `Http` - transport-level failure while talking to the wiki.
/// - `Response` - the server answered, but with an error envelope or a
///    payload missing the expected fields.
#[derive(Debug)]
pub enum WikiError {
    Parse {
        msg: String,
    },
    DepthExceeded {
        depth: usize,
        max: usize,
    },
    ParameterNotFound {
        template: String,
        key: String,
    },
    Http {
        msg: String,
        source: Option<Box<dyn Error + Send + Sync + 'static>>,
    },
    Response {
        msg: String,
    },
}

impl WikiError {
    /// Construct a parse error with a message.
    pub fn parse<S: Into<String>>(msg: S) -> Self {
        WikiError::Parse { msg: msg.into() }
    }

    /// Construct a depth-exceeded error.
    pub fn depth_exceeded(depth: usize, max: usize) -> Self {
        WikiError::DepthExceeded { depth, max }
    }

    /// Construct a parameter-not-found error.
    pub fn param_not_found<S: Into<String>, K: Into<String>>(template: S, key: K) -> Self {
        WikiError::ParameterNotFound {
            template: template.into(),
            key: key.into(),
        }
    }

    /// Wrap an underlying transport error as an Http variant.
    pub fn http<E: Error + Send + Sync + 'static>(msg: impl Into<String>, e: E) -> Self {
        WikiError::Http {
            msg: msg.into(),
            source: Some(Box::new(e)),
        }
    }

    /// Construct a bad-response error.
    pub fn response<S: Into<String>>(msg: S) -> Self {
        WikiError::Response { msg: msg.into() }
    }

    /// Returns a short description of the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            WikiError::Parse { .. } => "Parse",
            WikiError::DepthExceeded { .. } => "DepthExceeded",
            WikiError::ParameterNotFound { .. } => "ParameterNotFound",
            WikiError::Http { .. } => "Http",
            WikiError::Response { .. } => "Response",
        }
    }

    /// If the error has an underlying source, return it.
    pub fn source_opt(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            WikiError::Http { source, .. } => source.as_ref().map(|b| b.as_ref() as &dyn Error),
            _ => None,
        }
    }
}

impl fmt::Display for WikiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WikiError::Parse { msg } => write!(f, "Parse error: {}", msg),
            WikiError::DepthExceeded { depth, max } => {
                write!(f, "Nesting depth {} exceeds the maximum of {}", depth, max)
            }
            WikiError::ParameterNotFound { template, key } => {
                write!(f, "'{}' is not a parameter of '{{{{{}}}}}'", key, template)
            }
            WikiError::Http { msg, source } => {
                if let Some(s) = source {
                    write!(f, "HTTP error: {} (cause: {})", msg, s)
                } else {
                    write!(f, "HTTP error: {}", msg)
                }
            }
            WikiError::Response { msg } => write!(f, "Bad response: {}", msg),
        }
    }
}

impl Error for WikiError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.source_opt()
    }
}

/* Common conversions to make error propagation ergonomic. */

impl From<reqwest::Error> for WikiError {
    fn from(e: reqwest::Error) -> Self {
        WikiError::http("request failed", e)
    }
}

impl From<reqwest_middleware::Error> for WikiError {
    fn from(e: reqwest_middleware::Error) -> Self {
        WikiError::http("request failed", e)
    }
}

impl From<url::ParseError> for WikiError {
    fn from(e: url::ParseError) -> Self {
        WikiError::http("invalid url", e)
    }
}

impl From<regex::Error> for WikiError {
    fn from(e: regex::Error) -> Self {
        WikiError::response(format!("could not compile namespace pattern: {}", e))
    }
}

impl From<serde_json::Error> for WikiError {
    fn from(e: serde_json::Error) -> Self {
        WikiError::response(format!("could not decode response body: {}", e))
    }
}
