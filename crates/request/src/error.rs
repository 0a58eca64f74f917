use std::path::PathBuf;

use thiserror::Error;

/// Error recorded while configuring a [`RequestBuilder`](crate::RequestBuilder).
///
/// The builder keeps the first one it sees and hands a copy back from every
/// later execution, so it has to be cheap to clone and comparable.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The proxy URL could not be parsed or was rejected by the transport
    #[error("invalid proxy url {url:?}: {reason}")]
    InvalidProxy { url: String, reason: String },
}

impl ConfigError {
    pub(crate) fn invalid_proxy(url: impl Into<String>, reason: impl ToString) -> Self {
        Self::InvalidProxy {
            url: url.into(),
            reason: reason.to_string(),
        }
    }
}

/// Errors that can occur when executing a request
#[derive(Error, Debug)]
pub enum RequestError {
    /// Configuration error captured by the builder
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The payload could not be serialized to JSON
    #[error("serialization error: {0}")]
    Serialization(#[source] serde_json::Error),

    /// Gzip compression of the request body failed
    #[error("compress body err: {0}")]
    Compression(#[source] std::io::Error),

    /// The request could not be assembled (bad URL, header name or value)
    #[error("build error: {0}")]
    Build(String),

    /// Writing the reproducible command to the log file failed
    #[error("log err: cannot write {}: {source}", .path.display())]
    LogFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The underlying HTTP client could not be constructed
    #[error("client build error: {0}")]
    ClientBuild(#[source] reqwest::Error),

    /// Network or connection failure reported by the transport
    #[error("request failed: {0}")]
    Transport(#[source] reqwest::Error),

    /// A redirect was returned while redirect following is disabled
    #[error("redirect encountered{}", .location.as_deref().map(|l| format!(": {l}")).unwrap_or_default())]
    RedirectEncountered { location: Option<String> },

    /// The caller cancelled the exchange
    #[error("request cancelled")]
    Cancelled,

    /// The response body could not be read
    #[error("response read error: {0}")]
    ResponseRead(#[source] reqwest::Error),

    /// The server answered with a status code of 300 or above
    #[error("response err: {code} {status_text} {body}")]
    Status {
        code: u16,
        status_text: String,
        body: String,
    },

    /// The response body could not be decoded into the requested type
    #[error("decode error: {0}")]
    Decode(#[source] serde_json::Error),
}

impl RequestError {
    /// Returns the HTTP status code for [`RequestError::Status`]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// Returns the captured response body for [`RequestError::Status`]
    pub fn body(&self) -> Option<&str> {
        match self {
            Self::Status { body, .. } => Some(body),
            _ => None,
        }
    }

    pub fn is_redirect(&self) -> bool {
        matches!(self, Self::RedirectEncountered { .. })
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

/// Sentinel error handed to reqwest's redirect hook when redirects are denied
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("redirect")]
pub(crate) struct RedirectDenied;

/// Result alias used throughout the crate
pub type Result<T, E = RequestError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn status_error_formats_code_text_and_body() {
        let err = RequestError::Status {
            code: 404,
            status_text: "Not Found".into(),
            body: "not found".into(),
        };
        assert_eq!(err.to_string(), "response err: 404 Not Found not found");
        assert_eq!(err.status(), Some(404));
        assert_eq!(err.body(), Some("not found"));
    }

    #[test]
    fn redirect_error_mentions_location() {
        let err = RequestError::RedirectEncountered {
            location: Some("http://example.com/next".into()),
        };
        assert!(err.is_redirect());
        assert_eq!(err.to_string(), "redirect encountered: http://example.com/next");

        let bare = RequestError::RedirectEncountered { location: None };
        assert_eq!(bare.to_string(), "redirect encountered");
    }

    #[test]
    fn config_error_is_comparable_after_clone() {
        let err = ConfigError::invalid_proxy("::bad", "relative URL without a base");
        assert_eq!(err.clone(), err);
        let wrapped = RequestError::from(err);
        assert!(wrapped.to_string().starts_with("configuration error: invalid proxy url"));
    }
}
