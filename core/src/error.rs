//! Error types for the Lunatask API client.
//!
//! # Design
//! The API documents a fixed set of status codes. Each gets its own variant of
//! [`LunataskError`] so callers can match narrowly on a kind or broadly on the
//! whole type. Any status outside the documented set lands in
//! [`LunataskError::Http`] with the transport's message, and failures that
//! never produced a response are wrapped in [`LunataskError::Transport`].

use std::error::Error as StdError;

use thiserror::Error;

/// Status codes documented by the Lunatask API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApiErrorCode {
    Unauthorized = 401,
    NotFound = 404,
    UnprocessableEntity = 422,
    InternalServerError = 500,
    ServiceUnavailable = 503,
    RequestTimedOut = 524,
}

impl ApiErrorCode {
    /// Look up a status code, returning `None` for codes the API does not document.
    pub fn from_status(status: u16) -> Option<Self> {
        match status {
            401 => Some(Self::Unauthorized),
            404 => Some(Self::NotFound),
            422 => Some(Self::UnprocessableEntity),
            500 => Some(Self::InternalServerError),
            503 => Some(Self::ServiceUnavailable),
            524 => Some(Self::RequestTimedOut),
            _ => None,
        }
    }

    pub fn status(self) -> u16 {
        self as u16
    }

    pub fn message(self) -> &'static str {
        match self {
            Self::Unauthorized => "Your access token is missing, is wrong, or was revoked.",
            Self::NotFound => "The specified entity could not be found.",
            Self::UnprocessableEntity => {
                "The provided entity is not valid. Check what data you are sending."
            }
            Self::InternalServerError => {
                "We encountered a problem processing your request and have been notified."
            }
            Self::ServiceUnavailable => {
                "We're temporarily offline for maintenance. Please, try again later."
            }
            Self::RequestTimedOut => "Please, try again.",
        }
    }
}

/// A request that failed before any HTTP response was received.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct TransportError {
    message: String,
    #[source]
    source: Option<Box<dyn StdError + Send + Sync + 'static>>,
}

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source<E>(message: impl Into<String>, source: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Errors returned by every Lunatask client operation.
#[derive(Debug, Error)]
pub enum LunataskError {
    #[error("Your access token is missing, is wrong, or was revoked.")]
    Unauthorized,

    #[error("The specified entity could not be found.")]
    NotFound,

    #[error("The provided entity is not valid. Check what data you are sending.")]
    UnprocessableEntity,

    #[error("We encountered a problem processing your request and have been notified.")]
    InternalServerError,

    #[error("We're temporarily offline for maintenance. Please, try again later.")]
    ServiceUnavailable,

    #[error("Please, try again.")]
    RequestTimedOut,

    /// A non-2xx status the API does not document. `body` holds the raw
    /// response body and is kept out of the message.
    #[error("{message}")]
    Http {
        status: u16,
        message: String,
        body: String,
    },

    /// The request never produced a response.
    #[error("{0}")]
    Transport(#[from] TransportError),

    #[error("serialization failed: {0}")]
    Serialization(String),

    #[error("deserialization failed: {0}")]
    Deserialization(String),
}

impl LunataskError {
    pub fn from_code(code: ApiErrorCode) -> Self {
        match code {
            ApiErrorCode::Unauthorized => Self::Unauthorized,
            ApiErrorCode::NotFound => Self::NotFound,
            ApiErrorCode::UnprocessableEntity => Self::UnprocessableEntity,
            ApiErrorCode::InternalServerError => Self::InternalServerError,
            ApiErrorCode::ServiceUnavailable => Self::ServiceUnavailable,
            ApiErrorCode::RequestTimedOut => Self::RequestTimedOut,
        }
    }

    /// Map a failed response to its typed error.
    ///
    /// Undocumented statuses keep the generic message; the response body is
    /// stored separately on [`LunataskError::Http`].
    pub fn from_status(status: u16, body: &str) -> Self {
        if let Some(code) = ApiErrorCode::from_status(status) {
            return Self::from_code(code);
        }
        Self::Http {
            status,
            message: format!("Request failed with status code {status}"),
            body: body.to_string(),
        }
    }

    /// The documented status code behind this error, if any.
    pub fn code(&self) -> Option<ApiErrorCode> {
        match self {
            Self::Unauthorized => Some(ApiErrorCode::Unauthorized),
            Self::NotFound => Some(ApiErrorCode::NotFound),
            Self::UnprocessableEntity => Some(ApiErrorCode::UnprocessableEntity),
            Self::InternalServerError => Some(ApiErrorCode::InternalServerError),
            Self::ServiceUnavailable => Some(ApiErrorCode::ServiceUnavailable),
            Self::RequestTimedOut => Some(ApiErrorCode::RequestTimedOut),
            Self::Http { .. }
            | Self::Transport(_)
            | Self::Serialization(_)
            | Self::Deserialization(_) => None,
        }
    }

    /// HTTP status carried by this error, when the server answered.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            other => other.code().map(ApiErrorCode::status),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_CODES: [ApiErrorCode; 6] = [
        ApiErrorCode::Unauthorized,
        ApiErrorCode::NotFound,
        ApiErrorCode::UnprocessableEntity,
        ApiErrorCode::InternalServerError,
        ApiErrorCode::ServiceUnavailable,
        ApiErrorCode::RequestTimedOut,
    ];

    #[test]
    fn codes_roundtrip_through_status() {
        for code in ALL_CODES {
            assert_eq!(ApiErrorCode::from_status(code.status()), Some(code));
        }
    }

    #[test]
    fn typed_errors_carry_documented_message() {
        for code in ALL_CODES {
            let err = LunataskError::from_code(code);
            assert_eq!(err.to_string(), code.message());
            assert_eq!(err.code(), Some(code));
        }
    }

    #[test]
    fn undocumented_status_falls_back_to_http() {
        let err = LunataskError::from_status(418, "");
        assert!(matches!(err, LunataskError::Http { status: 418, .. }));
        assert_eq!(err.to_string(), "Request failed with status code 418");
        assert_eq!(err.code(), None);
        assert_eq!(err.status(), Some(418));
    }

    #[test]
    fn undocumented_status_keeps_body_out_of_message() {
        let page = format!("<html>{}</html>", "x".repeat(20_000));
        let err = LunataskError::from_status(502, &page);
        assert_eq!(err.to_string(), "Request failed with status code 502");
        let LunataskError::Http { body, .. } = err else {
            panic!("expected Http error");
        };
        assert_eq!(body, page);
    }

    #[test]
    fn documented_status_ignores_body() {
        let err = LunataskError::from_status(404, r#"{"message":"Not found"}"#);
        assert!(matches!(err, LunataskError::NotFound));
        assert_eq!(err.status(), Some(404));
    }

    #[test]
    fn transport_error_keeps_its_own_message() {
        let source = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        let err: LunataskError = TransportError::with_source("connection refused", source).into();
        assert_eq!(err.to_string(), "connection refused");
        assert_eq!(err.status(), None);
        let LunataskError::Transport(inner) = err else {
            panic!("expected transport error");
        };
        assert!(StdError::source(&inner).is_some());
    }
}
