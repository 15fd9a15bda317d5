// ── Core error types ──
//
// Every failure in the registry core is classified into a wire-visible
// status class. Payload validation problems are always client-class;
// service outcomes carry whatever code the management service chose.
// `ServiceError` is the only type that carries an arbitrary status code,
// and its constructors refuse codes outside the range of their class.

use std::fmt;
use std::ops::Range;

use http::StatusCode;
use thiserror::Error;

// ── StatusClass ─────────────────────────────────────────────────────

/// Which side of the conversation an error is attributed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum StatusClass {
    /// The request was at fault (`400..500`).
    Client,
    /// The service was at fault (`500..600`).
    Server,
}

impl StatusClass {
    /// Half-open range of status codes belonging to this class.
    pub const fn range(self) -> Range<u16> {
        match self {
            Self::Client => 400..500,
            Self::Server => 500..600,
        }
    }

    /// Classify a status code, or `None` if it does not denote an error.
    pub fn of(code: u16) -> Option<Self> {
        [Self::Client, Self::Server]
            .into_iter()
            .find(|class| class.range().contains(&code))
    }

    /// Check that `code` belongs to this class.
    pub fn validate(self, code: u16) -> Result<u16, ClassificationError> {
        let range = self.range();
        if range.contains(&code) {
            Ok(code)
        } else {
            Err(ClassificationError::OutOfRange {
                class: self,
                code,
                min: range.start,
                max: range.end,
            })
        }
    }
}

// ── ClassificationError ─────────────────────────────────────────────

/// Raised when a classified error is built with a code outside its class.
///
/// This is a programmer error: correct code paths never construct one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ClassificationError {
    #[error("{class} error code must be >= {min} and < {max}, got {code}")]
    OutOfRange {
        class: StatusClass,
        code: u16,
        min: u16,
        max: u16,
    },

    #[error("status code {code} does not denote an error")]
    NotAnError { code: u16 },
}

// ── ServiceError ────────────────────────────────────────────────────

type BoxedCause = Box<dyn std::error::Error + Send + Sync>;

/// Outcome of a failed service invocation, tagged with its status class.
///
/// The status code is validated against the class when the error is built,
/// so an existing `ServiceError` always carries a consistent pair.
#[derive(Debug)]
pub struct ServiceError {
    class: StatusClass,
    code: u16,
    message: Option<String>,
    cause: Option<BoxedCause>,
}

impl ServiceError {
    /// A client error. Fails unless `400 <= code < 500`.
    pub fn client(code: u16, message: impl Into<String>) -> Result<Self, ClassificationError> {
        Self::classified(StatusClass::Client, code, Some(message.into()))
    }

    /// A server error. Fails unless `500 <= code < 600`.
    pub fn server(code: u16, message: impl Into<String>) -> Result<Self, ClassificationError> {
        Self::classified(StatusClass::Server, code, Some(message.into()))
    }

    /// An error whose class is derived from the code itself.
    pub fn from_status(code: u16, message: Option<String>) -> Result<Self, ClassificationError> {
        let class = StatusClass::of(code).ok_or(ClassificationError::NotAnError { code })?;
        Self::classified(class, code, message)
    }

    fn classified(
        class: StatusClass,
        code: u16,
        message: Option<String>,
    ) -> Result<Self, ClassificationError> {
        let code = class.validate(code)?;
        Ok(Self {
            class,
            code,
            message,
            cause: None,
        })
    }

    // Fixed codes known to be in range.

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::fixed(StatusClass::Client, StatusCode::BAD_REQUEST, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::fixed(StatusClass::Server, StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    pub fn bad_gateway(message: impl Into<String>) -> Self {
        Self::fixed(StatusClass::Server, StatusCode::BAD_GATEWAY, message)
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::fixed(StatusClass::Server, StatusCode::SERVICE_UNAVAILABLE, message)
    }

    pub fn gateway_timeout(message: impl Into<String>) -> Self {
        Self::fixed(StatusClass::Server, StatusCode::GATEWAY_TIMEOUT, message)
    }

    fn fixed(class: StatusClass, status: StatusCode, message: impl Into<String>) -> Self {
        debug_assert!(class.range().contains(&status.as_u16()));
        Self {
            class,
            code: status.as_u16(),
            message: Some(message.into()),
            cause: None,
        }
    }

    /// Attach the root cause.
    #[must_use]
    pub fn with_cause(mut self, cause: impl Into<BoxedCause>) -> Self {
        self.cause = Some(cause.into());
        self
    }

    pub fn class(&self) -> StatusClass {
        self.class
    }

    pub fn code(&self) -> u16 {
        self.code
    }

    /// The code as an HTTP status. Always valid, since it passed the class check.
    pub fn status(&self) -> StatusCode {
        StatusCode::from_u16(self.code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.message {
            Some(message) => write!(f, "{message}"),
            None => write!(f, "{} error (status {})", self.class, self.code),
        }
    }
}

impl std::error::Error for ServiceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.cause
            .as_deref()
            .map(|cause| cause as &(dyn std::error::Error + 'static))
    }
}

// ── CoreError ───────────────────────────────────────────────────────

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Payload validation ───────────────────────────────────────────
    #[error("'{field}' field must be set")]
    MissingField { field: &'static str },

    #[error("'{field}' value : '{value}' does not match allowed pattern: {pattern}")]
    PatternMismatch {
        field: &'static str,
        value: String,
        pattern: &'static str,
    },

    #[error("Property '{existing}' and '{requested}' must not be set at the same time")]
    MutuallyExclusive {
        existing: &'static str,
        requested: &'static str,
    },

    #[error("Invalid '{credential_type}' credential: {message}")]
    InvalidCredential {
        credential_type: String,
        message: String,
    },

    #[error("Malformed payload: {message}")]
    MalformedPayload { message: String },

    #[error("Request body of {size} bytes exceeds the limit of {limit} bytes")]
    PayloadTooLarge { size: usize, limit: usize },

    #[error("Invalid request parameter '{name}': {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    #[error("Method {method} is not allowed on this resource")]
    MethodNotAllowed { method: String },

    // ── Rendering ────────────────────────────────────────────────────
    #[error("Failed to encode response: {message}")]
    Encoding { message: String },

    #[error("Service reported an invalid status code {code}")]
    InvalidStatus { code: u16 },

    // ── Classification ───────────────────────────────────────────────
    #[error(transparent)]
    Classification(#[from] ClassificationError),

    // ── Service outcomes ─────────────────────────────────────────────
    #[error(transparent)]
    Service(#[from] ServiceError),
}

impl CoreError {
    /// The status code this error is reported with.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::MissingField { .. }
            | Self::PatternMismatch { .. }
            | Self::MutuallyExclusive { .. }
            | Self::InvalidCredential { .. }
            | Self::MalformedPayload { .. }
            | Self::InvalidParameter { .. } => StatusCode::BAD_REQUEST,
            Self::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            Self::MethodNotAllowed { .. } => StatusCode::METHOD_NOT_ALLOWED,
            Self::Encoding { .. } | Self::InvalidStatus { .. } | Self::Classification(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::Service(err) => err.status(),
        }
    }

    pub fn status_class(&self) -> StatusClass {
        match self {
            Self::Service(err) => err.class(),
            Self::Encoding { .. } | Self::InvalidStatus { .. } | Self::Classification(_) => {
                StatusClass::Server
            }
            _ => StatusClass::Client,
        }
    }

    /// Returns `true` if the request payload (rather than the service) was at fault.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::MissingField { .. }
                | Self::PatternMismatch { .. }
                | Self::MutuallyExclusive { .. }
                | Self::InvalidCredential { .. }
                | Self::MalformedPayload { .. }
        )
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(err: serde_json::Error) -> Self {
        Self::MalformedPayload {
            message: err.to_string(),
        }
    }
}
