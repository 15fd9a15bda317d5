//! CLI error types with miette diagnostics.
//!
//! Maps library errors and registry outcome statuses into user-facing
//! errors with actionable help text.

use miette::Diagnostic;
use reqwest::StatusCode;
use thiserror::Error;

use devreg_config::ConfigError;
use devreg_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONFLICT: i32 = 6;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────

    #[error("Could not connect to registry at {url}")]
    #[diagnostic(
        code(devreg::connection_failed),
        help(
            "Check that the registry is running and reachable.\n\
             URL: {url}"
        )
    )]
    ConnectionFailed {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("TLS setup failed: {reason}")]
    #[diagnostic(
        code(devreg::tls_error),
        help(
            "Use --insecure (-k) to accept self-signed certificates, \
             or configure ca_cert in your profile."
        )
    )]
    Tls { reason: String },

    #[error("Request timed out after {seconds}s")]
    #[diagnostic(
        code(devreg::timeout),
        help("Increase timeout with --timeout or check registry responsiveness.")
    )]
    Timeout { seconds: u64 },

    // ── Authentication ───────────────────────────────────────────────

    #[error("Registry rejected the request ({status})")]
    #[diagnostic(
        code(devreg::auth_failed),
        help(
            "Verify username and password of profile '{profile}'.\n\
             The password is read from password_env, DEVREG_PASSWORD, or the profile."
        )
    )]
    AuthFailed { status: StatusCode, profile: String },

    #[error("No password configured for user '{username}' in profile '{profile}'")]
    #[diagnostic(
        code(devreg::no_credentials),
        help("Set password_env in the profile or export DEVREG_PASSWORD.")
    )]
    NoCredentials { profile: String, username: String },

    // ── Registry outcomes ────────────────────────────────────────────

    #[error("No credentials found for device '{device_id}' of tenant '{tenant_id}'")]
    #[diagnostic(code(devreg::not_found))]
    NotFound { tenant_id: String, device_id: String },

    #[error("Resource version '{version}' no longer matches the registry")]
    #[diagnostic(
        code(devreg::precondition_failed),
        help("Fetch the current version with: devreg credentials get, then retry with --if-match")
    )]
    PreconditionFailed { version: String },

    #[error("Registry returned status {status}: {message}")]
    #[diagnostic(code(devreg::registry_error))]
    Registry { status: StatusCode, message: String },

    // ── Validation ───────────────────────────────────────────────────

    #[error("{message}")]
    #[diagnostic(code(devreg::invalid_payload), help("Fix {path} and run the command again."))]
    InvalidPayload { path: String, message: String },

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(devreg::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────

    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(devreg::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Inspect them with: devreg config show"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("No registry configured")]
    #[diagnostic(
        code(devreg::no_registry),
        help(
            "Pass --registry <URL>, or add a profile to the config file.\n\
             Expected at: {path}"
        )
    )]
    NoRegistry { path: String },

    #[error(transparent)]
    #[diagnostic(code(devreg::config))]
    Config(Box<ConfigError>),

    // ── IO / Serialization ───────────────────────────────────────────

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Failed to render output: {0}")]
    #[diagnostic(code(devreg::render))]
    Render(String),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } | Self::Tls { .. } => exit_code::CONNECTION,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::AuthFailed { .. } | Self::NoCredentials { .. } => exit_code::AUTH,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::PreconditionFailed { .. } => exit_code::CONFLICT,
            Self::InvalidPayload { .. }
            | Self::Validation { .. }
            | Self::ProfileNotFound { .. }
            | Self::NoRegistry { .. } => exit_code::USAGE,
            Self::Registry { status, .. } => match *status {
                StatusCode::BAD_REQUEST | StatusCode::PAYLOAD_TOO_LARGE => exit_code::USAGE,
                StatusCode::BAD_GATEWAY | StatusCode::SERVICE_UNAVAILABLE => {
                    exit_code::CONNECTION
                }
                StatusCode::GATEWAY_TIMEOUT => exit_code::TIMEOUT,
                _ => exit_code::GENERAL,
            },
            Self::Config(_) | Self::Io(_) | Self::Render(_) => exit_code::GENERAL,
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => Self::Validation { field, reason },
            ConfigError::NoCredentials { profile, username } => {
                Self::NoCredentials { profile, username }
            }
            other => Self::Config(Box::new(other)),
        }
    }
}

impl From<devreg_api::Error> for CliError {
    fn from(err: devreg_api::Error) -> Self {
        use devreg_api::Error as ApiError;

        match err {
            ApiError::Timeout { timeout_secs } => Self::Timeout {
                seconds: timeout_secs,
            },
            ApiError::Tls(reason) => Self::Tls { reason },
            ApiError::Transport(e) if e.is_connect() => Self::ConnectionFailed {
                url: e.url().map(ToString::to_string).unwrap_or_default(),
                source: Box::new(e),
            },
            ApiError::InvalidBaseUrl(url) => Self::Validation {
                field: "registry".into(),
                reason: format!("{url} cannot be used as a registry base URL"),
            },
            ApiError::Payload(core) => core.into(),
            other => Self::Registry {
                status: StatusCode::BAD_GATEWAY,
                message: other.to_string(),
            },
        }
    }
}

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::InvalidParameter { name, reason } => Self::Validation {
                field: name.into(),
                reason,
            },
            other => Self::Registry {
                status: other.status_code(),
                message: other.to_string(),
            },
        }
    }
}
