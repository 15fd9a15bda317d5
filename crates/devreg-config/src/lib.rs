//! Shared configuration for devreg tools.
//!
//! TOML profiles, credential resolution (env + plaintext), and translation
//! to `devreg_api::ClientConfig` and `devreg_core::EndpointConfig`. The CLI
//! adds `GlobalOpts`-aware overrides on top.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use devreg_api::{BasicAuth, ClientConfig, TlsMode, TransportConfig};
use devreg_core::EndpointConfig;
use devreg_core::config::{DEFAULT_API_VERSION, DEFAULT_MAX_PAYLOAD_SIZE};

const ENV_PREFIX: &str = "DEVREG_";
const ENV_PASSWORD: &str = "DEVREG_PASSWORD";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("profile '{profile}' not found in config")]
    ProfileNotFound { profile: String },

    #[error("no password configured for user '{username}' in profile '{profile}'")]
    NoCredentials { profile: String, username: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    /// Default profile name.
    pub default_profile: Option<String>,

    /// Global defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// How a locally hosted credentials endpoint presents itself.
    #[serde(default)]
    pub endpoint: EndpointSettings,

    /// Named registry profiles.
    #[serde(default)]
    pub profiles: BTreeMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            endpoint: EndpointSettings::default(),
            profiles: BTreeMap::new(),
        }
    }
}

impl Config {
    /// Look up a profile by name, falling back to `default_profile`.
    pub fn profile<'a>(&'a self, name: Option<&'a str>) -> Result<(&'a str, &'a Profile), ConfigError> {
        let name = name
            .or(self.default_profile.as_deref())
            .unwrap_or("default");
        self.profiles
            .get(name)
            .map(|profile| (name, profile))
            .ok_or_else(|| ConfigError::ProfileNotFound {
                profile: name.into(),
            })
    }

    /// Render as TOML. Passwords are never written out.
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default)]
    pub insecure: bool,

    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            insecure: false,
            timeout: default_timeout(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_timeout() -> u64 {
    30
}

/// `[endpoint]` section, mirrored into [`EndpointConfig`].
#[derive(Debug, Deserialize, Serialize)]
pub struct EndpointSettings {
    #[serde(default = "default_api_version")]
    pub api_version: String,

    #[serde(default = "default_max_payload_size")]
    pub max_payload_size: usize,

    #[serde(default = "default_cors_allowed_origin")]
    pub cors_allowed_origin: String,
}

impl Default for EndpointSettings {
    fn default() -> Self {
        Self {
            api_version: default_api_version(),
            max_payload_size: default_max_payload_size(),
            cors_allowed_origin: default_cors_allowed_origin(),
        }
    }
}

fn default_api_version() -> String {
    DEFAULT_API_VERSION.into()
}
fn default_max_payload_size() -> usize {
    DEFAULT_MAX_PAYLOAD_SIZE
}
fn default_cors_allowed_origin() -> String {
    "*".into()
}

impl From<&EndpointSettings> for EndpointConfig {
    fn from(settings: &EndpointSettings) -> Self {
        Self {
            api_version: settings.api_version.clone(),
            max_payload_size: settings.max_payload_size,
            cors_allowed_origin: settings.cors_allowed_origin.clone(),
        }
    }
}

/// A named registry profile.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Profile {
    /// Registry base URL (e.g., "https://registry.example.com:28443").
    pub registry: String,

    /// Tenant used when a command does not name one.
    pub tenant: Option<String>,

    /// Management API version segment.
    pub api_version: Option<String>,

    /// Username for HTTP basic auth.
    pub username: Option<String>,

    /// Password for HTTP basic auth (plaintext, prefer `password_env`).
    #[serde(default, skip_serializing)]
    pub password: Option<String>,

    /// Environment variable name containing the password.
    pub password_env: Option<String>,

    /// Path to custom CA certificate.
    pub ca_cert: Option<PathBuf>,

    /// Override insecure TLS setting.
    pub insecure: Option<bool>,

    /// Override timeout.
    pub timeout: Option<u64>,
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("org", "devreg", "devreg").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("devreg");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load the full Config from `path` + environment.
///
/// Environment variables use a `DEVREG_` prefix and `__` as the nesting
/// separator, e.g. `DEVREG_DEFAULTS__TIMEOUT=5`.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed(ENV_PREFIX).split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if the file doesn't exist.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Credential resolution ───────────────────────────────────────────

/// Resolve basic-auth credentials for a profile.
///
/// A profile without a username talks to the registry anonymously. The
/// password comes from the profile's `password_env` variable, then
/// `DEVREG_PASSWORD`, then the plaintext `password` field.
pub fn resolve_auth(profile: &Profile, profile_name: &str) -> Result<Option<BasicAuth>, ConfigError> {
    let Some(username) = profile.username.clone() else {
        return Ok(None);
    };

    let from_env = profile
        .password_env
        .as_deref()
        .and_then(|name| std::env::var(name).ok())
        .or_else(|| std::env::var(ENV_PASSWORD).ok());

    let password = match (from_env, &profile.password) {
        (Some(pw), _) => SecretString::from(pw),
        (None, Some(pw)) => SecretString::from(pw.clone()),
        (None, None) => {
            return Err(ConfigError::NoCredentials {
                profile: profile_name.into(),
                username,
            });
        }
    };

    Ok(Some(BasicAuth { username, password }))
}

/// Build a `ClientConfig` from a profile, without CLI flag overrides.
pub fn profile_to_client_config(
    profile: &Profile,
    profile_name: &str,
    defaults: &Defaults,
) -> Result<ClientConfig, ConfigError> {
    let base_url: url::Url = profile
        .registry
        .parse()
        .map_err(|_| ConfigError::Validation {
            field: "registry".into(),
            reason: format!("invalid URL: {}", profile.registry),
        })?;

    let auth = resolve_auth(profile, profile_name)?;

    let tls = if profile.insecure.unwrap_or(defaults.insecure) {
        TlsMode::DangerAcceptInvalid
    } else if let Some(ref ca_path) = profile.ca_cert {
        TlsMode::CustomCa(ca_path.clone())
    } else {
        TlsMode::System
    };

    let timeout = Duration::from_secs(profile.timeout.unwrap_or(defaults.timeout));

    Ok(ClientConfig {
        base_url,
        api_version: profile
            .api_version
            .clone()
            .unwrap_or_else(default_api_version),
        auth,
        transport: TransportConfig { tls, timeout },
    })
}
