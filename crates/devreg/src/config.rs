//! CLI configuration: thin wrapper around `devreg_config` shared types.
//!
//! Adds resolution that respects `GlobalOpts` flag overrides
//! (--registry, --insecure, --timeout).

use std::time::Duration;

use clap::ValueEnum;

use devreg_api::{ClientConfig, TlsMode};
use devreg_config::profile_to_client_config;

use crate::cli::{GlobalOpts, OutputFormat};
use crate::error::CliError;

pub use devreg_config::{Config, Profile, config_path, load_config_or_default};

/// Where registry-bound commands send their requests.
#[derive(Debug)]
pub struct Target {
    pub profile_name: String,
    pub client: ClientConfig,
    pub tenant: Option<String>,
}

impl Target {
    /// The tenant from `--tenant`, falling back to the profile's tenant.
    pub fn tenant(&self, flag: Option<&str>) -> Result<String, CliError> {
        flag.or(self.tenant.as_deref())
            .map(str::to_owned)
            .ok_or_else(|| CliError::Validation {
                field: "tenant".into(),
                reason: format!(
                    "pass --tenant or set `tenant` in profile '{}'",
                    self.profile_name
                ),
            })
    }
}

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .or_else(|| config.default_profile.clone())
        .unwrap_or_else(|| "default".into())
}

/// The `--output` flag, falling back to `[defaults] output`.
pub fn output_format(global: &GlobalOpts, config: &Config) -> OutputFormat {
    global.output.unwrap_or_else(|| {
        OutputFormat::from_str(&config.defaults.output, true).unwrap_or_default()
    })
}

/// Resolve the registry connection for the active profile.
///
/// `--registry` works without any profile. An explicitly named profile
/// must exist.
pub fn resolve_target(global: &GlobalOpts, config: &Config) -> Result<Target, CliError> {
    let profile_name = active_profile_name(global, config);

    let profile = match config.profiles.get(&profile_name) {
        Some(profile) => profile.clone(),
        None if global.registry.is_some() => Profile::default(),
        None if global.profile.is_some() => {
            return Err(CliError::ProfileNotFound {
                name: profile_name,
                available: available_profiles(config),
            });
        }
        None => {
            return Err(CliError::NoRegistry {
                path: config_path().display().to_string(),
            });
        }
    };

    let client = resolve_profile(&profile, &profile_name, global, config)?;
    Ok(Target {
        profile_name,
        client,
        tenant: profile.tenant,
    })
}

/// Translate a `Profile` + global flags into a `ClientConfig`.
///
/// CLI flag overrides take priority over profile values.
pub fn resolve_profile(
    profile: &Profile,
    profile_name: &str,
    global: &GlobalOpts,
    config: &Config,
) -> Result<ClientConfig, CliError> {
    let mut profile = profile.clone();
    if let Some(ref registry) = global.registry {
        profile.registry.clone_from(registry);
    }

    let mut client = profile_to_client_config(&profile, profile_name, &config.defaults)?;

    if global.insecure {
        client.transport.tls = TlsMode::DangerAcceptInvalid;
    }
    if let Some(secs) = global.timeout {
        client.transport.timeout = Duration::from_secs(secs);
    }

    Ok(client)
}

fn available_profiles(config: &Config) -> String {
    if config.profiles.is_empty() {
        "(none)".into()
    } else {
        config.profiles.keys().cloned().collect::<Vec<_>>().join(", ")
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use clap::Parser;

    use super::*;
    use crate::cli::Cli;

    fn global(args: &[&str]) -> GlobalOpts {
        let mut argv = vec!["devreg"];
        argv.extend_from_slice(args);
        argv.extend_from_slice(&["config", "path"]);
        Cli::try_parse_from(argv).unwrap().global
    }

    fn config_with_lab() -> Config {
        let mut config = Config {
            default_profile: Some("lab".into()),
            ..Config::default()
        };
        config.profiles.insert(
            "lab".into(),
            Profile {
                registry: "https://registry.lab.example.com".into(),
                tenant: Some("DEFAULT_TENANT".into()),
                timeout: Some(12),
                ..Profile::default()
            },
        );
        config
    }

    #[test]
    fn registry_flag_works_without_profile() {
        let target =
            resolve_target(&global(&["--registry", "http://localhost:28080"]), &Config::default())
                .unwrap();
        assert_eq!(target.client.base_url.as_str(), "http://localhost:28080/");
        assert!(target.client.auth.is_none());
        assert!(target.tenant(None).is_err());
        assert_eq!(target.tenant(Some("t1")).unwrap(), "t1");
    }

    #[test]
    fn flags_override_profile() {
        let target = resolve_target(
            &global(&["--registry", "http://override:8080", "-k", "--timeout", "3"]),
            &config_with_lab(),
        )
        .unwrap();
        assert_eq!(target.client.base_url.as_str(), "http://override:8080/");
        assert!(matches!(target.client.transport.tls, TlsMode::DangerAcceptInvalid));
        assert_eq!(target.client.transport.timeout, Duration::from_secs(3));
        assert_eq!(target.tenant(None).unwrap(), "DEFAULT_TENANT");
    }

    #[test]
    fn profile_values_apply_without_flags() {
        let target = resolve_target(&global(&[]), &config_with_lab()).unwrap();
        assert_eq!(target.profile_name, "lab");
        assert_eq!(target.client.transport.timeout, Duration::from_secs(12));
        assert!(matches!(target.client.transport.tls, TlsMode::System));
    }

    #[test]
    fn unknown_profile_is_reported() {
        let err = resolve_target(&global(&["-p", "prod"]), &config_with_lab()).unwrap_err();
        assert!(
            matches!(err, CliError::ProfileNotFound { ref name, ref available } if name == "prod" && available == "lab")
        );
    }

    #[test]
    fn no_registry_without_profile_or_flag() {
        let err = resolve_target(&global(&[]), &Config::default()).unwrap_err();
        assert!(matches!(err, CliError::NoRegistry { .. }));
    }

    #[test]
    fn output_falls_back_to_config_default() {
        let mut config = Config::default();
        config.defaults.output = "yaml".into();
        assert_eq!(output_format(&global(&[]), &config), OutputFormat::Yaml);
        assert_eq!(
            output_format(&global(&["-o", "json-compact"]), &config),
            OutputFormat::JsonCompact
        );

        config.defaults.output = "bogus".into();
        assert_eq!(output_format(&global(&[]), &config), OutputFormat::Table);
    }
}
