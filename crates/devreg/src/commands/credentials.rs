//! Credentials command handlers.
//!
//! Registry-bound commands go through a local `CredentialsEndpoint` that
//! delegates to the remote registry, so ids, payload limits and decoding
//! are checked the same way a registry would check them.

use std::path::Path;

use reqwest::StatusCode;
use serde::Serialize;
use tabled::Tabled;
use tracing::debug;

use devreg_api::ManagementClient;
use devreg_core::{
    Credential, CredentialsEndpoint, EndpointConfig, ManagementRequest, ManagementResponse,
    ResponseBody, codec,
};

use crate::cli::{CredentialsArgs, CredentialsCommand, GlobalOpts, OutputFormat};
use crate::config::{self, Config};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct CredentialRow {
    #[tabled(rename = "Type")]
    type_name: String,
    #[tabled(rename = "Auth ID")]
    auth_id: String,
    #[tabled(rename = "Enabled")]
    enabled: String,
    #[tabled(rename = "Secrets")]
    secrets: usize,
}

fn credential_row(credential: &Credential) -> CredentialRow {
    let enabled = match credential.common().enabled {
        Some(true) => "yes",
        Some(false) => "no",
        None => "yes (default)",
    };
    CredentialRow {
        type_name: credential.type_name().to_owned(),
        auth_id: credential.auth_id().to_owned(),
        enabled: enabled.into(),
        secrets: credential.secret_count(),
    }
}

#[derive(Debug, Serialize)]
struct UpdateOutcome {
    status: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    version: Option<String>,
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    args: CredentialsArgs,
    global: &GlobalOpts,
    config: &Config,
) -> Result<(), CliError> {
    let format = config::output_format(global, config);

    match args.command {
        CredentialsCommand::Validate { file } => {
            let (_, credentials) = load_credentials(&file, config)?;
            debug!(count = credentials.len(), "credentials are valid");
            let out = output::render_list(format, &credentials, credential_row)?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        CredentialsCommand::Get { device_id, tenant } => {
            let (endpoint, session) = connect(global, config, tenant.tenant.as_deref())?;
            let response = endpoint
                .handle(ManagementRequest::get(&session.tenant_id, &device_id))
                .await;
            if !response.is_success() {
                return Err(session.outcome_error(response, &device_id, None));
            }

            let credentials = match &response.body {
                ResponseBody::Json(value) => codec::decode_array(value)?,
                _ => Vec::new(),
            };
            let out = render_fetched(format, &credentials, response.etag.as_deref())?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        CredentialsCommand::Set {
            device_id,
            file,
            if_match,
            tenant,
        } => {
            let (body, credentials) = load_credentials(&file, config)?;
            debug!(count = credentials.len(), "replacing credentials");

            let (endpoint, session) = connect(global, config, tenant.tenant.as_deref())?;
            let mut request = ManagementRequest::put(&session.tenant_id, &device_id, body);
            if let Some(ref version) = if_match {
                request = request.with_if_match(version);
            }

            let response = endpoint.handle(request).await;
            if !response.is_success() {
                return Err(session.outcome_error(response, &device_id, if_match.as_deref()));
            }

            let outcome = UpdateOutcome {
                status: response.status.as_u16(),
                version: response.etag,
            };
            let out = output::render_single(format, &outcome, |o| match &o.version {
                Some(version) => format!("Credentials updated (version {version})"),
                None => "Credentials updated".into(),
            })?;
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}

// ── Helpers ─────────────────────────────────────────────────────────

/// Who a registry request is made for, to phrase outcome errors.
struct Session {
    profile_name: String,
    tenant_id: String,
}

impl Session {
    fn outcome_error(
        &self,
        response: ManagementResponse,
        device_id: &str,
        if_match: Option<&str>,
    ) -> CliError {
        match response.status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => CliError::AuthFailed {
                status: response.status,
                profile: self.profile_name.clone(),
            },
            StatusCode::NOT_FOUND => CliError::NotFound {
                tenant_id: self.tenant_id.clone(),
                device_id: device_id.to_owned(),
            },
            StatusCode::PRECONDITION_FAILED => CliError::PreconditionFailed {
                version: if_match.unwrap_or_default().to_owned(),
            },
            status => {
                let message = match response.body {
                    ResponseBody::Text(text) => text,
                    ResponseBody::Json(value) => value.to_string(),
                    ResponseBody::Empty => "no details".into(),
                };
                CliError::Registry { status, message }
            }
        }
    }
}

fn connect(
    global: &GlobalOpts,
    config: &Config,
    tenant_flag: Option<&str>,
) -> Result<(CredentialsEndpoint<ManagementClient>, Session), CliError> {
    let target = config::resolve_target(global, config)?;
    let tenant_id = target.tenant(tenant_flag)?;
    debug!(
        profile = %target.profile_name,
        registry = %target.client.base_url,
        tenant_id = %tenant_id,
        "connecting to registry"
    );

    let client = ManagementClient::from_config(target.client)?;
    let endpoint = CredentialsEndpoint::new(client, EndpointConfig::from(&config.endpoint));
    Ok((
        endpoint,
        Session {
            profile_name: target.profile_name,
            tenant_id,
        },
    ))
}

/// Read and decode a credentials file, returning the raw bytes as well.
fn load_credentials(
    file: &Path,
    config: &Config,
) -> Result<(Vec<u8>, Vec<Credential>), CliError> {
    let body = util::read_payload(file, config.endpoint.max_payload_size)?;
    let credentials = codec::decode_body(&body).map_err(|e| util::invalid(file, &e))?;
    Ok((body, credentials))
}

fn render_fetched(
    format: OutputFormat,
    credentials: &[Credential],
    version: Option<&str>,
) -> Result<String, CliError> {
    let rendered = output::render_list(format, credentials, credential_row)?;
    Ok(match (format, version) {
        (OutputFormat::Table, Some(version)) => format!("{rendered}\nVersion: {version}"),
        _ => rendered,
    })
}
