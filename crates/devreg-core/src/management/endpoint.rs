use std::sync::LazyLock;

use http::{Method, StatusCode};
use regex::Regex;
use serde_json::Value;
use tracing::{Instrument as _, debug};

use super::CredentialsManagementService;
use super::request::ManagementRequest;
use super::response::{ManagementResponse, ResponseBody};
use super::span::RequestSpan;
use crate::codec;
use crate::config::EndpointConfig;
use crate::error::CoreError;
use crate::model::ResourceVersion;

/// Pattern tenant and device path parameters must match.
pub const ID_PATTERN: &str = r"^[a-zA-Z0-9-_\.:=]+$";

static ID_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(ID_PATTERN).expect("id pattern is a valid regex"));

const PARAM_TENANT_ID: &str = "tenant_id";
const PARAM_DEVICE_ID: &str = "device_id";

const ERROR_PARSING_CREDENTIALS: &str = "Error parsing credentials";

/// Management endpoint for the credentials of a device, delegating storage
/// to a [`CredentialsManagementService`].
#[derive(Debug, Clone)]
pub struct CredentialsEndpoint<S> {
    service: S,
    config: EndpointConfig,
}

impl<S: CredentialsManagementService> CredentialsEndpoint<S> {
    pub fn new(service: S, config: EndpointConfig) -> Self {
        Self { service, config }
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    pub fn config(&self) -> &EndpointConfig {
        &self.config
    }

    // ── Route descriptors ────────────────────────────────────────────

    /// Endpoint name, e.g. `v1/credentials`.
    pub fn name(&self) -> String {
        format!("{}/credentials", self.config.api_version)
    }

    /// Path template a transport binding registers this endpoint under.
    pub fn resource_path(&self) -> String {
        format!("/{}/{{{PARAM_TENANT_ID}}}/{{{PARAM_DEVICE_ID}}}", self.name())
    }

    pub fn allowed_methods(&self) -> [Method; 2] {
        [Method::GET, Method::PUT]
    }

    pub fn cors_allowed_origin(&self) -> &str {
        &self.config.cors_allowed_origin
    }

    // ── Dispatch ─────────────────────────────────────────────────────

    /// Route a request to the matching operation.
    pub async fn handle(&self, request: ManagementRequest) -> ManagementResponse {
        let ManagementRequest {
            method,
            tenant_id,
            device_id,
            if_match,
            body,
        } = request;

        if method == Method::GET {
            self.get_credentials(tenant_id.as_deref(), device_id.as_deref())
                .await
        } else if method == Method::PUT {
            self.update_credentials(
                tenant_id.as_deref(),
                device_id.as_deref(),
                &body,
                if_match.as_deref(),
            )
            .await
        } else {
            debug!(%method, path = %self.resource_path(), "method not allowed");
            ManagementResponse::from_error(&CoreError::MethodNotAllowed {
                method: method.to_string(),
            })
        }
    }

    // ── Operations ───────────────────────────────────────────────────

    /// Read all credentials of a device.
    ///
    /// A `200` outcome is rendered as a JSON array with the resource
    /// version as `ETag`. Any other outcome status is passed through
    /// without a body.
    pub async fn get_credentials(
        &self,
        tenant_id: Option<&str>,
        device_id: Option<&str>,
    ) -> ManagementResponse {
        let span = RequestSpan::get_credentials(tenant_id, device_id);
        let (tenant_id, device_id) = match validate_ids(tenant_id, device_id) {
            Ok(ids) => ids,
            Err(err) => return span.fail(&err),
        };

        debug!(parent: span.span(), tenant_id, device_id, "reading credentials");

        let outcome = self
            .service
            .read_credentials(tenant_id, device_id)
            .instrument(span.span().clone())
            .await;

        let result = match outcome {
            Ok(result) => result,
            Err(err) => return span.fail(&CoreError::from(err)),
        };

        let status = match outcome_status(result.status) {
            Ok(status) => status,
            Err(err) => return span.fail(&err),
        };
        if status != StatusCode::OK {
            debug!(parent: span.span(), status = result.status, "no credentials returned");
            return span.finish(ManagementResponse::status(status));
        }

        let credentials = result.payload.unwrap_or_default();
        match codec::encode_all(&credentials) {
            Ok(values) => span.finish(
                ManagementResponse::json(StatusCode::OK, Value::Array(values))
                    .with_etag(result.resource_version),
            ),
            Err(err) => span.fail(&err),
        }
    }

    /// Replace all credentials of a device with the ones in `body`.
    ///
    /// `if_match` is handed to the service unmodified. The service is not
    /// called unless the whole body decodes.
    pub async fn update_credentials(
        &self,
        tenant_id: Option<&str>,
        device_id: Option<&str>,
        body: &[u8],
        if_match: Option<&str>,
    ) -> ManagementResponse {
        let span = RequestSpan::update_credentials(tenant_id, device_id);
        let (tenant_id, device_id) = match validate_ids(tenant_id, device_id) {
            Ok(ids) => ids,
            Err(err) => return span.fail(&err),
        };

        let values = match self.extract_json_array(body) {
            Ok(values) => values,
            Err(err) => return span.fail(&err),
        };

        let credentials = match codec::decode_all(&values) {
            Ok(credentials) => credentials,
            Err(err) => {
                span.log_error(&err);
                return span.finish(ManagementResponse {
                    body: ResponseBody::Text(ERROR_PARSING_CREDENTIALS.into()),
                    ..ManagementResponse::status(StatusCode::BAD_REQUEST)
                });
            }
        };

        debug!(
            parent: span.span(),
            tenant_id,
            device_id,
            count = credentials.len(),
            "updating credentials"
        );

        let outcome = self
            .service
            .update_credentials(
                tenant_id,
                device_id,
                credentials,
                if_match.map(ResourceVersion::from),
            )
            .instrument(span.span().clone())
            .await;

        let result = match outcome {
            Ok(result) => result,
            Err(err) => return span.fail(&CoreError::from(err)),
        };
        match outcome_status(result.status) {
            Ok(status) => {
                span.finish(ManagementResponse::status(status).with_etag(result.resource_version))
            }
            Err(err) => span.fail(&err),
        }
    }

    fn extract_json_array(&self, body: &[u8]) -> Result<Vec<Value>, CoreError> {
        let limit = self.config.max_payload_size;
        if body.len() > limit {
            return Err(CoreError::PayloadTooLarge {
                size: body.len(),
                limit,
            });
        }
        if body.is_empty() {
            return Err(CoreError::MalformedPayload {
                message: "missing request body".into(),
            });
        }
        match serde_json::from_slice::<Value>(body)? {
            Value::Array(values) => Ok(values),
            _ => Err(CoreError::MalformedPayload {
                message: "request body must be a JSON array".into(),
            }),
        }
    }
}

fn outcome_status(code: u16) -> Result<StatusCode, CoreError> {
    StatusCode::from_u16(code).map_err(|_| CoreError::InvalidStatus { code })
}

fn validate_ids<'a>(
    tenant_id: Option<&'a str>,
    device_id: Option<&'a str>,
) -> Result<(&'a str, &'a str), CoreError> {
    Ok((
        validate_id(PARAM_TENANT_ID, tenant_id)?,
        validate_id(PARAM_DEVICE_ID, device_id)?,
    ))
}

fn validate_id<'a>(name: &'static str, value: Option<&'a str>) -> Result<&'a str, CoreError> {
    match value {
        None | Some("") => Err(CoreError::InvalidParameter {
            name,
            reason: "must be set".into(),
        }),
        Some(id) if !ID_REGEX.is_match(id) => Err(CoreError::InvalidParameter {
            name,
            reason: format!("'{id}' does not match allowed pattern: {ID_PATTERN}"),
        }),
        Some(id) => Ok(id),
    }
}
