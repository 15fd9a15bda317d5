// Credentials management HTTP client
//
// Speaks the registry's credentials resource:
// `{base}/{api_version}/credentials/{tenant_id}/{device_id}`. Every HTTP
// status the registry answers with is handed back as the outcome status;
// only transport and decoding failures become errors.

use std::time::Duration;

use async_trait::async_trait;
use devreg_core::codec;
use devreg_core::{
    Credential, CredentialsManagementService, OperationResult, ResourceVersion, ServiceError,
};
use reqwest::StatusCode;
use reqwest::header::{ETAG, HeaderMap, IF_MATCH};
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::transport::TransportConfig;

const DEFAULT_API_VERSION: &str = "v1";

/// HTTP basic authentication for the management API.
#[derive(Debug, Clone)]
pub struct BasicAuth {
    pub username: String,
    pub password: SecretString,
}

/// Everything needed to talk to one registry.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: Url,
    pub api_version: String,
    pub auth: Option<BasicAuth>,
    pub transport: TransportConfig,
}

impl ClientConfig {
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            api_version: DEFAULT_API_VERSION.into(),
            auth: None,
            transport: TransportConfig::default(),
        }
    }
}

/// Async client for a registry's credentials management API.
#[derive(Debug, Clone)]
pub struct ManagementClient {
    http: reqwest::Client,
    base_url: Url,
    api_version: String,
    auth: Option<BasicAuth>,
    timeout: Duration,
}

impl ManagementClient {
    /// Create a client, building the HTTP client from the transport config.
    pub fn from_config(config: ClientConfig) -> Result<Self, Error> {
        let http = config.transport.build_client()?;
        let mut client = Self::with_client(http, config.base_url);
        client.api_version = config.api_version;
        client.auth = config.auth;
        client.timeout = config.transport.timeout;
        Ok(client)
    }

    /// Create a client with a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: Url) -> Self {
        Self {
            http,
            base_url,
            api_version: DEFAULT_API_VERSION.into(),
            auth: None,
            timeout: TransportConfig::default().timeout,
        }
    }

    #[must_use]
    pub fn with_auth(mut self, username: impl Into<String>, password: SecretString) -> Self {
        self.auth = Some(BasicAuth {
            username: username.into(),
            password,
        });
        self
    }

    #[must_use]
    pub fn with_api_version(mut self, api_version: impl Into<String>) -> Self {
        self.api_version = api_version.into();
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// Build the credentials URL of a device. Ids are percent-encoded.
    pub fn credentials_url(&self, tenant_id: &str, device_id: &str) -> Result<Url, Error> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| Error::InvalidBaseUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend([self.api_version.as_str(), "credentials", tenant_id, device_id]);
        Ok(url)
    }

    // ── Operations ───────────────────────────────────────────────────

    /// Fetch all credentials of a device.
    pub async fn read_credentials(
        &self,
        tenant_id: &str,
        device_id: &str,
    ) -> Result<OperationResult<Vec<Credential>>, Error> {
        let url = self.credentials_url(tenant_id, device_id)?;
        debug!("GET {}", url);

        let resp = self.send(self.http.get(url)).await?;
        let status = resp.status();
        let version = etag(resp.headers());

        if status != StatusCode::OK {
            debug!(%status, "registry returned no credentials");
            return Ok(OperationResult::new(status.as_u16(), None, version));
        }

        let body = resp.text().await.map_err(Error::Transport)?;
        let credentials: Vec<Credential> =
            serde_json::from_str(&body).map_err(|e| Error::Deserialization {
                message: e.to_string(),
                body: body.clone(),
            })?;

        Ok(OperationResult::ok(credentials, version))
    }

    /// Replace all credentials of a device, optionally guarded by `If-Match`.
    pub async fn update_credentials(
        &self,
        tenant_id: &str,
        device_id: &str,
        credentials: &[Credential],
        resource_version: Option<&ResourceVersion>,
    ) -> Result<OperationResult<()>, Error> {
        let url = self.credentials_url(tenant_id, device_id)?;
        let body = Value::Array(codec::encode_all(credentials).map_err(Error::Payload)?);
        debug!(count = credentials.len(), "PUT {}", url);

        let mut request = self.http.put(url).json(&body);
        if let Some(version) = resource_version {
            request = request.header(IF_MATCH, version.as_str());
        }

        let resp = self.send(request).await?;
        let status = resp.status();
        debug!(%status, "registry answered update");
        Ok(OperationResult::new(status.as_u16(), None, etag(resp.headers())))
    }

    // ── Request helpers ──────────────────────────────────────────────

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<reqwest::Response, Error> {
        let request = match &self.auth {
            Some(auth) => request.basic_auth(&auth.username, Some(auth.password.expose_secret())),
            None => request,
        };
        request.send().await.map_err(|e| {
            if e.is_timeout() {
                Error::Timeout {
                    timeout_secs: self.timeout.as_secs(),
                }
            } else {
                Error::Transport(e)
            }
        })
    }
}

fn etag(headers: &HeaderMap) -> Option<ResourceVersion> {
    headers
        .get(ETAG)
        .and_then(|value| value.to_str().ok())
        .map(ResourceVersion::from)
}

#[async_trait]
impl CredentialsManagementService for ManagementClient {
    async fn read_credentials(
        &self,
        tenant_id: &str,
        device_id: &str,
    ) -> Result<OperationResult<Vec<Credential>>, ServiceError> {
        ManagementClient::read_credentials(self, tenant_id, device_id)
            .await
            .map_err(ServiceError::from)
    }

    async fn update_credentials(
        &self,
        tenant_id: &str,
        device_id: &str,
        credentials: Vec<Credential>,
        resource_version: Option<ResourceVersion>,
    ) -> Result<OperationResult<()>, ServiceError> {
        ManagementClient::update_credentials(
            self,
            tenant_id,
            device_id,
            &credentials,
            resource_version.as_ref(),
        )
        .await
        .map_err(ServiceError::from)
    }
}
