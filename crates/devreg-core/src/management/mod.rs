// ── Credentials management ──
//
// The request handler that sits between a transport binding and a
// `CredentialsManagementService` implementation. Transport bindings build
// a `ManagementRequest`, hand it to `CredentialsEndpoint::handle` and write
// back the returned `ManagementResponse`.

mod endpoint;
mod request;
mod response;
mod span;

use std::sync::Arc;

use async_trait::async_trait;

pub use endpoint::{CredentialsEndpoint, ID_PATTERN};
pub use http::Method;
pub use request::ManagementRequest;
pub use response::{ManagementResponse, ResponseBody};
pub use span::RequestSpan;

use crate::error::ServiceError;
use crate::model::{Credential, OperationResult, ResourceVersion};

/// Storage-side operations on a device's credentials.
///
/// Implementations decide the outcome status (e.g. `404` for an unknown
/// device, `412` for a stale resource version) and report it through the
/// returned [`OperationResult`]. `Err` is reserved for failures to produce
/// an outcome at all.
#[async_trait]
pub trait CredentialsManagementService: Send + Sync {
    /// All credentials registered for a device.
    async fn read_credentials(
        &self,
        tenant_id: &str,
        device_id: &str,
    ) -> Result<OperationResult<Vec<Credential>>, ServiceError>;

    /// Replace all credentials of a device.
    ///
    /// `resource_version` is the version the client asserted via
    /// `If-Match`, passed through unmodified.
    async fn update_credentials(
        &self,
        tenant_id: &str,
        device_id: &str,
        credentials: Vec<Credential>,
        resource_version: Option<ResourceVersion>,
    ) -> Result<OperationResult<()>, ServiceError>;
}

#[async_trait]
impl<S: CredentialsManagementService + ?Sized> CredentialsManagementService for Arc<S> {
    async fn read_credentials(
        &self,
        tenant_id: &str,
        device_id: &str,
    ) -> Result<OperationResult<Vec<Credential>>, ServiceError> {
        (**self).read_credentials(tenant_id, device_id).await
    }

    async fn update_credentials(
        &self,
        tenant_id: &str,
        device_id: &str,
        credentials: Vec<Credential>,
        resource_version: Option<ResourceVersion>,
    ) -> Result<OperationResult<()>, ServiceError> {
        (**self)
            .update_credentials(tenant_id, device_id, credentials, resource_version)
            .await
    }
}
