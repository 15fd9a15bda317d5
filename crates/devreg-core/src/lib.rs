// devreg-core: Device registry model, credential codec, and the credentials
// management endpoint that sits between a transport binding and a
// management service implementation.

pub mod codec;
pub mod config;
pub mod error;
pub mod management;
pub mod model;
pub mod presence;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::EndpointConfig;
pub use error::{ClassificationError, CoreError, ServiceError, StatusClass};
pub use management::{
    CredentialsEndpoint, CredentialsManagementService, ManagementRequest, ManagementResponse,
    Method, ResponseBody,
};
pub use presence::{Expiry, TimeUntilDisconnectNotification};

// Re-export model types at the crate root for ergonomics.
pub use model::{
    // Devices
    Device,
    // Credentials
    Credential, CredentialCommon, GenericCredential, PasswordCredential, PskCredential,
    X509CertificateCredential,
    // Secrets
    HashFunction, PasswordSecret, PskSecret, SecretCommon, X509CertificateSecret,
    // Operations
    OperationResult, ResourceVersion,
    // Messages
    Message,
};
