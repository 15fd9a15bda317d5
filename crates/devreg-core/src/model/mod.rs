// ── Registry domain model ──
//
// Request-scoped values: decoded from a request, validated, handed to the
// management service and dropped once the response is rendered. None of
// these types carry a persistent identity.

pub mod credential;
pub mod device;
pub mod message;
pub mod operation;
pub mod secret;

// ── Re-exports ──────────────────────────────────────────────────────

pub use credential::{
    Credential, CredentialCommon, GenericCredential, PasswordCredential, PskCredential,
    X509CertificateCredential,
};
pub use device::Device;
pub use message::Message;
pub use operation::{OperationResult, ResourceVersion};
pub use secret::{HashFunction, PasswordSecret, PskSecret, SecretCommon, X509CertificateSecret};
