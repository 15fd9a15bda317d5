// devreg-api: Async HTTP client for the device registry management API

pub mod client;
pub mod error;
pub mod transport;

pub use client::{BasicAuth, ClientConfig, ManagementClient};
pub use error::Error;
pub use transport::{TlsMode, TransportConfig};
