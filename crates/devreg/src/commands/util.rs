//! Shared helpers for command handlers.

use std::path::Path;

use devreg_core::CoreError;

use crate::error::CliError;

/// Read a payload file, enforcing the configured size limit.
pub fn read_payload(path: &Path, limit: usize) -> Result<Vec<u8>, CliError> {
    let bytes = std::fs::read(path)?;
    if bytes.len() > limit {
        return Err(invalid(
            path,
            &CoreError::PayloadTooLarge {
                size: bytes.len(),
                limit,
            },
        ));
    }
    Ok(bytes)
}

/// Wrap a validation failure of `path` for reporting.
pub fn invalid(path: &Path, err: &impl std::fmt::Display) -> CliError {
    CliError::InvalidPayload {
        path: path.display().to_string(),
        message: err.to_string(),
    }
}
