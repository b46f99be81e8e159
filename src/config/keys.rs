//! Private key file loading
//!
//! The file is a JSON array of hex strings. Keys are moved into
//! `SecretString` as soon as they are parsed and are never logged.

use crate::{Error, Result};
use secrecy::SecretString;
use std::path::Path;

/// Read the key file; any problem is a configuration error
pub fn load_private_keys(path: &Path) -> Result<Vec<SecretString>> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        Error::Config(format!(
            "Failed to read private keys file {}: {}",
            path.display(),
            e
        ))
    })?;

    let keys: Vec<String> = serde_json::from_str(&content)
        .map_err(|e| Error::Config(format!("Failed to parse private keys: {}", e)))?;

    if keys.is_empty() {
        return Err(Error::Config(format!(
            "No private keys found in {}",
            path.display()
        )));
    }

    Ok(keys.into_iter().map(SecretString::from).collect())
}
