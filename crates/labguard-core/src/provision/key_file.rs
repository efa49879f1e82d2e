//! Service account key download.

use std::path::Path;

use base64::{engine::general_purpose, Engine as _};
use labguard_types::models::ServiceAccountKey;

use crate::error::AppResult;

/// Decode the base64 `privateKeyData` of a key into its credentials JSON.
pub fn decode_key(key: &ServiceAccountKey) -> AppResult<serde_json::Value> {
    let raw = general_purpose::STANDARD.decode(key.private_key_data.trim())?;
    Ok(serde_json::from_slice(&raw)?)
}

/// Write `credentials` pretty-printed to `path`, readable by the owner only.
pub fn write_key_file(path: &Path, credentials: &serde_json::Value) -> AppResult<()> {
    let json = serde_json::to_string_pretty(credentials)?;
    std::fs::write(path, json)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
    }

    tracing::info!(path = %path.display(), "Saved service account key");
    Ok(())
}
