//! Loading registration manifests from disk.

use std::{fs, path::Path};

use tracing::debug;
use unimigrate_types::MigrationManifest;

use crate::error::ManifestError;

/// Load a registration manifest, picking the format from the file extension.
///
/// Files ending in `.json` are parsed as JSON; anything else is parsed as YAML, which also
/// accepts JSON content.
///
/// # Errors
///
/// Returns [`ManifestError`] when the file cannot be read or does not match the manifest shape.
pub fn load_manifest(path: impl AsRef<Path>) -> Result<MigrationManifest, ManifestError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|source| ManifestError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let is_json = path
        .extension()
        .and_then(|extension| extension.to_str())
        .is_some_and(|extension| extension.eq_ignore_ascii_case("json"));

    let manifest: MigrationManifest = if is_json {
        serde_json::from_str(&content).map_err(|source| ManifestError::Json {
            path: path.to_path_buf(),
            source,
        })?
    } else {
        serde_yaml::from_str(&content).map_err(|source| ManifestError::Yaml {
            path: path.to_path_buf(),
            source,
        })?
    };
    debug!(path = %path.display(), registrations = manifest.registrations.len(), "Loaded registration manifest");
    Ok(manifest)
}
