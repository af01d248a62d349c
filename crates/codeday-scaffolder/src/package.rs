//! Generated project manifest (`package.json`)

use crate::error::{Result, ScaffoldError};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;

/// File name of the manifest at the destination root
pub const MANIFEST_FILE: &str = "package.json";

/// Version every generated project starts at
pub const INITIAL_VERSION: &str = "0.0.1";

/// Scripts of the generated Next.js project
const SCRIPTS: &[(&str, &str)] = &[
    ("dev", "next dev"),
    ("build", "next build"),
    ("start", "next start"),
];

/// The generated project descriptor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestDocument {
    pub name: String,
    pub version: String,
    pub private: bool,
    pub scripts: IndexMap<String, String>,
    pub dependencies: IndexMap<String, String>,
}

/// Assemble the manifest for `name` with already-resolved caret ranges
pub fn build_manifest(name: &str, dependencies: IndexMap<String, String>) -> ManifestDocument {
    ManifestDocument {
        name: name.to_string(),
        version: INITIAL_VERSION.to_string(),
        private: true,
        scripts: SCRIPTS
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
        dependencies,
    }
}

/// Serialize with two-space indentation and a trailing newline
pub fn to_pretty_json(doc: &ManifestDocument) -> Result<String> {
    let mut json = serde_json::to_string_pretty(doc)
        .map_err(|e| ScaffoldError::Template(format!("Failed to serialize manifest: {e}")))?;
    json.push('\n');
    Ok(json)
}

/// Write the manifest at the destination root, returning its path
pub async fn write_manifest(destination: &Path, doc: &ManifestDocument) -> Result<PathBuf> {
    let path = destination.join(MANIFEST_FILE);
    let json = to_pretty_json(doc)?;
    fs::write(&path, json)
        .await
        .map_err(|e| ScaffoldError::fs("write", &path, e))?;
    Ok(path)
}
