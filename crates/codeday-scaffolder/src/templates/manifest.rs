//! Template descriptor (`template.yaml`) types and parsing

use semver::Version;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// File name of the descriptor at the root of every template
pub const DESCRIPTOR_FILE: &str = "template.yaml";

/// Per-template descriptor (templates/<name>/template.yaml)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateManifest {
    /// Display name of the template
    pub name: String,

    /// Description of what the template provides
    #[serde(default)]
    pub description: String,

    /// Minimum CLI version this template was written for
    pub version: String,

    /// Relative paths copied byte-for-byte, never scanned for placeholders
    #[serde(default)]
    pub binary_files: BTreeSet<String>,
}

impl TemplateManifest {
    pub fn parse(content: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(content)
    }

    /// Warning text when the running CLI is older than the template expects.
    ///
    /// Unparsable versions on either side skip the check.
    pub fn compatibility_warning(&self, cli_version: &str) -> Option<String> {
        let cli = Version::parse(cli_version).ok()?;
        let wanted = Version::parse(self.version.trim_start_matches('v')).ok()?;

        (cli < wanted).then(|| {
            format!(
                "Template '{}' targets CLI {} or newer, you are running {}",
                self.name, wanted, cli
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOPO: &str = r#"
name: Topo
description: Next.js site on the Topo design system
version: 0.1.0
binary_files:
  - public/favicon.ico
"#;

    #[test]
    fn test_parse_descriptor() {
        let manifest = TemplateManifest::parse(TOPO).unwrap();
        assert_eq!(manifest.name, "Topo");
        assert!(manifest.binary_files.contains("public/favicon.ico"));
    }

    #[test]
    fn test_binary_files_default_to_empty() {
        let manifest = TemplateManifest::parse("name: bare\nversion: 0.1.0\n").unwrap();
        assert!(manifest.binary_files.is_empty());
        assert!(manifest.description.is_empty());
    }

    #[test]
    fn test_older_cli_gets_warning() {
        let manifest = TemplateManifest::parse(TOPO).unwrap();
        let warning = manifest.compatibility_warning("0.0.9").unwrap();
        assert!(warning.contains("0.1.0"));
        assert!(warning.contains("0.0.9"));
    }

    #[test]
    fn test_same_or_newer_cli_is_quiet() {
        let manifest = TemplateManifest::parse(TOPO).unwrap();
        assert!(manifest.compatibility_warning("0.1.0").is_none());
        assert!(manifest.compatibility_warning("1.4.2").is_none());
    }

    #[test]
    fn test_unparsable_versions_skip_check() {
        let mut manifest = TemplateManifest::parse(TOPO).unwrap();
        assert!(manifest.compatibility_warning("dev").is_none());

        manifest.version = "latest".to_string();
        assert!(manifest.compatibility_warning("0.0.1").is_none());
    }
}
