//! Product configuration trait for CLI binaries
//!
//! Each binary implements this trait to describe the project it generates:
//! which template to render, which dependencies to pin, which registry to ask
//! and which tool installs the result.

use crate::templates::BundledFile;
use std::path::Path;

/// Default npm registry queried for dependency versions
pub const DEFAULT_REGISTRY_URL: &str = "https://registry.npmjs.org/";

/// Configuration trait for generated products
pub trait ProductConfig: Clone + Send + Sync + 'static {
    /// Internal product name (used for CLI command, user agent)
    fn name(&self) -> &'static str;

    /// Human-readable display name
    fn display_name(&self) -> &'static str;

    /// Name of the template directory (or `<name>.zip` archive) to render
    fn template_name(&self) -> &'static str;

    /// Template files compiled into the binary, used when no remote URL is configured
    fn bundled_template(&self) -> &'static [BundledFile];

    /// Environment variable holding a remote template base URL
    fn template_url_env(&self) -> &'static str;

    /// Packages pinned in the generated manifest, in manifest order
    fn dependencies(&self) -> &'static [&'static str];

    /// Environment variable overriding the registry URL
    fn registry_env(&self) -> &'static str {
        "NPM_CONFIG_REGISTRY"
    }

    /// Registry used when the environment does not override it
    fn default_registry_url(&self) -> &'static str {
        DEFAULT_REGISTRY_URL
    }

    /// Package manager executable run after generation
    fn install_tool(&self) -> &'static str {
        if cfg!(windows) {
            "npm.cmd"
        } else {
            "npm"
        }
    }

    /// Arguments passed to the install tool
    fn install_args(&self) -> &'static [&'static str] {
        &["install"]
    }

    /// Where to send users whose install tool is missing
    fn install_docs_url(&self) -> &'static str {
        "https://nodejs.org/en/download"
    }

    /// Generate the "next steps" instructions after project creation
    fn next_steps(&self, dir: &Path) -> Vec<String>;

    /// User agent string for HTTP requests
    fn user_agent(&self) -> &'static str {
        self.name()
    }
}
