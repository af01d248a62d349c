//! Workflow orchestration: guard → resolve → create → manifest → render → install

use crate::error::{Result, ScaffoldError};
use crate::guard::{self, Decision, OverwritePrompt};
use crate::package::{self, ManifestDocument};
use crate::product::ProductConfig;
use crate::report::Reporter;
use crate::resolver::DependencyResolver;
use crate::runtime::{InstallOrchestrator, InstallResult};
use crate::templates::{render, PlaceholderMap, TemplateTree, WrittenFile};
use std::path::{Path, PathBuf};
use tokio::fs;

/// Token always bound to the project name
pub const APP_NAME_TOKEN: &str = "APP_NAME";

/// Resolved input for one project creation
#[derive(Debug, Clone)]
pub struct CreateRequest {
    /// Absolute destination directory
    pub target_dir: PathBuf,
    /// Overrides the name derived from the directory basename
    pub name: Option<String>,
    /// Feature-flag placeholders; `APP_NAME` is added automatically
    pub placeholders: PlaceholderMap,
    pub skip_install: bool,
}

impl CreateRequest {
    pub fn new(target_dir: impl Into<PathBuf>) -> Self {
        Self {
            target_dir: target_dir.into(),
            name: None,
            placeholders: PlaceholderMap::new(),
            skip_install: false,
        }
    }

    /// Explicit name, or the destination's final path component
    pub fn project_name(&self) -> Result<String> {
        if let Some(name) = self.name.as_deref().filter(|n| !n.trim().is_empty()) {
            return Ok(name.to_string());
        }
        self.target_dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| ScaffoldError::InvalidName(self.target_dir.clone()))
    }
}

/// What was produced by a completed run
#[derive(Debug, Clone)]
pub struct ProjectSummary {
    pub dir: PathBuf,
    pub name: String,
    pub manifest: ManifestDocument,
    pub manifest_path: PathBuf,
    /// Rendered template files, in enumeration order (manifest excluded)
    pub files: Vec<WrittenFile>,
}

/// Result of [`ProjectBuilder::create`]
#[derive(Debug, Clone)]
pub enum Outcome {
    /// The user declined to overwrite a non-empty destination; nothing changed
    Aborted,
    Created {
        summary: ProjectSummary,
        /// `None` when the install step was skipped
        install: Option<InstallResult>,
    },
}

/// Builds projects for one product
#[derive(Debug, Clone)]
pub struct ProjectBuilder {
    dependencies: Vec<String>,
    template_name: String,
    resolver: DependencyResolver,
    installer: InstallOrchestrator,
}

impl ProjectBuilder {
    pub fn from_config<C: ProductConfig>(config: &C) -> Result<Self> {
        Ok(Self {
            dependencies: config
                .dependencies()
                .iter()
                .map(|d| d.to_string())
                .collect(),
            template_name: config.template_name().to_string(),
            resolver: DependencyResolver::from_config(config)?,
            installer: InstallOrchestrator::from_config(config),
        })
    }

    pub fn with_resolver(mut self, resolver: DependencyResolver) -> Self {
        self.resolver = resolver;
        self
    }

    pub fn with_installer(mut self, installer: InstallOrchestrator) -> Self {
        self.installer = installer;
        self
    }

    pub fn installer(&self) -> &InstallOrchestrator {
        &self.installer
    }

    pub fn template_name(&self) -> &str {
        &self.template_name
    }

    /// Materialize `tree` as described by `request`.
    ///
    /// Nothing is written unless the guard proceeds. Errors after that point
    /// leave whatever was already written in place; install failures are
    /// returned as values, never rolled back.
    pub async fn create(
        &self,
        tree: &TemplateTree,
        request: &CreateRequest,
        prompt: &dyn OverwritePrompt,
        reporter: &dyn Reporter,
    ) -> Result<Outcome> {
        let dir = request.target_dir.as_path();
        let name = request.project_name()?;

        if guard::ensure_safe(dir, prompt, reporter).await? == Decision::Abort {
            return Ok(Outcome::Aborted);
        }

        // Resolve before touching the destination so lookup failures leave no trace
        let names: Vec<&str> = self.dependencies.iter().map(String::as_str).collect();
        let dependencies = self.resolver.resolve(&names, reporter).await?;
        let manifest = package::build_manifest(&name, dependencies);

        create_dir(dir, reporter).await?;
        let manifest_path = package::write_manifest(dir, &manifest).await?;
        reporter.create("create", package::MANIFEST_FILE);

        let mut placeholders = PlaceholderMap::new();
        placeholders.insert(APP_NAME_TOKEN, name.as_str());
        placeholders.extend(&request.placeholders);

        let files = render(
            tree,
            dir,
            &placeholders,
            &tree.manifest().binary_files,
            reporter,
        )
        .await?;

        let install = if request.skip_install {
            reporter.info("install", "skipped");
            None
        } else {
            Some(self.installer.install(dir, reporter).await?)
        };

        Ok(Outcome::Created {
            summary: ProjectSummary {
                dir: dir.to_path_buf(),
                name,
                manifest,
                manifest_path,
                files,
            },
            install,
        })
    }
}

async fn create_dir(dir: &Path, reporter: &dyn Reporter) -> Result<()> {
    if fs::metadata(dir).await.is_ok() {
        return Ok(());
    }
    fs::create_dir_all(dir)
        .await
        .map_err(|e| ScaffoldError::fs("create directory", dir, e))?;
    reporter.create("create", &dir.display().to_string());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_defaults_to_basename() {
        let request = CreateRequest::new("/tmp/app1");
        assert_eq!(request.project_name().unwrap(), "app1");
    }

    #[test]
    fn test_explicit_name_wins() {
        let mut request = CreateRequest::new("/tmp/app1");
        request.name = Some("demo".to_string());
        assert_eq!(request.project_name().unwrap(), "demo");
    }

    #[test]
    fn test_blank_name_falls_back_to_basename() {
        let mut request = CreateRequest::new("/tmp/app1");
        request.name = Some("  ".to_string());
        assert_eq!(request.project_name().unwrap(), "app1");
    }

    #[cfg(unix)]
    #[test]
    fn test_root_has_no_name() {
        let request = CreateRequest::new("/");
        assert!(matches!(
            request.project_name(),
            Err(ScaffoldError::InvalidName(_))
        ));
    }
}
