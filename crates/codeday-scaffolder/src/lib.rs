//! CodeDay Scaffolder - materializes new projects from templates
//!
//! This library turns a template tree into a ready-to-install project
//! directory. It is used by the `create-codeday-app` binary but holds no CLI
//! parsing of its own.
//!
//! # Architecture
//!
//! The library is organized into layers:
//!
//! - **Layer 1: Core Operations** - destination guard, dependency resolution,
//!   template rendering, manifest writing, install orchestration
//! - **Layer 2: Workflow Orchestration** - `ProductConfig` trait and `ProjectBuilder`
//!   which runs the phases in order
//! - **Layer 3: CLI/TUI Interface** - Optional cliclack-based prompts (feature-gated)
//!
//! Components report through an injected [`Reporter`] instead of printing.
//!
//! # Feature Flags
//!
//! - `tui` (default): Enables the cliclack-based TUI prompts module
//!
//! # Example Usage (without TUI)
//!
//! ```ignore
//! use codeday_scaffolder::{guard::AssumeYes, CreateRequest, ProjectBuilder, Recorder, TemplateSource};
//!
//! let tree = TemplateSource::from_config(&config)?.load("topo", "my-agent").await?;
//! let builder = ProjectBuilder::from_config(&config)?;
//! let outcome = builder
//!     .create(&tree, &CreateRequest::new("/tmp/app1"), &AssumeYes, &Recorder::new())
//!     .await?;
//! ```

pub mod error;
pub mod guard;
pub mod package;
pub mod pipeline;
pub mod product;
pub mod report;
pub mod resolver;
pub mod runtime;
pub mod templates;

#[cfg(feature = "tui")]
pub mod tui;

// Re-export main types for convenience
pub use error::ScaffoldError;
pub use guard::{Decision, OverwritePrompt};
pub use package::{build_manifest, write_manifest, ManifestDocument};
pub use pipeline::{CreateRequest, Outcome, ProjectBuilder, ProjectSummary};
pub use product::ProductConfig;
pub use report::{Level, Recorder, Reporter};
pub use resolver::DependencyResolver;
pub use runtime::{InstallOrchestrator, InstallResult};
pub use templates::{PlaceholderMap, TemplateSource, TemplateTree};

#[cfg(feature = "tui")]
pub use tui::run;
