//! External process orchestration
//!
//! This module provides the install step that runs the package manager in the
//! generated project.

pub mod install;

pub use install::{InstallOrchestrator, InstallResult};
