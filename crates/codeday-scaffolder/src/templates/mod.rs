//! Template loading and rendering
//!
//! This module provides:
//! - The template descriptor (`template.yaml`) and version compatibility check
//! - Template loading from the binary, a local directory or a remote zip archive
//! - `$TOKEN$` placeholder substitution as a pure text transform
//! - Rendering of a loaded tree into the destination directory

pub mod manifest;
pub mod placeholder;
pub mod renderer;
pub mod source;

pub use manifest::TemplateManifest;
pub use placeholder::{substitute, PlaceholderMap, Substitution};
pub use renderer::{render, FileKind, WrittenFile};
pub use source::{BundledFile, TemplateSource, TemplateTree};
