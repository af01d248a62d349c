//! Template loading from the binary, a local directory or a remote zip archive
//!
//! Every source produces a [`TemplateTree`]: the parsed descriptor plus the
//! ordered list of files the renderer walks. Local trees read file contents
//! lazily from disk; bundled and remote trees hold their files in memory.

use super::manifest::{TemplateManifest, DESCRIPTOR_FILE};
use crate::error::{Result, ScaffoldError};
use crate::product::ProductConfig;
use std::collections::HashMap;
use std::io::{Cursor, Read};
use std::path::{Component, Path, PathBuf};
use tokio::fs;
use url::Url;
use walkdir::WalkDir;
use zip::ZipArchive;

/// A template file compiled into the binary: relative path and contents
pub type BundledFile = (&'static str, &'static [u8]);

/// Template source - compiled in, remote URL or local directory
#[derive(Debug, Clone)]
pub enum TemplateSource {
    /// Files of a single template embedded with `include_bytes!`
    Bundled(&'static [BundledFile]),
    /// Directory containing one folder per template
    Local(PathBuf),
    /// Base URL serving `<template>.zip` archives
    Remote(Url),
}

impl TemplateSource {
    /// Remote source when the product's URL env var is set, otherwise the bundled template
    pub fn from_config<C: ProductConfig>(config: &C) -> Result<Self> {
        match std::env::var(config.template_url_env()) {
            Ok(url_str) if !url_str.trim().is_empty() => {
                let url = Url::parse(&url_str).map_err(|e| {
                    ScaffoldError::Template(format!("Invalid template URL '{url_str}': {e}"))
                })?;
                Ok(Self::Remote(url))
            }
            _ => Ok(Self::Bundled(config.bundled_template())),
        }
    }

    /// Load the named template
    pub async fn load(&self, template_name: &str, user_agent: &str) -> Result<TemplateTree> {
        match self {
            Self::Bundled(files) => TemplateTree::from_entries(
                files
                    .iter()
                    .map(|(path, bytes)| (path.to_string(), bytes.to_vec())),
                template_name,
            ),
            Self::Local(dir) => TemplateTree::from_dir(dir.join(template_name)).await,
            Self::Remote(base) => {
                let zip_bytes = fetch_archive(base, template_name, user_agent).await?;
                TemplateTree::from_archive(&zip_bytes, template_name)
            }
        }
    }
}

#[derive(Debug, Clone)]
enum Store {
    Disk(PathBuf),
    Memory(HashMap<String, Vec<u8>>),
}

/// A loaded, read-only template
#[derive(Debug, Clone)]
pub struct TemplateTree {
    manifest: TemplateManifest,
    files: Vec<String>,
    store: Store,
}

impl TemplateTree {
    /// Enumerate a template directory, sorted by file name at every level
    pub async fn from_dir(root: PathBuf) -> Result<Self> {
        let descriptor = root.join(DESCRIPTOR_FILE);
        let content = fs::read_to_string(&descriptor)
            .await
            .map_err(|e| ScaffoldError::fs("read", &descriptor, e))?;
        let manifest = TemplateManifest::parse(&content).map_err(|e| {
            ScaffoldError::Template(format!("Failed to parse {}: {e}", descriptor.display()))
        })?;

        let mut files = Vec::new();
        for entry in WalkDir::new(&root).sort_by_file_name() {
            let entry = entry.map_err(|e| {
                let path = e.path().map(Path::to_path_buf).unwrap_or_else(|| root.clone());
                ScaffoldError::fs("walk", path, e.into())
            })?;
            if !entry.file_type().is_file() {
                continue;
            }
            let relative = relative_path(&root, entry.path())?;
            if relative != DESCRIPTOR_FILE {
                files.push(relative);
            }
        }

        Ok(Self {
            manifest,
            files,
            store: Store::Disk(root),
        })
    }

    /// Extract a template archive whose entries live under `<template_name>/`
    pub fn from_archive(zip_bytes: &[u8], template_name: &str) -> Result<Self> {
        let mut archive = ZipArchive::new(Cursor::new(zip_bytes)).map_err(|e| {
            ScaffoldError::Template(format!("Failed to read archive for '{template_name}': {e}"))
        })?;

        let prefix = format!("{template_name}/");
        let mut entries = Vec::with_capacity(archive.len());

        for i in 0..archive.len() {
            let mut file = archive
                .by_index(i)
                .map_err(|e| ScaffoldError::Template(format!("Corrupt archive entry: {e}")))?;
            if file.is_dir() {
                continue;
            }

            let name = file.name().to_string();
            let relative = name.strip_prefix(&prefix).unwrap_or(&name).to_string();

            let mut bytes = Vec::new();
            file.read_to_end(&mut bytes)
                .map_err(|e| ScaffoldError::fs("extract", &name, e))?;
            entries.push((relative, bytes));
        }

        Self::from_entries(entries, template_name)
    }

    /// Build an in-memory tree from `(relative path, contents)` pairs
    pub fn from_entries<I>(entries: I, template_name: &str) -> Result<Self>
    where
        I: IntoIterator<Item = (String, Vec<u8>)>,
    {
        let mut manifest = None;
        let mut files = Vec::new();
        let mut contents = HashMap::new();

        for (relative, bytes) in entries {
            ensure_enclosed(&relative)?;

            if relative == DESCRIPTOR_FILE {
                let text = String::from_utf8_lossy(&bytes);
                manifest = Some(TemplateManifest::parse(&text).map_err(|e| {
                    ScaffoldError::Template(format!(
                        "Failed to parse '{template_name}' descriptor: {e}"
                    ))
                })?);
                continue;
            }

            files.push(relative.clone());
            contents.insert(relative, bytes);
        }

        let manifest = manifest.ok_or_else(|| {
            ScaffoldError::Template(format!(
                "Template '{template_name}' is missing {DESCRIPTOR_FILE}"
            ))
        })?;

        Ok(Self {
            manifest,
            files,
            store: Store::Memory(contents),
        })
    }

    pub fn manifest(&self) -> &TemplateManifest {
        &self.manifest
    }

    /// Relative `/`-separated paths in enumeration order
    pub fn files(&self) -> &[String] {
        &self.files
    }

    /// Raw bytes of one template file
    pub async fn read(&self, relative: &str) -> Result<Vec<u8>> {
        match &self.store {
            Store::Disk(root) => {
                let path = root.join(relative);
                fs::read(&path)
                    .await
                    .map_err(|e| ScaffoldError::fs("read", path, e))
            }
            Store::Memory(contents) => contents.get(relative).cloned().ok_or_else(|| {
                ScaffoldError::Template(format!("File '{relative}' not found in template"))
            }),
        }
    }
}

/// Reject template paths that would resolve outside the destination root
pub fn ensure_enclosed(relative: &str) -> Result<()> {
    let path = Path::new(relative);
    let enclosed = !relative.is_empty()
        && path
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));

    if enclosed {
        Ok(())
    } else {
        Err(ScaffoldError::Template(format!(
            "Template path '{relative}' escapes the destination"
        )))
    }
}

fn relative_path(root: &Path, path: &Path) -> Result<String> {
    let relative = path.strip_prefix(root).map_err(|_| {
        ScaffoldError::Template(format!(
            "{} escapes template root {}",
            path.display(),
            root.display()
        ))
    })?;

    let parts: Vec<_> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect();
    Ok(parts.join("/"))
}

async fn fetch_archive(base: &Url, template_name: &str, user_agent: &str) -> Result<Vec<u8>> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| ScaffoldError::Template(format!("URL cannot have path segments: {base}")))?
        .pop_if_empty()
        .push(&format!("{template_name}.zip"));

    let client = reqwest::Client::builder()
        .user_agent(user_agent)
        .build()
        .unwrap_or_else(|_| reqwest::Client::new());

    let response = client.get(url.clone()).send().await.map_err(|e| {
        ScaffoldError::Template(format!("Failed to fetch template from {url}: {e}"))
    })?;

    if !response.status().is_success() {
        return Err(ScaffoldError::Template(format!(
            "Failed to fetch template '{template_name}' from {url}: HTTP {}",
            response.status()
        )));
    }

    let bytes = response.bytes().await.map_err(|e| {
        ScaffoldError::Template(format!("Failed to download template from {url}: {e}"))
    })?;
    Ok(bytes.to_vec())
}
