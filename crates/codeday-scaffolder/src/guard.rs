//! Destination safety checks and the overwrite protocol

use crate::error::{Result, ScaffoldError};
use crate::report::Reporter;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Whether the pipeline may write into the destination
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Proceed,
    Abort,
}

/// Capability asked before a non-empty destination is cleared
pub trait OverwritePrompt {
    fn confirm_overwrite(&self, dir: &Path) -> Result<bool>;
}

impl<F> OverwritePrompt for F
where
    F: Fn(&Path) -> Result<bool>,
{
    fn confirm_overwrite(&self, dir: &Path) -> Result<bool> {
        self(dir)
    }
}

/// Prompt that always accepts (non-interactive `--yes` mode)
#[derive(Debug, Default, Clone, Copy)]
pub struct AssumeYes;

impl OverwritePrompt for AssumeYes {
    fn confirm_overwrite(&self, _dir: &Path) -> Result<bool> {
        Ok(true)
    }
}

/// True when `path` does not exist or is a directory with no entries
pub async fn is_empty(path: &Path) -> Result<bool> {
    match fs::read_dir(path).await {
        Ok(mut entries) => {
            let first = entries
                .next_entry()
                .await
                .map_err(|e| ScaffoldError::fs("read directory", path, e))?;
            Ok(first.is_none())
        }
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(true),
        Err(e) => Err(ScaffoldError::fs("read directory", path, e)),
    }
}

/// Gate every write behind an empty destination.
///
/// A non-empty destination is only cleared after `prompt` accepts, and the
/// clear finishes (or fails) before this returns.
pub async fn ensure_safe(
    path: &Path,
    prompt: &dyn OverwritePrompt,
    reporter: &dyn Reporter,
) -> Result<Decision> {
    if is_empty(path).await? {
        return Ok(Decision::Proceed);
    }

    reporter.warn("exists", &path.display().to_string());

    if !prompt.confirm_overwrite(path)? {
        reporter.info("abort", "destination left untouched");
        return Ok(Decision::Abort);
    }

    clear_dir(path, reporter).await?;
    reporter.info("clear", &path.display().to_string());
    Ok(Decision::Proceed)
}

/// Remove every entry below `path`, keeping `path` itself
async fn clear_dir(path: &Path, reporter: &dyn Reporter) -> Result<()> {
    let mut entries = fs::read_dir(path)
        .await
        .map_err(|e| ScaffoldError::fs("read directory", path, e))?;

    let mut doomed: Vec<PathBuf> = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| ScaffoldError::fs("read directory", path, e))?
    {
        doomed.push(entry.path());
    }

    for entry in doomed {
        // symlink_metadata so a link to a directory is unlinked, not followed
        let meta = fs::symlink_metadata(&entry)
            .await
            .map_err(|e| ScaffoldError::fs("inspect", &entry, e))?;

        if meta.is_dir() {
            fs::remove_dir_all(&entry)
                .await
                .map_err(|e| ScaffoldError::fs("remove", &entry, e))?;
        } else {
            fs::remove_file(&entry)
                .await
                .map_err(|e| ScaffoldError::fs("remove", &entry, e))?;
        }
        reporter.debug("remove", &entry.display().to_string());
    }

    Ok(())
}
