//! Rendering a template tree into the destination directory

use super::placeholder::{substitute, PlaceholderMap};
use super::source::{ensure_enclosed, TemplateTree};
use crate::error::{Result, ScaffoldError};
use crate::report::Reporter;
use std::collections::BTreeSet;
use std::path::Path;
use tokio::fs;

/// How a template file is treated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    /// Scanned for placeholder tokens
    Text,
    /// Copied byte-for-byte
    Binary,
}

impl FileKind {
    pub fn of(relative: &str, binary_files: &BTreeSet<String>) -> Self {
        if binary_files.contains(relative) {
            FileKind::Binary
        } else {
            FileKind::Text
        }
    }
}

/// A file written by [`render`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenFile {
    /// Relative `/`-separated path under the destination
    pub path: String,
    pub kind: FileKind,
    pub bytes: usize,
}

/// Render every file of `tree` under `destination`.
///
/// Text files get their `$TOKEN$`s replaced; unmapped tokens become "" and
/// produce a warning without stopping the render. Paths in `binary_files`
/// (and text files that are not UTF-8) are copied untouched. The returned
/// list follows the tree's enumeration order.
pub async fn render(
    tree: &TemplateTree,
    destination: &Path,
    placeholders: &PlaceholderMap,
    binary_files: &BTreeSet<String>,
    reporter: &dyn Reporter,
) -> Result<Vec<WrittenFile>> {
    let mut written = Vec::with_capacity(tree.files().len());

    for relative in tree.files() {
        ensure_enclosed(relative)?;
        let source = tree.read(relative).await?;
        let kind = FileKind::of(relative, binary_files);

        let output = match kind {
            FileKind::Binary => source,
            FileKind::Text => match String::from_utf8(source) {
                Ok(text) => {
                    let result = substitute(&text, placeholders);
                    for token in &result.replaced {
                        reporter.debug("substitute", &format!("${token}$ in {relative}"));
                    }
                    for token in &result.missing {
                        reporter.warn(
                            "placeholder",
                            &format!("${token}$ in {relative} has no value, left empty"),
                        );
                    }
                    result.text.into_bytes()
                }
                Err(e) => {
                    reporter.warn(
                        "binary",
                        &format!("{relative} is not UTF-8 text, copied without substitution"),
                    );
                    e.into_bytes()
                }
            },
        };

        let target = destination.join(relative);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| ScaffoldError::fs("create directory", parent, e))?;
        }
        fs::write(&target, &output)
            .await
            .map_err(|e| ScaffoldError::fs("write", &target, e))?;
        reporter.create("create", relative);

        written.push(WrittenFile {
            path: relative.clone(),
            kind,
            bytes: output.len(),
        });
    }

    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::{Level, Recorder, Silent};
    use tempfile::TempDir;

    const ICON: &[u8] = &[0x00, 0x00, 0x01, 0x00, 0xff, 0xfe, b'$', b'A', b'$', 0x80];

    async fn fixture(temp: &TempDir) -> TemplateTree {
        let root = temp.path().join("template");
        std::fs::create_dir_all(root.join("src/components")).unwrap();
        std::fs::create_dir_all(root.join("public")).unwrap();
        std::fs::write(
            root.join("template.yaml"),
            "name: t\nversion: 0.1.0\nbinary_files: [public/favicon.ico]\n",
        )
        .unwrap();
        std::fs::write(
            root.join("src/components/page.js"),
            "const DOMAIN = 'https://$APP_NAME$.codeday.org';\n",
        )
        .unwrap();
        std::fs::write(root.join("src/mixed.txt"), "$KNOWN$text$UNKNOWN$").unwrap();
        std::fs::write(root.join("public/favicon.ico"), ICON).unwrap();
        TemplateTree::from_dir(root).await.unwrap()
    }

    fn placeholders() -> PlaceholderMap {
        [("APP_NAME", "demo"), ("KNOWN", "X"), ("A", "never")]
            .into_iter()
            .collect()
    }

    fn snapshot(dir: &Path) -> Vec<(String, Vec<u8>)> {
        let mut files: Vec<_> = walkdir::WalkDir::new(dir)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .map(|e| {
                let rel = e.path().strip_prefix(dir).unwrap().to_string_lossy().into_owned();
                (rel, std::fs::read(e.path()).unwrap())
            })
            .collect();
        files.sort();
        files
    }

    #[tokio::test]
    async fn test_render_substitutes_and_warns() {
        let temp = TempDir::new().unwrap();
        let tree = fixture(&temp).await;
        let dest = temp.path().join("out");
        let recorder = Recorder::new();

        let written = render(
            &tree,
            &dest,
            &placeholders(),
            &tree.manifest().binary_files,
            &recorder,
        )
        .await
        .unwrap();

        assert_eq!(written.len(), 3);
        assert_eq!(
            std::fs::read_to_string(dest.join("src/mixed.txt")).unwrap(),
            "Xtext"
        );
        assert_eq!(
            std::fs::read_to_string(dest.join("src/components/page.js")).unwrap(),
            "const DOMAIN = 'https://demo.codeday.org';\n"
        );

        let warnings = recorder.warnings();
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].detail.contains("$UNKNOWN$"));
        assert_eq!(recorder.at(Level::Create).len(), 3);
    }

    #[tokio::test]
    async fn test_binary_files_copied_verbatim() {
        let temp = TempDir::new().unwrap();
        let tree = fixture(&temp).await;
        let dest = temp.path().join("out");

        let written = render(
            &tree,
            &dest,
            &placeholders(),
            &tree.manifest().binary_files,
            &Silent,
        )
        .await
        .unwrap();

        assert_eq!(std::fs::read(dest.join("public/favicon.ico")).unwrap(), ICON);
        let icon = written
            .iter()
            .find(|f| f.path == "public/favicon.ico")
            .unwrap();
        assert_eq!(icon.kind, FileKind::Binary);
        assert_eq!(icon.bytes, ICON.len());
    }

    #[tokio::test]
    async fn test_non_utf8_text_falls_back_to_copy() {
        let temp = TempDir::new().unwrap();
        let tree = fixture(&temp).await;
        let dest = temp.path().join("out");
        let recorder = Recorder::new();

        // Without the declaration the icon is treated as text
        render(&tree, &dest, &placeholders(), &BTreeSet::new(), &recorder)
            .await
            .unwrap();

        assert_eq!(std::fs::read(dest.join("public/favicon.ico")).unwrap(), ICON);
        assert!(recorder
            .warnings()
            .iter()
            .any(|w| w.action == "binary" && w.detail.contains("favicon.ico")));
    }

    #[tokio::test]
    async fn test_render_is_deterministic() {
        let temp = TempDir::new().unwrap();
        let tree = fixture(&temp).await;
        let first = temp.path().join("first");
        let second = temp.path().join("second");
        let binary = tree.manifest().binary_files.clone();

        let a = render(&tree, &first, &placeholders(), &binary, &Silent)
            .await
            .unwrap();
        let b = render(&tree, &second, &placeholders(), &binary, &Silent)
            .await
            .unwrap();

        assert_eq!(a, b);
        assert_eq!(snapshot(&first), snapshot(&second));
    }

    #[tokio::test]
    async fn test_written_order_matches_enumeration() {
        let temp = TempDir::new().unwrap();
        let tree = fixture(&temp).await;
        let dest = temp.path().join("out");

        let written = render(
            &tree,
            &dest,
            &placeholders(),
            &tree.manifest().binary_files,
            &Silent,
        )
        .await
        .unwrap();

        let paths: Vec<_> = written.iter().map(|f| f.path.as_str()).collect();
        assert_eq!(paths, tree.files());
    }

    #[test]
    fn test_file_kind_lookup() {
        let binary: BTreeSet<String> = ["public/favicon.ico".to_string()].into();
        assert_eq!(FileKind::of("public/favicon.ico", &binary), FileKind::Binary);
        assert_eq!(FileKind::of("favicon.ico", &binary), FileKind::Text);
    }
}
