//! The document-vault host as seen by the launcher.
//!
//! The dispatcher only needs three answers from its host: where the vault lives
//! on disk, which file is active, and where the editor cursor sits.

use std::path::PathBuf;

/// A file or folder inside the vault, addressed by its vault-relative path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRef {
    pub path: String,
    /// Parent folder, `None` for items at the vault root.
    pub parent: Option<String>,
}

impl FileRef {
    /// Builds a reference from a vault-relative path, deriving the parent.
    pub fn new(path: impl Into<String>) -> Self {
        let path = normalize(&path.into());
        let parent = path
            .rsplit_once('/')
            .map(|(parent, _)| parent.to_string())
            .filter(|parent| !parent.is_empty());
        Self { path, parent }
    }

    pub fn folder(&self) -> &str {
        self.parent.as_deref().unwrap_or("")
    }
}

/// Editor cursor position, 0-based as editors report it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Cursor {
    pub line: u32,
    pub ch: u32,
}

/// Capabilities the launcher reads from the host application.
pub trait Host {
    /// Absolute path of the vault root, or `None` when the vault is not
    /// backed by the local filesystem.
    fn vault_path(&self) -> Option<String>;

    fn active_file(&self) -> Option<FileRef>;

    fn cursor(&self) -> Option<Cursor>;
}

/// Host assembled from command-line arguments.
#[derive(Debug, Clone, Default)]
pub struct CliHost {
    pub vault: Option<PathBuf>,
    pub file: Option<FileRef>,
    pub cursor: Option<Cursor>,
}

impl CliHost {
    /// `line` and `ch` are 1-based, as a user would type them.
    pub fn new(
        vault: Option<PathBuf>,
        file: Option<String>,
        line: Option<u32>,
        ch: Option<u32>,
    ) -> Self {
        let cursor = match (line, ch) {
            (None, None) => None,
            (line, ch) => Some(Cursor {
                line: line.unwrap_or(1).saturating_sub(1),
                ch: ch.unwrap_or(1).saturating_sub(1),
            }),
        };
        Self {
            vault,
            file: file.filter(|f| !f.trim().is_empty()).map(FileRef::new),
            cursor,
        }
    }
}

impl Host for CliHost {
    fn vault_path(&self) -> Option<String> {
        self.vault
            .as_ref()
            .map(|vault| vault.to_string_lossy().into_owned())
    }

    fn active_file(&self) -> Option<FileRef> {
        self.file.clone()
    }

    fn cursor(&self) -> Option<Cursor> {
        self.cursor
    }
}

/// Vault-relative paths use forward slashes and carry no leading `./` or `/`.
fn normalize(path: &str) -> String {
    let path = path.trim().replace('\\', "/");
    let path = path.trim_start_matches("./").trim_start_matches('/');
    path.trim_end_matches('/').to_string()
}
