//! # Media Path Policy
//!
//! Confines `play` paths to a media root, optionally hides dotfiles and
//! restricts accepted file types.

use serde::Deserialize;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;

/// Why a requested path was refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathRejection {
    /// Empty path.
    #[error("empty path")]
    Empty,

    /// The path resolves outside the media root.
    #[error("path escapes the media root")]
    EscapesRoot,

    /// A path component is hidden and hidden files are disallowed.
    #[error("hidden path component '{0}'")]
    Hidden(String),

    /// The file extension is not in the accepted set.
    #[error("file type {0:?} is not accepted")]
    FileType(Option<String>),
}

/// Filesystem policy for media paths.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct MediaPolicy {
    /// Top-level media directory.
    pub root: PathBuf,
    /// Whether dot-prefixed components may be played.
    pub allow_hidden: bool,
    /// Accepted extensions, without the dot. Empty accepts everything.
    pub filetypes: Vec<String>,
}

impl Default for MediaPolicy {
    fn default() -> Self {
        Self {
            root: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            allow_hidden: false,
            filetypes: Vec::new(),
        }
    }
}

impl MediaPolicy {
    /// Policy rooted at `root` with defaults otherwise.
    pub fn rooted(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Self::default()
        }
    }

    /// Resolve a requested path to an absolute location under the root.
    ///
    /// Absolute requests must already lie under the root. `..` may not climb
    /// above it. Resolution is lexical; symlinks are not followed.
    pub fn resolve(&self, requested: &str) -> Result<PathBuf, PathRejection> {
        if requested.is_empty() {
            return Err(PathRejection::Empty);
        }

        let requested = Path::new(requested);
        let relative = if requested.is_absolute() {
            requested
                .strip_prefix(&self.root)
                .map_err(|_| PathRejection::EscapesRoot)?
        } else {
            requested
        };

        let mut parts: Vec<&str> = Vec::new();
        for component in relative.components() {
            match component {
                Component::Normal(part) => {
                    let part = part.to_str().ok_or(PathRejection::EscapesRoot)?;
                    if !self.allow_hidden && part.starts_with('.') {
                        return Err(PathRejection::Hidden(part.to_string()));
                    }
                    parts.push(part);
                }
                Component::CurDir => {}
                Component::ParentDir => {
                    if parts.pop().is_none() {
                        return Err(PathRejection::EscapesRoot);
                    }
                }
                Component::RootDir | Component::Prefix(_) => {
                    return Err(PathRejection::EscapesRoot);
                }
            }
        }

        if parts.is_empty() {
            return Err(PathRejection::Empty);
        }

        let resolved: PathBuf = parts.iter().fold(self.root.clone(), |acc, p| acc.join(p));
        self.check_filetype(&resolved)?;
        Ok(resolved)
    }

    fn check_filetype(&self, path: &Path) -> Result<(), PathRejection> {
        if self.filetypes.is_empty() {
            return Ok(());
        }

        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);

        let accepted = extension.as_deref().is_some_and(|ext| {
            self.filetypes
                .iter()
                .any(|allowed| allowed.trim_start_matches('.').eq_ignore_ascii_case(ext))
        });

        if accepted {
            Ok(())
        } else {
            Err(PathRejection::FileType(extension))
        }
    }
}
