//! Store module
//!
//! A store is a canonicalized directory the server may serve from. Stores are
//! ordered: for the same request path, earlier stores win.

mod overrides;
mod resolver;

use std::path::{Path, PathBuf};

use crate::error::StartupError;

pub use overrides::{load_overrides, parse_overrides, OVERRIDE_FILE_NAME};
pub use resolver::{decode_request_path, resolve, Resolved, ResolvedDirectory, ResolvedFile};

/// One filesystem root, canonicalized once at startup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Store {
    root: PathBuf,
}

impl Store {
    /// Canonicalize `path` and check it is a directory
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StartupError> {
        let path = path.as_ref();
        let root = path.canonicalize().map_err(|source| StartupError::Store {
            path: path.to_path_buf(),
            source,
        })?;

        if !root.is_dir() {
            return Err(StartupError::StoreNotDirectory(root));
        }

        Ok(Self { root })
    }

    /// Canonical root directory
    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_canonicalizes() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("a")).unwrap();

        let store = Store::open(dir.path().join("a").join("..").join("a")).unwrap();
        assert_eq!(store.root(), dir.path().join("a").canonicalize().unwrap());
    }

    #[test]
    fn test_open_rejects_missing_and_files() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            Store::open(dir.path().join("missing")),
            Err(StartupError::Store { .. })
        ));

        let file = dir.path().join("file.txt");
        std::fs::write(&file, "x").unwrap();
        assert!(matches!(
            Store::open(&file),
            Err(StartupError::StoreNotDirectory(_))
        ));
    }
}
