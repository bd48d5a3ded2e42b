//! Resource resolution across stores
//!
//! Maps a decoded request path to the first store holding a readable file (or,
//! with listings enabled, a directory) at that path. Containment is checked on
//! the canonical path, so `..` segments and symlinks pointing outside the
//! store both resolve to nothing.

use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use percent_encoding::percent_decode_str;
use tokio::fs::{self, File};

use super::overrides::OVERRIDE_FILE_NAME;
use super::Store;
use crate::error::ServeError;
use crate::logger;

/// A regular file found in a store, already opened for reading
#[derive(Debug)]
pub struct ResolvedFile {
    pub path: PathBuf,
    pub store: PathBuf,
    pub file: File,
    pub len: u64,
    pub modified: SystemTime,
}

impl ResolvedFile {
    /// Final path component, used for `Content-Disposition` and overrides
    pub fn name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Directory that contains the file
    pub fn directory(&self) -> &Path {
        self.path.parent().unwrap_or(&self.store)
    }

    pub fn extension(&self) -> Option<&str> {
        self.path.extension().and_then(|e| e.to_str())
    }
}

/// A directory found in a store, only produced when listings are enabled
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedDirectory {
    pub path: PathBuf,
    pub store: PathBuf,
}

#[derive(Debug)]
pub enum Resolved {
    File(ResolvedFile),
    Directory(ResolvedDirectory),
    NotFound,
}

/// Percent-decode the wire path into the form the resolver expects
///
/// Rejects paths that are not UTF-8 after decoding or that contain NUL.
pub fn decode_request_path(raw: &str) -> Result<String, ServeError> {
    let decoded = percent_decode_str(raw)
        .decode_utf8()
        .map_err(|_| ServeError::InvalidPath)?;

    if decoded.contains('\0') {
        return Err(ServeError::InvalidPath);
    }

    if decoded.starts_with('/') {
        Ok(decoded.into_owned())
    } else {
        Ok(format!("/{decoded}"))
    }
}

/// Resolve `request_path` against `stores` in precedence order
///
/// Missing paths are not errors. A directory is only a match when
/// `directory_listing` is set; otherwise later stores are still consulted.
/// Errors are reserved for I/O faults on a path that does exist.
pub async fn resolve(
    stores: &[Store],
    request_path: &str,
    directory_listing: bool,
) -> Result<Resolved, ServeError> {
    let relative = request_path.trim_start_matches('/');

    for store in stores {
        let candidate = store.root().join(relative);

        let canonical = match fs::canonicalize(&candidate).await {
            Ok(p) => p,
            Err(e) if e.kind() == io::ErrorKind::NotFound => continue,
            Err(e) => {
                tracing::debug!(path = %candidate.display(), error = %e, "candidate not resolvable");
                continue;
            }
        };

        if !canonical.starts_with(store.root()) {
            logger::log_traversal_blocked(request_path, &canonical);
            continue;
        }

        let metadata = fs::metadata(&canonical).await?;

        if metadata.is_file() {
            if canonical.file_name().is_some_and(|n| n == OVERRIDE_FILE_NAME) {
                continue;
            }

            let file = match File::open(&canonical).await {
                Ok(f) => f,
                Err(e) if e.kind() == io::ErrorKind::PermissionDenied => {
                    tracing::debug!(path = %canonical.display(), "file not readable, trying next store");
                    continue;
                }
                Err(e) => return Err(e.into()),
            };

            return Ok(Resolved::File(ResolvedFile {
                path: canonical,
                store: store.root().to_path_buf(),
                file,
                len: metadata.len(),
                modified: metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH),
            }));
        }

        if metadata.is_dir() && directory_listing {
            return Ok(Resolved::Directory(ResolvedDirectory {
                path: canonical,
                store: store.root().to_path_buf(),
            }));
        }
    }

    Ok(Resolved::NotFound)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs as stdfs;
    use tempfile::TempDir;

    struct Fixture {
        _base: TempDir,
        outside: PathBuf,
        stores: Vec<Store>,
    }

    /// base/
    ///   secret.txt
    ///   a/ shared.txt, only_a.txt, docs/, beg_sm_local_modifier.txt
    ///   b/ shared.txt, only_b.txt, docs/readme.txt
    fn fixture() -> Fixture {
        let base = tempfile::tempdir().unwrap();
        let a = base.path().join("a");
        let b = base.path().join("b");
        stdfs::create_dir_all(a.join("docs")).unwrap();
        stdfs::create_dir_all(b.join("docs")).unwrap();
        stdfs::write(base.path().join("secret.txt"), "secret").unwrap();
        stdfs::write(a.join("shared.txt"), "from a").unwrap();
        stdfs::write(a.join("only_a.txt"), "a").unwrap();
        stdfs::write(a.join(OVERRIDE_FILE_NAME), "target=shared.txt\n").unwrap();
        stdfs::write(b.join("shared.txt"), "from b").unwrap();
        stdfs::write(b.join("only_b.txt"), "b").unwrap();
        stdfs::write(b.join("docs").join("readme.txt"), "readme").unwrap();

        let stores = vec![Store::open(&a).unwrap(), Store::open(&b).unwrap()];
        Fixture {
            outside: base.path().canonicalize().unwrap(),
            _base: base,
            stores,
        }
    }

    fn expect_file(resolved: Resolved) -> ResolvedFile {
        match resolved {
            Resolved::File(f) => f,
            other => panic!("Expected file, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_first_store_wins() {
        let fx = fixture();
        let file = expect_file(resolve(&fx.stores, "/shared.txt", false).await.unwrap());
        assert_eq!(file.store, fx.stores[0].root());
        assert_eq!(stdfs::read_to_string(&file.path).unwrap(), "from a");
        assert_eq!(file.len, 6);
        assert_eq!(file.name(), "shared.txt");
    }

    #[tokio::test]
    async fn test_falls_through_to_later_store() {
        let fx = fixture();
        let file = expect_file(resolve(&fx.stores, "/only_b.txt", false).await.unwrap());
        assert_eq!(file.store, fx.stores[1].root());
    }

    #[tokio::test]
    async fn test_missing_is_not_found() {
        let fx = fixture();
        assert!(matches!(
            resolve(&fx.stores, "/nope.txt", true).await.unwrap(),
            Resolved::NotFound
        ));
    }

    #[tokio::test]
    async fn test_parent_segments_cannot_escape() {
        let fx = fixture();
        for path in ["/../secret.txt", "/docs/../../secret.txt", "/./../a/../secret.txt"] {
            assert!(
                matches!(resolve(&fx.stores, path, true).await.unwrap(), Resolved::NotFound),
                "{path} must not resolve outside the stores"
            );
        }

        // Parent segments that stay inside a store are fine
        let file = expect_file(resolve(&fx.stores, "/docs/../only_a.txt", false).await.unwrap());
        assert_eq!(file.store, fx.stores[0].root());
    }

    #[tokio::test]
    async fn test_absolute_looking_path_stays_inside() {
        let fx = fixture();
        let secret = fx.outside.join("secret.txt");
        let raw = format!("//{}", secret.display());
        assert!(matches!(
            resolve(&fx.stores, &raw, false).await.unwrap(),
            Resolved::NotFound
        ));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_symlink_escape_rejected() {
        use std::os::unix::fs::symlink;

        let fx = fixture();
        symlink(fx.outside.join("secret.txt"), fx.stores[0].root().join("link.txt")).unwrap();
        symlink(&fx.outside, fx.stores[0].root().join("up")).unwrap();

        assert!(matches!(
            resolve(&fx.stores, "/link.txt", false).await.unwrap(),
            Resolved::NotFound
        ));
        assert!(matches!(
            resolve(&fx.stores, "/up/secret.txt", false).await.unwrap(),
            Resolved::NotFound
        ));
    }

    #[tokio::test]
    async fn test_directory_requires_listing() {
        let fx = fixture();
        assert!(matches!(
            resolve(&fx.stores, "/", false).await.unwrap(),
            Resolved::NotFound
        ));

        match resolve(&fx.stores, "/docs/", true).await.unwrap() {
            Resolved::Directory(dir) => {
                assert_eq!(dir.store, fx.stores[0].root());
                assert_eq!(dir.path, fx.stores[0].root().join("docs"));
            }
            other => panic!("Expected directory, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_sidecar_is_never_served() {
        let fx = fixture();
        let path = format!("/{OVERRIDE_FILE_NAME}");
        assert!(matches!(
            resolve(&fx.stores, &path, true).await.unwrap(),
            Resolved::NotFound
        ));
    }

    #[test]
    fn test_decode_request_path() {
        assert_eq!(decode_request_path("/a%20b.txt").unwrap(), "/a b.txt");
        assert_eq!(decode_request_path("/%C3%A9").unwrap(), "/é");
        assert_eq!(decode_request_path("x").unwrap(), "/x");
        assert!(matches!(
            decode_request_path("/%FF"),
            Err(ServeError::InvalidPath)
        ));
        assert!(matches!(
            decode_request_path("/a%00b"),
            Err(ServeError::InvalidPath)
        ));
    }

    #[tokio::test]
    async fn test_encoded_traversal_blocked() {
        let fx = fixture();
        let path = decode_request_path("/%2e%2e/secret.txt").unwrap();
        assert!(matches!(
            resolve(&fx.stores, &path, false).await.unwrap(),
            Resolved::NotFound
        ));
    }
}
