//! Directory traversal for sync: turns a local tree into (path, key) pairs.
//!
//! Nothing here touches the network. [`walk_files`] is lazy, so callers decide
//! what to do with each entry as it is produced.

use std::path::{Component, Path, PathBuf};

use tracing::{debug, error};
use walkdir::WalkDir;

use crate::error::SyncError;

/// A regular file found under the sync root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncEntry {
    /// Absolute path of the local file.
    pub path: PathBuf,
    /// Object key: the path relative to the root, `/`-separated.
    pub key: String,
}

/// Expand a leading `~` and resolve the root to an absolute, canonical directory.
pub fn resolve_root(pathname: &Path) -> Result<PathBuf, SyncError> {
    let expanded = expand_home(pathname);

    if !expanded.exists() {
        error!(path = %expanded.display(), "Sync root does not exist");
        return Err(SyncError::RootNotFound(expanded));
    }
    if !expanded.is_dir() {
        error!(path = %expanded.display(), "Sync root is not a directory");
        return Err(SyncError::RootNotADirectory(expanded));
    }

    let root = expanded
        .canonicalize()
        .map_err(|source| SyncError::RootResolve {
            path: expanded.clone(),
            source,
        })?;
    debug!(root = %root.display(), "Resolved sync root");
    Ok(root)
}

fn expand_home(pathname: &Path) -> PathBuf {
    let mut components = pathname.components();
    match components.next() {
        Some(Component::Normal(first)) if first == "~" => match dirs::home_dir() {
            Some(home) => home.join(components.as_path()),
            None => pathname.to_path_buf(),
        },
        _ => pathname.to_path_buf(),
    }
}

/// Compute the object key of `path` relative to `root`.
pub fn object_key(root: &Path, path: &Path) -> Result<String, SyncError> {
    let relative = path
        .strip_prefix(root)
        .map_err(|_| SyncError::OutsideRoot {
            path: path.to_path_buf(),
            root: root.to_path_buf(),
        })?;

    let parts = relative
        .components()
        .map(|c| {
            c.as_os_str()
                .to_str()
                .ok_or_else(|| SyncError::NonUtf8Key(path.to_path_buf()))
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(parts.join("/"))
}

/// Lazily walk `root` depth-first and yield every regular file beneath it.
///
/// Directories are descended into, symlinks are not followed, and anything
/// that is neither a directory nor a regular file is skipped. Sibling order is
/// unspecified.
pub fn walk_files(root: &Path) -> impl Iterator<Item = Result<SyncEntry, SyncError>> + '_ {
    WalkDir::new(root)
        .min_depth(1)
        .follow_links(false)
        .into_iter()
        .filter_map(move |entry| match entry {
            Ok(entry) if entry.file_type().is_file() => Some(
                object_key(root, entry.path()).map(|key| SyncEntry {
                    path: entry.into_path(),
                    key,
                }),
            ),
            Ok(entry) => {
                if !entry.file_type().is_dir() {
                    debug!(path = %entry.path().display(), "Skipping non-regular entry");
                }
                None
            }
            Err(e) => Some(Err(SyncError::Walk(e))),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;
    use std::fs;
    use tempfile::tempdir;

    fn keys(root: &Path) -> BTreeSet<String> {
        walk_files(root)
            .map(|e| e.expect("walk entry").key)
            .collect()
    }

    #[test]
    fn keys_are_relative_and_slash_separated() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("index.html"), "<h1>hi</h1>").unwrap();
        fs::create_dir_all(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("sub").join("style.css"), "body{}").unwrap();

        let root = resolve_root(dir.path()).unwrap();
        let expected: BTreeSet<String> = ["index.html", "sub/style.css"]
            .into_iter()
            .map(String::from)
            .collect();
        assert_eq!(keys(&root), expected);
    }

    #[test]
    fn empty_directories_yield_nothing() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("a/b/c")).unwrap();
        assert!(keys(dir.path()).is_empty());
    }

    #[test]
    fn entries_carry_absolute_paths() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("deep/er")).unwrap();
        fs::write(dir.path().join("deep/er/page.html"), "x").unwrap();

        let root = resolve_root(dir.path()).unwrap();
        let entries: Vec<_> = walk_files(&root).collect::<Result<_, _>>().unwrap();
        assert_eq!(entries.len(), 1);
        assert!(entries[0].path.is_absolute());
        assert_eq!(entries[0].path, root.join("deep/er/page.html"));
        assert_eq!(entries[0].key, "deep/er/page.html");
    }

    #[cfg(unix)]
    #[test]
    fn symlinks_are_skipped() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("real.html"), "x").unwrap();
        std::os::unix::fs::symlink(dir.path().join("real.html"), dir.path().join("link.html"))
            .unwrap();

        let found = keys(dir.path());
        assert!(found.contains("real.html"));
        assert!(!found.contains("link.html"));
    }

    #[test]
    fn missing_root_is_rejected() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("nope");
        assert!(matches!(
            resolve_root(&missing),
            Err(SyncError::RootNotFound(p)) if p == missing
        ));
    }

    #[test]
    fn file_root_is_rejected() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("index.html");
        fs::write(&file, "x").unwrap();
        assert!(matches!(
            resolve_root(&file),
            Err(SyncError::RootNotADirectory(_))
        ));
    }

    #[test]
    fn object_key_rejects_paths_outside_root() {
        let err = object_key(Path::new("/srv/site"), Path::new("/etc/passwd")).unwrap_err();
        assert!(matches!(err, SyncError::OutsideRoot { .. }));
    }

    #[test]
    fn tilde_expands_to_home() {
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_home(Path::new("~/site")), home.join("site"));
        }
        assert_eq!(expand_home(Path::new("./site")), PathBuf::from("./site"));
    }
}
