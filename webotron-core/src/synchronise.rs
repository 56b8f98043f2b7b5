//! High-level pipeline: pushes a local directory tree into a website bucket.
//!
//! [`sync_directory`] resolves the root, walks it with [`crate::walk::walk_files`]
//! and uploads each regular file through a [`BucketStore`], one at a time.
//!
//! # Responsibilities
//! - Map the local layout onto the bucket 1:1 (`sub/style.css` → key `sub/style.css`)
//! - Attach a Content-Type to every object, guessed from its extension
//! - Overwrite existing objects; nothing is diffed or skipped
//!
//! # Error Handling
//! Fail fast. A missing root fails before any upload. The first walk or upload
//! error aborts the rest of the sync and is returned with the key that failed;
//! objects uploaded before it stay in the bucket.

use std::path::{Path, PathBuf};

use tracing::{debug, error, info};

use crate::content_type::content_type_for;
use crate::contract::{BucketStore, UploadRequest};
use crate::error::SyncError;
use crate::walk::{resolve_root, walk_files};

/// Summary of a completed sync.
#[derive(Debug)]
pub struct SyncReport {
    pub bucket: String,
    pub root: PathBuf,
    pub uploaded: Vec<UploadedObject>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedObject {
    pub key: String,
    pub content_type: String,
}

/// Upload every regular file under `pathname` to `bucket`, keyed by its path relative to the root.
pub async fn sync_directory<S>(
    store: &S,
    pathname: &Path,
    bucket: &str,
) -> Result<SyncReport, SyncError>
where
    S: BucketStore + ?Sized,
{
    let root = resolve_root(pathname)?;
    info!(root = %root.display(), bucket, "[SYNC] Starting directory sync");

    let mut uploaded = Vec::new();

    for entry in walk_files(&root) {
        let entry = entry.map_err(|e| {
            error!(error = %e, "[SYNC][ERROR] Directory walk failed");
            e
        })?;

        let content_type = content_type_for(&entry.key);
        debug!(key = %entry.key, content_type = %content_type, path = %entry.path.display(), "[SYNC] Uploading file");

        let req = UploadRequest {
            bucket: bucket.to_string(),
            path: entry.path,
            key: entry.key.clone(),
            content_type: content_type.clone(),
        };
        if let Err(source) = store.upload_file(req).await {
            error!(key = %entry.key, error = %source, "[SYNC][ERROR] Upload failed, aborting sync");
            return Err(SyncError::Upload {
                key: entry.key,
                source,
            });
        }

        uploaded.push(UploadedObject {
            key: entry.key,
            content_type,
        });
    }

    info!(bucket, objects = uploaded.len(), "[SYNC] Directory sync complete");
    Ok(SyncReport {
        bucket: bucket.to_string(),
        root,
        uploaded,
    })
}
