//! Error types shared by the store contract, bucket setup and directory sync.

use std::path::PathBuf;

use thiserror::Error;

/// Errors reported by a [`crate::contract::BucketStore`] implementation.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The bucket exists and already belongs to the caller.
    #[error("bucket {bucket} already exists and is owned by you")]
    BucketAlreadyOwnedByYou { bucket: String },

    /// The bucket name is taken by another account.
    #[error("bucket {bucket} already exists and is owned by another account")]
    BucketAlreadyExists { bucket: String },

    #[error("{operation} failed: {message}")]
    Service { operation: String, message: String },

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl StoreError {
    pub fn service(operation: impl Into<String>, message: impl ToString) -> Self {
        StoreError::Service {
            operation: operation.into(),
            message: message.to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("sync root {0} does not exist")]
    RootNotFound(PathBuf),

    #[error("sync root {0} is not a directory")]
    RootNotADirectory(PathBuf),

    #[error("could not resolve sync root {path}: {source}")]
    RootResolve {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to walk directory tree: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("{path} is not inside sync root {root}")]
    OutsideRoot { path: PathBuf, root: PathBuf },

    #[error("path {0} cannot be expressed as a UTF-8 object key")]
    NonUtf8Key(PathBuf),

    #[error("upload of {key} failed: {source}")]
    Upload {
        key: String,
        #[source]
        source: StoreError,
    },
}

#[derive(Debug, Error)]
pub enum SetupError {
    #[error("invalid bucket name {name:?}: {reason}")]
    InvalidBucketName { name: String, reason: &'static str },

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("failed to render bucket policy: {0}")]
    Policy(#[from] serde_json::Error),
}
