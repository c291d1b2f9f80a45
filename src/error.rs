//! Error taxonomy shared by path validation and filesystem operations.

use std::fmt;

use thiserror::Error;

/// What a path was expected to denote when the actual node turned out to be
/// the other variant.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PathKind {
    File,
    Directory,
}

impl fmt::Display for PathKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathKind::File => write!(f, "file"),
            PathKind::Directory => write!(f, "directory"),
        }
    }
}

/// All failures produced by this crate.
///
/// Validation errors (`InvalidPath`, the rootedness mismatches) surface when
/// a path value is constructed, before any tree access. Mutation errors
/// surface at the failing operation and leave the tree exactly as it was.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FsError {
    /// Malformed characters, empty input, malformed drive or UNC token, or
    /// a canonical form exceeding the maximum path length.
    #[error("invalid path '{path}': {reason}")]
    InvalidPath { path: String, reason: String },

    /// A relative path was supplied where a rooted one is required.
    #[error("the path '{path}' is not rooted")]
    RootedPathExpected { path: String },

    /// A rooted path was supplied where a relative one is required.
    #[error("the path '{path}' is rooted")]
    RelativePathExpected { path: String },

    /// The target does not exist.
    #[error("'{path}' does not exist")]
    NotFound { path: String },

    /// The target exists but is the wrong variant.
    #[error("'{path}' does not denote a {expected}")]
    WrongType { path: String, expected: PathKind },

    /// A strict create, or a move/copy destination, collided with an
    /// existing node.
    #[error("'{path}' already exists")]
    AlreadyExists { path: String },

    /// The path references a drive with no node in the tree.
    #[error("the drive '{drive}' does not exist")]
    DriveNotFound { drive: String },

    /// Cross-filesystem move, move into an own descendant, move or copy
    /// onto itself, or deleting a non-empty directory non-recursively.
    #[error("invalid operation: {reason}")]
    InvalidOperation { reason: String },

    /// Unsupported special-folder identifier.
    #[error("not supported: {what}")]
    NotSupported { what: String },

    /// The engine lock was poisoned by a panicking caller.
    #[error("the filesystem lock is poisoned")]
    Lock,
}

impl FsError {
    pub(crate) fn invalid_path(path: &str, reason: impl Into<String>) -> Self {
        FsError::InvalidPath {
            path: path.to_owned(),
            reason: reason.into(),
        }
    }

    pub(crate) fn not_found(path: impl Into<String>) -> Self {
        FsError::NotFound { path: path.into() }
    }

    pub(crate) fn wrong_type(path: impl Into<String>, expected: PathKind) -> Self {
        FsError::WrongType {
            path: path.into(),
            expected,
        }
    }

    pub(crate) fn already_exists(path: impl Into<String>) -> Self {
        FsError::AlreadyExists { path: path.into() }
    }

    pub(crate) fn invalid_operation(reason: impl Into<String>) -> Self {
        FsError::InvalidOperation {
            reason: reason.into(),
        }
    }
}
