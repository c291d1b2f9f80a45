//! The filesystem operation contract shared by the in-memory engine and
//! any OS-backed adapter a consumer may supply.

use std::io::{Read, Seek, Write};
use std::time::SystemTime;

use crate::error::FsError;
use crate::path::RootedCanonicalPath;

pub type Result<T> = std::result::Result<T, FsError>;

/// Identity of one filesystem instance. Rooted path values are only
/// meaningful relative to the instance that created them; comparing or
/// combining values across instances is invalid by design.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct FsId(pub(crate) u64);

/// Symbolic well-known folder identifiers. The engine maps each supported
/// identifier to a canonical rooted directory at initialization.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SpecialFolder {
    ApplicationData,
    CommonApplicationData,
    Desktop,
    Documents,
    LocalApplicationData,
    /// Exists as an identifier but cannot be denoted by a directory path;
    /// requesting it yields [`FsError::NotSupported`].
    MyComputer,
    ProgramFiles,
    System,
    Temp,
    UserProfile,
}

/// A positioned byte stream over one file. Whether reads or writes are
/// permitted depends on the factory that produced the stream; forbidden
/// operations fail with an `std::io` error rather than a panic.
pub trait FileStream: Read + Write + Seek {}

/// The full operation contract. All paths arriving here are canonical and
/// rooted; the typed path values perform validation and canonicalization
/// before any call lands on the engine.
///
/// Classification queries return plain booleans and never fail. Metadata
/// and mutation operations distinguish a missing target (`NotFound`) from a
/// target of the wrong variant (`WrongType`), and leave the tree untouched
/// when they fail.
pub trait FileSystem {
    /// The identity of this instance, embedded in every rooted value it
    /// creates.
    fn fs_id(&self) -> FsId;

    /// True if the path denotes an existing file.
    fn is_file(&self, path: &RootedCanonicalPath) -> bool;

    /// True if the path denotes an existing directory.
    fn is_directory(&self, path: &RootedCanonicalPath) -> bool;

    fn file_size(&self, path: &RootedCanonicalPath) -> Result<u64>;

    fn file_last_modified(&self, path: &RootedCanonicalPath) -> Result<SystemTime>;
    fn set_file_last_modified(&self, path: &RootedCanonicalPath, at: SystemTime) -> Result<()>;
    fn directory_last_modified(&self, path: &RootedCanonicalPath) -> Result<SystemTime>;
    fn set_directory_last_modified(
        &self,
        path: &RootedCanonicalPath,
        at: SystemTime,
    ) -> Result<()>;

    fn file_last_accessed(&self, path: &RootedCanonicalPath) -> Result<SystemTime>;
    fn set_file_last_accessed(&self, path: &RootedCanonicalPath, at: SystemTime) -> Result<()>;
    fn directory_last_accessed(&self, path: &RootedCanonicalPath) -> Result<SystemTime>;
    fn set_directory_last_accessed(
        &self,
        path: &RootedCanonicalPath,
        at: SystemTime,
    ) -> Result<()>;

    /// Immediate child files of the directory, as canonical rooted paths.
    fn files_in_directory(&self, path: &RootedCanonicalPath) -> Result<Vec<RootedCanonicalPath>>;

    /// Immediate child directories of the directory.
    fn directories_in_directory(
        &self,
        path: &RootedCanonicalPath,
    ) -> Result<Vec<RootedCanonicalPath>>;

    /// Creates the directory and every missing intermediate folder. The
    /// drive itself must exist.
    fn create_directory(&self, path: &RootedCanonicalPath) -> Result<()>;

    /// Removes a file node. Strict: a missing target is an error.
    fn delete_file(&self, path: &RootedCanonicalPath) -> Result<()>;

    /// Removes a directory node; with `recursive` the whole subtree goes.
    /// Strict: a missing target, or a non-empty directory without
    /// `recursive`, is an error.
    fn delete_directory(&self, path: &RootedCanonicalPath, recursive: bool) -> Result<()>;

    fn move_file(
        &self,
        source: &RootedCanonicalPath,
        destination: &RootedCanonicalPath,
    ) -> Result<()>;

    fn move_directory(
        &self,
        source: &RootedCanonicalPath,
        destination: &RootedCanonicalPath,
    ) -> Result<()>;

    /// Copies a file; the destination must not exist.
    fn copy_file(
        &self,
        source: &RootedCanonicalPath,
        destination: &RootedCanonicalPath,
    ) -> Result<()>;

    /// Copies a file over an existing destination file, or creates it.
    fn copy_and_overwrite_file(
        &self,
        source: &RootedCanonicalPath,
        destination: &RootedCanonicalPath,
    ) -> Result<()>;

    /// Recursively duplicates a directory subtree; the destination must
    /// not exist.
    fn copy_directory(
        &self,
        source: &RootedCanonicalPath,
        destination: &RootedCanonicalPath,
    ) -> Result<()>;

    /// Opens the file for reading. Fails if it is missing or a directory.
    fn create_read_stream(&self, path: &RootedCanonicalPath) -> Result<Box<dyn FileStream>>;

    /// Truncates or creates the file. Fails if the path denotes a
    /// directory or the parent directory does not exist.
    fn create_write_stream(&self, path: &RootedCanonicalPath) -> Result<Box<dyn FileStream>>;

    /// Creates or reuses the file, positioned at the end.
    fn create_append_stream(&self, path: &RootedCanonicalPath) -> Result<Box<dyn FileStream>>;

    /// Creates or reuses the file, positioned at the start, readable and
    /// writable without truncation.
    fn create_modify_stream(&self, path: &RootedCanonicalPath) -> Result<Box<dyn FileStream>>;

    fn current_directory(&self) -> Result<RootedCanonicalPath>;

    /// Changes the current directory; the target must be an existing
    /// directory.
    fn set_current_directory(&self, path: &RootedCanonicalPath) -> Result<()>;

    fn temporary_directory(&self) -> Result<RootedCanonicalPath>;

    fn special_folder(&self, folder: SpecialFolder) -> Result<RootedCanonicalPath>;

    /// Names of all drives present in the tree, e.g. `c:`.
    fn drives(&self) -> Result<Vec<String>>;
}
