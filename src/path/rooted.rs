//! Rooted path values: absolute descriptors anchored at a drive and bound
//! to one filesystem instance.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::io::{Read, Write};
use std::sync::Arc;
use std::time::SystemTime;

use crate::core::{FileStream, FileSystem, Result};
use crate::error::{FsError, PathKind};
use crate::path::canonical;
use crate::path::drive::Drive;
use crate::path::file_name::FileName;
use crate::path::relative::{RelativeDirectory, RelativeFile};

/// A validated, canonical, rooted path string: the only currency the
/// [`FileSystem`] contract accepts. Comparison is case-insensitive.
#[derive(Debug, Clone)]
pub struct RootedCanonicalPath(String);

impl RootedCanonicalPath {
    pub(crate) fn new(canonical: String) -> Self {
        RootedCanonicalPath(canonical)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl PartialEq for RootedCanonicalPath {
    fn eq(&self, other: &Self) -> bool {
        self.0.eq_ignore_ascii_case(&other.0)
    }
}

impl Eq for RootedCanonicalPath {}

impl Hash for RootedCanonicalPath {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.to_ascii_lowercase().hash(state);
    }
}

impl fmt::Display for RootedCanonicalPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn stream_failure(err: std::io::Error) -> FsError {
    FsError::invalid_operation(format!("stream failure: {err}"))
}

/// The full path to a directory, rooted at a drive.
///
/// The descriptor is a pure value: it can denote a directory that does not
/// exist, and all filesystem effects go through the instance it was created
/// by.
#[derive(Clone)]
pub struct RootedDirectory {
    fs: Arc<dyn FileSystem>,
    path: String,
    canonical: RootedCanonicalPath,
}

impl RootedDirectory {
    pub(crate) fn describing(fs: Arc<dyn FileSystem>, path: &str) -> Result<Self> {
        let canonical = canonical::rooted_directory(path)?;
        Ok(RootedDirectory {
            fs,
            path: path.to_owned(),
            canonical: RootedCanonicalPath::new(canonical),
        })
    }

    /// Wraps a string that is already canonical, e.g. one coming back from
    /// the engine.
    pub(crate) fn from_validated(fs: Arc<dyn FileSystem>, canonical: String) -> Self {
        RootedDirectory {
            fs,
            path: canonical.clone(),
            canonical: RootedCanonicalPath::new(canonical),
        }
    }

    /// The path exactly as this descriptor was created with.
    pub fn path_as_string(&self) -> &str {
        &self.path
    }

    /// A descriptor whose `path_as_string` is the canonical form.
    pub fn as_canonical(&self) -> Self {
        RootedDirectory {
            fs: self.fs.clone(),
            path: self.canonical.as_str().to_owned(),
            canonical: self.canonical.clone(),
        }
    }

    /// The drive this directory is anchored at.
    pub fn drive(&self) -> Drive {
        let name = canonical::split_drive(self.canonical.as_str())
            .map(|(drive, _)| drive)
            .unwrap_or_else(|| self.canonical.as_str().to_owned());
        Drive::already_validated(self.fs.clone(), name)
    }

    /// The parent directory, or `None` for a drive root.
    pub fn parent(&self) -> Option<RootedDirectory> {
        parent_of(self.canonical.as_str())
            .map(|parent| RootedDirectory::from_validated(self.fs.clone(), parent))
    }

    /// Concatenates this directory with a relative directory.
    pub fn append(&self, other: &RelativeDirectory) -> Result<RootedDirectory> {
        RootedDirectory::describing(
            self.fs.clone(),
            &canonical::combine(&self.path, other.path_as_string()),
        )
    }

    /// Concatenates this directory with a relative file into a rooted file.
    pub fn append_file(&self, other: &RelativeFile) -> Result<RootedFile> {
        RootedFile::describing(
            self.fs.clone(),
            &canonical::combine(&self.path, other.path_as_string()),
        )
    }

    /// Concatenates this directory with a single file name.
    pub fn append_file_name(&self, name: &FileName) -> Result<RootedFile> {
        self.append_file(&name.as_relative_file())
    }

    /// Tests whether a directory with this path exists. A file with the
    /// same name does not count.
    pub fn exists(&self) -> bool {
        self.fs.is_directory(&self.canonical)
    }

    /// Makes this the current directory of the owning filesystem. The
    /// directory must exist.
    pub fn set_as_current(&self) -> Result<()> {
        self.fs.set_current_directory(&self.canonical)
    }

    /// Creates this directory and all missing intermediate folders.
    pub fn create(&self) -> Result<()> {
        if self.fs.is_file(&self.canonical) {
            return Err(FsError::wrong_type(&self.path, PathKind::Directory));
        }
        self.fs.create_directory(&self.canonical)
    }

    pub fn last_modified(&self) -> Result<SystemTime> {
        self.require_directory()?;
        self.fs.directory_last_modified(&self.canonical)
    }

    pub fn set_last_modified(&self, at: SystemTime) -> Result<()> {
        self.require_directory()?;
        self.fs.set_directory_last_modified(&self.canonical, at)
    }

    pub fn last_accessed(&self) -> Result<SystemTime> {
        self.require_directory()?;
        self.fs.directory_last_accessed(&self.canonical)
    }

    pub fn set_last_accessed(&self, at: SystemTime) -> Result<()> {
        self.require_directory()?;
        self.fs.set_directory_last_accessed(&self.canonical, at)
    }

    /// Immediate child files, as fully rooted descriptors.
    pub fn files(&self) -> Result<Vec<RootedFile>> {
        self.require_directory()?;
        let children = self.fs.files_in_directory(&self.canonical)?;
        Ok(children
            .into_iter()
            .map(|child| RootedFile::from_validated(self.fs.clone(), child.as_str().to_owned()))
            .collect())
    }

    /// Immediate child directories, as fully rooted descriptors.
    pub fn directories(&self) -> Result<Vec<RootedDirectory>> {
        self.require_directory()?;
        let children = self.fs.directories_in_directory(&self.canonical)?;
        Ok(children
            .into_iter()
            .map(|child| {
                RootedDirectory::from_validated(self.fs.clone(), child.as_str().to_owned())
            })
            .collect())
    }

    /// Deletes the directory if it contains no files or folders. Strict:
    /// a missing directory, a file at this path, or remaining content is
    /// an error, and the tree is left as it was.
    pub fn delete_if_empty(&self) -> Result<()> {
        self.require_directory()?;
        self.fs.delete_directory(&self.canonical, false)
    }

    /// Deletes the directory and everything below it. Strict on a missing
    /// target.
    pub fn delete_recursively(&self) -> Result<()> {
        self.require_directory()?;
        self.fs.delete_directory(&self.canonical, true)
    }

    /// Tolerant variant of [`delete_if_empty`](Self::delete_if_empty).
    /// Returns true if the directory no longer exists.
    pub fn try_delete_if_empty(&self) -> bool {
        let _ = self.delete_if_empty();
        !self.exists()
    }

    /// Tolerant variant of [`delete_recursively`](Self::delete_recursively).
    /// Returns true if the directory no longer exists.
    pub fn try_delete_recursively(&self) -> bool {
        let _ = self.delete_recursively();
        !self.exists()
    }

    /// Moves the directory subtree to the destination path. Both
    /// descriptors must belong to the same filesystem instance.
    pub fn move_to(&self, destination: &RootedDirectory) -> Result<()> {
        require_same_filesystem(&self.fs, &destination.fs)?;
        self.fs.move_directory(&self.canonical, &destination.canonical)
    }

    /// Recursively copies the directory subtree to the destination path,
    /// which must not exist.
    pub fn copy_to(&self, destination: &RootedDirectory) -> Result<()> {
        require_same_filesystem(&self.fs, &destination.fs)?;
        self.fs.copy_directory(&self.canonical, &destination.canonical)
    }

    fn require_directory(&self) -> Result<()> {
        if self.fs.is_directory(&self.canonical) {
            return Ok(());
        }
        if self.fs.is_file(&self.canonical) {
            return Err(FsError::wrong_type(&self.path, PathKind::Directory));
        }
        Err(FsError::not_found(&self.path))
    }
}

impl PartialEq for RootedDirectory {
    fn eq(&self, other: &Self) -> bool {
        self.fs.fs_id() == other.fs.fs_id() && self.canonical == other.canonical
    }
}

impl Eq for RootedDirectory {}

impl Hash for RootedDirectory {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.fs.fs_id().hash(state);
        self.canonical.hash(state);
    }
}

impl fmt::Debug for RootedDirectory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RootedDirectory")
            .field("path", &self.path)
            .finish()
    }
}

impl fmt::Display for RootedDirectory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path)
    }
}

/// The full path to a file, rooted at a drive.
#[derive(Clone)]
pub struct RootedFile {
    fs: Arc<dyn FileSystem>,
    path: String,
    canonical: RootedCanonicalPath,
}

impl RootedFile {
    pub(crate) fn describing(fs: Arc<dyn FileSystem>, path: &str) -> Result<Self> {
        let canonical = canonical::rooted_file(path)?;
        Ok(RootedFile {
            fs,
            path: path.to_owned(),
            canonical: RootedCanonicalPath::new(canonical),
        })
    }

    pub(crate) fn from_validated(fs: Arc<dyn FileSystem>, canonical: String) -> Self {
        RootedFile {
            fs,
            path: canonical.clone(),
            canonical: RootedCanonicalPath::new(canonical),
        }
    }

    /// The path exactly as this descriptor was created with.
    pub fn path_as_string(&self) -> &str {
        &self.path
    }

    /// A descriptor whose `path_as_string` is the canonical form.
    pub fn as_canonical(&self) -> Self {
        RootedFile {
            fs: self.fs.clone(),
            path: self.canonical.as_str().to_owned(),
            canonical: self.canonical.clone(),
        }
    }

    /// The leaf name of this file path.
    pub fn file_name(&self) -> FileName {
        let canonical = self.canonical.as_str();
        let leaf = canonical
            .rsplit(canonical::SEPARATOR)
            .next()
            .unwrap_or(canonical);
        FileName::already_validated(leaf)
    }

    /// A descriptor for a file with the same parent but another name.
    pub fn with_file_name(&self, name: &FileName) -> Result<RootedFile> {
        match self.parent() {
            Some(parent) => parent.append_file_name(name),
            None => Err(FsError::invalid_path(&self.path, "no parent directory")),
        }
    }

    /// The directory containing this file.
    pub fn parent(&self) -> Option<RootedDirectory> {
        parent_of(self.canonical.as_str())
            .map(|parent| RootedDirectory::from_validated(self.fs.clone(), parent))
    }

    /// The drive this file is anchored at.
    pub fn drive(&self) -> Drive {
        let name = canonical::split_drive(self.canonical.as_str())
            .map(|(drive, _)| drive)
            .unwrap_or_else(|| self.canonical.as_str().to_owned());
        Drive::already_validated(self.fs.clone(), name)
    }

    /// Tests whether a file with this path exists. A directory with the
    /// same name does not count.
    pub fn exists(&self) -> bool {
        self.fs.is_file(&self.canonical)
    }

    /// The file size in bytes.
    pub fn size(&self) -> Result<u64> {
        self.require_file()?;
        self.fs.file_size(&self.canonical)
    }

    pub fn last_modified(&self) -> Result<SystemTime> {
        self.require_file()?;
        self.fs.file_last_modified(&self.canonical)
    }

    pub fn set_last_modified(&self, at: SystemTime) -> Result<()> {
        self.require_file()?;
        self.fs.set_file_last_modified(&self.canonical, at)
    }

    pub fn last_accessed(&self) -> Result<SystemTime> {
        self.require_file()?;
        self.fs.file_last_accessed(&self.canonical)
    }

    pub fn set_last_accessed(&self, at: SystemTime) -> Result<()> {
        self.require_file()?;
        self.fs.set_file_last_accessed(&self.canonical, at)
    }

    /// Deletes the file. Does nothing if it does not exist; fails if the
    /// path denotes a directory.
    pub fn delete(&self) -> Result<()> {
        if self.fs.is_directory(&self.canonical) {
            return Err(FsError::wrong_type(&self.path, PathKind::File));
        }
        if self.exists() {
            self.fs.delete_file(&self.canonical)?;
        }
        Ok(())
    }

    /// Tolerant delete. Returns true if the file no longer exists.
    pub fn try_delete(&self) -> bool {
        let _ = self.delete();
        !self.exists()
    }

    /// Moves the file to the destination path. Both descriptors must
    /// belong to the same filesystem instance.
    pub fn move_to(&self, destination: &RootedFile) -> Result<()> {
        require_same_filesystem(&self.fs, &destination.fs)?;
        self.fs.move_file(&self.canonical, &destination.canonical)
    }

    /// Copies the file to the destination path, which must not exist.
    pub fn copy_to(&self, destination: &RootedFile) -> Result<()> {
        require_same_filesystem(&self.fs, &destination.fs)?;
        self.fs.copy_file(&self.canonical, &destination.canonical)
    }

    /// Copies the file to the destination path, replacing an existing
    /// destination file.
    pub fn copy_and_overwrite_to(&self, destination: &RootedFile) -> Result<()> {
        require_same_filesystem(&self.fs, &destination.fs)?;
        self.fs
            .copy_and_overwrite_file(&self.canonical, &destination.canonical)
    }

    /// Opens the file for reading.
    pub fn create_read_stream(&self) -> Result<Box<dyn FileStream>> {
        self.fs.create_read_stream(&self.canonical)
    }

    /// Truncates or creates the file and opens it for writing.
    pub fn create_write_stream(&self) -> Result<Box<dyn FileStream>> {
        self.fs.create_write_stream(&self.canonical)
    }

    /// Creates or reuses the file and opens it positioned at the end.
    pub fn create_append_stream(&self) -> Result<Box<dyn FileStream>> {
        self.fs.create_append_stream(&self.canonical)
    }

    /// Creates or reuses the file and opens it for reading and writing
    /// without truncation.
    pub fn create_modify_stream(&self) -> Result<Box<dyn FileStream>> {
        self.fs.create_modify_stream(&self.canonical)
    }

    /// Reads the whole file as UTF-8 text.
    pub fn read_to_string(&self) -> Result<String> {
        let mut stream = self.create_read_stream()?;
        let mut text = String::new();
        stream.read_to_string(&mut text).map_err(stream_failure)?;
        Ok(text)
    }

    /// Replaces the file content with the given text.
    pub fn write_str(&self, text: &str) -> Result<()> {
        let mut stream = self.create_write_stream()?;
        stream.write_all(text.as_bytes()).map_err(stream_failure)?;
        stream.flush().map_err(stream_failure)
    }

    /// Appends the given text to the file, creating it if necessary.
    pub fn append_str(&self, text: &str) -> Result<()> {
        let mut stream = self.create_append_stream()?;
        stream.write_all(text.as_bytes()).map_err(stream_failure)?;
        stream.flush().map_err(stream_failure)
    }

    fn require_file(&self) -> Result<()> {
        if self.fs.is_file(&self.canonical) {
            return Ok(());
        }
        if self.fs.is_directory(&self.canonical) {
            return Err(FsError::wrong_type(&self.path, PathKind::File));
        }
        Err(FsError::not_found(&self.path))
    }
}

impl PartialEq for RootedFile {
    fn eq(&self, other: &Self) -> bool {
        self.fs.fs_id() == other.fs.fs_id() && self.canonical == other.canonical
    }
}

impl Eq for RootedFile {}

impl Hash for RootedFile {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.fs.fs_id().hash(state);
        self.canonical.hash(state);
    }
}

impl fmt::Debug for RootedFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RootedFile")
            .field("path", &self.path)
            .finish()
    }
}

impl fmt::Display for RootedFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path)
    }
}

fn require_same_filesystem(left: &Arc<dyn FileSystem>, right: &Arc<dyn FileSystem>) -> Result<()> {
    if left.fs_id() != right.fs_id() {
        return Err(FsError::invalid_operation(
            "the source and destination belong to different filesystems",
        ));
    }
    Ok(())
}

/// Drops the leaf segment of a canonical rooted path; `None` at the drive
/// root.
fn parent_of(canonical: &str) -> Option<String> {
    let (drive, rest) = canonical::split_drive(canonical)?;
    let rest = rest.trim_start_matches(canonical::SEPARATOR);
    if rest.is_empty() {
        return None;
    }
    match rest.rfind(canonical::SEPARATOR) {
        Some(at) => Some(format!("{drive}{}{}", canonical::SEPARATOR, &rest[..at])),
        None => Some(drive),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vfs::MemoryFs;

    fn fs() -> MemoryFs {
        MemoryFs::new()
    }

    mod construction {
        use super::*;

        #[test]
        fn original_string_is_preserved() {
            let fs = fs();
            let dir = fs.directory_describing(r"c:\my\.\path\..\dir").unwrap();
            assert_eq!(dir.path_as_string(), r"c:\my\.\path\..\dir");
            assert_eq!(dir.as_canonical().path_as_string(), r"c:\my\dir");
        }

        #[test]
        fn as_canonical_is_idempotent() {
            let fs = fs();
            let file = fs.file_describing(r"c:\a\\b\file.txt").unwrap();
            assert_eq!(file.as_canonical(), file.as_canonical().as_canonical());
            assert_eq!(
                file.as_canonical().path_as_string(),
                file.as_canonical().as_canonical().path_as_string()
            );
        }

        #[test]
        fn relative_strings_are_rejected() {
            let fs = fs();
            assert!(matches!(
                fs.file_describing(r"relative\file.txt"),
                Err(FsError::RootedPathExpected { .. })
            ));
            assert!(matches!(
                fs.directory_describing("relative"),
                Err(FsError::RootedPathExpected { .. })
            ));
        }

        #[test]
        fn parent_walks_towards_the_drive() {
            let fs = fs();
            let file = fs.file_describing(r"c:\a\b\f.txt").unwrap();
            let parent = file.parent().unwrap();
            assert_eq!(parent.path_as_string(), r"c:\a\b");
            let drive_root = fs.directory_describing("c:").unwrap();
            assert!(drive_root.parent().is_none());
        }

        #[test]
        fn file_name_and_replacement() {
            let fs = fs();
            let file = fs.file_describing(r"c:\a\report.txt").unwrap();
            assert_eq!(file.file_name().full_name(), "report.txt");
            let renamed = file
                .with_file_name(&FileName::from_string("data.bin").unwrap())
                .unwrap();
            assert_eq!(renamed.as_canonical().path_as_string(), r"c:\a\data.bin");
        }

        #[test]
        fn drive_accessor() {
            let fs = fs();
            let file = fs.file_describing(r"c:\a\f.txt").unwrap();
            assert_eq!(file.drive().name(), "c:");
        }
    }

    mod equality {
        use super::*;

        #[test]
        fn equal_iff_canonical_forms_match_case_insensitively() {
            let fs = fs();
            let plain = fs.directory_describing(r"c:\my\dir").unwrap();
            let redundant = fs.directory_describing(r"c:\my\.\other\..\dir").unwrap();
            let upper = fs.directory_describing(r"C:\MY\DIR").unwrap();
            assert_eq!(plain, redundant);
            assert_eq!(plain, upper);
        }

        #[test]
        fn values_of_different_filesystems_are_never_equal() {
            let one = fs().directory_describing(r"c:\dir").unwrap();
            let two = fs().directory_describing(r"c:\dir").unwrap();
            assert_ne!(one, two);
        }

        #[test]
        fn hashes_agree_when_values_are_equal() {
            use std::collections::hash_map::DefaultHasher;

            let fs = fs();
            let hash = |value: &RootedFile| {
                let mut hasher = DefaultHasher::new();
                value.hash(&mut hasher);
                hasher.finish()
            };
            let lower = fs.file_describing(r"c:\a\f.txt").unwrap();
            let upper = fs.file_describing(r"C:\A\F.TXT").unwrap();
            assert_eq!(lower, upper);
            assert_eq!(hash(&lower), hash(&upper));
        }
    }

    mod appending {
        use super::*;

        #[test]
        fn directory_plus_relative_directory() {
            let fs = fs();
            let base = fs.directory_describing(r"c:\base").unwrap();
            let rel = RelativeDirectory::from_string(r"sub\dir").unwrap();
            let joined = base.append(&rel).unwrap();
            assert_eq!(joined.as_canonical().path_as_string(), r"c:\base\sub\dir");
        }

        #[test]
        fn directory_plus_relative_file() {
            let fs = fs();
            let base = fs.directory_describing(r"c:\base").unwrap();
            let rel = RelativeFile::from_string(r"sub\f.txt").unwrap();
            let joined = base.append_file(&rel).unwrap();
            assert_eq!(joined.as_canonical().path_as_string(), r"c:\base\sub\f.txt");
        }

        #[test]
        fn appending_is_associative() {
            let fs = fs();
            let base = fs.directory_describing(r"c:\base").unwrap();
            let dir = RelativeDirectory::from_string("sub").unwrap();
            let file = RelativeFile::from_string("f.txt").unwrap();

            let left = base.append(&dir).unwrap().append_file(&file).unwrap();
            let right = base.append_file(&dir.append_file(&file).unwrap()).unwrap();
            assert_eq!(left, right);
        }

        #[test]
        fn ascending_above_the_drive_fails() {
            let fs = fs();
            let base = fs.directory_describing(r"c:\base").unwrap();
            let rel = RelativeDirectory::from_string(r"..\..\up").unwrap();
            assert!(matches!(
                base.append(&rel),
                Err(FsError::InvalidPath { .. })
            ));
        }

        #[test]
        fn drive_plus_relative_directory() {
            let fs = fs();
            let drive = fs.drive_describing("c:").unwrap();
            let rel = RelativeDirectory::from_string("dir").unwrap();
            let joined = drive.append(&rel).unwrap();
            assert_eq!(joined.as_canonical().path_as_string(), r"c:\dir");
        }
    }
}
