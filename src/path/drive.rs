use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::core::{FileSystem, Result};
use crate::path::canonical;
use crate::path::relative::{RelativeDirectory, RelativeFile};
use crate::path::rooted::{RootedDirectory, RootedFile};

/// A storage root: a letter drive (`c:`) or a UNC network share
/// (`\\host\share`). Never carries a trailing separator.
///
/// A drive belongs to the filesystem instance that created it; drives of
/// different instances are never equal.
#[derive(Clone)]
pub struct Drive {
    fs: Arc<dyn FileSystem>,
    name: String,
}

impl Drive {
    pub(crate) fn new(fs: Arc<dyn FileSystem>, name: &str) -> Result<Self> {
        let name = canonical::drive(name)?;
        Ok(Drive { fs, name })
    }

    pub(crate) fn already_validated(fs: Arc<dyn FileSystem>, name: String) -> Self {
        Drive { fs, name }
    }

    /// The drive name, e.g. `c:` or `\\host\share`.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// True if the drive has a node in its filesystem.
    pub fn exists(&self) -> bool {
        self.fs
            .drives()
            .map(|drives| {
                drives
                    .iter()
                    .any(|drive| drive.eq_ignore_ascii_case(&self.name))
            })
            .unwrap_or(false)
    }

    /// The drive root as a directory descriptor.
    pub fn as_directory(&self) -> RootedDirectory {
        RootedDirectory::from_validated(self.fs.clone(), self.name.clone())
    }

    /// Concatenates the drive with a relative directory into a rooted one.
    pub fn append(&self, other: &RelativeDirectory) -> Result<RootedDirectory> {
        RootedDirectory::describing(
            self.fs.clone(),
            &canonical::combine(&self.name, other.path_as_string()),
        )
    }

    /// Concatenates the drive with a relative file into a rooted one.
    pub fn append_file(&self, other: &RelativeFile) -> Result<RootedFile> {
        RootedFile::describing(
            self.fs.clone(),
            &canonical::combine(&self.name, other.path_as_string()),
        )
    }
}

impl PartialEq for Drive {
    fn eq(&self, other: &Self) -> bool {
        self.fs.fs_id() == other.fs.fs_id() && self.name.eq_ignore_ascii_case(&other.name)
    }
}

impl Eq for Drive {}

impl Hash for Drive {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.fs.fs_id().hash(state);
        self.name.to_ascii_lowercase().hash(state);
    }
}

impl fmt::Debug for Drive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Drive").field("name", &self.name).finish()
    }
}

impl fmt::Display for Drive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
