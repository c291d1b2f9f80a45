use std::fmt;
use std::hash::{Hash, Hasher};

use crate::core::Result;
use crate::path::canonical;
use crate::path::file_name::FileName;

/// A directory path with no drive anchor, resolved against a base directory
/// by the caller. May begin with one or more `..` segments.
#[derive(Debug, Clone)]
pub struct RelativeDirectory {
    path: String,
    canonical: String,
}

impl RelativeDirectory {
    /// Creates a descriptor for the given relative path. The string is kept
    /// as given; redundant `.`/`..`/separators are only removed by
    /// [`as_canonical`](Self::as_canonical).
    pub fn from_string(path: &str) -> Result<Self> {
        let canonical = canonical::relative_directory(path)?;
        Ok(RelativeDirectory {
            path: path.to_owned(),
            canonical,
        })
    }

    /// The path exactly as this descriptor was created with.
    pub fn path_as_string(&self) -> &str {
        &self.path
    }

    /// A descriptor whose `path_as_string` is the canonical form.
    pub fn as_canonical(&self) -> Self {
        RelativeDirectory {
            path: self.canonical.clone(),
            canonical: self.canonical.clone(),
        }
    }

    /// Concatenates two relative directories into a new one.
    pub fn append(&self, other: &RelativeDirectory) -> Result<RelativeDirectory> {
        RelativeDirectory::from_string(&canonical::combine(&self.path, &other.path))
    }

    /// Concatenates this directory with a relative file into a new relative
    /// file.
    pub fn append_file(&self, other: &RelativeFile) -> Result<RelativeFile> {
        RelativeFile::from_string(&canonical::combine(&self.path, other.path_as_string()))
    }
}

impl PartialEq for RelativeDirectory {
    fn eq(&self, other: &Self) -> bool {
        self.canonical.eq_ignore_ascii_case(&other.canonical)
    }
}

impl Eq for RelativeDirectory {}

impl Hash for RelativeDirectory {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.canonical.to_ascii_lowercase().hash(state);
    }
}

impl fmt::Display for RelativeDirectory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path)
    }
}

/// A file path with no drive anchor.
#[derive(Debug, Clone)]
pub struct RelativeFile {
    path: String,
    canonical: String,
}

impl RelativeFile {
    /// Creates a descriptor for the given relative file path.
    pub fn from_string(path: &str) -> Result<Self> {
        let canonical = canonical::relative_file(path)?;
        Ok(RelativeFile {
            path: path.to_owned(),
            canonical,
        })
    }

    /// Builds a one-segment file path from an already validated name.
    pub(crate) fn single_segment(name: &str) -> Self {
        RelativeFile {
            path: name.to_owned(),
            canonical: name.to_owned(),
        }
    }

    /// The path exactly as this descriptor was created with.
    pub fn path_as_string(&self) -> &str {
        &self.path
    }

    /// A descriptor whose `path_as_string` is the canonical form.
    pub fn as_canonical(&self) -> Self {
        RelativeFile {
            path: self.canonical.clone(),
            canonical: self.canonical.clone(),
        }
    }

    /// The leaf name of this file path.
    pub fn file_name(&self) -> FileName {
        let leaf = self
            .canonical
            .rsplit(canonical::SEPARATOR)
            .next()
            .unwrap_or(&self.canonical);
        FileName::already_validated(leaf)
    }
}

impl PartialEq for RelativeFile {
    fn eq(&self, other: &Self) -> bool {
        self.canonical.eq_ignore_ascii_case(&other.canonical)
    }
}

impl Eq for RelativeFile {}

impl Hash for RelativeFile {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.canonical.to_ascii_lowercase().hash(state);
    }
}

impl fmt::Display for RelativeFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path)
    }
}
