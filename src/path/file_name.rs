use std::fmt;
use std::hash::{Hash, Hasher};

use crate::core::Result;
use crate::path::canonical;
use crate::path::relative::RelativeFile;

/// A single leaf file name, decomposed into a name and an extension.
///
/// The extension is the substring from the last `.` onwards, including the
/// `.` itself, or empty when the name contains no period.
#[derive(Debug, Clone)]
pub struct FileName {
    full_name: String,
}

impl FileName {
    /// Creates a file name from the full string, e.g. `"report.txt"`.
    pub fn from_string(full_name: &str) -> Result<Self> {
        canonical::file_name(full_name)?;
        Ok(FileName {
            full_name: full_name.to_owned(),
        })
    }

    /// Creates a file name from its parts; `extension` includes the period.
    pub fn from_name_and_extension(name: &str, extension: &str) -> Result<Self> {
        Self::from_string(&format!("{name}{extension}"))
    }

    /// The whole file name, extension included.
    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    /// The name part, excluding the extension.
    pub fn name(&self) -> &str {
        match self.full_name.rfind('.') {
            Some(at) => &self.full_name[..at],
            None => &self.full_name,
        }
    }

    /// The extension including the period, or `""` when there is none.
    pub fn extension(&self) -> &str {
        match self.full_name.rfind('.') {
            Some(at) => &self.full_name[at..],
            None => "",
        }
    }

    /// This name as a single-segment relative file path.
    pub fn as_relative_file(&self) -> RelativeFile {
        RelativeFile::single_segment(&self.full_name)
    }

    /// Wraps a leaf that already passed segment validation.
    pub(crate) fn already_validated(full_name: &str) -> Self {
        FileName {
            full_name: full_name.to_owned(),
        }
    }
}

impl PartialEq for FileName {
    fn eq(&self, other: &Self) -> bool {
        self.full_name.eq_ignore_ascii_case(&other.full_name)
    }
}

impl Eq for FileName {}

impl Hash for FileName {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.full_name.to_ascii_lowercase().hash(state);
    }
}

impl fmt::Display for FileName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_and_extension_split_at_the_last_period() {
        let name = FileName::from_string("archive.tar.gz").unwrap();
        assert_eq!(name.name(), "archive.tar");
        assert_eq!(name.extension(), ".gz");
    }

    #[test]
    fn no_period_means_no_extension() {
        let name = FileName::from_string("README").unwrap();
        assert_eq!(name.name(), "README");
        assert_eq!(name.extension(), "");
    }

    #[test]
    fn leading_period_is_all_extension() {
        let name = FileName::from_string(".gitignore").unwrap();
        assert_eq!(name.name(), "");
        assert_eq!(name.extension(), ".gitignore");
    }

    #[test]
    fn from_parts_round_trips() {
        let name = FileName::from_name_and_extension("report", ".txt").unwrap();
        assert_eq!(name.full_name(), "report.txt");
    }

    #[test]
    fn comparison_ignores_case() {
        let lower = FileName::from_string("file.txt").unwrap();
        let upper = FileName::from_string("FILE.TXT").unwrap();
        assert_eq!(lower, upper);
    }

    #[test]
    fn separators_are_rejected() {
        assert!(FileName::from_string(r"dir\file.txt").is_err());
    }
}
