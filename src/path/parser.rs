//! Decomposition of canonical rooted paths into drive and folder segments.

use crate::path::canonical;

/// Splits a canonical rooted path into its segments, drive first. A UNC
/// drive (`\\host\share`) counts as a single segment.
///
/// The input must already be canonical; the parser performs no validation
/// and no separator folding.
#[derive(Debug, Clone)]
pub struct PathParser {
    parts: Vec<String>,
}

impl PathParser {
    pub fn new(canonical: &str) -> Self {
        let mut parts = Vec::new();
        match canonical::split_drive(canonical) {
            Some((drive, rest)) => {
                parts.push(drive);
                parts.extend(
                    rest.split(canonical::SEPARATOR)
                        .filter(|segment| !segment.is_empty())
                        .map(str::to_owned),
                );
            }
            None => parts.push(canonical.to_owned()),
        }
        PathParser { parts }
    }

    /// Every segment, starting with the drive.
    pub fn segments(&self) -> &[String] {
        &self.parts
    }

    /// The drive segment.
    pub fn drive_name(&self) -> &str {
        &self.parts[0]
    }

    /// Every segment except the leaf. For a bare drive this is empty.
    pub fn intermediate_segments(&self) -> &[String] {
        &self.parts[..self.parts.len() - 1]
    }

    /// The final segment. For a bare drive this is the drive itself.
    pub fn leaf_name(&self) -> &str {
        &self.parts[self.parts.len() - 1]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn letter_drive_path() {
        let parser = PathParser::new(r"c:\path\to\file.txt");
        assert_eq!(parser.segments(), ["c:", "path", "to", "file.txt"]);
        assert_eq!(parser.drive_name(), "c:");
        assert_eq!(parser.intermediate_segments(), ["c:", "path", "to"]);
        assert_eq!(parser.leaf_name(), "file.txt");
    }

    #[test]
    fn unc_drive_is_one_segment() {
        let parser = PathParser::new(r"\\host\share\dir\leaf");
        assert_eq!(parser.segments(), [r"\\host\share", "dir", "leaf"]);
        assert_eq!(parser.drive_name(), r"\\host\share");
        assert_eq!(parser.leaf_name(), "leaf");
    }

    #[test]
    fn bare_drive() {
        let parser = PathParser::new("c:");
        assert_eq!(parser.segments(), ["c:"]);
        assert_eq!(parser.drive_name(), "c:");
        assert_eq!(parser.leaf_name(), "c:");
        assert!(parser.intermediate_segments().is_empty());
    }

    #[test]
    fn bare_unc_drive() {
        let parser = PathParser::new(r"\\host\share");
        assert_eq!(parser.segments(), [r"\\host\share"]);
        assert_eq!(parser.leaf_name(), r"\\host\share");
    }
}
