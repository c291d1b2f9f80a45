//! Path canonicalization: raw strings in, validated canonical strings out.
//!
//! The grammar is the Windows-style one the virtual filesystem models:
//! `\` separates segments (`/` is accepted on input and folded), a rooted
//! path starts with a letter drive (`c:`) or a UNC share (`\\host\share`).
//! Canonical form has no `.` segments, no resolvable `..` segments, single
//! separators and no trailing separator; a bare drive (`c:`) is the only
//! spelling of a drive root.

use crate::core::Result;
use crate::error::FsError;

/// The canonical segment separator.
pub const SEPARATOR: char = '\\';

const ALT_SEPARATOR: char = '/';

/// Longest allowed canonical path, in characters.
const MAX_CANONICAL_LENGTH: usize = 259;

const INVALID_SEGMENT_CHARS: &[char] = &['<', '>', '"', '|', '*', '?', ':'];

fn is_separator(c: char) -> bool {
    c == SEPARATOR || c == ALT_SEPARATOR
}

/// True if the string starts with a drive token (letter drive or UNC share).
pub fn is_rooted(path: &str) -> bool {
    matches!(parse_drive(path), Ok(Some(_)))
}

/// Validates a drive name: `x:` or `\\host\share`, no trailing separator.
pub fn drive(name: &str) -> Result<String> {
    match parse_drive(name)? {
        Some((drive, rest)) if rest.is_empty() => Ok(drive),
        Some(_) => Err(FsError::invalid_path(
            name,
            "a drive name may not contain segments",
        )),
        None => Err(FsError::invalid_path(name, "not a valid drive name")),
    }
}

/// Builds the canonical form of a rooted directory path. A trailing
/// separator is accepted on input and never present on output.
pub fn rooted_directory(path: &str) -> Result<String> {
    let (drive, rest) = require_drive(path)?;
    let segments = resolve(rest, true, path)?;
    assemble(Some(&drive), &segments, path)
}

/// Builds the canonical form of a rooted file path. The path must end in a
/// leaf name; a trailing separator is an error.
pub fn rooted_file(path: &str) -> Result<String> {
    if ends_with_separator(path) {
        return Err(FsError::invalid_path(
            path,
            "a file path may not end with a separator",
        ));
    }
    let (drive, rest) = require_drive(path)?;
    let segments = resolve(rest, true, path)?;
    require_leaf(&segments, path)?;
    assemble(Some(&drive), &segments, path)
}

/// Builds the canonical form of a relative directory path. Leading `..`
/// segments are preserved; a path that resolves to no segments at all
/// canonicalizes to the empty string (the "here" directory).
pub fn relative_directory(path: &str) -> Result<String> {
    let rest = require_relative(path)?;
    let segments = resolve(rest, false, path)?;
    assemble(None, &segments, path)
}

/// Builds the canonical form of a relative file path.
pub fn relative_file(path: &str) -> Result<String> {
    if ends_with_separator(path) {
        return Err(FsError::invalid_path(
            path,
            "a file path may not end with a separator",
        ));
    }
    let rest = require_relative(path)?;
    let segments = resolve(rest, false, path)?;
    require_leaf(&segments, path)?;
    assemble(None, &segments, path)
}

/// Validates a single leaf file name: one segment, no separators, not a
/// dot navigation token.
pub fn file_name(name: &str) -> Result<String> {
    if name.chars().any(is_separator) {
        return Err(FsError::invalid_path(
            name,
            "a file name may not contain separators",
        ));
    }
    if name == "." || name == ".." {
        return Err(FsError::invalid_path(name, "not a file name"));
    }
    validate_segment(name, name)?;
    Ok(name.to_owned())
}

/// Joins two raw path strings with a single separator. The result is not
/// canonicalized; the value-type factories do that on construction.
pub fn combine(left: &str, right: &str) -> String {
    if left.is_empty() {
        return right.to_owned();
    }
    if right.is_empty() {
        return left.to_owned();
    }
    let trimmed = left.trim_end_matches(is_separator);
    format!("{trimmed}{SEPARATOR}{right}")
}

/// Splits a canonical rooted path into its drive token and the remainder.
/// Returns `None` for strings without a drive token.
pub(crate) fn split_drive(path: &str) -> Option<(String, &str)> {
    parse_drive(path).ok().flatten()
}

fn parse_drive(path: &str) -> Result<Option<(String, &str)>> {
    let bytes = path.as_bytes();
    if bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':' {
        return Ok(Some((path[..2].to_owned(), &path[2..])));
    }
    let mut chars = path.chars();
    if path.len() >= 2 && is_separator(bytes[0] as char) {
        chars.next();
        match chars.next() {
            Some(c) if is_separator(c) => {
                // UNC share: \\host\share
                let rest = &path[2..];
                let mut parts = rest.splitn(3, is_separator);
                let host = parts.next().unwrap_or("");
                let share = parts.next().unwrap_or("");
                if host.is_empty() || share.is_empty() {
                    return Err(FsError::invalid_path(path, "malformed network share"));
                }
                validate_segment(host, path)?;
                validate_segment(share, path)?;
                let remainder = parts.next().map_or("", |tail| tail);
                // Hand the remainder back with one leading separator so the
                // segment splitter treats it like a letter-drive remainder.
                let offset = path.len() - remainder.len();
                let lead = if remainder.is_empty() { path.len() } else { offset - 1 };
                return Ok(Some((
                    format!("{SEPARATOR}{SEPARATOR}{host}{SEPARATOR}{share}"),
                    &path[lead..],
                )));
            }
            _ => {
                return Err(FsError::invalid_path(
                    path,
                    "a path may not start with a single separator",
                ));
            }
        }
    }
    if !path.is_empty() && is_separator(bytes[0] as char) {
        return Err(FsError::invalid_path(
            path,
            "a path may not start with a single separator",
        ));
    }
    Ok(None)
}

fn require_drive(path: &str) -> Result<(String, &str)> {
    require_not_blank(path)?;
    match parse_drive(path)? {
        Some(split) => Ok(split),
        None => Err(FsError::RootedPathExpected {
            path: path.to_owned(),
        }),
    }
}

fn require_relative(path: &str) -> Result<&str> {
    require_not_blank(path)?;
    match parse_drive(path)? {
        Some(_) => Err(FsError::RelativePathExpected {
            path: path.to_owned(),
        }),
        None => Ok(path),
    }
}

fn require_not_blank(path: &str) -> Result<()> {
    if path.trim().is_empty() {
        return Err(FsError::invalid_path(path, "empty or whitespace-only"));
    }
    Ok(())
}

fn require_leaf(segments: &[String], path: &str) -> Result<()> {
    match segments.last() {
        Some(leaf) if leaf != ".." => Ok(()),
        _ => Err(FsError::invalid_path(path, "no file name in the path")),
    }
}

fn ends_with_separator(path: &str) -> bool {
    path.chars().next_back().is_some_and(is_separator)
}

/// Resolves `.` and `..` over the raw segments. For a rooted path a `..`
/// with nothing left to pop is an error; for a relative path it accumulates
/// at the front.
fn resolve(rest: &str, rooted: bool, original: &str) -> Result<Vec<String>> {
    let mut resolved: Vec<String> = Vec::new();
    for segment in rest.split(is_separator) {
        match segment {
            "" | "." => {}
            ".." => {
                if resolved.last().is_some_and(|last| last != "..") {
                    resolved.pop();
                } else if rooted {
                    return Err(FsError::invalid_path(
                        original,
                        "the path ascends above the drive root",
                    ));
                } else {
                    resolved.push("..".to_owned());
                }
            }
            name => {
                validate_segment(name, original)?;
                resolved.push(name.to_owned());
            }
        }
    }
    Ok(resolved)
}

fn validate_segment(segment: &str, original: &str) -> Result<()> {
    if segment.is_empty() {
        return Err(FsError::invalid_path(original, "empty segment"));
    }
    if let Some(bad) = segment
        .chars()
        .find(|c| INVALID_SEGMENT_CHARS.contains(c) || c.is_control())
    {
        return Err(FsError::invalid_path(
            original,
            format!("invalid character '{}'", bad.escape_default()),
        ));
    }
    if segment.starts_with(char::is_whitespace) || segment.ends_with(char::is_whitespace) {
        return Err(FsError::invalid_path(
            original,
            "a segment may not start or end with whitespace",
        ));
    }
    if segment.ends_with('.') {
        return Err(FsError::invalid_path(
            original,
            "a segment may not end with a period",
        ));
    }
    Ok(())
}

fn assemble(drive: Option<&str>, segments: &[String], original: &str) -> Result<String> {
    let mut canonical = drive.map_or_else(String::new, str::to_owned);
    for (index, segment) in segments.iter().enumerate() {
        if drive.is_some() || index > 0 {
            canonical.push(SEPARATOR);
        }
        canonical.push_str(segment);
    }
    if canonical.chars().count() > MAX_CANONICAL_LENGTH {
        return Err(FsError::invalid_path(original, "the path is too long"));
    }
    Ok(canonical)
}

#[cfg(test)]
mod tests {
    use super::*;

    mod drives {
        use super::*;

        #[test]
        fn letter_drive() {
            assert_eq!(drive("c:").unwrap(), "c:");
            assert_eq!(drive("Z:").unwrap(), "Z:");
        }

        #[test]
        fn network_share() {
            assert_eq!(drive(r"\\host\share").unwrap(), r"\\host\share");
            assert_eq!(drive("//host/share").unwrap(), r"\\host\share");
        }

        #[test]
        fn malformed_drives_are_rejected() {
            assert!(drive("c").is_err());
            assert!(drive("1:").is_err());
            assert!(drive(r"\\host").is_err());
            assert!(drive(r"\\\share").is_err());
            assert!(drive(r"c:\path").is_err());
            assert!(drive("").is_err());
        }
    }

    mod rooted {
        use super::*;

        #[test]
        fn plain_path_is_unchanged() {
            assert_eq!(rooted_directory(r"c:\path\to").unwrap(), r"c:\path\to");
            assert_eq!(rooted_file(r"c:\path\to\file.txt").unwrap(), r"c:\path\to\file.txt");
        }

        #[test]
        fn forward_slashes_are_folded() {
            assert_eq!(rooted_directory("c:/path/to").unwrap(), r"c:\path\to");
        }

        #[test]
        fn dot_segments_are_dropped() {
            assert_eq!(rooted_directory(r"c:\a\.\b").unwrap(), r"c:\a\b");
        }

        #[test]
        fn dot_dot_pops_the_previous_segment() {
            assert_eq!(rooted_directory(r"c:\a\.\b\..\c").unwrap(), r"c:\a\c");
            assert_eq!(
                rooted_directory(r"c:\a\.\b\..\c").unwrap(),
                rooted_directory(r"c:\a\c").unwrap()
            );
        }

        #[test]
        fn repeated_separators_collapse() {
            assert_eq!(rooted_directory(r"c:\a\\\b").unwrap(), r"c:\a\b");
        }

        #[test]
        fn trailing_separator_is_stripped_for_directories() {
            assert_eq!(rooted_directory(r"c:\a\b\").unwrap(), r"c:\a\b");
        }

        #[test]
        fn bare_drive_has_no_trailing_separator() {
            assert_eq!(rooted_directory("c:").unwrap(), "c:");
            assert_eq!(rooted_directory(r"c:\").unwrap(), "c:");
        }

        #[test]
        fn ascending_above_the_root_fails() {
            assert!(matches!(
                rooted_directory(r"c:\a\..\.."),
                Err(FsError::InvalidPath { .. })
            ));
        }

        #[test]
        fn unc_rooted_paths() {
            assert_eq!(
                rooted_directory(r"\\host\share\a\b").unwrap(),
                r"\\host\share\a\b"
            );
            assert_eq!(rooted_directory(r"\\host\share").unwrap(), r"\\host\share");
        }

        #[test]
        fn relative_input_is_a_rootedness_mismatch() {
            assert!(matches!(
                rooted_directory(r"path\to"),
                Err(FsError::RootedPathExpected { .. })
            ));
        }

        #[test]
        fn file_requires_a_leaf() {
            assert!(rooted_file("c:").is_err());
            assert!(rooted_file(r"c:\path\").is_err());
        }

        #[test]
        fn invalid_characters_are_rejected() {
            for bad in [r"c:\pa|th", r"c:\pa<th", r"c:\pa*th", "c:\\pa\tth"] {
                assert!(
                    matches!(rooted_directory(bad), Err(FsError::InvalidPath { .. })),
                    "{bad:?} should be invalid"
                );
            }
        }

        #[test]
        fn overlong_path_is_rejected() {
            let long = format!(r"c:\{}", "a".repeat(300));
            assert!(matches!(
                rooted_directory(&long),
                Err(FsError::InvalidPath { .. })
            ));
        }
    }

    mod relative {
        use super::*;

        #[test]
        fn plain_relative_path() {
            assert_eq!(relative_directory(r"path\to").unwrap(), r"path\to");
            assert_eq!(relative_file(r"path\to\file.txt").unwrap(), r"path\to\file.txt");
        }

        #[test]
        fn leading_dot_dot_is_preserved() {
            assert_eq!(relative_directory(r"..\x").unwrap(), r"..\x");
            assert_eq!(relative_directory(r"..\..\x").unwrap(), r"..\..\x");
        }

        #[test]
        fn interior_dot_dot_resolves() {
            assert_eq!(relative_directory(r"a\..\b").unwrap(), "b");
            assert_eq!(relative_directory(r"a\b\..\..\..\c").unwrap(), r"..\c");
        }

        #[test]
        fn fully_resolved_directory_is_empty() {
            assert_eq!(relative_directory(".").unwrap(), "");
            assert_eq!(relative_directory(r"a\..").unwrap(), "");
        }

        #[test]
        fn a_file_cannot_resolve_to_nothing() {
            assert!(relative_file(r"a\..").is_err());
            assert!(relative_file("..").is_err());
        }

        #[test]
        fn rooted_input_is_a_rootedness_mismatch() {
            assert!(matches!(
                relative_directory(r"c:\path"),
                Err(FsError::RelativePathExpected { .. })
            ));
        }

        #[test]
        fn empty_and_blank_inputs_fail() {
            assert!(relative_directory("").is_err());
            assert!(relative_directory("   ").is_err());
        }

        #[test]
        fn single_leading_separator_is_invalid() {
            assert!(relative_directory(r"\path").is_err());
        }
    }

    mod file_names {
        use super::*;

        #[test]
        fn accepts_ordinary_names() {
            assert_eq!(file_name("file.txt").unwrap(), "file.txt");
            assert_eq!(file_name("no extension").unwrap(), "no extension");
        }

        #[test]
        fn rejects_separators_and_navigation() {
            assert!(file_name(r"a\b").is_err());
            assert!(file_name("a/b").is_err());
            assert!(file_name(".").is_err());
            assert!(file_name("..").is_err());
        }

        #[test]
        fn rejects_trailing_period_and_blanks() {
            assert!(file_name("name.").is_err());
            assert!(file_name(" name").is_err());
            assert!(file_name("name ").is_err());
        }
    }

    mod combining {
        use super::*;

        #[test]
        fn joins_with_a_single_separator() {
            assert_eq!(combine(r"c:\a", "b"), r"c:\a\b");
            assert_eq!(combine(r"c:\a\", "b"), r"c:\a\b");
        }

        #[test]
        fn empty_sides_pass_through() {
            assert_eq!(combine("", "b"), "b");
            assert_eq!(combine(r"c:\a", ""), r"c:\a");
        }
    }

    mod idempotence {
        use super::*;
        use proptest::prelude::*;

        #[test]
        fn canonical_form_is_a_fixed_point() {
            for path in [r"c:\a\.\b\..\c", r"c:\", r"\\host\share\x\\y", "c:/mixed\\seps"] {
                let once = rooted_directory(path).unwrap();
                assert_eq!(rooted_directory(&once).unwrap(), once);
            }
        }

        proptest! {
            #[test]
            fn rooted_directories(segments in prop::collection::vec("[a-zA-Z][a-zA-Z0-9 _-]{0,8}[a-zA-Z0-9]", 0..6)) {
                let path = format!("c:{}", segments.iter().map(|s| format!(r"\{s}")).collect::<String>());
                let once = rooted_directory(&path).unwrap();
                prop_assert_eq!(rooted_directory(&once).unwrap(), once);
            }

            #[test]
            fn relative_directories(segments in prop::collection::vec("[a-zA-Z][a-zA-Z0-9]{0,8}", 1..6)) {
                let path = segments.join("\\");
                let once = relative_directory(&path).unwrap();
                prop_assert_eq!(relative_directory(&once).unwrap(), once);
            }
        }
    }
}
