//! Typed path values and an in-memory virtual filesystem for Rust.
//! Paths are validated and canonicalized at construction, so a
//! `RootedFile` or `RootedDirectory` in your hands is always well formed.
//! Ideal for testing filesystem-heavy code without touching the disk.
//!
//! ### Overview
//!
//! `memfs-kit` splits filesystem work into two layers. The path layer is a
//! family of immutable value types (`Drive`, `RootedDirectory`, `RootedFile`,
//! `RelativeDirectory`, `RelativeFile`, `FileName`) with a Windows-style
//! grammar: `\` separators (`/` accepted on input), letter drives like `c:`
//! and UNC drives like `\\host\share`, case-insensitive comparison over the
//! canonical form. The engine layer is the `FileSystem` trait plus
//! `MemoryFs`, an in-memory implementation that keeps a whole directory
//! tree in process.
//!
//! **Key ideas**:
//! - **Validate once**: Malformed paths are rejected when a value is built,
//!   never later inside an operation.
//! - **Preserve the original**: A value remembers the exact string it was
//!   created from; `as_canonical()` gives the normalized spelling.
//! - **One engine per value**: Rooted values stay bound to the filesystem
//!   instance that created them, and operations across instances are
//!   rejected.
//! - **Testability**: `MemoryFs::new()` is a complete drive with the usual
//!   special folders, ready for tests with no setup and no side effects.
//!
//! ### Example
//!
//! ```no_run
//! use memfs_kit::MemoryFs;
//!
//! fn main() -> memfs_kit::Result<()> {
//!     let fs = MemoryFs::new();
//!     let dir = fs.directory_describing(r"c:\projects\demo")?;
//!     dir.create()?;
//!     let file = fs.file_describing(r"c:\projects\demo\readme.txt")?;
//!     file.write_str("hello")?;
//!     assert_eq!(file.read_to_string()?, "hello");
//!     Ok(())
//! }
//! ```

mod core;
mod error;
mod path;
mod vfs;

pub use crate::core::{FileStream, FileSystem, FsId, Result, SpecialFolder};
pub use crate::error::{FsError, PathKind};
pub use crate::path::{
    Drive, FileName, PathParser, RelativeDirectory, RelativeFile, RootedCanonicalPath,
    RootedDirectory, RootedFile, canonical,
};
pub use crate::vfs::MemoryFs;
