//! Typed path values and the canonicalization rules they share.

pub mod canonical;

mod drive;
mod file_name;
mod parser;
mod relative;
mod rooted;

pub use drive::Drive;
pub use file_name::FileName;
pub use parser::PathParser;
pub use relative::{RelativeDirectory, RelativeFile};
pub use rooted::{RootedCanonicalPath, RootedDirectory, RootedFile};
