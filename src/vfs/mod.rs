mod mem_fs;
mod node;
mod stream;

pub use mem_fs::MemoryFs;
