//! Storage layer: atomic files and the key-value backends built on them.

mod atomic_file;
mod file_storage;
mod memory_storage;

pub use atomic_file::AtomicFile;
pub use file_storage::FileKeyValueStorage;
pub use memory_storage::MemoryKeyValueStorage;
