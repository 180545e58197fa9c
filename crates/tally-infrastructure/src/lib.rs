pub mod config_service;
pub mod engine;
pub mod paths;
pub mod storage;

pub use crate::config_service::ConfigService;
pub use crate::engine::LineEngineFactory;
pub use crate::paths::TallyPaths;
pub use crate::storage::{FileKeyValueStorage, MemoryKeyValueStorage};
