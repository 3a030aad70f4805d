//! Configuration file loading

pub mod file_config;
pub mod loader;

pub use file_config::{FileConfig, FileLogConfig, FileModelConfig, FileOutputConfig, FileReplConfig};
pub use loader::ConfigLoader;
