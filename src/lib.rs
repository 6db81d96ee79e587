pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::{cli::LocalStorage, toml_config::TomlConfig};

pub use adapters::{default_recognizer, UnavailableRecognizer};
pub use core::{ScanEngine, ScanPipeline, ScanRun};
pub use domain::model::{MrzFormat, ParsedMrz, ScanReport};
pub use utils::error::{MrzError, Result, ScanError};
