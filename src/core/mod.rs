pub mod engine;
pub mod pipeline;

pub use crate::domain::model::{Frame, ScanReport};
pub use crate::domain::ports::{ConfigProvider, Pipeline, Storage, TextRecognizer};
pub use crate::utils::error::Result;
pub use engine::{ScanEngine, ScanRun};
pub use pipeline::ScanPipeline;
