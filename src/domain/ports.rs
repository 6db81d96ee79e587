use crate::domain::model::{Frame, OcrLine, OcrSettings, ScanReport, ScanSettings};
use crate::utils::error::Result;
use async_trait::async_trait;
use image::DynamicImage;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn inputs(&self) -> &[String];
    fn output_path(&self) -> &str;
    fn output_formats(&self) -> &[String];
    /// ZIP file name when outputs are bundled.
    fn archive_name(&self) -> Option<&str>;
    fn scan_settings(&self) -> ScanSettings;
    fn ocr_settings(&self) -> OcrSettings;
}

/// Anything that can turn a picture into lines of text with positions.
#[async_trait]
pub trait TextRecognizer: Send + Sync {
    async fn recognize(&self, image: &DynamicImage) -> Result<Vec<OcrLine>>;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<Vec<Frame>>;
    async fn transform(&self, frames: Vec<Frame>) -> Result<ScanReport>;
    async fn load(&self, report: &ScanReport) -> Result<String>;
}
