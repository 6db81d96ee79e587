// Concrete text recognizers behind the `TextRecognizer` port.

#[cfg(feature = "tesseract")]
pub mod tesseract;

use crate::domain::model::{OcrLine, OcrSettings};
use crate::domain::ports::TextRecognizer;
use crate::utils::error::{Result, ScanError};
use async_trait::async_trait;
use image::DynamicImage;

#[cfg(feature = "tesseract")]
pub use tesseract::TesseractRecognizer;

/// Stands in when no OCR engine was compiled in. Text and JSON frames still
/// scan; image frames fail.
#[derive(Debug, Clone, Default)]
pub struct UnavailableRecognizer;

#[async_trait]
impl TextRecognizer for UnavailableRecognizer {
    async fn recognize(&self, _image: &DynamicImage) -> Result<Vec<OcrLine>> {
        Err(ScanError::OcrError {
            message: "no OCR engine available (build with the `tesseract` feature)".to_string(),
        })
    }
}

pub fn default_recognizer(settings: &OcrSettings) -> Box<dyn TextRecognizer> {
    #[cfg(feature = "tesseract")]
    {
        Box::new(TesseractRecognizer::new(settings.clone()))
    }
    #[cfg(not(feature = "tesseract"))]
    {
        let _ = settings;
        Box::new(UnavailableRecognizer)
    }
}
