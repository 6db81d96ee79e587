use crate::domain::model::{OcrLine, OcrSettings};
use crate::domain::ports::TextRecognizer;
use crate::utils::error::{Result, ScanError};
use async_trait::async_trait;
use image::imageops::FilterType;
use image::DynamicImage;
use rusty_tesseract::{Args, Image};
use std::collections::{BTreeMap, HashMap};

const MRZ_WHITELIST: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789<";

/// Runs the system `tesseract` binary over each frame.
#[derive(Debug, Clone)]
pub struct TesseractRecognizer {
    settings: OcrSettings,
}

impl TesseractRecognizer {
    pub fn new(settings: OcrSettings) -> Self {
        Self { settings }
    }

    fn args(&self) -> Args {
        let mut config_variables = HashMap::new();
        config_variables.insert(
            "tessedit_char_whitelist".to_string(),
            MRZ_WHITELIST.to_string(),
        );
        Args {
            lang: self.settings.lang.clone(),
            config_variables,
            dpi: self.settings.dpi,
            psm: Some(self.settings.psm),
            oem: Some(self.settings.oem),
        }
    }
}

/// Upscales small crops so characters end up tall enough for tesseract.
fn upscale(image: &DynamicImage) -> (DynamicImage, f32) {
    let min_dimension = image.width().min(image.height());
    let factor = if min_dimension < 100 {
        4
    } else if min_dimension < 200 {
        2
    } else {
        return (image.clone(), 1.0);
    };
    tracing::debug!(
        "Upscaling {}x{} frame {}x",
        image.width(),
        image.height(),
        factor
    );
    let resized = image.resize(
        image.width() * factor,
        image.height() * factor,
        FilterType::Lanczos3,
    );
    (resized, factor as f32)
}

#[derive(Debug, Default)]
struct LineAccumulator {
    words: Vec<(i32, String)>,
    left: i32,
    top: i32,
    right: i32,
    bottom: i32,
}

impl LineAccumulator {
    fn push(&mut self, word_num: i32, text: String, left: i32, top: i32, width: i32, height: i32) {
        if self.words.is_empty() {
            self.left = left;
            self.top = top;
            self.right = left + width;
            self.bottom = top + height;
        } else {
            self.left = self.left.min(left);
            self.top = self.top.min(top);
            self.right = self.right.max(left + width);
            self.bottom = self.bottom.max(top + height);
        }
        self.words.push((word_num, text));
    }

    fn into_line(mut self, scale: f32) -> OcrLine {
        self.words.sort_by_key(|(word_num, _)| *word_num);
        let text = self
            .words
            .into_iter()
            .map(|(_, text)| text)
            .collect::<Vec<_>>()
            .join(" ");
        OcrLine::with_bounds(
            text,
            self.left as f32 / scale,
            self.top as f32 / scale,
            (self.right - self.left) as f32 / scale,
            (self.bottom - self.top) as f32 / scale,
        )
    }
}

fn recognize_blocking(image: DynamicImage, args: Args) -> Result<Vec<OcrLine>> {
    let (processed, scale) = upscale(&image);
    let tess_image = Image::from_dynamic_image(&processed).map_err(|e| ScanError::OcrError {
        message: format!("Failed to create tesseract image: {}", e),
    })?;

    let output = rusty_tesseract::image_to_data(&tess_image, &args).map_err(|e| {
        ScanError::OcrError {
            message: e.to_string(),
        }
    })?;
    tracing::debug!("Tesseract returned {} data entries", output.data.len());

    // Keyed by (block, paragraph, line) so lines come out in reading order.
    let mut lines: BTreeMap<(i32, i32, i32), LineAccumulator> = BTreeMap::new();
    for word in output
        .data
        .into_iter()
        .filter(|d| !d.text.trim().is_empty() && d.conf > 0.0)
    {
        lines
            .entry((word.block_num, word.par_num, word.line_num))
            .or_default()
            .push(
                word.word_num,
                word.text.trim().to_string(),
                word.left,
                word.top,
                word.width,
                word.height,
            );
    }

    Ok(lines
        .into_values()
        .map(|line| line.into_line(scale))
        .collect())
}

#[async_trait]
impl TextRecognizer for TesseractRecognizer {
    async fn recognize(&self, image: &DynamicImage) -> Result<Vec<OcrLine>> {
        let image = image.clone();
        let args = self.args();
        tokio::task::spawn_blocking(move || recognize_blocking(image, args))
            .await
            .map_err(|e| ScanError::OcrError {
                message: format!("OCR task failed: {}", e),
            })?
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_carry_settings_and_whitelist() {
        let recognizer = TesseractRecognizer::new(OcrSettings {
            dpi: Some(300),
            ..OcrSettings::default()
        });
        let args = recognizer.args();
        assert_eq!(args.lang, "eng");
        assert_eq!(args.dpi, Some(300));
        assert_eq!(args.psm, Some(6));
        assert_eq!(
            args.config_variables.get("tessedit_char_whitelist").map(String::as_str),
            Some(MRZ_WHITELIST)
        );
    }

    #[test]
    fn test_upscale_factors() {
        let tiny = DynamicImage::new_rgb8(80, 300);
        let (scaled, factor) = upscale(&tiny);
        assert_eq!(factor, 4.0);
        assert_eq!(scaled.width(), 320);

        let small = DynamicImage::new_rgb8(640, 150);
        assert_eq!(upscale(&small).1, 2.0);

        let large = DynamicImage::new_rgb8(640, 480);
        assert_eq!(upscale(&large).1, 1.0);
    }

    #[test]
    fn test_line_accumulator_maps_back_to_original_scale() {
        let mut line = LineAccumulator::default();
        line.push(2, "ANNA".to_string(), 200, 44, 80, 20);
        line.push(1, "P<UTOERIKSSON<<".to_string(), 20, 40, 160, 24);

        let ocr_line = line.into_line(2.0);
        assert_eq!(ocr_line.text, "P<UTOERIKSSON<< ANNA");
        let bounds = ocr_line.bounds.unwrap();
        assert_eq!(bounds.left, 10.0);
        assert_eq!(bounds.top, 20.0);
        assert_eq!(bounds.width, 130.0);
        assert_eq!(bounds.height, 12.0);
    }
}
