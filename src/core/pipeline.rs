use crate::domain::model::{
    ConfirmedDocument, Frame, FrameContent, FrameOutcome, FrameRecord, OcrLine, OcrSettings,
    ScanReport,
};
use crate::domain::ports::{ConfigProvider, Pipeline, Storage, TextRecognizer};
use crate::domain::services::region::map_guide_to_image;
use crate::domain::services::session::SessionEvent;
use crate::domain::services::ScanSession;
use crate::utils::error::{Result, ScanError};
use chrono::{NaiveDate, Utc};
use image::DynamicImage;
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};
use zip::write::{FileOptions, ZipWriter};

pub const REPORT_FILE: &str = "scan_report.json";
pub const DOCUMENTS_FILE: &str = "documents.csv";

/// Vertical spacing given to lines that come without positions.
const SYNTHETIC_LINE_SPACING: f32 = 20.0;
const SYNTHETIC_LINE_HEIGHT: f32 = 16.0;
const SYNTHETIC_CHAR_WIDTH: f32 = 10.0;

const IMAGE_EXTENSIONS: [&str; 7] = ["png", "jpg", "jpeg", "bmp", "tif", "tiff", "webp"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InputKind {
    Json,
    Text,
    Image,
}

fn input_kind(path: &Path) -> Option<InputKind> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "json" => Some(InputKind::Json),
        "txt" => Some(InputKind::Text),
        e if IMAGE_EXTENSIONS.contains(&e) => Some(InputKind::Image),
        _ => None,
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum FrameFile {
    Many(Vec<JsonFrame>),
    One(JsonFrame),
}

#[derive(Debug, Deserialize)]
struct JsonFrame {
    timestamp_ms: Option<u64>,
    lines: Vec<JsonLine>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum JsonLine {
    Plain(String),
    Positioned(OcrLine),
}

/// A frame before timestamps and indexes are assigned.
struct PendingFrame {
    source: String,
    timestamp_ms: Option<u64>,
    content: FrameContent,
}

fn stacked_lines<'a>(texts: impl IntoIterator<Item = &'a str>) -> Vec<OcrLine> {
    texts
        .into_iter()
        .enumerate()
        .map(|(i, text)| stacked_at(text.to_string(), i))
        .collect()
}

fn json_frame_lines(frame: JsonFrame) -> Vec<OcrLine> {
    // Plain strings get stacked by their position in the list.
    frame
        .lines
        .into_iter()
        .enumerate()
        .map(|(i, line)| match line {
            JsonLine::Positioned(line) if line.bounds.is_some() => line,
            JsonLine::Positioned(line) => stacked_at(line.text, i),
            JsonLine::Plain(text) => stacked_at(text, i),
        })
        .collect()
}

fn stacked_at(text: String, row: usize) -> OcrLine {
    let width = text.chars().count() as f32 * SYNTHETIC_CHAR_WIDTH;
    OcrLine::with_bounds(
        text,
        0.0,
        row as f32 * SYNTHETIC_LINE_SPACING,
        width,
        SYNTHETIC_LINE_HEIGHT,
    )
}

/// Column order of `documents.csv`; matches the fields of [`DocumentRow`].
const DOCUMENT_COLUMNS: [&str; 17] = [
    "source",
    "frame_index",
    "format",
    "document_type",
    "issuing_country",
    "surname",
    "given_names",
    "document_number",
    "nationality",
    "birth_date",
    "sex",
    "expiry_date",
    "personal_number",
    "optional_data",
    "checks_valid",
    "corrected",
    "expired",
];

/// One row of `documents.csv`.
#[derive(Debug, Serialize)]
struct DocumentRow<'a> {
    source: &'a str,
    frame_index: usize,
    format: &'static str,
    document_type: &'a str,
    issuing_country: &'a str,
    surname: &'a str,
    given_names: &'a str,
    document_number: &'a str,
    nationality: &'a str,
    birth_date: String,
    sex: &'a str,
    expiry_date: String,
    personal_number: &'a str,
    optional_data: &'a str,
    checks_valid: bool,
    corrected: bool,
    expired: bool,
}

impl<'a> DocumentRow<'a> {
    fn new(document: &'a ConfirmedDocument, reference: NaiveDate) -> Self {
        let mrz = &document.mrz;
        Self {
            source: &document.source,
            frame_index: document.frame_index,
            format: mrz.format.name(),
            document_type: &mrz.document_type,
            issuing_country: &mrz.issuing_country,
            surname: &mrz.surname,
            given_names: &mrz.given_names,
            document_number: &mrz.document_number,
            nationality: &mrz.nationality,
            birth_date: mrz
                .birth_date_on(reference)
                .map(|d| d.to_string())
                .unwrap_or_else(|| mrz.birth_date.clone()),
            sex: &mrz.sex,
            expiry_date: mrz
                .expiry_date_on(reference)
                .map(|d| d.to_string())
                .unwrap_or_else(|| mrz.expiry_date.clone()),
            personal_number: &mrz.personal_number,
            optional_data: &mrz.optional_data,
            checks_valid: mrz.checks.all_valid(),
            corrected: document.corrected(),
            expired: mrz.is_expired_on(reference),
        }
    }
}

pub struct ScanPipeline<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
    recognizer: Box<dyn TextRecognizer>,
}

impl<S: Storage, C: ConfigProvider> ScanPipeline<S, C> {
    pub fn new(storage: S, config: C, recognizer: Box<dyn TextRecognizer>) -> Self {
        Self {
            storage,
            config,
            recognizer,
        }
    }

    pub fn config(&self) -> &C {
        &self.config
    }

    async fn expand_input(&self, input: &str) -> Result<Vec<PathBuf>> {
        let path = PathBuf::from(input);
        let metadata = tokio::fs::metadata(&path)
            .await
            .map_err(|e| ScanError::InvalidInputError {
                path: input.to_string(),
                reason: e.to_string(),
            })?;

        if !metadata.is_dir() {
            if input_kind(&path).is_none() {
                return Err(ScanError::InvalidInputError {
                    path: input.to_string(),
                    reason: "unsupported file type".to_string(),
                });
            }
            return Ok(vec![path]);
        }

        let mut files = Vec::new();
        let mut entries = tokio::fs::read_dir(&path).await?;
        while let Some(entry) = entries.next_entry().await? {
            let entry_path = entry.path();
            if entry.file_type().await?.is_file() && input_kind(&entry_path).is_some() {
                files.push(entry_path);
            } else {
                tracing::debug!("Skipping {}", entry_path.display());
            }
        }
        files.sort();
        Ok(files)
    }

    async fn read_frames(&self, path: &Path) -> Result<Vec<PendingFrame>> {
        let source = path.display().to_string();
        match input_kind(path) {
            Some(InputKind::Image) => Ok(vec![PendingFrame {
                source,
                timestamp_ms: None,
                content: FrameContent::Image(path.to_path_buf()),
            }]),
            Some(InputKind::Text) => {
                let text = tokio::fs::read_to_string(path).await?;
                let lines = stacked_lines(text.lines().map(str::trim).filter(|l| !l.is_empty()));
                Ok(vec![PendingFrame {
                    source,
                    timestamp_ms: None,
                    content: FrameContent::Text(lines),
                }])
            }
            Some(InputKind::Json) => {
                let data = tokio::fs::read(path).await?;
                let parsed: FrameFile = serde_json::from_slice(&data)?;
                let frames = match parsed {
                    FrameFile::One(frame) => vec![(source, frame)],
                    FrameFile::Many(frames) => frames
                        .into_iter()
                        .enumerate()
                        .map(|(i, frame)| (format!("{}#{}", source, i), frame))
                        .collect(),
                };
                Ok(frames
                    .into_iter()
                    .map(|(source, frame)| PendingFrame {
                        source,
                        timestamp_ms: frame.timestamp_ms,
                        content: FrameContent::Text(json_frame_lines(frame)),
                    })
                    .collect())
            }
            None => Err(ScanError::InvalidInputError {
                path: source,
                reason: "unsupported file type".to_string(),
            }),
        }
    }

    async fn frame_lines(&self, frame: &Frame, ocr: &OcrSettings) -> Result<Vec<OcrLine>> {
        match &frame.content {
            FrameContent::Text(lines) => Ok(lines.clone()),
            FrameContent::Image(path) => {
                let bytes = tokio::fs::read(path).await?;
                let image = image::load_from_memory(&bytes)?;
                let image = crop_to_guide(image, ocr);
                self.recognizer.recognize(&image).await
            }
        }
    }

    fn render_json(&self, report: &ScanReport) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec_pretty(report)?)
    }

    fn render_csv(&self, report: &ScanReport) -> Result<Vec<u8>> {
        let reference = report.finished_at.date_naive();
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(Vec::new());
        writer.write_record(DOCUMENT_COLUMNS)?;
        for document in &report.documents {
            writer.serialize(DocumentRow::new(document, reference))?;
        }
        writer.into_inner().map_err(|e| ScanError::ProcessingError {
            message: format!("Failed to finish CSV output: {}", e),
        })
    }
}

fn crop_to_guide(image: DynamicImage, ocr: &OcrSettings) -> DynamicImage {
    let Some(guide) = ocr.roi else {
        return image;
    };
    match map_guide_to_image(&guide, image.width(), image.height()) {
        Some(rect) => image.crop_imm(rect.x, rect.y, rect.width, rect.height),
        None => {
            tracing::warn!("Guide region falls outside the image, using the full frame");
            image
        }
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for ScanPipeline<S, C> {
    async fn extract(&self) -> Result<Vec<Frame>> {
        let interval = self.config.scan_settings().frame_interval_ms;
        let mut pending = Vec::new();

        for input in self.config.inputs() {
            tracing::debug!("Expanding input: {}", input);
            for path in self.expand_input(input).await? {
                pending.extend(self.read_frames(&path).await?);
            }
        }

        let mut frames = Vec::with_capacity(pending.len());
        let mut previous: Option<u64> = None;
        for (index, frame) in pending.into_iter().enumerate() {
            let timestamp_ms = frame
                .timestamp_ms
                .unwrap_or_else(|| previous.map(|p| p.saturating_add(interval)).unwrap_or(0));
            previous = Some(timestamp_ms);
            frames.push(Frame {
                index,
                source: frame.source,
                timestamp_ms,
                content: frame.content,
            });
        }

        Ok(frames)
    }

    async fn transform(&self, frames: Vec<Frame>) -> Result<ScanReport> {
        let settings = self.config.scan_settings();
        let ocr = self.config.ocr_settings();
        let mut session = ScanSession::new(&settings);
        let started_at = Utc::now();
        let mut records = Vec::with_capacity(frames.len());
        let mut documents = Vec::new();

        for frame in frames {
            let lines = match session.admit(frame.timestamp_ms) {
                Err(reason) => {
                    tracing::debug!("Frame {} skipped: {:?}", frame.index, reason);
                    records.push(FrameRecord {
                        index: frame.index,
                        source: frame.source,
                        timestamp_ms: frame.timestamp_ms,
                        outcome: FrameOutcome::Skipped { reason },
                    });
                    continue;
                }
                Ok(permit) => {
                    let lines = self.frame_lines(&frame, &ocr).await;
                    drop(permit);
                    lines
                }
            };

            let outcome = match lines {
                Err(e) => {
                    tracing::warn!("Frame {} ({}) failed: {}", frame.index, frame.source, e);
                    FrameOutcome::Failed {
                        message: e.to_string(),
                    }
                }
                Ok(lines) => {
                    let event = session.observe(&lines);
                    tracing::debug!("Frame {}: {}", frame.index, event.status_message());
                    let outcome = event.outcome();
                    if let SessionEvent::Confirmed { mrz, correction } = event {
                        tracing::info!(
                            "Confirmed {} {} from {}",
                            mrz.format,
                            mrz.document_number,
                            frame.source
                        );
                        documents.push(ConfirmedDocument {
                            mrz,
                            correction,
                            frame_index: frame.index,
                            source: frame.source.clone(),
                        });
                    }
                    outcome
                }
            };

            records.push(FrameRecord {
                index: frame.index,
                source: frame.source,
                timestamp_ms: frame.timestamp_ms,
                outcome,
            });
        }

        Ok(ScanReport {
            started_at,
            finished_at: Utc::now(),
            frames: records,
            documents,
        })
    }

    async fn load(&self, report: &ScanReport) -> Result<String> {
        let mut outputs: Vec<(&str, Vec<u8>)> = Vec::new();
        for format in self.config.output_formats() {
            match format.as_str() {
                "json" => outputs.push((REPORT_FILE, self.render_json(report)?)),
                "csv" => outputs.push((DOCUMENTS_FILE, self.render_csv(report)?)),
                other => {
                    return Err(ScanError::InvalidConfigValueError {
                        field: "output_formats".to_string(),
                        value: other.to_string(),
                        reason: "Unsupported format".to_string(),
                    })
                }
            }
        }

        let Some((primary, _)) = outputs.first() else {
            return Err(ScanError::MissingConfigError {
                field: "output_formats".to_string(),
            });
        };
        let primary = primary.to_string();

        if let Some(archive) = self.config.archive_name() {
            tracing::debug!("Creating ZIP file with {} files", outputs.len());

            let zip_data = {
                let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));
                for (name, data) in &outputs {
                    zip.start_file::<_, ()>(*name, FileOptions::default())?;
                    zip.write_all(data)?;
                }
                zip.finish()?.into_inner()
            };

            tracing::debug!("Writing ZIP file ({} bytes) to storage", zip_data.len());
            self.storage.write_file(archive, &zip_data).await?;
            return Ok(format!("{}/{}", self.config.output_path(), archive));
        }

        for (name, data) in &outputs {
            tracing::debug!("Writing {} ({} bytes)", name, data.len());
            self.storage.write_file(name, data).await?;
        }

        Ok(format!("{}/{}", self.config.output_path(), primary))
    }
}
