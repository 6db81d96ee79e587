use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MrzFormat {
    Td1,
    Td2,
    Td3,
}

impl MrzFormat {
    pub fn line_count(self) -> usize {
        match self {
            MrzFormat::Td1 => 3,
            MrzFormat::Td2 | MrzFormat::Td3 => 2,
        }
    }

    pub fn line_length(self) -> usize {
        match self {
            MrzFormat::Td1 => 30,
            MrzFormat::Td2 => 36,
            MrzFormat::Td3 => 44,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            MrzFormat::Td1 => "TD1",
            MrzFormat::Td2 => "TD2",
            MrzFormat::Td3 => "TD3",
        }
    }
}

impl fmt::Display for MrzFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for MrzFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "td1" => Ok(MrzFormat::Td1),
            "td2" => Ok(MrzFormat::Td2),
            "td3" => Ok(MrzFormat::Td3),
            other => Err(format!("unknown MRZ format '{}' (expected td1, td2 or td3)", other)),
        }
    }
}

/// Outcome of every check digit the layout carries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckDigits {
    pub document_number: bool,
    pub birth_date: bool,
    pub expiry_date: bool,
    /// Only TD3 protects the personal number with its own digit.
    pub personal_number: Option<bool>,
    pub composite: bool,
}

impl CheckDigits {
    pub fn all_valid(&self) -> bool {
        self.document_number
            && self.birth_date
            && self.expiry_date
            && self.personal_number.unwrap_or(true)
            && self.composite
    }

    /// Name of the first failing field, in MRZ order.
    pub fn first_failure(&self) -> Option<&'static str> {
        if !self.document_number {
            Some("document_number")
        } else if !self.birth_date {
            Some("birth_date")
        } else if !self.expiry_date {
            Some("expiry_date")
        } else if self.personal_number == Some(false) {
            Some("personal_number")
        } else if !self.composite {
            Some("composite")
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedMrz {
    pub format: MrzFormat,
    pub document_type: String,
    pub issuing_country: String,
    pub surname: String,
    pub given_names: String,
    pub name: String,
    pub document_number: String,
    pub nationality: String,
    /// YYMMDD
    pub birth_date: String,
    pub sex: String,
    /// YYMMDD
    pub expiry_date: String,
    pub personal_number: String,
    pub optional_data: String,
    pub checks: CheckDigits,
}

impl ParsedMrz {
    /// Birth years later than the reference year fall into the previous century.
    pub fn birth_date_on(&self, reference: NaiveDate) -> Option<NaiveDate> {
        let (yy, month, day) = split_yymmdd(&self.birth_date)?;
        let current = reference.year() % 100;
        let century = if yy > current { 1900 } else { 2000 };
        NaiveDate::from_ymd_opt(century + yy, month, day)
    }

    pub fn expiry_date_on(&self, reference: NaiveDate) -> Option<NaiveDate> {
        let (yy, month, day) = split_yymmdd(&self.expiry_date)?;
        let year = if 2000 + yy > reference.year() + 50 {
            1900 + yy
        } else {
            2000 + yy
        };
        NaiveDate::from_ymd_opt(year, month, day)
    }

    pub fn is_expired_on(&self, reference: NaiveDate) -> bool {
        self.expiry_date_on(reference)
            .map(|expiry| expiry < reference)
            .unwrap_or(false)
    }

    /// Fields that must agree between frames before a read is trusted.
    pub fn stability_key(&self) -> (&str, &str, &str) {
        (&self.document_number, &self.name, &self.expiry_date)
    }
}

fn split_yymmdd(raw: &str) -> Option<(i32, u32, u32)> {
    if raw.len() != 6 || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let yy = raw[0..2].parse().ok()?;
    let month = raw[2..4].parse().ok()?;
    let day = raw[4..6].parse().ok()?;
    Some((yy, month, day))
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl BoundingBox {
    pub fn center_y(&self) -> f32 {
        self.top + self.height / 2.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OcrLine {
    pub text: String,
    #[serde(default)]
    pub bounds: Option<BoundingBox>,
}

impl OcrLine {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            bounds: None,
        }
    }

    pub fn with_bounds(text: impl Into<String>, left: f32, top: f32, width: f32, height: f32) -> Self {
        Self {
            text: text.into(),
            bounds: Some(BoundingBox {
                left,
                top,
                width,
                height,
            }),
        }
    }

    pub fn center_y(&self) -> f32 {
        self.bounds.map(|b| b.center_y()).unwrap_or(0.0)
    }

    pub fn left(&self) -> f32 {
        self.bounds.map(|b| b.left).unwrap_or(0.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FrameContent {
    Image(PathBuf),
    Text(Vec<OcrLine>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub index: usize,
    pub source: String,
    pub timestamp_ms: u64,
    pub content: FrameContent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Correction {
    None,
    Positional,
    Substitution { from: char, to: char },
    DoubleSubstitution { first: (char, char), second: (char, char) },
    Aggressive,
}

impl Correction {
    pub fn is_corrected(&self) -> bool {
        !matches!(self, Correction::None)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// Arrived sooner than the frame interval after the last processed frame.
    Throttled,
    /// A previous frame is still being recognized.
    Busy,
    /// Scanning stopped after a confirmed document.
    Idle,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FrameOutcome {
    Skipped { reason: SkipReason },
    NoMrz,
    Stabilizing { hits: u32, required: u32 },
    Confirmed { corrected: bool },
    Failed { message: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameRecord {
    pub index: usize,
    pub source: String,
    pub timestamp_ms: u64,
    pub outcome: FrameOutcome,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfirmedDocument {
    pub mrz: ParsedMrz,
    pub correction: Correction,
    pub frame_index: usize,
    pub source: String,
}

impl ConfirmedDocument {
    pub fn corrected(&self) -> bool {
        self.correction.is_corrected()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub frames: Vec<FrameRecord>,
    pub documents: Vec<ConfirmedDocument>,
}

impl ScanReport {
    pub fn count_outcomes(&self, predicate: impl Fn(&FrameOutcome) -> bool) -> usize {
        self.frames.iter().filter(|f| predicate(&f.outcome)).count()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionSettings {
    pub min_filler_count: usize,
    pub min_filler_ratio: f32,
    pub min_row_length: usize,
    pub min_pair_length: usize,
    pub length_tolerance_below: usize,
    pub length_tolerance_above: usize,
}

impl Default for DetectionSettings {
    fn default() -> Self {
        Self {
            min_filler_count: 3,
            min_filler_ratio: 0.1,
            min_row_length: 12,
            min_pair_length: 18,
            length_tolerance_below: 6,
            length_tolerance_above: 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CorrectionSettings {
    pub enabled: bool,
    pub positional: bool,
    pub pair_window: usize,
    pub aggressive: bool,
}

impl Default for CorrectionSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            positional: true,
            pair_window: 6,
            aggressive: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanSettings {
    pub required_hits: u32,
    pub frame_interval_ms: u64,
    pub continuous: bool,
    pub formats: Vec<MrzFormat>,
    pub detection: DetectionSettings,
    pub correction: CorrectionSettings,
}

impl Default for ScanSettings {
    fn default() -> Self {
        Self {
            required_hits: 2,
            frame_interval_ms: 120,
            continuous: false,
            formats: vec![MrzFormat::Td3, MrzFormat::Td2, MrzFormat::Td1],
            detection: DetectionSettings::default(),
            correction: CorrectionSettings::default(),
        }
    }
}

/// Guide rectangle as drawn over the preview, in preview coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GuideRegion {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
    pub preview_width: f32,
    pub preview_height: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrSettings {
    pub lang: String,
    pub dpi: Option<i32>,
    pub psm: i32,
    pub oem: i32,
    pub roi: Option<GuideRegion>,
}

impl Default for OcrSettings {
    fn default() -> Self {
        Self {
            lang: "eng".to_string(),
            dpi: None,
            psm: 6,
            oem: 3,
            roi: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ParsedMrz {
        ParsedMrz {
            format: MrzFormat::Td3,
            document_type: "P".to_string(),
            issuing_country: "UTO".to_string(),
            surname: "ERIKSSON".to_string(),
            given_names: "ANNA MARIA".to_string(),
            name: "ERIKSSON ANNA MARIA".to_string(),
            document_number: "L898902C3".to_string(),
            nationality: "UTO".to_string(),
            birth_date: "740812".to_string(),
            sex: "F".to_string(),
            expiry_date: "120415".to_string(),
            personal_number: "ZE184226B".to_string(),
            optional_data: String::new(),
            checks: CheckDigits {
                document_number: true,
                birth_date: true,
                expiry_date: true,
                personal_number: Some(true),
                composite: true,
            },
        }
    }

    #[test]
    fn test_dates_resolve_against_reference() {
        let today = NaiveDate::from_ymd_opt(2026, 10, 16).unwrap();
        let mrz = sample();
        assert_eq!(mrz.birth_date_on(today), NaiveDate::from_ymd_opt(1974, 8, 12));
        assert_eq!(mrz.expiry_date_on(today), NaiveDate::from_ymd_opt(2012, 4, 15));
        assert!(mrz.is_expired_on(today));
    }

    #[test]
    fn test_recent_birth_year_stays_in_this_century() {
        let today = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
        let mut mrz = sample();
        mrz.birth_date = "150301".to_string();
        assert_eq!(mrz.birth_date_on(today), NaiveDate::from_ymd_opt(2015, 3, 1));
    }

    #[test]
    fn test_malformed_date_is_none() {
        let today = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
        let mut mrz = sample();
        mrz.expiry_date = "12O415".to_string();
        assert_eq!(mrz.expiry_date_on(today), None);
        assert!(!mrz.is_expired_on(today));
    }

    #[test]
    fn test_first_failure_reports_mrz_order() {
        let mut checks = sample().checks;
        assert_eq!(checks.first_failure(), None);
        checks.composite = false;
        checks.birth_date = false;
        assert_eq!(checks.first_failure(), Some("birth_date"));
        assert!(!checks.all_valid());
    }

    #[test]
    fn test_format_from_str() {
        assert_eq!("TD3".parse::<MrzFormat>(), Ok(MrzFormat::Td3));
        assert_eq!(" td1 ".parse::<MrzFormat>(), Ok(MrzFormat::Td1));
        assert!("mrva".parse::<MrzFormat>().is_err());
    }
}
