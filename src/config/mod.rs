pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
use crate::domain::model::{MrzFormat, OcrSettings, ScanSettings};
#[cfg(feature = "cli")]
use crate::domain::ports::ConfigProvider;
#[cfg(feature = "cli")]
use crate::utils::error::Result;
#[cfg(feature = "cli")]
use crate::utils::validation::{self, Validate};
#[cfg(feature = "cli")]
use clap::Parser;
#[cfg(feature = "cli")]
use serde::{Deserialize, Serialize};

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "mrz-scan")]
#[command(about = "Scan passport and ID card MRZs from frames or text dumps")]
pub struct CliConfig {
    /// Frame files or directories (images, .txt line dumps, .json OCR frames)
    #[arg(required = true)]
    pub inputs: Vec<String>,

    #[arg(long, default_value = "./output")]
    pub output_path: String,

    #[arg(long, value_delimiter = ',', default_value = "csv,json")]
    pub output_formats: Vec<String>,

    /// Bundle outputs into this ZIP instead of separate files
    #[arg(long)]
    pub archive: Option<String>,

    #[arg(long, default_value = "2")]
    pub required_hits: u32,

    #[arg(long, default_value = "120")]
    pub frame_interval_ms: u64,

    #[arg(long, help = "Keep scanning after a confirmed document")]
    pub continuous: bool,

    #[arg(long, help = "Disable OCR confusion corrections")]
    pub no_corrections: bool,

    #[arg(long, value_delimiter = ',', default_value = "td3,td2,td1")]
    pub formats: Vec<MrzFormat>,

    #[arg(long, default_value = "eng")]
    pub lang: String,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Log CPU and memory usage per phase")]
    pub monitor: bool,
}

#[cfg(feature = "cli")]
impl ConfigProvider for CliConfig {
    fn inputs(&self) -> &[String] {
        &self.inputs
    }

    fn output_path(&self) -> &str {
        &self.output_path
    }

    fn output_formats(&self) -> &[String] {
        &self.output_formats
    }

    fn archive_name(&self) -> Option<&str> {
        self.archive.as_deref()
    }

    fn scan_settings(&self) -> ScanSettings {
        let mut settings = ScanSettings {
            required_hits: self.required_hits,
            frame_interval_ms: self.frame_interval_ms,
            continuous: self.continuous,
            formats: self.formats.clone(),
            ..ScanSettings::default()
        };
        settings.correction.enabled = !self.no_corrections;
        settings
    }

    fn ocr_settings(&self) -> OcrSettings {
        OcrSettings {
            lang: self.lang.clone(),
            ..OcrSettings::default()
        }
    }
}

#[cfg(feature = "cli")]
impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_non_empty_list("inputs", &self.inputs)?;
        for input in &self.inputs {
            validation::validate_path("inputs", input)?;
        }
        validation::validate_path("output_path", &self.output_path)?;
        validation::validate_output_formats("output_formats", &self.output_formats)?;
        if let Some(archive) = &self.archive {
            validation::validate_non_empty_string("archive", archive)?;
        }
        validation::validate_non_empty_string("lang", &self.lang)?;
        validation::validate_scan_settings("scan", &self.scan_settings())
    }
}

#[cfg(all(test, feature = "cli"))]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_args() {
        let config = CliConfig::try_parse_from(["mrz-scan", "frames/"]).unwrap();
        assert_eq!(config.inputs, vec!["frames/"]);
        assert_eq!(config.output_formats, vec!["csv", "json"]);
        assert_eq!(config.archive_name(), None);
        assert!(config.validate().is_ok());

        let settings = config.scan_settings();
        assert_eq!(settings.required_hits, 2);
        assert!(settings.correction.enabled);
        assert_eq!(
            settings.formats,
            vec![MrzFormat::Td3, MrzFormat::Td2, MrzFormat::Td1]
        );
    }

    #[test]
    fn test_overrides() {
        let config = CliConfig::try_parse_from([
            "mrz-scan",
            "a.txt",
            "b.json",
            "--formats",
            "td1",
            "--no-corrections",
            "--continuous",
            "--archive",
            "scan.zip",
            "--required-hits",
            "3",
        ])
        .unwrap();

        let settings = config.scan_settings();
        assert_eq!(settings.formats, vec![MrzFormat::Td1]);
        assert!(!settings.correction.enabled);
        assert!(settings.continuous);
        assert_eq!(settings.required_hits, 3);
        assert_eq!(config.archive_name(), Some("scan.zip"));
    }

    #[test]
    fn test_rejects_unknown_output_format() {
        let config =
            CliConfig::try_parse_from(["mrz-scan", "x.txt", "--output-formats", "xml"]).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_zero_required_hits() {
        let config =
            CliConfig::try_parse_from(["mrz-scan", "x.txt", "--required-hits", "0"]).unwrap();
        assert!(config.validate().is_err());
    }
}
