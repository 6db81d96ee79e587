use crate::domain::model::{GuideRegion, ScanSettings};
use crate::utils::error::{Result, ScanError};

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub const OUTPUT_FORMATS: [&str; 2] = ["csv", "json"];

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(ScanError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(ScanError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_positive_number(field_name: &str, value: usize, min_value: usize) -> Result<()> {
    if value < min_value {
        return Err(ScanError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be at least {}", min_value),
        });
    }
    Ok(())
}

pub fn validate_non_empty_list<T>(field_name: &str, values: &[T]) -> Result<()> {
    if values.is_empty() {
        return Err(ScanError::MissingConfigError {
            field: field_name.to_string(),
        });
    }
    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(ScanError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    // NaN compares false both ways, so test for membership instead.
    if !(value >= min && value <= max) {
        return Err(ScanError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}

pub fn validate_output_formats(field_name: &str, formats: &[String]) -> Result<()> {
    validate_non_empty_list(field_name, formats)?;
    for format in formats {
        if !OUTPUT_FORMATS.contains(&format.as_str()) {
            return Err(ScanError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: format.clone(),
                reason: format!(
                    "Unsupported format. Valid formats: {}",
                    OUTPUT_FORMATS.join(", ")
                ),
            });
        }
    }
    Ok(())
}

pub fn validate_scan_settings(prefix: &str, settings: &ScanSettings) -> Result<()> {
    validate_positive_number(
        &format!("{}.required_hits", prefix),
        settings.required_hits as usize,
        1,
    )?;
    validate_non_empty_list(&format!("{}.formats", prefix), &settings.formats)?;
    validate_range(
        &format!("{}.detection.min_filler_ratio", prefix),
        settings.detection.min_filler_ratio,
        0.0,
        1.0,
    )?;
    Ok(())
}

pub fn validate_guide_region(field_name: &str, roi: &GuideRegion) -> Result<()> {
    let sizes = [
        ("width", roi.width),
        ("height", roi.height),
        ("preview_width", roi.preview_width),
        ("preview_height", roi.preview_height),
    ];
    for (name, value) in sizes {
        if !(value > 0.0 && value.is_finite()) {
            return Err(ScanError::InvalidConfigValueError {
                field: format!("{}.{}", field_name, name),
                value: value.to_string(),
                reason: "Size must be positive".to_string(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_path() {
        assert!(validate_path("output_path", "./output").is_ok());
        assert!(validate_path("output_path", "").is_err());
        assert!(validate_path("output_path", "out\0put").is_err());
    }

    #[test]
    fn test_validate_output_formats() {
        let formats = vec!["csv".to_string(), "json".to_string()];
        assert!(validate_output_formats("output_formats", &formats).is_ok());

        let invalid = vec!["xml".to_string()];
        assert!(validate_output_formats("output_formats", &invalid).is_err());
        assert!(validate_output_formats("output_formats", &[]).is_err());
    }

    #[test]
    fn test_validate_scan_settings() {
        assert!(validate_scan_settings("scan", &ScanSettings::default()).is_ok());

        let no_hits = ScanSettings {
            required_hits: 0,
            ..ScanSettings::default()
        };
        assert!(validate_scan_settings("scan", &no_hits).is_err());

        let no_formats = ScanSettings {
            formats: vec![],
            ..ScanSettings::default()
        };
        assert!(matches!(
            validate_scan_settings("scan", &no_formats),
            Err(ScanError::MissingConfigError { .. })
        ));
    }

    #[test]
    fn test_validate_range_rejects_nan() {
        assert!(validate_range("ratio", 0.5_f32, 0.0, 1.0).is_ok());
        assert!(validate_range("ratio", f32::NAN, 0.0, 1.0).is_err());

        let mut settings = ScanSettings::default();
        settings.detection.min_filler_ratio = f32::NAN;
        let err = validate_scan_settings("scan", &settings).unwrap_err();
        assert!(err.to_string().contains("scan.detection.min_filler_ratio"));
    }

    #[test]
    fn test_validate_guide_region() {
        let roi = GuideRegion {
            left: 0.0,
            top: 0.0,
            width: 100.0,
            height: 0.0,
            preview_width: 1080.0,
            preview_height: 1920.0,
        };
        let err = validate_guide_region("ocr.roi", &roi).unwrap_err();
        assert!(err.to_string().contains("ocr.roi.height"));

        let nan_width = GuideRegion {
            width: f32::NAN,
            height: 20.0,
            ..roi
        };
        let err = validate_guide_region("ocr.roi", &nan_width).unwrap_err();
        assert!(err.to_string().contains("ocr.roi.width"));
    }
}
