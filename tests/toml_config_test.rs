use mrz_scan::domain::ports::ConfigProvider;
use mrz_scan::utils::validation::Validate;
use mrz_scan::{LocalStorage, ScanEngine, ScanPipeline, TomlConfig, UnavailableRecognizer};
use std::io::Write;
use tempfile::{NamedTempFile, TempDir};

const TD3_L1: &str = "P<UTOERIKSSON<<ANNA<MARIA<<<<<<<<<<<<<<<<<<<";
const TD3_L2: &str = "L898902C36UTO7408122F1204159ZE184226B<<<<<10";

fn write_config(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[tokio::test]
async fn test_toml_driven_scan_with_compression() {
    let input_dir = TempDir::new().unwrap();
    let output_dir = TempDir::new().unwrap();
    for i in 0..3 {
        std::fs::write(
            input_dir.path().join(format!("frame_{}.txt", i)),
            format!("{}\n{}\n", TD3_L1, TD3_L2),
        )
        .unwrap();
    }

    let config_file = write_config(&format!(
        r#"
[scanner]
name = "integration"

[input]
paths = ["{input}"]

[scan]
required_hits = 3

[load]
output_path = "{output}"
output_formats = ["json", "csv"]

[load.compression]
enabled = true
filename = "batch.zip"
"#,
        input = input_dir.path().display(),
        output = output_dir.path().display(),
    ));

    let config = TomlConfig::from_file(config_file.path()).unwrap();
    config.validate().unwrap();

    let storage = LocalStorage::new(config.output_path().to_string());
    let pipeline = ScanPipeline::new(storage, config, Box::new(UnavailableRecognizer));
    let run = ScanEngine::new(pipeline).run().await.unwrap();

    assert_eq!(run.report.documents.len(), 1);
    assert_eq!(run.report.documents[0].frame_index, 2);
    assert!(run.output_path.ends_with("batch.zip"));

    let zip_data = std::fs::read(output_dir.path().join("batch.zip")).unwrap();
    let archive = zip::ZipArchive::new(std::io::Cursor::new(zip_data)).unwrap();
    let mut names: Vec<&str> = archive.file_names().collect();
    names.sort();
    assert_eq!(names, vec!["documents.csv", "scan_report.json"]);
}

#[test]
fn test_invalid_roi_fails_validation() {
    let config_file = write_config(
        r#"
[scanner]
name = "kiosk"

[input]
paths = ["./frames"]

[ocr.roi]
left = 0.0
top = 0.0
width = 100.0
height = 20.0
preview_width = 0.0
preview_height = 1920.0

[load]
output_path = "./output"
output_formats = ["csv"]
"#,
    );

    let config = TomlConfig::from_file(config_file.path()).unwrap();
    let err = config.validate().unwrap_err();
    assert!(err.to_string().contains("ocr.roi.preview_width"));
}

#[test]
fn test_missing_section_is_parse_error() {
    let config_file = write_config(
        r#"
[scanner]
name = "kiosk"

[load]
output_path = "./output"
output_formats = ["csv"]
"#,
    );

    let err = TomlConfig::from_file(config_file.path()).unwrap_err();
    assert!(err.user_friendly_message().starts_with("Invalid configuration"));
}
