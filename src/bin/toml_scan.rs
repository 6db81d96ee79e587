use clap::Parser;
use mrz_scan::domain::model::FrameContent;
use mrz_scan::domain::ports::{ConfigProvider, Pipeline};
use mrz_scan::utils::{logger, validation::Validate};
use mrz_scan::{
    default_recognizer, LocalStorage, ScanEngine, ScanPipeline, TomlConfig, UnavailableRecognizer,
};

#[derive(Parser)]
#[command(name = "toml-scan")]
#[command(about = "MRZ scanner driven by a TOML configuration file")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "mrz-scan.toml")]
    config: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Override monitoring setting from config
    #[arg(long)]
    monitor: Option<bool>,

    /// Override continuous scanning from config
    #[arg(long)]
    continuous: Option<bool>,

    /// Show the inputs that would be scanned without running OCR
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut config = match TomlConfig::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config file '{}': {}", args.config, e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(1);
        }
    };

    if config.json_logging() {
        logger::init_json_logger(args.verbose);
    } else {
        logger::init_cli_logger(args.verbose);
    }

    tracing::info!("🚀 Starting TOML-based MRZ scanner");
    tracing::info!("📁 Loaded configuration from: {}", args.config);

    if let Some(continuous) = args.continuous {
        config.scan.continuous = continuous;
        tracing::info!("🔧 Continuous mode overridden to: {}", continuous);
    }

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    tracing::info!("✅ Configuration loaded and validated successfully");

    display_config_summary(&config, &args);

    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - No OCR will run");
        perform_dry_run(config).await?;
        return Ok(());
    }

    let monitor_enabled = args.monitor.unwrap_or_else(|| config.monitoring_enabled());
    if monitor_enabled {
        tracing::info!("🔍 System monitoring enabled");
    }

    let storage = LocalStorage::new(config.output_path().to_string());
    let recognizer = default_recognizer(&config.ocr_settings());
    let pipeline = ScanPipeline::new(storage, config, recognizer);

    let engine = ScanEngine::new_with_monitoring(pipeline, monitor_enabled);

    match engine.run().await {
        Ok(run) => {
            tracing::info!(
                "✅ Scan completed with {} confirmed documents",
                run.report.documents.len()
            );
            println!(
                "✅ Scan completed: {} documents from {} frames",
                run.report.documents.len(),
                run.report.frames.len()
            );
            println!("📁 Output saved to: {}", run.output_path);
        }
        Err(e) => {
            tracing::error!(
                "❌ Scan failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 Suggestion: {}", e.recovery_suggestion());

            let exit_code = e.severity().exit_code();
            if exit_code > 0 {
                std::process::exit(exit_code);
            }
        }
    }

    Ok(())
}

fn display_config_summary(config: &TomlConfig, args: &Args) {
    let scan = config.scan_settings();
    let formats: Vec<String> = scan.formats.iter().map(|f| f.to_string()).collect();

    println!("📋 Configuration Summary:");
    println!("  Scanner: {}", config.scanner.name);
    if let Some(description) = &config.scanner.description {
        println!("  Description: {}", description);
    }
    println!("  Inputs: {}", config.inputs().join(", "));
    println!("  MRZ formats: {}", formats.join(", "));
    println!("  Required hits: {}", scan.required_hits);
    println!("  Frame interval: {}ms", scan.frame_interval_ms);
    println!("  Continuous: {}", scan.continuous);
    println!("  Corrections: {}", scan.correction.enabled);
    println!("  Output: {}", config.output_path());
    println!("  Output formats: {}", config.load.output_formats.join(", "));

    if args.dry_run {
        println!("  🔍 DRY RUN MODE ENABLED");
    }

    println!();
}

async fn perform_dry_run(config: TomlConfig) -> Result<(), Box<dyn std::error::Error>> {
    println!("🔍 Dry Run Analysis:");
    println!();

    let ocr = config.ocr_settings();
    println!("👁️ OCR:");
    println!("  Language: {}", ocr.lang);
    println!("  PSM: {}, OEM: {}", ocr.psm, ocr.oem);
    match ocr.roi {
        Some(roi) => println!(
            "  Guide region: {}x{} at ({}, {}) on a {}x{} preview",
            roi.width, roi.height, roi.left, roi.top, roi.preview_width, roi.preview_height
        ),
        None => println!("  Guide region: full frame"),
    }

    println!();
    println!("💾 Output Configuration:");
    println!("  Path: {}", config.output_path());
    match config.archive_name() {
        Some(archive) => println!("  Compression: {} (ZIP)", archive),
        None => println!("  Compression: disabled"),
    }

    let storage = LocalStorage::new(config.output_path().to_string());
    let pipeline = ScanPipeline::new(storage, config, Box::new(UnavailableRecognizer));
    let frames = pipeline.extract().await?;

    println!();
    println!("🎞️ Frames ({}):", frames.len());
    for frame in &frames {
        let kind = match &frame.content {
            FrameContent::Image(_) => "image".to_string(),
            FrameContent::Text(lines) => format!("text, {} lines", lines.len()),
        };
        println!(
            "  #{} @{}ms {} ({})",
            frame.index, frame.timestamp_ms, frame.source, kind
        );
    }

    println!();
    println!("✅ Dry run analysis complete. Use --verbose for more details during actual run.");

    Ok(())
}
