use clap::Parser;
use mrz_scan::domain::ports::ConfigProvider;
use mrz_scan::utils::{logger, validation::Validate};
use mrz_scan::{default_recognizer, CliConfig, LocalStorage, ScanEngine, ScanPipeline};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = CliConfig::parse();

    logger::init_cli_logger(config.verbose);

    tracing::info!("Starting mrz-scan CLI");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    let monitor_enabled = config.monitor;
    if monitor_enabled {
        tracing::info!("🔍 System monitoring enabled");
    }

    let storage = LocalStorage::new(config.output_path.clone());
    let recognizer = default_recognizer(&config.ocr_settings());
    let pipeline = ScanPipeline::new(storage, config, recognizer);

    let engine = ScanEngine::new_with_monitoring(pipeline, monitor_enabled);

    match engine.run().await {
        Ok(run) => {
            if run.report.documents.is_empty() {
                println!("⚠️  No MRZ confirmed in {} frames", run.report.frames.len());
            }
            for document in &run.report.documents {
                let mrz = &document.mrz;
                println!(
                    "✅ {} {} {} ({}){}",
                    mrz.format,
                    mrz.document_number,
                    mrz.name,
                    mrz.issuing_country,
                    if document.corrected() { " [OCR corrected]" } else { "" }
                );
            }
            tracing::info!("📁 Output saved to: {}", run.output_path);
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
