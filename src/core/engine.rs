use crate::domain::model::{FrameOutcome, ScanReport};
use crate::domain::ports::Pipeline;
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;

/// What a finished run produced.
#[derive(Debug, Clone)]
pub struct ScanRun {
    pub report: ScanReport,
    pub output_path: String,
}

pub struct ScanEngine<P: Pipeline> {
    pipeline: P,
    monitor: SystemMonitor,
}

impl<P: Pipeline> ScanEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self::new_with_monitoring(pipeline, false)
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            monitor: SystemMonitor::new(monitor_enabled),
        }
    }

    pub async fn run(&self) -> Result<ScanRun> {
        tracing::info!("Starting MRZ scan...");
        self.monitor.log_stats("Start");

        tracing::info!("Extracting frames...");
        let frames = self.pipeline.extract().await?;
        let frame_count = frames.len();
        tracing::info!("Extracted {} frames", frame_count);
        self.monitor.log_stats("Extract");

        tracing::info!("Scanning frames...");
        let report = self.pipeline.transform(frames).await?;
        log_summary(&report);
        self.monitor.log_stats("Transform");
        self.monitor.log_throughput(frame_count);

        tracing::info!("Writing outputs...");
        let output_path = self.pipeline.load(&report).await?;
        tracing::info!("Output saved to: {}", output_path);
        self.monitor.log_stats("Load");
        self.monitor.log_final_stats();

        Ok(ScanRun {
            report,
            output_path,
        })
    }
}

fn log_summary(report: &ScanReport) {
    let skipped = report.count_outcomes(|o| matches!(o, FrameOutcome::Skipped { .. }));
    let no_mrz = report.count_outcomes(|o| matches!(o, FrameOutcome::NoMrz));
    let stabilizing = report.count_outcomes(|o| matches!(o, FrameOutcome::Stabilizing { .. }));
    let failed = report.count_outcomes(|o| matches!(o, FrameOutcome::Failed { .. }));
    let corrected = report.documents.iter().filter(|d| d.corrected()).count();

    tracing::info!(
        "Scanned {} frames: {} skipped, {} without MRZ, {} stabilizing, {} failed",
        report.frames.len(),
        skipped,
        no_mrz,
        stabilizing,
        failed
    );
    tracing::info!(
        "Confirmed {} documents ({} OCR corrected)",
        report.documents.len(),
        corrected
    );
}
