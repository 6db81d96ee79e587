use crate::domain::model::{Correction, FrameOutcome, OcrLine, ParsedMrz, ScanSettings, SkipReason};
use crate::domain::services::{FrameGate, FramePermit, MrzDetector, Stabilizer, StabilizerVerdict};

pub const PROMPT_MESSAGE: &str = "Place the document MRZ inside the guide";

/// What a single observed frame produced.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    NoMrz,
    Stabilizing { hits: u32, required: u32 },
    Confirmed { mrz: ParsedMrz, correction: Correction },
}

impl SessionEvent {
    pub fn outcome(&self) -> FrameOutcome {
        match self {
            SessionEvent::NoMrz => FrameOutcome::NoMrz,
            SessionEvent::Stabilizing { hits, required } => FrameOutcome::Stabilizing {
                hits: *hits,
                required: *required,
            },
            SessionEvent::Confirmed { correction, .. } => FrameOutcome::Confirmed {
                corrected: correction.is_corrected(),
            },
        }
    }

    /// Status line shown to the operator.
    pub fn status_message(&self) -> String {
        match self {
            SessionEvent::NoMrz => PROMPT_MESSAGE.to_string(),
            SessionEvent::Stabilizing { hits, required } => {
                format!("Stabilizing MRZ... ({}/{})", hits, required)
            }
            SessionEvent::Confirmed { correction, .. } if correction.is_corrected() => {
                "Scan successful (OCR corrected)".to_string()
            }
            SessionEvent::Confirmed { .. } => "Scan successful".to_string(),
        }
    }
}

/// One continuous scanning run over a stream of frames.
#[derive(Debug)]
pub struct ScanSession {
    detector: MrzDetector,
    stabilizer: Stabilizer,
    gate: FrameGate,
    continuous: bool,
    scanning: bool,
}

impl ScanSession {
    pub fn new(settings: &ScanSettings) -> Self {
        Self {
            detector: MrzDetector::new(settings.clone()),
            stabilizer: Stabilizer::new(settings.required_hits),
            gate: FrameGate::new(settings.frame_interval_ms),
            continuous: settings.continuous,
            scanning: true,
        }
    }

    pub fn is_scanning(&self) -> bool {
        self.scanning
    }

    /// Decides whether a frame taken at `timestamp_ms` should be recognized at all.
    pub fn admit(&self, timestamp_ms: u64) -> Result<FramePermit<'_>, SkipReason> {
        if !self.scanning {
            return Err(SkipReason::Idle);
        }
        self.gate.try_acquire(timestamp_ms)
    }

    pub fn observe(&mut self, lines: &[OcrLine]) -> SessionEvent {
        if !self.scanning {
            return SessionEvent::NoMrz;
        }

        let Some(detection) = self.detector.detect(lines) else {
            return SessionEvent::NoMrz;
        };

        match self.stabilizer.observe(&detection.mrz) {
            StabilizerVerdict::Stabilizing { hits, required } => {
                SessionEvent::Stabilizing { hits, required }
            }
            StabilizerVerdict::Confirmed => {
                self.stabilizer.reset();
                if !self.continuous {
                    self.scanning = false;
                }
                SessionEvent::Confirmed {
                    mrz: detection.mrz,
                    correction: detection.correction,
                }
            }
        }
    }

    /// Starts over after a confirmed scan.
    pub fn resume(&mut self) {
        self.stabilizer.reset();
        self.gate.reset();
        self.scanning = true;
    }
}
