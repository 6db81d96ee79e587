use mrz_scan::domain::model::{Correction, MrzFormat, OcrLine, ScanSettings};
use mrz_scan::domain::services::parser::{auto_detect, Validation};
use mrz_scan::domain::services::session::SessionEvent;
use mrz_scan::domain::services::{MrzDetector, ScanSession};

const TD3_L1: &str = "P<UTOERIKSSON<<ANNA<MARIA<<<<<<<<<<<<<<<<<<<";
const TD3_L2: &str = "L898902C36UTO7408122F1204159ZE184226B<<<<<10";

/// OCR output where each MRZ row came back as two word boxes.
fn fragmented_frame() -> Vec<OcrLine> {
    vec![
        OcrLine::with_bounds("PASSPORT", 0.0, 0.0, 120.0, 20.0),
        OcrLine::with_bounds("ZE184226B<<<<<10", 300.0, 141.0, 160.0, 20.0),
        OcrLine::with_bounds("P<UTOERIKSSON<<ANNA", 0.0, 100.0, 190.0, 20.0),
        OcrLine::with_bounds("L898902C36UTO7408122F1204159", 0.0, 140.0, 280.0, 20.0),
        OcrLine::with_bounds("<MARIA<<<<<<<<<<<<<<<<<<<", 200.0, 102.0, 250.0, 20.0),
    ]
}

#[test]
fn test_fragments_are_reassembled_into_rows() {
    let detector = MrzDetector::new(ScanSettings::default());
    let detection = detector.detect(&fragmented_frame()).unwrap();

    assert_eq!(detection.correction, Correction::None);
    assert_eq!(detection.mrz.format, MrzFormat::Td3);
    assert_eq!(detection.mrz.surname, "ERIKSSON");
    assert_eq!(detection.mrz.personal_number, "ZE184226B");
}

#[test]
fn test_ocr_noise_is_normalized() {
    let detector = MrzDetector::new(ScanSettings::default());
    let lines = vec![
        OcrLine::with_bounds("p<utoeriksson«anna<maria<<<<<<<<<<<<<<<<<<<", 0.0, 0.0, 440.0, 20.0),
        OcrLine::with_bounds("L898902C36 UTO7408122F1204159 ZE184226B<<<<<10", 0.0, 30.0, 440.0, 20.0),
    ];

    let detection = detector.detect(&lines).unwrap();
    assert_eq!(detection.mrz.given_names, "ANNA MARIA");
    assert!(detection.mrz.checks.all_valid());
}

#[test]
fn test_disabled_format_is_not_reported() {
    let settings = ScanSettings {
        formats: vec![MrzFormat::Td1],
        ..ScanSettings::default()
    };
    let detector = MrzDetector::new(settings);
    assert!(detector.detect(&fragmented_frame()).is_none());
}

#[test]
fn test_session_requires_agreeing_frames() {
    let settings = ScanSettings {
        required_hits: 3,
        ..ScanSettings::default()
    };
    let mut session = ScanSession::new(&settings);
    let other = vec![
        OcrLine::with_bounds("I<UTOERIKSSON<<ANNA<MARIA<<<<<<<<<<<", 0.0, 0.0, 360.0, 20.0),
        OcrLine::with_bounds("D231458907UTO7408122F1204159<<<<<<<6", 0.0, 30.0, 360.0, 20.0),
    ];

    let mut messages = Vec::new();
    for frame in [&fragmented_frame(), &fragmented_frame(), &other, &fragmented_frame()] {
        messages.push(session.observe(frame).status_message());
    }
    // A different document restarts the count.
    assert_eq!(
        messages,
        vec![
            "Stabilizing MRZ... (1/3)",
            "Stabilizing MRZ... (2/3)",
            "Stabilizing MRZ... (1/3)",
            "Stabilizing MRZ... (1/3)",
        ]
    );

    session.observe(&fragmented_frame());
    let event = session.observe(&fragmented_frame());
    assert!(matches!(event, SessionEvent::Confirmed { .. }));
    assert!(!session.is_scanning());
}

#[test]
fn test_auto_detect_strict_and_relaxed() {
    let bad_composite = "L898902C36UTO7408122F1204159ZE184226B<<<<<19";

    assert!(auto_detect(&[TD3_L1, bad_composite], Validation::Strict).is_err());

    let relaxed = auto_detect(&[TD3_L1, bad_composite], Validation::Relaxed).unwrap();
    assert!(!relaxed.checks.composite);
    assert_eq!(relaxed.checks.first_failure(), Some("composite"));
    assert_eq!(relaxed.document_number, "L898902C3");
}
