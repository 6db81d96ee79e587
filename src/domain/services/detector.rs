use crate::domain::model::{Correction, MrzFormat, OcrLine, ParsedMrz, ScanSettings};
use crate::domain::services::correction::{candidates, repair_positions};
use crate::domain::services::line_assembly::{
    assemble_rows, is_length_approx, looks_like_mrz_line, normalize_line, pad_to_length,
};
use crate::domain::services::parser::{parse, Validation};

#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
    pub mrz: ParsedMrz,
    pub correction: Correction,
}

/// Finds an MRZ among the OCR lines of a single frame.
#[derive(Debug, Clone)]
pub struct MrzDetector {
    settings: ScanSettings,
}

impl MrzDetector {
    pub fn new(settings: ScanSettings) -> Self {
        Self { settings }
    }

    fn enabled(&self, format: MrzFormat) -> bool {
        self.settings.formats.contains(&format)
    }

    pub fn detect(&self, lines: &[OcrLine]) -> Option<Detection> {
        let lines: Vec<OcrLine> = lines
            .iter()
            .filter(|l| !normalize_line(&l.text).is_empty())
            .cloned()
            .collect();
        if lines.is_empty() {
            return None;
        }

        let detection = &self.settings.detection;
        let pairs = if self.enabled(MrzFormat::Td3) || self.enabled(MrzFormat::Td2) {
            assemble_rows(&lines, 2, detection)
        } else {
            Vec::new()
        };
        let triples = if self.enabled(MrzFormat::Td1) {
            assemble_rows(&lines, 3, detection)
        } else {
            Vec::new()
        };

        if let Some(mrz) = self.scan_rows(&pairs, &triples, false) {
            return Some(Detection {
                mrz,
                correction: Correction::None,
            });
        }

        let correction = &self.settings.correction;
        if !correction.enabled {
            return None;
        }

        if correction.positional {
            if let Some(mrz) = self.scan_rows(&pairs, &triples, true) {
                tracing::debug!("MRZ recovered by positional repair");
                return Some(Detection {
                    mrz,
                    correction: Correction::Positional,
                });
            }
        }

        let pair_candidates = candidates(&pairs, correction);
        let triple_candidates = candidates(&triples, correction);
        for ((pairs, kind), (triples, _)) in pair_candidates.into_iter().zip(triple_candidates) {
            if let Some(mrz) = self.scan_rows(&pairs, &triples, false) {
                tracing::debug!("MRZ recovered with correction {:?}", kind);
                return Some(Detection {
                    mrz,
                    correction: kind,
                });
            }
        }

        None
    }

    fn scan_rows(&self, pairs: &[String], triples: &[String], repair: bool) -> Option<ParsedMrz> {
        self.find_two_line(pairs, repair)
            .or_else(|| self.find_three_line(triples, repair))
    }

    fn find_two_line(&self, rows: &[String], repair: bool) -> Option<ParsedMrz> {
        let detection = &self.settings.detection;
        for pair in rows.windows(2) {
            let (a, b) = (&pair[0], &pair[1]);
            if !looks_like_mrz_line(a, detection) || !looks_like_mrz_line(b, detection) {
                continue;
            }

            let plausible = is_length_approx(a, 44, detection)
                || is_length_approx(b, 44, detection)
                || a.starts_with('P')
                || a.starts_with('V')
                || (a.len() >= detection.min_pair_length && b.len() >= detection.min_pair_length);
            if !plausible {
                continue;
            }

            // Passports are always TD3; otherwise the longer read decides.
            let format = if a.len() > 36 || b.len() > 36 || a.starts_with('P') {
                MrzFormat::Td3
            } else {
                MrzFormat::Td2
            };
            if !self.enabled(format) {
                continue;
            }

            // OCR sometimes returns the two rows swapped.
            for (first, second) in [(a, b), (b, a)] {
                let width = format.line_length();
                let lines = vec![pad_to_length(first, width), pad_to_length(second, width)];
                if let Some(mrz) = try_parse(format, &lines, repair) {
                    return Some(mrz);
                }
            }
        }
        None
    }

    fn find_three_line(&self, rows: &[String], repair: bool) -> Option<ParsedMrz> {
        let detection = &self.settings.detection;
        let format = MrzFormat::Td1;
        for triple in rows.windows(3) {
            // Name rows may fill all 30 positions, so no filler requirement here.
            if triple.iter().any(|row| row.len() < detection.min_pair_length) {
                continue;
            }

            let lines: Vec<String> = triple
                .iter()
                .map(|row| pad_to_length(row, format.line_length()))
                .collect();
            if let Some(mrz) = try_parse(format, &lines, repair) {
                return Some(mrz);
            }
        }
        None
    }
}

fn try_parse(format: MrzFormat, lines: &[String], repair: bool) -> Option<ParsedMrz> {
    let lines = if repair {
        repair_positions(format, lines)
    } else {
        lines.to_vec()
    };
    let refs: Vec<&str> = lines.iter().map(String::as_str).collect();
    parse(format, &refs, Validation::Strict)
        .or_else(|_| parse(format, &refs, Validation::Relaxed))
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::CorrectionSettings;

    const TD3_L1: &str = "P<UTOERIKSSON<<ANNA<MARIA<<<<<<<<<<<<<<<<<<<";
    const TD3_L2: &str = "L898902C36UTO7408122F1204159ZE184226B<<<<<10";

    fn stacked(rows: &[&str]) -> Vec<OcrLine> {
        rows.iter()
            .enumerate()
            .map(|(i, r)| OcrLine::with_bounds(*r, 0.0, i as f32 * 30.0, 400.0, 20.0))
            .collect()
    }

    #[test]
    fn test_detects_clean_td3() {
        let detector = MrzDetector::new(ScanSettings::default());
        let detection = detector.detect(&stacked(&[TD3_L1, TD3_L2])).unwrap();
        assert_eq!(detection.correction, Correction::None);
        assert_eq!(detection.mrz.document_number, "L898902C3");
        assert!(detection.mrz.checks.all_valid());
    }

    #[test]
    fn test_detects_swapped_rows() {
        let detector = MrzDetector::new(ScanSettings::default());
        let detection = detector.detect(&stacked(&[TD3_L2, TD3_L1])).unwrap();
        assert_eq!(detection.mrz.surname, "ERIKSSON");
    }

    #[test]
    fn test_pads_truncated_first_row() {
        let detector = MrzDetector::new(ScanSettings::default());
        let detection = detector
            .detect(&stacked(&["P<UTOERIKSSON<<ANNA<MARIA<<<<<<<", TD3_L2]))
            .unwrap();
        assert_eq!(detection.mrz.format, MrzFormat::Td3);
        assert_eq!(detection.mrz.given_names, "ANNA MARIA");
    }

    #[test]
    fn test_ignores_surrounding_prose() {
        let detector = MrzDetector::new(ScanSettings::default());
        let lines = vec![
            OcrLine::with_bounds("PASSPORT", 0.0, 0.0, 100.0, 20.0),
            OcrLine::with_bounds("Utopia", 0.0, 30.0, 100.0, 20.0),
            OcrLine::with_bounds(TD3_L1, 0.0, 300.0, 400.0, 20.0),
            OcrLine::with_bounds(TD3_L2, 0.0, 330.0, 400.0, 20.0),
        ];
        assert!(detector.detect(&lines).is_some());
    }

    #[test]
    fn test_positional_repair_fixes_letters_in_dates() {
        let detector = MrzDetector::new(ScanSettings::default());
        let garbled = "L898902C36UTO74O8122F12O4159ZE184226B<<<<<10";
        let detection = detector.detect(&stacked(&[TD3_L1, garbled])).unwrap();
        assert_eq!(detection.correction, Correction::Positional);
        assert_eq!(detection.mrz.birth_date, "740812");
        assert_eq!(detection.mrz.expiry_date, "120415");
    }

    #[test]
    fn test_global_substitution_when_positional_disabled() {
        let settings = ScanSettings {
            correction: CorrectionSettings {
                positional: false,
                ..CorrectionSettings::default()
            },
            ..ScanSettings::default()
        };
        let detector = MrzDetector::new(settings);
        let l1 = "P<D<<MUSTERMANN<<ERIKA<<<<<<<<<<<<<<<<<<<<<<";
        let garbled = "C01X00T478D<<64O8125F27O5310<<<<<<<<<<<<<<<0";
        let detection = detector.detect(&stacked(&[l1, garbled])).unwrap();
        assert_eq!(
            detection.correction,
            Correction::Substitution { from: 'O', to: '0' }
        );
        assert!(detection.correction.is_corrected());
        assert_eq!(detection.mrz.birth_date, "640812");
    }

    #[test]
    fn test_no_detection_without_corrections() {
        let settings = ScanSettings {
            correction: CorrectionSettings {
                enabled: false,
                ..CorrectionSettings::default()
            },
            ..ScanSettings::default()
        };
        let detector = MrzDetector::new(settings);
        let garbled = "L898902C36UTO74O8122F12O4159ZE184226B<<<<<10";
        assert!(detector.detect(&stacked(&[TD3_L1, garbled])).is_none());
    }

    #[test]
    fn test_detects_td1_card() {
        let detector = MrzDetector::new(ScanSettings::default());
        let lines = stacked(&[
            "I<UTOD231458907<<<<<<<<<<<<<<<",
            "7408122F1204159UTO<<<<<<<<<<<6",
            "ERIKSSON<<ANNA<MARIA<<<<<<<<<<",
        ]);
        let detection = detector.detect(&lines).unwrap();
        assert_eq!(detection.mrz.format, MrzFormat::Td1);
        assert_eq!(detection.mrz.document_number, "D23145890");
    }

    #[test]
    fn test_detects_td1_with_full_width_name_row() {
        let detector = MrzDetector::new(ScanSettings::default());
        let lines = stacked(&[
            "I<UTOD231458907<<<<<<<<<<<<<<<",
            "7408122F1204159UTO<<<<<<<<<<<6",
            "ERIKSSONABCDEFGHIJ<<ANNAMARIAB",
        ]);
        let detection = detector.detect(&lines).unwrap();
        assert_eq!(detection.mrz.format, MrzFormat::Td1);
        assert_eq!(detection.mrz.surname, "ERIKSSONABCDEFGHIJ");
        assert_eq!(detection.mrz.given_names, "ANNAMARIAB");
        assert_eq!(detection.correction, Correction::None);
    }

    #[test]
    fn test_empty_and_noise_frames() {
        let detector = MrzDetector::new(ScanSettings::default());
        assert!(detector.detect(&[]).is_none());
        assert!(detector.detect(&stacked(&["...", "  "])).is_none());
        assert!(detector.detect(&stacked(&["hello world", "lorem ipsum"])).is_none());
    }
}
