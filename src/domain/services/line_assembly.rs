//! Turning loose OCR lines into candidate MRZ rows.

use crate::domain::model::{DetectionSettings, OcrLine};
use regex::Regex;
use std::sync::OnceLock;

fn non_mrz_chars() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^A-Z0-9<]").expect("static regex"))
}

fn whitespace() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").expect("static regex"))
}

/// Uppercases and strips everything outside the MRZ charset.
pub fn normalize_line(raw: &str) -> String {
    let text = raw.replace('«', "<<");
    let text = whitespace().replace_all(&text, "").to_uppercase();
    non_mrz_chars().replace_all(&text, "").into_owned()
}

/// MRZ rows are padded with `<`, prose almost never contains it.
pub fn looks_like_mrz_line(s: &str, settings: &DetectionSettings) -> bool {
    let len = s.chars().count();
    let fillers = s.chars().filter(|&c| c == '<').count();
    let by_ratio = (len as f32 * settings.min_filler_ratio).floor() as usize;
    fillers >= settings.min_filler_count.max(by_ratio)
}

pub fn is_length_approx(s: &str, target: usize, settings: &DetectionSettings) -> bool {
    let len = s.chars().count();
    len + settings.length_tolerance_below >= target && len <= target + settings.length_tolerance_above
}

pub fn pad_to_length(s: &str, len: usize) -> String {
    let mut out: String = s.to_uppercase().chars().take(len).collect();
    let missing = len - out.chars().count();
    out.extend(std::iter::repeat('<').take(missing));
    out
}

struct Candidate {
    text: String,
    center_y: f32,
    left: f32,
}

/// Groups OCR lines into `row_count` rows: lines are split where the vertical
/// gaps are largest, then each row is read left to right.
pub fn assemble_rows(lines: &[OcrLine], row_count: usize, settings: &DetectionSettings) -> Vec<String> {
    if row_count == 0 {
        return Vec::new();
    }

    let mut candidates: Vec<Candidate> = lines
        .iter()
        .filter_map(|line| {
            let text = normalize_line(&line.text);
            let keep = text.chars().count() >= settings.min_row_length
                || looks_like_mrz_line(&text, settings);
            keep.then(|| Candidate {
                text,
                center_y: line.center_y(),
                left: line.left(),
            })
        })
        .collect();

    if candidates.is_empty() {
        return Vec::new();
    }

    candidates.sort_by(|a, b| a.center_y.total_cmp(&b.center_y));

    if candidates.len() <= row_count {
        return candidates.into_iter().map(|c| c.text).collect();
    }

    // Indices i where a new row starts between candidates[i] and candidates[i + 1].
    let mut gaps: Vec<(usize, f32)> = candidates
        .windows(2)
        .enumerate()
        .map(|(i, pair)| (i, pair[1].center_y - pair[0].center_y))
        .collect();
    gaps.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
    let mut splits: Vec<usize> = gaps.iter().take(row_count - 1).map(|(i, _)| *i).collect();
    splits.sort_unstable();

    let mut rows = Vec::with_capacity(row_count);
    let mut start = 0;
    for end in splits.into_iter().map(|i| i + 1).chain(std::iter::once(candidates.len())) {
        let mut cluster: Vec<&Candidate> = candidates[start..end].iter().collect();
        cluster.sort_by(|a, b| a.left.total_cmp(&b.left));
        rows.push(cluster.iter().map(|c| c.text.as_str()).collect::<String>());
        start = end;
    }
    rows
}
