use crate::domain::model::ParsedMrz;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StabilizerVerdict {
    Stabilizing { hits: u32, required: u32 },
    Confirmed,
}

/// Requires the same document to be read on several consecutive detections
/// before it is trusted. Frames without an MRZ are simply not observed.
#[derive(Debug, Clone)]
pub struct Stabilizer {
    required_hits: u32,
    last: Option<ParsedMrz>,
    hits: u32,
}

impl Stabilizer {
    pub fn new(required_hits: u32) -> Self {
        Self {
            required_hits: required_hits.max(1),
            last: None,
            hits: 0,
        }
    }

    pub fn observe(&mut self, candidate: &ParsedMrz) -> StabilizerVerdict {
        let same = self
            .last
            .as_ref()
            .map(|last| last.stability_key() == candidate.stability_key())
            .unwrap_or(false);

        if same {
            self.hits += 1;
        } else {
            self.last = Some(candidate.clone());
            self.hits = 1;
        }

        if self.hits >= self.required_hits {
            StabilizerVerdict::Confirmed
        } else {
            StabilizerVerdict::Stabilizing {
                hits: self.hits,
                required: self.required_hits,
            }
        }
    }

    pub fn hits(&self) -> u32 {
        self.hits
    }

    pub fn reset(&mut self) {
        self.last = None;
        self.hits = 0;
    }
}
