// Event detection types
// A detected transient segment and the window removed from its center

use serde::{Deserialize, Serialize};

use crate::units::samples_to_ms;

/// A detected plosive/sibilant segment, in samples of the input buffer
///
/// Events come out of the segmenter in ascending `start` order and never overlap.
/// `cut_len` is at most `length - 2`, so every event keeps at least one sample on
/// each side of the cut.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// First sample of the event
    pub start: usize,

    /// Number of samples spanned by the event
    pub length: usize,

    /// Number of samples removed from the event's interior
    pub cut_len: usize,
}

impl Event {
    pub fn new(start: usize, length: usize, cut_len: usize) -> Self {
        Event {
            start,
            length,
            cut_len,
        }
    }

    /// One past the last sample of the event
    pub fn end(&self) -> usize {
        self.start + self.length
    }

    /// Samples of the event left in the output
    pub fn retained_len(&self) -> usize {
        self.length.saturating_sub(self.cut_len)
    }

    /// Event start in milliseconds from the beginning of the input
    pub fn start_ms(&self, sample_rate: f64) -> f64 {
        samples_to_ms(self.start, sample_rate)
    }

    pub fn duration_ms(&self, sample_rate: f64) -> f64 {
        samples_to_ms(self.length, sample_rate)
    }

    pub fn cut_ms(&self, sample_rate: f64) -> f64 {
        samples_to_ms(self.cut_len, sample_rate)
    }
}
