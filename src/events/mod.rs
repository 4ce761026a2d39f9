// Event detection module
// High-passed envelope follower and the forward-scan event segmenter

pub mod envelope;
pub mod segmenter;
pub mod types;

pub use envelope::{DetectorSettings, DetectorState, HighPassCoeffs, ATTACK_MS, RELEASE_MS};
pub use segmenter::{segment_events, SegmentLimits};
pub use types::Event;
