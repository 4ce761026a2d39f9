// Event segmenter
// Single forward scan: threshold crossing opens a fixed-length event, the scan then jumps past it

use crate::audio::SampleBuffer;
use crate::config::CutterParams;
use crate::events::envelope::{DetectorSettings, DetectorState};
use crate::events::types::Event;
use crate::units::{db_to_gain, ms_to_samples};

/// Sample-domain limits for one segmentation run
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentLimits {
    /// Linear envelope level that opens an event
    pub threshold: f32,

    /// Events truncated below this length by the end of the buffer are discarded
    pub min_event: usize,

    /// Length every event opens with
    pub max_event: usize,

    /// Cut length before the per-event `length - 2` bound
    pub base_cut: usize,

    /// Zero the detector state when the scan resumes after an event
    pub reset_on_skip: bool,
}

impl SegmentLimits {
    /// Derive limits from (already clamped) parameters
    pub fn new(params: &CutterParams, sample_rate: f64) -> Self {
        let min_event = ms_to_samples(params.min_event_ms, sample_rate);
        let max_event = ms_to_samples(params.max_event_ms, sample_rate);
        let max_cut = ms_to_samples(params.max_cut_ms, sample_rate);

        let wanted_cut = (max_cut as f64 * params.cut_amount.clamp(0.0, 1.0) as f64).round() as usize;

        SegmentLimits {
            threshold: db_to_gain(params.threshold_db),
            min_event,
            max_event,
            base_cut: wanted_cut.min(max_event.saturating_sub(2)),
            reset_on_skip: params.reset_detector_on_skip,
        }
    }

    /// Cut length for an event of `length` samples
    #[inline]
    pub fn cut_for(&self, length: usize) -> usize {
        self.base_cut.min(length.saturating_sub(2))
    }
}

/// Scan the whole buffer and return events in ascending, non-overlapping order
///
/// Detection runs on the channel average. When an event is committed the scan
/// skips the event's interior without feeding it to the detector.
pub fn segment_events(
    buffer: &SampleBuffer,
    detector: &DetectorSettings,
    limits: &SegmentLimits,
) -> Vec<Event> {
    let n = buffer.num_samples();
    let mut state = DetectorState::new();
    let mut events = Vec::new();

    let mut i = 0;
    while i < n {
        let env = detector.step(&mut state, buffer.mono_sample(i));

        if env >= limits.threshold {
            let length = limits.max_event.min(n - i);
            if length >= limits.min_event {
                let event = Event::new(i, length, limits.cut_for(length));
                log::debug!(
                    "Event at {}: length {}, cut {} (envelope {:.4})",
                    event.start,
                    event.length,
                    event.cut_len,
                    env
                );
                events.push(event);
                i += length;

                if limits.reset_on_skip {
                    state.reset();
                }
                continue;
            }
        }

        i += 1;
    }

    events
}
