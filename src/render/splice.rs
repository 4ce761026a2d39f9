// Splice renderer
// Rebuilds the audio with each event's center removed and the seam crossfaded

use crate::audio::SampleBuffer;
use crate::config::CutterParams;
use crate::events::Event;
use crate::units::{db_to_gain, ms_to_samples};

/// Sample-domain settings for one render pass
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpliceSettings {
    /// Upper bound on the seam crossfade, in samples (>= 1)
    pub xfade_samples: usize,

    /// Linear gain applied to retained event audio
    pub event_gain: f32,
}

impl SpliceSettings {
    /// Derive settings from (already clamped) parameters.
    /// The crossfade is capped at a quarter of the longest event.
    pub fn new(params: &CutterParams, sample_rate: f64) -> Self {
        let max_event = ms_to_samples(params.max_event_ms, sample_rate);
        let upper = (max_event / 4).max(1);

        SpliceSettings {
            xfade_samples: ms_to_samples(params.xfade_ms, sample_rate).clamp(1, upper),
            event_gain: db_to_gain(params.event_gain_db),
        }
    }
}

/// Events that will actually be rendered, in order
///
/// An event starting before the end of the previously rendered event is skipped
/// entirely, as is any event that does not fit inside `num_samples`.
pub fn plan_splices(events: &[Event], num_samples: usize) -> Vec<Event> {
    let mut cursor = 0;
    let mut plan = Vec::with_capacity(events.len());

    for event in events {
        if event.start < cursor {
            log::warn!(
                "Skipping event at {}: overlaps previous event ending at {}",
                event.start,
                cursor
            );
            continue;
        }
        if event.end() > num_samples || event.cut_len > event.length {
            log::warn!("Skipping malformed event {:?}", event);
            continue;
        }
        plan.push(*event);
        cursor = event.end();
    }

    plan
}

/// Output length for a plan: input length minus every rendered cut
pub fn spliced_len(num_samples: usize, plan: &[Event]) -> usize {
    num_samples - plan.iter().map(|e| e.cut_len).sum::<usize>()
}

/// Render the spliced output for every channel
///
/// Each channel receives identical edits. Audio outside events is copied
/// verbatim; retained event audio is scaled by `event_gain`.
pub fn render_splices(
    input: &SampleBuffer,
    events: &[Event],
    settings: &SpliceSettings,
) -> SampleBuffer {
    let n = input.num_samples();
    let plan = plan_splices(events, n);
    let out_len = spliced_len(n, &plan);

    let channels = input
        .channels()
        .iter()
        .map(|src| render_channel(src, &plan, settings, out_len))
        .collect();

    // Every channel is rendered from the same plan
    SampleBuffer::from_channels_unchecked(channels)
}

/// Render one channel from a validated plan
///
/// The seam blends the pre-cut tail `src[pre_end - xn..pre_end]` with
/// `src[post_start - xn..post_start]`, the last `xn` samples of the removed
/// window. Those samples reach the output through the crossfade, and the final
/// blended sample is `src[post_start - 1]`, so each event keeps exactly
/// `length - cut_len` samples.
fn render_channel(src: &[f32], plan: &[Event], settings: &SpliceSettings, out_len: usize) -> Vec<f32> {
    let gain = settings.event_gain;
    let mut dst = Vec::with_capacity(out_len);
    let mut cursor = 0;

    for event in plan {
        dst.extend_from_slice(&src[cursor..event.start]);

        // Pre-cut region gets the smaller half when the retained length is odd
        let keep_a = event.retained_len() / 2;
        let pre_end = event.start + keep_a;
        let post_start = pre_end + event.cut_len;
        let post_end = event.end();

        let xn = settings
            .xfade_samples
            .min(keep_a)
            .min(post_end - post_start);

        dst.extend(src[event.start..pre_end - xn].iter().map(|s| s * gain));

        // Fade from the pre-cut tail into the audio leading up to the post-cut region,
        // so the seam lands on src[post_start] and no extra samples are dropped.
        // xn == 0 leaves a hard seam.
        let denom = xn.saturating_sub(1).max(1) as f32;
        for k in 0..xn {
            let t = if xn > 1 { k as f32 / denom } else { 0.0 };
            let a = src[pre_end - xn + k];
            let b = src[post_start - xn + k];
            dst.push(((1.0 - t) * a + t * b) * gain);
        }

        dst.extend(src[post_start..post_end].iter().map(|s| s * gain));

        cursor = post_end;
    }

    dst.extend_from_slice(&src[cursor..]);
    debug_assert_eq!(dst.len(), out_len);
    dst
}
