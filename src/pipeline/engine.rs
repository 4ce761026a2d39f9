// Cutter engine
// Validates input, then runs detection + segmentation followed by the splice render

use thiserror::Error;

use crate::audio::SampleBuffer;
use crate::config::CutterParams;
use crate::events::{segment_events, DetectorSettings, Event, SegmentLimits};
use crate::render::{render_splices, SpliceSettings};

/// Errors that can occur while processing a buffer
#[derive(Debug, Error, PartialEq)]
pub enum ProcessError {
    #[error("Empty audio.")]
    EmptyInput,

    #[error("Invalid sample rate: {0}")]
    InvalidSampleRate(f64),
}

/// Result of one processing run
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessOutput {
    /// Spliced audio, same channel count as the input
    pub buffer: SampleBuffer,

    /// Detected events in ascending start order
    pub events: Vec<Event>,
}

impl ProcessOutput {
    /// Total samples removed per channel
    pub fn samples_removed(&self) -> usize {
        self.events.iter().map(|e| e.cut_len).sum()
    }
}

/// Detect events in `input` and return the spliced audio
///
/// Parameters are clamped into their supported ranges first. The input is
/// never modified; all detector state is local to this call.
pub fn process(
    input: &SampleBuffer,
    sample_rate: f64,
    params: &CutterParams,
) -> Result<ProcessOutput, ProcessError> {
    if input.is_empty() {
        return Err(ProcessError::EmptyInput);
    }
    if !sample_rate.is_finite() || sample_rate <= 0.0 {
        return Err(ProcessError::InvalidSampleRate(sample_rate));
    }

    let params = params.clamped();
    let detector = DetectorSettings::new(sample_rate, params.hpf_hz);
    let limits = SegmentLimits::new(&params, sample_rate);
    let splice = SpliceSettings::new(&params, sample_rate);

    log::debug!(
        "Cutter settings: threshold {:.5}, events {}..{} samples, cut {}, xfade {}, gain {:.4}",
        limits.threshold,
        limits.min_event,
        limits.max_event,
        limits.base_cut,
        splice.xfade_samples,
        splice.event_gain
    );

    let events = segment_events(input, &detector, &limits);
    let buffer = render_splices(input, &events, &splice);

    let output = ProcessOutput { buffer, events };
    log::info!(
        "Processed {} samples x {} channels: {} events, {} samples removed",
        input.num_samples(),
        input.num_channels(),
        output.events.len(),
        output.samples_removed()
    );

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{plan_splices, spliced_len};

    const SR: f64 = 48000.0;

    /// One second of silence with a 40 ms full-scale burst at sample 10000
    fn scenario_input() -> Vec<f32> {
        let mut samples = vec![0.0f32; 48000];
        for k in 0..1920 {
            samples[10000 + k] = if k % 2 == 0 { 1.0 } else { -1.0 };
        }
        samples
    }

    fn scenario_params() -> CutterParams {
        CutterParams::default()
            .with_threshold_db(-32.0)
            .with_hpf_hz(6000.0)
            .with_max_event_ms(90.0)
            .with_max_cut_ms(28.0)
            .with_cut_amount(0.55)
            .with_xfade_ms(4.0)
            .with_event_gain_db(0.0)
    }

    #[test]
    fn test_scenario_single_event_with_reset() {
        let samples = scenario_input();
        let input = SampleBuffer::from_mono(samples.clone());
        let params = scenario_params().with_reset_detector_on_skip(true);

        let output = process(&input, SR, &params).unwrap();

        assert_eq!(output.events.len(), 1);
        let e = output.events[0];
        assert!(e.start >= 10000 && e.start < 10010, "start {}", e.start);
        assert_eq!(e.length, 4320);
        assert_eq!(e.cut_len, 739);

        let out = output.buffer.channel(0);
        assert_eq!(out.len(), 48000 - 739);
        // Audio outside the event is bit-identical
        assert_eq!(&out[..e.start], &samples[..e.start]);
        assert_eq!(&out[e.end() - e.cut_len..], &samples[e.end()..]);
    }

    #[test]
    fn test_scenario_with_carried_state() {
        let samples = scenario_input();
        let input = SampleBuffer::from_mono(samples.clone());

        let output = process(&input, SR, &scenario_params()).unwrap();

        assert!(!output.events.is_empty());
        let first = output.events[0];
        assert!(first.start >= 10000 && first.start < 10010);

        let plan = plan_splices(&output.events, 48000);
        assert_eq!(plan, output.events);
        assert_eq!(output.buffer.num_samples(), spliced_len(48000, &plan));
        assert_eq!(output.buffer.num_samples(), 48000 - output.samples_removed());
        assert_eq!(&output.buffer.channel(0)[..first.start], &samples[..first.start]);

        for e in &output.events {
            assert!(e.length >= 864 && e.length <= 4320);
            assert!(e.cut_len + 2 <= e.length);
        }
    }

    #[test]
    fn test_silence_is_unchanged() {
        let input = SampleBuffer::new(vec![vec![0.0; 24000], vec![0.0; 24000]]).unwrap();
        let output = process(&input, SR, &CutterParams::default()).unwrap();

        assert!(output.events.is_empty());
        assert_eq!(output.buffer, input);
    }

    #[test]
    fn test_empty_input_is_rejected() {
        let no_channels = SampleBuffer::default();
        assert_eq!(
            process(&no_channels, SR, &CutterParams::default()),
            Err(ProcessError::EmptyInput)
        );

        let no_samples = SampleBuffer::from_mono(Vec::new());
        let err = process(&no_samples, SR, &CutterParams::default()).unwrap_err();
        assert_eq!(err, ProcessError::EmptyInput);
        assert_eq!(err.to_string(), "Empty audio.");
    }

    #[test]
    fn test_invalid_sample_rate() {
        let input = SampleBuffer::from_mono(vec![0.0; 100]);
        assert!(matches!(
            process(&input, 0.0, &CutterParams::default()),
            Err(ProcessError::InvalidSampleRate(_))
        ));
        assert!(matches!(
            process(&input, f64::NAN, &CutterParams::default()),
            Err(ProcessError::InvalidSampleRate(_))
        ));
    }

    #[test]
    fn test_event_gain_halves_retained_audio() {
        let samples = scenario_input();
        let input = SampleBuffer::from_mono(samples.clone());
        let params = scenario_params()
            .with_event_gain_db(-6.0206)
            .with_reset_detector_on_skip(true);

        let output = process(&input, SR, &params).unwrap();
        let e = output.events[0];
        let out = output.buffer.channel(0);

        // keep_a = (4320 - 739) / 2, minus the 192-sample crossfade
        let keep_a = e.retained_len() / 2;
        for i in e.start..e.start + keep_a - 192 {
            assert!((out[i] - 0.5 * samples[i]).abs() < 1e-4, "sample {}", i);
        }
        // Post-cut region follows the crossfade
        let post_out = e.start + keep_a;
        let post_src = e.start + keep_a + e.cut_len;
        for k in 0..(e.end() - post_src) {
            assert!((out[post_out + k] - 0.5 * samples[post_src + k]).abs() < 1e-4);
        }
    }

    #[test]
    fn test_unit_gain_keeps_retained_audio() {
        let samples = scenario_input();
        let input = SampleBuffer::from_mono(samples.clone());
        let params = scenario_params().with_reset_detector_on_skip(true);

        let output = process(&input, SR, &params).unwrap();
        let e = output.events[0];
        let out = output.buffer.channel(0);

        assert_eq!(&out[e.start..e.start + 100], &samples[e.start..e.start + 100]);
    }

    #[test]
    fn test_stereo_channels_edited_together() {
        let left = scenario_input();
        let right: Vec<f32> = left.iter().map(|s| s * 0.5).collect();
        let input = SampleBuffer::new(vec![left, right]).unwrap();
        let params = scenario_params().with_reset_detector_on_skip(true);

        let output = process(&input, SR, &params).unwrap();

        assert_eq!(output.buffer.num_channels(), 2);
        assert_eq!(output.events.len(), 1);
        assert_eq!(output.buffer.num_samples(), 48000 - output.samples_removed());
        for (l, r) in output.buffer.channel(0).iter().zip(output.buffer.channel(1)) {
            assert!((l * 0.5 - r).abs() < 1e-6);
        }
    }

    #[test]
    fn test_out_of_range_params_are_clamped() {
        let input = SampleBuffer::from_mono(scenario_input());
        let params = scenario_params()
            .with_hpf_hz(50.0)
            .with_max_event_ms(5000.0)
            .with_reset_detector_on_skip(true);

        let output = process(&input, SR, &params).unwrap();

        // max event clamps to 200 ms
        assert!(output.events.iter().all(|e| e.length <= 9600));
    }

    #[test]
    fn test_input_not_modified() {
        let input = SampleBuffer::from_mono(scenario_input());
        let copy = input.clone();
        let _ = process(&input, SR, &scenario_params()).unwrap();
        assert_eq!(input, copy);
    }
}
