// Envelope detector
// High-pass filter followed by an attack/release envelope follower.
// All running state lives in `DetectorState`; `DetectorSettings` is immutable per run.

use std::f64::consts::PI;

use crate::config::HPF_HZ_RANGE;
use crate::units::ms_to_samples;

/// Envelope attack time constant
pub const ATTACK_MS: f32 = 1.5;

/// Envelope release time constant
pub const RELEASE_MS: f32 = 25.0;

/// Butterworth Q factor (1/sqrt(2)) for maximally-flat magnitude response.
const BUTTERWORTH_Q: f64 = std::f64::consts::FRAC_1_SQRT_2;

/// Keep the cutoff safely under Nyquist for low sample rates
const MAX_CUTOFF_FRACTION: f64 = 0.45;

/// 2nd-order Butterworth high-pass coefficients, pre-normalized by a0.
///
/// Direct Form I:
///   y[n] = b0*x[n] + b1*x[n-1] + b2*x[n-2] - a1*y[n-1] - a2*y[n-2]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HighPassCoeffs {
    b0: f64,
    b1: f64,
    b2: f64,
    a1: f64,
    a2: f64,
}

impl HighPassCoeffs {
    pub fn new(cutoff_hz: f64, sample_rate: f64) -> Self {
        let cutoff = cutoff_hz.min(sample_rate * MAX_CUTOFF_FRACTION);
        let w0 = 2.0 * PI * cutoff / sample_rate;
        let cos_w0 = w0.cos();
        let sin_w0 = w0.sin();
        let alpha = sin_w0 / (2.0 * BUTTERWORTH_Q);

        let a0 = 1.0 + alpha;
        HighPassCoeffs {
            b0: (1.0 + cos_w0) / 2.0 / a0,
            b1: -(1.0 + cos_w0) / a0,
            b2: (1.0 + cos_w0) / 2.0 / a0,
            a1: -2.0 * cos_w0 / a0,
            a2: (1.0 - alpha) / a0,
        }
    }
}

/// Running detector state for one scan: filter memory plus the envelope value
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DetectorState {
    x1: f64,
    x2: f64,
    y1: f64,
    y2: f64,
    envelope: f32,
}

impl DetectorState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current envelope value (always >= 0)
    pub fn envelope(&self) -> f32 {
        self.envelope
    }

    /// Zero filter memory and envelope
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Fixed detector configuration derived from the sample rate and HPF cutoff
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DetectorSettings {
    high_pass: HighPassCoeffs,
    attack_coeff: f32,
    release_coeff: f32,
}

impl DetectorSettings {
    /// `hpf_hz` is clamped to the supported cutoff range.
    /// Callers guarantee `sample_rate > 0`.
    pub fn new(sample_rate: f64, hpf_hz: f32) -> Self {
        let cutoff = hpf_hz.clamp(HPF_HZ_RANGE.0, HPF_HZ_RANGE.1) as f64;

        DetectorSettings {
            high_pass: HighPassCoeffs::new(cutoff, sample_rate),
            attack_coeff: smoothing_coeff(ATTACK_MS, sample_rate),
            release_coeff: smoothing_coeff(RELEASE_MS, sample_rate),
        }
    }

    pub fn attack_coeff(&self) -> f32 {
        self.attack_coeff
    }

    pub fn release_coeff(&self) -> f32 {
        self.release_coeff
    }

    /// Advance the detector by one (channel-mixed) input sample and return the new envelope
    #[inline]
    pub fn step(&self, state: &mut DetectorState, input: f32) -> f32 {
        let hp = &self.high_pass;
        let x = input as f64;
        let y = hp.b0 * x + hp.b1 * state.x1 + hp.b2 * state.x2 - hp.a1 * state.y1 - hp.a2 * state.y2;
        state.x2 = state.x1;
        state.x1 = x;
        state.y2 = state.y1;
        state.y1 = y;

        let rectified = y.abs() as f32;
        let coeff = if rectified > state.envelope {
            self.attack_coeff
        } else {
            self.release_coeff
        };
        state.envelope = coeff * state.envelope + (1.0 - coeff) * rectified;
        state.envelope
    }
}

/// One-pole coefficient `exp(-1 / samples)` for a time constant in milliseconds
fn smoothing_coeff(time_ms: f32, sample_rate: f64) -> f32 {
    (-1.0 / ms_to_samples(time_ms, sample_rate) as f64).exp() as f32
}
