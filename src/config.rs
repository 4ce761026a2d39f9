// Cutter parameters
// User-facing parameter set, documented ranges, and JSON preset files

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Errors that can occur while loading a parameter preset
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid parameter file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Recognized range for each user-facing parameter (min, max)
pub const THRESHOLD_DB_RANGE: (f32, f32) = (-60.0, -10.0);
pub const HPF_HZ_RANGE: (f32, f32) = (2000.0, 12000.0);
pub const MAX_EVENT_MS_RANGE: (f32, f32) = (20.0, 200.0);
pub const MAX_CUT_MS_RANGE: (f32, f32) = (0.0, 80.0);
pub const CUT_AMOUNT_RANGE: (f32, f32) = (0.0, 1.0);
pub const XFADE_MS_RANGE: (f32, f32) = (0.5, 15.0);
pub const EVENT_GAIN_DB_RANGE: (f32, f32) = (-24.0, 0.0);

/// Parameters for one detection + splice run
///
/// Out-of-range values are never rejected; [`CutterParams::clamped`] pulls them
/// into the documented ranges before processing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CutterParams {
    /// Envelope level that opens an event (dB)
    pub threshold_db: f32,

    /// High-pass cutoff applied before envelope detection (Hz)
    pub hpf_hz: f32,

    /// Shortest event that is kept (ms). Not exposed on the command line.
    pub min_event_ms: f32,

    /// Longest event; also the length every event opens with (ms)
    pub max_event_ms: f32,

    /// Upper bound on the window removed from each event (ms)
    pub max_cut_ms: f32,

    /// Fraction of `max_cut_ms` actually removed [0.0, 1.0]
    pub cut_amount: f32,

    /// Crossfade across the splice seam (ms)
    pub xfade_ms: f32,

    /// Gain applied to the retained audio of each event (dB)
    pub event_gain_db: f32,

    /// Reset the detector when the scan jumps past a committed event.
    /// Off by default: filter and envelope carry over from the event's first sample.
    pub reset_detector_on_skip: bool,
}

impl Default for CutterParams {
    fn default() -> Self {
        CutterParams {
            threshold_db: -32.0,
            hpf_hz: 6000.0,
            min_event_ms: 18.0,
            max_event_ms: 90.0,
            max_cut_ms: 28.0,
            cut_amount: 0.55,
            xfade_ms: 4.0,
            event_gain_db: -6.0,
            reset_detector_on_skip: false,
        }
    }
}

/// Clamp into `range`, falling back to `default` for NaN/infinite input
fn clamp_or(value: f32, range: (f32, f32), default: f32) -> f32 {
    if value.is_finite() {
        value.clamp(range.0, range.1)
    } else {
        default
    }
}

impl CutterParams {
    pub fn with_threshold_db(mut self, db: f32) -> Self {
        self.threshold_db = db;
        self
    }

    pub fn with_hpf_hz(mut self, hz: f32) -> Self {
        self.hpf_hz = hz;
        self
    }

    pub fn with_min_event_ms(mut self, ms: f32) -> Self {
        self.min_event_ms = ms;
        self
    }

    pub fn with_max_event_ms(mut self, ms: f32) -> Self {
        self.max_event_ms = ms;
        self
    }

    pub fn with_max_cut_ms(mut self, ms: f32) -> Self {
        self.max_cut_ms = ms;
        self
    }

    pub fn with_cut_amount(mut self, amount: f32) -> Self {
        self.cut_amount = amount;
        self
    }

    pub fn with_xfade_ms(mut self, ms: f32) -> Self {
        self.xfade_ms = ms;
        self
    }

    pub fn with_event_gain_db(mut self, db: f32) -> Self {
        self.event_gain_db = db;
        self
    }

    pub fn with_reset_detector_on_skip(mut self, reset: bool) -> Self {
        self.reset_detector_on_skip = reset;
        self
    }

    /// Copy of these parameters with every field inside its documented range
    pub fn clamped(&self) -> Self {
        let defaults = CutterParams::default();

        let min_event_ms = if self.min_event_ms.is_finite() {
            self.min_event_ms.max(0.0)
        } else {
            defaults.min_event_ms
        };

        let clamped = CutterParams {
            threshold_db: clamp_or(self.threshold_db, THRESHOLD_DB_RANGE, defaults.threshold_db),
            hpf_hz: clamp_or(self.hpf_hz, HPF_HZ_RANGE, defaults.hpf_hz),
            min_event_ms,
            max_event_ms: clamp_or(self.max_event_ms, MAX_EVENT_MS_RANGE, defaults.max_event_ms),
            max_cut_ms: clamp_or(self.max_cut_ms, MAX_CUT_MS_RANGE, defaults.max_cut_ms),
            cut_amount: clamp_or(self.cut_amount, CUT_AMOUNT_RANGE, defaults.cut_amount),
            xfade_ms: clamp_or(self.xfade_ms, XFADE_MS_RANGE, defaults.xfade_ms),
            event_gain_db: clamp_or(self.event_gain_db, EVENT_GAIN_DB_RANGE, defaults.event_gain_db),
            reset_detector_on_skip: self.reset_detector_on_skip,
        };

        if clamped != *self {
            log::warn!("Parameters adjusted into supported ranges: {:?}", clamped);
        }

        clamped
    }

    /// Deserialize parameters from JSON bytes
    /// Missing fields take their defaults, unknown fields are ignored
    pub fn from_json_bytes(data: &[u8]) -> Result<Self, ConfigError> {
        Ok(serde_json::from_slice(data)?)
    }

    /// Load a JSON parameter preset from disk
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let data = std::fs::read(path)?;
        Self::from_json_bytes(&data)
    }

    /// Serialize to pretty-printed JSON
    pub fn to_json_pretty(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
