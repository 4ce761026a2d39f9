// Unit conversions shared by detection and rendering

/// Convert decibels to linear amplitude: `10^(dB/20)`
#[inline]
pub fn db_to_gain(db: f32) -> f32 {
    10.0f32.powf(db / 20.0)
}

/// Convert milliseconds to a sample count, never less than one sample
#[inline]
pub fn ms_to_samples(ms: f32, sample_rate: f64) -> usize {
    let samples = (ms as f64 * 0.001 * sample_rate).round();
    if samples.is_finite() && samples >= 1.0 {
        samples as usize
    } else {
        1
    }
}

/// Convert a sample index or count to milliseconds
#[inline]
pub fn samples_to_ms(samples: usize, sample_rate: f64) -> f64 {
    if sample_rate <= 0.0 {
        return 0.0;
    }
    samples as f64 * 1000.0 / sample_rate
}
