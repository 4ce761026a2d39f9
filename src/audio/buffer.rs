// Multichannel sample storage
// Per-channel contiguous f32 arrays shared by ingest, detection, rendering and export

use crate::audio::AudioError;

/// Owned multichannel audio, one contiguous `Vec<f32>` per channel
/// All channels always hold the same number of samples
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SampleBuffer {
    channels: Vec<Vec<f32>>,
}

impl SampleBuffer {
    /// Create a buffer from per-channel vectors
    /// Fails if the channels differ in length
    pub fn new(channels: Vec<Vec<f32>>) -> Result<Self, AudioError> {
        if let Some(first) = channels.first() {
            let len = first.len();
            if channels.iter().any(|ch| ch.len() != len) {
                return Err(AudioError::InvalidData);
            }
        }
        Ok(SampleBuffer { channels })
    }

    /// Build from channels already known to share one length
    pub(crate) fn from_channels_unchecked(channels: Vec<Vec<f32>>) -> Self {
        debug_assert!(
            channels.windows(2).all(|pair| pair[0].len() == pair[1].len()),
            "channel lengths differ"
        );
        SampleBuffer { channels }
    }

    /// Single-channel buffer
    pub fn from_mono(samples: Vec<f32>) -> Self {
        SampleBuffer {
            channels: vec![samples],
        }
    }

    /// De-interleave `[c0, c1, ..., c0, c1, ...]` into per-channel vectors
    /// A trailing partial frame is dropped
    pub fn from_interleaved(samples: &[f32], num_channels: usize) -> Self {
        if num_channels == 0 {
            return SampleBuffer::default();
        }

        let frames = samples.len() / num_channels;
        let mut channels: Vec<Vec<f32>> = (0..num_channels)
            .map(|_| Vec::with_capacity(frames))
            .collect();

        for frame in samples.chunks_exact(num_channels) {
            for (ch, &s) in frame.iter().enumerate() {
                channels[ch].push(s);
            }
        }

        SampleBuffer { channels }
    }

    /// Interleave back into a single vector (frame-major)
    pub fn to_interleaved(&self) -> Vec<f32> {
        let frames = self.num_samples();
        let mut out = Vec::with_capacity(frames * self.num_channels());
        for i in 0..frames {
            for ch in &self.channels {
                out.push(ch[i]);
            }
        }
        out
    }

    pub fn num_channels(&self) -> usize {
        self.channels.len()
    }

    /// Number of samples per channel
    pub fn num_samples(&self) -> usize {
        self.channels.first().map(|c| c.len()).unwrap_or(0)
    }

    /// True when there are no channels or no samples
    pub fn is_empty(&self) -> bool {
        self.num_channels() == 0 || self.num_samples() == 0
    }

    /// Read access to one channel; panics if `index` is out of range
    pub fn channel(&self, index: usize) -> &[f32] {
        &self.channels[index]
    }

    pub fn channels(&self) -> &[Vec<f32>] {
        &self.channels
    }

    /// Channel-averaged sample at `index`
    #[inline]
    pub fn mono_sample(&self, index: usize) -> f32 {
        let mut sum = 0.0f32;
        for ch in &self.channels {
            sum += ch[index];
        }
        sum * (1.0 / self.channels.len().max(1) as f32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_mismatched_channels() {
        let result = SampleBuffer::new(vec![vec![0.0; 4], vec![0.0; 3]]);
        assert!(matches!(result, Err(AudioError::InvalidData)));
    }

    #[test]
    fn test_interleave_round_trip() {
        // [L, R, L, R, L, R]
        let interleaved = vec![0.1, 0.2, 0.3, 0.4, 0.5, 0.6];
        let buffer = SampleBuffer::from_interleaved(&interleaved, 2);

        assert_eq!(buffer.num_channels(), 2);
        assert_eq!(buffer.num_samples(), 3);
        assert_eq!(buffer.channel(0), &[0.1, 0.3, 0.5]);
        assert_eq!(buffer.channel(1), &[0.2, 0.4, 0.6]);
        assert_eq!(buffer.to_interleaved(), interleaved);
    }

    #[test]
    fn test_from_interleaved_drops_partial_frame() {
        let buffer = SampleBuffer::from_interleaved(&[1.0, 2.0, 3.0], 2);
        assert_eq!(buffer.num_samples(), 1);
    }

    #[test]
    fn test_mono_sample_averages_channels() {
        let buffer = SampleBuffer::from_interleaved(&[0.1, 0.2, 0.3, 0.4, 0.5, 0.6], 2);

        assert!((buffer.mono_sample(0) - 0.15).abs() < 1e-6);
        assert!((buffer.mono_sample(2) - 0.55).abs() < 1e-6);
    }

    #[test]
    fn test_from_channels_unchecked_keeps_channels() {
        let buffer = SampleBuffer::from_channels_unchecked(vec![vec![1.0, 2.0], vec![3.0, 4.0]]);

        assert_eq!(buffer.num_channels(), 2);
        assert_eq!(buffer.channel(1), &[3.0, 4.0]);
    }

    #[test]
    fn test_is_empty() {
        assert!(SampleBuffer::default().is_empty());
        assert!(SampleBuffer::new(vec![vec![], vec![]]).unwrap().is_empty());
        assert!(!SampleBuffer::from_mono(vec![0.0]).is_empty());
    }
}
