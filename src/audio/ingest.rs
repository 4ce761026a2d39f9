// Audio ingestion module
// Reads WAV files, extracts metadata, and normalizes audio samples

use hound::{SampleFormat, WavReader};
use std::fs::File;
use std::io::{BufReader, Cursor, Read};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::audio::SampleBuffer;

#[derive(Debug, Error)]
pub enum AudioError {
    #[error("Could not open {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read WAV file: {0}")]
    WavReadError(#[from] hound::Error),

    #[error("Unsupported audio format: {0}")]
    UnsupportedFormat(String),

    #[error("Invalid audio data")]
    InvalidData,
}

#[derive(Debug, Clone)]
pub struct AudioData {
    /// Audio samples normalized to f32 in range [-1.0, 1.0], one vector per channel
    pub buffer: SampleBuffer,

    /// Sample rate in Hz (e.g., 44100, 48000)
    pub sample_rate: u32,

    /// Bit depth of original audio (8, 16, 24, 32)
    pub bit_depth: u16,
}

impl AudioData {
    /// Total number of frames (samples per channel)
    pub fn frame_count(&self) -> usize {
        self.buffer.num_samples()
    }

    /// Get duration in seconds as f64
    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.frame_count() as f64 / self.sample_rate as f64
    }
}

/// Ingest a WAV file from raw bytes
/// Returns AudioData with normalized, de-interleaved samples and metadata
pub fn ingest_wav(data: &[u8]) -> Result<AudioData, AudioError> {
    read_wav(Cursor::new(data))
}

/// Load a WAV file from disk
pub fn load_audio_file(path: &Path) -> Result<AudioData, AudioError> {
    let file = File::open(path).map_err(|source| AudioError::Open {
        path: path.to_path_buf(),
        source,
    })?;

    let audio = read_wav(BufReader::new(file))?;

    log::info!(
        "Loaded {}: {} Hz, {} channels, {} bit, {:.2}s",
        path.display(),
        audio.sample_rate,
        audio.buffer.num_channels(),
        audio.bit_depth,
        audio.duration_secs()
    );

    Ok(audio)
}

fn read_wav<R: Read>(reader: R) -> Result<AudioData, AudioError> {
    let mut reader = WavReader::new(reader).map_err(|e| match e {
        // Anything without a RIFF/WAVE header is simply not a format we read
        hound::Error::FormatError(msg) => AudioError::UnsupportedFormat(msg.to_string()),
        other => AudioError::WavReadError(other),
    })?;

    let spec = reader.spec();
    let channels = spec.channels as usize;
    let bit_depth = spec.bits_per_sample;

    if channels == 0 || spec.sample_rate == 0 {
        return Err(AudioError::InvalidData);
    }

    // Read and normalize samples to f32 [-1.0, 1.0]
    let samples: Vec<f32> = match (spec.sample_format, bit_depth) {
        (SampleFormat::Int, 8) => {
            // hound already re-centers unsigned 8-bit data around zero
            reader
                .samples::<i32>()
                .collect::<Result<Vec<_>, _>>()?
                .into_iter()
                .map(|s| s as f32 / 128.0)
                .collect()
        }
        (SampleFormat::Int, 16) => reader
            .samples::<i16>()
            .collect::<Result<Vec<_>, _>>()?
            .into_iter()
            .map(|s| s as f32 / 32768.0)
            .collect(),
        (SampleFormat::Int, 24) => reader
            .samples::<i32>()
            .collect::<Result<Vec<_>, _>>()?
            .into_iter()
            .map(|s| s as f32 / 8388608.0)
            .collect(),
        (SampleFormat::Int, 32) => reader
            .samples::<i32>()
            .collect::<Result<Vec<_>, _>>()?
            .into_iter()
            .map(|s| s as f32 / 2147483648.0)
            .collect(),
        (SampleFormat::Float, 32) => reader.samples::<f32>().collect::<Result<Vec<_>, _>>()?,
        _ => {
            return Err(AudioError::UnsupportedFormat(format!(
                "{:?} {}-bit audio",
                spec.sample_format, bit_depth
            )));
        }
    };

    Ok(AudioData {
        buffer: SampleBuffer::from_interleaved(&samples, channels),
        sample_rate: spec.sample_rate,
        bit_depth,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use hound::{WavSpec, WavWriter};

    fn wav_bytes_16bit(channels: u16, interleaved: &[i16]) -> Vec<u8> {
        let spec = WavSpec {
            channels,
            sample_rate: 44100,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };
        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = WavWriter::new(&mut cursor, spec).unwrap();
            for &s in interleaved {
                writer.write_sample(s).unwrap();
            }
            writer.finalize().unwrap();
        }
        cursor.into_inner()
    }

    #[test]
    fn test_ingest_stereo_16bit() {
        let bytes = wav_bytes_16bit(2, &[16384, -16384, 0, 32767]);
        let audio = ingest_wav(&bytes).unwrap();

        assert_eq!(audio.sample_rate, 44100);
        assert_eq!(audio.bit_depth, 16);
        assert_eq!(audio.buffer.num_channels(), 2);
        assert_eq!(audio.frame_count(), 2);
        assert!((audio.buffer.channel(0)[0] - 0.5).abs() < 1e-6);
        assert!((audio.buffer.channel(1)[0] + 0.5).abs() < 1e-6);
        assert_eq!(audio.buffer.channel(0)[1], 0.0);
    }

    #[test]
    fn test_ingest_rejects_non_wav() {
        let result = ingest_wav(b"this is definitely not a riff wave file at all");
        assert!(matches!(result, Err(AudioError::UnsupportedFormat(_))));
    }

    #[test]
    fn test_load_missing_file() {
        let result = load_audio_file(Path::new("/nonexistent/dir/input.wav"));
        assert!(matches!(result, Err(AudioError::Open { .. })));
    }

    #[test]
    fn test_audio_data_duration_secs() {
        let audio = AudioData {
            buffer: SampleBuffer::from_mono(vec![0.0; 22050]),
            sample_rate: 44100,
            bit_depth: 16,
        };

        assert_eq!(audio.duration_secs(), 0.5);
    }
}
