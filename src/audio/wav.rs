//! WAV decoding into 16 kHz mono samples for transcription.

use crate::defaults::SAMPLE_RATE;
use crate::error::{ForgeError, Result};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

fn decode_error(context: &str, e: hound::Error) -> ForgeError {
    ForgeError::AudioDecode {
        message: format!("{}: {}", context, e),
    }
}

/// Decode WAV data from any reader.
///
/// Supports arbitrary sample rates and channel counts, 16-bit or wider
/// integer samples and 32-bit float samples. The result is always 16 kHz mono.
pub fn load_wav<R: Read>(reader: R) -> Result<Vec<i16>> {
    let mut wav_reader =
        hound::WavReader::new(reader).map_err(|e| decode_error("Failed to parse WAV data", e))?;

    let spec = wav_reader.spec();
    if spec.channels == 0 {
        return Err(ForgeError::AudioDecode {
            message: "WAV data declares zero channels".to_string(),
        });
    }

    let raw_samples: Vec<i16> = match (spec.sample_format, spec.bits_per_sample) {
        (hound::SampleFormat::Int, bits) if bits <= 16 => wav_reader
            .samples::<i16>()
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| decode_error("Failed to read WAV samples", e))?,
        (hound::SampleFormat::Int, bits) => {
            let shift = u32::from(bits) - 16;
            wav_reader
                .samples::<i32>()
                .map(|s| s.map(|v| (v >> shift) as i16))
                .collect::<std::result::Result<Vec<_>, _>>()
                .map_err(|e| decode_error("Failed to read WAV samples", e))?
        }
        (hound::SampleFormat::Float, _) => wav_reader
            .samples::<f32>()
            .map(|s| s.map(|v| (v.clamp(-1.0, 1.0) * i16::MAX as f32) as i16))
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| decode_error("Failed to read WAV samples", e))?,
    };

    let mono = downmix(&raw_samples, spec.channels);
    Ok(resample(&mono, spec.sample_rate, SAMPLE_RATE))
}

/// Decode a WAV file from disk.
pub fn load_wav_file(path: &Path) -> Result<Vec<i16>> {
    let file = File::open(path).map_err(|e| ForgeError::AudioDecode {
        message: format!("Failed to open {}: {}", path.display(), e),
    })?;
    load_wav(BufReader::new(file))
}

/// Average interleaved channels into one.
fn downmix(samples: &[i16], channels: u16) -> Vec<i16> {
    if channels <= 1 {
        return samples.to_vec();
    }
    let channels = usize::from(channels);
    samples
        .chunks_exact(channels)
        .map(|frame| {
            let sum: i32 = frame.iter().map(|&s| i32::from(s)).sum();
            (sum / channels as i32) as i16
        })
        .collect()
}

/// Simple linear interpolation resampling.
fn resample(samples: &[i16], from_rate: u32, to_rate: u32) -> Vec<i16> {
    if from_rate == to_rate || samples.is_empty() {
        return samples.to_vec();
    }

    let ratio = from_rate as f64 / to_rate as f64;
    let output_len = (samples.len() as f64 / ratio).ceil() as usize;

    (0..output_len)
        .map(|i| {
            let source_pos = i as f64 * ratio;
            let source_idx = (source_pos.floor() as usize).min(samples.len() - 1);
            let fraction = source_pos - source_idx as f64;

            if source_idx + 1 >= samples.len() {
                samples[source_idx]
            } else {
                let left = samples[source_idx] as f64;
                let right = samples[source_idx + 1] as f64;
                (left + (right - left) * fraction) as i16
            }
        })
        .collect()
}

/// Convert i16 PCM to the f32 range whisper expects.
pub fn to_f32(samples: &[i16]) -> Vec<f32> {
    samples.iter().map(|&s| s as f32 / 32768.0).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn make_wav_data(sample_rate: u32, channels: u16, samples: &[i16]) -> Vec<u8> {
        let mut cursor = Cursor::new(Vec::new());
        let spec = hound::WavSpec {
            channels,
            sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::new(&mut cursor, spec).unwrap();
        for &s in samples {
            writer.write_sample(s).unwrap();
        }
        writer.finalize().unwrap();
        cursor.into_inner()
    }

    #[test]
    fn mono_16khz_passes_through() {
        let input = vec![100i16, 200, 300, 400, 500];
        let samples = load_wav(Cursor::new(make_wav_data(16000, 1, &input))).unwrap();
        assert_eq!(samples, input);
    }

    #[test]
    fn stereo_is_downmixed() {
        let stereo = vec![100i16, 200, 300, 400, 500, 600];
        let samples = load_wav(Cursor::new(make_wav_data(16000, 2, &stereo))).unwrap();
        assert_eq!(samples, vec![150i16, 350, 550]);
    }

    #[test]
    fn resamples_48khz_to_16khz() {
        let input = vec![0i16; 48000];
        let samples = load_wav(Cursor::new(make_wav_data(48000, 1, &input))).unwrap();
        assert!(samples.len() >= 15900 && samples.len() <= 16100);
    }

    #[test]
    fn resampling_keeps_levels() {
        let input = vec![1000i16; 44100];
        let samples = load_wav(Cursor::new(make_wav_data(44100, 1, &input))).unwrap();
        assert!(samples.len() >= 15900 && samples.len() <= 16100);
        assert!(samples.iter().all(|&s| (900..=1100).contains(&s)));
    }

    #[test]
    fn float_samples_are_scaled() {
        let mut cursor = Cursor::new(Vec::new());
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: 16000,
            bits_per_sample: 32,
            sample_format: hound::SampleFormat::Float,
        };
        let mut writer = hound::WavWriter::new(&mut cursor, spec).unwrap();
        for s in [0.0f32, 0.5, -1.0] {
            writer.write_sample(s).unwrap();
        }
        writer.finalize().unwrap();

        let samples = load_wav(Cursor::new(cursor.into_inner())).unwrap();
        assert_eq!(samples[0], 0);
        assert!((16000..=16400).contains(&samples[1]));
        assert_eq!(samples[2], -i16::MAX);
    }

    #[test]
    fn garbage_is_decode_error() {
        let result = load_wav(Cursor::new(b"definitely not a wav".to_vec()));
        assert!(matches!(result, Err(ForgeError::AudioDecode { .. })));
    }

    #[test]
    fn missing_file_is_decode_error() {
        let result = load_wav_file(Path::new("/nonexistent/audio.wav"));
        assert!(matches!(result, Err(ForgeError::AudioDecode { .. })));
    }

    #[test]
    fn to_f32_normalizes() {
        assert_eq!(to_f32(&[0, -32768]), vec![0.0, -1.0]);
    }
}
