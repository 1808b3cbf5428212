//! Stereo WAV reading and writing.

use anyhow::{Context, bail};
use hound::{SampleFormat, WavReader, WavWriter};
use std::path::Path;

/// Planar stereo audio.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StereoAudio {
    /// Left channel samples.
    pub left: Vec<f32>,
    /// Right channel samples.
    pub right: Vec<f32>,
    /// Sample rate in Hz.
    pub sample_rate: u32,
}

impl StereoAudio {
    /// Number of frames.
    pub fn len(&self) -> usize {
        self.left.len()
    }

    /// True when there are no frames.
    pub fn is_empty(&self) -> bool {
        self.left.is_empty()
    }

    /// Duration in seconds.
    pub fn duration_secs(&self) -> f32 {
        self.len() as f32 / self.sample_rate as f32
    }
}

/// Reads a WAV file as planar stereo.
///
/// Mono is duplicated to both channels; files with more than two channels
/// keep their first two.
pub fn read_stereo(path: &Path) -> anyhow::Result<StereoAudio> {
    let reader =
        WavReader::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    let spec = reader.spec();
    let channels = usize::from(spec.channels);
    if channels == 0 {
        bail!("{} has no channels", path.display());
    }

    let interleaved: Vec<f32> = match spec.sample_format {
        SampleFormat::Float => reader
            .into_samples::<f32>()
            .collect::<Result<Vec<_>, _>>()?,
        SampleFormat::Int => {
            let max_val = (1i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .into_samples::<i32>()
                .map(|s| s.map(|v| v as f32 / max_val))
                .collect::<Result<Vec<_>, _>>()?
        }
    };

    let (left, right) = if channels == 1 {
        (interleaved.clone(), interleaved)
    } else {
        interleaved
            .chunks_exact(channels)
            .map(|frame| (frame[0], frame[1]))
            .unzip()
    };

    Ok(StereoAudio {
        left,
        right,
        sample_rate: spec.sample_rate,
    })
}

/// Writes planar stereo audio.
///
/// 32-bit output is IEEE float; 16 and 24 bit are integer PCM with clipping.
pub fn write_stereo(path: &Path, audio: &StereoAudio, bits_per_sample: u16) -> anyhow::Result<()> {
    let spec = hound::WavSpec {
        channels: 2,
        sample_rate: audio.sample_rate,
        bits_per_sample,
        sample_format: match bits_per_sample {
            32 => SampleFormat::Float,
            16 | 24 => SampleFormat::Int,
            other => bail!("unsupported bit depth {other} (expected 16, 24 or 32)"),
        },
    };

    let mut writer = WavWriter::create(path, spec)
        .with_context(|| format!("failed to create {}", path.display()))?;
    let frames = audio.left.iter().zip(&audio.right);

    if bits_per_sample == 32 {
        for (&l, &r) in frames {
            writer.write_sample(l)?;
            writer.write_sample(r)?;
        }
    } else {
        let max_val = ((1i32 << (bits_per_sample - 1)) - 1) as f32;
        let quantize = |s: f32| (s.clamp(-1.0, 1.0) * max_val).round() as i32;
        for (&l, &r) in frames {
            writer.write_sample(quantize(l))?;
            writer.write_sample(quantize(r))?;
        }
    }

    writer.finalize()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mono_is_duplicated() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mono.wav");
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: 8000,
            bits_per_sample: 32,
            sample_format: SampleFormat::Float,
        };
        let mut writer = WavWriter::create(&path, spec).unwrap();
        for s in [0.1f32, -0.2, 0.3] {
            writer.write_sample(s).unwrap();
        }
        writer.finalize().unwrap();

        let audio = read_stereo(&path).unwrap();
        assert_eq!(audio.sample_rate, 8000);
        assert_eq!(audio.left, vec![0.1, -0.2, 0.3]);
        assert_eq!(audio.right, audio.left);
    }

    #[test]
    fn stereo_float_survives_write_and_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stereo.wav");
        let audio = StereoAudio {
            left: vec![0.5, 0.25, 0.0],
            right: vec![-0.5, -0.25, 1.0],
            sample_rate: 44100,
        };
        write_stereo(&path, &audio, 32).unwrap();
        assert_eq!(read_stereo(&path).unwrap(), audio);
    }

    #[test]
    fn pcm16_clips_out_of_range() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clip.wav");
        let audio = StereoAudio {
            left: vec![2.0],
            right: vec![-2.0],
            sample_rate: 8000,
        };
        write_stereo(&path, &audio, 16).unwrap();

        let back = read_stereo(&path).unwrap();
        assert!((back.left[0] - 1.0).abs() < 1e-3);
        assert!((back.right[0] + 1.0).abs() < 1e-3);
    }

    #[test]
    fn rejects_odd_bit_depth() {
        let dir = tempfile::tempdir().unwrap();
        let audio = StereoAudio {
            left: vec![0.0],
            right: vec![0.0],
            sample_rate: 8000,
        };
        assert!(write_stereo(&dir.path().join("x.wav"), &audio, 12).is_err());
    }
}
