//! RIFF/WAVE encoding of rendered takes.

use std::{fs, path::Path};

use hound::{SampleFormat, WavSpec, WavWriter};

use crate::error::SynthResult;

/// Stereo 16-bit PCM at `sample_rate`.
pub fn stereo_spec(sample_rate: u32) -> WavSpec {
    WavSpec {
        channels: 2,
        sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    }
}

/// Write interleaved L/R frames to `path`, replacing any existing file.
pub fn write_stereo(path: &Path, frames: &[i16], sample_rate: u32) -> SynthResult<()> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }

    let mut writer = WavWriter::create(path, stereo_spec(sample_rate))?;
    for &s in frames {
        writer.write_sample(s)?;
    }
    writer.finalize()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use hound::WavReader;

    #[test]
    fn header_and_samples_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("take.wav");
        write_stereo(&path, &[0, 0, 1000, 1000, -1000, -1000], 22_050).unwrap();

        let reader = WavReader::open(&path).unwrap();
        let spec = reader.spec();
        assert_eq!(spec.channels, 2);
        assert_eq!(spec.bits_per_sample, 16);
        assert_eq!(spec.sample_rate, 22_050);
        assert_eq!(reader.duration(), 3);
        let samples: Vec<i16> = reader.into_samples().map(|s| s.unwrap()).collect();
        assert_eq!(samples, vec![0, 0, 1000, 1000, -1000, -1000]);
    }

    #[test]
    fn unwritable_destination_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        // a directory where the file should be
        let path = dir.path().join("take.wav");
        fs::create_dir(&path).unwrap();
        assert!(write_stereo(&path, &[0, 0], 44_100).is_err());
    }
}
