use hound::{WavSpec, WavWriter};

/// Write mono samples as a 32-bit float WAV file
pub fn save_wav(filename: &str, samples: &[f64], sample_rate: u32) -> Result<(), hound::Error> {
    let spec = WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    };

    let mut writer = WavWriter::create(filename, spec)?;

    for &sample in samples {
        writer.write_sample(sample as f32)?;
    }

    writer.finalize()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use hound::WavReader;

    #[test]
    fn test_save_wav_writes_mono_float() {
        let path = std::env::temp_dir().join("firtap_save_wav_test.wav");
        let filename = path.to_str().unwrap();
        save_wav(filename, &[0.5, -0.25, 0.0], 8000).unwrap();

        let mut reader = WavReader::open(&path).unwrap();
        assert_eq!(reader.spec().channels, 1);
        assert_eq!(reader.spec().sample_rate, 8000);
        let samples: Vec<f32> = reader.samples::<f32>().map(|s| s.unwrap()).collect();
        assert_eq!(samples, vec![0.5, -0.25, 0.0]);

        std::fs::remove_file(&path).ok();
    }
}
