use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crossbeam_channel::Receiver;
use hound::WavReader;

use super::{AudioCapture, BlockAssembler, extract_channel};
use crate::config::AudioConfig;

/// Yields mono f64 blocks of at most `AudioConfig::block_size` samples
pub trait AudioSource: Send {
    fn next_block(&mut self) -> anyhow::Result<Option<Vec<f64>>>;
    fn sample_rate(&self) -> u32;
}

pub struct DeviceSource {
    rx: Receiver<Vec<f64>>,
    assembler: BlockAssembler,
    sample_rate: u32,
    _capture: AudioCapture,
}

impl DeviceSource {
    pub fn new(config: &AudioConfig) -> anyhow::Result<Self> {
        let (tx, rx) = crossbeam_channel::bounded(10);
        let capture = AudioCapture::new(config, tx)?;
        Ok(Self {
            rx,
            assembler: BlockAssembler::new(config.block_size),
            sample_rate: config.sample_rate,
            _capture: capture,
        })
    }
}

impl AudioSource for DeviceSource {
    fn next_block(&mut self) -> anyhow::Result<Option<Vec<f64>>> {
        loop {
            if let Some(block) = self.assembler.pop_block() {
                return Ok(Some(block));
            }
            match self.rx.recv() {
                Ok(samples) => self.assembler.push(&samples),
                Err(_) => return Ok(self.assembler.flush()),
            }
        }
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }
}

/// Reads one channel of a WAV file into memory and serves it in blocks
pub struct WavFileSource {
    samples: Vec<f64>,
    position: usize,
    block_size: usize,
    sample_rate: u32,
}

impl WavFileSource {
    pub fn new<P: AsRef<Path>>(path: P, block_size: usize, channel: usize) -> anyhow::Result<Self> {
        let reader = WavReader::open(path.as_ref())?;
        let spec = reader.spec();

        if channel >= spec.channels as usize {
            anyhow::bail!(
                "Channel {} requested but WAV file has {} channel(s)",
                channel,
                spec.channels
            );
        }

        let sample_rate = spec.sample_rate;
        let interleaved = Self::read_samples(reader, &spec)?;
        let samples = extract_channel(&interleaved, spec.channels as usize, channel);

        Ok(Self {
            samples,
            position: 0,
            block_size,
            sample_rate,
        })
    }

    fn read_samples(
        mut reader: WavReader<BufReader<File>>,
        spec: &hound::WavSpec,
    ) -> anyhow::Result<Vec<f32>> {
        let samples = match spec.sample_format {
            hound::SampleFormat::Float => reader.samples::<f32>().collect::<Result<Vec<_>, _>>()?,
            hound::SampleFormat::Int => {
                let max_val = 2_i32.pow(spec.bits_per_sample as u32 - 1) as f32;
                reader
                    .samples::<i32>()
                    .map(|s| s.map(|v| v as f32 / max_val))
                    .collect::<Result<Vec<_>, _>>()?
            }
        };
        Ok(samples)
    }

    /// Total samples in the selected channel
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

impl AudioSource for WavFileSource {
    fn next_block(&mut self) -> anyhow::Result<Option<Vec<f64>>> {
        if self.position >= self.samples.len() {
            return Ok(None);
        }

        let end = (self.position + self.block_size).min(self.samples.len());
        let block = self.samples[self.position..end].to_vec();
        self.position = end;

        Ok(Some(block))
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hound::{SampleFormat, WavSpec, WavWriter};

    fn write_stereo(path: &Path, frames: usize) {
        let spec = WavSpec {
            channels: 2,
            sample_rate: 8000,
            bits_per_sample: 32,
            sample_format: SampleFormat::Float,
        };
        let mut writer = WavWriter::create(path, spec).unwrap();
        for i in 0..frames {
            writer.write_sample(i as f32).unwrap();
            writer.write_sample(-(i as f32)).unwrap();
        }
        writer.finalize().unwrap();
    }

    #[test]
    fn test_wav_source_selects_channel_and_blocks() {
        let path = std::env::temp_dir().join("firtap_source_test_stereo.wav");
        write_stereo(&path, 10);

        let mut source = WavFileSource::new(&path, 4, 1).unwrap();
        assert_eq!(source.sample_rate(), 8000);
        assert_eq!(source.len(), 10);

        let mut blocks = Vec::new();
        while let Some(block) = source.next_block().unwrap() {
            blocks.push(block);
        }
        assert_eq!(blocks.len(), 3);
        assert_eq!(blocks[0], vec![0.0, -1.0, -2.0, -3.0]);
        assert_eq!(blocks[2], vec![-8.0, -9.0]);

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_wav_source_rejects_missing_channel() {
        let path = std::env::temp_dir().join("firtap_source_test_channels.wav");
        write_stereo(&path, 2);
        assert!(WavFileSource::new(&path, 4, 2).is_err());
        std::fs::remove_file(&path).ok();
    }
}
