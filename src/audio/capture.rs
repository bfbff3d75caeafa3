use crate::config::AudioConfig;
use crate::error::{FirError, Result};
use audio_thread_priority::RtPriorityHandle;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use crossbeam_channel::{Sender, TrySendError};

use super::extract_channel;

/// Live input stream delivering the configured channel as mono f64 buffers
///
/// Buffers arrive at whatever size the device chooses; `BlockAssembler`
/// regroups them into filter blocks on the receiving side.
pub struct AudioCapture {
    stream: cpal::Stream,
    _rt_handle: Option<RtPriorityHandle>,
}

impl AudioCapture {
    pub fn new(config: &AudioConfig, tx: Sender<Vec<f64>>) -> Result<Self> {
        let channels = config.channels as usize;
        let channel = config.channel;
        if channel >= channels {
            return Err(FirError::Config(format!(
                "Input channel {} not available, device opened with {} channel(s)",
                channel, channels
            )));
        }

        let device = cpal::default_host()
            .default_input_device()
            .ok_or_else(|| FirError::AudioDevice("No input device found".into()))?;

        match device.description() {
            Ok(desc) => log::info!("Input device: {:?}", desc),
            Err(_) => log::info!("Input device: Unknown"),
        }
        log::info!(
            "Capturing channel {} of {} at {} Hz, {} sample blocks",
            channel,
            channels,
            config.sample_rate,
            config.block_size
        );

        let stream_config = cpal::StreamConfig {
            channels: config.channels,
            sample_rate: config.sample_rate,
            buffer_size: cpal::BufferSize::Fixed(config.block_size as u32),
        };

        let stream = device
            .build_input_stream(
                &stream_config,
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    match tx.try_send(extract_channel(data, channels, channel)) {
                        Ok(()) => {}
                        Err(TrySendError::Full(_)) => log::warn!(
                            "Filter falling behind input, dropped {} frames",
                            data.len() / channels
                        ),
                        Err(TrySendError::Disconnected(_)) => {}
                    }
                },
                |err| log::error!("Audio stream error: {}", err),
                None,
            )
            .map_err(|e| FirError::AudioStream(e.to_string()))?;

        let rt_handle = match audio_thread_priority::promote_current_thread_to_real_time(
            config.block_size as u32,
            config.sample_rate,
        ) {
            Ok(handle) => Some(handle),
            Err(e) => {
                log::warn!("Could not set real-time priority: {}", e);
                None
            }
        };

        stream
            .play()
            .map_err(|e| FirError::AudioStream(e.to_string()))?;

        Ok(Self {
            stream,
            _rt_handle: rt_handle,
        })
    }
}

impl Drop for AudioCapture {
    fn drop(&mut self) {
        if let Err(e) = self.stream.pause() {
            log::debug!("Failed to pause input stream: {}", e);
        }
    }
}
