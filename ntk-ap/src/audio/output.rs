//! cpal playback backend
//!
//! Plays the decoded advice file on an output device. The stream is built
//! on `start` and dropped on `stop`/`reset`; once the last frame has been
//! written the data callback reports completion for the session it was
//! started with.

use super::decoder::{decode_file, DecodedAudio};
use crate::backend::{BackendEvent, BackendEventSender, PlaybackBackend, PlaybackSession};
use crate::error::{Error, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, FromSample, SampleFormat, SizedSample, Stream, StreamConfig};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Error code reported when the output stream fails mid-playback
pub const STREAM_ERROR_CODE: i32 = -1;

/// Playback backend on top of a cpal output device
pub struct CpalBackend {
    device: Device,
    events: BackendEventSender,
    source: Option<PathBuf>,
    audio: Option<Arc<DecodedAudio>>,
    stream: Option<Stream>,
}

impl CpalBackend {
    /// List output device names
    pub fn list_devices() -> Result<Vec<String>> {
        let host = cpal::default_host();
        let devices = host
            .output_devices()
            .map_err(|e| Error::AudioOutput(format!("Failed to enumerate devices: {}", e)))?
            .filter_map(|device| device.name().ok())
            .collect();
        Ok(devices)
    }

    /// Open an output device, falling back to the default device when the
    /// requested one is missing
    pub fn new(device_name: Option<&str>, events: BackendEventSender) -> Result<Self> {
        let host = cpal::default_host();

        let found = match device_name {
            Some(name) => {
                let mut devices = host.output_devices().map_err(|e| {
                    Error::AudioOutput(format!("Failed to enumerate devices: {}", e))
                })?;
                let found = devices.find(|d| d.name().ok().as_deref() == Some(name));
                if found.is_none() {
                    warn!("Requested device '{}' not found, falling back to default device", name);
                }
                found
            }
            None => None,
        };

        let device = match found {
            Some(device) => device,
            None => host
                .default_output_device()
                .ok_or_else(|| Error::AudioOutput("No default output device found".to_string()))?,
        };

        info!(
            "Using audio device: {}",
            device.name().unwrap_or_else(|_| "unknown".to_string())
        );

        Ok(Self {
            device,
            events,
            source: None,
            audio: None,
            stream: None,
        })
    }

    /// Pick a stream config matching the source, or the device default
    fn stream_config(&self, audio: &DecodedAudio) -> Result<(StreamConfig, SampleFormat)> {
        let supported = self
            .device
            .supported_output_configs()
            .map_err(|e| Error::AudioOutput(format!("Failed to get device configs: {}", e)))?
            .find(|config| {
                config.channels() == audio.channels
                    && config.min_sample_rate().0 <= audio.sample_rate
                    && config.max_sample_rate().0 >= audio.sample_rate
            });

        if let Some(config) = supported {
            let sample_format = config.sample_format();
            let config = config
                .with_sample_rate(cpal::SampleRate(audio.sample_rate))
                .config();
            return Ok((config, sample_format));
        }

        let config = self
            .device
            .default_output_config()
            .map_err(|e| Error::AudioOutput(format!("Failed to get default config: {}", e)))?;
        warn!(
            "Device has no {} Hz / {} channel config, using {} Hz / {} channels",
            audio.sample_rate,
            audio.channels,
            config.sample_rate().0,
            config.channels()
        );
        Ok((config.config(), config.sample_format()))
    }

    fn build_stream<T>(
        &self,
        config: &StreamConfig,
        audio: Arc<DecodedAudio>,
        session: PlaybackSession,
    ) -> Result<Stream>
    where
        T: SizedSample + FromSample<f32>,
    {
        let out_channels = config.channels as usize;
        let src_channels = audio.channels as usize;
        let src_frames = audio.frames();
        // Source frames consumed per output frame
        let step = audio.sample_rate as f64 / config.sample_rate.0 as f64;
        let mut position = 0.0f64;

        let done = Arc::new(AtomicBool::new(false));
        let completed_tx = self.events.clone();
        let failed_tx = self.events.clone();

        self.device
            .build_output_stream(
                config,
                move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
                    for frame in data.chunks_mut(out_channels) {
                        let index = position as usize;
                        if index >= src_frames {
                            frame.fill(T::EQUILIBRIUM);
                            continue;
                        }
                        let base = index * src_channels;
                        for (channel, sample) in frame.iter_mut().enumerate() {
                            let src = base + channel.min(src_channels - 1);
                            *sample = T::from_sample(audio.samples[src].clamp(-1.0, 1.0));
                        }
                        position += step;
                    }

                    if position as usize >= src_frames && !done.swap(true, Ordering::SeqCst) {
                        let _ = completed_tx.send(BackendEvent::Completed { session });
                    }
                },
                move |err| {
                    error!("Audio stream error: {}", err);
                    let _ = failed_tx.send(BackendEvent::Failed {
                        session,
                        code: STREAM_ERROR_CODE,
                    });
                },
                None,
            )
            .map_err(|e| Error::AudioOutput(format!("Failed to build stream: {}", e)))
    }

    fn drop_stream(&mut self) {
        if self.stream.take().is_some() {
            debug!("Audio stream dropped");
        }
    }
}

impl PlaybackBackend for CpalBackend {
    fn reset(&mut self) {
        self.drop_stream();
        self.source = None;
        self.audio = None;
    }

    fn set_source(&mut self, path: &Path) -> Result<()> {
        if self.stream.is_some() {
            return Err(Error::Handoff(
                "Output stream still active, reset required".to_string(),
            ));
        }
        self.source = Some(path.to_path_buf());
        self.audio = None;
        Ok(())
    }

    fn prepare(&mut self) -> Result<()> {
        let path = self
            .source
            .as_deref()
            .ok_or_else(|| Error::Handoff("No source selected".to_string()))?;
        let audio = decode_file(path)?;
        if audio.frames() == 0 {
            return Err(Error::Decode(format!("No audio decoded from {}", path.display())));
        }
        self.audio = Some(Arc::new(audio));
        Ok(())
    }

    fn start(&mut self, session: PlaybackSession) -> Result<()> {
        let audio = self
            .audio
            .clone()
            .ok_or_else(|| Error::Handoff("Source not prepared".to_string()))?;
        let (config, sample_format) = self.stream_config(&audio)?;

        let stream = match sample_format {
            SampleFormat::F32 => self.build_stream::<f32>(&config, audio, session)?,
            SampleFormat::I16 => self.build_stream::<i16>(&config, audio, session)?,
            SampleFormat::U16 => self.build_stream::<u16>(&config, audio, session)?,
            sample_format => {
                return Err(Error::AudioOutput(format!(
                    "Unsupported sample format: {:?}",
                    sample_format
                )));
            }
        };

        stream
            .play()
            .map_err(|e| Error::AudioOutput(format!("Failed to start stream: {}", e)))?;
        self.stream = Some(stream);

        debug!("Playback {} started", session);
        Ok(())
    }

    fn stop(&mut self) {
        self.drop_stream();
    }
}
