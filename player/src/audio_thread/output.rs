//! Threaded audio output combining ring buffer and generation thread
//!
//! This is the public interface for audio playback.

use std::sync::{Arc, Condvar, Mutex};
use std::time::Instant;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{FromSample, SizedSample};
use ringbuf::traits::{Consumer, Split};
use ringbuf::{HeapCons, HeapProd, HeapRb};
use tracing::{debug, error, info, warn};
use waterfall_core::{Command, PlaybackSnapshot, Session};

use super::handle::AudioGenHandle;
use super::metrics::RING_BUFFER_CAPACITY;
use super::sink::{NullSink, SampleSink};
use super::thread::AudioGenThread;

/// Audio device setup failures
///
/// Never fatal to a session: the player falls back to video-only mode.
#[derive(Debug, thiserror::Error)]
pub enum AudioError {
    #[error("no audio output device available")]
    NoDevice,

    #[error("failed to get default output config: {0}")]
    DefaultConfig(#[from] cpal::DefaultStreamConfigError),

    #[error("failed to build audio stream: {0}")]
    BuildStream(#[from] cpal::BuildStreamError),

    #[error("failed to play audio stream: {0}")]
    PlayStream(#[from] cpal::PlayStreamError),

    #[error("unsupported sample format: {0:?}")]
    UnsupportedFormat(cpal::SampleFormat),
}

type Signal = Arc<(Mutex<bool>, Condvar)>;

/// A playing cpal stream and the producer half of the ring feeding it
struct DeviceStream {
    stream: cpal::Stream,
    producer: HeapProd<f32>,
    condvar: Signal,
    sample_rate: u32,
}

/// Threaded audio output
///
/// Owns the generation thread (and through it the session) plus the cpal
/// stream when a device is available.
pub struct ThreadedAudioOutput {
    gen_handle: AudioGenHandle,

    /// The cpal stream, kept alive for the session. `None` in video-only mode.
    _stream: Option<cpal::Stream>,

    sample_rate: u32,
}

impl ThreadedAudioOutput {
    /// Open the default output device and start generating
    ///
    /// On any device failure a warning is logged and the session continues in
    /// video-only mode.
    pub fn new(mut session: Session) -> Self {
        match open_device() {
            Ok(device) => {
                session.set_sample_rate(device.sample_rate);
                let gen_handle = AudioGenThread::spawn(
                    SampleSink::Ring(device.producer),
                    session,
                    device.condvar,
                );
                info!("Audio output started at {}Hz", device.sample_rate);
                Self {
                    gen_handle,
                    _stream: Some(device.stream),
                    sample_rate: device.sample_rate,
                }
            }
            Err(e) => {
                warn!("Failed to create audio output: {}. Audio disabled.", e);
                Self::video_only(session)
            }
        }
    }

    /// Drive the session from a paced null sink
    ///
    /// The sink discards every sample, so the session keeps its own mute
    /// state and the cursor still moves in real time.
    pub fn video_only(session: Session) -> Self {
        let sample_rate = session.sample_rate();
        let sink = SampleSink::Null(NullSink::new(sample_rate, Instant::now()));
        let condvar = Arc::new((Mutex::new(false), Condvar::new()));
        let gen_handle = AudioGenThread::spawn(sink, session, condvar);
        info!("Video-only mode at nominal {}Hz", sample_rate);
        Self {
            gen_handle,
            _stream: None,
            sample_rate,
        }
    }

    /// Queue a command for the generation thread
    ///
    /// Returns true if the command was queued, false if dropped.
    pub fn send(&self, command: Command) -> bool {
        self.gen_handle.send(command)
    }

    pub fn snapshot(&self) -> PlaybackSnapshot {
        self.gen_handle.snapshot()
    }

    /// Output (or nominal) sample rate
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn is_video_only(&self) -> bool {
        self._stream.is_none()
    }

    /// Check if the audio thread is still running
    pub fn is_alive(&self) -> bool {
        self.gen_handle.is_alive()
    }
}

fn open_device() -> Result<DeviceStream, AudioError> {
    let host = cpal::default_host();
    let device = host.default_output_device().ok_or(AudioError::NoDevice)?;
    let supported = device.default_output_config()?;
    let sample_rate = supported.sample_rate().0;
    let sample_format = supported.sample_format();

    // The session renders interleaved stereo
    let mut config: cpal::StreamConfig = supported.into();
    config.channels = 2;

    let ring = HeapRb::<f32>::new(RING_BUFFER_CAPACITY);
    let (producer, consumer) = ring.split();
    let condvar: Signal = Arc::new((Mutex::new(false), Condvar::new()));

    let stream = match sample_format {
        cpal::SampleFormat::F32 => build_stream::<f32>(&device, &config, consumer, &condvar)?,
        cpal::SampleFormat::I16 => build_stream::<i16>(&device, &config, consumer, &condvar)?,
        cpal::SampleFormat::U16 => build_stream::<u16>(&device, &config, consumer, &condvar)?,
        other => return Err(AudioError::UnsupportedFormat(other)),
    };
    stream.play()?;

    debug!(
        "Audio stream {:?} {}ch at {}Hz",
        sample_format, config.channels, sample_rate
    );

    Ok(DeviceStream {
        stream,
        producer,
        condvar,
        sample_rate,
    })
}

/// Output stream that pops f32 samples from the ring and converts them
///
/// Missing samples are filled with the format's silence. The generation
/// thread is woken after every callback.
fn build_stream<T>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    mut consumer: HeapCons<f32>,
    condvar: &Signal,
) -> Result<cpal::Stream, AudioError>
where
    T: SizedSample + FromSample<f32> + Send + 'static,
{
    let condvar = condvar.clone();
    // Pre-allocated so the callback never allocates in steady state
    let mut scratch: Vec<f32> = vec![0.0; 4096];
    let stream = device.build_output_stream(
        config,
        move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
            if scratch.len() < data.len() {
                scratch.resize(data.len(), 0.0);
            }
            let popped = consumer.pop_slice(&mut scratch[..data.len()]);
            for (out, &sample) in data.iter_mut().zip(&scratch[..popped]) {
                *out = T::from_sample(sample.clamp(-1.0, 1.0));
            }
            data[popped..].fill(T::EQUILIBRIUM);

            let (_lock, cvar) = &*condvar;
            cvar.notify_one();
        },
        |err| error!("Audio stream error: {}", err),
        None,
    )?;
    Ok(stream)
}
