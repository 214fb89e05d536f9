use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};

use crate::error::SynthError;
use crate::noise::SeededNoise;
use crate::params::VoiceParams;
use crate::voice::{Voice, VoiceSpec};

/// Handle on a live output stream. Dropping it releases the stream.
pub trait ActiveStream {}

/// Opens output streams for the synthesis engine.
///
/// The engine talks to the audio device only through this seam, so the state
/// machine is testable without hardware (`NullBackend`) and `--muted` runs
/// stay silent.
pub trait AudioBackend {
    /// Open a stream rendering the voice described by `spec`.
    ///
    /// The backend builds the voice at its own sample rate and hands `params`
    /// to the render path as the only control channel.
    ///
    /// # Errors
    /// Returns an error if no output device is available.
    fn open(
        &mut self,
        spec: &VoiceSpec,
        params: Arc<VoiceParams>,
    ) -> Result<Box<dyn ActiveStream>, SynthError>;
}

/// Default output device via cpal.
pub struct CpalBackend;

struct CpalStream {
    _stream: cpal::Stream,
}

impl ActiveStream for CpalStream {}

impl AudioBackend for CpalBackend {
    fn open(
        &mut self,
        spec: &VoiceSpec,
        params: Arc<VoiceParams>,
    ) -> Result<Box<dyn ActiveStream>, SynthError> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or(SynthError::NoOutputDevice)?;

        let config = device
            .default_output_config()
            .map_err(|e| SynthError::Unavailable(e.to_string()))?
            .config();
        let sample_rate = config.sample_rate.0 as f32;
        let channels = config.channels as usize;

        let mut noise = SeededNoise::new(spec.noise_seed);
        let mut voice = Voice::build(spec, sample_rate, &mut noise);

        let stream = device
            .build_output_stream(
                &config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    voice.set_target_center(params.target_center());
                    voice.render(data, channels);
                },
                |err| {
                    log::error!("Erreur du flux de sortie : {err}");
                },
                None,
            )
            .map_err(|e| SynthError::Unavailable(e.to_string()))?;

        stream
            .play()
            .map_err(|e| SynthError::Unavailable(e.to_string()))?;

        log::debug!(
            "Flux de sortie ouvert @ {sample_rate} Hz, {channels} canaux ({:?})",
            spec.kind
        );
        Ok(Box::new(CpalStream { _stream: stream }))
    }
}

/// Headless backend: builds the voice, opens no device.
///
/// Used by `--muted` runs and by tests asserting how many generators are
/// alive at once. Clones share the same counters, so a test can keep one
/// clone while the engine owns the other.
#[derive(Clone, Default)]
pub struct NullBackend {
    opened: Arc<AtomicUsize>,
    live: Arc<AtomicUsize>,
}

struct NullStream {
    live: Arc<AtomicUsize>,
}

impl ActiveStream for NullStream {}

impl Drop for NullStream {
    fn drop(&mut self) {
        self.live.fetch_sub(1, Ordering::SeqCst);
    }
}

impl NullBackend {
    /// Fresh headless backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// How many streams were ever opened.
    #[must_use]
    pub fn total_opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    /// How many streams are currently alive.
    #[must_use]
    pub fn live_streams(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }
}

impl AudioBackend for NullBackend {
    fn open(
        &mut self,
        spec: &VoiceSpec,
        _params: Arc<VoiceParams>,
    ) -> Result<Box<dyn ActiveStream>, SynthError> {
        // Build the voice anyway: a bad spec should fail the same way here
        // as against real hardware.
        let mut noise = SeededNoise::new(spec.noise_seed);
        let _ = Voice::build(spec, 48_000.0, &mut noise);

        self.opened.fetch_add(1, Ordering::SeqCst);
        self.live.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(NullStream {
            live: Arc::clone(&self.live),
        }))
    }
}
