use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use rtrb::{Consumer, RingBuffer};

use crate::error::AudioError;

/// Microphone capture via cpal.
///
/// Downmixes the input callback to mono f32 and pushes into a lock-free
/// ring buffer (1 second of audio). The analysis tick drains the ring; the
/// cpal callback never blocks on it.
///
/// # Example
/// ```no_run
/// use ap_audio::capture::MicCapture;
/// let capture = MicCapture::open_default().unwrap();
/// ```
pub struct MicCapture {
    // Owned so dropping the capture releases the device.
    _stream: cpal::Stream,
    consumer: Consumer<f32>,
    sample_rate: u32,
}

impl MicCapture {
    /// Open the default input device and start capturing.
    ///
    /// # Errors
    /// `AudioError::NoInputDevice` when no input device exists,
    /// `AudioError::Unavailable` when access is denied or the stream fails.
    pub fn open_default() -> Result<Self, AudioError> {
        let host = cpal::default_host();
        let device = host
            .default_input_device()
            .ok_or(AudioError::NoInputDevice)?;

        let config = device
            .default_input_config()
            .map_err(|e| AudioError::Unavailable(e.to_string()))?;
        let sample_rate = config.sample_rate().0;
        let channels = config.channels() as usize;

        let (mut producer, consumer) = RingBuffer::new(sample_rate as usize);

        let stream = device
            .build_input_stream(
                &config.into(),
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    for chunk in data.chunks(channels) {
                        let mono: f32 = chunk.iter().sum::<f32>() / channels as f32;
                        let _ = producer.push(mono);
                    }
                },
                |err| {
                    log::error!("Erreur du flux d'entrée : {err}");
                },
                None,
            )
            .map_err(|e| AudioError::Unavailable(e.to_string()))?;

        stream
            .play()
            .map_err(|e| AudioError::Unavailable(e.to_string()))?;

        Ok(Self {
            _stream: stream,
            consumer,
            sample_rate,
        })
    }

    /// Drain every pending sample from the ring into `out`.
    ///
    /// Returns how many samples were appended.
    pub fn drain_into(&mut self, out: &mut Vec<f32>) -> usize {
        let mut count = 0;
        while let Ok(sample) = self.consumer.pop() {
            out.push(sample);
            count += 1;
        }
        count
    }

    /// The sample rate of the capture stream.
    #[must_use]
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }
}
