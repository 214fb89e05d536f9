use ap_core::state::GeneratorKind;

use crate::biquad::Bandpass;
use crate::noise::NoiseSource;

/// Fixed output gain of the sine oscillator.
pub const TONE_GAIN: f32 = 0.1;
/// Fixed output gain of the filtered-noise generator.
pub const NOISE_GAIN: f32 = 0.15;
/// Length of the looping noise buffer, seconds.
pub const NOISE_LOOP_SECS: f32 = 2.0;
/// Quality factor of the masking bandpass (wide, low-resonance passband).
pub const NOISE_Q: f32 = 0.5;
/// Time constant of the exponential retune approach, seconds.
pub const RETUNE_TAU_SECS: f32 = 2.0;

/// What to build when a mode starts.
#[derive(Clone, Copy, Debug)]
pub struct VoiceSpec {
    /// Generator kind for the mode.
    pub kind: GeneratorKind,
    /// Oscillator frequency or initial filter center, Hz.
    pub frequency: f32,
    /// Seed for the noise buffer (ignored by tones).
    pub noise_seed: u64,
}

/// A live signal generator. Pure DSP, device-independent.
///
/// Exactly one voice exists per active mode; the output backend owns it for
/// the lifetime of the stream.
pub enum Voice {
    /// Continuous sine oscillator.
    Tone(ToneVoice),
    /// Looping noise buffer through a retunable bandpass.
    FilteredNoise(NoiseVoice),
}

impl Voice {
    /// Build the voice for `spec` at the backend's sample rate.
    #[must_use]
    pub fn build(spec: &VoiceSpec, sample_rate: f32, noise: &mut dyn NoiseSource) -> Self {
        match spec.kind {
            GeneratorKind::Tone => Self::Tone(ToneVoice::new(spec.frequency, sample_rate)),
            GeneratorKind::FilteredNoise => {
                Self::FilteredNoise(NoiseVoice::new(spec.frequency, sample_rate, noise))
            }
        }
    }

    /// Generator kind of this voice.
    #[must_use]
    pub fn kind(&self) -> GeneratorKind {
        match self {
            Self::Tone(_) => GeneratorKind::Tone,
            Self::FilteredNoise(_) => GeneratorKind::FilteredNoise,
        }
    }

    /// Update the filter-center target. No-op for tones.
    pub fn set_target_center(&mut self, center: f32) {
        if let Self::FilteredNoise(noise) = self {
            noise.set_target_center(center);
        }
    }

    /// Render one interleaved block.
    pub fn render(&mut self, out: &mut [f32], channels: usize) {
        match self {
            Self::Tone(tone) => tone.render(out, channels),
            Self::FilteredNoise(noise) => noise.render(out, channels),
        }
    }
}

/// Single continuous sine oscillator, fixed gain 0.1.
pub struct ToneVoice {
    phase: f32,
    step: f32,
}

impl ToneVoice {
    /// Sine voice at `frequency` Hz.
    #[must_use]
    pub fn new(frequency: f32, sample_rate: f32) -> Self {
        Self {
            phase: 0.0,
            step: frequency / sample_rate,
        }
    }

    fn render(&mut self, out: &mut [f32], channels: usize) {
        for frame in out.chunks_mut(channels.max(1)) {
            let sample = (2.0 * std::f32::consts::PI * self.phase).sin() * TONE_GAIN;
            self.phase += self.step;
            if self.phase >= 1.0 {
                self.phase -= 1.0;
            }
            for slot in frame {
                *slot = sample;
            }
        }
    }
}

/// Looping 2-second noise buffer through a wide bandpass, fixed gain 0.15.
///
/// `set_target_center` never jumps: the filter center approaches the target
/// with a one-pole exponential over a 2-second time constant, which keeps
/// fast-moving peak-frequency input from producing audible artifacts.
pub struct NoiseVoice {
    buffer: Vec<f32>,
    pos: usize,
    filter: Bandpass,
    sample_rate: f32,
    center: f32,
    target: f32,
}

impl NoiseVoice {
    /// Noise voice with its bandpass centered at `center` Hz.
    #[must_use]
    pub fn new(center: f32, sample_rate: f32, noise: &mut dyn NoiseSource) -> Self {
        let mut buffer = vec![0.0f32; (sample_rate * NOISE_LOOP_SECS) as usize];
        noise.fill(&mut buffer);
        let filter = Bandpass::new(center, NOISE_Q, sample_rate);
        let center = filter.center();
        Self {
            buffer,
            pos: 0,
            filter,
            sample_rate,
            center,
            target: center,
        }
    }

    /// Retune target, approached smoothly during rendering.
    pub fn set_target_center(&mut self, center: f32) {
        self.target = center;
    }

    /// Smoothed center currently applied to the filter, Hz.
    #[must_use]
    pub fn center(&self) -> f32 {
        self.center
    }

    fn render(&mut self, out: &mut [f32], channels: usize) {
        let channels = channels.max(1);
        let frames = out.len() / channels;

        // One-pole approach of the filter center, once per block.
        let dt = frames as f32 / self.sample_rate;
        let k = 1.0 - (-dt / RETUNE_TAU_SECS).exp();
        self.center += (self.target - self.center) * k;
        if (self.center - self.filter.center()).abs() > 0.01 {
            self.filter.set_center(self.center);
        }

        for frame in out.chunks_mut(channels) {
            let x = self.buffer[self.pos];
            self.pos = (self.pos + 1) % self.buffer.len();
            let sample = self.filter.process(x) * NOISE_GAIN;
            for slot in frame {
                *slot = sample;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::noise::SeededNoise;

    const RATE: f32 = 48_000.0;

    fn rms(buf: &[f32]) -> f32 {
        (buf.iter().map(|s| s * s).sum::<f32>() / buf.len() as f32).sqrt()
    }

    #[test]
    fn tone_respects_fixed_gain() {
        let mut voice = ToneVoice::new(440.0, RATE);
        let mut out = vec![0.0f32; 4800];
        voice.render(&mut out, 1);
        let peak = out.iter().fold(0.0f32, |m, s| m.max(s.abs()));
        assert!(peak <= TONE_GAIN + 1e-4, "peak = {peak}");
        // Full-scale sine RMS is 1/sqrt(2); scaled by the gain.
        assert!((rms(&out) - TONE_GAIN / 2.0f32.sqrt()).abs() < 0.005);
    }

    #[test]
    fn tone_duplicates_across_channels() {
        let mut voice = ToneVoice::new(440.0, RATE);
        let mut out = vec![0.0f32; 512];
        voice.render(&mut out, 2);
        for frame in out.chunks(2) {
            assert!((frame[0] - frame[1]).abs() < f32::EPSILON);
        }
    }

    #[test]
    fn noise_buffer_spans_two_seconds() {
        let mut noise = SeededNoise::new(1);
        let voice = NoiseVoice::new(440.0, RATE, &mut noise);
        assert_eq!(voice.buffer.len(), (RATE * NOISE_LOOP_SECS) as usize);
    }

    #[test]
    fn noise_voice_is_deterministic_per_seed() {
        let render = |seed: u64| {
            let mut noise = SeededNoise::new(seed);
            let mut voice = NoiseVoice::new(440.0, RATE, &mut noise);
            let mut out = vec![0.0f32; 1024];
            voice.render(&mut out, 1);
            out
        };
        assert_eq!(render(7), render(7));
        assert_ne!(render(7), render(8));
    }

    #[test]
    fn retune_is_gradual_not_a_jump() {
        let mut noise = SeededNoise::new(3);
        let mut voice = NoiseVoice::new(200.0, RATE, &mut noise);
        voice.set_target_center(2000.0);

        // Render 0.5 s: well inside the 2 s time constant.
        let mut out = vec![0.0f32; 1024];
        let blocks = (RATE * 0.5 / 1024.0) as usize;
        for _ in 0..blocks {
            voice.render(&mut out, 1);
        }
        let mid = voice.center();
        assert!(mid > 250.0, "center barely moved: {mid}");
        assert!(mid < 1000.0, "center jumped: {mid}");

        // After several time constants the target is reached.
        let blocks = (RATE * 10.0 / 1024.0) as usize;
        for _ in 0..blocks {
            voice.render(&mut out, 1);
        }
        assert!((voice.center() - 2000.0).abs() < 50.0);
    }

    #[test]
    fn voice_build_matches_spec_kind() {
        use ap_core::state::GeneratorKind;
        let mut noise = SeededNoise::new(1);
        let tone = Voice::build(
            &VoiceSpec {
                kind: GeneratorKind::Tone,
                frequency: 528.0,
                noise_seed: 0,
            },
            RATE,
            &mut noise,
        );
        assert_eq!(tone.kind(), GeneratorKind::Tone);

        let masking = Voice::build(
            &VoiceSpec {
                kind: GeneratorKind::FilteredNoise,
                frequency: 440.0,
                noise_seed: 0,
            },
            RATE,
            &mut noise,
        );
        assert_eq!(masking.kind(), GeneratorKind::FilteredNoise);
    }
}
