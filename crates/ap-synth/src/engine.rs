use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use ap_core::profile::TherapyMode;
use ap_core::state::{GeneratorKind, Origin, SynthesisState};

use crate::error::SynthError;
use crate::output::{ActiveStream, AudioBackend, CpalBackend};
use crate::params::VoiceParams;
use crate::voice::{NOISE_GAIN, TONE_GAIN, VoiceSpec};

/// Two-state machine over the output audio graph: Idle or Active(mode).
///
/// At most one generator is live at any instant; starting a new mode drops
/// the previous stream before the next one is opened. Gains are fixed per
/// generator kind and not exposed — callers control loudness only through
/// mode selection.
///
/// # Example
/// ```
/// use ap_synth::engine::SynthesisEngine;
/// use ap_synth::output::NullBackend;
/// use ap_core::profile::TherapyMode;
/// use ap_core::state::Origin;
///
/// let mut engine = SynthesisEngine::with_backend(Box::new(NullBackend::new()), None);
/// engine.start_mode(40.0, TherapyMode::Focus, Origin::Manual).unwrap();
/// assert_eq!(engine.active_mode(), Some(TherapyMode::Focus));
/// engine.stop_mode();
/// assert_eq!(engine.active_mode(), None);
/// ```
pub struct SynthesisEngine {
    backend: Box<dyn AudioBackend>,
    noise_seed: Option<u64>,
    active: Option<Active>,
}

struct Active {
    mode: TherapyMode,
    origin: Origin,
    kind: GeneratorKind,
    gain: f32,
    params: Arc<VoiceParams>,
    _stream: Box<dyn ActiveStream>,
}

impl SynthesisEngine {
    /// Engine rendering through the default output device.
    #[must_use]
    pub fn new(noise_seed: Option<u64>) -> Self {
        Self::with_backend(Box::new(CpalBackend), noise_seed)
    }

    /// Engine with an injected backend (headless runs, tests).
    #[must_use]
    pub fn with_backend(backend: Box<dyn AudioBackend>, noise_seed: Option<u64>) -> Self {
        Self {
            backend,
            noise_seed,
            active: None,
        }
    }

    /// Start `mode` at `frequency`.
    ///
    /// Starting the mode that is already active is an idempotent no-op for
    /// the generator, even at a different frequency; a manual restart of an
    /// auto-engaged mode still claims it (`Origin::Auto` → `Origin::Manual`),
    /// so releasing auto sessions afterwards leaves it running. Otherwise the
    /// current generator is released first, then the new one is opened: never
    /// two live at once. `Anc` gets the filtered-noise generator; every other
    /// mode gets a sine tone.
    ///
    /// # Errors
    /// Returns an error if the output device cannot be opened; the engine
    /// stays idle in that case.
    pub fn start_mode(
        &mut self,
        frequency: f32,
        mode: TherapyMode,
        origin: Origin,
    ) -> Result<(), SynthError> {
        if let Some(a) = self.active.as_mut()
            && a.mode == mode
        {
            if origin == Origin::Manual && a.origin == Origin::Auto {
                log::info!("Mode {mode} déjà actif, session revendiquée manuellement");
                a.origin = Origin::Manual;
            } else {
                log::debug!("Mode {mode} déjà actif, start_mode ignoré");
            }
            return Ok(());
        }

        let frequency = sanitize_frequency(frequency);
        // Release the previous generator before opening the next one.
        self.active = None;

        let kind = match mode {
            TherapyMode::Anc => GeneratorKind::FilteredNoise,
            _ => GeneratorKind::Tone,
        };
        let gain = match kind {
            GeneratorKind::Tone => TONE_GAIN,
            GeneratorKind::FilteredNoise => NOISE_GAIN,
        };
        let spec = VoiceSpec {
            kind,
            frequency,
            noise_seed: self.noise_seed.unwrap_or_else(clock_seed),
        };
        let params = Arc::new(VoiceParams::new(frequency));
        let stream = self.backend.open(&spec, Arc::clone(&params))?;

        log::info!("Mode {mode} démarré @ {frequency} Hz ({kind:?}, origine {origin:?})");
        self.active = Some(Active {
            mode,
            origin,
            kind,
            gain,
            params,
            _stream: stream,
        });
        Ok(())
    }

    /// Smoothly migrate the masking filter toward `frequency`.
    ///
    /// Valid only while the active mode is `Anc`; otherwise a silent no-op.
    /// The render path approaches the target over a 2-second exponential,
    /// never an instantaneous jump.
    pub fn retune(&mut self, frequency: f32) {
        match &self.active {
            Some(a) if a.mode == TherapyMode::Anc => {
                a.params.set_target_center(sanitize_frequency(frequency));
            }
            _ => {}
        }
    }

    /// Release the active generator and return to Idle. No-op when idle.
    pub fn stop_mode(&mut self) {
        if let Some(a) = self.active.take() {
            log::info!("Mode {} arrêté", a.mode);
        }
    }

    /// Active therapy mode, `None` when idle.
    #[must_use]
    pub fn active_mode(&self) -> Option<TherapyMode> {
        self.active.as_ref().map(|a| a.mode)
    }

    /// Provenance of the active mode, `None` when idle.
    #[must_use]
    pub fn origin(&self) -> Option<Origin> {
        self.active.as_ref().map(|a| a.origin)
    }

    /// Observable snapshot of the engine.
    #[must_use]
    pub fn state(&self) -> SynthesisState {
        match &self.active {
            Some(a) => SynthesisState {
                active_mode: Some(a.mode),
                generator: Some(a.kind),
                gain: a.gain,
                filter_center: (a.kind == GeneratorKind::FilteredNoise)
                    .then(|| a.params.target_center()),
                origin: Some(a.origin),
            },
            None => SynthesisState::default(),
        }
    }
}

/// Clamp a requested frequency into the audible band; non-finite input falls
/// back to the universal grounding frequency.
fn sanitize_frequency(frequency: f32) -> f32 {
    if frequency.is_finite() {
        frequency.clamp(20.0, 20_000.0)
    } else {
        136.1
    }
}

/// Wall-clock seed for runs without a configured one.
fn clock_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_nanos() as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::NullBackend;

    fn engine_with_probe() -> (SynthesisEngine, NullBackend) {
        let probe = NullBackend::new();
        let engine = SynthesisEngine::with_backend(Box::new(probe.clone()), Some(1));
        (engine, probe)
    }

    fn start(engine: &mut SynthesisEngine, freq: f32, mode: TherapyMode, origin: Origin) {
        engine
            .start_mode(freq, mode, origin)
            .unwrap_or_else(|e| panic!("start_mode: {e}"));
    }

    #[test]
    fn same_mode_twice_is_idempotent() {
        let (mut engine, probe) = engine_with_probe();
        start(&mut engine, 440.0, TherapyMode::Anc, Origin::Manual);
        start(&mut engine, 880.0, TherapyMode::Anc, Origin::Manual);
        assert_eq!(probe.total_opened(), 1);
        assert_eq!(probe.live_streams(), 1);
        assert_eq!(engine.active_mode(), Some(TherapyMode::Anc));
    }

    #[test]
    fn new_mode_supersedes_the_old_one() {
        let (mut engine, probe) = engine_with_probe();
        start(&mut engine, 440.0, TherapyMode::Anc, Origin::Manual);
        start(&mut engine, 40.0, TherapyMode::Focus, Origin::Manual);
        assert_eq!(engine.active_mode(), Some(TherapyMode::Focus));
        assert_eq!(probe.total_opened(), 2);
        // No residual generator from the first mode.
        assert_eq!(probe.live_streams(), 1);
    }

    #[test]
    fn stop_releases_and_double_stop_is_a_noop() {
        let (mut engine, probe) = engine_with_probe();
        start(&mut engine, 528.0, TherapyMode::Stress, Origin::Manual);
        engine.stop_mode();
        assert_eq!(engine.active_mode(), None);
        assert_eq!(probe.live_streams(), 0);
        engine.stop_mode();
        assert_eq!(probe.live_streams(), 0);
    }

    #[test]
    fn anc_uses_filtered_noise_with_fixed_gain() {
        let (mut engine, _probe) = engine_with_probe();
        start(&mut engine, 440.0, TherapyMode::Anc, Origin::Manual);
        let state = engine.state();
        assert_eq!(state.generator, Some(GeneratorKind::FilteredNoise));
        assert!((state.gain - NOISE_GAIN).abs() < f32::EPSILON);
        assert_eq!(state.filter_center, Some(440.0));
    }

    #[test]
    fn other_modes_use_tones_with_fixed_gain() {
        let (mut engine, _probe) = engine_with_probe();
        for mode in [
            TherapyMode::Pain,
            TherapyMode::Focus,
            TherapyMode::Stress,
            TherapyMode::Earth,
        ] {
            start(&mut engine, 174.0, mode, Origin::Manual);
            let state = engine.state();
            assert_eq!(state.generator, Some(GeneratorKind::Tone));
            assert!((state.gain - TONE_GAIN).abs() < f32::EPSILON);
            assert_eq!(state.filter_center, None);
        }
    }

    #[test]
    fn retune_applies_only_to_anc() {
        let (mut engine, _probe) = engine_with_probe();
        start(&mut engine, 440.0, TherapyMode::Anc, Origin::Manual);
        engine.retune(880.0);
        assert_eq!(engine.state().filter_center, Some(880.0));

        start(&mut engine, 40.0, TherapyMode::Focus, Origin::Manual);
        engine.retune(880.0);
        assert_eq!(engine.state().filter_center, None);
    }

    #[test]
    fn retune_while_idle_is_a_noop() {
        let (mut engine, probe) = engine_with_probe();
        engine.retune(880.0);
        assert_eq!(probe.total_opened(), 0);
        assert_eq!(engine.active_mode(), None);
    }

    #[test]
    fn manual_restart_claims_an_auto_session() {
        let (mut engine, probe) = engine_with_probe();
        start(&mut engine, 174.0, TherapyMode::Pain, Origin::Auto);
        start(&mut engine, 174.0, TherapyMode::Pain, Origin::Manual);
        // Same generator, but the session now belongs to the user.
        assert_eq!(probe.total_opened(), 1);
        assert_eq!(engine.origin(), Some(Origin::Manual));
    }

    #[test]
    fn auto_restart_never_demotes_a_manual_session() {
        let (mut engine, probe) = engine_with_probe();
        start(&mut engine, 174.0, TherapyMode::Pain, Origin::Manual);
        start(&mut engine, 174.0, TherapyMode::Pain, Origin::Auto);
        assert_eq!(probe.total_opened(), 1);
        assert_eq!(engine.origin(), Some(Origin::Manual));
    }

    #[test]
    fn origin_is_tracked() {
        let (mut engine, _probe) = engine_with_probe();
        start(&mut engine, 174.0, TherapyMode::Pain, Origin::Auto);
        assert_eq!(engine.origin(), Some(Origin::Auto));
        start(&mut engine, 40.0, TherapyMode::Focus, Origin::Manual);
        assert_eq!(engine.origin(), Some(Origin::Manual));
        engine.stop_mode();
        assert_eq!(engine.origin(), None);
    }

    #[test]
    fn degenerate_frequencies_are_sanitized() {
        assert!((sanitize_frequency(f32::NAN) - 136.1).abs() < f32::EPSILON);
        assert!((sanitize_frequency(0.0) - 20.0).abs() < f32::EPSILON);
        assert!((sanitize_frequency(1e9) - 20_000.0).abs() < f32::EPSILON);
        assert!((sanitize_frequency(440.0) - 440.0).abs() < f32::EPSILON);
    }
}
