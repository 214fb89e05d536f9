use ap_audio::{AudioError, SignalAcquisition};
use ap_core::classifier;
use ap_core::config::EngineConfig;
use ap_core::profile::{Profile, TherapyMode};
use ap_core::reading::SensorSnapshot;
use ap_core::state::{Origin, SynthesisState};
use ap_synth::output::NullBackend;
use ap_synth::{SynthError, SynthesisEngine};

use crate::controller::Controller;

/// The collaborator API the UI layer talks to.
///
/// Wires acquisition, controller, and engine together while keeping each
/// the single owner of its own resources. All methods run on the caller's
/// thread; the engine's render path is fed through its own lock-free
/// parameter channel.
pub struct Session {
    acquisition: SignalAcquisition,
    engine: SynthesisEngine,
    controller: Controller,
}

impl Session {
    /// Build a session from the runtime config. `muted` swaps the output
    /// device for the headless backend.
    #[must_use]
    pub fn new(config: &EngineConfig, muted: bool) -> Self {
        let engine = if muted {
            SynthesisEngine::with_backend(Box::new(NullBackend::new()), config.noise_seed)
        } else {
            SynthesisEngine::new(config.noise_seed)
        };
        Self {
            acquisition: SignalAcquisition::new(config),
            engine,
            controller: Controller::new(config.shield_enabled),
        }
    }

    /// Start the microphone and the analysis tick. No-op when recording.
    ///
    /// # Errors
    /// `AudioError` when the device is denied or missing; the session stays
    /// in the not-recording state.
    pub fn start_sensors(&mut self) -> Result<(), AudioError> {
        self.acquisition.start()
    }

    /// Stop sensing, release the device, and reset the focus trend.
    pub fn stop_sensors(&mut self) {
        self.acquisition.stop();
        self.controller.reset_focus();
    }

    /// Latest sensor snapshot; zeros while stopped.
    pub fn snapshot(&mut self) -> SensorSnapshot {
        self.acquisition.snapshot()
    }

    /// `true` while the analysis tick runs.
    #[must_use]
    pub fn is_recording(&self) -> bool {
        self.acquisition.is_recording()
    }

    /// On-demand classification of the current environment.
    ///
    /// Without a live reading (sensors stopped or never started) this
    /// resolves to the Earth grounding fallback rather than an error.
    pub fn classify(&mut self) -> Profile {
        let snapshot = self.snapshot();
        if snapshot.is_recording {
            classifier::classify_reading(Some(&snapshot.reading()))
        } else {
            classifier::classify_reading(None)
        }
    }

    /// Manually start a therapy mode.
    ///
    /// # Errors
    /// Returns an error if the output device cannot be opened.
    pub fn start_frequency(&mut self, frequency: f32, mode: TherapyMode) -> Result<(), SynthError> {
        self.engine.start_mode(frequency, mode, Origin::Manual)
    }

    /// Forward a frequency to the live masking filter (ANC only).
    pub fn update_live_frequency(&mut self, frequency: f32) {
        self.engine.retune(frequency);
    }

    /// Stop any active mode. No-op when idle.
    pub fn stop_sound(&mut self) {
        self.engine.stop_mode();
    }

    /// Active therapy mode, `None` when idle.
    #[must_use]
    pub fn active_mode(&self) -> Option<TherapyMode> {
        self.engine.active_mode()
    }

    /// Observable synthesis state.
    #[must_use]
    pub fn synthesis_state(&self) -> SynthesisState {
        self.engine.state()
    }

    /// Arm or disarm the auto-shield.
    pub fn set_shield_enabled(&mut self, enabled: bool) {
        self.controller.set_shield_enabled(enabled, &mut self.engine);
    }

    /// `true` while the auto-shield is armed.
    #[must_use]
    pub fn shield_enabled(&self) -> bool {
        self.controller.shield_enabled()
    }

    /// Latest focus score, 0–100.
    #[must_use]
    pub fn focus_score(&self) -> u8 {
        self.controller.focus_score()
    }

    /// Volume trend history, oldest first.
    #[must_use]
    pub fn focus_history(&self) -> Vec<u8> {
        self.controller.focus_history().iter().collect()
    }

    /// One control iteration: re-evaluate the reactive rules against the
    /// latest snapshot and feed the focus estimator while recording.
    pub fn tick(&mut self) -> SensorSnapshot {
        let snapshot = self.acquisition.snapshot();
        self.controller.observe(&snapshot, &mut self.engine);
        if snapshot.is_recording {
            self.controller
                .focus_tick(snapshot.volume, std::time::Instant::now());
        }
        snapshot
    }
}

/// Human-readable band for a volume level, used in log lines.
#[must_use]
pub fn status_label(volume: u8, is_recording: bool) -> &'static str {
    if !is_recording {
        "Standby"
    } else if volume < 30 {
        "Optimal"
    } else if volume < 55 {
        "Elevated"
    } else {
        "Critical"
    }
}
