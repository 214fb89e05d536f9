use std::time::{Duration, Instant};

use ap_core::focus::{FocusHistory, focus_score};
use ap_core::profile::TherapyMode;
use ap_core::reading::SensorSnapshot;
use ap_core::state::Origin;
use ap_synth::SynthesisEngine;

/// Volume above which the auto-shield engages relief.
const SHIELD_TRIGGER_VOLUME: u8 = 60;
/// Frequency of the auto-engaged relief tone, Hz.
const SHIELD_RELIEF_HZ: f32 = 174.0;
/// Cadence of the focus estimator.
const FOCUS_PERIOD: Duration = Duration::from_secs(1);

/// Reactive glue between the Reading stream and the synthesis engine.
///
/// Owns no audio resources. Two rules are re-evaluated on every snapshot:
///
/// - **Auto-shield**: shield on, engine idle, volume above threshold →
///   start 174 Hz Pain relief marked `Origin::Auto`. Shield off while the
///   auto-engaged mode runs → stop it. A manually started mode is never
///   torn down by this rule.
/// - **Live retune**: active mode is ANC → forward the latest peak
///   frequency to the engine.
///
/// The focus estimator runs on its own 1 Hz cadence, independent of the
/// Reading tick.
pub struct Controller {
    shield_enabled: bool,
    focus: FocusHistory,
    score: u8,
    last_focus: Option<Instant>,
}

impl Controller {
    /// Controller with the shield initially on or off.
    #[must_use]
    pub fn new(shield_enabled: bool) -> Self {
        Self {
            shield_enabled,
            focus: FocusHistory::new(),
            score: 100,
            last_focus: None,
        }
    }

    /// Re-evaluate both reactive rules against the latest snapshot.
    pub fn observe(&mut self, snapshot: &SensorSnapshot, engine: &mut SynthesisEngine) {
        if self.shield_enabled {
            if engine.active_mode().is_none()
                && snapshot.volume > SHIELD_TRIGGER_VOLUME
                && let Err(e) = engine.start_mode(SHIELD_RELIEF_HZ, TherapyMode::Pain, Origin::Auto)
            {
                log::warn!("Auto-shield : démarrage impossible : {e}");
            }
        } else {
            Self::release_auto_mode(engine);
        }

        if engine.active_mode() == Some(TherapyMode::Anc) {
            engine.retune(snapshot.peak_frequency);
        }
    }

    /// Toggle the shield. Disabling it immediately releases an auto-engaged
    /// mode without waiting for the next snapshot.
    pub fn set_shield_enabled(&mut self, enabled: bool, engine: &mut SynthesisEngine) {
        self.shield_enabled = enabled;
        if !enabled {
            Self::release_auto_mode(engine);
        }
    }

    /// `true` while the auto-shield is armed.
    #[must_use]
    pub fn shield_enabled(&self) -> bool {
        self.shield_enabled
    }

    /// Stop the active mode only if the shield started it.
    fn release_auto_mode(engine: &mut SynthesisEngine) {
        if engine.origin() == Some(Origin::Auto) {
            engine.stop_mode();
        }
    }

    /// Focus estimator tick. Accepts at most one sample per second; returns
    /// `true` when the sample was taken.
    pub fn focus_tick(&mut self, volume: u8, now: Instant) -> bool {
        match self.last_focus {
            Some(last) if now.duration_since(last) < FOCUS_PERIOD => false,
            _ => {
                self.last_focus = Some(now);
                self.focus.push(volume);
                self.score = focus_score(volume);
                true
            }
        }
    }

    /// Reset the focus subsystem (sensing stopped).
    pub fn reset_focus(&mut self) {
        self.focus.reset();
        self.score = 100;
        self.last_focus = None;
    }

    /// Latest focus score, 0–100.
    #[must_use]
    pub fn focus_score(&self) -> u8 {
        self.score
    }

    /// Volume trend history, oldest first.
    #[must_use]
    pub fn focus_history(&self) -> &FocusHistory {
        &self.focus
    }
}
