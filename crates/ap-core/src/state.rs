use crate::profile::TherapyMode;

/// Kind of signal generator backing an active mode.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GeneratorKind {
    /// Single continuous sine oscillator.
    Tone,
    /// Looping noise buffer through a bandpass filter.
    FilteredNoise,
}

/// Who started the currently active mode.
///
/// The auto-shield rule may only tear down a mode it started itself, so the
/// provenance is an explicit field rather than being inferred from call sites.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Origin {
    /// Explicit user command.
    Manual,
    /// Triggered by the auto-shield rule.
    Auto,
}

/// Observable snapshot of the synthesis engine.
///
/// Invariant: at most one mode is active at any instant; starting a new mode
/// supersedes any prior one.
///
/// # Example
/// ```
/// use ap_core::state::SynthesisState;
/// let state = SynthesisState::default();
/// assert!(state.active_mode.is_none());
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SynthesisState {
    /// Active therapy mode, `None` when idle.
    pub active_mode: Option<TherapyMode>,
    /// Generator kind behind the active mode.
    pub generator: Option<GeneratorKind>,
    /// Fixed output gain of the active generator (0.0 when idle).
    pub gain: f32,
    /// Current filter center target, Hz. Only set for filtered noise.
    pub filter_center: Option<f32>,
    /// Provenance of the active mode.
    pub origin: Option<Origin>,
}
