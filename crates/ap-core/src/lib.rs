/// Shared data model, classifier, and configuration for AuraPulse.
///
/// This crate contains all types exchanged between the sensing, synthesis,
/// and control crates of the workspace.

pub mod classifier;
pub mod config;
pub mod error;
pub mod focus;
pub mod profile;
pub mod reading;
pub mod state;

pub use config::EngineConfig;
pub use error::CoreError;
pub use focus::{FocusHistory, focus_score};
pub use profile::{Profile, TherapyMode};
pub use reading::{BIN_COUNT, Reading, SensorSnapshot, SpectralFrame, WINDOW_SIZE};
pub use state::{GeneratorKind, Origin, SynthesisState};
