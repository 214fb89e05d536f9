// Microphone capture, spectral analysis, and feature extraction for AuraPulse.

pub mod acquisition;
pub mod capture;
pub mod error;
pub mod features;
pub mod spectrum;

pub use acquisition::SignalAcquisition;
pub use error::AudioError;
