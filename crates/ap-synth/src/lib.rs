// Therapeutic sound synthesis for AuraPulse: voices, filters, output backends.

pub mod biquad;
pub mod engine;
pub mod error;
pub mod noise;
pub mod output;
pub mod params;
pub mod voice;

pub use engine::SynthesisEngine;
pub use error::SynthError;
