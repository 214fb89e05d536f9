use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// Source of uniform noise samples in [-1, 1].
///
/// The noise buffer behind the ANC voice is generated through this seam so
/// synthesis tests run on a fixed seed instead of wall-clock entropy.
///
/// # Example
/// ```
/// use ap_synth::noise::{NoiseSource, SeededNoise};
/// let mut noise = SeededNoise::new(7);
/// let mut buf = [0.0f32; 16];
/// noise.fill(&mut buf);
/// assert!(buf.iter().all(|s| (-1.0..=1.0).contains(s)));
/// ```
pub trait NoiseSource: Send {
    /// Fill `out` with uniform samples in [-1, 1].
    fn fill(&mut self, out: &mut [f32]);
}

/// Deterministic uniform noise backed by a seeded `SmallRng`.
pub struct SeededNoise {
    rng: SmallRng,
}

impl SeededNoise {
    /// Noise source reproducing the same stream for the same seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }
}

impl NoiseSource for SeededNoise {
    fn fill(&mut self, out: &mut [f32]) {
        for s in out {
            *s = self.rng.random::<f32>() * 2.0 - 1.0;
        }
    }
}
