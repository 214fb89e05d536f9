use std::sync::atomic::{AtomicU32, Ordering};

/// Parameter block shared with the real-time render path.
///
/// Control calls store new targets here; the render callback pulls them at
/// the start of each block. Lock-free, the render path never blocks on the
/// analysis loop.
///
/// # Example
/// ```
/// use ap_synth::params::VoiceParams;
/// let params = VoiceParams::new(440.0);
/// params.set_target_center(880.0);
/// assert_eq!(params.target_center(), 880.0);
/// ```
pub struct VoiceParams {
    target_center_bits: AtomicU32,
}

impl VoiceParams {
    /// Parameter block with an initial filter-center target.
    #[must_use]
    pub fn new(center: f32) -> Self {
        Self {
            target_center_bits: AtomicU32::new(center.to_bits()),
        }
    }

    /// Publish a new filter-center target for the render path.
    pub fn set_target_center(&self, center: f32) {
        self.target_center_bits
            .store(center.to_bits(), Ordering::Relaxed);
    }

    /// Latest published filter-center target, Hz.
    #[must_use]
    pub fn target_center(&self) -> f32 {
        f32::from_bits(self.target_center_bits.load(Ordering::Relaxed))
    }
}
