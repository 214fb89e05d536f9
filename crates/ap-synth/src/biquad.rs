/// RBJ bandpass filter with constant 0 dB peak gain.
///
/// Coefficients follow the Audio EQ Cookbook; state is transposed
/// direct-form II. `set_center` recomputes coefficients without clearing the
/// state, so retuning never clicks.
///
/// # Example
/// ```
/// use ap_synth::biquad::Bandpass;
/// let mut filter = Bandpass::new(440.0, 0.5, 48_000.0);
/// let y = filter.process(1.0);
/// assert!(y.is_finite());
/// ```
#[derive(Clone, Debug)]
pub struct Bandpass {
    sample_rate: f32,
    q: f32,
    center: f32,
    b0: f32,
    b1: f32,
    b2: f32,
    a1: f32,
    a2: f32,
    z1: f32,
    z2: f32,
}

impl Bandpass {
    /// Bandpass centered at `center` Hz with quality factor `q`.
    #[must_use]
    pub fn new(center: f32, q: f32, sample_rate: f32) -> Self {
        let mut filter = Self {
            sample_rate,
            q: q.max(0.01),
            center: 0.0,
            b0: 0.0,
            b1: 0.0,
            b2: 0.0,
            a1: 0.0,
            a2: 0.0,
            z1: 0.0,
            z2: 0.0,
        };
        filter.set_center(center);
        filter
    }

    /// Move the center frequency, keeping the filter state.
    pub fn set_center(&mut self, center: f32) {
        // Keep the center strictly inside (0, Nyquist).
        let nyquist = self.sample_rate * 0.5;
        self.center = center.clamp(1.0, nyquist * 0.95);

        let w0 = 2.0 * std::f32::consts::PI * self.center / self.sample_rate;
        let alpha = w0.sin() / (2.0 * self.q);
        let cos_w0 = w0.cos();
        let a0 = 1.0 + alpha;

        self.b0 = alpha / a0;
        self.b1 = 0.0;
        self.b2 = -alpha / a0;
        self.a1 = -2.0 * cos_w0 / a0;
        self.a2 = (1.0 - alpha) / a0;
    }

    /// Current center frequency, Hz (after clamping).
    #[must_use]
    pub fn center(&self) -> f32 {
        self.center
    }

    /// Filter one sample.
    #[inline]
    pub fn process(&mut self, x: f32) -> f32 {
        let y = self.b0 * x + self.z1;
        self.z1 = self.b1 * x - self.a1 * y + self.z2;
        self.z2 = self.b2 * x - self.a2 * y;
        y
    }
}
