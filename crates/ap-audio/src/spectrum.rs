use ap_core::reading::{BIN_COUNT, SpectralFrame, WINDOW_SIZE};
use realfft::RealFftPlanner;

/// Floor of the byte intensity mapping, dBFS.
const MIN_DB: f32 = -100.0;
/// Ceiling of the byte intensity mapping, dBFS.
const MAX_DB: f32 = -30.0;

/// Windowed real FFT producing byte-intensity spectral frames.
///
/// Pre-allocates the FFT plan, scratch buffers, and Hann window for a
/// zero-allocation hot path. The window size is fixed at 256 samples,
/// giving 128 magnitude bins per frame.
///
/// # Example
/// ```
/// use ap_audio::spectrum::SpectrumAnalyzer;
/// use ap_core::reading::WINDOW_SIZE;
///
/// let mut analyzer = SpectrumAnalyzer::new();
/// let silence = vec![0.0f32; WINDOW_SIZE];
/// let frame = analyzer.process(&silence);
/// assert!(frame.bins.iter().all(|&b| b == 0));
/// ```
pub struct SpectrumAnalyzer {
    input_buf: Vec<f32>,
    spectrum_buf: Vec<realfft::num_complex::Complex<f32>>,
    scratch: Vec<realfft::num_complex::Complex<f32>>,
    plan: std::sync::Arc<dyn realfft::RealToComplex<f32>>,
    /// Hann window coefficients.
    window: Vec<f32>,
}

impl Default for SpectrumAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl SpectrumAnalyzer {
    /// Create an analyzer with the fixed 256-sample window.
    #[must_use]
    pub fn new() -> Self {
        let mut planner = RealFftPlanner::<f32>::new();
        let plan = planner.plan_fft_forward(WINDOW_SIZE);

        let input_buf = plan.make_input_vec();
        let spectrum_buf = plan.make_output_vec();
        let scratch = plan.make_scratch_vec();

        // Hann window
        let window: Vec<f32> = (0..WINDOW_SIZE)
            .map(|i| {
                0.5 * (1.0
                    - (2.0 * std::f32::consts::PI * i as f32 / (WINDOW_SIZE as f32 - 1.0)).cos())
            })
            .collect();

        Self {
            input_buf,
            spectrum_buf,
            scratch,
            plan,
            window,
        }
    }

    /// Process the latest `samples` into a spectral frame.
    ///
    /// Shorter inputs are zero-padded. Magnitudes are mapped to bytes over
    /// the [-100, -30] dBFS range; anything quieter than the floor reads 0.
    /// The Nyquist bin is dropped so the frame holds exactly N/2 bins.
    pub fn process(&mut self, samples: &[f32]) -> SpectralFrame {
        let n = WINDOW_SIZE.min(samples.len());

        for (i, slot) in self.input_buf.iter_mut().enumerate() {
            *slot = if i < n { samples[i] * self.window[i] } else { 0.0 };
        }

        let mut frame = SpectralFrame::default();

        if self
            .plan
            .process_with_scratch(&mut self.input_buf, &mut self.spectrum_buf, &mut self.scratch)
            .is_err()
        {
            return frame;
        }

        for (bin, c) in frame.bins.iter_mut().zip(self.spectrum_buf.iter().take(BIN_COUNT)) {
            let magnitude = (c.re * c.re + c.im * c.im).sqrt() / WINDOW_SIZE as f32;
            *bin = byte_intensity(magnitude);
        }

        frame
    }
}

/// Map a linear magnitude to a 0–255 intensity over the dB range.
fn byte_intensity(magnitude: f32) -> u8 {
    if magnitude <= 0.0 {
        return 0;
    }
    let db = 20.0 * magnitude.log10();
    let scaled = (db - MIN_DB) / (MAX_DB - MIN_DB) * 255.0;
    scaled.clamp(0.0, 255.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn silence_yields_zero_bins() {
        let mut analyzer = SpectrumAnalyzer::new();
        let silence = [0.0f32; WINDOW_SIZE];
        let frame = analyzer.process(&silence);
        assert!(frame.bins.iter().all(|&b| b == 0));
    }

    #[test]
    fn short_input_is_zero_padded() {
        let mut analyzer = SpectrumAnalyzer::new();
        let frame = analyzer.process(&[0.0f32; 10]);
        assert_eq!(frame.bins.len(), BIN_COUNT);
    }

    #[test]
    fn pure_tone_peaks_at_its_bin() {
        // 48 kHz, bin width 187.5 Hz: a quiet sine at bin 16 (3 kHz) must
        // dominate. Low amplitude keeps the peak inside the dB mapping range
        // so leakage into neighbor bins stays visibly weaker.
        let sample_rate = 48_000.0f32;
        let target_bin = 16usize;
        let freq = target_bin as f32 * sample_rate / WINDOW_SIZE as f32;
        let samples: Vec<f32> = (0..WINDOW_SIZE)
            .map(|i| 0.01 * (2.0 * std::f32::consts::PI * freq * i as f32 / sample_rate).sin())
            .collect();

        let mut analyzer = SpectrumAnalyzer::new();
        let frame = analyzer.process(&samples);

        let max = frame.bins.iter().copied().max().unwrap_or(0);
        assert!(frame.bins[target_bin] > 0);
        assert_eq!(frame.bins[target_bin], max);
        // Bins away from the tone are strictly quieter.
        assert!(frame.bins[target_bin] > frame.bins[target_bin + 4]);
        assert!(frame.bins[target_bin] > frame.bins[target_bin - 4]);
    }

    #[test]
    fn byte_intensity_clamps_at_floor_and_ceiling() {
        assert_eq!(byte_intensity(0.0), 0);
        // -120 dBFS is below the floor.
        assert_eq!(byte_intensity(1e-6), 0);
        // 0 dBFS is above the ceiling.
        assert_eq!(byte_intensity(1.0), 255);
    }
}
