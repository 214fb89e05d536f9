use ap_core::reading::{Reading, SpectralFrame, WINDOW_SIZE};

/// Extract scalar features from a spectral frame.
///
/// Pure and total: `volume` is the rounded mean of the byte bins,
/// `peak_frequency` is the frequency of the loudest bin (ties resolve to the
/// lowest index), rounded to the nearest Hz.
///
/// # Example
/// ```
/// use ap_audio::features::extract;
/// use ap_core::reading::SpectralFrame;
///
/// let mut frame = SpectralFrame::default();
/// frame.bins[8] = 200;
/// let reading = extract(&frame, 48_000, 0);
/// // bin 8 of 128 @ 48 kHz: 8 * 48000 / 256 = 1500 Hz
/// assert_eq!(reading.peak_frequency, 1500.0);
/// ```
#[must_use]
pub fn extract(frame: &SpectralFrame, sample_rate: u32, timestamp_ms: u64) -> Reading {
    let sum: u32 = frame.bins.iter().map(|&b| u32::from(b)).sum();
    let volume = (sum as f32 / frame.bins.len() as f32).round() as u8;

    let mut max_val = 0u8;
    let mut max_index = 0usize;
    for (i, &b) in frame.bins.iter().enumerate() {
        if b > max_val {
            max_val = b;
            max_index = i;
        }
    }
    let peak_frequency =
        (max_index as f32 * sample_rate as f32 / WINDOW_SIZE as f32).round();

    Reading {
        volume,
        peak_frequency,
        timestamp_ms,
    }
}
