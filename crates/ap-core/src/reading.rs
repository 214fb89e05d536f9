/// Taille de la fenêtre d'analyse spectrale, en échantillons.
pub const WINDOW_SIZE: usize = 256;

/// Nombre de bins de magnitude publiés par frame (N/2).
pub const BIN_COUNT: usize = WINDOW_SIZE / 2;

/// One spectral analysis frame: 128 byte-intensity magnitude bins.
///
/// Recomputed on every analysis tick, never retained across ticks.
///
/// # Example
/// ```
/// use ap_core::reading::{SpectralFrame, BIN_COUNT};
/// let frame = SpectralFrame::default();
/// assert_eq!(frame.bins.len(), BIN_COUNT);
/// ```
#[derive(Clone, Copy, Debug)]
pub struct SpectralFrame {
    /// Magnitude bins, 0–255, lowest frequency first.
    pub bins: [u8; BIN_COUNT],
}

impl Default for SpectralFrame {
    fn default() -> Self {
        Self {
            bins: [0u8; BIN_COUNT],
        }
    }
}

/// Scalar features derived from one `SpectralFrame`.
///
/// Produced once per analysis tick and handed to the classifier and the
/// controller. Not retained.
///
/// # Example
/// ```
/// use ap_core::reading::Reading;
/// let r = Reading::default();
/// assert_eq!(r.volume, 0);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Reading {
    /// Mean of the frame's magnitude bins, rounded.
    pub volume: u8,
    /// Frequency of the loudest bin, Hz. Ties resolve to the lowest bin.
    pub peak_frequency: f32,
    /// Milliseconds since acquisition started.
    pub timestamp_ms: u64,
}

/// État observable publié par `SignalAcquisition` à chaque tick.
///
/// `display_volume` est toujours un échantillon passé de `volume`, jamais
/// interpolé : il n'est rafraîchi qu'à intervalle ≥ 200 ms pour que les
/// affichages restent lisibles.
///
/// # Example
/// ```
/// use ap_core::reading::SensorSnapshot;
/// let s = SensorSnapshot::default();
/// assert!(!s.is_recording);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SensorSnapshot {
    /// Latest per-tick volume.
    pub volume: u8,
    /// Throttled copy of `volume` (refresh period ≥ 200 ms).
    pub display_volume: u8,
    /// Latest per-tick peak frequency, Hz.
    pub peak_frequency: f32,
    /// Milliseconds since acquisition started.
    pub timestamp_ms: u64,
    /// `true` while the microphone is open and the tick is running.
    pub is_recording: bool,
}

impl SensorSnapshot {
    /// The latest `Reading` carried by this snapshot.
    #[must_use]
    pub fn reading(&self) -> Reading {
        Reading {
            volume: self.volume,
            peak_frequency: self.peak_frequency,
            timestamp_ms: self.timestamp_ms,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_reading_roundtrip() {
        let snap = SensorSnapshot {
            volume: 42,
            display_volume: 40,
            peak_frequency: 880.0,
            timestamp_ms: 1500,
            is_recording: true,
        };
        let r = snap.reading();
        assert_eq!(r.volume, 42);
        assert!((r.peak_frequency - 880.0).abs() < f32::EPSILON);
        assert_eq!(r.timestamp_ms, 1500);
    }
}
