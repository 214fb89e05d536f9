use std::collections::VecDeque;

/// Number of volume samples retained for trend display.
pub const HISTORY_LEN: usize = 30;

/// Focus score from the latest volume sample.
///
/// `penalty = max(0, volume - 50) * 1.8`, score clamped to [0, 100].
///
/// # Example
/// ```
/// use ap_core::focus::focus_score;
/// assert_eq!(focus_score(0), 100);
/// assert_eq!(focus_score(50), 100);
/// assert_eq!(focus_score(100), 10);
/// ```
#[must_use]
pub fn focus_score(volume: u8) -> u8 {
    let penalty = f32::from(volume.saturating_sub(50)) * 1.8;
    (100.0 - penalty).round().clamp(0.0, 100.0) as u8
}

/// Historique FIFO des volumes, longueur fixe de 30 échantillons.
///
/// Alimenté à 1 Hz par l'estimateur de focus ; remis à zéro quand la capture
/// s'arrête. La longueur ne varie jamais : chaque push évince le plus ancien.
///
/// # Example
/// ```
/// use ap_core::focus::{FocusHistory, HISTORY_LEN};
/// let mut history = FocusHistory::new();
/// history.push(42);
/// assert_eq!(history.len(), HISTORY_LEN);
/// ```
#[derive(Clone, Debug)]
pub struct FocusHistory {
    samples: VecDeque<u8>,
}

impl Default for FocusHistory {
    fn default() -> Self {
        Self::new()
    }
}

impl FocusHistory {
    /// History pre-filled with zeros.
    #[must_use]
    pub fn new() -> Self {
        Self {
            samples: VecDeque::from(vec![0u8; HISTORY_LEN]),
        }
    }

    /// Append the newest sample, evicting the oldest.
    pub fn push(&mut self, volume: u8) {
        self.samples.pop_front();
        self.samples.push_back(volume);
    }

    /// Reset every sample to zero (sensing stopped).
    pub fn reset(&mut self) {
        for s in &mut self.samples {
            *s = 0;
        }
    }

    /// Always `HISTORY_LEN`.
    #[must_use]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Never true: the history is pre-filled.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Oldest-first iterator over the samples.
    pub fn iter(&self) -> impl Iterator<Item = u8> + '_ {
        self.samples.iter().copied()
    }

    /// Most recent sample.
    #[must_use]
    pub fn newest(&self) -> u8 {
        self.samples.back().copied().unwrap_or(0)
    }
}
