use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

/// A named therapeutic audio profile.
///
/// Every mode maps to a generator kind and a default frequency in the
/// synthesis engine; `Anc` is the only mode backed by filtered noise.
///
/// # Example
/// ```
/// use ap_core::profile::TherapyMode;
/// let mode: TherapyMode = "focus".parse().unwrap();
/// assert_eq!(mode, TherapyMode::Focus);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TherapyMode {
    /// Adaptive spectral masking (filtered noise tracking the ambient peak).
    Anc,
    /// 174 Hz somatic grounding tone.
    Pain,
    /// 40 Hz gamma entrainment tone.
    Focus,
    /// 528 Hz recovery tone.
    Stress,
    /// 136.1 Hz universal grounding fallback.
    Earth,
}

impl fmt::Display for TherapyMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Anc => "ANC",
            Self::Pain => "Pain",
            Self::Focus => "Focus",
            Self::Stress => "Stress",
            Self::Earth => "Earth",
        };
        f.write_str(name)
    }
}

impl FromStr for TherapyMode {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "anc" => Ok(Self::Anc),
            "pain" => Ok(Self::Pain),
            "focus" => Ok(Self::Focus),
            "stress" => Ok(Self::Stress),
            "earth" => Ok(Self::Earth),
            other => Err(CoreError::UnknownMode(other.to_string())),
        }
    }
}

/// Immutable classification result.
///
/// Produced by the classifier cascade, consumed by the UI layer and
/// optionally fed to the synthesis engine.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Profile {
    /// Recommended therapy mode.
    pub mode: TherapyMode,
    /// Frequency the synthesis engine should be started at, Hz.
    pub target_frequency: f32,
    /// Human-readable mode name.
    pub label: &'static str,
    /// Confidence score as shown to the user ("94%", "N/A", ...).
    pub confidence: &'static str,
    /// One-sentence justification of the recommendation.
    pub rationale: &'static str,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_parse_is_case_insensitive() {
        assert_eq!("ANC".parse::<TherapyMode>().ok(), Some(TherapyMode::Anc));
        assert_eq!("Earth".parse::<TherapyMode>().ok(), Some(TherapyMode::Earth));
    }

    #[test]
    fn mode_parse_rejects_unknown() {
        assert!("phase".parse::<TherapyMode>().is_err());
    }

    #[test]
    fn mode_display_roundtrip() {
        for mode in [
            TherapyMode::Anc,
            TherapyMode::Pain,
            TherapyMode::Focus,
            TherapyMode::Stress,
            TherapyMode::Earth,
        ] {
            let parsed: TherapyMode = mode.to_string().parse().unwrap_or(TherapyMode::Earth);
            assert_eq!(parsed, mode);
        }
    }
}
