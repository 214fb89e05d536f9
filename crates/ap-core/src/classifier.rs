use crate::profile::{Profile, TherapyMode};
use crate::reading::Reading;

/// Classify a reading into a therapeutic profile.
///
/// Ordered rule cascade, first match wins. All bounds are strict: boundary
/// values fall through to the next rule. Total over any input — a non-finite
/// `peak_frequency` fails the Pain rule and resolves to the Stress catch-all.
///
/// # Example
/// ```
/// use ap_core::classifier::classify;
/// use ap_core::profile::TherapyMode;
///
/// assert_eq!(classify(70, 0.0).mode, TherapyMode::Anc);
/// assert_eq!(classify(10, 901.0).mode, TherapyMode::Pain);
/// assert_eq!(classify(40, 0.0).mode, TherapyMode::Focus);
/// assert_eq!(classify(20, 10.0).mode, TherapyMode::Stress);
/// ```
#[must_use]
pub fn classify(volume: u8, peak_frequency: f32) -> Profile {
    if volume > 65 {
        return Profile {
            mode: TherapyMode::Anc,
            target_frequency: peak_frequency,
            label: "Neural ANC",
            confidence: "94%",
            rationale: "High amplitude ambient noise detected. Spectral masking required.",
        };
    }
    if peak_frequency > 900.0 {
        return Profile {
            mode: TherapyMode::Pain,
            target_frequency: 174.0,
            label: "Somatic Relief",
            confidence: "89%",
            rationale: "High-frequency mechanical jitter identified. 174Hz grounding suggested.",
        };
    }
    if volume > 35 && volume < 55 {
        return Profile {
            mode: TherapyMode::Focus,
            target_frequency: 40.0,
            label: "High Focus",
            confidence: "91%",
            rationale: "Moderate environmental load. 40Hz Gamma entrainment optimal.",
        };
    }
    Profile {
        mode: TherapyMode::Stress,
        target_frequency: 528.0,
        label: "Stress Void",
        confidence: "97%",
        rationale: "Environment stable. Suggesting 528Hz for DNA/Cortisol maintenance.",
    }
}

/// Classify an on-demand reading that may be structurally absent.
///
/// `None` means the sensors never produced a reading (mic denied, classify
/// requested before the first tick). That case, and only that case, resolves
/// to the Earth grounding fallback — it never propagates an error.
///
/// # Example
/// ```
/// use ap_core::classifier::classify_reading;
/// use ap_core::profile::TherapyMode;
///
/// let profile = classify_reading(None);
/// assert_eq!(profile.mode, TherapyMode::Earth);
/// assert!((profile.target_frequency - 136.1).abs() < f32::EPSILON);
/// ```
#[must_use]
pub fn classify_reading(reading: Option<&Reading>) -> Profile {
    match reading {
        Some(r) => classify(r.volume, r.peak_frequency),
        None => Profile {
            mode: TherapyMode::Earth,
            target_frequency: 136.1,
            label: "Earth Year",
            confidence: "N/A",
            rationale: "Sensor data mismatch. Defaulting to 136.1Hz universal grounding.",
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loud_environment_is_anc_regardless_of_peak() {
        for peak in [0.0, 450.0, 901.0, 15_000.0] {
            let p = classify(66, peak);
            assert_eq!(p.mode, TherapyMode::Anc);
            assert!((p.target_frequency - peak).abs() < f32::EPSILON);
            assert_eq!(p.confidence, "94%");
        }
    }

    #[test]
    fn anc_bound_is_strict() {
        // 65 falls through to the next rules.
        assert_ne!(classify(65, 0.0).mode, TherapyMode::Anc);
    }

    #[test]
    fn high_pitch_is_pain_grounding() {
        let p = classify(10, 901.0);
        assert_eq!(p.mode, TherapyMode::Pain);
        assert!((p.target_frequency - 174.0).abs() < f32::EPSILON);
    }

    #[test]
    fn pain_bound_is_strict() {
        assert_ne!(classify(10, 900.0).mode, TherapyMode::Pain);
    }

    #[test]
    fn moderate_volume_is_focus() {
        let p = classify(40, 0.0);
        assert_eq!(p.mode, TherapyMode::Focus);
        assert!((p.target_frequency - 40.0).abs() < f32::EPSILON);
    }

    #[test]
    fn focus_bounds_are_strict() {
        assert_ne!(classify(35, 0.0).mode, TherapyMode::Focus);
        assert_ne!(classify(55, 0.0).mode, TherapyMode::Focus);
    }

    #[test]
    fn quiet_environment_is_stress_catch_all() {
        let p = classify(20, 10.0);
        assert_eq!(p.mode, TherapyMode::Stress);
        assert!((p.target_frequency - 528.0).abs() < f32::EPSILON);
        assert_eq!(
            p.rationale,
            "Environment stable. Suggesting 528Hz for DNA/Cortisol maintenance."
        );
    }

    #[test]
    fn nan_peak_resolves_to_stress_not_panic() {
        let p = classify(20, f32::NAN);
        assert_eq!(p.mode, TherapyMode::Stress);
    }

    #[test]
    fn absent_reading_resolves_to_earth() {
        let p = classify_reading(None);
        assert_eq!(p.mode, TherapyMode::Earth);
        assert!((p.target_frequency - 136.1).abs() < f32::EPSILON);
        assert_eq!(p.confidence, "N/A");
    }

    #[test]
    fn present_reading_uses_the_cascade() {
        let r = Reading {
            volume: 70,
            peak_frequency: 440.0,
            timestamp_ms: 0,
        };
        assert_eq!(classify_reading(Some(&r)).mode, TherapyMode::Anc);
    }
}
