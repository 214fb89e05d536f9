use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Configuration runtime du moteur.
///
/// Sérialisable en TOML. Chaque champ a une valeur par défaut saine ; un
/// fichier partiel ne remplace que les champs présents.
///
/// # Example
/// ```
/// use ap_core::config::EngineConfig;
/// let config = EngineConfig::default();
/// assert_eq!(config.target_fps, 60);
/// ```
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct EngineConfig {
    // === Analyse ===
    /// Cadence du tick d'analyse (Hz). L'acquisition publie un Reading par tick.
    pub target_fps: u32,
    /// Période minimale de rafraîchissement de `display_volume` (ms).
    pub display_refresh_ms: u64,

    // === Auto-shield ===
    /// Bouclier actif au démarrage.
    pub shield_enabled: bool,

    // === Synthèse ===
    /// Graine du générateur de bruit. `None` = graine dérivée de l'horloge.
    pub noise_seed: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            target_fps: 60,
            display_refresh_ms: 200,
            shield_enabled: false,
            noise_seed: None,
        }
    }
}

impl EngineConfig {
    /// Clamp all numeric fields to their valid ranges.
    /// Called after TOML deserialization to prevent out-of-range values.
    pub fn clamp_all(&mut self) {
        self.target_fps = self.target_fps.clamp(15, 120);
        self.display_refresh_ms = self.display_refresh_ms.clamp(50, 1000);
    }
}

/// Structure TOML intermédiaire pour désérialisation avec valeurs optionnelles.
#[derive(Deserialize)]
struct ConfigFile {
    analysis: Option<AnalysisSection>,
    shield: Option<ShieldSection>,
    synth: Option<SynthSection>,
}

/// Analysis section of the TOML config, all fields optional.
#[derive(Deserialize)]
struct AnalysisSection {
    target_fps: Option<u32>,
    display_refresh_ms: Option<u64>,
}

/// Shield section of the TOML config.
#[derive(Deserialize)]
struct ShieldSection {
    enabled: Option<bool>,
}

/// Synthesis section of the TOML config.
#[derive(Deserialize)]
struct SynthSection {
    noise_seed: Option<u64>,
}

/// Charge un fichier TOML et fusionne avec les valeurs par défaut.
///
/// # Errors
/// Returns an error if the file cannot be read or parsed.
///
/// # Example
/// ```no_run
/// use ap_core::config::load_config;
/// use std::path::Path;
/// let config = load_config(Path::new("config/default.toml")).unwrap();
/// ```
pub fn load_config(path: &Path) -> Result<EngineConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Impossible de lire {}", path.display()))?;

    let file: ConfigFile = toml::from_str(&content)
        .with_context(|| format!("Erreur de parsing TOML dans {}", path.display()))?;

    let mut config = EngineConfig::default();

    if let Some(a) = file.analysis {
        if let Some(v) = a.target_fps {
            config.target_fps = v;
        }
        if let Some(v) = a.display_refresh_ms {
            config.display_refresh_ms = v;
        }
    }
    if let Some(v) = file.shield.and_then(|s| s.enabled) {
        config.shield_enabled = v;
    }
    if let Some(v) = file.synth.and_then(|s| s.noise_seed) {
        config.noise_seed = Some(v);
    }

    config.clamp_all();
    log::debug!("Configuration chargée depuis {}", path.display());
    Ok(config)
}
