use std::path::PathBuf;

use clap::Parser;

/// AuraPulse — Ambient-sound sensing and therapeutic soundscape engine.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Fichier de configuration TOML. Défaut : config/default.toml.
    #[arg(short, long, default_value = "config/default.toml")]
    pub config: PathBuf,

    /// Cadence du tick d'analyse en Hz (15–120).
    #[arg(long)]
    pub fps: Option<u32>,

    /// Démarrer immédiatement un mode : anc, pain, focus, stress, earth.
    #[arg(long)]
    pub mode: Option<String>,

    /// Armer l'auto-shield au démarrage.
    #[arg(long, default_value_t = false)]
    pub shield: bool,

    /// Engager automatiquement le profil recommandé après calibration.
    #[arg(long, default_value_t = false)]
    pub engage: bool,

    /// Durée de la session en secondes. Sans valeur : tourne jusqu'à Ctrl-C.
    #[arg(long)]
    pub duration: Option<u64>,

    /// Fenêtre de calibration avant la classification, en secondes.
    #[arg(long, default_value_t = 3.8)]
    pub calibration_secs: f64,

    /// Graine du générateur de bruit (rend la synthèse déterministe).
    #[arg(long)]
    pub seed: Option<u64>,

    /// Ne pas ouvrir le périphérique de sortie (analyse seule).
    #[arg(long, default_value_t = false)]
    pub muted: bool,

    /// Ne pas ouvrir le microphone (synthèse seule, avec --mode).
    #[arg(long, default_value_t = false)]
    pub no_sensors: bool,

    /// Niveau de log : error, warn, info, debug, trace.
    #[arg(long, default_value = "info")]
    pub log_level: String,
}
