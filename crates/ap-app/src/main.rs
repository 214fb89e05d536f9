use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use anyhow::Result;
use ap_core::profile::TherapyMode;
use clap::Parser;

pub mod cli;
pub mod controller;
pub mod session;

use session::{Session, status_label};

fn main() -> Result<()> {
    // 1. Parser CLI
    let cli = cli::Cli::parse();

    // 2. Initialiser le logging
    env_logger::Builder::new()
        .filter_level(cli.log_level.parse().unwrap_or(log::LevelFilter::Info))
        .init();

    // 3. Charger la config
    let mut config = resolve_config(&cli)?;

    // 3b. Appliquer les overrides CLI
    if let Some(fps) = cli.fps {
        config.target_fps = fps;
    }
    if cli.shield {
        config.shield_enabled = true;
    }
    if let Some(seed) = cli.seed {
        config.noise_seed = Some(seed);
    }
    config.clamp_all();

    // 4. Construire la session
    let mut session = Session::new(&config, cli.muted);

    // 5. Démarrer les capteurs
    let mut sensing = false;
    if cli.no_sensors {
        log::info!("Capteurs désactivés (--no-sensors)");
    } else {
        match session.start_sensors() {
            Ok(()) => sensing = true,
            Err(e) => log::error!("Capteurs indisponibles, mode synthèse seule : {e}"),
        }
    }
    if !sensing && cli.mode.is_none() && !cli.engage {
        anyhow::bail!("Ni capteurs ni --mode : rien à faire.");
    }

    // 6. Mode demandé explicitement
    if let Some(ref name) = cli.mode {
        let mode: TherapyMode = name.parse()?;
        let frequency = mode_frequency(mode, &mut session);
        session.start_frequency(frequency, mode)?;
    }

    // 7. Interruption propre
    let running = Arc::new(AtomicBool::new(true));
    let running_flag = Arc::clone(&running);
    ctrlc::set_handler(move || {
        running_flag.store(false, Ordering::SeqCst);
    })?;

    let tick_period = Duration::from_secs_f64(1.0 / f64::from(config.target_fps));

    // 8. Fenêtre de calibration puis classification à la demande
    if sensing {
        log::info!("Calibration des capteurs ({:.1} s)...", cli.calibration_secs);
        let calibration_end = Instant::now() + Duration::from_secs_f64(cli.calibration_secs);
        while running.load(Ordering::SeqCst) && Instant::now() < calibration_end {
            session.tick();
            std::thread::sleep(tick_period);
        }

        let profile = session.classify();
        log::info!(
            "Recommandation : {} ({}) @ {} Hz — {}",
            profile.label,
            profile.confidence,
            profile.target_frequency,
            profile.rationale
        );
        if cli.engage {
            session.start_frequency(profile.target_frequency, profile.mode)?;
        }
    }

    // 9. Boucle de contrôle
    let deadline = cli.duration.map(|secs| Instant::now() + Duration::from_secs(secs));
    let mut last_report = Instant::now();

    while running.load(Ordering::SeqCst) {
        if deadline.is_some_and(|d| Instant::now() >= d) {
            break;
        }

        let snapshot = session.tick();

        if last_report.elapsed() >= Duration::from_secs(1) {
            last_report = Instant::now();
            log::info!(
                "vol {:>3} ({}) | pic {:>5} Hz | focus {:>3}% | mode {}",
                snapshot.display_volume,
                status_label(snapshot.display_volume, snapshot.is_recording),
                snapshot.peak_frequency,
                session.focus_score(),
                session
                    .active_mode()
                    .map_or_else(|| "—".to_string(), |m| m.to_string()),
            );
        }

        std::thread::sleep(tick_period);
    }

    // 10. Teardown déterministe, même après Ctrl-C
    session.stop_sound();
    session.stop_sensors();
    Ok(())
}

/// Frequency a mode starts at when engaged from the CLI. ANC tracks the
/// current ambient peak; every other mode has a fixed resonance.
fn mode_frequency(mode: TherapyMode, session: &mut Session) -> f32 {
    match mode {
        TherapyMode::Anc => session.snapshot().peak_frequency,
        TherapyMode::Pain => 174.0,
        TherapyMode::Focus => 40.0,
        TherapyMode::Stress => 528.0,
        TherapyMode::Earth => 136.1,
    }
}

/// Resolve config: missing file falls back to defaults with a warning.
fn resolve_config(cli: &cli::Cli) -> Result<ap_core::config::EngineConfig> {
    if cli.config.exists() {
        ap_core::config::load_config(&cli.config)
    } else {
        log::warn!(
            "Config introuvable : {}. Utilisation des défauts.",
            cli.config.display()
        );
        Ok(ap_core::config::EngineConfig::default())
    }
}
