use std::thread;
use std::time::{Duration, Instant};

use ap_core::config::EngineConfig;
use ap_core::reading::{SensorSnapshot, WINDOW_SIZE};
use triple_buffer::TripleBuffer;

use crate::capture::MicCapture;
use crate::error::AudioError;
use crate::features;
use crate::spectrum::SpectrumAnalyzer;

/// Commands accepted by the analysis thread.
enum AcquisitionCommand {
    Stop,
}

/// Throttle for `display_volume` refreshes.
///
/// Separated from the tick loop so the ≥ period contract is testable with a
/// synthetic clock.
struct DisplayThrottle {
    period: Duration,
    last: Option<Instant>,
}

impl DisplayThrottle {
    fn new(period: Duration) -> Self {
        Self { period, last: None }
    }

    /// `true` when a refresh is due at `now`. The first call always refreshes.
    fn due(&mut self, now: Instant) -> bool {
        match self.last {
            Some(last) if now.duration_since(last) < self.period => false,
            _ => {
                self.last = Some(now);
                true
            }
        }
    }
}

/// Keep only the latest `WINDOW_SIZE` samples in `window`.
fn retain_latest(window: &mut Vec<f32>, incoming: &[f32]) {
    window.extend_from_slice(incoming);
    let len = window.len();
    if len > WINDOW_SIZE {
        window.drain(..len - WINDOW_SIZE);
    }
}

/// Owns the microphone stream and the repeating analysis tick.
///
/// `start()` opens the default input device inside a dedicated thread and
/// begins publishing one `SensorSnapshot` per tick through a triple buffer;
/// `stop()` cancels the tick and releases the device deterministically.
/// Both are silent no-ops when already in the requested state.
///
/// # Example
/// ```
/// use ap_audio::acquisition::SignalAcquisition;
/// use ap_core::config::EngineConfig;
///
/// let mut acquisition = SignalAcquisition::new(&EngineConfig::default());
/// assert!(!acquisition.is_recording());
/// assert_eq!(acquisition.snapshot().volume, 0);
/// ```
pub struct SignalAcquisition {
    target_fps: u32,
    display_refresh: Duration,
    running: Option<Running>,
}

struct Running {
    cmd_tx: flume::Sender<AcquisitionCommand>,
    output: triple_buffer::Output<SensorSnapshot>,
    handle: thread::JoinHandle<()>,
}

impl SignalAcquisition {
    /// Build a stopped acquisition with the configured tick cadence.
    #[must_use]
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            target_fps: config.target_fps.max(1),
            display_refresh: Duration::from_millis(config.display_refresh_ms),
            running: None,
        }
    }

    /// Request the default input device and start the analysis tick.
    ///
    /// The device is opened on the analysis thread itself so the cpal stream
    /// never crosses threads; this call blocks only until the open resolves.
    /// Already started is a no-op.
    ///
    /// # Errors
    /// `AudioError` when the device is missing or access is denied. The
    /// acquisition stays in the not-recording state in that case.
    pub fn start(&mut self) -> Result<(), AudioError> {
        if self.running.is_some() {
            log::debug!("Acquisition déjà démarrée, start() ignoré");
            return Ok(());
        }

        let (cmd_tx, cmd_rx) = flume::bounded(1);
        let (ready_tx, ready_rx) = flume::bounded(1);
        let (mut buf_input, output) = TripleBuffer::new(&SensorSnapshot::default()).split();

        let target_fps = self.target_fps;
        let display_refresh = self.display_refresh;

        let handle = thread::Builder::new()
            .name("ap-sense".to_string())
            .spawn(move || match MicCapture::open_default() {
                Ok(mut capture) => {
                    let _ = ready_tx.send(Ok(()));
                    run_tick_loop(
                        &mut capture,
                        &mut buf_input,
                        &cmd_rx,
                        target_fps,
                        display_refresh,
                    );
                }
                Err(e) => {
                    let _ = ready_tx.send(Err(e));
                }
            })
            .map_err(|e| AudioError::Unavailable(e.to_string()))?;

        match ready_rx.recv() {
            Ok(Ok(())) => {
                self.running = Some(Running {
                    cmd_tx,
                    output,
                    handle,
                });
                log::info!("Acquisition démarrée @ {target_fps} Hz");
                Ok(())
            }
            Ok(Err(e)) => {
                let _ = handle.join();
                log::warn!("Micro indisponible : {e}");
                Err(e)
            }
            Err(_) => {
                let _ = handle.join();
                Err(AudioError::Unavailable(
                    "le thread d'analyse s'est terminé avant l'ouverture".to_string(),
                ))
            }
        }
    }

    /// Cancel the tick, release the device, and reset the published state.
    ///
    /// Already stopped is a no-op.
    pub fn stop(&mut self) {
        let Some(running) = self.running.take() else {
            log::debug!("Acquisition déjà arrêtée, stop() ignoré");
            return;
        };
        let _ = running.cmd_tx.send(AcquisitionCommand::Stop);
        let _ = running.handle.join();
        log::info!("Acquisition arrêtée");
    }

    /// Latest published snapshot; zeros while stopped.
    pub fn snapshot(&mut self) -> SensorSnapshot {
        match &mut self.running {
            Some(running) => *running.output.read(),
            None => SensorSnapshot::default(),
        }
    }

    /// `true` while the analysis tick is running.
    #[must_use]
    pub fn is_recording(&self) -> bool {
        self.running.is_some()
    }
}

impl Drop for SignalAcquisition {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Analysis tick: drain the ring, window, transform, publish.
fn run_tick_loop(
    capture: &mut MicCapture,
    buf_input: &mut triple_buffer::Input<SensorSnapshot>,
    cmd_rx: &flume::Receiver<AcquisitionCommand>,
    target_fps: u32,
    display_refresh: Duration,
) {
    let sample_rate = capture.sample_rate();
    let mut analyzer = SpectrumAnalyzer::new();
    let mut throttle = DisplayThrottle::new(display_refresh);
    let mut incoming: Vec<f32> = Vec::with_capacity(sample_rate as usize);
    let mut window: Vec<f32> = Vec::with_capacity(WINDOW_SIZE * 2);
    let mut snapshot = SensorSnapshot {
        is_recording: true,
        ..SensorSnapshot::default()
    };

    let started = Instant::now();
    let tick_period = Duration::from_secs_f64(1.0 / f64::from(target_fps));

    loop {
        match cmd_rx.try_recv() {
            Ok(AcquisitionCommand::Stop) | Err(flume::TryRecvError::Disconnected) => break,
            Err(flume::TryRecvError::Empty) => {}
        }

        incoming.clear();
        capture.drain_into(&mut incoming);
        retain_latest(&mut window, &incoming);

        if window.len() >= WINDOW_SIZE {
            let now = Instant::now();
            let frame = analyzer.process(&window);
            let reading =
                features::extract(&frame, sample_rate, now.duration_since(started).as_millis() as u64);

            snapshot.volume = reading.volume;
            snapshot.peak_frequency = reading.peak_frequency;
            snapshot.timestamp_ms = reading.timestamp_ms;
            if throttle.due(now) {
                snapshot.display_volume = reading.volume;
            }
        }

        buf_input.write(snapshot);
        thread::sleep(tick_period);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stopped_acquisition_reads_zeros() {
        let mut acquisition = SignalAcquisition::new(&EngineConfig::default());
        let snap = acquisition.snapshot();
        assert_eq!(snap.volume, 0);
        assert_eq!(snap.display_volume, 0);
        assert_eq!(snap.peak_frequency, 0.0);
        assert!(!snap.is_recording);
    }

    #[test]
    fn stop_without_start_is_a_noop() {
        let mut acquisition = SignalAcquisition::new(&EngineConfig::default());
        acquisition.stop();
        acquisition.stop();
        assert!(!acquisition.is_recording());
    }

    #[test]
    fn throttle_first_refresh_is_immediate() {
        let mut throttle = DisplayThrottle::new(Duration::from_millis(200));
        assert!(throttle.due(Instant::now()));
    }

    #[test]
    fn throttle_holds_until_period_elapses() {
        let mut throttle = DisplayThrottle::new(Duration::from_millis(200));
        let t0 = Instant::now();
        assert!(throttle.due(t0));
        assert!(!throttle.due(t0 + Duration::from_millis(100)));
        assert!(!throttle.due(t0 + Duration::from_millis(199)));
        assert!(throttle.due(t0 + Duration::from_millis(200)));
        // Timer restarts from the accepted refresh.
        assert!(!throttle.due(t0 + Duration::from_millis(350)));
        assert!(throttle.due(t0 + Duration::from_millis(400)));
    }

    #[test]
    fn retain_latest_caps_the_window() {
        let mut window = Vec::new();
        retain_latest(&mut window, &[0.0; 100]);
        assert_eq!(window.len(), 100);
        retain_latest(&mut window, &[1.0; 300]);
        assert_eq!(window.len(), WINDOW_SIZE);
        assert!(window.iter().all(|&s| (s - 1.0).abs() < f32::EPSILON));

        // A small batch slides the window instead of growing it.
        retain_latest(&mut window, &[2.0; 4]);
        assert_eq!(window.len(), WINDOW_SIZE);
        assert!((window[WINDOW_SIZE - 1] - 2.0).abs() < f32::EPSILON);
        assert!((window[0] - 1.0).abs() < f32::EPSILON);
    }
}
