//! Pipeline orchestrator: wires transport → store → detectors → bus →
//! mapper → mixer → audio sink and drives the control cadence.

use crate::config::PipelineConfig;
use crate::errors::{NeurosonicError, TransportError};
use crate::events::{AlphaBurstDetector, BlinkDetector, ClenchDetector, EventBus, EventDetector};
use crate::mapping::ParameterMapper;
use crate::protocol::{decode_frame, CMD_HALT, CMD_RESUME};
use crate::store::SampleStore;
use crate::synth::{AudioSink, Mixer, NoiseSource, OscillatorSource, SoundParameters};
use crate::transport::EegTransport;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

/// Mixer gain for the oscillator voice.
const OSCILLATOR_GAIN: f64 = 0.7;
/// Mixer gain for the noise voice.
const NOISE_GAIN: f64 = 0.3;

/// Cloneable stop signal for a running pipeline.
///
/// `stop` is idempotent; the control loop observes it at the next
/// iteration boundary.
#[derive(Debug, Clone)]
pub struct PipelineHandle {
    stop: Arc<AtomicBool>,
}

impl PipelineHandle {
    pub fn stop(&self) {
        self.stop.store(true, Ordering::Relaxed);
    }

    pub fn is_stopped(&self) -> bool {
        self.stop.load(Ordering::Relaxed)
    }
}

/// Orchestrates one EEG-to-audio session.
///
/// The pipeline owns every store and detector for the session; nothing
/// is process-global. Frame ingestion happens on the transport's
/// thread through the registered callback; everything else runs inline
/// in [`Pipeline::tick`] on the control thread. The per-channel store
/// is the only state shared between the two.
pub struct Pipeline {
    config: PipelineConfig,
    store: Arc<SampleStore>,
    bus: EventBus,
    detectors: Vec<Box<dyn EventDetector>>,
    params: Arc<Mutex<SoundParameters>>,
    mapper: ParameterMapper,
    mixer: Mixer,
    sink: Box<dyn AudioSink>,
    transport: Box<dyn EegTransport>,
    stop: Arc<AtomicBool>,
    epoch: Instant,
    last_tick_at: Option<f64>,
    connected: bool,
}

impl Pipeline {
    /// Build a pipeline from a validated configuration.
    pub fn new(
        config: PipelineConfig,
        transport: Box<dyn EegTransport>,
        sink: Box<dyn AudioSink>,
    ) -> Result<Self, NeurosonicError> {
        config.validate().map_err(NeurosonicError::Config)?;

        let store = Arc::new(SampleStore::new(config.eeg_buffer_seconds));
        let params = Arc::new(Mutex::new(SoundParameters::default()));

        let detectors: Vec<Box<dyn EventDetector>> = vec![
            Box::new(BlinkDetector::new(
                config.blink.threshold_uv,
                config.blink.window_secs,
                config.blink.debounce_secs,
            )?),
            Box::new(ClenchDetector::new(
                config.clench.threshold_uv_rms,
                config.clench.window_secs,
                config.clench.debounce_secs,
            )?),
            Box::new(AlphaBurstDetector::new(
                config.alpha_burst.ratio_entry,
                config.alpha_burst.ratio_exit,
                config.alpha_burst.baseline_secs,
                config.alpha_burst.analysis_window_secs,
                config.alpha_burst.update_interval_secs,
            )?),
        ];

        let mapper = ParameterMapper::new(
            config.base_frequency_range_hz,
            config.blink_decay_secs,
            config.clench_decay_secs,
        );

        let mut mixer = Mixer::new(config.master_volume);
        mixer.add_source(
            Box::new(OscillatorSource::new(config.audio_sample_rate)),
            OSCILLATOR_GAIN,
        );
        mixer.add_source(
            Box::new(NoiseSource::new(config.audio_sample_rate)),
            NOISE_GAIN,
        );

        // Trigger side of the parameter mapping reacts to every event.
        let mut bus = EventBus::new();
        let handler_params = Arc::clone(&params);
        bus.subscribe_all(move |event| {
            ParameterMapper::apply_event(&mut handler_params.lock().unwrap(), event);
        });

        Ok(Self {
            config,
            store,
            bus,
            detectors,
            params,
            mapper,
            mixer,
            sink,
            transport,
            stop: Arc::new(AtomicBool::new(false)),
            epoch: Instant::now(),
            last_tick_at: None,
            connected: false,
        })
    }

    /// Stop signal usable from another thread.
    pub fn handle(&self) -> PipelineHandle {
        PipelineHandle {
            stop: Arc::clone(&self.stop),
        }
    }

    /// Monotonic session time in seconds.
    pub fn now(&self) -> f64 {
        self.epoch.elapsed().as_secs_f64()
    }

    /// Shared sample store (the transport callback writes into it).
    pub fn store(&self) -> Arc<SampleStore> {
        Arc::clone(&self.store)
    }

    /// Copy of the current sound parameters.
    pub fn params_snapshot(&self) -> SoundParameters {
        self.params.lock().unwrap().clone()
    }

    /// Event bus, for additional subscribers (logging, UI, tests).
    pub fn bus_mut(&mut self) -> &mut EventBus {
        &mut self.bus
    }

    /// Wire the decode-and-append callback and connect the transport
    /// with bounded retries, then start streaming and the audio sink.
    pub fn start(&mut self) -> Result<(), NeurosonicError> {
        let store = Arc::clone(&self.store);
        self.transport.on_frame(Box::new(move |channel, frame, _timestamp| {
            match decode_frame(frame) {
                Ok(samples) => store.append(channel, &samples),
                Err(err) => log::warn!("dropping undecodable frame on {channel}: {err}"),
            }
        }));

        let attempts = self.config.max_retries.max(1);
        let mut last_reason = String::new();
        for attempt in 1..=attempts {
            log::info!("connecting to {} (attempt {attempt}/{attempts})", self.config.device_name);
            match self.transport.connect() {
                Ok(()) => {
                    // Stale pre-disconnect samples must not feed the detectors.
                    self.store.reset();
                    self.transport.send_command(&CMD_RESUME).map_err(NeurosonicError::Transport)?;
                    self.sink.start().map_err(NeurosonicError::Audio)?;
                    self.connected = true;
                    log::info!("transport connected, streaming resumed");
                    return Ok(());
                }
                Err(err) => {
                    log::warn!("connection attempt {attempt} failed: {err}");
                    last_reason = err.to_string();
                    if attempt < attempts {
                        thread::sleep(Duration::from_secs_f64(self.config.retry_delay_secs));
                    }
                }
            }
        }

        Err(NeurosonicError::Transport(TransportError::ConnectFailed {
            attempts,
            reason: last_reason,
        }))
    }

    /// One control cycle, in the fixed order: detect → publish,
    /// continuous parameter update, trigger decay by measured `dt`,
    /// render and submit one audio block.
    ///
    /// Public so tests and alternative schedulers can drive the
    /// pipeline with a synthetic clock; [`Pipeline::run`] calls it with
    /// real time.
    pub fn tick(&mut self, now: f64, dt: f64) {
        for detector in &mut self.detectors {
            for event in detector.detect(&self.store, now) {
                log::debug!("event: {event}");
                self.bus.publish(&event);
            }
        }

        {
            let mut params = self.params.lock().unwrap();
            self.mapper.update_continuous(&mut params, &self.store);
            self.mapper.decay_triggers(&mut params, dt);
        }

        let snapshot = self.params.lock().unwrap().clone();
        let block = self.mixer.generate(&snapshot, self.config.audio_block_frames);
        if let Err(err) = self.sink.write(&block) {
            // Rendering faults degrade audio but never kill the session.
            log::warn!("audio block dropped: {err}");
        }
    }

    /// Run the control loop until the stop signal fires, then shut
    /// down. Blocks the calling thread.
    pub fn run(&mut self) -> Result<(), NeurosonicError> {
        self.start()?;

        while !self.stop.load(Ordering::Relaxed) {
            let now = self.now();
            let dt = match self.last_tick_at {
                Some(last) => now - last,
                None => 0.0,
            };
            self.last_tick_at = Some(now);

            self.tick(now, dt);
            thread::sleep(Duration::from_secs_f64(self.config.control_interval_secs));
        }

        self.shutdown();
        Ok(())
    }

    /// Halt streaming, stop the sink, and disconnect. Partial failures
    /// are logged and swallowed; shutdown always completes.
    pub fn shutdown(&mut self) {
        if self.connected {
            if let Err(err) = self.transport.send_command(&CMD_HALT) {
                log::warn!("halt command failed: {err}");
            }
            if let Err(err) = self.transport.disconnect() {
                log::warn!("disconnect failed: {err}");
            }
            self.connected = false;
        }
        if let Err(err) = self.sink.stop() {
            log::warn!("audio sink stop failed: {err}");
        }
        log::info!("pipeline stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::AudioError;
    use crate::transport::FrameCallback;

    /// Transport that fails a configurable number of connect attempts.
    struct FlakyTransport {
        failures_left: u32,
    }

    impl FlakyTransport {
        fn new(failures: u32) -> Self {
            Self {
                failures_left: failures,
            }
        }
    }

    impl EegTransport for FlakyTransport {
        fn on_frame(&mut self, _callback: FrameCallback) {}

        fn connect(&mut self) -> Result<(), TransportError> {
            if self.failures_left > 0 {
                self.failures_left -= 1;
                return Err(TransportError::Disconnected {
                    reason: "simulated link failure".to_string(),
                });
            }
            Ok(())
        }

        fn disconnect(&mut self) -> Result<(), TransportError> {
            Ok(())
        }

        fn send_command(&mut self, _command: &[u8]) -> Result<(), TransportError> {
            Ok(())
        }
    }

    struct NullSink;

    impl AudioSink for NullSink {
        fn start(&mut self) -> Result<(), AudioError> {
            Ok(())
        }
        fn stop(&mut self) -> Result<(), AudioError> {
            Ok(())
        }
        fn write(&mut self, _block: &[f32]) -> Result<(), AudioError> {
            Ok(())
        }
    }

    fn fast_config() -> PipelineConfig {
        PipelineConfig {
            retry_delay_secs: 0.0,
            ..PipelineConfig::default()
        }
    }

    #[test]
    fn start_retries_until_connect_succeeds() {
        let transport = FlakyTransport::new(2);
        let mut pipeline =
            Pipeline::new(fast_config(), Box::new(transport), Box::new(NullSink)).unwrap();
        assert!(pipeline.start().is_ok());
    }

    #[test]
    fn start_gives_up_after_bounded_retries() {
        let transport = FlakyTransport::new(10);
        let mut pipeline =
            Pipeline::new(fast_config(), Box::new(transport), Box::new(NullSink)).unwrap();
        let err = pipeline.start().unwrap_err();
        assert!(matches!(
            err,
            NeurosonicError::Transport(TransportError::ConnectFailed { attempts: 3, .. })
        ));
    }

    #[test]
    fn invalid_config_is_rejected_at_construction() {
        let mut config = fast_config();
        config.blink.threshold_uv = f64::NAN;
        let result = Pipeline::new(config, Box::new(FlakyTransport::new(0)), Box::new(NullSink));
        assert!(matches!(result, Err(NeurosonicError::Config(_))));
    }

    #[test]
    fn stop_handle_is_idempotent() {
        let pipeline =
            Pipeline::new(fast_config(), Box::new(FlakyTransport::new(0)), Box::new(NullSink))
                .unwrap();
        let handle = pipeline.handle();
        assert!(!handle.is_stopped());
        handle.stop();
        handle.stop();
        assert!(handle.is_stopped());
    }

    #[test]
    fn tick_renders_even_with_empty_store() {
        let mut pipeline =
            Pipeline::new(fast_config(), Box::new(FlakyTransport::new(0)), Box::new(NullSink))
                .unwrap();
        pipeline.start().unwrap();
        pipeline.tick(0.05, 0.05);
        let params = pipeline.params_snapshot();
        // No samples buffered: continuous mapping skipped, defaults hold.
        assert_eq!(params, SoundParameters::default());
    }
}
