//! The node's cooperative main loop.
//!
//! [`Node::poll`] is called from the firmware's run loop as often as
//! possible. Each call reads at most one report, hands it to the transport,
//! and publishes a fresh [`Telemetry`] snapshot. Operator input arrives
//! through [`Node::handle_event`] between polls.

use embassy_sync::blocking_mutex::raw::RawMutex;
use embedded_hal::delay::DelayNs;
use imag_icd::{ImuCommand, SensorMessage};
use imag_imu::{OrientationSensor, Registry, SensorHub};

use crate::battery::{BatteryGauge, BatteryProbe};
use crate::config::NodeConfig;
use crate::display::{DisplayContent, Page};
use crate::error::Error;
use crate::events::SensorEvent;
use crate::telemetry::{publish, Telemetry, TelemetryWatch};

/// Outbound transport for sensor messages, e.g. OSC over UDP.
pub trait ReportSink {
    type Error: core::fmt::Debug;

    /// Whether a peer is connected and a message can go out now.
    fn is_ready(&self) -> bool;

    fn send(&mut self, message: &SensorMessage) -> Result<(), Self::Error>;
}

pub struct Node<'r, 'w, H, D, S, B, M>
where
    H: SensorHub,
    D: DelayNs,
    S: ReportSink,
    B: BatteryProbe,
    M: RawMutex,
{
    sensor: OrientationSensor<'r, H, D>,
    sink: S,
    battery_probe: B,
    battery: BatteryGauge,
    watch: &'w TelemetryWatch<M>,
    telemetry: Telemetry,
    config: NodeConfig,
    page: Page,
    polls_since_init: u32,
    polls_since_battery: u32,
}

impl<'r, 'w, H, D, S, B, M> Node<'r, 'w, H, D, S, B, M>
where
    H: SensorHub,
    D: DelayNs,
    S: ReportSink,
    B: BatteryProbe,
    M: RawMutex,
{
    pub fn new(
        hub: H,
        delay: D,
        registry: &'r Registry,
        sink: S,
        battery_probe: B,
        watch: &'w TelemetryWatch<M>,
        config: NodeConfig,
    ) -> Self {
        Self {
            sensor: OrientationSensor::new(hub, delay, registry, &config.sensor),
            sink,
            battery_probe,
            battery: BatteryGauge::new(),
            watch,
            telemetry: Telemetry::default(),
            config,
            page: Page::Splash,
            polls_since_init: 0,
            polls_since_battery: 0,
        }
    }

    /// Bring up the sensor hub. On failure [`poll`](Self::poll) keeps
    /// retrying every `init_retry_polls` polls.
    pub fn start(&mut self) -> Result<(), Error> {
        if !self.battery.has_reading() {
            self.battery.sample(&mut self.battery_probe);
        }

        self.polls_since_init = 0;
        let result = self.sensor.initialize(self.config.sensor.i2c_address);
        match result {
            Ok(()) => {
                log_info!("Sensor node running");
                if self.page == Page::Splash {
                    self.page = Page::Main;
                }
            }
            Err(e) => log_error!("Sensor initialization failed: {:?}", e),
        }

        self.refresh_telemetry();
        result.map_err(Error::from)
    }

    /// One iteration of the run loop. Returns the message built from the
    /// report read in this iteration, whether or not it could be sent.
    pub fn poll(&mut self) -> Result<Option<SensorMessage>, Error> {
        self.poll_battery();

        if !self.sensor.is_initialized() {
            self.polls_since_init = self.polls_since_init.saturating_add(1);
            if self.polls_since_init >= self.config.init_retry_polls {
                log_info!("Retrying sensor initialization");
                // Failure is logged and retried on the next cadence.
                let _ = self.start();
            } else {
                self.refresh_telemetry();
            }
            return Ok(None);
        }

        let result = match self.sensor.read() {
            Ok(Some(report)) => {
                let message = SensorMessage::from(&report);
                self.forward(&message);
                Ok(Some(message))
            }
            Ok(None) => Ok(None),
            // Skipped; the core has logged it.
            Err(imag_imu::Error::UnsupportedReport(_)) => Ok(None),
            Err(e) => Err(e.into()),
        };

        self.refresh_telemetry();
        result
    }

    pub fn handle_event(&mut self, event: SensorEvent) -> Result<(), Error> {
        log_info!("Received event {:?}", event);

        let result = match event {
            SensorEvent::Command(command) => self.handle_command(command),
            SensorEvent::Button(button) => {
                match self.page.button_event(button) {
                    Some(event) => return self.handle_event(event),
                    None => Ok(()),
                }
            }
            SensorEvent::ToggleScreen => {
                self.page = match self.page {
                    Page::None => self.active_page(),
                    _ => Page::None,
                };
                Ok(())
            }
        };

        self.refresh_telemetry();
        result
    }

    /// Decode and handle an event received as a single byte.
    pub fn handle_raw_event(&mut self, value: u8) -> Result<(), Error> {
        let event = SensorEvent::try_from(value)?;
        self.handle_event(event)
    }

    fn handle_command(&mut self, command: ImuCommand) -> Result<(), Error> {
        let result = match command {
            ImuCommand::BeginCalibration => self.sensor.begin_calibration(),
            ImuCommand::StoreCalibration => self.sensor.end_calibration(true),
            ImuCommand::CancelCalibration => {
                self.sensor.end_calibration(false)
            }
            ImuCommand::ClearCalibration => self.sensor.clear_calibration(),
            ImuCommand::TareHeading => self.sensor.tare_heading(),
            ImuCommand::TareFull => self.sensor.tare_full(),
            ImuCommand::ResetTare => self.sensor.reset_tare(),
        };

        match command {
            ImuCommand::TareHeading | ImuCommand::TareFull if result.is_ok() => {
                self.telemetry.tared = true;
            }
            ImuCommand::ResetTare if result.is_ok() => {
                self.telemetry.tared = false;
            }
            _ => {}
        }

        if self.page != Page::None {
            self.page = self.active_page();
        }

        result.map_err(Error::from)
    }

    /// Page matching the sensor state when the screen is on.
    fn active_page(&self) -> Page {
        if self.sensor.is_calibrating() {
            Page::Calibration
        } else if self.sensor.is_initialized() {
            Page::Main
        } else {
            Page::Splash
        }
    }

    fn forward(&mut self, message: &SensorMessage) {
        if !self.sink.is_ready() {
            self.telemetry.dropped = self.telemetry.dropped.wrapping_add(1);
            return;
        }

        match self.sink.send(message) {
            Ok(()) => self.telemetry.sent = self.telemetry.sent.wrapping_add(1),
            Err(_) => {
                log_warn!("Sending {:?} failed", message.kind);
                self.telemetry.send_errors =
                    self.telemetry.send_errors.wrapping_add(1);
            }
        }
    }

    fn poll_battery(&mut self) {
        self.polls_since_battery = self.polls_since_battery.saturating_add(1);
        if self.polls_since_battery >= self.config.battery_read_polls {
            self.polls_since_battery = 0;
            self.battery.sample(&mut self.battery_probe);
        }
    }

    fn refresh_telemetry(&mut self) {
        let t = &mut self.telemetry;
        t.initialized = self.sensor.is_initialized();
        t.calibrating = self.sensor.is_calibrating();
        t.reliability = self.sensor.current_reliability();
        t.accuracy = self.sensor.current_accuracy();
        t.rotation = self
            .sensor
            .last_rotation()
            .map(|q| [q.x(), q.y(), q.z(), q.w()]);
        t.last_kind = self.sensor.last_data_type().map(Into::into);
        t.missed_reports = self.sensor.missed_reports();

        if self.battery.has_reading() {
            t.battery_voltage = self.battery.voltage();
            t.battery_percentage = self.battery.percentage();
            t.battery_low =
                t.battery_percentage <= self.config.low_battery_percent;
        }

        publish(self.watch, &self.telemetry);
    }

    pub fn telemetry(&self) -> Telemetry {
        self.telemetry.clone()
    }

    pub fn display_content(&self) -> DisplayContent {
        DisplayContent::render(
            self.page,
            &self.telemetry,
            &self.config.net.ssid,
        )
    }

    pub fn page(&self) -> Page {
        self.page
    }

    pub fn config(&self) -> &NodeConfig {
        &self.config
    }

    pub fn sensor(&self) -> &OrientationSensor<'r, H, D> {
        &self.sensor
    }

    pub fn sensor_mut(&mut self) -> &mut OrientationSensor<'r, H, D> {
        &mut self.sensor
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn battery_probe_mut(&mut self) -> &mut B {
        &mut self.battery_probe
    }
}
