use embassy_sync::blocking_mutex::raw::NoopRawMutex;
use embassy_sync::watch::Watch;
use imag_icd::{ImuCommand, ReportKind, SensorMessage};
use imag_imu::mock::{HubCall, MockDelay, MockHub};
use imag_imu::{report_id, CalibrationSensors, Registry, TareAxes, TareBasis};
use imag_node::{
    BatteryProbe, Button, Error, Node, NodeConfig, Page, ReportSink,
    SensorEvent, TelemetryWatch,
};

static REGISTRY: Registry = Registry::new();

// ---------------------------------------------------------------------------
// Test doubles
// ---------------------------------------------------------------------------

/// Sink that records everything it sends.
#[derive(Default)]
struct RecordingSink {
    ready: bool,
    fail: bool,
    sent: Vec<SensorMessage>,
}

#[derive(Debug)]
struct SinkError;

impl ReportSink for RecordingSink {
    type Error = SinkError;

    fn is_ready(&self) -> bool {
        self.ready
    }

    fn send(&mut self, message: &SensorMessage) -> Result<(), Self::Error> {
        if self.fail {
            return Err(SinkError);
        }
        self.sent.push(message.clone());
        Ok(())
    }
}

/// Probe returning a fixed raw reading.
struct FixedProbe(u16);

impl BatteryProbe for FixedProbe {
    type Error = ();

    fn read_raw(&mut self) -> Result<u16, Self::Error> {
        Ok(self.0)
    }
}

type TestNode<'w> = Node<
    'static,
    'w,
    MockHub,
    MockDelay,
    RecordingSink,
    FixedProbe,
    NoopRawMutex,
>;

fn config() -> NodeConfig {
    NodeConfig {
        init_retry_polls: 3,
        battery_read_polls: 5,
        ..NodeConfig::default()
    }
}

fn node<'w>(
    watch: &'w TelemetryWatch<NoopRawMutex>,
    hub: MockHub,
) -> TestNode<'w> {
    let sink = RecordingSink { ready: true, ..Default::default() };
    Node::new(
        hub,
        MockDelay::default(),
        &REGISTRY,
        sink,
        FixedProbe(620),
        watch,
        config(),
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[test]
fn start_shows_main_page() {
    let watch = Watch::new();
    let mut node = node(&watch, MockHub::new());

    assert_eq!(node.page(), Page::Splash);
    node.start().unwrap();
    assert_eq!(node.page(), Page::Main);

    let telemetry = watch.receiver().unwrap().try_get().unwrap();
    assert!(telemetry.initialized);
    assert!((telemetry.battery_voltage - 3.996).abs() < 0.01);
    assert!(!telemetry.battery_low);
}

#[test]
fn reports_are_forwarded_to_sink() {
    let watch = Watch::new();
    let mut node = node(&watch, MockHub::new());
    node.start().unwrap();

    node.sensor_mut()
        .hub_mut()
        .queue_rotation(report_id::ROTATION_VECTOR, 0, 3);
    let message = node.poll().unwrap().unwrap();

    assert_eq!(message.kind, ReportKind::Rotation);
    assert_eq!(message.payload.as_slice(), &[0.0, 0.0, 0.0, 1.0]);
    assert_eq!(node.sink().sent, vec![message]);

    let telemetry = node.telemetry();
    assert_eq!(telemetry.sent, 1);
    assert_eq!(telemetry.rotation, Some([0.0, 0.0, 0.0, 1.0]));
    assert_eq!(telemetry.last_kind, Some(ReportKind::Rotation));
    assert!((telemetry.reliability - 1.0).abs() < 1e-6);
}

#[test]
fn messages_are_dropped_while_sink_is_not_ready() {
    let watch = Watch::new();
    let mut node = node(&watch, MockHub::new());
    node.start().unwrap();
    node.sink_mut().ready = false;

    node.sensor_mut()
        .hub_mut()
        .queue_rotation(report_id::ROTATION_VECTOR, 0, 3);
    assert!(node.poll().unwrap().is_some());

    assert!(node.sink().sent.is_empty());
    assert_eq!(node.telemetry().dropped, 1);
}

#[test]
fn send_errors_are_counted() {
    let watch = Watch::new();
    let mut node = node(&watch, MockHub::new());
    node.start().unwrap();
    node.sink_mut().fail = true;

    node.sensor_mut()
        .hub_mut()
        .queue_rotation(report_id::ROTATION_VECTOR, 0, 3);
    node.poll().unwrap();

    assert_eq!(node.telemetry().send_errors, 1);
}

#[test]
fn empty_poll_is_not_an_error() {
    let watch = Watch::new();
    let mut node = node(&watch, MockHub::new());
    node.start().unwrap();

    assert_eq!(node.poll(), Ok(None));
}

#[test]
fn unmapped_reports_are_skipped() {
    let watch = Watch::new();
    let mut node = node(&watch, MockHub::new());
    node.start().unwrap();

    node.sensor_mut().hub_mut().queue_rotation(0x42, 0, 3);
    assert_eq!(node.poll(), Ok(None));
}

#[test]
fn failed_start_is_retried_on_cadence() {
    let watch = Watch::new();
    let mut hub = MockHub::new();
    hub.failures.open = true;
    let mut node = node(&watch, hub);

    assert_eq!(
        node.start(),
        Err(Error::Sensor(imag_imu::Error::DeviceNotFound))
    );
    assert_eq!(node.page(), Page::Splash);

    node.sensor_mut().hub_mut().failures.open = false;
    assert_eq!(node.poll(), Ok(None));
    assert_eq!(node.poll(), Ok(None));
    assert!(!node.sensor().is_initialized());

    assert_eq!(node.poll(), Ok(None));
    assert!(node.sensor().is_initialized());
    assert_eq!(node.page(), Page::Main);
    assert_eq!(node.sensor().hub().count(&HubCall::Open(0x4b)), 2);
}

#[test]
fn hub_reset_is_recovered_during_poll() {
    let watch = Watch::new();
    let mut node = node(&watch, MockHub::new());
    node.start().unwrap();

    node.sensor_mut().hub_mut().raise_reset();
    assert_eq!(node.poll(), Ok(None));

    let reinit = HubCall::SetAutoCalibration(CalibrationSensors::ACCEL);
    assert_eq!(node.sensor().hub().count(&reinit), 2);
    assert!(node.telemetry().initialized);
}

#[test]
fn calibration_buttons_drive_session() {
    let watch = Watch::new();
    let mut node = node(&watch, MockHub::new());
    node.start().unwrap();

    // "Config" on the main page.
    node.handle_event(SensorEvent::Button(Button::C)).unwrap();
    assert_eq!(node.page(), Page::Calibration);
    assert!(node.telemetry().calibrating);
    assert_eq!(node.display_content().lines[0].as_str(), "Calibrating...");

    // "Store" on the calibration page.
    node.handle_event(SensorEvent::Button(Button::C)).unwrap();
    assert_eq!(node.page(), Page::Main);
    assert!(!node.telemetry().calibrating);
    assert_eq!(node.sensor().hub().count(&HubCall::PersistCalibration), 1);
}

#[test]
fn cancel_discards_calibration() {
    let watch = Watch::new();
    let mut node = node(&watch, MockHub::new());
    node.start().unwrap();

    node.handle_event(ImuCommand::BeginCalibration.into()).unwrap();
    node.handle_event(SensorEvent::Button(Button::B)).unwrap();

    assert_eq!(node.page(), Page::Main);
    assert_eq!(node.sensor().hub().count(&HubCall::PersistCalibration), 0);
}

#[test]
fn north_button_tares_heading() {
    let watch = Watch::new();
    let mut node = node(&watch, MockHub::new());
    node.start().unwrap();

    node.handle_event(SensorEvent::Button(Button::B)).unwrap();
    assert_eq!(
        node.sensor().hub().last_tare(),
        Some((TareAxes::Z, TareBasis::RotationVector))
    );
    assert!(node.telemetry().tared);
    assert_eq!(node.display_content().lines[1].as_str(), "OSC [cstm]");

    node.handle_raw_event(6).unwrap();
    assert!(!node.telemetry().tared);
}

#[test]
fn screen_toggles_off_and_back() {
    let watch = Watch::new();
    let mut node = node(&watch, MockHub::new());
    node.start().unwrap();

    node.handle_event(SensorEvent::Button(Button::A)).unwrap();
    assert_eq!(node.page(), Page::None);
    assert!(node.display_content().lines.is_empty());

    node.handle_event(SensorEvent::Button(Button::C)).unwrap();
    assert_eq!(node.page(), Page::Main);
}

#[test]
fn invalid_raw_event_is_rejected() {
    let watch = Watch::new();
    let mut node = node(&watch, MockHub::new());

    assert_eq!(
        node.handle_raw_event(200),
        Err(Error::Event(imag_node::SensorEventError::InvalidConversion(200)))
    );
}

#[test]
fn battery_is_sampled_on_cadence() {
    let watch = Watch::new();
    let mut node = node(&watch, MockHub::new());
    node.start().unwrap();

    // A flat cell reads 558 (3.6 V); the average follows within one
    // smoothing window.
    node.battery_probe_mut().0 = 558;
    for _ in 0..4 {
        node.poll().unwrap();
    }
    assert!(!node.telemetry().battery_low);

    for _ in 0..5 * 8 {
        node.poll().unwrap();
    }
    let telemetry = node.telemetry();
    assert!(telemetry.battery_low);
    assert_eq!(telemetry.battery_percentage, 1);
    assert_eq!(
        node.display_content().lines.last().unwrap().as_str(),
        "Bat Low"
    );
}
