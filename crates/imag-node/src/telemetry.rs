use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::watch::Watch;
use imag_icd::ReportKind;

pub const TELEMETRY_SUBS: usize = 3;

pub type TelemetryWatch<M> = Watch<M, Telemetry, TELEMETRY_SUBS>;

/// Node state as seen by the display and any other observer. Published after
/// every poll; observers only ever get copies.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Telemetry {
    pub initialized: bool,
    pub calibrating: bool,
    pub tared: bool,
    /// `0.0..=1.0`.
    pub reliability: f32,
    /// Heading accuracy in radians, -1 if unavailable.
    pub accuracy: f32,
    /// Last rotation as `[i, j, k, real]`.
    pub rotation: Option<[f32; 4]>,
    pub last_kind: Option<ReportKind>,
    pub missed_reports: u32,
    pub sent: u32,
    /// Messages dropped because the transport was not ready.
    pub dropped: u32,
    pub send_errors: u32,
    pub battery_voltage: f32,
    pub battery_percentage: u8,
    pub battery_low: bool,
}

pub fn publish<M: RawMutex>(watch: &TelemetryWatch<M>, telemetry: &Telemetry) {
    watch.sender().send(telemetry.clone());
}
