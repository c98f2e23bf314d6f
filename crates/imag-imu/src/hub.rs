//! Capability surface of the sensor hub.
//!
//! The wire protocol lives below this trait. The orientation core only ever
//! talks to the hardware through these calls, and holds the hub by value.

use bitflags::bitflags;
use micromath::Quaternion;
use num_enum::IntoPrimitive;

/// Quaternion in the hub's component order (x, y, z, w).
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct HubQuaternion {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

impl HubQuaternion {
    pub const IDENTITY: Self = Self { x: 0.0, y: 0.0, z: 0.0, w: 1.0 };
}

impl From<Quaternion> for HubQuaternion {
    fn from(q: Quaternion) -> Self {
        Self { x: q.x(), y: q.y(), z: q.z(), w: q.w() }
    }
}

impl From<HubQuaternion> for Quaternion {
    fn from(q: HubQuaternion) -> Self {
        Quaternion::new(q.w, q.x, q.y, q.z)
    }
}

bitflags! {
    /// Axes affected by a tare request.
    #[derive(Debug, Copy, Clone, PartialEq, Eq)]
    pub struct TareAxes: u8 {
        const X = 0b001;
        const Y = 0b010;
        const Z = 0b100;
    }
}

bitflags! {
    /// Sensors running dynamic (background) calibration.
    #[derive(Debug, Copy, Clone, PartialEq, Eq)]
    pub struct CalibrationSensors: u8 {
        const ACCEL  = 0x01;
        const GYRO   = 0x02;
        const MAG    = 0x04;
        const PLANAR = 0x08;
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for TareAxes {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "TareAxes({=u8:#b})", self.bits())
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for CalibrationSensors {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "CalibrationSensors({=u8:#b})", self.bits())
    }
}

/// Rotation output the tare is computed against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoPrimitive)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum TareBasis {
    RotationVector = 0,
    GamingRotationVector = 1,
    GeomagneticRotationVector = 2,
}

/// Payload of a queued report, already converted to SI units.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RawPayload {
    /// Rotation vector; `accuracy` is in radians and only meaningful for the
    /// outputs that reference magnetic north.
    Rotation { i: f32, j: f32, k: f32, real: f32, accuracy: f32 },
    Vector { x: f32, y: f32, z: f32 },
    /// Counters, detector flags and classifier states.
    Scalar(u32),
}

/// One report as dequeued from the hub.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RawEvent {
    pub native_id: u8,
    pub sequence: u8,
    pub status: u8,
    pub payload: RawPayload,
}

/// Primitive operations of the sensor hub.
///
/// All calls are synchronous bus transactions. Report intervals are in
/// microseconds; an interval of zero disables the report.
pub trait SensorHub {
    type Error: core::fmt::Debug;

    /// Open communication with the hub at `address`.
    fn open(&mut self, address: u8) -> Result<(), Self::Error>;

    /// Consume the "hub was reset" flag.
    fn was_reset(&mut self) -> bool;

    fn enable_report(
        &mut self,
        native_id: u8,
        interval_us: u32,
    ) -> Result<(), Self::Error>;

    /// Next queued report, if any. Never blocks.
    fn poll_event(&mut self) -> Option<RawEvent>;

    fn push_reorientation(
        &mut self,
        orientation: HubQuaternion,
    ) -> Result<(), Self::Error>;

    fn tare(
        &mut self,
        axes: TareAxes,
        basis: TareBasis,
    ) -> Result<(), Self::Error>;

    fn set_auto_calibration(
        &mut self,
        sensors: CalibrationSensors,
    ) -> Result<(), Self::Error>;

    fn auto_calibration(&mut self) -> Result<CalibrationSensors, Self::Error>;

    /// Persist the dynamic calibration data to hub flash.
    fn persist_calibration(&mut self) -> Result<(), Self::Error>;

    fn clear_calibration(&mut self) -> Result<(), Self::Error>;

    fn soft_reset(&mut self) -> Result<(), Self::Error>;
}
