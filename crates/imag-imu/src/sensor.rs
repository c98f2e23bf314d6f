//! Orientation sensor core: report selection, reset recovery and the
//! reliability/accuracy bookkeeping of incoming reports.
//!
//! The core is driven by a caller-owned polling loop. Nothing here blocks
//! waiting for data and nothing is retried beyond the one-shot reinit when
//! the hub reports that it reset itself.
//!
//! All methods take `&mut self`, so `read` and `set_query_configuration`
//! can never run inside each other. Accessors hand out copies.

use embedded_hal::delay::DelayNs;
use heapless::Vec;
use micromath::Quaternion;

use crate::calibration::CalibrationSession;
use crate::config::{QueryTypes, SensorConfig};
use crate::data_type::{DataType, PerType, Reliability};
use crate::error::Error;
use crate::hub::{CalibrationSensors, HubQuaternion, RawPayload, SensorHub};
use crate::registry::Registry;

/// Accuracy value meaning "not available for the current source".
pub const INVALID_ACCURACY: f32 = -1.0;

/// Sensors calibrating dynamically during normal operation.
pub(crate) const DEFAULT_AUTO_CALIBRATION: CalibrationSensors =
    CalibrationSensors::ACCEL;

/// Time for the hub to come back after a soft reset.
pub(crate) const RESET_SETTLE_MS: u32 = 100;

/// Type-specific content of a report.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SensorData {
    Rotation(Quaternion),
    Vector([f32; 3]),
    Scalar(u32),
}

impl SensorData {
    /// Flattened payload for the transport. Rotations are sent as
    /// `[i, j, k, real]`.
    pub fn payload(&self) -> Vec<f32, 4> {
        let mut out = Vec::new();
        // At most four values, always fits.
        let _ = match *self {
            SensorData::Rotation(q) => {
                out.extend_from_slice(&[q.x(), q.y(), q.z(), q.w()]).is_ok()
            }
            SensorData::Vector(v) => out.extend_from_slice(&v).is_ok(),
            SensorData::Scalar(n) => out.push(n as f32).is_ok(),
        };
        out
    }
}

impl From<RawPayload> for SensorData {
    fn from(payload: RawPayload) -> Self {
        match payload {
            RawPayload::Rotation { i, j, k, real, .. } => {
                SensorData::Rotation(Quaternion::new(real, i, j, k))
            }
            RawPayload::Vector { x, y, z } => SensorData::Vector([x, y, z]),
            RawPayload::Scalar(n) => SensorData::Scalar(n),
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for SensorData {
    fn format(&self, f: defmt::Formatter) {
        match *self {
            SensorData::Rotation(q) => defmt::write!(
                f,
                "Rotation(w={}, x={}, y={}, z={})",
                q.w(),
                q.x(),
                q.y(),
                q.z()
            ),
            SensorData::Vector(v) => defmt::write!(f, "Vector({})", v),
            SensorData::Scalar(n) => defmt::write!(f, "Scalar({})", n),
        }
    }
}

/// The most recently read report.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SensorReport {
    pub data_type: DataType,
    pub sequence: u8,
    /// Present only if this report's type is the reliability source.
    pub reliability: Option<Reliability>,
    /// Radians. Present only if this report's type is the accuracy source
    /// and carries an accuracy estimate.
    pub accuracy: Option<f32>,
    pub data: SensorData,
}

pub struct OrientationSensor<'r, H: SensorHub, D: DelayNs> {
    pub(crate) hub: H,
    pub(crate) delay: D,
    pub(crate) registry: &'r Registry,
    pub(crate) initialized: bool,
    pub(crate) session: CalibrationSession,
    pub(crate) query: QueryTypes,
    pub(crate) rates: PerType<u16>,
    sequences: PerType<Option<u8>>,
    missed_reports: u32,
    pub(crate) reorientation: Quaternion,
    last: Option<SensorReport>,
    last_rotation: Option<Quaternion>,
    reliability: Reliability,
    accuracy: f32,
    pub(crate) reliability_source: Option<DataType>,
    pub(crate) accuracy_source: Option<DataType>,
}

impl<'r, H: SensorHub, D: DelayNs> OrientationSensor<'r, H, D> {
    /// Create the core. Unsupported entries of the configured default
    /// query are dropped here and reported again by
    /// [`set_query_configuration`](Self::set_query_configuration).
    pub fn new(
        hub: H,
        delay: D,
        registry: &'r Registry,
        config: &SensorConfig,
    ) -> Self {
        let mut query = QueryTypes::new();
        for &t in config.default_query_types.iter() {
            if registry.is_supported(t) && !query.contains(&t) {
                let _ = query.push(t);
            }
        }
        let first = query.first().copied();

        Self {
            hub,
            delay,
            registry,
            initialized: false,
            session: CalibrationSession::Idle,
            query,
            rates: PerType::filled(config.default_rate_hz.max(1)),
            sequences: PerType::filled(None),
            missed_reports: 0,
            reorientation: Quaternion::new(1.0, 0.0, 0.0, 0.0),
            last: None,
            last_rotation: None,
            reliability: Reliability::Unreliable,
            accuracy: INVALID_ACCURACY,
            reliability_source: first,
            accuracy_source: first,
        }
    }

    /// Open the hub, soft-reset it and apply the full configuration.
    ///
    /// Some hub firmware revisions hang on calibration configuration after a
    /// warm start unless they are reset first.
    pub fn initialize(&mut self, address: u8) -> Result<(), Error> {
        self.initialized = false;

        if self.hub.open(address).is_err() {
            log_error!("Sensor hub not found at {:?}", address);
            return Err(Error::DeviceNotFound);
        }

        if self.hub.soft_reset().is_err() {
            log_error!("Sensor hub soft reset failed");
            return Err(Error::ResetFailed);
        }
        self.delay.delay_ms(RESET_SETTLE_MS);

        // Consumes the flag raised by our own reset.
        if !self.hub.was_reset() {
            log_error!("Sensor hub did not confirm reset");
            return Err(Error::SensorNotReset);
        }

        self.reinitialize()
    }

    /// Re-apply default dynamic calibration, the query configuration and the
    /// reorientation, in that order. Stops at the first failing stage.
    ///
    /// A running calibration session survives: its setup is applied on top
    /// and reliability stays pinned to the magnetometer.
    pub fn reinitialize(&mut self) -> Result<(), Error> {
        self.initialized = false;

        if self.hub.set_auto_calibration(DEFAULT_AUTO_CALIBRATION).is_err() {
            log_error!("Error setting default dynamic calibration sensors");
            return Err(Error::AutoCalibrationFailed);
        }

        if let Err(e) = self.apply_query() {
            log_error!("Could not set reports: {:?}", e);
            return Err(e);
        }

        if let Err(e) = self.push_reorientation() {
            log_error!("Error setting reorientation: {:?}", e);
            return Err(e);
        }

        if self.session.is_calibrating() {
            if let Err(e) = self.apply_calibration_setup().result() {
                log_warn!("Calibration setup incomplete: {:?}", e);
            }
            self.reliability_source = Some(DataType::Mag);
        }

        self.initialized = true;
        log_info!("Sensor hub configured, querying {:?}", self.query.as_slice());
        Ok(())
    }

    /// Read the next queued report.
    ///
    /// `Ok(None)` means nothing is queued; poll again later. A report whose
    /// native id has no data type is dropped and leaves all state untouched.
    pub fn read(&mut self) -> Result<Option<SensorReport>, Error> {
        if self.hub.was_reset() {
            log_warn!("Sensor hub reset detected, restoring configuration");
            if self.reinitialize().is_err() {
                return Err(Error::ResetRecoveryFailed);
            }
        }

        let Some(event) = self.hub.poll_event() else {
            return Ok(None);
        };

        let Some(data_type) = self.registry.data_type(event.native_id) else {
            log_warn!("Received unsupported report id {:?}", event.native_id);
            return Err(Error::UnsupportedReport(event.native_id));
        };

        self.track_sequence(data_type, event.sequence);

        let reliability = if Some(data_type) == self.reliability_source {
            let reliability = Reliability::from_status(event.status);
            self.reliability = reliability;
            Some(reliability)
        } else {
            None
        };

        let accuracy = if Some(data_type) == self.accuracy_source {
            let accuracy = match event.payload {
                RawPayload::Rotation { accuracy, .. }
                    if data_type.has_accuracy_estimate() =>
                {
                    Some(accuracy)
                }
                _ => None,
            };
            self.accuracy = accuracy.unwrap_or(INVALID_ACCURACY);
            accuracy
        } else {
            None
        };

        let report = SensorReport {
            data_type,
            sequence: event.sequence,
            reliability,
            accuracy,
            data: event.payload.into(),
        };
        if let SensorData::Rotation(q) = report.data {
            self.last_rotation = Some(q);
        }
        self.last = Some(report);

        Ok(Some(report))
    }

    /// Replace the set of requested reports.
    ///
    /// Unsupported types are skipped and the supported rest is applied
    /// anyway; the result reports the first problem encountered.
    /// Duplicates keep their first position.
    pub fn set_query_configuration(
        &mut self,
        types: &[DataType],
    ) -> Result<(), Error> {
        if self.session.is_calibrating() {
            log_warn!("Query configuration locked while calibrating");
            return Err(Error::CalibrationInProgress);
        }

        let mut unsupported = None;
        let mut query = QueryTypes::new();
        for &t in types {
            if !self.registry.is_supported(t) {
                log_warn!("Data type {:?} not supported", t);
                unsupported.get_or_insert(t);
            } else if !query.contains(&t) && query.push(t).is_err() {
                break;
            }
        }
        self.query = query;

        let applied = self.apply_query();
        match unsupported {
            Some(t) => Err(Error::UnsupportedDataType(t)),
            None => applied,
        }
    }

    /// Change the rate of one data type, re-applying the query if the type
    /// is currently requested.
    pub fn set_report_rate(
        &mut self,
        data_type: DataType,
        rate_hz: u16,
    ) -> Result<(), Error> {
        if !self.registry.is_supported(data_type) {
            return Err(Error::UnsupportedDataType(data_type));
        }
        self.rates.set(data_type, rate_hz.max(1));

        if self.query.contains(&data_type) && !self.session.is_calibrating() {
            self.apply_query()
        } else {
            Ok(())
        }
    }

    pub fn report_rate(&self, data_type: DataType) -> u16 {
        self.rates.get(data_type)
    }

    /// Reliability of the current source, `0.0..=1.0`.
    pub fn current_reliability(&self) -> f32 {
        self.reliability.normalized()
    }

    pub fn reliability(&self) -> Reliability {
        self.reliability
    }

    /// Accuracy in radians, or [`INVALID_ACCURACY`] if the current source
    /// does not provide one.
    pub fn current_accuracy(&self) -> f32 {
        self.accuracy
    }

    pub fn last_data_type(&self) -> Option<DataType> {
        self.last.map(|r| r.data_type)
    }

    pub fn last_report(&self) -> Option<SensorReport> {
        self.last
    }

    /// The last rotation payload received, whatever was read after it.
    pub fn last_rotation(&self) -> Option<Quaternion> {
        self.last_rotation
    }

    pub fn query_configuration(&self) -> QueryTypes {
        self.query.clone()
    }

    pub fn reliability_source(&self) -> Option<DataType> {
        self.reliability_source
    }

    pub fn accuracy_source(&self) -> Option<DataType> {
        self.accuracy_source
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Reports lost according to sequence number gaps.
    pub fn missed_reports(&self) -> u32 {
        self.missed_reports
    }

    pub fn registry(&self) -> &'r Registry {
        self.registry
    }

    pub fn hub(&self) -> &H {
        &self.hub
    }

    pub fn hub_mut(&mut self) -> &mut H {
        &mut self.hub
    }

    /// Give back the hub and delay.
    pub fn release(self) -> (H, D) {
        (self.hub, self.delay)
    }

    /// Disable everything, enable the query at its rates and point the
    /// reliability/accuracy sources at its first entry.
    pub(crate) fn apply_query(&mut self) -> Result<(), Error> {
        let mut result = self.disable_all();

        let query = self.query.clone();
        for &t in query.iter() {
            let rate = self.rates.get(t);
            if let Err(e) = self.enable(t, rate) {
                result = result.and(Err(e));
            }
        }

        self.reliability_source = query.first().copied();
        self.accuracy_source = self.reliability_source;

        result
    }

    /// Turn every supported report off. Sequence tracking restarts, since a
    /// report enabled afterwards begins a new stream.
    pub(crate) fn disable_all(&mut self) -> Result<(), Error> {
        self.sequences = PerType::filled(None);
        let mut result = Ok(());
        let registry = self.registry;
        for (t, native_id) in registry.supported() {
            if self.hub.enable_report(native_id, 0).is_err() {
                log_warn!("Error disabling report {:?}", t);
                result = result.and(Err(Error::ReportEnableFailed(t)));
            }
        }
        result
    }

    pub(crate) fn enable(
        &mut self,
        data_type: DataType,
        rate_hz: u16,
    ) -> Result<(), Error> {
        let native_id = self
            .registry
            .native_id(data_type)
            .ok_or(Error::UnsupportedDataType(data_type))?;

        self.hub
            .enable_report(native_id, interval_us(rate_hz))
            .map_err(|_| {
                log_warn!("Error enabling report {:?}", data_type);
                Error::ReportEnableFailed(data_type)
            })
    }

    pub(crate) fn push_reorientation(&mut self) -> Result<(), Error> {
        self.hub
            .push_reorientation(HubQuaternion::from(self.reorientation))
            .map_err(|_| Error::ReorientationRejected)
    }

    fn track_sequence(&mut self, data_type: DataType, sequence: u8) {
        if let Some(previous) = self.sequences.get(data_type) {
            let gap = sequence.wrapping_sub(previous.wrapping_add(1));
            if gap != 0 {
                log_debug!("{:?}: {:?} reports missed", data_type, gap);
                self.missed_reports =
                    self.missed_reports.saturating_add(u32::from(gap));
            }
        }
        self.sequences.set(data_type, Some(sequence));
    }
}

/// Report interval for the hub, which takes microseconds.
pub(crate) fn interval_us(rate_hz: u16) -> u32 {
    1_000_000 / u32::from(rate_hz.max(1))
}
