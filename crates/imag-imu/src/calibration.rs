//! Operator-supervised calibration following the hub vendor's sensor
//! calibration procedure.
//!
//! While a session runs, the query configuration is left untouched and the
//! hub streams game rotation plus magnetic field with all three sensors
//! calibrating dynamically. Reliability follows the magnetometer.

use embedded_hal::delay::DelayNs;

use crate::data_type::DataType;
use crate::error::Error;
use crate::hub::{CalibrationSensors, SensorHub};
use crate::sensor::{OrientationSensor, RESET_SETTLE_MS};

/// Magnetic field rate during calibration.
pub const CALIBRATION_MAG_RATE_HZ: u16 = 50;

/// Sensors calibrating dynamically during a calibration session.
pub const CALIBRATION_SENSORS: CalibrationSensors = CalibrationSensors::ACCEL
    .union(CalibrationSensors::GYRO)
    .union(CalibrationSensors::MAG);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CalibrationSession {
    #[default]
    Idle,
    Calibrating,
}

impl CalibrationSession {
    pub fn is_calibrating(self) -> bool {
        self == CalibrationSession::Calibrating
    }
}

/// Outcome of a best-effort sequence of hub commands.
#[derive(Debug, Default)]
pub(crate) struct Steps {
    succeeded: u8,
    failed: u8,
    first_error: Option<Error>,
}

impl Steps {
    pub(crate) fn record(&mut self, result: Result<(), Error>) {
        match result {
            Ok(()) => self.succeeded += 1,
            Err(e) => {
                self.failed += 1;
                self.first_error.get_or_insert(e);
            }
        }
    }

    pub(crate) fn majority_succeeded(&self) -> bool {
        self.succeeded > self.failed
    }

    pub(crate) fn result(&self) -> Result<(), Error> {
        match self.first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

impl<H: SensorHub, D: DelayNs> OrientationSensor<'_, H, D> {
    /// Switch the hub into calibration mode.
    ///
    /// Best effort: if most steps succeed the session starts even though an
    /// error is returned. Otherwise normal operation is restored. A second
    /// call while calibrating is rejected and changes nothing.
    pub fn begin_calibration(&mut self) -> Result<(), Error> {
        if self.session.is_calibrating() {
            log_warn!("Calibration already in progress");
            return Err(Error::CalibrationInProgress);
        }
        if !self.initialized {
            return Err(Error::NotInitialized);
        }

        let steps = self.apply_calibration_setup();

        if steps.majority_succeeded() {
            self.reliability_source = Some(DataType::Mag);
            self.session = CalibrationSession::Calibrating;
            log_info!("Calibration started");
        } else {
            log_error!("Calibration setup failed, restoring normal operation");
            if let Err(e) = self.reinitialize() {
                log_error!("Restoring normal operation failed: {:?}", e);
            }
        }

        steps.result()
    }

    /// Leave calibration mode, persisting the calibration data if `save`.
    ///
    /// If persisting fails the session keeps running so the operator can
    /// retry or discard.
    pub fn end_calibration(&mut self, save: bool) -> Result<(), Error> {
        if !self.session.is_calibrating() {
            return Err(Error::NotCalibrating);
        }

        if save {
            if self.hub.persist_calibration().is_err() {
                log_error!("Error saving dynamic calibration data");
                return Err(Error::PersistFailed);
            }
            self.delay.delay_ms(RESET_SETTLE_MS);
            log_info!("Calibration data saved");
        } else {
            log_info!("Calibration discarded");
        }

        self.session = CalibrationSession::Idle;
        self.reinitialize()
    }

    /// Erase the persisted calibration data and return to normal operation.
    pub fn clear_calibration(&mut self) -> Result<(), Error> {
        if self.hub.clear_calibration().is_err() {
            log_error!("Error clearing calibration data");
            return Err(Error::ClearFailed);
        }
        self.delay.delay_ms(RESET_SETTLE_MS);
        log_info!("Calibration data cleared");

        self.session = CalibrationSession::Idle;
        self.reinitialize()
    }

    pub fn is_calibrating(&self) -> bool {
        self.session.is_calibrating()
    }

    pub fn calibration_session(&self) -> CalibrationSession {
        self.session
    }

    /// Sensors the hub currently calibrates dynamically.
    pub fn dynamic_calibration_sensors(
        &mut self,
    ) -> Result<CalibrationSensors, Error> {
        let sensors = self.hub.auto_calibration().map_err(|_| {
            log_error!("Querying dynamic calibration state failed");
            Error::AutoCalibrationFailed
        })?;

        log_debug!(
            "Dynamic calibration: accel {:?}, gyro {:?}, mag {:?}, planar {:?}",
            sensors.contains(CalibrationSensors::ACCEL),
            sensors.contains(CalibrationSensors::GYRO),
            sensors.contains(CalibrationSensors::MAG),
            sensors.contains(CalibrationSensors::PLANAR),
        );

        Ok(sensors)
    }

    pub(crate) fn apply_calibration_setup(&mut self) -> Steps {
        let mut steps = Steps::default();

        steps.record(self.disable_all());
        steps.record(
            self.hub
                .set_auto_calibration(CALIBRATION_SENSORS)
                .map_err(|_| Error::AutoCalibrationFailed),
        );
        let game_rate = self.rates.get(DataType::RotationGame);
        steps.record(self.enable(DataType::RotationGame, game_rate));
        steps.record(self.enable(DataType::Mag, CALIBRATION_MAG_RATE_HZ));

        steps
    }
}
