//! Reference-frame handling: the stored mount reorientation and tare.

use embedded_hal::delay::DelayNs;
use micromath::Quaternion;

use crate::data_type::DataType;
use crate::error::Error;
use crate::hub::{SensorHub, TareAxes, TareBasis};
use crate::sensor::OrientationSensor;

impl<H: SensorHub, D: DelayNs> OrientationSensor<'_, H, D> {
    /// Store `orientation` (w, x, y, z) and send it to the hub.
    ///
    /// The value is kept even if the hub refuses it, and is re-applied on
    /// every reinit.
    pub fn set_reorientation(
        &mut self,
        orientation: Quaternion,
    ) -> Result<(), Error> {
        self.reorientation = orientation;
        self.push_reorientation().map_err(|e| {
            log_error!("Error setting reorientation to sensor");
            e
        })
    }

    pub fn reorientation(&self) -> Quaternion {
        self.reorientation
    }

    /// Tare against the first requested rotation output. Heading tare
    /// touches Z only; a full tare levels all three axes.
    pub fn tare(&mut self, full: bool) -> Result<(), Error> {
        if !self.initialized {
            return Err(Error::NotInitialized);
        }
        let basis = self.tare_basis();
        let axes = if full { TareAxes::all() } else { TareAxes::Z };

        self.hub.tare(axes, basis).map_err(|_| {
            log_error!("Error setting tare {:?} on {:?}", axes, basis);
            Error::TareRejected
        })
    }

    pub fn tare_heading(&mut self) -> Result<(), Error> {
        self.tare(false)
    }

    pub fn tare_full(&mut self) -> Result<(), Error> {
        self.tare(true)
    }

    /// Drop any hub-side tare by re-sending the stored reorientation.
    pub fn reset_tare(&mut self) -> Result<(), Error> {
        if !self.initialized {
            return Err(Error::NotInitialized);
        }
        self.push_reorientation()
    }

    fn tare_basis(&self) -> TareBasis {
        match self.query.first() {
            Some(DataType::RotationGame) => TareBasis::GamingRotationVector,
            Some(DataType::RotationGeo) => TareBasis::GeomagneticRotationVector,
            _ => TareBasis::RotationVector,
        }
    }
}
