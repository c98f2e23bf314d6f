use derive_more::From;

use crate::events::SensorEventError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, From)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    Sensor(imag_imu::Error),
    Event(SensorEventError),
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Error::Sensor(e) => write!(f, "Sensor error: {}", e),
            Error::Event(e) => write!(f, "Event error: {}", e),
        }
    }
}
