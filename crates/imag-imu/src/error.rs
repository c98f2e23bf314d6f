use crate::data_type::DataType;

/// Outcome of a failed orientation-core operation.
///
/// None of these are fatal for the process: the failing call is reported
/// and the caller decides whether to retry, surface or give up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// The hub did not answer at the configured address.
    DeviceNotFound,
    /// The soft reset command was refused.
    ResetFailed,
    /// The hub did not raise its reset flag after a soft reset.
    SensorNotReset,
    /// A report with this native id has no data type in this build.
    UnsupportedReport(u8),
    /// A data type without a native id was requested.
    UnsupportedDataType(DataType),
    /// Enabling or disabling this report failed; the rest were applied.
    ReportEnableFailed(DataType),
    ReorientationRejected,
    TareRejected,
    /// Setting or querying the dynamic calibration sensors failed.
    AutoCalibrationFailed,
    PersistFailed,
    ClearFailed,
    /// A hub reset was detected and the configuration could not be restored.
    ResetRecoveryFailed,
    CalibrationInProgress,
    NotCalibrating,
    /// The operation needs a configured hub; call `initialize` first.
    NotInitialized,
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Error::DeviceNotFound => write!(f, "Sensor hub not found"),
            Error::ResetFailed => write!(f, "Sensor hub soft reset failed"),
            Error::SensorNotReset => {
                write!(f, "Sensor hub did not confirm reset")
            }
            Error::UnsupportedReport(id) => {
                write!(f, "Unsupported report id: {:#04x}", id)
            }
            Error::UnsupportedDataType(t) => {
                write!(f, "Unsupported data type: {:?}", t)
            }
            Error::ReportEnableFailed(t) => {
                write!(f, "Failed to configure report: {:?}", t)
            }
            Error::ReorientationRejected => {
                write!(f, "Reorientation rejected by sensor hub")
            }
            Error::TareRejected => write!(f, "Tare rejected by sensor hub"),
            Error::AutoCalibrationFailed => {
                write!(f, "Dynamic calibration configuration failed")
            }
            Error::PersistFailed => {
                write!(f, "Failed to persist calibration data")
            }
            Error::ClearFailed => write!(f, "Failed to clear calibration data"),
            Error::ResetRecoveryFailed => {
                write!(f, "Failed to restore configuration after hub reset")
            }
            Error::CalibrationInProgress => {
                write!(f, "Calibration already in progress")
            }
            Error::NotCalibrating => write!(f, "No calibration in progress"),
            Error::NotInitialized => write!(f, "Sensor hub not initialized"),
        }
    }
}
