#![cfg_attr(not(test), no_std)]
//! Orientation sensor core for a BNO08x-class sensor hub.
//!
//! [`OrientationSensor`] owns a [`SensorHub`] and turns its queued reports
//! into typed [`SensorReport`]s. It selects which reports the hub produces,
//! tracks reliability and heading accuracy of the primary output, restores
//! its configuration when the hub resets on its own, applies a mounting
//! reorientation and tare, and runs an operator-driven calibration session.

// Must come first so the logging macros are visible to the other modules.
mod fmt;

mod calibration;
mod config;
mod data_type;
mod error;
mod hub;
mod orientation;
mod registry;
mod sensor;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use calibration::{
    CalibrationSession, CALIBRATION_MAG_RATE_HZ, CALIBRATION_SENSORS,
};
pub use config::{QueryTypes, SensorConfig, DEFAULT_RATE_HZ, MAX_QUERY_TYPES};
pub use data_type::{DataType, PerType, Reliability};
pub use error::Error;
pub use hub::{
    CalibrationSensors, HubQuaternion, RawEvent, RawPayload, SensorHub,
    TareAxes, TareBasis,
};
pub use registry::{report_id, Registry};
pub use sensor::{
    OrientationSensor, SensorData, SensorReport, INVALID_ACCURACY,
};

pub use micromath::Quaternion;
