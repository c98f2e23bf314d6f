#![cfg_attr(not(test), no_std)]
//! Imagination sensor node: runs the orientation core against a transport,
//! a battery gauge and the operator's buttons and display.

// Must come first so the logging macros are visible to the other modules.
mod fmt;

pub mod battery;
pub mod config;
pub mod display;
mod error;
pub mod events;
mod node;
pub mod telemetry;

pub use battery::{BatteryGauge, BatteryProbe};
pub use config::{NetConfig, NodeConfig};
pub use display::{DisplayContent, Page};
pub use error::Error;
pub use events::{Button, SensorEvent, SensorEventError};
pub use node::{Node, ReportSink};
pub use telemetry::{Telemetry, TelemetryWatch, TELEMETRY_SUBS};
