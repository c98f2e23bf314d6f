#![no_std]

use postcard_schema::Schema;
use serde::{Deserialize, Serialize};

macro_rules! define_config_enum {
    ($wrapper:ident, $external:path, { $($variant:ident),* $(,)? }) => {
        #[derive(Debug, PartialEq, Eq, Serialize, Deserialize, Schema, Clone, Copy)]
        #[cfg_attr(feature = "defmt", derive(defmt::Format))]
        pub enum $wrapper {
            $($variant),*
        }

        impl TryFrom<u8> for $wrapper {
            type Error = u8;

            fn try_from(value: u8) -> Result<Self, Self::Error> {
                match value {
                    $(x if x == Self::$variant as u8 => Ok(Self::$variant),)*
                    _ => Err(value),
                }
            }
        }

        impl From<$wrapper> for u8 {
            fn from(value: $wrapper) -> u8 {
                value as u8
            }
        }

        impl From<$external> for $wrapper {
            fn from(value: $external) -> Self {
                match value {
                    $(<$external>::$variant => Self::$variant),*
                }
            }
        }

        impl From<$wrapper> for $external {
            fn from(value: $wrapper) -> Self {
                match value {
                    $(<$wrapper>::$variant => <$external>::$variant),*
                }
            }
        }
    };
}

pub mod osc;

mod report;
pub use report::*;

/// Firmware version reported to hosts.
pub const FIRMWARE_VERSION: &str = env!("CARGO_PKG_VERSION");

// Battery types
#[derive(Debug, PartialEq, Serialize, Deserialize, Schema, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BatteryLevel(pub u8);

// Operator commands, as sent by a host or mapped from the display buttons.
#[derive(Debug, PartialEq, Eq, Serialize, Deserialize, Schema, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ImuCommand {
    BeginCalibration,
    StoreCalibration,
    CancelCalibration,
    ClearCalibration,
    TareHeading,
    TareFull,
    ResetTare,
}

impl TryFrom<u8> for ImuCommand {
    type Error = &'static str;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(ImuCommand::BeginCalibration),
            1 => Ok(ImuCommand::StoreCalibration),
            2 => Ok(ImuCommand::CancelCalibration),
            3 => Ok(ImuCommand::ClearCalibration),
            4 => Ok(ImuCommand::TareHeading),
            5 => Ok(ImuCommand::TareFull),
            6 => Ok(ImuCommand::ResetTare),
            _ => Err("Invalid imu command"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commands_from_bytes() {
        assert_eq!(ImuCommand::try_from(0), Ok(ImuCommand::BeginCalibration));
        assert_eq!(ImuCommand::try_from(6), Ok(ImuCommand::ResetTare));
        assert!(ImuCommand::try_from(7).is_err());
    }

    #[test]
    fn command_survives_postcard() {
        let mut buf = [0u8; 8];
        let bytes =
            postcard::to_slice(&ImuCommand::TareFull, &mut buf).unwrap();
        let back: ImuCommand = postcard::from_bytes(bytes).unwrap();
        assert_eq!(back, ImuCommand::TareFull);
    }
}
