use heapless::Vec;

use crate::data_type::DataType;

/// Query list capacity; duplicates are rejected, so every type fits once.
pub const MAX_QUERY_TYPES: usize = DataType::COUNT;

pub type QueryTypes = Vec<DataType, MAX_QUERY_TYPES>;

/// Default report rate in Hz.
pub const DEFAULT_RATE_HZ: u16 = 100;

/// Hardware and startup configuration of the orientation sensor.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SensorConfig {
    pub reset_pin: u8,
    pub interrupt_pin: u8,
    /// 0x4a on the Adafruit breakout, 0x4b on SlimeVR boards.
    pub i2c_address: u8,
    pub default_query_types: QueryTypes,
    pub default_rate_hz: u16,
}

impl Default for SensorConfig {
    fn default() -> Self {
        let mut default_query_types = QueryTypes::new();
        // Capacity is MAX_QUERY_TYPES, one entry always fits.
        let _ = default_query_types.push(DataType::Rotation);

        Self {
            reset_pin: 12,
            interrupt_pin: 11,
            i2c_address: 0x4b,
            default_query_types,
            default_rate_hz: DEFAULT_RATE_HZ,
        }
    }
}
