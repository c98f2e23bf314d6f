use heapless::String;
use imag_imu::SensorConfig;

pub const MAX_SSID_LEN: usize = 32;
pub const MAX_KEY_LEN: usize = 64;

/// Wireless link and OSC endpoints.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct NetConfig {
    pub local_ip: [u8; 4],
    pub local_port: u16,
    pub remote_ip: [u8; 4],
    pub remote_port: u16,
    pub ssid: String<MAX_SSID_LEN>,
    pub key: String<MAX_KEY_LEN>,
    pub channel: u8,
}

impl Default for NetConfig {
    fn default() -> Self {
        Self {
            local_ip: [192, 168, 1, 1],
            local_port: 9336,
            remote_ip: [192, 168, 1, 100],
            remote_port: 9336,
            ssid: short_string("imagination"),
            key: short_string("atmospheres"),
            channel: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct NodeConfig {
    pub sensor: SensorConfig,
    pub net: NetConfig,
    /// Polls between attempts to bring up a sensor hub that is not
    /// initialized.
    pub init_retry_polls: u32,
    /// Polls between battery samples.
    pub battery_read_polls: u32,
    /// At or below this charge the display warns about the battery.
    pub low_battery_percent: u8,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            sensor: SensorConfig::default(),
            net: NetConfig::default(),
            init_retry_polls: 1_000,
            // 10 s at the default 100 Hz report rate.
            battery_read_polls: 1_000,
            low_battery_percent: 10,
        }
    }
}

fn short_string<const N: usize>(s: &str) -> String<N> {
    let mut out = String::new();
    for c in s.chars() {
        if out.push(c).is_err() {
            break;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_deployment() {
        let config = NodeConfig::default();
        assert_eq!(config.sensor.i2c_address, 0x4b);
        assert_eq!(config.net.remote_ip, [192, 168, 1, 100]);
        assert_eq!(config.net.ssid.as_str(), "imagination");
        assert_eq!(config.net.channel, 1);
    }

    #[test]
    fn long_strings_are_truncated() {
        let s: String<4> = short_string("imagination");
        assert_eq!(s.as_str(), "imag");
    }
}
