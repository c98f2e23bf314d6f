//! Battery voltage gauge for a single-cell LiPo behind a 1:2 divider.

use imag_icd::BatteryLevel;

/// Raw samples averaged by the gauge.
pub const SMOOTHING_LEN: usize = 8;

const ADC_FULL_SCALE: f32 = 1024.0;
const ADC_REFERENCE_V: f32 = 3.3;
const DIVIDER_RATIO: f32 = 2.0;

/// Source of raw 10-bit battery readings.
pub trait BatteryProbe {
    type Error: core::fmt::Debug;

    fn read_raw(&mut self) -> Result<u16, Self::Error>;
}

/// Moving average over the last `N` samples. Starts filled with zeros.
#[derive(Debug, Clone)]
pub struct Smoother<const N: usize> {
    buffer: [u16; N],
    index: usize,
    sum: u32,
}

impl<const N: usize> Default for Smoother<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> Smoother<N> {
    pub const fn new() -> Self {
        const { assert!(N > 0, "smoother needs at least one slot") };
        Self { buffer: [0; N], index: 0, sum: 0 }
    }

    pub fn add(&mut self, value: u16) {
        self.sum -= u32::from(self.buffer[self.index]);
        self.buffer[self.index] = value;
        self.sum += u32::from(value);
        self.index = (self.index + 1) % N;
    }

    pub fn get(&self) -> u16 {
        (self.sum / N as u32) as u16
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Fill every slot with `value`, so the first reading is not averaged
    /// against zeros.
    pub fn prime(&mut self, value: u16) {
        self.buffer = [value; N];
        self.sum = u32::from(value) * N as u32;
        self.index = 0;
    }
}

#[derive(Debug, Clone, Default)]
pub struct BatteryGauge {
    smoother: Smoother<SMOOTHING_LEN>,
    primed: bool,
}

impl BatteryGauge {
    pub const fn new() -> Self {
        Self { smoother: Smoother::new(), primed: false }
    }

    pub fn add_sample(&mut self, raw: u16) {
        if self.primed {
            self.smoother.add(raw);
        } else {
            self.smoother.prime(raw);
            self.primed = true;
        }
    }

    /// Sample `probe` once. A failed read leaves the average untouched.
    pub fn sample<P: BatteryProbe>(&mut self, probe: &mut P) {
        match probe.read_raw() {
            Ok(raw) => {
                self.add_sample(raw);
                log_debug!("Battery: {:?} V", self.voltage());
            }
            Err(_) => log_warn!("Battery read failed"),
        }
    }

    pub fn has_reading(&self) -> bool {
        self.primed
    }

    pub fn voltage(&self) -> f32 {
        raw_to_voltage(self.smoother.get())
    }

    pub fn percentage(&self) -> u8 {
        voltage_to_percentage(self.voltage())
    }

    pub fn level(&self) -> BatteryLevel {
        BatteryLevel(self.percentage())
    }
}

pub fn raw_to_voltage(raw: u16) -> f32 {
    f32::from(raw) * DIVIDER_RATIO * ADC_REFERENCE_V / ADC_FULL_SCALE
}

/// Piecewise-linear LiPo charge estimate: 3.6..4.0 V maps to 1..80 %,
/// 4.0..4.2 V to 80..99 %.
pub fn voltage_to_percentage(voltage: f32) -> u8 {
    let percent = if voltage > 4.0 {
        map_range(voltage.min(4.2), 4.0, 4.2, 80.0, 99.0)
    } else {
        map_range(voltage.max(3.6), 3.6, 4.0, 1.0, 80.0)
    };
    percent as u8
}

fn map_range(
    x: f32,
    in_min: f32,
    in_max: f32,
    out_min: f32,
    out_max: f32,
) -> f32 {
    out_min + (out_max - out_min) * ((x - in_min) / (in_max - in_min))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn smoother_averages_last_samples() {
        let mut s = Smoother::<4>::new();
        for v in [4, 8, 12, 16] {
            s.add(v);
        }
        assert_eq!(s.get(), 10);
        s.add(20);
        assert_eq!(s.get(), 14);
        s.reset();
        assert_eq!(s.get(), 0);
    }

    #[test]
    fn single_slot_smoother_tracks_latest() {
        let mut s = Smoother::<1>::new();
        s.add(300);
        s.add(512);
        assert_eq!(s.get(), 512);
    }

    #[test]
    fn raw_reading_to_voltage() {
        assert!((raw_to_voltage(620) - 3.996).abs() < 0.01);
        assert_eq!(raw_to_voltage(0), 0.0);
    }

    #[test]
    fn percentage_curve() {
        assert_eq!(voltage_to_percentage(3.0), 1);
        assert_eq!(voltage_to_percentage(3.6), 1);
        assert_eq!(voltage_to_percentage(4.0), 80);
        assert_eq!(voltage_to_percentage(4.2), 99);
        assert_eq!(voltage_to_percentage(5.0), 99);
        let mid = voltage_to_percentage(3.8);
        assert!((40..=41).contains(&mid));
    }

    #[test]
    fn first_sample_primes_gauge() {
        let mut gauge = BatteryGauge::new();
        assert!(!gauge.has_reading());
        gauge.add_sample(620);
        assert!(gauge.has_reading());
        assert!((gauge.voltage() - 3.996).abs() < 0.01);
    }
}
