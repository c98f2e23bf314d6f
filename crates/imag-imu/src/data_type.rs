//! Semantic report kinds and per-type bookkeeping.

use num_enum::{FromPrimitive, IntoPrimitive};

/// Semantic kind of a sensor report.
///
/// The discriminant is the ordinal used to index per-type tables; it has no
/// relation to the hub's native report id. Use [`Registry`](crate::Registry)
/// to translate between the two.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum DataType {
    /// Calibrated accelerometer, m/s^2.
    Accel = 0,
    /// Calibrated gyroscope, rad/s.
    Gyro,
    /// Calibrated magnetic field, uT.
    Mag,
    /// Absolute rotation vector (accel + gyro + mag).
    Rotation,
    /// Game rotation vector (accel + gyro, drifting heading).
    RotationGame,
    /// Geomagnetic rotation vector (accel + mag).
    RotationGeo,
    /// AR/VR stabilized rotation vector.
    RotationArvr,
    /// AR/VR stabilized game rotation vector.
    RotationGameArvr,
    DetectTap,
    DetectShake,
    DetectStability,
    DetectStep,
    CountStep,
    ClassStability,
    ClassActivity,
    SignificantMotion,
}

impl DataType {
    /// Number of variants, the size of every per-type table.
    pub const COUNT: usize = 16;

    /// Every variant in ordinal order.
    pub const ALL: [DataType; Self::COUNT] = [
        DataType::Accel,
        DataType::Gyro,
        DataType::Mag,
        DataType::Rotation,
        DataType::RotationGame,
        DataType::RotationGeo,
        DataType::RotationArvr,
        DataType::RotationGameArvr,
        DataType::DetectTap,
        DataType::DetectShake,
        DataType::DetectStability,
        DataType::DetectStep,
        DataType::CountStep,
        DataType::ClassStability,
        DataType::ClassActivity,
        DataType::SignificantMotion,
    ];

    /// Table index of this variant.
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Any of the fused rotation vector outputs.
    pub const fn is_rotation(self) -> bool {
        matches!(
            self,
            DataType::Rotation
                | DataType::RotationGame
                | DataType::RotationGeo
                | DataType::RotationArvr
                | DataType::RotationGameArvr
        )
    }

    /// Rotation outputs that carry a heading accuracy estimate.
    ///
    /// The game variants never reference magnetic north, so the hub sends
    /// no accuracy for them.
    pub const fn has_accuracy_estimate(self) -> bool {
        matches!(
            self,
            DataType::Rotation | DataType::RotationGeo | DataType::RotationArvr
        )
    }

    /// Three-axis vector outputs.
    pub const fn is_vector(self) -> bool {
        matches!(self, DataType::Accel | DataType::Gyro | DataType::Mag)
    }
}

/// Reliability ordinal carried in the two low status bits of every report.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, FromPrimitive, IntoPrimitive,
)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Reliability {
    #[num_enum(default)]
    Unreliable = 0,
    Low = 1,
    Medium = 2,
    High = 3,
}

impl Reliability {
    /// Extract the reliability from a raw status byte.
    pub fn from_status(status: u8) -> Self {
        Self::from(status & 0x03)
    }

    /// Normalized to `0.0..=1.0`.
    pub fn normalized(self) -> f32 {
        u8::from(self) as f32 / 3.0
    }
}

/// Allocation-free table with one slot per [`DataType`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PerType<T: Copy> {
    slots: [T; DataType::COUNT],
}

impl<T: Copy> PerType<T> {
    pub const fn filled(value: T) -> Self {
        Self { slots: [value; DataType::COUNT] }
    }

    pub const fn from_slots(slots: [T; DataType::COUNT]) -> Self {
        Self { slots }
    }

    #[inline]
    pub fn get(&self, data_type: DataType) -> T {
        self.slots[data_type.index()]
    }

    #[inline]
    pub fn set(&mut self, data_type: DataType, value: T) {
        self.slots[data_type.index()] = value;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordinals_match_table_order() {
        for (i, t) in DataType::ALL.iter().enumerate() {
            assert_eq!(t.index(), i);
        }
    }

    #[test]
    fn reliability_uses_two_low_bits() {
        assert_eq!(Reliability::from_status(0b10), Reliability::Medium);
        assert_eq!(Reliability::from_status(0b1111_0111), Reliability::High);
        assert_eq!(Reliability::from_status(0b100), Reliability::Unreliable);
        assert!((Reliability::Medium.normalized() - 2.0 / 3.0).abs() < 1e-6);
    }

    #[test]
    fn game_rotations_have_no_accuracy() {
        assert!(DataType::RotationGame.is_rotation());
        assert!(!DataType::RotationGame.has_accuracy_estimate());
        assert!(!DataType::RotationGameArvr.has_accuracy_estimate());
        assert!(DataType::RotationGeo.has_accuracy_estimate());
        assert!(!DataType::Mag.is_rotation());
    }
}
