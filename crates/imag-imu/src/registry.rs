//! Mapping between [`DataType`] and the sensor hub's native report ids.
//!
//! The table is built once and never mutated. Types without a native id are
//! unsupported by this firmware build; that is how hardware variants are
//! gated, not an error.

use crate::data_type::{DataType, PerType};

/// Native SH-2 report ids.
pub mod report_id {
    pub const ACCELEROMETER: u8 = 0x01;
    pub const GYROSCOPE_CALIBRATED: u8 = 0x02;
    pub const MAGNETIC_FIELD_CALIBRATED: u8 = 0x03;
    pub const ROTATION_VECTOR: u8 = 0x05;
    pub const GAME_ROTATION_VECTOR: u8 = 0x08;
    pub const GEOMAGNETIC_ROTATION_VECTOR: u8 = 0x09;
    pub const TAP_DETECTOR: u8 = 0x10;
    pub const STEP_COUNTER: u8 = 0x11;
    pub const SIGNIFICANT_MOTION: u8 = 0x12;
    pub const STABILITY_CLASSIFIER: u8 = 0x13;
    pub const STEP_DETECTOR: u8 = 0x18;
    pub const SHAKE_DETECTOR: u8 = 0x19;
    pub const STABILITY_DETECTOR: u8 = 0x1C;
    pub const PERSONAL_ACTIVITY_CLASSIFIER: u8 = 0x1E;
    pub const ARVR_STABILIZED_RV: u8 = 0x28;
    pub const ARVR_STABILIZED_GRV: u8 = 0x29;
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Registry {
    native: PerType<Option<u8>>,
}

impl Registry {
    /// Build the table for this firmware build.
    pub const fn new() -> Self {
        let mut slots = [None; DataType::COUNT];

        slots[DataType::Accel as usize] = Some(report_id::ACCELEROMETER);
        slots[DataType::Gyro as usize] = Some(report_id::GYROSCOPE_CALIBRATED);
        slots[DataType::Mag as usize] =
            Some(report_id::MAGNETIC_FIELD_CALIBRATED);
        slots[DataType::Rotation as usize] = Some(report_id::ROTATION_VECTOR);
        slots[DataType::RotationGame as usize] =
            Some(report_id::GAME_ROTATION_VECTOR);
        slots[DataType::RotationGeo as usize] =
            Some(report_id::GEOMAGNETIC_ROTATION_VECTOR);
        slots[DataType::RotationArvr as usize] =
            Some(report_id::ARVR_STABILIZED_RV);
        slots[DataType::RotationGameArvr as usize] =
            Some(report_id::ARVR_STABILIZED_GRV);

        #[cfg(feature = "detectors")]
        {
            slots[DataType::DetectTap as usize] = Some(report_id::TAP_DETECTOR);
            slots[DataType::DetectShake as usize] =
                Some(report_id::SHAKE_DETECTOR);
            slots[DataType::DetectStability as usize] =
                Some(report_id::STABILITY_DETECTOR);
            slots[DataType::DetectStep as usize] =
                Some(report_id::STEP_DETECTOR);
            slots[DataType::CountStep as usize] = Some(report_id::STEP_COUNTER);
            slots[DataType::ClassStability as usize] =
                Some(report_id::STABILITY_CLASSIFIER);
            slots[DataType::ClassActivity as usize] =
                Some(report_id::PERSONAL_ACTIVITY_CLASSIFIER);
            slots[DataType::SignificantMotion as usize] =
                Some(report_id::SIGNIFICANT_MOTION);
        }

        Self { native: PerType::from_slots(slots) }
    }

    /// Native report id of `data_type`, `None` if unsupported in this build.
    pub fn native_id(&self, data_type: DataType) -> Option<u8> {
        self.native.get(data_type)
    }

    /// Reverse lookup; `None` if no supported type uses `native_id`.
    pub fn data_type(&self, native_id: u8) -> Option<DataType> {
        DataType::ALL
            .iter()
            .copied()
            .find(|&t| self.native_id(t) == Some(native_id))
    }

    pub fn is_supported(&self, data_type: DataType) -> bool {
        self.native_id(data_type).is_some()
    }

    /// Supported types with their native ids, in ordinal order.
    pub fn supported(&self) -> impl Iterator<Item = (DataType, u8)> + '_ {
        DataType::ALL
            .iter()
            .filter_map(move |&t| self.native_id(t).map(|id| (t, id)))
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn supported_types_round_trip() {
        let registry = Registry::new();
        for (t, id) in registry.supported() {
            assert_eq!(registry.data_type(id), Some(t));
            assert_eq!(registry.native_id(t), Some(id));
        }
    }

    #[test]
    fn unknown_ids_map_to_none() {
        let registry = Registry::new();
        for id in 0..=u8::MAX {
            if registry.supported().all(|(_, native)| native != id) {
                assert_eq!(registry.data_type(id), None);
            }
        }
        assert_eq!(registry.data_type(0x00), None);
        assert_eq!(registry.data_type(0xFF), None);
    }

    #[test]
    fn rotation_and_raw_types_are_always_supported() {
        let registry = Registry::new();
        for t in DataType::ALL {
            if t.is_rotation() || t.is_vector() {
                assert!(registry.is_supported(t), "{:?}", t);
            }
        }
    }

    #[cfg(not(feature = "detectors"))]
    #[test]
    fn detectors_are_gated_off_by_default() {
        let registry = Registry::new();
        assert!(!registry.is_supported(DataType::DetectTap));
        assert!(!registry.is_supported(DataType::CountStep));
        assert_eq!(registry.data_type(report_id::TAP_DETECTOR), None);
    }

    #[test]
    fn native_ids_are_unique() {
        let registry = Registry::new();
        for (a, id_a) in registry.supported() {
            for (b, id_b) in registry.supported() {
                if a != b {
                    assert_ne!(id_a, id_b);
                }
            }
        }
    }
}
