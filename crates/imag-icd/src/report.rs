use heapless::Vec;
use imag_imu::SensorReport;
use postcard_schema::Schema;
use serde::{Deserialize, Serialize};

use crate::osc;

define_config_enum!(
    ReportKind,
    imag_imu::DataType,
    {
        Accel,
        Gyro,
        Mag,
        Rotation,
        RotationGame,
        RotationGeo,
        RotationArvr,
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
);

define_config_enum!(
    ReportReliability,
    imag_imu::Reliability,
    {
        Unreliable,
        Low,
        Medium,
        High,
    }
);

impl ReportKind {
    /// OSC address the transport publishes this kind under.
    pub const fn osc_address(self) -> &'static str {
        match self {
            ReportKind::Rotation
            | ReportKind::RotationGame
            | ReportKind::RotationGeo
            | ReportKind::RotationArvr
            | ReportKind::RotationGameArvr => osc::address::ROTATION,
            ReportKind::Accel => osc::address::ACCEL,
            ReportKind::Gyro => osc::address::GYRO,
            ReportKind::Mag => osc::address::MAG,
            _ => osc::address::INVALID,
        }
    }
}

/// One report as handed to the transport.
#[derive(Debug, PartialEq, Serialize, Deserialize, Schema, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SensorMessage {
    pub kind: ReportKind,
    /// Rotations are `[i, j, k, real]`, vectors `[x, y, z]`.
    pub payload: Vec<f32, 4>,
    pub reliability: Option<ReportReliability>,
}

impl SensorMessage {
    pub fn osc_address(&self) -> &'static str {
        self.kind.osc_address()
    }

    /// Encode as an OSC message with one float argument per payload value.
    pub fn to_osc(&self) -> Result<osc::OscBuffer, osc::OscError> {
        osc::encode(self.osc_address(), &self.payload)
    }
}

impl From<&SensorReport> for SensorMessage {
    fn from(report: &SensorReport) -> Self {
        Self {
            kind: report.data_type.into(),
            payload: report.data.payload(),
            reliability: report.reliability.map(Into::into),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use imag_imu::{DataType, Quaternion, Reliability, SensorData};

    #[test]
    fn kinds_mirror_data_type_ordinals() {
        for t in DataType::ALL {
            let kind = ReportKind::from(t);
            assert_eq!(u8::from(kind) as usize, t.index());
            assert_eq!(DataType::from(kind), t);
            assert_eq!(ReportKind::try_from(t as u8), Ok(kind));
        }
        assert_eq!(ReportKind::try_from(16), Err(16));
    }

    #[test]
    fn rotation_kinds_share_address() {
        assert_eq!(ReportKind::Rotation.osc_address(), "/rot");
        assert_eq!(ReportKind::RotationGameArvr.osc_address(), "/rot");
        assert_eq!(ReportKind::Gyro.osc_address(), "/gyro");
        assert_eq!(ReportKind::DetectTap.osc_address(), "/invalid");
    }

    #[test]
    fn message_from_rotation_report() {
        let report = SensorReport {
            data_type: DataType::RotationGame,
            sequence: 3,
            reliability: Some(Reliability::Medium),
            accuracy: None,
            data: SensorData::Rotation(Quaternion::new(0.5, 0.1, 0.2, 0.3)),
        };
        let message = SensorMessage::from(&report);

        assert_eq!(message.kind, ReportKind::RotationGame);
        assert_eq!(message.payload.as_slice(), &[0.1, 0.2, 0.3, 0.5]);
        assert_eq!(message.reliability, Some(ReportReliability::Medium));
        assert_eq!(message.osc_address(), "/rot");
    }

    #[test]
    fn message_survives_postcard() {
        let mut payload = Vec::new();
        payload.extend_from_slice(&[0.0, 9.8, 0.1]).unwrap();
        let message = SensorMessage {
            kind: ReportKind::Accel,
            payload,
            reliability: None,
        };

        let mut buf = [0u8; 32];
        let bytes = postcard::to_slice(&message, &mut buf).unwrap();
        let back: SensorMessage = postcard::from_bytes(bytes).unwrap();
        assert_eq!(back, message);
    }
}
