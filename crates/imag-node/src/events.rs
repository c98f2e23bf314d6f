use derive_more::From;
use imag_icd::ImuCommand;

/// The three buttons beside the display, labelled per page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Button {
    A,
    B,
    C,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, From)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SensorEvent {
    Command(ImuCommand),
    Button(Button),
    /// Switch the display on or off.
    ToggleScreen,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SensorEventError {
    InvalidConversion(u8),
}

impl core::fmt::Display for SensorEventError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            SensorEventError::InvalidConversion(v) => {
                write!(f, "Invalid sensor event: {}", v)
            }
        }
    }
}

/// Commands keep their wire values; buttons and the screen toggle follow.
impl TryFrom<u8> for SensorEvent {
    type Error = SensorEventError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0..=6 => ImuCommand::try_from(value)
                .map(SensorEvent::Command)
                .map_err(|_| SensorEventError::InvalidConversion(value)),
            7 => Ok(SensorEvent::Button(Button::A)),
            8 => Ok(SensorEvent::Button(Button::B)),
            9 => Ok(SensorEvent::Button(Button::C)),
            10 => Ok(SensorEvent::ToggleScreen),
            _ => Err(SensorEventError::InvalidConversion(value)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_from_bytes() {
        assert_eq!(
            SensorEvent::try_from(4),
            Ok(SensorEvent::Command(ImuCommand::TareHeading))
        );
        assert_eq!(SensorEvent::try_from(9), Ok(SensorEvent::Button(Button::C)));
        assert_eq!(SensorEvent::try_from(10), Ok(SensorEvent::ToggleScreen));
        assert_eq!(
            SensorEvent::try_from(11),
            Err(SensorEventError::InvalidConversion(11))
        );
    }

    #[test]
    fn commands_convert_into_events() {
        let event: SensorEvent = ImuCommand::ResetTare.into();
        assert_eq!(event, SensorEvent::Command(ImuCommand::ResetTare));
    }
}
