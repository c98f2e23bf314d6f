//! Text content of the node's three-button display. Rendering to pixels is
//! left to the display driver.

use core::fmt::Write;

use heapless::{String, Vec};
use imag_icd::{ImuCommand, FIRMWARE_VERSION};

use crate::events::{Button, SensorEvent};
use crate::telemetry::Telemetry;

pub const LINE_LEN: usize = 24;
pub const MAX_LINES: usize = 6;

pub type Line = String<LINE_LEN>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Page {
    /// Screen off.
    None,
    #[default]
    Splash,
    Main,
    Calibration,
}

impl Page {
    /// Button labels for A, B and C.
    pub const fn buttons(self) -> [&'static str; 3] {
        match self {
            Page::Main => ["Screen", "North", "Config"],
            Page::Calibration => ["Clear", "Cancel", "Store"],
            Page::None | Page::Splash => ["", "", ""],
        }
    }

    /// What a button press means on this page.
    pub const fn button_event(self, button: Button) -> Option<SensorEvent> {
        match (self, button) {
            (Page::Main, Button::A) => Some(SensorEvent::ToggleScreen),
            (Page::Main, Button::B) => {
                Some(SensorEvent::Command(ImuCommand::TareHeading))
            }
            (Page::Main, Button::C) => {
                Some(SensorEvent::Command(ImuCommand::BeginCalibration))
            }
            (Page::Calibration, Button::A) => {
                Some(SensorEvent::Command(ImuCommand::ClearCalibration))
            }
            (Page::Calibration, Button::B) => {
                Some(SensorEvent::Command(ImuCommand::CancelCalibration))
            }
            (Page::Calibration, Button::C) => {
                Some(SensorEvent::Command(ImuCommand::StoreCalibration))
            }
            // Any button wakes a dark screen.
            (Page::None, _) => Some(SensorEvent::ToggleScreen),
            (Page::Splash, _) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DisplayContent {
    pub page: Page,
    pub lines: Vec<Line, MAX_LINES>,
    pub buttons: [&'static str; 3],
}

impl DisplayContent {
    pub fn render(page: Page, telemetry: &Telemetry, ssid: &str) -> Self {
        let mut lines = Vec::new();
        match page {
            Page::None => {}
            Page::Splash => {
                push_line(&mut lines, format_args!("ImagSens"));
                push_line(
                    &mut lines,
                    format_args!("version {}", FIRMWARE_VERSION),
                );
                if !telemetry.initialized {
                    push_line(&mut lines, format_args!("Initialising..."));
                }
            }
            Page::Main => {
                push_line(&mut lines, format_args!("{}", ssid));
                let north = if telemetry.tared { "[cstm]" } else { "[magn]" };
                push_line(&mut lines, format_args!("OSC {}", north));
                push_line(
                    &mut lines,
                    format_args!("Acc {:.2}", telemetry.reliability),
                );
                if telemetry.accuracy >= 0.0 {
                    push_line(
                        &mut lines,
                        format_args!("Err {:.3}", telemetry.accuracy),
                    );
                }
                if let Some([i, j, k, real]) = telemetry.rotation {
                    push_line(
                        &mut lines,
                        format_args!("{:.2} {:.2} {:.2} {:.2}", i, j, k, real),
                    );
                }
                push_battery(&mut lines, telemetry);
            }
            Page::Calibration => {
                push_line(&mut lines, format_args!("Calibrating..."));
                push_line(
                    &mut lines,
                    format_args!("Accuracy {:.2}", telemetry.reliability),
                );
                push_battery(&mut lines, telemetry);
            }
        }

        Self { page, lines, buttons: page.buttons() }
    }
}

fn push_battery(lines: &mut Vec<Line, MAX_LINES>, telemetry: &Telemetry) {
    if telemetry.battery_low {
        push_line(lines, format_args!("Bat Low"));
    } else {
        push_line(
            lines,
            format_args!(
                "Bat {:.2}V {}%",
                telemetry.battery_voltage, telemetry.battery_percentage
            ),
        );
    }
}

/// Lines longer than the display are cut off.
fn push_line(lines: &mut Vec<Line, MAX_LINES>, args: core::fmt::Arguments) {
    let mut line = Line::new();
    let _ = Truncating(&mut line).write_fmt(args);
    let _ = lines.push(line);
}

/// Writer that keeps whatever fits and drops the rest.
struct Truncating<'a>(&'a mut Line);

impl Write for Truncating<'_> {
    fn write_str(&mut self, s: &str) -> core::fmt::Result {
        for c in s.chars() {
            if self.0.push(c).is_err() {
                break;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn calibration_buttons_store_cancel_clear() {
        let page = Page::Calibration;
        assert_eq!(
            page.button_event(Button::C),
            Some(SensorEvent::Command(ImuCommand::StoreCalibration))
        );
        assert_eq!(
            page.button_event(Button::B),
            Some(SensorEvent::Command(ImuCommand::CancelCalibration))
        );
        assert_eq!(page.buttons(), ["Clear", "Cancel", "Store"]);
    }

    #[test]
    fn splash_ignores_buttons() {
        assert_eq!(Page::Splash.button_event(Button::A), None);
        assert_eq!(
            Page::None.button_event(Button::B),
            Some(SensorEvent::ToggleScreen)
        );
    }

    #[test]
    fn main_page_shows_state() {
        let telemetry = Telemetry {
            initialized: true,
            reliability: 1.0,
            accuracy: -1.0,
            battery_voltage: 3.9,
            battery_percentage: 60,
            ..Telemetry::default()
        };
        let content = DisplayContent::render(Page::Main, &telemetry, "imagination");

        assert_eq!(content.lines[0].as_str(), "imagination");
        assert_eq!(content.lines[1].as_str(), "OSC [magn]");
        assert_eq!(content.lines[2].as_str(), "Acc 1.00");
        assert_eq!(content.lines.last().unwrap().as_str(), "Bat 3.90V 60%");
        assert!(content.lines.iter().all(|l| !l.starts_with("Err")));
    }

    #[test]
    fn long_ssid_is_cut_to_line_width() {
        let ssid = "imagination-stage-left-node-07";
        let content =
            DisplayContent::render(Page::Main, &Telemetry::default(), ssid);

        assert_eq!(content.lines[0].as_str(), &ssid[..LINE_LEN]);
    }

    #[test]
    fn dark_page_is_empty() {
        let content =
            DisplayContent::render(Page::None, &Telemetry::default(), "x");
        assert!(content.lines.is_empty());
    }
}
