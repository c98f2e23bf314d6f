//! Recording sensor hub for host tests.

use embedded_hal::delay::DelayNs;
use heapless::{Deque, LinearMap, Vec};

use crate::hub::{
    CalibrationSensors, HubQuaternion, RawEvent, RawPayload, SensorHub,
    TareAxes, TareBasis,
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HubCall {
    Open(u8),
    SoftReset,
    EnableReport { native_id: u8, interval_us: u32 },
    PushReorientation(HubQuaternion),
    Tare(TareAxes, TareBasis),
    SetAutoCalibration(CalibrationSensors),
    AutoCalibration,
    PersistCalibration,
    ClearCalibration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MockError;

/// Operations the mock should refuse.
#[derive(Debug, Clone, Copy, Default)]
pub struct Failures {
    pub open: bool,
    pub soft_reset: bool,
    /// Refuse enabling/disabling this native id.
    pub enable: Option<u8>,
    pub enable_all: bool,
    pub reorientation: bool,
    pub tare: bool,
    pub auto_calibration: bool,
    pub persist: bool,
    pub clear: bool,
}

pub struct MockHub {
    pub calls: Vec<HubCall, 512>,
    pub events: Deque<RawEvent, 32>,
    pub failures: Failures,
    /// Raise the reset flag when a soft reset is accepted.
    pub confirms_reset: bool,
    reset_flag: bool,
    intervals: LinearMap<u8, u32, 32>,
    auto_calibration: CalibrationSensors,
}

impl Default for MockHub {
    fn default() -> Self {
        Self::new()
    }
}

impl MockHub {
    pub fn new() -> Self {
        Self {
            calls: Vec::new(),
            events: Deque::new(),
            failures: Failures::default(),
            confirms_reset: true,
            reset_flag: false,
            intervals: LinearMap::new(),
            auto_calibration: CalibrationSensors::empty(),
        }
    }

    /// Simulate a spontaneous hub reset.
    pub fn raise_reset(&mut self) {
        self.reset_flag = true;
    }

    pub fn queue(&mut self, event: RawEvent) {
        let _ = self.events.push_back(event);
    }

    pub fn queue_rotation(&mut self, native_id: u8, sequence: u8, status: u8) {
        self.queue(RawEvent {
            native_id,
            sequence,
            status,
            payload: RawPayload::Rotation {
                i: 0.0,
                j: 0.0,
                k: 0.0,
                real: 1.0,
                accuracy: 0.05,
            },
        });
    }

    pub fn queue_vector(&mut self, native_id: u8, sequence: u8, status: u8) {
        self.queue(RawEvent {
            native_id,
            sequence,
            status,
            payload: RawPayload::Vector { x: 0.1, y: 0.2, z: 9.8 },
        });
    }

    /// Current interval of a report; `None` if it was never configured.
    pub fn interval(&self, native_id: u8) -> Option<u32> {
        self.intervals.get(&native_id).copied()
    }

    /// Native ids with a non-zero interval, ascending.
    pub fn enabled(&self) -> Vec<u8, 32> {
        let mut ids: Vec<u8, 32> = self
            .intervals
            .iter()
            .filter(|(_, interval)| **interval != 0)
            .map(|(&id, _)| id)
            .collect();
        ids.sort_unstable();
        ids
    }

    pub fn count(&self, call: &HubCall) -> usize {
        self.calls.iter().filter(|c| *c == call).count()
    }

    pub fn last_reorientation(&self) -> Option<HubQuaternion> {
        self.calls.iter().rev().find_map(|c| match c {
            HubCall::PushReorientation(q) => Some(*q),
            _ => None,
        })
    }

    pub fn last_tare(&self) -> Option<(TareAxes, TareBasis)> {
        self.calls.iter().rev().find_map(|c| match c {
            HubCall::Tare(axes, basis) => Some((*axes, *basis)),
            _ => None,
        })
    }

    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }

    fn record(&mut self, call: HubCall) {
        let _ = self.calls.push(call);
    }

    fn outcome(refused: bool) -> Result<(), MockError> {
        if refused {
            Err(MockError)
        } else {
            Ok(())
        }
    }
}

impl SensorHub for MockHub {
    type Error = MockError;

    fn open(&mut self, address: u8) -> Result<(), Self::Error> {
        self.record(HubCall::Open(address));
        Self::outcome(self.failures.open)
    }

    fn was_reset(&mut self) -> bool {
        core::mem::take(&mut self.reset_flag)
    }

    fn enable_report(
        &mut self,
        native_id: u8,
        interval_us: u32,
    ) -> Result<(), Self::Error> {
        self.record(HubCall::EnableReport { native_id, interval_us });
        if self.failures.enable_all || self.failures.enable == Some(native_id)
        {
            return Err(MockError);
        }
        let _ = self.intervals.insert(native_id, interval_us);
        Ok(())
    }

    /// Reports the hub was told to disable are dropped; ids it never heard
    /// of are delivered as they come.
    fn poll_event(&mut self) -> Option<RawEvent> {
        while let Some(event) = self.events.pop_front() {
            match self.interval(event.native_id) {
                Some(0) => continue,
                _ => return Some(event),
            }
        }
        None
    }

    fn push_reorientation(
        &mut self,
        orientation: HubQuaternion,
    ) -> Result<(), Self::Error> {
        self.record(HubCall::PushReorientation(orientation));
        Self::outcome(self.failures.reorientation)
    }

    fn tare(
        &mut self,
        axes: TareAxes,
        basis: TareBasis,
    ) -> Result<(), Self::Error> {
        self.record(HubCall::Tare(axes, basis));
        Self::outcome(self.failures.tare)
    }

    fn set_auto_calibration(
        &mut self,
        sensors: CalibrationSensors,
    ) -> Result<(), Self::Error> {
        self.record(HubCall::SetAutoCalibration(sensors));
        Self::outcome(self.failures.auto_calibration)?;
        self.auto_calibration = sensors;
        Ok(())
    }

    fn auto_calibration(&mut self) -> Result<CalibrationSensors, Self::Error> {
        self.record(HubCall::AutoCalibration);
        Self::outcome(self.failures.auto_calibration)?;
        Ok(self.auto_calibration)
    }

    fn persist_calibration(&mut self) -> Result<(), Self::Error> {
        self.record(HubCall::PersistCalibration);
        Self::outcome(self.failures.persist)
    }

    fn clear_calibration(&mut self) -> Result<(), Self::Error> {
        self.record(HubCall::ClearCalibration);
        Self::outcome(self.failures.clear)
    }

    fn soft_reset(&mut self) -> Result<(), Self::Error> {
        self.record(HubCall::SoftReset);
        Self::outcome(self.failures.soft_reset)?;
        if self.confirms_reset {
            self.reset_flag = true;
        }
        Ok(())
    }
}

/// Delay that returns immediately and remembers how long it was asked to
/// wait.
#[derive(Debug, Default)]
pub struct MockDelay {
    pub waited_ns: u64,
}

impl DelayNs for MockDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.waited_ns += u64::from(ns);
    }
}
