use rapier3d::prelude::Real;
use nalgebra::Vector2;
use serde::{Serialize, Deserialize};

use crate::debug_builders::VehicleSnapshot;

// ---------------------------------------------
// INPUT
// ---------------------------------------------

/// Latest driver controls. Only `steer.x` drives anything.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InputSample {
    pub steer: Vector2<Real>, // -1 (left) .. 1 (right)
    pub gas: Real,            // -1 (reverse) .. 1 (forward)
    pub brake: Real,          // 0 .. 1
}

impl Default for InputSample {
    fn default() -> Self {
        Self {
            steer: Vector2::zeros(),
            gas: 0.0,
            brake: 0.0,
        }
    }
}

/// One control change, as delivered by the input source.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum InputEvent {
    Steer { x: Real, #[serde(default)] y: Real },
    Gas { value: Real },
    Brake { value: Real },
    Reset,
}

#[inline]
fn sanitize(v: Real, lo: Real, hi: Real) -> Real {
    if v.is_finite() { v.clamp(lo, hi) } else { 0.0 }
}

/// Last-sample-wins input store, read once at tick start.
#[derive(Debug, Clone, Default)]
pub struct InputState {
    sample: InputSample,
    reset_pending: bool,
}

impl InputState {
    pub fn sample(&self) -> InputSample {
        self.sample
    }

    /// Replace the whole sample.
    pub fn submit(&mut self, sample: InputSample) {
        self.sample = InputSample {
            steer: Vector2::new(sanitize(sample.steer.x, -1.0, 1.0), sanitize(sample.steer.y, -1.0, 1.0)),
            gas: sanitize(sample.gas, -1.0, 1.0),
            brake: sanitize(sample.brake, 0.0, 1.0),
        };
    }

    /// Merge a single channel into the sample.
    pub fn apply(&mut self, event: InputEvent) {
        match event {
            InputEvent::Steer { x, y } => {
                self.sample.steer = Vector2::new(sanitize(x, -1.0, 1.0), sanitize(y, -1.0, 1.0));
            }
            InputEvent::Gas { value } => self.sample.gas = sanitize(value, -1.0, 1.0),
            InputEvent::Brake { value } => self.sample.brake = sanitize(value, 0.0, 1.0),
            InputEvent::Reset => self.reset_pending = true,
        }
    }

    /// Consume the reset edge (true at most once per request burst).
    pub fn take_reset(&mut self) -> bool {
        std::mem::take(&mut self.reset_pending)
    }
}

// ---------------------------------------------
// SNAPSHOT
// ---------------------------------------------

#[derive(Serialize)]
pub struct Snapshot {
    pub tick: u64,
    pub vehicles: Vec<VehicleSnapshot>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn last_event_per_channel_wins() {
        let mut s = InputState::default();
        s.apply(InputEvent::Gas { value: 0.2 });
        s.apply(InputEvent::Steer { x: -0.4, y: 0.0 });
        s.apply(InputEvent::Gas { value: 0.9 });
        let sample = s.sample();
        assert_eq!(sample.gas, 0.9);
        assert_eq!(sample.steer.x, -0.4);
        assert_eq!(sample.brake, 0.0);
    }

    #[test]
    fn reset_is_edge_triggered() {
        let mut s = InputState::default();
        s.apply(InputEvent::Reset);
        s.apply(InputEvent::Reset);
        assert!(s.take_reset());
        assert!(!s.take_reset());
    }

    #[test]
    fn out_of_range_and_nan_are_tamed() {
        let mut s = InputState::default();
        s.apply(InputEvent::Brake { value: 3.0 });
        s.apply(InputEvent::Gas { value: Real::NAN });
        assert_eq!(s.sample().brake, 1.0);
        assert_eq!(s.sample().gas, 0.0);
    }

    #[test]
    fn submit_replaces_everything() {
        let mut s = InputState::default();
        s.apply(InputEvent::Brake { value: 1.0 });
        s.submit(InputSample { steer: Vector2::new(0.5, 0.0), gas: 1.0, brake: 0.0 });
        assert_eq!(s.sample().brake, 0.0);
        assert_eq!(s.sample().steer.x, 0.5);
    }

    #[test]
    fn events_parse_from_json() {
        let ev: InputEvent = serde_json::from_str(r#"{"type":"steer","x":0.25}"#).expect("steer");
        assert_eq!(ev, InputEvent::Steer { x: 0.25, y: 0.0 });
        let ev: InputEvent = serde_json::from_str(r#"{"type":"reset"}"#).expect("reset");
        assert_eq!(ev, InputEvent::Reset);
    }
}
