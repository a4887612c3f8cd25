//! Core simulation primitives and traits.

pub mod fixed;
pub mod logging;
pub mod vdp;

use serde_json::Value;

/// A frame-stepped simulation core.
///
/// One call to [`Machine::step_frame`] advances the simulation by exactly one
/// display frame and returns the assembled sprite attribute table for the
/// presentation backend. There are no suspension points inside a frame.
pub trait Machine {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Reset to initial power-on state
    fn reset(&mut self);

    /// Simulate one frame and return the finished sprite table.
    fn step_frame(&mut self) -> Result<vdp::SpriteTable, Self::Error>;

    /// Return a JSON-serializable save state for debugging.
    /// Note: Save states should NOT include asset data (animation scripts,
    /// sprite mappings). Only save simulation state (pool, scroll, queues).
    fn save_state(&self) -> Value;

    /// Load a JSON save state.
    /// Returns error if the state is incompatible with this machine.
    fn load_state(&mut self, v: &Value) -> Result<(), serde_json::Error>;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct MockMachine {
        frames: u32,
    }

    impl Machine for MockMachine {
        type Error = std::convert::Infallible;

        fn reset(&mut self) {
            self.frames = 0;
        }

        fn step_frame(&mut self) -> Result<vdp::SpriteTable, Self::Error> {
            self.frames += 1;
            let mut table = vdp::SpriteTable::new();
            table.terminate();
            Ok(table)
        }

        fn save_state(&self) -> Value {
            serde_json::json!({"frames": self.frames})
        }

        fn load_state(&mut self, v: &Value) -> Result<(), serde_json::Error> {
            self.frames = serde_json::from_value(v["frames"].clone())?;
            Ok(())
        }
    }

    #[test]
    fn mock_machine_save_load_roundtrip() {
        let mut sys = MockMachine { frames: 0 };
        sys.step_frame().unwrap();
        sys.step_frame().unwrap();
        let v = sys.save_state();
        let s = serde_json::to_string(&v).expect("serialize");
        let v2: Value = serde_json::from_str(&s).expect("deserialize");
        let mut sys2 = MockMachine { frames: 0 };
        assert!(sys2.load_state(&v2).is_ok());
        assert_eq!(sys2.frames, 2);
    }

    #[test]
    fn test_empty_frame_is_terminated() {
        let mut sys = MockMachine { frames: 0 };
        let table = sys.step_frame().unwrap();
        assert_eq!(table.words()[0], 0);
        assert_eq!(table.words()[1], 0);
    }
}
