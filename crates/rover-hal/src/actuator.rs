//! `DriveActuator` – where motion intents leave the core.
//!
//! An implementation translates a [`MotionIntent`] into whatever the
//! physical or simulated rover understands: wheel commands, a telemetry
//! reply, a pickup trigger.

use rover_types::{MotionIntent, RoverError};

/// A sink for the controller's motion intent.
pub trait DriveActuator: Send + Sync {
    /// Stable identifier, e.g. `"drive_base"`.
    fn id(&self) -> &str;

    /// Apply one cycle's intent.
    ///
    /// # Errors
    ///
    /// Returns [`RoverError::HardwareFault`] if the intent cannot be applied.
    fn apply(&mut self, intent: &MotionIntent) -> Result<(), RoverError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use rover_types::StateId;

    /// Minimal in-process drive used only for tests.
    struct MockDrive {
        id: String,
        last: Option<MotionIntent>,
    }

    impl DriveActuator for MockDrive {
        fn id(&self) -> &str {
            &self.id
        }

        fn apply(&mut self, intent: &MotionIntent) -> Result<(), RoverError> {
            if !intent.steer.is_finite() {
                return Err(RoverError::HardwareFault {
                    component: self.id.clone(),
                    details: "steer is not finite".into(),
                });
            }
            self.last = Some(*intent);
            Ok(())
        }
    }

    #[test]
    fn mock_drive_records_last_intent() {
        let mut drive = MockDrive {
            id: "drive_base".into(),
            last: None,
        };
        let intent = MotionIntent {
            throttle: 0.2,
            mode: StateId::FollowWall,
            ..MotionIntent::default()
        };
        drive.apply(&intent).unwrap();
        assert_eq!(drive.last, Some(intent));
    }

    #[test]
    fn mock_drive_rejects_bad_intent() {
        let mut drive = MockDrive {
            id: "drive_base".into(),
            last: None,
        };
        let intent = MotionIntent {
            steer: f64::NAN,
            ..MotionIntent::default()
        };
        let err = drive.apply(&intent).unwrap_err();
        assert!(matches!(err, RoverError::HardwareFault { .. }));
        assert!(drive.last.is_none());
    }
}
