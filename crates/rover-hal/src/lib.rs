//! `rover-hal` – seams between the control loop and the rover itself.
//!
//! The perception and decision crates never talk to hardware. The host loop
//! pulls frames from a [`Camera`] and pushes each cycle's
//! [`MotionIntent`][rover_types::MotionIntent] into a [`DriveActuator`];
//! real drivers and the in-process simulators in [`sim`] implement the same
//! traits, so the loop runs unchanged against either.

pub mod actuator;
pub mod camera;
pub mod sim;

pub use actuator::DriveActuator;
pub use camera::Camera;
pub use sim::{SimCamera, SimDrive};
