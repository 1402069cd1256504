//! In-process simulation drivers for running the loop without a rover.
//!
//! - [`SimCamera`] replays a scripted list of frames, cycling.
//! - [`SimDrive`] records every applied intent and integrates a crude
//!   kinematic model, so the host loop sees telemetry that responds to its
//!   own commands: throttle accelerates, brake stops, steering turns, and a
//!   pickup request near a scripted sample runs a short pickup routine.
//!
//! # Example
//!
//! ```rust
//! use rover_hal::sim::{SimCamera, SimDrive};
//! use rover_hal::{Camera, DriveActuator};
//! use rover_types::{MotionIntent, RgbImage};
//!
//! let mut cam = SimCamera::new("front_rgb", vec![RgbImage::blank(4, 2)]);
//! assert_eq!(cam.capture().unwrap().width(), 4);
//!
//! let mut drive = SimDrive::new("drive_base", (10.0, 10.0), 0.0);
//! drive.apply(&MotionIntent { throttle: 1.0, ..MotionIntent::default() }).unwrap();
//! assert!(drive.telemetry().vel > 0.0);
//! assert_eq!(drive.history().len(), 1);
//! ```

use rover_types::{MotionIntent, RgbImage, RoverError, RoverState};
use tracing::debug;

use crate::actuator::DriveActuator;
use crate::camera::Camera;

/// Simulated seconds per applied intent.
const DT: f64 = 0.1;
/// Acceleration per unit throttle, world units / s².
const ACCEL: f64 = 5.0;
/// Fraction of speed kept per tick when coasting.
const DRAG: f64 = 0.98;
/// Degrees of heading change per tick per degree of steering.
const TURN_RATE: f64 = 0.5;
/// How close the rover must be to a sample to pick it up.
const PICKUP_RADIUS: f64 = 1.0;
/// Ticks the pickup arm takes to stow a sample.
const PICKUP_TICKS: u32 = 5;

// ────────────────────────────────────────────────────────────────────────────
// SimCamera
// ────────────────────────────────────────────────────────────────────────────

/// A simulated camera that replays `frames` in order, wrapping around.
pub struct SimCamera {
    id: String,
    frames: Vec<RgbImage>,
    next: usize,
}

impl SimCamera {
    pub fn new(id: impl Into<String>, frames: Vec<RgbImage>) -> Self {
        Self {
            id: id.into(),
            frames,
            next: 0,
        }
    }
}

impl Camera for SimCamera {
    fn id(&self) -> &str {
        &self.id
    }

    fn capture(&mut self) -> Result<RgbImage, RoverError> {
        if self.frames.is_empty() {
            return Err(RoverError::HardwareFault {
                component: self.id.clone(),
                details: "no scripted frames".to_string(),
            });
        }
        let frame = self.frames[self.next].clone();
        self.next = (self.next + 1) % self.frames.len();
        Ok(frame)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// SimDrive
// ────────────────────────────────────────────────────────────────────────────

/// Telemetry reported by the simulated rover.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimTelemetry {
    pub pos: (f64, f64),
    pub yaw: f64,
    pub vel: f64,
    pub near_sample: bool,
    pub picking_up: u8,
    pub samples_collected: u32,
}

impl SimTelemetry {
    /// Copy the telemetry fields into the rover record.
    pub fn write_to(&self, rover: &mut RoverState) {
        rover.pos = self.pos;
        rover.yaw = self.yaw;
        rover.vel = self.vel;
        rover.near_sample = self.near_sample;
        rover.picking_up = self.picking_up;
        rover.samples_collected = self.samples_collected;
    }
}

/// A simulated drive base. Records every intent and always succeeds unless
/// [`disconnect`][Self::disconnect]ed.
pub struct SimDrive {
    id: String,
    telemetry: SimTelemetry,
    samples: Vec<(f64, f64)>,
    pickup_remaining: u32,
    history: Vec<MotionIntent>,
    connected: bool,
}

impl SimDrive {
    pub fn new(id: impl Into<String>, pos: (f64, f64), yaw: f64) -> Self {
        Self {
            id: id.into(),
            telemetry: SimTelemetry {
                pos,
                yaw,
                vel: 0.0,
                near_sample: false,
                picking_up: 0,
                samples_collected: 0,
            },
            samples: Vec::new(),
            pickup_remaining: 0,
            history: Vec::new(),
            connected: true,
        }
    }

    /// Scatter samples at the given world positions.
    pub fn with_samples(mut self, samples: Vec<(f64, f64)>) -> Self {
        self.samples = samples;
        self.telemetry.near_sample = self.nearest_sample().is_some();
        self
    }

    /// Make every subsequent [`apply`][DriveActuator::apply] fail.
    pub fn disconnect(&mut self) {
        self.connected = false;
    }

    pub fn telemetry(&self) -> SimTelemetry {
        self.telemetry
    }

    /// Every intent applied so far, oldest first.
    pub fn history(&self) -> &[MotionIntent] {
        &self.history
    }

    fn nearest_sample(&self) -> Option<usize> {
        let (x, y) = self.telemetry.pos;
        self.samples
            .iter()
            .position(|(sx, sy)| (sx - x).hypot(sy - y) < PICKUP_RADIUS)
    }

    fn integrate(&mut self, intent: &MotionIntent) {
        let t = &mut self.telemetry;
        if intent.brake > 0.0 {
            t.vel = (t.vel - intent.brake * ACCEL * DT).max(0.0);
        } else {
            t.vel = (t.vel + intent.throttle * ACCEL * DT) * DRAG;
        }
        t.yaw = (t.yaw + intent.steer * TURN_RATE).rem_euclid(360.0);
        let heading = t.yaw.to_radians();
        t.pos.0 += t.vel * DT * heading.cos();
        t.pos.1 += t.vel * DT * heading.sin();
    }

    fn run_pickup(&mut self, intent: &MotionIntent) {
        if self.pickup_remaining > 0 {
            self.pickup_remaining -= 1;
            if self.pickup_remaining == 0 {
                if let Some(i) = self.nearest_sample() {
                    self.samples.swap_remove(i);
                }
                self.telemetry.picking_up = 0;
                self.telemetry.samples_collected += 1;
                debug!(
                    collected = self.telemetry.samples_collected,
                    "sim: sample stowed"
                );
            }
        } else if intent.send_pickup && self.telemetry.near_sample && self.telemetry.vel == 0.0 {
            self.pickup_remaining = PICKUP_TICKS;
            self.telemetry.picking_up = 1;
            debug!("sim: pickup started");
        }
    }
}

impl DriveActuator for SimDrive {
    fn id(&self) -> &str {
        &self.id
    }

    fn apply(&mut self, intent: &MotionIntent) -> Result<(), RoverError> {
        if !self.connected {
            return Err(RoverError::HardwareFault {
                component: self.id.clone(),
                details: "drive base disconnected".to_string(),
            });
        }
        self.history.push(*intent);
        if self.pickup_remaining == 0 {
            self.integrate(intent);
        }
        self.run_pickup(intent);
        self.telemetry.near_sample = self.nearest_sample().is_some();
        Ok(())
    }
}
