//! `rover-types` – shared data model for the rover perception/decision loop.
//!
//! Every crate in the workspace talks in these types: the camera frame
//! ([`RgbImage`]), the per-cycle observations ([`PolarCloud`]), the
//! behavioural state identity ([`StateId`]), the motion intent handed to the
//! actuation layer ([`MotionIntent`]) and the [`RoverState`] record that the
//! control loop owns and passes by reference into each pass.
//!
//! # Modules
//!
//! - [`config`] – [`RoverConfig`][config::RoverConfig]: the single
//!   configuration value holding every threshold, loaded from TOML.
//! - [`image`] – [`RgbImage`][image::RgbImage]: a packed 3-channel 8-bit
//!   image buffer.
//! - [`polar`] – [`PolarCloud`][polar::PolarCloud]: an ordered sequence of
//!   `(distance, angle)` observations in the rover frame.

pub mod config;
pub mod image;
pub mod polar;

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use config::RoverConfig;
pub use image::RgbImage;
pub use polar::{PolarCloud, PolarObservation};

// ────────────────────────────────────────────────────────────────────────────
// StateId
// ────────────────────────────────────────────────────────────────────────────

/// Identity of a behavioural state of the rover controller.
///
/// States are identified by name, never by numeric index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StateId {
    SeekWall,
    FollowWall,
    AvoidWall,
    AlignToWall,
    RecoverStuck,
    ApproachSample,
    Halt,
    BeginPickup,
    AwaitPickupStart,
    AwaitPickupEnd,
    ReturnHome,
    AvoidObstacles,
    Park,
}

impl StateId {
    /// Every state, in declaration order.
    pub const ALL: [StateId; 13] = [
        StateId::SeekWall,
        StateId::FollowWall,
        StateId::AvoidWall,
        StateId::AlignToWall,
        StateId::RecoverStuck,
        StateId::ApproachSample,
        StateId::Halt,
        StateId::BeginPickup,
        StateId::AwaitPickupStart,
        StateId::AwaitPickupEnd,
        StateId::ReturnHome,
        StateId::AvoidObstacles,
        StateId::Park,
    ];

    /// Stable snake_case name, identical to the serde representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            StateId::SeekWall => "seek_wall",
            StateId::FollowWall => "follow_wall",
            StateId::AvoidWall => "avoid_wall",
            StateId::AlignToWall => "align_to_wall",
            StateId::RecoverStuck => "recover_stuck",
            StateId::ApproachSample => "approach_sample",
            StateId::Halt => "halt",
            StateId::BeginPickup => "begin_pickup",
            StateId::AwaitPickupStart => "await_pickup_start",
            StateId::AwaitPickupEnd => "await_pickup_end",
            StateId::ReturnHome => "return_home",
            StateId::AvoidObstacles => "avoid_obstacles",
            StateId::Park => "park",
        }
    }
}

impl fmt::Display for StateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// MotionIntent
// ────────────────────────────────────────────────────────────────────────────

/// Throttle/brake/steer targets computed by the controller.
///
/// These are intents, not actuator commands: the actuation layer translates
/// them into whatever the physical or simulated rover understands.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MotionIntent {
    /// Desired throttle (negative reverses).
    pub throttle: f64,
    /// Desired brake; `0.0` releases the brake.
    pub brake: f64,
    /// Steering target in degrees, positive = left.
    pub steer: f64,
    /// The behavioural state that produced this intent.
    pub mode: StateId,
    /// Request the sample pickup routine this cycle.
    pub send_pickup: bool,
}

impl Default for MotionIntent {
    fn default() -> Self {
        Self {
            throttle: 0.0,
            brake: 0.0,
            steer: 0.0,
            mode: StateId::SeekWall,
            send_pickup: false,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// RoverState
// ────────────────────────────────────────────────────────────────────────────

/// The record the control loop owns and hands to each perception and
/// decision pass.
///
/// Telemetry fields are written by the host before each cycle; observation
/// fields are written by perception; `intent` and `stall_cycles` are written
/// by the controller's state actions.
#[derive(Debug, Clone)]
pub struct RoverState {
    // ── Telemetry ─────────────────────────────────────────────────────────
    /// Position in world units `(x, y)`.
    pub pos: (f64, f64),
    /// Heading in degrees, `[0, 360)`.
    pub yaw: f64,
    /// Current ground speed.
    pub vel: f64,
    /// Speed ceiling used by the velocity guards.
    pub max_vel: f64,
    /// The rover is close enough to a sample to pick it up.
    pub near_sample: bool,
    /// Pickup counter reported by the rover: `1` while the arm is running,
    /// `0` when idle. Any other value is a transitional reading.
    pub picking_up: u8,
    /// Number of samples already stowed.
    pub samples_collected: u32,
    /// Home position in world units.
    pub home: (f64, f64),

    // ── Perception outputs ───────────────────────────────────────────────
    /// Navigable terrain, full field of view.
    pub nav: PolarCloud,
    /// Obstacle terrain, full field of view.
    pub obs: PolarCloud,
    /// Sample rocks, full field of view.
    pub rock: PolarCloud,
    /// Navigable observations strictly left of the heading.
    pub nav_left: PolarCloud,
    /// Navigable terrain inside the navigable map cutoff.
    pub nav_near: PolarCloud,
    /// Obstacle terrain inside the obstacle map cutoff.
    pub obs_near: PolarCloud,
    /// Sample rocks inside the rock map cutoff.
    pub rock_near: PolarCloud,
    /// Debug composite of the three masks in the overhead frame.
    pub vision_image: RgbImage,

    // ── Decision outputs ─────────────────────────────────────────────────
    /// Consecutive cycles a driving state has spent without making way.
    pub stall_cycles: u32,
    /// The motion intent for the actuation layer.
    pub intent: MotionIntent,
}

impl RoverState {
    /// A rover at rest at `pos`, which also becomes its home position.
    pub fn at(pos: (f64, f64), yaw: f64) -> Self {
        Self {
            pos,
            yaw,
            home: pos,
            ..Self::default()
        }
    }
}

impl Default for RoverState {
    fn default() -> Self {
        Self {
            pos: (0.0, 0.0),
            yaw: 0.0,
            vel: 0.0,
            max_vel: 2.0,
            near_sample: false,
            picking_up: 0,
            samples_collected: 0,
            home: (0.0, 0.0),
            nav: PolarCloud::default(),
            obs: PolarCloud::default(),
            rock: PolarCloud::default(),
            nav_left: PolarCloud::default(),
            nav_near: PolarCloud::default(),
            obs_near: PolarCloud::default(),
            rock_near: PolarCloud::default(),
            vision_image: RgbImage::blank(0, 0),
            stall_cycles: 0,
            intent: MotionIntent::default(),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// RoverError
// ────────────────────────────────────────────────────────────────────────────

/// Recoverable failures at the edges of the core: configuration,
/// calibration, and the hardware seams.
///
/// Geometry precondition violations are not represented here; they panic.
#[derive(Error, Debug, Serialize, Deserialize)]
pub enum RoverError {
    #[error("Configuration Error: {0}")]
    Config(String),

    #[error("Calibration Error: {0}")]
    Calibration(String),

    #[error("Hardware Fault on {component}: {details}")]
    HardwareFault { component: String, details: String },
}
