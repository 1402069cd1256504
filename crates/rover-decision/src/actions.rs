//! State actions.
//!
//! Each behavioural state owns one action that turns the current rover
//! record into a [`MotionIntent`][rover_types::MotionIntent]. An action runs
//! every cycle its state is current, so actions are written to be repeated:
//! they overwrite the whole intent rather than nudging it.
//!
//! Steering is in degrees, positive to the left, saturated at
//! `max_steer_deg`. Spinning in place is zero throttle, zero brake and full
//! steering lock.

use rover_types::config::RoverConfig;
use rover_types::{RoverState, StateId};

use crate::events::Event;

/// A state action.
pub type Action = fn(&mut RoverState, &RoverConfig);

/// The action owned by `state`.
pub fn action_for(state: StateId) -> Action {
    match state {
        StateId::SeekWall => seek_wall,
        StateId::FollowWall => follow_wall,
        StateId::AvoidWall => avoid_wall,
        StateId::AlignToWall => align_to_wall,
        StateId::RecoverStuck => recover_stuck,
        StateId::ApproachSample => approach_sample,
        StateId::Halt => halt,
        StateId::BeginPickup => begin_pickup,
        StateId::AwaitPickupStart => await_pickup_start,
        StateId::AwaitPickupEnd => await_pickup_end,
        StateId::ReturnHome => return_home,
        StateId::AvoidObstacles => avoid_obstacles,
        StateId::Park => park,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Intent helpers
// ────────────────────────────────────────────────────────────────────────────

fn drive(rover: &mut RoverState, mode: StateId, throttle: f64, steer: f64, cfg: &RoverConfig) {
    let max = cfg.drive.max_steer_deg;
    rover.intent.mode = mode;
    rover.intent.throttle = throttle;
    rover.intent.brake = 0.0;
    rover.intent.steer = steer.clamp(-max, max);
    rover.intent.send_pickup = false;
}

fn spin_left(rover: &mut RoverState, mode: StateId, cfg: &RoverConfig) {
    drive(rover, mode, 0.0, cfg.drive.max_steer_deg, cfg);
}

fn spin_right(rover: &mut RoverState, mode: StateId, cfg: &RoverConfig) {
    drive(rover, mode, 0.0, -cfg.drive.max_steer_deg, cfg);
}

fn brake(rover: &mut RoverState, mode: StateId, cfg: &RoverConfig) {
    rover.intent.mode = mode;
    rover.intent.throttle = 0.0;
    rover.intent.brake = cfg.drive.brake_set;
    rover.intent.steer = 0.0;
    rover.intent.send_pickup = false;
}

fn cruise_throttle(rover: &RoverState, cfg: &RoverConfig) -> f64 {
    if Event::VelocityUnderLimit.holds(rover, &cfg.events) {
        cfg.drive.throttle_set
    } else {
        0.0
    }
}

/// Count consecutive cycles spent below the stall speed while driving.
fn track_stall(rover: &mut RoverState, cfg: &RoverConfig) {
    if rover.vel.abs() < cfg.events.stall_velocity {
        rover.stall_cycles = rover.stall_cycles.saturating_add(1);
    } else {
        rover.stall_cycles = 0;
    }
}

/// Wrap an angle in degrees into `[-180, 180)`.
fn wrap_deg(angle: f64) -> f64 {
    (angle + 180.0).rem_euclid(360.0) - 180.0
}

// ────────────────────────────────────────────────────────────────────────────
// Actions
// ────────────────────────────────────────────────────────────────────────────

fn seek_wall(rover: &mut RoverState, cfg: &RoverConfig) {
    spin_left(rover, StateId::SeekWall, cfg);
}

/// Hug the wall on the left: aim a fixed offset right of the mean bearing
/// of the ground on the left.
fn follow_wall(rover: &mut RoverState, cfg: &RoverConfig) {
    let steer = rover
        .nav_left
        .mean_angle_deg()
        .map(|a| a - cfg.drive.wall_offset_deg)
        .or_else(|| rover.nav.mean_angle_deg())
        .unwrap_or(0.0);
    let throttle = cruise_throttle(rover, cfg);
    drive(rover, StateId::FollowWall, throttle, steer, cfg);
    track_stall(rover, cfg);
}

fn avoid_wall(rover: &mut RoverState, cfg: &RoverConfig) {
    spin_right(rover, StateId::AvoidWall, cfg);
    rover.stall_cycles = 0;
}

fn align_to_wall(rover: &mut RoverState, cfg: &RoverConfig) {
    spin_left(rover, StateId::AlignToWall, cfg);
}

fn recover_stuck(rover: &mut RoverState, cfg: &RoverConfig) {
    spin_right(rover, StateId::RecoverStuck, cfg);
    rover.stall_cycles = 0;
}

/// Creep toward the sample, steering at the mean rock bearing.
fn approach_sample(rover: &mut RoverState, cfg: &RoverConfig) {
    let throttle = if rover.vel < rover.max_vel / 2.0 {
        cfg.drive.approach_throttle
    } else {
        0.0
    };
    let steer = rover.rock.mean_angle_deg().unwrap_or(0.0);
    drive(rover, StateId::ApproachSample, throttle, steer, cfg);
}

fn halt(rover: &mut RoverState, cfg: &RoverConfig) {
    brake(rover, StateId::Halt, cfg);
}

/// Hold the brake and raise the pickup request for this cycle only.
fn begin_pickup(rover: &mut RoverState, cfg: &RoverConfig) {
    brake(rover, StateId::BeginPickup, cfg);
    rover.intent.send_pickup = true;
}

fn await_pickup_start(rover: &mut RoverState, cfg: &RoverConfig) {
    brake(rover, StateId::AwaitPickupStart, cfg);
}

fn await_pickup_end(rover: &mut RoverState, cfg: &RoverConfig) {
    brake(rover, StateId::AwaitPickupEnd, cfg);
}

/// Head for the home position; with the way ahead blocked, stop and turn
/// right until it opens up.
fn return_home(rover: &mut RoverState, cfg: &RoverConfig) {
    if Event::ObstacleAhead.holds(rover, &cfg.events) {
        spin_right(rover, StateId::ReturnHome, cfg);
        return;
    }
    let (dx, dy) = (rover.home.0 - rover.pos.0, rover.home.1 - rover.pos.1);
    let bearing = dy.atan2(dx).to_degrees();
    let steer = wrap_deg(bearing - rover.yaw);
    let throttle = cruise_throttle(rover, cfg);
    drive(rover, StateId::ReturnHome, throttle, steer, cfg);
    track_stall(rover, cfg);
}

fn avoid_obstacles(rover: &mut RoverState, cfg: &RoverConfig) {
    spin_right(rover, StateId::AvoidObstacles, cfg);
    rover.stall_cycles = 0;
}

fn park(rover: &mut RoverState, cfg: &RoverConfig) {
    brake(rover, StateId::Park, cfg);
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use rover_types::{PolarCloud, PolarObservation};

    fn cfg() -> RoverConfig {
        RoverConfig::default()
    }

    fn cloud(n: usize, angle_deg: f64) -> PolarCloud {
        (0..n)
            .map(|_| PolarObservation {
                dist: 30.0,
                angle: angle_deg.to_radians(),
            })
            .collect()
    }

    fn run(state: StateId, rover: &mut RoverState) {
        action_for(state)(rover, &cfg());
    }

    #[test]
    fn every_action_stamps_its_own_mode() {
        for state in StateId::ALL {
            let mut rover = RoverState::at((50.0, 50.0), 10.0);
            rover.intent.mode = StateId::Park;
            if state == StateId::Park {
                rover.intent.mode = StateId::SeekWall;
            }
            run(state, &mut rover);
            assert_eq!(rover.intent.mode, state);
        }
    }

    #[test]
    fn only_begin_pickup_raises_the_pickup_request() {
        for state in StateId::ALL {
            let mut rover = RoverState::default();
            rover.intent.send_pickup = true;
            run(state, &mut rover);
            assert_eq!(rover.intent.send_pickup, state == StateId::BeginPickup, "{state}");
        }
    }

    #[test]
    fn seek_and_align_spin_left_avoid_spins_right() {
        let mut rover = RoverState::default();
        run(StateId::SeekWall, &mut rover);
        assert_eq!((rover.intent.throttle, rover.intent.steer), (0.0, 15.0));
        run(StateId::AlignToWall, &mut rover);
        assert_eq!(rover.intent.steer, 15.0);
        run(StateId::AvoidWall, &mut rover);
        assert_eq!(rover.intent.steer, -15.0);
        assert_eq!(rover.intent.brake, 0.0);
    }

    #[test]
    fn follow_wall_steers_off_the_left_mean() {
        let mut rover = RoverState::default();
        rover.nav_left = cloud(800, 20.0);
        rover.nav = cloud(800, 5.0);
        run(StateId::FollowWall, &mut rover);
        assert_abs_diff_eq!(rover.intent.steer, 8.0, epsilon = 1e-9);
        assert_eq!(rover.intent.throttle, 0.2);

        // No left ground: fall back to the full navigable mean.
        rover.nav_left = PolarCloud::default();
        run(StateId::FollowWall, &mut rover);
        assert_abs_diff_eq!(rover.intent.steer, 5.0, epsilon = 1e-9);

        // Nothing at all: straight.
        rover.nav = PolarCloud::default();
        run(StateId::FollowWall, &mut rover);
        assert_eq!(rover.intent.steer, 0.0);
    }

    #[test]
    fn follow_wall_coasts_at_max_velocity_and_clamps_steer() {
        let mut rover = RoverState {
            vel: 2.0,
            ..RoverState::default()
        };
        rover.nav_left = cloud(10, 80.0);
        run(StateId::FollowWall, &mut rover);
        assert_eq!(rover.intent.throttle, 0.0);
        assert_eq!(rover.intent.steer, 15.0);
    }

    #[test]
    fn stall_counter_grows_while_stopped_and_resets_when_moving() {
        let mut rover = RoverState::default();
        for _ in 0..3 {
            run(StateId::FollowWall, &mut rover);
        }
        assert_eq!(rover.stall_cycles, 3);
        rover.vel = 1.0;
        run(StateId::FollowWall, &mut rover);
        assert_eq!(rover.stall_cycles, 0);

        rover.vel = 0.0;
        run(StateId::FollowWall, &mut rover);
        run(StateId::RecoverStuck, &mut rover);
        assert_eq!(rover.stall_cycles, 0);
    }

    #[test]
    fn approach_sample_creeps_toward_the_rock() {
        let mut rover = RoverState::default();
        rover.rock = cloud(4, -7.0);
        run(StateId::ApproachSample, &mut rover);
        assert_eq!(rover.intent.throttle, 0.1);
        assert_abs_diff_eq!(rover.intent.steer, -7.0, epsilon = 1e-9);

        rover.vel = 1.0;
        run(StateId::ApproachSample, &mut rover);
        assert_eq!(rover.intent.throttle, 0.0);
    }

    #[test]
    fn stopping_states_hold_the_brake() {
        for state in [StateId::Halt, StateId::AwaitPickupStart, StateId::AwaitPickupEnd, StateId::Park] {
            let mut rover = RoverState::default();
            rover.intent.throttle = 0.2;
            rover.intent.steer = 9.0;
            run(state, &mut rover);
            assert_eq!(rover.intent.throttle, 0.0);
            assert_eq!(rover.intent.brake, 10.0);
            assert_eq!(rover.intent.steer, 0.0);
        }
    }

    #[test]
    fn return_home_steers_toward_home() {
        let mut rover = RoverState::at((100.0, 100.0), 0.0);
        rover.nav = cloud(1000, 0.0);
        // Home is due +y; heading +x, so turn left.
        rover.pos = (100.0, 90.0);
        run(StateId::ReturnHome, &mut rover);
        assert_eq!(rover.intent.steer, 15.0);
        assert_eq!(rover.intent.throttle, 0.2);

        // Home due +x while heading 355°: a small left turn, not a full circle.
        rover.pos = (90.0, 100.0);
        rover.yaw = 355.0;
        run(StateId::ReturnHome, &mut rover);
        assert_abs_diff_eq!(rover.intent.steer, 5.0, epsilon = 1e-9);

        rover.yaw = 5.0;
        run(StateId::ReturnHome, &mut rover);
        assert_abs_diff_eq!(rover.intent.steer, -5.0, epsilon = 1e-9);
    }

    #[test]
    fn return_home_replans_when_blocked() {
        let mut rover = RoverState::at((100.0, 100.0), 0.0);
        rover.pos = (120.0, 100.0);
        rover.nav = cloud(100, 0.0);
        run(StateId::ReturnHome, &mut rover);
        assert_eq!(rover.intent.throttle, 0.0);
        assert_eq!(rover.intent.steer, -15.0);
    }

    #[test]
    fn wrap_deg_range() {
        assert_eq!(wrap_deg(190.0), -170.0);
        assert_eq!(wrap_deg(-190.0), 170.0);
        assert_eq!(wrap_deg(180.0), -180.0);
        assert_eq!(wrap_deg(0.0), 0.0);
    }
}
