//! Event Predicates.
//!
//! A closed set of named sensing conditions, each a pure function of the
//! rover record and the configured [`EventThresholds`]. They are the only
//! vocabulary the transition table may use as guards.
//!
//! Predicates that depend on the mean of an empty observation cloud are
//! `false`: there is nothing to be aligned with.

use std::fmt;

use rover_types::RoverState;
use rover_types::config::EventThresholds;

/// Named sensing condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Event {
    /// Ground speed strictly below the rover's `max_vel`.
    VelocityUnderLimit,
    /// At least `go_forward` navigable observations.
    FrontRoomSufficient,
    /// At least `left_room_count` navigable observations left of heading.
    LeftRoomSufficient,
    /// Mean navigable angle within `±heading_band_rad` (inclusive).
    PointedAtNav,
    /// Enough left-of-heading ground, and its mean angle clears the
    /// wall-alignment angle.
    PointedAlongWall,
    /// Mean left-of-heading angle beyond the wall-deviation angle.
    DeviatedFromWall,
    /// Fewer than `front_stop_count` navigable observations.
    ObstacleAhead,
    /// Fewer than `left_stop_count` navigable observations left of heading.
    ObstacleLeft,
    /// A rock is visible at a non-negative mean angle.
    SampleOnLeft,
    /// Rock mean angle above `−sample_heading_band_rad` and mean distance
    /// below `sample_close_dist`.
    SampleCloseRight,
    SampleVisible,
    /// Rock visible with mean angle strictly inside the sample band.
    SampleAligned,
    NearSample,
    /// Near a sample and slow enough to pick it up.
    PickupEligible,
    /// The pickup routine reports it is running.
    PickupActive,
    /// The pickup routine reports it is idle.
    PickupCleared,
    /// `samples_to_collect` samples are stowed.
    MissionComplete,
    /// Within `home_radius` of the home position.
    HomeReached,
    /// A driving state has made no way for `stall_cycles` cycles.
    Stalled,
    /// Yaw strictly inside the wall-seeking heading band.
    YawInSeekBand,
}

impl Event {
    pub const ALL: [Event; 20] = [
        Event::VelocityUnderLimit,
        Event::FrontRoomSufficient,
        Event::LeftRoomSufficient,
        Event::PointedAtNav,
        Event::PointedAlongWall,
        Event::DeviatedFromWall,
        Event::ObstacleAhead,
        Event::ObstacleLeft,
        Event::SampleOnLeft,
        Event::SampleCloseRight,
        Event::SampleVisible,
        Event::SampleAligned,
        Event::NearSample,
        Event::PickupEligible,
        Event::PickupActive,
        Event::PickupCleared,
        Event::MissionComplete,
        Event::HomeReached,
        Event::Stalled,
        Event::YawInSeekBand,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Event::VelocityUnderLimit => "velocity_under_limit",
            Event::FrontRoomSufficient => "front_room_sufficient",
            Event::LeftRoomSufficient => "left_room_sufficient",
            Event::PointedAtNav => "pointed_at_nav",
            Event::PointedAlongWall => "pointed_along_wall",
            Event::DeviatedFromWall => "deviated_from_wall",
            Event::ObstacleAhead => "obstacle_ahead",
            Event::ObstacleLeft => "obstacle_left",
            Event::SampleOnLeft => "sample_on_left",
            Event::SampleCloseRight => "sample_close_right",
            Event::SampleVisible => "sample_visible",
            Event::SampleAligned => "sample_aligned",
            Event::NearSample => "near_sample",
            Event::PickupEligible => "pickup_eligible",
            Event::PickupActive => "pickup_active",
            Event::PickupCleared => "pickup_cleared",
            Event::MissionComplete => "mission_complete",
            Event::HomeReached => "home_reached",
            Event::Stalled => "stalled",
            Event::YawInSeekBand => "yaw_in_seek_band",
        }
    }

    /// Evaluate this event against the current rover record.
    pub fn holds(&self, rover: &RoverState, t: &EventThresholds) -> bool {
        match self {
            Event::VelocityUnderLimit => rover.vel < rover.max_vel,
            Event::FrontRoomSufficient => rover.nav.len() >= t.go_forward,
            Event::LeftRoomSufficient => rover.nav_left.len() >= t.left_room_count,
            Event::PointedAtNav => rover
                .nav
                .mean_angle()
                .is_some_and(|a| (-t.heading_band_rad..=t.heading_band_rad).contains(&a)),
            Event::PointedAlongWall => {
                rover.nav_left.len() > t.wall_follow_count
                    && rover
                        .nav_left
                        .mean_angle_deg()
                        .is_some_and(|a| a - t.wall_alignment_deg > 0.0)
            }
            Event::DeviatedFromWall => rover
                .nav_left
                .mean_angle_deg()
                .is_some_and(|a| a > t.wall_deviation_deg),
            Event::ObstacleAhead => rover.nav.len() < t.front_stop_count,
            Event::ObstacleLeft => rover.nav_left.len() < t.left_stop_count,
            Event::SampleOnLeft => rover.rock.mean_angle().is_some_and(|a| a >= 0.0),
            Event::SampleCloseRight => {
                match (rover.rock.mean_angle(), rover.rock.mean_dist()) {
                    (Some(angle), Some(dist)) => {
                        angle > -t.sample_heading_band_rad && dist < t.sample_close_dist
                    }
                    _ => false,
                }
            }
            Event::SampleVisible => !rover.rock.is_empty(),
            Event::SampleAligned => rover.rock.mean_angle().is_some_and(|a| {
                a > -t.sample_heading_band_rad && a < t.sample_heading_band_rad
            }),
            Event::NearSample => rover.near_sample,
            Event::PickupEligible => rover.near_sample && rover.vel <= t.pickup_velocity,
            Event::PickupActive => rover.picking_up == 1,
            Event::PickupCleared => rover.picking_up == 0,
            Event::MissionComplete => rover.samples_collected >= t.samples_to_collect,
            Event::HomeReached => {
                let (dx, dy) = (rover.pos.0 - rover.home.0, rover.pos.1 - rover.home.1);
                dx.hypot(dy) < t.home_radius
            }
            Event::Stalled => rover.stall_cycles >= t.stall_cycles,
            Event::YawInSeekBand => {
                rover.yaw > t.seek_yaw_min_deg && rover.yaw < t.seek_yaw_max_deg
            }
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rover_types::{PolarCloud, PolarObservation};

    fn t() -> EventThresholds {
        EventThresholds::default()
    }

    fn cloud(n: usize, angle: f64, dist: f64) -> PolarCloud {
        (0..n).map(|_| PolarObservation { dist, angle }).collect()
    }

    fn holds(event: Event, rover: &RoverState) -> bool {
        event.holds(rover, &t())
    }

    #[test]
    fn pickup_eligibility_depends_on_speed() {
        let mut rover = RoverState {
            near_sample: true,
            vel: 0.05,
            ..RoverState::default()
        };
        assert!(holds(Event::PickupEligible, &rover));
        rover.vel = 0.5;
        assert!(!holds(Event::PickupEligible, &rover));
        rover.vel = 0.1;
        assert!(holds(Event::PickupEligible, &rover));
        rover.near_sample = false;
        assert!(!holds(Event::PickupEligible, &rover));
    }

    #[test]
    fn empty_clouds_fail_every_mean_based_event() {
        let rover = RoverState::default();
        for event in [
            Event::PointedAtNav,
            Event::PointedAlongWall,
            Event::DeviatedFromWall,
            Event::SampleOnLeft,
            Event::SampleCloseRight,
            Event::SampleAligned,
            Event::SampleVisible,
        ] {
            assert!(!holds(event, &rover), "{event} held on empty clouds");
        }
        // Count-based events treat empty as zero.
        assert!(holds(Event::ObstacleAhead, &rover));
        assert!(holds(Event::ObstacleLeft, &rover));
        assert!(!holds(Event::FrontRoomSufficient, &rover));
    }

    #[test]
    fn room_counts_use_their_own_thresholds() {
        let mut rover = RoverState::default();
        rover.nav = cloud(500, 0.0, 20.0);
        rover.nav_left = cloud(1499, 0.4, 20.0);
        assert!(holds(Event::FrontRoomSufficient, &rover));
        assert!(holds(Event::ObstacleAhead, &rover));
        assert!(!holds(Event::LeftRoomSufficient, &rover));
        assert!(!holds(Event::ObstacleLeft, &rover));

        rover.nav_left = cloud(1500, 0.4, 20.0);
        assert!(holds(Event::LeftRoomSufficient, &rover));
    }

    #[test]
    fn left_obstacle_threshold_is_independent_of_front() {
        let mut rover = RoverState::default();
        rover.nav_left = cloud(100, 0.4, 20.0);
        let mut thresholds = t();
        assert!(!Event::ObstacleLeft.holds(&rover, &thresholds));
        thresholds.left_stop_count = 200;
        assert!(Event::ObstacleLeft.holds(&rover, &thresholds));
        assert!(Event::ObstacleAhead.holds(&rover, &thresholds));
    }

    #[test]
    fn heading_band_is_inclusive() {
        let mut rover = RoverState::default();
        rover.nav = cloud(10, 0.3, 10.0);
        assert!(holds(Event::PointedAtNav, &rover));
        rover.nav = cloud(10, -0.3, 10.0);
        assert!(holds(Event::PointedAtNav, &rover));
        rover.nav = cloud(10, 0.31, 10.0);
        assert!(!holds(Event::PointedAtNav, &rover));
    }

    #[test]
    fn wall_events_read_the_left_subset_in_degrees() {
        let mut rover = RoverState::default();
        rover.nav_left = cloud(600, 30f64.to_radians(), 10.0);
        assert!(holds(Event::DeviatedFromWall, &rover));
        assert!(holds(Event::PointedAlongWall, &rover));

        rover.nav_left = cloud(600, 8f64.to_radians(), 10.0);
        assert!(!holds(Event::DeviatedFromWall, &rover));
        assert!(!holds(Event::PointedAlongWall, &rover));

        // Aligned angle but too little ground.
        rover.nav_left = cloud(500, 15f64.to_radians(), 10.0);
        assert!(!holds(Event::PointedAlongWall, &rover));
    }

    #[test]
    fn sample_side_and_range() {
        let mut rover = RoverState::default();
        rover.rock = cloud(3, 0.0, 100.0);
        assert!(holds(Event::SampleVisible, &rover));
        assert!(holds(Event::SampleOnLeft, &rover));
        assert!(!holds(Event::SampleCloseRight, &rover));
        assert!(holds(Event::SampleAligned, &rover));

        rover.rock = cloud(3, -0.2, 50.0);
        assert!(!holds(Event::SampleOnLeft, &rover));
        assert!(holds(Event::SampleCloseRight, &rover));

        rover.rock = cloud(1, -0.3, 50.0);
        assert!(!holds(Event::SampleCloseRight, &rover));
        assert!(!holds(Event::SampleAligned, &rover));
    }

    #[test]
    fn pickup_flag_is_tri_state() {
        let mut rover = RoverState::default();
        assert!(holds(Event::PickupCleared, &rover));
        assert!(!holds(Event::PickupActive, &rover));
        rover.picking_up = 1;
        assert!(holds(Event::PickupActive, &rover));
        assert!(!holds(Event::PickupCleared, &rover));
        rover.picking_up = 2;
        assert!(!holds(Event::PickupActive, &rover));
        assert!(!holds(Event::PickupCleared, &rover));
    }

    #[test]
    fn mission_home_and_stall() {
        let mut rover = RoverState::at((100.0, 100.0), 0.0);
        assert!(holds(Event::HomeReached, &rover));
        rover.pos = (104.0, 100.0);
        assert!(!holds(Event::HomeReached, &rover));

        rover.samples_collected = 5;
        assert!(!holds(Event::MissionComplete, &rover));
        rover.samples_collected = 6;
        assert!(holds(Event::MissionComplete, &rover));

        rover.stall_cycles = 59;
        assert!(!holds(Event::Stalled, &rover));
        rover.stall_cycles = 60;
        assert!(holds(Event::Stalled, &rover));
    }

    #[test]
    fn seek_band_is_exclusive() {
        let mut rover = RoverState::default();
        for (yaw, expected) in [(45.0, false), (45.5, true), (64.9, true), (65.0, false)] {
            rover.yaw = yaw;
            assert_eq!(holds(Event::YawInSeekBand, &rover), expected, "yaw {yaw}");
        }
    }

    #[test]
    fn velocity_limit_follows_rover_max_vel() {
        let mut rover = RoverState {
            vel: 1.9,
            ..RoverState::default()
        };
        assert!(holds(Event::VelocityUnderLimit, &rover));
        rover.max_vel = 1.5;
        assert!(!holds(Event::VelocityUnderLimit, &rover));
    }

    #[test]
    fn names_are_unique() {
        let mut names: Vec<_> = Event::ALL.iter().map(Event::name).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), Event::ALL.len());
    }
}
