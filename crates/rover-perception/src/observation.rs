//! Observation Summarizer.
//!
//! Reduces rover-frame point sets into the polar clouds the decision layer
//! reads, and into the near-field subsets that are trusted enough to reach
//! the world map. Both are published on the rover record; the decision
//! layer reads the full field of view.

use nalgebra::Point2;
use rover_types::config::PerceptionConfig;
use rover_types::{PolarCloud, RoverState};

use crate::transform::to_polar;

/// Rover-frame points of each mask for one cycle.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RoverPoints {
    pub nav: Vec<Point2<f64>>,
    pub obs: Vec<Point2<f64>>,
    pub rock: Vec<Point2<f64>>,
}

/// Polar summaries of one cycle.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Observations {
    pub nav: PolarCloud,
    pub obs: PolarCloud,
    pub rock: PolarCloud,
    /// `nav` restricted to strictly positive (left-of-heading) angles.
    pub nav_left: PolarCloud,
    /// Each cloud cut to its mask's near-field radius.
    pub nav_near: PolarCloud,
    pub obs_near: PolarCloud,
    pub rock_near: PolarCloud,
}

impl Observations {
    /// Summarize one cycle's points.
    pub fn summarize(points: &RoverPoints, cfg: &PerceptionConfig) -> Self {
        let nav = to_polar(&points.nav);
        let obs = to_polar(&points.obs);
        let rock = to_polar(&points.rock);
        Self {
            nav_left: nav.left_of_heading(),
            nav_near: nav.within(cfg.nav_cutoff),
            obs_near: obs.within(cfg.obs_cutoff),
            rock_near: rock.within(cfg.rock_cutoff),
            nav,
            obs,
            rock,
        }
    }

    /// Publish the clouds on the rover record, replacing last cycle's.
    pub fn write_to(self, rover: &mut RoverState) {
        rover.nav = self.nav;
        rover.obs = self.obs;
        rover.rock = self.rock;
        rover.nav_left = self.nav_left;
        rover.nav_near = self.nav_near;
        rover.obs_near = self.obs_near;
        rover.rock_near = self.rock_near;
    }
}

/// Keep the points strictly closer to the rover than `cutoff`.
pub fn near_field(points: &[Point2<f64>], cutoff: f64) -> Vec<Point2<f64>> {
    points
        .iter()
        .copied()
        .filter(|p| p.coords.norm() < cutoff)
        .collect()
}

impl RoverPoints {
    /// The per-mask near-field subsets, using each mask's cutoff.
    pub fn near_field(&self, cfg: &PerceptionConfig) -> RoverPoints {
        RoverPoints {
            nav: near_field(&self.nav, cfg.nav_cutoff),
            obs: near_field(&self.obs, cfg.obs_cutoff),
            rock: near_field(&self.rock, cfg.rock_cutoff),
        }
    }
}
