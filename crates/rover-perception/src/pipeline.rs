//! One perception pass per camera frame.
//!
//! [`Perception::step`] runs the whole chain for a cycle:
//!
//! 1. warp the camera frame to the overhead view,
//! 2. classify it into navigable / obstacle / rock masks,
//! 3. paint the debug vision composite,
//! 4. summarize every mask into rover-frame polar clouds, full field of view
//!    and near field,
//! 5. project the near-field subsets into world cells and add them to the map.
//!
//! The rover record and the world map are borrowed for the duration of the
//! call; the pipeline itself holds nothing but configuration and the
//! calibrated homography, so one instance serves the whole mission.

use rover_types::config::PerceptionConfig;
use rover_types::{RgbImage, RoverError, RoverState};
use tracing::{debug, info};

use crate::color::{TerrainMasks, classify};
use crate::observation::{Observations, RoverPoints};
use crate::transform::{Homography, mask_to_rover, rover_to_world};
use crate::worldmap::{MapChannel, WorldMap};

/// Overhead-frame pixel positions of the four calibration grid corners.
///
/// The calibration square is `calibration_grid_px` wide, centred
/// horizontally and sitting `calibration_bottom_offset_px` above the bottom
/// edge, in the same corner order as `calibration_src`.
pub fn destination_points(cfg: &PerceptionConfig) -> [[f64; 2]; 4] {
    let half_w = cfg.frame_width as f64 / 2.0;
    let h = cfg.frame_height as f64;
    let g = cfg.calibration_grid_px / 2.0;
    let b = cfg.calibration_bottom_offset_px;
    [
        [half_w - g, h - b],
        [half_w + g, h - b],
        [half_w + g, h - 2.0 * g - b],
        [half_w - g, h - 2.0 * g - b],
    ]
}

/// What one pass saw and recorded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PerceptionReport {
    pub nav_pixels: usize,
    pub obs_pixels: usize,
    pub rock_pixels: usize,
    /// Cells added to the world map this pass, summed over channels.
    pub cells_marked: usize,
}

/// The calibrated perception pipeline.
#[derive(Debug, Clone)]
pub struct Perception {
    cfg: PerceptionConfig,
    homography: Homography,
}

impl Perception {
    /// Calibrate the pipeline from its configuration.
    ///
    /// # Errors
    ///
    /// Returns [`RoverError::Calibration`] when the configured calibration
    /// points do not define a homography.
    pub fn new(cfg: PerceptionConfig) -> Result<Self, RoverError> {
        let homography =
            Homography::from_correspondences(cfg.calibration_src, destination_points(&cfg))?;
        info!(
            width = cfg.frame_width,
            height = cfg.frame_height,
            "perception pipeline calibrated"
        );
        Ok(Self { cfg, homography })
    }

    /// Run one perception pass over `frame`.
    ///
    /// Overwrites the observation fields and `vision_image` of `rover` and
    /// adds near-field evidence to `map`.
    ///
    /// # Panics
    ///
    /// Panics if `frame` does not have the configured size, if the rover
    /// pose is not finite, or if `map` does not have the configured
    /// dimension.
    pub fn step(
        &self,
        frame: &RgbImage,
        rover: &mut RoverState,
        map: &mut WorldMap,
    ) -> PerceptionReport {
        assert!(
            frame.width() == self.cfg.frame_width && frame.height() == self.cfg.frame_height,
            "camera frame is {}x{}, expected {}x{}",
            frame.width(),
            frame.height(),
            self.cfg.frame_width,
            self.cfg.frame_height
        );
        assert!(
            rover.pos.0.is_finite() && rover.pos.1.is_finite() && rover.yaw.is_finite(),
            "rover pose must be finite"
        );
        assert_eq!(
            map.dimension(),
            self.cfg.world_dimension,
            "world map dimension does not match configuration"
        );

        let overhead = self.homography.warp(frame);
        let masks = classify(&overhead, &self.cfg);
        rover.vision_image = self.vision_image(&masks);

        let points = RoverPoints {
            nav: mask_to_rover(&masks.nav),
            obs: mask_to_rover(&masks.obs),
            rock: mask_to_rover(&masks.rock),
        };
        Observations::summarize(&points, &self.cfg).write_to(rover);

        let near = points.near_field(&self.cfg);
        let mut cells_marked = 0;
        for (pts, channel) in [
            (&near.obs, MapChannel::Obstacle),
            (&near.rock, MapChannel::Rock),
            (&near.nav, MapChannel::Navigable),
        ] {
            let cells = rover_to_world(
                pts,
                rover.pos,
                rover.yaw,
                self.cfg.world_scale,
                self.cfg.world_dimension,
            );
            cells_marked += cells.len();
            map.accumulate(&cells, channel);
        }

        let report = PerceptionReport {
            nav_pixels: masks.nav.count(),
            obs_pixels: masks.obs.count(),
            rock_pixels: masks.rock.count(),
            cells_marked,
        };
        debug!(
            nav = report.nav_pixels,
            obs = report.obs_pixels,
            rock = report.rock_pixels,
            cells = report.cells_marked,
            "perception pass"
        );
        report
    }

    /// Obstacles on channel 0, rocks on channel 1, navigable on channel 2.
    fn vision_image(&self, masks: &TerrainMasks) -> RgbImage {
        let mut img = RgbImage::blank(masks.nav.width(), masks.nav.height());
        for row in 0..img.height() {
            for col in 0..img.width() {
                let on = |set: bool, level: u8| if set { level } else { 0 };
                img.set_pixel(
                    col,
                    row,
                    [
                        on(masks.obs.get(col, row), self.cfg.vision_obstacle_level),
                        on(masks.rock.get(col, row), self.cfg.vision_rock_level),
                        on(masks.nav.get(col, row), self.cfg.vision_nav_level),
                    ],
                );
            }
        }
        img
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pipeline() -> Perception {
        Perception::new(PerceptionConfig::default()).unwrap()
    }

    fn map() -> WorldMap {
        WorldMap::new(PerceptionConfig::default().world_dimension)
    }

    #[test]
    fn destination_points_for_default_frame() {
        let dst = destination_points(&PerceptionConfig::default());
        assert_eq!(dst, [[155.0, 154.0], [165.0, 154.0], [165.0, 144.0], [155.0, 144.0]]);
    }

    #[test]
    fn all_black_frame_changes_nothing_but_clears_observations() {
        let p = pipeline();
        let mut rover = RoverState::at((100.0, 100.0), 0.0);
        let mut m = map();
        let before = m.clone();

        let report = p.step(&RgbImage::blank(320, 160), &mut rover, &mut m);

        assert_eq!(report, PerceptionReport::default());
        assert!(rover.nav.is_empty() && rover.obs.is_empty());
        assert!(rover.rock.is_empty() && rover.nav_left.is_empty());
        assert_eq!(m, before);
        assert_eq!((rover.vision_image.width(), rover.vision_image.height()), (320, 160));
    }

    #[test]
    fn bright_ground_is_navigable_and_mapped_near_the_rover() {
        let p = pipeline();
        let mut rover = RoverState::at((100.0, 100.0), 0.0);
        let mut m = map();

        let report = p.step(&RgbImage::filled(320, 160, [180, 180, 180]), &mut rover, &mut m);

        assert!(report.nav_pixels > 0);
        assert!(!rover.nav.is_empty());
        assert!(!rover.nav_left.is_empty());
        // The view is roughly symmetric about the heading.
        assert!(rover.nav.mean_angle().unwrap().abs() < 0.1);
        assert!(m.channel_total(MapChannel::Navigable) > 0);
        assert_eq!(m.channel_total(MapChannel::Rock), 0);
        assert!(!rover.nav_near.is_empty());
        assert!(rover.nav_near.len() < rover.nav.len());
        assert!(rover.nav_near.distances().all(|d| d < 60.0));
        // Heading 0 looks along +x; nothing can land behind the rover.
        assert_eq!(m.value(99, 100, MapChannel::Navigable), 0);
        assert!(m.value(100, 100, MapChannel::Navigable) > 0);
    }

    #[test]
    fn gold_frame_is_seen_as_rock() {
        let p = pipeline();
        let mut rover = RoverState::at((50.0, 60.0), 90.0);
        let mut m = map();

        p.step(&RgbImage::filled(320, 160, [150, 130, 10]), &mut rover, &mut m);

        assert!(!rover.rock.is_empty());
        assert!(rover.nav.is_empty());
        assert!(rover.rock.mean_dist().unwrap() > 0.0);
        assert!(m.channel_total(MapChannel::Rock) > 0);
        // Heading 90° projects forward into +y.
        assert_eq!(m.value(50, 59, MapChannel::Rock), 0);
    }

    #[test]
    fn vision_image_encodes_each_mask_on_its_own_channel() {
        let p = pipeline();
        let mut rover = RoverState::at((100.0, 100.0), 0.0);
        p.step(&RgbImage::filled(320, 160, [180, 180, 180]), &mut rover, &mut map());

        let ahead = rover.vision_image.pixel(160, 150);
        assert_eq!(ahead, [0, 0, 175]);
        assert_eq!(rover.vision_image.pixel(0, 159), [0, 0, 0]);
    }

    #[test]
    fn evidence_accumulates_over_repeated_passes() {
        let p = pipeline();
        let mut rover = RoverState::at((100.0, 100.0), 30.0);
        let mut m = map();
        let frame = RgbImage::filled(320, 160, [180, 180, 180]);

        p.step(&frame, &mut rover, &mut m);
        let once = m.channel_total(MapChannel::Navigable);
        p.step(&frame, &mut rover, &mut m);
        assert_eq!(m.channel_total(MapChannel::Navigable), 2 * once);
    }

    #[test]
    #[should_panic(expected = "camera frame")]
    fn wrong_frame_size_panics() {
        let mut rover = RoverState::default();
        pipeline().step(&RgbImage::blank(160, 80), &mut rover, &mut map());
    }

    #[test]
    #[should_panic(expected = "finite")]
    fn non_finite_pose_panics() {
        let mut rover = RoverState::at((100.0, 100.0), f64::NAN);
        pipeline().step(&RgbImage::blank(320, 160), &mut rover, &mut map());
    }

    #[test]
    #[should_panic(expected = "dimension")]
    fn mismatched_map_panics() {
        let mut rover = RoverState::default();
        pipeline().step(&RgbImage::blank(320, 160), &mut rover, &mut WorldMap::new(50));
    }

    #[test]
    fn degenerate_calibration_is_an_error() {
        let cfg = PerceptionConfig {
            calibration_src: [[1.0, 1.0]; 4],
            ..PerceptionConfig::default()
        };
        assert!(matches!(Perception::new(cfg), Err(RoverError::Calibration(_))));
    }
}
