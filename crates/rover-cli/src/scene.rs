//! Synthetic camera frames for the simulated run.
//!
//! Each frame is a crude forward view: dark terrain above a horizon row,
//! bright sand below it. Variants add a rock wall on the left or a gold
//! sample on the ground ahead.

use rover_types::RgbImage;

const SKY: [u8; 3] = [70, 55, 45];
const SAND: [u8; 3] = [200, 185, 170];
const WALL: [u8; 3] = [90, 60, 40];
const GOLD: [u8; 3] = [150, 130, 10];

/// Row of the horizon as a fraction of frame height.
const HORIZON: f64 = 0.5;

fn open_ground(width: usize, height: usize) -> RgbImage {
    let horizon = (height as f64 * HORIZON) as usize;
    let mut img = RgbImage::filled(width, height, SAND);
    for row in 0..horizon {
        for col in 0..width {
            img.set_pixel(col, row, SKY);
        }
    }
    img
}

/// A wall rising on the left, closing in toward the horizon.
fn wall_on_left(width: usize, height: usize) -> RgbImage {
    let mut img = open_ground(width, height);
    let horizon = (height as f64 * HORIZON) as usize;
    for row in horizon..height {
        let depth = (height - row) as f64 / (height - horizon) as f64;
        let edge = (width as f64 * (0.15 + 0.35 * depth)) as usize;
        for col in 0..edge.min(width) {
            img.set_pixel(col, row, WALL);
        }
    }
    img
}

/// A small gold sample just right of centre, near the bottom of the view.
fn sample_ahead(width: usize, height: usize) -> RgbImage {
    let mut img = open_ground(width, height);
    let (cx, cy) = (width / 2 + width / 32, height * 7 / 8);
    let r = (width / 40).max(1);
    for row in cy.saturating_sub(r)..(cy + r).min(height) {
        for col in cx.saturating_sub(r)..(cx + r).min(width) {
            img.set_pixel(col, row, GOLD);
        }
    }
    img
}

/// The scripted frame loop replayed by the simulated camera.
pub fn frames(width: usize, height: usize) -> Vec<RgbImage> {
    vec![
        open_ground(width, height),
        wall_on_left(width, height),
        wall_on_left(width, height),
        sample_ahead(width, height),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use rover_perception::color::classify;
    use rover_types::config::PerceptionConfig;

    #[test]
    fn frames_have_the_requested_size() {
        for f in frames(320, 160) {
            assert_eq!((f.width(), f.height()), (320, 160));
        }
    }

    #[test]
    fn sand_is_navigable_and_gold_is_rock() {
        let cfg = PerceptionConfig::default();
        let masks = classify(&sample_ahead(320, 160), &cfg);
        assert!(masks.nav.get(160, 150));
        assert!(!masks.nav.get(160, 10));
        assert!(masks.rock.count() > 0);
        assert!(masks.rock.get(170, 140));
    }

    #[test]
    fn wall_darkens_the_left_of_the_ground() {
        let img = wall_on_left(320, 160);
        assert_eq!(img.pixel(10, 150), WALL);
        assert_eq!(img.pixel(300, 150), SAND);
    }
}
