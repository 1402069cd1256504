//! Frame Transformer.
//!
//! The coordinate chain every mask travels each cycle:
//!
//! ```text
//! camera image ──warp──▶ overhead image ──mask_to_rover──▶ rover (x fwd, y left)
//!                                                   │
//!                                    to_polar ◀─────┤
//!                                                   └──rover_to_world──▶ world grid cell
//! ```
//!
//! plus [`inverse_translate`] to bring world displacements back into the
//! rotated rover frame. Only the [`Homography`] is long-lived; every other
//! function is a pure map over its inputs, and an empty input yields an empty
//! output.
//!
//! # Example
//!
//! ```rust
//! use nalgebra::Point2;
//! use rover_perception::transform::{rover_to_world, to_polar};
//!
//! // One pixel 10 px straight ahead of the camera.
//! let pts = vec![Point2::new(10.0, 0.0)];
//! let polar = to_polar(&pts);
//! assert_eq!(polar.iter().next().unwrap().angle, 0.0);
//!
//! // Rover at (100, 100) heading +90°: the point lands one cell "north".
//! let cells = rover_to_world(&pts, (100.0, 100.0), 90.0, 10.0, 200);
//! assert_eq!((cells[0].x, cells[0].y), (100, 101));
//! ```

use nalgebra::{Matrix3, Point2, Rotation2, SMatrix, SVector, Vector2, Vector3};
use rover_types::{PolarCloud, PolarObservation, RgbImage, RoverError};

use crate::color::Mask;

// ────────────────────────────────────────────────────────────────────────────
// Homography
// ────────────────────────────────────────────────────────────────────────────

/// A planar projective transform mapping source pixels to destination
/// pixels (`[col, row]` convention).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Homography {
    forward: Matrix3<f64>,
    inverse: Matrix3<f64>,
}

impl Homography {
    /// Solve the homography that maps each `src[i]` onto `dst[i]`.
    ///
    /// # Errors
    ///
    /// Returns [`RoverError::Calibration`] when the correspondences are
    /// degenerate (e.g. coincident points) and no unique transform exists.
    pub fn from_correspondences(
        src: [[f64; 2]; 4],
        dst: [[f64; 2]; 4],
    ) -> Result<Self, RoverError> {
        // h22 is fixed to 1, leaving eight unknowns: two equations per pair.
        let mut rows = [0.0; 64];
        let mut b = SVector::<f64, 8>::zeros();
        for (i, ([x, y], [u, v])) in src.iter().zip(dst.iter()).enumerate() {
            let r = 2 * i;
            rows[8 * r..8 * r + 8].copy_from_slice(&[*x, *y, 1.0, 0.0, 0.0, 0.0, -u * x, -u * y]);
            rows[8 * (r + 1)..8 * (r + 1) + 8]
                .copy_from_slice(&[0.0, 0.0, 0.0, *x, *y, 1.0, -v * x, -v * y]);
            b[r] = *u;
            b[r + 1] = *v;
        }
        let a = SMatrix::<f64, 8, 8>::from_row_slice(&rows);

        let h = a.lu().solve(&b).ok_or_else(|| {
            RoverError::Calibration("calibration points do not define a homography".into())
        })?;
        if !h.iter().all(|v| v.is_finite()) {
            return Err(RoverError::Calibration(
                "calibration points do not define a homography".into(),
            ));
        }
        let forward = Matrix3::new(h[0], h[1], h[2], h[3], h[4], h[5], h[6], h[7], 1.0);
        Self::from_matrix(forward)
    }

    /// Wrap an explicit 3×3 matrix.
    ///
    /// # Errors
    ///
    /// Returns [`RoverError::Calibration`] when the matrix is singular.
    pub fn from_matrix(forward: Matrix3<f64>) -> Result<Self, RoverError> {
        let inverse = forward
            .try_inverse()
            .ok_or_else(|| RoverError::Calibration("homography matrix is singular".into()))?;
        Ok(Self { forward, inverse })
    }

    /// Map a source pixel to the destination plane. `None` when the point
    /// maps to infinity.
    pub fn apply(&self, col: f64, row: f64) -> Option<(f64, f64)> {
        project(&self.forward, col, row)
    }

    /// Warp `image` into the destination plane, keeping its size.
    ///
    /// Each destination pixel is pulled from the source through the inverse
    /// transform with bilinear interpolation; samples outside the source are
    /// black.
    pub fn warp(&self, image: &RgbImage) -> RgbImage {
        let (w, h) = (image.width(), image.height());
        let mut out = RgbImage::blank(w, h);
        for row in 0..h {
            for col in 0..w {
                if let Some((sx, sy)) = project(&self.inverse, col as f64, row as f64) {
                    out.set_pixel(col, row, sample_bilinear(image, sx, sy));
                }
            }
        }
        out
    }
}

fn project(m: &Matrix3<f64>, col: f64, row: f64) -> Option<(f64, f64)> {
    let p = m * Vector3::new(col, row, 1.0);
    if p.z.abs() < f64::EPSILON {
        return None;
    }
    Some((p.x / p.z, p.y / p.z))
}

fn sample_bilinear(image: &RgbImage, x: f64, y: f64) -> [u8; 3] {
    let (w, h) = (image.width() as f64, image.height() as f64);
    if x <= -1.0 || y <= -1.0 || x >= w || y >= h {
        return [0, 0, 0];
    }
    let x0 = x.floor();
    let y0 = y.floor();
    let (fx, fy) = (x - x0, y - y0);

    let fetch = |cx: f64, cy: f64| -> [f64; 3] {
        if cx < 0.0 || cy < 0.0 || cx >= w || cy >= h {
            return [0.0; 3];
        }
        let p = image.pixel(cx as usize, cy as usize);
        [f64::from(p[0]), f64::from(p[1]), f64::from(p[2])]
    };

    let p00 = fetch(x0, y0);
    let p10 = fetch(x0 + 1.0, y0);
    let p01 = fetch(x0, y0 + 1.0);
    let p11 = fetch(x0 + 1.0, y0 + 1.0);

    let mut out = [0u8; 3];
    for c in 0..3 {
        let top = p00[c] * (1.0 - fx) + p10[c] * fx;
        let bottom = p01[c] * (1.0 - fx) + p11[c] * fx;
        out[c] = (top * (1.0 - fy) + bottom * fy).round().clamp(0.0, 255.0) as u8;
    }
    out
}

// ────────────────────────────────────────────────────────────────────────────
// Overhead → rover → polar
// ────────────────────────────────────────────────────────────────────────────

/// Rover-frame Cartesian coordinates of every set pixel of `mask`.
///
/// The camera sits at the bottom-centre of the overhead frame: `x` grows
/// forward (up the image) and `y` grows left.
pub fn mask_to_rover(mask: &Mask) -> Vec<Point2<f64>> {
    let height = mask.height() as f64;
    let half_width = mask.width() as f64 / 2.0;
    mask.nonzero()
        .map(|(col, row)| Point2::new(height - row as f64, half_width - col as f64))
        .collect()
}

/// Distance and bearing of each rover-frame point.
pub fn to_polar(points: &[Point2<f64>]) -> PolarCloud {
    points
        .iter()
        .map(|p| PolarObservation {
            dist: p.x.hypot(p.y),
            angle: p.y.atan2(p.x),
        })
        .collect()
}

// ────────────────────────────────────────────────────────────────────────────
// Rover ↔ world
// ────────────────────────────────────────────────────────────────────────────

/// A world-map cell index, always inside `[0, dimension − 1]` on both axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GridCell {
    pub x: usize,
    pub y: usize,
}

/// Rotate rover-frame points counter-clockwise by `yaw_deg`.
pub fn rotate(points: &[Point2<f64>], yaw_deg: f64) -> Vec<Point2<f64>> {
    let rot = Rotation2::new(yaw_deg.to_radians());
    points.iter().map(|p| rot.transform_point(p)).collect()
}

/// Scale rotated points down to world units and move them to `pos`.
pub fn translate(points: &[Point2<f64>], pos: (f64, f64), scale: f64) -> Vec<Point2<f64>> {
    let offset = Vector2::new(pos.0, pos.1);
    points.iter().map(|p| Point2::from(p.coords / scale + offset)).collect()
}

/// Project rover-frame points into world-map cells.
///
/// Rotates by `yaw_deg`, scales by `1 / scale`, translates by `pos`, then
/// clamps both axes into `[0, dimension − 1]` before truncating. Any input,
/// however far out, lands on the grid.
pub fn rover_to_world(
    points: &[Point2<f64>],
    pos: (f64, f64),
    yaw_deg: f64,
    scale: f64,
    dimension: usize,
) -> Vec<GridCell> {
    let upper = dimension.saturating_sub(1) as f64;
    translate(&rotate(points, yaw_deg), pos, scale)
        .into_iter()
        .map(|p| GridCell {
            x: p.x.clamp(0.0, upper) as usize,
            y: p.y.clamp(0.0, upper) as usize,
        })
        .collect()
}

/// Undo the translation and scaling of [`translate`]: `(p − t) × scale`.
///
/// The result is still rotated by the yaw the points were projected with.
pub fn inverse_translate(
    points: &[Point2<f64>],
    translation: (f64, f64),
    scale: f64,
) -> Vec<Point2<f64>> {
    let offset = Vector2::new(translation.0, translation.1);
    points.iter().map(|p| Point2::from((p.coords - offset) * scale)).collect()
}

impl From<GridCell> for Point2<f64> {
    fn from(cell: GridCell) -> Self {
        Point2::new(cell.x as f64, cell.y as f64)
    }
}
