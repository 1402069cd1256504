//! Polar observations in the rover frame.
//!
//! Angles follow the rover convention: positive is left of the heading,
//! negative is right, in radians over `(-π, π]`.

/// One classified pixel, as seen from the rover.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PolarObservation {
    /// Distance from the camera origin, in overhead-frame pixels.
    pub dist: f64,
    /// Bearing in radians, positive = left.
    pub angle: f64,
}

/// An ordered sequence of [`PolarObservation`]s for one mask.
///
/// Filters return new clouds and never reorder; the empty cloud is a normal
/// value whose means are `None`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PolarCloud {
    points: Vec<PolarObservation>,
}

impl PolarCloud {
    pub fn new(points: Vec<PolarObservation>) -> Self {
        Self { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PolarObservation> {
        self.points.iter()
    }

    pub fn distances(&self) -> impl Iterator<Item = f64> + '_ {
        self.points.iter().map(|p| p.dist)
    }

    pub fn angles(&self) -> impl Iterator<Item = f64> + '_ {
        self.points.iter().map(|p| p.angle)
    }

    /// Mean bearing in radians, or `None` for an empty cloud.
    pub fn mean_angle(&self) -> Option<f64> {
        mean(self.angles(), self.len())
    }

    /// Mean bearing in degrees, or `None` for an empty cloud.
    pub fn mean_angle_deg(&self) -> Option<f64> {
        self.mean_angle().map(f64::to_degrees)
    }

    /// Mean distance, or `None` for an empty cloud.
    pub fn mean_dist(&self) -> Option<f64> {
        mean(self.distances(), self.len())
    }

    /// The observations strictly left of the heading (`angle > 0`).
    pub fn left_of_heading(&self) -> PolarCloud {
        self.filter(|p| p.angle > 0.0)
    }

    /// The observations strictly closer than `cutoff`.
    pub fn within(&self, cutoff: f64) -> PolarCloud {
        self.filter(|p| p.dist < cutoff)
    }

    pub fn filter(&self, keep: impl Fn(&PolarObservation) -> bool) -> PolarCloud {
        PolarCloud::new(self.points.iter().copied().filter(|p| keep(p)).collect())
    }
}

impl FromIterator<PolarObservation> for PolarCloud {
    fn from_iter<I: IntoIterator<Item = PolarObservation>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

fn mean(values: impl Iterator<Item = f64>, len: usize) -> Option<f64> {
    if len == 0 {
        return None;
    }
    Some(values.sum::<f64>() / len as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obs(dist: f64, angle: f64) -> PolarObservation {
        PolarObservation { dist, angle }
    }

    #[test]
    fn empty_cloud_has_no_means() {
        let cloud = PolarCloud::default();
        assert!(cloud.is_empty());
        assert_eq!(cloud.mean_angle(), None);
        assert_eq!(cloud.mean_dist(), None);
        assert!(cloud.left_of_heading().is_empty());
    }

    #[test]
    fn left_subset_excludes_zero_and_right() {
        let cloud: PolarCloud = [obs(1.0, 0.5), obs(1.0, 0.0), obs(1.0, -0.5), obs(2.0, 1.0)]
            .into_iter()
            .collect();
        let left = cloud.left_of_heading();
        assert_eq!(left.len(), 2);
        assert!(left.angles().all(|a| a > 0.0));
    }

    #[test]
    fn within_is_strict() {
        let cloud = PolarCloud::new(vec![obs(59.9, 0.0), obs(60.0, 0.0), obs(10.0, 0.1)]);
        assert_eq!(cloud.within(60.0).len(), 2);
    }

    #[test]
    fn means_are_arithmetic() {
        let cloud = PolarCloud::new(vec![obs(10.0, 0.2), obs(30.0, -0.4)]);
        assert!((cloud.mean_dist().unwrap() - 20.0).abs() < 1e-12);
        assert!((cloud.mean_angle().unwrap() + 0.1).abs() < 1e-12);
        assert!((cloud.mean_angle_deg().unwrap() + 0.1f64.to_degrees()).abs() < 1e-9);
    }
}
