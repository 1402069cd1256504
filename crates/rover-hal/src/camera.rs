//! Generic `Camera` trait for the forward-facing rover camera.

use rover_types::{RgbImage, RoverError};

/// A frame source.
pub trait Camera: Send + Sync {
    /// Stable identifier for this camera, e.g. `"front_rgb"`.
    fn id(&self) -> &str;

    /// Capture and return the next available frame.
    ///
    /// # Errors
    ///
    /// Returns [`RoverError::HardwareFault`] if no frame can be produced
    /// (e.g. the device is disconnected or the buffer is unavailable).
    fn capture(&mut self) -> Result<RgbImage, RoverError>;
}
