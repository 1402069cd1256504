//! `rover-perception` – turns a camera frame into observations and map
//! evidence.
//!
//! # Modules
//!
//! | Module | Role |
//! |--------|------|
//! | [`color`] | Thresholds an overhead frame into navigable, obstacle and rock [`Mask`]s. |
//! | [`transform`] | [`Homography`] warp plus the pixel → rover → world coordinate chain. |
//! | [`observation`] | Polar summaries for the decision layer and near-field subsets for mapping. |
//! | [`worldmap`] | [`WorldMap`]: additive per-channel evidence grid. |
//! | [`pipeline`] | [`Perception`]: one full pass per frame, writing into the rover record. |

pub mod color;
pub mod observation;
pub mod pipeline;
pub mod transform;
pub mod worldmap;

pub use color::{Mask, TerrainMasks};
pub use observation::Observations;
pub use pipeline::{Perception, PerceptionReport};
pub use transform::{GridCell, Homography};
pub use worldmap::{MapChannel, WorldMap};
