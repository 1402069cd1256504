//! Configuration Vault – reads/writes `~/.rover/config.toml`.
//!
//! [`RoverConfig`] is the one value that carries every tunable of the
//! perception and decision passes. Construct it once (defaults, TOML file,
//! then `ROVER_*` overrides) and pass it explicitly.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::RoverError;

/// Channel order the HSV conversion assumes for camera pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelOrder {
    Rgb,
    /// Byte 0 is blue. The default rock bounds are tuned for this reading.
    #[default]
    Bgr,
}

/// Everything the perception pass needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PerceptionConfig {
    /// A pixel is navigable when every channel is strictly above these.
    pub nav_rgb_threshold: [u8; 3],
    /// Inclusive lower HSV bound for sample rocks (H in `[0, 180)`).
    pub rock_hsv_low: [u8; 3],
    /// Inclusive upper HSV bound for sample rocks.
    pub rock_hsv_high: [u8; 3],
    pub hsv_channel_order: ChannelOrder,

    /// Camera frame size the calibration was taken at.
    pub frame_width: usize,
    pub frame_height: usize,
    /// Four camera-image points `[col, row]` outlining one ground grid cell.
    pub calibration_src: [[f64; 2]; 4],
    /// Side of the calibration cell in the overhead image, in pixels.
    pub calibration_grid_px: f64,
    /// Gap between the overhead image bottom and the calibration cell.
    pub calibration_bottom_offset_px: f64,

    /// Overhead pixels per world-grid cell.
    pub world_scale: f64,
    /// Side of the square world map.
    pub world_dimension: usize,
    /// Evidence added per sighting.
    pub evidence_increment: u32,

    /// Near-field cutoffs gating what reaches the world map.
    pub nav_cutoff: f64,
    pub obs_cutoff: f64,
    pub rock_cutoff: f64,

    /// Debug composite intensities per mask.
    pub vision_obstacle_level: u8,
    pub vision_rock_level: u8,
    pub vision_nav_level: u8,
}

impl Default for PerceptionConfig {
    fn default() -> Self {
        Self {
            nav_rgb_threshold: [160, 160, 160],
            rock_hsv_low: [75, 130, 130],
            rock_hsv_high: [255, 255, 255],
            hsv_channel_order: ChannelOrder::Bgr,
            frame_width: 320,
            frame_height: 160,
            calibration_src: [[14.0, 140.0], [301.0, 140.0], [200.0, 96.0], [118.0, 96.0]],
            calibration_grid_px: 10.0,
            calibration_bottom_offset_px: 6.0,
            world_scale: 10.0,
            world_dimension: 200,
            evidence_increment: 255,
            nav_cutoff: 60.0,
            obs_cutoff: 80.0,
            rock_cutoff: 70.0,
            vision_obstacle_level: 135,
            vision_rock_level: 255,
            vision_nav_level: 175,
        }
    }
}

/// Thresholds behind the event predicates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventThresholds {
    /// Navigable pixels needed ahead to keep driving.
    pub go_forward: usize,
    /// Left-of-heading navigable pixels that count as room on the left.
    pub left_room_count: usize,
    /// Half-width of the "pointed at navigable terrain" band, radians.
    pub heading_band_rad: f64,
    /// Left-of-heading pixels needed before the wall alignment is trusted.
    pub wall_follow_count: usize,
    /// Mean left angle (degrees) above which the rover runs along the wall.
    pub wall_alignment_deg: f64,
    /// Mean left angle (degrees) above which the rover has left the wall.
    pub wall_deviation_deg: f64,
    /// Fewer navigable pixels than this means the way ahead is blocked.
    pub front_stop_count: usize,
    /// Fewer left-of-heading pixels than this means the wall is too close.
    pub left_stop_count: usize,
    pub sample_heading_band_rad: f64,
    /// Mean rock distance under which a right-hand sample is worth a detour.
    pub sample_close_dist: f64,
    /// Speed at or under which the pickup may start.
    pub pickup_velocity: f64,
    pub samples_to_collect: u32,
    /// Distance to home, in world units, that counts as arrived.
    pub home_radius: f64,
    /// Speed under which a driving state counts a stalled cycle.
    pub stall_velocity: f64,
    /// Consecutive stalled cycles that trigger recovery.
    pub stall_cycles: u32,
    /// Open yaw band (degrees) that ends the initial wall search.
    pub seek_yaw_min_deg: f64,
    pub seek_yaw_max_deg: f64,
}

impl Default for EventThresholds {
    fn default() -> Self {
        Self {
            go_forward: 500,
            left_room_count: 1500,
            heading_band_rad: 0.3,
            wall_follow_count: 500,
            wall_alignment_deg: 10.0,
            wall_deviation_deg: 25.0,
            front_stop_count: 600,
            left_stop_count: 50,
            sample_heading_band_rad: 0.3,
            sample_close_dist: 75.0,
            pickup_velocity: 0.1,
            samples_to_collect: 6,
            home_radius: 3.0,
            stall_velocity: 0.05,
            stall_cycles: 60,
            seek_yaw_min_deg: 45.0,
            seek_yaw_max_deg: 65.0,
        }
    }
}

/// Magnitudes the state actions put into the motion intent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriveConfig {
    pub max_vel: f64,
    pub throttle_set: f64,
    pub brake_set: f64,
    /// Steering saturation, degrees.
    pub max_steer_deg: f64,
    /// How far right of the mean left-navigable bearing to steer along a wall.
    pub wall_offset_deg: f64,
    pub approach_throttle: f64,
}

impl Default for DriveConfig {
    fn default() -> Self {
        Self {
            max_vel: 2.0,
            throttle_set: 0.2,
            brake_set: 10.0,
            max_steer_deg: 15.0,
            wall_offset_deg: 12.0,
            approach_throttle: 0.1,
        }
    }
}

/// Persisted rover configuration stored in `~/.rover/config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoverConfig {
    pub perception: PerceptionConfig,
    pub events: EventThresholds,
    pub drive: DriveConfig,
}

/// Return the path to `~/.rover/config.toml`.
pub fn config_path() -> PathBuf {
    config_path_for_home(
        &std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .unwrap_or_else(|_| ".".to_string()),
    )
}

/// Build the config path relative to the given home directory.
pub fn config_path_for_home(home: &str) -> PathBuf {
    PathBuf::from(home).join(".rover").join("config.toml")
}

/// Load the config from `~/.rover/config.toml`. Returns `None` if the file
/// does not exist.
pub fn load() -> Result<Option<RoverConfig>, RoverError> {
    load_from(&config_path())
}

/// Load the config from a specific path, then apply environment overrides.
pub fn load_from(path: &Path) -> Result<Option<RoverConfig>, RoverError> {
    if !path.exists() {
        return Ok(None);
    }
    let raw = fs::read_to_string(path).map_err(|e| {
        RoverError::Config(format!("failed to read config at {}: {e}", path.display()))
    })?;
    let mut cfg: RoverConfig = toml::from_str(&raw)
        .map_err(|e| RoverError::Config(format!("failed to parse config: {e}")))?;
    apply_env_overrides(&mut cfg);
    Ok(Some(cfg))
}

/// Apply `ROVER_*` environment variable overrides to `cfg`.
///
/// | Variable | Config field |
/// |---|---|
/// | `ROVER_MAX_VEL` | `drive.max_vel` |
/// | `ROVER_SAMPLES_TO_COLLECT` | `events.samples_to_collect` |
/// | `ROVER_GO_FORWARD` | `events.go_forward` |
///
/// Values that do not parse are ignored.
pub fn apply_env_overrides(cfg: &mut RoverConfig) {
    if let Some(v) = env_parse::<f64>("ROVER_MAX_VEL") {
        cfg.drive.max_vel = v;
    }
    if let Some(v) = env_parse::<u32>("ROVER_SAMPLES_TO_COLLECT") {
        cfg.events.samples_to_collect = v;
    }
    if let Some(v) = env_parse::<usize>("ROVER_GO_FORWARD") {
        cfg.events.go_forward = v;
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    let raw = std::env::var(key).ok()?;
    match raw.parse() {
        Ok(v) => {
            debug!(key, value = %raw, "config override from environment");
            Some(v)
        }
        Err(_) => None,
    }
}

/// Save the config to disk, creating the parent directory if necessary.
pub fn save_to(cfg: &RoverConfig, path: &Path) -> Result<(), RoverError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| RoverError::Config(format!("failed to create config directory: {e}")))?;
    }
    let raw = toml::to_string_pretty(cfg)
        .map_err(|e| RoverError::Config(format!("failed to serialize config: {e}")))?;
    fs::write(path, raw).map_err(|e| {
        RoverError::Config(format!("failed to write config at {}: {e}", path.display()))
    })
}
