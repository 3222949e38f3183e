//! Kickabout - ball roaming and kicking simulation core
//!
//! Core modules:
//! - `sim`: Frame-stepped simulation (balls, kick detection, match controller)
//! - `tuning`: Data-driven match balance
//! - `error`: Error type shared by the library and the headless runner

pub mod error;
pub mod sim;
pub mod tuning;

pub use error::MatchError;
pub use tuning::MatchTuning;

use glam::{Quat, Vec3};

/// Simulation constants
pub mod consts {
    /// Fixed simulation timestep (50 Hz physics step)
    pub const SIM_DT: f32 = 1.0 / 50.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
    /// Longest frame delta the scheduler will accept
    pub const MAX_FRAME_DT: f32 = 0.1;

    /// Gravity applied to dynamic bodies (units/s²)
    pub const GRAVITY: f32 = 9.81;
    /// Distance above the floor still treated as standing on it
    pub const GROUND_EPSILON: f32 = 0.05;
}

/// Project a vector onto the XZ plane
#[inline]
pub fn flatten(v: Vec3) -> Vec3 {
    Vec3::new(v.x, 0.0, v.z)
}

/// Interpolation factor for exponential smoothing at `rate` per second.
///
/// A rate of zero (or less) means no smoothing: the factor is 1.
#[inline]
pub fn smoothing_factor(rate: f32, dt: f32) -> f32 {
    if rate <= 0.0 {
        1.0
    } else {
        1.0 - (-rate * dt).exp()
    }
}

/// Rotation about +Y that makes +Z face along `dir` (XZ plane)
#[inline]
pub fn yaw_rotation(dir: Vec3) -> Quat {
    Quat::from_rotation_y(dir.x.atan2(dir.z))
}

/// Slew `from` toward the yaw of `dir`, advancing by `rate * dt` (clamped to 1)
pub fn slew_facing(from: Quat, dir: Vec3, rate: f32, dt: f32) -> Quat {
    let flat = flatten(dir);
    if flat.length_squared() < 1e-6 {
        return from;
    }
    from.slerp(yaw_rotation(flat), (rate * dt).clamp(0.0, 1.0))
}
