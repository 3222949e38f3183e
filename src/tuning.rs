//! Match tuning and balance
//!
//! Every knob the simulation reads lives here. Loaded from JSON; missing
//! fields fall back to the defaults below.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::MatchError;

/// Match balance parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchTuning {
    // === Match ===
    /// Balls spawned at match start
    pub ball_count: u32,
    /// Added to the multiplier once every ball is kicked (linear in kicked fraction)
    pub difficulty_factor: f32,
    /// Level the host loads when the match completes
    pub next_level: String,

    // === Ball steering ===
    /// Seek speed before the difficulty multiplier (units/s)
    pub ball_base_speed: f32,
    /// Hard cap on seek speed (units/s)
    pub ball_max_speed: f32,
    /// Seconds between forced re-targets
    pub retarget_interval: f32,
    /// Inset kept between a ball and the field edge
    pub edge_margin: f32,
    /// Distance at which a target counts as reached
    pub arrival_radius: f32,
    /// Heading smoothing rate (1/s, 0 disables)
    pub steering_smoothing: f32,
    /// Orientation slew rate
    pub ball_turn_rate: f32,
    /// Height above the field floor balls roam at
    pub spawn_height_offset: f32,

    // === Kicked balls ===
    /// Seconds a kicked ball stays in the world before removal
    pub removal_delay: f32,
    /// Minimum upward component of a kick impulse direction
    pub kick_min_lift: f32,

    // === Kick detection ===
    /// Seconds the detection window stays open
    pub kick_window: f32,
    /// Seconds avatar movement is locked after a kick starts
    pub kick_lock: f32,
    /// Radius of the detection sphere
    pub kick_radius: f32,
    /// Impulse magnitude applied to a kicked ball
    pub kick_force: f32,
    /// Upward bias written into the kick direction
    pub kick_lift: f32,
    /// Distance of the kick origin in front of the avatar
    pub kick_reach: f32,

    // === Avatar ===
    pub avatar_move_speed: f32,
    pub avatar_run_multiplier: f32,
    pub avatar_turn_rate: f32,
    pub avatar_jump_force: f32,
}

impl Default for MatchTuning {
    fn default() -> Self {
        Self {
            ball_count: 10,
            difficulty_factor: 3.0,
            next_level: "level_2".to_string(),

            ball_base_speed: 3.0,
            ball_max_speed: 12.0,
            retarget_interval: 3.0,
            edge_margin: 0.5,
            arrival_radius: 0.5,
            steering_smoothing: 6.0,
            ball_turn_rate: 10.0,
            spawn_height_offset: 0.5,

            removal_delay: 2.0,
            kick_min_lift: 0.3,

            kick_window: 1.0,
            kick_lock: 0.6,
            kick_radius: 1.5,
            kick_force: 20.0,
            kick_lift: 0.4,
            kick_reach: 0.8,

            avatar_move_speed: 4.0,
            avatar_run_multiplier: 1.7,
            avatar_turn_rate: 10.0,
            avatar_jump_force: 7.0,
        }
    }
}

impl MatchTuning {
    /// Parse tuning from a JSON document
    pub fn from_json(json: &str) -> Result<Self, MatchError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load tuning from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, MatchError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let tuning = Self::from_json(&json)?;
        log::info!("Loaded tuning from {}", path.display());
        Ok(tuning)
    }

    /// Values that are accepted but probably not what the author meant.
    ///
    /// None of these are rejected: a negative difficulty factor, for
    /// instance, just makes remaining balls slower (or reverse) as kicks land.
    pub fn sanity_warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        if self.difficulty_factor < 0.0 {
            warnings.push(format!(
                "difficulty_factor {} is negative; balls slow down as kicks land",
                self.difficulty_factor
            ));
        }
        if 1.0 + self.difficulty_factor <= 0.0 {
            warnings.push("difficulty multiplier reaches zero or below; last balls stall or reverse".to_string());
        }
        if self.ball_base_speed > self.ball_max_speed {
            warnings.push(format!(
                "ball_base_speed {} exceeds ball_max_speed {}",
                self.ball_base_speed, self.ball_max_speed
            ));
        }
        if self.kick_window <= 0.0 {
            warnings.push("kick_window <= 0; kicks can never connect".to_string());
        }
        if self.edge_margin < 0.0 {
            warnings.push(format!("edge_margin {} is negative", self.edge_margin));
        }
        if self.retarget_interval <= 0.0 {
            warnings.push("retarget_interval <= 0; balls re-target every frame".to_string());
        }
        warnings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let tuning = MatchTuning::from_json(r#"{ "ball_count": 4, "kick_radius": 2.5 }"#).unwrap();
        assert_eq!(tuning.ball_count, 4);
        assert_eq!(tuning.kick_radius, 2.5);
        assert_eq!(tuning.kick_window, MatchTuning::default().kick_window);
        assert_eq!(tuning.next_level, "level_2");
    }

    #[test]
    fn test_malformed_json_is_error() {
        let err = MatchTuning::from_json("{ ball_count: }").unwrap_err();
        assert!(matches!(err, MatchError::Tuning(_)));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = MatchTuning::load("/definitely/not/here/tuning.json").unwrap_err();
        assert!(matches!(err, MatchError::Io(_)));
    }

    #[test]
    fn test_sanity_warnings() {
        assert!(MatchTuning::default().sanity_warnings().is_empty());

        let tuning = MatchTuning {
            difficulty_factor: -2.0,
            ..Default::default()
        };
        let warnings = tuning.sanity_warnings();
        assert!(warnings.iter().any(|w| w.contains("negative")));
        assert!(warnings.iter().any(|w| w.contains("zero or below")));
    }
}
