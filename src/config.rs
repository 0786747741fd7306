//! Runtime configuration.
//!
//! Every knob the games read lives here instead of in module-level globals.
//! Speeds are per millisecond: grid games measure distance in cells, Pong and
//! the bullet hell in canvas pixels.

use std::f64::consts::PI;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::vector::Vector;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub canvas_width: f64,
    pub canvas_height: f64,
    /// How long a finished game keeps ticking before the session reports it.
    pub grace_period_ms: f64,
    /// Longest step the driver accepts; longer frames are shortened to this.
    pub max_delta_ms: Option<f64>,
    pub top_down: TopDownTuning,
    pub platformer: PlatformerTuning,
    pub pong: PongTuning,
    pub bullet_hell: BulletHellTuning,
    pub jumper: JumperTuning,
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            canvas_width: 800.0,
            canvas_height: 600.0,
            grace_period_ms: 1000.0,
            max_delta_ms: Some(100.0),
            top_down: TopDownTuning::default(),
            platformer: PlatformerTuning::default(),
            pong: PongTuning::default(),
            bullet_hell: BulletHellTuning::default(),
            jumper: JumperTuning::default(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TopDownTuning {
    pub player_speed: f64,
    pub coin_frame_ms: f64,
    pub coin_frames: u32,
    pub lives: u32,
}

impl Default for TopDownTuning {
    fn default() -> Self {
        TopDownTuning {
            player_speed: 0.005,
            coin_frame_ms: 100.0,
            coin_frames: 8,
            lives: 3,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlatformerTuning {
    pub run_speed: f64,
    /// Cells per millisecond squared.
    pub gravity: f64,
    pub jump_speed: f64,
    pub lava_slide_speed: f64,
    pub lava_fall_speed: f64,
    pub lava_drip_speed: f64,
    /// Radians per millisecond.
    pub wobble_speed: f64,
    pub wobble_distance: f64,
    pub lives: u32,
}

impl Default for PlatformerTuning {
    fn default() -> Self {
        PlatformerTuning {
            run_speed: 0.007,
            gravity: 0.000_03,
            jump_speed: 0.017,
            lava_slide_speed: 0.002,
            lava_fall_speed: 0.002,
            lava_drip_speed: 0.003,
            wobble_speed: 0.008,
            wobble_distance: 0.07,
            lives: 3,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PongTuning {
    pub ball_size: f64,
    pub paddle_size: Vector,
    pub paddle_margin: f64,
    pub paddle_speed: f64,
    pub wall_thickness: f64,
    pub goal_width: f64,
    pub initial_speed: f64,
    pub speed_gain: f64,
    /// First side to reach this many points ends the match.
    pub winning_score: Option<u32>,
}

impl Default for PongTuning {
    fn default() -> Self {
        PongTuning {
            ball_size: 20.0,
            paddle_size: Vector::new(20.0, 100.0),
            paddle_margin: 30.0,
            paddle_speed: 0.8,
            wall_thickness: 20.0,
            goal_width: 6.0,
            initial_speed: 0.3,
            speed_gain: 1.05,
            winning_score: Some(7),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BulletHellTuning {
    pub player_size: Vector,
    pub player_collider: Vector,
    pub player_speed: f64,
    pub player_health: i32,
    pub player_bullet_speed: f64,
    pub player_bullet_size: Vector,
    pub player_bullet_lifetime_ms: f64,
    pub emitter_y: f64,
    pub emitter_delay_ms: f64,
    pub emitter_angle_step: f64,
    pub emitter_arms: u32,
    pub enemy_bullet_speed: f64,
    pub enemy_bullet_size: Vector,
    pub enemy_bullet_collider: Vector,
    pub target_min_delay_ms: f64,
    pub target_max_delay_ms: f64,
    pub target_min_size: f64,
    pub target_max_size: f64,
}

impl Default for BulletHellTuning {
    fn default() -> Self {
        BulletHellTuning {
            player_size: Vector::new(40.0, 40.0),
            player_collider: Vector::new(20.0, 30.0),
            player_speed: 0.2,
            player_health: 3,
            player_bullet_speed: 0.2,
            player_bullet_size: Vector::new(6.0, 6.0),
            player_bullet_lifetime_ms: 2000.0,
            emitter_y: 100.0,
            emitter_delay_ms: 80.0,
            emitter_angle_step: PI / 25.5,
            emitter_arms: 2,
            enemy_bullet_speed: 0.05,
            enemy_bullet_size: Vector::new(6.0, 12.0),
            enemy_bullet_collider: Vector::new(6.0, 6.0),
            target_min_delay_ms: 500.0,
            target_max_delay_ms: 1000.0,
            target_min_size: 50.0,
            target_max_size: 100.0,
        }
    }
}

/// Block jumper: one block at a time scrolls in from the right.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JumperTuning {
    pub player_size: Vector,
    pub player_x: f64,
    /// Pixels per millisecond squared.
    pub gravity: f64,
    pub jump_speed: f64,
    pub block_width: f64,
    pub block_min_height: f64,
    pub block_max_height: f64,
    /// How far past the right edge a new block starts.
    pub block_lead: f64,
    pub block_min_speed: f64,
    pub block_max_speed: f64,
    /// Added to the speed range on every level up.
    pub min_speed_step: f64,
    pub max_speed_step: f64,
    pub points_per_level: u32,
}

impl Default for JumperTuning {
    fn default() -> Self {
        JumperTuning {
            player_size: Vector::new(30.0, 30.0),
            player_x: 10.0,
            gravity: 0.0036,
            jump_speed: 1.56,
            block_width: 30.0,
            block_min_height: 50.0,
            block_max_height: 300.0,
            block_lead: 200.0,
            block_min_speed: 0.24,
            block_max_speed: 0.3,
            min_speed_step: 0.03,
            max_speed_step: 0.06,
            points_per_level: 5,
        }
    }
}

impl GameConfig {
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let config: GameConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("canvas_width", self.canvas_width)?;
        positive("canvas_height", self.canvas_height)?;
        if !(self.grace_period_ms >= 0.0) {
            return Err(invalid("grace_period_ms", "must be zero or positive"));
        }
        if let Some(max_delta) = self.max_delta_ms {
            positive("max_delta_ms", max_delta)?;
        }
        positive("top_down.coin_frame_ms", self.top_down.coin_frame_ms)?;
        if self.top_down.coin_frames == 0 {
            return Err(invalid("top_down.coin_frames", "must be at least 1"));
        }
        positive("pong.ball_size", self.pong.ball_size)?;
        positive("pong.initial_speed", self.pong.initial_speed)?;
        if self.pong.winning_score == Some(0) {
            return Err(invalid("pong.winning_score", "must be at least 1"));
        }
        let hell = &self.bullet_hell;
        if hell.emitter_arms == 0 {
            return Err(invalid("bullet_hell.emitter_arms", "must be at least 1"));
        }
        if hell.target_min_delay_ms > hell.target_max_delay_ms {
            return Err(invalid(
                "bullet_hell.target_min_delay_ms",
                "must not exceed target_max_delay_ms",
            ));
        }
        if hell.target_min_size > hell.target_max_size {
            return Err(invalid(
                "bullet_hell.target_min_size",
                "must not exceed target_max_size",
            ));
        }
        let jumper = &self.jumper;
        positive("jumper.block_width", jumper.block_width)?;
        positive("jumper.block_min_speed", jumper.block_min_speed)?;
        if jumper.block_min_height > jumper.block_max_height {
            return Err(invalid(
                "jumper.block_min_height",
                "must not exceed block_max_height",
            ));
        }
        if jumper.block_min_speed > jumper.block_max_speed {
            return Err(invalid(
                "jumper.block_min_speed",
                "must not exceed block_max_speed",
            ));
        }
        if jumper.points_per_level == 0 {
            return Err(invalid("jumper.points_per_level", "must be at least 1"));
        }
        Ok(())
    }
}

fn positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(invalid(field, &format!("must be a positive number, got {value}")))
    }
}

fn invalid(field: &'static str, reason: &str) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.to_string(),
    }
}
