//! Actor factories referenced from level legends.

use std::f64::consts::TAU;

use serde::{Deserialize, Serialize};

use crate::config::GameConfig;
use crate::entities::{Animation, BlockResponse, Boundary, Entity, Label, Motion};
use crate::vector::Vector;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Prefab {
    /// Top-down hero steered in four directions.
    Player,
    /// Animated top-down coin.
    Coin,
    /// Solid block drawn as an entity on top of a wall cell.
    Obstacle,
    /// Platformer hero with gravity and jumping.
    Runner,
    /// Wobbling platformer coin.
    Gem,
    /// Lava moving sideways, bouncing off walls.
    LavaSlide,
    /// Lava moving vertically, bouncing off walls.
    LavaFall,
    /// Lava dripping down and restarting from its spawn cell.
    LavaDrip,
}

impl Prefab {
    pub fn is_player(self) -> bool {
        matches!(self, Prefab::Player | Prefab::Runner)
    }

    /// Build the actor for the grid cell whose top-left corner is `cell`.
    pub fn spawn(self, cell: Vector, config: &GameConfig) -> Entity {
        let unit = Vector::new(1.0, 1.0);
        let platformer = &config.platformer;
        match self {
            Prefab::Player => Entity::new(Label::Player, cell, unit)
                .with_motion(Motion::Steered {
                    speed: config.top_down.player_speed,
                })
                .with_boundary(Boundary::Clamp),
            Prefab::Coin => {
                let last_frame = config.top_down.coin_frames.saturating_sub(1);
                Entity::new(Label::Pickup, cell, unit).with_animation(Animation::new(
                    0,
                    last_frame,
                    true,
                    config.top_down.coin_frame_ms,
                ))
            }
            Prefab::Obstacle => Entity::new(Label::Wall, cell, unit),
            Prefab::Runner => Entity::new(
                Label::Player,
                cell.plus(Vector::new(0.0, -0.5)),
                Vector::new(0.8, 1.5),
            )
            .with_motion(Motion::Platformer {
                run_speed: platformer.run_speed,
                gravity: platformer.gravity,
                jump_speed: platformer.jump_speed,
            })
            .with_boundary(Boundary::Clamp),
            Prefab::Gem => {
                let base = cell.plus(Vector::new(0.2, 0.1));
                Entity::new(Label::Pickup, base, Vector::new(0.6, 0.6)).with_motion(
                    Motion::Wobble {
                        base,
                        phase: wobble_phase(cell),
                        speed: platformer.wobble_speed,
                        distance: platformer.wobble_distance,
                    },
                )
            }
            Prefab::LavaSlide => Entity::new(Label::Hazard, cell, unit)
                .with_velocity(Vector::new(platformer.lava_slide_speed, 0.0))
                .with_motion(Motion::Drift {
                    on_block: BlockResponse::Bounce,
                }),
            Prefab::LavaFall => Entity::new(Label::Hazard, cell, unit)
                .with_velocity(Vector::new(0.0, platformer.lava_fall_speed))
                .with_motion(Motion::Drift {
                    on_block: BlockResponse::Bounce,
                }),
            Prefab::LavaDrip => Entity::new(Label::Hazard, cell, unit)
                .with_velocity(Vector::new(0.0, platformer.lava_drip_speed))
                .with_motion(Motion::Drift {
                    on_block: BlockResponse::Respawn(cell),
                }),
        }
    }
}

// Neighbouring gems start out of step so they don't bob in unison.
fn wobble_phase(cell: Vector) -> f64 {
    let seed = (cell.x as i64 * 7 + cell.y as i64 * 13).rem_euclid(16);
    seed as f64 / 16.0 * TAU
}
