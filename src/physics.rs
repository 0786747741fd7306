//! Per-entity update: movement against the grid, playfield edges, and the
//! time-driven capabilities (animation, lifetime).

use crate::entities::{
    BlockResponse, Boundary, Command, Entity, InputState, Label, Motion, Playfield,
};
use crate::grid::Grid;
use crate::vector::Vector;

/// Advance one entity by `delta_ms`.  The entity is mutated in place; it is
/// owned by the driver's list so no stale copies exist elsewhere.
pub fn update_entity(
    entity: &mut Entity,
    delta_ms: f64,
    level: Option<&Grid>,
    input: &InputState,
    playfield: Playfield,
) {
    entity.blocked = false;

    if let Some(motion) = entity.motion.clone() {
        apply_motion(entity, motion, delta_ms, level, input, playfield);
    }

    match entity.boundary {
        Boundary::Clamp => {
            entity.position = clamp_to_playfield(entity.position, entity.size, playfield);
        }
        Boundary::Despawn => {
            if is_outside(entity.position, entity.size, playfield) {
                entity.alive = false;
            }
        }
        Boundary::Free => {}
    }

    if let Some(animation) = entity.animation.as_mut() {
        animation.advance(delta_ms);
    }
    if let Some(lifetime) = entity.lifetime.as_mut() {
        if lifetime.age(delta_ms) {
            entity.alive = false;
        }
    }
}

/// Keep a box of `size` inside the playfield.  Applying it twice changes
/// nothing the second time.
pub fn clamp_to_playfield(position: Vector, size: Vector, playfield: Playfield) -> Vector {
    let max_x = (playfield.width - size.x).max(0.0);
    let max_y = (playfield.height - size.y).max(0.0);
    Vector::new(position.x.clamp(0.0, max_x), position.y.clamp(0.0, max_y))
}

/// The box lies entirely beyond one of the playfield edges.
pub fn is_outside(position: Vector, size: Vector, playfield: Playfield) -> bool {
    position.x + size.x < 0.0
        || position.y + size.y < 0.0
        || position.x > playfield.width
        || position.y > playfield.height
}

fn hits_wall(level: Option<&Grid>, position: Vector, size: Vector) -> bool {
    level.map_or(false, |grid| grid.touches(position, size, &Label::Wall))
}

/// Commit `position + velocity * delta_ms` unless it runs into a wall.
fn try_move(entity: &mut Entity, delta_ms: f64, level: Option<&Grid>) -> bool {
    let tentative = entity.position.plus(entity.velocity.times(delta_ms));
    if hits_wall(level, tentative, entity.size) {
        entity.blocked = true;
        false
    } else {
        entity.position = tentative;
        true
    }
}

fn apply_motion(
    entity: &mut Entity,
    motion: Motion,
    delta_ms: f64,
    level: Option<&Grid>,
    input: &InputState,
    playfield: Playfield,
) {
    match motion {
        Motion::Drift { on_block } => {
            if !try_move(entity, delta_ms, level) {
                match on_block {
                    BlockResponse::Stop => {}
                    BlockResponse::Bounce => entity.velocity = -entity.velocity,
                    BlockResponse::Respawn(origin) => entity.position = origin,
                    BlockResponse::Destroy => entity.alive = false,
                }
            }
        }
        Motion::Steered { speed } => {
            entity.velocity = input.direction().normalize().times(speed);
            try_move(entity, delta_ms, level);
        }
        Motion::Platformer {
            run_speed,
            gravity,
            jump_speed,
        } => {
            let mut x_speed = 0.0;
            if input.is_held(&Command::Left) {
                x_speed -= run_speed;
            }
            if input.is_held(&Command::Right) {
                x_speed += run_speed;
            }
            let moved_x = entity.position.plus(Vector::new(x_speed * delta_ms, 0.0));
            if hits_wall(level, moved_x, entity.size) {
                entity.blocked = true;
            } else {
                entity.position = moved_x;
            }

            // Vertical pass: landing on a wall stops the fall, and holding
            // up while landing starts a jump.
            let mut y_speed = entity.velocity.y + delta_ms * gravity;
            let moved_y = entity.position.plus(Vector::new(0.0, y_speed * delta_ms));
            if !hits_wall(level, moved_y, entity.size) {
                entity.position = moved_y;
            } else {
                entity.blocked = true;
                if input.is_held(&Command::Up) && y_speed > 0.0 {
                    y_speed -= jump_speed;
                } else {
                    y_speed = 0.0;
                }
            }
            entity.velocity = Vector::new(x_speed, y_speed);
        }
        Motion::Jumper {
            gravity,
            jump_speed,
        } => {
            let ground = (playfield.height - entity.size.y).max(0.0);
            let mut y_speed = if entity.position.y >= ground && input.is_held(&Command::Up) {
                -jump_speed
            } else {
                entity.velocity.y + delta_ms * gravity
            };
            let mut y = entity.position.y + y_speed * delta_ms;
            if y >= ground {
                y = ground;
                y_speed = 0.0;
                entity.blocked = true;
            }
            entity.position.y = y;
            entity.velocity = Vector::new(0.0, y_speed);
        }
        Motion::Paddle { up, down, speed } => {
            let mut direction = 0.0;
            if input.is_held(&up) {
                direction -= 1.0;
            }
            if input.is_held(&down) {
                direction += 1.0;
            }
            entity.velocity = Vector::new(0.0, direction * speed);
            try_move(entity, delta_ms, level);
        }
        Motion::Wobble {
            base,
            phase,
            speed,
            distance,
        } => {
            let phase = phase + delta_ms * speed;
            entity.position = base.plus(Vector::new(0.0, phase.sin() * distance));
            entity.motion = Some(Motion::Wobble {
                base,
                phase,
                speed,
                distance,
            });
        }
    }
}
