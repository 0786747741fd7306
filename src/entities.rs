//! Entity data: labels, capability structs, input tokens and render snapshots.
//!
//! Behaviour is composed rather than inherited: an `Entity` carries optional
//! capability structs and the driver looks at which ones are present.

use std::collections::HashSet;
use std::f64::consts::TAU;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::collision::Collider;
use crate::vector::Vector;

// ── Labels ────────────────────────────────────────────────────────────────────

/// Category tag shared by grid cells and entities.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Label {
    Empty,
    Wall,
    Hazard,
    Pickup,
    Player,
    Paddle,
    Ball,
    GoalLeft,
    GoalRight,
    Bullet,
    Target,
    Custom(String),
}

impl Label {
    pub fn as_str(&self) -> &str {
        match self {
            Label::Empty => "empty",
            Label::Wall => "wall",
            Label::Hazard => "hazard",
            Label::Pickup => "pickup",
            Label::Player => "player",
            Label::Paddle => "paddle",
            Label::Ball => "ball",
            Label::GoalLeft => "goal-left",
            Label::GoalRight => "goal-right",
            Label::Bullet => "bullet",
            Label::Target => "target",
            Label::Custom(name) => name,
        }
    }

    /// Labels whose collisions are resolved against everything else.
    pub fn is_mover(&self) -> bool {
        matches!(self, Label::Player | Label::Ball | Label::Bullet)
    }
}

impl From<&str> for Label {
    fn from(name: &str) -> Self {
        match name {
            "empty" | "floor" => Label::Empty,
            "wall" | "obstacle" => Label::Wall,
            "hazard" | "lava" => Label::Hazard,
            "pickup" | "coin" => Label::Pickup,
            "player" => Label::Player,
            "paddle" => Label::Paddle,
            "ball" => Label::Ball,
            "goal-left" | "goalLeft" | "leftGoal" => Label::GoalLeft,
            "goal-right" | "goalRight" | "rightGoal" => Label::GoalRight,
            "bullet" => Label::Bullet,
            "target" => Label::Target,
            other => Label::Custom(other.to_string()),
        }
    }
}

impl From<String> for Label {
    fn from(name: String) -> Self {
        Label::from(name.as_str())
    }
}

impl From<Label> for String {
    fn from(label: Label) -> Self {
        label.as_str().to_string()
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Game status ───────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameStatus {
    Playing,
    Won,
    Lost,
}

impl GameStatus {
    pub fn is_over(self) -> bool {
        self != GameStatus::Playing
    }
}

// ── Input tokens ──────────────────────────────────────────────────────────────

/// Abstract command held by the player during a tick.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Command {
    Up,
    Down,
    Left,
    Right,
    Named(String),
}

impl Command {
    pub fn named(name: &str) -> Self {
        Command::Named(name.to_string())
    }
}

/// Set of commands currently held.  Translating raw key events into this set
/// is the frontend's job.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct InputState {
    held: HashSet<Command>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, command: Command) -> Self {
        self.held.insert(command);
        self
    }

    pub fn press(&mut self, command: Command) {
        self.held.insert(command);
    }

    pub fn release(&mut self, command: &Command) {
        self.held.remove(command);
    }

    pub fn is_held(&self, command: &Command) -> bool {
        self.held.contains(command)
    }

    pub fn is_empty(&self) -> bool {
        self.held.is_empty()
    }

    /// Sum of the held directions, not normalized.
    pub fn direction(&self) -> Vector {
        let mut dir = Vector::ZERO;
        if self.is_held(&Command::Up) {
            dir.y -= 1.0;
        }
        if self.is_held(&Command::Down) {
            dir.y += 1.0;
        }
        if self.is_held(&Command::Left) {
            dir.x -= 1.0;
        }
        if self.is_held(&Command::Right) {
            dir.x += 1.0;
        }
        dir
    }
}

// ── Capabilities ──────────────────────────────────────────────────────────────

/// What a drifting entity does when the grid refuses its next position.
#[derive(Clone, Debug, PartialEq)]
pub enum BlockResponse {
    Stop,
    Bounce,
    /// Jump back to the given position (dripping lava).
    Respawn(Vector),
    Destroy,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Motion {
    /// Constant velocity.
    Drift { on_block: BlockResponse },
    /// Velocity follows the held directions; diagonals are not faster.
    Steered { speed: f64 },
    /// Side view: run left/right, fall with gravity, jump off the ground.
    Platformer {
        run_speed: f64,
        gravity: f64,
        jump_speed: f64,
    },
    /// Hop off the playfield floor; no grid needed.
    Jumper { gravity: f64, jump_speed: f64 },
    /// Vertical movement bound to two named commands.
    Paddle {
        up: Command,
        down: Command,
        speed: f64,
    },
    /// Bob up and down around `base`.
    Wobble {
        base: Vector,
        phase: f64,
        speed: f64,
        distance: f64,
    },
}

/// How the playfield edge treats the entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Boundary {
    Clamp,
    Despawn,
    Free,
}

/// Sprite-sheet frame cycling.  Only the frame index is tracked; what it
/// looks like belongs to the renderer.
#[derive(Clone, Debug, PartialEq)]
pub struct Animation {
    pub frame: u32,
    pub min_frame: u32,
    pub max_frame: u32,
    pub repeat: bool,
    pub frame_ms: f64,
    pub elapsed_ms: f64,
}

impl Animation {
    pub fn new(min_frame: u32, max_frame: u32, repeat: bool, frame_ms: f64) -> Self {
        Animation {
            frame: min_frame,
            min_frame,
            max_frame,
            repeat,
            frame_ms,
            elapsed_ms: 0.0,
        }
    }

    pub fn advance(&mut self, delta_ms: f64) {
        self.elapsed_ms += delta_ms;
        if self.elapsed_ms > self.frame_ms {
            let restart = if self.repeat { self.min_frame } else { self.frame };
            self.frame = if self.frame < self.max_frame {
                self.frame + 1
            } else {
                restart
            };
            self.elapsed_ms = 0.0;
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Health {
    pub current: i32,
    pub max: i32,
}

impl Health {
    pub fn new(max: i32) -> Self {
        Health { current: max, max }
    }

    /// Returns `true` when this hit is the one that killed.
    pub fn take_damage(&mut self, amount: i32) -> bool {
        let was_alive = !self.is_dead();
        self.current = (self.current - amount).max(0);
        was_alive && self.is_dead()
    }

    pub fn is_dead(&self) -> bool {
        self.current <= 0
    }

    pub fn fraction(&self) -> f64 {
        if self.max <= 0 {
            return 0.0;
        }
        self.current as f64 / self.max as f64
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Lifetime {
    pub age_ms: f64,
    pub max_age_ms: f64,
}

impl Lifetime {
    pub fn new(max_age_ms: f64) -> Self {
        Lifetime {
            age_ms: 0.0,
            max_age_ms,
        }
    }

    /// Age the entity; `true` once it has outlived `max_age_ms`.
    pub fn age(&mut self, delta_ms: f64) -> bool {
        self.age_ms += delta_ms;
        self.age_ms > self.max_age_ms
    }
}

/// Rotating bullet pattern.
#[derive(Clone, Debug, PartialEq)]
pub struct Emitter {
    pub delay_ms: f64,
    pub timer_ms: f64,
    pub angle: f64,
    pub angle_step: f64,
    pub arms: u32,
    pub bullet_speed: f64,
    pub bullet_size: Vector,
    pub collider_size: Vector,
}

impl Emitter {
    /// Advance the timer and return the unit directions of the bullets due
    /// this step (empty when the delay has not elapsed).
    pub fn advance(&mut self, delta_ms: f64) -> Vec<Vector> {
        self.timer_ms += delta_ms;
        if self.timer_ms <= self.delay_ms {
            return Vec::new();
        }
        self.timer_ms = 0.0;
        self.angle += self.angle_step;
        let arms = self.arms.max(1);
        (0..arms)
            .map(|arm| Vector::from_angle(self.angle + TAU * arm as f64 / arms as f64))
            .collect()
    }
}

/// Bounce off walls and paddles, gaining speed each time.
#[derive(Clone, Debug, PartialEq)]
pub struct Rebound {
    pub speed_gain: f64,
}

/// Collider placement relative to the entity's top-left corner.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Hitbox {
    pub offset: Vector,
    pub size: Vector,
}

// ── Entity ────────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(pub u32);

/// `position` is always the top-left corner of the box.
#[derive(Clone, Debug, PartialEq)]
pub struct Entity {
    pub id: EntityId,
    pub label: Label,
    pub position: Vector,
    pub size: Vector,
    pub velocity: Vector,
    pub hitbox: Hitbox,
    pub alive: bool,
    /// Set by the last update when the grid refused the move.
    pub blocked: bool,
    pub boundary: Boundary,
    pub motion: Option<Motion>,
    pub animation: Option<Animation>,
    pub health: Option<Health>,
    pub lifetime: Option<Lifetime>,
    pub emitter: Option<Emitter>,
    pub rebound: Option<Rebound>,
}

impl Entity {
    pub fn new(label: Label, position: Vector, size: Vector) -> Self {
        Entity {
            id: EntityId(0),
            label,
            position,
            size,
            velocity: Vector::ZERO,
            hitbox: Hitbox {
                offset: Vector::ZERO,
                size,
            },
            alive: true,
            blocked: false,
            boundary: Boundary::Free,
            motion: None,
            animation: None,
            health: None,
            lifetime: None,
            emitter: None,
            rebound: None,
        }
    }

    pub fn with_velocity(mut self, velocity: Vector) -> Self {
        self.velocity = velocity;
        self
    }

    pub fn with_motion(mut self, motion: Motion) -> Self {
        self.motion = Some(motion);
        self
    }

    pub fn with_boundary(mut self, boundary: Boundary) -> Self {
        self.boundary = boundary;
        self
    }

    /// Collider of `width × height` centred inside the entity's box.
    pub fn with_collider(mut self, width: f64, height: f64) -> Self {
        self.hitbox = Hitbox {
            offset: Vector::new((self.size.x - width) / 2.0, (self.size.y - height) / 2.0),
            size: Vector::new(width, height),
        };
        self
    }

    /// Change the box size.  The collider covers the whole new box.
    pub fn resize(&mut self, size: Vector) {
        self.size = size;
        self.hitbox = Hitbox {
            offset: Vector::ZERO,
            size,
        };
    }

    pub fn with_animation(mut self, animation: Animation) -> Self {
        self.animation = Some(animation);
        self
    }

    pub fn with_health(mut self, max: i32) -> Self {
        self.health = Some(Health::new(max));
        self
    }

    pub fn with_lifetime(mut self, max_age_ms: f64) -> Self {
        self.lifetime = Some(Lifetime::new(max_age_ms));
        self
    }

    pub fn with_emitter(mut self, emitter: Emitter) -> Self {
        self.emitter = Some(emitter);
        self
    }

    pub fn with_rebound(mut self, speed_gain: f64) -> Self {
        self.rebound = Some(Rebound { speed_gain });
        self
    }

    /// Collider for the current position.  Computed on demand so it can
    /// never lag behind a position change.
    pub fn collider(&self) -> Collider {
        Collider::new(
            self.position.x + self.hitbox.offset.x,
            self.position.y + self.hitbox.offset.y,
            self.hitbox.size.x,
            self.hitbox.size.y,
        )
    }

    pub fn center(&self) -> Vector {
        self.position.plus(self.size.times(0.5))
    }

    /// Move so that the box is centred on `point`.
    pub fn center_on(&mut self, point: Vector) {
        self.position = point.minus(self.size.times(0.5));
    }

    pub fn snapshot(&self) -> EntitySnapshot {
        EntitySnapshot {
            id: self.id,
            label: self.label.clone(),
            position: self.position,
            size: self.size,
            frame: self.animation.as_ref().map(|a| a.frame),
        }
    }
}

/// Read-only view handed to the renderer each frame.
#[derive(Clone, Debug, PartialEq)]
pub struct EntitySnapshot {
    pub id: EntityId,
    pub label: Label,
    pub position: Vector,
    pub size: Vector,
    pub frame: Option<u32>,
}

/// Rectangle the entities live in, anchored at the origin.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Playfield {
    pub width: f64,
    pub height: f64,
}

impl Playfield {
    pub fn new(width: f64, height: f64) -> Self {
        Playfield { width, height }
    }

    pub fn center(&self) -> Vector {
        Vector::new(self.width / 2.0, self.height / 2.0)
    }
}
