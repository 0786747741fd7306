//! Game loop driver.
//!
//! Like the rest of the game logic, `tick` takes the current `GameState` and
//! returns the next one; the only side effects go through the injected RNG,
//! so a seeded RNG and synthetic frame times make runs reproducible.

use std::f64::consts::FRAC_PI_4;

use rand::Rng;
use tracing::{debug, info, trace};

use crate::collision::{overlap, penetration};
use crate::config::GameConfig;
use crate::entities::{
    BlockResponse, Boundary, Command, Emitter, Entity, EntityId, EntitySnapshot, GameStatus,
    InputState, Label, Motion, Playfield,
};
use crate::grid::{Grid, Level};
use crate::physics;
use crate::vector::Vector;

/// Commands driving the two Pong paddles.
pub const LEFT_PADDLE_UP: &str = "left-up";
pub const LEFT_PADDLE_DOWN: &str = "left-down";
pub const RIGHT_PADDLE_UP: &str = "right-up";
pub const RIGHT_PADDLE_DOWN: &str = "right-down";

// ── State ─────────────────────────────────────────────────────────────────────

/// Per-game numbers the driver needs after construction.
#[derive(Clone, Debug, PartialEq)]
pub struct Rules {
    pub max_delta_ms: Option<f64>,
    pub serve_speed: f64,
    pub winning_score: Option<u32>,
    pub bullet_speed: f64,
    pub bullet_size: Vector,
    pub bullet_lifetime_ms: f64,
}

impl Rules {
    pub fn from_config(config: &GameConfig) -> Self {
        Rules {
            max_delta_ms: config.max_delta_ms,
            serve_speed: config.pong.initial_speed,
            winning_score: config.pong.winning_score,
            bullet_speed: config.bullet_hell.player_bullet_speed,
            bullet_size: config.bullet_hell.player_bullet_size,
            bullet_lifetime_ms: config.bullet_hell.player_bullet_lifetime_ms,
        }
    }
}

/// Drops shootable targets at random places and random intervals.
#[derive(Clone, Debug, PartialEq)]
pub struct TargetSpawner {
    pub timer_ms: f64,
    pub next_ms: f64,
    pub min_delay_ms: f64,
    pub max_delay_ms: f64,
    pub min_size: f64,
    pub max_size: f64,
}

/// Block jumper: the one scrolling block, recycled with a fresh height and
/// speed each time it leaves past the left edge.
#[derive(Clone, Debug, PartialEq)]
pub struct ObstacleCourse {
    pub obstacle: EntityId,
    pub stage: u32,
    pub start_x: f64,
    pub min_height: f64,
    pub max_height: f64,
    pub min_speed: f64,
    pub max_speed: f64,
    pub min_speed_step: f64,
    pub max_speed_step: f64,
    pub points_per_level: u32,
}

#[derive(Clone, Debug)]
pub struct GameState {
    /// Every live entity, the player included.
    pub entities: Vec<Entity>,
    /// Id of the player entity, for games that have one.
    pub player: Option<EntityId>,
    pub level: Option<Grid>,
    pub status: GameStatus,
    pub score: u32,
    pub left_score: u32,
    pub right_score: u32,
    pub playfield: Playfield,
    pub frame: u64,
    pub elapsed_ms: f64,
    pub rules: Rules,
    pub spawner: Option<TargetSpawner>,
    pub course: Option<ObstacleCourse>,
    pub next_id: u32,
}

impl GameState {
    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.iter().find(|e| e.id == id)
    }

    pub fn player_entity(&self) -> Option<&Entity> {
        self.player.and_then(|id| self.entity(id))
    }

    fn allocate_id(&mut self) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        id
    }

    fn spawn(&mut self, mut entity: Entity) {
        entity.id = self.allocate_id();
        self.entities.push(entity);
    }

    fn index_of(&self, id: EntityId) -> Option<usize> {
        self.entities.iter().position(|e| e.id == id)
    }

    fn finish(&mut self, status: GameStatus) {
        if self.status == GameStatus::Playing {
            self.status = status;
            info!(
                ?status,
                score = self.score,
                left_score = self.left_score,
                right_score = self.right_score,
                frame = self.frame,
                "game_finished"
            );
        }
    }
}

// ── Constructors ─────────────────────────────────────────────────────────────

/// Game state for a parsed grid level.  The playfield is the grid itself.
pub fn init_level(level: Level, config: &GameConfig) -> GameState {
    let Level {
        grid,
        player,
        actors,
    } = level;
    let playfield = Playfield::new(grid.width() as f64, grid.height() as f64);
    let player_id = player.id;
    let mut entities = actors;
    entities.push(player);
    let next_id = entities.iter().map(|e| e.id.0).max().unwrap_or(0) + 1;

    GameState {
        entities,
        player: Some(player_id),
        level: Some(grid),
        status: GameStatus::Playing,
        score: 0,
        left_score: 0,
        right_score: 0,
        playfield,
        frame: 0,
        elapsed_ms: 0.0,
        rules: Rules::from_config(config),
        spawner: None,
        course: None,
        next_id,
    }
}

/// Two paddles, two bouncing walls, two goals and a served ball.
pub fn init_pong(config: &GameConfig, rng: &mut impl Rng) -> GameState {
    let tuning = &config.pong;
    let playfield = Playfield::new(config.canvas_width, config.canvas_height);
    let (width, height) = (playfield.width, playfield.height);
    let paddle_y = height / 2.0 - tuning.paddle_size.y / 2.0;

    let mut state = empty_state(config, playfield);

    let mut ball = Entity::new(
        Label::Ball,
        Vector::ZERO,
        Vector::new(tuning.ball_size, tuning.ball_size),
    )
    .with_motion(Motion::Drift {
        on_block: BlockResponse::Stop,
    })
    .with_boundary(Boundary::Clamp)
    .with_rebound(tuning.speed_gain);
    serve_ball(&mut ball, playfield, tuning.initial_speed, rng);
    state.spawn(ball);

    state.spawn(paddle(
        Vector::new(tuning.paddle_margin, paddle_y),
        tuning.paddle_size,
        LEFT_PADDLE_UP,
        LEFT_PADDLE_DOWN,
        tuning.paddle_speed,
    ));
    state.spawn(paddle(
        Vector::new(width - tuning.paddle_margin - tuning.paddle_size.x, paddle_y),
        tuning.paddle_size,
        RIGHT_PADDLE_UP,
        RIGHT_PADDLE_DOWN,
        tuning.paddle_speed,
    ));

    let bar = Vector::new(width, tuning.wall_thickness);
    state.spawn(Entity::new(Label::Wall, Vector::ZERO, bar));
    state.spawn(Entity::new(
        Label::Wall,
        Vector::new(0.0, height - tuning.wall_thickness),
        bar,
    ));

    let goal = Vector::new(tuning.goal_width, height);
    state.spawn(Entity::new(Label::GoalLeft, Vector::ZERO, goal));
    state.spawn(Entity::new(
        Label::GoalRight,
        Vector::new(width - tuning.goal_width, 0.0),
        goal,
    ));

    info!(width, height, "pong_started");
    state
}

/// A steered ship dodging a spiral of bullets while shooting targets.
pub fn init_bullet_hell(config: &GameConfig, rng: &mut impl Rng) -> GameState {
    let tuning = &config.bullet_hell;
    let playfield = Playfield::new(config.canvas_width, config.canvas_height);
    let mut state = empty_state(config, playfield);

    let mut player = Entity::new(Label::Player, Vector::ZERO, tuning.player_size)
        .with_collider(tuning.player_collider.x, tuning.player_collider.y)
        .with_motion(Motion::Steered {
            speed: tuning.player_speed,
        })
        .with_boundary(Boundary::Clamp)
        .with_health(tuning.player_health);
    player.center_on(Vector::new(playfield.width / 2.0, playfield.height * 0.75));
    let player_id = state.allocate_id();
    player.id = player_id;
    state.entities.push(player);
    state.player = Some(player_id);

    let mut turret = Entity::new(
        Label::Custom("emitter".to_string()),
        Vector::ZERO,
        Vector::new(20.0, 20.0),
    )
    .with_emitter(Emitter {
        delay_ms: tuning.emitter_delay_ms,
        timer_ms: 0.0,
        angle: 0.0,
        angle_step: tuning.emitter_angle_step,
        arms: tuning.emitter_arms,
        bullet_speed: tuning.enemy_bullet_speed,
        bullet_size: tuning.enemy_bullet_size,
        collider_size: tuning.enemy_bullet_collider,
    });
    turret.center_on(Vector::new(playfield.width / 2.0, tuning.emitter_y));
    state.spawn(turret);

    state.spawner = Some(TargetSpawner {
        timer_ms: 0.0,
        next_ms: rng.gen_range(tuning.target_min_delay_ms..=tuning.target_max_delay_ms),
        min_delay_ms: tuning.target_min_delay_ms,
        max_delay_ms: tuning.target_max_delay_ms,
        min_size: tuning.target_min_size,
        max_size: tuning.target_max_size,
    });

    info!(
        width = playfield.width,
        height = playfield.height,
        "bullet_hell_started"
    );
    state
}

/// A runner on the floor jumping over blocks that scroll in from the right.
pub fn init_jumper(config: &GameConfig, rng: &mut impl Rng) -> GameState {
    let tuning = &config.jumper;
    let playfield = Playfield::new(config.canvas_width, config.canvas_height);
    let mut state = empty_state(config, playfield);

    let mut player = Entity::new(
        Label::Player,
        Vector::new(
            tuning.player_x,
            (playfield.height - tuning.player_size.y).max(0.0),
        ),
        tuning.player_size,
    )
    .with_motion(Motion::Jumper {
        gravity: tuning.gravity,
        jump_speed: tuning.jump_speed,
    })
    .with_boundary(Boundary::Clamp);
    let player_id = state.allocate_id();
    player.id = player_id;
    state.entities.push(player);
    state.player = Some(player_id);

    let obstacle_id = state.allocate_id();
    let course = ObstacleCourse {
        obstacle: obstacle_id,
        stage: 1,
        start_x: playfield.width + tuning.block_lead,
        min_height: tuning.block_min_height,
        max_height: tuning.block_max_height,
        min_speed: tuning.block_min_speed,
        max_speed: tuning.block_max_speed,
        min_speed_step: tuning.min_speed_step,
        max_speed_step: tuning.max_speed_step,
        points_per_level: tuning.points_per_level,
    };
    let mut block = Entity::new(
        Label::Hazard,
        Vector::ZERO,
        Vector::new(tuning.block_width, tuning.block_min_height),
    )
    .with_motion(Motion::Drift {
        on_block: BlockResponse::Stop,
    });
    block.id = obstacle_id;
    reset_obstacle(&mut block, &course, playfield, rng);
    state.entities.push(block);
    state.course = Some(course);

    info!(
        width = playfield.width,
        height = playfield.height,
        "jumper_started"
    );
    state
}

/// Put the block back past the right edge with a random height and speed,
/// standing on the floor.
fn reset_obstacle(
    block: &mut Entity,
    course: &ObstacleCourse,
    playfield: Playfield,
    rng: &mut impl Rng,
) {
    let height = rng.gen_range(course.min_height..=course.max_height);
    let speed = rng.gen_range(course.min_speed..=course.max_speed.max(course.min_speed));
    block.resize(Vector::new(block.size.x, height));
    block.position = Vector::new(course.start_x, playfield.height - height);
    block.velocity = Vector::new(-speed, 0.0);
}

fn empty_state(config: &GameConfig, playfield: Playfield) -> GameState {
    GameState {
        entities: Vec::new(),
        player: None,
        level: None,
        status: GameStatus::Playing,
        score: 0,
        left_score: 0,
        right_score: 0,
        playfield,
        frame: 0,
        elapsed_ms: 0.0,
        rules: Rules::from_config(config),
        spawner: None,
        course: None,
        next_id: 1,
    }
}

fn paddle(position: Vector, size: Vector, up: &str, down: &str, speed: f64) -> Entity {
    Entity::new(Label::Paddle, position, size)
        .with_motion(Motion::Paddle {
            up: Command::named(up),
            down: Command::named(down),
            speed,
        })
        .with_boundary(Boundary::Clamp)
}

/// Centre the ball and launch it at `speed`, up to 45° off the horizontal,
/// towards a random side.
pub fn serve_ball(ball: &mut Entity, playfield: Playfield, speed: f64, rng: &mut impl Rng) {
    ball.center_on(playfield.center());
    let angle = rng.gen_range(-FRAC_PI_4..=FRAC_PI_4);
    let mut velocity = Vector::from_angle(angle).times(speed);
    if rng.gen_bool(0.5) {
        velocity.x = -velocity.x;
    }
    ball.velocity = velocity;
}

// ── Player actions ────────────────────────────────────────────────────────────

/// Shoot from the player's centre towards `target`.
pub fn fire_at(state: &GameState, target: Vector) -> GameState {
    let mut next = state.clone();
    if next.status.is_over() {
        return next;
    }
    let Some(origin) = next.player_entity().map(Entity::center) else {
        return next;
    };
    let direction = origin.direction_to(target);
    if direction.is_zero() {
        return next;
    }

    let mut bullet = Entity::new(Label::Bullet, Vector::ZERO, next.rules.bullet_size)
        .with_velocity(direction.times(next.rules.bullet_speed))
        .with_motion(Motion::Drift {
            on_block: BlockResponse::Destroy,
        })
        .with_boundary(Boundary::Despawn)
        .with_lifetime(next.rules.bullet_lifetime_ms);
    bullet.center_on(origin);
    next.spawn(bullet);
    next
}

// ── Per-frame tick ────────────────────────────────────────────────────────────

/// Advance the game by `delta_ms` milliseconds of simulated time.
pub fn tick(
    state: &GameState,
    input: &InputState,
    delta_ms: f64,
    rng: &mut impl Rng,
) -> GameState {
    let mut next = state.clone();
    let delta_ms = match next.rules.max_delta_ms {
        Some(max) => delta_ms.min(max),
        None => delta_ms,
    }
    .max(0.0);
    next.frame += 1;
    next.elapsed_ms += delta_ms;

    // Finished games stay frozen.
    if next.status.is_over() {
        return next;
    }

    // ── 1. Update every live entity ──────────────────────────────────────────
    let mut spawned = Vec::new();
    {
        let level = next.level.as_ref();
        let playfield = next.playfield;
        for entity in next.entities.iter_mut().filter(|e| e.alive) {
            physics::update_entity(entity, delta_ms, level, input, playfield);

            if let Some(emitter) = entity.emitter.as_mut() {
                let origin = entity.position.plus(entity.size.times(0.5));
                for direction in emitter.advance(delta_ms) {
                    spawned.push(hazard_bullet(origin, direction, emitter));
                }
            }
        }
    }
    if let Some(target) = spawn_target(&mut next, delta_ms, rng) {
        spawned.push(target);
    }
    recycle_obstacle(&mut next, rng);
    for entity in spawned {
        next.spawn(entity);
    }

    // ── 2. Drop entities flagged during the update ───────────────────────────
    next.entities.retain(|e| e.alive);

    // ── 3. Collisions ────────────────────────────────────────────────────────
    resolve_collisions(&mut next, rng);
    next.entities.retain(|e| e.alive);

    next
}

fn hazard_bullet(origin: Vector, direction: Vector, emitter: &Emitter) -> Entity {
    let mut bullet = Entity::new(Label::Hazard, Vector::ZERO, emitter.bullet_size)
        .with_collider(emitter.collider_size.x, emitter.collider_size.y)
        .with_velocity(direction.times(emitter.bullet_speed))
        .with_motion(Motion::Drift {
            on_block: BlockResponse::Destroy,
        })
        .with_boundary(Boundary::Despawn);
    bullet.center_on(origin);
    bullet
}

fn spawn_target(state: &mut GameState, delta_ms: f64, rng: &mut impl Rng) -> Option<Entity> {
    let playfield = state.playfield;
    let spawner = state.spawner.as_mut()?;
    spawner.timer_ms += delta_ms;
    if spawner.timer_ms <= spawner.next_ms {
        return None;
    }
    spawner.timer_ms = 0.0;
    spawner.next_ms = rng.gen_range(spawner.min_delay_ms..=spawner.max_delay_ms);

    let size = rng.gen_range(spawner.min_size..=spawner.max_size);
    let x = rng.gen_range(0.0..=(playfield.width - size).max(0.0));
    let y = rng.gen_range(0.0..=(playfield.height - size).max(0.0));
    debug!(x, y, size, "target_spawned");
    Some(Entity::new(
        Label::Target,
        Vector::new(x, y),
        Vector::new(size, size),
    ))
}

/// A block that made it past the left edge scores and comes back; every
/// `points_per_level` points the blocks get faster.
fn recycle_obstacle(state: &mut GameState, rng: &mut impl Rng) {
    let playfield = state.playfield;
    let Some(mut course) = state.course.take() else {
        return;
    };
    if let Some(index) = state.index_of(course.obstacle) {
        let block = &mut state.entities[index];
        if block.position.x < -block.size.x {
            state.score += 1;
            if course.points_per_level > 0 && state.score % course.points_per_level == 0 {
                course.stage += 1;
                course.min_speed += course.min_speed_step;
                course.max_speed += course.max_speed_step;
                info!(
                    stage = course.stage,
                    min_speed = course.min_speed,
                    max_speed = course.max_speed,
                    "level_up"
                );
            }
            reset_obstacle(block, &course, playfield, rng);
            debug!(score = state.score, "obstacle_passed");
        }
    }
    state.course = Some(course);
}

// ── Collision resolution ─────────────────────────────────────────────────────

fn resolve_collisions(state: &mut GameState, rng: &mut impl Rng) {
    // Hazard terrain (lava cells) under the player.
    let on_hazard = match (state.level.as_ref(), state.player_entity()) {
        (Some(grid), Some(player)) => grid.touches(player.position, player.size, &Label::Hazard),
        _ => false,
    };
    if on_hazard {
        state.finish(GameStatus::Lost);
        return;
    }

    let mut contacts = Vec::new();
    for (i, mover) in state.entities.iter().enumerate() {
        if !mover.label.is_mover() {
            continue;
        }
        let mover_box = mover.collider();
        for (j, obstacle) in state.entities.iter().enumerate() {
            if i == j || obstacle.label.is_mover() {
                continue;
            }
            if overlap(&mover_box, &obstacle.collider()) {
                contacts.push((mover.id, obstacle.id));
            }
        }
    }

    // Earlier contacts can kill, move or end things; re-check each one.
    for (mover_id, obstacle_id) in contacts {
        if state.status.is_over() {
            break;
        }
        let (Some(mover), Some(obstacle)) = (state.index_of(mover_id), state.index_of(obstacle_id))
        else {
            continue;
        };
        let (a, b) = (&state.entities[mover], &state.entities[obstacle]);
        if !a.alive || !b.alive || !overlap(&a.collider(), &b.collider()) {
            continue;
        }
        trace!(mover = %a.label, obstacle = %b.label, "contact");
        resolve_contact(state, mover, obstacle, rng);
    }
}

fn resolve_contact(state: &mut GameState, mover: usize, obstacle: usize, rng: &mut impl Rng) {
    let mover_label = state.entities[mover].label.clone();
    let obstacle_label = state.entities[obstacle].label.clone();

    match (mover_label, obstacle_label) {
        (_, Label::Wall | Label::Paddle) if state.entities[mover].rebound.is_some() => {
            rebound(state, mover, obstacle);
        }
        (Label::Bullet, Label::Wall) => state.entities[mover].alive = false,
        (Label::Player, Label::Hazard) => hit_player(state, mover, obstacle),
        (Label::Player, Label::Pickup) => collect(state, obstacle),
        (Label::Ball, Label::GoalLeft) => {
            state.right_score += 1;
            score_goal(state, mover, rng);
        }
        (Label::Ball, Label::GoalRight) => {
            state.left_score += 1;
            score_goal(state, mover, rng);
        }
        (Label::Bullet, Label::Target) => {
            state.entities[mover].alive = false;
            state.entities[obstacle].alive = false;
            state.score += 1;
            debug!(score = state.score, "target_destroyed");
        }
        // Walls already blocked movement during the update.
        _ => {}
    }
}

/// Reflect along the axis of shallower overlap, pointing away from the
/// obstacle, and speed up once per bounce.
fn rebound(state: &mut GameState, mover: usize, obstacle: usize) {
    let obstacle_box = state.entities[obstacle].collider();
    let entity = &mut state.entities[mover];
    let Some(gain) = entity.rebound.as_ref().map(|r| r.speed_gain) else {
        return;
    };
    let mover_box = entity.collider();
    let Some(depth) = penetration(&mover_box, &obstacle_box) else {
        return;
    };
    let away = mover_box.center().minus(obstacle_box.center());
    let before = entity.velocity;
    if depth.x < depth.y {
        entity.velocity.x = before.x.abs() * away.x.signum();
    } else {
        entity.velocity.y = before.y.abs() * away.y.signum();
    }
    // Still inside from last frame's bounce: already heading away.
    if entity.velocity != before {
        entity.velocity = entity.velocity.times(gain);
    }
}

fn hit_player(state: &mut GameState, player: usize, hazard: usize) {
    // Projectiles are spent on impact; lava stays where it is.
    let spent = {
        let hazard = &state.entities[hazard];
        hazard.boundary == Boundary::Despawn || hazard.lifetime.is_some()
    };
    if spent {
        state.entities[hazard].alive = false;
    }
    let dead = match state.entities[player].health.as_mut() {
        Some(health) => {
            health.take_damage(1);
            debug!(hp = health.current, "player_hit");
            health.is_dead()
        }
        None => true,
    };
    if dead {
        state.finish(GameStatus::Lost);
    }
}

fn collect(state: &mut GameState, pickup: usize) {
    state.entities[pickup].alive = false;
    state.score += 1;
    let remaining = remaining_pickups(state);
    debug!(score = state.score, remaining, "pickup_collected");
    if remaining == 0 {
        state.finish(GameStatus::Won);
    }
}

fn score_goal(state: &mut GameState, ball: usize, rng: &mut impl Rng) {
    debug!(
        left_score = state.left_score,
        right_score = state.right_score,
        "goal_scored"
    );
    let playfield = state.playfield;
    let speed = state.rules.serve_speed;
    serve_ball(&mut state.entities[ball], playfield, speed, rng);

    if let Some(target) = state.rules.winning_score {
        if state.left_score >= target || state.right_score >= target {
            state.finish(GameStatus::Won);
        }
    }
}

// ── Queries ───────────────────────────────────────────────────────────────────

/// Pickups still waiting to be collected.
pub fn remaining_pickups(state: &GameState) -> usize {
    state
        .entities
        .iter()
        .filter(|e| e.alive && e.label == Label::Pickup)
        .count()
}

/// Render view of every live entity, in draw order.
pub fn snapshots(state: &GameState) -> Vec<EntitySnapshot> {
    state
        .entities
        .iter()
        .filter(|e| e.alive)
        .map(Entity::snapshot)
        .collect()
}
