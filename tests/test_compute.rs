use approx::assert_relative_eq;
use arcade_loop::compute::*;
use arcade_loop::config::GameConfig;
use arcade_loop::entities::*;
use arcade_loop::grid::{Legend, Level};
use arcade_loop::vector::Vector;

use rand::rngs::StdRng;
use rand::SeedableRng;

fn seeded_rng() -> StdRng {
    StdRng::seed_from_u64(42)
}

fn level_state(plan: &str, legend: &Legend, config: &GameConfig) -> GameState {
    let level = Level::parse(plan, legend, config).unwrap();
    init_level(level, config)
}

fn player(state: &GameState) -> &Entity {
    state.player_entity().expect("player present")
}

fn find(state: &GameState, label: Label) -> &Entity {
    state
        .entities
        .iter()
        .find(|e| e.label == label)
        .expect("entity with label")
}

fn count(state: &GameState, label: &Label) -> usize {
    state.entities.iter().filter(|e| e.label == *label).count()
}

fn right() -> InputState {
    InputState::new().with(Command::Right)
}

// ── init_level ────────────────────────────────────────────────────────────────

#[test]
fn init_level_starts_playing() {
    let config = GameConfig::default();
    let state = level_state(
        arcade_loop::levels::TOP_DOWN_LEVELS[0],
        &Legend::top_down(),
        &config,
    );
    assert_eq!(state.status, GameStatus::Playing);
    assert_eq!(state.score, 0);
    assert_eq!(state.frame, 0);
    assert_eq!(state.playfield, Playfield::new(16.0, 10.0));
    assert_eq!(player(&state).position, Vector::new(8.0, 6.0));
    assert_eq!(remaining_pickups(&state), 1);
    assert!(state.entities.iter().all(|e| e.id.0 < state.next_id));
}

// ── Movement through the driver ───────────────────────────────────────────────

#[test]
fn player_blocked_by_wall_stays_put() {
    let mut config = GameConfig::default();
    config.max_delta_ms = None;
    config.top_down.player_speed = 0.001;
    let state = level_state("....\n.@#.\n....", &Legend::top_down(), &config);

    let next = tick(&state, &right(), 1000.0, &mut seeded_rng());
    assert_eq!(player(&next).position, Vector::new(1.0, 1.0));
    assert!(player(&next).blocked);
    assert_eq!(next.status, GameStatus::Playing);
}

#[test]
fn long_frames_are_capped() {
    let config = GameConfig::default();
    let state = level_state(".@.....\n.......", &Legend::top_down(), &config);
    let next = tick(&state, &right(), 5000.0, &mut seeded_rng());
    assert_relative_eq!(next.elapsed_ms, 100.0);
    // 0.005 cells/ms for the capped 100 ms.
    assert_relative_eq!(player(&next).position.x, 1.5);
}

#[test]
fn tick_does_not_touch_the_input_state() {
    let config = GameConfig::default();
    let state = level_state(".@.....\n.......", &Legend::top_down(), &config);
    let before = state.clone();
    let _ = tick(&state, &right(), 16.0, &mut seeded_rng());
    assert_eq!(player(&state).position, player(&before).position);
    assert_eq!(state.frame, before.frame);
}

// ── Pickups ───────────────────────────────────────────────────────────────────

#[test]
fn collecting_the_last_pickup_wins() {
    let config = GameConfig::default();
    let plan = "
........
........
........
........
........
....@$..
........
";
    let state = level_state(plan, &Legend::top_down(), &config);
    assert_eq!(find(&state, Label::Pickup).position, Vector::new(5.0, 5.0));

    let next = tick(&state, &right(), 100.0, &mut seeded_rng());
    assert_eq!(next.score, 1);
    assert_eq!(remaining_pickups(&next), 0);
    assert_eq!(count(&next, &Label::Pickup), 0);
    assert_eq!(next.status, GameStatus::Won);
}

#[test]
fn collecting_one_of_two_keeps_playing() {
    let config = GameConfig::default();
    let state = level_state(".@$$..\n......", &Legend::top_down(), &config);
    let next = tick(&state, &right(), 100.0, &mut seeded_rng());
    assert_eq!(next.score, 1);
    assert_eq!(remaining_pickups(&next), 1);
    assert_eq!(next.status, GameStatus::Playing);
}

#[test]
fn coins_animate() {
    let config = GameConfig::default();
    let state = level_state(".@...$\n......", &Legend::top_down(), &config);
    let next = tick(&state, &InputState::new(), 101.0, &mut seeded_rng());
    assert_eq!(find(&next, Label::Pickup).snapshot().frame, Some(1));
}

// ── Hazards ───────────────────────────────────────────────────────────────────

#[test]
fn falling_into_lava_loses() {
    let config = GameConfig::default();
    let state = level_state(".....\n.@...\n.+++.", &Legend::platformer(), &config);
    let next = tick(&state, &InputState::new(), 100.0, &mut seeded_rng());
    assert_eq!(next.status, GameStatus::Lost);
}

#[test]
fn touching_moving_lava_loses() {
    let config = GameConfig::default();
    let state = level_state("......\n.@=...\n######", &Legend::platformer(), &config);
    let next = tick(&state, &right(), 100.0, &mut seeded_rng());
    assert_eq!(next.status, GameStatus::Lost);
}

#[test]
fn finished_games_are_frozen() {
    let config = GameConfig::default();
    let state = level_state("......\n.@=...\n######", &Legend::platformer(), &config);
    let lost = tick(&state, &right(), 100.0, &mut seeded_rng());
    assert_eq!(lost.status, GameStatus::Lost);

    let later = tick(&lost, &right(), 100.0, &mut seeded_rng());
    assert_eq!(later.status, GameStatus::Lost);
    assert_eq!(later.frame, lost.frame + 1);
    assert_eq!(later.entities, lost.entities);
}

// ── Pong ──────────────────────────────────────────────────────────────────────

fn pong() -> GameState {
    init_pong(&GameConfig::default(), &mut seeded_rng())
}

fn ball_index(state: &GameState) -> usize {
    state
        .entities
        .iter()
        .position(|e| e.label == Label::Ball)
        .expect("ball")
}

#[test]
fn pong_layout() {
    let state = pong();
    assert!(state.player.is_none());
    assert_eq!(count(&state, &Label::Paddle), 2);
    assert_eq!(count(&state, &Label::Wall), 2);
    assert_eq!(count(&state, &Label::GoalLeft), 1);
    assert_eq!(count(&state, &Label::GoalRight), 1);

    let ball = find(&state, Label::Ball);
    assert_eq!(ball.center(), Vector::new(400.0, 300.0));
    assert_relative_eq!(ball.velocity.magnitude(), 0.3, epsilon = 1e-12);
    assert!(ball.velocity.x.abs() >= ball.velocity.y.abs() - 1e-12);
}

#[test]
fn ball_in_left_goal_scores_for_right_and_resets() {
    let mut state = pong();
    let i = ball_index(&state);
    state.entities[i].position = Vector::new(2.0, 300.0);
    state.entities[i].velocity = Vector::new(-1.0, -1.0).times(0.3);

    let next = tick(&state, &InputState::new(), 1.0, &mut seeded_rng());
    assert_eq!(next.right_score, 1);
    assert_eq!(next.left_score, 0);
    let ball = find(&next, Label::Ball);
    assert_eq!(ball.center(), Vector::new(400.0, 300.0));
    assert!(!ball.velocity.is_zero());
    assert_relative_eq!(ball.velocity.magnitude(), 0.3, epsilon = 1e-12);
    assert_eq!(next.status, GameStatus::Playing);
}

#[test]
fn reaching_the_winning_score_ends_the_match() {
    let mut state = pong();
    state.left_score = 6;
    let i = ball_index(&state);
    state.entities[i].position = Vector::new(776.0, 300.0);
    state.entities[i].velocity = Vector::new(0.3, 0.0);

    let next = tick(&state, &InputState::new(), 1.0, &mut seeded_rng());
    assert_eq!(next.left_score, 7);
    assert_eq!(next.status, GameStatus::Won);
}

#[test]
fn ball_rebounds_off_top_wall_faster() {
    let mut state = pong();
    let i = ball_index(&state);
    state.entities[i].position = Vector::new(400.0, 15.0);
    state.entities[i].velocity = Vector::new(0.0, -0.3);

    let next = tick(&state, &InputState::new(), 1.0, &mut seeded_rng());
    let ball = find(&next, Label::Ball);
    assert_relative_eq!(ball.velocity.y, 0.315, epsilon = 1e-12);
    assert_relative_eq!(ball.velocity.x, 0.0);
}

#[test]
fn ball_rebounds_off_paddle() {
    let mut state = pong();
    let i = ball_index(&state);
    // Left paddle spans x 30..50, y 250..350.
    state.entities[i].position = Vector::new(51.0, 290.0);
    state.entities[i].velocity = Vector::new(-0.3, 0.0);

    let next = tick(&state, &InputState::new(), 10.0, &mut seeded_rng());
    let ball = find(&next, Label::Ball);
    assert!(ball.velocity.x > 0.0);
    assert_relative_eq!(ball.velocity.x, 0.315, epsilon = 1e-12);
}

#[test]
fn paddles_follow_named_commands() {
    let state = pong();
    let input = InputState::new()
        .with(Command::named(LEFT_PADDLE_UP))
        .with(Command::named(RIGHT_PADDLE_DOWN));
    let next = tick(&state, &input, 10.0, &mut seeded_rng());

    let paddles: Vec<&Entity> = next
        .entities
        .iter()
        .filter(|e| e.label == Label::Paddle)
        .collect();
    assert_relative_eq!(paddles[0].position.y, 242.0);
    assert_relative_eq!(paddles[1].position.y, 258.0);
}

#[test]
fn fast_ball_cannot_skip_past_the_goal() {
    let mut state = pong();
    let i = ball_index(&state);
    // A capped 100 ms frame moves the ball 30 px, more than goal plus ball.
    state.entities[i].position = Vector::new(8.0, 300.0);
    state.entities[i].velocity = Vector::new(-0.3, 0.0);

    let next = tick(&state, &InputState::new(), 100.0, &mut seeded_rng());
    assert_eq!(next.right_score, 1);
    assert_eq!(find(&next, Label::Ball).center(), Vector::new(400.0, 300.0));
}

#[test]
fn ball_never_leaves_the_playfield() {
    let mut state = pong();
    let mut rng = seeded_rng();
    for _ in 0..2000 {
        state = tick(&state, &InputState::new(), 100.0, &mut rng);
        if state.status.is_over() {
            break;
        }
        let ball = find(&state, Label::Ball);
        assert!(ball.position.x >= 0.0 && ball.position.x <= 780.0);
        assert!(ball.position.y >= 0.0 && ball.position.y <= 580.0);
    }
}

#[test]
fn speed_gain_applies_once_per_bounce() {
    let mut state = pong();
    let i = ball_index(&state);
    state.entities[i].position = Vector::new(51.0, 290.0);
    state.entities[i].velocity = Vector::new(-0.3, 0.0);

    let bounced = tick(&state, &InputState::new(), 10.0, &mut seeded_rng());
    assert_relative_eq!(find(&bounced, Label::Ball).velocity.x, 0.315, epsilon = 1e-12);

    // Still overlapping the paddle on the next frame, already heading away.
    let next = tick(&bounced, &InputState::new(), 1.0, &mut seeded_rng());
    let ball = find(&next, Label::Ball);
    assert!(ball.position.x < 50.0);
    assert_relative_eq!(ball.velocity.x, 0.315, epsilon = 1e-12);
}

// ── Bullet hell ───────────────────────────────────────────────────────────────

fn bullet_hell() -> GameState {
    init_bullet_hell(&GameConfig::default(), &mut seeded_rng())
}

fn add(state: &mut GameState, mut entity: Entity) {
    entity.id = EntityId(state.next_id);
    state.next_id += 1;
    state.entities.push(entity);
}

#[test]
fn bullet_hell_layout() {
    let state = bullet_hell();
    let p = player(&state);
    assert_eq!(p.center(), Vector::new(400.0, 450.0));
    assert_eq!(p.health.as_ref().map(|h| h.current), Some(3));
    assert!(state.spawner.is_some());
    assert!(state.entities.iter().any(|e| e.emitter.is_some()));
}

#[test]
fn emitter_fires_after_its_delay() {
    let state = bullet_hell();
    let quiet = tick(&state, &InputState::new(), 50.0, &mut seeded_rng());
    assert_eq!(count(&quiet, &Label::Hazard), 0);

    let firing = tick(&quiet, &InputState::new(), 50.0, &mut seeded_rng());
    assert_eq!(count(&firing, &Label::Hazard), 2);
}

#[test]
fn enemy_bullet_costs_one_health() {
    let mut state = bullet_hell();
    let center = player(&state).center();
    let mut shot = Entity::new(Label::Hazard, Vector::ZERO, Vector::new(6.0, 6.0))
        .with_boundary(Boundary::Despawn);
    shot.center_on(center);
    add(&mut state, shot);

    let next = tick(&state, &InputState::new(), 1.0, &mut seeded_rng());
    assert_eq!(player(&next).health.as_ref().map(|h| h.current), Some(2));
    assert_eq!(count(&next, &Label::Hazard), 0);
    assert_eq!(next.status, GameStatus::Playing);
}

#[test]
fn last_health_point_loses() {
    let mut state = bullet_hell();
    let pid = state.player.unwrap();
    if let Some(p) = state.entities.iter_mut().find(|e| e.id == pid) {
        p.health = Some(Health { current: 1, max: 3 });
    }
    let mut shot = Entity::new(Label::Hazard, Vector::ZERO, Vector::new(6.0, 6.0))
        .with_boundary(Boundary::Despawn);
    shot.center_on(player(&state).center());
    add(&mut state, shot);

    let next = tick(&state, &InputState::new(), 1.0, &mut seeded_rng());
    assert_eq!(next.status, GameStatus::Lost);
}

#[test]
fn fire_at_spawns_an_aimed_bullet() {
    let state = bullet_hell();
    let origin = player(&state).center();
    let next = fire_at(&state, origin.plus(Vector::new(0.0, -10.0)));
    let bullet = find(&next, Label::Bullet);
    assert_eq!(bullet.center(), origin);
    assert_relative_eq!(bullet.velocity.x, 0.0);
    assert_relative_eq!(bullet.velocity.y, -0.2);
    assert!(bullet.lifetime.is_some());
}

#[test]
fn fire_at_own_center_does_nothing() {
    let state = bullet_hell();
    let next = fire_at(&state, player(&state).center());
    assert_eq!(count(&next, &Label::Bullet), 0);
}

#[test]
fn bullets_destroy_targets() {
    let mut state = bullet_hell();
    let center = player(&state).center();
    let mut target = Entity::new(Label::Target, Vector::ZERO, Vector::new(60.0, 60.0));
    target.center_on(center.plus(Vector::new(0.0, -20.0)));
    add(&mut state, target);

    let state = fire_at(&state, center.plus(Vector::new(0.0, -20.0)));
    let next = tick(&state, &InputState::new(), 1.0, &mut seeded_rng());
    assert_eq!(next.score, 1);
    assert_eq!(count(&next, &Label::Target), 0);
    assert_eq!(count(&next, &Label::Bullet), 0);
}

#[test]
fn player_bullets_expire() {
    let state = bullet_hell();
    let center = player(&state).center();
    let mut state = fire_at(&state, center.plus(Vector::new(1.0, 0.0)));
    // Nothing to hit to the right; the bullet lives 2 s or leaves the screen.
    let mut rng = seeded_rng();
    for _ in 0..25 {
        state = tick(&state, &InputState::new(), 100.0, &mut rng);
    }
    assert_eq!(count(&state, &Label::Bullet), 0);
}

#[test]
fn targets_appear_over_time() {
    let mut state = bullet_hell();
    let mut rng = seeded_rng();
    for _ in 0..11 {
        state = tick(&state, &InputState::new(), 100.0, &mut rng);
    }
    assert!(count(&state, &Label::Target) >= 1);
    for target in state.entities.iter().filter(|e| e.label == Label::Target) {
        assert!(target.size.x >= 50.0 && target.size.x <= 100.0);
        assert!(target.position.x >= 0.0 && target.position.x + target.size.x <= 800.0);
    }
}

// ── Block jumper ──────────────────────────────────────────────────────────────

fn jumper() -> GameState {
    init_jumper(&GameConfig::default(), &mut seeded_rng())
}

fn block_index(state: &GameState) -> usize {
    state
        .entities
        .iter()
        .position(|e| e.label == Label::Hazard)
        .expect("block")
}

/// Move the block so it leaves past the left edge during a 10 ms tick.
fn block_about_to_pass(state: &mut GameState) {
    let i = block_index(state);
    state.entities[i].position.x = -29.0;
    state.entities[i].velocity = Vector::new(-0.3, 0.0);
}

#[test]
fn jumper_layout() {
    let state = jumper();
    assert_eq!(player(&state).position, Vector::new(10.0, 570.0));

    let course = state.course.as_ref().expect("course");
    assert_eq!(course.stage, 1);
    let block = find(&state, Label::Hazard);
    assert_eq!(block.id, course.obstacle);
    assert_eq!(block.position.x, 1000.0);
    assert_relative_eq!(block.position.y + block.size.y, 600.0, epsilon = 1e-9);
    assert!(block.size.y >= 50.0 && block.size.y <= 300.0);
    assert!(block.velocity.x >= -0.3 && block.velocity.x <= -0.24);
}

#[test]
fn passing_block_scores_and_comes_back() {
    let mut state = jumper();
    block_about_to_pass(&mut state);

    let next = tick(&state, &InputState::new(), 10.0, &mut seeded_rng());
    assert_eq!(next.score, 1);
    assert_eq!(next.status, GameStatus::Playing);
    assert_eq!(next.course.as_ref().map(|c| c.stage), Some(1));

    let block = find(&next, Label::Hazard);
    assert_eq!(block.position.x, 1000.0);
    assert_relative_eq!(block.position.y + block.size.y, 600.0, epsilon = 1e-9);
    assert_eq!(block.collider().height, block.size.y);
}

#[test]
fn every_fifth_point_raises_the_level() {
    let mut state = jumper();
    state.score = 3;
    block_about_to_pass(&mut state);
    let fourth = tick(&state, &InputState::new(), 10.0, &mut seeded_rng());
    assert_eq!(fourth.score, 4);
    assert_eq!(fourth.course.as_ref().map(|c| c.stage), Some(1));

    let mut state = fourth;
    block_about_to_pass(&mut state);
    let fifth = tick(&state, &InputState::new(), 10.0, &mut seeded_rng());
    assert_eq!(fifth.score, 5);
    let course = fifth.course.as_ref().expect("course");
    assert_eq!(course.stage, 2);
    assert_relative_eq!(course.min_speed, 0.27, epsilon = 1e-12);
    assert_relative_eq!(course.max_speed, 0.36, epsilon = 1e-12);
    let speed = -find(&fifth, Label::Hazard).velocity.x;
    assert!(speed >= 0.27 - 1e-12 && speed <= 0.36 + 1e-12);
}

#[test]
fn touching_the_block_loses() {
    let mut state = jumper();
    let i = block_index(&state);
    // Player spans x 10..40; the block reaches x 39 after 20 ms.
    state.entities[i].position.x = 45.0;
    state.entities[i].velocity = Vector::new(-0.3, 0.0);

    let next = tick(&state, &InputState::new(), 20.0, &mut seeded_rng());
    assert_eq!(next.status, GameStatus::Lost);
    assert_eq!(next.score, 0);
}

#[test]
fn jumping_clears_a_low_block() {
    let mut state = jumper();
    let i = block_index(&state);
    state.entities[i].resize(Vector::new(30.0, 20.0));
    state.entities[i].position = Vector::new(20.0, 580.0);
    state.entities[i].velocity = Vector::ZERO;

    let standing = tick(&state, &InputState::new(), 16.0, &mut seeded_rng());
    assert_eq!(standing.status, GameStatus::Lost);

    let jump = InputState::new().with(Command::Up);
    let jumping = tick(&state, &jump, 16.0, &mut seeded_rng());
    assert_eq!(jumping.status, GameStatus::Playing);
    assert!(player(&jumping).position.y < 560.0);
}

// ── Snapshots ─────────────────────────────────────────────────────────────────

#[test]
fn snapshots_list_live_entities() {
    let state = pong();
    let snaps = snapshots(&state);
    assert_eq!(snaps.len(), state.entities.len());
    assert!(snaps.iter().any(|s| s.label == Label::Ball));
}
