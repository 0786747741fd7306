use std::f64::consts::PI;

use approx::assert_relative_eq;
use arcade_loop::entities::*;
use arcade_loop::vector::Vector;

// ── Labels ────────────────────────────────────────────────────────────────────

#[test]
fn label_aliases() {
    assert_eq!(Label::from("lava"), Label::Hazard);
    assert_eq!(Label::from("coin"), Label::Pickup);
    assert_eq!(Label::from("obstacle"), Label::Wall);
    assert_eq!(Label::from("leftGoal"), Label::GoalLeft);
    assert_eq!(Label::from("goal-right"), Label::GoalRight);
    assert_eq!(Label::from("mystery"), Label::Custom("mystery".to_string()));
}

#[test]
fn label_serializes_as_string() {
    let json = serde_json::to_string(&Label::GoalLeft).unwrap();
    assert_eq!(json, "\"goal-left\"");
    let back: Label = serde_json::from_str("\"lava\"").unwrap();
    assert_eq!(back, Label::Hazard);
    assert_eq!(Label::Custom("emitter".into()).to_string(), "emitter");
}

#[test]
fn only_players_balls_and_bullets_move_into_things() {
    assert!(Label::Player.is_mover());
    assert!(Label::Ball.is_mover());
    assert!(Label::Bullet.is_mover());
    assert!(!Label::Wall.is_mover());
    assert!(!Label::Hazard.is_mover());
    assert!(!Label::Paddle.is_mover());
}

// ── Input ─────────────────────────────────────────────────────────────────────

#[test]
fn input_direction_sums_held_keys() {
    let input = InputState::new().with(Command::Up).with(Command::Right);
    assert_eq!(input.direction(), Vector::new(1.0, -1.0));

    let opposed = InputState::new().with(Command::Left).with(Command::Right);
    assert_eq!(opposed.direction(), Vector::ZERO);
}

#[test]
fn input_press_and_release() {
    let mut input = InputState::new();
    assert!(input.is_empty());
    input.press(Command::named("fire"));
    assert!(input.is_held(&Command::named("fire")));
    input.release(&Command::named("fire"));
    assert!(!input.is_held(&Command::named("fire")));
}

// ── Capabilities ──────────────────────────────────────────────────────────────

#[test]
fn animation_cycles_and_wraps() {
    let mut anim = Animation::new(0, 2, true, 100.0);
    anim.advance(50.0);
    assert_eq!(anim.frame, 0);
    anim.advance(60.0);
    assert_eq!(anim.frame, 1);
    anim.advance(101.0);
    assert_eq!(anim.frame, 2);
    anim.advance(101.0);
    assert_eq!(anim.frame, 0);
}

#[test]
fn animation_without_repeat_holds_last_frame() {
    let mut anim = Animation::new(3, 4, false, 10.0);
    for _ in 0..5 {
        anim.advance(11.0);
    }
    assert_eq!(anim.frame, 4);
}

#[test]
fn health_reports_the_killing_hit() {
    let mut health = Health::new(2);
    assert!(!health.take_damage(1));
    assert_relative_eq!(health.fraction(), 0.5);
    assert!(health.take_damage(1));
    assert!(health.is_dead());
    assert!(!health.take_damage(1));
    assert_eq!(health.current, 0);
}

#[test]
fn lifetime_expires_after_max_age() {
    let mut life = Lifetime::new(100.0);
    assert!(!life.age(60.0));
    assert!(!life.age(40.0));
    assert!(life.age(1.0));
}

#[test]
fn emitter_fires_evenly_spaced_arms() {
    let mut emitter = Emitter {
        delay_ms: 80.0,
        timer_ms: 0.0,
        angle: 0.0,
        angle_step: 0.5,
        arms: 2,
        bullet_speed: 1.0,
        bullet_size: Vector::new(6.0, 12.0),
        collider_size: Vector::new(6.0, 6.0),
    };
    assert!(emitter.advance(50.0).is_empty());
    let dirs = emitter.advance(50.0);
    assert_eq!(dirs.len(), 2);
    assert_relative_eq!(dirs[0].x, 0.5_f64.cos(), epsilon = 1e-12);
    assert_relative_eq!(dirs[0].y, 0.5_f64.sin(), epsilon = 1e-12);
    assert_relative_eq!(dirs[1].x, (0.5 + PI).cos(), epsilon = 1e-12);
    assert_relative_eq!(dirs[1].y, (0.5 + PI).sin(), epsilon = 1e-12);
    assert_eq!(emitter.timer_ms, 0.0);
}

// ── Entity ────────────────────────────────────────────────────────────────────

#[test]
fn entity_clone_is_independent() {
    let original = Entity::new(Label::Player, Vector::new(1.0, 2.0), Vector::new(1.0, 1.0));
    let mut copy = original.clone();
    copy.position = Vector::new(5.0, 5.0);
    assert_eq!(original.position, Vector::new(1.0, 2.0));
    assert_ne!(original, copy);
}

#[test]
fn collider_follows_position() {
    let mut e = Entity::new(Label::Player, Vector::new(10.0, 10.0), Vector::new(40.0, 40.0))
        .with_collider(20.0, 30.0);
    let c = e.collider();
    assert_eq!((c.x, c.y, c.width, c.height), (20.0, 15.0, 20.0, 30.0));

    e.position = Vector::new(0.0, 0.0);
    let c = e.collider();
    assert_eq!((c.x, c.y), (10.0, 5.0));
}

#[test]
fn center_on_puts_center_on_point() {
    let mut e = Entity::new(Label::Ball, Vector::ZERO, Vector::new(20.0, 20.0));
    e.center_on(Vector::new(400.0, 300.0));
    assert_eq!(e.position, Vector::new(390.0, 290.0));
    assert_eq!(e.center(), Vector::new(400.0, 300.0));
}

#[test]
fn snapshot_carries_the_animation_frame() {
    let e = Entity::new(Label::Pickup, Vector::new(3.0, 4.0), Vector::new(1.0, 1.0))
        .with_animation(Animation::new(2, 5, true, 100.0));
    let snap = e.snapshot();
    assert_eq!(snap.label, Label::Pickup);
    assert_eq!(snap.position, Vector::new(3.0, 4.0));
    assert_eq!(snap.frame, Some(2));

    let plain = Entity::new(Label::Wall, Vector::ZERO, Vector::new(1.0, 1.0));
    assert_eq!(plain.snapshot().frame, None);
}

#[test]
fn status_is_over() {
    assert!(!GameStatus::Playing.is_over());
    assert!(GameStatus::Won.is_over());
    assert!(GameStatus::Lost.is_over());
}
