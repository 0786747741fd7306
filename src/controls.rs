//! Keyboard bindings: which held keys become which `Command`s, per game.
//!
//! Each game reads its own table, so a key like `a` can steer in one game
//! and move a paddle in another without the two meanings overlapping.

use std::collections::HashMap;

use crossterm::event::KeyCode;

use crate::compute::{LEFT_PADDLE_DOWN, LEFT_PADDLE_UP, RIGHT_PADDLE_DOWN, RIGHT_PADDLE_UP};
use crate::entities::{Command, InputState};

/// A key is considered "held" if its last press/repeat event arrived within
/// this many frames.  Covers terminals that don't emit key-release events.
pub const HOLD_WINDOW: u64 = 4;

const UP_KEYS: &[KeyCode] = &[KeyCode::Up, KeyCode::Char('w'), KeyCode::Char('W')];
const DOWN_KEYS: &[KeyCode] = &[KeyCode::Down, KeyCode::Char('s'), KeyCode::Char('S')];
const LEFT_KEYS: &[KeyCode] = &[KeyCode::Left, KeyCode::Char('a'), KeyCode::Char('A')];
const RIGHT_KEYS: &[KeyCode] = &[KeyCode::Right, KeyCode::Char('d'), KeyCode::Char('D')];
const LEFT_PADDLE_UP_KEYS: &[KeyCode] = &[KeyCode::Char('q'), KeyCode::Char('Q')];
const LEFT_PADDLE_DOWN_KEYS: &[KeyCode] = &[KeyCode::Char('a'), KeyCode::Char('A')];
const RIGHT_PADDLE_UP_KEYS: &[KeyCode] = &[KeyCode::Char('o'), KeyCode::Char('O'), KeyCode::Up];
const RIGHT_PADDLE_DOWN_KEYS: &[KeyCode] =
    &[KeyCode::Char('l'), KeyCode::Char('L'), KeyCode::Down];
const JUMP_KEYS: &[KeyCode] = &[
    KeyCode::Char(' '),
    KeyCode::Up,
    KeyCode::Char('w'),
    KeyCode::Char('W'),
];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Game {
    TopDown,
    Platformer,
    Pong,
    BulletHell,
    Jumper,
}

impl Game {
    /// Only the bullet hell lets the player shoot.
    pub fn can_shoot(self) -> bool {
        self == Game::BulletHell
    }
}

/// Key table for `game`.
pub fn bindings(game: Game) -> Vec<(&'static [KeyCode], Command)> {
    match game {
        Game::TopDown | Game::Platformer | Game::BulletHell => vec![
            (UP_KEYS, Command::Up),
            (DOWN_KEYS, Command::Down),
            (LEFT_KEYS, Command::Left),
            (RIGHT_KEYS, Command::Right),
        ],
        Game::Pong => vec![
            (LEFT_PADDLE_UP_KEYS, Command::named(LEFT_PADDLE_UP)),
            (LEFT_PADDLE_DOWN_KEYS, Command::named(LEFT_PADDLE_DOWN)),
            (RIGHT_PADDLE_UP_KEYS, Command::named(RIGHT_PADDLE_UP)),
            (RIGHT_PADDLE_DOWN_KEYS, Command::named(RIGHT_PADDLE_DOWN)),
        ],
        Game::Jumper => vec![(JUMP_KEYS, Command::Up)],
    }
}

/// Returns true if `key` was seen within the last `HOLD_WINDOW` frames.
pub fn is_held(key_frame: &HashMap<KeyCode, u64>, key: &KeyCode, frame: u64) -> bool {
    key_frame
        .get(key)
        .map(|&last| frame.saturating_sub(last) <= HOLD_WINDOW)
        .unwrap_or(false)
}

/// Translate the live keys into the command set `game` reads.
pub fn input_state(key_frame: &HashMap<KeyCode, u64>, frame: u64, game: Game) -> InputState {
    let mut input = InputState::new();
    for (keys, command) in bindings(game) {
        if keys.iter().any(|key| is_held(key_frame, key, frame)) {
            input.press(command);
        }
    }
    input
}
