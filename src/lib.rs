pub mod collision;
pub mod compute;
pub mod config;
pub mod controls;
pub mod entities;
pub mod error;
pub mod grid;
pub mod levels;
pub mod physics;
pub mod prefabs;
pub mod session;
pub mod vector;

pub use compute::{
    fire_at, init_bullet_hell, init_jumper, init_level, init_pong, tick, GameState,
};
pub use config::GameConfig;
pub use controls::Game;
pub use entities::{Command, Entity, GameStatus, InputState, Label};
pub use error::{ConfigError, LevelError};
pub use grid::{Grid, Legend, Level};
pub use session::{Campaign, CampaignProgress, RunState, Session};
pub use vector::Vector;
