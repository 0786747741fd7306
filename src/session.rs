//! Running a level to completion and chaining levels into a campaign.

use rand::Rng;
use tracing::info;

use crate::compute::{init_level, tick, GameState};
use crate::config::GameConfig;
use crate::entities::{GameStatus, InputState};
use crate::error::LevelError;
use crate::grid::{Legend, Level};

// ── Session ───────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunState {
    Running,
    Finished(GameStatus),
}

/// One game being played.  After the game is won or lost it keeps ticking
/// for `grace_period_ms` so the ending stays on screen, then reports.
#[derive(Clone, Debug)]
pub struct Session {
    state: GameState,
    grace_period_ms: f64,
    grace_left_ms: Option<f64>,
    finished: Option<GameStatus>,
}

impl Session {
    pub fn new(state: GameState, grace_period_ms: f64) -> Self {
        Session {
            state,
            grace_period_ms,
            grace_left_ms: None,
            finished: None,
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Replace the state between frames (e.g. after a player action).
    pub fn set_state(&mut self, state: GameState) {
        self.state = state;
    }

    pub fn step(&mut self, delta_ms: f64, input: &InputState, rng: &mut impl Rng) -> RunState {
        if let Some(status) = self.finished {
            return RunState::Finished(status);
        }
        self.state = tick(&self.state, input, delta_ms, rng);

        let status = self.state.status;
        if !status.is_over() {
            return RunState::Running;
        }
        let left = self.grace_left_ms.get_or_insert(self.grace_period_ms);
        *left -= delta_ms;
        if *left <= 0.0 {
            self.finished = Some(status);
            return RunState::Finished(status);
        }
        RunState::Running
    }
}

// ── Campaign ──────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CampaignProgress {
    /// Level cleared; the index of the level to play next.
    NextLevel(usize),
    /// Level lost with lives to spare; the same level restarts.
    Retry { lives: u32 },
    Victory,
    GameOver,
}

/// An ordered list of level plans played with a shared pool of lives.
#[derive(Clone, Debug)]
pub struct Campaign {
    plans: Vec<String>,
    legend: Legend,
    level_index: usize,
    lives: u32,
}

impl Campaign {
    pub fn new(plans: Vec<String>, legend: Legend, lives: u32) -> Self {
        Campaign {
            plans,
            legend,
            level_index: 0,
            lives,
        }
    }

    pub fn level_index(&self) -> usize {
        self.level_index
    }

    pub fn level_count(&self) -> usize {
        self.plans.len()
    }

    pub fn lives(&self) -> u32 {
        self.lives
    }

    /// Fresh state for the current level.
    pub fn start_level(&self, config: &GameConfig) -> Result<GameState, LevelError> {
        let plan = self.plans.get(self.level_index).ok_or(LevelError::Empty)?;
        let level = Level::parse(plan, &self.legend, config)?;
        Ok(init_level(level, config))
    }

    /// Feed back how the current level ended.
    pub fn record(&mut self, status: GameStatus) -> CampaignProgress {
        let progress = match status {
            GameStatus::Won => {
                self.level_index += 1;
                if self.level_index >= self.plans.len() {
                    CampaignProgress::Victory
                } else {
                    CampaignProgress::NextLevel(self.level_index)
                }
            }
            GameStatus::Lost => {
                self.lives = self.lives.saturating_sub(1);
                if self.lives == 0 {
                    CampaignProgress::GameOver
                } else {
                    CampaignProgress::Retry { lives: self.lives }
                }
            }
            GameStatus::Playing => CampaignProgress::Retry { lives: self.lives },
        };
        info!(
            level = self.level_index,
            lives = self.lives,
            ?progress,
            "campaign_progress"
        );
        progress
    }
}
