//! Tile grid built from a textual plan, and the contact query the movement
//! code relies on.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::GameConfig;
use crate::entities::{Entity, EntityId, Label};
use crate::error::LevelError;
use crate::prefabs::Prefab;
use crate::vector::Vector;

// ── Legend ────────────────────────────────────────────────────────────────────

/// What a single plan character stands for.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LegendEntry {
    Terrain(Label),
    /// Spawns an actor and leaves `terrain` in the cell.
    Actor { prefab: Prefab, terrain: Label },
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Legend {
    entries: HashMap<char, LegendEntry>,
}

impl Legend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn terrain(mut self, ch: char, label: Label) -> Self {
        self.entries.insert(ch, LegendEntry::Terrain(label));
        self
    }

    pub fn actor(mut self, ch: char, prefab: Prefab, terrain: Label) -> Self {
        self.entries
            .insert(ch, LegendEntry::Actor { prefab, terrain });
        self
    }

    pub fn get(&self, ch: char) -> Option<&LegendEntry> {
        self.entries.get(&ch)
    }

    /// Characters used by the top-down adventure plans.
    pub fn top_down() -> Self {
        Legend::new()
            .terrain('.', Label::Empty)
            .actor('#', Prefab::Obstacle, Label::Wall)
            .actor('@', Prefab::Player, Label::Empty)
            .actor('$', Prefab::Coin, Label::Empty)
    }

    /// Characters used by the platformer plans.
    pub fn platformer() -> Self {
        Legend::new()
            .terrain('.', Label::Empty)
            .terrain('#', Label::Wall)
            .terrain('+', Label::Hazard)
            .actor('@', Prefab::Runner, Label::Empty)
            .actor('o', Prefab::Gem, Label::Empty)
            .actor('=', Prefab::LavaSlide, Label::Empty)
            .actor('|', Prefab::LavaFall, Label::Empty)
            .actor('v', Prefab::LavaDrip, Label::Empty)
    }
}

// ── Grid ──────────────────────────────────────────────────────────────────────

/// Rectangular cell labels.  `cells.len() == height` and every row holds
/// `width` labels.
#[derive(Clone, Debug, PartialEq)]
pub struct Grid {
    width: usize,
    height: usize,
    cells: Vec<Vec<Label>>,
}

impl Grid {
    pub fn new(cells: Vec<Vec<Label>>) -> Result<Self, LevelError> {
        let width = cells.first().map(Vec::len).unwrap_or(0);
        if width == 0 {
            return Err(LevelError::Empty);
        }
        for (row, labels) in cells.iter().enumerate() {
            if labels.len() != width {
                return Err(LevelError::Ragged {
                    row,
                    expected: width,
                    actual: labels.len(),
                });
            }
        }
        Ok(Grid {
            width,
            height: cells.len(),
            cells,
        })
    }

    pub fn filled(width: usize, height: usize, label: Label) -> Self {
        Grid {
            width,
            height,
            cells: vec![vec![label; width]; height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn rows(&self) -> impl Iterator<Item = &[Label]> {
        self.cells.iter().map(Vec::as_slice)
    }

    /// Label of the cell, `None` outside the grid.
    pub fn label_at(&self, x: i64, y: i64) -> Option<&Label> {
        if x < 0 || y < 0 {
            return None;
        }
        self.cells.get(y as usize)?.get(x as usize)
    }

    pub fn count(&self, label: &Label) -> usize {
        self.cells
            .iter()
            .flatten()
            .filter(|here| *here == label)
            .count()
    }

    /// Does the box at `position` with `size` cover any cell labelled
    /// `label`?  Partial coverage counts as touching, and everything outside
    /// the grid is wall.
    pub fn touches(&self, position: Vector, size: Vector, label: &Label) -> bool {
        let x_start = position.x.floor() as i64;
        let x_end = (position.x + size.x).ceil() as i64;
        let y_start = position.y.floor() as i64;
        let y_end = (position.y + size.y).ceil() as i64;

        for y in y_start..y_end {
            for x in x_start..x_end {
                let hit = match self.label_at(x, y) {
                    Some(here) => here == label,
                    None => *label == Label::Wall,
                };
                if hit {
                    return true;
                }
            }
        }
        false
    }
}

// ── Level ─────────────────────────────────────────────────────────────────────

/// A parsed plan: terrain plus the actors it spawned.
#[derive(Clone, Debug)]
pub struct Level {
    pub grid: Grid,
    pub player: Entity,
    pub actors: Vec<Entity>,
}

impl Level {
    pub fn parse(plan: &str, legend: &Legend, config: &GameConfig) -> Result<Self, LevelError> {
        let rows = plan_rows(plan);
        let width = rows.first().map(Vec::len).ok_or(LevelError::Empty)?;

        let mut player: Option<Entity> = None;
        let mut actors = Vec::new();
        let mut next_id = 1;
        let mut cells = Vec::with_capacity(rows.len());

        for (y, row) in rows.iter().enumerate() {
            if row.len() != width {
                return Err(LevelError::Ragged {
                    row: y,
                    expected: width,
                    actual: row.len(),
                });
            }
            let mut labels = Vec::with_capacity(width);
            for (x, &ch) in row.iter().enumerate() {
                let entry = legend.get(ch).ok_or(LevelError::UnknownChar {
                    ch,
                    row: y,
                    column: x,
                })?;
                match entry {
                    LegendEntry::Terrain(label) => labels.push(label.clone()),
                    LegendEntry::Actor { prefab, terrain } => {
                        let mut actor = prefab.spawn(Vector::new(x as f64, y as f64), config);
                        actor.id = EntityId(next_id);
                        next_id += 1;
                        if prefab.is_player() {
                            if player.is_some() {
                                return Err(LevelError::DuplicatePlayer { row: y, column: x });
                            }
                            player = Some(actor);
                        } else {
                            actors.push(actor);
                        }
                        labels.push(terrain.clone());
                    }
                }
            }
            cells.push(labels);
        }

        let player = player.ok_or(LevelError::MissingPlayer)?;
        let grid = Grid::new(cells)?;
        info!(
            width = grid.width(),
            height = grid.height(),
            actors = actors.len(),
            "level_parsed"
        );
        Ok(Level {
            grid,
            player,
            actors,
        })
    }
}

/// Split the plan into rows of characters, dropping blank lines at either end.
fn plan_rows(plan: &str) -> Vec<Vec<char>> {
    let lines: Vec<&str> = plan
        .lines()
        .map(|line| line.trim_end_matches('\r'))
        .collect();
    let first = lines.iter().position(|line| !line.trim().is_empty());
    let last = lines.iter().rposition(|line| !line.trim().is_empty());
    match (first, last) {
        (Some(first), Some(last)) => lines[first..=last]
            .iter()
            .map(|line| line.chars().collect())
            .collect(),
        _ => Vec::new(),
    }
}
