//! Rendering layer: all terminal I/O lives here.
//!
//! Each function receives a mutable writer and an immutable view of the
//! game state.  No game logic is performed; world coordinates are scaled
//! onto the terminal cells inside the border.

use std::io::Write;

use crossterm::{
    cursor,
    style::{self, Color, Print},
    terminal, QueueableCommand,
};
use arcade_loop::compute::{snapshots, GameState};
use arcade_loop::entities::{EntitySnapshot, GameStatus, Label, Playfield};
use arcade_loop::physics::is_outside;

// ── Colour palette ────────────────────────────────────────────────────────────

const C_BORDER: Color = Color::DarkBlue;
const C_HUD_SCORE: Color = Color::Yellow;
const C_HUD_LIVES: Color = Color::Red;
const C_HUD_TITLE: Color = Color::Cyan;
const C_WALL: Color = Color::Blue;
const C_LAVA: Color = Color::Red;
const C_PLAYER: Color = Color::White;
const C_PICKUP: Color = Color::Yellow;
const C_PADDLE: Color = Color::White;
const C_BALL: Color = Color::Yellow;
const C_GOAL: Color = Color::DarkGrey;
const C_BULLET_PLAYER: Color = Color::Cyan;
const C_BULLET_ENEMY: Color = Color::Magenta;
const C_TARGET: Color = Color::Green;
const C_HINT: Color = Color::DarkGrey;

const COIN_FRAMES: [&str; 4] = ["◐", "◓", "◑", "◒"];

/// Text shown around the playfield.
pub struct Hud<'a> {
    pub title: &'a str,
    pub hint: &'a str,
    pub lives: Option<u32>,
    /// (current, total), zero-based current.
    pub level: Option<(usize, usize)>,
}

/// Mapping from world units to terminal cells.
#[derive(Clone, Copy)]
struct Viewport {
    left: u16,
    top: u16,
    cols: u16,
    rows: u16,
    scale_x: f64,
    scale_y: f64,
}

impl Viewport {
    fn new(state: &GameState, width: u16, height: u16) -> Self {
        let cols = width.saturating_sub(2).max(1);
        let rows = height.saturating_sub(4).max(1);
        Viewport {
            left: 1,
            top: 2,
            cols,
            rows,
            scale_x: cols as f64 / state.playfield.width,
            scale_y: rows as f64 / state.playfield.height,
        }
    }

    /// Screen cells covered by a world rectangle, always at least one.
    fn span(&self, x: f64, y: f64, w: f64, h: f64) -> (u16, u16, u16, u16) {
        let col0 = ((x * self.scale_x).floor().max(0.0) as u16).min(self.cols - 1);
        let row0 = ((y * self.scale_y).floor().max(0.0) as u16).min(self.rows - 1);
        let col1 = (((x + w) * self.scale_x).ceil() as u16).clamp(col0 + 1, self.cols);
        let row1 = (((y + h) * self.scale_y).ceil() as u16).clamp(row0 + 1, self.rows);
        (col0, row0, col1, row1)
    }
}

// ── Public entry point ────────────────────────────────────────────────────────

/// Render one complete frame.
pub fn render<W: Write>(out: &mut W, state: &GameState, hud: &Hud) -> std::io::Result<()> {
    let (width, height) = terminal::size()?;
    let view = Viewport::new(state, width, height);

    out.queue(terminal::Clear(terminal::ClearType::All))?;

    draw_border(out, width, height)?;
    draw_hud(out, state, hud, width)?;
    draw_terrain(out, state, &view)?;
    for snapshot in snapshots(state) {
        draw_entity(out, &snapshot, &view, state.playfield)?;
    }
    draw_controls_hint(out, hud, height)?;

    if state.status.is_over() {
        draw_game_over(out, state, width, height)?;
    }

    // Park cursor in a harmless spot and flush
    out.queue(style::ResetColor)?;
    out.queue(cursor::MoveTo(0, height.saturating_sub(1)))?;
    out.flush()?;
    Ok(())
}

// ── Border ────────────────────────────────────────────────────────────────────

fn draw_border<W: Write>(out: &mut W, width: u16, height: u16) -> std::io::Result<()> {
    let w = width as usize;

    out.queue(style::SetForegroundColor(C_BORDER))?;

    out.queue(cursor::MoveTo(0, 1))?;
    out.queue(Print(format!("┌{}┐", "─".repeat(w.saturating_sub(2)))))?;

    out.queue(cursor::MoveTo(0, height.saturating_sub(2)))?;
    out.queue(Print(format!("└{}┘", "─".repeat(w.saturating_sub(2)))))?;

    for row in 2..height.saturating_sub(2) {
        out.queue(cursor::MoveTo(0, row))?;
        out.queue(Print("│"))?;
        out.queue(cursor::MoveTo(width.saturating_sub(1), row))?;
        out.queue(Print("│"))?;
    }

    Ok(())
}

// ── HUD (row 0) ───────────────────────────────────────────────────────────────

fn draw_hud<W: Write>(
    out: &mut W,
    state: &GameState,
    hud: &Hud,
    width: u16,
) -> std::io::Result<()> {
    // Score on the left; Pong shows both sides
    out.queue(cursor::MoveTo(1, 0))?;
    out.queue(style::SetForegroundColor(C_HUD_SCORE))?;
    if state.player.is_none() {
        out.queue(Print(format!(
            "{:>3} : {:<3}",
            state.left_score, state.right_score
        )))?;
    } else {
        out.queue(Print(format!("Score:{:>6}", state.score)))?;
    }

    // Title and level in the centre
    let title = match hud.level {
        Some((index, total)) => format!("[ {} {}/{} ]", hud.title, index + 1, total),
        None => format!("[ {} ]", hud.title),
    };
    let tx = (width / 2).saturating_sub(title.chars().count() as u16 / 2);
    out.queue(cursor::MoveTo(tx, 0))?;
    out.queue(style::SetForegroundColor(C_HUD_TITLE))?;
    out.queue(Print(&title))?;

    // Health and lives on the right
    let health = state
        .player_entity()
        .and_then(|player| player.health.as_ref())
        .map(|health| format!("HP:{}/{} ", health.current, health.max))
        .unwrap_or_default();
    let stage = state
        .course
        .as_ref()
        .map(|course| format!("Level:{} ", course.stage))
        .unwrap_or_default();
    let lives = hud
        .lives
        .map(|lives| format!("Lives:{}", "♥".repeat(lives as usize)))
        .unwrap_or_default();
    let right_str = format!("{}{}{}", stage, health, lives);
    let rx = width.saturating_sub(right_str.chars().count() as u16 + 1);
    out.queue(cursor::MoveTo(rx, 0))?;
    out.queue(style::SetForegroundColor(C_HUD_LIVES))?;
    out.queue(Print(&right_str))?;

    Ok(())
}

// ── Terrain ───────────────────────────────────────────────────────────────────

fn draw_terrain<W: Write>(out: &mut W, state: &GameState, view: &Viewport) -> std::io::Result<()> {
    let Some(grid) = state.level.as_ref() else {
        return Ok(());
    };
    // Sample the cell under the centre of every screen character.
    for row in 0..view.rows {
        for col in 0..view.cols {
            let wx = (col as f64 + 0.5) / view.scale_x;
            let wy = (row as f64 + 0.5) / view.scale_y;
            let (glyph, color) = match grid.label_at(wx.floor() as i64, wy.floor() as i64) {
                Some(Label::Wall) => ("█", C_WALL),
                Some(Label::Hazard) => ("~", C_LAVA),
                _ => continue,
            };
            out.queue(cursor::MoveTo(view.left + col, view.top + row))?;
            out.queue(style::SetForegroundColor(color))?;
            out.queue(Print(glyph))?;
        }
    }
    Ok(())
}

// ── Entities ──────────────────────────────────────────────────────────────────

fn sprite(snapshot: &EntitySnapshot) -> (&'static str, Color) {
    match &snapshot.label {
        Label::Player => ("@", C_PLAYER),
        Label::Pickup => {
            let frame = snapshot.frame.unwrap_or(0) as usize;
            (COIN_FRAMES[frame % COIN_FRAMES.len()], C_PICKUP)
        }
        Label::Wall => ("▓", C_WALL),
        Label::Hazard => ("•", C_BULLET_ENEMY),
        Label::Paddle => ("█", C_PADDLE),
        Label::Ball => ("●", C_BALL),
        Label::GoalLeft | Label::GoalRight => ("┊", C_GOAL),
        Label::Bullet => ("║", C_BULLET_PLAYER),
        Label::Target => ("□", C_TARGET),
        Label::Empty | Label::Custom(_) => ("*", C_HINT),
    }
}

fn draw_entity<W: Write>(
    out: &mut W,
    snapshot: &EntitySnapshot,
    view: &Viewport,
    playfield: Playfield,
) -> std::io::Result<()> {
    // Still waiting past the edge (jumper blocks).
    if is_outside(snapshot.position, snapshot.size, playfield) {
        return Ok(());
    }
    let (mut glyph, mut color) = sprite(snapshot);
    // Moving lava in grid levels reads better as lava than as a bullet.
    if snapshot.label == Label::Hazard && snapshot.size.x >= 1.0 {
        glyph = "~";
        color = C_LAVA;
    }
    let (col0, row0, col1, row1) = view.span(
        snapshot.position.x,
        snapshot.position.y,
        snapshot.size.x,
        snapshot.size.y,
    );
    out.queue(style::SetForegroundColor(color))?;
    for row in row0..row1 {
        out.queue(cursor::MoveTo(view.left + col0, view.top + row))?;
        out.queue(Print(glyph.repeat((col1 - col0) as usize)))?;
    }
    Ok(())
}

// ── Controls hint (last row) ──────────────────────────────────────────────────

fn draw_controls_hint<W: Write>(out: &mut W, hud: &Hud, height: u16) -> std::io::Result<()> {
    out.queue(cursor::MoveTo(1, height.saturating_sub(1)))?;
    out.queue(style::SetForegroundColor(C_HINT))?;
    out.queue(Print(hud.hint))?;
    Ok(())
}

// ── Game-over overlay ─────────────────────────────────────────────────────────

fn draw_game_over<W: Write>(
    out: &mut W,
    state: &GameState,
    width: u16,
    height: u16,
) -> std::io::Result<()> {
    let (banner, color) = match state.status {
        GameStatus::Won => ("║     YOU  WIN       ║", Color::Green),
        _ => ("║    GAME  OVER      ║", Color::Red),
    };
    let lines: [(&str, Color); 3] = [
        ("╔════════════════════╗", color),
        (banner, color),
        ("╚════════════════════╝", color),
    ];
    let score_line = format!("Score: {:>6}", state.score);

    let cx = width / 2;
    let start_row = (height / 2).saturating_sub(2);

    for (i, (msg, color)) in lines.iter().enumerate() {
        let row = start_row + i as u16;
        let col = cx.saturating_sub(msg.chars().count() as u16 / 2);
        out.queue(cursor::MoveTo(col, row))?;
        out.queue(style::SetForegroundColor(*color))?;
        out.queue(Print(*msg))?;
    }

    let score_row = start_row + lines.len() as u16;
    let col = cx.saturating_sub(score_line.chars().count() as u16 / 2);
    out.queue(cursor::MoveTo(col, score_row))?;
    out.queue(style::SetForegroundColor(C_HUD_SCORE))?;
    out.queue(Print(&score_line))?;

    Ok(())
}
