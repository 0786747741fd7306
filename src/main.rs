mod display;

use std::collections::HashMap;
use std::fs::File;
use std::io::{self, stdout, BufWriter, Write};
use std::path::PathBuf;
use std::sync::{mpsc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use crossterm::{
    cursor,
    event::{
        self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, KeyboardEnhancementFlags,
        PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    style::{self, Color, Print},
    terminal, ExecutableCommand, QueueableCommand,
};
use rand::thread_rng;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use arcade_loop::compute::{fire_at, init_bullet_hell, init_jumper, init_pong, GameState};
use arcade_loop::config::GameConfig;
use arcade_loop::controls::{input_state, is_held, Game};
use arcade_loop::entities::GameStatus;
use arcade_loop::grid::Legend;
use arcade_loop::levels::{platformer_plans, top_down_plans};
use arcade_loop::session::{Campaign, CampaignProgress, RunState, Session};
use arcade_loop::vector::Vector;

use display::Hud;

const FRAME: Duration = Duration::from_millis(33); // ≈30 FPS

/// Env var naming a JSON config file.
const CONFIG_ENV: &str = "ARCADE_CONFIG";
/// Env var naming a log file; logging stays off without it since the
/// terminal belongs to the game.
const LOG_ENV: &str = "ARCADE_LOG";

/// Min frames between shots while Space is held.
const SHOOT_COOLDOWN: u32 = 8;

// ── Setup ─────────────────────────────────────────────────────────────────────

fn load_config() -> io::Result<GameConfig> {
    match std::env::var_os(CONFIG_ENV) {
        Some(path) => GameConfig::load(&PathBuf::from(path))
            .map_err(|err| io::Error::new(io::ErrorKind::InvalidInput, err)),
        None => Ok(GameConfig::default()),
    }
}

fn init_logging() -> io::Result<()> {
    let Some(path) = std::env::var_os(LOG_ENV) else {
        return Ok(());
    };
    let file = File::create(path)?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .compact()
        .init();
    Ok(())
}

// ── Menu ──────────────────────────────────────────────────────────────────────

enum MenuResult {
    Start(Game),
    Quit,
}

fn show_menu<W: Write>(out: &mut W, rx: &mpsc::Receiver<Event>) -> io::Result<MenuResult> {
    out.queue(terminal::Clear(terminal::ClearType::All))?;

    let (width, height) = terminal::size()?;
    let cx = width / 2;
    let cy = height / 2;

    let title = "★  ARCADE  LOOP  ★";
    out.queue(cursor::MoveTo(
        cx.saturating_sub(title.chars().count() as u16 / 2),
        cy.saturating_sub(6),
    ))?;
    out.queue(style::SetForegroundColor(Color::Cyan))?;
    out.queue(Print(title))?;

    out.queue(cursor::MoveTo(cx.saturating_sub(14), cy.saturating_sub(3)))?;
    out.queue(style::SetForegroundColor(Color::White))?;
    out.queue(Print("Select a game:"))?;

    let options: &[(&str, &str, Color, &str)] = &[
        ("1", "Adventure ", Color::Green, "collect the coin"),
        ("2", "Platformer", Color::Yellow, "grab every gem, avoid lava"),
        ("3", "Pong      ", Color::White, "two players, first to score"),
        ("4", "Bullets   ", Color::Red, "dodge the spiral, shoot boxes"),
        ("5", "Jumper    ", Color::Magenta, "hop over the incoming blocks"),
    ];

    for (i, (key, label, color, desc)) in options.iter().enumerate() {
        let row = cy.saturating_sub(1) + i as u16;
        out.queue(cursor::MoveTo(cx.saturating_sub(14), row))?;
        out.queue(style::SetForegroundColor(Color::DarkGrey))?;
        out.queue(Print(format!("[{}] ", key)))?;
        out.queue(style::SetForegroundColor(*color))?;
        out.queue(Print(format!("{:<10}", label)))?;
        out.queue(style::SetForegroundColor(Color::DarkGrey))?;
        out.queue(Print(format!("  {}", desc)))?;
    }

    out.queue(cursor::MoveTo(cx.saturating_sub(14), cy + 6))?;
    out.queue(style::SetForegroundColor(Color::DarkGrey))?;
    out.queue(Print("ESC : Quit"))?;

    out.queue(style::ResetColor)?;
    out.flush()?;

    // Block until the user makes a choice
    loop {
        if let Ok(Event::Key(KeyEvent { code, kind, .. })) = rx.recv() {
            if kind != KeyEventKind::Press {
                continue;
            }
            match code {
                KeyCode::Char('1') => return Ok(MenuResult::Start(Game::TopDown)),
                KeyCode::Char('2') => return Ok(MenuResult::Start(Game::Platformer)),
                KeyCode::Char('3') => return Ok(MenuResult::Start(Game::Pong)),
                KeyCode::Char('4') => return Ok(MenuResult::Start(Game::BulletHell)),
                KeyCode::Char('5') => return Ok(MenuResult::Start(Game::Jumper)),
                KeyCode::Esc => return Ok(MenuResult::Quit),
                _ => {}
            }
        }
    }
}

// ── Game loop ─────────────────────────────────────────────────────────────────

enum LoopOutcome {
    Finished(GameStatus),
    Quit,
}

/// Drive one session until it reports or the player quits.
///
/// Input model: `key_frame` records the frame of the last press/repeat event
/// for every key; each frame the keys still within the hold window become
/// the held command set through `game`'s bindings.  Terminals with keyboard enhancement also send releases,
/// which drop the key immediately.
fn game_loop<W: Write>(
    out: &mut W,
    session: &mut Session,
    hud: &Hud,
    rx: &mpsc::Receiver<Event>,
    game: Game,
) -> io::Result<LoopOutcome> {
    let mut rng = thread_rng();

    let mut key_frame: HashMap<KeyCode, u64> = HashMap::new();
    let mut shoot_cooldown: u32 = 0;
    let mut frame: u64 = 0;
    let mut last_frame = Instant::now();

    loop {
        let frame_start = Instant::now();
        frame += 1;

        // ── Drain all pending input events (non-blocking) ─────────────────────
        while let Ok(event) = rx.try_recv() {
            let Event::Key(KeyEvent {
                code,
                kind,
                modifiers,
                ..
            }) = event
            else {
                continue;
            };
            match kind {
                KeyEventKind::Press => {
                    key_frame.insert(code, frame);
                    match code {
                        KeyCode::Esc => return Ok(LoopOutcome::Quit),
                        KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                            return Ok(LoopOutcome::Quit);
                        }
                        _ => {}
                    }
                }
                KeyEventKind::Repeat => {
                    key_frame.insert(code, frame);
                }
                KeyEventKind::Release => {
                    key_frame.remove(&code);
                }
            }
        }

        // ── Player actions ────────────────────────────────────────────────────
        if game.can_shoot()
            && shoot_cooldown == 0
            && is_held(&key_frame, &KeyCode::Char(' '), frame)
        {
            let aimed = session
                .state()
                .player_entity()
                .map(|player| player.center().plus(Vector::new(0.0, -1.0)));
            if let Some(target) = aimed {
                let next = fire_at(session.state(), target);
                session.set_state(next);
                shoot_cooldown = SHOOT_COOLDOWN;
            }
        }
        shoot_cooldown = shoot_cooldown.saturating_sub(1);

        // ── Advance ───────────────────────────────────────────────────────────
        let input = input_state(&key_frame, frame, game);
        let delta_ms = last_frame.elapsed().as_secs_f64() * 1000.0;
        last_frame = Instant::now();
        let run = session.step(delta_ms, &input, &mut rng);

        display::render(out, session.state(), hud)?;

        if let RunState::Finished(status) = run {
            return Ok(LoopOutcome::Finished(status));
        }

        let elapsed = frame_start.elapsed();
        if elapsed < FRAME {
            thread::sleep(FRAME - elapsed);
        }
    }
}

/// Play the level plans in order.  Returns `true` when the player quit.
fn run_campaign<W: Write>(
    out: &mut W,
    rx: &mpsc::Receiver<Event>,
    config: &GameConfig,
    mut campaign: Campaign,
    game: Game,
    title: &str,
    hint: &str,
) -> io::Result<bool> {
    loop {
        let state = campaign
            .start_level(config)
            .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))?;
        let hud = Hud {
            title,
            hint,
            lives: Some(campaign.lives()),
            level: Some((campaign.level_index(), campaign.level_count())),
        };
        let mut session = Session::new(state, config.grace_period_ms);
        let status = match game_loop(out, &mut session, &hud, rx, game)? {
            LoopOutcome::Quit => return Ok(true),
            LoopOutcome::Finished(status) => status,
        };
        match campaign.record(status) {
            CampaignProgress::NextLevel(_) | CampaignProgress::Retry { .. } => {}
            CampaignProgress::Victory | CampaignProgress::GameOver => return Ok(false),
        }
    }
}

fn run_single<W: Write>(
    out: &mut W,
    rx: &mpsc::Receiver<Event>,
    config: &GameConfig,
    state: GameState,
    hud: &Hud,
    game: Game,
) -> io::Result<bool> {
    let mut session = Session::new(state, config.grace_period_ms);
    match game_loop(out, &mut session, hud, rx, game)? {
        LoopOutcome::Quit => Ok(true),
        LoopOutcome::Finished(status) => {
            info!(?status, score = session.state().score, "game_over");
            Ok(false)
        }
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> io::Result<()> {
    let config = load_config()?;
    init_logging()?;

    let raw_out = stdout();
    let mut out = BufWriter::new(raw_out);

    terminal::enable_raw_mode()?;
    out.execute(terminal::EnterAlternateScreen)?;
    out.execute(cursor::Hide)?;

    // Request key-release (and key-repeat) events from the terminal.
    let keyboard_enhanced = out
        .execute(PushKeyboardEnhancementFlags(
            KeyboardEnhancementFlags::REPORT_EVENT_TYPES,
        ))
        .is_ok();
    if !keyboard_enhanced {
        warn!("keyboard enhancement unavailable; held keys expire by timeout");
    }

    // Dedicate a thread to blocking event reads so the game loop never
    // blocks on I/O.
    let (tx, rx) = mpsc::channel::<Event>();
    thread::spawn(move || loop {
        match event::read() {
            Ok(ev) => {
                if tx.send(ev).is_err() {
                    break; // receiver dropped → program exiting
                }
            }
            Err(_) => break,
        }
    });

    let result = run(&mut out, &rx, &config);

    // Always restore the terminal
    if keyboard_enhanced {
        let _ = out.execute(PopKeyboardEnhancementFlags);
    }
    let _ = out.execute(cursor::Show);
    let _ = out.execute(terminal::LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();

    result
}

fn run<W: Write>(out: &mut W, rx: &mpsc::Receiver<Event>, config: &GameConfig) -> io::Result<()> {
    let mut rng = thread_rng();

    loop {
        let game = match show_menu(out, rx)? {
            MenuResult::Quit => break,
            MenuResult::Start(game) => game,
        };
        info!(?game, "game_selected");

        let quit = match game {
            Game::TopDown => run_campaign(
                out,
                rx,
                config,
                Campaign::new(top_down_plans(), Legend::top_down(), config.top_down.lives),
                game,
                "ADVENTURE",
                "WASD / arrows : Move   ESC : Quit",
            )?,
            Game::Platformer => run_campaign(
                out,
                rx,
                config,
                Campaign::new(
                    platformer_plans(),
                    Legend::platformer(),
                    config.platformer.lives,
                ),
                game,
                "PLATFORMER",
                "A D / ← → : Run   W / ↑ : Jump   ESC : Quit",
            )?,
            Game::Pong => {
                let hud = Hud {
                    title: "PONG",
                    hint: "Q A : Left paddle   O L / ↑ ↓ : Right paddle   ESC : Quit",
                    lives: None,
                    level: None,
                };
                run_single(out, rx, config, init_pong(config, &mut rng), &hud, game)?
            }
            Game::BulletHell => {
                let hud = Hud {
                    title: "BULLETS",
                    hint: "WASD / arrows : Move   SPACE : Shoot   ESC : Quit",
                    lives: None,
                    level: None,
                };
                run_single(
                    out,
                    rx,
                    config,
                    init_bullet_hell(config, &mut rng),
                    &hud,
                    game,
                )?
            }
            Game::Jumper => {
                let hud = Hud {
                    title: "JUMPER",
                    hint: "SPACE / W / ↑ : Jump   ESC : Quit",
                    lives: None,
                    level: None,
                };
                run_single(out, rx, config, init_jumper(config, &mut rng), &hud, game)?
            }
        };
        if quit {
            break;
        }
    }
    Ok(())
}
