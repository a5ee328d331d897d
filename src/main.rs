/// Entry point and event loop.

mod config;
mod domain;
mod sim;
mod ui;

use std::fs::File;
use std::sync::Mutex;
use std::time::Instant;

use anyhow::Context;
use crossterm::event::KeyCode;
use tracing::info;
use tracing_subscriber::EnvFilter;

use config::GameConfig;
use sim::controller::GameController;
use ui::cursor::{Cursor, Nav};
use ui::gamepad::GamepadState;
use ui::input::InputState;
use ui::presenter::Command;
use ui::renderer::Renderer;
use ui::sound::{self, SoundEngine};

/// Env var naming a log file. Unset = no logging (the terminal is ours).
const LOG_ENV: &str = "CARDMATCH_LOG";

fn main() {
    if let Err(e) = init_logging() {
        eprintln!("Logging disabled: {e:#}");
    }

    let config = GameConfig::load();
    let mut controller = GameController::new(config.seed, config.timing.clone());

    let mut renderer = Renderer::new();
    if let Err(e) = renderer.init() {
        eprintln!("Terminal init failed: {e}");
        return;
    }

    let sound = if config.sound { SoundEngine::new() } else { None };

    let result = game_loop(&mut controller, &mut renderer, sound.as_ref(), &config);

    if let Err(e) = renderer.cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }

    if let Err(e) = result {
        eprintln!("Game error: {e:#}");
    }

    let s = controller.session();
    info!(deals = s.deals, matched = s.matched_pairs, "exit");
    println!("Thanks for playing Card Match!");
}

fn init_logging() -> anyhow::Result<()> {
    let path = match std::env::var_os(LOG_ENV) {
        Some(p) => p,
        None => return Ok(()),
    };
    let file = File::create(&path)
        .with_context(|| format!("cannot create log file {}", path.to_string_lossy()))?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("{e}"))?;
    Ok(())
}

fn game_loop(
    controller: &mut GameController,
    renderer: &mut Renderer,
    sound: Option<&SoundEngine>,
    config: &GameConfig,
) -> anyhow::Result<()> {
    let mut kb = InputState::new();
    let mut gp = GamepadState::new();
    gp.load_button_config(&config.gamepad);
    let mut cursor = Cursor::default();
    let frame = config.timing.frame();

    controller.attach(renderer);
    info!(seeded = config.seed.is_some(), gamepad = gp.connected, "game started");

    loop {
        kb.drain_events();
        gp.update();

        if kb.ctrl_c_pressed() || kb.any_pressed(KEYS_QUIT) || gp.quit_pressed() {
            break;
        }

        let card_count = controller.session().cards.len();
        let now = Instant::now();
        for cmd in collect_commands(&kb, &gp, &mut cursor, card_count) {
            let events = controller.handle(cmd, now, renderer);
            sound::play_events(sound, &events);
        }

        let events = controller.tick(now, renderer);
        sound::play_events(sound, &events);

        renderer.set_cursor(cursor.index);
        renderer.render().context("terminal write failed")?;
        std::thread::sleep(frame);
    }

    Ok(())
}

// ── Key Constants ──

const KEYS_LEFT: &[KeyCode] = &[KeyCode::Left, KeyCode::Char('a'), KeyCode::Char('A')];
const KEYS_RIGHT: &[KeyCode] = &[KeyCode::Right, KeyCode::Char('d'), KeyCode::Char('D')];
const KEYS_UP: &[KeyCode] = &[KeyCode::Up, KeyCode::Char('w'), KeyCode::Char('W')];
const KEYS_DOWN: &[KeyCode] = &[KeyCode::Down, KeyCode::Char('s'), KeyCode::Char('S')];
const KEYS_FLIP: &[KeyCode] = &[KeyCode::Enter, KeyCode::Char(' ')];
const KEYS_RESTART: &[KeyCode] = &[KeyCode::Char('r'), KeyCode::Char('R'), KeyCode::F(2)];
const KEYS_QUIT: &[KeyCode] = &[KeyCode::Esc, KeyCode::Char('q'), KeyCode::Char('Q')];

fn detect_nav(kb: &InputState, gp: &GamepadState) -> Option<Nav> {
    if kb.any_pressed(KEYS_UP) {
        Some(Nav::Up)
    } else if kb.any_pressed(KEYS_DOWN) {
        Some(Nav::Down)
    } else if kb.any_pressed(KEYS_LEFT) {
        Some(Nav::Left)
    } else if kb.any_pressed(KEYS_RIGHT) {
        Some(Nav::Right)
    } else {
        gp.nav_pressed()
    }
}

/// Translate this frame's input into game commands, moving the cursor on the way.
fn collect_commands(
    kb: &InputState,
    gp: &GamepadState,
    cursor: &mut Cursor,
    card_count: usize,
) -> Vec<Command> {
    if kb.any_pressed(KEYS_RESTART) || gp.restart_pressed() {
        return vec![Command::Restart];
    }

    let mut cmds = Vec::new();
    if let Some(nav) = detect_nav(kb, gp) {
        cursor.step(nav, card_count);
    }
    for index in kb.digit_picks().filter(|&i| i < card_count) {
        cursor.index = index;
        cmds.push(Command::Select(index));
    }
    if kb.any_pressed(KEYS_FLIP) || gp.flip_pressed() {
        cmds.push(Command::Select(cursor.index));
    }
    cmds
}
