mod display;

use std::io::{stdout, BufWriter, Write};
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    terminal,
    ExecutableCommand,
};
use rand::thread_rng;

use gridfall::engine::{self, Engine, ScreenStep};
use gridfall::entities::{FrameInput, Screen};

/// ≈60 FPS — the immunity window counts 60 ticks to the second.
const FRAME: Duration = Duration::from_millis(16);

// ── Input collection ──────────────────────────────────────────────────────────

/// Collapse all pending key events into this tick's input edges.
///
/// `Press` counts for every action; `Repeat` only refreshes movement, so a
/// held arrow keeps walking while a held SPACE stays a single swing.
fn drain_input(rx: &mpsc::Receiver<Event>) -> FrameInput {
    let mut input = FrameInput::default();
    while let Ok(ev) = rx.try_recv() {
        if let Event::Key(KeyEvent { code, kind, modifiers, .. }) = ev {
            let press = kind == KeyEventKind::Press;
            if !press && kind != KeyEventKind::Repeat {
                continue;
            }
            match code {
                KeyCode::Up => input.up = true,
                KeyCode::Down => input.down = true,
                KeyCode::Left => input.left = true,
                KeyCode::Right => input.right = true,
                KeyCode::Char(' ') if press => input.attack = true,
                KeyCode::Enter if press => input.start = true,
                KeyCode::Char('c') if press && modifiers.contains(KeyModifiers::CONTROL) => {
                    input.quit = true;
                }
                KeyCode::Char('r') | KeyCode::Char('R') if press => input.restart = true,
                KeyCode::Char('m') | KeyCode::Char('M') if press => input.menu = true,
                KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc if press => {
                    input.quit = true;
                }
                _ => {}
            }
        }
    }
    input
}

// ── Game loop ─────────────────────────────────────────────────────────────────

/// Top-level loop: owns the `Screen`, routes input through the screen state
/// machine, and hands gameplay ticks to the engine.
fn run<W: Write>(out: &mut W, rx: &mpsc::Receiver<Event>) -> std::io::Result<()> {
    let epoch = Instant::now();
    let mut rng = thread_rng();
    let mut engine = Engine::new(epoch.elapsed());
    let mut state = engine::init_state(epoch.elapsed());
    let mut screen = Screen::MainMenu;

    loop {
        let frame_start = Instant::now();
        let input = drain_input(rx);
        let now = epoch.elapsed();

        match engine::route_screen_input(screen, &state, &input, now) {
            ScreenStep::Stay => {}
            ScreenStep::Play => screen = Screen::Gameplay,
            ScreenStep::Restart(fresh) => {
                state = fresh;
                screen = Screen::Gameplay;
            }
            ScreenStep::BackToMenu(fresh) => {
                state = fresh;
                screen = Screen::MainMenu;
            }
            ScreenStep::Exit => break,
        }

        if screen == Screen::Gameplay {
            let (next, next_screen) = engine.update(&state, &input, now, &mut rng);
            state = next;
            screen = next_screen;
        }

        display::render(out, &state, screen)?;

        let elapsed = frame_start.elapsed();
        if elapsed < FRAME {
            thread::sleep(FRAME - elapsed);
        }
    }
    Ok(())
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> std::io::Result<()> {
    env_logger::init();

    let raw_out = stdout();
    let mut out = BufWriter::new(raw_out);

    terminal::enable_raw_mode()?;
    out.execute(terminal::EnterAlternateScreen)?;
    out.execute(cursor::Hide)?;

    // Dedicate a thread exclusively to blocking event reads, sending them
    // through a channel so the game loop never has to block on I/O.
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

    let result = run(&mut out, &rx);

    // Always restore the terminal
    let _ = out.execute(cursor::Show);
    let _ = out.execute(terminal::LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();

    result
}
