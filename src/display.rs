/// Rendering layer — all terminal I/O lives here.
///
/// Each function receives a mutable writer and an immutable view of the
/// game state.  No game logic is performed; this module only translates
/// state into terminal commands.

use std::io::Write;

use crossterm::{
    cursor,
    style::{self, Color, Print},
    terminal,
    QueueableCommand,
};
use gridfall::engine::{MAP_HEIGHT, MAP_WIDTH};
use gridfall::entities::{Enemy, GameState, Screen};

// ── Colour palette ────────────────────────────────────────────────────────────

const C_BORDER: Color = Color::DarkBlue;
const C_HUD_HEALTH: Color = Color::Green;
const C_PLAYER: Color = Color::Blue;
const C_ENEMY: Color = Color::Red;
const C_ENEMY_HEALTH: Color = Color::Yellow;
const C_TITLE: Color = Color::Cyan;
const C_TEXT: Color = Color::White;
const C_HINT: Color = Color::DarkGrey;

// ── Layout ────────────────────────────────────────────────────────────────────

/// Each tile is two columns wide so the map is roughly square in a terminal.
const TILE_W: u16 = 2;
/// First column inside the border frame.
const GRID_LEFT: u16 = 1;
/// First row inside the border frame (row 0 is the HUD).
const GRID_TOP: u16 = 2;

// ── Public entry point ────────────────────────────────────────────────────────

/// Render one complete frame for the current screen.
pub fn render<W: Write>(out: &mut W, state: &GameState, screen: Screen) -> std::io::Result<()> {
    out.queue(terminal::Clear(terminal::ClearType::All))?;

    match screen {
        Screen::MainMenu => draw_menu(out)?,
        Screen::Gameplay => {
            draw_hud(out, state)?;
            draw_border(out)?;
            for enemy in &state.enemies {
                draw_enemy(out, enemy)?;
            }
            draw_player(out, state)?;
            draw_controls_hint(out)?;
        }
        Screen::GameOver => draw_game_over(out)?,
    }

    // Park cursor in a harmless spot and flush
    out.queue(style::ResetColor)?;
    out.queue(cursor::MoveTo(0, GRID_TOP + MAP_HEIGHT as u16 + 2))?;
    out.flush()?;
    Ok(())
}

// ── Centred text helper ───────────────────────────────────────────────────────

/// Print `msg` centred on terminal row `row`; width is measured in chars.
fn print_centered<W: Write>(out: &mut W, msg: &str, row: u16, color: Color) -> std::io::Result<()> {
    let (width, _) = terminal::size()?;
    let col = (width / 2).saturating_sub(msg.chars().count() as u16 / 2);
    out.queue(cursor::MoveTo(col, row))?;
    out.queue(style::SetForegroundColor(color))?;
    out.queue(Print(msg))?;
    Ok(())
}

// ── Main menu ─────────────────────────────────────────────────────────────────

fn draw_menu<W: Write>(out: &mut W) -> std::io::Result<()> {
    let (_, height) = terminal::size()?;
    let cy = height / 2;

    print_centered(out, "★  G R I D F A L L  ★", cy.saturating_sub(4), C_TITLE)?;
    print_centered(out, "Press ENTER to start", cy.saturating_sub(1), C_TEXT)?;
    print_centered(out, "Press ESC to quit", cy + 1, C_HINT)?;
    Ok(())
}

// ── HUD (row 0) ───────────────────────────────────────────────────────────────

fn draw_hud<W: Write>(out: &mut W, state: &GameState) -> std::io::Result<()> {
    // Player health bar — one block per health point
    out.queue(cursor::MoveTo(GRID_LEFT, 0))?;
    out.queue(style::SetForegroundColor(C_HUD_HEALTH))?;
    out.queue(Print("█".repeat(state.player.health as usize)))?;
    Ok(())
}

// ── Border ────────────────────────────────────────────────────────────────────

fn draw_border<W: Write>(out: &mut W) -> std::io::Result<()> {
    let inner = MAP_WIDTH as usize * TILE_W as usize;
    let right = GRID_LEFT + MAP_WIDTH as u16 * TILE_W;
    let bottom = GRID_TOP + MAP_HEIGHT as u16;

    out.queue(style::SetForegroundColor(C_BORDER))?;

    out.queue(cursor::MoveTo(GRID_LEFT - 1, GRID_TOP - 1))?;
    out.queue(Print(format!("┌{}┐", "─".repeat(inner))))?;

    out.queue(cursor::MoveTo(GRID_LEFT - 1, bottom))?;
    out.queue(Print(format!("└{}┘", "─".repeat(inner))))?;

    for row in GRID_TOP..bottom {
        out.queue(cursor::MoveTo(GRID_LEFT - 1, row))?;
        out.queue(Print("│"))?;
        out.queue(cursor::MoveTo(right, row))?;
        out.queue(Print("│"))?;
    }

    Ok(())
}

// ── Entities ──────────────────────────────────────────────────────────────────

fn tile_origin(x: i32, y: i32) -> (u16, u16) {
    (GRID_LEFT + x as u16 * TILE_W, GRID_TOP + y as u16)
}

fn draw_player<W: Write>(out: &mut W, state: &GameState) -> std::io::Result<()> {
    let (col, row) = tile_origin(state.player.pos.x, state.player.pos.y);
    out.queue(cursor::MoveTo(col, row))?;
    out.queue(style::SetForegroundColor(C_PLAYER))?;
    out.queue(Print("██"))?;
    Ok(())
}

fn draw_enemy<W: Write>(out: &mut W, enemy: &Enemy) -> std::io::Result<()> {
    let (col, row) = tile_origin(enemy.pos.x, enemy.pos.y);
    out.queue(cursor::MoveTo(col, row))?;
    out.queue(style::SetForegroundColor(C_ENEMY))?;
    out.queue(Print("██"))?;

    // Health pips in the row above, like a tiny health bar
    if enemy.pos.y > 0 {
        out.queue(cursor::MoveTo(col, row - 1))?;
        out.queue(style::SetForegroundColor(C_ENEMY_HEALTH))?;
        out.queue(Print("▪".repeat(enemy.health as usize)))?;
    }
    Ok(())
}

// ── Controls hint (below the grid) ────────────────────────────────────────────

fn draw_controls_hint<W: Write>(out: &mut W) -> std::io::Result<()> {
    out.queue(cursor::MoveTo(GRID_LEFT, GRID_TOP + MAP_HEIGHT as u16 + 1))?;
    out.queue(style::SetForegroundColor(C_HINT))?;
    out.queue(Print("↑ ↓ ← → : Move   SPACE : Attack"))?;
    Ok(())
}

// ── Game-over screen ──────────────────────────────────────────────────────────

fn draw_game_over<W: Write>(out: &mut W) -> std::io::Result<()> {
    let (_, height) = terminal::size()?;
    let cy = height / 2;

    let lines: &[&str] = &[
        "╔════════════════════╗",
        "║     GAME  OVER     ║",
        "╚════════════════════╝",
    ];
    for (i, msg) in lines.iter().enumerate() {
        print_centered(out, msg, cy.saturating_sub(3) + i as u16, Color::Red)?;
    }

    print_centered(out, "R - Restart", cy + 1, C_TEXT)?;
    print_centered(out, "M - Main menu", cy + 2, C_TEXT)?;
    print_centered(out, "Q - Quit", cy + 3, C_HINT)?;
    Ok(())
}
