/// Pure game-logic functions.
///
/// Every public function takes an immutable reference to the current
/// `GameState` (plus a clock reading and, where needed, an RNG handle) and
/// returns a brand-new `GameState`.  The only mutable piece is `Engine`,
/// which owns the shared enemy-step timer.
///
/// The clock is injected as a `Duration` since an arbitrary epoch and all
/// randomness comes through `rng`, so callers control determinism (tests use
/// fabricated timestamps and a seeded RNG).

use std::time::Duration;

use log::{debug, info};
use rand::Rng;

use crate::entities::{Direction, Enemy, FrameInput, GameState, Player, Position, Screen};

// ── Balance constants ────────────────────────────────────────────────────────

pub const MAP_WIDTH: i32 = 20;
pub const MAP_HEIGHT: i32 = 20;

/// Concurrent enemy cap.
pub const MAX_ENEMIES: usize = 5;

/// Enemy movements per second — one shared lock-step cadence for the whole
/// pack, not a per-enemy timer.
pub const ENEMY_SPEED: u32 = 5;
pub const ENEMY_STEP_INTERVAL: Duration = Duration::from_millis(1000 / ENEMY_SPEED as u64);

/// Chebyshev half-width of the spawn square around the player; reused as the
/// pursuit aggro range.
pub const SPAWN_DISTANCE: i32 = 2;

/// Upper bound (seconds) of the spawn interval, redrawn uniformly from
/// `[1, max]` on every check.
pub const SPAWN_INTERVAL_MAX_SECS: u64 = 30;

pub const PLAYER_START_HEALTH: u32 = 20;
pub const ENEMY_START_HEALTH: u32 = 5;

/// Melee reach in Chebyshev distance — the 3×3 block around the player.
pub const ATTACK_RANGE: i32 = 1;

/// Minimum wall-clock gap between two melee swings.
pub const ATTACK_COOLDOWN: Duration = Duration::from_secs(1);

/// Ticks of contact immunity granted per hit (≈1 s at the 60 Hz frame rate).
pub const IMMUNITY_TICKS: u32 = 60;

// ── Constructors ─────────────────────────────────────────────────────────────

/// Build the state at process start: full health, player at the origin, no
/// enemies.  `now` seeds both cooldown timestamps so neither gate fires on
/// the very first tick.  Run resets after a game over go through
/// `reset_run` instead.
pub fn init_state(now: Duration) -> GameState {
    GameState {
        player: Player {
            pos: Position::new(0, 0),
            health: PLAYER_START_HEALTH,
            immunity: 0,
            last_attack: now,
        },
        enemies: Vec::new(),
        last_spawn: now,
    }
}

/// Reset an ended run for the restart and back-to-menu transitions: full
/// health, player at the origin, no enemies, spawn timer re-seeded.  The
/// attack cooldown is the one timestamp that carries over from the ended
/// run.
pub fn reset_run(state: &GameState, now: Duration) -> GameState {
    GameState {
        player: Player {
            pos: Position::new(0, 0),
            health: PLAYER_START_HEALTH,
            immunity: 0,
            last_attack: state.player.last_attack,
        },
        enemies: Vec::new(),
        last_spawn: now,
    }
}

// ── Input-driven state transitions (pure) ────────────────────────────────────

/// Move the player one tile, clamped to the map.
pub fn move_player(state: &GameState, dir: Direction) -> GameState {
    let (dx, dy) = dir.delta();
    let pos = Position::new(
        (state.player.pos.x + dx).clamp(0, MAP_WIDTH - 1),
        (state.player.pos.y + dy).clamp(0, MAP_HEIGHT - 1),
    );
    GameState {
        player: Player {
            pos,
            ..state.player.clone()
        },
        ..state.clone()
    }
}

/// Swing at everything within melee reach.
///
/// Gated by `ATTACK_COOLDOWN` of wall-clock time since the previous
/// successful swing; a gated press is a complete no-op and leaves the
/// cooldown timestamp untouched.  A swing that passes the gate updates the
/// timestamp even when it hits nothing.
pub fn attack(state: &GameState, now: Duration) -> GameState {
    if now.saturating_sub(state.player.last_attack) < ATTACK_COOLDOWN {
        return state.clone();
    }

    let mut next = state.clone();
    let player_pos = next.player.pos;
    let mut i = 0;
    while i < next.enemies.len() {
        if player_pos.chebyshev(&next.enemies[i].pos) <= ATTACK_RANGE {
            next.enemies[i].health = next.enemies[i].health.saturating_sub(1);
            debug!(
                "attack hit enemy at ({}, {}), health now {}",
                next.enemies[i].pos.x, next.enemies[i].pos.y, next.enemies[i].health
            );
            if next.enemies[i].health == 0 {
                next.enemies.swap_remove(i);
                info!("enemy defeated, {} remaining", next.enemies.len());
                // The swapped-in enemy still needs its range check.
                continue;
            }
        }
        i += 1;
    }
    next.player.last_attack = now;
    next
}

/// Resolve this tick's gameplay input to at most one action.  Directional
/// presses win over attack, in up/down/left/right priority order.
pub fn apply_input(state: &GameState, input: &FrameInput, now: Duration) -> GameState {
    if input.up {
        move_player(state, Direction::Up)
    } else if input.down {
        move_player(state, Direction::Down)
    } else if input.left {
        move_player(state, Direction::Left)
    } else if input.right {
        move_player(state, Direction::Right)
    } else if input.attack {
        attack(state, now)
    } else {
        state.clone()
    }
}

// ── Enemy AI ─────────────────────────────────────────────────────────────────

/// One lock-step movement pass over every enemy: pursuit inside aggro range,
/// uniform roaming outside.  Steps clamp to the map; enemies may overlap
/// each other.  Cadence gating lives in `Engine`.
pub fn step_enemies(state: &GameState, rng: &mut impl Rng) -> GameState {
    let mut next = state.clone();
    let player_pos = next.player.pos;
    for enemy in &mut next.enemies {
        let dir = if player_pos.chebyshev(&enemy.pos) <= SPAWN_DISTANCE {
            pursuit_step(player_pos, enemy.pos)
        } else {
            Some(Direction::ALL[rng.gen_range(0..Direction::ALL.len())])
        };
        if let Some(dir) = dir {
            let (dx, dy) = dir.delta();
            enemy.pos.x = (enemy.pos.x + dx).clamp(0, MAP_WIDTH - 1);
            enemy.pos.y = (enemy.pos.y + dy).clamp(0, MAP_HEIGHT - 1);
        }
    }
    next
}

/// Greedy axis-priority chase: close the x gap first, then y.  An enemy
/// already on the player's tile holds position.
fn pursuit_step(player: Position, enemy: Position) -> Option<Direction> {
    if player.x < enemy.x {
        Some(Direction::Left)
    } else if player.x > enemy.x {
        Some(Direction::Right)
    } else if player.y < enemy.y {
        Some(Direction::Up)
    } else if player.y > enemy.y {
        Some(Direction::Down)
    } else {
        None
    }
}

// ── Collision & damage ───────────────────────────────────────────────────────

/// Apply contact damage for every enemy sharing the player's tile.
///
/// The first unblocked hit raises the immunity counter, so further
/// co-located enemies this tick deal nothing.  Returns the updated state and
/// whether the player was defeated.
pub fn resolve_contact(state: &GameState) -> (GameState, bool) {
    let mut next = state.clone();
    let mut defeated = false;
    for i in 0..next.enemies.len() {
        if next.enemies[i].pos == next.player.pos && next.player.immunity == 0 {
            next.player.health = next.player.health.saturating_sub(1);
            next.player.immunity = IMMUNITY_TICKS;
            info!("enemy contact, player health now {}", next.player.health);
            if next.player.health == 0 {
                defeated = true;
            }
        }
    }
    (next, defeated)
}

/// Tick the contact-immunity window down by one.
pub fn decay_immunity(state: &GameState) -> GameState {
    let mut next = state.clone();
    if next.player.immunity > 0 {
        next.player.immunity -= 1;
    }
    next
}

// ── Spawning ─────────────────────────────────────────────────────────────────

/// Interval-gated spawn check.
///
/// Each call draws a fresh uniform threshold in `[1, SPAWN_INTERVAL_MAX_SECS]`
/// seconds; once the elapsed time clears it, the timer resets — even when the
/// spawn itself is skipped because the pack is at `MAX_ENEMIES`.
pub fn try_spawn(state: &GameState, now: Duration, rng: &mut impl Rng) -> GameState {
    let threshold = Duration::from_secs(rng.gen_range(1..=SPAWN_INTERVAL_MAX_SECS));
    if now.saturating_sub(state.last_spawn) < threshold {
        return state.clone();
    }

    let mut next = state.clone();
    next.last_spawn = now;
    if next.enemies.len() >= MAX_ENEMIES {
        return next;
    }

    let pos = spawn_position(next.player.pos, rng);
    next.enemies.push(Enemy {
        pos,
        health: ENEMY_START_HEALTH,
    });
    info!(
        "enemy spawned at ({}, {}), {} active",
        pos.x,
        pos.y,
        next.enemies.len()
    );
    next
}

/// Uniform rejection sampling inside the spawn square: resample while the
/// candidate sits on the player's exact tile or off the map.
pub fn spawn_position(player: Position, rng: &mut impl Rng) -> Position {
    loop {
        let pos = Position::new(
            player.x + rng.gen_range(-SPAWN_DISTANCE..=SPAWN_DISTANCE),
            player.y + rng.gen_range(-SPAWN_DISTANCE..=SPAWN_DISTANCE),
        );
        if pos != player && in_bounds(pos) {
            return pos;
        }
    }
}

pub fn in_bounds(pos: Position) -> bool {
    (0..MAP_WIDTH).contains(&pos.x) && (0..MAP_HEIGHT).contains(&pos.y)
}

// ── Screen state machine ─────────────────────────────────────────────────────

/// What the host loop should do after routing one tick of input through the
/// current screen's bindings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ScreenStep {
    /// No binding matched; keep showing the current screen.
    Stay,
    /// Main menu → gameplay, current run state untouched.
    Play,
    /// Game over → gameplay with a fresh run.
    Restart(GameState),
    /// Game over → main menu, run reset for the next start.
    BackToMenu(GameState),
    /// The player asked to leave the program.
    Exit,
}

/// Menu and game-over key routing.  Gameplay input never reaches here — the
/// engine consumes it (`Engine::update`), and the gameplay → game-over
/// transition happens inside damage resolution, not on a key.
pub fn route_screen_input(
    screen: Screen,
    state: &GameState,
    input: &FrameInput,
    now: Duration,
) -> ScreenStep {
    match screen {
        Screen::MainMenu if input.start => {
            info!("run started");
            ScreenStep::Play
        }
        Screen::MainMenu if input.quit => ScreenStep::Exit,
        Screen::GameOver if input.restart => {
            info!("run restarted");
            ScreenStep::Restart(reset_run(state, now))
        }
        Screen::GameOver if input.menu => {
            info!("back to menu");
            ScreenStep::BackToMenu(reset_run(state, now))
        }
        Screen::GameOver if input.quit => ScreenStep::Exit,
        _ => ScreenStep::Stay,
    }
}

// ── Tick orchestration ───────────────────────────────────────────────────────

/// Owner of the shared enemy-step timer.  One instance lives for the whole
/// process; a run reset does not rewind the cadence.
#[derive(Clone, Debug)]
pub struct Engine {
    last_enemy_step: Duration,
}

impl Engine {
    pub fn new(now: Duration) -> Self {
        Self {
            last_enemy_step: now,
        }
    }

    /// Advance one gameplay tick: input, enemy movement on its cadence,
    /// contact damage, immunity decay, spawn check — in that order.  The
    /// order is load-bearing: collision runs after movement, so an enemy
    /// stepping onto the player is caught the same tick.
    pub fn update(
        &mut self,
        state: &GameState,
        input: &FrameInput,
        now: Duration,
        rng: &mut impl Rng,
    ) -> (GameState, Screen) {
        let mut next = apply_input(state, input, now);

        if now.saturating_sub(self.last_enemy_step) >= ENEMY_STEP_INTERVAL {
            next = step_enemies(&next, rng);
            self.last_enemy_step = now;
        }

        let (next, defeated) = resolve_contact(&next);
        let next = decay_immunity(&next);
        let next = try_spawn(&next, now, rng);

        let screen = if defeated {
            info!("player defeated");
            Screen::GameOver
        } else {
            Screen::Gameplay
        };
        (next, screen)
    }
}
