//! Horde Arena headless runner
//!
//! Plays one seeded session with a scripted mover and an auto-picking
//! upgrade policy, then reports the outcome through the log.
//!
//! Usage: `horde-arena [TUNING_JSON] [--seed N] [--seconds S]`

use std::collections::HashSet;

use anyhow::{Context, Result, bail};

use horde_arena::Tuning;
use horde_arena::consts::SIM_DT;
use horde_arena::progression::{UpgradeGroup, UpgradeKind};
use horde_arena::render::{Renderer, WorldPainter};
use horde_arena::sim::{FixedStep, GamePhase, GameState, SimEvent, TickInput};

/// Counts draw calls instead of drawing
#[derive(Default)]
struct LogRenderer {
    animations: HashSet<String>,
    draws: usize,
    placeholders: usize,
}

impl Renderer for LogRenderer {
    fn has_animation(&self, name: &str) -> bool {
        self.animations.contains(name)
    }
    fn draw_animation(&mut self, _name: &str, _x: f32, _y: f32, _w: f32, _h: f32) {
        self.draws += 1;
    }
    fn reset_animation(&mut self, name: &str) {
        log::trace!("reset animation {name}");
    }
    fn is_animation_finished(&self, _name: &str) -> bool {
        false
    }
    fn draw_texture(&mut self, _name: &str, _x: f32, _y: f32, _w: f32, _h: f32) {
        self.draws += 1;
    }
    fn draw_rect(&mut self, _x: f32, _y: f32, _w: f32, _h: f32) {
        self.placeholders += 1;
    }
    fn set_color(&mut self, _rgba: [f32; 4]) {}
}

struct Args {
    tuning: Option<String>,
    seed: u64,
    seconds: f32,
}

fn parse_args() -> Result<Args> {
    let mut args = Args {
        tuning: None,
        seed: 0x5EED,
        seconds: 300.0,
    };
    let mut it = std::env::args().skip(1);
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--seed" => {
                let value = it.next().context("--seed needs a value")?;
                args.seed = value.parse().with_context(|| format!("bad seed '{value}'"))?;
            }
            "--seconds" => {
                let value = it.next().context("--seconds needs a value")?;
                args.seconds = value
                    .parse()
                    .with_context(|| format!("bad duration '{value}'"))?;
            }
            flag if flag.starts_with("--") => bail!("unknown flag {flag}"),
            path => args.tuning = Some(path.to_string()),
        }
    }
    Ok(args)
}

fn load_tuning(path: Option<&str>) -> Result<Tuning> {
    let Some(path) = path else {
        return Ok(Tuning::default());
    };
    let json = std::fs::read_to_string(path).with_context(|| format!("reading {path}"))?;
    let tuning = Tuning::from_json(&json).with_context(|| format!("parsing {path}"))?;
    log::info!("loaded tuning from {path}");
    Ok(tuning)
}

/// Weapon first, then passives that are already owned, then anything offered
fn pick_upgrade(state: &GameState, choices: &[UpgradeKind]) -> Option<UpgradeKind> {
    choices
        .iter()
        .copied()
        .max_by_key(|&kind| match kind {
            UpgradeKind::Weapon => 3,
            k if k.is_passive() && state.ledger.owns(k) => 2,
            k if k.is_passive() => 1,
            _ => 0,
        })
}

/// Walk in a slow square so the swarm has to keep turning
fn scripted_input(ticks: u64) -> TickInput {
    let leg = (ticks / 180) % 4;
    TickInput {
        right: leg == 0,
        up: leg == 1,
        left: leg == 2,
        down: leg == 3,
        pause: false,
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let args = parse_args()?;
    let tuning = load_tuning(args.tuning.as_deref())?;
    let mut state = GameState::new(args.seed, tuning)?;

    let mut renderer = LogRenderer::default();
    renderer.animations.extend(
        ["player_walk", "bat_walk", "skeleton_walk"]
            .iter()
            .map(|s| s.to_string()),
    );
    let mut painter = WorldPainter::new();
    let mut stepper = FixedStep::new();

    let mut kills = 0u32;
    let mut damage_taken = 0.0f32;
    let total_ticks = (args.seconds / SIM_DT).ceil() as u64;

    while state.time_ticks < total_ticks && state.phase != GamePhase::GameOver {
        let mut input = scripted_input(state.time_ticks);
        stepper.advance(&mut state, &mut input, SIM_DT)?;

        while state.pending_level_ups > 0 {
            let choices = state.upgrade_choices(3);
            let Some(kind) = pick_upgrade(&state, &choices) else {
                // Everything maxed
                state.pending_level_ups = 0;
                break;
            };
            if state.apply_upgrade(kind) {
                log::debug!("picked {} -> {}", kind.as_str(), state.ledger.level(kind));
            }
        }

        for event in state.drain_events() {
            match event {
                SimEvent::EnemyKilled { .. } => kills += 1,
                SimEvent::PlayerDamaged { amount, .. } => damage_taken += amount,
                _ => {}
            }
        }

        if state.time_ticks % 600 == 0 {
            painter.paint(&mut renderer, &state, state.player.pos);
            log::info!(
                "t={:.0}s level={} hp={:.0}/{:.0} enemies={} draws={} placeholders={}",
                state.elapsed,
                state.player.level,
                state.player.health(),
                state.player.max_health(),
                state.swarm.alive_count(),
                renderer.draws,
                renderer.placeholders
            );
        }
    }

    let outcome = if state.phase == GamePhase::GameOver {
        "died"
    } else {
        "survived"
    };
    log::info!(
        "seed {} {} after {:.1}s: level {}, {} kills, {:.0} damage taken, weapon {}{}",
        state.seed(),
        outcome,
        state.elapsed,
        state.player.level,
        kills,
        damage_taken,
        state.ledger.level(UpgradeKind::Weapon),
        if state.weapon.is_evolved() { " (evolved)" } else { "" }
    );
    for group in [UpgradeGroup::Passive, UpgradeGroup::Stat] {
        for owned in state.ledger.levels_in(group).filter(|l| l.level() > 0) {
            log::info!(
                "  {:<12} {}/{}",
                owned.kind.as_str(),
                owned.level(),
                owned.kind.max_level()
            );
        }
    }
    Ok(())
}
