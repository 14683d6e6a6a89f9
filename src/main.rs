//! Raid Defense headless runner
//!
//! Runs a session at the fixed timestep without a renderer, printing wave
//! banners and a summary. The autopilot plays unless `--manual` is given.
//!
//! Usage:
//!   RUST_LOG=info cargo run --release -- --seed 42
//!   cargo run -- --waves waves.json --tuning tuning.json --max-seconds 300

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use raid_defense::consts::*;
use raid_defense::sim::{
    GameEvent, GameState, TickInput, TickOutcome, default_campaign, load_waves, tick,
};
use raid_defense::{ConfigError, Tuning};

#[derive(Parser)]
#[command(name = "raid-defense")]
#[command(about = "Run a castle defense session headless at a fixed timestep")]
struct Args {
    /// Run seed
    #[arg(long, default_value_t = 1)]
    seed: u64,

    /// JSON wave list (defaults to the built-in campaign)
    #[arg(long)]
    waves: Option<PathBuf>,

    /// JSON tuning overrides
    #[arg(long)]
    tuning: Option<PathBuf>,

    /// Stop after this much simulated time
    #[arg(long, default_value_t = 600.0)]
    max_seconds: f32,

    /// Disable the autopilot (nobody fires)
    #[arg(long)]
    manual: bool,

    /// Host frame length in seconds, fed through the fixed-step accumulator
    #[arg(long, default_value_t = 1.0 / 30.0)]
    frame: f32,

    /// Print the final snapshot as JSON
    #[arg(long)]
    json: bool,
}

/// Session driver holding the state and the timestep accumulator
struct Session {
    state: GameState,
    input: TickInput,
    accumulator: f32,
    outcome: TickOutcome,
    kills: u32,
    escapes: u32,
}

impl Session {
    fn new(state: GameState, autopilot: bool) -> Self {
        Self {
            state,
            input: TickInput {
                commands: Vec::new(),
                autopilot,
            },
            accumulator: 0.0,
            outcome: TickOutcome::Running,
            kills: 0,
            escapes: 0,
        }
    }

    /// Run as many fixed ticks as `dt` covers
    fn update(&mut self, dt: f32) {
        let dt = dt.min(0.1);
        self.accumulator += dt;

        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            self.outcome = tick(&mut self.state, &self.input, SIM_DT);
            self.accumulator -= SIM_DT;
            substeps += 1;

            // Commands are one-shot
            self.input.commands.clear();
            self.report_events();

            if matches!(self.outcome, TickOutcome::DefenseFailed | TickOutcome::Cleared) {
                break;
            }
        }
    }

    fn report_events(&mut self) {
        for event in self.state.drain_events() {
            match event {
                GameEvent::WaveStarted { index, name } => {
                    println!(
                        "[{:>6.1}s] Wave {}/{}: {}",
                        self.state.elapsed,
                        index + 1,
                        self.state.scheduler.wave_count(),
                        name
                    );
                }
                GameEvent::EnemyKilled { .. } => self.kills += 1,
                GameEvent::EnemyEscaped { .. } => self.escapes += 1,
                GameEvent::DefenseFailed => {
                    println!("[{:>6.1}s] The castle has fallen", self.state.elapsed);
                }
                GameEvent::AllWavesCleared => {
                    println!("[{:>6.1}s] All waves cleared", self.state.elapsed);
                }
                _ => {}
            }
        }
    }

    fn finished(&self) -> bool {
        matches!(self.outcome, TickOutcome::DefenseFailed | TickOutcome::Cleared)
    }
}

fn run(args: &Args) -> Result<Session, ConfigError> {
    let tuning = match &args.tuning {
        Some(path) => Tuning::load(path)?,
        None => Tuning::default(),
    };
    let waves = match &args.waves {
        Some(path) => load_waves(path)?,
        None => default_campaign(),
    };
    log::info!(
        "Starting session: seed {}, {} waves, autopilot {}",
        args.seed,
        waves.len(),
        if args.manual { "off" } else { "on" }
    );

    let mut session = Session::new(GameState::with_config(args.seed, tuning, waves), !args.manual);
    session.report_events();

    let frame = args.frame.max(SIM_DT);
    while !session.finished() && session.state.elapsed < args.max_seconds {
        session.update(frame);
    }
    Ok(session)
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();

    let session = match run(&args) {
        Ok(session) => session,
        Err(e) => {
            log::error!("{e}");
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };

    let snapshot = session.state.snapshot();
    println!();
    println!("=== SESSION SUMMARY ===");
    println!("  Seed:       {}", args.seed);
    println!("  Outcome:    {:?}", session.outcome);
    println!("  Time:       {:.1}s ({} ticks)", snapshot.elapsed, snapshot.tick);
    println!(
        "  Wave:       {}/{}",
        (snapshot.wave_index + 1).min(snapshot.wave_count as u32),
        snapshot.wave_count
    );
    println!(
        "  Structure:  {}/{}",
        snapshot.ledger.structure_health, snapshot.ledger.structure_max
    );
    println!("  Kills:      {}", session.kills);
    println!("  Escaped:    {}", session.escapes);
    println!("  Currency:   {}", snapshot.ledger.kill_currency);
    println!(
        "  Stock:      {} normal, {} explosive, {} triple",
        snapshot.ledger.stock.normal, snapshot.ledger.stock.explosive, snapshot.ledger.stock.triple_shot
    );
    log::info!("Session ended: {:?}", session.outcome);

    if args.json {
        match serde_json::to_string_pretty(&snapshot) {
            Ok(json) => println!("{json}"),
            Err(e) => log::error!("Failed to serialise snapshot: {e}"),
        }
    }
    ExitCode::SUCCESS
}
