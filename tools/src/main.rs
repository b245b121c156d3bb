//! tick-runner: headless weekly tick runner for a world snapshot.
//!
//! Usage:
//!   tick-runner --scenario data/scenarios/channel_crisis.json --weeks 52
//!   tick-runner --scenario world.json --seed 7 --config balance.json --out next.json
//!   tick-runner --scenario world.json --ipc-mode

use anyhow::Result;
use chrono::Utc;
use statecraft_core::{
    config::SimConfig,
    effect::ActionEffect,
    snapshot::{ensure_player_nation, load_world, save_world},
    state::WorldState,
    types::{TurnIndex, TurnSeed},
    TickEngine,
};
use std::collections::BTreeMap;
use std::env;
use std::io::{self, BufRead, Write};

#[derive(serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum IpcCommand {
    GetState,
    Tick { count: u64 },
    Quit,
}

#[derive(serde::Serialize)]
struct IpcReply<'a> {
    turn_index: TurnIndex,
    effects:    &'a [ActionEffect],
    state:      &'a WorldState,
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let weeks = parse_arg(&args, "--weeks", 52u64);
    let ipc_mode = args.iter().any(|a| a == "--ipc-mode");
    let scenario = flag_value(&args, "--scenario").unwrap_or("data/scenarios/channel_crisis.json");
    let config_path = flag_value(&args, "--config");
    let out_path = flag_value(&args, "--out");

    let config = match config_path {
        Some(path) => SimConfig::load(path)?,
        None => SimConfig::default(),
    };

    let mut state = load_world(scenario)?;
    ensure_player_nation(&state)?;
    if let Some(seed) = flag_value(&args, "--seed").and_then(|s| s.parse::<TurnSeed>().ok()) {
        state.turn_seed = seed;
    }

    let engine = TickEngine::build(&config);

    if ipc_mode {
        run_ipc_loop(&engine, state)?;
        return Ok(());
    }

    println!("tick-runner");
    println!("  scenario:  {scenario}");
    println!("  seed:      {}", state.turn_seed);
    println!("  weeks:     {weeks}");
    println!("  config:    {}", config_path.unwrap_or("(defaults)"));
    println!();

    let start_turn = state.turn_index;
    let outcome = engine.run_weeks(&state, weeks, Utc::now());
    print_summary(&outcome.next_state, &outcome.effects, start_turn);

    if let Some(path) = out_path {
        save_world(path, &outcome.next_state)?;
        println!();
        println!("  snapshot written to {path}");
    }
    Ok(())
}

/// One JSON command per stdin line, one JSON reply per stdout line.
fn run_ipc_loop(engine: &TickEngine, mut state: WorldState) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut handle = stdin.lock();
    let mut buffer = String::new();

    loop {
        buffer.clear();
        if handle.read_line(&mut buffer)? == 0 {
            break; // EOF
        }

        let cmd: IpcCommand = match serde_json::from_str(&buffer) {
            Ok(c) => c,
            Err(e) => {
                log::warn!("Unreadable command: {}", buffer.trim_end());
                let err_json = serde_json::json!({ "error": e.to_string() });
                writeln!(stdout, "{err_json}")?;
                stdout.flush()?;
                continue;
            }
        };

        let effects = match cmd {
            IpcCommand::Quit => break,
            IpcCommand::GetState => Vec::new(),
            IpcCommand::Tick { count } => {
                let outcome = engine.run_weeks(&state, count, Utc::now());
                state = outcome.next_state;
                outcome.effects
            }
        };
        let reply = IpcReply {
            turn_index: state.turn_index,
            effects:    &effects,
            state:      &state,
        };
        writeln!(stdout, "{}", serde_json::to_string(&reply)?)?;
        stdout.flush()?;
    }
    Ok(())
}

fn print_summary(state: &WorldState, effects: &[ActionEffect], start_turn: TurnIndex) {
    println!("=== RUN SUMMARY ===");
    println!("  turns:          {} -> {}", start_turn, state.turn_index);
    println!("  player:         {}", state.player_nation_id);
    println!("  operations:     {} still queued", state.operations.len());
    println!("  modifiers:      {} active", state.trajectory_modifiers.len());
    println!("  relations:      {} edges", state.relations.len());

    println!();
    println!("=== NATIONS ===");
    for (id, n) in &state.nations {
        let marker = if state.is_player(id) { '*' } else { ' ' };
        println!(
            "{marker} {id:<12} | GDP: {:>14.0} | Treasury: {:>10} | Stab: {:>5.1} | Legit: {:>5.1} | Force: {:>7}",
            n.gdp, n.treasury, n.stability, n.legitimacy, n.force_size
        );
    }

    let mut histogram: BTreeMap<&str, usize> = BTreeMap::new();
    for effect in effects {
        *histogram.entry(effect.effect_type.as_str()).or_default() += 1;
    }
    println!();
    println!("=== EFFECTS ({}) ===", effects.len());
    for (effect_type, count) in histogram {
        println!("  {effect_type:<36} {count}");
    }
}

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2).find(|w| w[0] == flag).map(|w| w[1].as_str())
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    flag_value(args, flag)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
