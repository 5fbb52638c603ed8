//! Headless raid driver.
//!
//! Loads a base layout from a JSON file (or falls back to the demo
//! base), replays the scripted demo deployment against it, and prints
//! battle events and the final result as JSON lines.

use std::env;
use std::fs;
use std::process::ExitCode;

use rampart_core::commands::PlayerCommand;
use rampart_core::constants::{DT, ENDING_GRACE_SECS, RAID_TIME_LIMIT_SECS};
use rampart_core::enums::RaidPhase;
use rampart_core::state::RaidSnapshot;
use rampart_sim::engine::RaidEngine;
use rampart_sim::scenario::{self, BaseLayout, DeployEntry, RaidConfig};

fn main() -> ExitCode {
    let layout = match env::args().nth(1) {
        Some(path) => match load_layout(&path) {
            Ok(layout) => layout,
            Err(err) => {
                eprintln!("failed to load layout {path}: {err}");
                return ExitCode::FAILURE;
            }
        },
        None => scenario::demo_base(),
    };

    let config = RaidConfig {
        layout,
        ..RaidConfig::demo()
    };
    let plan = scenario::demo_deploy_plan(&config.army);
    let engine = match RaidEngine::new(config) {
        Ok(engine) => engine,
        Err(err) => {
            eprintln!("raid setup failed: {err}");
            return ExitCode::FAILURE;
        }
    };

    let last = run_raid(engine, &plan, true);
    if let Some(result) = last.result {
        match serde_json::to_string(&result) {
            Ok(json) => println!("{json}"),
            Err(err) => eprintln!("failed to serialize result: {err}"),
        }
    }
    ExitCode::SUCCESS
}

fn load_layout(path: &str) -> Result<BaseLayout, String> {
    let text = fs::read_to_string(path).map_err(|e| e.to_string())?;
    serde_json::from_str(&text).map_err(|e| e.to_string())
}

/// Drive one raid to completion. Returns the final snapshot.
fn run_raid(mut engine: RaidEngine, plan: &[DeployEntry], print_events: bool) -> RaidSnapshot {
    engine.queue_command(PlayerCommand::StartRaid);

    // Hard stop a little past the raid's own time limit.
    let max_ticks = ((RAID_TIME_LIMIT_SECS + 2.0 * ENDING_GRACE_SECS) / DT) as u64;
    let mut last = RaidSnapshot::default();
    for tick in 0..max_ticks {
        for entry in plan.iter().filter(|e| e.at_tick == tick) {
            engine.queue_command(PlayerCommand::Deploy {
                kind: entry.kind,
                position: entry.position,
            });
        }
        let snapshot = engine.tick();
        if print_events {
            for event in &snapshot.events {
                match serde_json::to_string(event) {
                    Ok(json) => println!("{json}"),
                    Err(err) => eprintln!("failed to serialize event: {err}"),
                }
            }
        }
        let done = snapshot.phase == RaidPhase::Ended;
        last = snapshot;
        if done {
            break;
        }
    }
    last
}
