use std::io::BufRead;
use std::time::Duration;

use cartclash_core::commands::{Customization, PerkRequest, SimCommand};
use cartclash_core::types::PlayerId;
use cartclash_server::logging;
use cartclash_server::state::{LoopCommand, ServerError, ServerState};
use cartclash_sim::SimConfig;

const USAGE: &str = "usage: cartclash-server [--demo] [config.json]";

fn main() {
    if let Err(err) = run() {
        log::error!("{err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), ServerError> {
    let _ = logging::try_init();

    let mut demo = false;
    let mut config_path = None;
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--demo" => demo = true,
            "-h" | "--help" => {
                println!("{USAGE}");
                return Ok(());
            }
            path => config_path = Some(path.to_string()),
        }
    }

    let config = match config_path {
        Some(path) => {
            log::info!("loading config from {path}");
            SimConfig::from_json_str(&std::fs::read_to_string(path)?)?
        }
        None => SimConfig::default(),
    };

    let server = ServerState::new();
    server.start(config)?;

    if demo {
        run_demo(&server)?;
    } else {
        feed_stdin(&server)?;
    }

    if let Some(snapshot) = server.snapshot()? {
        log::info!(
            "final state: tick {}, {:?}, {} carts",
            snapshot.time.tick,
            snapshot.phase,
            snapshot.carts.len()
        );
    }
    server.shutdown()
}

/// One `LoopCommand` JSON object per line until EOF.
fn feed_stdin(server: &ServerState) -> Result<(), ServerError> {
    for line in std::io::stdin().lock().lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<LoopCommand>(&line) {
            Ok(LoopCommand::Shutdown) => break,
            Ok(command) => server.send(command)?,
            Err(err) => log::warn!("ignoring malformed command: {err}"),
        }
    }
    Ok(())
}

/// Nine drivers; the back-row driver in bay 9 rams the front-row cart in
/// bay 1 once its bumper arms.
fn run_demo(server: &ServerState) -> Result<(), ServerError> {
    let players: Vec<PlayerId> = (1..=9).map(PlayerId).collect();
    for player in &players {
        server.send(LoopCommand::Join { player: *player })?;
        server.send(LoopCommand::Sim {
            command: SimCommand::CreateCart {
                player: *player,
                kind: "Classic".into(),
                customization: Customization::default(),
            },
        })?;
    }
    server.send(LoopCommand::Sim {
        command: SimCommand::AttachPerks {
            player: PlayerId(9),
            perks: PerkRequest {
                fuel: 10.0,
                boost_strength: 50.0,
                shield_uses: 3,
                damage_per_hit: 2.0,
            },
        },
    })?;
    server.send(LoopCommand::Sim {
        command: SimCommand::BeginRound,
    })?;

    std::thread::sleep(Duration::from_secs(12));

    server.send(LoopCommand::Sim {
        command: SimCommand::EndRound,
    })?;
    std::thread::sleep(Duration::from_millis(100));
    Ok(())
}
