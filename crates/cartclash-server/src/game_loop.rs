//! Game loop thread: runs the simulation engine at 60Hz and publishes snapshots.
//!
//! The engine is created inside this thread because it's cleaner for ownership.
//! Commands arrive via `mpsc` channel. Snapshots are stored in shared state for
//! polling and their events are logged.

use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use cartclash_core::constants::TICK_RATE;
use cartclash_core::events::SimEvent;
use cartclash_core::state::SimSnapshot;
use cartclash_sim::{HeadlessHost, SimConfig, SimulationEngine};

use crate::state::LoopCommand;

/// Nominal duration of one tick.
pub const TICK_DURATION: Duration = Duration::from_nanos(1_000_000_000 / TICK_RATE as u64);

/// Spawns the game loop in a new thread.
///
/// Returns the command sender and the thread handle.
pub fn spawn_game_loop(
    config: SimConfig,
    latest_snapshot: Arc<Mutex<Option<SimSnapshot>>>,
) -> std::io::Result<(mpsc::Sender<LoopCommand>, JoinHandle<()>)> {
    let (cmd_tx, cmd_rx) = mpsc::channel::<LoopCommand>();

    let handle = std::thread::Builder::new()
        .name("cartclash-game-loop".into())
        .spawn(move || {
            run_game_loop(config, cmd_rx, &latest_snapshot);
        })?;

    Ok((cmd_tx, handle))
}

/// The game loop. Runs until Shutdown command or channel disconnect.
fn run_game_loop(
    config: SimConfig,
    cmd_rx: mpsc::Receiver<LoopCommand>,
    latest_snapshot: &Mutex<Option<SimSnapshot>>,
) {
    let mut engine = SimulationEngine::new(config, HeadlessHost::new());
    let mut next_tick_time = Instant::now();
    log::info!("game loop started at {TICK_RATE}Hz");

    loop {
        // 1. Drain all pending commands
        if !drain_commands(&mut engine, &cmd_rx) {
            log::info!("game loop stopped at tick {}", engine.time().tick);
            return;
        }

        // 2. Advance one tick
        let snapshot = engine.tick();

        // 3. Report what happened this tick
        for event in &snapshot.events {
            log_event(event);
        }

        // 4. Store latest snapshot for polling
        if let Ok(mut lock) = latest_snapshot.lock() {
            *lock = Some(snapshot);
        }

        // 5. Sleep until next tick
        next_tick_time += TICK_DURATION;
        let now = Instant::now();
        if next_tick_time > now {
            std::thread::sleep(next_tick_time - now);
        } else if now - next_tick_time > TICK_DURATION * 2 {
            // Too far behind; reset to avoid a catch-up spiral
            log::warn!("game loop fell behind; resetting tick clock");
            next_tick_time = now;
        }
    }
}

/// Apply every pending command. Returns false once the loop should stop.
fn drain_commands(
    engine: &mut SimulationEngine<HeadlessHost>,
    cmd_rx: &mpsc::Receiver<LoopCommand>,
) -> bool {
    loop {
        match cmd_rx.try_recv() {
            Ok(LoopCommand::Join { player }) => {
                engine.host_mut().add_avatar(player);
                log::info!("{player} joined");
            }
            Ok(LoopCommand::Sim { command }) => engine.queue_command(command),
            Ok(LoopCommand::Shutdown) => return false,
            Err(mpsc::TryRecvError::Empty) => return true,
            Err(mpsc::TryRecvError::Disconnected) => return false,
        }
    }
}

fn log_event(event: &SimEvent) {
    match event {
        SimEvent::Defeated { player, cause } => log::info!("{player} defeated: {cause}"),
        SimEvent::Damaged {
            victim,
            attacker,
            amount,
            health,
        } => log::info!("{attacker} hit {victim} for {amount} ({health} left)"),
        other => match serde_json::to_string(other) {
            Ok(json) => log::debug!("event {json}"),
            Err(err) => log::warn!("unserializable event {other:?}: {err}"),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cartclash_core::commands::{Customization, SimCommand};
    use cartclash_core::types::PlayerId;

    #[test]
    fn test_command_channel_round_trip() {
        let (tx, rx) = mpsc::channel::<LoopCommand>();

        tx.send(LoopCommand::Join {
            player: PlayerId(1),
        })
        .unwrap();
        tx.send(LoopCommand::Sim {
            command: SimCommand::BeginRound,
        })
        .unwrap();
        tx.send(LoopCommand::Shutdown).unwrap();

        let mut commands = Vec::new();
        while let Ok(cmd) = rx.try_recv() {
            commands.push(cmd);
        }

        assert_eq!(commands.len(), 3);
        assert!(matches!(commands[0], LoopCommand::Join { .. }));
        assert!(matches!(
            commands[1],
            LoopCommand::Sim {
                command: SimCommand::BeginRound
            }
        ));
        assert!(matches!(commands[2], LoopCommand::Shutdown));
    }

    #[test]
    fn test_drain_stops_on_shutdown_and_disconnect() {
        let mut engine = SimulationEngine::new(SimConfig::default(), HeadlessHost::new());
        let (tx, rx) = mpsc::channel::<LoopCommand>();

        tx.send(LoopCommand::Join {
            player: PlayerId(2),
        })
        .unwrap();
        assert!(drain_commands(&mut engine, &rx));
        assert!(engine.host().avatar(PlayerId(2)).is_some());

        tx.send(LoopCommand::Shutdown).unwrap();
        assert!(!drain_commands(&mut engine, &rx));

        drop(tx);
        assert!(!drain_commands(&mut engine, &rx));
    }

    #[test]
    fn test_loop_publishes_snapshots() {
        let latest = Arc::new(Mutex::new(None));
        let (tx, handle) = spawn_game_loop(SimConfig::default(), latest.clone()).unwrap();

        tx.send(LoopCommand::Join {
            player: PlayerId(1),
        })
        .unwrap();
        tx.send(LoopCommand::Sim {
            command: SimCommand::CreateCart {
                player: PlayerId(1),
                kind: "Classic".into(),
                customization: Customization::default(),
            },
        })
        .unwrap();

        let deadline = Instant::now() + Duration::from_secs(5);
        let mut seen = false;
        while Instant::now() < deadline {
            let carts = latest
                .lock()
                .unwrap()
                .as_ref()
                .map(|snapshot| snapshot.carts.len())
                .unwrap_or(0);
            if carts == 1 {
                seen = true;
                break;
            }
            std::thread::sleep(Duration::from_millis(5));
        }
        assert!(seen, "cart never appeared in a published snapshot");

        tx.send(LoopCommand::Shutdown).unwrap();
        handle.join().unwrap();
    }

    #[test]
    fn test_tick_duration_constant() {
        // 60Hz = 16.667ms per tick
        let expected_nanos = 1_000_000_000u64 / 60;
        assert_eq!(TICK_DURATION.as_nanos(), expected_nanos as u128);
    }
}
