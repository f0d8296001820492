//! Server state shared between the command front-end and the game loop thread.

use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use cartclash_core::commands::SimCommand;
use cartclash_core::state::SimSnapshot;
use cartclash_core::types::PlayerId;
use cartclash_sim::{SimConfig, SimError};

use crate::game_loop;

/// Commands sent from the front-end to the game loop thread.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum LoopCommand {
    /// A player connected; give them an avatar in the host world.
    Join { player: PlayerId },
    /// Forward a command to the simulation engine.
    Sim { command: SimCommand },
    /// Shut down the game loop thread gracefully.
    Shutdown,
}

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("simulation already running")]
    AlreadyRunning,

    #[error("simulation not started")]
    NotStarted,

    #[error("game loop channel closed")]
    ChannelClosed,

    #[error("state lock poisoned")]
    Poisoned,

    #[error(transparent)]
    Sim(#[from] SimError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Handle to the running game loop.
///
/// - `command_tx` is `None` until `start` is called.
/// - `latest_snapshot` is shared with the game loop thread, which replaces it
///   after every tick.
pub struct ServerState {
    command_tx: Mutex<Option<mpsc::Sender<LoopCommand>>>,
    latest_snapshot: Arc<Mutex<Option<SimSnapshot>>>,
    thread: Mutex<Option<JoinHandle<()>>>,
}

impl Default for ServerState {
    fn default() -> Self {
        Self {
            command_tx: Mutex::new(None),
            latest_snapshot: Arc::new(Mutex::new(None)),
            thread: Mutex::new(None),
        }
    }
}

impl ServerState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawn the game loop thread if it is not already running.
    pub fn start(&self, config: SimConfig) -> Result<(), ServerError> {
        let mut tx_lock = self.command_tx.lock().map_err(|_| ServerError::Poisoned)?;
        if tx_lock.is_some() {
            return Err(ServerError::AlreadyRunning);
        }
        let (cmd_tx, handle) = game_loop::spawn_game_loop(config, self.latest_snapshot.clone())?;
        *tx_lock = Some(cmd_tx);
        *self.thread.lock().map_err(|_| ServerError::Poisoned)? = Some(handle);
        Ok(())
    }

    pub fn is_running(&self) -> bool {
        self.command_tx
            .lock()
            .map(|tx| tx.is_some())
            .unwrap_or(false)
    }

    /// Send a command to the game loop.
    pub fn send(&self, command: LoopCommand) -> Result<(), ServerError> {
        let tx_lock = self.command_tx.lock().map_err(|_| ServerError::Poisoned)?;
        match tx_lock.as_ref() {
            Some(tx) => tx.send(command).map_err(|_| ServerError::ChannelClosed),
            None => Err(ServerError::NotStarted),
        }
    }

    /// Latest snapshot, for polling.
    pub fn snapshot(&self) -> Result<Option<SimSnapshot>, ServerError> {
        let lock = self
            .latest_snapshot
            .lock()
            .map_err(|_| ServerError::Poisoned)?;
        Ok(lock.clone())
    }

    /// Stop the game loop and wait for its thread to exit.
    pub fn shutdown(&self) -> Result<(), ServerError> {
        let tx = self
            .command_tx
            .lock()
            .map_err(|_| ServerError::Poisoned)?
            .take();
        let Some(tx) = tx else {
            return Err(ServerError::NotStarted);
        };
        // The loop also exits on disconnect, so a failed send is fine.
        let _ = tx.send(LoopCommand::Shutdown);
        drop(tx);

        let handle = self.thread.lock().map_err(|_| ServerError::Poisoned)?.take();
        if let Some(handle) = handle {
            if handle.join().is_err() {
                log::error!("game loop thread panicked");
            }
        }
        Ok(())
    }
}
