//! Simulation engine: the core of the minigame.
//!
//! `SimulationEngine` owns the cart registry, the scheduler and the host,
//! processes round commands, fires timers and watchers, runs the combat frame
//! and produces `SimSnapshot`s. Headless and generic over the host, enabling
//! deterministic testing.

use std::collections::VecDeque;

use cartclash_core::commands::{Customization, PerkRequest, SimCommand};
use cartclash_core::enums::RoundPhase;
use cartclash_core::events::SimEvent;
use cartclash_core::state::SimSnapshot;
use cartclash_core::types::{CartId, PartId, PlayerId, SimTime};

use crate::config::SimConfig;
use crate::error::SimError;
use crate::host::Host;
use crate::registry::Registry;
use crate::scheduler::Scheduler;
use crate::spawn::SpawnAllocator;
use crate::systems::{self, Ctx};

/// The simulation engine. Owns the registry, the scheduler and the host.
pub struct SimulationEngine<H: Host> {
    config: SimConfig,
    host: H,
    time: SimTime,
    phase: RoundPhase,
    round: u32,
    registry: Registry,
    scheduler: Scheduler,
    spawns: SpawnAllocator,
    next_cart_id: u64,
    command_queue: VecDeque<SimCommand>,
    events: Vec<SimEvent>,
}

impl<H: Host> SimulationEngine<H> {
    /// Create a new simulation engine with the given config and host.
    pub fn new(config: SimConfig, host: H) -> Self {
        let spawns = SpawnAllocator::new(config.spawn_transforms());
        Self {
            config,
            host,
            time: SimTime::default(),
            phase: RoundPhase::default(),
            round: 0,
            registry: Registry::new(),
            scheduler: Scheduler::new(),
            spawns,
            next_cart_id: 1,
            command_queue: VecDeque::new(),
            events: Vec::new(),
        }
    }

    /// Queue a command for processing at the next tick boundary.
    pub fn queue_command(&mut self, command: SimCommand) {
        self.command_queue.push_back(command);
    }

    /// Queue multiple commands.
    pub fn queue_commands(&mut self, commands: impl IntoIterator<Item = SimCommand>) {
        self.command_queue.extend(commands);
    }

    /// Advance the simulation by one tick and return the resulting snapshot.
    pub fn tick(&mut self) -> SimSnapshot {
        self.process_commands();
        self.run_systems();

        self.time.advance();
        self.scheduler.set_now(self.time.tick);

        let events = std::mem::take(&mut self.events);
        systems::snapshot::build_snapshot(&self.registry, &self.time, self.phase, events)
    }

    // --- Direct operations (the command handlers call these too) ---

    pub fn create_cart(
        &mut self,
        player: PlayerId,
        kind: &str,
        customization: &Customization,
    ) -> Result<CartId, SimError> {
        systems::lifecycle::create_cart(&mut self.ctx(), player, kind, customization)
    }

    /// Tear down `player`'s cart without a defeat. Returns false if they had none.
    pub fn destroy_cart(&mut self, player: PlayerId) -> bool {
        systems::lifecycle::destroy_cart(&mut self.ctx(), player)
    }

    /// Player disconnected: their cart goes the same way as `destroy_cart`.
    pub fn player_left(&mut self, player: PlayerId) -> bool {
        log::info!("{player} left");
        self.destroy_cart(player)
    }

    pub fn attach_perks(&mut self, player: PlayerId, perks: &PerkRequest) -> Result<(), SimError> {
        systems::perks::attach_perks(&mut self.ctx(), player, perks)
    }

    pub fn detach_bumper(&mut self, player: PlayerId) -> bool {
        systems::perks::detach_bumper(&mut self.ctx(), player)
    }

    pub fn consume_boost(&mut self, player: PlayerId, amount: f64) {
        systems::perks::consume_boost(&mut self.ctx(), player, amount)
    }

    pub fn begin_round(&mut self) -> Result<(), SimError> {
        systems::round::begin_round(&mut self.ctx())
    }

    pub fn end_round(&mut self) {
        systems::round::end_round(&mut self.ctx())
    }

    /// Record a body part that streamed in after the cart was built.
    pub fn add_cart_part(&mut self, cart: CartId, part: PartId) -> bool {
        systems::lifecycle::add_part(&mut self.ctx(), cart, part)
    }

    // --- Accessors ---

    /// Get the current round phase.
    pub fn phase(&self) -> RoundPhase {
        self.phase
    }

    /// Get the current simulation time.
    pub fn time(&self) -> SimTime {
        self.time
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    /// Mutable host access, for driving the environment between ticks.
    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    /// Jump straight to a phase, skipping the staged round start.
    #[cfg(test)]
    pub fn force_phase(&mut self, phase: RoundPhase) {
        self.phase = phase;
    }

    fn ctx(&mut self) -> Ctx<'_, H> {
        Ctx {
            phase: &mut self.phase,
            round: &mut self.round,
            registry: &mut self.registry,
            scheduler: &mut self.scheduler,
            spawns: &mut self.spawns,
            host: &mut self.host,
            events: &mut self.events,
            tuning: &self.config.tuning,
            next_cart_id: &mut self.next_cart_id,
        }
    }

    /// Process all queued commands.
    fn process_commands(&mut self) {
        while let Some(command) = self.command_queue.pop_front() {
            self.handle_command(command);
        }
    }

    /// Handle a single command. Failures are logged, never propagated.
    fn handle_command(&mut self, command: SimCommand) {
        let result = match command {
            SimCommand::CreateCart {
                player,
                kind,
                customization,
            } => self.create_cart(player, &kind, &customization).map(|_| ()),
            SimCommand::DestroyCart { player } => {
                self.destroy_cart(player);
                Ok(())
            }
            SimCommand::PlayerLeft { player } => {
                self.player_left(player);
                Ok(())
            }
            SimCommand::AttachPerks { player, perks } => self.attach_perks(player, &perks),
            SimCommand::DetachBumper { player } => {
                self.detach_bumper(player);
                Ok(())
            }
            SimCommand::ConsumeBoost { player, amount } => {
                self.consume_boost(player, amount);
                Ok(())
            }
            SimCommand::BeginRound => self.begin_round(),
            SimCommand::EndRound => {
                self.end_round();
                Ok(())
            }
        };

        match result {
            Ok(()) => {}
            Err(err @ SimError::SpawnSlotsExhausted { .. }) => log::error!("{err}"),
            Err(err) => log::warn!("command rejected: {err}"),
        }
    }

    /// Run all systems in order.
    fn run_systems(&mut self) {
        let mut ctx = self.ctx();
        // 1. Deferred timers due this tick
        systems::fire_due_timers(&mut ctx);
        // 2. One-shot watchers
        systems::fire_watchers(&mut ctx);
        // 3. Combat frame for every armed bumper
        systems::combat::run(&mut ctx);
    }
}
