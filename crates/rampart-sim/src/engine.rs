//! Raid engine — the core of the battle simulation.
//!
//! `RaidEngine` owns the hecs ECS world, processes player commands,
//! runs all systems in a fixed order each tick, and produces
//! `RaidSnapshot`s. Completely headless, enabling deterministic
//! testing: same seed and same commands give byte-identical snapshots.

use std::collections::VecDeque;
use std::fmt;

use hecs::World;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use rampart_core::commands::PlayerCommand;
use rampart_core::components::{Health, Ident, Structure};
use rampart_core::constants::ENDING_GRACE_SECS;
use rampart_core::enums::{Owner, RaidPhase, UnitKind};
use rampart_core::events::BattleEvent;
use rampart_core::state::RaidSnapshot;
use rampart_core::types::{Footprint, Position, SimTime};

use rampart_grid::placement::{classify_placement, Placement};

use crate::raid::{RaidObserver, RaidState};
use crate::scenario::RaidConfig;
use crate::schedule::{secs_to_ticks, EventSchedule};
use crate::systems;
use crate::systems::effects::BattleCtx;
use crate::world_setup::{self, SetupError};

/// Deployment rejection. No state changes when one of these comes back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeployError {
    /// Outside the deployable map margin.
    OutOfBounds,
    /// Inside the defended exclusion zone around a structure.
    ExclusionZone,
    /// No reinforcements of that kind remain.
    NoReinforcements,
    /// The raid is not accepting deployments.
    RaidOver,
}

impl fmt::Display for DeployError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeployError::OutOfBounds => write!(f, "position outside the deployable margin"),
            DeployError::ExclusionZone => write!(f, "position inside a defended exclusion zone"),
            DeployError::NoReinforcements => write!(f, "no reinforcements of that kind remain"),
            DeployError::RaidOver => write!(f, "raid is not accepting deployments"),
        }
    }
}

impl std::error::Error for DeployError {}

/// The raid engine. Owns the ECS world and all raid state.
pub struct RaidEngine {
    world: World,
    time: SimTime,
    rng: ChaCha8Rng,
    next_id: u32,
    command_queue: VecDeque<PlayerCommand>,
    despawn_buffer: Vec<hecs::Entity>,
    events: Vec<BattleEvent>,
    schedule: EventSchedule,
    raid: RaidState,
    observer: Option<Box<dyn RaidObserver>>,
}

impl RaidEngine {
    /// Create an engine with the defender's base loaded. Fails when the
    /// layout has no opposing structures to raid.
    pub fn new(config: RaidConfig) -> Result<Self, SetupError> {
        let mut world = World::new();
        let mut next_id = 0u32;
        let initial_defenses = world_setup::load_base(&mut world, &config.layout, &mut next_id)?;

        let raid = RaidState {
            phase: RaidPhase::NotStarted,
            attacker_id: config.attacker_id,
            defender_id: config.layout.defender_id,
            raid_id: config.raid_id,
            initial_defenses,
            destroyed: 0,
            loot: 0,
            pending_spawns: 0,
            reinforcements: config.army.iter().map(|e| (e.kind, e.count)).collect(),
            ending_at_tick: None,
            last_progress: None,
            result: None,
        };

        Ok(Self {
            world,
            time: SimTime::default(),
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            next_id,
            command_queue: VecDeque::new(),
            despawn_buffer: Vec::new(),
            events: Vec::new(),
            schedule: EventSchedule::default(),
            raid,
            observer: None,
        })
    }

    /// Attach the application's sink for progress and raid-end calls.
    pub fn set_observer(&mut self, observer: Box<dyn RaidObserver>) {
        self.observer = Some(observer);
    }

    /// Queue a player command for processing at the next tick boundary.
    pub fn queue_command(&mut self, command: PlayerCommand) {
        self.command_queue.push_back(command);
    }

    /// Queue multiple commands.
    pub fn queue_commands(&mut self, commands: impl IntoIterator<Item = PlayerCommand>) {
        self.command_queue.extend(commands);
    }

    /// Advance the simulation by one tick and return the snapshot.
    pub fn tick(&mut self) -> RaidSnapshot {
        self.process_commands();

        if matches!(
            self.raid.phase,
            RaidPhase::Deploying | RaidPhase::Active | RaidPhase::Ending
        ) {
            self.run_systems();
            self.time.advance();
        }

        let events = std::mem::take(&mut self.events);
        systems::snapshot::build_snapshot(&self.world, &self.time, &self.raid, events)
    }

    /// Get the current raid phase.
    pub fn phase(&self) -> RaidPhase {
        self.raid.phase
    }

    /// Get the current simulation time.
    pub fn time(&self) -> SimTime {
        self.time
    }

    /// Get a read-only reference to the ECS world.
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Drop one unit at a position. Rejected — with no state change —
    /// outside the map margin, inside an exclusion zone, with nothing
    /// left of that kind, or once the raid stopped accepting drops.
    pub fn deploy(&mut self, kind: UnitKind, position: Position) -> Result<u32, DeployError> {
        if !matches!(self.raid.phase, RaidPhase::Deploying | RaidPhase::Active) {
            return Err(DeployError::RaidOver);
        }

        let footprints: Vec<Footprint> = self
            .world
            .query::<(&Ident, &Structure, &Health)>()
            .iter()
            .filter(|(_, (ident, _, health))| {
                ident.owner == Owner::Defender && health.is_alive()
            })
            .map(|(_, (_, structure, _))| structure.footprint)
            .collect();

        match classify_placement(position, &footprints) {
            Placement::OutOfBounds => return Err(DeployError::OutOfBounds),
            Placement::InsideExclusion => return Err(DeployError::ExclusionZone),
            Placement::Allowed => {}
        }

        if !self.raid.take_reinforcement(kind) {
            return Err(DeployError::NoReinforcements);
        }

        let (_, id) =
            world_setup::spawn_unit(&mut self.world, &mut self.next_id, kind, 1, 0, position);
        self.events.push(BattleEvent::UnitDeployed {
            id,
            kind,
            position,
        });

        // First boots on the ground take the raid live.
        if self.raid.phase == RaidPhase::Deploying {
            self.raid.phase = RaidPhase::Active;
        }
        Ok(id)
    }

    /// Process all queued commands.
    fn process_commands(&mut self) {
        while let Some(command) = self.command_queue.pop_front() {
            self.handle_command(command);
        }
    }

    /// Handle a single player command. Invalid commands are absorbed.
    fn handle_command(&mut self, command: PlayerCommand) {
        match command {
            PlayerCommand::StartRaid => {
                if self.raid.phase == RaidPhase::NotStarted {
                    self.raid.phase = RaidPhase::Deploying;
                }
            }
            PlayerCommand::Deploy { kind, position } => {
                let _ = self.deploy(kind, position);
            }
            PlayerCommand::EndRaid => {
                if matches!(self.raid.phase, RaidPhase::Deploying | RaidPhase::Active) {
                    self.raid.phase = RaidPhase::Ending;
                    self.raid.ending_at_tick =
                        Some(self.time.tick + secs_to_ticks(ENDING_GRACE_SECS));
                }
            }
        }
    }

    /// Run all systems in order.
    fn run_systems(&mut self) {
        let mut ctx = BattleCtx {
            raid: &mut self.raid,
            schedule: &mut self.schedule,
            events: &mut self.events,
            despawn: &mut self.despawn_buffer,
            rng: &mut self.rng,
            next_id: &mut self.next_id,
            now: self.time.tick,
        };

        // 1. Scheduled work from earlier ticks: shell arrivals,
        //    staggered spawns.
        systems::effects::process_due(&mut self.world, &mut ctx);
        // 2. Structure weapons (always ahead of unit attacks).
        systems::turrets::run(&mut self.world, &mut ctx);
        // 3. Unit decisions: retarget, path, attack.
        systems::unit_ai::run(&mut self.world, &mut ctx);
        // 4. Movement integration + separation.
        systems::movement::run(&mut self.world);
        // 5. Zone ticks and expiry.
        systems::zones::run(&mut self.world, &mut ctx);
        // 6. Lifecycle bookkeeping and end detection.
        systems::lifecycle::run(&mut self.world, &mut ctx, &mut self.observer);
        // 7. Despawn buffered corpses.
        systems::cleanup::run(&mut self.world, &mut self.despawn_buffer);
    }

    /// Apply damage to an entity by stable id (test hook).
    #[cfg(test)]
    pub(crate) fn damage_entity(&mut self, id: u32, amount: f32) {
        let mut ctx = BattleCtx {
            raid: &mut self.raid,
            schedule: &mut self.schedule,
            events: &mut self.events,
            despawn: &mut self.despawn_buffer,
            rng: &mut self.rng,
            next_id: &mut self.next_id,
            now: self.time.tick,
        };
        if let Some(entity) = systems::effects::find_by_id(&self.world, id) {
            systems::effects::apply_damage(&mut self.world, &mut ctx, entity, amount);
        }
        systems::cleanup::run(&mut self.world, &mut self.despawn_buffer);
    }

    /// Schedule an impact due on the next tick (test hook).
    #[cfg(test)]
    pub(crate) fn queue_test_impact(&mut self, spec: crate::schedule::ImpactSpec) {
        self.schedule
            .push_at(self.time.tick, crate::schedule::Pending::Impact(spec));
    }

    /// Create a zone directly (test hook).
    #[cfg(test)]
    pub(crate) fn spawn_test_zone(
        &mut self,
        center: Position,
        spec: rampart_core::stats::ZoneSpec,
    ) {
        let mut ctx = BattleCtx {
            raid: &mut self.raid,
            schedule: &mut self.schedule,
            events: &mut self.events,
            despawn: &mut self.despawn_buffer,
            rng: &mut self.rng,
            next_id: &mut self.next_id,
            now: self.time.tick,
        };
        systems::effects::spawn_zone(&mut self.world, &mut ctx, center, spec, Owner::Defender);
    }

    /// Get a read-only reference to the raid state (test hook).
    #[cfg(test)]
    pub(crate) fn raid(&self) -> &RaidState {
        &self.raid
    }

    /// Get the scheduled-event count (test hook).
    #[cfg(test)]
    pub(crate) fn scheduled_len(&self) -> usize {
        self.schedule.len()
    }
}
