//! Headless tick loop driving the world, queued card plays, and tower combat.

use std::{collections::BTreeMap, fmt};

use card_defence_core::{
    Activation, Command, Direction, EnemyConfig, Event, TargetSelection, TileCoord,
};
use card_defence_system_effects::{CardData, EffectPipeline};
use card_defence_system_tower_combat::TowerCombat;
use card_defence_world::{self as world, query, BoardLayout, TileGraph, World, WorldCounters};
use serde::{Deserialize, Serialize};

/// Tunables of a simulation run.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct SimulationConfig {
    /// Number of ticks to simulate.
    pub(crate) ticks: u64,
    /// Ticks between enemy spawns; `0` disables spawning.
    pub(crate) spawn_every: u64,
    /// Tile enemies enter the board on.
    pub(crate) spawn_tile: TileCoord,
    /// Configuration of every spawned enemy.
    pub(crate) enemy: EnemyConfig,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            ticks: 600,
            spawn_every: 60,
            spawn_tile: TileCoord::new(0, 0),
            enemy: EnemyConfig {
                health: 10,
                step: 0.05,
            },
        }
    }
}

/// A card scheduled to be played at the start of a tick.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub(crate) struct PlannedPlay {
    /// Tick the card is played on; plays for tick `0` happen before the first tick.
    #[serde(default)]
    pub(crate) tick: u64,
    /// Tile the card is played from.
    pub(crate) origin: TileCoord,
    #[serde(default = "default_facing")]
    pub(crate) facing: Direction,
    /// Explicit target for single-target effects.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) target: Option<TargetSelection>,
    /// Card being played.
    pub(crate) card: CardData,
}

fn default_facing() -> Direction {
    Direction::North
}

impl PlannedPlay {
    fn activation(&self) -> Activation {
        let activation = Activation::new(self.origin, self.facing);
        match self.target {
            Some(target) => activation.with_target(target),
            None => activation,
        }
    }
}

/// Totals reported once a run finishes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct SimulationSummary {
    /// Ticks that were simulated.
    pub(crate) ticks: u64,
    /// World counters at the end of the run.
    pub(crate) counters: WorldCounters,
    /// Enemies still on the board.
    pub(crate) enemies_remaining: usize,
    /// Towers on the board.
    pub(crate) towers: usize,
    /// Cards that were played.
    pub(crate) cards_played: usize,
    /// Predicates skipped because their targets could not be resolved.
    pub(crate) predicates_skipped: usize,
}

impl fmt::Display for SimulationSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "ticks simulated:      {}", self.ticks)?;
        writeln!(f, "cards played:         {}", self.cards_played)?;
        writeln!(f, "predicates skipped:   {}", self.predicates_skipped)?;
        writeln!(f, "towers:               {}", self.towers)?;
        writeln!(f, "projectiles launched: {}", self.counters.projectiles_launched)?;
        writeln!(f, "enemies spawned:      {}", self.counters.enemies_spawned)?;
        writeln!(f, "enemies killed:       {}", self.counters.enemies_killed)?;
        writeln!(f, "enemies arrived:      {}", self.counters.enemies_arrived)?;
        write!(f, "enemies remaining:    {}", self.enemies_remaining)
    }
}

/// Owns the world together with the systems that react to its events.
#[derive(Debug)]
pub(crate) struct Simulation {
    world: World,
    pipeline: EffectPipeline,
    combat: TowerCombat,
    config: SimulationConfig,
    plays: BTreeMap<u64, Vec<PlannedPlay>>,
    events: Vec<Event>,
    follow_up: Vec<Event>,
    cards_played: usize,
    predicates_skipped: usize,
}

impl Simulation {
    /// Creates a simulation on the provided board.
    pub(crate) fn new(graph: TileGraph, config: SimulationConfig) -> Self {
        Self {
            world: World::new(graph),
            pipeline: EffectPipeline::new(),
            combat: TowerCombat::new(),
            config,
            plays: BTreeMap::new(),
            events: Vec::new(),
            follow_up: Vec::new(),
            cards_played: 0,
            predicates_skipped: 0,
        }
    }

    /// Queues a card play; plays sharing a tick resolve in queue order.
    pub(crate) fn schedule(&mut self, play: PlannedPlay) {
        self.plays.entry(play.tick).or_default().push(play);
    }

    /// Runs every configured tick and reports the final totals.
    pub(crate) fn run(&mut self) -> SimulationSummary {
        for tick in 1..=self.config.ticks {
            self.step(tick);
        }
        self.summary()
    }

    fn step(&mut self, tick: u64) {
        self.events.clear();

        if self.config.spawn_every > 0 && (tick - 1) % self.config.spawn_every == 0 {
            world::apply(
                &mut self.world,
                Command::SpawnEnemy {
                    tile: self.config.spawn_tile,
                    config: self.config.enemy,
                },
                &mut self.events,
            );
        }

        while let Some(entry) = self.plays.first_entry() {
            if *entry.key() > tick {
                break;
            }
            for play in entry.remove() {
                let resolution = self.pipeline.play_card(
                    &mut self.world,
                    &play.card,
                    &play.activation(),
                    &mut self.events,
                );
                self.cards_played += 1;
                self.predicates_skipped += resolution.skipped().len();
                for note in resolution.notes() {
                    tracing::info!(card = %play.card.title, "{note}");
                }
            }
        }

        world::apply(&mut self.world, Command::Tick, &mut self.events);

        self.follow_up.clear();
        self.combat
            .handle(&mut self.world, &self.events, &mut self.follow_up);
        self.events.append(&mut self.follow_up);

        for event in &self.events {
            report(event);
        }
    }

    fn summary(&self) -> SimulationSummary {
        SimulationSummary {
            ticks: query::tick_index(&self.world),
            counters: query::counters(&self.world),
            enemies_remaining: query::enemy_view(&self.world).len(),
            towers: query::tower_view(&self.world).len(),
            cards_played: self.cards_played,
            predicates_skipped: self.predicates_skipped,
        }
    }
}

fn report(event: &Event) {
    match event {
        Event::EnemySpawnRejected { tile, reason } => {
            tracing::warn!(%tile, %reason, "enemy spawn rejected");
        }
        Event::TowerPlacementRejected { tile, reason } => {
            tracing::warn!(%tile, %reason, "tower placement rejected");
        }
        Event::ProjectileSpawnRejected { reason } => {
            tracing::warn!(%reason, "projectile launch rejected");
        }
        Event::DamageRejected { enemy, reason } => {
            tracing::warn!(%enemy, %reason, "damage rejected");
        }
        Event::TowerPlaced { tower, tile, facing } => {
            tracing::info!(%tower, %tile, ?facing, "tower placed");
        }
        Event::EnemyDied { enemy, tile } => {
            tracing::info!(%enemy, %tile, "enemy died");
        }
        Event::EnemyArrived { enemy, tile } => {
            tracing::info!(%enemy, %tile, "enemy arrived");
        }
        other => tracing::trace!(event = ?other, "event"),
    }
}

/// Rectangular board whose route snakes row by row from the top-left tile.
///
/// Even rows run east and odd rows run west; the last tile of the final row
/// is the destination.
pub(crate) fn serpentine_board(columns: u32, rows: u32, tile_length: f32) -> BoardLayout {
    let width = i32::try_from(columns).unwrap_or(i32::MAX);
    let height = i32::try_from(rows).unwrap_or(i32::MAX);
    let mut route = Vec::new();
    for y in 0..height {
        if y % 2 == 0 {
            route.extend((0..width).map(|x| TileCoord::new(x, y)));
        } else {
            route.extend((0..width).rev().map(|x| TileCoord::new(x, y)));
        }
    }
    BoardLayout::rectangle(columns, rows, tile_length).with_route(&route)
}
