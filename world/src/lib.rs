#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Card Defence.
//!
//! The world owns the board graph and every live enemy, tower, projectile
//! and tile highlight. All mutation flows through [`apply`]; systems and
//! adapters observe the world through the [`query`] module.

mod enemies;
mod graph;
mod projectiles;
mod towers;

use std::collections::BTreeMap;

use card_defence_core::{
    Command, ConfigurationError, Direction, EnemyConfig, EnemyId, Event, ProjectileConfig,
    ProjectileId, TileCoord, TowerConfig, WorldPoint,
};

pub use enemies::EnemyState;
pub use graph::{BoardError, BoardLayout, Neighbors, TileGraph, TileNode, TileRecord};

use enemies::{Enemy, EnemyStep};
use projectiles::{Flight, Projectile};
use towers::TowerRegistry;

/// Running totals maintained by the world.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WorldCounters {
    /// Enemies that entered the simulation.
    pub enemies_spawned: u32,
    /// Enemies removed after their health dropped below zero.
    pub enemies_killed: u32,
    /// Enemies that came to rest on a destination.
    pub enemies_arrived: u32,
    /// Projectiles launched.
    pub projectiles_launched: u32,
}

/// Represents the authoritative Card Defence world state.
#[derive(Debug)]
pub struct World {
    graph: TileGraph,
    enemies: BTreeMap<EnemyId, Enemy>,
    towers: TowerRegistry,
    projectiles: BTreeMap<ProjectileId, Projectile>,
    pings: BTreeMap<TileCoord, u32>,
    next_enemy_id: EnemyId,
    next_projectile_id: ProjectileId,
    counters: WorldCounters,
    tick_index: u64,
}

impl World {
    /// Creates an empty world on the provided board.
    #[must_use]
    pub fn new(graph: TileGraph) -> Self {
        Self {
            graph,
            enemies: BTreeMap::new(),
            towers: TowerRegistry::new(),
            projectiles: BTreeMap::new(),
            pings: BTreeMap::new(),
            next_enemy_id: EnemyId::new(0),
            next_projectile_id: ProjectileId::new(0),
            counters: WorldCounters::default(),
            tick_index: 0,
        }
    }

    fn tick(&mut self, out_events: &mut Vec<Event>) {
        self.tick_index = self.tick_index.saturating_add(1);
        out_events.push(Event::TimeAdvanced {
            tick: self.tick_index,
        });

        self.tick_pings(out_events);
        self.tick_towers(out_events);
        self.tick_projectiles(out_events);
        self.settle_deaths(out_events);
        self.tick_enemies(out_events);
    }

    fn tick_pings(&mut self, out_events: &mut Vec<Event>) {
        self.pings.retain(|tile, remaining| {
            *remaining = remaining.saturating_sub(1);
            if *remaining > 0 {
                return true;
            }
            out_events.push(Event::TilePingExpired { tile: *tile });
            false
        });
    }

    fn tick_towers(&mut self, out_events: &mut Vec<Event>) {
        for tower in self.towers.iter_mut() {
            let signals = tower.tick();
            if signals.animate {
                out_events.push(Event::TowerAttackAnimation { tower: tower.id });
            }
            if signals.fire {
                out_events.push(Event::TowerFired {
                    tower: tower.id,
                    tile: tower.tile,
                    facing: tower.facing,
                });
            }
        }
    }

    fn tick_projectiles(&mut self, out_events: &mut Vec<Event>) {
        // Enemies killed earlier this tick stay targetable until deaths settle,
        // so every later projectile that reaches them is spent on the corpse.
        let targets: Vec<(EnemyId, WorldPoint)> = self
            .enemies
            .values()
            .map(|enemy| (enemy.id, enemy.position(&self.graph)))
            .collect();

        let mut finished = Vec::new();
        for projectile in self.projectiles.values_mut() {
            match projectile.advance(targets.iter().copied()) {
                Flight::InFlight => {}
                Flight::Hit(enemy_id) => {
                    out_events.push(Event::ProjectileHit {
                        projectile: projectile.id,
                        enemy: enemy_id,
                    });
                    if let Some(enemy) = self.enemies.get_mut(&enemy_id) {
                        let amount = projectile.config.damage;
                        let health = enemy.take_damage(amount);
                        out_events.push(Event::EnemyDamaged {
                            enemy: enemy_id,
                            amount,
                            health,
                        });
                    }
                    finished.push(projectile.id);
                }
                Flight::Expired => {
                    out_events.push(Event::ProjectileExpired {
                        projectile: projectile.id,
                    });
                    finished.push(projectile.id);
                }
            }
        }
        for id in finished {
            let _ = self.projectiles.remove(&id);
        }
    }

    fn tick_enemies(&mut self, out_events: &mut Vec<Event>) {
        for enemy in self.enemies.values_mut() {
            match enemy.advance(&self.graph) {
                EnemyStep::Moving | EnemyStep::Resting => {}
                EnemyStep::Advanced { from, to } => out_events.push(Event::EnemyAdvanced {
                    enemy: enemy.id,
                    from,
                    to,
                }),
                EnemyStep::Arrived { from, to } => {
                    out_events.push(Event::EnemyAdvanced {
                        enemy: enemy.id,
                        from,
                        to,
                    });
                    out_events.push(Event::EnemyArrived {
                        enemy: enemy.id,
                        tile: to,
                    });
                    self.counters.enemies_arrived = self.counters.enemies_arrived.saturating_add(1);
                }
            }
        }
    }

    /// Removes every enemy whose health dropped below zero.
    fn settle_deaths(&mut self, out_events: &mut Vec<Event>) {
        let dead: Vec<EnemyId> = self
            .enemies
            .values()
            .filter(|enemy| enemy.is_dead())
            .map(|enemy| enemy.id)
            .collect();
        for id in dead {
            if let Some(enemy) = self.enemies.remove(&id) {
                let tile = enemy.occupied_tile();
                tracing::debug!(enemy = %id, %tile, "enemy died");
                self.counters.enemies_killed = self.counters.enemies_killed.saturating_add(1);
                out_events.push(Event::EnemyDied { enemy: id, tile });
            }
        }
    }

    fn spawn_enemy(&mut self, tile: TileCoord, config: EnemyConfig, out_events: &mut Vec<Event>) {
        match Enemy::spawn(self.next_enemy_id, tile, config, &self.graph) {
            Ok(enemy) => {
                let id = enemy.id;
                self.next_enemy_id = EnemyId::new(id.get().saturating_add(1));
                let _ = self.enemies.insert(id, enemy);
                self.counters.enemies_spawned = self.counters.enemies_spawned.saturating_add(1);
                out_events.push(Event::EnemySpawned { enemy: id, tile });
            }
            Err(reason) => {
                tracing::debug!(%tile, %reason, "enemy spawn rejected");
                out_events.push(Event::EnemySpawnRejected { tile, reason });
            }
        }
    }

    fn place_tower(
        &mut self,
        tile: TileCoord,
        facing: Direction,
        config: TowerConfig,
        out_events: &mut Vec<Event>,
    ) {
        let placed = if self.graph.contains(tile) {
            self.towers.place(tile, facing, config)
        } else {
            Err(ConfigurationError::UnknownTile(tile))
        };
        match placed {
            Ok(tower) => out_events.push(Event::TowerPlaced {
                tower,
                tile,
                facing,
            }),
            Err(reason) => {
                tracing::debug!(%tile, %reason, "tower placement rejected");
                out_events.push(Event::TowerPlacementRejected { tile, reason });
            }
        }
    }

    fn spawn_projectile(
        &mut self,
        position: WorldPoint,
        heading: WorldPoint,
        config: ProjectileConfig,
        out_events: &mut Vec<Event>,
    ) {
        match Projectile::launch(self.next_projectile_id, position, heading, config) {
            Ok(projectile) => {
                let id = projectile.id;
                self.next_projectile_id = ProjectileId::new(id.get().saturating_add(1));
                let _ = self.projectiles.insert(id, projectile);
                self.counters.projectiles_launched =
                    self.counters.projectiles_launched.saturating_add(1);
                out_events.push(Event::ProjectileSpawned {
                    projectile: id,
                    position,
                });
            }
            Err(reason) => {
                tracing::debug!(%reason, "projectile spawn rejected");
                out_events.push(Event::ProjectileSpawnRejected { reason });
            }
        }
    }

    fn damage_enemy(&mut self, enemy: EnemyId, amount: i32, out_events: &mut Vec<Event>) {
        if amount < 0 {
            let reason = ConfigurationError::NegativeDamage(amount);
            tracing::debug!(%enemy, %reason, "damage rejected");
            out_events.push(Event::DamageRejected { enemy, reason });
            return;
        }
        match self.enemies.get_mut(&enemy) {
            Some(target) => {
                let health = target.take_damage(amount);
                out_events.push(Event::EnemyDamaged {
                    enemy,
                    amount,
                    health,
                });
            }
            None => out_events.push(Event::DamageMissed { enemy }),
        }
    }

    fn ping_tile(&mut self, tile: TileCoord, ticks: u32, out_events: &mut Vec<Event>) {
        if ticks == 0 || !self.graph.contains(tile) {
            tracing::debug!(%tile, ticks, "ignoring ping");
            return;
        }
        let remaining = self.pings.entry(tile).or_insert(0);
        *remaining = (*remaining).max(ticks);
        out_events.push(Event::TilePinged { tile, ticks });
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::Tick => world.tick(out_events),
        Command::SpawnEnemy { tile, config } => world.spawn_enemy(tile, config, out_events),
        Command::PlaceTower {
            tile,
            facing,
            config,
        } => world.place_tower(tile, facing, config, out_events),
        Command::SpawnProjectile {
            position,
            heading,
            config,
        } => world.spawn_projectile(position, heading, config, out_events),
        Command::DamageEnemy { enemy, amount } => {
            world.damage_enemy(enemy, amount, out_events);
            world.settle_deaths(out_events);
        }
        Command::PingTile { tile, ticks } => world.ping_tile(tile, ticks, out_events),
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use card_defence_core::{
        CardEffect, Direction, EnemyId, ProjectileId, TileCoord, TowerId, WorldPoint,
    };

    use super::{EnemyState, TileGraph, World, WorldCounters};

    /// Provides read-only access to the board graph.
    #[must_use]
    pub fn tile_graph(world: &World) -> &TileGraph {
        &world.graph
    }

    /// Number of ticks simulated so far.
    #[must_use]
    pub fn tick_index(world: &World) -> u64 {
        world.tick_index
    }

    /// Running totals maintained by the world.
    #[must_use]
    pub fn counters(world: &World) -> WorldCounters {
        world.counters
    }

    /// Captures a read-only view of the living enemies.
    #[must_use]
    pub fn enemy_view(world: &World) -> EnemyView {
        let snapshots = world
            .enemies
            .values()
            .map(|enemy| EnemySnapshot {
                id: enemy.id,
                state: enemy.state,
                tile: enemy.tile(),
                occupied: enemy.occupied_tile(),
                position: enemy.position(&world.graph),
                health: enemy.health,
            })
            .collect();
        EnemyView { snapshots }
    }

    /// Captures a read-only view of the placed towers.
    #[must_use]
    pub fn tower_view(world: &World) -> TowerView {
        let snapshots = world
            .towers
            .iter()
            .map(|tower| TowerSnapshot {
                id: tower.id,
                tile: tower.tile,
                facing: tower.facing,
                countdown: tower.countdown,
            })
            .collect();
        TowerView { snapshots }
    }

    /// Captures the projectiles currently in flight.
    #[must_use]
    pub fn projectile_view(world: &World) -> Vec<ProjectileSnapshot> {
        world
            .projectiles
            .values()
            .map(|projectile| ProjectileSnapshot {
                id: projectile.id,
                position: projectile.position(),
                heading: projectile.heading(),
                remaining: projectile.remaining,
            })
            .collect()
    }

    /// Highlighted tiles with their remaining ticks, in tile order.
    #[must_use]
    pub fn pinged_tiles(world: &World) -> Vec<(TileCoord, u32)> {
        world
            .pings
            .iter()
            .map(|(tile, remaining)| (*tile, *remaining))
            .collect()
    }

    /// Effect resolved whenever the tower fires.
    #[must_use]
    pub fn tower_attack(world: &World, tower: TowerId) -> Option<&CardEffect> {
        world.towers.get(tower).map(|state| &state.config.attack)
    }

    /// Bundles everything effect resolution may read into one snapshot.
    #[must_use]
    pub fn world_info(world: &World) -> WorldInfo<'_> {
        WorldInfo {
            graph: &world.graph,
            enemies: enemy_view(world),
            towers: tower_view(world),
            pings: pinged_tiles(world),
            counters: world.counters,
            tick: world.tick_index,
        }
    }

    /// Read-only snapshot describing all living enemies.
    #[derive(Clone, Debug, Default)]
    pub struct EnemyView {
        snapshots: Vec<EnemySnapshot>,
    }

    impl EnemyView {
        /// Iterator over the captured snapshots in identifier order.
        pub fn iter(&self) -> impl Iterator<Item = &EnemySnapshot> {
            self.snapshots.iter()
        }

        /// Snapshot of the provided enemy, if it is alive.
        #[must_use]
        pub fn get(&self, id: EnemyId) -> Option<&EnemySnapshot> {
            self.snapshots
                .binary_search_by_key(&id, |snapshot| snapshot.id)
                .ok()
                .and_then(|index| self.snapshots.get(index))
        }

        /// Enemies physically standing on the tile, in identifier order.
        pub fn on_tile(&self, tile: TileCoord) -> impl Iterator<Item = &EnemySnapshot> {
            self.snapshots
                .iter()
                .filter(move |snapshot| snapshot.occupied == tile)
        }

        /// Number of living enemies.
        #[must_use]
        pub fn len(&self) -> usize {
            self.snapshots.len()
        }

        /// Whether no enemy is alive.
        #[must_use]
        pub fn is_empty(&self) -> bool {
            self.snapshots.is_empty()
        }

        /// Consumes the view, yielding the underlying snapshots.
        #[must_use]
        pub fn into_vec(self) -> Vec<EnemySnapshot> {
            self.snapshots
        }
    }

    /// Immutable representation of a single enemy used for queries.
    #[derive(Clone, Debug, PartialEq)]
    pub struct EnemySnapshot {
        /// Unique identifier assigned to the enemy.
        pub id: EnemyId,
        /// Movement state of the enemy.
        pub state: EnemyState,
        /// Tile the enemy is tracked on for routing.
        pub tile: TileCoord,
        /// Tile the enemy physically stands on.
        pub occupied: TileCoord,
        /// Interpolated world position.
        pub position: WorldPoint,
        /// Remaining health.
        pub health: i32,
    }

    /// Read-only snapshot describing all placed towers.
    #[derive(Clone, Debug, Default)]
    pub struct TowerView {
        snapshots: Vec<TowerSnapshot>,
    }

    impl TowerView {
        /// Iterator over the captured snapshots in identifier order.
        pub fn iter(&self) -> impl Iterator<Item = &TowerSnapshot> {
            self.snapshots.iter()
        }

        /// Number of placed towers.
        #[must_use]
        pub fn len(&self) -> usize {
            self.snapshots.len()
        }

        /// Whether no tower is placed.
        #[must_use]
        pub fn is_empty(&self) -> bool {
            self.snapshots.is_empty()
        }
    }

    /// Immutable representation of a single tower used for queries.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct TowerSnapshot {
        /// Unique identifier assigned to the tower.
        pub id: TowerId,
        /// Tile occupied by the tower.
        pub tile: TileCoord,
        /// Direction the tower faces.
        pub facing: Direction,
        /// Ticks remaining until the next attack.
        pub countdown: u32,
    }

    /// Immutable representation of a projectile in flight.
    #[derive(Clone, Copy, Debug, PartialEq)]
    pub struct ProjectileSnapshot {
        /// Unique identifier assigned to the projectile.
        pub id: ProjectileId,
        /// Current world position.
        pub position: WorldPoint,
        /// Unit vector of travel.
        pub heading: WorldPoint,
        /// Ticks left before the projectile expires.
        pub remaining: u32,
    }

    /// Read-only world state handed to targeting and effect resolution.
    #[derive(Clone, Debug)]
    pub struct WorldInfo<'a> {
        graph: &'a TileGraph,
        enemies: EnemyView,
        towers: TowerView,
        pings: Vec<(TileCoord, u32)>,
        counters: WorldCounters,
        tick: u64,
    }

    impl<'a> WorldInfo<'a> {
        /// Board graph.
        #[must_use]
        pub fn graph(&self) -> &'a TileGraph {
            self.graph
        }

        /// Living enemies.
        #[must_use]
        pub fn enemies(&self) -> &EnemyView {
            &self.enemies
        }

        /// Placed towers.
        #[must_use]
        pub fn towers(&self) -> &TowerView {
            &self.towers
        }

        /// Highlighted tiles with their remaining ticks.
        #[must_use]
        pub fn pings(&self) -> &[(TileCoord, u32)] {
            &self.pings
        }

        /// Running totals.
        #[must_use]
        pub fn counters(&self) -> WorldCounters {
            self.counters
        }

        /// Number of ticks simulated when the snapshot was taken.
        #[must_use]
        pub fn tick(&self) -> u64 {
            self.tick
        }
    }
}
