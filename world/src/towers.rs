//! Authoritative tower state management utilities.

use std::collections::BTreeMap;

use card_defence_core::{ConfigurationError, Direction, TileCoord, TowerConfig, TowerId};

/// Signals produced by a tower during a single tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct TowerSignals {
    pub(crate) animate: bool,
    pub(crate) fire: bool,
}

/// State of a tower stored inside the world.
#[derive(Clone, Debug)]
pub(crate) struct TowerState {
    /// Identifier allocated by the world for the tower.
    pub(crate) id: TowerId,
    /// Tile occupied by the tower.
    pub(crate) tile: TileCoord,
    /// Direction the tower faces.
    pub(crate) facing: Direction,
    /// Timer and attack configuration.
    pub(crate) config: TowerConfig,
    /// Ticks remaining until the next attack.
    pub(crate) countdown: u32,
}

impl TowerState {
    /// Advances the countdown by one tick.
    ///
    /// The animation is signalled when the countdown equals the animation
    /// lead. On reaching zero the tower fires and the countdown is refilled
    /// with the firing interval.
    pub(crate) fn tick(&mut self) -> TowerSignals {
        self.countdown = self.countdown.saturating_sub(1);
        let mut signals = TowerSignals {
            animate: self.countdown == self.config.animation_wait,
            fire: false,
        };
        if self.countdown == 0 {
            signals.fire = true;
            self.countdown = self.config.projectile_interval;
        }
        signals
    }
}

/// Registry that stores towers and manages identifier allocation.
#[derive(Debug)]
pub(crate) struct TowerRegistry {
    entries: BTreeMap<TowerId, TowerState>,
    next_tower_id: TowerId,
}

impl TowerRegistry {
    /// Creates an empty tower registry with a reset identifier counter.
    pub(crate) fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            next_tower_id: TowerId::new(0),
        }
    }

    /// Validates and stores a new tower, allocating its identifier.
    pub(crate) fn place(
        &mut self,
        tile: TileCoord,
        facing: Direction,
        config: TowerConfig,
    ) -> Result<TowerId, ConfigurationError> {
        config.validate()?;
        let id = self.next_tower_id;
        self.next_tower_id = TowerId::new(id.get().saturating_add(1));
        let countdown = config
            .initial_wait
            .saturating_add(config.projectile_interval);
        let _ = self.entries.insert(
            id,
            TowerState {
                id,
                tile,
                facing,
                config,
                countdown,
            },
        );
        Ok(id)
    }

    pub(crate) fn get(&self, id: TowerId) -> Option<&TowerState> {
        self.entries.get(&id)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &TowerState> {
        self.entries.values()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut TowerState> {
        self.entries.values_mut()
    }
}
