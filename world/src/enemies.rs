//! Enemy movement along tile exits.

use card_defence_core::{
    ConfigurationError, EnemyConfig, EnemyId, TileCoord, WorldPoint, ARRIVAL_EPSILON,
};

use crate::graph::TileGraph;

/// Movement state of an enemy.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum EnemyState {
    /// Walking the edge between two tiles.
    Traveling {
        /// Tile the edge starts at. This is the tile the enemy is tracked on.
        from: TileCoord,
        /// Tile the edge leads to.
        to: TileCoord,
        /// Fraction of the edge covered so far.
        progress: f32,
    },
    /// Resting on a tile without an exit.
    Idle {
        /// Tile the enemy rests on.
        tile: TileCoord,
    },
}

/// Outcome of advancing an enemy by one tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum EnemyStep {
    /// The enemy moved along its current edge.
    Moving,
    /// The enemy finished an edge and continues along the next one.
    Advanced { from: TileCoord, to: TileCoord },
    /// The enemy finished an edge and came to rest.
    Arrived { from: TileCoord, to: TileCoord },
    /// The enemy was already resting.
    Resting,
}

#[derive(Clone, Debug)]
pub(crate) struct Enemy {
    pub(crate) id: EnemyId,
    pub(crate) state: EnemyState,
    pub(crate) health: i32,
    step: f32,
}

impl Enemy {
    pub(crate) fn spawn(
        id: EnemyId,
        tile: TileCoord,
        config: EnemyConfig,
        graph: &TileGraph,
    ) -> Result<Self, ConfigurationError> {
        config.validate()?;
        if !graph.contains(tile) {
            return Err(ConfigurationError::UnknownTile(tile));
        }
        let state = match graph.exit(tile) {
            Some(to) => EnemyState::Traveling {
                from: tile,
                to,
                progress: 0.0,
            },
            None if graph.is_destination(tile) => EnemyState::Idle { tile },
            None => return Err(ConfigurationError::NoExit(tile)),
        };
        Ok(Self {
            id,
            state,
            health: config.health,
            step: config.step,
        })
    }

    pub(crate) fn advance(&mut self, graph: &TileGraph) -> EnemyStep {
        let EnemyState::Traveling { from, to, progress } = self.state else {
            return EnemyStep::Resting;
        };

        let progress = progress + self.step;
        if progress < 1.0 - ARRIVAL_EPSILON {
            self.state = EnemyState::Traveling { from, to, progress };
            return EnemyStep::Moving;
        }

        match graph.exit(to) {
            Some(next) => {
                self.state = EnemyState::Traveling {
                    from: to,
                    to: next,
                    progress: 0.0,
                };
                EnemyStep::Advanced { from, to }
            }
            None => {
                self.state = EnemyState::Idle { tile: to };
                EnemyStep::Arrived { from, to }
            }
        }
    }

    /// Tile the enemy is tracked on for routing.
    pub(crate) fn tile(&self) -> TileCoord {
        match self.state {
            EnemyState::Traveling { from, .. } => from,
            EnemyState::Idle { tile } => tile,
        }
    }

    /// Tile the enemy physically stands on for targeting.
    pub(crate) fn occupied_tile(&self) -> TileCoord {
        match self.state {
            EnemyState::Traveling { from, progress, .. } if progress < 0.5 => from,
            EnemyState::Traveling { to, .. } => to,
            EnemyState::Idle { tile } => tile,
        }
    }

    pub(crate) fn position(&self, graph: &TileGraph) -> WorldPoint {
        match self.state {
            EnemyState::Traveling { from, to, progress } => {
                let start = graph.position(from).unwrap_or_default();
                let end = graph.position(to).unwrap_or_default();
                start.lerp(end, progress.min(1.0))
            }
            EnemyState::Idle { tile } => graph.position(tile).unwrap_or_default(),
        }
    }

    /// Removes health and returns what remains.
    pub(crate) fn take_damage(&mut self, amount: i32) -> i32 {
        self.health = self.health.saturating_sub(amount);
        self.health
    }

    pub(crate) fn is_dead(&self) -> bool {
        self.health < 0
    }
}
