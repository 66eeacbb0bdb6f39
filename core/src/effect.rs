//! Persisted card effect contracts.
//!
//! These types describe *what* an effect does. Resolving targets and
//! performing predicates lives in the targeting and effects systems.

use serde::{Deserialize, Serialize};

use crate::{AreaOfEffectGrid, EnemyConfig, ProjectileConfig, TargetType, WorldPoint};

/// How the targets of an effect are selected.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Targeting {
    /// The activation's origin tile.
    #[default]
    Origin,
    /// The explicit target attached to the activation.
    Single,
    /// Tiles covered by the grid, anchored on the origin and rotated to the facing.
    Area(AreaOfEffectGrid),
}

/// Highlights every targeted tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PingTiles {
    /// Number of ticks the highlight lasts.
    pub ticks: u32,
}

impl Default for PingTiles {
    fn default() -> Self {
        Self { ticks: 60 }
    }
}

/// Damages every targeted enemy once.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DamageUnits {
    /// Damage applied to each enemy.
    pub amount: i32,
}

/// Spawns one enemy on every targeted tile.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SpawnEnemies {
    /// Configuration of each spawned enemy.
    pub enemy: EnemyConfig,
}

/// Launches a projectile from every targeted tile.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LaunchProjectile {
    /// Flight parameters of the projectile.
    pub projectile: ProjectileConfig,
    /// Clockwise offset from the activation facing, in degrees.
    pub rotation_degrees: f32,
    /// Offset of the launch point from the tile centre, before rotating to the facing.
    pub displacement: WorldPoint,
}

/// Records how many targets were resolved without touching the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Kind of target to resolve.
    pub target_type: TargetType,
}

/// Closed set of predicates a card effect can declare.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Predicate {
    /// See [`PingTiles`].
    PingTiles(PingTiles),
    /// See [`DamageUnits`].
    DamageUnits(DamageUnits),
    /// See [`SpawnEnemies`].
    SpawnEnemies(SpawnEnemies),
    /// See [`LaunchProjectile`].
    LaunchProjectile(LaunchProjectile),
    /// See [`Diagnostic`].
    Diagnostic(Diagnostic),
}

/// One effect of a card: a targeting rule and the predicates applied to it.
///
/// Predicates resolve in declaration order.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CardEffect {
    /// How targets are selected for every predicate of the effect.
    pub targeting: Targeting,
    /// Predicates applied in order.
    pub predicates: Vec<Predicate>,
}

impl CardEffect {
    /// Creates an effect from a targeting rule and its predicates.
    #[must_use]
    pub fn new(targeting: Targeting, predicates: Vec<Predicate>) -> Self {
        Self {
            targeting,
            predicates,
        }
    }

    /// Effect that launches a single projectile from the origin tile.
    #[must_use]
    pub fn projectile(launch: LaunchProjectile) -> Self {
        Self::new(Targeting::Origin, vec![Predicate::LaunchProjectile(launch)])
    }
}
