#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Card Defence engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and the targeting/effect systems. Callers submit
//! [`Command`] values describing desired mutations, the world executes those
//! commands via its `apply` entry point, and then pushes [`Event`] values into
//! a tick-local outbox for systems and the presentation layer to consume.
//! Persisted data contracts (area-of-effect grids, card effects, entity
//! configuration) live here as well so every crate agrees on their shape.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

mod area;
mod card;
mod effect;

pub use area::{AreaCell, AreaOfEffectGrid, BrushValue, PersistedArea, ProjectedCell};
pub use card::{CardType, ManaCost, ManaType, TowerSubtype};
pub use effect::{
    CardEffect, DamageUnits, Diagnostic, LaunchProjectile, PingTiles, Predicate, SpawnEnemies,
    Targeting,
};

/// Fraction of an edge below `1.0` at which an enemy counts as arrived.
///
/// Progress is advanced in fixed increments, so arrival is tested against a
/// small tolerance instead of an exact `1.0`.
pub const ARRIVAL_EPSILON: f32 = 0.02;

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Advances the simulation by exactly one fixed timestep.
    Tick,
    /// Requests that an enemy be spawned on the provided tile.
    SpawnEnemy {
        /// Tile the enemy starts on.
        tile: TileCoord,
        /// Health and movement parameters of the enemy.
        config: EnemyConfig,
    },
    /// Requests placement of a tower on the provided tile.
    PlaceTower {
        /// Tile the tower occupies.
        tile: TileCoord,
        /// Direction the tower faces.
        facing: Direction,
        /// Timer and attack configuration of the tower.
        config: TowerConfig,
    },
    /// Requests that a projectile be launched from a world position.
    SpawnProjectile {
        /// World position the projectile starts at.
        position: WorldPoint,
        /// Unit vector describing the direction of travel.
        heading: WorldPoint,
        /// Speed, damage and lifetime parameters of the projectile.
        config: ProjectileConfig,
    },
    /// Applies damage to an enemy.
    DamageEnemy {
        /// Enemy receiving the damage.
        enemy: EnemyId,
        /// Amount of health removed.
        amount: i32,
    },
    /// Highlights a tile for a number of ticks.
    PingTile {
        /// Tile to highlight.
        tile: TileCoord,
        /// Number of ticks the highlight lasts.
        ticks: u32,
    },
}

/// Notifications pushed by the world after processing commands.
///
/// Events are fire-and-forget: the world never waits for a consumer to
/// acknowledge them.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Indicates that the simulation clock advanced by one tick.
    TimeAdvanced {
        /// Index of the tick that just completed, starting at one.
        tick: u64,
    },
    /// Confirms that an enemy entered the simulation.
    EnemySpawned {
        /// Identifier assigned to the enemy.
        enemy: EnemyId,
        /// Tile the enemy starts on.
        tile: TileCoord,
    },
    /// Reports that an enemy spawn request was rejected.
    EnemySpawnRejected {
        /// Tile provided in the spawn request.
        tile: TileCoord,
        /// Reason the configuration was refused.
        reason: ConfigurationError,
    },
    /// Confirms that an enemy finished an edge and now tracks a new tile.
    EnemyAdvanced {
        /// Enemy that advanced.
        enemy: EnemyId,
        /// Tile the finished edge started at.
        from: TileCoord,
        /// Tile the enemy reached.
        to: TileCoord,
    },
    /// Announces that an enemy reached a tile with no further exit.
    EnemyArrived {
        /// Enemy that stopped.
        enemy: EnemyId,
        /// Tile the enemy rests on.
        tile: TileCoord,
    },
    /// Reports damage applied to an enemy.
    EnemyDamaged {
        /// Enemy that took damage.
        enemy: EnemyId,
        /// Amount of health removed.
        amount: i32,
        /// Health remaining after the damage.
        health: i32,
    },
    /// Reports that damage addressed an enemy that is no longer alive.
    DamageMissed {
        /// Enemy the damage was addressed to.
        enemy: EnemyId,
    },
    /// Reports that damage was refused before touching the enemy.
    DamageRejected {
        /// Enemy the damage was addressed to.
        enemy: EnemyId,
        /// Reason the damage was refused.
        reason: ConfigurationError,
    },
    /// Announces that an enemy died and was removed from the simulation.
    EnemyDied {
        /// Enemy that died.
        enemy: EnemyId,
        /// Tile the enemy occupied when it died.
        tile: TileCoord,
    },
    /// Confirms that a tower was placed.
    TowerPlaced {
        /// Identifier assigned to the tower.
        tower: TowerId,
        /// Tile the tower occupies.
        tile: TileCoord,
        /// Direction the tower faces.
        facing: Direction,
    },
    /// Reports that a tower placement request was rejected.
    TowerPlacementRejected {
        /// Tile provided in the placement request.
        tile: TileCoord,
        /// Reason the configuration was refused.
        reason: ConfigurationError,
    },
    /// Signals the presentation layer to play a tower's attack animation.
    TowerAttackAnimation {
        /// Tower that is about to attack.
        tower: TowerId,
    },
    /// Reports that a tower's countdown elapsed and its attack should resolve.
    TowerFired {
        /// Tower that fired.
        tower: TowerId,
        /// Tile the tower occupies.
        tile: TileCoord,
        /// Direction the tower faces.
        facing: Direction,
    },
    /// Confirms that a projectile was launched.
    ProjectileSpawned {
        /// Identifier assigned to the projectile.
        projectile: ProjectileId,
        /// World position the projectile starts at.
        position: WorldPoint,
    },
    /// Reports that a projectile launch request was rejected.
    ProjectileSpawnRejected {
        /// Reason the configuration was refused.
        reason: ConfigurationError,
    },
    /// Reports that a projectile struck an enemy and was consumed.
    ProjectileHit {
        /// Projectile that struck.
        projectile: ProjectileId,
        /// Enemy that was struck.
        enemy: EnemyId,
    },
    /// Reports that a projectile ran out of lifetime without hitting anything.
    ProjectileExpired {
        /// Projectile that expired.
        projectile: ProjectileId,
    },
    /// Signals the presentation layer to highlight a tile.
    TilePinged {
        /// Tile to highlight.
        tile: TileCoord,
        /// Number of ticks the highlight lasts.
        ticks: u32,
    },
    /// Signals that a tile highlight ran out.
    TilePingExpired {
        /// Tile whose highlight ended.
        tile: TileCoord,
    },
}

/// Location of a board tile expressed as signed column and row coordinates.
///
/// `x` grows toward the east and `y` grows toward the south.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileCoord {
    x: i32,
    y: i32,
}

impl TileCoord {
    /// Creates a new tile coordinate.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Column of the tile.
    #[must_use]
    pub const fn x(&self) -> i32 {
        self.x
    }

    /// Row of the tile.
    #[must_use]
    pub const fn y(&self) -> i32 {
        self.y
    }

    /// Returns the coordinate shifted by the provided offset.
    ///
    /// `None` when either axis leaves the `i32` range.
    #[must_use]
    pub const fn offset(self, dx: i32, dy: i32) -> Option<Self> {
        match (self.x.checked_add(dx), self.y.checked_add(dy)) {
            (Some(x), Some(y)) => Some(Self::new(x, y)),
            _ => None,
        }
    }

    /// Returns the adjacent coordinate in the provided direction.
    #[must_use]
    pub const fn step(self, direction: Direction) -> Option<Self> {
        let (dx, dy) = direction.offset();
        self.offset(dx, dy)
    }

    /// Computes the Manhattan distance between two coordinates.
    #[must_use]
    pub fn manhattan_distance(self, other: TileCoord) -> u32 {
        self.x.abs_diff(other.x).saturating_add(self.y.abs_diff(other.y))
    }
}

impl fmt::Display for TileCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Position on the board flattened to two dimensions, in world units.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct WorldPoint {
    x: f32,
    y: f32,
}

impl WorldPoint {
    /// Creates a new world position.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Horizontal component.
    #[must_use]
    pub const fn x(&self) -> f32 {
        self.x
    }

    /// Vertical component.
    #[must_use]
    pub const fn y(&self) -> f32 {
        self.y
    }

    /// Euclidean distance to another position.
    #[must_use]
    pub fn distance(self, other: WorldPoint) -> f32 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// Linear interpolation toward `other` by `t` (not clamped).
    #[must_use]
    pub fn lerp(self, other: WorldPoint, t: f32) -> Self {
        Self::new(
            self.x + (other.x - self.x) * t,
            self.y + (other.y - self.y) * t,
        )
    }
}

/// Cardinal directions used for adjacency, facing, and exits.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Direction {
    /// Toward decreasing `y`.
    North,
    /// Toward increasing `x`.
    East,
    /// Toward increasing `y`.
    South,
    /// Toward decreasing `x`.
    West,
}

impl Direction {
    /// Every direction in clockwise order starting at north.
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    /// Returns the direction pointing the opposite way.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::North => Self::South,
            Self::East => Self::West,
            Self::South => Self::North,
            Self::West => Self::East,
        }
    }

    /// Tile offset of a single step in this direction.
    #[must_use]
    pub const fn offset(self) -> (i32, i32) {
        match self {
            Self::North => (0, -1),
            Self::East => (1, 0),
            Self::South => (0, 1),
            Self::West => (-1, 0),
        }
    }

    /// Position of the direction in [`Direction::ALL`].
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::North => 0,
            Self::East => 1,
            Self::South => 2,
            Self::West => 3,
        }
    }

    /// Unit vector of the direction in world space.
    #[must_use]
    pub fn unit(self) -> WorldPoint {
        let (dx, dy) = self.offset();
        WorldPoint::new(dx as f32, dy as f32)
    }

    /// Rotation that turns a north-facing layout into this direction.
    #[must_use]
    pub const fn rotation(self) -> Rotation {
        Rotation::from_quarter_turns(self.index() as i32)
    }
}

/// Clockwise rotation by a whole number of quarter turns.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rotation(u8);

impl Rotation {
    /// The identity rotation.
    pub const IDENTITY: Rotation = Rotation(0);

    /// Creates a rotation from a signed number of clockwise quarter turns.
    #[must_use]
    pub const fn from_quarter_turns(turns: i32) -> Self {
        Self(turns.rem_euclid(4) as u8)
    }

    /// Number of clockwise quarter turns in `0..4`.
    #[must_use]
    pub const fn quarter_turns(&self) -> u8 {
        self.0
    }

    /// Rotation expressed in degrees.
    #[must_use]
    pub const fn degrees(&self) -> u32 {
        self.0 as u32 * 90
    }

    /// Rotates a relative tile offset clockwise on the `y`-down board.
    #[must_use]
    pub const fn apply(&self, dx: i32, dy: i32) -> (i32, i32) {
        match self.0 {
            0 => (dx, dy),
            1 => (-dy, dx),
            2 => (-dx, -dy),
            _ => (dy, -dx),
        }
    }
}

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        pub struct $name(u32);

        impl $name {
            /// Creates a new identifier with the provided numeric value.
            #[must_use]
            pub const fn new(value: u32) -> Self {
                Self(value)
            }

            /// Retrieves the numeric representation of the identifier.
            #[must_use]
            pub const fn get(&self) -> u32 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "#{}", self.0)
            }
        }
    };
}

entity_id!(
    /// Unique identifier assigned to an enemy.
    EnemyId
);
entity_id!(
    /// Unique identifier assigned to a tower.
    TowerId
);
entity_id!(
    /// Unique identifier assigned to a projectile.
    ProjectileId
);

/// Kind of target a predicate requires.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TargetType {
    /// Board tiles.
    Tiles,
    /// Enemies occupying board tiles.
    Units,
    /// The player.
    Player,
}

impl fmt::Display for TargetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Tiles => "tiles",
            Self::Units => "units",
            Self::Player => "player",
        };
        f.write_str(label)
    }
}

/// Explicit target chosen by the player for single-target effects.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TargetSelection {
    /// A board tile.
    Tile(TileCoord),
    /// A living enemy.
    Unit(EnemyId),
    /// The player.
    Player,
}

impl TargetSelection {
    /// Kind of target the selection represents.
    #[must_use]
    pub const fn target_type(&self) -> TargetType {
        match self {
            Self::Tile(_) => TargetType::Tiles,
            Self::Unit(_) => TargetType::Units,
            Self::Player => TargetType::Player,
        }
    }
}

/// Origin, facing, and optional explicit target of one effect firing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Activation {
    /// Tile the effect originates from.
    pub origin: TileCoord,
    /// Direction the effect is oriented toward.
    pub facing: Direction,
    /// Target chosen for single-target effects.
    pub target: Option<TargetSelection>,
}

impl Activation {
    /// Creates an activation without an explicit target.
    #[must_use]
    pub const fn new(origin: TileCoord, facing: Direction) -> Self {
        Self {
            origin,
            facing,
            target: None,
        }
    }

    /// Attaches an explicit target to the activation.
    #[must_use]
    pub const fn with_target(mut self, target: TargetSelection) -> Self {
        self.target = Some(target);
        self
    }
}

/// Spawn parameters of an enemy.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct EnemyConfig {
    /// Starting health.
    pub health: i32,
    /// Fraction of an edge travelled per tick.
    pub step: f32,
}

impl Default for EnemyConfig {
    fn default() -> Self {
        Self {
            health: 1,
            step: 0.002,
        }
    }
}

impl EnemyConfig {
    /// Validates the configuration before the enemy enters the simulation.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.health <= 0 {
            return Err(ConfigurationError::NonPositiveHealth(self.health));
        }
        if !self.step.is_finite() || self.step <= 0.0 || self.step > 1.0 {
            return Err(ConfigurationError::InvalidStep(self.step));
        }
        Ok(())
    }
}

/// Flight parameters of a projectile.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProjectileConfig {
    /// World units travelled per tick.
    pub speed: f32,
    /// Damage applied on hit.
    pub damage: i32,
    /// Ticks the projectile survives without hitting anything.
    pub lifetime: u32,
    /// Distance within which an enemy counts as hit.
    pub hit_radius: f32,
}

impl Default for ProjectileConfig {
    fn default() -> Self {
        Self {
            speed: 0.1,
            damage: 5,
            lifetime: 120,
            hit_radius: 0.25,
        }
    }
}

impl ProjectileConfig {
    /// Validates the configuration before the projectile is launched.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if !self.speed.is_finite() || self.speed <= 0.0 {
            return Err(ConfigurationError::InvalidProjectileSpeed(self.speed));
        }
        if self.lifetime == 0 {
            return Err(ConfigurationError::ZeroProjectileLifetime);
        }
        if !self.hit_radius.is_finite() || self.hit_radius <= 0.0 {
            return Err(ConfigurationError::InvalidHitRadius(self.hit_radius));
        }
        if self.damage < 0 {
            return Err(ConfigurationError::NegativeDamage(self.damage));
        }
        Ok(())
    }
}

/// Timer and attack configuration of a tower.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TowerConfig {
    /// Extra ticks to wait after placement before the first attack cycle.
    pub initial_wait: u32,
    /// Ticks before an attack at which the attack animation is signalled.
    pub animation_wait: u32,
    /// Ticks between consecutive attacks.
    pub projectile_interval: u32,
    /// Effect resolved every time the tower fires.
    pub attack: CardEffect,
}

impl TowerConfig {
    /// Validates the configuration before the tower enters the simulation.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.projectile_interval == 0 {
            return Err(ConfigurationError::ZeroProjectileInterval);
        }
        if self.animation_wait >= self.projectile_interval {
            return Err(ConfigurationError::AnimationWaitTooLong {
                animation_wait: self.animation_wait,
                projectile_interval: self.projectile_interval,
            });
        }
        Ok(())
    }
}

/// Invalid entity parameters detected at spawn time.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum ConfigurationError {
    /// The requested tile is not part of the board.
    #[error("tile {0} is not part of the board")]
    UnknownTile(TileCoord),
    /// An enemy was spawned on a dead end that is not a destination.
    #[error("tile {0} has no outgoing edge and is not a destination")]
    NoExit(TileCoord),
    /// An enemy was configured with zero or negative health.
    #[error("enemy health must be positive, got {0}")]
    NonPositiveHealth(i32),
    /// An enemy step is not a finite fraction in `(0, 1]`.
    #[error("enemy step must lie in (0, 1], got {0}")]
    InvalidStep(f32),
    /// A tower was configured to never fire.
    #[error("tower projectile interval must be at least one tick")]
    ZeroProjectileInterval,
    /// A tower's animation lead does not fit inside its firing interval.
    #[error(
        "tower animation wait {animation_wait} must be shorter than its projectile interval {projectile_interval}"
    )]
    AnimationWaitTooLong {
        /// Configured animation lead in ticks.
        animation_wait: u32,
        /// Configured firing interval in ticks.
        projectile_interval: u32,
    },
    /// A projectile speed is zero, negative, or not finite.
    #[error("projectile speed must be positive and finite, got {0}")]
    InvalidProjectileSpeed(f32),
    /// A projectile heading has no direction.
    #[error("projectile heading must be a non-zero vector")]
    ZeroHeading,
    /// A projectile would expire before its first tick.
    #[error("projectile lifetime must be at least one tick")]
    ZeroProjectileLifetime,
    /// A projectile hit radius is zero, negative, or not finite.
    #[error("projectile hit radius must be positive and finite, got {0}")]
    InvalidHitRadius(f32),
    /// Damage would heal what it hits.
    #[error("damage must not be negative, got {0}")]
    NegativeDamage(i32),
}

/// A predicate's required target cannot be satisfied.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum TargetingError {
    /// A single-target effect was activated without a target.
    #[error("predicate requires a {required} target but none was selected")]
    MissingTarget {
        /// Target kind the predicate requires.
        required: TargetType,
    },
    /// The selected target is of the wrong kind.
    #[error("predicate requires a {required} target but {provided} was selected")]
    Mismatch {
        /// Target kind the predicate requires.
        required: TargetType,
        /// Target kind that was selected.
        provided: TargetType,
    },
    /// The selected tile is not part of the board.
    #[error("tile {0} is not part of the board")]
    UnknownTile(TileCoord),
    /// The selected enemy is not alive.
    #[error("enemy {0} is not alive")]
    UnknownUnit(EnemyId),
    /// Area effects resolve against the board and cannot reach the player.
    #[error("area effects cannot target the player")]
    AreaCannotTargetPlayer,
}

/// Persisted area-of-effect data is inconsistent.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum SerializationError {
    /// Bounds must be odd and at least one.
    #[error("area bounds {width}x{height} must be odd and non-zero")]
    InvalidBounds {
        /// Persisted width.
        width: u32,
        /// Persisted height.
        height: u32,
    },
    /// The palette must contain at least one effect value.
    #[error("area palette maximum {0} must be at least 1")]
    InvalidPalette(i8),
    /// A cell lies outside the persisted bounds.
    #[error("cell ({x}, {y}) lies outside {width}x{height}")]
    CellOutOfBounds {
        /// Column of the offending cell.
        x: u32,
        /// Row of the offending cell.
        y: u32,
        /// Persisted width.
        width: u32,
        /// Persisted height.
        height: u32,
    },
    /// A cell address appears more than once.
    #[error("cell ({x}, {y}) appears more than once")]
    DuplicateCell {
        /// Column of the offending cell.
        x: u32,
        /// Row of the offending cell.
        y: u32,
    },
    /// A cell holds a value outside the palette.
    #[error("cell ({x}, {y}) holds unknown brush value {value}")]
    UnknownBrush {
        /// Column of the offending cell.
        x: u32,
        /// Row of the offending cell.
        y: u32,
        /// Offending value.
        value: i8,
    },
    /// The anchor cell holds something other than the anchor value.
    #[error("anchor cell ({x}, {y}) holds {value} instead of the anchor value")]
    AnchorMismatch {
        /// Column of the anchor.
        x: u32,
        /// Row of the anchor.
        y: u32,
        /// Offending value.
        value: i8,
    },
}

/// Authoring operation on an area-of-effect grid was refused.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum AreaError {
    /// The cell lies outside the grid bounds.
    #[error("cell ({x}, {y}) lies outside the grid")]
    OutOfBounds {
        /// Requested column.
        x: u32,
        /// Requested row.
        y: u32,
    },
    /// The anchor cell is read-only.
    #[error("the anchor cell is fixed")]
    AnchorIsFixed,
    /// The value is not part of the palette.
    #[error("value {value} is outside the palette 0..={max_value}")]
    ValueOutsidePalette {
        /// Rejected value.
        value: i8,
        /// Current palette maximum.
        max_value: i8,
    },
    /// The palette must contain at least one effect value.
    #[error("palette maximum {0} must be at least 1")]
    PaletteTooSmall(i8),
    /// The requested bounds exceed the largest supported extent.
    #[error("bounds {width}x{height} exceed the largest extent {max}")]
    ExtentTooLarge {
        /// Requested width.
        width: u32,
        /// Requested height.
        height: u32,
        /// Largest accepted width or height.
        max: u32,
    },
}
