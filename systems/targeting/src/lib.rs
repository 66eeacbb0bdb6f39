#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that resolves the targets of a card effect from world snapshots.

use std::collections::{BTreeMap, BTreeSet};

use card_defence_core::{
    Activation, AreaOfEffectGrid, BrushValue, Direction, EnemyId, TargetSelection, TargetType,
    Targeting, TargetingError, TileCoord,
};
use card_defence_world::query::WorldInfo;

/// Immutable set of targets produced for one predicate invocation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TargetInfo {
    target_type: TargetType,
    origin: TileCoord,
    facing: Direction,
    tiles: BTreeSet<TileCoord>,
    units: BTreeSet<EnemyId>,
    player: bool,
    brushes: BTreeMap<TileCoord, BrushValue>,
}

impl TargetInfo {
    fn empty(target_type: TargetType, activation: &Activation) -> Self {
        Self {
            target_type,
            origin: activation.origin,
            facing: activation.facing,
            tiles: BTreeSet::new(),
            units: BTreeSet::new(),
            player: false,
            brushes: BTreeMap::new(),
        }
    }

    /// Kind of target the resolution was performed for.
    #[must_use]
    pub const fn target_type(&self) -> TargetType {
        self.target_type
    }

    /// Tile the activation originated from.
    #[must_use]
    pub const fn origin(&self) -> TileCoord {
        self.origin
    }

    /// Direction the activation was oriented toward.
    #[must_use]
    pub const fn facing(&self) -> Direction {
        self.facing
    }

    /// Targeted board tiles in coordinate order.
    pub fn tiles(&self) -> impl Iterator<Item = TileCoord> + '_ {
        self.tiles.iter().copied()
    }

    /// Targeted enemies in identifier order.
    pub fn units(&self) -> impl Iterator<Item = EnemyId> + '_ {
        self.units.iter().copied()
    }

    /// Whether the player is targeted.
    #[must_use]
    pub const fn targets_player(&self) -> bool {
        self.player
    }

    /// Brush value that selected the tile, for area targeting.
    #[must_use]
    pub fn brush(&self, tile: TileCoord) -> Option<BrushValue> {
        self.brushes.get(&tile).copied()
    }

    /// Number of targets of the resolved kind.
    #[must_use]
    pub fn len(&self) -> usize {
        match self.target_type {
            TargetType::Tiles => self.tiles.len(),
            TargetType::Units => self.units.len(),
            TargetType::Player => usize::from(self.player),
        }
    }

    /// Whether nothing of the resolved kind was targeted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Resolves targeting rules against a world snapshot.
///
/// Resolution is deterministic: identical inputs produce identical
/// [`TargetInfo`] values.
#[derive(Clone, Copy, Debug, Default)]
pub struct TargetResolver;

impl TargetResolver {
    /// Creates a new target resolver.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Resolves `targeting` into targets of the `required` kind.
    pub fn resolve(
        &self,
        targeting: &Targeting,
        required: TargetType,
        activation: &Activation,
        world: &WorldInfo<'_>,
    ) -> Result<TargetInfo, TargetingError> {
        match targeting {
            Targeting::Origin => resolve_origin(required, activation, world),
            Targeting::Single => resolve_single(required, activation, world),
            Targeting::Area(grid) => resolve_area(grid, required, activation, world),
        }
    }
}

fn resolve_origin(
    required: TargetType,
    activation: &Activation,
    world: &WorldInfo<'_>,
) -> Result<TargetInfo, TargetingError> {
    let mut info = TargetInfo::empty(required, activation);
    if required == TargetType::Player {
        info.player = true;
        return Ok(info);
    }
    if !world.graph().contains(activation.origin) {
        return Err(TargetingError::UnknownTile(activation.origin));
    }
    let _ = info.tiles.insert(activation.origin);
    if required == TargetType::Units {
        collect_units(&mut info, world);
    }
    Ok(info)
}

fn resolve_single(
    required: TargetType,
    activation: &Activation,
    world: &WorldInfo<'_>,
) -> Result<TargetInfo, TargetingError> {
    let selection = activation
        .target
        .ok_or(TargetingError::MissingTarget { required })?;
    let provided = selection.target_type();
    if provided != required {
        return Err(TargetingError::Mismatch { required, provided });
    }

    let mut info = TargetInfo::empty(required, activation);
    match selection {
        TargetSelection::Tile(tile) => {
            if !world.graph().contains(tile) {
                return Err(TargetingError::UnknownTile(tile));
            }
            let _ = info.tiles.insert(tile);
        }
        TargetSelection::Unit(enemy) => {
            let snapshot = world
                .enemies()
                .get(enemy)
                .ok_or(TargetingError::UnknownUnit(enemy))?;
            let _ = info.tiles.insert(snapshot.occupied);
            let _ = info.units.insert(enemy);
        }
        TargetSelection::Player => info.player = true,
    }
    Ok(info)
}

fn resolve_area(
    grid: &AreaOfEffectGrid,
    required: TargetType,
    activation: &Activation,
    world: &WorldInfo<'_>,
) -> Result<TargetInfo, TargetingError> {
    if required == TargetType::Player {
        return Err(TargetingError::AreaCannotTargetPlayer);
    }

    let mut info = TargetInfo::empty(required, activation);
    let projected = grid.project(activation.origin, activation.facing.rotation());
    let covered = projected.len();
    for cell in projected {
        if !world.graph().contains(cell.tile) {
            continue;
        }
        let _ = info.tiles.insert(cell.tile);
        let _ = info.brushes.insert(cell.tile, cell.value);
    }
    tracing::trace!(
        origin = %activation.origin,
        covered,
        on_board = info.tiles.len(),
        "area projected"
    );

    if required == TargetType::Units {
        collect_units(&mut info, world);
    }
    Ok(info)
}

fn collect_units(info: &mut TargetInfo, world: &WorldInfo<'_>) {
    for enemy in world.enemies().iter() {
        if info.tiles.contains(&enemy.occupied) {
            let _ = info.units.insert(enemy.id);
        }
    }
}
