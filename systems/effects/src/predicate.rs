//! Behaviour of the predicate family.

use card_defence_core::{
    Command, DamageUnits, Diagnostic, Direction, LaunchProjectile, PingTiles, Predicate,
    SpawnEnemies, TargetType, WorldPoint,
};
use card_defence_system_targeting::TargetInfo;
use card_defence_world::query::WorldInfo;
use glam::Vec2;

use crate::ResolutionInfo;

/// A single effect rule applied to a resolved set of targets.
///
/// `perform` must not touch the world directly. It queues commands on the
/// [`ResolutionInfo`], which the pipeline applies once the predicate returns.
/// Performing a predicate twice queues its commands twice.
pub trait EffectPredicate {
    /// Kind of target the predicate acts on.
    fn target_type(&self) -> TargetType;

    /// Queues the predicate's world mutations for the provided targets.
    fn perform(
        &self,
        targets: &TargetInfo,
        world: &WorldInfo<'_>,
        resolution: &mut ResolutionInfo,
    );

    /// Card text describing the predicate, optionally enriched with live state.
    fn description(&self, world: Option<&WorldInfo<'_>>) -> String;
}

impl EffectPredicate for PingTiles {
    fn target_type(&self) -> TargetType {
        TargetType::Tiles
    }

    fn perform(
        &self,
        targets: &TargetInfo,
        _world: &WorldInfo<'_>,
        resolution: &mut ResolutionInfo,
    ) {
        for tile in targets.tiles() {
            resolution.push_command(Command::PingTile {
                tile,
                ticks: self.ticks,
            });
        }
    }

    fn description(&self, _world: Option<&WorldInfo<'_>>) -> String {
        format!("Ping tiles for {} ticks", self.ticks)
    }
}

impl EffectPredicate for DamageUnits {
    fn target_type(&self) -> TargetType {
        TargetType::Units
    }

    fn perform(
        &self,
        targets: &TargetInfo,
        _world: &WorldInfo<'_>,
        resolution: &mut ResolutionInfo,
    ) {
        for enemy in targets.units() {
            resolution.push_command(Command::DamageEnemy {
                enemy,
                amount: self.amount,
            });
        }
    }

    fn description(&self, world: Option<&WorldInfo<'_>>) -> String {
        let text = format!("Deal {} damage to each enemy", self.amount);
        match world {
            Some(world) => format!("{text} ({} on the board)", world.enemies().len()),
            None => text,
        }
    }
}

impl EffectPredicate for SpawnEnemies {
    fn target_type(&self) -> TargetType {
        TargetType::Tiles
    }

    fn perform(
        &self,
        targets: &TargetInfo,
        _world: &WorldInfo<'_>,
        resolution: &mut ResolutionInfo,
    ) {
        for tile in targets.tiles() {
            resolution.push_command(Command::SpawnEnemy {
                tile,
                config: self.enemy,
            });
        }
    }

    fn description(&self, _world: Option<&WorldInfo<'_>>) -> String {
        format!("Spawn an enemy with {} health", self.enemy.health)
    }
}

impl EffectPredicate for LaunchProjectile {
    fn target_type(&self) -> TargetType {
        TargetType::Tiles
    }

    fn perform(
        &self,
        targets: &TargetInfo,
        world: &WorldInfo<'_>,
        resolution: &mut ResolutionInfo,
    ) {
        let facing = facing_rotation(targets.facing());
        let displacement = facing.rotate(to_vec(self.displacement));
        let heading = Vec2::from_angle(self.rotation_degrees.to_radians())
            .rotate(to_vec(targets.facing().unit()));

        for tile in targets.tiles() {
            let Some(centre) = world.graph().position(tile) else {
                continue;
            };
            let position = to_vec(centre) + displacement;
            resolution.push_command(Command::SpawnProjectile {
                position: to_point(position),
                heading: to_point(heading),
                config: self.projectile,
            });
        }
    }

    fn description(&self, _world: Option<&WorldInfo<'_>>) -> String {
        format!("Projectile dealing {} damage", self.projectile.damage)
    }
}

impl EffectPredicate for Diagnostic {
    fn target_type(&self) -> TargetType {
        self.target_type
    }

    fn perform(
        &self,
        targets: &TargetInfo,
        world: &WorldInfo<'_>,
        resolution: &mut ResolutionInfo,
    ) {
        resolution.note(format!(
            "tick {}: {} {} targeted from {}",
            world.tick(),
            targets.len(),
            self.target_type,
            targets.origin()
        ));
    }

    fn description(&self, _world: Option<&WorldInfo<'_>>) -> String {
        format!("Report targeted {}", self.target_type)
    }
}

impl EffectPredicate for Predicate {
    fn target_type(&self) -> TargetType {
        match self {
            Self::PingTiles(predicate) => predicate.target_type(),
            Self::DamageUnits(predicate) => predicate.target_type(),
            Self::SpawnEnemies(predicate) => predicate.target_type(),
            Self::LaunchProjectile(predicate) => predicate.target_type(),
            Self::Diagnostic(predicate) => predicate.target_type(),
        }
    }

    fn perform(
        &self,
        targets: &TargetInfo,
        world: &WorldInfo<'_>,
        resolution: &mut ResolutionInfo,
    ) {
        match self {
            Self::PingTiles(predicate) => predicate.perform(targets, world, resolution),
            Self::DamageUnits(predicate) => predicate.perform(targets, world, resolution),
            Self::SpawnEnemies(predicate) => predicate.perform(targets, world, resolution),
            Self::LaunchProjectile(predicate) => predicate.perform(targets, world, resolution),
            Self::Diagnostic(predicate) => predicate.perform(targets, world, resolution),
        }
    }

    fn description(&self, world: Option<&WorldInfo<'_>>) -> String {
        match self {
            Self::PingTiles(predicate) => predicate.description(world),
            Self::DamageUnits(predicate) => predicate.description(world),
            Self::SpawnEnemies(predicate) => predicate.description(world),
            Self::LaunchProjectile(predicate) => predicate.description(world),
            Self::Diagnostic(predicate) => predicate.description(world),
        }
    }
}

/// Rotation that turns a north-facing layout toward `facing`.
fn facing_rotation(facing: Direction) -> Vec2 {
    let degrees = facing.rotation().degrees() as f32;
    Vec2::from_angle(degrees.to_radians())
}

fn to_vec(point: WorldPoint) -> Vec2 {
    Vec2::new(point.x(), point.y())
}

fn to_point(vector: Vec2) -> WorldPoint {
    WorldPoint::new(vector.x, vector.y)
}
