#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! System that resolves tower attacks once the world reports them ready.

use card_defence_core::{Activation, Event, TowerId};
use card_defence_system_effects::EffectPipeline;
use card_defence_world::{query, World};

/// Tower combat system that resolves the attack effect of every tower that fired.
#[derive(Debug, Default)]
pub struct TowerCombat {
    pipeline: EffectPipeline,
    scratch: Vec<(TowerId, Activation)>,
}

impl TowerCombat {
    /// Creates a new tower combat system with empty scratch buffers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Activates the attack of every tower that fired among `events`.
    ///
    /// Attacks resolve in event order with the tower tile as origin and the
    /// tower facing as facing. Events produced by the attacks are appended to
    /// `out_events`.
    pub fn handle(&mut self, world: &mut World, events: &[Event], out_events: &mut Vec<Event>) {
        self.scratch.clear();
        for event in events {
            if let Event::TowerFired {
                tower,
                tile,
                facing,
            } = event
            {
                self.scratch.push((*tower, Activation::new(*tile, *facing)));
            }
        }

        for (tower, activation) in self.scratch.drain(..) {
            let Some(attack) = query::tower_attack(world, tower).cloned() else {
                tracing::debug!(%tower, "fired tower no longer exists");
                continue;
            };
            let resolution = self.pipeline.activate(
                world,
                std::slice::from_ref(&attack),
                &activation,
                out_events,
            );
            if !resolution.skipped().is_empty() {
                tracing::warn!(
                    %tower,
                    skipped = resolution.skipped().len(),
                    "tower attack partially resolved"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use card_defence_core::{
        CardEffect, Command, Direction, LaunchProjectile, PingTiles, Predicate, ProjectileConfig,
        Targeting, TileCoord, TowerConfig, WorldPoint,
    };
    use card_defence_world::{self as world, BoardLayout, TileGraph};

    fn board_with_tower(attack: CardEffect) -> World {
        let graph = TileGraph::from_layout(&BoardLayout::rectangle(3, 1, 1.0)).expect("graph");
        let mut world = World::new(graph);
        let mut events = Vec::new();
        world::apply(
            &mut world,
            Command::PlaceTower {
                tile: TileCoord::new(1, 0),
                facing: Direction::East,
                config: TowerConfig {
                    initial_wait: 0,
                    animation_wait: 0,
                    projectile_interval: 1,
                    attack,
                },
            },
            &mut events,
        );
        world
    }

    fn fired() -> Event {
        Event::TowerFired {
            tower: TowerId::new(0),
            tile: TileCoord::new(1, 0),
            facing: Direction::East,
        }
    }

    #[test]
    fn unrelated_events_are_ignored() {
        let mut world = board_with_tower(CardEffect::default());
        let mut system = TowerCombat::new();
        let mut out = Vec::new();

        system.handle(&mut world, &[Event::TimeAdvanced { tick: 1 }], &mut out);

        assert!(out.is_empty());
    }

    #[test]
    fn projectile_attack_spawns_from_tower_tile() {
        let launch = LaunchProjectile {
            projectile: ProjectileConfig {
                damage: 3,
                ..ProjectileConfig::default()
            },
            ..LaunchProjectile::default()
        };
        let mut world = board_with_tower(CardEffect::projectile(launch));
        let mut system = TowerCombat::new();
        let mut out = Vec::new();

        system.handle(&mut world, &[fired()], &mut out);

        assert!(matches!(
            out.as_slice(),
            [Event::ProjectileSpawned { position, .. }] if *position == WorldPoint::new(1.0, 0.0)
        ));
        let projectiles = query::projectile_view(&world);
        assert_eq!(projectiles.len(), 1);
        assert_eq!(projectiles[0].heading, WorldPoint::new(1.0, 0.0));
    }

    #[test]
    fn attack_can_be_any_effect() {
        let pulse = CardEffect::new(
            Targeting::Origin,
            vec![Predicate::PingTiles(PingTiles { ticks: 3 })],
        );
        let mut world = board_with_tower(pulse);
        let mut system = TowerCombat::new();
        let mut out = Vec::new();

        system.handle(&mut world, &[fired()], &mut out);

        assert_eq!(
            out,
            vec![Event::TilePinged {
                tile: TileCoord::new(1, 0),
                ticks: 3,
            }]
        );
    }

    #[test]
    fn unknown_tower_is_skipped() {
        let mut world = board_with_tower(CardEffect::default());
        let mut system = TowerCombat::new();
        let mut out = Vec::new();
        let ghost = Event::TowerFired {
            tower: TowerId::new(7),
            tile: TileCoord::new(0, 0),
            facing: Direction::North,
        };

        system.handle(&mut world, &[ghost], &mut out);

        assert!(out.is_empty());
    }
}
