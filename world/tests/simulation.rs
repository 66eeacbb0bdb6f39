use card_defence_core::{
    CardEffect, Command, Direction, EnemyConfig, EnemyId, Event, ProjectileConfig, ProjectileId,
    TileCoord, TowerConfig, TowerId, WorldPoint,
};
use card_defence_world::{self as world, query, BoardLayout, EnemyState, TileGraph, World};

fn corridor(length: i32) -> World {
    let path: Vec<TileCoord> = (0..length).map(|x| TileCoord::new(x, 0)).collect();
    let layout = BoardLayout::rectangle(length as u32, 1, 1.0).with_route(&path);
    World::new(TileGraph::from_layout(&layout).expect("valid board"))
}

fn run(world: &mut World, commands: impl IntoIterator<Item = Command>) -> Vec<Event> {
    let mut events = Vec::new();
    for command in commands {
        world::apply(world, command, &mut events);
    }
    events
}

fn projectile(damage: i32) -> Command {
    Command::SpawnProjectile {
        position: WorldPoint::new(-0.5, 0.0),
        heading: WorldPoint::new(1.0, 0.0),
        config: ProjectileConfig {
            speed: 1.0,
            damage,
            lifetime: 10,
            hit_radius: 0.25,
        },
    }
}

#[test]
fn enemy_walks_route_and_rests_on_destination() {
    let mut world = corridor(3);
    let _ = run(
        &mut world,
        [Command::SpawnEnemy {
            tile: TileCoord::new(0, 0),
            config: EnemyConfig {
                health: 1,
                step: 0.5,
            },
        }],
    );

    let events = run(&mut world, std::iter::repeat(Command::Tick).take(4));
    let movement: Vec<&Event> = events
        .iter()
        .filter(|event| {
            matches!(
                event,
                Event::EnemyAdvanced { .. } | Event::EnemyArrived { .. }
            )
        })
        .collect();

    let enemy = EnemyId::new(0);
    assert_eq!(
        movement,
        vec![
            &Event::EnemyAdvanced {
                enemy,
                from: TileCoord::new(0, 0),
                to: TileCoord::new(1, 0),
            },
            &Event::EnemyAdvanced {
                enemy,
                from: TileCoord::new(1, 0),
                to: TileCoord::new(2, 0),
            },
            &Event::EnemyArrived {
                enemy,
                tile: TileCoord::new(2, 0),
            },
        ]
    );

    let snapshot = query::enemy_view(&world).into_vec().remove(0);
    assert_eq!(
        snapshot.state,
        EnemyState::Idle {
            tile: TileCoord::new(2, 0)
        }
    );
    assert_eq!(query::counters(&world).enemies_arrived, 1);
}

#[test]
fn two_hits_in_one_tick_kill_once() {
    let mut world = corridor(3);
    let _ = run(
        &mut world,
        [
            Command::SpawnEnemy {
                tile: TileCoord::new(0, 0),
                config: EnemyConfig {
                    health: 3,
                    step: 0.01,
                },
            },
            projectile(5),
            projectile(5),
        ],
    );

    let events = run(&mut world, [Command::Tick]);
    let enemy = EnemyId::new(0);

    assert_eq!(
        events,
        vec![
            Event::TimeAdvanced { tick: 1 },
            Event::ProjectileHit {
                projectile: ProjectileId::new(0),
                enemy,
            },
            Event::EnemyDamaged {
                enemy,
                amount: 5,
                health: -2,
            },
            Event::ProjectileHit {
                projectile: ProjectileId::new(1),
                enemy,
            },
            Event::EnemyDamaged {
                enemy,
                amount: 5,
                health: -7,
            },
            Event::EnemyDied {
                enemy,
                tile: TileCoord::new(0, 0),
            },
        ]
    );
    assert!(query::enemy_view(&world).is_empty());
    assert!(query::projectile_view(&world).is_empty());
}

#[test]
fn projectiles_landing_after_a_kill_are_spent_on_the_corpse() {
    let mut world = corridor(3);
    let _ = run(
        &mut world,
        [
            Command::SpawnEnemy {
                tile: TileCoord::new(0, 0),
                config: EnemyConfig {
                    health: 1,
                    step: 0.01,
                },
            },
            projectile(2),
            projectile(2),
            projectile(2),
        ],
    );

    let events = run(&mut world, [Command::Tick]);

    let hits = events
        .iter()
        .filter(|event| matches!(event, Event::ProjectileHit { .. }))
        .count();
    let deaths = events
        .iter()
        .filter(|event| matches!(event, Event::EnemyDied { .. }))
        .count();
    assert_eq!(hits, 3);
    assert_eq!(deaths, 1);
    assert!(events.contains(&Event::EnemyDamaged {
        enemy: EnemyId::new(0),
        amount: 2,
        health: -5,
    }));
    assert!(query::projectile_view(&world).is_empty());
}

#[test]
fn missed_projectile_expires() {
    let mut world = corridor(2);
    let _ = run(&mut world, [projectile(1)]);

    let events = run(&mut world, std::iter::repeat(Command::Tick).take(10));

    assert_eq!(
        events.last(),
        Some(&Event::ProjectileExpired {
            projectile: ProjectileId::new(0),
        })
    );
    assert_eq!(query::counters(&world).projectiles_launched, 1);
}

#[test]
fn tower_fires_on_cadence() {
    let mut world = corridor(2);
    let _ = run(
        &mut world,
        [Command::PlaceTower {
            tile: TileCoord::new(1, 0),
            facing: Direction::West,
            config: TowerConfig {
                initial_wait: 0,
                animation_wait: 5,
                projectile_interval: 10,
                attack: CardEffect::default(),
            },
        }],
    );

    let mut animations = Vec::new();
    let mut fires = Vec::new();
    for tick in 1..=20 {
        for event in run(&mut world, [Command::Tick]) {
            match event {
                Event::TowerAttackAnimation { tower } => animations.push((tick, tower)),
                Event::TowerFired { tower, facing, .. } => {
                    assert_eq!(facing, Direction::West);
                    fires.push((tick, tower));
                }
                _ => {}
            }
        }
    }

    let tower = TowerId::new(0);
    assert_eq!(animations, vec![(5, tower), (15, tower)]);
    assert_eq!(fires, vec![(10, tower), (20, tower)]);
}

#[test]
fn replay_is_deterministic() {
    let script = || {
        let mut commands = vec![
            Command::SpawnEnemy {
                tile: TileCoord::new(0, 0),
                config: EnemyConfig {
                    health: 4,
                    step: 0.05,
                },
            },
            Command::PingTile {
                tile: TileCoord::new(2, 0),
                ticks: 7,
            },
            projectile(2),
        ];
        commands.extend(std::iter::repeat(Command::Tick).take(40));
        commands
    };

    let mut first = corridor(4);
    let mut second = corridor(4);
    let first_events = run(&mut first, script());
    let second_events = run(&mut second, script());

    assert_eq!(first_events, second_events);
    assert_eq!(
        query::enemy_view(&first).into_vec(),
        query::enemy_view(&second).into_vec()
    );
}
