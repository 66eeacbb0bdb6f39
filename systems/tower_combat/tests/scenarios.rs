use card_defence_core::{
    CardEffect, Command, Direction, EnemyConfig, EnemyId, Event, LaunchProjectile,
    ProjectileConfig, TileCoord, TowerConfig, TowerId,
};
use card_defence_system_tower_combat::TowerCombat;
use card_defence_world::{self as world, query, BoardLayout, TileGraph, World};

fn lane() -> World {
    let path: Vec<TileCoord> = (0..5).map(|x| TileCoord::new(x, 0)).collect();
    let layout = BoardLayout::rectangle(5, 1, 1.0).with_route(&path);
    World::new(TileGraph::from_layout(&layout).expect("graph"))
}

fn apply_all(world: &mut World, commands: impl IntoIterator<Item = Command>) -> Vec<Event> {
    let mut events = Vec::new();
    for command in commands {
        world::apply(world, command, &mut events);
    }
    events
}

fn step(world: &mut World, combat: &mut TowerCombat) -> Vec<Event> {
    let mut events = Vec::new();
    world::apply(world, Command::Tick, &mut events);
    let mut follow_up = Vec::new();
    combat.handle(world, &events, &mut follow_up);
    events.extend(follow_up);
    events
}

fn tower(tile: TileCoord, facing: Direction, projectile: ProjectileConfig) -> Command {
    Command::PlaceTower {
        tile,
        facing,
        config: TowerConfig {
            initial_wait: 0,
            animation_wait: 5,
            projectile_interval: 10,
            attack: CardEffect::projectile(LaunchProjectile {
                projectile,
                ..LaunchProjectile::default()
            }),
        },
    }
}

#[test]
fn tower_animates_then_fires_every_interval() {
    let mut world = lane();
    let mut combat = TowerCombat::new();
    let _ = apply_all(
        &mut world,
        [tower(
            TileCoord::new(4, 0),
            Direction::West,
            ProjectileConfig::default(),
        )],
    );

    let mut animations = Vec::new();
    let mut fires = Vec::new();
    let mut launches = Vec::new();
    for tick in 1..=30u64 {
        for event in step(&mut world, &mut combat) {
            match event {
                Event::TowerAttackAnimation { .. } => animations.push(tick),
                Event::TowerFired { tower, .. } => {
                    assert_eq!(tower, TowerId::new(0));
                    fires.push(tick);
                }
                Event::ProjectileSpawned { .. } => launches.push(tick),
                _ => {}
            }
        }
    }

    assert_eq!(animations, vec![5, 15, 25]);
    assert_eq!(fires, vec![10, 20, 30]);
    assert_eq!(launches, fires);
}

#[test]
fn simultaneous_hits_kill_an_enemy_once() {
    let mut world = lane();
    let mut combat = TowerCombat::new();
    let projectile = ProjectileConfig {
        speed: 0.5,
        damage: 2,
        lifetime: 20,
        hit_radius: 0.25,
    };
    let _ = apply_all(
        &mut world,
        [
            Command::SpawnEnemy {
                tile: TileCoord::new(2, 0),
                config: EnemyConfig {
                    health: 1,
                    step: 0.0001,
                },
            },
            tower(TileCoord::new(1, 0), Direction::East, projectile),
            tower(TileCoord::new(3, 0), Direction::West, projectile),
        ],
    );

    let mut log = Vec::new();
    for _ in 0..15 {
        log.extend(step(&mut world, &mut combat));
    }

    let enemy = EnemyId::new(0);
    let hits = log
        .iter()
        .filter(|event| {
            matches!(event, Event::ProjectileHit { enemy: hit, .. } if *hit == enemy)
        })
        .count();
    let deaths: Vec<&Event> = log
        .iter()
        .filter(|event| matches!(event, Event::EnemyDied { .. }))
        .collect();

    assert_eq!(hits, 2);
    assert_eq!(
        deaths,
        vec![&Event::EnemyDied {
            enemy,
            tile: TileCoord::new(2, 0),
        }]
    );
    assert!(query::enemy_view(&world).is_empty());

    let hit_ticks = tick_of_each(&log, |event| {
        matches!(event, Event::ProjectileHit { .. })
    });
    assert_eq!(hit_ticks, vec![12, 12]);
}

fn tick_of_each(log: &[Event], predicate: impl Fn(&Event) -> bool) -> Vec<u64> {
    let mut tick = 0;
    let mut ticks = Vec::new();
    for event in log {
        if let Event::TimeAdvanced { tick: current } = event {
            tick = *current;
        }
        if predicate(event) {
            ticks.push(tick);
        }
    }
    ticks
}
