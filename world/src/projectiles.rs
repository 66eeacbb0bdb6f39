//! Projectile flight and hit detection.

use card_defence_core::{ConfigurationError, EnemyId, ProjectileConfig, ProjectileId, WorldPoint};
use glam::Vec2;

#[derive(Clone, Debug)]
pub(crate) struct Projectile {
    pub(crate) id: ProjectileId,
    pub(crate) position: Vec2,
    pub(crate) heading: Vec2,
    pub(crate) config: ProjectileConfig,
    pub(crate) remaining: u32,
}

/// Outcome of advancing a projectile by one tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Flight {
    InFlight,
    Hit(EnemyId),
    Expired,
}

impl Projectile {
    pub(crate) fn launch(
        id: ProjectileId,
        position: WorldPoint,
        heading: WorldPoint,
        config: ProjectileConfig,
    ) -> Result<Self, ConfigurationError> {
        config.validate()?;
        let heading = to_vec(heading)
            .try_normalize()
            .ok_or(ConfigurationError::ZeroHeading)?;
        Ok(Self {
            id,
            position: to_vec(position),
            heading,
            config,
            remaining: config.lifetime,
        })
    }

    /// Moves the projectile and checks the swept segment against enemies.
    ///
    /// `targets` must be supplied in identifier order; the nearest enemy
    /// within the hit radius wins and ties favour the lower identifier.
    pub(crate) fn advance<I>(&mut self, targets: I) -> Flight
    where
        I: IntoIterator<Item = (EnemyId, WorldPoint)>,
    {
        let start = self.position;
        let end = start + self.heading * self.config.speed;
        self.position = end;
        self.remaining = self.remaining.saturating_sub(1);

        let mut best: Option<(EnemyId, f32)> = None;
        for (enemy, point) in targets {
            let distance = segment_distance(start, end, to_vec(point));
            if distance > self.config.hit_radius {
                continue;
            }
            if best.map_or(true, |(_, nearest)| distance < nearest) {
                best = Some((enemy, distance));
            }
        }

        match best {
            Some((enemy, _)) => Flight::Hit(enemy),
            None if self.remaining == 0 => Flight::Expired,
            None => Flight::InFlight,
        }
    }

    pub(crate) fn position(&self) -> WorldPoint {
        WorldPoint::new(self.position.x, self.position.y)
    }

    pub(crate) fn heading(&self) -> WorldPoint {
        WorldPoint::new(self.heading.x, self.heading.y)
    }
}

fn to_vec(point: WorldPoint) -> Vec2 {
    Vec2::new(point.x(), point.y())
}

fn segment_distance(start: Vec2, end: Vec2, point: Vec2) -> f32 {
    let span = end - start;
    let length_squared = span.length_squared();
    if length_squared == 0.0 {
        return start.distance(point);
    }
    let t = ((point - start).dot(span) / length_squared).clamp(0.0, 1.0);
    (start + span * t).distance(point)
}

#[cfg(test)]
mod tests {
    use super::*;

    const NO_TARGETS: [(EnemyId, WorldPoint); 0] = [];

    fn config(lifetime: u32) -> ProjectileConfig {
        ProjectileConfig {
            speed: 1.0,
            damage: 2,
            lifetime,
            hit_radius: 0.25,
        }
    }

    fn launch(lifetime: u32) -> Projectile {
        Projectile::launch(
            ProjectileId::new(0),
            WorldPoint::new(0.0, 0.0),
            WorldPoint::new(2.0, 0.0),
            config(lifetime),
        )
        .expect("launch")
    }

    #[test]
    fn heading_is_normalised() {
        assert_eq!(launch(5).heading(), WorldPoint::new(1.0, 0.0));
    }

    #[test]
    fn zero_heading_is_rejected() {
        let result = Projectile::launch(
            ProjectileId::new(0),
            WorldPoint::new(0.0, 0.0),
            WorldPoint::new(0.0, 0.0),
            config(5),
        );
        assert_eq!(result.unwrap_err(), ConfigurationError::ZeroHeading);
    }

    #[test]
    fn projectile_expires_after_lifetime() {
        let mut projectile = launch(2);
        assert_eq!(projectile.advance(NO_TARGETS), Flight::InFlight);
        assert_eq!(projectile.advance(NO_TARGETS), Flight::Expired);
        assert_eq!(projectile.position(), WorldPoint::new(2.0, 0.0));
    }

    #[test]
    fn swept_segment_catches_enemy_between_positions() {
        let mut projectile = launch(5);
        let flight = projectile.advance([(EnemyId::new(3), WorldPoint::new(0.5, 0.1))]);
        assert_eq!(flight, Flight::Hit(EnemyId::new(3)));
    }

    #[test]
    fn nearest_enemy_wins_and_ties_favour_lower_identifier() {
        let mut projectile = launch(5);
        let flight = projectile.advance([
            (EnemyId::new(1), WorldPoint::new(0.5, 0.2)),
            (EnemyId::new(2), WorldPoint::new(0.7, 0.0)),
        ]);
        assert_eq!(flight, Flight::Hit(EnemyId::new(2)));

        let mut projectile = launch(5);
        let flight = projectile.advance([
            (EnemyId::new(1), WorldPoint::new(0.5, 0.1)),
            (EnemyId::new(2), WorldPoint::new(0.6, 0.1)),
        ]);
        assert_eq!(flight, Flight::Hit(EnemyId::new(1)));
    }

    #[test]
    fn enemies_outside_radius_are_ignored() {
        let mut projectile = launch(5);
        let flight = projectile.advance([(EnemyId::new(1), WorldPoint::new(0.5, 1.0))]);
        assert_eq!(flight, Flight::InFlight);
    }
}
