//! Board adjacency built once when a board is loaded.

use std::collections::BTreeMap;

use card_defence_core::{Direction, TileCoord, WorldPoint};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Neighbour references of a tile, one slot per direction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Neighbors {
    /// Neighbour toward decreasing `y`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub north: Option<TileCoord>,
    /// Neighbour toward increasing `x`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub east: Option<TileCoord>,
    /// Neighbour toward increasing `y`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub south: Option<TileCoord>,
    /// Neighbour toward decreasing `x`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub west: Option<TileCoord>,
}

impl Neighbors {
    /// Neighbour in the provided direction.
    #[must_use]
    pub const fn get(&self, direction: Direction) -> Option<TileCoord> {
        match direction {
            Direction::North => self.north,
            Direction::East => self.east,
            Direction::South => self.south,
            Direction::West => self.west,
        }
    }

    /// Replaces the neighbour in the provided direction.
    pub fn set(&mut self, direction: Direction, neighbor: Option<TileCoord>) {
        let slot = match direction {
            Direction::North => &mut self.north,
            Direction::East => &mut self.east,
            Direction::South => &mut self.south,
            Direction::West => &mut self.west,
        };
        *slot = neighbor;
    }
}

/// One row of a board description as loaded from disk.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TileRecord {
    /// Grid position of the tile.
    pub coord: TileCoord,
    /// World position of the tile centre.
    pub position: WorldPoint,
    /// Adjacent tiles.
    #[serde(default)]
    pub neighbors: Neighbors,
    /// Direction enemies leave the tile in, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exit: Option<Direction>,
    /// Whether enemies may come to rest on the tile.
    #[serde(default)]
    pub destination: bool,
}

/// Serializable board description consumed by [`TileGraph::from_layout`].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BoardLayout {
    /// Every tile on the board.
    pub tiles: Vec<TileRecord>,
}

impl BoardLayout {
    /// Creates a fully connected rectangular board without any route.
    #[must_use]
    pub fn rectangle(columns: u32, rows: u32, tile_length: f32) -> Self {
        let columns = i32::try_from(columns).unwrap_or(i32::MAX);
        let rows = i32::try_from(rows).unwrap_or(i32::MAX);
        let inside = |coord: TileCoord| {
            (0..columns).contains(&coord.x()) && (0..rows).contains(&coord.y())
        };

        let mut tiles = Vec::new();
        for y in 0..rows {
            for x in 0..columns {
                let coord = TileCoord::new(x, y);
                let mut neighbors = Neighbors::default();
                for direction in Direction::ALL {
                    if let Some(candidate) = coord.step(direction).filter(|c| inside(*c)) {
                        neighbors.set(direction, Some(candidate));
                    }
                }
                tiles.push(TileRecord {
                    coord,
                    position: WorldPoint::new(x as f32 * tile_length, y as f32 * tile_length),
                    neighbors,
                    exit: None,
                    destination: false,
                });
            }
        }
        Self { tiles }
    }

    /// Marks a route across the board.
    ///
    /// Every tile of `path` exits toward its successor and the final tile
    /// becomes a destination. Steps between tiles that are not adjacent are
    /// skipped, leaving the earlier tile without an exit.
    #[must_use]
    pub fn with_route(mut self, path: &[TileCoord]) -> Self {
        for pair in path.windows(2) {
            let (from, to) = (pair[0], pair[1]);
            let direction = Direction::ALL
                .into_iter()
                .find(|direction| from.step(*direction) == Some(to));
            if let Some(record) = self.record_mut(from) {
                record.exit = direction;
            }
        }
        if let Some(last) = path.last().copied() {
            if let Some(record) = self.record_mut(last) {
                record.destination = true;
            }
        }
        self
    }

    /// Mutable access to the record describing `coord`.
    pub fn record_mut(&mut self, coord: TileCoord) -> Option<&mut TileRecord> {
        self.tiles.iter_mut().find(|record| record.coord == coord)
    }
}

/// Board description that cannot be turned into a graph.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum BoardError {
    /// The layout contains no tiles.
    #[error("board contains no tiles")]
    Empty,
    /// Two records describe the same tile.
    #[error("tile {0} appears more than once")]
    DuplicateTile(TileCoord),
    /// A neighbour reference points at a tile that does not exist.
    #[error("tile {tile} references missing {direction:?} neighbour {neighbor}")]
    DanglingNeighbor {
        /// Tile holding the reference.
        tile: TileCoord,
        /// Direction of the reference.
        direction: Direction,
        /// Referenced tile.
        neighbor: TileCoord,
    },
    /// An exit points in a direction without a neighbour.
    #[error("tile {tile} exits {direction:?} but has no neighbour there")]
    MissingExit {
        /// Tile holding the exit.
        tile: TileCoord,
        /// Direction of the exit.
        direction: Direction,
    },
}

/// Immutable description of a single board tile.
#[derive(Clone, Debug, PartialEq)]
pub struct TileNode {
    coord: TileCoord,
    position: WorldPoint,
    neighbors: Neighbors,
    exit: Option<Direction>,
    destination: bool,
}

impl TileNode {
    /// Grid position of the tile.
    #[must_use]
    pub const fn coord(&self) -> TileCoord {
        self.coord
    }

    /// World position of the tile centre.
    #[must_use]
    pub const fn position(&self) -> WorldPoint {
        self.position
    }

    /// Neighbour in the provided direction.
    #[must_use]
    pub const fn neighbor(&self, direction: Direction) -> Option<TileCoord> {
        self.neighbors.get(direction)
    }

    /// Direction enemies leave the tile in.
    #[must_use]
    pub const fn exit_direction(&self) -> Option<Direction> {
        self.exit
    }

    /// Whether enemies may come to rest on the tile.
    #[must_use]
    pub const fn is_destination(&self) -> bool {
        self.destination
    }
}

/// Validated board adjacency keyed by tile coordinate.
#[derive(Clone, Debug, Default)]
pub struct TileGraph {
    nodes: BTreeMap<TileCoord, TileNode>,
}

impl TileGraph {
    /// Builds the graph from a board description.
    ///
    /// Asymmetric neighbour references are accepted but logged, since exits
    /// are one-directional by nature.
    pub fn from_layout(layout: &BoardLayout) -> Result<Self, BoardError> {
        if layout.tiles.is_empty() {
            return Err(BoardError::Empty);
        }

        let mut nodes = BTreeMap::new();
        for record in &layout.tiles {
            let node = TileNode {
                coord: record.coord,
                position: record.position,
                neighbors: record.neighbors,
                exit: record.exit,
                destination: record.destination,
            };
            if nodes.insert(record.coord, node).is_some() {
                return Err(BoardError::DuplicateTile(record.coord));
            }
        }

        for node in nodes.values() {
            for direction in Direction::ALL {
                let Some(neighbor) = node.neighbor(direction) else {
                    continue;
                };
                let Some(other) = nodes.get(&neighbor) else {
                    return Err(BoardError::DanglingNeighbor {
                        tile: node.coord,
                        direction,
                        neighbor,
                    });
                };
                if other.neighbor(direction.opposite()) != Some(node.coord) {
                    tracing::warn!(
                        tile = %node.coord,
                        neighbor = %neighbor,
                        ?direction,
                        "asymmetric neighbour reference"
                    );
                }
            }
            if let Some(direction) = node.exit {
                if node.neighbor(direction).is_none() {
                    return Err(BoardError::MissingExit {
                        tile: node.coord,
                        direction,
                    });
                }
            }
        }

        tracing::debug!(tiles = nodes.len(), "tile graph built");
        Ok(Self { nodes })
    }

    /// Number of tiles on the board.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the board holds no tiles.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Whether the tile is part of the board.
    #[must_use]
    pub fn contains(&self, coord: TileCoord) -> bool {
        self.nodes.contains_key(&coord)
    }

    /// Full description of a tile.
    #[must_use]
    pub fn node(&self, coord: TileCoord) -> Option<&TileNode> {
        self.nodes.get(&coord)
    }

    /// Neighbour of `coord` in the provided direction.
    #[must_use]
    pub fn neighbor(&self, coord: TileCoord, direction: Direction) -> Option<TileCoord> {
        self.node(coord).and_then(|node| node.neighbor(direction))
    }

    /// World position of the tile centre.
    #[must_use]
    pub fn position(&self, coord: TileCoord) -> Option<WorldPoint> {
        self.node(coord).map(TileNode::position)
    }

    /// Tile enemies move to after leaving `coord`.
    #[must_use]
    pub fn exit(&self, coord: TileCoord) -> Option<TileCoord> {
        let node = self.node(coord)?;
        node.exit.and_then(|direction| node.neighbor(direction))
    }

    /// Whether enemies may come to rest on the tile.
    #[must_use]
    pub fn is_destination(&self, coord: TileCoord) -> bool {
        self.node(coord).is_some_and(TileNode::is_destination)
    }

    /// Iterates over every tile in coordinate order.
    pub fn iter(&self) -> impl Iterator<Item = &TileNode> {
        self.nodes.values()
    }

    /// Smallest and largest coordinates on each axis.
    #[must_use]
    pub fn bounds(&self) -> Option<(TileCoord, TileCoord)> {
        let mut coords = self.nodes.keys();
        let first = *coords.next()?;
        let (mut min, mut max) = (first, first);
        for coord in coords {
            min = TileCoord::new(min.x().min(coord.x()), min.y().min(coord.y()));
            max = TileCoord::new(max.x().max(coord.x()), max.y().max(coord.y()));
        }
        Some((min, max))
    }

    /// Follows exits from `start` until a dead end or a repeated tile.
    ///
    /// The result starts with `start`. Looping routes are reported once.
    #[must_use]
    pub fn route_from(&self, start: TileCoord) -> Vec<TileCoord> {
        let mut route = Vec::new();
        if !self.contains(start) {
            return route;
        }
        let mut current = start;
        loop {
            route.push(current);
            match self.exit(current) {
                Some(next) if !route.contains(&next) => current = next,
                _ => return route,
            }
        }
    }
}
