//! Area-of-effect grids authored around a fixed anchor cell.

use serde::{Deserialize, Serialize};

use crate::{AreaError, Rotation, SerializationError, TileCoord};

/// Largest width or height an area-of-effect grid may have.
const MAX_EXTENT: u32 = 255;

/// Small integer tag painted into an area-of-effect cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BrushValue(i8);

impl BrushValue {
    /// Reserved value of the anchor cell.
    pub const ANCHOR: BrushValue = BrushValue(-1);
    /// Palette value that has no effect.
    pub const EMPTY: BrushValue = BrushValue(0);

    /// Wraps a raw brush value.
    #[must_use]
    pub const fn new(value: i8) -> Self {
        Self(value)
    }

    /// Retrieves the raw brush value.
    #[must_use]
    pub const fn get(&self) -> i8 {
        self.0
    }

    /// Reports whether this is the reserved anchor value.
    #[must_use]
    pub const fn is_anchor(&self) -> bool {
        self.0 == Self::ANCHOR.0
    }

    /// Reports whether this is the "no effect" value.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0 == Self::EMPTY.0
    }
}

/// Single persisted `(x, y, value)` triple.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AreaCell {
    /// Column of the cell within the grid.
    pub x: u32,
    /// Row of the cell within the grid.
    pub y: u32,
    /// Brush value painted into the cell.
    pub value: BrushValue,
}

/// On-disk form of an [`AreaOfEffectGrid`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedArea {
    /// Grid width in cells.
    pub width: u32,
    /// Grid height in cells.
    pub height: u32,
    /// Largest value of the palette.
    pub max_value: i8,
    /// Cells carried by the persisted form; missing cells are empty.
    pub cells: Vec<AreaCell>,
}

/// Absolute tile selected by a projected area, with the brush that selected it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProjectedCell {
    /// Absolute board coordinate.
    pub tile: TileCoord,
    /// Brush value of the relative cell.
    pub value: BrushValue,
}

/// Bounded grid of brush values centred on a read-only anchor cell.
///
/// Width and height are always odd so the anchor sits on the exact centre,
/// at `(width / 2, height / 2)`. Cells are stored densely in row-major order.
/// The palette is `0..=max_value`; the anchor holds [`BrushValue::ANCHOR`],
/// which is never part of the palette.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "PersistedArea", into = "PersistedArea")]
pub struct AreaOfEffectGrid {
    width: u32,
    height: u32,
    max_value: i8,
    cells: Vec<BrushValue>,
}

impl Default for AreaOfEffectGrid {
    fn default() -> Self {
        Self::blank(1, 1, 1)
    }
}

impl AreaOfEffectGrid {
    /// Creates an empty grid; even bounds are rounded up to the next odd value.
    pub fn new(width: u32, height: u32, max_value: i8) -> Result<Self, AreaError> {
        if max_value < 1 {
            return Err(AreaError::PaletteTooSmall(max_value));
        }
        let (width, height) = odd_bounds(width, height)?;
        Ok(Self::blank(width, height, max_value))
    }

    fn blank(width: u32, height: u32, max_value: i8) -> Self {
        let len = (width as usize) * (height as usize);
        let mut grid = Self {
            width,
            height,
            max_value,
            cells: vec![BrushValue::EMPTY; len],
        };
        let (x, y) = grid.anchor();
        let index = grid.flat_index(x, y);
        grid.cells[index] = BrushValue::ANCHOR;
        grid
    }

    /// Grid width in cells; always odd.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Grid height in cells; always odd.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Largest value of the palette.
    #[must_use]
    pub const fn max_value(&self) -> i8 {
        self.max_value
    }

    /// Address of the anchor cell.
    #[must_use]
    pub const fn anchor(&self) -> (u32, u32) {
        (self.width / 2, self.height / 2)
    }

    /// Values a cell may hold, in ascending order.
    pub fn palette(&self) -> impl Iterator<Item = BrushValue> {
        (0..=self.max_value).map(BrushValue::new)
    }

    /// Labels for every palette value, formatted as `"<value> - <name>"`.
    ///
    /// Values without a provided name are labelled with the number alone.
    #[must_use]
    pub fn palette_labels(&self, names: &[&str]) -> Vec<String> {
        self.palette()
            .map(|value| {
                let index = value.get() as usize;
                match names.get(index) {
                    Some(name) => format!("{} - {name}", value.get()),
                    None => format!("{} - {}", value.get(), value.get()),
                }
            })
            .collect()
    }

    /// Reports whether `value` belongs to the palette.
    #[must_use]
    pub fn in_palette(&self, value: BrushValue) -> bool {
        (0..=self.max_value).contains(&value.get())
    }

    /// Returns the value stored at `(x, y)`, if the address is inside the grid.
    #[must_use]
    pub fn get(&self, x: u32, y: u32) -> Option<BrushValue> {
        self.index(x, y).map(|index| self.cells[index])
    }

    /// Writes a palette value into a cell.
    pub fn set(&mut self, x: u32, y: u32, value: BrushValue) -> Result<(), AreaError> {
        let index = self.index(x, y).ok_or(AreaError::OutOfBounds { x, y })?;
        if (x, y) == self.anchor() {
            return Err(AreaError::AnchorIsFixed);
        }
        if !self.in_palette(value) {
            return Err(AreaError::ValueOutsidePalette {
                value: value.get(),
                max_value: self.max_value,
            });
        }
        self.cells[index] = value;
        Ok(())
    }

    /// Paints `brush` into a cell, or clears the cell if it already holds it.
    ///
    /// Returns the value the cell holds afterwards.
    pub fn toggle(&mut self, x: u32, y: u32, brush: BrushValue) -> Result<BrushValue, AreaError> {
        let current = self.get(x, y).ok_or(AreaError::OutOfBounds { x, y })?;
        let next = if current == brush {
            BrushValue::EMPTY
        } else {
            brush
        };
        self.set(x, y, next)?;
        Ok(next)
    }

    /// Regenerates the palette as `0..=max_value`.
    ///
    /// Cells holding values outside the new palette are reset to empty. The
    /// anchor is never touched.
    pub fn resize_palette(&mut self, max_value: i8) -> Result<(), AreaError> {
        if max_value < 1 {
            return Err(AreaError::PaletteTooSmall(max_value));
        }
        self.max_value = max_value;
        for cell in &mut self.cells {
            if cell.is_anchor() {
                continue;
            }
            if cell.get() > max_value {
                *cell = BrushValue::EMPTY;
            }
        }
        Ok(())
    }

    /// Changes the bounds to the next odd values not below the request.
    ///
    /// Cells keep their offset from the anchor; cells that no longer fit are
    /// dropped. Oversized requests leave the grid untouched.
    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), AreaError> {
        let (width, height) = odd_bounds(width, height)?;
        let mut resized = Self::blank(width, height, self.max_value);
        let (ax, ay) = resized.anchor();
        for (dx, dy, value) in self.offsets() {
            let x = i64::from(ax) + i64::from(dx);
            let y = i64::from(ay) + i64::from(dy);
            let (Ok(x), Ok(y)) = (u32::try_from(x), u32::try_from(y)) else {
                continue;
            };
            if let Some(index) = resized.index(x, y) {
                resized.cells[index] = value;
            }
        }
        *self = resized;
        Ok(())
    }

    /// Enumerates every cell exactly once in row-major order.
    #[must_use]
    pub fn to_cells(&self) -> Vec<AreaCell> {
        let mut cells = Vec::with_capacity(self.cells.len());
        for y in 0..self.height {
            for x in 0..self.width {
                cells.push(AreaCell {
                    x,
                    y,
                    value: self.cells[self.flat_index(x, y)],
                });
            }
        }
        cells
    }

    /// Captures the grid in its persisted form.
    #[must_use]
    pub fn to_persisted(&self) -> PersistedArea {
        PersistedArea {
            width: self.width,
            height: self.height,
            max_value: self.max_value,
            cells: self.to_cells(),
        }
    }

    /// Rebuilds a grid from its persisted form.
    ///
    /// Addresses missing from the persisted list are empty. Inconsistent data
    /// is rejected rather than clamped.
    pub fn from_persisted(persisted: &PersistedArea) -> Result<Self, SerializationError> {
        let PersistedArea {
            width,
            height,
            max_value,
            ref cells,
        } = *persisted;

        let valid_extent = |extent: u32| extent % 2 == 1 && extent <= MAX_EXTENT;
        if !valid_extent(width) || !valid_extent(height) {
            return Err(SerializationError::InvalidBounds { width, height });
        }
        if max_value < 1 {
            return Err(SerializationError::InvalidPalette(max_value));
        }

        let mut grid = Self::blank(width, height, max_value);
        let anchor = grid.anchor();
        let mut seen = vec![false; grid.cells.len()];

        for cell in cells {
            let AreaCell { x, y, value } = *cell;
            let index = grid
                .index(x, y)
                .ok_or(SerializationError::CellOutOfBounds {
                    x,
                    y,
                    width,
                    height,
                })?;
            if seen[index] {
                return Err(SerializationError::DuplicateCell { x, y });
            }
            seen[index] = true;

            if (x, y) == anchor {
                if !value.is_anchor() {
                    return Err(SerializationError::AnchorMismatch {
                        x,
                        y,
                        value: value.get(),
                    });
                }
                continue;
            }
            if !grid.in_palette(value) {
                return Err(SerializationError::UnknownBrush {
                    x,
                    y,
                    value: value.get(),
                });
            }
            grid.cells[index] = value;
        }

        Ok(grid)
    }

    /// Non-empty cells other than the anchor, as offsets from the anchor.
    pub fn offsets(&self) -> impl Iterator<Item = (i32, i32, BrushValue)> + '_ {
        let (ax, ay) = self.anchor();
        self.to_cells().into_iter().filter_map(move |cell| {
            if cell.value.is_empty() || cell.value.is_anchor() {
                return None;
            }
            let dx = cell.x as i32 - ax as i32;
            let dy = cell.y as i32 - ay as i32;
            Some((dx, dy, cell.value))
        })
    }

    /// Rotates the grid clockwise and anchors it onto `anchor`.
    ///
    /// Empty cells and the anchor itself are excluded, as are cells that
    /// would leave the coordinate range. The result is sorted by tile
    /// coordinate.
    #[must_use]
    pub fn project(&self, anchor: TileCoord, rotation: Rotation) -> Vec<ProjectedCell> {
        let mut projected: Vec<ProjectedCell> = self
            .offsets()
            .filter_map(|(dx, dy, value)| {
                let (rx, ry) = rotation.apply(dx, dy);
                let tile = anchor.offset(rx, ry)?;
                Some(ProjectedCell { tile, value })
            })
            .collect();
        projected.sort();
        projected
    }

    fn index(&self, x: u32, y: u32) -> Option<usize> {
        if x < self.width && y < self.height {
            Some(self.flat_index(x, y))
        } else {
            None
        }
    }

    fn flat_index(&self, x: u32, y: u32) -> usize {
        (y as usize) * (self.width as usize) + (x as usize)
    }
}

impl TryFrom<PersistedArea> for AreaOfEffectGrid {
    type Error = SerializationError;

    fn try_from(persisted: PersistedArea) -> Result<Self, Self::Error> {
        Self::from_persisted(&persisted)
    }
}

impl From<AreaOfEffectGrid> for PersistedArea {
    fn from(grid: AreaOfEffectGrid) -> Self {
        grid.to_persisted()
    }
}

fn odd_bounds(width: u32, height: u32) -> Result<(u32, u32), AreaError> {
    if width > MAX_EXTENT || height > MAX_EXTENT {
        return Err(AreaError::ExtentTooLarge {
            width,
            height,
            max: MAX_EXTENT,
        });
    }
    Ok((odd_extent(width), odd_extent(height)))
}

fn odd_extent(requested: u32) -> u32 {
    let extent = requested.max(1);
    if extent % 2 == 0 {
        extent + 1
    } else {
        extent
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn brush(value: i8) -> BrushValue {
        BrushValue::new(value)
    }

    #[test]
    fn even_bounds_round_up_to_odd() {
        let grid = AreaOfEffectGrid::new(4, 0, 1).expect("grid");
        assert_eq!((grid.width(), grid.height()), (5, 1));
        assert_eq!(grid.anchor(), (2, 0));
        assert_eq!(grid.get(2, 0), Some(BrushValue::ANCHOR));
    }

    #[test]
    fn oversized_bounds_are_rejected() {
        let too_large = AreaError::ExtentTooLarge {
            width: 256,
            height: 3,
            max: 255,
        };
        assert_eq!(AreaOfEffectGrid::new(256, 3, 1), Err(too_large.clone()));

        let widest = AreaOfEffectGrid::new(254, 1, 1).expect("grid");
        assert_eq!(widest.width(), 255);

        let mut grid = AreaOfEffectGrid::new(3, 3, 1).expect("grid");
        grid.set(0, 0, brush(1)).expect("set");
        let before = grid.clone();
        assert_eq!(grid.resize(256, 3), Err(too_large));
        assert_eq!(grid, before);
    }

    #[test]
    fn anchor_cell_rejects_writes() {
        let mut grid = AreaOfEffectGrid::new(3, 3, 1).expect("grid");
        assert_eq!(grid.set(1, 1, brush(1)), Err(AreaError::AnchorIsFixed));
        assert_eq!(grid.get(1, 1), Some(BrushValue::ANCHOR));
    }

    #[test]
    fn writes_outside_palette_are_rejected() {
        let mut grid = AreaOfEffectGrid::new(3, 3, 1).expect("grid");
        assert_eq!(
            grid.set(0, 0, brush(2)),
            Err(AreaError::ValueOutsidePalette {
                value: 2,
                max_value: 1
            })
        );
        assert_eq!(
            grid.set(0, 0, BrushValue::ANCHOR),
            Err(AreaError::ValueOutsidePalette {
                value: -1,
                max_value: 1
            })
        );
        assert_eq!(
            grid.set(3, 0, brush(1)),
            Err(AreaError::OutOfBounds { x: 3, y: 0 })
        );
    }

    #[test]
    fn toggle_clears_a_cell_painted_with_the_same_brush() {
        let mut grid = AreaOfEffectGrid::new(3, 3, 2).expect("grid");
        assert_eq!(grid.toggle(0, 0, brush(2)), Ok(brush(2)));
        assert_eq!(grid.toggle(0, 0, brush(2)), Ok(BrushValue::EMPTY));
        assert_eq!(grid.toggle(1, 1, brush(2)), Err(AreaError::AnchorIsFixed));
    }

    #[test]
    fn shrinking_palette_resets_values_outside_it() {
        let mut grid = AreaOfEffectGrid::new(3, 3, 3).expect("grid");
        grid.set(0, 0, brush(3)).expect("set");
        grid.set(2, 2, brush(1)).expect("set");

        grid.resize_palette(2).expect("resize");

        assert_eq!(grid.get(0, 0), Some(BrushValue::EMPTY));
        assert_eq!(grid.get(2, 2), Some(brush(1)));
        assert_eq!(grid.get(1, 1), Some(BrushValue::ANCHOR));
        assert_eq!(grid.palette().count(), 3);
    }

    #[test]
    fn palette_cannot_drop_below_one() {
        let mut grid = AreaOfEffectGrid::default();
        assert_eq!(grid.resize_palette(0), Err(AreaError::PaletteTooSmall(0)));
        assert_eq!(grid.max_value(), 1);
    }

    #[test]
    fn palette_labels_prefix_values() {
        let grid = AreaOfEffectGrid::new(1, 1, 2).expect("grid");
        assert_eq!(
            grid.palette_labels(&["none", "burn"]),
            vec!["0 - none", "1 - burn", "2 - 2"]
        );
    }

    #[test]
    fn resize_keeps_offsets_relative_to_anchor() {
        let mut grid = AreaOfEffectGrid::new(3, 3, 1).expect("grid");
        grid.set(2, 1, brush(1)).expect("set");
        grid.set(0, 0, brush(1)).expect("set");

        grid.resize(6, 2).expect("resize");

        assert_eq!((grid.width(), grid.height()), (7, 3));
        assert_eq!(grid.anchor(), (3, 1));
        assert_eq!(grid.get(4, 1), Some(brush(1)));
        assert_eq!(grid.get(2, 0), Some(brush(1)));
        assert_eq!(grid.get(3, 1), Some(BrushValue::ANCHOR));

        grid.resize(1, 1).expect("resize");
        assert_eq!(grid.to_cells().len(), 1);
        assert_eq!(grid.get(0, 0), Some(BrushValue::ANCHOR));
    }

    #[test]
    fn cells_are_listed_row_major_exactly_once() {
        let grid = AreaOfEffectGrid::new(3, 1, 1).expect("grid");
        let addresses: Vec<(u32, u32)> = grid.to_cells().iter().map(|c| (c.x, c.y)).collect();
        assert_eq!(addresses, vec![(0, 0), (1, 0), (2, 0)]);
    }

    #[test]
    fn missing_cells_deserialize_to_empty() {
        let persisted = PersistedArea {
            width: 3,
            height: 3,
            max_value: 1,
            cells: vec![AreaCell {
                x: 0,
                y: 2,
                value: brush(1),
            }],
        };

        let grid = AreaOfEffectGrid::from_persisted(&persisted).expect("grid");

        assert_eq!(grid.get(0, 2), Some(brush(1)));
        assert_eq!(grid.get(2, 2), Some(BrushValue::EMPTY));
        assert_eq!(grid.get(1, 1), Some(BrushValue::ANCHOR));
    }

    #[test]
    fn out_of_bounds_cells_are_rejected() {
        let persisted = PersistedArea {
            width: 3,
            height: 3,
            max_value: 1,
            cells: vec![AreaCell {
                x: 3,
                y: 0,
                value: brush(1),
            }],
        };
        assert_eq!(
            AreaOfEffectGrid::from_persisted(&persisted),
            Err(SerializationError::CellOutOfBounds {
                x: 3,
                y: 0,
                width: 3,
                height: 3
            })
        );
    }

    #[test]
    fn unknown_palette_values_are_rejected() {
        let persisted = PersistedArea {
            width: 3,
            height: 3,
            max_value: 1,
            cells: vec![AreaCell {
                x: 0,
                y: 0,
                value: brush(4),
            }],
        };
        assert_eq!(
            AreaOfEffectGrid::from_persisted(&persisted),
            Err(SerializationError::UnknownBrush {
                x: 0,
                y: 0,
                value: 4
            })
        );
    }

    #[test]
    fn even_persisted_bounds_are_rejected() {
        let persisted = PersistedArea {
            width: 4,
            height: 3,
            max_value: 1,
            cells: Vec::new(),
        };
        assert_eq!(
            AreaOfEffectGrid::from_persisted(&persisted),
            Err(SerializationError::InvalidBounds {
                width: 4,
                height: 3
            })
        );
    }

    #[test]
    fn anchor_must_hold_anchor_value() {
        let persisted = PersistedArea {
            width: 3,
            height: 3,
            max_value: 1,
            cells: vec![AreaCell {
                x: 1,
                y: 1,
                value: brush(1),
            }],
        };
        assert_eq!(
            AreaOfEffectGrid::from_persisted(&persisted),
            Err(SerializationError::AnchorMismatch {
                x: 1,
                y: 1,
                value: 1
            })
        );
    }

    #[test]
    fn duplicate_cells_are_rejected() {
        let cell = AreaCell {
            x: 0,
            y: 0,
            value: brush(1),
        };
        let persisted = PersistedArea {
            width: 3,
            height: 3,
            max_value: 1,
            cells: vec![cell, cell],
        };
        assert_eq!(
            AreaOfEffectGrid::from_persisted(&persisted),
            Err(SerializationError::DuplicateCell { x: 0, y: 0 })
        );
    }

    #[test]
    fn projection_translates_single_cell_without_rotation() {
        let mut grid = AreaOfEffectGrid::new(5, 5, 1).expect("grid");
        grid.set(4, 1, brush(1)).expect("set");

        let projected = grid.project(TileCoord::new(10, 10), Rotation::IDENTITY);

        assert_eq!(
            projected,
            vec![ProjectedCell {
                tile: TileCoord::new(12, 9),
                value: brush(1),
            }]
        );
    }

    #[test]
    fn projection_rotates_clockwise() {
        let mut grid = AreaOfEffectGrid::new(3, 3, 1).expect("grid");
        grid.set(1, 0, brush(1)).expect("set");

        let east = grid.project(TileCoord::new(0, 0), Rotation::from_quarter_turns(1));
        let south = grid.project(TileCoord::new(0, 0), Rotation::from_quarter_turns(2));
        let west = grid.project(TileCoord::new(0, 0), Rotation::from_quarter_turns(3));

        assert_eq!(east[0].tile, TileCoord::new(1, 0));
        assert_eq!(south[0].tile, TileCoord::new(0, 1));
        assert_eq!(west[0].tile, TileCoord::new(-1, 0));
    }

    #[test]
    fn projection_drops_cells_beyond_the_coordinate_range() {
        let mut grid = AreaOfEffectGrid::new(3, 3, 1).expect("grid");
        grid.set(2, 1, brush(1)).expect("east");
        grid.set(0, 1, brush(1)).expect("west");

        let projected = grid.project(TileCoord::new(i32::MAX, 0), Rotation::IDENTITY);

        assert_eq!(
            projected,
            vec![ProjectedCell {
                tile: TileCoord::new(i32::MAX - 1, 0),
                value: brush(1),
            }]
        );
    }

    #[test]
    fn projection_skips_empty_cells_and_anchor() {
        let grid = AreaOfEffectGrid::new(5, 5, 1).expect("grid");
        assert!(grid
            .project(TileCoord::new(0, 0), Rotation::IDENTITY)
            .is_empty());
    }
}
