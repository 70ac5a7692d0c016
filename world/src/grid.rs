use std::collections::BTreeMap;

use quince_core::{CellCoord, EntityId, GridPoint, TileColor, TileVisual};

use crate::{entity::Entity, OccupancyError};

const MARKER_COLOR_SEED: u64 = 0x9e37_79b9_7f4a_7c15;

/// Fixed-size grid of tiles addressed by column and row.
#[derive(Clone, Debug)]
pub struct TileGrid {
    columns: u32,
    rows: u32,
    tiles: Vec<Tile>,
}

impl TileGrid {
    /// Generates the procedural layout: cells whose column and row are both
    /// even carry a coloured marker, every other cell is terrain.
    pub(crate) fn generate(columns: u32, rows: u32) -> Self {
        let capacity_u64 = u64::from(columns) * u64::from(rows);
        let capacity = usize::try_from(capacity_u64).unwrap_or(0);
        let mut tiles = Vec::with_capacity(capacity);
        for row in 0..rows {
            for column in 0..columns {
                tiles.push(Tile::new(procedural_visual(CellCoord::new(column, row))));
            }
        }
        Self {
            columns,
            rows,
            tiles,
        }
    }

    /// Number of columns contained in the grid.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of rows contained in the grid.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Reports whether the signed coordinate addresses a tile.
    #[must_use]
    pub fn is_in_bounds(&self, x: i64, y: i64) -> bool {
        x >= 0 && y >= 0 && x < i64::from(self.columns) && y < i64::from(self.rows)
    }

    /// Converts a signed point into a cell when it lies inside the grid.
    #[must_use]
    pub fn cell_at(&self, point: GridPoint) -> Option<CellCoord> {
        if !self.is_in_bounds(point.x, point.y) {
            return None;
        }
        let column = u32::try_from(point.x).ok()?;
        let row = u32::try_from(point.y).ok()?;
        Some(CellCoord::new(column, row))
    }

    /// Returns the tile stored at the provided cell.
    ///
    /// # Panics
    ///
    /// Panics when the cell lies outside the grid. Use [`TileGrid::tile`] when
    /// the cell has not been bounds-checked.
    #[must_use]
    pub fn tile_at(&self, cell: CellCoord) -> &Tile {
        match self.tile(cell) {
            Some(tile) => tile,
            None => panic!(
                "tile ({}, {}) requested outside a {}x{} grid",
                cell.column(),
                cell.row(),
                self.columns,
                self.rows
            ),
        }
    }

    /// Returns the tile stored at the provided cell, if it exists.
    #[must_use]
    pub fn tile(&self, cell: CellCoord) -> Option<&Tile> {
        self.index(cell).and_then(|index| self.tiles.get(index))
    }

    pub(crate) fn tile_mut(&mut self, cell: CellCoord) -> Result<&mut Tile, OccupancyError> {
        self.index(cell)
            .and_then(|index| self.tiles.get_mut(index))
            .ok_or(OccupancyError::OutOfBounds { cell })
    }

    fn index(&self, cell: CellCoord) -> Option<usize> {
        if cell.column() < self.columns && cell.row() < self.rows {
            let row = usize::try_from(cell.row()).ok()?;
            let column = usize::try_from(cell.column()).ok()?;
            let width = usize::try_from(self.columns).ok()?;
            Some(row * width + column)
        } else {
            None
        }
    }
}

/// Single grid cell holding a visual and the entities standing on it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Tile {
    visual: TileVisual,
    occupants: Vec<EntityId>,
}

impl Tile {
    pub(crate) const fn new(visual: TileVisual) -> Self {
        Self {
            visual,
            occupants: Vec::new(),
        }
    }

    /// Visual identifier the renderer should draw for this tile.
    #[must_use]
    pub const fn visual(&self) -> TileVisual {
        self.visual
    }

    /// Entities registered on the tile, in insertion order.
    #[must_use]
    pub fn occupants(&self) -> &[EntityId] {
        &self.occupants
    }

    /// Reports whether the entity is registered on the tile.
    #[must_use]
    pub fn contains(&self, entity: EntityId) -> bool {
        self.occupants.contains(&entity)
    }

    /// Registers an occupant. Callers guarantee the entity is not registered
    /// on any other tile.
    pub(crate) fn add_entity(&mut self, entity: EntityId) {
        self.occupants.push(entity);
    }

    pub(crate) fn remove_entity(&mut self, entity: EntityId) -> Result<(), OccupancyError> {
        let Some(index) = self.occupants.iter().position(|occupant| *occupant == entity) else {
            return Err(OccupancyError::NotFound { entity });
        };
        let _ = self.occupants.remove(index);
        Ok(())
    }

    /// A tile blocks movement when any of its occupants is collidable.
    pub(crate) fn is_collidable(&self, entities: &BTreeMap<EntityId, Entity>) -> bool {
        self.occupants.iter().any(|occupant| {
            entities
                .get(occupant)
                .map_or(false, Entity::is_collidable)
        })
    }
}

fn procedural_visual(cell: CellCoord) -> TileVisual {
    if cell.column() % 2 != 0 || cell.row() % 2 != 0 {
        return TileVisual::Terrain;
    }

    let mixed = MARKER_COLOR_SEED ^ ((u64::from(cell.column()) << 32) | u64::from(cell.row()));
    let [red, green, blue, ..] = crate::next_random(mixed).to_le_bytes();
    TileVisual::Marker(TileColor::from_rgb(red, green, blue))
}
