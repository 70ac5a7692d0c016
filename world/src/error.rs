//! Failures raised when the world's bookkeeping invariants break.

use quince_core::{CellCoord, EntityId};
use thiserror::Error;

/// Violations of the tile occupancy protocol.
///
/// These indicate a bug in the world rather than a bad request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum OccupancyError {
    /// The entity was expected in a tile's occupant list but was absent.
    #[error("entity {} is not registered in the tile", entity.get())]
    NotFound {
        /// Entity that could not be found.
        entity: EntityId,
    },
    /// A tile lookup addressed a cell outside the grid.
    #[error("cell ({}, {}) lies outside the grid", cell.column(), cell.row())]
    OutOfBounds {
        /// Cell that was addressed.
        cell: CellCoord,
    },
}

/// Errors returned by [`crate::apply`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum WorldError {
    /// The requested grid has no cells, leaving nowhere to place the player.
    #[error("tile grid must have positive dimensions (received {columns}x{rows})")]
    EmptyGrid {
        /// Requested column count.
        columns: u32,
        /// Requested row count.
        rows: u32,
    },
    /// The requested grid holds more cells than the world allows.
    #[error("tile grid of {columns}x{rows} exceeds the limit of {limit} cells")]
    GridTooLarge {
        /// Requested column count.
        columns: u32,
        /// Requested row count.
        rows: u32,
        /// Largest supported cell count.
        limit: u64,
    },
    /// Occupancy bookkeeping diverged from entity positions.
    #[error("occupancy invariant violated: {0}")]
    Occupancy(#[from] OccupancyError),
}
