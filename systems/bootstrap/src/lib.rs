#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure bootstrap system that prepares the Quince experience.

use quince_core::{Command, EdgeClamp, ViewportSize};
use quince_world::{query, Entity, TileGrid, World};

/// Produces data required to greet the player and set up a session.
#[derive(Debug, Default)]
pub struct Bootstrap;

impl Bootstrap {
    /// Derives the banner that should be shown when the experience starts.
    #[must_use]
    pub fn welcome_banner<'world>(&self, world: &'world World) -> &'world str {
        query::welcome_banner(world)
    }

    /// Exposes the tile grid configuration required for rendering.
    #[must_use]
    pub fn tile_grid<'world>(&self, world: &'world World) -> &'world TileGrid {
        query::tile_grid(world)
    }

    /// Exposes the player entity the camera follows.
    #[must_use]
    pub fn player<'world>(&self, world: &'world World) -> Option<&'world Entity> {
        query::player(world)
    }

    /// Commands that shape a fresh world into the requested session layout.
    ///
    /// The grid is rebuilt first because doing so clears every entity; the
    /// viewport and monster population follow.
    pub fn setup(&self, setup: &SessionSetup, out: &mut Vec<Command>) {
        out.push(Command::ConfigureTileGrid {
            columns: setup.columns,
            rows: setup.rows,
        });
        out.push(Command::ConfigureViewport {
            size: setup.viewport,
            clamp: setup.clamp,
        });
        if setup.monsters > 0 {
            out.push(Command::PopulateMonsters {
                count: setup.monsters,
            });
        }
    }
}

/// Layout requested for a play session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SessionSetup {
    /// Number of grid columns.
    pub columns: u32,
    /// Number of grid rows.
    pub rows: u32,
    /// Visible extent in tiles.
    pub viewport: ViewportSize,
    /// Policy applied when the viewport reaches the far grid edge.
    pub clamp: EdgeClamp,
    /// Monsters scattered after the grid is built.
    pub monsters: u32,
}
