#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Quince.
//!
//! The world owns the tile grid, the entity table and the viewport. All
//! mutations arrive as [`Command`] values through [`apply`], which reports
//! what happened as [`Event`] values. Read access goes through [`query`].

mod entity;
mod error;
mod grid;
mod viewport;

use std::collections::BTreeMap;

use quince_core::{
    CellCoord, Command, Direction, EdgeClamp, EntityId, EntityKind, Event, GridPoint,
    ViewportSize, WELCOME_BANNER,
};
use tracing::{debug, info};

use self::{
    entity::{Behaviour, CollisionReaction, MovePolicy},
    viewport::Viewport,
};

pub use self::{
    entity::Entity,
    error::{OccupancyError, WorldError},
    grid::{Tile, TileGrid},
};

const MONSTER_PLACEMENT_SEED: u64 = 0x42f0_e1eb_d4a5_3c21;

/// Number of monsters scattered across a freshly created world.
pub const DEFAULT_MONSTER_COUNT: u32 = 12;
/// Columns in a freshly created world.
pub const DEFAULT_GRID_COLUMNS: u32 = 100;
/// Rows in a freshly created world.
pub const DEFAULT_GRID_ROWS: u32 = 100;
/// Largest number of cells a tile grid may hold.
pub const MAX_GRID_CELLS: u64 = 1 << 22;
/// Visible extent of a freshly created world: a 1024 pixel display of 128 pixel tiles.
pub const DEFAULT_VIEWPORT_SIZE: ViewportSize = ViewportSize::new(8, 8);

const PLAYER_START: CellCoord = CellCoord::new(0, 0);

/// Represents the authoritative Quince world state.
#[derive(Debug)]
pub struct World {
    banner: &'static str,
    tile_grid: TileGrid,
    entities: BTreeMap<EntityId, Entity>,
    next_entity: u32,
    player: EntityId,
    viewport: Viewport,
}

impl World {
    /// Creates a new world with the default grid, the player at the origin
    /// and a deterministic scattering of monsters.
    #[must_use]
    pub fn new() -> Self {
        let mut world = Self {
            banner: WELCOME_BANNER,
            tile_grid: TileGrid::generate(DEFAULT_GRID_COLUMNS, DEFAULT_GRID_ROWS),
            entities: BTreeMap::new(),
            next_entity: 0,
            player: EntityId::new(0),
            viewport: Viewport::new(DEFAULT_VIEWPORT_SIZE, EdgeClamp::default()),
        };
        let mut events = Vec::new();
        let configured = world
            .configure_tile_grid(DEFAULT_GRID_COLUMNS, DEFAULT_GRID_ROWS, &mut events)
            .and_then(|()| world.populate_monsters(DEFAULT_MONSTER_COUNT, &mut events));
        debug_assert!(configured.is_ok(), "default world configuration is valid");
        world
    }

    fn configure_tile_grid(
        &mut self,
        columns: u32,
        rows: u32,
        out_events: &mut Vec<Event>,
    ) -> Result<(), WorldError> {
        if columns == 0 || rows == 0 {
            return Err(WorldError::EmptyGrid { columns, rows });
        }
        if u64::from(columns) * u64::from(rows) > MAX_GRID_CELLS {
            return Err(WorldError::GridTooLarge {
                columns,
                rows,
                limit: MAX_GRID_CELLS,
            });
        }

        self.tile_grid = TileGrid::generate(columns, rows);
        self.entities.clear();
        self.next_entity = 0;
        out_events.push(Event::TileGridConfigured { columns, rows });
        info!(columns, rows, "tile grid configured");

        self.player = self.spawn(EntityKind::Player, PLAYER_START, out_events)?;
        self.viewport.reset(columns, rows);
        self.recentre_viewport(out_events);
        Ok(())
    }

    fn configure_viewport(
        &mut self,
        size: ViewportSize,
        clamp: EdgeClamp,
        out_events: &mut Vec<Event>,
    ) {
        self.viewport = Viewport::new(size, clamp);
        self.viewport
            .reset(self.tile_grid.columns(), self.tile_grid.rows());
        out_events.push(Event::ViewportConfigured { size, clamp });
        info!(
            columns = size.columns(),
            rows = size.rows(),
            ?clamp,
            "viewport configured"
        );
        self.recentre_viewport(out_events);
    }

    fn spawn(
        &mut self,
        kind: EntityKind,
        cell: CellCoord,
        out_events: &mut Vec<Event>,
    ) -> Result<EntityId, WorldError> {
        let id = EntityId::new(self.next_entity);
        self.tile_grid.tile_mut(cell)?.add_entity(id);
        self.next_entity = self.next_entity.saturating_add(1);
        let _ = self.entities.insert(id, Entity::new(id, kind, cell));
        out_events.push(Event::EntitySpawned {
            entity: id,
            kind,
            cell,
        });
        debug!(entity = id.get(), ?kind, column = cell.column(), row = cell.row(), "entity spawned");
        Ok(id)
    }

    fn spawn_monster(
        &mut self,
        cell: CellCoord,
        out_events: &mut Vec<Event>,
    ) -> Result<(), WorldError> {
        if self.tile_grid.tile(cell).is_none() {
            out_events.push(Event::SpawnRejected { cell });
            debug!(column = cell.column(), row = cell.row(), "spawn outside grid rejected");
            return Ok(());
        }
        let _ = self.spawn(EntityKind::Monster, cell, out_events)?;
        Ok(())
    }

    fn populate_monsters(
        &mut self,
        count: u32,
        out_events: &mut Vec<Event>,
    ) -> Result<(), WorldError> {
        let cells = monster_cells(&self.tile_grid, count);
        for cell in cells {
            let _ = self.spawn(EntityKind::Monster, cell, out_events)?;
        }
        Ok(())
    }

    fn step_entity(
        &mut self,
        entity: EntityId,
        direction: Direction,
        out_events: &mut Vec<Event>,
    ) -> Result<(), WorldError> {
        let Some(current) = self.entities.get(&entity) else {
            return Ok(());
        };
        let target = GridPoint::from(current.cell()).step(direction);
        self.move_entity_to(entity, target, out_events)
    }

    fn move_entity_to(
        &mut self,
        id: EntityId,
        target: GridPoint,
        out_events: &mut Vec<Event>,
    ) -> Result<(), WorldError> {
        let Some(entity) = self.entities.get_mut(&id) else {
            return Ok(());
        };
        let from = entity.cell();
        if GridPoint::from(from) == target {
            return Ok(());
        }

        if let Some(facing) = entity.turn_toward(target) {
            out_events.push(Event::EntityTurned { entity: id, facing });
        }
        let kind = entity.kind();

        if !is_single_step(from, target) {
            out_events.push(Event::MoveRejected { entity: id, target });
            debug!(entity = id.get(), x = target.x, y = target.y, "multi-cell move rejected");
            return Ok(());
        }

        let Some(destination) = self.tile_grid.cell_at(target) else {
            out_events.push(Event::MoveRejected { entity: id, target });
            debug!(entity = id.get(), x = target.x, y = target.y, "move outside grid rejected");
            return Ok(());
        };

        if kind.move_policy() == MovePolicy::BlockedByCollidables
            && self.is_collidable(destination)
        {
            out_events.push(Event::PlayerBumped {
                entity: id,
                cell: destination,
            });
            debug!(
                entity = id.get(),
                column = destination.column(),
                row = destination.row(),
                "bumped into occupied tile"
            );
            return self.collide_tile(destination, id, out_events);
        }

        self.relocate(id, from, destination, out_events)?;
        if id == self.player {
            self.recentre_viewport(out_events);
        }
        Ok(())
    }

    fn relocate(
        &mut self,
        id: EntityId,
        from: CellCoord,
        to: CellCoord,
        out_events: &mut Vec<Event>,
    ) -> Result<(), WorldError> {
        let _ = self.tile_grid.tile_mut(to)?;
        self.tile_grid.tile_mut(from)?.remove_entity(id)?;
        self.tile_grid.tile_mut(to)?.add_entity(id);
        if let Some(entity) = self.entities.get_mut(&id) {
            entity.relocate(to);
        }
        out_events.push(Event::EntityMoved { entity: id, from, to });
        Ok(())
    }

    fn is_collidable(&self, cell: CellCoord) -> bool {
        self.tile_grid
            .tile(cell)
            .map_or(false, |tile| tile.is_collidable(&self.entities))
    }

    /// Notifies every occupant of the tile. Occupants may remove themselves, so
    /// dispatch walks a snapshot of the occupant list.
    fn collide_tile(
        &mut self,
        cell: CellCoord,
        collider: EntityId,
        out_events: &mut Vec<Event>,
    ) -> Result<(), WorldError> {
        let occupants = match self.tile_grid.tile(cell) {
            Some(tile) => tile.occupants().to_vec(),
            None => return Ok(()),
        };
        for occupant in occupants {
            self.notify_collision(occupant, collider, out_events)?;
        }
        Ok(())
    }

    fn notify_collision(
        &mut self,
        target: EntityId,
        collider: EntityId,
        out_events: &mut Vec<Event>,
    ) -> Result<(), WorldError> {
        // Entities removed earlier in the dispatch have nothing left to react with.
        let Some(entity) = self.entities.get(&target) else {
            return Ok(());
        };
        let reaction = entity.kind().collision_reaction();
        out_events.push(Event::EntityCollided {
            entity: target,
            collider,
        });

        match reaction {
            CollisionReaction::Ignore => Ok(()),
            CollisionReaction::RemoveSelf => self.despawn(target, out_events),
        }
    }

    fn despawn(&mut self, id: EntityId, out_events: &mut Vec<Event>) -> Result<(), WorldError> {
        let Some(cell) = self.entities.get(&id).map(Entity::cell) else {
            return Ok(());
        };
        self.tile_grid.tile_mut(cell)?.remove_entity(id)?;
        let _ = self.entities.remove(&id);
        out_events.push(Event::EntityRemoved { entity: id, cell });
        debug!(entity = id.get(), column = cell.column(), row = cell.row(), "entity removed");
        Ok(())
    }

    fn recentre_viewport(&mut self, out_events: &mut Vec<Event>) {
        let Some(focus) = self.entities.get(&self.player).map(Entity::cell) else {
            return;
        };
        if self
            .viewport
            .recentre(focus, self.tile_grid.columns(), self.tile_grid.rows())
        {
            out_events.push(Event::ViewportChanged {
                viewport: self.viewport.rect(),
            });
        }
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies the provided command to the world, mutating state deterministically.
///
/// Rejected requests (moves off the grid, unknown entities) are not errors.
/// An `Err` signals either an invalid grid configuration or a broken occupancy
/// invariant; the latter means the world can no longer be trusted.
pub fn apply(
    world: &mut World,
    command: Command,
    out_events: &mut Vec<Event>,
) -> Result<(), WorldError> {
    match command {
        Command::ConfigureTileGrid { columns, rows } => {
            world.configure_tile_grid(columns, rows, out_events)
        }
        Command::ConfigureViewport { size, clamp } => {
            world.configure_viewport(size, clamp, out_events);
            Ok(())
        }
        Command::PopulateMonsters { count } => world.populate_monsters(count, out_events),
        Command::SpawnMonster { cell } => world.spawn_monster(cell, out_events),
        Command::StepEntity { entity, direction } => {
            world.step_entity(entity, direction, out_events)
        }
        Command::MoveEntityTo { entity, target } => {
            world.move_entity_to(entity, target, out_events)
        }
        Command::NotifyCollision { target, collider } => {
            world.notify_collision(target, collider, out_events)
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use quince_core::{CellCoord, EdgeClamp, EntityId, EntityKind, ViewportRect, ViewportSize};

    use super::{Entity, Tile, TileGrid, World};

    /// Retrieves the welcome banner that adapters may display to players.
    #[must_use]
    pub fn welcome_banner(world: &World) -> &'static str {
        world.banner
    }

    /// Provides read-only access to the world's tile grid.
    #[must_use]
    pub fn tile_grid(world: &World) -> &TileGrid {
        &world.tile_grid
    }

    /// Identifier of the player entity.
    #[must_use]
    pub fn player_id(world: &World) -> EntityId {
        world.player
    }

    /// The player entity.
    #[must_use]
    pub fn player(world: &World) -> Option<&Entity> {
        world.entities.get(&world.player)
    }

    /// Looks up a live entity.
    #[must_use]
    pub fn entity(world: &World, id: EntityId) -> Option<&Entity> {
        world.entities.get(&id)
    }

    /// Iterates live entities in identifier order.
    pub fn entities(world: &World) -> impl Iterator<Item = &Entity> {
        world.entities.values()
    }

    /// Number of live monsters.
    #[must_use]
    pub fn monster_count(world: &World) -> usize {
        world
            .entities
            .values()
            .filter(|entity| entity.kind() == EntityKind::Monster)
            .count()
    }

    /// Tile stored at the provided cell, if it lies inside the grid.
    #[must_use]
    pub fn tile(world: &World, cell: CellCoord) -> Option<&Tile> {
        world.tile_grid.tile(cell)
    }

    /// Number of entities standing on the cell; zero outside the grid.
    #[must_use]
    pub fn occupant_count(world: &World, cell: CellCoord) -> usize {
        world
            .tile_grid
            .tile(cell)
            .map_or(0, |tile| tile.occupants().len())
    }

    /// Reports whether any occupant of the cell blocks movement onto it.
    #[must_use]
    pub fn is_collidable(world: &World, cell: CellCoord) -> bool {
        world.is_collidable(cell)
    }

    /// Rectangle of the grid currently visible.
    #[must_use]
    pub fn viewport(world: &World) -> ViewportRect {
        world.viewport.rect()
    }

    /// Configured visible extent.
    #[must_use]
    pub fn viewport_size(world: &World) -> ViewportSize {
        world.viewport.size()
    }

    /// Configured edge policy.
    #[must_use]
    pub fn edge_clamp(world: &World) -> EdgeClamp {
        world.viewport.clamp()
    }

    /// Tile inside the viewport together with its screen position.
    #[derive(Clone, Copy, Debug)]
    pub struct VisibleTile<'a> {
        /// Column on screen, counted in tiles from the viewport's left edge.
        pub screen_column: u32,
        /// Row on screen, counted in tiles from the viewport's top edge.
        pub screen_row: u32,
        /// Grid cell backing the screen position.
        pub cell: CellCoord,
        /// Tile stored at the cell.
        pub tile: &'a Tile,
    }

    /// Enumerates the tiles inside the viewport in row-major order.
    pub fn visible_tiles(world: &World) -> impl Iterator<Item = VisibleTile<'_>> {
        let rect = world.viewport.rect();
        (rect.top()..rect.bottom()).flat_map(move |row| {
            (rect.left()..rect.right()).filter_map(move |column| {
                let cell = CellCoord::new(column, row);
                let tile = world.tile_grid.tile(cell)?;
                let (screen_column, screen_row) = rect.to_screen(cell)?;
                Some(VisibleTile {
                    screen_column,
                    screen_row,
                    cell,
                    tile,
                })
            })
        })
    }
}

/// Whether `target` lies exactly one cardinal step from `from`.
fn is_single_step(from: CellCoord, target: GridPoint) -> bool {
    let from = GridPoint::from(from);
    let dx = from.x.abs_diff(target.x);
    let dy = from.y.abs_diff(target.y);
    matches!((dx, dy), (1, 0) | (0, 1))
}

fn monster_cells(grid: &TileGrid, count: u32) -> Vec<CellCoord> {
    let mut cells: Vec<CellCoord> = Vec::new();
    for row in 0..grid.rows() {
        for column in 0..grid.columns() {
            let cell = CellCoord::new(column, row);
            if grid.tile(cell).map_or(false, |tile| tile.occupants().is_empty()) {
                cells.push(cell);
            }
        }
    }

    let mut rng_state = MONSTER_PLACEMENT_SEED;
    for index in (1..cells.len()).rev() {
        rng_state = next_random(rng_state);
        let swap_index = (rng_state % (index as u64 + 1)) as usize;
        cells.swap(index, swap_index);
    }

    let target_count = usize::try_from(count).unwrap_or(usize::MAX);
    cells.truncate(target_count);
    cells
}

pub(crate) fn next_random(state: u64) -> u64 {
    state
        .wrapping_mul(6_364_136_223_846_793_005)
        .wrapping_add(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use quince_core::{TileVisual, ViewportRect};

    fn configured(columns: u32, rows: u32) -> (World, Vec<Event>) {
        let mut world = World::new();
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::ConfigureTileGrid { columns, rows },
            &mut events,
        )
        .expect("valid grid");
        (world, events)
    }

    #[test]
    fn new_world_places_player_at_origin() {
        let world = World::new();

        let player = query::player(&world).expect("player exists");
        assert_eq!(player.kind(), EntityKind::Player);
        assert_eq!(player.cell(), CellCoord::new(0, 0));
        assert_eq!(query::monster_count(&world), DEFAULT_MONSTER_COUNT as usize);
        assert_eq!(query::tile_grid(&world).columns(), DEFAULT_GRID_COLUMNS);
        assert_eq!(
            query::viewport(&world),
            ViewportRect::from_origin_and_size(0, 0, 8, 8)
        );
        assert_eq!(query::welcome_banner(&world), WELCOME_BANNER);
    }

    #[test]
    fn apply_configures_tile_grid() {
        let (world, events) = configured(12, 8);

        let grid = query::tile_grid(&world);
        assert_eq!(grid.columns(), 12);
        assert_eq!(grid.rows(), 8);
        assert_eq!(query::monster_count(&world), 0);
        assert_eq!(
            events.first(),
            Some(&Event::TileGridConfigured {
                columns: 12,
                rows: 8
            })
        );
        assert!(events.contains(&Event::EntitySpawned {
            entity: query::player_id(&world),
            kind: EntityKind::Player,
            cell: CellCoord::new(0, 0),
        }));
    }

    #[test]
    fn configuring_empty_grid_is_rejected_without_side_effects() {
        let mut world = World::new();
        let mut events = Vec::new();

        let result = apply(
            &mut world,
            Command::ConfigureTileGrid {
                columns: 0,
                rows: 4,
            },
            &mut events,
        );

        assert_eq!(result, Err(WorldError::EmptyGrid { columns: 0, rows: 4 }));
        assert!(events.is_empty());
        assert_eq!(query::tile_grid(&world).columns(), DEFAULT_GRID_COLUMNS);
        assert!(query::player(&world).is_some());
    }

    #[test]
    fn configuring_oversized_grid_is_rejected_before_allocating() {
        let mut world = World::new();
        let mut events = Vec::new();

        let result = apply(
            &mut world,
            Command::ConfigureTileGrid {
                columns: 100_000,
                rows: 100_000,
            },
            &mut events,
        );

        assert_eq!(
            result,
            Err(WorldError::GridTooLarge {
                columns: 100_000,
                rows: 100_000,
                limit: MAX_GRID_CELLS,
            })
        );
        assert!(events.is_empty());
        assert_eq!(query::tile_grid(&world).rows(), DEFAULT_GRID_ROWS);

        let just_over = apply(
            &mut world,
            Command::ConfigureTileGrid {
                columns: 2049,
                rows: 2048,
            },
            &mut events,
        );
        assert!(matches!(just_over, Err(WorldError::GridTooLarge { .. })));
    }

    #[test]
    fn monster_population_is_deterministic_for_same_grid() {
        let (mut first, _) = configured(12, 9);
        let (mut second, _) = configured(12, 9);
        let mut first_events = Vec::new();
        let mut second_events = Vec::new();

        apply(
            &mut first,
            Command::PopulateMonsters { count: 6 },
            &mut first_events,
        )
        .expect("populate");
        apply(
            &mut second,
            Command::PopulateMonsters { count: 6 },
            &mut second_events,
        )
        .expect("populate");

        assert_eq!(first_events, second_events);
        assert_eq!(first_events.len(), 6);
    }

    #[test]
    fn monster_population_avoids_occupied_cells() {
        let (mut world, _) = configured(2, 2);
        let mut events = Vec::new();

        apply(
            &mut world,
            Command::PopulateMonsters { count: 10 },
            &mut events,
        )
        .expect("populate");

        assert_eq!(query::monster_count(&world), 3);
        for row in 0..2 {
            for column in 0..2 {
                assert_eq!(query::occupant_count(&world, CellCoord::new(column, row)), 1);
            }
        }
        assert_eq!(query::occupant_count(&world, CellCoord::new(2, 0)), 0);
    }

    #[test]
    fn spawn_outside_grid_is_rejected() {
        let (mut world, _) = configured(4, 4);
        let mut events = Vec::new();

        apply(
            &mut world,
            Command::SpawnMonster {
                cell: CellCoord::new(4, 0),
            },
            &mut events,
        )
        .expect("rejection is not an error");

        assert_eq!(
            events,
            vec![Event::SpawnRejected {
                cell: CellCoord::new(4, 0)
            }]
        );
        assert_eq!(query::monster_count(&world), 0);
    }

    #[test]
    fn visible_tiles_cover_viewport_in_row_major_order() {
        let (world, _) = configured(20, 20);

        let visible: Vec<_> = query::visible_tiles(&world).collect();
        assert_eq!(visible.len(), 64);
        assert_eq!(visible[0].cell, CellCoord::new(0, 0));
        assert_eq!((visible[0].screen_column, visible[0].screen_row), (0, 0));
        assert_eq!(visible[9].cell, CellCoord::new(1, 1));
        assert!(matches!(visible[0].tile.visual(), TileVisual::Marker(_)));
        assert_eq!(visible[1].tile.visual(), TileVisual::Terrain);
        assert!(visible[0].tile.contains(query::player_id(&world)));
    }

    #[test]
    fn configuring_viewport_recentres_on_player() {
        let (mut world, _) = configured(30, 30);
        let player = query::player_id(&world);
        let mut events = Vec::new();
        for direction in [Direction::East, Direction::South] {
            for _ in 0..10 {
                apply(
                    &mut world,
                    Command::StepEntity {
                        entity: player,
                        direction,
                    },
                    &mut events,
                )
                .expect("step");
            }
        }
        assert_eq!(query::player(&world).map(Entity::cell), Some(CellCoord::new(10, 10)));
        events.clear();

        apply(
            &mut world,
            Command::ConfigureViewport {
                size: ViewportSize::new(4, 6),
                clamp: EdgeClamp::GridEdge,
            },
            &mut events,
        )
        .expect("configure");

        assert_eq!(
            query::viewport(&world),
            ViewportRect::from_origin_and_size(8, 7, 4, 6)
        );
        assert_eq!(query::viewport_size(&world), ViewportSize::new(4, 6));
        assert_eq!(query::edge_clamp(&world), EdgeClamp::GridEdge);
        assert!(events.contains(&Event::ViewportChanged {
            viewport: ViewportRect::from_origin_and_size(8, 7, 4, 6)
        }));
    }

    #[test]
    fn unknown_entities_are_ignored() {
        let (mut world, _) = configured(4, 4);
        let mut events = Vec::new();

        apply(
            &mut world,
            Command::StepEntity {
                entity: EntityId::new(99),
                direction: Direction::East,
            },
            &mut events,
        )
        .expect("ignored");

        assert!(events.is_empty());
    }
}
