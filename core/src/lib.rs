#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Quince workspace.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values for systems to
//! react to. Systems consume event streams, query immutable views, and respond
//! with new command batches or presentation cues.

use serde::{Deserialize, Serialize};

/// Canonical banner emitted when the game boots.
pub const WELCOME_BANNER: &str = "Welcome to Quince.";

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Rebuilds the tile grid with the provided dimensions.
    ///
    /// The player is placed at the origin and all monsters are discarded.
    ConfigureTileGrid {
        /// Number of tile columns laid out in the grid.
        columns: u32,
        /// Number of tile rows laid out in the grid.
        rows: u32,
    },
    /// Replaces the visible extent and edge policy used by the viewport.
    ConfigureViewport {
        /// Number of tiles visible along each axis.
        size: ViewportSize,
        /// Policy applied when the centred viewport would overflow the grid.
        clamp: EdgeClamp,
    },
    /// Scatters the requested number of monsters across the grid.
    PopulateMonsters {
        /// Number of monsters to place.
        count: u32,
    },
    /// Places a single monster on the provided cell.
    SpawnMonster {
        /// Cell the monster should occupy.
        cell: CellCoord,
    },
    /// Requests that an entity advance a single step in the given direction.
    StepEntity {
        /// Identifier of the entity attempting to move.
        entity: EntityId,
        /// Direction of travel for the attempted step.
        direction: Direction,
    },
    /// Requests that an entity relocate to a neighbouring grid point.
    ///
    /// Targets further than one cardinal step away are rejected.
    MoveEntityTo {
        /// Identifier of the entity attempting to move.
        entity: EntityId,
        /// Destination, which may lie outside the grid.
        target: GridPoint,
    },
    /// Delivers a collision notification directly to an entity.
    NotifyCollision {
        /// Entity receiving the notification.
        target: EntityId,
        /// Entity that bumped into the target.
        collider: EntityId,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Confirms that the tile grid was rebuilt.
    TileGridConfigured {
        /// Number of tile columns in the new grid.
        columns: u32,
        /// Number of tile rows in the new grid.
        rows: u32,
    },
    /// Confirms that the viewport extent or edge policy changed.
    ViewportConfigured {
        /// Number of tiles visible along each axis.
        size: ViewportSize,
        /// Edge policy that is now active.
        clamp: EdgeClamp,
    },
    /// Confirms that an entity was placed into the world.
    EntitySpawned {
        /// Identifier assigned to the entity.
        entity: EntityId,
        /// Variant of the spawned entity.
        kind: EntityKind,
        /// Cell the entity occupies.
        cell: CellCoord,
    },
    /// Reports that a spawn request named a cell outside the grid.
    SpawnRejected {
        /// Cell provided in the request.
        cell: CellCoord,
    },
    /// Announces that an entity changed the direction it faces.
    EntityTurned {
        /// Identifier of the entity that turned.
        entity: EntityId,
        /// Orientation after the turn.
        facing: Facing,
    },
    /// Confirms that an entity moved between two cells.
    EntityMoved {
        /// Identifier of the entity that moved.
        entity: EntityId,
        /// Cell the entity occupied before moving.
        from: CellCoord,
        /// Cell the entity occupies after moving.
        to: CellCoord,
    },
    /// Reports that a move targeted a point outside the grid.
    MoveRejected {
        /// Identifier of the entity whose move was rejected.
        entity: EntityId,
        /// Requested destination.
        target: GridPoint,
    },
    /// Reports that the player bumped into a collidable tile instead of moving.
    PlayerBumped {
        /// Identifier of the player entity.
        entity: EntityId,
        /// Cell the player attempted to enter.
        cell: CellCoord,
    },
    /// Reports that an entity received a collision notification.
    EntityCollided {
        /// Entity that was collided with.
        entity: EntityId,
        /// Entity responsible for the collision.
        collider: EntityId,
    },
    /// Confirms that an entity was permanently removed from the world.
    EntityRemoved {
        /// Identifier of the removed entity.
        entity: EntityId,
        /// Cell the entity occupied before removal.
        cell: CellCoord,
    },
    /// Announces that the visible region of the grid moved.
    ViewportChanged {
        /// Rectangle that is now visible.
        viewport: ViewportRect,
    },
}

/// Cardinal movement directions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Movement toward decreasing row indices.
    North,
    /// Movement toward increasing column indices.
    East,
    /// Movement toward increasing row indices.
    South,
    /// Movement toward decreasing column indices.
    West,
}

impl Direction {
    /// All directions in clockwise order starting from north.
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    /// Unit offset `(dx, dy)` travelled by a single step.
    #[must_use]
    pub const fn offset(self) -> (i64, i64) {
        match self {
            Self::North => (0, -1),
            Self::East => (1, 0),
            Self::South => (0, 1),
            Self::West => (-1, 0),
        }
    }

    /// Orientation an entity adopts when stepping in this direction.
    #[must_use]
    pub const fn facing(self) -> Facing {
        match self {
            Self::North => Facing::Back,
            Self::East => Facing::Right,
            Self::South => Facing::Front,
            Self::West => Facing::Left,
        }
    }
}

/// Orientation of an entity's sprite.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Facing {
    /// Looking toward decreasing columns; the orientation entities spawn with.
    #[default]
    Left,
    /// Looking toward increasing columns.
    Right,
    /// Looking toward the viewer (increasing rows).
    Front,
    /// Looking away from the viewer (decreasing rows).
    Back,
}

impl Facing {
    /// Derives the facing from the sign of a movement delta.
    ///
    /// Horizontal movement takes precedence over vertical movement. A zero
    /// delta yields `None`.
    #[must_use]
    pub const fn from_delta(dx: i64, dy: i64) -> Option<Self> {
        if dx < 0 {
            Some(Self::Left)
        } else if dx > 0 {
            Some(Self::Right)
        } else if dy > 0 {
            Some(Self::Front)
        } else if dy < 0 {
            Some(Self::Back)
        } else {
            None
        }
    }

    /// Column of the entity sprite sheet that holds this orientation.
    #[must_use]
    pub const fn sprite_column(self) -> u32 {
        match self {
            Self::Left => 0,
            Self::Front => 1,
            Self::Back => 2,
            Self::Right => 3,
        }
    }
}

/// Unique identifier assigned to an entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(u32);

impl EntityId {
    /// Creates a new entity identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Variants of entities that can occupy tiles.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    /// The single player-controlled character.
    Player,
    /// A stationary monster removed when the player bumps into it.
    Monster,
}

/// Location of a single grid cell expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }
}

/// Signed grid position used for movement targets that may lie off the grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridPoint {
    /// Horizontal coordinate.
    pub x: i64,
    /// Vertical coordinate.
    pub y: i64,
}

impl GridPoint {
    /// Creates a new grid point.
    #[must_use]
    pub const fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }

    /// Point reached by travelling one step in `direction`.
    #[must_use]
    pub const fn step(self, direction: Direction) -> Self {
        let (dx, dy) = direction.offset();
        Self::new(self.x + dx, self.y + dy)
    }
}

impl From<CellCoord> for GridPoint {
    fn from(cell: CellCoord) -> Self {
        Self::new(i64::from(cell.column()), i64::from(cell.row()))
    }
}

/// Policy applied when a centred viewport would extend past the grid edge.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EdgeClamp {
    /// Pin the viewport against the grid edge.
    #[default]
    GridEdge,
    /// Keep the origin the viewport had before the recentre on that axis.
    RetainPrevious,
}

/// Number of tiles visible along each axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ViewportSize {
    columns: u32,
    rows: u32,
}

impl ViewportSize {
    /// Creates a new viewport extent.
    #[must_use]
    pub const fn new(columns: u32, rows: u32) -> Self {
        Self { columns, rows }
    }

    /// Derives the extent from a display size and square tile size in pixels.
    ///
    /// A zero tile size produces an empty extent.
    #[must_use]
    pub const fn from_display(width: u32, height: u32, tile_size: u32) -> Self {
        if tile_size == 0 {
            return Self::new(0, 0);
        }
        Self::new(width / tile_size, height / tile_size)
    }

    /// Number of visible columns.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of visible rows.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }
}

/// Axis-aligned rectangle of visible cells. `right` and `bottom` are exclusive.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ViewportRect {
    left: u32,
    top: u32,
    right: u32,
    bottom: u32,
}

impl ViewportRect {
    /// Constructs a rectangle from its upper-left corner and dimensions.
    #[must_use]
    pub const fn from_origin_and_size(left: u32, top: u32, width: u32, height: u32) -> Self {
        Self {
            left,
            top,
            right: left + width,
            bottom: top + height,
        }
    }

    /// First visible column.
    #[must_use]
    pub const fn left(&self) -> u32 {
        self.left
    }

    /// First visible row.
    #[must_use]
    pub const fn top(&self) -> u32 {
        self.top
    }

    /// Column one past the last visible column.
    #[must_use]
    pub const fn right(&self) -> u32 {
        self.right
    }

    /// Row one past the last visible row.
    #[must_use]
    pub const fn bottom(&self) -> u32 {
        self.bottom
    }

    /// Number of visible columns.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.right - self.left
    }

    /// Number of visible rows.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.bottom - self.top
    }

    /// Reports whether the cell lies inside the rectangle.
    #[must_use]
    pub const fn contains(&self, cell: CellCoord) -> bool {
        cell.column() >= self.left
            && cell.column() < self.right
            && cell.row() >= self.top
            && cell.row() < self.bottom
    }

    /// Translates a grid cell into screen tile coordinates relative to the origin.
    #[must_use]
    pub const fn to_screen(&self, cell: CellCoord) -> Option<(u32, u32)> {
        if self.contains(cell) {
            Some((cell.column() - self.left, cell.row() - self.top))
        } else {
            None
        }
    }
}

/// Visual appearance applied to a placeholder tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileColor {
    red: u8,
    green: u8,
    blue: u8,
}

impl TileColor {
    /// Creates a new tile color from byte RGB components.
    #[must_use]
    pub const fn from_rgb(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    /// Red component of the color.
    #[must_use]
    pub const fn red(&self) -> u8 {
        self.red
    }

    /// Green component of the color.
    #[must_use]
    pub const fn green(&self) -> u8 {
        self.green
    }

    /// Blue component of the color.
    #[must_use]
    pub const fn blue(&self) -> u8 {
        self.blue
    }
}

/// Visual identifier carried by a tile. Opaque to the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TileVisual {
    /// Default ground texture.
    Terrain,
    /// Procedurally coloured placeholder.
    Marker(TileColor),
}

/// Sound effects the game may trigger.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SoundEffect {
    /// Played when the player bumps into an occupied tile.
    Bump,
}

/// Fire-and-forget request addressed to the audio collaborator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SoundCue {
    /// Starts playing the effect once.
    Play(SoundEffect),
    /// Stops any playing instance of the effect.
    Stop(SoundEffect),
}

#[cfg(test)]
mod tests {
    use super::{
        CellCoord, Direction, EdgeClamp, EntityId, Facing, GridPoint, TileVisual, TileColor,
        ViewportRect, ViewportSize,
    };
    use serde::{de::DeserializeOwned, Serialize};

    fn assert_round_trip<T>(value: &T)
    where
        T: Serialize + DeserializeOwned + PartialEq + std::fmt::Debug,
    {
        let bytes = bincode::serialize(value).expect("serialize");
        let restored: T = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(&restored, value);
    }

    #[test]
    fn entity_id_round_trips_through_bincode() {
        assert_round_trip(&EntityId::new(42));
    }

    #[test]
    fn tile_visual_round_trips_through_bincode() {
        assert_round_trip(&TileVisual::Marker(TileColor::from_rgb(1, 2, 3)));
        assert_round_trip(&EdgeClamp::RetainPrevious);
    }

    #[test]
    fn facing_follows_sign_of_delta() {
        assert_eq!(Facing::from_delta(-1, 0), Some(Facing::Left));
        assert_eq!(Facing::from_delta(3, 0), Some(Facing::Right));
        assert_eq!(Facing::from_delta(0, 1), Some(Facing::Front));
        assert_eq!(Facing::from_delta(0, -2), Some(Facing::Back));
        assert_eq!(Facing::from_delta(0, 0), None);
    }

    #[test]
    fn horizontal_delta_wins_over_vertical() {
        assert_eq!(Facing::from_delta(1, -1), Some(Facing::Right));
        assert_eq!(Facing::from_delta(-1, 1), Some(Facing::Left));
    }

    #[test]
    fn direction_facing_matches_step_delta() {
        for direction in Direction::ALL {
            let (dx, dy) = direction.offset();
            assert_eq!(Facing::from_delta(dx, dy), Some(direction.facing()));
        }
    }

    #[test]
    fn sprite_columns_match_sheet_layout() {
        assert_eq!(Facing::Left.sprite_column(), 0);
        assert_eq!(Facing::Front.sprite_column(), 1);
        assert_eq!(Facing::Back.sprite_column(), 2);
        assert_eq!(Facing::Right.sprite_column(), 3);
    }

    #[test]
    fn grid_point_steps_off_the_grid() {
        let origin = GridPoint::from(CellCoord::new(0, 0));
        assert_eq!(origin.step(Direction::West), GridPoint::new(-1, 0));
        assert_eq!(origin.step(Direction::North), GridPoint::new(0, -1));
    }

    #[test]
    fn viewport_size_divides_display_by_tile() {
        assert_eq!(
            ViewportSize::from_display(1024, 1024, 128),
            ViewportSize::new(8, 8)
        );
        assert_eq!(ViewportSize::from_display(1000, 700, 128), ViewportSize::new(7, 5));
        assert_eq!(ViewportSize::from_display(1024, 1024, 0), ViewportSize::new(0, 0));
    }

    #[test]
    fn viewport_rect_translates_cells_to_screen() {
        let rect = ViewportRect::from_origin_and_size(3, 4, 8, 8);
        assert_eq!(rect.right(), 11);
        assert_eq!(rect.bottom(), 12);
        assert_eq!(rect.to_screen(CellCoord::new(3, 4)), Some((0, 0)));
        assert_eq!(rect.to_screen(CellCoord::new(10, 11)), Some((7, 7)));
        assert_eq!(rect.to_screen(CellCoord::new(11, 4)), None);
        assert_eq!(rect.to_screen(CellCoord::new(2, 4)), None);
    }
}
