use std::cmp::Ordering;

use quince_core::{CellCoord, EntityId, EntityKind, Facing, GridPoint};

/// How an entity treats collidable tiles when it moves.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum MovePolicy {
    /// Bump into collidable tiles instead of entering them.
    BlockedByCollidables,
    /// Enter any in-bounds tile.
    Unconditional,
}

/// What an entity does when something collides with it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum CollisionReaction {
    /// Nothing happens.
    Ignore,
    /// The entity leaves the world for good.
    RemoveSelf,
}

/// Per-variant capabilities consulted by the world when moving entities.
pub(crate) trait Behaviour {
    fn move_policy(self) -> MovePolicy;
    fn collision_reaction(self) -> CollisionReaction;
}

impl Behaviour for EntityKind {
    fn move_policy(self) -> MovePolicy {
        match self {
            EntityKind::Player => MovePolicy::BlockedByCollidables,
            // Monsters walk onto the player and onto each other without incident.
            EntityKind::Monster => MovePolicy::Unconditional,
        }
    }

    fn collision_reaction(self) -> CollisionReaction {
        match self {
            EntityKind::Player => CollisionReaction::Ignore,
            EntityKind::Monster => CollisionReaction::RemoveSelf,
        }
    }
}

/// Positioned occupant of a single tile.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Entity {
    id: EntityId,
    kind: EntityKind,
    cell: CellCoord,
    facing: Facing,
    collidable: bool,
}

impl Entity {
    pub(crate) const fn new(id: EntityId, kind: EntityKind, cell: CellCoord) -> Self {
        Self {
            id,
            kind,
            cell,
            facing: Facing::Left,
            collidable: true,
        }
    }

    /// Identifier assigned by the world.
    #[must_use]
    pub const fn id(&self) -> EntityId {
        self.id
    }

    /// Variant of the entity.
    #[must_use]
    pub const fn kind(&self) -> EntityKind {
        self.kind
    }

    /// Cell the entity currently occupies.
    #[must_use]
    pub const fn cell(&self) -> CellCoord {
        self.cell
    }

    /// Orientation of the entity's sprite.
    #[must_use]
    pub const fn facing(&self) -> Facing {
        self.facing
    }

    /// Whether the entity blocks movement onto its tile.
    #[must_use]
    pub const fn is_collidable(&self) -> bool {
        self.collidable
    }

    /// Turns toward the target. Returns the new facing when it changed.
    pub(crate) fn turn_toward(&mut self, target: GridPoint) -> Option<Facing> {
        let origin = GridPoint::from(self.cell);
        let facing = Facing::from_delta(
            sign_toward(origin.x, target.x),
            sign_toward(origin.y, target.y),
        )?;
        if facing == self.facing {
            return None;
        }
        self.facing = facing;
        Some(facing)
    }

    pub(crate) fn relocate(&mut self, cell: CellCoord) {
        self.cell = cell;
    }
}

/// Sign of `to - from`, computed without subtracting.
fn sign_toward(from: i64, to: i64) -> i64 {
    match to.cmp(&from) {
        Ordering::Less => -1,
        Ordering::Equal => 0,
        Ordering::Greater => 1,
    }
}
