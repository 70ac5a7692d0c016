#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure controls system that turns directional requests into player moves.

use quince_core::{Command, Direction, EntityId, EntityKind, Event};

/// Tracks the player through world events and emits movement commands for it.
#[derive(Debug, Default)]
pub struct Controls {
    player: Option<EntityId>,
}

impl Controls {
    /// Creates a controls system already bound to a known player.
    #[must_use]
    pub const fn for_player(player: EntityId) -> Self {
        Self {
            player: Some(player),
        }
    }

    /// Player currently steered by the system.
    #[must_use]
    pub const fn player(&self) -> Option<EntityId> {
        self.player
    }

    /// Consumes world events and the frame's directional request.
    ///
    /// At most one step is emitted per call.
    pub fn handle(&mut self, events: &[Event], request: Option<Direction>, out: &mut Vec<Command>) {
        for event in events {
            match event {
                Event::EntitySpawned {
                    entity,
                    kind: EntityKind::Player,
                    ..
                } => self.player = Some(*entity),
                Event::EntityRemoved { entity, .. } if self.player == Some(*entity) => {
                    self.player = None;
                }
                _ => {}
            }
        }

        let (Some(entity), Some(direction)) = (self.player, request) else {
            return;
        };
        out.push(Command::StepEntity { entity, direction });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quince_core::CellCoord;

    #[test]
    fn no_commands_without_player() {
        let mut controls = Controls::default();
        let mut commands = Vec::new();

        controls.handle(&[], Some(Direction::East), &mut commands);

        assert!(commands.is_empty());
    }

    #[test]
    fn no_commands_without_request() {
        let mut controls = Controls::for_player(EntityId::new(0));
        let mut commands = Vec::new();

        controls.handle(&[], None, &mut commands);

        assert!(commands.is_empty());
    }

    #[test]
    fn follows_player_respawns() {
        let mut controls = Controls::for_player(EntityId::new(0));
        let mut commands = Vec::new();
        let events = [
            Event::TileGridConfigured {
                columns: 4,
                rows: 4,
            },
            Event::EntitySpawned {
                entity: EntityId::new(7),
                kind: EntityKind::Player,
                cell: CellCoord::new(0, 0),
            },
            Event::EntitySpawned {
                entity: EntityId::new(8),
                kind: EntityKind::Monster,
                cell: CellCoord::new(1, 0),
            },
        ];

        controls.handle(&events, Some(Direction::South), &mut commands);

        assert_eq!(controls.player(), Some(EntityId::new(7)));
        assert_eq!(
            commands,
            vec![Command::StepEntity {
                entity: EntityId::new(7),
                direction: Direction::South,
            }]
        );
    }

    #[test]
    fn removed_player_stops_commands() {
        let mut controls = Controls::for_player(EntityId::new(3));
        let mut commands = Vec::new();

        controls.handle(
            &[Event::EntityRemoved {
                entity: EntityId::new(3),
                cell: CellCoord::new(0, 0),
            }],
            Some(Direction::North),
            &mut commands,
        );

        assert_eq!(controls.player(), None);
        assert!(commands.is_empty());
    }
}
