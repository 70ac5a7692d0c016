use quince_core::{CellCoord, Command, Direction, EntityId, Event, Facing};
use quince_world::{self as world, query, World};

fn run(world: &mut World, command: Command) -> Vec<Event> {
    let mut events = Vec::new();
    world::apply(world, command, &mut events).expect("command applies");
    events
}

fn empty_world(columns: u32, rows: u32) -> World {
    let mut world = World::new();
    let _ = run(&mut world, Command::ConfigureTileGrid { columns, rows });
    world
}

fn spawned_ids(events: &[Event]) -> Vec<EntityId> {
    events
        .iter()
        .filter_map(|event| match event {
            Event::EntitySpawned { entity, .. } => Some(*entity),
            _ => None,
        })
        .collect()
}

#[test]
fn player_bump_removes_monster_and_keeps_player_in_place() {
    let mut world = empty_world(100, 100);
    let player = query::player_id(&world);
    let monster = spawned_ids(&run(
        &mut world,
        Command::SpawnMonster {
            cell: CellCoord::new(1, 1),
        },
    ))[0];
    let _ = run(
        &mut world,
        Command::StepEntity {
            entity: player,
            direction: Direction::South,
        },
    );

    let events = run(
        &mut world,
        Command::StepEntity {
            entity: player,
            direction: Direction::East,
        },
    );

    assert_eq!(
        events,
        vec![
            Event::EntityTurned {
                entity: player,
                facing: Facing::Right,
            },
            Event::PlayerBumped {
                entity: player,
                cell: CellCoord::new(1, 1),
            },
            Event::EntityCollided {
                entity: monster,
                collider: player,
            },
            Event::EntityRemoved {
                entity: monster,
                cell: CellCoord::new(1, 1),
            },
        ]
    );
    assert_eq!(
        query::player(&world).expect("player").cell(),
        CellCoord::new(0, 1)
    );
    assert!(query::entity(&world, monster).is_none());
    assert!(query::tile(&world, CellCoord::new(1, 1))
        .expect("in bounds")
        .occupants()
        .is_empty());
    assert!(!query::is_collidable(&world, CellCoord::new(1, 1)));

    let events = run(
        &mut world,
        Command::StepEntity {
            entity: player,
            direction: Direction::East,
        },
    );
    assert!(events.contains(&Event::EntityMoved {
        entity: player,
        from: CellCoord::new(0, 1),
        to: CellCoord::new(1, 1),
    }));
}

#[test]
fn bump_notifies_every_occupant_of_the_tile() {
    let mut world = empty_world(6, 6);
    let player = query::player_id(&world);
    let mut monsters = spawned_ids(&run(
        &mut world,
        Command::SpawnMonster {
            cell: CellCoord::new(1, 0),
        },
    ));
    monsters.extend(spawned_ids(&run(
        &mut world,
        Command::SpawnMonster {
            cell: CellCoord::new(1, 0),
        },
    )));
    assert_eq!(monsters.len(), 2);

    let events = run(
        &mut world,
        Command::StepEntity {
            entity: player,
            direction: Direction::East,
        },
    );

    for monster in &monsters {
        assert!(events.contains(&Event::EntityCollided {
            entity: *monster,
            collider: player,
        }));
        assert!(query::entity(&world, *monster).is_none());
    }
    assert_eq!(query::monster_count(&world), 0);
    assert_eq!(
        query::player(&world).expect("player").cell(),
        CellCoord::new(0, 0)
    );
}

#[test]
fn collision_with_removed_monster_is_a_no_op() {
    let mut world = empty_world(4, 4);
    let player = query::player_id(&world);
    let monster = spawned_ids(&run(
        &mut world,
        Command::SpawnMonster {
            cell: CellCoord::new(2, 2),
        },
    ))[0];

    let first = run(
        &mut world,
        Command::NotifyCollision {
            target: monster,
            collider: player,
        },
    );
    let second = run(
        &mut world,
        Command::NotifyCollision {
            target: monster,
            collider: player,
        },
    );

    assert!(first.contains(&Event::EntityRemoved {
        entity: monster,
        cell: CellCoord::new(2, 2),
    }));
    assert!(second.is_empty());
    assert_eq!(query::monster_count(&world), 0);
}

#[test]
fn player_ignores_collisions() {
    let mut world = empty_world(4, 4);
    let player = query::player_id(&world);
    let monster = spawned_ids(&run(
        &mut world,
        Command::SpawnMonster {
            cell: CellCoord::new(1, 0),
        },
    ))[0];

    let events = run(
        &mut world,
        Command::NotifyCollision {
            target: player,
            collider: monster,
        },
    );

    assert_eq!(
        events,
        vec![Event::EntityCollided {
            entity: player,
            collider: monster,
        }]
    );
    assert!(query::player(&world).is_some());
    assert!(query::is_collidable(&world, CellCoord::new(0, 0)));
}

#[test]
fn monster_sharing_player_tile_blocks_nothing_extra() {
    let mut world = empty_world(4, 4);
    let player = query::player_id(&world);
    let monster = spawned_ids(&run(
        &mut world,
        Command::SpawnMonster {
            cell: CellCoord::new(1, 0),
        },
    ))[0];
    let _ = run(
        &mut world,
        Command::StepEntity {
            entity: monster,
            direction: Direction::West,
        },
    );

    let events = run(
        &mut world,
        Command::StepEntity {
            entity: player,
            direction: Direction::South,
        },
    );

    assert!(events.contains(&Event::EntityMoved {
        entity: player,
        from: CellCoord::new(0, 0),
        to: CellCoord::new(0, 1),
    }));
    assert_eq!(
        query::tile(&world, CellCoord::new(0, 0))
            .expect("in bounds")
            .occupants(),
        &[monster]
    );
}
