use quince_core::{CellCoord, Command, Direction, SoundCue, SoundEffect};
use quince_system_feedback::Feedback;
use quince_world::{self as world, query, World};

#[test]
fn bumping_a_monster_queues_the_bump_sound() {
    let mut world = World::new();
    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::ConfigureTileGrid {
            columns: 8,
            rows: 8,
        },
        &mut events,
    )
    .expect("grid");
    world::apply(
        &mut world,
        Command::SpawnMonster {
            cell: CellCoord::new(0, 1),
        },
        &mut events,
    )
    .expect("spawn");

    let mut step_events = Vec::new();
    let player = query::player_id(&world);
    world::apply(
        &mut world,
        Command::StepEntity {
            entity: player,
            direction: Direction::South,
        },
        &mut step_events,
    )
    .expect("step");

    let mut cues = Vec::new();
    Feedback.handle(&step_events, &mut cues);

    assert_eq!(cues, vec![SoundCue::Play(SoundEffect::Bump)]);
    assert_eq!(query::monster_count(&world), 0);
}

#[test]
fn free_moves_are_silent() {
    let mut world = World::new();
    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::ConfigureTileGrid {
            columns: 8,
            rows: 8,
        },
        &mut events,
    )
    .expect("grid");
    events.clear();

    let player = query::player_id(&world);
    world::apply(
        &mut world,
        Command::StepEntity {
            entity: player,
            direction: Direction::East,
        },
        &mut events,
    )
    .expect("step");

    let mut cues = Vec::new();
    Feedback.handle(&events, &mut cues);

    assert!(cues.is_empty());
}
