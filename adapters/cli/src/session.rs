use anyhow::{Context, Result};
use quince_core::{Command, EntityKind, Event, TileVisual};
use quince_rendering::{
    Color, EntityPresentation, EntitySprite, FrameInput, Scene, TileGridPresentation,
    TilePresentation, TileSprite,
};
use quince_system_bootstrap::{Bootstrap, SessionSetup};
use quince_system_controls::Controls;
use quince_system_feedback::Feedback;
use quince_world::{self as world, query, World};
use tracing::debug;

/// Glue between the world, the pure systems and the rendering backend.
#[derive(Debug)]
pub(crate) struct Session {
    world: World,
    controls: Controls,
    feedback: Feedback,
    pending_events: Vec<Event>,
}

impl Session {
    /// Builds a world shaped by `setup`.
    pub(crate) fn new(setup: &SessionSetup) -> Result<Self> {
        let mut session = Self {
            world: World::new(),
            controls: Controls::default(),
            feedback: Feedback,
            pending_events: Vec::new(),
        };

        let mut commands = Vec::new();
        Bootstrap.setup(setup, &mut commands);
        let mut events = Vec::new();
        session
            .apply_all(commands, &mut events)
            .context("failed to set up the world")?;
        session.pending_events = events;
        Ok(session)
    }

    /// Banner shown when the game starts.
    pub(crate) fn welcome_banner(&self) -> &str {
        Bootstrap.welcome_banner(&self.world)
    }

    /// Creates the first scene drawn by the backend.
    pub(crate) fn initial_scene(&self, tile_size: f32) -> Result<Scene> {
        let grid = TileGridPresentation::new(0, 0, tile_size)
            .context("invalid tile size for the scene")?;
        let mut scene = Scene::new(grid);
        self.populate_scene(&mut scene);
        Ok(scene)
    }

    /// Runs one frame: steers the player, queues feedback and rebuilds the scene.
    ///
    /// Errors are broken world invariants and end the session.
    pub(crate) fn advance(&mut self, input: FrameInput, scene: &mut Scene) -> Result<()> {
        let mut commands = Vec::new();
        self.controls
            .handle(&self.pending_events, input.direction, &mut commands);

        let mut events = Vec::new();
        self.apply_all(commands, &mut events)
            .context("world rejected a frame update")?;
        self.feedback.handle(&events, &mut scene.sound_cues);
        self.pending_events = events;

        self.populate_scene(scene);
        Ok(())
    }

    fn apply_all(&mut self, commands: Vec<Command>, events: &mut Vec<Event>) -> Result<()> {
        for command in commands {
            debug!(?command, "applying command");
            world::apply(&mut self.world, command, events)?;
        }
        Ok(())
    }

    fn populate_scene(&self, scene: &mut Scene) {
        scene.clear_visuals();
        let viewport = query::viewport(&self.world);
        scene.tile_grid.columns = viewport.width();
        scene.tile_grid.rows = viewport.height();

        for visible in query::visible_tiles(&self.world) {
            let sprite = match visible.tile.visual() {
                TileVisual::Terrain => TileSprite::Terrain,
                TileVisual::Marker(color) => TileSprite::Marker(Color::from(color)),
            };
            scene.tiles.push(TilePresentation::new(
                visible.screen_column,
                visible.screen_row,
                sprite,
            ));

            for occupant in visible.tile.occupants() {
                let Some(entity) = query::entity(&self.world, *occupant) else {
                    continue;
                };
                let sprite = match entity.kind() {
                    EntityKind::Player => EntitySprite::Player(entity.facing()),
                    EntityKind::Monster => EntitySprite::Monster,
                };
                scene.entities.push(EntityPresentation::new(
                    visible.screen_column,
                    visible.screen_row,
                    sprite,
                ));
            }
        }
    }
}
