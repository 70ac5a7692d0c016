#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Macroquad-backed rendering adapter for Quince.
//!
//! Macroquad's optional audio stack depends on native ALSA development
//! libraries, which are unavailable in the containerised CI environment.
//! To keep `cargo test` usable everywhere we depend on macroquad without its
//! default `audio` feature. Enable this crate's `audio` feature to play the
//! sounds listed in the asset manifest; without it sound cues are logged.

mod audio;
mod manifest;
mod sprites;

use std::{
    collections::VecDeque,
    path::PathBuf,
    sync::mpsc,
    time::{Duration, Instant},
};

use anyhow::{Context, Result};
use glam::Vec2;
use macroquad::input::{is_key_down, is_key_pressed, KeyCode};
use quince_core::{Direction, Facing};
use quince_rendering::{
    Color, EntitySprite, FrameInput, KeyRepeat, Presentation, RenderingBackend, Scene,
    TileGridPresentation, TileSprite,
};
use tracing::{info, warn};

use self::{
    audio::Audio,
    manifest::{AssetManifest, SpriteKey, ALL_SPRITE_KEYS},
    sprites::{DrawParams, SpriteAtlas},
};

const TERRAIN_PLACEHOLDER: Color = Color::new(0.45, 0.33, 0.2, 1.0);
const PLAYER_PLACEHOLDER: Color = Color::new(0.2, 0.45, 0.85, 1.0);
const MONSTER_PLACEHOLDER: Color = Color::new(0.8, 0.15, 0.2, 1.0);
const FACING_MARK: Color = Color::new(1.0, 1.0, 1.0, 1.0);

/// Snapshot of the keyboard observed during a single frame.
#[derive(Clone, Copy, Debug, Default)]
struct KeyboardState {
    /// `Q` or `Escape` to quit the game loop.
    quit_requested: bool,
    /// Arrow keys or `WASD` currently held down.
    keys: DirectionKeys,
}

impl KeyboardState {
    fn poll() -> Self {
        let quit_requested = is_key_pressed(KeyCode::Escape) || is_key_pressed(KeyCode::Q);
        let keys = DirectionKeys {
            up: is_key_down(KeyCode::Up) || is_key_down(KeyCode::W),
            down: is_key_down(KeyCode::Down) || is_key_down(KeyCode::S),
            left: is_key_down(KeyCode::Left) || is_key_down(KeyCode::A),
            right: is_key_down(KeyCode::Right) || is_key_down(KeyCode::D),
        };

        Self {
            quit_requested,
            keys,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct DirectionKeys {
    up: bool,
    down: bool,
    left: bool,
    right: bool,
}

impl DirectionKeys {
    /// Resolves the held keys to one direction. Opposing keys cancel out and
    /// the horizontal axis wins when both axes are held.
    fn held_direction(self) -> Option<Direction> {
        match (self.left, self.right) {
            (true, false) => return Some(Direction::West),
            (false, true) => return Some(Direction::East),
            _ => {}
        }
        match (self.up, self.down) {
            (true, false) => Some(Direction::North),
            (false, true) => Some(Direction::South),
            _ => None,
        }
    }
}

/// Rendering backend implemented on top of macroquad.
#[derive(Debug)]
pub struct MacroquadBackend {
    swap_interval: Option<i32>,
    show_fps: bool,
    load_assets: bool,
    manifest_path: PathBuf,
    key_repeat: KeyRepeat,
    window_size: (u32, u32),
    frame_cap: Option<Duration>,
}

impl Default for MacroquadBackend {
    fn default() -> Self {
        Self {
            swap_interval: None,
            show_fps: false,
            load_assets: true,
            manifest_path: PathBuf::from("assets/manifest.toml"),
            key_repeat: KeyRepeat::default(),
            window_size: (1024, 1024),
            frame_cap: Some(frame_interval(60)),
        }
    }
}

impl MacroquadBackend {
    /// Returns a backend that requests the platform's default swap interval.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the backend to request a specific swap interval from the platform.
    #[must_use]
    pub fn with_swap_interval(mut self, swap_interval: Option<i32>) -> Self {
        self.swap_interval = swap_interval;
        self
    }

    /// Configures the backend to either synchronise presentation with the display refresh rate
    /// or render as fast as possible.
    #[must_use]
    pub fn with_vsync(self, enabled: bool) -> Self {
        let swap_interval = if enabled { Some(1) } else { Some(0) };
        self.with_swap_interval(swap_interval)
    }

    /// Configures whether the backend logs frame rate metrics once per second.
    #[must_use]
    pub fn with_show_fps(mut self, show: bool) -> Self {
        self.show_fps = show;
        self
    }

    /// Configures whether sprites and sounds are loaded from the asset manifest.
    ///
    /// Without assets tiles and entities are drawn as coloured placeholders.
    #[must_use]
    pub fn with_asset_loading(mut self, enabled: bool) -> Self {
        self.load_assets = enabled;
        self
    }

    /// Overrides the location of the asset manifest.
    #[must_use]
    pub fn with_manifest_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.manifest_path = path.into();
        self
    }

    /// Overrides how held direction keys repeat.
    #[must_use]
    pub fn with_key_repeat(mut self, key_repeat: KeyRepeat) -> Self {
        self.key_repeat = key_repeat;
        self
    }

    /// Sets the window size in pixels.
    #[must_use]
    pub fn with_window_size(mut self, width: u32, height: u32) -> Self {
        self.window_size = (width, height);
        self
    }

    /// Caps the frame rate. `0` removes the cap.
    #[must_use]
    pub fn with_frame_cap(mut self, frames_per_second: u32) -> Self {
        self.frame_cap = (frames_per_second > 0).then(|| frame_interval(frames_per_second));
        self
    }
}

fn frame_interval(frames_per_second: u32) -> Duration {
    Duration::from_secs(1) / frames_per_second.max(1)
}

/// Sleeps away the remainder of a frame when rendering finished early.
#[derive(Clone, Copy, Debug)]
struct FrameLimiter {
    target: Duration,
}

impl FrameLimiter {
    fn remaining(self, elapsed: Duration) -> Option<Duration> {
        let remaining = self.target.checked_sub(elapsed)?;
        (!remaining.is_zero()).then_some(remaining)
    }
}

/// Tracks the average frames-per-second produced by the render loop.
#[derive(Debug, Default)]
struct FpsCounter {
    elapsed: Duration,
    frames: u32,
    frame_times: VecDeque<Duration>,
    window_duration: Duration,
}

#[derive(Clone, Copy, Debug)]
struct FpsMetrics {
    per_second: f32,
    trailing_ten_seconds: f32,
}

impl FpsCounter {
    /// Records a rendered frame and returns the per-second and trailing ten-second averages once
    /// one second has elapsed.
    fn record_frame(&mut self, frame: Duration) -> Option<FpsMetrics> {
        self.elapsed += frame;
        self.frames = self.frames.saturating_add(1);

        self.frame_times.push_back(frame);
        self.window_duration += frame;

        let trailing_window = Duration::from_secs(10);
        while self.window_duration > trailing_window {
            if let Some(removed) = self.frame_times.pop_front() {
                self.window_duration = self.window_duration.saturating_sub(removed);
            } else {
                break;
            }
        }

        if self.elapsed < Duration::from_secs(1) {
            return None;
        }

        let seconds = self.elapsed.as_secs_f32();
        let per_second = self.frames as f32 / seconds;
        let window_seconds = self.window_duration.as_secs_f32();
        let trailing_ten_seconds = if window_seconds <= f32::EPSILON {
            per_second
        } else {
            self.frame_times.len() as f32 / window_seconds
        };
        self.elapsed = Duration::ZERO;
        self.frames = 0;
        Some(FpsMetrics {
            per_second,
            trailing_ten_seconds,
        })
    }
}

/// Loop configuration moved into the macroquad window future.
#[derive(Debug)]
struct LoopSettings {
    show_fps: bool,
    load_assets: bool,
    manifest_path: PathBuf,
    key_repeat: KeyRepeat,
    frame_cap: Option<Duration>,
    music: bool,
    clear_color: Color,
}

impl RenderingBackend for MacroquadBackend {
    fn run<F>(self, presentation: Presentation, update_scene: F) -> Result<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene) -> Result<()> + 'static,
    {
        let Self {
            swap_interval,
            show_fps,
            load_assets,
            manifest_path,
            key_repeat,
            window_size,
            frame_cap,
        } = self;

        let Presentation {
            window_title,
            clear_color,
            music,
            scene,
        } = presentation;

        let (width, height) = window_size;
        let mut config = macroquad::window::Conf {
            window_title,
            window_width: i32::try_from(width).unwrap_or(i32::MAX),
            window_height: i32::try_from(height).unwrap_or(i32::MAX),
            window_resizable: false,
            ..macroquad::window::Conf::default()
        };
        if let Some(swap_interval) = swap_interval {
            config.platform.swap_interval = Some(swap_interval);
        }

        let settings = LoopSettings {
            show_fps,
            load_assets,
            manifest_path,
            key_repeat,
            frame_cap,
            music,
            clear_color,
        };
        let (outcome_sender, outcome_receiver) = mpsc::channel::<Result<()>>();

        macroquad::Window::from_config(config, async move {
            let outcome = run_session(settings, scene, update_scene).await;
            let _ = outcome_sender.send(outcome);
        });

        // Closing the window tears the future down without a result.
        outcome_receiver.recv().unwrap_or_else(|_| Ok(()))
    }
}

async fn run_session<F>(settings: LoopSettings, scene: Scene, update_scene: F) -> Result<()>
where
    F: FnMut(Duration, FrameInput, &mut Scene) -> Result<()>,
{
    let manifest = if settings.load_assets {
        Some(AssetManifest::load(&settings.manifest_path)?)
    } else {
        info!("asset loading disabled; drawing placeholders");
        None
    };

    let sprite_atlas = manifest
        .as_ref()
        .map(SpriteAtlas::from_manifest)
        .transpose()
        .context("failed to initialise sprite atlas")?;
    if let Some(atlas) = &sprite_atlas {
        debug_assert!(ALL_SPRITE_KEYS.iter().all(|key| atlas.contains(*key)));
        info!(sprites = atlas.texture_count(), "sprite atlas loaded");
    }

    let sounds = manifest
        .as_ref()
        .map_or(&[][..], |manifest| manifest.sounds.as_slice());
    let mut audio = match Audio::load(sounds).await {
        Ok(audio) => audio,
        Err(error) => {
            warn!(error = %format!("{error:#}"), "audio unavailable; continuing without sound");
            Audio::silent()
        }
    };
    if settings.music {
        audio.start_music();
    }

    let outcome = run_frames(
        &settings,
        scene,
        update_scene,
        sprite_atlas.as_ref(),
        &mut audio,
    )
    .await;
    audio.stop_music();
    info!("render loop finished");
    outcome
}

async fn run_frames<F>(
    settings: &LoopSettings,
    mut scene: Scene,
    mut update_scene: F,
    sprite_atlas: Option<&SpriteAtlas>,
    audio: &mut Audio,
) -> Result<()>
where
    F: FnMut(Duration, FrameInput, &mut Scene) -> Result<()>,
{
    let background = to_macroquad_color(settings.clear_color);
    let limiter = settings.frame_cap.map(|target| FrameLimiter { target });
    let mut key_repeat = settings.key_repeat.clone();
    let mut fps_counter = FpsCounter::default();

    loop {
        let frame_start = Instant::now();
        let keyboard = KeyboardState::poll();
        let dt_seconds = macroquad::time::get_frame_time();
        let frame_dt = Duration::from_secs_f32(dt_seconds.max(0.0));
        let frame_input = FrameInput {
            direction: key_repeat.update(keyboard.keys.held_direction(), frame_dt),
            quit: keyboard.quit_requested,
        };

        update_scene(frame_dt, frame_input, &mut scene)?;
        for cue in scene.drain_sound_cues() {
            audio.play_cue(cue);
        }
        if frame_input.quit {
            info!("quit requested");
            return Ok(());
        }

        macroquad::window::clear_background(background);
        let metrics = SceneMetrics::from_scene(
            &scene,
            macroquad::window::screen_width(),
            macroquad::window::screen_height(),
        );
        draw_tiles(&scene, &metrics, sprite_atlas)?;
        draw_entities(&scene, &metrics, sprite_atlas)?;

        if let Some(FpsMetrics {
            per_second,
            trailing_ten_seconds,
        }) = fps_counter.record_frame(frame_dt)
        {
            if settings.show_fps {
                info!(fps = per_second, trailing_ten_seconds, "frame rate");
            }
        }

        let elapsed = frame_start.elapsed();
        if let Some(remaining) = limiter.and_then(|limiter| limiter.remaining(elapsed)) {
            std::thread::sleep(remaining);
        }
        macroquad::window::next_frame().await;
    }
}

/// Placement of the scene's tile window inside the screen.
#[derive(Clone, Copy, Debug)]
struct SceneMetrics {
    scale: f32,
    offset_x: f32,
    offset_y: f32,
    tile_step: f32,
}

impl SceneMetrics {
    fn from_scene(scene: &Scene, screen_width: f32, screen_height: f32) -> Self {
        let tile_grid = scene.tile_grid;
        let world_width = tile_grid.width();
        let world_height = tile_grid.height();
        let scale = if world_width <= f32::EPSILON || world_height <= f32::EPSILON {
            1.0
        } else {
            (screen_width / world_width).min(screen_height / world_height)
        };

        let offset_x = ((screen_width - world_width * scale) * 0.5).max(0.0);
        let offset_y = ((screen_height - world_height * scale) * 0.5).max(0.0);

        Self {
            scale,
            offset_x,
            offset_y,
            tile_step: tile_grid.tile_size * scale,
        }
    }

    fn tile_position(&self, tile_grid: &TileGridPresentation, column: u32, row: u32) -> Vec2 {
        let origin = tile_grid.tile_origin(column, row) * self.scale;
        Vec2::new(self.offset_x + origin.x, self.offset_y + origin.y)
    }
}

fn draw_tiles(
    scene: &Scene,
    metrics: &SceneMetrics,
    sprite_atlas: Option<&SpriteAtlas>,
) -> Result<()> {
    for tile in &scene.tiles {
        let position = metrics.tile_position(&scene.tile_grid, tile.column, tile.row);
        match (tile.sprite, sprite_atlas) {
            (TileSprite::Terrain, Some(atlas)) => atlas.draw(
                SpriteKey::Terrain,
                0,
                0,
                DrawParams::square(position, metrics.tile_step),
            )?,
            (TileSprite::Terrain, None) => {
                draw_square(position, metrics.tile_step, TERRAIN_PLACEHOLDER);
            }
            (TileSprite::Marker(color), _) => draw_square(position, metrics.tile_step, color),
        }
    }
    Ok(())
}

fn draw_entities(
    scene: &Scene,
    metrics: &SceneMetrics,
    sprite_atlas: Option<&SpriteAtlas>,
) -> Result<()> {
    for entity in &scene.entities {
        let position = metrics.tile_position(&scene.tile_grid, entity.column, entity.row);
        let params = DrawParams::square(position, metrics.tile_step);
        match (entity.sprite, sprite_atlas) {
            (EntitySprite::Player(facing), Some(atlas)) => {
                atlas.draw(SpriteKey::Player, facing.sprite_column(), 0, params)?;
            }
            (EntitySprite::Monster, Some(atlas)) => atlas.draw(SpriteKey::Monster, 0, 0, params)?,
            (EntitySprite::Player(facing), None) => {
                let inset = metrics.tile_step * 0.15;
                let body = metrics.tile_step - inset * 2.0;
                draw_square(position + Vec2::splat(inset), body, PLAYER_PLACEHOLDER);
                let mark = facing_mark_offset(facing) * metrics.tile_step;
                let centre = position + Vec2::splat(metrics.tile_step * 0.5) + mark;
                macroquad::shapes::draw_circle(
                    centre.x,
                    centre.y,
                    metrics.tile_step * 0.08,
                    to_macroquad_color(FACING_MARK),
                );
            }
            (EntitySprite::Monster, None) => {
                let centre = position + Vec2::splat(metrics.tile_step * 0.5);
                macroquad::shapes::draw_circle(
                    centre.x,
                    centre.y,
                    metrics.tile_step * 0.35,
                    to_macroquad_color(MONSTER_PLACEHOLDER),
                );
            }
        }
    }
    Ok(())
}

/// Offset of the placeholder facing mark from the tile centre, in tiles.
fn facing_mark_offset(facing: Facing) -> Vec2 {
    match facing {
        Facing::Left => Vec2::new(-0.25, 0.0),
        Facing::Right => Vec2::new(0.25, 0.0),
        Facing::Front => Vec2::new(0.0, 0.25),
        Facing::Back => Vec2::new(0.0, -0.25),
    }
}

fn draw_square(position: Vec2, side: f32, color: Color) {
    macroquad::shapes::draw_rectangle(
        position.x,
        position.y,
        side,
        side,
        to_macroquad_color(color),
    );
}

fn to_macroquad_color(color: Color) -> macroquad::color::Color {
    macroquad::color::Color::new(color.red, color.green, color.blue, color.alpha)
}
