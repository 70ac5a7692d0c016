#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for Quince adapters.

mod input;
mod sprites;

use anyhow::Result as AnyResult;
use glam::Vec2;
use quince_core::{Facing, SoundCue, TileColor};
use std::time::Duration;

pub use self::{
    input::{FrameInput, KeyRepeat},
    sprites::{SpriteRegion, SpriteSheet},
};

/// RGBA color used when presenting frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel intensity in the range 0.0..=1.0.
    pub red: f32,
    /// Green channel intensity in the range 0.0..=1.0.
    pub green: f32,
    /// Blue channel intensity in the range 0.0..=1.0.
    pub blue: f32,
    /// Alpha channel intensity in the range 0.0..=1.0.
    pub alpha: f32,
}

impl Color {
    /// Creates a new color from floating point channels.
    #[must_use]
    pub const fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Creates an opaque color from byte RGB values.
    #[must_use]
    pub fn from_rgb_u8(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red: red as f32 / 255.0,
            green: green as f32 / 255.0,
            blue: blue as f32 / 255.0,
            alpha: 1.0,
        }
    }
}

impl From<TileColor> for Color {
    fn from(color: TileColor) -> Self {
        Self::from_rgb_u8(color.red(), color.green(), color.blue())
    }
}

/// Geometry of the visible tile window on screen.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TileGridPresentation {
    /// Number of tile columns drawn on screen.
    pub columns: u32,
    /// Number of tile rows drawn on screen.
    pub rows: u32,
    /// Side length of a single tile in pixels.
    pub tile_size: f32,
}

impl TileGridPresentation {
    /// Creates a new grid descriptor.
    ///
    /// Returns an error when `tile_size` is not a positive finite length.
    pub fn new(columns: u32, rows: u32, tile_size: f32) -> Result<Self, RenderingError> {
        if !tile_size.is_finite() || tile_size <= 0.0 {
            return Err(RenderingError::InvalidTileSize { tile_size });
        }

        Ok(Self {
            columns,
            rows,
            tile_size,
        })
    }

    /// Width of the drawn window in pixels.
    #[must_use]
    pub fn width(&self) -> f32 {
        self.columns as f32 * self.tile_size
    }

    /// Height of the drawn window in pixels.
    #[must_use]
    pub fn height(&self) -> f32 {
        self.rows as f32 * self.tile_size
    }

    /// Top-left pixel of the tile at the provided screen position.
    #[must_use]
    pub fn tile_origin(&self, column: u32, row: u32) -> Vec2 {
        Vec2::new(column as f32, row as f32) * self.tile_size
    }
}

/// Artwork selected for a tile.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TileSprite {
    /// First cell of the terrain sheet.
    Terrain,
    /// Flat coloured square.
    Marker(Color),
}

/// Tile drawn at a screen position.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TilePresentation {
    /// Screen column counted in tiles.
    pub column: u32,
    /// Screen row counted in tiles.
    pub row: u32,
    /// Artwork to draw.
    pub sprite: TileSprite,
}

impl TilePresentation {
    /// Creates a new tile presentation.
    #[must_use]
    pub const fn new(column: u32, row: u32, sprite: TileSprite) -> Self {
        Self {
            column,
            row,
            sprite,
        }
    }
}

/// Artwork selected for an entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntitySprite {
    /// Player sheet column chosen by the facing.
    Player(Facing),
    /// Monster sprite.
    Monster,
}

/// Entity drawn at a screen position, on top of the tiles.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EntityPresentation {
    /// Screen column counted in tiles.
    pub column: u32,
    /// Screen row counted in tiles.
    pub row: u32,
    /// Artwork to draw.
    pub sprite: EntitySprite,
}

impl EntityPresentation {
    /// Creates a new entity presentation.
    #[must_use]
    pub const fn new(column: u32, row: u32, sprite: EntitySprite) -> Self {
        Self {
            column,
            row,
            sprite,
        }
    }
}

/// Everything a backend draws or plays for one frame.
#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    /// Geometry of the visible tile window.
    pub tile_grid: TileGridPresentation,
    /// Visible tiles in row-major order.
    pub tiles: Vec<TilePresentation>,
    /// Visible entities, drawn after the tiles.
    pub entities: Vec<EntityPresentation>,
    /// Cues queued for the audio collaborator; drained by the backend.
    pub sound_cues: Vec<SoundCue>,
}

impl Scene {
    /// Creates an empty scene over the provided grid.
    #[must_use]
    pub fn new(tile_grid: TileGridPresentation) -> Self {
        Self {
            tile_grid,
            tiles: Vec::new(),
            entities: Vec::new(),
            sound_cues: Vec::new(),
        }
    }

    /// Removes the tiles and entities while keeping queued sound cues.
    pub fn clear_visuals(&mut self) {
        self.tiles.clear();
        self.entities.clear();
    }

    /// Takes every queued sound cue, leaving the queue empty.
    pub fn drain_sound_cues(&mut self) -> std::vec::Drain<'_, SoundCue> {
        self.sound_cues.drain(..)
    }
}

/// Presentation descriptor consumed by rendering backends.
#[derive(Clone, Debug, PartialEq)]
pub struct Presentation {
    /// Title used by the created window.
    pub window_title: String,
    /// Solid color used to clear each frame.
    pub clear_color: Color,
    /// Whether background music loops while the window is open.
    pub music: bool,
    /// Scene content that should be displayed.
    pub scene: Scene,
}

impl Presentation {
    /// Constructs a new presentation descriptor without background music.
    #[must_use]
    pub fn new<T>(window_title: T, clear_color: Color, scene: Scene) -> Self
    where
        T: Into<String>,
    {
        Self {
            window_title: window_title.into(),
            clear_color,
            music: false,
            scene,
        }
    }

    /// Requests background music for the lifetime of the window.
    #[must_use]
    pub fn with_music(mut self, music: bool) -> Self {
        self.music = music;
        self
    }
}

/// Rendering backend capable of presenting Quince scenes.
pub trait RenderingBackend {
    /// Runs the rendering backend until the player quits or `update_scene`
    /// fails.
    ///
    /// The provided `update_scene` closure receives the frame delta and the
    /// per-frame input captured by the adapter, and rebuilds the scene before
    /// it is rendered. The backend stops after the frame whose input requests
    /// quitting.
    fn run<F>(self, presentation: Presentation, update_scene: F) -> AnyResult<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene) -> AnyResult<()> + 'static;
}

/// Errors that can occur when constructing rendering descriptors.
#[derive(Clone, Copy, Debug, PartialEq, thiserror::Error)]
pub enum RenderingError {
    /// Tiles must have a positive pixel size.
    #[error("tile size must be a positive length (received {tile_size})")]
    InvalidTileSize {
        /// Provided size that failed validation.
        tile_size: f32,
    },
    /// Sprite cells must have a positive pixel size.
    #[error("sprite cell must be at least one pixel (received {width}x{height})")]
    EmptySpriteCell {
        /// Requested cell width.
        width: u32,
        /// Requested cell height.
        height: u32,
    },
    /// The image is smaller than a single sprite cell.
    #[error("image {image_width}x{image_height} cannot hold a {cell_width}x{cell_height} sprite")]
    SheetTooSmall {
        /// Width of the sliced image.
        image_width: u32,
        /// Height of the sliced image.
        image_height: u32,
        /// Requested cell width.
        cell_width: u32,
        /// Requested cell height.
        cell_height: u32,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use quince_core::SoundEffect;

    #[test]
    fn tile_grid_creation_accepts_positive_tile_size() {
        let presentation = TileGridPresentation::new(8, 8, 128.0).expect("valid size");

        assert_eq!(presentation.width(), 1024.0);
        assert_eq!(presentation.height(), 1024.0);
        assert_eq!(presentation.tile_origin(3, 1), Vec2::new(384.0, 128.0));
    }

    #[test]
    fn tile_grid_creation_rejects_degenerate_sizes() {
        for tile_size in [0.0, -4.0, f32::NAN] {
            let error = TileGridPresentation::new(8, 8, tile_size)
                .expect_err("degenerate size must be rejected");

            assert!(matches!(error, RenderingError::InvalidTileSize { .. }));
        }
    }

    #[test]
    fn tile_colors_convert_to_opaque_colors() {
        let color = Color::from(TileColor::from_rgb(255, 0, 51));

        assert_eq!(color, Color::new(1.0, 0.0, 0.2, 1.0));
    }

    #[test]
    fn clearing_visuals_keeps_sound_cues() {
        let grid = TileGridPresentation::new(2, 2, 16.0).expect("valid size");
        let mut scene = Scene::new(grid);
        scene
            .tiles
            .push(TilePresentation::new(0, 0, TileSprite::Terrain));
        scene.entities.push(EntityPresentation::new(
            0,
            0,
            EntitySprite::Player(Facing::Front),
        ));
        scene.sound_cues.push(SoundCue::Play(SoundEffect::Bump));

        scene.clear_visuals();

        assert!(scene.tiles.is_empty());
        assert!(scene.entities.is_empty());
        let drained: Vec<_> = scene.drain_sound_cues().collect();
        assert_eq!(drained, vec![SoundCue::Play(SoundEffect::Bump)]);
        assert!(scene.sound_cues.is_empty());
    }

    #[test]
    fn presentation_defaults_to_silence() {
        let grid = TileGridPresentation::new(1, 1, 1.0).expect("valid size");
        let presentation = Presentation::new("Quince", Color::new(0.0, 0.0, 0.0, 1.0), Scene::new(grid));

        assert!(!presentation.music);
        assert!(presentation.with_music(true).music);
    }
}
