use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

use anyhow::{bail, Context, Result};
use glam::Vec2;
use macroquad::{
    color::WHITE,
    math::{Rect, Vec2 as MacroquadVec2},
    texture::{self, DrawTextureParams, FilterMode, Texture2D},
};
use quince_rendering::{SpriteRegion, SpriteSheet};

use crate::manifest::{AssetManifest, SpriteKey};

/// Screen placement of a sprite cell.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct DrawParams {
    /// Position in screen-space pixels where the sprite's top-left corner is placed.
    pub(crate) position: Vec2,
    /// Desired size in screen-space pixels.
    pub(crate) size: Vec2,
}

impl DrawParams {
    /// Creates draw parameters for a square destination.
    #[must_use]
    pub(crate) fn square(position: Vec2, side: f32) -> Self {
        Self {
            position,
            size: Vec2::splat(side),
        }
    }
}

/// Cache of sprite sheet textures loaded from the asset manifest.
#[derive(Debug)]
pub(crate) struct SpriteAtlas {
    textures: HashMap<SpriteKey, Texture2D>,
    cell_size: u32,
}

impl SpriteAtlas {
    /// Loads every sprite sheet listed in the manifest.
    pub(crate) fn from_manifest(manifest: &AssetManifest) -> Result<Self> {
        Self::from_entries(manifest.sprites.clone(), manifest.cell_size, &mut default_loader)
    }

    /// Draws the cell at `(column, row)` of the requested sheet.
    ///
    /// Sheets smaller than one cell are drawn whole; cells past the sheet's
    /// extent fall back to the first cell.
    pub(crate) fn draw(
        &self,
        key: SpriteKey,
        column: u32,
        row: u32,
        params: DrawParams,
    ) -> Result<()> {
        let texture = *self
            .textures
            .get(&key)
            .with_context(|| format!("sprite {key:?} missing from atlas"))?;

        let source = source_region(
            texture.width(),
            texture.height(),
            self.cell_size,
            column,
            row,
        )
        .map(|region| {
            Rect::new(
                region.x as f32,
                region.y as f32,
                region.width as f32,
                region.height as f32,
            )
        });

        let draw_params = DrawTextureParams {
            dest_size: Some(MacroquadVec2::new(params.size.x, params.size.y)),
            source,
            ..DrawTextureParams::default()
        };
        texture::draw_texture_ex(
            texture,
            params.position.x,
            params.position.y,
            WHITE,
            draw_params,
        );

        Ok(())
    }

    /// Returns whether the atlas contains the provided key.
    #[must_use]
    pub(crate) fn contains(&self, key: SpriteKey) -> bool {
        self.textures.contains_key(&key)
    }

    /// Returns the number of textures stored in the atlas.
    #[must_use]
    pub(crate) fn texture_count(&self) -> usize {
        self.textures.len()
    }

    fn from_entries(
        entries: Vec<(SpriteKey, PathBuf)>,
        cell_size: u32,
        loader: &mut impl FnMut(SpriteKey, &Path) -> Result<Texture2D>,
    ) -> Result<Self> {
        let mut textures = HashMap::with_capacity(entries.len());
        for (key, path) in entries {
            let texture = loader(key, &path).with_context(|| {
                format!("failed to load sprite {key:?} from {}", path.display())
            })?;
            if textures.insert(key, texture).is_some() {
                bail!("duplicate sprite entry for {key:?}");
            }
        }
        Ok(Self {
            textures,
            cell_size,
        })
    }
}

fn default_loader(_key: SpriteKey, path: &Path) -> Result<Texture2D> {
    let bytes = fs::read(path)
        .with_context(|| format!("failed to read sprite asset at {}", path.display()))?;
    let texture = Texture2D::from_file_with_format(&bytes, None);
    texture.set_filter(FilterMode::Nearest);
    Ok(texture)
}

fn source_region(
    texture_width: f32,
    texture_height: f32,
    cell_size: u32,
    column: u32,
    row: u32,
) -> Option<SpriteRegion> {
    if !texture_width.is_finite() || !texture_height.is_finite() {
        return None;
    }
    let sheet = SpriteSheet::new(
        texture_width.max(0.0) as u32,
        texture_height.max(0.0) as u32,
        cell_size,
        cell_size,
    )
    .ok()?;
    Some(sheet.region_or_first(column, row))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::ALL_SPRITE_KEYS;
    use std::cell::RefCell;

    #[test]
    fn atlas_loads_textures_using_deterministic_order() {
        let entries = ALL_SPRITE_KEYS
            .iter()
            .map(|key| (*key, PathBuf::from(format!("{key:?}.png"))))
            .collect();
        let load_order = RefCell::new(Vec::new());
        let atlas = SpriteAtlas::from_entries(entries, 128, &mut |key, _| {
            load_order.borrow_mut().push(key);
            Ok(Texture2D::empty())
        })
        .expect("atlas should load using provided loader");

        assert_eq!(load_order.borrow().as_slice(), &ALL_SPRITE_KEYS);
        assert_eq!(atlas.texture_count(), ALL_SPRITE_KEYS.len());
        for key in ALL_SPRITE_KEYS {
            assert!(atlas.contains(key));
        }
    }

    #[test]
    fn atlas_rejects_duplicate_entries() {
        let entries = vec![
            (SpriteKey::Player, PathBuf::from("a.png")),
            (SpriteKey::Player, PathBuf::from("b.png")),
        ];

        let result = SpriteAtlas::from_entries(entries, 128, &mut |_, _| Ok(Texture2D::empty()));

        assert!(result.is_err());
    }

    #[test]
    fn loader_failures_name_the_sprite() {
        let entries = vec![(SpriteKey::Monster, PathBuf::from("missing.png"))];

        let error = SpriteAtlas::from_entries(entries, 128, &mut |_, _| bail!("no such file"))
            .expect_err("loader failure propagates");

        assert!(format!("{error:#}").contains("Monster"));
    }

    #[test]
    fn facing_columns_select_player_sheet_cells() {
        let region = source_region(512.0, 128.0, 128, 3, 0).expect("sheet holds four cells");

        assert_eq!(
            region,
            SpriteRegion {
                x: 384,
                y: 0,
                width: 128,
                height: 128,
            }
        );
    }

    #[test]
    fn undersized_textures_are_drawn_whole() {
        assert_eq!(source_region(0.0, 0.0, 128, 0, 0), None);
        assert_eq!(source_region(64.0, 64.0, 128, 0, 0), None);
    }

    #[test]
    fn out_of_range_cells_use_first_cell() {
        let region = source_region(128.0, 128.0, 128, 2, 0).expect("single cell sheet");

        assert_eq!((region.x, region.y), (0, 0));
    }
}
