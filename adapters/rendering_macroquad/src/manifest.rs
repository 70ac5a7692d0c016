use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

use anyhow::{bail, Context, Result};
use quince_core::SoundEffect;

const SUPPORTED_MANIFEST_VERSION: u32 = 1;
const DEFAULT_CELL_SIZE: u32 = 128;

/// Images every manifest must provide.
pub(crate) const ALL_SPRITE_KEYS: [SpriteKey; 3] =
    [SpriteKey::Player, SpriteKey::Terrain, SpriteKey::Monster];

/// Identifies a sprite sheet listed in the manifest.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) enum SpriteKey {
    /// Player sheet with one column per facing.
    Player,
    /// Ground sheet; only the first cell is drawn.
    Terrain,
    /// Monster sprite.
    Monster,
}

/// Identifies an optional sound listed in the manifest.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) enum SoundKey {
    /// Effect played when the player bumps into an occupied tile.
    Bump,
    /// Background loop.
    Music,
}

impl From<SoundEffect> for SoundKey {
    fn from(effect: SoundEffect) -> Self {
        match effect {
            SoundEffect::Bump => Self::Bump,
        }
    }
}

/// Asset locations resolved against the manifest's directory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct AssetManifest {
    /// Pixel size of one square cell in every sprite sheet.
    pub(crate) cell_size: u32,
    /// Sprite sheets in [`ALL_SPRITE_KEYS`] order.
    pub(crate) sprites: Vec<(SpriteKey, PathBuf)>,
    /// Sounds in key order; any subset may be present.
    pub(crate) sounds: Vec<(SoundKey, PathBuf)>,
}

impl AssetManifest {
    /// Reads and validates the manifest stored at `path`.
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read asset manifest at {}", path.display()))?;
        let base = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        parse_manifest(&contents, &base)
    }
}

#[derive(Debug, serde::Deserialize)]
#[serde(deny_unknown_fields)]
struct RawManifest {
    version: u32,
    #[serde(default = "default_cell_size")]
    cell_size: u32,
    sprites: HashMap<String, String>,
    #[serde(default)]
    sounds: HashMap<String, String>,
}

fn default_cell_size() -> u32 {
    DEFAULT_CELL_SIZE
}

fn parse_manifest(contents: &str, base_path: &Path) -> Result<AssetManifest> {
    let manifest: RawManifest =
        toml::from_str(contents).context("failed to parse asset manifest toml contents")?;
    if manifest.version != SUPPORTED_MANIFEST_VERSION {
        bail!(
            "unsupported asset manifest version {}; expected {}",
            manifest.version,
            SUPPORTED_MANIFEST_VERSION
        );
    }
    if manifest.cell_size == 0 {
        bail!("asset manifest cell_size must be positive");
    }

    let mut resolved = HashMap::new();
    for (name, relative_path) in manifest.sprites {
        let key = parse_sprite_key(&name)?;
        let _ = resolved.insert(key, base_path.join(relative_path));
    }

    let mut sprites = Vec::with_capacity(ALL_SPRITE_KEYS.len());
    for key in ALL_SPRITE_KEYS {
        let Some(path) = resolved.remove(&key) else {
            bail!("asset manifest missing sprite entry for {key:?}");
        };
        sprites.push((key, path));
    }

    let mut sounds = Vec::with_capacity(manifest.sounds.len());
    for (name, relative_path) in manifest.sounds {
        let key = parse_sound_key(&name)?;
        sounds.push((key, base_path.join(relative_path)));
    }
    sounds.sort_by_key(|(key, _)| *key);

    Ok(AssetManifest {
        cell_size: manifest.cell_size,
        sprites,
        sounds,
    })
}

fn parse_sprite_key(name: &str) -> Result<SpriteKey> {
    match name {
        "Player" => Ok(SpriteKey::Player),
        "Terrain" => Ok(SpriteKey::Terrain),
        "Monster" => Ok(SpriteKey::Monster),
        _ => bail!("unknown sprite key `{name}` in asset manifest"),
    }
}

fn parse_sound_key(name: &str) -> Result<SoundKey> {
    match name {
        "Bump" => Ok(SoundKey::Bump),
        "Music" => Ok(SoundKey::Music),
        _ => bail!("unknown sound key `{name}` in asset manifest"),
    }
}
