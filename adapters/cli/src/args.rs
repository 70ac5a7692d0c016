use std::{path::PathBuf, time::Duration};

use clap::Parser;
use quince_core::{EdgeClamp, ViewportSize};
use quince_rendering::KeyRepeat;
use quince_rendering_macroquad::MacroquadBackend;
use quince_system_bootstrap::SessionSetup;
use quince_world::{DEFAULT_GRID_COLUMNS, DEFAULT_GRID_ROWS, DEFAULT_MONSTER_COUNT};

/// Walk a tile world and bump into monsters.
#[derive(Debug, Parser)]
#[command(name = "quince")]
#[command(about = "Walk a tile world and bump into monsters", long_about = None)]
#[command(version)]
pub(crate) struct Args {
    /// Number of columns in the tile grid
    #[arg(long, default_value_t = DEFAULT_GRID_COLUMNS, value_parser = clap::value_parser!(u32).range(1..))]
    columns: u32,

    /// Number of rows in the tile grid
    #[arg(long, default_value_t = DEFAULT_GRID_ROWS, value_parser = clap::value_parser!(u32).range(1..))]
    rows: u32,

    /// Monsters scattered across the grid at start-up
    #[arg(long, default_value_t = DEFAULT_MONSTER_COUNT)]
    monsters: u32,

    /// Window width in pixels
    #[arg(long, default_value_t = 1024, value_parser = clap::value_parser!(u32).range(1..))]
    width: u32,

    /// Window height in pixels
    #[arg(long, default_value_t = 1024, value_parser = clap::value_parser!(u32).range(1..))]
    height: u32,

    /// Edge length of one tile in pixels
    #[arg(long, default_value_t = 128, value_parser = clap::value_parser!(u32).range(1..))]
    tile_size: u32,

    /// How the viewport behaves near the far edges of the grid
    #[arg(long, value_enum, default_value = "grid-edge")]
    edge_clamp: EdgePolicy,

    /// Asset manifest describing sprite sheets and sounds
    #[arg(long, value_name = "PATH", default_value = "assets/manifest.toml")]
    manifest: PathBuf,

    /// Draw coloured placeholders instead of loading assets
    #[arg(long)]
    no_assets: bool,

    /// Loop the background music listed in the manifest
    #[arg(long)]
    music: bool,

    /// Disable vertical sync
    #[arg(long)]
    no_vsync: bool,

    /// Log the frame rate once per second
    #[arg(long)]
    show_fps: bool,

    /// Frame rate cap; 0 removes the cap
    #[arg(long, default_value_t = 60)]
    fps: u32,

    /// Milliseconds a key is held before it starts repeating
    #[arg(long, value_name = "MS", default_value_t = 250)]
    repeat_delay: u64,

    /// Milliseconds between repeated steps; 0 disables repeating
    #[arg(long, value_name = "MS", default_value_t = 120)]
    repeat_interval: u64,

    /// Log filter directives, overriding RUST_LOG (e.g. `debug` or `quince_world=trace`)
    #[arg(long, value_name = "FILTER")]
    log: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
enum EdgePolicy {
    /// Stop scrolling so the viewport never shows cells past the grid
    GridEdge,
    /// Keep the previous origin when the centred viewport would overflow
    RetainPrevious,
}

impl From<EdgePolicy> for EdgeClamp {
    fn from(policy: EdgePolicy) -> Self {
        match policy {
            EdgePolicy::GridEdge => Self::GridEdge,
            EdgePolicy::RetainPrevious => Self::RetainPrevious,
        }
    }
}

impl Args {
    /// World shape requested on the command line.
    pub(crate) fn session_setup(&self) -> SessionSetup {
        SessionSetup {
            columns: self.columns,
            rows: self.rows,
            viewport: ViewportSize::from_display(self.width, self.height, self.tile_size),
            clamp: self.edge_clamp.into(),
            monsters: self.monsters,
        }
    }

    /// Tile edge length used when drawing.
    pub(crate) fn tile_size(&self) -> f32 {
        self.tile_size as f32
    }

    /// Whether the background music should play.
    pub(crate) fn music(&self) -> bool {
        self.music
    }

    /// Log filter requested with `--log`.
    pub(crate) fn log_filter(&self) -> Option<&str> {
        self.log.as_deref()
    }

    /// Macroquad backend configured from the flags.
    pub(crate) fn backend(&self) -> MacroquadBackend {
        MacroquadBackend::new()
            .with_vsync(!self.no_vsync)
            .with_show_fps(self.show_fps)
            .with_asset_loading(!self.no_assets)
            .with_manifest_path(self.manifest.clone())
            .with_window_size(self.width, self.height)
            .with_frame_cap(self.fps)
            .with_key_repeat(KeyRepeat::new(
                Duration::from_millis(self.repeat_delay),
                Duration::from_millis(self.repeat_interval),
            ))
    }
}
