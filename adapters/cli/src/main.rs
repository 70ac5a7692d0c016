#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that boots a Quince session in a macroquad window.

mod args;
mod session;

use anyhow::{Context, Result};
use clap::Parser;
use quince_rendering::{Color, Presentation, RenderingBackend};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::{args::Args, session::Session};

const WINDOW_TITLE: &str = "Quince";
const CLEAR_COLOR: Color = Color::new(0.0, 0.0, 0.0, 1.0);

/// Entry point for the Quince command-line interface.
fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.log_filter())?;

    let mut session = Session::new(&args.session_setup())?;
    println!("{}", session.welcome_banner());

    let scene = session.initial_scene(args.tile_size())?;
    let presentation =
        Presentation::new(WINDOW_TITLE, CLEAR_COLOR, scene).with_music(args.music());

    args.backend()
        .run(presentation, move |_dt, input, scene| session.advance(input, scene))?;

    info!("session ended");
    Ok(())
}

fn init_tracing(directives: Option<&str>) -> Result<()> {
    let filter = match directives {
        Some(directives) => EnvFilter::try_new(directives)
            .with_context(|| format!("invalid log filter `{directives}`"))?,
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}
