mod app;
mod audio;
mod data;
mod playback;
mod render;
mod ui;
mod utils;

use anyhow::Result;
use std::path::PathBuf;

fn main() -> Result<()> {
    env_logger::init();

    let config = data::config::Config::load_or_default()?;
    let theme = data::theme_loader::ThemeLoader::load(&config.theme)?;
    log::info!("theme {:?}", theme.name);

    // optional file to start with
    let initial = std::env::args_os().nth(1).map(PathBuf::from);

    let mut app = app::state::AppState::new(config, theme);
    app::event_loop::run(&mut app, initial)
}
