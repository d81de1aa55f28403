mod auth;
mod db;
mod export;
mod ledger;
mod logging;
mod models;
mod run;
mod session;
mod ui;

use anyhow::{Context, Result};
use std::path::PathBuf;

fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let data_dir = get_data_dir()?;

    if args.len() > 1 {
        logging::init_stderr();
    } else {
        logging::init_file(&data_dir.join("fintrack.log"))?;
    }

    let store = db::Store::open(&data_dir.join("fintrack.db"))?;

    match args.len() {
        1 => run::as_tui(&store),
        _ => run::as_cli(&args, &store),
    }
}

fn get_data_dir() -> Result<PathBuf> {
    let data_dir = match std::env::var_os("FINTRACK_DATA_DIR") {
        Some(dir) => PathBuf::from(dir),
        None => directories::ProjectDirs::from("com", "fintrack", "fintrack")
            .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))?
            .data_dir()
            .to_path_buf(),
    };
    std::fs::create_dir_all(&data_dir)
        .with_context(|| format!("Failed to create data directory: {}", data_dir.display()))?;
    Ok(data_dir)
}
