//! strike-check: bootstrap level files against the kinematic engine and report
//! the derived scale, the score threshold and any static body the
//! reachability pass removes.
//!
//! Usage: strike-check [--config game.toml] <level.json | level-dir>...

use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};
use strike_engine::{
    GameConfig, GameEvent, GameSession, KinematicWorld, LevelDirectory, LevelSpec,
};

fn main() -> Result<()> {
    strike_engine::init_logging();

    let mut config_path: Option<PathBuf> = None;
    let mut inputs: Vec<PathBuf> = Vec::new();
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => {
                let path = args.next().context("--config needs a path")?;
                config_path = Some(PathBuf::from(path));
            }
            "-h" | "--help" => {
                println!("usage: strike-check [--config game.toml] <level.json | level-dir>...");
                return Ok(());
            }
            _ => inputs.push(PathBuf::from(arg)),
        }
    }
    if inputs.is_empty() {
        bail!("no level files given (try --help)");
    }

    let config = match &config_path {
        Some(path) => GameConfig::load(path)?,
        None => GameConfig::default(),
    };

    let mut failures = 0;
    for input in &inputs {
        for (label, level) in collect_levels(input)? {
            if let Err(e) = check_level(&config, &label, level) {
                println!("{}: FAILED: {:#}", label, e);
                failures += 1;
            }
        }
    }

    if failures > 0 {
        bail!("{} level(s) failed", failures);
    }
    Ok(())
}

/// A single file, or every numbered level in a directory
fn collect_levels(input: &Path) -> Result<Vec<(String, LevelSpec)>> {
    if !input.is_dir() {
        let level = LevelSpec::load(input)?;
        return Ok(vec![(input.display().to_string(), level)]);
    }

    let directory = LevelDirectory::new(input);
    let mut levels = Vec::new();
    let mut number = 1;
    while let Some(level) = directory.load(number)? {
        levels.push((directory.path_for(number).display().to_string(), level));
        number += 1;
    }
    if levels.is_empty() {
        log::warn!("No level1.json in {}", input.display());
    }
    Ok(levels)
}

fn check_level(config: &GameConfig, label: &str, level: LevelSpec) -> Result<()> {
    let name = level.level_name.clone();
    let session = GameSession::new(Box::new(KinematicWorld::new()), config.clone())?;
    session.load_level(level)?;
    session.flush()?;

    match session.events().try_recv() {
        Ok(GameEvent::LevelLoaded { removed_blocker, .. }) => {
            let layout = session.layout().context("layout missing after load")?;
            let state = session.level_state();
            println!(
                "{}: '{}' {:.2} px/unit, {} statics, {} targets, threshold {}, removed blocker: {}",
                label,
                name,
                layout.transform.pixels_per_unit,
                session.statics().len(),
                layout.targets.len(),
                state.target_threshold,
                removed_blocker.map_or_else(|| "none".to_string(), |h| h.to_string()),
            );
        }
        Ok(GameEvent::LevelLoadFailed { reason, .. }) => bail!("{}", reason),
        Ok(other) => bail!("unexpected event {:?}", other),
        Err(_) => bail!("no load result for '{}'", name),
    }

    session.shutdown()?;
    Ok(())
}
