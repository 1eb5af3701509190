//! Process wiring: logging, configuration, store and engine construction.

use std::path::Path;

use kitchenduty_core::{
    default_log_level, load_config, DutyEngine, HttpKvStore, KvStore, SqliteKvStore, TieredStore,
};
use log::info;

/// Store behind the CLI engine: local SQLite, optionally fronting a remote.
pub(crate) type Store = Box<dyn KvStore + Send>;

pub(crate) type Engine = DutyEngine<Store>;

/// Starts file logging when a directory is configured.
///
/// Failures are reported on stderr; the command still runs.
pub(crate) fn init_logging(log_dir: Option<&Path>, level: Option<&str>) {
    let Some(log_dir) = log_dir else {
        return;
    };
    let level: &str = level.unwrap_or_else(|| default_log_level());
    if let Err(err) = kitchenduty_core::init_logging(level, log_dir) {
        eprintln!("warning: logging disabled: {err}");
    }
}

/// Loads configuration, opens the store and loads the engine.
///
/// With a remote configured, state is refreshed from it before returning.
pub(crate) fn open_engine(
    config_path: Option<&Path>,
    db_path: &Path,
    remote_url: Option<&str>,
) -> Result<Engine, String> {
    let config = load_config(config_path).map_err(|err| err.to_string())?;
    let store = open_store(db_path, remote_url)?;
    let mut engine = DutyEngine::load(config, store).map_err(|err| err.to_string())?;

    if remote_url.is_some() {
        let changed = engine.refresh();
        info!(
            "event=cli_refresh module=cli status=ok changed={}",
            changed.len()
        );
    }
    Ok(engine)
}

fn open_store(db_path: &Path, remote_url: Option<&str>) -> Result<Store, String> {
    let local = SqliteKvStore::open(db_path)
        .map_err(|err| format!("failed to open `{}`: {err}", db_path.display()))?;

    let store: Store = match remote_url.map(str::trim).filter(|url| !url.is_empty()) {
        Some(url) => Box::new(TieredStore::new(local, HttpKvStore::new(url))),
        None => Box::new(local),
    };
    Ok(store)
}
