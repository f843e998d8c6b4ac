//! Position command: inspect or forget a saved listening position

use std::path::Path;

use anyhow::Result;

use readalong::render::format_duration;
use readalong::sync::SaveThrottle;
use readalong::{Config, PositionStore, ResourceKey};

use super::open_store;

/// Print (or clear with `clear`) the saved position for `key`.
pub fn handle(key: &str, clear: bool, store: Option<&Path>) -> Result<()> {
    let config = Config::load()?;
    let store = open_store(store, &config, false)?;
    let mut positions = PositionStore::new(store, SaveThrottle::default());
    let key = ResourceKey::new(key);

    if clear {
        positions.clear(&key);
        println!("Cleared saved position for {}", key);
        return Ok(());
    }

    match positions.restore(&key) {
        Some(offset) => println!("{}: {} ({:.2}s)", key, format_duration(offset), offset),
        None => println!("No saved position for {}", key),
    }
    Ok(())
}
