//! Subcommand handlers

pub mod boundaries;
pub mod config;
pub mod listen;
pub mod position;
pub mod simulate;

use std::fs;
use std::path::Path;
use std::rc::Rc;

use anyhow::{bail, Context, Result};

use readalong::text::split_paragraphs;
use readalong::{Config, FileStore, KeyValueStore, MemoryStore, ResourceKey};

/// Read an article and split it into paragraphs.
pub fn read_paragraphs(file: &Path) -> Result<Vec<String>> {
    let content = fs::read_to_string(file)
        .with_context(|| format!("Failed to read article {}", file.display()))?;
    let paragraphs = split_paragraphs(&content);
    if paragraphs.is_empty() {
        bail!("{} contains no paragraphs", file.display());
    }
    Ok(paragraphs)
}

/// Check a `--duration` argument.
pub fn check_duration(duration: f64) -> Result<()> {
    if !duration.is_finite() || duration <= 0.0 {
        bail!("Duration must be a positive number of seconds, got {}", duration);
    }
    Ok(())
}

/// Explicit key if given, otherwise one derived from the file path.
pub fn resource_key(file: &Path, key: Option<String>) -> ResourceKey {
    match key {
        Some(key) => ResourceKey::new(key),
        None => ResourceKey::from_path(&file.to_string_lossy()),
    }
}

/// Open the state store: `--store`, then `storage.path`, then the default path.
pub fn open_store(
    store: Option<&Path>,
    config: &Config,
    ephemeral: bool,
) -> Result<Rc<dyn KeyValueStore>> {
    if ephemeral {
        return Ok(Rc::new(MemoryStore::new()));
    }
    let path = match store {
        Some(path) => path.to_path_buf(),
        None => config
            .storage_path()
            .context("Could not determine a location for the state file")?,
    };
    Ok(Rc::new(FileStore::open(path)?))
}

/// First `max_chars` characters of `text`, with an ellipsis if cut.
pub fn preview(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let cut: String = text.chars().take(max_chars.saturating_sub(1)).collect();
    format!("{}…", cut.trim_end())
}
