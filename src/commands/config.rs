//! Config subcommands handler

use anyhow::{bail, Result};

use readalong::Config;

/// Show current configuration as TOML.
pub fn handle_show() -> Result<()> {
    let config = Config::load()?;
    let toml_str = toml::to_string_pretty(&config)?;
    print!("{}", toml_str);
    Ok(())
}

/// Print where the config file is read from.
pub fn handle_path() -> Result<()> {
    let path = Config::config_path()?;
    let status = if path.exists() { "" } else { " (not created)" };
    println!("{}{}", path.display(), status);
    Ok(())
}

/// Write the default configuration unless a config file already exists.
pub fn handle_init() -> Result<()> {
    let path = Config::config_path()?;
    if path.exists() {
        bail!("Config file {} already exists", path.display());
    }
    Config::default().save_to(&path)?;
    println!("Wrote default config to {}", path.display());
    Ok(())
}
