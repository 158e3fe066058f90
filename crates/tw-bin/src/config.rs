//! Configuration loading (`tilewin.toml`).

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use tracing::info;

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Minimum pane width advertised via `WM_GETMINSIZE`.
    pub pane_min_width: i32,
    /// Minimum pane height advertised via `WM_GETMINSIZE`.
    pub pane_min_height: i32,
    /// Draw splitter lines on side-by-side splits.
    pub splitters: bool,
    /// Terminal window title.
    pub title: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            pane_min_width: 20,
            pane_min_height: 2,
            splitters: true,
            title: "tilewin".to_string(),
        }
    }
}

const CONFIG_FILE: &str = "tilewin.toml";

/// Load configuration. An explicit path must exist; without one the
/// default discovery location is optional and absence means defaults.
pub fn load_from(path: Option<&Path>) -> Result<Config> {
    let (text, source) = match path {
        Some(p) => (
            std::fs::read_to_string(p)
                .with_context(|| format!("read config {}", p.display()))?,
            p.display().to_string(),
        ),
        None => match std::fs::read_to_string(CONFIG_FILE) {
            Ok(text) => (text, CONFIG_FILE.to_string()),
            Err(_) => return Ok(Config::default()),
        },
    };
    let config: Config =
        toml::from_str(&text).with_context(|| format!("parse config {source}"))?;
    info!(target: "config", source = source.as_str(), "config loaded");
    Ok(config)
}
