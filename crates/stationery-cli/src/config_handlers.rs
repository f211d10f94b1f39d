//! Handlers for `stationery config {path,get,set,init,export}`.
//!
//! Each command is split into a function that computes its result and a
//! thin printing wrapper, so the results can be checked without capturing
//! stdout.

use std::path::{Path, PathBuf};

use stationery_core::{Error, Result};

use crate::cli::ConfigAction;
use crate::config::StationeryConfig;

// ============================================================================
// Command dispatch
// ============================================================================

/// Handle a config subcommand.
///
/// Receives the raw `--config` path (not a loaded config) because `path`
/// and `init` must work before a config file exists.
pub fn handle_config_command(config_path: Option<&str>, action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Path => {
            let path = config_file(config_path)?;
            println!("{}", path.display());
            if !path.exists() {
                eprintln!("(file does not exist; run `stationery config init` to create it)");
            }
        }
        ConfigAction::Get { key } => {
            let config = StationeryConfig::load(config_path)?;
            println!("{}", config_get(&config, &key)?);
        }
        ConfigAction::Set { key, value } => {
            let path = config_file(config_path)?;
            config_set(&path, &key, &value)?;
            println!("Set {key} = {value} in {}", path.display());
        }
        ConfigAction::Init { file, force } => {
            let path = match file {
                Some(f) => PathBuf::from(f),
                None => StationeryConfig::default_config_path()
                    .ok_or_else(|| Error::config("Could not determine config directory"))?,
            };
            config_init(&path, force)?;
            println!("Config file created at {}", path.display());
        }
        ConfigAction::Export { docker_env } => {
            let config = StationeryConfig::load(config_path)?;
            for line in export_lines(&config, docker_env)? {
                println!("{line}");
            }
        }
    }
    Ok(())
}

fn config_file(config_path: Option<&str>) -> Result<PathBuf> {
    StationeryConfig::resolve_config_path(config_path).ok_or_else(|| {
        Error::config("Could not determine config directory for this platform")
    })
}

// ============================================================================
// Commands
// ============================================================================

/// The value at a dotted key, formatted for display.
pub fn config_get(config: &StationeryConfig, key: &str) -> Result<String> {
    let root = toml::Value::try_from(config).map_err(|e| Error::config(e.to_string()))?;
    lookup(&root, key)
        .map(display_value)
        .ok_or_else(|| Error::config(format!("Key '{key}' not found in configuration")))
}

/// Set a dotted key in an existing config file.
///
/// The edited document must still parse as a [`StationeryConfig`];
/// otherwise the file is left untouched.
pub fn config_set(path: &Path, key: &str, value: &str) -> Result<()> {
    if !path.exists() {
        return Err(Error::config(format!(
            "Config file does not exist at {}. Run `stationery config init` first.",
            path.display()
        )));
    }
    let content = std::fs::read_to_string(path).map_err(|e| Error::io_with_path(e, path))?;
    let mut doc: toml::Value = toml::from_str(&content)
        .map_err(|e| Error::config(format!("Failed to parse {}: {e}", path.display())))?;

    let parts: Vec<&str> = key.split('.').collect();
    if parts.iter().any(|p| p.trim().is_empty()) {
        return Err(Error::config(format!("Invalid key '{key}'")));
    }
    insert(&mut doc, &parts, parse_value(value))?;

    doc.clone()
        .try_into::<StationeryConfig>()
        .map_err(|e| Error::config(format!("Invalid value for '{key}': {e}")))?;

    let toml_str = toml::to_string_pretty(&doc).map_err(|e| Error::config(e.to_string()))?;
    std::fs::write(path, toml_str).map_err(|e| Error::io_with_path(e, path))?;
    log::debug!("set {key} in {}", path.display());
    Ok(())
}

/// Write a default config file, creating parent directories.
pub fn config_init(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        return Err(Error::config(format!(
            "Config file already exists at {}. Use --force to overwrite.",
            path.display()
        )));
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| Error::io_with_path(e, parent))?;
    }
    let toml_str = StationeryConfig::default().to_toml_string()?;
    std::fs::write(path, toml_str).map_err(|e| Error::io_with_path(e, path))?;
    Ok(())
}

/// `KEY=value` lines, or `--env KEY=value` for Docker.
pub fn export_lines(config: &StationeryConfig, docker_env: bool) -> Result<Vec<String>> {
    let prefix = if docker_env { "--env " } else { "" };
    Ok(config
        .to_env_vars()?
        .into_iter()
        .map(|(key, value)| format!("{prefix}{key}={value}"))
        .collect())
}

// ============================================================================
// TOML helpers
// ============================================================================

fn lookup<'a>(root: &'a toml::Value, key: &str) -> Option<&'a toml::Value> {
    key.split('.').try_fold(root, |value, part| value.get(part))
}

fn insert(node: &mut toml::Value, parts: &[&str], value: toml::Value) -> Result<()> {
    let table = node
        .as_table_mut()
        .ok_or_else(|| Error::config("Cannot set a key inside a non-table value"))?;
    match parts {
        [] => Err(Error::config("Empty key path")),
        [last] => {
            table.insert((*last).to_string(), value);
            Ok(())
        }
        [first, rest @ ..] => {
            let child = table
                .entry((*first).to_string())
                .or_insert_with(|| toml::Value::Table(toml::map::Map::new()));
            insert(child, rest, value)
        }
    }
}

/// Interpret a command-line value: bool, then integer, then float, else string.
fn parse_value(s: &str) -> toml::Value {
    match s {
        "true" => toml::Value::Boolean(true),
        "false" => toml::Value::Boolean(false),
        _ => s
            .parse::<i64>()
            .map(toml::Value::Integer)
            .or_else(|_| s.parse::<f64>().map(toml::Value::Float))
            .unwrap_or_else(|_| toml::Value::String(s.to_string())),
    }
}

fn display_value(value: &toml::Value) -> String {
    match value {
        toml::Value::String(s) => s.clone(),
        toml::Value::Table(_) | toml::Value::Array(_) => {
            toml::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
        }
        other => other.to_string(),
    }
}

// ============================================================================
// Tests
// ============================================================================
