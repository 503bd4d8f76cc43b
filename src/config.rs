// Configuration: YAML file, environment, then command-line overrides
//
// Config file discovery (first match wins):
// 1. Explicit path passed by the caller (`--config`)
// 2. ./gigstore.yaml
// 3. <user config dir>/gigstore/config.yaml
//
// Relative paths inside a config file are resolved against the file's directory.

use crate::export::{DEFAULT_EXPORT_PREFIX, Exporter};
use crate::generate::CommandSuggester;
use crate::store::DEFAULT_RESULTS_FILE;
use eyre::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const LOCAL_CONFIG_FILE: &str = "gigstore.yaml";
pub const ENV_RESULTS_FILE: &str = "GIGSTORE_RESULTS_FILE";
pub const ENV_EXPORT_DIR: &str = "GIGSTORE_EXPORT_DIR";

/// Raw config file schema
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    pub results_file: Option<PathBuf>,
    pub export_dir: Option<PathBuf>,
    pub export_prefix: Option<String>,
    /// Command line of an external title suggester
    pub title_command: Option<String>,
}

/// Resolved configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub results_file: PathBuf,
    pub export_dir: PathBuf,
    pub export_prefix: String,
    pub title_command: Option<String>,
    /// Config file the values came from, if any
    pub source: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            results_file: PathBuf::from(DEFAULT_RESULTS_FILE),
            export_dir: PathBuf::from("."),
            export_prefix: DEFAULT_EXPORT_PREFIX.to_string(),
            title_command: None,
            source: None,
        }
    }
}

impl Config {
    /// Load from the discovered (or given) config file, then apply environment overrides
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(path) => Some(path.to_path_buf()),
            None => discover(Path::new(".")),
        };

        let mut config = match path {
            Some(path) => Self::from_file(&path)?,
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Defaults overlaid with the values in `path`
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .wrap_err_with(|| format!("Failed to read config file: {}", path.display()))?;
        let file: ConfigFile = if content.trim().is_empty() {
            ConfigFile::default()
        } else {
            serde_yaml::from_str(&content)
                .wrap_err_with(|| format!("Failed to parse config file: {}", path.display()))?
        };

        debug!(file = ?path, "Loaded config file");

        let base = path.parent().unwrap_or(Path::new("."));
        let mut config = Self::default();
        config.apply_file(file, base);
        config.source = Some(path.to_path_buf());
        Ok(config)
    }

    fn apply_file(&mut self, file: ConfigFile, base: &Path) {
        if let Some(results_file) = file.results_file {
            self.results_file = resolve_path(base, results_file);
        }
        if let Some(export_dir) = file.export_dir {
            self.export_dir = resolve_path(base, export_dir);
        }
        if let Some(prefix) = file.export_prefix.filter(|p| !p.trim().is_empty()) {
            self.export_prefix = prefix;
        }
        if let Some(command) = file.title_command.filter(|c| !c.trim().is_empty()) {
            self.title_command = Some(command);
        }
    }

    /// Apply `GIGSTORE_*` overrides read through `lookup`
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup(ENV_RESULTS_FILE).filter(|v| !v.is_empty()) {
            self.results_file = PathBuf::from(path);
        }
        if let Some(path) = lookup(ENV_EXPORT_DIR).filter(|v| !v.is_empty()) {
            self.export_dir = PathBuf::from(path);
        }
    }

    pub fn exporter(&self) -> Exporter {
        Exporter::new(&self.export_dir, &self.export_prefix)
    }

    /// External title suggester, if one is configured
    pub fn title_suggester(&self) -> Option<CommandSuggester> {
        self.title_command.as_deref().and_then(CommandSuggester::from_command_line)
    }
}

/// Find a config file for a process running in `cwd`
pub fn discover(cwd: &Path) -> Option<PathBuf> {
    let local = cwd.join(LOCAL_CONFIG_FILE);
    if local.is_file() {
        return Some(local);
    }

    let user = dirs::config_dir()?.join("gigstore").join("config.yaml");
    user.is_file().then_some(user)
}

fn resolve_path(base: &Path, path: PathBuf) -> PathBuf {
    if path.is_absolute() { path } else { base.join(path) }
}
