use anyhow::{Context, Result};
use log::warn;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use crate::script::Script;

pub const CONFIG_ENV: &str = "STORYLINE_CONFIG";
pub const DEBUG_ENV: &str = "STORYLINE_DEBUG";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct PlayerSettings {
    pub frame_interval_ms: u64,
    /// JSON script to play instead of the built-in story.
    pub script_path: Option<PathBuf>,
    pub autostart: bool,
    pub output: OutputFormat,
    pub bar_width: usize,
}

impl Default for PlayerSettings {
    fn default() -> Self {
        Self {
            frame_interval_ms: 16,
            script_path: None,
            autostart: true,
            output: OutputFormat::Text,
            bar_width: 30,
        }
    }
}

impl PlayerSettings {
    /// Reads settings from `path`. A missing or malformed file falls back to
    /// defaults; an unreadable one is an error.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings from {}", path.display()))?;
        Ok(Self::from_json_str(&contents))
    }

    pub fn from_json_str(contents: &str) -> Self {
        serde_json::from_str(contents).unwrap_or_else(|err| {
            warn!("Ignoring malformed settings ({err}); using defaults");
            Self::default()
        })
    }

    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval_ms.max(1))
    }

    pub fn load_script(&self) -> Result<Script> {
        match &self.script_path {
            Some(path) => Script::load(path),
            None => Ok(Script::builtin()),
        }
    }
}

/// Command-line options understood by the player binary.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliArgs {
    pub config_path: Option<PathBuf>,
    pub script_path: Option<PathBuf>,
    pub json: bool,
}

impl CliArgs {
    pub fn parse<I>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = String>,
    {
        let mut parsed = Self::default();
        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--config" => {
                    let value = args.next().context("--config requires a path")?;
                    parsed.config_path = Some(PathBuf::from(value));
                }
                "--script" => {
                    let value = args.next().context("--script requires a path")?;
                    parsed.script_path = Some(PathBuf::from(value));
                }
                "--json" => parsed.json = true,
                other => anyhow::bail!("unrecognised argument '{other}'"),
            }
        }
        Ok(parsed)
    }

    /// Loads the settings file (flag, then env var) and applies overrides.
    pub fn resolve_settings(&self) -> Result<PlayerSettings> {
        let config_path = self
            .config_path
            .clone()
            .or_else(|| std::env::var_os(CONFIG_ENV).map(PathBuf::from));

        let mut settings = match config_path {
            Some(path) => PlayerSettings::load(&path)?,
            None => PlayerSettings::default(),
        };
        if let Some(script_path) = &self.script_path {
            settings.script_path = Some(script_path.clone());
        }
        if self.json {
            settings.output = OutputFormat::Json;
        }
        Ok(settings)
    }
}

pub fn debug_enabled() -> bool {
    std::env::var(DEBUG_ENV)
        .map(|value| value == "1" || value.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn partial_json_keeps_remaining_defaults() {
        let settings = PlayerSettings::from_json_str(r#"{ "frameIntervalMs": 33, "output": "json" }"#);
        assert_eq!(settings.frame_interval_ms, 33);
        assert_eq!(settings.output, OutputFormat::Json);
        assert!(settings.autostart);
        assert_eq!(settings.bar_width, 30);
    }

    #[test]
    fn malformed_json_falls_back_to_defaults() {
        assert_eq!(PlayerSettings::from_json_str("{ not json"), PlayerSettings::default());
    }

    #[test]
    fn missing_file_yields_defaults() {
        let path = std::env::temp_dir().join("storyline-settings-that-does-not-exist.json");
        assert_eq!(PlayerSettings::load(&path).unwrap(), PlayerSettings::default());
    }

    #[test]
    fn zero_frame_interval_is_raised() {
        let settings = PlayerSettings {
            frame_interval_ms: 0,
            ..PlayerSettings::default()
        };
        assert_eq!(settings.frame_interval(), Duration::from_millis(1));
    }

    #[test]
    fn default_script_is_builtin() {
        let script = PlayerSettings::default().load_script().unwrap();
        assert_eq!(script, Script::builtin());
    }

    #[test]
    fn parses_cli_flags() {
        let parsed = CliArgs::parse(args(&["--script", "story.json", "--json"])).unwrap();
        assert_eq!(parsed.script_path, Some(PathBuf::from("story.json")));
        assert!(parsed.json);
        assert!(parsed.config_path.is_none());
    }

    #[test]
    fn rejects_bad_cli_flags() {
        assert!(CliArgs::parse(args(&["--config"])).is_err());
        assert!(CliArgs::parse(args(&["--loop"])).is_err());
    }

    #[test]
    fn cli_overrides_apply_on_top_of_file() {
        let path = std::env::temp_dir().join(format!("storyline-settings-{}.json", std::process::id()));
        fs::write(&path, r#"{ "barWidth": 12 }"#).unwrap();

        let cli = CliArgs {
            config_path: Some(path.clone()),
            script_path: Some(PathBuf::from("other.json")),
            json: true,
        };
        let settings = cli.resolve_settings().unwrap();
        fs::remove_file(&path).unwrap();

        assert_eq!(settings.bar_width, 12);
        assert_eq!(settings.output, OutputFormat::Json);
        assert_eq!(settings.script_path, Some(PathBuf::from("other.json")));
    }
}
