//! Runtime settings with persistence
//!
//! Settings are saved to `~/.config/campus/settings.toml`

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;

use campus_game::{DialogueConfig, GameConfig, NpcConfig, PlayerConfig};
use campus_integration::{ChatOptions, LlmCredentials};
use serde::{Deserialize, Serialize};
use tracing::{info, warn, Level};

const SETTINGS_FILE: &str = "settings.toml";

/// All runtime settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// One of `error`, `warn`, `info`, `debug`, `trace`
    pub log_level: Option<String>,
    pub llm: LlmSettings,
    pub gameplay: GameplaySettings,
    pub npc: NpcConfig,
}

/// How the settings came to be. Reported once logging is up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    Loaded(PathBuf),
    /// No file existed, so the defaults were written here
    Created(PathBuf),
    /// Fell back to defaults for the given reason
    Defaulted(String),
}

impl LoadOutcome {
    pub fn log(&self) {
        match self {
            LoadOutcome::Loaded(path) => info!("Loaded settings from {:?}", path),
            LoadOutcome::Created(path) => info!("No settings file found, wrote defaults to {:?}", path),
            LoadOutcome::Defaulted(reason) => warn!("{}, using defaults", reason),
        }
    }
}

impl Settings {
    /// Get the config directory path
    fn config_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("campus"))
    }

    /// Load settings from disk, or return defaults if not found.
    /// Environment overrides are applied on top either way.
    ///
    /// Nothing is logged here since this runs before the subscriber exists.
    pub fn load() -> (Self, LoadOutcome) {
        let (mut settings, outcome) = match Self::config_dir() {
            Some(dir) => Self::load_from(&dir.join(SETTINGS_FILE)),
            None => (
                Self::default(),
                LoadOutcome::Defaulted("Could not determine config directory".into()),
            ),
        };
        settings.apply_env(|key| std::env::var(key).ok());
        (settings, outcome)
    }

    /// Read `path`, writing the defaults there first if it does not exist
    pub fn load_from(path: &Path) -> (Self, LoadOutcome) {
        if !path.exists() {
            let settings = Self::default();
            let outcome = match settings.save_to(path) {
                Ok(()) => LoadOutcome::Created(path.to_path_buf()),
                Err(e) => LoadOutcome::Defaulted(format!("Failed to write default settings: {:#}", e)),
            };
            return (settings, outcome);
        }

        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                return (
                    Self::default(),
                    LoadOutcome::Defaulted(format!("Failed to read settings file: {}", e)),
                )
            }
        };
        match Self::parse(&content) {
            Ok(settings) => (settings, LoadOutcome::Loaded(path.to_path_buf())),
            Err(e) => (
                Self::default(),
                LoadOutcome::Defaulted(format!("Failed to parse settings: {}", e)),
            ),
        }
    }

    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Save settings to `path`, creating its directory
    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).with_context(|| format!("Failed to create {:?}", dir))?;
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(path, content).with_context(|| format!("Failed to write {:?}", path))?;
        Ok(())
    }

    /// Let `LLM_API_KEY`, `LLM_BASE_URL` and `LLM_MODEL` win over the file
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        if let Some(key) = non_empty("LLM_API_KEY") {
            self.llm.api_key = key;
        }
        if let Some(url) = non_empty("LLM_BASE_URL") {
            self.llm.base_url = url;
        }
        if let Some(model) = non_empty("LLM_MODEL") {
            self.llm.model = model;
        }
    }

    /// Parsed log level, INFO when unset or unrecognised
    pub fn log_level(&self) -> Level {
        self.log_level
            .as_deref()
            .and_then(|level| level.parse().ok())
            .unwrap_or(Level::INFO)
    }

    pub fn game_config(&self) -> GameConfig {
        let defaults = GameConfig::default();
        GameConfig {
            portal_cooldown: self.gameplay.portal_cooldown,
            startup_cooldown: self.gameplay.startup_cooldown,
            player: PlayerConfig {
                speed: self.gameplay.player_speed,
                special_multiplier: self.gameplay.special_multiplier,
                ..defaults.player
            },
            npc: self.npc,
            dialogue: DialogueConfig {
                history_window: self.gameplay.history_window,
                reveal_ticks_per_char: self.gameplay.reveal_ticks_per_char,
            },
            ..defaults
        }
    }
}

/// Chat endpoint settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmSettings {
    /// Master switch. Complete credentials are still required.
    pub enabled: bool,
    pub base_url: String,
    pub model: String,
    pub api_key: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub timeout_secs: u64,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: String::new(),
            model: String::new(),
            api_key: String::new(),
            max_tokens: 150,
            temperature: 0.7,
            timeout_secs: 30,
        }
    }
}

impl LlmSettings {
    pub fn chat_options(&self) -> ChatOptions {
        ChatOptions {
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            timeout: Duration::from_secs(self.timeout_secs),
        }
    }

    /// Credentials to hand the dialogue client, if chat should be on
    pub fn credentials(&self) -> Option<LlmCredentials> {
        if !self.enabled {
            return None;
        }
        let credentials = LlmCredentials::new(&self.api_key, &self.base_url, &self.model);
        credentials.is_complete().then_some(credentials)
    }
}

/// Gameplay settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameplaySettings {
    /// Ticks a map's portals stay shut after arriving
    pub portal_cooldown: u32,
    /// Ticks all portals stay shut after start-up
    pub startup_cooldown: u32,
    pub player_speed: f32,
    /// Skateboard speed multiplier
    pub special_multiplier: f32,
    pub reveal_ticks_per_char: u32,
    pub history_window: usize,
}

impl Default for GameplaySettings {
    fn default() -> Self {
        Self {
            portal_cooldown: 60,
            startup_cooldown: 120,
            player_speed: 2.0,
            special_multiplier: 1.2,
            reveal_ticks_per_char: 2,
            history_window: 20,
        }
    }
}
