use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use holdem_engine::settings::GameSettings;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Environment variable naming a TOML file with table defaults.
pub const CONFIG_ENV: &str = "HOLDEM_CONFIG";

/// Defaults applied to newly created games, plus registry housekeeping.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TablesConfig {
    pub small_blind: u64,
    pub big_blind: u64,
    pub turn_timeout_ms: u64,
    pub starting_chips: u64,
    pub max_players: usize,
    /// Games untouched for this long are closed by the registry sweep
    pub idle_ttl_secs: u64,
    /// JSONL file completed hands are appended to
    pub hand_log: Option<PathBuf>,
}

impl Default for TablesConfig {
    fn default() -> Self {
        let game = GameSettings::default();
        Self {
            small_blind: game.small_blind,
            big_blind: game.big_blind,
            turn_timeout_ms: game.turn_timeout_ms,
            starting_chips: game.starting_chips,
            max_players: game.max_players,
            idle_ttl_secs: 30 * 60,
            hand_log: None,
        }
    }
}

impl TablesConfig {
    pub fn game_settings(&self) -> GameSettings {
        GameSettings {
            small_blind: self.small_blind,
            big_blind: self.big_blind,
            turn_timeout_ms: self.turn_timeout_ms,
            max_players: self.max_players,
            starting_chips: self.starting_chips,
        }
    }

    pub fn idle_ttl(&self) -> Duration {
        Duration::from_secs(self.idle_ttl_secs)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueSource {
    Default,
    File,
    Env,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ConfigSources {
    pub small_blind: ValueSource,
    pub big_blind: ValueSource,
    pub turn_timeout_ms: ValueSource,
    pub starting_chips: ValueSource,
    pub max_players: ValueSource,
    pub idle_ttl_secs: ValueSource,
    pub hand_log: ValueSource,
}

impl Default for ConfigSources {
    fn default() -> Self {
        Self {
            small_blind: ValueSource::Default,
            big_blind: ValueSource::Default,
            turn_timeout_ms: ValueSource::Default,
            starting_chips: ValueSource::Default,
            max_players: ValueSource::Default,
            idle_ttl_secs: ValueSource::Default,
            hand_log: ValueSource::Default,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ConfigResolved {
    pub config: TablesConfig,
    pub sources: ConfigSources,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("cannot parse config file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    #[serde(default)]
    small_blind: Option<u64>,
    #[serde(default)]
    big_blind: Option<u64>,
    #[serde(default)]
    turn_timeout_ms: Option<u64>,
    #[serde(default)]
    starting_chips: Option<u64>,
    #[serde(default)]
    max_players: Option<usize>,
    #[serde(default)]
    idle_ttl_secs: Option<u64>,
    #[serde(default)]
    hand_log: Option<PathBuf>,
}

pub fn load() -> Result<TablesConfig, ConfigError> {
    load_with_sources().map(|resolved| resolved.config)
}

/// Defaults, then the file named by `HOLDEM_CONFIG`, then the
/// `HOLDEM_*` overrides from the process environment.
pub fn load_with_sources() -> Result<ConfigResolved, ConfigError> {
    resolve(|key| std::env::var(key).ok())
}

/// Same layering as [`load_with_sources`], reading variables through
/// `lookup`. Empty values count as unset.
pub fn resolve<F>(lookup: F) -> Result<ConfigResolved, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let lookup = |key: &str| lookup(key).filter(|v| !v.is_empty());
    let mut cfg = TablesConfig::default();
    let mut sources = ConfigSources::default();

    if let Some(path) = lookup(CONFIG_ENV) {
        let s = fs::read_to_string(path)?;
        let f: FileConfig = toml::from_str(&s)?;
        if let Some(v) = f.small_blind {
            cfg.small_blind = v;
            sources.small_blind = ValueSource::File;
        }
        if let Some(v) = f.big_blind {
            cfg.big_blind = v;
            sources.big_blind = ValueSource::File;
        }
        if let Some(v) = f.turn_timeout_ms {
            cfg.turn_timeout_ms = v;
            sources.turn_timeout_ms = ValueSource::File;
        }
        if let Some(v) = f.starting_chips {
            cfg.starting_chips = v;
            sources.starting_chips = ValueSource::File;
        }
        if let Some(v) = f.max_players {
            cfg.max_players = v;
            sources.max_players = ValueSource::File;
        }
        if let Some(v) = f.idle_ttl_secs {
            cfg.idle_ttl_secs = v;
            sources.idle_ttl_secs = ValueSource::File;
        }
        if let Some(v) = f.hand_log {
            cfg.hand_log = Some(v);
            sources.hand_log = ValueSource::File;
        }
    }

    if let Some(v) = lookup("HOLDEM_SMALL_BLIND") {
        cfg.small_blind = parse_number(&v, "small blind")?;
        sources.small_blind = ValueSource::Env;
    }
    if let Some(v) = lookup("HOLDEM_BIG_BLIND") {
        cfg.big_blind = parse_number(&v, "big blind")?;
        sources.big_blind = ValueSource::Env;
    }
    if let Some(v) = lookup("HOLDEM_TURN_TIMEOUT_MS") {
        cfg.turn_timeout_ms = parse_number(&v, "turn timeout")?;
        sources.turn_timeout_ms = ValueSource::Env;
    }
    if let Some(v) = lookup("HOLDEM_STARTING_CHIPS") {
        cfg.starting_chips = parse_number(&v, "starting chips")?;
        sources.starting_chips = ValueSource::Env;
    }
    if let Some(v) = lookup("HOLDEM_IDLE_TTL_SECS") {
        cfg.idle_ttl_secs = parse_number(&v, "idle ttl")?;
        sources.idle_ttl_secs = ValueSource::Env;
    }
    if let Some(v) = lookup("HOLDEM_HAND_LOG") {
        cfg.hand_log = Some(PathBuf::from(v));
        sources.hand_log = ValueSource::Env;
    }

    validate(&cfg)?;
    Ok(ConfigResolved {
        config: cfg,
        sources,
    })
}

fn parse_number<T: std::str::FromStr>(value: &str, what: &str) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::Invalid(format!("Invalid {}: {:?}", what, value)))
}

fn validate(cfg: &TablesConfig) -> Result<(), ConfigError> {
    cfg.game_settings()
        .validate()
        .map_err(|e| ConfigError::Invalid(e.to_string()))?;
    if cfg.starting_chips == 0 {
        return Err(ConfigError::Invalid(
            "starting_chips must be greater than 0".into(),
        ));
    }
    if cfg.idle_ttl_secs == 0 {
        return Err(ConfigError::Invalid(
            "idle_ttl_secs must be greater than 0".into(),
        ));
    }
    Ok(())
}
