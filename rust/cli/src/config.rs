use potsettle_engine::game::ZeroStackPolicy;
use potsettle_engine::rules::{AnteOrder, TableRules};
use serde::{Deserialize, Serialize};
use std::fs;

pub const CONFIG_ENV: &str = "POTSETTLE_CONFIG";
pub const ZERO_STACK_ENV: &str = "POTSETTLE_ZERO_STACK";
pub const ANTE_ORDER_ENV: &str = "POTSETTLE_ANTE_ORDER";
pub const HAND_LOG_ENV: &str = "POTSETTLE_HAND_LOG";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Config {
    pub zero_stack_policy: ZeroStackPolicy,
    pub ante_order: AnteOrder,
    pub hand_log: Option<String>,
}

impl Config {
    pub fn table_rules(&self) -> TableRules {
        TableRules {
            ante_order: self.ante_order,
            zero_stack: self.zero_stack_policy,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ValueSource {
    Default,
    File,
    Env,
}

#[derive(Debug, Clone, Copy)]
pub struct ConfigSources {
    pub zero_stack_policy: ValueSource,
    pub ante_order: ValueSource,
    pub hand_log: ValueSource,
}

impl Default for ConfigSources {
    fn default() -> Self {
        Self {
            zero_stack_policy: ValueSource::Default,
            ante_order: ValueSource::Default,
            hand_log: ValueSource::Default,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ConfigResolved {
    pub config: Config,
    pub sources: ConfigSources,
}

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Invalid(String),
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e)
    }
}
impl From<toml::de::Error> for ConfigError {
    fn from(e: toml::de::Error) -> Self {
        ConfigError::Parse(e)
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "cannot read config file: {}", e),
            ConfigError::Parse(e) => write!(f, "malformed config file: {}", e),
            ConfigError::Invalid(msg) => f.write_str(msg),
        }
    }
}

/// Resolves defaults, then the TOML file named by `POTSETTLE_CONFIG`, then
/// environment overrides. Empty environment values are ignored.
pub fn load_with_sources() -> Result<ConfigResolved, ConfigError> {
    let mut cfg = Config::default();
    let mut sources = ConfigSources::default();

    if let Ok(path) = std::env::var(CONFIG_ENV)
        && !path.is_empty()
    {
        let s = fs::read_to_string(path)?;
        let f: FileConfig = toml::from_str(&s)?;
        if let Some(v) = f.zero_stack_policy {
            cfg.zero_stack_policy = v.parse().map_err(ConfigError::Invalid)?;
            sources.zero_stack_policy = ValueSource::File;
        }
        if let Some(v) = f.ante_order {
            cfg.ante_order = v.parse().map_err(ConfigError::Invalid)?;
            sources.ante_order = ValueSource::File;
        }
        if let Some(v) = f.hand_log {
            cfg.hand_log = Some(v);
            sources.hand_log = ValueSource::File;
        }
    }

    if let Ok(policy) = std::env::var(ZERO_STACK_ENV)
        && !policy.is_empty()
    {
        cfg.zero_stack_policy = policy.parse().map_err(ConfigError::Invalid)?;
        sources.zero_stack_policy = ValueSource::Env;
    }
    if let Ok(order) = std::env::var(ANTE_ORDER_ENV)
        && !order.is_empty()
    {
        cfg.ante_order = order.parse().map_err(ConfigError::Invalid)?;
        sources.ante_order = ValueSource::Env;
    }
    if let Ok(log) = std::env::var(HAND_LOG_ENV)
        && !log.is_empty()
    {
        cfg.hand_log = Some(log);
        sources.hand_log = ValueSource::Env;
    }

    validate(&cfg)?;
    Ok(ConfigResolved {
        config: cfg,
        sources,
    })
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    #[serde(default)]
    zero_stack_policy: Option<String>,
    #[serde(default)]
    ante_order: Option<String>,
    #[serde(default)]
    hand_log: Option<String>,
}

fn validate(cfg: &Config) -> Result<(), ConfigError> {
    if let Some(path) = &cfg.hand_log {
        if path.trim().is_empty() {
            return Err(ConfigError::Invalid("hand_log must not be blank".into()));
        }
        if std::path::Path::new(path).is_dir() {
            return Err(ConfigError::Invalid(format!("hand_log {} is a directory", path)));
        }
    }
    Ok(())
}
