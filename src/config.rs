//! Configuration loaded from environment variables and channel config files

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;
use thiserror::Error;
use tracing::warn;

use crate::smartnet::{BandFamily, BandPlan, BandSubtype, UhfParams};

/// Errors from validating a control channel configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing configuration key `{0}`")]
    Missing(&'static str),

    #[error("invalid value for `{key}`: {value}")]
    Invalid { key: &'static str, value: String },

    #[error("failed to read channel config {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse channel config {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Numeric setting that may be written as a number or a string
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Number {
    Num(f64),
    Text(String),
}

impl Number {
    fn value(&self, key: &'static str) -> Result<f64, ConfigError> {
        let v = match self {
            Self::Num(n) => *n,
            Self::Text(s) => s.trim().parse().map_err(|_| ConfigError::Invalid {
                key,
                value: s.clone(),
            })?,
        };
        if v.is_finite() {
            Ok(v)
        } else {
            Err(ConfigError::Invalid {
                key,
                value: v.to_string(),
            })
        }
    }
}

/// Settings for one control channel
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ChannelConfig {
    /// Family code plus optional subtype, e.g. `800_reband`
    pub bandplan: Option<String>,
    pub bp_offset: Option<Number>,
    pub bp_high: Option<Number>,
    pub bp_base: Option<Number>,
    pub bp_spacing: Option<Number>,
}

impl ChannelConfig {
    /// Load from a JSON file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

fn required(field: &Option<Number>, key: &'static str) -> Result<f64, ConfigError> {
    field.as_ref().ok_or(ConfigError::Missing(key))?.value(key)
}

fn invalid(key: &'static str, value: f64) -> ConfigError {
    ConfigError::Invalid {
        key,
        value: value.to_string(),
    }
}

impl TryFrom<&ChannelConfig> for BandPlan {
    type Error = ConfigError;

    fn try_from(cfg: &ChannelConfig) -> Result<Self, Self::Error> {
        let bandplan = cfg
            .bandplan
            .as_deref()
            .ok_or(ConfigError::Missing("bandplan"))?;

        let split = bandplan
            .char_indices()
            .nth(3)
            .map(|(i, _)| i)
            .unwrap_or(bandplan.len());
        let (prefix, suffix) = bandplan.split_at(split);

        let family = BandFamily::from_prefix(prefix);
        let plan = match &family {
            BandFamily::Band800 => BandPlan::band_800(BandSubtype::from_suffix(suffix)),
            BandFamily::Band900 => BandPlan::band_900(),
            BandFamily::Uhf400 => {
                let offset = required(&cfg.bp_offset, "bp_offset")?;
                let high = required(&cfg.bp_high, "bp_high")?;
                let base = required(&cfg.bp_base, "bp_base")?;
                let spacing = required(&cfg.bp_spacing, "bp_spacing")?;

                // Offset is a command number; frequencies must not go negative
                if !(0.0..=u16::MAX as f64).contains(&offset) || offset.fract() != 0.0 {
                    return Err(invalid("bp_offset", offset));
                }
                if base < 0.0 {
                    return Err(invalid("bp_base", base));
                }
                if spacing <= 0.0 {
                    return Err(invalid("bp_spacing", spacing));
                }

                BandPlan::uhf_400(UhfParams {
                    offset: offset as u16,
                    base,
                    high,
                    spacing,
                })
            }
            BandFamily::Unrecognized(code) => {
                warn!("Unrecognized band plan `{}`, no OSW will resolve to a channel", code);
                BandPlan {
                    family: family.clone(),
                    subtype: BandSubtype::Standard,
                    uhf: None,
                }
            }
        };

        Ok(plan)
    }
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Control channel settings
    pub channel: ChannelConfig,

    /// Where transport messages are read from; `None` means stdin
    pub input_path: Option<PathBuf>,

    /// Statistics logging interval in seconds
    pub stats_interval_secs: u64,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let channel = match lookup("SMARTNET_CONFIG") {
            Some(path) => ChannelConfig::load(Path::new(&path))
                .with_context(|| format!("loading SMARTNET_CONFIG={}", path))?,
            None => ChannelConfig {
                bandplan: lookup("BANDPLAN"),
                bp_offset: lookup("BP_OFFSET").map(Number::Text),
                bp_high: lookup("BP_HIGH").map(Number::Text),
                bp_base: lookup("BP_BASE").map(Number::Text),
                bp_spacing: lookup("BP_SPACING").map(Number::Text),
            },
        };

        Ok(Self {
            channel,

            input_path: lookup("INPUT_PATH")
                .filter(|p| !p.is_empty() && p != "-")
                .map(PathBuf::from),

            stats_interval_secs: lookup("STATS_INTERVAL_SECS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(10),
        })
    }

    /// Validate the channel settings into a band plan
    pub fn band_plan(&self) -> Result<BandPlan, ConfigError> {
        BandPlan::try_from(&self.channel)
    }
}
