pub mod defaults;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::graph::EvictionPolicy;
use defaults::*;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub window: WindowConfig,
    pub text: TextConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub window_seconds: u64,
    pub eviction: EvictionPolicy,
    pub precision: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TextConfig {
    /// Keep the ASCII base of accented characters instead of dropping them
    pub fold_diacritics: bool,
    pub lowercase_hashtags: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub empty_graph: EmptyGraphOutput,
    pub fixed_precision: Option<usize>,
}

/// What the stream writes for a record that leaves the window empty
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmptyGraphOutput {
    #[default]
    Zero,
    Omit,
}

impl AppConfig {
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let config: Self = if let Some(path) = config_path {
            let config_str = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;

            toml::from_str(&config_str)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?
        } else {
            Self::default()
        };

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration settings
    pub fn validate(&self) -> Result<()> {
        if self.window.window_seconds == 0 {
            return Err(anyhow::anyhow!("Window length must be greater than 0 seconds"));
        }

        if self.window.window_seconds > MAX_WINDOW_SECONDS {
            return Err(anyhow::anyhow!(
                "Window length must be at most {} seconds",
                MAX_WINDOW_SECONDS
            ));
        }

        if self.window.precision > MAX_PRECISION {
            return Err(anyhow::anyhow!(
                "Average degree precision must be at most {} decimal places",
                MAX_PRECISION
            ));
        }

        if let Some(places) = self.output.fixed_precision {
            if places > MAX_PRECISION as usize {
                return Err(anyhow::anyhow!(
                    "Output precision must be at most {} decimal places",
                    MAX_PRECISION
                ));
            }
        }

        Ok(())
    }
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            window_seconds: DEFAULT_WINDOW_SECONDS,
            eviction: EvictionPolicy::default(),
            precision: DEFAULT_PRECISION,
        }
    }
}
