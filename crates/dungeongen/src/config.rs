use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::generator::GenerationConfig;
use crate::guidelines::LayoutType;

const FILENAME: &str = "config.yaml";
const APP_DIR: &str = "dungeongen";

pub const KEYS: &[&str] = &[
    "generation.margin",
    "generation.min_separation",
    "generation.loop_ratio",
    "generation.layout_type",
    "generation.padding",
    "generation.spring",
];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generation: Option<GenerationDefaults>,
}

/// User overrides for generation tuning. Unset keys keep the built-in defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerationDefaults {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub margin: Option<i32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_separation: Option<i32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loop_ratio: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout_type: Option<LayoutType>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub padding: Option<i32>,

    /// Spring relaxation of scattered layouts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spring: Option<bool>,
}

impl Config {
    pub fn path() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|d| d.join(APP_DIR).join(FILENAME))
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))
    }

    pub fn load() -> Result<Self> {
        let path = Self::path()?;
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                anyhow::anyhow!("No config found. Run `dungeongen config show` to see defaults.")
            } else {
                anyhow::anyhow!("Failed to read config: {e}")
            }
        })?;
        let config: Config = serde_yaml::from_str(&contents)?;
        Ok(config)
    }

    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_default()
    }

    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::path()?;
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let yaml = serde_yaml::to_string(self)?;
        let contents = format!("# dungeongen configuration\n{yaml}");
        std::fs::write(path, contents)?;
        Ok(())
    }

    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "generation.margin" => {
                let margin = parse_non_negative(key, value)?;
                self.generation_mut().margin = Some(margin);
            }
            "generation.min_separation" => {
                let sep = parse_non_negative(key, value)?;
                self.generation_mut().min_separation = Some(sep);
            }
            "generation.loop_ratio" => {
                let ratio = match value.parse::<f64>() {
                    Ok(r) if (0.0..=1.0).contains(&r) => r,
                    _ => anyhow::bail!(
                        "Invalid loop_ratio: {value}. Must be a number between 0 and 1."
                    ),
                };
                self.generation_mut().loop_ratio = Some(ratio);
            }
            "generation.layout_type" => {
                let layout_type = value
                    .parse::<LayoutType>()
                    .map_err(|e| anyhow::anyhow!(e))?;
                self.generation_mut().layout_type = Some(layout_type);
            }
            "generation.padding" => {
                let padding = match value.parse::<i32>() {
                    Ok(p) if p >= 1 => p,
                    _ => anyhow::bail!("Invalid padding: {value}. Must be a positive integer."),
                };
                self.generation_mut().padding = Some(padding);
            }
            "generation.spring" => {
                let enabled = value
                    .parse::<bool>()
                    .map_err(|_| anyhow::anyhow!("Invalid spring: {value}. Use true or false."))?;
                self.generation_mut().spring = Some(enabled);
            }
            _ => anyhow::bail!(
                "Unknown config key: {key}. Valid keys: {}",
                KEYS.join(", ")
            ),
        }
        Ok(())
    }

    fn generation_mut(&mut self) -> &mut GenerationDefaults {
        self.generation
            .get_or_insert_with(GenerationDefaults::default)
    }

    /// Built-in generation config with this file's overrides applied.
    pub fn generation_config(&self) -> GenerationConfig {
        let mut config = GenerationConfig::default();
        let Some(g) = &self.generation else {
            return config;
        };
        if let Some(margin) = g.margin {
            config.margin = margin;
        }
        if let Some(sep) = g.min_separation {
            config.sampler.min_separation = sep;
        }
        if let Some(ratio) = g.loop_ratio {
            config.connectivity.loop_ratio = ratio;
        }
        if let Some(padding) = g.padding {
            config.routing.padding = padding;
        }
        if let Some(enabled) = g.spring {
            config.spring.enabled = enabled;
        }
        config
    }

    pub fn layout_type(&self) -> Option<LayoutType> {
        self.generation.as_ref().and_then(|g| g.layout_type)
    }
}

fn parse_non_negative(key: &str, value: &str) -> Result<i32> {
    match value.parse::<i32>() {
        Ok(n) if n >= 0 => Ok(n),
        _ => {
            let name = key.rsplit('.').next().unwrap_or(key);
            anyhow::bail!("Invalid {name}: {value}. Must be a non-negative integer.")
        }
    }
}
