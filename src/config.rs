// src/config.rs

use crate::error::{AdvisoryError, Result};
use rand::{rngs::StdRng, SeedableRng};
use serde::Deserialize;
use std::{
    fs,
    path::{Path, PathBuf},
};

/// How failures that have a documented default are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Mask every maskable failure; always produce a sentence.
    #[default]
    Lenient,
    /// Surface missing datasets, unknown intents/languages and render errors.
    Strict,
}

/// Which row matcher feeds the normalizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Multi-criterion narrowing with a random pick among survivors.
    #[default]
    Narrow,
    /// District+crop, district, crop, then first row.
    Tiered,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AdvisorConfig {
    pub dataset_path: PathBuf,
    pub model_path: Option<PathBuf>,
    pub mode: Mode,
    pub strategy: Strategy,
    pub seed: Option<u64>,
}

impl Default for AdvisorConfig {
    fn default() -> Self {
        Self {
            dataset_path: PathBuf::from("Final_Dataset_2.csv"),
            model_path: Some(PathBuf::from("model/yield_model.json")),
            mode: Mode::default(),
            strategy: Strategy::default(),
            seed: None,
        }
    }
}

impl AdvisorConfig {
    /// Read a YAML config file; absent keys keep their defaults.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .map_err(|e| AdvisoryError::Config(format!("reading {}: {}", path.display(), e)))?;
        Self::from_yaml_str(&text)
            .map_err(|e| AdvisoryError::Config(format!("{} in {}", e, path.display())))
    }

    pub fn from_yaml_str(text: &str) -> Result<Self> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(text).map_err(|e| AdvisoryError::Config(e.to_string()))
    }

    /// Seeded RNG when `seed` is set, entropy-seeded otherwise.
    pub fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }
}
