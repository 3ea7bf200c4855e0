// src/predictor/mod.rs

//! Yield estimation behind a single trait.
//!
//! `ModelPredictor` wraps an externally trained linear model that is read on
//! first use; `HeuristicPredictor` is the closed-form fallback. `YieldEstimator`
//! picks between them and never lets a model failure escape.

use crate::error::{AdvisoryError, Result};
use once_cell::sync::OnceCell;
use serde::Deserialize;
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::{debug, info, warn};

/// Feature order: rainfall (mm), temperature (°C), nitrogen, phosphorus, potassium.
pub type Features = [f64; 5];

pub trait YieldPredictor: Send + Sync {
    fn predict(&self, features: Features) -> Result<f64>;
}

const HEURISTIC_FLOOR: f64 = 5.0;
const HEURISTIC_CEILING: f64 = 60.0;

/// `clamp(5, 60, n/2 + rain/100 + (30 - |t - 25|))`, rounded to one decimal.
#[derive(Debug, Default, Clone, Copy)]
pub struct HeuristicPredictor;

impl HeuristicPredictor {
    pub fn estimate(&self, rainfall: f64, temperature: f64, nitrogen: f64) -> f64 {
        let base = nitrogen / 2.0 + rainfall / 100.0 + (30.0 - (temperature - 25.0).abs());
        // NaN inputs make `clamp` propagate NaN; pin those to the floor
        let clamped = if base.is_nan() {
            HEURISTIC_FLOOR
        } else {
            base.clamp(HEURISTIC_FLOOR, HEURISTIC_CEILING)
        };
        round_to(clamped, 1)
    }
}

impl YieldPredictor for HeuristicPredictor {
    fn predict(&self, features: Features) -> Result<f64> {
        let [rainfall, temperature, nitrogen, _, _] = features;
        Ok(self.estimate(rainfall, temperature, nitrogen))
    }
}

/// On-disk shape of the trained model artifact.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct LinearModel {
    pub intercept: f64,
    pub coefficients: [f64; 5],
}

impl LinearModel {
    pub fn evaluate(&self, features: &Features) -> f64 {
        self.intercept
            + self
                .coefficients
                .iter()
                .zip(features.iter())
                .map(|(c, x)| c * x)
                .sum::<f64>()
    }
}

/// Predictor backed by a JSON artifact. The file is only opened on the first
/// `predict`; a missing artifact is reported then, not at construction.
pub struct ModelPredictor {
    path: PathBuf,
    // load failures are kept too, the file is read at most once
    model: OnceCell<std::result::Result<LinearModel, String>>,
}

impl ModelPredictor {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            model: OnceCell::new(),
        }
    }

    fn model(&self) -> Result<&LinearModel> {
        self.model
            .get_or_init(|| self.read_model())
            .as_ref()
            .map_err(|msg| AdvisoryError::PredictorUnavailable(msg.clone()))
    }

    fn read_model(&self) -> std::result::Result<LinearModel, String> {
        let text = fs::read_to_string(&self.path)
            .map_err(|e| format!("trained model not found at {}: {}", self.path.display(), e))?;
        let model: LinearModel = serde_json::from_str(&text).map_err(|e| {
            warn!(path = %self.path.display(), error = %e, "unreadable yield model");
            format!("parsing model {}: {}", self.path.display(), e)
        })?;
        info!(path = %self.path.display(), "yield model loaded");
        Ok(model)
    }
}

impl YieldPredictor for ModelPredictor {
    fn predict(&self, features: Features) -> Result<f64> {
        if features.iter().any(|x| !x.is_finite()) {
            return Err(AdvisoryError::PredictorUnavailable(format!(
                "non-finite features {:?}",
                features
            )));
        }
        let raw = self.model()?.evaluate(&features);
        if !raw.is_finite() {
            return Err(AdvisoryError::PredictorUnavailable(
                "model produced a non-finite value".into(),
            ));
        }
        Ok(round_to(raw, 2))
    }
}

/// Which tier produced an estimate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum YieldSource {
    Model,
    Heuristic,
}

/// Two-tier estimator: the model if one was configured, the heuristic otherwise
/// or whenever the model fails.
pub struct YieldEstimator {
    model: Option<Box<dyn YieldPredictor>>,
    heuristic: HeuristicPredictor,
}

impl YieldEstimator {
    pub fn heuristic_only() -> Self {
        Self {
            model: None,
            heuristic: HeuristicPredictor,
        }
    }

    pub fn with_model(model: Box<dyn YieldPredictor>) -> Self {
        Self {
            model: Some(model),
            heuristic: HeuristicPredictor,
        }
    }

    /// Model-backed when `model_path` points at an existing file, heuristic otherwise.
    pub fn from_path(model_path: Option<&Path>) -> Self {
        match model_path {
            Some(p) if p.exists() => {
                debug!(path = %p.display(), "using model-backed yield predictor");
                Self::with_model(Box::new(ModelPredictor::new(p)))
            }
            Some(p) => {
                debug!(path = %p.display(), "no model artifact; heuristic yield only");
                Self::heuristic_only()
            }
            None => Self::heuristic_only(),
        }
    }

    pub fn has_model(&self) -> bool {
        self.model.is_some()
    }

    pub fn estimate(&self, features: Features) -> (f64, YieldSource) {
        if let Some(model) = &self.model {
            match model.predict(features) {
                Ok(v) => return (v, YieldSource::Model),
                Err(e) => warn!(error = %e, "model prediction failed; using heuristic"),
            }
        }
        let value = self.heuristic.predict(features).unwrap_or(HEURISTIC_FLOOR);
        (value, YieldSource::Heuristic)
    }
}

impl Default for YieldEstimator {
    fn default() -> Self {
        Self::heuristic_only()
    }
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
