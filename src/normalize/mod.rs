// src/normalize/mod.rs

pub mod season;

use crate::{
    dataset::{is_sentinel, Field, Record},
    matcher::Criteria,
    predictor::{HeuristicPredictor, YieldEstimator, YieldSource},
};
use std::collections::BTreeMap;
use tracing::debug;

pub use season::{parse_month, season_from_climate, season_from_month};

/// Display value used when a field is absent or a sentinel.
pub fn default_display(field: Field) -> &'static str {
    match field {
        Field::District => "your district",
        Field::Crop => "your crop",
        Field::Soil => "soil",
        Field::Rainfall => "not recorded",
        Field::Fertilizer => "fertilizer",
        Field::Nitrogen => "N",
        Field::Phosphorus => "P",
        Field::Potassium => "K",
        Field::Ph => "7",
        Field::Temperature => "25",
        Field::Pest => "not observed",
        Field::Season => "current season",
        Field::Yield => NO_YIELD,
        Field::Confidence => "Medium",
    }
}

const NO_YIELD: &str = "Data not available";
const DEFAULT_RAINFALL: f64 = 0.0;
const DEFAULT_TEMPERATURE: f64 = 25.0;

/// Complete set of template values: every [`Field`] always has a
/// non-sentinel display string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FillValues {
    values: BTreeMap<Field, String>,
}

impl FillValues {
    /// All documented defaults, with the yield estimated from default inputs.
    pub fn defaults() -> Self {
        let values = Field::ALL
            .iter()
            .map(|&f| (f, default_display(f).to_string()))
            .collect();
        let mut fv = Self { values };
        let estimate =
            HeuristicPredictor.estimate(DEFAULT_RAINFALL, DEFAULT_TEMPERATURE, 0.0);
        fv.values
            .insert(Field::Yield, yield_text(estimate, YieldSource::Heuristic));
        fv
    }

    pub fn get(&self, field: Field) -> &str {
        self.values
            .get(&field)
            .map(String::as_str)
            .unwrap_or_else(|| default_display(field))
    }

    /// Replace a value. Sentinels are ignored so the set stays complete.
    pub fn set(&mut self, field: Field, value: impl Into<String>) -> bool {
        let value = value.into();
        if is_sentinel(&value) {
            return false;
        }
        self.values.insert(field, value.trim().to_string());
        true
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, &str)> {
        self.values.iter().map(|(f, v)| (*f, v.as_str()))
    }

    /// Caller-supplied criteria win over what the dataset row says. A value
    /// equal to the current one up to case keeps the dataset spelling.
    pub fn apply_overrides(&mut self, criteria: &Criteria) {
        for (field, value) in criteria.active() {
            if self.get(field).to_lowercase() == value.to_lowercase() {
                continue;
            }
            if self.set(field, value) {
                debug!(%field, value, "applied caller override");
            }
        }
    }
}

impl Default for FillValues {
    fn default() -> Self {
        Self::defaults()
    }
}

/// Map a record to display values, deriving season, yield and confidence
/// where the dataset leaves them out.
pub fn normalize(record: &Record, estimator: &YieldEstimator) -> FillValues {
    let mut fv = FillValues::defaults();
    for field in Field::ALL {
        if let Some(v) = record.get(field) {
            fv.set(field, v);
        }
    }

    let rainfall = record.number(Field::Rainfall).unwrap_or(DEFAULT_RAINFALL);
    let temperature = record
        .number(Field::Temperature)
        .unwrap_or(DEFAULT_TEMPERATURE);
    let nitrogen = record.number(Field::Nitrogen);
    let phosphorus = record.number(Field::Phosphorus);
    let potassium = record.number(Field::Potassium);

    let season = match record.season.as_deref() {
        Some(raw) => match parse_month(raw) {
            Some(month) => season_from_month(month).to_string(),
            None => raw.to_string(),
        },
        None => season_from_climate(rainfall, temperature).to_string(),
    };
    if !fv.set(Field::Season, season) {
        fv.values
            .insert(Field::Season, default_display(Field::Season).to_string());
    }

    if record.yield_value.is_none() {
        let features = [
            rainfall,
            temperature,
            nitrogen.unwrap_or(0.0),
            phosphorus.unwrap_or(0.0),
            potassium.unwrap_or(0.0),
        ];
        let (value, source) = estimator.estimate(features);
        fv.values.insert(Field::Yield, yield_text(value, source));
    }

    if record.confidence.is_none() {
        fv.set(Field::Confidence, confidence(nitrogen, phosphorus, potassium));
    }

    fv
}

/// "High" inside the balanced NPK band, "Medium" when all three are known and
/// non-zero, "Low" otherwise.
pub fn confidence(
    nitrogen: Option<f64>,
    phosphorus: Option<f64>,
    potassium: Option<f64>,
) -> &'static str {
    match (nitrogen, phosphorus, potassium) {
        (Some(n), Some(p), Some(k))
            if (100.0..=200.0).contains(&n)
                && (10.0..=30.0).contains(&p)
                && (150.0..=300.0).contains(&k) =>
        {
            "High"
        }
        (Some(n), Some(p), Some(k)) if n != 0.0 && p != 0.0 && k != 0.0 => "Medium",
        _ => "Low",
    }
}

/// Display text for a yield estimate.
pub fn yield_text(value: f64, source: YieldSource) -> String {
    if !value.is_finite() || value <= 0.0 {
        return NO_YIELD.to_string();
    }
    match source {
        YieldSource::Model => format!("{:.2} quintals/acre", value),
        YieldSource::Heuristic => format!("{:.1} quintals/acre", value),
    }
}
