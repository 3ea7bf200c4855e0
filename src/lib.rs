pub mod advisor;
pub mod config;
pub mod dataset;
pub mod error;
pub mod localize;
pub mod matcher;
pub mod normalize;
pub mod predictor;
pub mod templates;

pub use advisor::{fallback_reply, Advisor, Query};
pub use config::{AdvisorConfig, Mode, Strategy};
pub use dataset::{Dataset, DatasetStore, Field, Record};
pub use error::{AdvisoryError, Result};
pub use matcher::Criteria;
pub use normalize::FillValues;
pub use predictor::{YieldEstimator, YieldPredictor};
pub use templates::{Intent, Language, TemplateBank};
