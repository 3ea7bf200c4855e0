// src/advisor/mod.rs

use crate::{
    config::{AdvisorConfig, Mode, Strategy},
    dataset::{DatasetStore, Field},
    error::Result,
    localize::localize,
    matcher::{find_best, lookup, Criteria},
    normalize::{normalize, FillValues},
    predictor::YieldEstimator,
    templates::{render, Intent, Language, TemplateBank},
};
use rand::{rngs::StdRng, Rng};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, warn};

/// One advisory request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Query {
    pub intent: String,
    pub language: String,
    #[serde(flatten)]
    pub criteria: Criteria,
}

impl Query {
    pub fn new(intent: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            intent: intent.into(),
            language: language.into(),
            criteria: Criteria::default(),
        }
    }

    pub fn with_criteria(mut self, criteria: Criteria) -> Self {
        self.criteria = criteria;
        self
    }
}

/// Reply used when the pipeline produced nothing worth saying.
pub fn fallback_reply(language: Language) -> &'static str {
    match language {
        Language::En => "Sorry, I didn't understand.",
        Language::Hi => "माफ़ कीजिये, मैं समझ नहीं पाया।",
        Language::Mr => "मला समजले नाही. कृपया साध्या शब्दांत विचारा.",
    }
}

/// Turns a [`Query`] into one localized advisory sentence.
///
/// The dataset is shared; the rng is owned so a seeded advisor replays the
/// same sequence of replies.
pub struct Advisor<R = StdRng> {
    store: Arc<DatasetStore>,
    bank: TemplateBank,
    estimator: YieldEstimator,
    rng: R,
    mode: Mode,
    strategy: Strategy,
}

impl Advisor<StdRng> {
    /// Builtin templates, the configured dataset and model, seeded rng if set.
    pub fn from_config(config: &AdvisorConfig) -> Self {
        Advisor::new(
            Arc::new(DatasetStore::new(&config.dataset_path)),
            TemplateBank::builtin(),
            YieldEstimator::from_path(config.model_path.as_deref()),
            config.rng(),
        )
        .with_mode(config.mode)
        .with_strategy(config.strategy)
    }
}

impl<R: Rng> Advisor<R> {
    pub fn new(
        store: Arc<DatasetStore>,
        bank: TemplateBank,
        estimator: YieldEstimator,
        rng: R,
    ) -> Self {
        Self {
            store,
            bank,
            estimator,
            rng,
            mode: Mode::default(),
            strategy: Strategy::default(),
        }
    }

    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn store(&self) -> &DatasetStore {
        &self.store
    }

    /// Select, normalize, localize and render.
    ///
    /// Lenient mode never fails: every error along the way has a default and
    /// an empty result becomes [`fallback_reply`]. Strict mode reports missing
    /// datasets, unknown intents or languages and missing placeholders.
    #[tracing::instrument(
        level = "debug",
        skip(self, query),
        fields(intent = %query.intent, language = %query.language)
    )]
    pub fn advise(&mut self, query: &Query) -> Result<String> {
        let intent = Intent::resolve(&query.intent, self.mode)?;
        let language = Language::resolve(&query.language, self.mode)?;

        let values = self.fill_values(intent, &query.criteria)?;
        let localized = localize(&values, language);

        let template = match self.bank.pick(intent, language, &mut self.rng) {
            Ok(t) => t,
            Err(e) if self.mode == Mode::Strict => return Err(e),
            Err(e) => {
                warn!(error = %e, "no template available");
                return Ok(fallback_reply(language).to_string());
            }
        };

        let reply = render(template, &localized, self.mode)?;
        if reply.is_empty() {
            debug!("empty reply; using fallback");
            return Ok(fallback_reply(language).to_string());
        }
        Ok(reply)
    }

    /// Template values for `criteria`, before localization. Caller overrides
    /// are already applied.
    pub fn fill_values(&mut self, intent: Intent, criteria: &Criteria) -> Result<FillValues> {
        let dataset = match self.store.load() {
            Ok(d) => d,
            Err(e) if self.mode == Mode::Strict => return Err(e),
            Err(e) => {
                warn!(error = %e, "dataset unavailable; using defaults");
                let mut values = FillValues::defaults();
                values.apply_overrides(criteria);
                return Ok(values);
            }
        };

        let record = match self.strategy {
            Strategy::Narrow => find_best(&dataset, criteria, &mut self.rng),
            Strategy::Tiered => lookup(
                &dataset,
                intent.as_str(),
                criteria.get(Field::District),
                criteria.get(Field::Crop),
            ),
        };

        let mut values = match record {
            Some(r) => normalize(r, &self.estimator),
            None => {
                debug!(criteria = ?criteria, "no row matched");
                FillValues::defaults()
            }
        };
        values.apply_overrides(criteria);
        Ok(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::tests::{sample_dataset, SAMPLE_CSV};
    use crate::error::AdvisoryError;
    use rand::SeedableRng;
    use std::io::Write;
    use tempfile::NamedTempFile;
    use tracing_subscriber::{EnvFilter, FmtSubscriber};

    fn init_test_logging() {
        let subscriber = FmtSubscriber::builder()
            .with_env_filter(
                EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| EnvFilter::new("info,agri_advisor::advisor=debug")),
            )
            .with_test_writer()
            .finish();
        let _ = tracing::subscriber::set_global_default(subscriber);
    }

    fn sample_advisor(seed: u64) -> Advisor {
        Advisor::new(
            Arc::new(DatasetStore::with_dataset(sample_dataset())),
            TemplateBank::builtin(),
            YieldEstimator::heuristic_only(),
            StdRng::seed_from_u64(seed),
        )
    }

    fn missing_advisor(mode: Mode) -> Advisor {
        Advisor::new(
            Arc::new(DatasetStore::new("/no/such/dir/Final_Dataset_2.csv")),
            TemplateBank::builtin(),
            YieldEstimator::from_path(Some(std::path::Path::new("/no/such/model.json"))),
            StdRng::seed_from_u64(3),
        )
        .with_mode(mode)
    }

    fn jodhpur_bajra() -> Criteria {
        Criteria::district_crop(Some("Jodhpur"), Some("Bajra"))
    }

    #[test]
    fn test_yield_reply_uses_matching_row() {
        init_test_logging();
        let mut advisor = sample_advisor(1);
        let reply = advisor
            .advise(&Query::new("yield", "en").with_criteria(jodhpur_bajra()))
            .unwrap();
        assert!(reply.contains("60.0 quintals/acre"), "{reply}");
        assert!(reply.contains("Bajra"), "{reply}");
    }

    #[test]
    fn test_hindi_reply_is_localized() {
        init_test_logging();
        let mut advisor = sample_advisor(2);
        let reply = advisor
            .advise(&Query::new("rainfall", "hi-IN").with_criteria(jodhpur_bajra()))
            .unwrap();
        assert!(reply.contains("जोधपुर"), "{reply}");
        assert!(!reply.contains("Jodhpur"), "{reply}");
    }

    #[test]
    fn test_same_seed_same_replies() {
        let query = Query::new("irrigation", "mr").with_criteria(Criteria {
            district: Some("Kolhapur".into()),
            ..Criteria::default()
        });
        let run = |seed| {
            let mut advisor = sample_advisor(seed);
            (0..10)
                .map(|_| advisor.advise(&query).unwrap())
                .collect::<Vec<_>>()
        };
        assert_eq!(run(11), run(11));
    }

    #[test]
    fn test_overrides_win_over_row() {
        let mut advisor = sample_advisor(4);
        let values = advisor
            .fill_values(Intent::Sowing, &Criteria::district_crop(Some("jodhpur"), Some("bajra")))
            .unwrap();
        // matching row keeps its own casing
        assert_eq!(values.get(Field::District), "Jodhpur");
        assert_eq!(values.get(Field::Crop), "Bajra");
        assert_eq!(values.get(Field::Soil), "Pale Yellow");
        assert_eq!(values.get(Field::Season), "Zaid");

        // tiered selection ignores season, so the override lands on the row
        let mut advisor = sample_advisor(4).with_strategy(Strategy::Tiered);
        let criteria = Criteria {
            season: Some("Kharif".into()),
            ..jodhpur_bajra()
        };
        let values = advisor.fill_values(Intent::Sowing, &criteria).unwrap();
        assert_eq!(values.get(Field::Soil), "Pale Yellow");
        assert_eq!(values.get(Field::Season), "Kharif");
    }

    #[test]
    fn test_season_criterion_without_season_column() {
        let mut advisor = sample_advisor(4);
        let criteria = Criteria {
            district: Some("jodhpur".into()),
            season: Some("Kharif".into()),
            ..Criteria::default()
        };
        let values = advisor.fill_values(Intent::Sowing, &criteria).unwrap();
        // no row survives, so defaults carry the caller's spelling
        assert_eq!(values.get(Field::District), "jodhpur");
        assert_eq!(values.get(Field::Soil), "soil");
        assert_eq!(values.get(Field::Season), "Kharif");
    }

    #[test]
    fn test_no_match_uses_defaults_with_overrides() {
        let mut advisor = sample_advisor(5);
        let criteria = Criteria::district_crop(Some("Satara"), Some("Rice"));
        let values = advisor.fill_values(Intent::Pest, &criteria).unwrap();
        assert_eq!(values.get(Field::District), "Satara");
        assert_eq!(values.get(Field::Crop), "Rice");
        assert_eq!(values.get(Field::Soil), "soil");
    }

    #[test]
    fn test_tiered_strategy_falls_back_to_district() {
        let mut advisor = sample_advisor(6).with_strategy(Strategy::Tiered);
        let criteria = Criteria::district_crop(Some("Pune"), Some("Cotton"));
        let values = advisor.fill_values(Intent::Fertilizer, &criteria).unwrap();
        assert_eq!(values.get(Field::Fertilizer), "Compost");
        assert_eq!(values.get(Field::Crop), "Cotton");

        // nothing supplied: first row
        let values = advisor.fill_values(Intent::Fertilizer, &Criteria::default()).unwrap();
        assert_eq!(values.get(Field::Crop), "Sugarcane");
    }

    #[test]
    fn test_strict_surfaces_errors() {
        let mut advisor = missing_advisor(Mode::Strict);
        assert!(matches!(
            advisor.advise(&Query::new("yield", "en")),
            Err(AdvisoryError::DatasetNotFound { .. })
        ));

        let mut advisor = sample_advisor(7).with_mode(Mode::Strict);
        assert!(matches!(
            advisor.advise(&Query::new("harvest", "en")),
            Err(AdvisoryError::UnsupportedIntent(_))
        ));
        assert!(matches!(
            advisor.advise(&Query::new("yield", "ta")),
            Err(AdvisoryError::UnsupportedLanguage(_))
        ));
        assert!(advisor.advise(&Query::new("yield", "en")).is_ok());
    }

    #[test]
    fn test_strict_render_error_for_custom_template() {
        let mut bank = TemplateBank::default();
        bank.insert(Intent::Pest, Language::En, ["Check {crop} for {beetles}."]);
        let mut advisor = Advisor::new(
            Arc::new(DatasetStore::with_dataset(sample_dataset())),
            bank,
            YieldEstimator::heuristic_only(),
            StdRng::seed_from_u64(8),
        );
        let reply = advisor.advise(&Query::new("pest", "en")).unwrap();
        assert!(reply.contains("[template error: missing beetles]"), "{reply}");

        let mut advisor = advisor.with_mode(Mode::Strict);
        match advisor.advise(&Query::new("pest", "en")) {
            Err(AdvisoryError::Render { key }) => assert_eq!(key, "beetles"),
            other => panic!("expected render error, got {other:?}"),
        }
    }

    #[test]
    fn test_lenient_always_replies() {
        init_test_logging();
        let mut advisor = missing_advisor(Mode::Lenient);
        for intent in Intent::ALL {
            for lang in Language::ALL {
                let reply = advisor
                    .advise(&Query::new(intent.as_str(), lang.code()))
                    .unwrap();
                assert!(!reply.trim().is_empty(), "{intent}/{lang}");
                assert!(!reply.contains('{'), "{reply}");
            }
        }
        let reply = advisor.advise(&Query::new("???", "klingon")).unwrap();
        assert!(!reply.is_empty());
    }

    #[test]
    fn test_empty_bank_falls_back_to_sorry() {
        let mut advisor = Advisor::new(
            Arc::new(DatasetStore::with_dataset(sample_dataset())),
            TemplateBank::default(),
            YieldEstimator::heuristic_only(),
            StdRng::seed_from_u64(9),
        );
        let reply = advisor.advise(&Query::new("sowing", "mr")).unwrap();
        assert_eq!(reply, fallback_reply(Language::Mr));

        let mut bank = TemplateBank::default();
        bank.insert(Intent::Sowing, Language::En, ["N/A"]);
        let mut advisor = Advisor::new(
            Arc::new(DatasetStore::with_dataset(sample_dataset())),
            bank,
            YieldEstimator::heuristic_only(),
            StdRng::seed_from_u64(9),
        );
        assert_eq!(
            advisor.advise(&Query::new("sowing", "en")).unwrap(),
            fallback_reply(Language::En)
        );
    }

    #[test]
    fn test_from_config_reads_dataset_once() -> anyhow::Result<()> {
        let mut tmp = NamedTempFile::new()?;
        tmp.write_all(SAMPLE_CSV.as_bytes())?;
        tmp.flush()?;

        let config = AdvisorConfig {
            dataset_path: tmp.path().to_path_buf(),
            model_path: None,
            mode: Mode::Strict,
            seed: Some(21),
            ..AdvisorConfig::default()
        };
        let mut advisor = Advisor::from_config(&config);
        for _ in 0..5 {
            advisor.advise(&Query::new("fertilizer", "en").with_criteria(jodhpur_bajra()))?;
        }
        assert_eq!(advisor.store().reads(), 1);
        Ok(())
    }

    #[test]
    fn test_query_from_yaml() {
        let yaml = "intent: pest\nlanguage: hi\ndistrict: Pune\ncrop: Maize\n";
        let q: Query = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(q.intent, "pest");
        assert_eq!(q.criteria.district.as_deref(), Some("Pune"));
        assert_eq!(q.criteria.crop.as_deref(), Some("Maize"));
    }
}
