use agri_advisor::{
    config::{AdvisorConfig, Mode, Strategy},
    matcher::Criteria,
    Advisor, Query,
};
use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(author, version, about = "Localized crop advisory from a district dataset")]
struct Args {
    /// irrigation, fertilizer, pest, sowing, yield or rainfall
    #[arg(short, long, default_value = "irrigation")]
    intent: String,
    /// en, hi or mr (locale tags like hi-IN are accepted)
    #[arg(short, long, default_value = "en")]
    lang: String,

    #[arg(long)]
    district: Option<String>,
    #[arg(long)]
    crop: Option<String>,
    #[arg(long)]
    soil: Option<String>,
    #[arg(long)]
    fertilizer: Option<String>,
    #[arg(long)]
    rainfall: Option<String>,
    #[arg(long)]
    pest: Option<String>,
    #[arg(long)]
    season: Option<String>,
    #[arg(long)]
    temperature: Option<String>,
    #[arg(long)]
    nitrogen: Option<String>,
    #[arg(long)]
    phosphorus: Option<String>,

    /// YAML config; flags below override it
    #[arg(short, long)]
    config: Option<PathBuf>,
    #[arg(long)]
    dataset: Option<PathBuf>,
    #[arg(long)]
    model: Option<PathBuf>,
    #[arg(long)]
    seed: Option<u64>,
    /// Fail instead of falling back to defaults
    #[arg(long)]
    strict: bool,
    /// Use the district/crop tiered lookup instead of criteria narrowing
    #[arg(long)]
    tiered: bool,
    /// Print the districts and crops in the dataset and exit
    #[arg(long)]
    list: bool,
}

impl Args {
    fn config(&self) -> Result<AdvisorConfig> {
        let mut cfg = match &self.config {
            Some(path) => AdvisorConfig::from_yaml_file(path)
                .with_context(|| format!("loading config {}", path.display()))?,
            None => AdvisorConfig::default(),
        };
        if let Some(p) = &self.dataset {
            cfg.dataset_path = p.clone();
        }
        if let Some(p) = &self.model {
            cfg.model_path = Some(p.clone());
        }
        if self.seed.is_some() {
            cfg.seed = self.seed;
        }
        if self.strict {
            cfg.mode = Mode::Strict;
        }
        if self.tiered {
            cfg.strategy = Strategy::Tiered;
        }
        Ok(cfg)
    }

    fn query(&self) -> Query {
        Query::new(&self.intent, &self.lang).with_criteria(Criteria {
            district: self.district.clone(),
            crop: self.crop.clone(),
            soil: self.soil.clone(),
            fertilizer: self.fertilizer.clone(),
            rainfall: self.rainfall.clone(),
            pest: self.pest.clone(),
            season: self.season.clone(),
            temperature: self.temperature.clone(),
            nitrogen: self.nitrogen.clone(),
            phosphorus: self.phosphorus.clone(),
        })
    }
}

fn main() -> Result<()> {
    // ─── 1) init logging (stderr, stdout carries the reply) ──────────
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_writer(std::io::stderr)
        .init();

    // ─── 2) resolve configuration ────────────────────────────────────
    let args = Args::parse();
    let cfg = args.config()?;
    info!(
        dataset = %cfg.dataset_path.display(),
        mode = ?cfg.mode,
        strategy = ?cfg.strategy,
        "startup"
    );

    let mut advisor = Advisor::from_config(&cfg);

    // ─── 3) list or advise ───────────────────────────────────────────
    if args.list {
        let dataset = advisor
            .store()
            .load()
            .with_context(|| format!("loading {}", cfg.dataset_path.display()))?;
        println!("districts: {}", dataset.districts().join(", "));
        println!("crops: {}", dataset.crops().join(", "));
        return Ok(());
    }

    let reply = advisor.advise(&args.query())?;
    println!("{}", reply);
    Ok(())
}
