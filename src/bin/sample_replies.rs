use agri_advisor::{
    config::Mode,
    matcher::Criteria,
    Advisor, AdvisorConfig, Intent, Language, Query,
};
use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing::info;

/// Print one reply for every intent in every language.
#[derive(Parser)]
#[command(author, version, about = "Render a sample reply per intent and language")]
struct Args {
    #[arg(long, default_value = "Final_Dataset_2.csv")]
    dataset: PathBuf,
    #[arg(long, default_value = "Jodhpur")]
    district: String,
    #[arg(long, default_value = "Bajra")]
    crop: String,
    #[arg(long, default_value_t = 42)]
    seed: u64,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter("info")
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let cfg = AdvisorConfig {
        dataset_path: args.dataset.clone(),
        seed: Some(args.seed),
        mode: Mode::Lenient,
        ..AdvisorConfig::default()
    };
    let mut advisor = Advisor::from_config(&cfg);
    let criteria = Criteria::district_crop(Some(&args.district), Some(&args.crop));

    for intent in Intent::ALL {
        for lang in Language::ALL {
            let query = Query::new(intent.as_str(), lang.code()).with_criteria(criteria.clone());
            let reply = advisor.advise(&query)?;
            println!("[{}/{}] {}", intent, lang, reply);
        }
    }
    info!("done");
    Ok(())
}
