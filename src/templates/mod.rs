// src/templates/mod.rs

mod bank;
pub mod render;

pub use render::{clean_reply, placeholders, render, Placeholders};

use crate::{
    config::Mode,
    error::{AdvisoryError, Result},
};
use rand::{seq::SliceRandom, Rng};
use std::{collections::HashMap, fmt, str::FromStr};
use tracing::debug;

/// Advisory category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Intent {
    Irrigation,
    Fertilizer,
    Pest,
    Sowing,
    Yield,
    Rainfall,
}

impl Intent {
    pub const ALL: [Intent; 6] = [
        Intent::Irrigation,
        Intent::Fertilizer,
        Intent::Pest,
        Intent::Sowing,
        Intent::Yield,
        Intent::Rainfall,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Intent::Irrigation => "irrigation",
            Intent::Fertilizer => "fertilizer",
            Intent::Pest => "pest",
            Intent::Sowing => "sowing",
            Intent::Yield => "yield",
            Intent::Rainfall => "rainfall",
        }
    }

    /// Strict callers get `UnsupportedIntent`; lenient ones fall back to irrigation.
    pub fn resolve(raw: &str, mode: Mode) -> Result<Intent> {
        match (raw.parse::<Intent>(), mode) {
            (Ok(i), _) => Ok(i),
            (Err(e), Mode::Strict) => Err(e),
            (Err(_), Mode::Lenient) => {
                debug!(raw, "unknown intent; defaulting to irrigation");
                Ok(Intent::Irrigation)
            }
        }
    }
}

impl FromStr for Intent {
    type Err = AdvisoryError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_lowercase();
        Intent::ALL
            .iter()
            .copied()
            .find(|i| i.as_str() == wanted)
            .ok_or_else(|| AdvisoryError::UnsupportedIntent(s.trim().to_string()))
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Output language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Language {
    En,
    Hi,
    Mr,
}

impl Language {
    pub const ALL: [Language; 3] = [Language::En, Language::Hi, Language::Mr];

    pub fn code(self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Hi => "hi",
            Language::Mr => "mr",
        }
    }

    /// Strict callers get `UnsupportedLanguage`; lenient ones fall back to English.
    pub fn resolve(raw: &str, mode: Mode) -> Result<Language> {
        match (raw.parse::<Language>(), mode) {
            (Ok(l), _) => Ok(l),
            (Err(e), Mode::Strict) => Err(e),
            (Err(_), Mode::Lenient) => {
                debug!(raw, "unsupported language; defaulting to en");
                Ok(Language::En)
            }
        }
    }
}

impl FromStr for Language {
    type Err = AdvisoryError;

    /// Accepts codes and locale tags (`hi`, `hi-IN`, `mr_IN`) and English names.
    fn from_str(s: &str) -> Result<Self> {
        let lower = s.trim().to_lowercase();
        let primary = lower.split(|c: char| c == '-' || c == '_').next().unwrap_or("");
        match primary {
            "en" | "english" => Ok(Language::En),
            "hi" | "hindi" => Ok(Language::Hi),
            "mr" | "marathi" => Ok(Language::Mr),
            _ => Err(AdvisoryError::UnsupportedLanguage(s.trim().to_string())),
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Phrasing variants per (intent, language).
#[derive(Debug, Clone, Default)]
pub struct TemplateBank {
    variants: HashMap<(Intent, Language), Vec<String>>,
}

impl TemplateBank {
    pub fn builtin() -> Self {
        let mut out = Self::default();
        for intent in Intent::ALL {
            for lang in Language::ALL {
                out.insert(
                    intent,
                    lang,
                    bank::builtin_variants(intent, lang)
                        .iter()
                        .map(|s| s.to_string()),
                );
            }
        }
        out
    }

    pub fn insert<I, S>(&mut self, intent: Intent, language: Language, templates: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.variants
            .insert((intent, language), templates.into_iter().map(Into::into).collect());
    }

    /// The list for (intent, language), or the English list when that pair is absent.
    pub fn variants(&self, intent: Intent, language: Language) -> &[String] {
        self.variants
            .get(&(intent, language))
            .filter(|v| !v.is_empty())
            .or_else(|| self.variants.get(&(intent, Language::En)))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Uniformly random variant for (intent, language).
    pub fn pick<R: Rng + ?Sized>(
        &self,
        intent: Intent,
        language: Language,
        rng: &mut R,
    ) -> Result<&str> {
        self.variants(intent, language)
            .choose(rng)
            .map(String::as_str)
            .ok_or_else(|| AdvisoryError::UnsupportedIntent(intent.to_string()))
    }
}
