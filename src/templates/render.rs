// src/templates/render.rs

use crate::{
    config::Mode,
    dataset::Field,
    error::{AdvisoryError, Result},
    normalize::FillValues,
};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;
use tracing::warn;

static PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{([a-z_]+)\}").expect("placeholder regex"));

/// Leftover "no value" tokens removed after substitution.
static RESIDUE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\bN/A\b|\bUnknown\b|\bnot recorded\b|\bNone\b|\bnull\b").expect("residue regex")
});

static SPACES: Lazy<Regex> = Lazy::new(|| Regex::new(r" {2,}").expect("spaces regex"));

/// Anything that can answer "what is the value of `{name}`?".
pub trait Placeholders {
    fn placeholder(&self, name: &str) -> Option<&str>;
}

impl Placeholders for FillValues {
    fn placeholder(&self, name: &str) -> Option<&str> {
        Field::from_placeholder(name).map(|f| self.get(f))
    }
}

impl Placeholders for HashMap<String, String> {
    fn placeholder(&self, name: &str) -> Option<&str> {
        self.get(name).map(String::as_str)
    }
}

impl Placeholders for HashMap<&str, &str> {
    fn placeholder(&self, name: &str) -> Option<&str> {
        self.get(name).copied()
    }
}

/// Names of every placeholder in `template`, in order of appearance.
pub fn placeholders(template: &str) -> Vec<&str> {
    PLACEHOLDER
        .captures_iter(template)
        .filter_map(|c| c.get(1).map(|m| m.as_str()))
        .collect()
}

/// Fill `template` from `values`, then clean the result.
///
/// Strict mode fails on the first absent placeholder; lenient mode writes an
/// inline `[template error: missing <key>]` and keeps going.
pub fn render<P: Placeholders + ?Sized>(template: &str, values: &P, mode: Mode) -> Result<String> {
    let mut out = String::with_capacity(template.len() + 64);
    let mut last = 0;

    for caps in PLACEHOLDER.captures_iter(template) {
        let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        out.push_str(&template[last..whole.start()]);
        match values.placeholder(name.as_str()) {
            Some(v) => out.push_str(v),
            None => {
                let err = AdvisoryError::Render {
                    key: name.as_str().to_string(),
                };
                if mode == Mode::Strict {
                    return Err(err);
                }
                warn!(key = name.as_str(), "placeholder missing; rendering inline diagnostic");
                out.push('[');
                out.push_str(&err.to_string());
                out.push(']');
            }
        }
        last = whole.end();
    }
    out.push_str(&template[last..]);

    Ok(clean_reply(&out))
}

/// Strip residual sentinel tokens, collapse repeated spaces, trim.
pub fn clean_reply(text: &str) -> String {
    let stripped = RESIDUE.replace_all(text, "");
    SPACES.replace_all(&stripped, " ").trim().to_string()
}
