// src/matcher/mod.rs

use crate::dataset::{Dataset, Field, Record};
use rand::{seq::SliceRandom, Rng};
use serde::Deserialize;
use tracing::debug;

/// Optional filters supplied by the caller. Empty or whitespace-only values
/// impose no constraint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Criteria {
    pub district: Option<String>,
    pub crop: Option<String>,
    pub soil: Option<String>,
    pub fertilizer: Option<String>,
    pub rainfall: Option<String>,
    pub pest: Option<String>,
    pub season: Option<String>,
    pub temperature: Option<String>,
    pub nitrogen: Option<String>,
    pub phosphorus: Option<String>,
}

impl Criteria {
    /// Filter order used by [`find_best`].
    pub const ORDER: [Field; 10] = [
        Field::District,
        Field::Crop,
        Field::Soil,
        Field::Fertilizer,
        Field::Rainfall,
        Field::Pest,
        Field::Season,
        Field::Temperature,
        Field::Nitrogen,
        Field::Phosphorus,
    ];

    pub fn district_crop(district: Option<&str>, crop: Option<&str>) -> Self {
        Self {
            district: district.map(str::to_string),
            crop: crop.map(str::to_string),
            ..Self::default()
        }
    }

    /// The trimmed criterion for `field`, `None` when unset or blank.
    pub fn get(&self, field: Field) -> Option<&str> {
        let slot = match field {
            Field::District => &self.district,
            Field::Crop => &self.crop,
            Field::Soil => &self.soil,
            Field::Fertilizer => &self.fertilizer,
            Field::Rainfall => &self.rainfall,
            Field::Pest => &self.pest,
            Field::Season => &self.season,
            Field::Temperature => &self.temperature,
            Field::Nitrogen => &self.nitrogen,
            Field::Phosphorus => &self.phosphorus,
            _ => return None,
        };
        slot.as_deref().map(str::trim).filter(|v| !v.is_empty())
    }

    /// Non-empty criteria in filter order.
    pub fn active(&self) -> impl Iterator<Item = (Field, &str)> + '_ {
        Self::ORDER
            .iter()
            .filter_map(move |&f| self.get(f).map(|v| (f, v)))
    }

    pub fn is_empty(&self) -> bool {
        self.active().next().is_none()
    }
}

// Compares the raw cell, so "0" or "N/A" can be asked for. A missing
// column compares as the empty string.
fn field_matches(record: &Record, field: Field, wanted: &str) -> bool {
    let have = record.raw(field).unwrap_or("").trim();
    have.to_lowercase() == wanted.trim().to_lowercase()
}

/// Narrow the dataset by every active criterion, then pick one survivor at
/// random. Returns `None` as soon as a criterion eliminates every candidate.
pub fn find_best<'a, R: Rng + ?Sized>(
    dataset: &'a Dataset,
    criteria: &Criteria,
    rng: &mut R,
) -> Option<&'a Record> {
    let mut candidates: Vec<&Record> = dataset.records().iter().collect();
    if candidates.is_empty() {
        return None;
    }

    for (field, wanted) in criteria.active() {
        candidates.retain(|r| field_matches(r, field, wanted));
        debug!(%field, wanted, remaining = candidates.len(), "narrowed candidates");
        if candidates.is_empty() {
            return None;
        }
    }

    candidates.choose(rng).copied()
}

/// Tiered district/crop lookup: both, district only, crop only, then the
/// first record. `None` only when the dataset is empty.
///
/// `intent` does not influence selection.
pub fn lookup<'a>(
    dataset: &'a Dataset,
    intent: &str,
    district: Option<&str>,
    crop: Option<&str>,
) -> Option<&'a Record> {
    let district = district.map(str::trim).filter(|d| !d.is_empty());
    let crop = crop.map(str::trim).filter(|c| !c.is_empty());
    let records = dataset.records();

    let is = |r: &Record, field: Field, wanted: Option<&str>| {
        wanted.map_or(false, |w| field_matches(r, field, w))
    };

    let hit = records
        .iter()
        .find(|r| is(r, Field::District, district) && is(r, Field::Crop, crop))
        .map(|r| (r, "district+crop"))
        .or_else(|| {
            records
                .iter()
                .find(|r| is(r, Field::District, district))
                .map(|r| (r, "district"))
        })
        .or_else(|| {
            records
                .iter()
                .find(|r| is(r, Field::Crop, crop))
                .map(|r| (r, "crop"))
        })
        .or_else(|| records.first().map(|r| (r, "first row")));

    if let Some((_, tier)) = hit {
        debug!(intent, ?district, ?crop, tier, "tiered lookup matched");
    }
    hit.map(|(r, _)| r)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::tests::sample_dataset;
    use rand::{rngs::StdRng, SeedableRng};
    use std::collections::HashSet;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(0x_d00d_f00d)
    }

    #[test]
    fn test_empty_criteria_returns_some_row() {
        let ds = sample_dataset();
        assert!(find_best(&ds, &Criteria::default(), &mut rng()).is_some());
    }

    #[test]
    fn test_case_insensitive_trimmed_match() {
        let ds = sample_dataset();
        let c = Criteria {
            district: Some("  jodhpur ".into()),
            crop: Some("BAJRA".into()),
            ..Criteria::default()
        };
        let rec = find_best(&ds, &c, &mut rng()).expect("match");
        assert_eq!(rec.crop.as_deref(), Some("Bajra"));
    }

    #[test]
    fn test_short_circuits_to_none() {
        let ds = sample_dataset();
        let c = Criteria {
            district: Some("Satara".into()),
            crop: Some("Maize".into()),
            ..Criteria::default()
        };
        assert!(find_best(&ds, &c, &mut rng()).is_none());

        // later criteria never re-admit rows removed earlier
        let c = Criteria {
            district: Some("Pune".into()),
            crop: Some("Bajra".into()),
            ..Criteria::default()
        };
        assert!(find_best(&ds, &c, &mut rng()).is_none());
    }

    #[test]
    fn test_result_satisfies_every_criterion() {
        let ds = sample_dataset();
        let cases = vec![
            Criteria::district_crop(Some("Kolhapur"), None),
            Criteria::district_crop(None, Some("maize")),
            Criteria {
                soil: Some("light brown".into()),
                fertilizer: Some("mop".into()),
                ..Criteria::default()
            },
            Criteria {
                rainfall: Some("1000".into()),
                temperature: Some("20".into()),
                nitrogen: Some("80".into()),
                phosphorus: Some("40".into()),
                ..Criteria::default()
            },
        ];
        let mut r = rng();
        for c in cases {
            for _ in 0..20 {
                let rec = find_best(&ds, &c, &mut r).expect("match");
                for (field, wanted) in c.active() {
                    assert!(
                        rec.get(field).unwrap_or("").eq_ignore_ascii_case(wanted),
                        "{field} should equal {wanted}"
                    );
                }
            }
        }
    }

    #[test]
    fn test_random_choice_covers_candidates() {
        let ds = sample_dataset();
        let c = Criteria::district_crop(Some("Kolhapur"), None);
        let mut r = rng();
        let seen: HashSet<_> = (0..200)
            .filter_map(|_| find_best(&ds, &c, &mut r))
            .filter_map(|rec| rec.crop.clone())
            .collect();
        assert_eq!(seen.len(), 2);
    }

    #[test]
    fn test_seeded_choice_is_reproducible() {
        let ds = sample_dataset();
        let c = Criteria::district_crop(Some("Jodhpur"), None);
        let a: Vec<_> = {
            let mut r = rng();
            (0..10).map(|_| find_best(&ds, &c, &mut r).cloned()).collect()
        };
        let b: Vec<_> = {
            let mut r = rng();
            (0..10).map(|_| find_best(&ds, &c, &mut r).cloned()).collect()
        };
        assert_eq!(a, b);
    }

    #[test]
    fn test_blank_criterion_is_ignored() {
        let ds = sample_dataset();
        let c = Criteria {
            district: Some("   ".into()),
            crop: Some("Jowar".into()),
            ..Criteria::default()
        };
        assert!(!c.is_empty());
        assert_eq!(c.active().count(), 1);
        let rec = find_best(&ds, &c, &mut rng()).expect("match");
        assert_eq!(rec.district.as_deref(), Some("Kolhapur"));
    }

    #[test]
    fn test_sentinel_criteria_match_raw_cells() {
        let csv = "District,Crop,Nitrogen,Pest\nPune,Maize,0,N/A\nPune,Jowar,50,Aphids\n";
        let ds = Dataset::from_reader(csv.as_bytes()).unwrap();
        let mut r = rng();

        let c = Criteria {
            nitrogen: Some("0".into()),
            ..Criteria::default()
        };
        let rec = find_best(&ds, &c, &mut r).expect("nitrogen 0 row");
        assert_eq!(rec.crop.as_deref(), Some("Maize"));

        let c = Criteria {
            pest: Some("n/a".into()),
            ..Criteria::default()
        };
        let rec = find_best(&ds, &c, &mut r).expect("pest N/A row");
        assert_eq!(rec.crop.as_deref(), Some("Maize"));
        // display values still drop the sentinels
        assert_eq!(rec.nitrogen, None);
        assert_eq!(rec.pest, None);
    }

    #[test]
    fn test_criterion_on_missing_column_matches_nothing() {
        let ds = sample_dataset();
        let c = Criteria {
            district: Some("Jodhpur".into()),
            season: Some("Kharif".into()),
            ..Criteria::default()
        };
        assert!(find_best(&ds, &c, &mut rng()).is_none());
    }

    #[test]
    fn test_empty_dataset() {
        let ds = Dataset::default();
        assert!(find_best(&ds, &Criteria::default(), &mut rng()).is_none());
        assert!(lookup(&ds, "yield", Some("Pune"), None).is_none());
    }

    #[test]
    fn test_lookup_tiers() {
        let ds = sample_dataset();
        let crop_of = |r: Option<&Record>| r.and_then(|r| r.crop.clone());

        // 1) district + crop
        assert_eq!(
            crop_of(lookup(&ds, "yield", Some("Jodhpur"), Some("maize"))),
            Some("Maize".to_string())
        );
        // 2) district only: first Jodhpur row
        let rec = lookup(&ds, "yield", Some("Jodhpur"), Some("Wheat")).unwrap();
        assert_eq!(rec.crop.as_deref(), Some("Bajra"));
        // 3) crop only
        let rec = lookup(&ds, "yield", Some("Satara"), Some("Maize")).unwrap();
        assert_eq!(rec.district.as_deref(), Some("Jodhpur"));
        // 4) first row
        let rec = lookup(&ds, "yield", Some("Satara"), Some("Wheat")).unwrap();
        assert_eq!(rec.crop.as_deref(), Some("Sugarcane"));
        let rec = lookup(&ds, "yield", None, None).unwrap();
        assert_eq!(rec.crop.as_deref(), Some("Sugarcane"));
    }
}
