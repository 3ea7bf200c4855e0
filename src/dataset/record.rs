// src/dataset/record.rs

use std::fmt;

/// Textual values that mean "absent", compared case-insensitively after trim.
const SENTINELS: &[&str] = &["n/a", "na", "unknown", "null", "none", "0", "nan", ""];

/// True if `raw` carries no usable value.
pub fn is_sentinel(raw: &str) -> bool {
    let v = raw.trim();
    SENTINELS.iter().any(|s| v.eq_ignore_ascii_case(s))
}

/// Normalize a header cell: trim, lower-case, spaces → underscores.
pub fn normalize_key(raw: &str) -> String {
    raw.trim().to_lowercase().replace(' ', "_")
}

/// The semantic fields every advisory can reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    District,
    Crop,
    Soil,
    Rainfall,
    Fertilizer,
    Nitrogen,
    Phosphorus,
    Potassium,
    Ph,
    Temperature,
    Pest,
    Season,
    Yield,
    Confidence,
}

impl Field {
    pub const ALL: [Field; 14] = [
        Field::District,
        Field::Crop,
        Field::Soil,
        Field::Rainfall,
        Field::Fertilizer,
        Field::Nitrogen,
        Field::Phosphorus,
        Field::Potassium,
        Field::Ph,
        Field::Temperature,
        Field::Pest,
        Field::Season,
        Field::Yield,
        Field::Confidence,
    ];

    /// Name used for this field inside `{…}` template placeholders.
    pub fn placeholder(self) -> &'static str {
        match self {
            Field::District => "district",
            Field::Crop => "crop",
            Field::Soil => "soil",
            Field::Rainfall => "rainfall",
            Field::Fertilizer => "fertilizer",
            Field::Nitrogen => "nitrogen",
            Field::Phosphorus => "phosphorus",
            Field::Potassium => "potassium",
            Field::Ph => "ph",
            Field::Temperature => "temperature",
            Field::Pest => "pest",
            Field::Season => "season",
            Field::Yield => "yield",
            Field::Confidence => "confidence",
        }
    }

    /// Normalized column names that may carry this field, in priority order.
    pub fn aliases(self) -> &'static [&'static str] {
        match self {
            Field::District => &["district_name", "district"],
            Field::Crop => &["crop"],
            Field::Soil => &["soil_color", "soil"],
            Field::Rainfall => &["rainfall", "precipitation", "precipitationsuminches"],
            Field::Fertilizer => &["fertilizer"],
            Field::Nitrogen => &["nitrogen"],
            Field::Phosphorus => &["phosphorus", "phosphorous"],
            Field::Potassium => &["potassium"],
            Field::Ph => &["ph", "p_h"],
            Field::Temperature => &["temperature", "tempavgf", "temphighf", "templowf"],
            Field::Pest => &["pest", "events"],
            Field::Season => &["season"],
            Field::Yield => &["yield"],
            Field::Confidence => &["confidence"],
        }
    }

    pub fn from_placeholder(name: &str) -> Option<Field> {
        Field::ALL.iter().copied().find(|f| f.placeholder() == name)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.placeholder())
    }
}

/// One dataset line: normalized column name → trimmed value, in header order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row {
    cells: Vec<(String, String)>,
}

impl Row {
    pub fn new(cells: Vec<(String, String)>) -> Self {
        Self { cells }
    }

    pub fn get(&self, column: &str) -> Option<&str> {
        self.cells
            .iter()
            .find(|(k, _)| k == column)
            .map(|(_, v)| v.as_str())
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// A row after alias resolution. Each field holds the first alias value that
/// is present and not a sentinel.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    pub district: Option<String>,
    pub crop: Option<String>,
    pub soil: Option<String>,
    pub rainfall: Option<String>,
    pub fertilizer: Option<String>,
    pub nitrogen: Option<String>,
    pub phosphorus: Option<String>,
    pub potassium: Option<String>,
    pub ph: Option<String>,
    pub temperature: Option<String>,
    pub pest: Option<String>,
    pub season: Option<String>,
    pub yield_value: Option<String>,
    pub confidence: Option<String>,
    row: Row,
}

impl Record {
    pub fn from_row(row: Row) -> Self {
        let resolve = |field: Field| -> Option<String> {
            field
                .aliases()
                .iter()
                .filter_map(|alias| row.get(alias))
                .find(|v| !is_sentinel(v))
                .map(str::to_string)
        };

        Self {
            district: resolve(Field::District),
            crop: resolve(Field::Crop),
            soil: resolve(Field::Soil),
            rainfall: resolve(Field::Rainfall),
            fertilizer: resolve(Field::Fertilizer),
            nitrogen: resolve(Field::Nitrogen),
            phosphorus: resolve(Field::Phosphorus),
            potassium: resolve(Field::Potassium),
            ph: resolve(Field::Ph),
            temperature: resolve(Field::Temperature),
            pest: resolve(Field::Pest),
            season: resolve(Field::Season),
            yield_value: resolve(Field::Yield),
            confidence: resolve(Field::Confidence),
            row,
        }
    }

    pub fn get(&self, field: Field) -> Option<&str> {
        let slot = match field {
            Field::District => &self.district,
            Field::Crop => &self.crop,
            Field::Soil => &self.soil,
            Field::Rainfall => &self.rainfall,
            Field::Fertilizer => &self.fertilizer,
            Field::Nitrogen => &self.nitrogen,
            Field::Phosphorus => &self.phosphorus,
            Field::Potassium => &self.potassium,
            Field::Ph => &self.ph,
            Field::Temperature => &self.temperature,
            Field::Pest => &self.pest,
            Field::Season => &self.season,
            Field::Yield => &self.yield_value,
            Field::Confidence => &self.confidence,
        };
        slot.as_deref()
    }

    /// Parse a field as a number, `None` if absent or not numeric.
    pub fn number(&self, field: Field) -> Option<f64> {
        self.get(field)
            .and_then(|v| v.trim().parse::<f64>().ok())
            .filter(|n| n.is_finite())
    }

    /// Trimmed cell of the first alias column present in the row, sentinels
    /// included.
    pub fn raw(&self, field: Field) -> Option<&str> {
        field.aliases().iter().find_map(|alias| self.row.get(alias))
    }

    /// The underlying raw row.
    pub fn row(&self) -> &Row {
        &self.row
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[(&str, &str)]) -> Row {
        Row::new(
            cells
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    #[test]
    fn test_normalize_key() {
        assert_eq!(normalize_key("  District Name "), "district_name");
        assert_eq!(normalize_key("Soil_Color"), "soil_color");
        assert_eq!(normalize_key("pH"), "ph");
    }

    #[test]
    fn test_sentinels() {
        for s in ["N/A", "na", "Unknown", "NULL", "None", "0", "", "   ", "NaN"] {
            assert!(is_sentinel(s), "{s:?} should be a sentinel");
        }
        for s in ["0.0", "Pune", "00", "nothing"] {
            assert!(!is_sentinel(s), "{s:?} should not be a sentinel");
        }
    }

    #[test]
    fn test_alias_resolution_skips_sentinels() {
        let rec = Record::from_row(row(&[
            ("rainfall", "N/A"),
            ("precipitation", ""),
            ("precipitationsuminches", "12.5"),
            ("district", "Satara"),
            ("phosphorous", "22"),
        ]));
        assert_eq!(rec.rainfall.as_deref(), Some("12.5"));
        assert_eq!(rec.district.as_deref(), Some("Satara"));
        assert_eq!(rec.phosphorus.as_deref(), Some("22"));
        assert_eq!(rec.crop, None);
        assert_eq!(rec.number(Field::Rainfall), Some(12.5));
    }

    #[test]
    fn test_alias_priority() {
        let rec = Record::from_row(row(&[("district", "B"), ("district_name", "A")]));
        assert_eq!(rec.get(Field::District), Some("A"));
    }

    #[test]
    fn test_raw_keeps_sentinels() {
        let rec = Record::from_row(row(&[
            ("pest", "N/A"),
            ("events", "Aphids"),
            ("nitrogen", "0"),
        ]));
        assert_eq!(rec.pest.as_deref(), Some("Aphids"));
        assert_eq!(rec.raw(Field::Pest), Some("N/A"));
        assert_eq!(rec.raw(Field::Nitrogen), Some("0"));
        assert_eq!(rec.nitrogen, None);
        assert_eq!(rec.raw(Field::Season), None);
    }

    #[test]
    fn test_placeholder_round_trip() {
        for f in Field::ALL {
            assert_eq!(Field::from_placeholder(f.placeholder()), Some(f));
        }
        assert_eq!(Field::from_placeholder("humidity"), None);
    }
}
