// src/localize/mod.rs

use crate::{dataset::Field, normalize::FillValues, templates::Language};

/// Fields that are ever rewritten; everything else is language-invariant.
pub const LOCALIZED_FIELDS: [Field; 4] =
    [Field::District, Field::Crop, Field::Soil, Field::Fertilizer];

/// (field, English value, Hindi, Marathi)
static TRANSLATIONS: &[(Field, &str, &str, &str)] = &[
    (Field::District, "Jodhpur", "जोधपुर", "जोधपूर"),
    (Field::District, "Kolhapur", "कोल्हापुर", "कोल्हापूर"),
    (Field::District, "Satara", "सातारा", "सातारा"),
    (Field::District, "Pune", "पुणे", "पुणे"),
    (Field::Crop, "Bajra", "बाजरा", "बाजरी"),
    (Field::Crop, "Maize", "मक्का", "मका"),
    (Field::Crop, "Jowar", "ज्वार", "ज्वारी"),
    (Field::Soil, "Pale Yellow", "फीका पीला", "फिकट पिवळा"),
    (Field::Soil, "Light Brown", "हल्का भूरा", "फिकट तपकिरी"),
    (Field::Soil, "Yellow Brown", "पीला भूरा", "पिवळसर तपकिरी"),
    (Field::Soil, "Sandy Brown", "रेतीला भूरा", "वालुकामय तपकिरी"),
    (Field::Soil, "Dark Brown", "गहरा भूरा", "गडद तपकिरी"),
    (Field::Fertilizer, "DAP", "डीएपी", "डीएपी"),
    (Field::Fertilizer, "Urea", "यूरिया", "युरिया"),
    (Field::Fertilizer, "Compost", "खाद", "खत"),
    (Field::Fertilizer, "MOP", "एमओपी", "एमओपी"),
    (Field::Fertilizer, "FYM", "गोबर खाद", "गोठ्यातील खत"),
    (Field::Fertilizer, "Vermicompost", "वर्मी कम्पोस्ट", "वर्मी कम्पोस्ट"),
];

/// Translation of one English display value, if the table has it.
pub fn translate(field: Field, value: &str, language: Language) -> Option<&'static str> {
    let value = value.trim();
    TRANSLATIONS
        .iter()
        .find(|(f, en, _, _)| *f == field && en.eq_ignore_ascii_case(value))
        .and_then(|(_, _, hi, mr)| match language {
            Language::En => None,
            Language::Hi => Some(*hi),
            Language::Mr => Some(*mr),
        })
}

/// Rewrite district, crop, soil and fertilizer into `language`.
/// English is the identity; values missing from the table pass through.
pub fn localize(values: &FillValues, language: Language) -> FillValues {
    let mut out = values.clone();
    if language == Language::En {
        return out;
    }
    for field in LOCALIZED_FIELDS {
        if let Some(t) = translate(field, values.get(field), language) {
            out.set(field, t);
        }
    }
    out
}
