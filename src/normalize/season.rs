// src/normalize/season.rs

/// Indian cropping season derived from climate: first matching rule wins.
pub fn season_from_climate(rainfall: f64, temperature: f64) -> &'static str {
    if rainfall > 300.0 && (20.0..=30.0).contains(&temperature) {
        "Kharif"
    } else if rainfall < 150.0 && temperature < 25.0 {
        "Rabi"
    } else if rainfall > 0.0 {
        "Zaid"
    } else {
        "General"
    }
}

const MONTHS: [&str; 12] = [
    "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
];

/// Month number (1-12) from `"7"`, `"07"`, `"Jul"`, `"july"`…; `None` if the
/// value does not look like a month at all.
pub fn parse_month(raw: &str) -> Option<u32> {
    let m = raw.trim().to_lowercase();
    if m.is_empty() {
        return None;
    }
    if m.chars().all(|c| c.is_ascii_digit()) {
        return m.parse().ok();
    }
    MONTHS
        .iter()
        .position(|name| m.starts_with(name))
        .map(|i| i as u32 + 1)
}

/// Season for a month number; out-of-range numbers are `"Unknown"`.
pub fn season_from_month(month: u32) -> &'static str {
    match month {
        6..=10 => "Kharif",
        11 | 12 | 1..=3 => "Rabi",
        4 | 5 => "Zaid",
        _ => "Unknown",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_climate_rule_table() {
        assert_eq!(season_from_climate(350.0, 25.0), "Kharif");
        assert_eq!(season_from_climate(100.0, 20.0), "Rabi");
        assert_eq!(season_from_climate(50.0, 30.0), "Zaid");
        assert_eq!(season_from_climate(0.0, 25.0), "General");
    }

    #[test]
    fn test_climate_rule_boundaries() {
        assert_eq!(season_from_climate(301.0, 20.0), "Kharif");
        assert_eq!(season_from_climate(301.0, 30.0), "Kharif");
        // 300 is not > 300, and it is not < 150 either
        assert_eq!(season_from_climate(300.0, 25.0), "Zaid");
        assert_eq!(season_from_climate(400.0, 31.0), "Zaid");
        assert_eq!(season_from_climate(149.0, 24.9), "Rabi");
        assert_eq!(season_from_climate(0.0, 10.0), "Rabi");
    }

    #[test]
    fn test_parse_month() {
        assert_eq!(parse_month("7"), Some(7));
        assert_eq!(parse_month(" 07 "), Some(7));
        assert_eq!(parse_month("July"), Some(7));
        assert_eq!(parse_month("dec"), Some(12));
        assert_eq!(parse_month("13"), Some(13));
        assert_eq!(parse_month("Kharif"), None);
        assert_eq!(parse_month(""), None);
    }

    #[test]
    fn test_month_seasons() {
        let expected = [
            (1, "Rabi"),
            (2, "Rabi"),
            (3, "Rabi"),
            (4, "Zaid"),
            (5, "Zaid"),
            (6, "Kharif"),
            (7, "Kharif"),
            (8, "Kharif"),
            (9, "Kharif"),
            (10, "Kharif"),
            (11, "Rabi"),
            (12, "Rabi"),
        ];
        for (m, s) in expected {
            assert_eq!(season_from_month(m), s, "month {m}");
        }
        assert_eq!(season_from_month(0), "Unknown");
        assert_eq!(season_from_month(13), "Unknown");
    }
}
