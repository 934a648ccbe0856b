// 🌍 Country Name Normalizer
//
// Tenure data uses common/historical names ("Russia"), the indicator service
// uses its own canonical spelling ("Russian Federation"). Exact-match only.
// Canonical names are never keys, so normalizing twice is a no-op.

use super::tenure::TenureRecord;
use std::collections::HashMap;

/// (tenure-dataset name, canonical indicator-dataset name)
pub const COUNTRY_ALIASES: &[(&str, &str)] = &[
    ("Russia", "Russian Federation"),
    ("Egypt", "Egypt, Arab Rep."),
    ("Iran", "Iran, Islamic Rep."),
    ("South Korea", "Korea, Rep."),
    ("North Korea", "Korea, Dem. People's Rep."),
    ("Venezuela", "Venezuela, RB"),
    ("Syria", "Syrian Arab Republic"),
    ("Yemen", "Yemen, Rep."),
    ("Turkey", "Turkiye"),
    ("Gambia", "Gambia, The"),
    ("Bahamas", "Bahamas, The"),
    ("Slovakia", "Slovak Republic"),
    ("Kyrgyzstan", "Kyrgyz Republic"),
    ("Laos", "Lao PDR"),
    ("Vietnam", "Viet Nam"),
    ("Czech Republic", "Czechia"),
    ("Macedonia", "North Macedonia"),
    ("Democratic Republic of the Congo", "Congo, Dem. Rep."),
    ("Republic of the Congo", "Congo, Rep."),
    ("Ivory Coast", "Cote d'Ivoire"),
    ("Cape Verde", "Cabo Verde"),
    ("Swaziland", "Eswatini"),
    ("Burma", "Myanmar"),
    ("Brunei", "Brunei Darussalam"),
    ("East Timor", "Timor-Leste"),
    ("Micronesia", "Micronesia, Fed. Sts."),
    ("Saint Lucia", "St. Lucia"),
    ("Saint Kitts and Nevis", "St. Kitts and Nevis"),
    ("Saint Vincent and the Grenadines", "St. Vincent and the Grenadines"),
    ("United States of America", "United States"),
];

/// Closed alias map, tenure spelling → canonical spelling
#[derive(Debug, Clone)]
pub struct CountryNormalizer {
    aliases: HashMap<&'static str, &'static str>,
}

impl CountryNormalizer {
    /// Normalizer over the built-in alias table
    pub fn with_defaults() -> Self {
        CountryNormalizer {
            aliases: COUNTRY_ALIASES.iter().copied().collect(),
        }
    }

    /// Canonical spelling; unknown names pass through unchanged
    pub fn normalize<'a>(&self, name: &'a str) -> &'a str {
        match self.aliases.get(name) {
            Some(canonical) => *canonical,
            None => name,
        }
    }

    pub fn is_alias(&self, name: &str) -> bool {
        self.aliases.contains_key(name)
    }

    pub fn count(&self) -> usize {
        self.aliases.len()
    }

    /// Rewrite the country of every tenure in place
    pub fn normalize_tenures(&self, tenures: &mut [TenureRecord]) -> usize {
        let mut renamed = 0;
        for tenure in tenures.iter_mut() {
            let canonical = self.normalize(&tenure.country);
            if canonical != tenure.country {
                tenure.country = canonical.to_string();
                renamed += 1;
            }
        }
        renamed
    }
}

impl Default for CountryNormalizer {
    fn default() -> Self {
        Self::with_defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_alias_maps_to_canonical() {
        let normalizer = CountryNormalizer::with_defaults();
        assert_eq!(normalizer.normalize("Russia"), "Russian Federation");
        assert_eq!(normalizer.normalize("Egypt"), "Egypt, Arab Rep.");
    }

    #[test]
    fn test_idempotent_on_canonical_names() {
        let normalizer = CountryNormalizer::with_defaults();
        assert_eq!(normalizer.normalize("Russian Federation"), "Russian Federation");

        for (alias, canonical) in COUNTRY_ALIASES {
            let once = normalizer.normalize(alias);
            assert_eq!(once, *canonical);
            assert_eq!(normalizer.normalize(once), once);
            assert!(!normalizer.is_alias(canonical), "{} is both alias and canonical", canonical);
        }
    }

    #[test]
    fn test_unknown_names_pass_through() {
        let normalizer = CountryNormalizer::with_defaults();
        assert_eq!(normalizer.normalize("France"), "France");
        assert_eq!(normalizer.normalize("russia"), "russia");
        assert_eq!(normalizer.normalize(""), "");
    }

    #[test]
    fn test_no_duplicate_aliases() {
        let normalizer = CountryNormalizer::with_defaults();
        assert_eq!(normalizer.count(), COUNTRY_ALIASES.len());
    }

    #[test]
    fn test_normalize_tenures_counts_renames() {
        let normalizer = CountryNormalizer::with_defaults();
        let tenure = |country: &str| TenureRecord {
            country: country.to_string(),
            leader: "X".to_string(),
            start_date: NaiveDate::from_ymd_opt(2000, 1, 1).unwrap(),
            end_date: None,
            start_year: 2000,
            end_year: None,
        };
        let mut tenures = vec![tenure("Russia"), tenure("France"), tenure("Syria")];

        assert_eq!(normalizer.normalize_tenures(&mut tenures), 2);
        assert_eq!(tenures[0].country, "Russian Federation");
        assert_eq!(tenures[1].country, "France");
        assert_eq!(tenures[2].country, "Syrian Arab Republic");

        // Second pass changes nothing
        assert_eq!(normalizer.normalize_tenures(&mut tenures), 0);
    }
}
