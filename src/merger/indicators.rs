// 📈 Indicator Loader - macroeconomic series keyed by (country, year)
// Sources: World Bank v2 API (4 indicator codes, "all" countries) or a local CSV

use super::MergeError;
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::ops::RangeInclusive;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info};

pub const DEFAULT_WORLD_BANK_URL: &str = "https://api.worldbank.org/v2";

// ============================================================================
// INDICATORS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Indicator {
    Inflation,
    Unemployment,
    GdpGrowth,
    GdpPerCapitaGrowth,
}

impl Indicator {
    pub const ALL: [Indicator; 4] = [
        Indicator::Inflation,
        Indicator::Unemployment,
        Indicator::GdpGrowth,
        Indicator::GdpPerCapitaGrowth,
    ];

    /// World Bank indicator code
    pub fn code(&self) -> &'static str {
        match self {
            Indicator::Inflation => "FP.CPI.TOTL.ZG",
            Indicator::Unemployment => "SL.UEM.TOTL.ZS",
            Indicator::GdpGrowth => "NY.GDP.MKTP.KD.ZG",
            Indicator::GdpPerCapitaGrowth => "NY.GDP.PCAP.KD.ZG",
        }
    }

    /// Column name in merged output
    pub fn column(&self) -> &'static str {
        match self {
            Indicator::Inflation => "inflation",
            Indicator::Unemployment => "unemployment",
            Indicator::GdpGrowth => "gdp_growth",
            Indicator::GdpPerCapitaGrowth => "gdp_per_capita_growth",
        }
    }
}

/// One country's statistics for one calendar year (percent values)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorRecord {
    pub country: String,
    pub year: i32,
    #[serde(default)]
    pub inflation: Option<f64>,
    #[serde(default)]
    pub unemployment: Option<f64>,
    #[serde(default)]
    pub gdp_growth: Option<f64>,
    #[serde(default)]
    pub gdp_per_capita_growth: Option<f64>,
}

impl IndicatorRecord {
    pub fn empty(country: String, year: i32) -> Self {
        IndicatorRecord {
            country,
            year,
            inflation: None,
            unemployment: None,
            gdp_growth: None,
            gdp_per_capita_growth: None,
        }
    }

    pub fn set(&mut self, indicator: Indicator, value: Option<f64>) {
        match indicator {
            Indicator::Inflation => self.inflation = value,
            Indicator::Unemployment => self.unemployment = value,
            Indicator::GdpGrowth => self.gdp_growth = value,
            Indicator::GdpPerCapitaGrowth => self.gdp_per_capita_growth = value,
        }
    }

    pub fn get(&self, indicator: Indicator) -> Option<f64> {
        match indicator {
            Indicator::Inflation => self.inflation,
            Indicator::Unemployment => self.unemployment,
            Indicator::GdpGrowth => self.gdp_growth,
            Indicator::GdpPerCapitaGrowth => self.gdp_per_capita_growth,
        }
    }
}

/// A single (indicator, country, year, value) data point
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub indicator: Indicator,
    pub country: String,
    pub year: i32,
    pub value: Option<f64>,
}

/// Fold per-indicator series into one record per (country, year), sorted by key
pub fn pivot(observations: impl IntoIterator<Item = Observation>) -> Vec<IndicatorRecord> {
    let mut by_key: BTreeMap<(String, i32), IndicatorRecord> = BTreeMap::new();

    for obs in observations {
        let record = by_key
            .entry((obs.country.clone(), obs.year))
            .or_insert_with(|| IndicatorRecord::empty(obs.country.clone(), obs.year));
        // A null never erases a value already reported for the same key
        if obs.value.is_some() || record.get(obs.indicator).is_none() {
            record.set(obs.indicator, obs.value);
        }
    }

    by_key.into_values().collect()
}

// ============================================================================
// SOURCE TRAIT
// ============================================================================

/// IndicatorSource - anything that can hand back the indicator table
pub trait IndicatorSource {
    fn fetch(&self, years: RangeInclusive<i32>) -> Result<Vec<IndicatorRecord>, MergeError>;

    fn describe(&self) -> String;
}

// ============================================================================
// WORLD BANK CLIENT
// ============================================================================

#[derive(Debug, Deserialize)]
struct WbRef {
    value: String,
}

#[derive(Debug, Deserialize)]
struct WbObservation {
    country: WbRef,
    date: String,
    value: Option<f64>,
}

/// Page metadata; the API sometimes sends numbers as strings
fn meta_number(meta: &Value, field: &str) -> Option<u64> {
    match meta.get(field)? {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

/// Parse one page of `/country/all/indicator/{code}` output.
///
/// Returns observations and the total page count.
fn parse_page(
    indicator: Indicator,
    body: Value,
) -> Result<(Vec<Observation>, u64), MergeError> {
    let mut parts = match body {
        Value::Array(parts) => parts.into_iter(),
        other => {
            return Err(MergeError::Service(format!(
                "unexpected response shape for {}: {}",
                indicator.code(),
                other
            )))
        }
    };

    let meta = parts.next().unwrap_or(Value::Null);
    if let Some(message) = meta.get("message") {
        return Err(MergeError::Service(format!(
            "{} rejected: {}",
            indicator.code(),
            message
        )));
    }
    let pages = meta_number(&meta, "pages").unwrap_or(1);

    let rows: Option<Vec<WbObservation>> = match parts.next() {
        Some(data) => serde_json::from_value(data)?,
        None => None,
    };

    let observations = rows
        .unwrap_or_default()
        .into_iter()
        .filter_map(|row| {
            let year = row.date.trim().parse::<i32>().ok()?;
            Some(Observation {
                indicator,
                country: row.country.value,
                year,
                value: row.value,
            })
        })
        .collect();

    Ok((observations, pages))
}

/// World Bank indicators API, queried for all countries
pub struct WorldBankClient {
    base_url: String,
    per_page: u32,
    client: Client,
}

impl WorldBankClient {
    pub fn new(base_url: impl Into<String>, per_page: u32, timeout: Duration) -> Result<Self, MergeError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(WorldBankClient {
            base_url: base_url.into(),
            per_page,
            client,
        })
    }

    fn page_url(&self, indicator: Indicator, years: &RangeInclusive<i32>, page: u64) -> String {
        format!(
            "{}/country/all/indicator/{}?date={}:{}&format=json&per_page={}&page={}",
            self.base_url.trim_end_matches('/'),
            indicator.code(),
            years.start(),
            years.end(),
            self.per_page,
            page
        )
    }

    fn fetch_series(
        &self,
        indicator: Indicator,
        years: &RangeInclusive<i32>,
    ) -> Result<Vec<Observation>, MergeError> {
        let mut all = Vec::new();
        let mut page = 1;

        loop {
            let url = self.page_url(indicator, years, page);
            debug!(%url, "fetching indicator page");

            let body: Value = self.client.get(&url).send()?.error_for_status()?.json()?;
            let (mut observations, pages) = parse_page(indicator, body)?;
            all.append(&mut observations);

            if page >= pages {
                break;
            }
            page += 1;
        }

        info!(code = indicator.code(), observations = all.len(), "fetched indicator");
        Ok(all)
    }
}

impl IndicatorSource for WorldBankClient {
    fn fetch(&self, years: RangeInclusive<i32>) -> Result<Vec<IndicatorRecord>, MergeError> {
        let mut observations = Vec::new();
        for indicator in Indicator::ALL {
            observations.extend(self.fetch_series(indicator, &years)?);
        }
        Ok(pivot(observations))
    }

    fn describe(&self) -> String {
        self.base_url.clone()
    }
}

// ============================================================================
// LOCAL FILE
// ============================================================================

/// CSV with columns country,year,inflation,unemployment,gdp_growth,gdp_per_capita_growth
pub struct IndicatorFile {
    path: PathBuf,
}

impl IndicatorFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        IndicatorFile { path: path.into() }
    }
}

pub fn parse_indicator_csv<R: std::io::Read>(
    reader: R,
    years: &RangeInclusive<i32>,
) -> Result<Vec<IndicatorRecord>, MergeError> {
    let mut rdr = csv::Reader::from_reader(reader);
    let mut records = Vec::new();
    for result in rdr.deserialize() {
        let record: IndicatorRecord = result?;
        if years.contains(&record.year) {
            records.push(record);
        }
    }
    Ok(records)
}

impl IndicatorSource for IndicatorFile {
    fn fetch(&self, years: RangeInclusive<i32>) -> Result<Vec<IndicatorRecord>, MergeError> {
        let file = std::fs::File::open(&self.path)?;
        let records = parse_indicator_csv(file, &years)?;
        info!(path = %self.path.display(), records = records.len(), "loaded indicator file");
        Ok(records)
    }

    fn describe(&self) -> String {
        format!("file://{}", self.path.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn obs(indicator: Indicator, country: &str, year: i32, value: Option<f64>) -> Observation {
        Observation {
            indicator,
            country: country.to_string(),
            year,
            value,
        }
    }

    #[test]
    fn test_codes_are_distinct() {
        let codes: std::collections::HashSet<&str> =
            Indicator::ALL.iter().map(|i| i.code()).collect();
        assert_eq!(codes.len(), 4);
    }

    #[test]
    fn test_pivot_one_record_per_country_year() {
        let records = pivot(vec![
            obs(Indicator::Inflation, "Chile", 2006, Some(3.4)),
            obs(Indicator::GdpGrowth, "Chile", 2006, Some(6.3)),
            obs(Indicator::Inflation, "Chile", 2010, Some(1.4)),
            obs(Indicator::Unemployment, "Brazil", 2006, None),
        ]);

        assert_eq!(records.len(), 3);
        assert_eq!(records[0].country, "Brazil");
        assert_eq!(records[0].unemployment, None);

        let chile_2006 = &records[1];
        assert_eq!(chile_2006.year, 2006);
        assert_eq!(chile_2006.inflation, Some(3.4));
        assert_eq!(chile_2006.gdp_growth, Some(6.3));
        assert_eq!(chile_2006.unemployment, None);
    }

    #[test]
    fn test_pivot_null_does_not_erase_value() {
        let records = pivot(vec![
            obs(Indicator::Inflation, "Chile", 2006, Some(3.4)),
            obs(Indicator::Inflation, "Chile", 2006, None),
        ]);
        assert_eq!(records[0].inflation, Some(3.4));
    }

    #[test]
    fn test_parse_world_bank_page() {
        let body = json!([
            {"page": 1, "pages": 2, "per_page": "2", "total": 3},
            [
                {
                    "indicator": {"id": "FP.CPI.TOTL.ZG", "value": "Inflation, consumer prices (annual %)"},
                    "country": {"id": "RU", "value": "Russian Federation"},
                    "countryiso3code": "RUS",
                    "date": "2000",
                    "value": 20.78,
                    "unit": "",
                    "obs_status": "",
                    "decimal": 1
                },
                {
                    "indicator": {"id": "FP.CPI.TOTL.ZG", "value": "Inflation, consumer prices (annual %)"},
                    "country": {"id": "RU", "value": "Russian Federation"},
                    "countryiso3code": "RUS",
                    "date": "1999",
                    "value": null,
                    "unit": "",
                    "obs_status": "",
                    "decimal": 1
                }
            ]
        ]);

        let (observations, pages) = parse_page(Indicator::Inflation, body).unwrap();
        assert_eq!(pages, 2);
        assert_eq!(observations.len(), 2);
        assert_eq!(observations[0].country, "Russian Federation");
        assert_eq!(observations[0].year, 2000);
        assert_eq!(observations[0].value, Some(20.78));
        assert_eq!(observations[1].value, None);
    }

    #[test]
    fn test_parse_world_bank_error_message() {
        let body = json!([{"message": [{"id": "120", "key": "Invalid value"}]}]);
        assert!(matches!(
            parse_page(Indicator::GdpGrowth, body),
            Err(MergeError::Service(_))
        ));
    }

    #[test]
    fn test_parse_world_bank_empty_page() {
        let body = json!([{"page": 0, "pages": 0, "per_page": 50, "total": 0}, null]);
        let (observations, pages) = parse_page(Indicator::GdpGrowth, body).unwrap();
        assert!(observations.is_empty());
        assert_eq!(pages, 0);
    }

    #[test]
    fn test_page_url() {
        let client = WorldBankClient::new("https://example.org/v2/", 500, Duration::from_secs(1)).unwrap();
        assert_eq!(
            client.page_url(Indicator::Unemployment, &(1960..=2023), 3),
            "https://example.org/v2/country/all/indicator/SL.UEM.TOTL.ZS?date=1960:2023&format=json&per_page=500&page=3"
        );
    }

    #[test]
    fn test_indicator_csv_filters_years() {
        let csv = "country,year,inflation,unemployment,gdp_growth,gdp_per_capita_growth\n\
                   Chile,2006,3.4,,6.3,5.2\n\
                   Chile,1950,1.0,1.0,1.0,1.0\n";
        let records = parse_indicator_csv(csv.as_bytes(), &(1960..=2023)).unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].unemployment, None);
        assert_eq!(records[0].gdp_per_capita_growth, Some(5.2));
    }
}
