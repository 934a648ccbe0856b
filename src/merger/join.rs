// 🔗 Year-Keyed Joiner
//
// Index indicators by (year, country), look up once with the tenure's start year
// and once with its end year, union both hit lists (start hits first) and drop
// rows identical to an earlier row. Inner-join: no hit, no row.

use super::indicators::IndicatorRecord;
use super::tenure::TenureRecord;
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::{BTreeSet, HashMap, HashSet};

/// Tenure fields plus the indicator snapshot for the matched year
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MergedRecord {
    pub country: String,
    pub leader: String,
    #[serde(rename = "startdate")]
    pub start_date: NaiveDate,
    #[serde(rename = "enddate")]
    pub end_date: Option<NaiveDate>,
    /// Indicator year that matched (start or end edge)
    pub year: i32,
    pub inflation: Option<f64>,
    pub unemployment: Option<f64>,
    pub gdp_growth: Option<f64>,
    pub gdp_per_capita_growth: Option<f64>,
}

impl MergedRecord {
    fn attach(tenure: &TenureRecord, indicator: &IndicatorRecord) -> Self {
        MergedRecord {
            country: tenure.country.clone(),
            leader: tenure.leader.clone(),
            start_date: tenure.start_date,
            end_date: tenure.end_date,
            year: indicator.year,
            inflation: indicator.inflation,
            unemployment: indicator.unemployment,
            gdp_growth: indicator.gdp_growth,
            gdp_per_capita_growth: indicator.gdp_per_capita_growth,
        }
    }

    /// Full-row identity; floats compared bit-for-bit
    fn row_key(&self) -> RowKey {
        RowKey {
            country: self.country.clone(),
            leader: self.leader.clone(),
            start_date: self.start_date,
            end_date: self.end_date,
            year: self.year,
            values: [
                self.inflation.map(f64::to_bits),
                self.unemployment.map(f64::to_bits),
                self.gdp_growth.map(f64::to_bits),
                self.gdp_per_capita_growth.map(f64::to_bits),
            ],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct RowKey {
    country: String,
    leader: String,
    start_date: NaiveDate,
    end_date: Option<NaiveDate>,
    year: i32,
    values: [Option<u64>; 4],
}

/// What the join kept and what it silently dropped
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct JoinReport {
    pub tenures: usize,
    pub start_hits: usize,
    pub end_hits: usize,
    pub duplicates_collapsed: usize,
    /// Tenures with no indicator row for either year
    pub dropped_tenures: usize,
    /// Tenure countries that never appear in the indicator data
    pub unmatched_countries: BTreeSet<String>,
    pub rows: usize,
}

pub fn year_keyed_join(
    tenures: &[TenureRecord],
    indicators: &[IndicatorRecord],
) -> (Vec<MergedRecord>, JoinReport) {
    let mut index: HashMap<(i32, &str), Vec<&IndicatorRecord>> = HashMap::new();
    for indicator in indicators {
        index
            .entry((indicator.year, indicator.country.as_str()))
            .or_default()
            .push(indicator);
    }
    let known_countries: HashSet<&str> = indicators.iter().map(|i| i.country.as_str()).collect();

    let mut report = JoinReport {
        tenures: tenures.len(),
        ..JoinReport::default()
    };
    let mut matched = vec![false; tenures.len()];

    // Start-year join
    let mut start_rows = Vec::new();
    for (i, tenure) in tenures.iter().enumerate() {
        if let Some(hits) = index.get(&(tenure.start_year, tenure.country.as_str())) {
            for indicator in hits {
                start_rows.push(MergedRecord::attach(tenure, indicator));
            }
            report.start_hits += hits.len();
            matched[i] = true;
        }
    }

    // End-year join
    let mut end_rows = Vec::new();
    for (i, tenure) in tenures.iter().enumerate() {
        let Some(end_year) = tenure.end_year else {
            continue;
        };
        if let Some(hits) = index.get(&(end_year, tenure.country.as_str())) {
            for indicator in hits {
                end_rows.push(MergedRecord::attach(tenure, indicator));
            }
            report.end_hits += hits.len();
            matched[i] = true;
        }
    }

    // Union, keeping the first occurrence of each distinct row
    let mut seen = HashSet::new();
    let mut rows = Vec::with_capacity(start_rows.len() + end_rows.len());
    for row in start_rows.into_iter().chain(end_rows) {
        if seen.insert(row.row_key()) {
            rows.push(row);
        } else {
            report.duplicates_collapsed += 1;
        }
    }

    for (tenure, hit) in tenures.iter().zip(&matched) {
        if !hit {
            report.dropped_tenures += 1;
        }
        if !known_countries.contains(tenure.country.as_str()) {
            report.unmatched_countries.insert(tenure.country.clone());
        }
    }
    report.rows = rows.len();

    (rows, report)
}
