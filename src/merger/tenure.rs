// 👑 Tenure Loader - leaders in office, one row per tenure (TSV)

use super::MergeError;
use chrono::{Datelike, NaiveDate};
use serde::Deserialize;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::info;

/// One head of state's time in office for a given country
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TenureRecord {
    pub country: String,
    pub leader: String,
    pub start_date: NaiveDate,
    /// `None` while still in office
    pub end_date: Option<NaiveDate>,
    /// Join key for the start edge
    pub start_year: i32,
    /// Join key for the end edge
    pub end_year: Option<i32>,
}

/// Row as it appears in the TSV; extra columns are ignored
#[derive(Debug, Deserialize)]
struct TenureRow {
    country: String,
    leader: String,
    startdate: String,
    #[serde(default)]
    enddate: Option<String>,
    #[serde(default)]
    startyear: Option<String>,
    #[serde(default)]
    endyear: Option<String>,
}

/// Year cells show up as "1999", "1999.0" or " 1999 " depending on who exported them
pub fn normalize_year(raw: &str) -> Option<i32> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(year) = trimmed.parse::<i32>() {
        return Some(year);
    }

    match trimmed.parse::<f64>() {
        Ok(value) if value.fract() == 0.0 && value.abs() < 10_000.0 => Some(value as i32),
        _ => None,
    }
}

/// YYYY-MM-DD (optionally followed by a time), or MM/DD/YYYY
pub fn parse_tenure_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Some(date);
    }

    if trimmed.len() > 10 && trimmed.is_char_boundary(10) {
        if let Ok(date) = NaiveDate::parse_from_str(&trimmed[..10], "%Y-%m-%d") {
            return Some(date);
        }
    }

    NaiveDate::parse_from_str(trimmed, "%m/%d/%Y").ok()
}

impl TenureRow {
    fn into_record(self, line: u64) -> Result<TenureRecord, MergeError> {
        let start_date = parse_tenure_date(&self.startdate).ok_or_else(|| MergeError::TenureRow {
            line,
            message: format!("invalid startdate '{}'", self.startdate),
        })?;

        let end_date = match self.enddate.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(parse_tenure_date(raw).ok_or_else(|| MergeError::TenureRow {
                line,
                message: format!("invalid enddate '{}'", raw),
            })?),
        };

        let start_year = self
            .startyear
            .as_deref()
            .and_then(normalize_year)
            .unwrap_or_else(|| start_date.year());
        let end_year = self
            .endyear
            .as_deref()
            .and_then(normalize_year)
            .or_else(|| end_date.map(|d| d.year()));

        Ok(TenureRecord {
            country: self.country.trim().to_string(),
            leader: self.leader.trim().to_string(),
            start_date,
            end_date,
            start_year,
            end_year,
        })
    }
}

/// Parse tab-separated tenure rows (header required)
pub fn parse_tenures<R: Read>(reader: R) -> Result<Vec<TenureRecord>, MergeError> {
    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .flexible(true)
        .from_reader(reader);

    let mut tenures = Vec::new();
    for result in rdr.deserialize::<TenureRow>() {
        let row = result?;
        let line = tenures.len() as u64 + 2;
        tenures.push(row.into_record(line)?);
    }

    Ok(tenures)
}

pub fn load_tenures(path: &Path) -> Result<Vec<TenureRecord>, MergeError> {
    let file = File::open(path)?;
    let tenures = parse_tenures(file)?;
    info!(path = %path.display(), tenures = tenures.len(), "loaded tenure file");
    Ok(tenures)
}
