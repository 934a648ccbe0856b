// 📝 Form Intake - five inputs in, one record out
//
// Widget rules: decimals clamped to >= 0 and shown with two decimals.
// No ordering check between start and end dates.

use super::record::HeadOfStateRecord;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

/// Display precision of the GDP inputs
pub const GDP_DECIMALS: u32 = 2;

#[derive(Error, Debug, PartialEq)]
pub enum FormError {
    #[error("{field}: '{value}' is not a date (expected YYYY-MM-DD)")]
    InvalidDate { field: &'static str, value: String },

    #[error("{field}: '{value}' is not a number")]
    InvalidNumber { field: &'static str, value: String },
}

/// Typed form values, already clamped
#[derive(Debug, Clone, PartialEq)]
pub struct HeadOfStateForm {
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub gdp_start: Decimal,
    pub gdp_end: Decimal,
}

/// Form values as typed by the user (HTTP form body, CLI flags, TUI fields)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawHeadOfStateForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub start_date: String,
    #[serde(default)]
    pub end_date: String,
    #[serde(default)]
    pub gdp_start: String,
    #[serde(default)]
    pub gdp_end: String,
}

/// Number input semantics: lower bound 0, two decimals
pub fn clamp_gdp(value: Decimal) -> Decimal {
    let mut clamped = value.max(Decimal::ZERO).round_dp(GDP_DECIMALS);
    clamped.rescale(GDP_DECIMALS);
    clamped
}

pub fn parse_date(field: &'static str, value: &str) -> Result<NaiveDate, FormError> {
    let trimmed = value.trim();

    // Try YYYY-MM-DD
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Ok(date);
    }

    // Try MM/DD/YYYY
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%m/%d/%Y") {
        return Ok(date);
    }

    Err(FormError::InvalidDate {
        field,
        value: value.to_string(),
    })
}

/// Blank means the widget default (0.00)
pub fn parse_gdp(field: &'static str, value: &str) -> Result<Decimal, FormError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(Decimal::ZERO);
    }

    Decimal::from_str(trimmed)
        .or_else(|_| Decimal::from_scientific(trimmed))
        .map(clamp_gdp)
        .map_err(|_| FormError::InvalidNumber {
            field,
            value: value.to_string(),
        })
}

impl HeadOfStateForm {
    pub fn new(
        name: impl Into<String>,
        start_date: NaiveDate,
        end_date: NaiveDate,
        gdp_start: Decimal,
        gdp_end: Decimal,
    ) -> Self {
        HeadOfStateForm {
            name: name.into(),
            start_date,
            end_date,
            gdp_start: clamp_gdp(gdp_start),
            gdp_end: clamp_gdp(gdp_end),
        }
    }

    /// Build the record; growth is computed here and nowhere else
    pub fn into_record(self) -> HeadOfStateRecord {
        HeadOfStateRecord::new(
            self.name,
            self.start_date,
            self.end_date,
            self.gdp_start,
            self.gdp_end,
        )
    }
}

impl RawHeadOfStateForm {
    pub fn parse(&self) -> Result<HeadOfStateForm, FormError> {
        Ok(HeadOfStateForm::new(
            self.name.trim(),
            parse_date("Start Date", &self.start_date)?,
            parse_date("End Date", &self.end_date)?,
            parse_gdp("GDP Start", &self.gdp_start)?,
            parse_gdp("GDP End", &self.gdp_end)?,
        ))
    }
}
