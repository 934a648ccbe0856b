// 🏛️ Head of State table - the persisted dataset of the editor
// One CSV object, fixed header, no index column

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;

/// Fixed column set, in persisted order
pub const COLUMNS: [&str; 6] = [
    "Name",
    "Start Date",
    "End Date",
    "GDP Start",
    "GDP End",
    "GDP Growth",
];

// ============================================================================
// RECORD
// ============================================================================

/// One head of state's tenure with GDP at both ends (billions)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeadOfStateRecord {
    #[serde(rename = "Name")]
    pub name: String,

    #[serde(rename = "Start Date")]
    pub start_date: NaiveDate,

    #[serde(rename = "End Date")]
    pub end_date: NaiveDate,

    #[serde(rename = "GDP Start", with = "rust_decimal::serde::str")]
    pub gdp_start: Decimal,

    #[serde(rename = "GDP End", with = "rust_decimal::serde::str")]
    pub gdp_end: Decimal,

    /// Always GDP End - GDP Start for records built here
    #[serde(rename = "GDP Growth", with = "rust_decimal::serde::str")]
    pub gdp_growth: Decimal,
}

impl HeadOfStateRecord {
    /// Build a record; growth is derived, never supplied
    pub fn new(
        name: String,
        start_date: NaiveDate,
        end_date: NaiveDate,
        gdp_start: Decimal,
        gdp_end: Decimal,
    ) -> Self {
        HeadOfStateRecord {
            name,
            start_date,
            end_date,
            gdp_start,
            gdp_end,
            gdp_growth: gdp_end - gdp_start,
        }
    }

    /// Re-derive growth from the two GDP figures
    pub fn recompute(&mut self) {
        self.gdp_growth = self.gdp_end - self.gdp_start;
    }

    /// Display cells in column order
    pub fn cells(&self) -> [String; 6] {
        [
            self.name.clone(),
            self.start_date.format("%Y-%m-%d").to_string(),
            self.end_date.format("%Y-%m-%d").to_string(),
            format!("{:.2}", self.gdp_start),
            format!("{:.2}", self.gdp_end),
            format!("{:.2}", self.gdp_growth),
        ]
    }
}

// ============================================================================
// TABLE
// ============================================================================

/// In-memory table in stored order (newest first)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HeadOfStateTable {
    rows: Vec<HeadOfStateRecord>,
}

impl HeadOfStateTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_rows(rows: Vec<HeadOfStateRecord>) -> Self {
        HeadOfStateTable { rows }
    }

    pub fn columns(&self) -> &'static [&'static str] {
        &COLUMNS
    }

    pub fn rows(&self) -> &[HeadOfStateRecord] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// New table with `record` in front. `self` is untouched.
    pub fn with_prepended(&self, record: HeadOfStateRecord) -> Self {
        let mut rows = Vec::with_capacity(self.rows.len() + 1);
        rows.push(record);
        rows.extend(self.rows.iter().cloned());
        HeadOfStateTable { rows }
    }

    /// Display order: GDP Growth descending, ties keep stored order
    pub fn ranked(&self) -> Vec<&HeadOfStateRecord> {
        let mut ranked: Vec<&HeadOfStateRecord> = self.rows.iter().collect();
        ranked.sort_by_key(|r| Reverse(r.gdp_growth));
        ranked
    }

    // ========================================================================
    // CSV CODEC
    // ========================================================================

    pub fn from_csv(bytes: &[u8]) -> Result<Self, csv::Error> {
        let mut rdr = csv::Reader::from_reader(bytes);
        let mut rows = Vec::new();
        for result in rdr.deserialize() {
            let record: HeadOfStateRecord = result?;
            rows.push(record);
        }
        Ok(HeadOfStateTable { rows })
    }

    /// Header is always written, even for an empty table
    pub fn to_csv(&self) -> Result<Vec<u8>, csv::Error> {
        let mut wtr = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(Vec::new());
        wtr.write_record(COLUMNS)?;
        for row in &self.rows {
            wtr.serialize(row)?;
        }
        wtr.into_inner().map_err(|e| e.into_error().into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn record(name: &str, start: &str, end: &str) -> HeadOfStateRecord {
        HeadOfStateRecord::new(
            name.to_string(),
            date("2000-01-01"),
            date("2004-01-01"),
            dec(start),
            dec(end),
        )
    }

    #[test]
    fn test_growth_is_exact_difference() {
        let r = record("A", "10.00", "12.50");
        assert_eq!(r.gdp_growth, dec("2.50"));

        let r = record("B", "10.10", "12.30");
        assert_eq!(r.gdp_growth, dec("2.20"));

        let r = record("C", "5.00", "3.25");
        assert_eq!(r.gdp_growth, dec("-1.75"));
    }

    #[test]
    fn test_recompute_overrides_stored_growth() {
        let mut r = record("A", "1.00", "2.00");
        r.gdp_growth = dec("99");
        r.recompute();
        assert_eq!(r.gdp_growth, dec("1.00"));
    }

    #[test]
    fn test_empty_table_serializes_header_only() {
        let table = HeadOfStateTable::new();
        let bytes = table.to_csv().unwrap();

        assert_eq!(
            String::from_utf8(bytes).unwrap(),
            "Name,Start Date,End Date,GDP Start,GDP End,GDP Growth\n"
        );
    }

    #[test]
    fn test_header_only_csv_is_empty_table() {
        let table =
            HeadOfStateTable::from_csv(b"Name,Start Date,End Date,GDP Start,GDP End,GDP Growth\n")
                .unwrap();
        assert!(table.is_empty());
        assert_eq!(table.columns(), &COLUMNS);
    }

    #[test]
    fn test_reads_pandas_written_rows() {
        let csv = "Name,Start Date,End Date,GDP Start,GDP End,GDP Growth\n\
                   \"Lee, K.\",2001-02-03,2005-06-07,10.0,12.5,2.5\n";
        let table = HeadOfStateTable::from_csv(csv.as_bytes()).unwrap();

        assert_eq!(table.len(), 1);
        let row = &table.rows()[0];
        assert_eq!(row.name, "Lee, K.");
        assert_eq!(row.start_date, date("2001-02-03"));
        assert_eq!(row.gdp_growth, dec("2.5"));
    }

    #[test]
    fn test_written_row_keeps_two_decimals() {
        let table = HeadOfStateTable::new().with_prepended(record("A", "10.00", "12.50"));
        let text = String::from_utf8(table.to_csv().unwrap()).unwrap();

        assert!(text.ends_with("A,2000-01-01,2004-01-01,10.00,12.50,2.50\n"));
        assert_eq!(HeadOfStateTable::from_csv(text.as_bytes()).unwrap(), table);
    }

    #[test]
    fn test_prepend_does_not_mutate_original() {
        let base = HeadOfStateTable::from_rows(vec![record("Old", "1", "2")]);
        let next = base.with_prepended(record("New", "1", "3"));

        assert_eq!(base.len(), 1);
        assert_eq!(next.len(), 2);
        assert_eq!(next.rows()[0].name, "New");
        assert_eq!(next.rows()[1].name, "Old");
    }

    #[test]
    fn test_ranked_by_growth_descending_and_stable() {
        let table = HeadOfStateTable::from_rows(vec![
            record("Low", "10", "11"),
            record("High", "10", "20"),
            record("TieFirst", "10", "15"),
            record("TieSecond", "0", "5"),
        ]);

        let names: Vec<&str> = table.ranked().iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["High", "TieFirst", "TieSecond", "Low"]);

        // Stored order untouched
        assert_eq!(table.rows()[0].name, "Low");
    }

    #[test]
    fn test_cells_format() {
        let r = record("A", "10", "12.5");
        assert_eq!(
            r.cells(),
            [
                "A".to_string(),
                "2000-01-01".to_string(),
                "2004-01-01".to_string(),
                "10.00".to_string(),
                "12.50".to_string(),
                "2.50".to_string(),
            ]
        );
    }
}
