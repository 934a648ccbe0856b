// Tenure/Economics Merger
// Tenure Loader → Name Normalizer → Indicator Loader → Year-Keyed Joiner → Sorter

pub mod indicators;
pub mod join;
pub mod normalize;
pub mod present;
pub mod sort;
pub mod tenure;

use std::ops::RangeInclusive;
use std::path::Path;
use thiserror::Error;
use tracing::{info, warn};

pub use indicators::{
    Indicator, IndicatorFile, IndicatorRecord, IndicatorSource, WorldBankClient,
    DEFAULT_WORLD_BANK_URL,
};
pub use join::{year_keyed_join, JoinReport, MergedRecord};
pub use normalize::CountryNormalizer;
pub use present::{render_aligned, render_text_table, write_csv, MERGED_COLUMNS};
pub use sort::sort_merged;
pub use tenure::{load_tenures, parse_tenures, TenureRecord};

#[derive(Error, Debug)]
pub enum MergeError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON deserialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Indicator service error: {0}")]
    Service(String),

    #[error("Tenure file line {line}: {message}")]
    TenureRow { line: u64, message: String },
}

/// Merged, sorted rows plus what the join dropped along the way
#[derive(Debug, Clone)]
pub struct MergeOutcome {
    pub rows: Vec<MergedRecord>,
    pub report: JoinReport,
    /// Tenures whose country was rewritten by the normalizer
    pub renamed: usize,
}

/// Pure tail of the pipeline: normalize, join, sort
pub fn merge_tables(
    mut tenures: Vec<TenureRecord>,
    indicators: &[IndicatorRecord],
    normalizer: &CountryNormalizer,
) -> MergeOutcome {
    let renamed = normalizer.normalize_tenures(&mut tenures);
    let (mut rows, report) = year_keyed_join(&tenures, indicators);
    sort_merged(&mut rows);

    MergeOutcome {
        rows,
        report,
        renamed,
    }
}

/// Full run: read the tenure file, fetch indicators, merge.
///
/// Any load failure aborts the run. Join misses are only reported.
pub fn run_merge(
    tenure_path: &Path,
    source: &dyn IndicatorSource,
    years: RangeInclusive<i32>,
) -> Result<MergeOutcome, MergeError> {
    let tenures = load_tenures(tenure_path)?;

    info!(source = %source.describe(), from = years.start(), to = years.end(), "fetching indicators");
    let indicators = source.fetch(years)?;

    let outcome = merge_tables(tenures, &indicators, &CountryNormalizer::with_defaults());
    let report = &outcome.report;

    info!(
        tenures = report.tenures,
        renamed = outcome.renamed,
        start_hits = report.start_hits,
        end_hits = report.end_hits,
        duplicates = report.duplicates_collapsed,
        rows = report.rows,
        "merge complete"
    );
    if report.dropped_tenures > 0 {
        warn!(
            dropped = report.dropped_tenures,
            "tenure rows dropped for missing indicator year"
        );
    }
    if !report.unmatched_countries.is_empty() {
        warn!(
            countries = ?report.unmatched_countries,
            "tenure countries not found in indicator data"
        );
    }

    Ok(outcome)
}
