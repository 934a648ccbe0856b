// Merged table output: aligned text for the terminal, CSV for files

use super::join::MergedRecord;
use std::io::Write;

pub const MERGED_COLUMNS: [&str; 9] = [
    "country",
    "leader",
    "startdate",
    "enddate",
    "year",
    "inflation",
    "unemployment",
    "gdp_growth",
    "gdp_per_capita_growth",
];

fn fmt_rate(value: Option<f64>) -> String {
    value.map(|v| format!("{:.2}", v)).unwrap_or_default()
}

/// Display cells in column order
pub fn merged_cells(row: &MergedRecord) -> [String; 9] {
    [
        row.country.clone(),
        row.leader.clone(),
        row.start_date.format("%Y-%m-%d").to_string(),
        row.end_date
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_default(),
        row.year.to_string(),
        fmt_rate(row.inflation),
        fmt_rate(row.unemployment),
        fmt_rate(row.gdp_growth),
        fmt_rate(row.gdp_per_capita_growth),
    ]
}

/// Left-aligned columns separated by two spaces, optionally led by a 0-based row index
pub fn render_aligned(headers: &[&str], rows: &[Vec<String>], with_index: bool) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (w, cell) in widths.iter_mut().zip(row) {
            *w = (*w).max(cell.chars().count());
        }
    }
    let index_width = rows.len().saturating_sub(1).to_string().len();

    let mut out = String::new();
    let mut push_line = |index: Option<String>, cells: Vec<&str>| {
        let mut line = Vec::with_capacity(cells.len() + 1);
        if with_index {
            line.push(format!("{:>width$}", index.unwrap_or_default(), width = index_width));
        }
        for (cell, w) in cells.iter().zip(&widths) {
            line.push(format!("{:<width$}", cell, width = *w));
        }
        out.push_str(&line.join("  "));
        out.push('\n');
    };

    push_line(None, headers.to_vec());
    for (i, row) in rows.iter().enumerate() {
        push_line(Some(i.to_string()), row.iter().map(String::as_str).collect());
    }

    out
}

/// Merged rows as an aligned text table with an index column
pub fn render_text_table(rows: &[MergedRecord]) -> String {
    let cells: Vec<Vec<String>> = rows.iter().map(|r| merged_cells(r).to_vec()).collect();
    render_aligned(&MERGED_COLUMNS, &cells, true)
}

pub fn write_csv<W: Write>(rows: &[MergedRecord], writer: W) -> Result<(), csv::Error> {
    let mut wtr = csv::WriterBuilder::new().has_headers(false).from_writer(writer);
    wtr.write_record(MERGED_COLUMNS)?;
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn row() -> MergedRecord {
        MergedRecord {
            country: "Chile".to_string(),
            leader: "Bachelet".to_string(),
            start_date: NaiveDate::from_ymd_opt(2006, 3, 11).unwrap(),
            end_date: None,
            year: 2006,
            inflation: Some(3.392),
            unemployment: None,
            gdp_growth: Some(6.3),
            gdp_per_capita_growth: Some(5.2),
        }
    }

    #[test]
    fn test_csv_has_header_and_blank_nulls() {
        let mut out = Vec::new();
        write_csv(&[row()], &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        let mut lines = text.lines();
        assert_eq!(
            lines.next().unwrap(),
            "country,leader,startdate,enddate,year,inflation,unemployment,gdp_growth,gdp_per_capita_growth"
        );
        assert_eq!(lines.next().unwrap(), "Chile,Bachelet,2006-03-11,,2006,3.392,,6.3,5.2");
    }

    #[test]
    fn test_text_table_alignment() {
        let text = render_text_table(&[row(), row()]);
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 3);
        assert!(lines[0].contains("country"));
        assert!(lines[1].starts_with("0  Chile"));
        assert!(lines[2].starts_with("1  Chile"));
        assert!(lines[1].contains("3.39"));
        assert_eq!(lines[1].len(), lines[2].len());
    }

    #[test]
    fn test_aligned_without_index() {
        let rows = vec![
            vec!["Lee".to_string(), "2.50".to_string()],
            vec!["Alexandra".to_string(), "10.00".to_string()],
        ];
        let text = render_aligned(&["Name", "GDP Growth"], &rows, false);
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "Name       GDP Growth");
        assert_eq!(lines[1], "Lee        2.50      ");
        assert_eq!(lines[2], "Alexandra  10.00     ");
    }

    #[test]
    fn test_empty_table_renders_header() {
        let text = render_text_table(&[]);
        assert_eq!(text.lines().count(), 1);
    }
}
