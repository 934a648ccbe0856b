use super::join::MergedRecord;

/// Country, then tenure start date, then leader. Stable: remaining ties keep join order.
pub fn sort_merged(rows: &mut [MergedRecord]) {
    rows.sort_by(|a, b| {
        a.country
            .cmp(&b.country)
            .then_with(|| a.start_date.cmp(&b.start_date))
            .then_with(|| a.leader.cmp(&b.leader))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn row(country: &str, start: &str, leader: &str, year: i32) -> MergedRecord {
        MergedRecord {
            country: country.to_string(),
            leader: leader.to_string(),
            start_date: NaiveDate::parse_from_str(start, "%Y-%m-%d").unwrap(),
            end_date: None,
            year,
            inflation: None,
            unemployment: None,
            gdp_growth: None,
            gdp_per_capita_growth: None,
        }
    }

    #[test]
    fn test_earlier_start_first_within_country() {
        let mut rows = vec![
            row("Country A", "2001-01-01", "X", 2001),
            row("Country A", "1999-01-01", "Y", 1999),
        ];
        sort_merged(&mut rows);

        assert_eq!(rows[0].leader, "Y");
        assert_eq!(rows[1].leader, "X");
    }

    #[test]
    fn test_full_ordering() {
        let mut rows = vec![
            row("Chile", "2006-03-11", "Bachelet", 2006),
            row("Brazil", "2003-01-01", "Lula", 2003),
            row("Chile", "2006-03-11", "Acting", 2006),
            row("Argentina", "2019-12-10", "Fernandez", 2019),
        ];
        sort_merged(&mut rows);

        let order: Vec<&str> = rows.iter().map(|r| r.leader.as_str()).collect();
        assert_eq!(order, vec!["Fernandez", "Lula", "Acting", "Bachelet"]);
    }

    #[test]
    fn test_stable_for_full_ties() {
        let mut rows = vec![
            row("Chile", "2006-03-11", "Bachelet", 2006),
            row("Chile", "2006-03-11", "Bachelet", 2010),
        ];
        sort_merged(&mut rows);

        assert_eq!(rows[0].year, 2006);
        assert_eq!(rows[1].year, 2010);
    }
}
