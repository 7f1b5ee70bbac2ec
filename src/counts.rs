//! Yearly publication counts and derived series.
//!
//! Builds the per-year count table that drives the chart: entries are
//! tallied by their raw `year` token, coerced to numeric years, and sorted
//! ascending. A trailing moving average over the count column is derived
//! from the finished table.

use crate::{BibtrendError, Entry, Result};
use itertools::Itertools;
use serde::{Deserialize, Serialize};

/// A single row of the publication-count table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearRow {
    /// Publication year
    pub year: i32,
    /// Number of entries published that year
    pub count: u64,
}

/// Publication counts per year, sorted ascending with no duplicate years.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearCounts {
    rows: Vec<YearRow>,
}

impl YearCounts {
    /// Builds the count table from parsed entries.
    ///
    /// Entries without a `year` field are skipped. The remaining raw tokens
    /// are tallied before numeric coercion; distinct tokens that coerce to
    /// the same year (such as `2020` and `02020`) are merged by summing
    /// their tallies, so the table never holds duplicate years.
    ///
    /// # Errors
    ///
    /// Returns [`BibtrendError::InvalidYear`] if any year token fails to
    /// parse as an integer
    pub fn from_entries(entries: &[Entry]) -> Result<Self> {
        let token_counts = entries.iter().filter_map(Entry::year).counts();

        let mut rows = Vec::with_capacity(token_counts.len());
        for (token, count) in token_counts {
            let year = token
                .trim()
                .parse::<i32>()
                .map_err(|_| BibtrendError::InvalidYear(token.to_string()))?;
            rows.push(YearRow {
                year,
                count: count as u64,
            });
        }

        rows.sort_unstable_by_key(|row| row.year);

        let rows = rows
            .into_iter()
            .coalesce(|a, b| {
                if a.year == b.year {
                    Ok(YearRow {
                        year: a.year,
                        count: a.count + b.count,
                    })
                } else {
                    Err((a, b))
                }
            })
            .collect();

        Ok(Self { rows })
    }

    /// The table rows, ascending by year.
    #[must_use]
    pub fn rows(&self) -> &[YearRow] {
        &self.rows
    }

    /// Number of rows in the table.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// True when no entry carried a year.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Total number of counted entries, i.e. the sum of the count column.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.rows.iter().map(|row| row.count).sum()
    }

    /// First and last year in the table, when any rows exist.
    #[must_use]
    pub fn year_span(&self) -> Option<(i32, i32)> {
        match (self.rows.first(), self.rows.last()) {
            (Some(first), Some(last)) => Some((first.year, last.year)),
            _ => None,
        }
    }

    /// Trailing moving average of the count column, one value per row.
    ///
    /// Early rows where fewer than `window` counts are available average
    /// what is there: row 0 averages one count, row 1 averages two, and so
    /// on until the full window applies.
    ///
    /// # Errors
    ///
    /// Returns [`BibtrendError::InvalidWindow`] if `window` is zero
    pub fn moving_average(&self, window: usize) -> Result<Vec<f64>> {
        if window == 0 {
            return Err(BibtrendError::InvalidWindow(window));
        }

        let mut averages = Vec::with_capacity(self.rows.len());
        for pos in 0..self.rows.len() {
            let start = pos.saturating_sub(window - 1);
            let in_window = &self.rows[start..=pos];
            let sum: u64 = in_window.iter().map(|row| row.count).sum();
            averages.push(sum as f64 / in_window.len() as f64);
        }

        Ok(averages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::*;
    use std::collections::HashMap;

    fn entry_with_year(year: Option<&str>) -> Entry {
        let mut fields = HashMap::new();
        if let Some(year) = year {
            fields.insert("year".to_string(), year.to_string());
        }
        Entry {
            entry_type: "article".to_string(),
            key: "k".to_string(),
            fields,
        }
    }

    fn counts_for(years: &[&str]) -> YearCounts {
        let entries: Vec<Entry> = years.iter().map(|y| entry_with_year(Some(y))).collect();
        YearCounts::from_entries(&entries).unwrap()
    }

    #[test]
    fn test_counts_sorted_ascending_with_total() {
        let counts = counts_for(&["2019", "2019", "2020", "2021", "2021", "2021"]);

        assert_eq!(
            counts.rows(),
            &[
                YearRow { year: 2019, count: 2 },
                YearRow { year: 2020, count: 1 },
                YearRow { year: 2021, count: 3 },
            ]
        );
        assert_eq!(counts.total(), 6);
        assert_eq!(counts.year_span(), Some((2019, 2021)));
    }

    #[test]
    fn test_entries_without_year_are_skipped() {
        let entries = vec![
            entry_with_year(Some("2020")),
            entry_with_year(None),
            entry_with_year(Some("2020")),
        ];

        let counts = YearCounts::from_entries(&entries).unwrap();
        assert_eq!(counts.rows(), &[YearRow { year: 2020, count: 2 }]);
        assert_eq!(counts.total(), 2);
    }

    #[test]
    fn test_unordered_input_is_sorted() {
        let counts = counts_for(&["2021", "1998", "2005", "1998"]);
        let years: Vec<i32> = counts.rows().iter().map(|row| row.year).collect();
        assert_eq!(years, vec![1998, 2005, 2021]);
    }

    #[test]
    fn test_tokens_coercing_to_same_year_are_merged() {
        let counts = counts_for(&["2020", "02020", "2021"]);
        assert_eq!(
            counts.rows(),
            &[
                YearRow { year: 2020, count: 2 },
                YearRow { year: 2021, count: 1 },
            ]
        );
    }

    #[rstest]
    #[case("n.d.")]
    #[case("2021a")]
    #[case("forthcoming")]
    #[case("")]
    fn test_invalid_year_token_fails(#[case] token: &str) {
        let entries = vec![entry_with_year(Some(token))];
        let result = YearCounts::from_entries(&entries);
        assert!(matches!(
            result,
            Err(BibtrendError::InvalidYear(t)) if t == token
        ));
    }

    #[test]
    fn test_empty_entries_yield_empty_table() {
        let counts = YearCounts::from_entries(&[]).unwrap();
        assert!(counts.is_empty());
        assert_eq!(counts.len(), 0);
        assert_eq!(counts.total(), 0);
        assert_eq!(counts.year_span(), None);
        assert_eq!(counts.moving_average(3).unwrap(), Vec::<f64>::new());
    }

    #[test]
    fn test_moving_average_short_prefix_averages_available_rows() {
        // Counts 2, 1, 3 across three consecutive years
        let counts = counts_for(&["2019", "2019", "2020", "2021", "2021", "2021"]);
        let averages = counts.moving_average(3).unwrap();
        assert_eq!(averages, vec![2.0, 1.5, 2.0]);
    }

    #[test]
    fn test_moving_average_full_window_slides() {
        let counts = counts_for(&["2018", "2019", "2019", "2020", "2020", "2020", "2021"]);
        // Counts are 1, 2, 3, 1
        let averages = counts.moving_average(3).unwrap();
        assert_eq!(averages, vec![1.0, 1.5, 2.0, 2.0]);
    }

    #[rstest]
    #[case(1, vec![2.0, 1.0, 3.0])]
    #[case(10, vec![2.0, 1.5, 2.0])]
    fn test_moving_average_window_sizes(#[case] window: usize, #[case] expected: Vec<f64>) {
        let counts = counts_for(&["2019", "2019", "2020", "2021", "2021", "2021"]);
        assert_eq!(counts.moving_average(window).unwrap(), expected);
    }

    #[test]
    fn test_moving_average_rejects_zero_window() {
        let counts = counts_for(&["2020"]);
        assert!(matches!(
            counts.moving_average(0),
            Err(BibtrendError::InvalidWindow(0))
        ));
    }
}
