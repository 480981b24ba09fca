use crate::record::{Column, Record, parse_decimal};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    #[serde(alias = "asc")]
    Ascending,
    #[serde(alias = "desc")]
    Descending,
}

impl SortDirection {
    pub fn key(self) -> &'static str {
        match self {
            SortDirection::Ascending => "asc",
            SortDirection::Descending => "desc",
        }
    }
}

/// Which column the table is sorted by, if any
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SortState(Option<(Column, SortDirection)>);

impl SortState {
    pub fn unsorted() -> Self {
        SortState(None)
    }

    pub fn by(column: Column, direction: SortDirection) -> Self {
        SortState(Some((column, direction)))
    }

    pub fn column(&self) -> Option<Column> {
        self.0.map(|(column, _)| column)
    }

    pub fn direction_of(&self, column: Column) -> Option<SortDirection> {
        match self.0 {
            Some((c, direction)) if c == column => Some(direction),
            _ => None,
        }
    }

    /// State after a click on `column`'s header
    ///
    /// The same column cycles none -> ascending -> descending -> none. A
    /// different column replaces the current sort, starting ascending.
    pub fn toggle(self, column: Column) -> Self {
        match self.direction_of(column) {
            None => SortState::by(column, SortDirection::Ascending),
            Some(SortDirection::Ascending) => SortState::by(column, SortDirection::Descending),
            Some(SortDirection::Descending) => SortState::unsorted(),
        }
    }

    pub fn as_pair(&self) -> Option<(Column, SortDirection)> {
        self.0
    }
}

/// Derived, read-only view over a record list
pub struct TableView;

impl TableView {
    /// Rows visible under `filter` ordered by `sort`
    ///
    /// An empty filter keeps every row. Sorting is stable, so rows that
    /// compare equal keep the order they had in `records`.
    pub fn rows<'a>(records: &'a [Record], filter: &str, sort: SortState) -> Vec<&'a Record> {
        let needle = filter.to_lowercase();
        let mut rows: Vec<&Record> = records
            .iter()
            .filter(|record| Self::matches(record, &needle))
            .collect();

        if let Some((column, direction)) = sort.as_pair() {
            rows.sort_by(|a, b| compare(a, b, column, direction));
        }

        rows
    }

    fn matches(record: &Record, needle: &str) -> bool {
        needle.is_empty()
            || Column::ALL
                .iter()
                .any(|&column| record.raw(column).to_lowercase().contains(needle))
    }
}

/// Ordering of two records on one column
///
/// Counts that failed to parse always come after real numbers. Bounce rates
/// compare by their numeric value; rates without one come after those that
/// have one.
pub fn compare(a: &Record, b: &Record, column: Column, direction: SortDirection) -> Ordering {
    let directed = |ord: Ordering| match direction {
        SortDirection::Ascending => ord,
        SortDirection::Descending => ord.reverse(),
    };

    if column.is_numeric() {
        match (a.count(column), b.count(column)) {
            (Some(x), Some(y)) => directed(x.cmp(&y)),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
    } else if column == Column::BounceRate {
        match (parse_decimal(&a.bounce_rate), parse_decimal(&b.bounce_rate)) {
            (Some(x), Some(y)) => directed(x.total_cmp(&y)),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => directed(natural_cmp(&a.bounce_rate, &b.bounce_rate)),
        }
    } else {
        directed(natural_cmp(a.text(column), b.text(column)))
    }
}

/// Case-insensitive comparison that orders digit runs by numeric value
///
/// `"9.8%"` sorts before `"45.2%"`, and `"site2"` before `"site10"`.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let a = a.to_lowercase();
    let b = b.to_lowercase();
    let mut left = a.chars().peekable();
    let mut right = b.chars().peekable();

    loop {
        match (left.peek().copied(), right.peek().copied()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(x), Some(y)) if x.is_ascii_digit() && y.is_ascii_digit() => {
                let x_run = take_digits(&mut left);
                let y_run = take_digits(&mut right);
                let ord = cmp_digit_runs(&x_run, &y_run);
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            (Some(x), Some(y)) => {
                if x != y {
                    return x.cmp(&y);
                }
                left.next();
                right.next();
            }
        }
    }
}

fn take_digits(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> String {
    let mut run = String::new();
    while let Some(&c) = chars.peek() {
        if !c.is_ascii_digit() {
            break;
        }
        run.push(c);
        chars.next();
    }
    run
}

fn cmp_digit_runs(x: &str, y: &str) -> Ordering {
    let x = x.trim_start_matches('0');
    let y = y.trim_start_matches('0');
    x.len().cmp(&y.len()).then_with(|| x.cmp(y))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(domain: &str, category: &str, views: Option<i64>, bounce: &str) -> Record {
        Record {
            domain_name: domain.to_string(),
            category: category.to_string(),
            page_views: views,
            unique_visitors: views.map(|v| v / 2),
            bounce_rate: bounce.to_string(),
        }
    }

    fn sample() -> Vec<Record> {
        vec![
            record("beta.io", "Tech", Some(300), "45.2%"),
            record("alpha.com", "News", Some(1200), "9.8%"),
            record("gamma.net", "tech", None, "30%"),
            record("delta.org", "News", Some(300), "12%"),
        ]
    }

    fn domains(rows: &[&Record]) -> Vec<String> {
        rows.iter().map(|r| r.domain_name.clone()).collect()
    }

    #[test]
    fn toggle_cycles_none_asc_desc_none() {
        let state = SortState::unsorted();
        let state = state.toggle(Column::Category);
        assert_eq!(state, SortState::by(Column::Category, SortDirection::Ascending));
        let state = state.toggle(Column::Category);
        assert_eq!(state, SortState::by(Column::Category, SortDirection::Descending));
        let state = state.toggle(Column::Category);
        assert_eq!(state, SortState::unsorted());
    }

    #[test]
    fn toggle_on_another_column_restarts_ascending() {
        let state = SortState::by(Column::PageViews, SortDirection::Descending);
        assert_eq!(
            state.toggle(Column::DomainName),
            SortState::by(Column::DomainName, SortDirection::Ascending)
        );
    }

    #[test]
    fn filter_matching_one_domain_yields_one_row() {
        let records = sample();
        let rows = TableView::rows(&records, "ALPHA", SortState::unsorted());
        assert_eq!(domains(&rows), vec!["alpha.com"]);
    }

    #[test]
    fn filter_without_matches_yields_nothing() {
        let records = sample();
        assert!(TableView::rows(&records, "zzz", SortState::unsorted()).is_empty());
    }

    #[test]
    fn filter_matches_every_column() {
        let records = sample();
        assert_eq!(TableView::rows(&records, "tech", SortState::unsorted()).len(), 2);
        assert_eq!(TableView::rows(&records, "1200", SortState::unsorted()).len(), 1);
        assert_eq!(TableView::rows(&records, "9.8", SortState::unsorted()).len(), 1);
        assert_eq!(TableView::rows(&records, "nan", SortState::unsorted()).len(), 1);
    }

    #[test]
    fn empty_filter_keeps_original_order() {
        let records = sample();
        let rows = TableView::rows(&records, "", SortState::unsorted());
        assert_eq!(
            domains(&rows),
            vec!["beta.io", "alpha.com", "gamma.net", "delta.org"]
        );
    }

    #[test]
    fn numeric_sort_is_stable_with_nan_last() {
        let records = sample();

        let asc = TableView::rows(
            &records,
            "",
            SortState::by(Column::PageViews, SortDirection::Ascending),
        );
        assert_eq!(
            domains(&asc),
            vec!["beta.io", "delta.org", "alpha.com", "gamma.net"]
        );

        let desc = TableView::rows(
            &records,
            "",
            SortState::by(Column::PageViews, SortDirection::Descending),
        );
        assert_eq!(
            domains(&desc),
            vec!["alpha.com", "beta.io", "delta.org", "gamma.net"]
        );
    }

    #[test]
    fn text_sort_ignores_case_and_keeps_ties_in_order() {
        let records = sample();
        let rows = TableView::rows(
            &records,
            "",
            SortState::by(Column::Category, SortDirection::Ascending),
        );
        assert_eq!(
            domains(&rows),
            vec!["alpha.com", "delta.org", "beta.io", "gamma.net"]
        );
    }

    #[test]
    fn bounce_rate_sorts_by_numeric_value() {
        let records = sample();
        let rows = TableView::rows(
            &records,
            "",
            SortState::by(Column::BounceRate, SortDirection::Ascending),
        );
        assert_eq!(
            domains(&rows),
            vec!["alpha.com", "delta.org", "gamma.net", "beta.io"]
        );
    }

    #[test]
    fn bounce_rate_compares_fractional_parts_by_value() {
        let records = vec![
            record("a.com", "News", Some(1), "45.2%"),
            record("b.com", "News", Some(1), "45.15%"),
            record("c.com", "News", Some(1), "1.5%"),
            record("d.com", "News", Some(1), "1.25%"),
            record("e.com", "News", Some(1), "n/a"),
        ];

        let asc = TableView::rows(
            &records,
            "",
            SortState::by(Column::BounceRate, SortDirection::Ascending),
        );
        assert_eq!(domains(&asc), vec!["d.com", "c.com", "b.com", "a.com", "e.com"]);

        let desc = TableView::rows(
            &records,
            "",
            SortState::by(Column::BounceRate, SortDirection::Descending),
        );
        assert_eq!(domains(&desc), vec!["a.com", "b.com", "c.com", "d.com", "e.com"]);
    }

    #[test]
    fn natural_cmp_orders_digit_runs() {
        assert_eq!(natural_cmp("site2", "site10"), Ordering::Less);
        assert_eq!(natural_cmp("Site", "site"), Ordering::Equal);
        assert_eq!(natural_cmp("007", "7"), Ordering::Equal);
        assert_eq!(natural_cmp("a", "ab"), Ordering::Less);
    }

    #[test]
    fn filtering_and_sorting_do_not_touch_records() {
        let records = sample();
        let before = records.clone();
        let _ = TableView::rows(
            &records,
            "news",
            SortState::by(Column::DomainName, SortDirection::Descending),
        );
        assert_eq!(records, before);
    }
}
