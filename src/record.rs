use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

lazy_static! {
    static ref LEADING_INT_REGEX: Regex = Regex::new(r"^\s*([+-]?[0-9]+)").unwrap();
    static ref LEADING_DECIMAL_REGEX: Regex =
        Regex::new(r"^\s*([+-]?(?:[0-9]+(?:\.[0-9]*)?|\.[0-9]+))").unwrap();
}

/// Text shown for a count that could not be parsed
pub const NOT_A_NUMBER: &str = "NaN";

/// One parsed row of the analytics sheet
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct Record {
    pub domain_name: String,
    pub category: String,
    pub page_views: Option<i64>,
    pub unique_visitors: Option<i64>,
    /// Already formatted as a percentage by the sheet, e.g. `"45.2%"`
    pub bounce_rate: String,
}

/// The displayed columns, in display order
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Column {
    DomainName,
    Category,
    PageViews,
    UniqueVisitors,
    BounceRate,
}

impl Column {
    pub const ALL: [Column; 5] = [
        Column::DomainName,
        Column::Category,
        Column::PageViews,
        Column::UniqueVisitors,
        Column::BounceRate,
    ];

    pub fn header(self) -> &'static str {
        match self {
            Column::DomainName => "Domain Name",
            Column::Category => "Category",
            Column::PageViews => "Page Views",
            Column::UniqueVisitors => "Unique Visitors",
            Column::BounceRate => "Bounce Rate",
        }
    }

    /// Key used for this column in query strings
    pub fn key(self) -> &'static str {
        match self {
            Column::DomainName => "domain_name",
            Column::Category => "category",
            Column::PageViews => "page_views",
            Column::UniqueVisitors => "unique_visitors",
            Column::BounceRate => "bounce_rate",
        }
    }

    pub fn is_numeric(self) -> bool {
        matches!(self, Column::PageViews | Column::UniqueVisitors)
    }
}

impl Record {
    /// Build a record from positional CSV fields
    ///
    /// Fields map in order to domain name, category, page views, unique
    /// visitors and bounce rate. Missing fields are treated as empty and
    /// anything past the fifth field is ignored.
    pub fn from_fields(fields: &[String]) -> Self {
        let field = |i: usize| fields.get(i).map(String::as_str).unwrap_or("");

        Record {
            domain_name: field(0).to_string(),
            category: field(1).to_string(),
            page_views: parse_int(field(2)),
            unique_visitors: parse_int(field(3)),
            bounce_rate: field(4).to_string(),
        }
    }

    pub fn count(&self, column: Column) -> Option<i64> {
        match column {
            Column::PageViews => self.page_views,
            Column::UniqueVisitors => self.unique_visitors,
            _ => None,
        }
    }

    pub fn text(&self, column: Column) -> &str {
        match column {
            Column::DomainName => &self.domain_name,
            Column::Category => &self.category,
            Column::BounceRate => &self.bounce_rate,
            Column::PageViews | Column::UniqueVisitors => "",
        }
    }

    /// Unformatted value, used for searching and exports
    pub fn raw(&self, column: Column) -> String {
        if column.is_numeric() {
            match self.count(column) {
                Some(n) => n.to_string(),
                None => NOT_A_NUMBER.to_string(),
            }
        } else {
            self.text(column).to_string()
        }
    }

    /// Value as shown in the table, counts grouped by thousands
    pub fn display(&self, column: Column) -> String {
        if column.is_numeric() {
            match self.count(column) {
                Some(n) => group_thousands(n),
                None => NOT_A_NUMBER.to_string(),
            }
        } else {
            self.text(column).to_string()
        }
    }
}

/// Base-10 integer coercion with the leniency of JavaScript's `parseInt`
///
/// Leading whitespace and an optional sign are accepted, then the longest run
/// of digits is taken and anything after it is ignored. Returns `None` when
/// no digits lead the text or the value does not fit in an `i64`.
pub fn parse_int(text: &str) -> Option<i64> {
    LEADING_INT_REGEX
        .captures(text)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<i64>().ok())
}

/// Leading decimal number of a text field, e.g. `45.2` from `"45.2%"`
pub fn parse_decimal(text: &str) -> Option<f64> {
    LEADING_DECIMAL_REGEX
        .captures(text)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<f64>().ok())
}

/// Format an integer with `,` between groups of three digits
pub fn group_thousands(n: i64) -> String {
    let digits = n.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);

    if n < 0 {
        grouped.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    grouped
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn parse_int_follows_parse_int_leniency() {
        assert_eq!(parse_int("1234"), Some(1234));
        assert_eq!(parse_int("  42abc"), Some(42));
        assert_eq!(parse_int("-7"), Some(-7));
        assert_eq!(parse_int("+7"), Some(7));
        assert_eq!(parse_int("1.5e3"), Some(1));
        assert_eq!(parse_int("12,345"), Some(12));
        assert_eq!(parse_int(""), None);
        assert_eq!(parse_int("n/a"), None);
        assert_eq!(parse_int("-"), None);
        assert_eq!(parse_int("99999999999999999999"), None);
    }

    #[test]
    fn parse_decimal_reads_leading_number() {
        assert_eq!(parse_decimal("45.2%"), Some(45.2));
        assert_eq!(parse_decimal(" 1.25 %"), Some(1.25));
        assert_eq!(parse_decimal("30%"), Some(30.0));
        assert_eq!(parse_decimal(".5%"), Some(0.5));
        assert_eq!(parse_decimal("-2.5"), Some(-2.5));
        assert_eq!(parse_decimal("n/a"), None);
        assert_eq!(parse_decimal(""), None);
    }

    #[test]
    fn group_thousands_inserts_separators() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(1000), "1,000");
        assert_eq!(group_thousands(1234567), "1,234,567");
        assert_eq!(group_thousands(-12345), "-12,345");
    }

    #[test]
    fn from_fields_maps_positionally() {
        let record = Record::from_fields(&fields(&[
            "example.com",
            "News",
            "15000",
            "9000",
            "41.5%",
        ]));

        assert_eq!(record.domain_name, "example.com");
        assert_eq!(record.category, "News");
        assert_eq!(record.page_views, Some(15000));
        assert_eq!(record.unique_visitors, Some(9000));
        assert_eq!(record.bounce_rate, "41.5%");
    }

    #[test]
    fn from_fields_tolerates_short_rows() {
        let record = Record::from_fields(&fields(&["lonely.org", "Blog"]));

        assert_eq!(record.category, "Blog");
        assert_eq!(record.page_views, None);
        assert_eq!(record.unique_visitors, None);
        assert_eq!(record.bounce_rate, "");
    }

    #[test]
    fn display_and_raw_differ_only_for_counts() {
        let record = Record::from_fields(&fields(&["a.io", "Tech", "1234567", "oops", "10%"]));

        assert_eq!(record.display(Column::PageViews), "1,234,567");
        assert_eq!(record.raw(Column::PageViews), "1234567");
        assert_eq!(record.display(Column::UniqueVisitors), "NaN");
        assert_eq!(record.raw(Column::UniqueVisitors), "NaN");
        assert_eq!(record.display(Column::BounceRate), "10%");
    }
}
