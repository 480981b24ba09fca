use crate::record::Record;
use tracing::debug;

/// Parse comma-separated text into rows of fields
///
/// Quoted fields may contain commas, doubled quotes (`""` for a literal `"`)
/// and line breaks. Records end at `\n` or `\r\n` outside quotes. The quote
/// characters themselves are not part of the returned values.
///
/// # Arguments
/// * `text` - The full CSV document
///
/// # Returns
/// * `Vec<Vec<String>>` - One entry per record, fields in column order
///
/// # Examples
/// ```
/// use domain_dashboard::loader::parse_csv;
///
/// let rows = parse_csv("a,\"b,c\"\n1,2\n");
/// assert_eq!(rows, vec![vec!["a", "b,c"], vec!["1", "2"]]);
/// ```
pub fn parse_csv(text: &str) -> Vec<Vec<String>> {
    let mut rows = Vec::new();
    let mut row = Vec::new();
    let mut current_field = String::new();
    let mut in_quotes = false;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' => {
                if in_quotes && chars.peek() == Some(&'"') {
                    // Doubled quote inside a quoted field
                    current_field.push('"');
                    chars.next();
                } else {
                    in_quotes = !in_quotes;
                }
            }
            ',' if !in_quotes => {
                row.push(std::mem::take(&mut current_field));
            }
            '\r' if !in_quotes && chars.peek() == Some(&'\n') => {}
            '\n' if !in_quotes => {
                row.push(std::mem::take(&mut current_field));
                rows.push(std::mem::take(&mut row));
            }
            _ => {
                current_field.push(c);
            }
        }
    }

    // Last record without a trailing newline
    if !current_field.is_empty() || !row.is_empty() {
        row.push(current_field);
        rows.push(row);
    }

    rows
}

/// Turn a CSV export into records
///
/// The first row is the header and is discarded. Rows whose fields are all
/// empty are skipped; every other row becomes a record, even when its counts
/// fail to parse.
///
/// # Examples
/// ```
/// use domain_dashboard::loader::records_from_csv;
///
/// let records = records_from_csv("\"Domain\",\"Category\",\"Views\",\"Visitors\",\"Bounce\"\n\
///                                 \"a.com\",\"News\",\"10\",\"5\",\"50%\"");
/// assert_eq!(records.len(), 1);
/// assert_eq!(records[0].page_views, Some(10));
/// ```
pub fn records_from_csv(text: &str) -> Vec<Record> {
    let records: Vec<Record> = parse_csv(text)
        .into_iter()
        .skip(1)
        .filter(|fields| fields.iter().any(|f| !f.is_empty()))
        .map(|fields| Record::from_fields(&fields))
        .collect();

    debug!(count = records.len(), "parsed records from CSV");
    records
}
