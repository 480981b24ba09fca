use crate::record::{Column, Record};
#[cfg(feature = "web")]
use thiserror::Error;

#[cfg(feature = "web")]
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("xlsx writer error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),
}

/// Convert table rows to CSV format
///
/// The first line holds the column headers. Counts are written unformatted
/// and counts that failed to parse are left empty. Fields containing commas,
/// quotes or newlines are quoted with inner quotes doubled.
///
/// # Arguments
/// * `rows` - The rows to write, in display order
///
/// # Returns
/// * `String` - CSV content
///
/// # Examples
/// ```
/// use domain_dashboard::downloader::to_csv;
/// use domain_dashboard::record::Record;
///
/// let record = Record {
///     domain_name: "a.com".to_string(),
///     category: "Shops, Retail".to_string(),
///     page_views: Some(10),
///     unique_visitors: None,
///     bounce_rate: "5%".to_string(),
/// };
/// let csv = to_csv(&[&record]);
/// assert!(csv.ends_with("a.com,\"Shops, Retail\",10,,5%\n"));
/// ```
pub fn to_csv(rows: &[&Record]) -> String {
    let mut csv_content = String::new();

    // Header row with column labels
    let headers: Vec<&str> = Column::ALL.iter().map(|c| c.header()).collect();
    csv_content.push_str(&headers.join(","));
    csv_content.push('\n');

    for record in rows {
        for (i, &column) in Column::ALL.iter().enumerate() {
            if i > 0 {
                csv_content.push(',');
            }

            let value = if column.is_numeric() {
                record.count(column).map(|n| n.to_string()).unwrap_or_default()
            } else {
                record.text(column).to_string()
            };
            push_csv_field(&mut csv_content, &value);
        }
        csv_content.push('\n');
    }

    csv_content
}

fn push_csv_field(out: &mut String, value: &str) {
    if value.contains(',') || value.contains('"') || value.contains('\n') || value.contains('\r') {
        out.push('"');
        out.push_str(&value.replace('"', "\"\""));
        out.push('"');
    } else {
        out.push_str(value);
    }
}

/// Convert table rows to XLSX format
///
/// Counts are written as numbers so they stay sortable in a spreadsheet;
/// counts that failed to parse leave the cell blank.
///
/// # Arguments
/// * `rows` - The rows to write, in display order
///
/// # Returns
/// * `Result<Vec<u8>, ExportError>` - XLSX file content as bytes or an error
#[cfg(feature = "web")]
pub fn to_xlsx(rows: &[&Record]) -> Result<Vec<u8>, ExportError> {
    use rust_xlsxwriter::{Workbook, Worksheet};

    let mut workbook = Workbook::new();
    let mut worksheet = Worksheet::new();

    for (c, &column) in Column::ALL.iter().enumerate() {
        worksheet.write_string(0, c as u16, column.header())?;
    }

    for (r, record) in rows.iter().enumerate() {
        let row = (r + 1) as u32;
        for (c, &column) in Column::ALL.iter().enumerate() {
            let col = c as u16;
            if column.is_numeric() {
                if let Some(n) = record.count(column) {
                    worksheet.write_number(row, col, n as f64)?;
                }
            } else {
                worksheet.write_string(row, col, record.text(column))?;
            }
        }
    }

    workbook.push_worksheet(worksheet);
    let buffer = workbook.save_to_buffer()?;

    Ok(buffer)
}
