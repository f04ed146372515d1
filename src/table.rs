//! Rectangular string tables decoded from CSV or spreadsheet exports.

use std::io::Read;
use std::path::Path;

use serde::Serialize;
use tracing::debug;

use crate::error::{Result, SpendError};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    /// Build a table, padding or truncating every row to the header width.
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        let width = headers.len();
        let rows = rows
            .into_iter()
            .map(|mut r| {
                r.resize(width, String::new());
                r
            })
            .collect();
        Self { headers, rows }
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Cell under `column` in `row`, or `""` when the column is absent.
    pub fn cell<'a>(&self, row: &'a [String], column: Option<&str>) -> &'a str {
        column
            .and_then(|c| self.column_index(c))
            .and_then(|i| row.get(i))
            .map(String::as_str)
            .unwrap_or("")
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum SourceKind {
    Delimited,
    #[cfg(feature = "excel")]
    Workbook,
}

fn source_kind(path: &Path) -> Result<SourceKind> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "csv" | "tsv" | "txt" => Ok(SourceKind::Delimited),
        #[cfg(feature = "excel")]
        "xlsx" | "xls" => Ok(SourceKind::Workbook),
        _ => Err(SpendError::UnsupportedFormat(path.display().to_string())),
    }
}

/// Read a statement file into a table, dispatching on its extension.
pub fn read_table(path: &Path) -> Result<Table> {
    let table = match source_kind(path)? {
        SourceKind::Delimited => read_delimited(std::fs::File::open(path)?)?,
        #[cfg(feature = "excel")]
        SourceKind::Workbook => read_workbook(path)?,
    };
    debug!(
        path = %path.display(),
        columns = table.headers.len(),
        rows = table.rows.len(),
        "read table"
    );
    Ok(table)
}

/// Pick the delimiter that splits the header line into the most fields.
fn sniff_delimiter(header_line: &[u8]) -> u8 {
    [b',', b';', b'\t', b'|']
        .into_iter()
        .max_by_key(|d| header_line.iter().filter(|b| *b == d).count())
        .filter(|d| header_line.contains(d))
        .unwrap_or(b',')
}

/// Read delimited text. Records that are not valid UTF-8 are dropped one by
/// one; the rest of the file still loads.
pub fn read_delimited<R: Read>(mut reader: R) -> Result<Table> {
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;
    let bytes = bytes.strip_prefix(b"\xef\xbb\xbf").unwrap_or(&bytes);

    let header_line = bytes
        .split(|b| *b == b'\n')
        .find(|l| !l.trim_ascii().is_empty())
        .unwrap_or_default();
    let delimiter = sniff_delimiter(header_line);

    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .delimiter(delimiter)
        .from_reader(bytes);

    let headers: Vec<String> = rdr
        .byte_headers()?
        .iter()
        .map(|h| String::from_utf8_lossy(h).trim().to_string())
        .collect();
    if headers.iter().all(|h| h.is_empty()) {
        return Err(SpendError::UnreadableTable("no header row".to_string()));
    }

    let mut rows = Vec::new();
    for result in rdr.records() {
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                debug!(error = %e, "skipping unreadable record");
                continue;
            }
        };
        if record.iter().all(|f| f.trim().is_empty()) {
            continue;
        }
        rows.push(record.iter().map(str::to_string).collect());
    }
    Ok(Table::new(headers, rows))
}

#[cfg(feature = "excel")]
fn read_workbook(path: &Path) -> Result<Table> {
    use calamine::Reader;

    let mut workbook = calamine::open_workbook_auto(path)
        .map_err(|e| SpendError::Spreadsheet(format!("failed to open {}: {e}", path.display())))?;
    let sheet = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| SpendError::UnreadableTable("workbook has no sheets".to_string()))?;
    let range = workbook
        .worksheet_range(&sheet)
        .map_err(|e| SpendError::Spreadsheet(format!("failed to read sheet {sheet}: {e}")))?;

    let mut rows = range.rows().map(|r| r.iter().map(cell_to_string).collect::<Vec<_>>());
    let headers: Vec<String> = rows
        .next()
        .ok_or_else(|| SpendError::UnreadableTable(format!("sheet {sheet} is empty")))?
        .into_iter()
        .map(|h| h.trim().to_string())
        .collect();
    let body = rows
        .filter(|r| r.iter().any(|c| !c.trim().is_empty()))
        .collect();
    Ok(Table::new(headers, body))
}

#[cfg(feature = "excel")]
fn cell_to_string(cell: &calamine::Data) -> String {
    use calamine::Data;

    match cell {
        Data::String(s) => s.clone(),
        Data::Float(f) if f.fract() == 0.0 => format!("{}", *f as i64),
        Data::Float(f) => f.to_string(),
        Data::Int(i) => i.to_string(),
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => {
            let serial = dt.as_f64();
            // out-of-range serials pass through raw and fail date parsing
            crate::parse::excel_serial_to_date(serial).unwrap_or_else(|| serial.to_string())
        }
        Data::DateTimeIso(s) => s.get(..10).unwrap_or(s).to_string(),
        Data::DurationIso(s) => s.clone(),
        Data::Error(_) | Data::Empty => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_delimited_comma() {
        let csv = "Date,Description,Amount\n01/15/2025,\"ACME, INC\",\"1,200.00\"\n";
        let table = read_delimited(csv.as_bytes()).unwrap();
        assert_eq!(table.headers, vec!["Date", "Description", "Amount"]);
        assert_eq!(table.rows, vec![vec!["01/15/2025", "ACME, INC", "1,200.00"]]);
    }

    #[test]
    fn test_read_delimited_sniffs_semicolon() {
        let csv = "Datum;Description;Amount\n2024-01-02;Bakery;-3,50\n";
        let table = read_delimited(csv.as_bytes()).unwrap();
        assert_eq!(table.headers.len(), 3);
        assert_eq!(table.rows[0][2], "-3,50");
    }

    #[test]
    fn test_read_delimited_pads_short_rows_and_skips_blank() {
        let csv = "Date\tDescription\tDebit\tCredit\n01/02/2024\tRent\n\n01/03/2024\tPay\t\t100\n";
        let table = read_delimited(csv.as_bytes()).unwrap();
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0], vec!["01/02/2024", "Rent", "", ""]);
        assert_eq!(table.rows[1][3], "100");
    }

    #[test]
    fn test_read_delimited_strips_bom() {
        let csv = "\u{feff}Date,Amount\n01/02/2024,5\n";
        let table = read_delimited(csv.as_bytes()).unwrap();
        assert_eq!(table.headers[0], "Date");
    }

    #[test]
    fn test_cell_lookup() {
        let table = Table::new(
            vec!["Date".into(), "Amount".into()],
            vec![vec!["01/02/2024".into(), "5".into()]],
        );
        let row = &table.rows[0];
        assert_eq!(table.cell(row, Some("Amount")), "5");
        assert_eq!(table.cell(row, Some("Missing")), "");
        assert_eq!(table.cell(row, None), "");
    }

    #[test]
    fn test_read_table_rejects_unknown_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("statement.pdf");
        std::fs::write(&path, "not a table").unwrap();
        assert!(matches!(read_table(&path), Err(SpendError::UnsupportedFormat(_))));
    }

    #[test]
    fn test_read_table_from_csv_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Statement.CSV");
        std::fs::write(&path, "Date,Description,Amount\n01/05/2024,Coffee,-4.00\n").unwrap();
        let table = read_table(&path).unwrap();
        assert_eq!(table.rows.len(), 1);
    }

    #[test]
    fn test_read_delimited_skips_non_utf8_record() {
        let bytes: &[u8] = b"Date,Description,Amount\n\
            01/05/2024,Coffee,-4.00\n\
            01/06/2024,CAF\xC9 PARIS,-9.00\n\
            01/07/2024,Bagel,-2.50\n";
        let table = read_delimited(bytes).unwrap();
        let descs: Vec<&str> = table.rows.iter().map(|r| r[1].as_str()).collect();
        assert_eq!(descs, vec!["Coffee", "Bagel"]);
    }

    #[test]
    fn test_read_delimited_lossy_headers() {
        let bytes: &[u8] = b"Date;Descripci\xF3n;Amount\n2024-01-02;Bakery;-3.50\n";
        let table = read_delimited(bytes).unwrap();
        assert_eq!(table.headers.len(), 3);
        assert_eq!(table.headers[0], "Date");
        assert_eq!(table.rows[0][1], "Bakery");
    }

    #[cfg(feature = "excel")]
    #[test]
    fn test_read_table_rejects_corrupt_workbook() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("statement.xlsx");
        std::fs::write(&path, "Date,Description,Amount\n").unwrap();
        assert!(matches!(read_table(&path), Err(SpendError::Spreadsheet(_))));
    }
}
