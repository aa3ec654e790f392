use std::fmt;
use std::path::Path;

use calamine::{open_workbook_auto, Reader};
use csv::{ReaderBuilder, Trim};
use log::{info, warn};

use crate::roster::RosterError;

const BOM: char = '\u{feff}';
const SPREADSHEET_EXTENSIONS: [&str; 5] = ["xlsx", "xlsm", "xlsb", "xls", "ods"];
// Largest magnitude an f64 holds with every integer digit exact.
const EXACT_INTEGER_LIMIT: f64 = 1e15;

#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Number(f64),
    Text(String),
}

impl FieldValue {
    fn parse(raw: &str) -> Option<Self> {
        if raw.is_empty() {
            return None;
        }
        match raw.parse::<f64>() {
            Ok(n) if n.is_finite() => Some(FieldValue::Number(n)),
            _ => Some(FieldValue::Text(raw.to_string())),
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Number(n) if n.fract() == 0.0 && n.abs() < EXACT_INTEGER_LIMIT => {
                write!(f, "{}", *n as i64)
            }
            FieldValue::Number(n) => write!(f, "{}", n),
            FieldValue::Text(s) => f.write_str(s),
        }
    }
}

/// One roster row. `row_number` counts the header, so the first data row is 2.
#[derive(Debug, Clone, PartialEq)]
pub struct ContactRecord {
    pub row_number: usize,
    pub name: String,
    pub email: String,
    /// Every other column, in file order.
    pub fields: Vec<(String, Option<FieldValue>)>,
}

/// Header names that identify the recipient columns.
#[derive(Debug, Clone)]
pub struct Columns<'a> {
    pub name: &'a str,
    pub email: &'a str,
}

/// Header row plus data rows tagged with their sheet row number.
struct Table {
    headers: Vec<String>,
    rows: Vec<(usize, Vec<String>)>,
}

/// Loads the roster. Spreadsheet workbooks (`.xlsx`, `.xls`, `.ods`, ...)
/// are read from their first worksheet; anything else is parsed as CSV.
pub fn load_contacts(
    path: &Path,
    columns: &Columns<'_>,
) -> Result<Vec<ContactRecord>, RosterError> {
    if !path.is_file() {
        return Err(RosterError::MissingContactFile(path.to_path_buf()));
    }

    let table = if is_spreadsheet(path) {
        read_workbook(path)?
    } else {
        read_csv(path)?
    };

    let name_idx = table.headers.iter().position(|h| h == columns.name);
    let email_idx = table.headers.iter().position(|h| h == columns.email);
    if name_idx.is_none() {
        warn!(
            "Contact file has no '{}' column; every row will be skipped",
            columns.name
        );
    }
    if email_idx.is_none() {
        warn!(
            "Contact file has no '{}' column; every row will be skipped",
            columns.email
        );
    }

    let contacts: Vec<ContactRecord> = table
        .rows
        .iter()
        .map(|(row_number, cells)| {
            to_contact(*row_number, cells, &table.headers, name_idx, email_idx)
        })
        .collect();

    info!("Loaded {} contacts from {}", contacts.len(), path.display());
    Ok(contacts)
}

fn is_spreadsheet(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
        .is_some_and(|ext| SPREADSHEET_EXTENSIONS.contains(&ext.as_str()))
}

fn header_name(raw: &str) -> String {
    raw.trim_start_matches(BOM).trim().to_string()
}

fn read_csv(path: &Path) -> Result<Table, RosterError> {
    let parse_err = |source: csv::Error| RosterError::ContactParse {
        path: path.to_path_buf(),
        source,
    };

    let mut reader = ReaderBuilder::new()
        .flexible(true)
        .has_headers(true)
        .trim(Trim::All)
        .from_path(path)
        .map_err(parse_err)?;

    let headers: Vec<String> = reader
        .headers()
        .map_err(parse_err)?
        .iter()
        .map(header_name)
        .collect();

    let mut rows: Vec<(usize, Vec<String>)> = Vec::new();
    for (index, result) in reader.records().enumerate() {
        let record = result.map_err(parse_err)?;
        rows.push((index + 2, record.iter().map(str::to_string).collect()));
    }

    Ok(Table { headers, rows })
}

fn read_workbook(path: &Path) -> Result<Table, RosterError> {
    let sheet_err = |source: calamine::Error| RosterError::Spreadsheet {
        path: path.to_path_buf(),
        source,
    };

    let mut workbook = open_workbook_auto(path).map_err(sheet_err)?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| RosterError::EmptyWorkbook(path.to_path_buf()))?
        .map_err(sheet_err)?;

    // The used range starts at the first non-empty cell; offset row numbers
    // so they match what the spreadsheet shows.
    let first_row = range.start().map_or(0, |(row, _)| row as usize);
    let mut sheet_rows = range.rows();
    let headers: Vec<String> = sheet_rows
        .next()
        .map(|cells| cells.iter().map(|c| header_name(&c.to_string())).collect())
        .unwrap_or_default();

    let rows: Vec<(usize, Vec<String>)> = sheet_rows
        .enumerate()
        .map(|(index, cells)| {
            let cells: Vec<String> = cells.iter().map(|c| c.to_string()).collect();
            (first_row + index + 2, cells)
        })
        .collect();

    Ok(Table { headers, rows })
}

fn to_contact(
    row_number: usize,
    cells: &[String],
    headers: &[String],
    name_idx: Option<usize>,
    email_idx: Option<usize>,
) -> ContactRecord {
    let cell = |idx: Option<usize>| {
        idx.and_then(|i| cells.get(i))
            .map(|raw| raw.trim().to_string())
            .unwrap_or_default()
    };

    let fields = headers
        .iter()
        .enumerate()
        .filter(|(i, _)| Some(*i) != name_idx && Some(*i) != email_idx)
        .map(|(i, header)| {
            let value = cells.get(i).and_then(|raw| FieldValue::parse(raw.trim()));
            (header.clone(), value)
        })
        .collect();

    ContactRecord {
        row_number,
        name: cell(name_idx),
        email: cell(email_idx),
        fields,
    }
}
