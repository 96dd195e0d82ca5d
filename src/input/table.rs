use std::collections::HashSet;
use std::io::Read;
use std::num::ParseFloatError;
use std::path::Path;

use crate::input::InputError;
use crate::input::gz::{inner_extension, open_maybe_gz};

const MISSING_TOKENS: &[&str] = &["", "NA", "NaN", "nan", "null", "NULL"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delimiter {
    Tab,
    Comma,
}

impl Delimiter {
    pub fn for_path(path: &Path) -> Self {
        match inner_extension(path).as_deref() {
            Some("csv") => Delimiter::Comma,
            _ => Delimiter::Tab,
        }
    }

    fn as_byte(self) -> u8 {
        match self {
            Delimiter::Tab => b'\t',
            Delimiter::Comma => b',',
        }
    }
}

#[derive(Debug, Clone)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
    /// 1-based source line of each row, for error messages.
    pub line_numbers: Vec<usize>,
}

impl Table {
    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn column_index(&self, name: &str) -> Result<usize, InputError> {
        self.columns
            .iter()
            .position(|c| c == name)
            .ok_or_else(|| InputError::MissingColumn(name.to_string()))
    }
}

pub fn load_table(path: &Path) -> Result<Table, InputError> {
    let delimiter = Delimiter::for_path(path);
    let reader = open_maybe_gz(path)?;
    let table = parse_table(reader, delimiter)?;
    tracing::info!(
        path = %path.display(),
        columns = table.columns.len(),
        rows = table.n_rows(),
        "loaded input table"
    );
    Ok(table)
}

pub fn parse_table<R: Read>(reader: R, delimiter: Delimiter) -> Result<Table, InputError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .delimiter(delimiter.as_byte())
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut header: Option<Vec<String>> = None;
    let mut rows = Vec::new();
    let mut line_numbers = Vec::new();
    let mut record = csv::ByteRecord::new();

    while csv_reader
        .read_byte_record(&mut record)
        .map_err(csv_error)?
    {
        let line_no = record.position().map_or(0, |p| p.line() as usize);
        let fields = decode_fields(&record, line_no)?;
        // Whitespace-only lines come back as a single empty field.
        if fields.len() == 1 && fields[0].is_empty() {
            continue;
        }

        match &header {
            None => {
                let mut seen = HashSet::new();
                for name in &fields {
                    if name.is_empty() {
                        return Err(InputError::Parse(format!(
                            "line {}: header has an empty column name",
                            line_no
                        )));
                    }
                    if !seen.insert(name.as_str()) {
                        return Err(InputError::Parse(format!(
                            "line {}: duplicate column name {}",
                            line_no, name
                        )));
                    }
                }
                header = Some(fields);
            }
            Some(cols) => {
                if fields.len() != cols.len() {
                    return Err(InputError::Parse(format!(
                        "line {}: expected {} fields, found {}",
                        line_no,
                        cols.len(),
                        fields.len()
                    )));
                }
                rows.push(fields);
                line_numbers.push(line_no);
            }
        }
    }

    let columns = header.ok_or_else(|| InputError::Parse("table is empty".to_string()))?;
    Ok(Table {
        columns,
        rows,
        line_numbers,
    })
}

fn decode_fields(record: &csv::ByteRecord, line_no: usize) -> Result<Vec<String>, InputError> {
    record
        .iter()
        .enumerate()
        .map(|(i, field)| {
            let text = std::str::from_utf8(field).map_err(|_| {
                InputError::Parse(format!(
                    "line {}: field {} is not valid UTF-8",
                    line_no,
                    i + 1
                ))
            })?;
            Ok(text.trim().to_string())
        })
        .collect()
}

fn csv_error(err: csv::Error) -> InputError {
    let line = err.position().map(|p| p.line());
    let message = err.to_string();
    match err.into_kind() {
        csv::ErrorKind::Io(source) => InputError::Io(source),
        _ => match line {
            Some(line) => InputError::Parse(format!("line {}: {}", line, message)),
            None => InputError::Parse(message),
        },
    }
}

pub fn parse_cell(raw: &str) -> Result<Option<f64>, ParseFloatError> {
    let cell = raw.trim();
    if MISSING_TOKENS.contains(&cell) {
        return Ok(None);
    }
    if cell.eq_ignore_ascii_case("true") {
        return Ok(Some(1.0));
    }
    if cell.eq_ignore_ascii_case("false") {
        return Ok(Some(0.0));
    }
    cell.parse::<f64>().map(Some)
}

pub fn numeric_column(table: &Table, name: &str) -> Result<Vec<Option<f64>>, InputError> {
    let idx = table.column_index(name)?;
    let mut out = Vec::with_capacity(table.n_rows());
    for (row, &line_no) in table.rows.iter().zip(&table.line_numbers) {
        let raw = row[idx].as_str();
        let value = parse_cell(raw).map_err(|_| {
            InputError::Parse(format!(
                "line {}: column {} has non-numeric value {:?}",
                line_no, name, raw
            ))
        })?;
        out.push(value);
    }
    Ok(out)
}

pub fn text_column(table: &Table, name: &str) -> Result<Vec<String>, InputError> {
    let idx = table.column_index(name)?;
    Ok(table.rows.iter().map(|row| row[idx].clone()).collect())
}
