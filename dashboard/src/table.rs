//! Uploaded CSV as a string table
//!
//! Cell text is kept verbatim so an export can be re-uploaded and scored
//! identically.

use std::borrow::Cow;
use std::io::{self, Cursor, Read, Seek, SeekFrom, Write};
use std::path::Path;

use crate::constants::EXPECTED_COLUMNS;

/// Encoding / separator candidates, same order as the serving API
const CANDIDATES: [(bool, u8); 4] = [(true, b','), (true, b';'), (false, b','), (false, b';')];

/// An uploaded file held in memory; reading consumes it until rewound
pub struct UploadedFile {
    name: String,
    cursor: Cursor<Vec<u8>>,
}

impl UploadedFile {
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "upload.csv".to_string());
        Ok(Self::from_bytes(name, std::fs::read(path)?))
    }

    pub fn from_bytes(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            cursor: Cursor::new(bytes),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Move the read position back to the start of the file
    pub fn rewind(&mut self) -> io::Result<()> {
        self.cursor.seek(SeekFrom::Start(0)).map(|_| ())
    }
}

impl Read for UploadedFile {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.cursor.read(buf)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TableError {
    Empty,
    Unreadable(String),
}

impl std::fmt::Display for TableError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "The file is empty"),
            Self::Unreadable(e) => write!(f, "Could not read CSV: {}", e),
        }
    }
}

impl std::error::Error for TableError {}

#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

fn decode(bytes: &[u8], utf8: bool) -> Option<Cow<'_, str>> {
    if utf8 {
        let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
        std::str::from_utf8(bytes).ok().map(Cow::Borrowed)
    } else {
        Some(Cow::Owned(bytes.iter().map(|&b| b as char).collect()))
    }
}

fn parse(text: &str, separator: u8) -> Result<Table, csv::Error> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(separator)
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers = reader.headers()?.iter().map(|h| h.trim().to_string()).collect();
    let rows = reader
        .records()
        .map(|r| r.map(|record| record.iter().map(str::to_string).collect()))
        .collect::<Result<Vec<Vec<String>>, _>>()?;

    Ok(Table { headers, rows })
}

impl Table {
    #[cfg(test)]
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { headers, rows }
    }

    /// Read the remaining contents of `reader` and sniff encoding/separator.
    ///
    /// Prefers the first candidate with every expected column and at least
    /// one row; otherwise falls back to the first candidate that parses, so
    /// the preview still shows what was uploaded.
    pub fn read(reader: &mut impl Read) -> Result<Self, TableError> {
        let mut bytes = Vec::new();
        reader
            .read_to_end(&mut bytes)
            .map_err(|e| TableError::Unreadable(e.to_string()))?;
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Err(TableError::Empty);
        }

        let mut fallback = None;
        let mut last_error = String::from("no candidate decoding");
        for (utf8, separator) in CANDIDATES {
            let Some(text) = decode(&bytes, utf8) else {
                last_error = "invalid UTF-8".to_string();
                continue;
            };
            match parse(&text, separator) {
                Ok(table) if table.has_expected_columns() && !table.is_empty() => {
                    log::debug!("CSV decoded (utf8={}, separator='{}')", utf8, separator as char);
                    return Ok(table);
                }
                Ok(table) => {
                    if fallback.is_none() {
                        fallback = Some(table);
                    }
                }
                Err(e) => last_error = e.to_string(),
            }
        }

        fallback.ok_or(TableError::Unreadable(last_error))
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_expected_columns(&self) -> bool {
        self.missing_columns().is_empty()
    }

    pub fn missing_columns(&self) -> Vec<&'static str> {
        EXPECTED_COLUMNS
            .iter()
            .copied()
            .filter(|col| !self.headers.iter().any(|h| h == col))
            .collect()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// First `n` rows
    pub fn head(&self, n: usize) -> Table {
        Table {
            headers: self.headers.clone(),
            rows: self.rows.iter().take(n).cloned().collect(),
        }
    }

    /// Overwrite the column `name` if present, append it otherwise
    pub fn set_column(&mut self, name: &str, values: Vec<String>) {
        debug_assert_eq!(values.len(), self.rows.len());

        match self.column_index(name) {
            Some(idx) => {
                for (row, value) in self.rows.iter_mut().zip(values) {
                    if idx < row.len() {
                        row[idx] = value;
                    } else {
                        row.resize(idx, String::new());
                        row.push(value);
                    }
                }
            }
            None => {
                self.headers.push(name.to_string());
                let width = self.headers.len() - 1;
                for (row, value) in self.rows.iter_mut().zip(values) {
                    row.resize(width, String::new());
                    row.push(value);
                }
            }
        }
    }

    /// Keep rows whose position satisfies `keep`
    pub fn filter_rows(&self, mut keep: impl FnMut(usize) -> bool) -> Table {
        Table {
            headers: self.headers.clone(),
            rows: self
                .rows
                .iter()
                .enumerate()
                .filter(|(i, _)| keep(*i))
                .map(|(_, row)| row.clone())
                .collect(),
        }
    }

    /// UTF-8, comma-separated, header row, no index column
    pub fn write_csv(&self, writer: impl Write) -> csv::Result<()> {
        let mut writer = csv::WriterBuilder::new().from_writer(writer);
        writer.write_record(&self.headers)?;
        for row in &self.rows {
            writer.write_record(row)?;
        }
        writer.flush()?;
        Ok(())
    }
}
