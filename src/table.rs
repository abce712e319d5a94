//! Timecode log writers (XLSX, CSV)
//!
//! **Why**: The log is opened in a spreadsheet or imported into editing software,
//! where the empty Scene/Shot/Usable columns are filled in by hand.
//!
//! **Used by**: runner (write step), cli (`--format`)

use log::debug;
use rust_xlsxwriter::{Format, Workbook};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

use crate::sequencer::{COLUMNS, LogRow};

/// Table writer errors
#[derive(Debug)]
pub enum TableError {
    Xlsx(String),
    Csv(String),
}

impl fmt::Display for TableError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableError::Xlsx(e) => write!(f, "XLSX error: {}", e),
            TableError::Csv(e) => write!(f, "CSV error: {}", e),
        }
    }
}

impl std::error::Error for TableError {}

impl From<rust_xlsxwriter::XlsxError> for TableError {
    fn from(e: rust_xlsxwriter::XlsxError) -> Self {
        TableError::Xlsx(e.to_string())
    }
}

impl From<csv::Error> for TableError {
    fn from(e: csv::Error) -> Self {
        TableError::Csv(e.to_string())
    }
}

/// Destination for an ordered list of log rows
pub trait TableSink {
    /// File extension without the dot
    fn extension(&self) -> &'static str;

    /// Persist `rows` (header first, then rows in order) to `path`
    fn write_rows(&self, path: &Path, rows: &[LogRow]) -> Result<(), TableError>;
}

/// Output table format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum TableFormat {
    #[default]
    Xlsx,
    Csv,
}

impl TableFormat {
    pub fn sink(self) -> Box<dyn TableSink> {
        match self {
            TableFormat::Xlsx => Box::new(XlsxSink),
            TableFormat::Csv => Box::new(CsvSink),
        }
    }
}

/// Single-sheet Excel workbook
#[derive(Debug, Clone, Copy, Default)]
pub struct XlsxSink;

impl XlsxSink {
    const SHEET_NAME: &'static str = "Timecode Log";
    const COLUMN_WIDTHS: [f64; 6] = [60.0, 14.0, 14.0, 14.0, 14.0, 10.0];
}

impl TableSink for XlsxSink {
    fn extension(&self) -> &'static str {
        "xlsx"
    }

    fn write_rows(&self, path: &Path, rows: &[LogRow]) -> Result<(), TableError> {
        let mut workbook = Workbook::new();
        let header = Format::new().set_bold();

        let sheet = workbook.add_worksheet();
        sheet.set_name(Self::SHEET_NAME)?;

        for (col, (title, width)) in COLUMNS.iter().zip(Self::COLUMN_WIDTHS).enumerate() {
            let col = col as u16;
            sheet.write_string_with_format(0, col, *title, &header)?;
            sheet.set_column_width(col, width)?;
        }
        sheet.set_freeze_panes(1, 0)?;

        for (i, row) in rows.iter().enumerate() {
            let r = i as u32 + 1;
            for (col, cell) in row.cells().iter().enumerate() {
                // Blank cells stay blank for the annotation columns
                if !cell.is_empty() {
                    sheet.write_string(r, col as u16, *cell)?;
                }
            }
        }

        workbook.save(path)?;
        debug!("Wrote {} row(s) to {}", rows.len(), path.display());
        Ok(())
    }
}

/// Comma-separated values with a header line
#[derive(Debug, Clone, Copy, Default)]
pub struct CsvSink;

impl TableSink for CsvSink {
    fn extension(&self) -> &'static str {
        "csv"
    }

    fn write_rows(&self, path: &Path, rows: &[LogRow]) -> Result<(), TableError> {
        let mut writer = csv::Writer::from_path(path)?;
        // Explicit header so an empty log still carries the columns
        writer.write_record(COLUMNS)?;
        for row in rows {
            writer.write_record(row.cells())?;
        }
        writer.flush().map_err(|e| TableError::Csv(e.to_string()))?;
        debug!("Wrote {} row(s) to {}", rows.len(), path.display());
        Ok(())
    }
}
