//! Output formatting and export for ranked events.
//!
//! Four mutually exclusive modes: id (default), url, verbose field dump,
//! and the full table with optional CSV/Excel export. Table styling is an
//! explicit configuration object rather than process-wide state.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use rust_xlsxwriter::Workbook;

use crate::errors::QuakeFindError;
use crate::nearest::RankedEvent;

/// Column headers shared by the table and both export formats.
const COLUMNS: [&str; 10] = [
    "id",
    "time",
    "latitude",
    "longitude",
    "depth",
    "magnitude",
    "url",
    "distance_km",
    "time_delta_s",
    "azimuth_deg",
];

/// Time format used in the console table and verbose dump.
const TABLE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Time format used in export files. Catalog times carry milliseconds and
/// exports must keep them.
const EXPORT_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

/// Supported export file formats, selected by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Xlsx,
}

impl ExportFormat {
    /// Determine the export format from a file path's extension.
    ///
    /// # Errors
    ///
    /// Returns a usage error for any extension other than `.csv` or `.xlsx`.
    pub fn from_path(path: &Path) -> Result<Self, QuakeFindError> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("csv") => Ok(Self::Csv),
            Some("xlsx") => Ok(Self::Xlsx),
            other => Err(QuakeFindError::Usage(format!(
                "File extension '{}' not in list of supported formats: .csv, .xlsx. Exiting.",
                other.map(|e| format!(".{e}")).unwrap_or_default()
            ))),
        }
    }
}

/// An export destination: a path plus the format derived from it.
#[derive(Debug, Clone)]
pub struct ExportTarget {
    pub path: PathBuf,
    pub format: ExportFormat,
}

impl ExportTarget {
    /// Build an export target, rejecting unsupported extensions.
    ///
    /// # Errors
    ///
    /// Returns a usage error if the extension is unsupported.
    pub fn new(path: PathBuf) -> Result<Self, QuakeFindError> {
        let format = ExportFormat::from_path(&path)?;
        Ok(Self { path, format })
    }
}

/// Display configuration for tabular output.
#[derive(Debug, Clone)]
pub struct TableStyle {
    /// Widest a single cell may render in the console table.
    pub max_col_width: usize,
    /// Decimal places for coordinates.
    pub coord_precision: usize,
    /// Decimal places for derived distance/time/azimuth values.
    pub delta_precision: usize,
}

impl Default for TableStyle {
    fn default() -> Self {
        Self {
            max_col_width: 100,
            coord_precision: 4,
            delta_precision: 1,
        }
    }
}

/// Formats ranked events for the console and export files.
pub struct Presenter {
    style: TableStyle,
}

impl Presenter {
    /// Create a presenter with the given style.
    #[must_use]
    pub fn new(style: TableStyle) -> Self {
        Self { style }
    }

    /// Render one event as a row of display cells, in [`COLUMNS`] order.
    ///
    /// Only for the console table and verbose dump; exports go through
    /// [`Self::export_row`] at full precision.
    fn row(&self, ranked: &RankedEvent) -> Vec<String> {
        let e = &ranked.event;
        let cp = self.style.coord_precision;
        let dp = self.style.delta_precision;
        vec![
            e.id.clone(),
            e.time.format(TABLE_TIME_FORMAT).to_string(),
            format!("{:.cp$}", e.latitude),
            format!("{:.cp$}", e.longitude),
            format!("{:.dp$}", e.depth_km),
            e.magnitude.map(|m| format!("{m:.1}")).unwrap_or_default(),
            e.url.clone().unwrap_or_default(),
            format!("{:.dp$}", ranked.distance_km),
            format!("{:.dp$}", ranked.time_delta_s),
            format!("{:.dp$}", ranked.azimuth_deg),
        ]
    }

    /// Render one event as raw export cells, in [`COLUMNS`] order.
    ///
    /// Values round-trip: numbers are written with full precision and times
    /// keep their millisecond component.
    fn export_row(ranked: &RankedEvent) -> Vec<String> {
        let e = &ranked.event;
        vec![
            e.id.clone(),
            e.time.format(EXPORT_TIME_FORMAT).to_string(),
            e.latitude.to_string(),
            e.longitude.to_string(),
            e.depth_km.to_string(),
            e.magnitude.map(|m| m.to_string()).unwrap_or_default(),
            e.url.clone().unwrap_or_default(),
            ranked.distance_km.to_string(),
            ranked.time_delta_s.to_string(),
            ranked.azimuth_deg.to_string(),
        ]
    }

    /// Write all ranked events as an aligned plain-text table.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub fn write_table<W: Write>(&self, writer: &mut W, events: &[RankedEvent]) -> io::Result<()> {
        let rows: Vec<Vec<String>> = events.iter().map(|e| self.row(e)).collect();

        let mut widths: Vec<usize> = COLUMNS.iter().map(|h| h.len()).collect();
        for row in &rows {
            for (i, cell) in row.iter().enumerate() {
                widths[i] = widths[i].max(cell.len()).min(self.style.max_col_width);
            }
        }

        let header: Vec<String> = COLUMNS
            .iter()
            .enumerate()
            .map(|(i, h)| format!("{h:<width$}", width = widths[i]))
            .collect();
        writeln!(writer, "{}", header.join("  "))?;

        for row in &rows {
            let line: Vec<String> = row
                .iter()
                .enumerate()
                .map(|(i, cell)| {
                    let mut cell = cell.clone();
                    cell.truncate(self.style.max_col_width);
                    format!("{cell:<width$}", width = widths[i])
                })
                .collect();
            writeln!(writer, "{}", line.join("  "))?;
        }
        Ok(())
    }

    /// Write a full field dump for a single event.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub fn write_verbose<W: Write>(&self, writer: &mut W, ranked: &RankedEvent) -> io::Result<()> {
        writeln!(writer, "Event {}", ranked.event.id)?;
        let cells = self.row(ranked);
        // Skip the id column; it is already on the first line.
        for (name, value) in COLUMNS.iter().zip(cells.iter()).skip(1) {
            writeln!(writer, "  {name} : {value}")?;
        }
        Ok(())
    }

    /// Write only the event page URL for a single event.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub fn write_url<W: Write>(&self, writer: &mut W, ranked: &RankedEvent) -> io::Result<()> {
        writeln!(writer, "{}", ranked.event.url.as_deref().unwrap_or_default())
    }

    /// Write only the event ID for a single event.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub fn write_id<W: Write>(&self, writer: &mut W, ranked: &RankedEvent) -> io::Result<()> {
        writeln!(writer, "{}", ranked.event.id)
    }

    /// Write ranked events as CSV, header row first.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub fn write_csv<W: Write>(
        &self,
        writer: W,
        events: &[RankedEvent],
    ) -> Result<(), QuakeFindError> {
        let mut csv_writer = csv::Writer::from_writer(writer);
        csv_writer.write_record(COLUMNS)?;
        for event in events {
            csv_writer.write_record(Self::export_row(event))?;
        }
        csv_writer.flush()?;
        Ok(())
    }

    /// Write ranked events to an Excel workbook at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the workbook cannot be written.
    pub fn write_xlsx(&self, path: &Path, events: &[RankedEvent]) -> Result<(), QuakeFindError> {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();

        for (col, header) in COLUMNS.iter().enumerate() {
            worksheet.write_string(0, col as u16, *header)?;
        }
        for (i, ranked) in events.iter().enumerate() {
            let row = 1 + i as u32;
            let e = &ranked.event;
            worksheet.write_string(row, 0, e.id.as_str())?;
            worksheet.write_string(row, 1, e.time.format(EXPORT_TIME_FORMAT).to_string())?;
            worksheet.write_number(row, 2, e.latitude)?;
            worksheet.write_number(row, 3, e.longitude)?;
            worksheet.write_number(row, 4, e.depth_km)?;
            if let Some(mag) = e.magnitude {
                worksheet.write_number(row, 5, mag)?;
            }
            worksheet.write_string(row, 6, e.url.as_deref().unwrap_or_default())?;
            worksheet.write_number(row, 7, ranked.distance_km)?;
            worksheet.write_number(row, 8, ranked.time_delta_s)?;
            worksheet.write_number(row, 9, ranked.azimuth_deg)?;
        }

        workbook.save(path)?;
        Ok(())
    }

    /// Export ranked events to the target file in its format.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn export(
        &self,
        target: &ExportTarget,
        events: &[RankedEvent],
    ) -> Result<(), QuakeFindError> {
        match target.format {
            ExportFormat::Csv => {
                let file = std::fs::File::create(&target.path)?;
                self.write_csv(file, events)
            }
            ExportFormat::Xlsx => self.write_xlsx(&target.path, events),
        }
    }
}
