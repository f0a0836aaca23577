//! Persistence of assembled documents.
//!
//! An [`ArtifactStore`] writes figure and table crops as PNG files, table
//! payloads as header-less CSV, and a `document.json` that refers to them by
//! file name.

mod record;

pub use record::{
    artifact_digits, artifact_stem, ArtifactNames, DocumentRecord, FigureRecord, TableRecord,
    TextRecord,
};

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::model::{Document, Table};

/// Name of the document file written by [`ArtifactStore::persist`].
pub const DOCUMENT_FILE: &str = "document.json";

/// JSON output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonFormat {
    /// Pretty-printed JSON with indentation
    #[default]
    Pretty,
    /// Compact JSON without extra whitespace
    Compact,
}

/// Convert a document record to JSON.
pub fn to_json(record: &DocumentRecord, format: JsonFormat) -> Result<String> {
    let json = match format {
        JsonFormat::Pretty => serde_json::to_string_pretty(record)?,
        JsonFormat::Compact => serde_json::to_string(record)?,
    };
    Ok(json)
}

/// Writes a document and its artifacts into a directory.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    dir: PathBuf,
    format: JsonFormat,
}

impl ArtifactStore {
    /// Store into `dir`, created on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            format: JsonFormat::default(),
        }
    }

    pub fn with_format(mut self, format: JsonFormat) -> Self {
        self.format = format;
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write every artifact and `document.json`; returns the JSON path.
    pub fn persist(&self, document: &Document) -> Result<PathBuf> {
        fs::create_dir_all(&self.dir)?;
        let names = ArtifactNames::plan(document);

        for (figure, name) in document.figures.iter().zip(&names.figures) {
            match name {
                Some(name) => figure.image.save_png(self.dir.join(name))?,
                None => log::warn!(
                    "Figure on page {} has an empty crop; no image written",
                    figure.page
                ),
            }
        }

        let table_names = names.table_images.iter().zip(&names.table_csvs);
        for (entry, (image, csv)) in document.tables.iter().zip(table_names) {
            if let Some(image) = image {
                entry.image.save_png(self.dir.join(image))?;
            }
            if let (Some(table), Some(csv)) = (&entry.table, csv) {
                write_csv(table, &self.dir.join(csv))?;
            }
        }

        let record = DocumentRecord::new(document, &names);
        let path = self.dir.join(DOCUMENT_FILE);
        fs::write(&path, to_json(&record, self.format)?)?;

        log::info!(
            "Wrote {} ({} text blocks, {} figures, {} tables)",
            path.display(),
            record.text.len(),
            record.figures.len(),
            record.tables.len()
        );
        Ok(path)
    }

    /// Read a previously persisted `document.json`.
    pub fn load(&self) -> Result<DocumentRecord> {
        let data = fs::read(self.dir.join(DOCUMENT_FILE))?;
        Ok(serde_json::from_slice(&data)?)
    }
}

/// Write table rows as CSV without a header row.
pub fn write_csv(table: &Table, path: &Path) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)?;
    for row in &table.rows {
        writer.write_record(&row.cells)?;
    }
    writer.flush()?;
    Ok(())
}
