//! Serializable view of a document and its artifact file names.

use serde::{Deserialize, Serialize};

use crate::model::{BBox, BlockType, Document, FigureEntry, TableEntry, TextEntry};

/// Zero-padding width for `count` artifact names: `ceil(log10(count))`.
///
/// One artifact gets no padding, ten get one digit, eleven get two.
pub fn artifact_digits(count: usize) -> usize {
    let mut digits = 0;
    let mut capacity: usize = 1;
    while capacity < count {
        digits += 1;
        capacity = capacity.saturating_mul(10);
    }
    digits
}

/// File stem for the `index`-th artifact, e.g. `figure03`.
pub fn artifact_stem(prefix: &str, index: usize, digits: usize) -> String {
    format!("{}{:0width$}", prefix, index, width = digits)
}

/// A text entry as written to `document.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextRecord {
    pub text: String,
    #[serde(rename = "type")]
    pub kind: BlockType,
    pub coordinates: BBox,
    pub score: f32,
    pub page: usize,
    pub block_id: usize,
}

/// A figure entry; `image` names the PNG, or is null for an empty crop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FigureRecord {
    pub image: Option<String>,
    pub caption: Option<String>,
    #[serde(rename = "type")]
    pub kind: BlockType,
    pub coordinates: BBox,
    pub score: f32,
    pub page: usize,
    pub block_id: usize,
}

/// A table entry; `table` names the CSV, or is null when no table was found.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableRecord {
    pub table: Option<String>,
    pub image: Option<String>,
    pub caption: Option<String>,
    #[serde(rename = "type")]
    pub kind: BlockType,
    pub coordinates: BBox,
    pub score: f32,
    pub page: usize,
    pub block_id: usize,
}

/// The `document.json` payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentRecord {
    pub num_pages: usize,
    pub text: Vec<TextRecord>,
    pub figures: Vec<FigureRecord>,
    pub tables: Vec<TableRecord>,
}

impl From<&TextEntry> for TextRecord {
    fn from(entry: &TextEntry) -> Self {
        Self {
            text: entry.text.clone(),
            kind: entry.kind,
            coordinates: entry.bbox,
            score: entry.score,
            page: entry.page,
            block_id: entry.block_id,
        }
    }
}

impl FigureRecord {
    fn new(entry: &FigureEntry, image: Option<String>) -> Self {
        Self {
            image,
            caption: entry.caption.clone(),
            kind: entry.kind,
            coordinates: entry.bbox,
            score: entry.score,
            page: entry.page,
            block_id: entry.block_id,
        }
    }
}

impl TableRecord {
    fn new(entry: &TableEntry, image: Option<String>, table: Option<String>) -> Self {
        Self {
            table,
            image,
            caption: entry.caption.clone(),
            kind: entry.kind,
            coordinates: entry.bbox,
            score: entry.score,
            page: entry.page,
            block_id: entry.block_id,
        }
    }
}

/// Artifact file names planned for one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactNames {
    /// `figureN.png` per figure, `None` where the crop is empty
    pub figures: Vec<Option<String>>,
    /// `tableN.png` per table, `None` where the crop is empty
    pub table_images: Vec<Option<String>>,
    /// `tableN.csv` per table, `None` where no table was extracted
    pub table_csvs: Vec<Option<String>>,
}

impl ArtifactNames {
    /// Name every artifact of `document`.
    pub fn plan(document: &Document) -> Self {
        let digits = artifact_digits(document.figures.len());
        let figures = document
            .figures
            .iter()
            .enumerate()
            .map(|(i, f)| {
                (!f.image.is_empty()).then(|| format!("{}.png", artifact_stem("figure", i, digits)))
            })
            .collect();

        let digits = artifact_digits(document.tables.len());
        let mut table_images = Vec::with_capacity(document.tables.len());
        let mut table_csvs = Vec::with_capacity(document.tables.len());
        for (i, t) in document.tables.iter().enumerate() {
            let stem = artifact_stem("table", i, digits);
            table_images.push((!t.image.is_empty()).then(|| format!("{}.png", stem)));
            table_csvs.push(t.table.as_ref().map(|_| format!("{}.csv", stem)));
        }

        Self {
            figures,
            table_images,
            table_csvs,
        }
    }
}

impl DocumentRecord {
    /// Build the record, referring to artifacts by the given names.
    pub fn new(document: &Document, names: &ArtifactNames) -> Self {
        Self {
            num_pages: document.num_pages,
            text: document.text.iter().map(TextRecord::from).collect(),
            figures: document
                .figures
                .iter()
                .zip(&names.figures)
                .map(|(f, name)| FigureRecord::new(f, name.clone()))
                .collect(),
            tables: document
                .tables
                .iter()
                .zip(names.table_images.iter().zip(&names.table_csvs))
                .map(|(t, (image, csv))| TableRecord::new(t, image.clone(), csv.clone()))
                .collect(),
        }
    }
}
