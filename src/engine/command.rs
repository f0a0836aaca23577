//! Layout detection and table extraction through external programs.

use serde::Deserialize;

use super::bridge::CommandBridge;
use super::{LayoutDetector, TableExtractor};
use crate::error::{Error, Result};
use crate::model::{BBox, BlockType, RasterImage, RawBlock, Table};

/// A detection as printed by a layout-model bridge.
#[derive(Debug, Clone, Deserialize)]
struct Detection {
    #[serde(rename = "type")]
    label: String,
    bbox: [f32; 4],
    #[serde(default = "default_score")]
    score: f32,
}

fn default_score() -> f32 {
    0.5
}

/// Layout detector backed by an external model process.
///
/// The program receives a page PNG and prints a JSON array of
/// `{"type": "Text", "bbox": [x1, y1, x2, y2], "score": 0.93}`.
#[derive(Debug, Clone)]
pub struct CommandDetector {
    bridge: CommandBridge,
    min_score: f32,
}

impl CommandDetector {
    pub fn new(bridge: CommandBridge) -> Self {
        Self {
            bridge,
            min_score: 0.0,
        }
    }

    /// Drop detections scoring below `min_score`.
    pub fn with_min_score(mut self, min_score: f32) -> Self {
        self.min_score = min_score;
        self
    }

    /// Parse detector output, dropping malformed and low-scoring entries.
    pub fn parse_output(&self, stdout: &[u8]) -> Result<Vec<RawBlock>> {
        let detections: Vec<Detection> = serde_json::from_slice(stdout)
            .map_err(|e| Error::Detect(format!("unreadable detector output: {}", e)))?;

        let mut blocks = Vec::with_capacity(detections.len());
        for detection in detections {
            let kind: BlockType = match detection.label.parse() {
                Ok(kind) => kind,
                Err(_) => {
                    log::warn!("Dropping detection with unknown type '{}'", detection.label);
                    continue;
                }
            };
            let [x1, y1, x2, y2] = detection.bbox;
            let bbox = match BBox::try_new(x1, y1, x2, y2) {
                Ok(bbox) => bbox,
                Err(e) => {
                    log::warn!("Dropping {} detection: {}", kind, e);
                    continue;
                }
            };
            if detection.score < self.min_score {
                continue;
            }
            blocks.push(RawBlock::new(kind, bbox, detection.score));
        }
        Ok(blocks)
    }
}

impl LayoutDetector for CommandDetector {
    fn detect(&self, image: &RasterImage) -> Result<Vec<RawBlock>> {
        let stdout = self.bridge.run(image)?;
        self.parse_output(&stdout)
    }
}

/// Table extractor backed by an external process.
///
/// The program receives a table crop and prints either `null` or
/// `{"rows": [["a", "b"], ...]}`.
#[derive(Debug, Clone)]
pub struct CommandTableExtractor {
    bridge: CommandBridge,
}

impl CommandTableExtractor {
    pub fn new(bridge: CommandBridge) -> Self {
        Self { bridge }
    }

    pub fn parse_output(stdout: &[u8]) -> Result<Option<Table>> {
        let table: Option<Table> = serde_json::from_slice(stdout)
            .map_err(|e| Error::TableExtract(format!("unreadable extractor output: {}", e)))?;
        Ok(table.filter(|t| !t.is_empty()))
    }
}

impl TableExtractor for CommandTableExtractor {
    fn extract(&self, image: &RasterImage) -> Result<Option<Table>> {
        let stdout = self.bridge.run(image)?;
        Self::parse_output(&stdout)
    }
}
