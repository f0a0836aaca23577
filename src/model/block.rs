//! Detected page regions.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Label assigned to a detected region by the layout model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BlockType {
    /// Body text
    Text,
    /// Title or heading
    Title,
    /// List item(s)
    List,
    /// Table
    Table,
    /// Figure or picture
    Figure,
}

impl BlockType {
    /// All labels, in the order the PubLayNet models number them.
    pub const ALL: [BlockType; 5] = [
        BlockType::Text,
        BlockType::Title,
        BlockType::List,
        BlockType::Table,
        BlockType::Figure,
    ];

    /// Whether regions of this type carry readable text (and get OCR'd).
    pub fn is_text_bearing(self) -> bool {
        matches!(self, BlockType::Text | BlockType::Title | BlockType::List)
    }

    /// Label as written by the layout model.
    pub fn as_str(self) -> &'static str {
        match self {
            BlockType::Text => "Text",
            BlockType::Title => "Title",
            BlockType::List => "List",
            BlockType::Table => "Table",
            BlockType::Figure => "Figure",
        }
    }
}

impl fmt::Display for BlockType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BlockType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        BlockType::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| Error::InvalidBlock(format!("unknown block type '{}'", s)))
    }
}

/// Axis-aligned bounding box in page-pixel space.
///
/// `(x1, y1)` is the top-left corner, `(x2, y2)` the bottom-right.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BBox {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}

impl BBox {
    /// Create a box without validation.
    pub fn new(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Create a box, rejecting empty, inverted or non-finite coordinates.
    pub fn try_new(x1: f32, y1: f32, x2: f32, y2: f32) -> Result<Self> {
        let bbox = Self::new(x1, y1, x2, y2);
        bbox.validate()?;
        Ok(bbox)
    }

    /// Check `x1 < x2` and `y1 < y2` on finite coordinates.
    pub fn validate(&self) -> Result<()> {
        let finite = [self.x1, self.y1, self.x2, self.y2]
            .iter()
            .all(|v| v.is_finite());
        if finite && self.x1 < self.x2 && self.y1 < self.y2 {
            Ok(())
        } else {
            Err(Error::InvalidBlock(format!(
                "bounding box ({}, {}, {}, {}) is empty or inverted",
                self.x1, self.y1, self.x2, self.y2
            )))
        }
    }

    pub fn width(&self) -> f32 {
        self.x2 - self.x1
    }

    pub fn height(&self) -> f32 {
        self.y2 - self.y1
    }

    pub fn center(&self) -> (f32, f32) {
        ((self.x1 + self.x2) * 0.5, (self.y1 + self.y2) * 0.5)
    }

    /// Squared Euclidean distance between the two box centres.
    pub fn center_distance_sq(&self, other: &BBox) -> f32 {
        let (ax, ay) = self.center();
        let (bx, by) = other.center();
        (ax - bx).powi(2) + (ay - by).powi(2)
    }
}

/// Anything positioned on the page by a bounding box.
pub trait Region {
    fn bbox(&self) -> &BBox;
}

/// A region as produced by the layout detector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawBlock {
    /// Region label
    #[serde(rename = "type")]
    pub kind: BlockType,
    /// Bounding box
    pub bbox: BBox,
    /// Detector confidence in `[0, 1]`
    pub score: f32,
}

impl RawBlock {
    pub fn new(kind: BlockType, bbox: BBox, score: f32) -> Self {
        Self { kind, bbox, score }
    }
}

impl Region for RawBlock {
    fn bbox(&self) -> &BBox {
        &self.bbox
    }
}

/// A region of a page, optionally carrying recognized text.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub kind: BlockType,
    pub bbox: BBox,
    pub score: f32,
    pub text: Option<String>,
}

impl Block {
    /// Create a block without text.
    pub fn new(kind: BlockType, bbox: BBox, score: f32) -> Self {
        Self {
            kind,
            bbox,
            score,
            text: None,
        }
    }

    /// Return a new block with `text` attached.
    ///
    /// The receiver is consumed; blocks are never edited in place.
    pub fn with_text(self, text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..self
        }
    }

    /// Recognized text, if any.
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub fn is_text_bearing(&self) -> bool {
        self.kind.is_text_bearing()
    }
}

impl From<RawBlock> for Block {
    fn from(raw: RawBlock) -> Self {
        Block::new(raw.kind, raw.bbox, raw.score)
    }
}

impl Region for Block {
    fn bbox(&self) -> &BBox {
        &self.bbox
    }
}
