//! Reading-order layout of a single page.

use std::ops::Index;

use super::columns::sort_by_columns;
use crate::model::{Block, BlockType, RawBlock};

/// The blocks of one page, in reading order.
///
/// Neighbour lookups are bounds-checked, so callers probe relative positions
/// without doing index arithmetic themselves.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageLayout {
    blocks: Vec<Block>,
}

impl PageLayout {
    /// Sort detector output into reading order.
    pub fn from_detections(raw: Vec<RawBlock>) -> Self {
        Self::sorted(raw.into_iter().map(Block::from).collect())
    }

    /// Sort blocks into reading order.
    pub fn sorted(blocks: Vec<Block>) -> Self {
        Self {
            blocks: sort_by_columns(blocks),
        }
    }

    /// Wrap blocks that are already in reading order.
    pub fn from_ordered(blocks: Vec<Block>) -> Self {
        Self { blocks }
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Block> {
        self.blocks.get(index)
    }

    /// The block `offset` positions away from `index`, with its index.
    ///
    /// Returns `None` when the position falls outside the page.
    pub fn neighbor(&self, index: usize, offset: isize) -> Option<(usize, &Block)> {
        let target = index.checked_add_signed(offset)?;
        self.blocks.get(target).map(|block| (target, block))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Block> {
        self.blocks.iter()
    }

    /// `(index, block)` pairs of the given type, in reading order.
    pub fn indices_of(&self, kind: BlockType) -> impl Iterator<Item = (usize, &Block)> {
        self.blocks
            .iter()
            .enumerate()
            .filter(move |(_, b)| b.kind == kind)
    }

    /// `(index, block)` pairs of text-bearing blocks, in reading order.
    pub fn text_bearing(&self) -> impl Iterator<Item = (usize, &Block)> {
        self.blocks
            .iter()
            .enumerate()
            .filter(|(_, b)| b.is_text_bearing())
    }

    /// Produce a new layout by transforming every block, keeping the order.
    pub fn map_blocks<F>(self, f: F) -> Self
    where
        F: FnMut(Block) -> Block,
    {
        Self {
            blocks: self.blocks.into_iter().map(f).collect(),
        }
    }

    /// Fallible version of [`PageLayout::map_blocks`].
    pub fn try_map_blocks<F, E>(self, f: F) -> Result<Self, E>
    where
        F: FnMut(Block) -> Result<Block, E>,
    {
        Ok(Self {
            blocks: self.blocks.into_iter().map(f).collect::<Result<_, E>>()?,
        })
    }

    pub fn as_slice(&self) -> &[Block] {
        &self.blocks
    }

    pub fn into_blocks(self) -> Vec<Block> {
        self.blocks
    }
}

impl Index<usize> for PageLayout {
    type Output = Block;

    fn index(&self, index: usize) -> &Block {
        &self.blocks[index]
    }
}
