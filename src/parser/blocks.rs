use crate::models::{BlockDraft, BlockKind, ContentBlock};

/// Ordered block list for one parse call.
///
/// Positions come from a single counter bumped at emission time, so the
/// vector order and `position` order always agree.
#[derive(Debug, Default)]
pub struct BlockSequence {
    blocks: Vec<ContentBlock>,
    next_position: usize,
}

impl BlockSequence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Continue numbering after an existing list
    pub fn continuing(blocks: Vec<ContentBlock>) -> Self {
        let next_position = blocks.last().map(|b| b.position() + 1).unwrap_or(0);
        Self {
            blocks,
            next_position,
        }
    }

    /// Emit a block, returning its position
    pub fn push(&mut self, draft: BlockDraft) -> usize {
        let position = self.next_position;
        self.blocks.push(ContentBlock::from_draft(draft, position));
        self.next_position += 1;
        position
    }

    /// Emit a text block unless it is blank after trimming
    pub fn push_text(&mut self, text: &str) -> Option<usize> {
        let text = text.trim();
        (!text.is_empty()).then(|| self.push(BlockDraft::text(text)))
    }

    pub fn get(&self, position: usize) -> Option<&ContentBlock> {
        self.blocks.iter().find(|b| b.position() == position)
    }

    pub fn blocks(&self) -> &[ContentBlock] {
        &self.blocks
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn count_kind(&self, kind: BlockKind) -> usize {
        self.blocks.iter().filter(|b| b.kind() == kind).count()
    }

    pub fn into_blocks(self) -> Vec<ContentBlock> {
        self.blocks
    }
}
