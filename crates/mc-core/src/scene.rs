//! The engine-owned block/link store.
//!
//! Blocks live in a `Vec` (draw order) with an id → slot index beside it.
//! Links refer to blocks by id only and are resolved on use; a missing
//! endpoint resolves to `None` and the caller skips the link.

use crate::id::{BlockId, LinkId};
use crate::model::{Block, Link, Snapshot};
use std::collections::HashMap;

#[derive(Debug, Clone, Default)]
pub struct Scene {
    blocks: Vec<Block>,
    index: HashMap<BlockId, usize>,
    links: Vec<Link>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_snapshot(snapshot: Snapshot) -> Self {
        let mut scene = Self::new();
        scene.replace(snapshot);
        scene
    }

    /// Full replace from the external store. Selection survives for
    /// blocks that are still present.
    pub fn replace(&mut self, snapshot: Snapshot) {
        let selected = self.selected();
        self.blocks = snapshot.blocks;
        self.links = snapshot.links;
        self.reindex();
        for block in &mut self.blocks {
            block.selected = Some(block.id) == selected;
        }
        log::debug!(
            "scene replaced: {} blocks, {} links",
            self.blocks.len(),
            self.links.len()
        );
    }

    fn reindex(&mut self) {
        self.index.clear();
        for (i, block) in self.blocks.iter().enumerate() {
            if self.index.insert(block.id, i).is_some() {
                log::warn!("duplicate block id {}; last one wins", block.id);
            }
        }
    }

    pub fn to_snapshot(&self) -> Snapshot {
        Snapshot {
            blocks: self.blocks.clone(),
            links: self.links.clone(),
        }
    }

    // ─── Blocks ──────────────────────────────────────────────────────────

    /// Blocks in insertion order.
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn block(&self, id: BlockId) -> Option<&Block> {
        self.index.get(&id).and_then(|&i| self.blocks.get(i))
    }

    pub fn block_mut(&mut self, id: BlockId) -> Option<&mut Block> {
        let i = *self.index.get(&id)?;
        self.blocks.get_mut(i)
    }

    /// Insert or replace a block.
    pub fn upsert_block(&mut self, block: Block) {
        match self.index.get(&block.id) {
            Some(&i) => self.blocks[i] = block,
            None => {
                self.index.insert(block.id, self.blocks.len());
                self.blocks.push(block);
            }
        }
    }

    /// Remove a block. Links pointing at it stay and become dangling.
    pub fn remove_block(&mut self, id: BlockId) -> Option<Block> {
        let i = self.index.remove(&id)?;
        let block = self.blocks.remove(i);
        self.reindex();
        Some(block)
    }

    /// Unselected blocks first, then selected ones, so selection paints on top.
    pub fn paint_order(&self) -> impl Iterator<Item = &Block> {
        self.blocks
            .iter()
            .filter(|b| !b.selected)
            .chain(self.blocks.iter().filter(|b| b.selected))
    }

    // ─── Selection ───────────────────────────────────────────────────────

    pub fn selected(&self) -> Option<BlockId> {
        self.blocks.iter().find(|b| b.selected).map(|b| b.id)
    }

    /// Select exactly one block (or none). Returns whether anything changed.
    /// An id that isn't in the scene clears the selection.
    pub fn select(&mut self, id: Option<BlockId>) -> bool {
        let mut changed = false;
        for block in &mut self.blocks {
            let on = Some(block.id) == id;
            if block.selected != on {
                block.selected = on;
                changed = true;
            }
        }
        changed
    }

    // ─── Links ───────────────────────────────────────────────────────────

    pub fn links(&self) -> &[Link] {
        &self.links
    }

    pub fn link(&self, id: LinkId) -> Option<&Link> {
        self.links.iter().find(|l| l.id == id)
    }

    pub fn link_mut(&mut self, id: LinkId) -> Option<&mut Link> {
        self.links.iter_mut().find(|l| l.id == id)
    }

    pub fn upsert_link(&mut self, link: Link) {
        match self.links.iter_mut().find(|l| l.id == link.id) {
            Some(slot) => *slot = link,
            None => self.links.push(link),
        }
    }

    pub fn remove_link(&mut self, id: LinkId) -> Option<Link> {
        let i = self.links.iter().position(|l| l.id == id)?;
        Some(self.links.remove(i))
    }

    /// Resolve both endpoints; `None` if either block is gone.
    pub fn endpoints(&self, link: &Link) -> Option<(&Block, &Block)> {
        Some((self.block(link.source)?, self.block(link.target)?))
    }
}
