use crate::{common::BlockId, debugger::Component, vm_trace};

/// Tracks which backing-store blocks are reserved.
///
/// `free + in_use == capacity` holds after every call.
#[derive(Debug)]
pub struct BlockAllocator {
    in_use: Vec<bool>,
    free: usize,
}

impl BlockAllocator {
    pub fn new(capacity: usize) -> Self {
        Self {
            in_use: vec![false; capacity],
            free: capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.in_use.len()
    }

    pub fn free_count(&self) -> usize {
        self.free
    }

    pub fn in_use_count(&self) -> usize {
        self.capacity() - self.free
    }

    pub fn is_in_use(&self, block: BlockId) -> bool {
        self.in_use.get(block.0).copied().unwrap_or(false)
    }

    /// Reserves the lowest-numbered free block.
    pub fn reserve(&mut self) -> Option<BlockId> {
        if self.free == 0 {
            return None;
        }

        let idx = self.in_use.iter().position(|used| !used)?;
        self.in_use[idx] = true;
        self.free -= 1;

        vm_trace!(Component::Blocks, "reserved block {} ({} free)", idx, self.free);
        Some(BlockId(idx))
    }

    pub fn release(&mut self, block: BlockId) {
        match self.in_use.get_mut(block.0) {
            Some(used) if *used => {
                *used = false;
                self.free += 1;
                vm_trace!(Component::Blocks, "released {} ({} free)", block, self.free);
            }
            Some(_) => panic!("{} released twice", block),
            None => panic!("{} is outside the backing store", block),
        }
    }
}
