use std::collections::HashMap;
use std::ops::{Index, IndexMut};

use crate::{
    common::{BlockId, FrameId, Pid},
    debugger::Component,
    error::{PagerError, PagerResult},
    vm_debug,
};

/// State of one virtual page slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PageState {
    /// Never extended into.
    #[default]
    Unallocated,

    /// Extended: a block is reserved but nothing was ever loaded. First touch
    /// is a demand-zero fault.
    BackedEmpty { block: BlockId },

    /// Held in a frame. `on_disk` is true when `block` also holds a valid copy.
    Resident {
        frame: FrameId,
        block: BlockId,
        on_disk: bool,
    },

    /// Evicted; the only copy lives in `block`.
    SwappedOut { block: BlockId },
}

impl PageState {
    pub fn block(&self) -> Option<BlockId> {
        match *self {
            PageState::Unallocated => None,
            PageState::BackedEmpty { block }
            | PageState::Resident { block, .. }
            | PageState::SwappedOut { block } => Some(block),
        }
    }

    pub fn frame(&self) -> Option<FrameId> {
        match *self {
            PageState::Resident { frame, .. } => Some(frame),
            _ => None,
        }
    }

    pub fn is_resident(&self) -> bool {
        matches!(self, PageState::Resident { .. })
    }

    pub fn is_allocated(&self) -> bool {
        !matches!(self, PageState::Unallocated)
    }
}

/// Fixed-length page table of one process.
#[derive(Debug, Clone)]
pub struct PageTable {
    entries: Vec<PageState>,
}

impl PageTable {
    pub fn new(pages: usize) -> Self {
        Self {
            entries: vec![PageState::Unallocated; pages],
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, page: usize) -> Option<&PageState> {
        self.entries.get(page)
    }

    pub fn get_mut(&mut self, page: usize) -> Option<&mut PageState> {
        self.entries.get_mut(page)
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &PageState)> {
        self.entries.iter().enumerate()
    }

    /// First slot never extended into, scanning in slot order.
    pub fn next_unallocated(&self) -> Option<usize> {
        self.entries.iter().position(|e| !e.is_allocated())
    }

    pub fn resident_count(&self) -> usize {
        self.entries.iter().filter(|e| e.is_resident()).count()
    }

    pub fn allocated_count(&self) -> usize {
        self.entries.iter().filter(|e| e.is_allocated()).count()
    }
}

impl Index<usize> for PageTable {
    type Output = PageState;

    fn index(&self, page: usize) -> &PageState {
        &self.entries[page]
    }
}

impl IndexMut<usize> for PageTable {
    fn index_mut(&mut self, page: usize) -> &mut PageState {
        &mut self.entries[page]
    }
}

/// Page tables of every live process, keyed by pid.
#[derive(Debug)]
pub struct ProcessRegistry {
    tables: HashMap<Pid, PageTable>,
    pages_per_process: usize,
}

impl ProcessRegistry {
    pub fn new(pages_per_process: usize) -> Self {
        Self {
            tables: HashMap::new(),
            pages_per_process,
        }
    }

    pub fn create(&mut self, pid: Pid) -> PagerResult<()> {
        if self.tables.contains_key(&pid) {
            return Err(PagerError::ProcessExists { pid });
        }

        self.tables.insert(pid, PageTable::new(self.pages_per_process));
        vm_debug!(
            Component::Registry,
            "{} registered with {} page slots ({} live)",
            pid,
            self.pages_per_process,
            self.tables.len()
        );
        Ok(())
    }

    pub fn lookup(&self, pid: Pid) -> Option<&PageTable> {
        self.tables.get(&pid)
    }

    pub fn lookup_mut(&mut self, pid: Pid) -> Option<&mut PageTable> {
        self.tables.get_mut(&pid)
    }

    pub fn remove(&mut self, pid: Pid) -> Option<PageTable> {
        self.tables.remove(&pid)
    }

    pub fn contains(&self, pid: Pid) -> bool {
        self.tables.contains_key(&pid)
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Pid, &PageTable)> {
        self.tables.iter().map(|(pid, table)| (*pid, table))
    }

    pub fn pages_per_process(&self) -> usize {
        self.pages_per_process
    }

    /// Number of resident entries across every live process.
    pub fn resident_count(&self) -> usize {
        self.tables.values().map(PageTable::resident_count).sum()
    }
}
