//! Pager configuration and address arithmetic.

use crate::{
    common::VirtAddr,
    error::{PagerError, PagerResult},
};

pub const PAGE_SIZE: usize = 4096;

/// First address of the simulated user window.
pub const UVM_BASE_ADDR: usize = 0x6000_0000;
/// Last address (inclusive) of the simulated user window.
pub const UVM_MAX_ADDR: usize = 0x600F_FFFF;

pub const DEFAULT_FRAMES: usize = 256;
pub const DEFAULT_BLOCKS: usize = 1024;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PagerConfig {
    pub frames: usize,
    pub blocks: usize,
    pub page_size: usize,
    pub base_addr: usize,
    pub max_addr: usize,
}

impl PagerConfig {
    pub fn new(frames: usize, blocks: usize) -> Self {
        Self {
            frames,
            blocks,
            page_size: PAGE_SIZE,
            base_addr: UVM_BASE_ADDR,
            max_addr: UVM_MAX_ADDR,
        }
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn with_address_range(mut self, base_addr: usize, max_addr: usize) -> Self {
        self.base_addr = base_addr;
        self.max_addr = max_addr;
        self
    }

    pub fn validate(&self) -> PagerResult<()> {
        if self.frames == 0 {
            return Err(invalid("at least one frame is required"));
        }
        if self.page_size == 0 {
            return Err(invalid("page size must be non-zero"));
        }
        if self.max_addr < self.base_addr {
            return Err(invalid("address window ends before it starts"));
        }
        if self.pages_per_process() == 0 {
            return Err(invalid("address window is smaller than one page"));
        }
        if self.frames.checked_mul(self.page_size).is_none() {
            return Err(invalid("physical memory size overflows"));
        }
        if self.blocks.checked_mul(self.page_size).is_none() {
            return Err(invalid("backing store size overflows"));
        }
        Ok(())
    }

    /// Number of page-table slots every process gets at creation.
    pub fn pages_per_process(&self) -> usize {
        (self.max_addr - self.base_addr).saturating_add(1) / self.page_size
    }

    pub fn page_of(&self, addr: VirtAddr) -> Option<usize> {
        if addr.0 < self.base_addr || addr.0 > self.max_addr {
            return None;
        }
        let page = (addr.0 - self.base_addr) / self.page_size;
        (page < self.pages_per_process()).then_some(page)
    }

    pub fn page_addr(&self, page: usize) -> VirtAddr {
        VirtAddr(self.base_addr + page * self.page_size)
    }

    pub fn offset_in_page(&self, addr: VirtAddr) -> usize {
        (addr.0 - self.base_addr) % self.page_size
    }
}

impl Default for PagerConfig {
    fn default() -> Self {
        Self::new(DEFAULT_FRAMES, DEFAULT_BLOCKS)
    }
}

fn invalid(reason: &str) -> PagerError {
    PagerError::InvalidConfig {
        reason: reason.to_string(),
    }
}
