use vmpager::config::{PagerConfig, UVM_BASE_ADDR};

#[allow(dead_code)]
pub const SMALL_PAGE: usize = 64;

/// A deliberately cramped machine: few frames, small pages.
#[allow(dead_code)]
pub fn tight(frames: usize, blocks: usize) -> PagerConfig {
    PagerConfig::new(frames, blocks).with_page_size(SMALL_PAGE)
}

/// Like `tight`, but with only `pages` virtual pages per process.
#[allow(dead_code)]
pub fn windowed(frames: usize, blocks: usize, pages: usize) -> PagerConfig {
    tight(frames, blocks)
        .with_address_range(UVM_BASE_ADDR, UVM_BASE_ADDR + pages * SMALL_PAGE - 1)
}

/// Recognisable page content: every byte derives from the page's number.
#[allow(dead_code)]
pub fn pattern(seed: usize, len: usize) -> Vec<u8> {
    (0..len).map(|i| (seed * 31 + i * 7) as u8).collect()
}
