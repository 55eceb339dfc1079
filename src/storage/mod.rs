pub mod blocks;
pub mod frames;


pub use blocks::BlockAllocator;
pub use frames::{ClockScan, Frame, FrameOwner, FrameTable};
