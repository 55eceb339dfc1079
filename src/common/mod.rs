pub mod types;

pub use types::{AccessKind, BlockId, FrameId, Pid, Protection, VirtAddr};
