use crate::common::{BlockId, FrameId, Pid, Protection, VirtAddr};

/// Primitive operations the pager drives but does not implement: changing
/// what a process may address and moving page-sized units between physical
/// memory and the backing store.
pub trait MemoryController: Send {
    /// Changes the access rights of an existing mapping.
    fn grant(&mut self, pid: Pid, vaddr: VirtAddr, prot: Protection);

    /// Marks a mapping absent so the next access faults.
    fn revoke(&mut self, pid: Pid, vaddr: VirtAddr);

    fn map(&mut self, pid: Pid, vaddr: VirtAddr, frame: FrameId, prot: Protection);

    fn disk_read(&mut self, block: BlockId, frame: FrameId);

    fn disk_write(&mut self, frame: FrameId, block: BlockId);

    fn zero_fill(&mut self, frame: FrameId);

    /// Read-only view of one frame of physical memory.
    fn frame_bytes(&self, frame: FrameId) -> &[u8];
}
