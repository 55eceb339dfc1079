use crate::{
    common::{Pid, VirtAddr},
    debugger::Component,
    error::{PagerError, PagerResult},
    mmu::MemoryController,
    pager::{PageState, PagerCore},
    vm_debug, vm_warn,
};

impl<C: MemoryController> PagerCore<C> {
    /// Grows `pid`'s address space by one page and returns its address.
    ///
    /// Either the slot and a block are both committed or nothing changes.
    /// The page starts `BackedEmpty`: its block is reserved but the first
    /// touch is served by zero-filling, not by reading the block.
    pub fn extend(&mut self, pid: Pid) -> PagerResult<VirtAddr> {
        let result = self.try_extend(pid);

        match &result {
            Ok(addr) => {
                self.stats.extends += 1;
                vm_debug!(Component::Extend, "{} grew to {}", pid, addr);
            }
            Err(e) => {
                self.stats.extend_failures += 1;
                vm_warn!(Component::Extend, "{}", e);
            }
        }

        result
    }

    fn try_extend(&mut self, pid: Pid) -> PagerResult<VirtAddr> {
        let table = self
            .registry
            .lookup_mut(pid)
            .ok_or(PagerError::UnknownProcess { pid })?;

        let page = table
            .next_unallocated()
            .ok_or(PagerError::AddressSpaceExhausted { pid })?;

        let block = self
            .blocks
            .reserve()
            .ok_or(PagerError::OutOfBlocks { pid })?;

        table[page] = PageState::BackedEmpty { block };
        Ok(self.config.page_addr(page))
    }
}
