use std::io::Write;

use crate::{
    common::{Pid, VirtAddr},
    debugger::Component,
    error::{PagerError, PagerResult},
    mmu::MemoryController,
    pager::{PageState, PagerCore},
    vm_debug,
};

impl<C: MemoryController> PagerCore<C> {
    /// Writes `len` bytes starting at `addr` to `out` as hex, followed by a
    /// newline.
    ///
    /// Every byte must sit in a page resident for `pid`. The whole range is
    /// checked before anything is written, so a failed read emits nothing.
    pub fn read_range<W: Write>(
        &self,
        pid: Pid,
        addr: VirtAddr,
        len: usize,
        out: &mut W,
    ) -> PagerResult<()> {
        let bytes = self.collect_resident(pid, addr, len)?;
        if bytes.is_empty() {
            return Ok(());
        }

        let line: String = bytes.iter().map(|b| format!("{b:02x}")).collect();
        writeln!(out, "{line}")?;

        vm_debug!(Component::Syslog, "{} dumped {} bytes at {}", pid, len, addr);
        Ok(())
    }

    fn collect_resident(&self, pid: Pid, addr: VirtAddr, len: usize) -> PagerResult<Vec<u8>> {
        let table = self
            .registry
            .lookup(pid)
            .ok_or(PagerError::UnknownProcess { pid })?;

        // no range can hold more resident bytes than one address window
        let window = self.config.pages_per_process() * self.config.page_size;
        let mut bytes = Vec::with_capacity(len.min(window));
        for i in 0..len {
            let at = addr.offset(i).ok_or(PagerError::NotResident { pid, addr })?;
            let not_resident = PagerError::NotResident { pid, addr: at };

            let page = self.config.page_of(at).ok_or(not_resident.clone())?;
            let PageState::Resident { frame, .. } = table[page] else {
                return Err(not_resident);
            };

            let offset = self.config.offset_in_page(at);
            bytes.push(self.mmu.frame_bytes(frame)[offset]);
        }

        Ok(bytes)
    }
}
