use std::collections::HashMap;

use crate::{
    common::{AccessKind, BlockId, FrameId, Pid, Protection, VirtAddr},
    config::PagerConfig,
    debugger::Component,
    mmu::controller::MemoryController,
    vm_trace, vm_warn,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mapping {
    pub frame: FrameId,
    pub prot: Protection,
}

/// One controller call, as recorded by the journal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MmuEvent {
    Grant {
        pid: Pid,
        addr: VirtAddr,
        prot: Protection,
    },
    Revoke {
        pid: Pid,
        addr: VirtAddr,
    },
    Map {
        pid: Pid,
        addr: VirtAddr,
        frame: FrameId,
        prot: Protection,
    },
    DiskRead {
        block: BlockId,
        frame: FrameId,
    },
    DiskWrite {
        frame: FrameId,
        block: BlockId,
    },
    ZeroFill {
        frame: FrameId,
    },
}

/// In-memory controller: a flat physical memory, a flat disk and a mapping
/// table keyed by page address.
#[derive(Debug)]
pub struct SimMmu {
    config: PagerConfig,
    memory: Vec<u8>,
    disk: Vec<u8>,
    mappings: HashMap<(Pid, VirtAddr), Mapping>,
    journal: Option<Vec<MmuEvent>>,
}

impl SimMmu {
    pub fn new(config: &PagerConfig) -> Self {
        Self {
            config: config.clone(),
            memory: vec![0u8; config.frames * config.page_size],
            disk: vec![0u8; config.blocks * config.page_size],
            mappings: HashMap::new(),
            journal: None,
        }
    }

    /// Starts recording every controller call.
    pub fn with_journal(mut self) -> Self {
        self.journal = Some(Vec::new());
        self
    }

    pub fn events(&self) -> &[MmuEvent] {
        self.journal.as_deref().unwrap_or(&[])
    }

    pub fn take_events(&mut self) -> Vec<MmuEvent> {
        self.journal.as_mut().map(std::mem::take).unwrap_or_default()
    }

    pub fn mapping(&self, pid: Pid, addr: VirtAddr) -> Option<Mapping> {
        let page = self.page_base(addr)?;
        self.mappings.get(&(pid, page)).copied()
    }

    pub fn mapped_pages(&self, pid: Pid) -> usize {
        self.mappings.keys().filter(|(owner, _)| *owner == pid).count()
    }

    /// Physical byte index for an access, or `None` when it must fault.
    pub fn translate(&self, pid: Pid, addr: VirtAddr, access: AccessKind) -> Option<usize> {
        let mapping = self.mapping(pid, addr)?;
        if !mapping.prot.allows(access) {
            return None;
        }
        Some(mapping.frame.0 * self.config.page_size + self.config.offset_in_page(addr))
    }

    pub fn load(&self, pid: Pid, addr: VirtAddr) -> Option<u8> {
        self.translate(pid, addr, AccessKind::Read)
            .map(|idx| self.memory[idx])
    }

    /// Returns false when the store faults.
    pub fn store(&mut self, pid: Pid, addr: VirtAddr, byte: u8) -> bool {
        match self.translate(pid, addr, AccessKind::Write) {
            Some(idx) => {
                self.memory[idx] = byte;
                true
            }
            None => false,
        }
    }

    /// Drops every mapping `pid` still holds, as when its address space is
    /// torn down. Not part of the controller contract; the pager never asks.
    pub fn forget_process(&mut self, pid: Pid) -> usize {
        let before = self.mappings.len();
        self.mappings.retain(|(owner, _), _| *owner != pid);
        before - self.mappings.len()
    }

    pub fn block_bytes(&self, block: BlockId) -> &[u8] {
        let start = block.0 * self.config.page_size;
        &self.disk[start..start + self.config.page_size]
    }

    fn frame_range(&self, frame: FrameId) -> std::ops::Range<usize> {
        let start = frame.0 * self.config.page_size;
        start..start + self.config.page_size
    }

    fn page_base(&self, addr: VirtAddr) -> Option<VirtAddr> {
        self.config
            .page_of(addr)
            .map(|page| self.config.page_addr(page))
    }

    fn record(&mut self, event: MmuEvent) {
        vm_trace!(Component::Mmu, "{:?}", event);
        if let Some(journal) = self.journal.as_mut() {
            journal.push(event);
        }
    }
}

impl MemoryController for SimMmu {
    fn grant(&mut self, pid: Pid, vaddr: VirtAddr, prot: Protection) {
        self.record(MmuEvent::Grant {
            pid,
            addr: vaddr,
            prot,
        });

        let Some(page) = self.page_base(vaddr) else {
            vm_warn!(Component::Mmu, "grant outside the user window: {}", vaddr);
            return;
        };
        match self.mappings.get_mut(&(pid, page)) {
            Some(mapping) => mapping.prot = prot,
            None => {
                vm_warn!(Component::Mmu, "grant on unmapped page {} of {}", page, pid);
            }
        }
    }

    fn revoke(&mut self, pid: Pid, vaddr: VirtAddr) {
        self.record(MmuEvent::Revoke { pid, addr: vaddr });

        if let Some(page) = self.page_base(vaddr) {
            self.mappings.remove(&(pid, page));
        }
    }

    fn map(&mut self, pid: Pid, vaddr: VirtAddr, frame: FrameId, prot: Protection) {
        self.record(MmuEvent::Map {
            pid,
            addr: vaddr,
            frame,
            prot,
        });

        match self.page_base(vaddr) {
            Some(page) => {
                self.mappings.insert((pid, page), Mapping { frame, prot });
            }
            None => {
                vm_warn!(Component::Mmu, "map outside the user window: {}", vaddr);
            }
        }
    }

    fn disk_read(&mut self, block: BlockId, frame: FrameId) {
        self.record(MmuEvent::DiskRead { block, frame });

        let src = block.0 * self.config.page_size;
        let dst = self.frame_range(frame);
        self.memory[dst].copy_from_slice(&self.disk[src..src + self.config.page_size]);
    }

    fn disk_write(&mut self, frame: FrameId, block: BlockId) {
        self.record(MmuEvent::DiskWrite { frame, block });

        let src = self.frame_range(frame);
        let dst = block.0 * self.config.page_size;
        self.disk[dst..dst + self.config.page_size].copy_from_slice(&self.memory[src]);
    }

    fn zero_fill(&mut self, frame: FrameId) {
        self.record(MmuEvent::ZeroFill { frame });

        let range = self.frame_range(frame);
        self.memory[range].fill(0);
    }

    fn frame_bytes(&self, frame: FrameId) -> &[u8] {
        &self.memory[self.frame_range(frame)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sim() -> (PagerConfig, SimMmu) {
        let config = PagerConfig::new(2, 2).with_page_size(16);
        let mmu = SimMmu::new(&config).with_journal();
        (config, mmu)
    }

    #[test]
    fn unmapped_access_faults() {
        let (config, mmu) = sim();
        assert_eq!(mmu.load(Pid(1), config.page_addr(0)), None);
    }

    #[test]
    fn read_only_mapping_faults_on_store() {
        let (config, mut mmu) = sim();
        let addr = config.page_addr(0);

        mmu.map(Pid(1), addr, FrameId(1), Protection::Read);
        assert_eq!(mmu.load(Pid(1), addr), Some(0));
        assert!(!mmu.store(Pid(1), addr, 7));

        mmu.grant(Pid(1), addr, Protection::ReadWrite);
        assert!(mmu.store(Pid(1), addr.offset(3).unwrap(), 7));
        assert_eq!(mmu.frame_bytes(FrameId(1))[3], 7);
    }

    #[test]
    fn disk_round_trip_preserves_content() {
        let (config, mut mmu) = sim();
        let addr = config.page_addr(1);

        mmu.map(Pid(1), addr, FrameId(0), Protection::ReadWrite);
        assert!(mmu.store(Pid(1), addr, 0xab));

        mmu.disk_write(FrameId(0), BlockId(1));
        mmu.zero_fill(FrameId(0));
        assert_eq!(mmu.frame_bytes(FrameId(0))[0], 0);
        assert_eq!(mmu.block_bytes(BlockId(1))[0], 0xab);

        mmu.disk_read(BlockId(1), FrameId(0));
        assert_eq!(mmu.load(Pid(1), addr), Some(0xab));
    }

    #[test]
    fn revoke_removes_the_mapping_and_journal_records_calls() {
        let (config, mut mmu) = sim();
        let addr = config.page_addr(0);

        mmu.map(Pid(3), addr, FrameId(0), Protection::Read);
        mmu.revoke(Pid(3), addr);

        assert_eq!(mmu.mapping(Pid(3), addr), None);
        assert_eq!(
            mmu.take_events(),
            vec![
                MmuEvent::Map {
                    pid: Pid(3),
                    addr,
                    frame: FrameId(0),
                    prot: Protection::Read
                },
                MmuEvent::Revoke { pid: Pid(3), addr },
            ]
        );
        assert!(mmu.events().is_empty());
    }

    #[test]
    fn forget_process_only_drops_that_process() {
        let (config, mut mmu) = sim();

        mmu.map(Pid(1), config.page_addr(0), FrameId(0), Protection::Read);
        mmu.map(Pid(1), config.page_addr(1), FrameId(1), Protection::Read);
        mmu.map(Pid(2), config.page_addr(0), FrameId(1), Protection::Read);

        assert_eq!(mmu.forget_process(Pid(1)), 2);
        assert_eq!(mmu.mapped_pages(Pid(1)), 0);
        assert_eq!(mmu.mapped_pages(Pid(2)), 1);
    }
}
