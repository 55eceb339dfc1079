//! Fault handling and second-chance replacement.
//!
//! A fault on a resident page is a write upgrade. Any other fault needs a
//! frame: when every frame is visible, all mappings are closed first so that
//! each frame faults again and refreshes its reference bit; the clock hand
//! then picks a victim, which is written back only if dirty.
//!
//! Faults the controller should never deliver (an unknown process, an
//! address outside the window, a page never extended) and broken reverse
//! pointers are invariant violations and panic.

use crate::{
    common::{BlockId, FrameId, Pid, Protection, VirtAddr},
    debugger::{Component, DebugLevel},
    mmu::MemoryController,
    pager::{PageState, PagerCore},
    storage::FrameOwner,
    vm_debug, vm_info, vm_scope,
};

impl<C: MemoryController> PagerCore<C> {
    pub fn fault(&mut self, pid: Pid, vaddr: VirtAddr) {
        vm_scope!(
            DebugLevel::Debug,
            Component::Fault,
            format!("fault {} at {}", pid, vaddr),
            { self.handle_fault(pid, vaddr) }
        )
    }

    fn handle_fault(&mut self, pid: Pid, vaddr: VirtAddr) {
        self.stats.faults += 1;

        let Some(page) = self.config.page_of(vaddr) else {
            panic!("{} faulted outside the user window at {}", pid, vaddr);
        };
        let Some(table) = self.registry.lookup(pid) else {
            panic!("fault from {} which has no page table", pid);
        };
        let state = table[page];

        match state {
            PageState::Resident { frame, .. } => self.upgrade_to_write(pid, page, frame),
            PageState::BackedEmpty { block } => self.load_page(pid, page, block, false),
            PageState::SwappedOut { block } => self.load_page(pid, page, block, true),
            PageState::Unallocated => {
                panic!("{} faulted at {} on page {} which was never extended", pid, vaddr, page)
            }
        }
    }

    fn upgrade_to_write(&mut self, pid: Pid, page: usize, frame: FrameId) {
        let expected = FrameOwner { pid, page };
        let owner = self.frames.get(frame).owner();
        if owner != Some(expected) {
            panic!(
                "{} page {} is resident in {} but the frame is owned by {:?}",
                pid, page, frame, owner
            );
        }

        self.mmu
            .grant(pid, self.config.page_addr(page), Protection::ReadWrite);
        self.frames.mark_written(frame);
        self.stats.write_upgrades += 1;

        vm_debug!(Component::Fault, "{} page {} writable in {}", pid, page, frame);
    }

    fn load_page(&mut self, pid: Pid, page: usize, block: BlockId, on_disk: bool) {
        if self.frames.all_visible() {
            self.reset_visibility();
        }

        let scan = self.frames.scan_for_victim();
        self.stats.clock_steps += scan.examined as u64;
        let victim = scan.victim;

        if let Some(owner) = self.frames.get(victim).owner() {
            self.evict(victim, owner);
        }

        if on_disk {
            self.mmu.disk_read(block, victim);
            self.stats.disk_reads += 1;
        } else {
            self.mmu.zero_fill(victim);
            self.stats.zero_fills += 1;
        }

        self.frames.mark_occupied(victim, FrameOwner { pid, page });
        self.mmu
            .map(pid, self.config.page_addr(page), victim, Protection::Read);
        *self.entry_mut(pid, page) = PageState::Resident {
            frame: victim,
            block,
            on_disk,
        };

        vm_debug!(
            Component::Fault,
            "{} page {} loaded into {} ({})",
            pid,
            page,
            victim,
            if on_disk { "from disk" } else { "zero-filled" }
        );
    }

    /// Closes every mapping so each frame faults again before it can be
    /// considered recently used.
    fn reset_visibility(&mut self) {
        let hidden = self.frames.hide_all();
        for (_, owner) in &hidden {
            let addr = self.config.page_addr(owner.page);
            self.mmu.grant(owner.pid, addr, Protection::None);
        }
        self.stats.visibility_resets += 1;

        vm_debug!(Component::Clock, "visibility reset over {} frames", hidden.len());
    }

    fn evict(&mut self, victim: FrameId, owner: FrameOwner) {
        self.mmu
            .revoke(owner.pid, self.config.page_addr(owner.page));
        let dirty = self.frames.get(victim).dirty();

        let entry = self
            .registry
            .lookup_mut(owner.pid)
            .and_then(|table| table.get_mut(owner.page))
            .unwrap_or_else(|| {
                panic!(
                    "{} owned by {} page {} which has no page-table entry",
                    victim, owner.pid, owner.page
                )
            });

        let next = match *entry {
            PageState::Resident {
                frame,
                block,
                on_disk,
            } if frame == victim => {
                if dirty {
                    self.mmu.disk_write(victim, block);
                    self.stats.disk_writes += 1;
                    PageState::SwappedOut { block }
                } else if on_disk {
                    PageState::SwappedOut { block }
                } else {
                    PageState::BackedEmpty { block }
                }
            }
            other => panic!(
                "{} owned by {} page {} but that entry is {:?}",
                victim, owner.pid, owner.page, other
            ),
        };
        *entry = next;

        self.frames.mark_free(victim);
        self.stats.evictions += 1;

        vm_info!(
            Component::Fault,
            "evicted {} page {} from {}{}",
            owner.pid,
            owner.page,
            victim,
            if dirty { " (written back)" } else { "" }
        );
    }

    fn entry_mut(&mut self, pid: Pid, page: usize) -> &mut PageState {
        self.registry
            .lookup_mut(pid)
            .and_then(|table| table.get_mut(page))
            .unwrap_or_else(|| panic!("{} lost its page table while faulting page {}", pid, page))
    }
}
