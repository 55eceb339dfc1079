//! Demand-paging policy core.
//!
//! `PagerCore` holds every table the policy mutates; `Pager` serialises all
//! calls on it behind one mutex so faults may arrive from any thread.
//! Finer-grained locking would be valid only if it kept the single-owner
//! rules for frames and blocks and the clock hand consistent.

pub mod extend;
pub mod fault;
pub mod page_table;
pub mod reclaim;
pub mod stats;
pub mod syslog;
pub mod validate;


use std::io::Write;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::{
    common::{Pid, VirtAddr},
    config::PagerConfig,
    debugger::Component,
    error::PagerResult,
    mmu::MemoryController,
    storage::{BlockAllocator, FrameTable},
    vm_info,
};

pub use page_table::{PageState, PageTable, ProcessRegistry};
pub use stats::PagerStats;
pub use validate::{InvariantViolation, ValidationResult};

pub type PagerHandle<C> = Arc<Pager<C>>;

pub struct PagerCore<C> {
    config: PagerConfig,
    blocks: BlockAllocator,
    frames: FrameTable,
    registry: ProcessRegistry,
    mmu: C,
    stats: PagerStats,
}

impl<C: MemoryController> PagerCore<C> {
    pub fn new(config: PagerConfig, mmu: C) -> PagerResult<Self> {
        config.validate()?;

        vm_info!(
            Component::Registry,
            "pager up: {} frames, {} blocks, {} pages per process",
            config.frames,
            config.blocks,
            config.pages_per_process()
        );

        Ok(Self {
            blocks: BlockAllocator::new(config.blocks),
            frames: FrameTable::new(config.frames),
            registry: ProcessRegistry::new(config.pages_per_process()),
            config,
            mmu,
            stats: PagerStats::default(),
        })
    }

    pub fn create(&mut self, pid: Pid) -> PagerResult<()> {
        self.registry.create(pid)?;
        self.stats.processes_created += 1;
        vm_info!(Component::Registry, "created {}", pid);
        Ok(())
    }

    pub fn config(&self) -> &PagerConfig {
        &self.config
    }

    pub fn blocks(&self) -> &BlockAllocator {
        &self.blocks
    }

    pub fn frames(&self) -> &FrameTable {
        &self.frames
    }

    pub fn registry(&self) -> &ProcessRegistry {
        &self.registry
    }

    pub fn controller(&self) -> &C {
        &self.mmu
    }

    pub fn controller_mut(&mut self) -> &mut C {
        &mut self.mmu
    }

    pub fn stats(&self) -> &PagerStats {
        &self.stats
    }

    pub fn page_state(&self, pid: Pid, addr: VirtAddr) -> Option<PageState> {
        let page = self.config.page_of(addr)?;
        self.registry.lookup(pid)?.get(page).copied()
    }
}

pub struct Pager<C> {
    core: Mutex<PagerCore<C>>,
}

impl<C: MemoryController> Pager<C> {
    pub fn init(config: PagerConfig, mmu: C) -> PagerResult<Self> {
        Ok(Self {
            core: Mutex::new(PagerCore::new(config, mmu)?),
        })
    }

    pub fn into_handle(self) -> PagerHandle<C> {
        Arc::new(self)
    }

    // A poisoned lock means an invariant violation already aborted a call.
    fn lock(&self) -> MutexGuard<'_, PagerCore<C>> {
        self.core
            .lock()
            .expect("pager state poisoned by an earlier invariant violation")
    }

    pub fn create(&self, pid: Pid) -> PagerResult<()> {
        self.lock().create(pid)
    }

    pub fn extend(&self, pid: Pid) -> PagerResult<VirtAddr> {
        self.lock().extend(pid)
    }

    pub fn fault(&self, pid: Pid, vaddr: VirtAddr) {
        self.lock().fault(pid, vaddr)
    }

    pub fn destroy(&self, pid: Pid) -> PagerResult<()> {
        self.lock().destroy(pid)
    }

    pub fn read_range<W: Write>(
        &self,
        pid: Pid,
        addr: VirtAddr,
        len: usize,
        out: &mut W,
    ) -> PagerResult<()> {
        self.lock().read_range(pid, addr, len, out)
    }

    pub fn stats(&self) -> PagerStats {
        self.lock().stats().clone()
    }

    pub fn validate(&self) -> ValidationResult {
        validate::validate(&self.lock())
    }

    /// Runs `f` with read access to the whole core, under the lock.
    pub fn with_core<R>(&self, f: impl FnOnce(&PagerCore<C>) -> R) -> R {
        f(&self.lock())
    }

    pub fn with_controller<R>(&self, f: impl FnOnce(&mut C) -> R) -> R {
        f(self.lock().controller_mut())
    }

    pub(crate) fn with_core_mut<R>(&self, f: impl FnOnce(&mut PagerCore<C>) -> R) -> R {
        f(&mut self.lock())
    }
}
