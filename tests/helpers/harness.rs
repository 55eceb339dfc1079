use anyhow::{Result, anyhow};

use vmpager::api::Machine;
use vmpager::common::{Pid, VirtAddr};
use vmpager::config::PagerConfig;
use vmpager::mmu::{MmuEvent, SimMmu};
use vmpager::pager::{PageState, PagerStats};

pub struct TestMachine {
    pub machine: Machine,
}

#[allow(dead_code)]
impl TestMachine {
    pub fn new(config: PagerConfig) -> Self {
        super::init_debug_for_tests();
        let mmu = SimMmu::new(&config).with_journal();
        let machine = Machine::with_controller(config, mmu).unwrap();
        Self { machine }
    }

    /// Creates `pid` and extends it by `pages` pages.
    pub fn spawn_with(&self, pid: Pid, pages: usize) -> Result<Vec<VirtAddr>> {
        self.machine.spawn(pid)?;
        (0..pages)
            .map(|_| self.machine.extend(pid).map_err(anyhow::Error::from))
            .collect()
    }

    pub fn write(&self, pid: Pid, addr: VirtAddr, bytes: &[u8]) -> Result<()> {
        Ok(self.machine.write_bytes(pid, addr, bytes)?)
    }

    pub fn read(&self, pid: Pid, addr: VirtAddr, len: usize) -> Result<Vec<u8>> {
        Ok(self.machine.read_bytes(pid, addr, len)?)
    }

    pub fn syslog(&self, pid: Pid, addr: VirtAddr, len: usize) -> Result<String> {
        let mut out = Vec::new();
        self.machine.syslog(pid, addr, len, &mut out)?;
        Ok(String::from_utf8(out)?)
    }

    pub fn state(&self, pid: Pid, addr: VirtAddr) -> PageState {
        self.machine
            .pager()
            .with_core(|core| core.page_state(pid, addr))
            .unwrap_or_default()
    }

    pub fn stats(&self) -> PagerStats {
        self.machine.stats()
    }

    pub fn take_events(&self) -> Vec<MmuEvent> {
        self.machine
            .pager()
            .with_controller(|mmu| mmu.take_events())
    }

    pub fn check(&self) -> Result<()> {
        self.machine
            .pager()
            .validate()
            .map_err(|violation| anyhow!("pager tables inconsistent: {violation:?}"))
    }
}
