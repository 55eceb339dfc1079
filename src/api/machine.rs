use std::io::Write;

use crate::{
    common::{Pid, VirtAddr},
    config::PagerConfig,
    error::{PagerError, PagerResult},
    mmu::SimMmu,
    pager::{Pager, PagerCore, PagerHandle, PagerStats},
};

/// A store on a page that is not resident faults once to load it and once
/// more to gain write access.
const MAX_FAULTS_PER_ACCESS: usize = 2;

/// Simulated machine: the pager wired to an in-memory controller, with
/// accesses that fault and retry the way a real MMU would.
#[derive(Clone)]
pub struct Machine {
    pager: PagerHandle<SimMmu>,
}

impl Machine {
    pub fn new(config: PagerConfig) -> PagerResult<Self> {
        config.validate()?;
        let mmu = SimMmu::new(&config);
        Self::with_controller(config, mmu)
    }

    pub fn with_controller(config: PagerConfig, mmu: SimMmu) -> PagerResult<Self> {
        Ok(Self {
            pager: Pager::init(config, mmu)?.into_handle(),
        })
    }

    pub fn pager(&self) -> &PagerHandle<SimMmu> {
        &self.pager
    }

    pub fn spawn(&self, pid: Pid) -> PagerResult<()> {
        self.pager.create(pid)
    }

    pub fn extend(&self, pid: Pid) -> PagerResult<VirtAddr> {
        self.pager.extend(pid)
    }

    /// Reclaims the process and tears down whatever mappings it still had,
    /// so a later process reusing the pid starts with an empty address space.
    pub fn exit(&self, pid: Pid) -> PagerResult<()> {
        self.pager.with_core_mut(|core| {
            core.destroy(pid)?;
            core.controller_mut().forget_process(pid);
            Ok(())
        })
    }

    pub fn stats(&self) -> PagerStats {
        self.pager.stats()
    }

    pub fn load(&self, pid: Pid, addr: VirtAddr) -> PagerResult<u8> {
        self.access(pid, addr, |mmu| mmu.load(pid, addr))
    }

    pub fn store(&self, pid: Pid, addr: VirtAddr, byte: u8) -> PagerResult<()> {
        self.access(pid, addr, |mmu| mmu.store(pid, addr, byte).then_some(()))
    }

    pub fn write_bytes(&self, pid: Pid, addr: VirtAddr, bytes: &[u8]) -> PagerResult<()> {
        for (i, byte) in bytes.iter().enumerate() {
            let at = addr.offset(i).ok_or(PagerError::NotMapped { pid, addr })?;
            self.store(pid, at, *byte)?;
        }
        Ok(())
    }

    pub fn read_bytes(&self, pid: Pid, addr: VirtAddr, len: usize) -> PagerResult<Vec<u8>> {
        (0..len)
            .map(|i| {
                let at = addr.offset(i).ok_or(PagerError::NotMapped { pid, addr })?;
                self.load(pid, at)
            })
            .collect()
    }

    pub fn syslog<W: Write>(
        &self,
        pid: Pid,
        addr: VirtAddr,
        len: usize,
        out: &mut W,
    ) -> PagerResult<()> {
        self.pager.read_range(pid, addr, len, out)
    }

    /// Tries `op` against the controller, delivering a fault and retrying
    /// whenever it is refused. Everything happens under one lock so no other
    /// thread can evict the page between the fault and the retry.
    fn access<R>(
        &self,
        pid: Pid,
        addr: VirtAddr,
        mut op: impl FnMut(&mut SimMmu) -> Option<R>,
    ) -> PagerResult<R> {
        self.pager.with_core_mut(|core: &mut PagerCore<SimMmu>| {
            let mut faults = 0;
            loop {
                if let Some(result) = op(core.controller_mut()) {
                    return Ok(result);
                }

                // the controller never delivers faults for memory that was not extended
                let extended = core
                    .page_state(pid, addr)
                    .is_some_and(|state| state.is_allocated());
                if !extended {
                    return Err(PagerError::NotMapped { pid, addr });
                }

                if faults == MAX_FAULTS_PER_ACCESS {
                    panic!("{} still faulting at {} after {} faults", pid, addr, faults);
                }
                core.fault(pid, addr);
                faults += 1;
            }
        })
    }
}
