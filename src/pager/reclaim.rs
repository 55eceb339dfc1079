use crate::{
    common::Pid,
    debugger::Component,
    error::{PagerError, PagerResult},
    mmu::MemoryController,
    pager::PagerCore,
    storage::FrameOwner,
    vm_info,
};

impl<C: MemoryController> PagerCore<C> {
    /// Returns every frame and block owned by `pid` to the free pools and
    /// drops its page table. No controller calls are made; the process is
    /// gone and its mappings with it.
    pub fn destroy(&mut self, pid: Pid) -> PagerResult<()> {
        let table = self
            .registry
            .remove(pid)
            .ok_or(PagerError::UnknownProcess { pid })?;

        let mut frames = 0;
        let mut blocks = 0;
        for (page, state) in table.iter() {
            if let Some(frame) = state.frame() {
                let owner = self.frames.mark_free(frame);
                if owner != Some(FrameOwner { pid, page }) {
                    panic!(
                        "{} page {} resident in {} but the frame was owned by {:?}",
                        pid, page, frame, owner
                    );
                }
                frames += 1;
            }
            if let Some(block) = state.block() {
                self.blocks.release(block);
                blocks += 1;
            }
        }

        self.stats.processes_destroyed += 1;
        vm_info!(
            Component::Reclaim,
            "destroyed {}: {} frames and {} blocks returned",
            pid,
            frames,
            blocks
        );
        Ok(())
    }
}
