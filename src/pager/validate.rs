use std::collections::HashMap;

use crate::{
    common::{BlockId, FrameId, Pid},
    mmu::MemoryController,
    pager::PagerCore,
    storage::FrameOwner,
};

#[derive(Debug, PartialEq, Eq)]
pub enum InvariantViolation {
    FrameCountMismatch { occupied: usize, resident: usize },
    DanglingFrame { frame: FrameId, owner: FrameOwner },
    MisownedFrame { pid: Pid, page: usize, frame: FrameId },
    SharedBlock { block: BlockId },
    UnreservedBlock { block: BlockId },
    BlockCountMismatch { in_use: usize, referenced: usize },
}

pub type ValidationResult = Result<(), InvariantViolation>;

/// Cross-checks frames, blocks and page tables against each other.
pub fn validate<C: MemoryController>(core: &PagerCore<C>) -> ValidationResult {
    validate_frames(core)?;
    validate_blocks(core)
}

fn validate_frames<C: MemoryController>(core: &PagerCore<C>) -> ValidationResult {
    let occupied = core.frames().occupied_count();
    let resident = core.registry().resident_count();
    if occupied != resident {
        return Err(InvariantViolation::FrameCountMismatch { occupied, resident });
    }

    for (frame, slot) in core.frames().iter() {
        let Some(owner) = slot.owner() else {
            continue;
        };
        let points_back = core
            .registry()
            .lookup(owner.pid)
            .and_then(|table| table.get(owner.page))
            .and_then(|state| state.frame())
            == Some(frame);
        if !points_back {
            return Err(InvariantViolation::DanglingFrame { frame, owner });
        }
    }

    for (pid, table) in core.registry().iter() {
        for (page, state) in table.iter() {
            if let Some(frame) = state.frame() {
                if core.frames().get(frame).owner() != Some(FrameOwner { pid, page }) {
                    return Err(InvariantViolation::MisownedFrame { pid, page, frame });
                }
            }
        }
    }

    Ok(())
}

fn validate_blocks<C: MemoryController>(core: &PagerCore<C>) -> ValidationResult {
    let mut seen: HashMap<BlockId, usize> = HashMap::new();

    for (_, table) in core.registry().iter() {
        for block in table.iter().filter_map(|(_, state)| state.block()) {
            *seen.entry(block).or_default() += 1;
        }
    }

    for (&block, &count) in &seen {
        if count > 1 {
            return Err(InvariantViolation::SharedBlock { block });
        }
        if !core.blocks().is_in_use(block) {
            return Err(InvariantViolation::UnreservedBlock { block });
        }
    }

    let in_use = core.blocks().in_use_count();
    if in_use != seen.len() {
        return Err(InvariantViolation::BlockCountMismatch {
            in_use,
            referenced: seen.len(),
        });
    }

    Ok(())
}
