use crate::{
    common::{FrameId, Pid},
    debugger::Component,
    vm_trace,
};

/// Reverse pointer from a frame to the page it holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameOwner {
    pub pid: Pid,
    pub page: usize,
}

#[derive(Debug, Clone, Default)]
pub struct Frame {
    owner: Option<FrameOwner>,
    referenced: bool,
    visible: bool,
    dirty: bool,
}

impl Frame {
    pub fn owner(&self) -> Option<FrameOwner> {
        self.owner
    }

    pub fn is_occupied(&self) -> bool {
        self.owner.is_some()
    }

    pub fn referenced(&self) -> bool {
        self.referenced
    }

    /// Whether the controller currently grants any access to this frame's mapping.
    pub fn visible(&self) -> bool {
        self.visible
    }

    pub fn dirty(&self) -> bool {
        self.dirty
    }
}

/// Outcome of one run of the clock hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockScan {
    pub victim: FrameId,
    /// Frames looked at, the victim included.
    pub examined: usize,
}

#[derive(Debug)]
pub struct FrameTable {
    frames: Vec<Frame>,
    hand: usize,
}

impl FrameTable {
    pub fn new(count: usize) -> Self {
        Self {
            frames: vec![Frame::default(); count],
            hand: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn get(&self, frame: FrameId) -> &Frame {
        &self.frames[frame.0]
    }

    pub fn iter(&self) -> impl Iterator<Item = (FrameId, &Frame)> {
        self.frames
            .iter()
            .enumerate()
            .map(|(idx, frame)| (FrameId(idx), frame))
    }

    pub fn occupied_count(&self) -> usize {
        self.frames.iter().filter(|f| f.is_occupied()).count()
    }

    pub fn all_visible(&self) -> bool {
        self.frames.iter().all(|f| f.visible)
    }

    pub fn clock_hand(&self) -> FrameId {
        FrameId(self.hand)
    }

    /// Second-chance scan starting at the clock hand.
    ///
    /// Referenced frames get their bit cleared and are skipped; the first
    /// unreferenced frame, occupied or free, is the victim. The hand is left
    /// one past the victim. Two full sweeps always suffice because the first
    /// sweep clears every bit it passes.
    pub fn scan_for_victim(&mut self) -> ClockScan {
        let len = self.frames.len();
        assert!(len > 0, "clock scan over an empty frame table");

        for examined in 1..=2 * len + 1 {
            let idx = self.hand;
            self.hand = (self.hand + 1) % len;

            let frame = &mut self.frames[idx];
            if !frame.referenced {
                vm_trace!(Component::Clock, "frame {} chosen after {} steps", idx, examined);
                return ClockScan {
                    victim: FrameId(idx),
                    examined,
                };
            }

            vm_trace!(Component::Clock, "frame {} gets a second chance", idx);
            frame.referenced = false;
        }

        unreachable!("clock hand swept twice without finding a victim")
    }

    /// Revokes visibility on every frame, returning the owners whose mappings
    /// must be closed.
    pub fn hide_all(&mut self) -> Vec<(FrameId, FrameOwner)> {
        let mut owners = Vec::new();
        for (idx, frame) in self.frames.iter_mut().enumerate() {
            frame.visible = false;
            if let Some(owner) = frame.owner {
                owners.push((FrameId(idx), owner));
            }
        }
        owners
    }

    /// Hands a frame to a freshly loaded page: referenced, visible and clean.
    pub fn mark_occupied(&mut self, frame: FrameId, owner: FrameOwner) {
        let slot = &mut self.frames[frame.0];
        if let Some(prev) = slot.owner {
            panic!(
                "{} still owned by {} page {} while assigning it to {} page {}",
                frame, prev.pid, prev.page, owner.pid, owner.page
            );
        }

        *slot = Frame {
            owner: Some(owner),
            referenced: true,
            visible: true,
            dirty: false,
        };
    }

    /// Records a write-fault upgrade on a resident frame.
    pub fn mark_written(&mut self, frame: FrameId) {
        let slot = &mut self.frames[frame.0];
        slot.referenced = true;
        slot.dirty = true;
        slot.visible = true;
    }

    pub fn mark_free(&mut self, frame: FrameId) -> Option<FrameOwner> {
        let slot = &mut self.frames[frame.0];
        let owner = slot.owner.take();
        *slot = Frame::default();
        owner
    }
}
