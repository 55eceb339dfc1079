use std::fmt;

use crate::common::{Pid, VirtAddr};

pub type PagerResult<T> = Result<T, PagerError>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PagerError {
    InvalidConfig { reason: String },

    ProcessExists { pid: Pid },

    UnknownProcess { pid: Pid },

    AddressSpaceExhausted { pid: Pid },

    OutOfBlocks { pid: Pid },

    NotResident { pid: Pid, addr: VirtAddr },

    NotMapped { pid: Pid, addr: VirtAddr },

    Io { message: String },
}

impl PagerError {
    /// True for failures caused by running out of pages or blocks.
    pub fn is_exhaustion(&self) -> bool {
        matches!(
            self,
            PagerError::AddressSpaceExhausted { .. } | PagerError::OutOfBlocks { .. }
        )
    }
}

impl fmt::Display for PagerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PagerError::InvalidConfig { reason } => {
                write!(f, "pager error: invalid configuration ({})", reason)
            }

            PagerError::ProcessExists { pid } => {
                write!(f, "pager error: {} already has a page table", pid)
            }

            PagerError::UnknownProcess { pid } => {
                write!(f, "pager error: {} has no page table", pid)
            }

            PagerError::AddressSpaceExhausted { pid } => {
                write!(f, "pager error: address space of {} is full", pid)
            }

            PagerError::OutOfBlocks { pid } => {
                write!(f, "pager error: no free backing block for {}", pid)
            }

            PagerError::NotResident { pid, addr } => {
                write!(
                    f,
                    "pager error: {} has no resident page at {}",
                    pid, addr
                )
            }

            PagerError::NotMapped { pid, addr } => {
                write!(f, "pager error: {} accessed unmapped address {}", pid, addr)
            }

            PagerError::Io { message } => {
                write!(f, "pager IO error: {}", message)
            }
        }
    }
}

impl std::error::Error for PagerError {}

impl From<std::io::Error> for PagerError {
    fn from(e: std::io::Error) -> Self {
        PagerError::Io {
            message: e.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exhaustion_errors_are_classified() {
        assert!(PagerError::OutOfBlocks { pid: Pid(1) }.is_exhaustion());
        assert!(PagerError::AddressSpaceExhausted { pid: Pid(1) }.is_exhaustion());
        assert!(
            !PagerError::NotResident {
                pid: Pid(1),
                addr: VirtAddr(0)
            }
            .is_exhaustion()
        );
    }

    #[test]
    fn display_names_the_process() {
        let msg = PagerError::UnknownProcess { pid: Pid(7) }.to_string();
        assert!(msg.contains("pid 7"), "{msg}");
    }
}
