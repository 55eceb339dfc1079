pub mod config;
pub mod error;

pub mod api;
pub mod common;
pub mod debugger;
pub mod mmu;
pub mod pager;
pub mod storage;
