pub mod controller;
pub mod sim;

pub use controller::MemoryController;
pub use sim::{Mapping, MmuEvent, SimMmu};
