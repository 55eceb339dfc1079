pub mod machine;

mod unit_tests;

pub use machine::Machine;
