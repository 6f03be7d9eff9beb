extern crate self as tangle_core;

pub mod log;
pub mod task;
pub mod time;
