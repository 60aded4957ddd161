pub mod atomic;
pub mod exec;
pub mod path;
