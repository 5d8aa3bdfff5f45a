pub mod firmware;
pub mod timer;
