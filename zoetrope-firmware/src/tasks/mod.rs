//! Embassy async tasks

pub mod rotation;

pub use rotation::rotation_task;
