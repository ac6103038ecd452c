//! Command handlers. Each takes the `AppContext` plus its parsed arguments.

pub mod init;
pub mod maintenance;
pub mod misc;
pub mod secrets;
