//! Background Tasks Module
//!
//! Contains background tasks that run periodically during server operation.
//!
//! # Tasks
//! - Expiry sweep: Removes expired and undecodable cache entries at configured intervals

mod cleanup;

pub use cleanup::spawn_cleanup_task;
