//! Background Tasks Module
//!
//! # Tasks
//! - Expiry sweep: purges expired entries from the in-process backend

mod sweeper;

pub use sweeper::spawn_expiry_sweeper;
