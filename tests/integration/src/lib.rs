//! Integration test utilities for the mirrored conversation services
//!
//! This crate provides an in-memory store implementing both repository
//! ports, cache doubles, and fixtures for driving the services end to end.

pub mod fixtures;
pub mod helpers;

pub use fixtures::*;
pub use helpers::*;
pub use memory::MemoryStore;
