//! Adapter implementations for workflow storage.

pub mod memory;
pub mod postgres;
