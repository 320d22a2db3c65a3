//! Adapter implementations for transition rule storage.

pub mod memory;
pub mod postgres;
