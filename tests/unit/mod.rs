//! Unit Tests Module
//!
//! Component-level tests for the accumulator, supply sources, adapter files
//! and the on-disk cache.

pub mod sdk_cache;
pub mod supply_sources;
