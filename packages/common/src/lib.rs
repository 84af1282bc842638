//! Shared building blocks for the Warta services.

pub mod storage;
