//! The wide indicator table.
//!
//! - pivot + dedup of fetched observations (`builder`)
//! - read-only query object over a persisted table (`dataset`)

pub mod builder;
pub mod dataset;

pub use builder::*;
pub use dataset::*;
