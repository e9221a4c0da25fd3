//! Reporting utilities: fetch summaries, country tables and forecast output.

pub mod format;

pub use format::*;
