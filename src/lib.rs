//! `econ-dash` library crate.
//!
//! The binary (`econ`) is a thin wrapper around this library so that:
//!
//! - the fetch pipeline and forecaster are testable without spawning processes
//! - a display layer can consume the same table/forecast types directly

pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod forecast;
pub mod io;
pub mod math;
pub mod report;
pub mod table;
