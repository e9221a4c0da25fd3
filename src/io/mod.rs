//! Input/output helpers.
//!
//! - wide table CSV write/read (`table`)
//! - forecast JSON export (`forecast`)

pub mod forecast;
pub mod table;

pub use forecast::*;
pub use table::*;
