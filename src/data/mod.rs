//! World Bank indicator API integration.
//!
//! - HTTP client with retry (`client`)
//! - pagination (`pages`)
//! - raw entry normalization (`normalize`)

pub mod client;
pub mod normalize;
pub mod pages;

pub use client::{FetchClient, HttpResponse, HttpTransport, ReqwestTransport};
pub use normalize::{SeriesRequest, normalize};
pub use pages::{Page, PageMetadata, PageWalk, RawEntry, WalkStop, parse_page, series_url, walk};
