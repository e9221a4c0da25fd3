//! Page walking over the World Bank indicator API.
//!
//! Every response is a two-element array:
//!
//! ```text
//! [ {"page": 1, "pages": 2, "per_page": 50, "total": 64, ...},
//!   [ {"indicator": {...}, "country": {"id": "US", "value": "United States"},
//!      "date": "2020", "value": 21060473613000.0, ...}, ... ] ]
//! ```
//!
//! `walk` requests page 1, reads `pages` from it, then requests pages
//! `2..=pages`. Later pages' metadata is ignored. A failed or malformed page
//! ends the walk; entries already yielded are kept.

use serde::Deserialize;
use serde_json::Value;

use crate::data::client::{FetchClient, HttpTransport};
use crate::error::FetchError;

/// Pagination metadata from element 0 of a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageMetadata {
    pub page: u32,
    pub total_pages: u32,
    pub total: Option<u64>,
}

/// `{"id": "US", "value": "United States"}` style reference.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawRef {
    #[serde(default)]
    pub id: Option<String>,
    pub value: String,
}

/// One observation entry as delivered by the API, before normalization.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawEntry {
    #[serde(default)]
    pub indicator: Option<RawRef>,
    pub country: RawRef,
    #[serde(default)]
    pub date: Value,
    #[serde(default)]
    pub value: Value,
}

/// A validated page: metadata plus the entries that had the expected shape.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub meta: PageMetadata,
    pub entries: Vec<RawEntry>,
    /// Entries dropped because they did not match `RawEntry`.
    pub malformed_entries: usize,
}

/// Map a response body into a `Page`, failing closed on any shape mismatch.
pub fn parse_page(body: &Value) -> Result<Page, FetchError> {
    let parts = body
        .as_array()
        .ok_or_else(|| FetchError::Malformed("response is not an array".to_string()))?;
    if parts.len() < 2 {
        return Err(FetchError::Malformed(format!(
            "expected 2 elements, found {}",
            parts.len()
        )));
    }

    let meta = parse_metadata(&parts[0])?;
    let items: &[Value] = match &parts[1] {
        Value::Array(items) => items.as_slice(),
        // "No data for this series": zero pages and a null list.
        Value::Null if meta.total_pages == 0 => &[],
        _ => return Err(FetchError::Malformed("no observation list in response".to_string())),
    };

    let mut entries = Vec::with_capacity(items.len());
    let mut malformed_entries = 0;
    for item in items {
        match RawEntry::deserialize(item) {
            Ok(entry) => entries.push(entry),
            Err(_) => malformed_entries += 1,
        }
    }

    Ok(Page {
        meta,
        entries,
        malformed_entries,
    })
}

fn parse_metadata(value: &Value) -> Result<PageMetadata, FetchError> {
    let obj = value
        .as_object()
        .ok_or_else(|| FetchError::Malformed("pagination metadata is not an object".to_string()))?;

    // The API is inconsistent about numbers vs numeric strings here.
    let page = obj.get("page").and_then(as_u64).unwrap_or(1);
    let total_pages = obj.get("pages").and_then(as_u64).unwrap_or(1);
    let total = obj.get("total").and_then(as_u64);

    Ok(PageMetadata {
        page: u32::try_from(page).unwrap_or(u32::MAX),
        total_pages: u32::try_from(total_pages).unwrap_or(u32::MAX),
        total,
    })
}

fn as_u64(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Build the request URL for one page of one (country, indicator) series.
pub fn series_url(base_url: &str, country_code: &str, indicator_code: &str, page: u32) -> String {
    format!(
        "{}/country/{country_code}/indicator/{indicator_code}?format=json&page={page}",
        base_url.trim_end_matches('/')
    )
}

/// Why a walk ended before `total_pages` was reached.
#[derive(Debug, Clone, PartialEq)]
pub struct WalkStop {
    pub page: u32,
    pub error: FetchError,
}

/// Lazy sequence of raw entries for one (country, indicator) pair.
///
/// Not restartable: call `walk` again to start over from page 1.
pub struct PageWalk<'a, T> {
    client: &'a FetchClient<T>,
    base_url: &'a str,
    country_code: &'a str,
    indicator_code: &'a str,
    next_page: u32,
    total_pages: Option<u32>,
    buffer: std::vec::IntoIter<RawEntry>,
    finished: bool,
    pages_visited: u32,
    malformed_entries: usize,
    stop: Option<WalkStop>,
}

/// Start walking `country_code` / `indicator_code` from page 1.
pub fn walk<'a, T: HttpTransport>(
    client: &'a FetchClient<T>,
    base_url: &'a str,
    country_code: &'a str,
    indicator_code: &'a str,
) -> PageWalk<'a, T> {
    PageWalk {
        client,
        base_url,
        country_code,
        indicator_code,
        next_page: 1,
        total_pages: None,
        buffer: Vec::new().into_iter(),
        finished: false,
        pages_visited: 0,
        malformed_entries: 0,
        stop: None,
    }
}

impl<T: HttpTransport> PageWalk<'_, T> {
    /// Pages successfully fetched and parsed so far.
    pub fn pages_visited(&self) -> u32 {
        self.pages_visited
    }

    /// Page count reported by page 1, once it has been fetched.
    pub fn total_pages(&self) -> Option<u32> {
        self.total_pages
    }

    pub fn malformed_entries(&self) -> usize {
        self.malformed_entries
    }

    /// Set when a page failed and the remaining pages were treated as empty.
    pub fn stop(&self) -> Option<&WalkStop> {
        self.stop.as_ref()
    }

    fn load_next_page(&mut self) {
        let page = self.next_page;
        let url = series_url(self.base_url, self.country_code, self.indicator_code, page);

        let parsed = self.client.fetch(&url).and_then(|body| parse_page(&body));
        match parsed {
            Ok(parsed) => {
                if self.total_pages.is_none() {
                    self.total_pages = Some(parsed.meta.total_pages);
                }
                self.pages_visited += 1;
                self.malformed_entries += parsed.malformed_entries;
                self.buffer = parsed.entries.into_iter();
                self.next_page += 1;
            }
            Err(error) => {
                self.stop = Some(WalkStop { page, error });
                self.finished = true;
            }
        }
    }
}

impl<T: HttpTransport> Iterator for PageWalk<'_, T> {
    type Item = RawEntry;

    fn next(&mut self) -> Option<RawEntry> {
        loop {
            if let Some(entry) = self.buffer.next() {
                return Some(entry);
            }
            if self.finished {
                return None;
            }
            if let Some(total) = self.total_pages {
                if self.next_page > total {
                    self.finished = true;
                    return None;
                }
            }
            self.load_next_page();
        }
    }
}
