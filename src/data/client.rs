//! HTTP fetch client with bounded retry.
//!
//! Requests go through the `HttpTransport` trait so the retry and paging logic
//! can be driven by a scripted transport in tests. The production transport is
//! a blocking `reqwest` client.

use std::thread;
use std::time::Duration;

use reqwest::blocking::Client;
use serde_json::Value;

use crate::domain::RetryPolicy;
use crate::error::{AppError, FetchError};

/// Raw response: status code and body text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

/// A single blocking GET. `Err` means no response was received.
pub trait HttpTransport {
    fn get(&self, url: &str) -> Result<HttpResponse, String>;
}

pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new(timeout: Duration) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::new(4, format!("Failed to build HTTP client: {e}")))?;
        Ok(Self { client })
    }
}

impl HttpTransport for ReqwestTransport {
    fn get(&self, url: &str) -> Result<HttpResponse, String> {
        let resp = self.client.get(url).send().map_err(|e| e.to_string())?;
        let status = resp.status().as_u16();
        let body = resp.text().map_err(|e| e.to_string())?;
        Ok(HttpResponse { status, body })
    }
}

impl<T: HttpTransport + ?Sized> HttpTransport for &T {
    fn get(&self, url: &str) -> Result<HttpResponse, String> {
        (**self).get(url)
    }
}

/// Issues GET requests and retries 5xx gateway errors with exponential backoff.
pub struct FetchClient<T> {
    transport: T,
    retry: RetryPolicy,
}

impl<T: HttpTransport> FetchClient<T> {
    pub fn new(transport: T, retry: RetryPolicy) -> Self {
        Self { transport, retry }
    }

    /// Fetch `url` and parse the body as JSON.
    ///
    /// Retries statuses in `RetryPolicy::RETRY_STATUSES` and transport errors
    /// up to `max_retries` times. Any other non-200 status fails immediately.
    pub fn fetch(&self, url: &str) -> Result<Value, FetchError> {
        let attempts = self.retry.max_retries + 1;
        let mut attempt = 0;

        loop {
            attempt += 1;
            let last = attempt >= attempts;

            match self.transport.get(url) {
                Ok(resp) if resp.status == 200 => {
                    return serde_json::from_str(&resp.body)
                        .map_err(|e| FetchError::Malformed(format!("invalid JSON body: {e}")));
                }
                Ok(resp) if RetryPolicy::is_retryable(resp.status) => {
                    if last {
                        return Err(FetchError::Transient {
                            status: resp.status,
                            attempts: attempt,
                        });
                    }
                }
                Ok(resp) => return Err(FetchError::Permanent { status: resp.status }),
                Err(message) => {
                    if last {
                        return Err(FetchError::Transport {
                            message,
                            attempts: attempt,
                        });
                    }
                }
            }

            let delay = self.retry.backoff(attempt - 1);
            if !delay.is_zero() {
                thread::sleep(delay);
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Scripted transport shared by the data-layer tests.

    use std::cell::RefCell;
    use std::collections::{HashMap, VecDeque};

    use super::{HttpResponse, HttpTransport};

    /// Replays queued responses per URL and records every request.
    #[derive(Default)]
    pub struct ScriptedTransport {
        responses: RefCell<HashMap<String, VecDeque<Result<HttpResponse, String>>>>,
        pub requests: RefCell<Vec<String>>,
    }

    impl ScriptedTransport {
        pub fn push(&self, url: &str, status: u16, body: &str) {
            self.responses
                .borrow_mut()
                .entry(url.to_string())
                .or_default()
                .push_back(Ok(HttpResponse {
                    status,
                    body: body.to_string(),
                }));
        }

        pub fn push_error(&self, url: &str, message: &str) {
            self.responses
                .borrow_mut()
                .entry(url.to_string())
                .or_default()
                .push_back(Err(message.to_string()));
        }

        pub fn request_count(&self) -> usize {
            self.requests.borrow().len()
        }
    }

    impl HttpTransport for ScriptedTransport {
        fn get(&self, url: &str) -> Result<HttpResponse, String> {
            self.requests.borrow_mut().push(url.to_string());
            self.responses
                .borrow_mut()
                .get_mut(url)
                .and_then(|queue| queue.pop_front())
                .unwrap_or_else(|| {
                    Ok(HttpResponse {
                        status: 404,
                        body: String::new(),
                    })
                })
        }
    }
}
