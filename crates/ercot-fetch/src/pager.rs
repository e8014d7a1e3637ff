//! Sequential paged fetching with bounded, resumable retries.

use chrono::Utc;
use ercot_types::{ErcotError, RawRecordSet, Result};
use reqwest::{Client, StatusCode};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::client::{backoff_delay, is_retryable_error};
use crate::response::{page_records, total_pages};
use crate::{ClientConfig, PageRequest, TokenManager, http_client};

/// Progress of a paged fetch, reported after discovery and after every page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageProgress {
    /// Page just completed; 0 after discovery.
    pub page: u32,
    /// Total pages reported by the endpoint.
    pub total_pages: u32,
    /// Records accumulated so far.
    pub records: usize,
}

/// Outcome of a single HTTP attempt.
#[derive(Debug)]
enum Attempt {
    Body { status: u16, body: Value },
    Transient { status: Option<u16> },
    Unauthorized,
}

/// Fetches every page of a report endpoint.
///
/// A fetch first issues a discovery request without a page number to learn
/// `_meta.totalPages`, then requests pages `1..=N` in order. A failing step is
/// retried on its own, so pages already received are never requested again.
#[derive(Debug, Clone)]
pub struct PagedFetcher {
    http: Client,
    config: ClientConfig,
}

impl PagedFetcher {
    /// Creates a fetcher with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let http = http_client(&config).map_err(|e| ErcotError::Http(e.to_string()))?;
        Ok(Self { http, config })
    }

    /// Creates a fetcher with default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn with_defaults() -> Result<Self> {
        Self::new(ClientConfig::default())
    }

    /// Returns the fetcher configuration.
    #[must_use]
    pub const fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Returns the underlying HTTP client.
    #[must_use]
    pub const fn http(&self) -> &Client {
        &self.http
    }

    /// Fetches all pages of `request`.
    ///
    /// # Errors
    ///
    /// Returns [`ErcotError::Fetch`] once a step exhausts its retries,
    /// [`ErcotError::Authentication`] if the token cannot be obtained, or a
    /// schema error if a page holds malformed rows.
    pub async fn fetch(
        &self,
        tokens: &mut TokenManager,
        request: &PageRequest,
    ) -> Result<RawRecordSet> {
        self.fetch_with_progress(tokens, request, |_| {}).await
    }

    /// Fetches all pages of `request`, reporting progress after each step.
    ///
    /// # Errors
    ///
    /// See [`PagedFetcher::fetch`].
    pub async fn fetch_with_progress(
        &self,
        tokens: &mut TokenManager,
        request: &PageRequest,
        mut on_page: impl FnMut(PageProgress),
    ) -> Result<RawRecordSet> {
        let discovery = request.unpaged();
        debug!(url = %discovery.url(), "Discovering page count");
        let total = self
            .retrying(tokens, &discovery, |body| Ok(total_pages(&body)))
            .await?;
        info!(endpoint = %request.base_url(), total_pages = total, "Fetching report");

        on_page(PageProgress {
            page: 0,
            total_pages: total,
            records: 0,
        });

        let mut records = RawRecordSet::new();
        for page in 1..=total {
            tokio::time::sleep(self.config.page_delay).await;
            debug!(page, total, "Requesting page {page}/{total}");

            let rows = self
                .retrying(tokens, &request.with_page(page), page_records)
                .await?;
            records.push_page(rows);

            on_page(PageProgress {
                page,
                total_pages: total,
                records: records.len(),
            });
        }

        info!(
            endpoint = %request.base_url(),
            pages = records.pages(),
            records = records.len(),
            "Report fetched"
        );
        Ok(records)
    }

    /// Issues the connection probe request and returns its HTTP status.
    ///
    /// A 200 response extends the current token's expiry.
    ///
    /// # Errors
    ///
    /// Returns an error if no token can be obtained or the request cannot be sent.
    pub async fn connection_status(&self, tokens: &mut TokenManager) -> Result<u16> {
        tokens.ensure_valid(Utc::now()).await?;
        let response = tokens
            .authorize(self.http.get(&self.config.probe_url))?
            .send()
            .await
            .map_err(|e| ErcotError::Http(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::OK {
            tokens.mark_validated(Utc::now());
        } else {
            warn!(status = status.as_u16(), "Connection probe failed");
        }
        Ok(status.as_u16())
    }

    /// Runs one step until `extract` yields a value or retries run out.
    ///
    /// `extract` returning `Ok(None)` marks the body as incomplete and the step
    /// is retried. A 401 triggers a single token refresh per step.
    async fn retrying<T>(
        &self,
        tokens: &mut TokenManager,
        request: &PageRequest,
        mut extract: impl FnMut(Value) -> Result<Option<T>>,
    ) -> Result<T> {
        let mut attempts = 0;
        let mut last_status = None;
        let mut refreshed = false;

        loop {
            match self.attempt(tokens, request).await? {
                Attempt::Body { status, body } => {
                    last_status = Some(status);
                    if let Some(value) = extract(body)? {
                        return Ok(value);
                    }
                    debug!(url = %request.url(), "Response body incomplete");
                }
                Attempt::Transient { status } => {
                    last_status = status.or(last_status);
                }
                Attempt::Unauthorized => {
                    if refreshed {
                        return Err(ErcotError::Authentication(format!(
                            "{} rejected the refreshed token",
                            request.base_url()
                        )));
                    }
                    warn!("Token rejected, refreshing");
                    refreshed = true;
                    last_status = Some(StatusCode::UNAUTHORIZED.as_u16());
                    tokens.refresh(Utc::now()).await?;
                    continue;
                }
            }

            if attempts >= self.config.max_retries {
                return Err(ErcotError::Fetch {
                    endpoint: request.base_url().to_string(),
                    status: last_status,
                });
            }
            attempts += 1;
            let delay = backoff_delay(&self.config, attempts);
            warn!(
                url = %request.url(),
                attempt = attempts,
                max_retries = self.config.max_retries,
                delay_ms = delay.as_millis() as u64,
                "Retrying request"
            );
            tokio::time::sleep(delay).await;
        }
    }

    /// Sends one authenticated request and classifies the outcome.
    async fn attempt(&self, tokens: &mut TokenManager, request: &PageRequest) -> Result<Attempt> {
        tokens.ensure_valid(Utc::now()).await?;
        let builder = tokens.authorize(
            self.http
                .get(request.base_url())
                .query(&request.query()),
        )?;

        let response = match builder.send().await {
            Ok(response) => response,
            Err(e) if is_retryable_error(&e) => {
                debug!(error = %e, "Transport error");
                return Ok(Attempt::Transient { status: None });
            }
            Err(e) => return Err(ErcotError::Http(e.to_string())),
        };

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            return Ok(Attempt::Unauthorized);
        }
        if status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS {
            return Ok(Attempt::Transient {
                status: Some(status.as_u16()),
            });
        }
        if !status.is_success() {
            return Err(ErcotError::Fetch {
                endpoint: request.base_url().to_string(),
                status: Some(status.as_u16()),
            });
        }

        match response.json::<Value>().await {
            Ok(body) => Ok(Attempt::Body {
                status: status.as_u16(),
                body,
            }),
            Err(e) => {
                debug!(error = %e, "Unreadable response body");
                Ok(Attempt::Transient {
                    status: Some(status.as_u16()),
                })
            }
        }
    }
}
