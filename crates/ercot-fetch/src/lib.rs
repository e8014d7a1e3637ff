//! Token management and paged fetching for the ERCOT public reports API.
//!
//! This crate provides the authenticated download pipeline:
//!
//! - [`TokenManager`] - Credentials and the 50-minute bearer token lifecycle
//! - [`PageRequest`] - Endpoint plus ordered query parameters
//! - [`PagedFetcher`] - Page discovery, sequential page requests and retries
//! - [`ClientConfig`] - Timeouts, retry budget and inter-page delay

#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/gridtape/ercot/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod auth;
mod client;
mod pager;
mod request;
pub mod response;

pub use auth::{
    API_KEY_ENV, AuthConfig, Credentials, DEFAULT_CLIENT_ID, DEFAULT_TOKEN_URL, PASSWORD_ENV,
    SUBSCRIPTION_KEY_HEADER, Token, TokenManager, USERNAME_ENV, token_lifetime,
};
pub use client::{ClientConfig, DEFAULT_PROBE_URL, http_client};
pub use pager::{PageProgress, PagedFetcher};
pub use request::PageRequest;
