//! # Host Bridge Traits
//!
//! Platform abstraction traits implemented by each host.
//!
//! ## Overview
//!
//! The filter core never talks to the camera, the GPU image pipeline, the
//! network stack or the authentication SDK directly. Each of those is a
//! capability the host injects through one of the traits below.
//!
//! ## Traits
//!
//! ### Networking
//! - [`HttpClient`](http::HttpClient) - Async HTTP used by the REST document stores
//!
//! ### Imaging
//! - [`FilterBackend`](filter::FilterBackend) - Named image filter primitive (`name -> output image`)
//! - [`FrameSource`](camera::FrameSource) - Per-frame images from a capture session
//!
//! ### Identity
//! - [`IdentityProvider`](identity::IdentityProvider) - Third-party auth SDK producing `{userId, email}`
//!
//! ### Utilities
//! - [`Clock`](time::Clock) - Time source for deterministic testing
//! - [`LoggerSink`](time::LoggerSink) - Forward structured logs to host logging
//!
//! ## Platform Requirements
//!
//! | Platform | Implementation Crate | Status |
//! |----------|---------------------|--------|
//! | Desktop  | `bridge-desktop`    | ✅ HTTP + CPU filters |
//! | iOS      | host app            | 📋 CoreImage / AVFoundation adapters |
//!
//! ## Error Handling
//!
//! All bridge traits report failures as [`BridgeError`](error::BridgeError).
//! Implementations should convert platform errors into it and keep the
//! message actionable, since the core forwards it verbatim to its callers.
//!
//! ## Thread Safety
//!
//! Every bridge trait requires `Send + Sync` so implementations can be shared
//! across async tasks behind an `Arc`.
//!
//! ## Example
//!
//! ```ignore
//! use bridge_traits::http::{HttpClient, HttpRequest, HttpResponse};
//! use bridge_traits::error::Result;
//! use async_trait::async_trait;
//!
//! pub struct MyHttpClient {
//!     client: reqwest::Client,
//! }
//!
//! #[async_trait]
//! impl HttpClient for MyHttpClient {
//!     async fn execute(&self, request: HttpRequest) -> Result<HttpResponse> {
//!         todo!()
//!     }
//! }
//! ```

pub mod camera;
pub mod error;
pub mod filter;
pub mod http;
pub mod identity;
pub mod time;

pub use error::BridgeError;

// Re-export commonly used types
pub use camera::FrameSource;
pub use filter::{FilterBackend, FilterInput, FilterRequest};
pub use http::{HttpClient, HttpMethod, HttpRequest, HttpResponse, RetryPolicy};
pub use identity::{IdentityProvider, ProviderIdentity, SocialProvider};
pub use time::{Clock, ConsoleLogger, LogEntry, LogLevel, LoggerSink, SystemClock};
