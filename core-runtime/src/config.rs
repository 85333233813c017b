//! # Core Configuration Module
//!
//! Builder-based configuration for the filter core.
//!
//! ## Overview
//!
//! [`CoreConfig`] carries every bridge the core needs plus a handful of
//! tunables. [`CoreConfigBuilder::build`] validates eagerly so a broken
//! configuration fails at startup instead of on the first store call.
//!
//! ## Required Dependencies
//!
//! - `IdentityProvider` - the authentication SDK, always host supplied
//!
//! ## Optional Dependencies (with platform defaults)
//!
//! - `HttpClient` - needed in [`StoreMode::Remote`] (desktop default: reqwest)
//! - `FilterBackend` - image primitive (desktop default: CPU backend)
//! - `FrameSource` - camera frames for previews (no default)
//!
//! When the `desktop-shims` feature is disabled, a missing `HttpClient` or
//! `FilterBackend` is reported as [`Error::CapabilityMissing`].
//!
//! ## Usage
//!
//! ```ignore
//! use core_runtime::config::{CoreConfig, StoreMode};
//! use std::sync::Arc;
//!
//! let config = CoreConfig::builder()
//!     .filters_endpoint("https://camera-db.example.com/filters")
//!     .users_endpoint("https://camera-db.example.com/users")
//!     .auth_token(std::env::var("FILTER_DB_TOKEN").ok())
//!     .identity_provider(Arc::new(MyIdentitySdk::new()))
//!     .build()?;
//! ```

use crate::error::{Error, Result};
use crate::events::DEFAULT_EVENT_BUFFER_SIZE;
use bridge_traits::{FilterBackend, FrameSource, HttpClient, IdentityProvider};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Default request timeout for document store calls
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
/// Default longest edge of preview thumbnails, in pixels
pub const DEFAULT_PREVIEW_EDGE: u32 = 256;
/// Default lower bound for posterize levels
pub const DEFAULT_POSTERIZE_LEVELS_MIN: f32 = 0.0;

const MAX_EVENT_BUFFER_SIZE: usize = 10_000;
const MAX_REQUEST_TIMEOUT: Duration = Duration::from_secs(300);
const PREVIEW_EDGE_RANGE: std::ops::RangeInclusive<u32> = 16..=4096;
const POSTERIZE_LEVELS_MAX: f32 = 10.0;

/// Where filters and user records are persisted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StoreMode {
    /// REST document store
    #[default]
    Remote,
    /// Process-local store, for offline use and demos
    Local,
}

/// Core configuration
///
/// Use [`CoreConfig::builder`] to construct instances.
#[derive(Clone)]
pub struct CoreConfig {
    pub store_mode: StoreMode,

    /// Filters collection URL; set whenever `store_mode` is `Remote`
    pub filters_endpoint: Option<String>,

    /// Users collection URL; set whenever `store_mode` is `Remote`
    pub users_endpoint: Option<String>,

    /// Appended to every document store request as `auth=<token>`
    pub auth_token: Option<String>,

    /// HTTP client; set whenever `store_mode` is `Remote`
    pub http_client: Option<Arc<dyn HttpClient>>,

    pub filter_backend: Arc<dyn FilterBackend>,

    pub identity_provider: Arc<dyn IdentityProvider>,

    pub frame_source: Option<Arc<dyn FrameSource>>,

    pub event_buffer_size: usize,

    pub request_timeout: Duration,

    pub preview_edge: u32,

    /// Lower bound accepted for posterize levels
    pub posterize_levels_min: f32,
}

impl fmt::Debug for CoreConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CoreConfig")
            .field("store_mode", &self.store_mode)
            .field("filters_endpoint", &self.filters_endpoint)
            .field("users_endpoint", &self.users_endpoint)
            .field("auth_token", &self.auth_token.as_ref().map(|_| "[REDACTED]"))
            .field(
                "http_client",
                &self.http_client.as_ref().map(|_| "HttpClient { ... }"),
            )
            .field("filter_backend", &"FilterBackend { ... }")
            .field("identity_provider", &"IdentityProvider { ... }")
            .field(
                "frame_source",
                &self.frame_source.as_ref().map(|_| "FrameSource { ... }"),
            )
            .field("event_buffer_size", &self.event_buffer_size)
            .field("request_timeout", &self.request_timeout)
            .field("preview_edge", &self.preview_edge)
            .field("posterize_levels_min", &self.posterize_levels_min)
            .finish()
    }
}

impl CoreConfig {
    pub fn builder() -> CoreConfigBuilder {
        CoreConfigBuilder::default()
    }

    /// Validates the configuration.
    ///
    /// Checks endpoint URLs and the HTTP client for remote mode and the
    /// numeric tunables for all modes.
    pub fn validate(&self) -> Result<()> {
        if self.store_mode == StoreMode::Remote {
            validate_endpoint("filters_endpoint", self.filters_endpoint.as_deref())?;
            validate_endpoint("users_endpoint", self.users_endpoint.as_deref())?;
            if self.http_client.is_none() {
                return Err(http_client_missing_error());
            }
        }

        if self.event_buffer_size == 0 || self.event_buffer_size > MAX_EVENT_BUFFER_SIZE {
            return Err(Error::Config(format!(
                "Event buffer size must be between 1 and {}, got {}",
                MAX_EVENT_BUFFER_SIZE, self.event_buffer_size
            )));
        }

        if self.request_timeout.is_zero() || self.request_timeout > MAX_REQUEST_TIMEOUT {
            return Err(Error::Config(format!(
                "Request timeout must be between 1ms and {}s, got {:?}",
                MAX_REQUEST_TIMEOUT.as_secs(),
                self.request_timeout
            )));
        }

        if !PREVIEW_EDGE_RANGE.contains(&self.preview_edge) {
            return Err(Error::Config(format!(
                "Preview edge must be between {} and {} pixels, got {}",
                PREVIEW_EDGE_RANGE.start(),
                PREVIEW_EDGE_RANGE.end(),
                self.preview_edge
            )));
        }

        if !self.posterize_levels_min.is_finite()
            || !(0.0..=POSTERIZE_LEVELS_MAX).contains(&self.posterize_levels_min)
        {
            return Err(Error::Config(format!(
                "Posterize levels minimum must be within [0, {}], got {}",
                POSTERIZE_LEVELS_MAX, self.posterize_levels_min
            )));
        }

        Ok(())
    }
}

fn validate_endpoint(name: &str, value: Option<&str>) -> Result<()> {
    let value = value.ok_or_else(|| {
        Error::Config(format!(
            "{} is required in remote store mode. Use .{}() or switch to StoreMode::Local.",
            name, name
        ))
    })?;

    let url = Url::parse(value)
        .map_err(|e| Error::Config(format!("{} '{}' is not a valid URL: {}", name, value, e)))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(Error::Config(format!(
            "{} '{}' must use http or https",
            name, value
        )));
    }
    Ok(())
}

fn http_client_missing_error() -> Error {
    Error::CapabilityMissing {
        capability: "HttpClient".to_string(),
        message: "An HttpClient is required for the remote document store. \
                 Desktop: enable the 'desktop-shims' feature to use ReqwestHttpClient. \
                 Mobile: inject the platform networking stack."
            .to_string(),
    }
}

#[cfg(not(feature = "desktop-shims"))]
fn filter_backend_missing_error() -> Error {
    Error::CapabilityMissing {
        capability: "FilterBackend".to_string(),
        message: "A FilterBackend is required to apply filters. \
                 Desktop: enable the 'desktop-shims' feature to use CpuFilterBackend. \
                 iOS: inject a CoreImage-backed implementation."
            .to_string(),
    }
}

#[cfg(feature = "desktop-shims")]
fn provide_default_http_client(timeout: Duration) -> Result<Arc<dyn HttpClient>> {
    use bridge_desktop::ReqwestHttpClient;

    let client: Arc<dyn HttpClient> = Arc::new(ReqwestHttpClient::with_timeout(timeout)?);
    Ok(client)
}

#[cfg(not(feature = "desktop-shims"))]
fn provide_default_http_client(_timeout: Duration) -> Result<Arc<dyn HttpClient>> {
    Err(http_client_missing_error())
}

#[cfg(feature = "desktop-shims")]
fn provide_default_filter_backend() -> Result<Arc<dyn FilterBackend>> {
    use bridge_desktop::CpuFilterBackend;

    let backend: Arc<dyn FilterBackend> = Arc::new(CpuFilterBackend::new());
    Ok(backend)
}

#[cfg(not(feature = "desktop-shims"))]
fn provide_default_filter_backend() -> Result<Arc<dyn FilterBackend>> {
    Err(filter_backend_missing_error())
}

/// Builder for [`CoreConfig`]
#[derive(Default)]
pub struct CoreConfigBuilder {
    store_mode: StoreMode,
    filters_endpoint: Option<String>,
    users_endpoint: Option<String>,
    auth_token: Option<String>,
    http_client: Option<Arc<dyn HttpClient>>,
    filter_backend: Option<Arc<dyn FilterBackend>>,
    identity_provider: Option<Arc<dyn IdentityProvider>>,
    frame_source: Option<Arc<dyn FrameSource>>,
    event_buffer_size: Option<usize>,
    request_timeout: Option<Duration>,
    preview_edge: Option<u32>,
    posterize_levels_min: Option<f32>,
}

impl CoreConfigBuilder {
    /// Default: [`StoreMode::Remote`]
    pub fn store_mode(mut self, mode: StoreMode) -> Self {
        self.store_mode = mode;
        self
    }

    /// Filters collection URL, e.g. `https://camera-db.example.com/filters`
    pub fn filters_endpoint(mut self, url: impl Into<String>) -> Self {
        self.filters_endpoint = Some(url.into());
        self
    }

    /// Users collection URL, e.g. `https://camera-db.example.com/users`
    pub fn users_endpoint(mut self, url: impl Into<String>) -> Self {
        self.users_endpoint = Some(url.into());
        self
    }

    /// Empty tokens are treated as absent.
    pub fn auth_token(mut self, token: Option<String>) -> Self {
        self.auth_token = token.filter(|t| !t.trim().is_empty());
        self
    }

    /// If not provided, the reqwest client is used when the `desktop-shims`
    /// feature is enabled. Ignored in local store mode.
    pub fn http_client(mut self, client: Arc<dyn HttpClient>) -> Self {
        self.http_client = Some(client);
        self
    }

    /// If not provided, the CPU backend is used when the `desktop-shims`
    /// feature is enabled.
    pub fn filter_backend(mut self, backend: Arc<dyn FilterBackend>) -> Self {
        self.filter_backend = Some(backend);
        self
    }

    /// Required.
    pub fn identity_provider(mut self, provider: Arc<dyn IdentityProvider>) -> Self {
        self.identity_provider = Some(provider);
        self
    }

    pub fn frame_source(mut self, source: Arc<dyn FrameSource>) -> Self {
        self.frame_source = Some(source);
        self
    }

    /// Default: 100
    pub fn event_buffer_size(mut self, size: usize) -> Self {
        self.event_buffer_size = Some(size);
        self
    }

    /// Default: 30 seconds
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Default: 256 pixels
    pub fn preview_edge(mut self, edge: u32) -> Self {
        self.preview_edge = Some(edge);
        self
    }

    /// Default: 0.0
    pub fn posterize_levels_min(mut self, min: f32) -> Self {
        self.posterize_levels_min = Some(min);
        self
    }

    /// Builds and validates the configuration.
    ///
    /// # Errors
    ///
    /// - [`Error::CapabilityMissing`] for a missing identity provider, or a
    ///   missing HTTP client / filter backend without desktop defaults
    /// - [`Error::Config`] for invalid endpoints or tunables
    pub fn build(self) -> Result<CoreConfig> {
        let identity_provider = self.identity_provider.ok_or_else(|| Error::CapabilityMissing {
            capability: "IdentityProvider".to_string(),
            message: "An IdentityProvider is required for account operations. \
                     Inject the host authentication SDK with .identity_provider()."
                .to_string(),
        })?;

        let request_timeout = self.request_timeout.unwrap_or(DEFAULT_REQUEST_TIMEOUT);

        let http_client = match (self.store_mode, self.http_client) {
            (_, Some(client)) => Some(client),
            (StoreMode::Remote, None) => Some(provide_default_http_client(request_timeout)?),
            (StoreMode::Local, None) => None,
        };

        let filter_backend = match self.filter_backend {
            Some(backend) => backend,
            None => provide_default_filter_backend()?,
        };

        let config = CoreConfig {
            store_mode: self.store_mode,
            filters_endpoint: self.filters_endpoint,
            users_endpoint: self.users_endpoint,
            auth_token: self.auth_token,
            http_client,
            filter_backend,
            identity_provider,
            frame_source: self.frame_source,
            event_buffer_size: self.event_buffer_size.unwrap_or(DEFAULT_EVENT_BUFFER_SIZE),
            request_timeout,
            preview_edge: self.preview_edge.unwrap_or(DEFAULT_PREVIEW_EDGE),
            posterize_levels_min: self
                .posterize_levels_min
                .unwrap_or(DEFAULT_POSTERIZE_LEVELS_MIN),
        };

        config.validate()?;

        Ok(config)
    }
}
