//! # Desktop Bridge Implementations
//!
//! Default implementations of the bridge traits for desktop hosts
//! (macOS, Windows, Linux) and for tests that want real behaviour instead of
//! mocks:
//! - `HttpClient` using `reqwest`
//! - `FilterBackend` using the `image` crate on the CPU
//!
//! Camera frames and identity are always supplied by the host application.
//!
//! ## Usage
//!
//! ```ignore
//! use bridge_desktop::{CpuFilterBackend, ReqwestHttpClient};
//! use std::sync::Arc;
//!
//! let http = Arc::new(ReqwestHttpClient::new()?);
//! let backend = Arc::new(CpuFilterBackend::new());
//! ```

mod filters;
mod http;

pub use filters::{
    CpuFilterBackend, BOX_BLUR, COLOR_MONOCHROME, COLOR_POSTERIZE, PHOTO_EFFECT_TONAL,
    PHOTO_EFFECT_TRANSFER, SEPIA_TONE,
};
pub use http::ReqwestHttpClient;
