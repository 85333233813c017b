//! Camera Frame Source
//!
//! Capture session configuration stays on the host. The core only pulls
//! decoded frames for previews.

use async_trait::async_trait;
use image::DynamicImage;

use crate::error::Result;

/// Source of preview frames
#[async_trait]
pub trait FrameSource: Send + Sync {
    /// Next available frame
    ///
    /// Returns `Ok(None)` when the session dropped a frame or has not started
    /// delivering yet. Callers treat that as "nothing to show", not a failure.
    async fn next_frame(&self) -> Result<Option<DynamicImage>>;

    /// Whether the capture session is currently running
    fn is_running(&self) -> bool {
        true
    }
}
