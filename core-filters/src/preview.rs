//! Live filter previews
//!
//! Pulls frames from the capture session and renders them through one or
//! more filters. A dropped frame is reported as `None`, never as an error.

use crate::apply::apply_filter;
use crate::error::RenderError;
use crate::models::{CameraFilter, FilterId};
use bridge_traits::{FilterBackend, FrameSource};
use image::{DynamicImage, GenericImageView};
use std::sync::Arc;
use tracing::{debug, instrument};

/// One filtered thumbnail of a preview strip
#[derive(Debug, Clone)]
pub struct PreviewFrame {
    pub filter_id: FilterId,
    /// `None` when the primitive produced no output for this filter
    pub image: Option<DynamicImage>,
}

pub struct PreviewRenderer {
    source: Arc<dyn FrameSource>,
    backend: Arc<dyn FilterBackend>,
    edge: Option<u32>,
}

impl PreviewRenderer {
    pub fn new(source: Arc<dyn FrameSource>, backend: Arc<dyn FilterBackend>) -> Self {
        Self {
            source,
            backend,
            edge: None,
        }
    }

    /// Downscale frames so neither side exceeds `edge` pixels before
    /// filtering. `0` disables downscaling.
    pub fn with_thumbnail_edge(mut self, edge: u32) -> Self {
        self.edge = (edge > 0).then_some(edge);
        self
    }

    pub fn is_running(&self) -> bool {
        self.source.is_running()
    }

    /// Render the next frame through every filter in `filters`
    ///
    /// Returns `Ok(None)` when no frame was available.
    #[instrument(skip(self, filters), fields(filters = filters.len()))]
    pub async fn render_strip(
        &self,
        filters: &[CameraFilter],
    ) -> Result<Option<Vec<PreviewFrame>>, RenderError> {
        let Some(frame) = self.next_frame().await? else {
            return Ok(None);
        };

        let strip = filters
            .iter()
            .map(|filter| PreviewFrame {
                filter_id: filter.id().clone(),
                image: apply_filter(self.backend.as_ref(), filter, &frame),
            })
            .collect();
        Ok(Some(strip))
    }

    /// Render the next frame through a single filter
    pub async fn render_next(
        &self,
        filter: &CameraFilter,
    ) -> Result<Option<DynamicImage>, RenderError> {
        Ok(self
            .next_frame()
            .await?
            .and_then(|frame| apply_filter(self.backend.as_ref(), filter, &frame)))
    }

    async fn next_frame(&self) -> Result<Option<DynamicImage>, RenderError> {
        let frame = self
            .source
            .next_frame()
            .await
            .map_err(|e| RenderError::FrameSource(e.to_string()))?;

        let Some(frame) = frame else {
            debug!("No frame available");
            return Ok(None);
        };

        Ok(Some(match self.edge {
            Some(edge) if frame.width() > edge || frame.height() > edge => {
                frame.thumbnail(edge, edge)
            }
            _ => frame,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::FilterCatalog;
    use async_trait::async_trait;
    use bridge_desktop::CpuFilterBackend;
    use bridge_traits::error::{BridgeError, Result as BridgeResult};
    use image::RgbaImage;
    use mockall::mock;

    mock! {
        Camera {}

        #[async_trait]
        impl FrameSource for Camera {
            async fn next_frame(&self) -> BridgeResult<Option<DynamicImage>>;
            fn is_running(&self) -> bool;
        }
    }

    fn frame(width: u32, height: u32) -> DynamicImage {
        DynamicImage::ImageRgba8(RgbaImage::from_pixel(
            width,
            height,
            image::Rgba([200, 120, 40, 255]),
        ))
    }

    fn renderer(camera: MockCamera) -> PreviewRenderer {
        PreviewRenderer::new(Arc::new(camera), Arc::new(CpuFilterBackend::new()))
    }

    fn catalog() -> FilterCatalog {
        FilterCatalog::new(Arc::new(CpuFilterBackend::new()))
    }

    #[tokio::test]
    async fn test_strip_renders_each_filter_on_one_frame() {
        let mut camera = MockCamera::new();
        camera
            .expect_next_frame()
            .times(1)
            .returning(|| Ok(Some(frame(640, 480))));

        let catalog = catalog();
        let filters = vec![
            catalog.sepia("warm", 0.9).unwrap(),
            catalog.posterize("flat", 1.0).unwrap(),
        ];

        let strip = renderer(camera)
            .with_thumbnail_edge(64)
            .render_strip(&filters)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(strip.len(), 2);
        assert_eq!(&strip[0].filter_id, filters[0].id());
        let thumb = strip[0].image.as_ref().unwrap();
        assert_eq!(thumb.dimensions(), (64, 48));
        assert!(strip[1].image.is_none());
    }

    #[tokio::test]
    async fn test_dropped_frame_is_not_an_error() {
        let mut camera = MockCamera::new();
        camera.expect_next_frame().times(1).returning(|| Ok(None));

        let filter = catalog().vintage("film").unwrap();
        let output = renderer(camera).render_next(&filter).await.unwrap();
        assert!(output.is_none());
    }

    #[tokio::test]
    async fn test_frame_source_failure() {
        let mut camera = MockCamera::new();
        camera
            .expect_next_frame()
            .returning(|| Err(BridgeError::NotAvailable("camera".to_string())));
        camera.expect_is_running().return_const(false);

        let renderer = renderer(camera);
        assert!(!renderer.is_running());

        let result = renderer.render_strip(&[]).await;
        assert!(matches!(result, Err(RenderError::FrameSource(_))));
    }

    #[tokio::test]
    async fn test_small_frames_are_not_resized() {
        let mut camera = MockCamera::new();
        camera
            .expect_next_frame()
            .returning(|| Ok(Some(frame(20, 10))));

        let filter = catalog().black_white("noir").unwrap();
        let output = renderer(camera)
            .with_thumbnail_edge(256)
            .render_next(&filter)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(output.dimensions(), (20, 10));
    }
}
