//! Rendering a filter onto an image

use crate::error::RenderError;
use crate::models::{CameraFilter, ParameterValue};
use bridge_traits::filter::{FilterBackend, FilterInput, FilterRequest};
use image::DynamicImage;
use tracing::{trace, warn};

/// Primitive invocation for `filter`
///
/// Every parameter of the filter is passed on each call, so the request
/// always reflects the filter's current values.
pub fn to_request(filter: &CameraFilter) -> FilterRequest {
    filter
        .parameters()
        .into_iter()
        .fold(FilterRequest::new(filter.system_name()), |request, (key, value)| {
            let input = match value {
                ParameterValue::Scalar(v) => FilterInput::Scalar(v),
                ParameterValue::Color(c) => FilterInput::Color(c.components()),
            };
            request.input(key.input_key(), input)
        })
}

/// Render `image` through `filter`, surfacing backend faults
pub fn try_apply_filter(
    backend: &dyn FilterBackend,
    filter: &CameraFilter,
    image: &DynamicImage,
) -> Result<Option<DynamicImage>, RenderError> {
    let request = to_request(filter);
    trace!(filter_id = %filter.id(), request = %request, "Applying filter");
    Ok(backend.render(&request, image)?)
}

/// Render `image` through `filter`
///
/// Returns `None` when the primitive produces nothing (empty image, levels
/// below 2) or the backend fails; failures are logged, not returned.
pub fn apply_filter(
    backend: &dyn FilterBackend,
    filter: &CameraFilter,
    image: &DynamicImage,
) -> Option<DynamicImage> {
    match try_apply_filter(backend, filter, image) {
        Ok(output) => output,
        Err(e) => {
            warn!(filter_id = %filter.id(), kind = %filter.kind(), error = %e, "Filter render failed");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::FilterCatalog;
    use crate::models::Color;
    use bridge_desktop::CpuFilterBackend;
    use bridge_traits::error::{BridgeError, Result as BridgeResult};
    use bridge_traits::filter::{INPUT_COLOR, INPUT_INTENSITY, INPUT_LEVELS};
    use image::{GenericImageView, Rgba, RgbaImage};
    use std::sync::Arc;

    struct Broken;

    impl FilterBackend for Broken {
        fn supports(&self, _system_name: &str) -> bool {
            true
        }

        fn render(
            &self,
            _request: &FilterRequest,
            _image: &DynamicImage,
        ) -> BridgeResult<Option<DynamicImage>> {
            Err(BridgeError::OperationFailed("pipeline lost".to_string()))
        }
    }

    fn sample(width: u32, height: u32) -> DynamicImage {
        DynamicImage::ImageRgba8(RgbaImage::from_fn(width, height, |x, y| {
            Rgba([(x * 7 % 256) as u8, (y * 11 % 256) as u8, 128, 255])
        }))
    }

    #[test]
    fn test_request_carries_all_parameters() {
        let catalog = FilterCatalog::new(Arc::new(CpuFilterBackend::new()));
        let filter = catalog.monochrome("cyan", Color::CYAN, 0.8).unwrap();

        let request = to_request(&filter);
        assert_eq!(request.system_name, "CIColorMonochrome");
        assert_eq!(request.scalar(INPUT_INTENSITY), Some(0.8));
        assert_eq!(request.color(INPUT_COLOR), Some([0.0, 1.0, 1.0, 1.0]));
        assert_eq!(request.inputs.len(), 2);
    }

    #[test]
    fn test_parameter_change_reaches_next_apply() {
        let catalog = FilterCatalog::new(Arc::new(CpuFilterBackend::new()));
        let mut filter = catalog.posterize("poster", 4.0).unwrap();
        filter.set_levels(8.0).unwrap();

        assert_eq!(to_request(&filter).scalar(INPUT_LEVELS), Some(8.0));
    }

    #[test]
    fn test_blur_radius_ten_grows_extent() {
        let backend = CpuFilterBackend::new();
        let catalog = FilterCatalog::new(Arc::new(CpuFilterBackend::new()));
        let filter = catalog.blur("blur", 10.0).unwrap();
        let input = sample(32, 24);

        let output = apply_filter(&backend, &filter, &input).unwrap();
        let (w, h) = output.dimensions();
        assert!(w >= 32 && h >= 24);
    }

    #[test]
    fn test_every_kind_renders_non_empty_image() {
        let backend = CpuFilterBackend::new();
        let catalog = FilterCatalog::new(Arc::new(CpuFilterBackend::new()));
        let filters = vec![
            catalog.sepia("a", 1.0).unwrap(),
            catalog.vintage("b").unwrap(),
            catalog.black_white("c").unwrap(),
            catalog.monochrome("d", Color::MAGENTA, 0.5).unwrap(),
            catalog.posterize("e", 6.0).unwrap(),
            catalog.blur("f", 2.0).unwrap(),
        ];
        let input = sample(16, 16);

        for filter in &filters {
            assert!(apply_filter(&backend, filter, &input).is_some(), "{}", filter.kind());
        }
    }

    #[test]
    fn test_no_output_cases() {
        let backend = CpuFilterBackend::new();
        let catalog = FilterCatalog::new(Arc::new(CpuFilterBackend::new()));

        let sepia = catalog.sepia("a", 0.5).unwrap();
        assert!(apply_filter(&backend, &sepia, &sample(0, 0)).is_none());

        let flat = catalog.posterize("flat", 1.0).unwrap();
        assert!(apply_filter(&backend, &flat, &sample(8, 8)).is_none());
    }

    #[test]
    fn test_backend_fault_is_logged_not_returned() {
        let catalog = FilterCatalog::new(Arc::new(CpuFilterBackend::new()));
        let filter = catalog.vintage("film").unwrap();

        assert!(apply_filter(&Broken, &filter, &sample(4, 4)).is_none());
        assert!(matches!(
            try_apply_filter(&Broken, &filter, &sample(4, 4)),
            Err(RenderError::Backend(_))
        ));
    }
}
