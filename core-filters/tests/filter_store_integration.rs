//! End-to-end filter scenarios against the local store and CPU backend

use bridge_desktop::CpuFilterBackend;
use core_filters::codec;
use core_filters::{
    apply_filter, Color, FilterCatalog, FilterId, FilterKind, FilterRepository,
    InMemoryFilterRepository, StoreError,
};
use image::{DynamicImage, GenericImageView, Rgba, RgbaImage};
use std::sync::Arc;

fn catalog() -> FilterCatalog {
    FilterCatalog::new(Arc::new(CpuFilterBackend::new()))
}

#[tokio::test]
async fn two_filters_same_owner_are_both_fetched() {
    let catalog = catalog();
    let repo = InMemoryFilterRepository::new();

    let cyan = catalog.monochrome("시안", Color::CYAN, 1.0).unwrap();
    let soft = catalog.blur("soft", 5.0).unwrap();
    repo.create("user-1", &cyan).await.unwrap();
    repo.create("user-1", &soft).await.unwrap();
    repo.create("user-2", &catalog.vintage("film").unwrap())
        .await
        .unwrap();

    let mine = repo.fetch_all("user-1").await.unwrap();
    assert_eq!(mine.len(), 2);
    assert!(mine.contains(&cyan));
    assert!(mine.contains(&soft));
}

#[tokio::test]
async fn deleting_absent_id_reports_not_found() {
    let repo = InMemoryFilterRepository::new();
    let err = repo.delete(&FilterId::new()).await.unwrap_err();
    assert!(matches!(err, StoreError::CannotDelete(ref m) if m.contains("not found")));
}

#[tokio::test]
async fn stored_filter_survives_codec_round_trip() {
    let catalog = catalog();
    let original = catalog.posterize("poster", 6.0).unwrap();

    let documents = codec::encode_document("user-1", &original);
    let decoded = codec::decode_documents(&catalog, &documents).unwrap();
    assert_eq!(decoded, vec![original.clone()]);

    let repo = InMemoryFilterRepository::with_filters(vec![("user-1", decoded[0].clone())]);
    assert_eq!(repo.fetch_one(original.id()).await.unwrap(), original);
}

#[test]
fn every_kind_survives_codec_round_trip() {
    let catalog = catalog();
    let filters = vec![
        catalog.sepia("amber", 0.333).unwrap(),
        catalog.vintage("film").unwrap(),
        catalog.black_white("noir").unwrap(),
        catalog
            .monochrome("moss", Color::rgba(0.25, 0.6, 0.1, 0.8), 0.1)
            .unwrap(),
        catalog.posterize("poster", 7.3).unwrap(),
        catalog.blur("haze", 19.99).unwrap(),
    ];

    for filter in filters {
        let documents = codec::encode_document("user-1", &filter);
        let decoded = codec::decode_documents(&catalog, &documents).unwrap();
        assert_eq!(decoded, vec![filter.clone()], "{}", filter.kind());
    }
}

#[test]
fn box_blur_radius_ten_yields_image_at_least_input_size() {
    let backend = CpuFilterBackend::new();
    let filter = catalog().blur("blur", 10.0).unwrap();
    let input = DynamicImage::ImageRgba8(RgbaImage::from_pixel(40, 30, Rgba([10, 200, 90, 255])));

    let output = apply_filter(&backend, &filter, &input).expect("blur output");
    let (w, h) = output.dimensions();
    assert!(w >= 40 && h >= 30, "{}x{}", w, h);
    assert_eq!(filter.kind(), FilterKind::Blur);
}

#[test]
fn every_kind_is_listed_by_the_cpu_catalog() {
    let kinds: Vec<FilterKind> = catalog().kinds().into_iter().map(|k| k.kind).collect();
    assert_eq!(kinds, FilterKind::ALL.to_vec());
}
