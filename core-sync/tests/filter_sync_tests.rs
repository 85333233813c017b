//! Sync service over the in-memory store

use bridge_desktop::CpuFilterBackend;
use core_filters::{FilterCatalog, FilterId, InMemoryFilterRepository, StoreError};
use core_runtime::events::{CoreEvent, EventBus, FilterEvent};
use core_sync::{FilterSyncService, SyncOperation};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;

fn setup() -> (FilterSyncService, FilterCatalog) {
    let catalog = FilterCatalog::new(Arc::new(CpuFilterBackend::new()));
    let service = FilterSyncService::new(Arc::new(InMemoryFilterRepository::new()), EventBus::new(64));
    (service, catalog)
}

#[tokio::test]
async fn full_crud_cycle_tags_every_result() {
    let (service, catalog) = setup();
    let mut filter = catalog.sepia("warm", 0.6).unwrap();

    let created = service.create("alice", &filter).await.unwrap();
    assert_eq!(created.operation, SyncOperation::Create);

    filter.set_intensity(0.9).unwrap();
    let updated = service.update("alice", &filter).await.unwrap();
    assert_eq!(updated.operation, SyncOperation::Update);

    let one = service.fetch_one(filter.id()).await.unwrap();
    assert_eq!(one.operation, SyncOperation::FetchOne);
    assert_eq!(one.payload.intensity(), Some(0.9));

    let all = service.fetch_all("alice").await.unwrap();
    assert_eq!(all.operation, SyncOperation::FetchAll);
    assert_eq!(all.payload.len(), 1);

    let deleted = service.delete(filter.id()).await.unwrap();
    assert_eq!(deleted.operation, SyncOperation::Delete);
    assert_eq!(&deleted.payload, filter.id());

    let err = service.fetch_one(filter.id()).await.unwrap_err();
    assert_eq!(err.operation, SyncOperation::FetchOne);
    assert_eq!(err.source, StoreError::CannotFetch("not found".to_string()));
}

#[tokio::test]
async fn observers_filter_events_by_operation() {
    let (service, catalog) = setup();
    let mut creates = service.events().stream().operation(SyncOperation::Create);
    let mut terminal = service
        .events()
        .stream()
        .filter(|event| matches!(event, CoreEvent::Filter(e) if e.is_terminal()));

    let filter = catalog.black_white("noir").unwrap();
    service.create("alice", &filter).await.unwrap();
    service.fetch_all("alice").await.unwrap();
    let _ = service.delete(&FilterId::new()).await;

    let first = timeout(Duration::from_secs(1), creates.recv()).await.unwrap().unwrap();
    assert!(matches!(
        first,
        CoreEvent::Filter(FilterEvent::Requested { operation: SyncOperation::Create, .. })
    ));
    let second = timeout(Duration::from_secs(1), creates.recv()).await.unwrap().unwrap();
    assert!(matches!(
        second,
        CoreEvent::Filter(FilterEvent::Completed { operation: SyncOperation::Create, count: 1, .. })
    ));
    assert!(creates.try_recv().is_none());

    let mut outcomes = Vec::new();
    while let Some(Ok(CoreEvent::Filter(event))) = terminal.try_recv() {
        outcomes.push(event);
    }
    assert_eq!(outcomes.len(), 3);
    assert!(matches!(
        outcomes[1],
        FilterEvent::Completed { operation: SyncOperation::FetchAll, count: 1, .. }
    ));
    assert!(matches!(
        outcomes[2],
        FilterEvent::Failed { operation: SyncOperation::Delete, ref message, .. } if message == "not found"
    ));
}

#[tokio::test]
async fn concurrent_creates_all_land() {
    let (service, catalog) = setup();
    let filters: Vec<_> = (0..8)
        .map(|i| catalog.blur(format!("blur {}", i), i as f32).unwrap())
        .collect();

    let handles: Vec<_> = filters
        .iter()
        .cloned()
        .map(|filter| {
            let service = service.clone();
            tokio::spawn(async move { service.create("alice", &filter).await })
        })
        .collect();
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let all = service.fetch_all("alice").await.unwrap().into_payload();
    assert_eq!(all.len(), filters.len());
}
