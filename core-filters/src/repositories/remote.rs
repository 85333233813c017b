//! REST-backed filter store

use super::FilterRepository;
use crate::catalog::FilterCatalog;
use crate::codec;
use crate::error::{StoreError, StoreResult};
use crate::models::{CameraFilter, FilterId};
use async_trait::async_trait;
use core_runtime::document::DocumentClient;
use tracing::{debug, instrument, warn};

const OWNER_FIELD: &str = "owner";

/// Filter store backed by the REST document API
///
/// Both `create` and `update` merge the record with a `PATCH`; the store
/// does not check whether the id already exists.
#[derive(Debug, Clone)]
pub struct RestFilterRepository {
    documents: DocumentClient,
    catalog: FilterCatalog,
}

impl RestFilterRepository {
    pub fn new(documents: DocumentClient, catalog: FilterCatalog) -> Self {
        Self { documents, catalog }
    }

    async fn put(&self, owner: &str, filter: &CameraFilter) -> Result<(), String> {
        self.documents
            .patch(codec::encode_document(owner, filter))
            .await
            .map_err(|e| e.to_string())
    }
}

#[async_trait]
impl FilterRepository for RestFilterRepository {
    #[instrument(skip(self))]
    async fn fetch_all(&self, owner: &str) -> StoreResult<Vec<CameraFilter>> {
        let documents = self
            .documents
            .query(OWNER_FIELD, owner)
            .await
            .map_err(StoreError::fetch)?;
        let filters = codec::decode_documents(&self.catalog, &documents)?;
        debug!(count = filters.len(), "Fetched filters");
        Ok(filters)
    }

    #[instrument(skip(self), fields(filter_id = %id))]
    async fn fetch_one(&self, id: &FilterId) -> StoreResult<CameraFilter> {
        let value = self
            .documents
            .query_key(id.as_str())
            .await
            .map_err(StoreError::fetch)?
            .ok_or_else(|| StoreError::fetch("not found"))?;
        Ok(codec::decode(&self.catalog, id.as_str(), &value)?)
    }

    #[instrument(skip(self, filter), fields(filter_id = %filter.id()))]
    async fn create(&self, owner: &str, filter: &CameraFilter) -> StoreResult<()> {
        self.put(owner, filter).await.map_err(|e| {
            warn!(error = %e, "Create failed");
            StoreError::create(e)
        })
    }

    #[instrument(skip(self, filter), fields(filter_id = %filter.id()))]
    async fn update(&self, owner: &str, filter: &CameraFilter) -> StoreResult<()> {
        self.put(owner, filter).await.map_err(|e| {
            warn!(error = %e, "Update failed");
            StoreError::update(e)
        })
    }

    #[instrument(skip(self), fields(filter_id = %id))]
    async fn delete(&self, id: &FilterId) -> StoreResult<()> {
        self.documents
            .delete(id.as_str())
            .await
            .map_err(StoreError::delete)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Color, FilterKind};
    use bridge_desktop::CpuFilterBackend;
    use bridge_traits::error::{BridgeError, Result as BridgeResult};
    use bridge_traits::http::{HttpClient, HttpMethod, HttpRequest, HttpResponse, RetryPolicy};
    use bytes::Bytes;
    use mockall::mock;
    use serde_json::{json, Value};
    use std::collections::HashMap;
    use std::sync::Arc;

    mock! {
        Http {}

        #[async_trait]
        impl HttpClient for Http {
            async fn execute(&self, request: HttpRequest) -> BridgeResult<HttpResponse>;
            async fn execute_with_retry(
                &self,
                request: HttpRequest,
                policy: RetryPolicy,
            ) -> BridgeResult<HttpResponse>;
        }
    }

    const ENDPOINT: &str = "https://db.example.com/filters";

    fn response(status: u16, body: &str) -> HttpResponse {
        HttpResponse {
            status,
            headers: HashMap::new(),
            body: Bytes::from(body.to_string()),
        }
    }

    fn catalog() -> FilterCatalog {
        FilterCatalog::new(Arc::new(CpuFilterBackend::new()))
    }

    fn repository(mock: MockHttp) -> RestFilterRepository {
        let documents = DocumentClient::new(Arc::new(mock), ENDPOINT).unwrap();
        RestFilterRepository::new(documents, catalog())
    }

    fn body_json(request: &HttpRequest) -> Value {
        serde_json::from_slice(request.body.as_ref().unwrap()).unwrap()
    }

    #[tokio::test]
    async fn test_fetch_all_queries_by_owner() {
        let mut mock = MockHttp::new();
        mock.expect_execute_with_retry()
            .withf(|req, _| {
                req.method == HttpMethod::Get
                    && req.url
                        == "https://db.example.com/filters.json?orderBy=%22owner%22&equalTo=%22alice%22"
            })
            .times(1)
            .returning(|_, _| {
                Ok(response(
                    200,
                    r#"{
                        "A1": {"owner":"alice","alias":"warm","systemName":"CISepiaTone","inputIntensity":"0.7"},
                        "B2": {"owner":"alice","alias":"noir","systemName":"CIPhotoEffectTonal"}
                    }"#,
                ))
            });

        let filters = repository(mock).fetch_all("alice").await.unwrap();
        assert_eq!(filters.len(), 2);
        let warm = filters.iter().find(|f| f.id().as_str() == "A1").unwrap();
        assert_eq!(warm.kind(), FilterKind::Sepia);
        assert_eq!(warm.intensity(), Some(0.7));
        let noir = filters.iter().find(|f| f.id().as_str() == "B2").unwrap();
        assert_eq!(noir.kind(), FilterKind::BlackWhite);
    }

    #[tokio::test]
    async fn test_fetch_all_null_body_is_empty() {
        let mut mock = MockHttp::new();
        mock.expect_execute_with_retry()
            .times(1)
            .returning(|_, _| Ok(response(200, "null")));

        assert!(repository(mock).fetch_all("nobody").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_fetch_one_missing_is_not_found() {
        let mut mock = MockHttp::new();
        mock.expect_execute_with_retry()
            .withf(|req, _| req.url.contains("orderBy=%22%24key%22&equalTo=%22ghost%22"))
            .times(1)
            .returning(|_, _| Ok(response(200, "{}")));

        let id = FilterId::from_string("ghost").unwrap();
        let err = repository(mock).fetch_one(&id).await.unwrap_err();
        assert_eq!(err, StoreError::CannotFetch("not found".to_string()));
    }

    #[tokio::test]
    async fn test_undecodable_record_fails_fetch() {
        let mut mock = MockHttp::new();
        mock.expect_execute_with_retry()
            .times(1)
            .returning(|_, _| {
                Ok(response(
                    200,
                    r#"{"X":{"owner":"alice","alias":"?","systemName":"CIUnknownFilter"}}"#,
                ))
            });

        let err = repository(mock).fetch_all("alice").await.unwrap_err();
        assert!(matches!(err, StoreError::CannotFetch(ref m) if m.contains("CIUnknownFilter")));
    }

    #[tokio::test]
    async fn test_create_patches_collection_with_record() {
        let filter = catalog().monochrome("시안", Color::CYAN, 1.0).unwrap();
        let id = filter.id().to_string();

        let expected = json!({
            "owner": "alice",
            "alias": "시안",
            "systemName": "CIColorMonochrome",
            "inputColor": "0 1 1 1",
            "inputIntensity": "1.0",
            "inputLevels": "0.0",
            "inputRadius": "0.0"
        });

        let mut mock = MockHttp::new();
        mock.expect_execute_with_retry()
            .withf(move |req, _| {
                let body = body_json(req);
                req.method == HttpMethod::Patch
                    && req.url == "https://db.example.com/filters.json"
                    && body.as_object().map(|o| o.len()) == Some(1)
                    && body[id.as_str()] == expected
            })
            .times(1)
            .returning(|_, _| Ok(response(200, "{}")));

        repository(mock).create("alice", &filter).await.unwrap();
    }

    #[tokio::test]
    async fn test_update_failure_carries_message() {
        let filter = catalog().blur("soft", 2.0).unwrap();
        let mut mock = MockHttp::new();
        mock.expect_execute_with_retry()
            .times(1)
            .returning(|_, _| Ok(response(401, "Permission denied")));

        let err = repository(mock).update("alice", &filter).await.unwrap_err();
        assert!(matches!(err, StoreError::CannotUpdate(ref m) if m.contains("Permission denied")));
    }

    #[tokio::test]
    async fn test_delete_targets_document_url() {
        let mut mock = MockHttp::new();
        mock.expect_execute_with_retry()
            .withf(|req, _| {
                req.method == HttpMethod::Delete
                    && req.url == "https://db.example.com/filters/F-1.json"
            })
            .times(1)
            .returning(|_, _| Err(BridgeError::OperationFailed("connection reset".to_string())));

        let id = FilterId::from_string("F-1").unwrap();
        let err = repository(mock).delete(&id).await.unwrap_err();
        assert_eq!(err, StoreError::CannotDelete("Bridge operation failed: connection reset".to_string()));
    }
}
