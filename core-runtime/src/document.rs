//! # REST Document Store Client
//!
//! Thin client for a JSON document store addressed by collection URL
//! (`https://<db>/filters`). Documents live under a key inside the
//! collection and are reached through four calls:
//!
//! | Call                | Request |
//! |---------------------|---------|
//! | [`query`]           | `GET {collection}.json?orderBy="<field>"&equalTo="<value>"` |
//! | [`query_key`]       | `GET {collection}.json?orderBy="$key"&equalTo="<key>"` |
//! | [`patch`]           | `PATCH {collection}.json` with `{ "<key>": { ... } }` |
//! | [`delete`]          | `DELETE {collection}/<key>.json` |
//!
//! A `null` or `{}` body is an empty result. An optional auth token is
//! appended to every request as `auth=<token>`.
//!
//! Errors are reported as [`BridgeError`]; the stores built on top map them
//! into their own taxonomy.
//!
//! [`query`]: DocumentClient::query
//! [`query_key`]: DocumentClient::query_key
//! [`patch`]: DocumentClient::patch
//! [`delete`]: DocumentClient::delete

use crate::error::{Error, Result};
use crate::logging::redact_url;

use bridge_traits::error::{BridgeError, Result as BridgeResult};
use bridge_traits::http::{HttpClient, HttpMethod, HttpRequest, HttpResponse, RetryPolicy};
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument};
use url::Url;

/// Documents returned by a query, keyed by document key
pub type Documents = Map<String, Value>;

const KEY_FIELD: &str = "$key";

/// Client bound to one collection
#[derive(Clone)]
pub struct DocumentClient {
    http: Arc<dyn HttpClient>,
    collection: String,
    auth_token: Option<String>,
    timeout: Duration,
}

impl DocumentClient {
    /// Bind a client to a collection URL
    ///
    /// A trailing `/` or `.json` on the URL is ignored.
    ///
    /// # Errors
    ///
    /// [`Error::Config`] when the URL does not parse or is not http(s).
    pub fn new(http: Arc<dyn HttpClient>, collection_url: &str) -> Result<Self> {
        let collection = normalize_collection(collection_url)?;
        Ok(Self {
            http,
            collection,
            auth_token: None,
            timeout: Duration::from_secs(30),
        })
    }

    pub fn with_auth_token(mut self, token: Option<String>) -> Self {
        self.auth_token = token.filter(|t| !t.is_empty());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Documents whose `field` equals `value`
    #[instrument(skip(self), fields(collection = %self.collection))]
    pub async fn query(&self, field: &str, value: &str) -> BridgeResult<Documents> {
        let url = self.query_url(field, value);
        let response = self.send(HttpRequest::new(HttpMethod::Get, url)).await?;
        let documents = parse_documents(&response)?;
        debug!(count = documents.len(), "Query returned documents");
        Ok(documents)
    }

    /// The document stored under `key`, if any
    pub async fn query_key(&self, key: &str) -> BridgeResult<Option<Value>> {
        let mut documents = self.query(KEY_FIELD, key).await?;
        Ok(documents.remove(key))
    }

    /// Merge `documents` into the collection. Existing keys are overwritten
    /// field by field, missing keys are created.
    #[instrument(skip(self, documents), fields(collection = %self.collection, count = documents.len()))]
    pub async fn patch(&self, documents: Documents) -> BridgeResult<()> {
        let url = self.collection_url();
        let request = HttpRequest::new(HttpMethod::Patch, url).json(&Value::Object(documents))?;
        self.send(request).await.map(|_| ())
    }

    /// Remove the document stored under `key`
    #[instrument(skip(self), fields(collection = %self.collection))]
    pub async fn delete(&self, key: &str) -> BridgeResult<()> {
        let url = self.document_url(key);
        self.send(HttpRequest::new(HttpMethod::Delete, url))
            .await
            .map(|_| ())
    }

    async fn send(&self, request: HttpRequest) -> BridgeResult<HttpResponse> {
        debug!(
            method = request.method.as_str(),
            url = %redact_url(&request.url),
            "Document store request"
        );
        let request = request
            .header("Accept", "application/json")
            .timeout(self.timeout);
        self.http
            .execute_with_retry(request, RetryPolicy::none())
            .await?
            .error_for_status()
    }

    fn auth_suffix(&self, separator: char) -> String {
        match &self.auth_token {
            Some(token) => format!("{}auth={}", separator, urlencoding::encode(token)),
            None => String::new(),
        }
    }

    pub(crate) fn collection_url(&self) -> String {
        format!("{}.json{}", self.collection, self.auth_suffix('?'))
    }

    pub(crate) fn query_url(&self, field: &str, value: &str) -> String {
        format!(
            "{}.json?orderBy={}&equalTo={}{}",
            self.collection,
            urlencoding::encode(&quoted(field)),
            urlencoding::encode(&quoted(value)),
            self.auth_suffix('&')
        )
    }

    pub(crate) fn document_url(&self, key: &str) -> String {
        format!(
            "{}/{}.json{}",
            self.collection,
            urlencoding::encode(key),
            self.auth_suffix('?')
        )
    }
}

impl fmt::Debug for DocumentClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DocumentClient")
            .field("collection", &self.collection)
            .field("auth_token", &self.auth_token.as_ref().map(|_| "[REDACTED]"))
            .field("timeout", &self.timeout)
            .finish()
    }
}

fn quoted(value: &str) -> String {
    serde_json::Value::String(value.to_string()).to_string()
}

fn normalize_collection(raw: &str) -> Result<String> {
    let trimmed = raw.trim().trim_end_matches('/');
    let trimmed = trimmed.strip_suffix(".json").unwrap_or(trimmed);

    let parsed = Url::parse(trimmed)
        .map_err(|e| Error::Config(format!("Invalid collection URL '{}': {}", raw, e)))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(Error::Config(format!(
            "Collection URL '{}' must use http or https",
            raw
        )));
    }
    if parsed.query().is_some() {
        return Err(Error::Config(format!(
            "Collection URL '{}' must not carry a query string; use the auth token setting",
            raw
        )));
    }

    Ok(trimmed.to_string())
}

/// Decode a query body. `null` and `{}` are both "no documents".
fn parse_documents(response: &HttpResponse) -> BridgeResult<Documents> {
    if response.body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Documents::new());
    }

    match response.json::<Value>()? {
        Value::Null => Ok(Documents::new()),
        Value::Object(documents) => Ok(documents),
        other => Err(BridgeError::OperationFailed(format!(
            "unexpected document store response: expected an object, got {}",
            json_kind(&other)
        ))),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bytes::Bytes;
    use mockall::mock;
    use serde_json::json;
    use std::collections::HashMap;

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

    fn response(status: u16, body: &str) -> HttpResponse {
        HttpResponse {
            status,
            headers: HashMap::new(),
            body: Bytes::from(body.to_string()),
        }
    }

    fn client(mock: MockHttp) -> DocumentClient {
        DocumentClient::new(Arc::new(mock), "https://db.example.com/filters").unwrap()
    }

    #[test]
    fn test_collection_normalization() {
        let http: Arc<dyn HttpClient> = Arc::new(MockHttp::new());
        for raw in [
            "https://db.example.com/filters",
            "https://db.example.com/filters/",
            "https://db.example.com/filters.json",
        ] {
            let client = DocumentClient::new(http.clone(), raw).unwrap();
            assert_eq!(client.collection(), "https://db.example.com/filters");
        }

        assert!(matches!(
            DocumentClient::new(http.clone(), "ftp://db.example.com/filters"),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            DocumentClient::new(http, "not a url"),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_urls() {
        let client = client(MockHttp::new());
        assert_eq!(
            client.query_url("owner", "user 1"),
            "https://db.example.com/filters.json?orderBy=%22owner%22&equalTo=%22user%201%22"
        );
        assert_eq!(
            client.query_url(KEY_FIELD, "f-1"),
            "https://db.example.com/filters.json?orderBy=%22%24key%22&equalTo=%22f-1%22"
        );
        assert_eq!(
            client.document_url("f-1"),
            "https://db.example.com/filters/f-1.json"
        );

        let authed = client.with_auth_token(Some("t0k".to_string()));
        assert_eq!(
            authed.collection_url(),
            "https://db.example.com/filters.json?auth=t0k"
        );
        assert!(authed.query_url("owner", "u").ends_with("&auth=t0k"));
    }

    #[tokio::test]
    async fn test_query_null_and_empty_bodies() {
        for body in ["null", "{}", ""] {
            let mut mock = MockHttp::new();
            mock.expect_execute_with_retry()
                .times(1)
                .returning(move |_, _| Ok(response(200, body)));

            let documents = client(mock).query("owner", "u-1").await.unwrap();
            assert!(documents.is_empty(), "body {:?}", body);
        }
    }

    #[tokio::test]
    async fn test_query_returns_documents() {
        let mut mock = MockHttp::new();
        mock.expect_execute_with_retry()
            .withf(|request, policy| {
                request.method == HttpMethod::Get
                    && request.url.contains("orderBy=%22owner%22")
                    && policy.max_attempts == 1
            })
            .times(1)
            .returning(|_, _| {
                Ok(response(
                    200,
                    r#"{"f-1":{"owner":"u-1"},"f-2":{"owner":"u-1"}}"#,
                ))
            });

        let documents = client(mock).query("owner", "u-1").await.unwrap();
        assert_eq!(documents.len(), 2);
        assert_eq!(documents["f-2"]["owner"], "u-1");
    }

    #[tokio::test]
    async fn test_query_key_picks_document() {
        let mut mock = MockHttp::new();
        mock.expect_execute_with_retry()
            .returning(|_, _| Ok(response(200, r#"{"f-1":{"alias":"Warm"}}"#)));

        let client = client(mock);
        assert_eq!(
            client.query_key("f-1").await.unwrap(),
            Some(json!({"alias": "Warm"}))
        );
        assert_eq!(client.query_key("f-2").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_patch_sends_keyed_body() {
        let mut mock = MockHttp::new();
        mock.expect_execute_with_retry()
            .withf(|request, _| {
                let body: Value =
                    serde_json::from_slice(request.body.as_ref().unwrap()).unwrap();
                request.method == HttpMethod::Patch
                    && request.url == "https://db.example.com/filters.json"
                    && body == json!({"f-1": {"alias": "Warm"}})
            })
            .times(1)
            .returning(|_, _| Ok(response(200, r#"{"f-1":{"alias":"Warm"}}"#)));

        let mut documents = Documents::new();
        documents.insert("f-1".to_string(), json!({"alias": "Warm"}));
        client(mock).patch(documents).await.unwrap();
    }

    #[tokio::test]
    async fn test_delete_and_status_errors() {
        let mut mock = MockHttp::new();
        mock.expect_execute_with_retry()
            .withf(|request, _| {
                request.method == HttpMethod::Delete
                    && request.url == "https://db.example.com/filters/f-1.json"
            })
            .times(1)
            .returning(|_, _| Ok(response(401, r#"{"error":"Permission denied"}"#)));

        match client(mock).delete("f-1").await {
            Err(BridgeError::HttpStatus { status, message }) => {
                assert_eq!(status, 401);
                assert!(message.contains("Permission denied"));
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_non_object_body_is_rejected() {
        let mut mock = MockHttp::new();
        mock.expect_execute_with_retry()
            .returning(|_, _| Ok(response(200, "[1,2]")));

        let err = client(mock).query("owner", "u-1").await.unwrap_err();
        assert!(err.to_string().contains("an array"));
    }
}
