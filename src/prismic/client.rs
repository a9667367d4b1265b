//! Prismic REST API v2 client

use async_trait::async_trait;
use reqwest::Url;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use super::{ContentRepository, Predicate, Query};
use crate::config::PrismicConfig;
use crate::content::{Cursor, Page, RawPost};
use crate::error::{Error, Result};

/// API root document; only the refs matter here
#[derive(Debug, Deserialize)]
struct ApiInfo {
    #[serde(default)]
    refs: Vec<ApiRef>,
}

#[derive(Debug, Deserialize)]
struct ApiRef {
    #[serde(rename = "ref")]
    reference: String,
    #[serde(default, rename = "isMasterRef")]
    is_master_ref: bool,
}

/// How long a resolved master ref is reused by default
pub const DEFAULT_REF_TTL: Duration = Duration::from_secs(60);

/// Master ref and when it was resolved
#[derive(Debug)]
struct CachedRef {
    reference: String,
    resolved_at: Instant,
}

/// HTTP client for one Prismic repository
pub struct PrismicClient {
    http: reqwest::Client,
    endpoint: String,
    access_token: Option<String>,
    master_ref: Mutex<Option<CachedRef>>,
    ref_ttl: Duration,
}

impl PrismicClient {
    /// Create a client for `endpoint` (`https://<repo>.cdn.prismic.io/api/v2`)
    pub fn new(endpoint: impl Into<String>, access_token: Option<String>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(concat!("spacetraveling/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            access_token,
            master_ref: Mutex::new(None),
            ref_ttl: DEFAULT_REF_TTL,
        })
    }

    /// Re-resolve the master ref once it is older than `ttl`.
    ///
    /// Every publish creates a new master ref, so this bounds how stale
    /// search results can be.
    pub fn with_ref_ttl(mut self, ttl: Duration) -> Self {
        self.ref_ttl = ttl;
        self
    }

    pub fn from_config(config: &PrismicConfig) -> Result<Self> {
        Self::new(&config.api_endpoint, config.access_token.clone())
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Send a request and decode its JSON body
    async fn get_json<T: DeserializeOwned>(&self, request: reqwest::RequestBuilder) -> Result<T> {
        let response = request.send().await?;

        let status = response.status();
        if !status.is_success() {
            // The query string may carry the access token
            let mut url = response.url().clone();
            url.set_query(None);
            return Err(Error::Status {
                status,
                url: url.to_string(),
            });
        }

        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }

    fn token_params(&self) -> Vec<(&'static str, String)> {
        self.access_token
            .iter()
            .map(|token| ("access_token", token.clone()))
            .collect()
    }

    /// The ref of the currently published content, re-resolved after `ref_ttl`
    async fn master_ref(&self) -> Result<String> {
        let mut cached = self.master_ref.lock().await;
        if let Some(current) = cached.as_ref() {
            if current.resolved_at.elapsed() < self.ref_ttl {
                return Ok(current.reference.clone());
            }
        }

        debug!("Resolving master ref from {}", self.endpoint);
        let request = self.http.get(&self.endpoint).query(&self.token_params());
        let api: ApiInfo = self.get_json(request).await?;
        let reference = api
            .refs
            .into_iter()
            .find(|r| r.is_master_ref)
            .map(|r| r.reference)
            .ok_or_else(|| Error::Decode(serde::de::Error::custom("API root lists no master ref")))?;

        *cached = Some(CachedRef {
            reference: reference.clone(),
            resolved_at: Instant::now(),
        });
        Ok(reference)
    }

    /// Whether `cursor` points into this repository's API: same scheme,
    /// host and port, no credentials, and a path under the endpoint's
    fn owns_cursor(&self, cursor: &Cursor) -> bool {
        let (Ok(base), Ok(url)) = (Url::parse(&self.endpoint), Url::parse(cursor.as_str())) else {
            return false;
        };

        let base_path = base.path().trim_end_matches('/');
        let path = url.path();

        url.scheme() == base.scheme()
            && url.host_str() == base.host_str()
            && url.port_or_known_default() == base.port_or_known_default()
            && url.username().is_empty()
            && url.password().is_none()
            && (path == base_path || path.starts_with(&format!("{}/", base_path)))
    }

    async fn search(&self, query: &Query) -> Result<Page> {
        let reference = self.master_ref().await?;

        let mut params = vec![("ref", reference)];
        params.extend(query.to_params());
        params.extend(self.token_params());

        debug!(q = %query.predicates_param(), "Searching documents");
        let url = format!("{}/documents/search", self.endpoint);
        self.get_json(self.http.get(url).query(&params)).await
    }
}

#[async_trait]
impl ContentRepository for PrismicClient {
    async fn query(&self, query: &Query) -> Result<Page> {
        self.search(query).await
    }

    async fn next_page(&self, cursor: &Cursor) -> Result<Page> {
        if !self.owns_cursor(cursor) {
            warn!(cursor = %cursor, "Cursor does not belong to {}", self.endpoint);
            return Err(Error::ForeignCursor {
                endpoint: self.endpoint.clone(),
            });
        }

        debug!(cursor = %cursor, "Fetching next page");
        self.get_json(self.http.get(cursor.as_str())).await
    }

    async fn get_by_uid(&self, doc_type: &str, uid: &str) -> Result<RawPost> {
        let query =
            Query::new(vec![Predicate::at(format!("my.{}.uid", doc_type), uid)]).page_size(1);
        let page = self.search(&query).await?;

        page.results
            .into_iter()
            .next()
            .ok_or_else(|| Error::NotFound {
                doc_type: doc_type.to_string(),
                uid: uid.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn mount_api_root(server: &MockServer) {
        Mock::given(method("GET"))
            .and(path("/api/v2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "refs": [
                    { "id": "preview", "ref": "preview-ref", "isMasterRef": false },
                    { "id": "master", "ref": "master-ref", "isMasterRef": true }
                ]
            })))
            .expect(1)
            .mount(server)
            .await;
    }

    fn client(server: &MockServer) -> PrismicClient {
        PrismicClient::new(format!("{}/api/v2/", server.uri()), None).unwrap()
    }

    #[tokio::test]
    async fn test_query_sends_projection_and_page_size() {
        let server = MockServer::start().await;
        mount_api_root(&server).await;

        let next = format!("{}/api/v2/documents/search?page=2", server.uri());
        Mock::given(method("GET"))
            .and(path("/api/v2/documents/search"))
            .and(query_param("ref", "master-ref"))
            .and(query_param("q", r#"[[at(document.type, "posts")]]"#))
            .and(query_param("fetch", "posts.title,posts.subtitle,posts.author"))
            .and(query_param("pageSize", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "next_page": next,
                "results": [
                    { "id": "1", "uid": "a", "first_publication_date": "2021-03-15T19:25:28+0000",
                      "data": { "title": "A", "subtitle": "sa", "author": "Joseph" } },
                    { "id": "2", "uid": "b", "first_publication_date": "2021-03-16T19:25:28+0000",
                      "data": { "title": "B", "subtitle": null, "author": null } }
                ]
            })))
            .mount(&server)
            .await;

        let client = client(&server);
        let query = Query::document_type("posts")
            .fetch(["posts.title", "posts.subtitle", "posts.author"])
            .page_size(2);

        let page = client.query(&query).await.unwrap();
        assert_eq!(page.results.len(), 2);
        assert_eq!(page.next_page, Some(Cursor::new(next)));

        // Reused within its TTL
        client.query(&query).await.unwrap();
    }

    #[tokio::test]
    async fn test_next_page_follows_cursor_verbatim() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v2/documents/search"))
            .and(query_param("page", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "next_page": null,
                "results": [ { "id": "3", "data": { "title": "C" } } ]
            })))
            .mount(&server)
            .await;

        let cursor = Cursor::new(format!(
            "{}/api/v2/documents/search?page=2&ref=master-ref",
            server.uri()
        ));
        let page = client(&server).next_page(&cursor).await.unwrap();
        assert_eq!(page.results[0].id, "3");
        assert!(page.is_last());
    }

    #[tokio::test]
    async fn test_foreign_cursor_is_refused() {
        let server = MockServer::start().await;
        let cursor = Cursor::new("http://169.254.169.254/latest/meta-data");
        let err = client(&server).next_page(&cursor).await.unwrap_err();
        assert!(matches!(err, Error::ForeignCursor { .. }));
        assert!(err.is_network());
    }

    #[tokio::test]
    async fn test_lookalike_cursors_are_refused() {
        let client = PrismicClient::new("https://blog.cdn.prismic.io", None).unwrap();
        for cursor in [
            "https://blog.cdn.prismic.io.evil.com/api/v2/documents/search?page=2",
            "https://blog.cdn.prismic.io@evil.com/api/v2/documents/search?page=2",
            "http://blog.cdn.prismic.io/api/v2/documents/search?page=2",
            "https://blog.cdn.prismic.io:8443/api/v2/documents/search?page=2",
            "not a url",
        ] {
            let err = client.next_page(&Cursor::new(cursor)).await.unwrap_err();
            assert!(
                matches!(err, Error::ForeignCursor { .. }),
                "{} was not refused",
                cursor
            );
        }

        let client = PrismicClient::new("https://blog.cdn.prismic.io/api/v2", None).unwrap();
        let cursor = Cursor::new("https://blog.cdn.prismic.io/api/v2evil/documents/search");
        assert!(!client.owns_cursor(&cursor));
        let cursor = Cursor::new("https://blog.cdn.prismic.io/api/v2/documents/search?page=2");
        assert!(client.owns_cursor(&cursor));
    }

    #[tokio::test]
    async fn test_master_ref_is_resolved_again_after_ttl() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "refs": [ { "ref": "r1", "isMasterRef": true } ]
            })))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/v2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "refs": [ { "ref": "r2", "isMasterRef": true } ]
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/v2/documents/search"))
            .and(query_param("ref", "r1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "next_page": null,
                "results": [ { "id": "1", "data": { "title": "A" } } ]
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/v2/documents/search"))
            .and(query_param("ref", "r2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "next_page": null,
                "results": [
                    { "id": "1", "data": { "title": "A" } },
                    { "id": "2", "data": { "title": "B" } }
                ]
            })))
            .mount(&server)
            .await;

        // A publish happens between the two queries
        let client = client(&server).with_ref_ttl(Duration::ZERO);
        let query = Query::document_type("posts");
        assert_eq!(client.query(&query).await.unwrap().results.len(), 1);
        assert_eq!(client.query(&query).await.unwrap().results.len(), 2);
    }

    #[tokio::test]
    async fn test_error_status_is_network_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let cursor = Cursor::new(format!("{}/api/v2/documents/search?page=2", server.uri()));
        let err = client(&server).next_page(&cursor).await.unwrap_err();
        match err {
            Error::Status { status, url } => {
                assert_eq!(status.as_u16(), 503);
                assert!(!url.contains('?'));
            }
            other => panic!("expected status error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_malformed_body_is_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let cursor = Cursor::new(format!("{}/api/v2/documents/search?page=2", server.uri()));
        let err = client(&server).next_page(&cursor).await.unwrap_err();
        assert!(matches!(err, Error::Decode(_)));
    }

    #[tokio::test]
    async fn test_get_by_uid() {
        let server = MockServer::start().await;
        mount_api_root(&server).await;
        Mock::given(method("GET"))
            .and(path("/api/v2/documents/search"))
            .and(query_param("q", r#"[[at(my.posts.uid, "como-utilizar-hooks")]]"#))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "next_page": null,
                "results": [ { "id": "1", "uid": "como-utilizar-hooks", "data": { "title": "Hooks" } } ]
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/v2/documents/search"))
            .and(query_param("q", r#"[[at(my.posts.uid, "missing")]]"#))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "next_page": null, "results": [] })),
            )
            .mount(&server)
            .await;

        let client = client(&server);
        let post = client.get_by_uid("posts", "como-utilizar-hooks").await.unwrap();
        assert_eq!(post.data.title, "Hooks");

        let err = client.get_by_uid("posts", "missing").await.unwrap_err();
        assert!(matches!(err, Error::NotFound { uid, .. } if uid == "missing"));
    }

    #[tokio::test]
    async fn test_access_token_is_sent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v2"))
            .and(query_param("access_token", "secret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "refs": [ { "ref": "master-ref", "isMasterRef": true } ]
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/v2/documents/search"))
            .and(query_param("access_token", "secret"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "next_page": null, "results": [] })),
            )
            .mount(&server)
            .await;

        let client =
            PrismicClient::new(format!("{}/api/v2", server.uri()), Some("secret".to_string()))
                .unwrap();
        let page = client.query(&Query::document_type("posts")).await.unwrap();
        assert!(page.results.is_empty());
    }
}
