// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::fmt;

use marquee_model::{Entity, EntityId};
use reqwest::{Client, Response, StatusCode, Url};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::json;

use crate::{Page, Result, SearchBackend, SearchError, SearchQuery};

/// A [`SearchBackend`] that talks to an Elasticsearch cluster over HTTP.
///
/// Each entity kind reads from its own index, named by [`EntityKind::index`]. Status codes map
/// onto [`SearchError`] as follows:
///
/// | Response            | Result                                  |
/// |---------------------|-----------------------------------------|
/// | 2xx                 | decoded documents                       |
/// | 404                 | not found, or no results                |
/// | other 4xx           | [`SearchError::Rejected`]               |
/// | 5xx, transport error| [`SearchError::Unavailable`]            |
///
/// [`EntityKind::index`]: marquee_model::EntityKind::index
#[derive(Clone)]
pub struct ElasticBackend {
    client: Client,
    base_url: Url,
}

impl ElasticBackend {
    /// Creates a backend for the cluster at `base_url` with a default HTTP client.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::InvalidEndpoint`] if `base_url` is not an absolute HTTP(S) URL.
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_client(Client::new(), base_url)
    }

    /// Creates a backend that sends requests through `client`.
    ///
    /// Use this to share a connection pool or to configure request timeouts.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::InvalidEndpoint`] if `base_url` is not an absolute HTTP(S) URL.
    pub fn with_client(client: Client, base_url: &str) -> Result<Self> {
        let parsed = Url::parse(base_url).map_err(|_parse_error| SearchError::InvalidEndpoint(base_url.to_owned()))?;
        if parsed.cannot_be_a_base() || !matches!(parsed.scheme(), "http" | "https") {
            return Err(SearchError::InvalidEndpoint(base_url.to_owned()));
        }

        Ok(Self {
            client,
            base_url: parsed,
        })
    }

    /// Returns the cluster base URL.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| SearchError::InvalidEndpoint(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

impl fmt::Debug for ElasticBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ElasticBackend")
            .field("base_url", &self.base_url.as_str())
            .finish_non_exhaustive()
    }
}

impl<E: Entity> SearchBackend<E> for ElasticBackend {
    async fn get_by_id(&self, id: &EntityId) -> Result<Option<E>> {
        let url = self.endpoint(&[E::KIND.index(), "_doc", id.as_str()])?;
        let response = self.client.get(url).send().await.map_err(SearchError::unavailable)?;

        match body(response).await? {
            Some(bytes) => parse_get(&bytes),
            None => Ok(None),
        }
    }

    async fn bulk_get_by_ids(&self, ids: &[EntityId]) -> Result<Vec<E>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let url = self.endpoint(&[E::KIND.index(), "_mget"])?;
        let response = self
            .client
            .post(url)
            .json(&json!({ "ids": ids }))
            .send()
            .await
            .map_err(SearchError::unavailable)?;

        match body(response).await? {
            Some(bytes) => parse_mget(&bytes),
            None => Ok(Vec::new()),
        }
    }

    async fn search(&self, query: &SearchQuery, page: Page) -> Result<Vec<E>> {
        let url = self.endpoint(&[E::KIND.index(), "_search"])?;
        let response = self
            .client
            .post(url)
            .json(&query.to_elastic(page))
            .send()
            .await
            .map_err(SearchError::unavailable)?;

        match body(response).await? {
            Some(bytes) => parse_search(&bytes),
            None => Ok(Vec::new()),
        }
    }
}

/// Reads a response body, mapping the status onto the backend's error model.
///
/// Returns `Ok(None)` for 404.
async fn body(response: Response) -> Result<Option<Vec<u8>>> {
    let status = response.status();

    if status == StatusCode::NOT_FOUND {
        return Ok(None);
    }

    let bytes = response.bytes().await.map_err(SearchError::unavailable)?;

    if status.is_success() {
        Ok(Some(bytes.to_vec()))
    } else if status.is_client_error() {
        Err(SearchError::rejected(Some(status.as_u16()), error_reason(&bytes)))
    } else {
        Err(SearchError::unavailable(format!("{status}: {}", error_reason(&bytes))))
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ErrorDetail {
    Structured { reason: String },
    Plain(String),
}

fn error_reason(bytes: &[u8]) -> String {
    match serde_json::from_slice::<ErrorBody>(bytes) {
        Ok(ErrorBody {
            error: ErrorDetail::Structured { reason } | ErrorDetail::Plain(reason),
        }) => reason,
        Err(_) => String::from_utf8_lossy(bytes).into_owned(),
    }
}

#[derive(Deserialize)]
struct Document<E> {
    #[serde(default)]
    found: bool,
    #[serde(rename = "_source")]
    source: Option<E>,
}

impl<E> Document<E> {
    fn into_source(self) -> Option<E> {
        if self.found { self.source } else { None }
    }
}

#[derive(Deserialize)]
struct MultiGet<E> {
    docs: Vec<Document<E>>,
}

#[derive(Deserialize)]
struct SearchHits<E> {
    hits: HitList<E>,
}

#[derive(Deserialize)]
struct HitList<E> {
    hits: Vec<Hit<E>>,
}

#[derive(Deserialize)]
struct Hit<E> {
    #[serde(rename = "_source")]
    source: E,
}

fn parse_get<E: DeserializeOwned>(bytes: &[u8]) -> Result<Option<E>> {
    Ok(serde_json::from_slice::<Document<E>>(bytes)?.into_source())
}

fn parse_mget<E: DeserializeOwned>(bytes: &[u8]) -> Result<Vec<E>> {
    let response: MultiGet<E> = serde_json::from_slice(bytes)?;
    Ok(response.docs.into_iter().filter_map(Document::into_source).collect())
}

fn parse_search<E: DeserializeOwned>(bytes: &[u8]) -> Result<Vec<E>> {
    let response: SearchHits<E> = serde_json::from_slice(bytes)?;
    Ok(response.hits.hits.into_iter().map(|hit| hit.source).collect())
}

#[cfg(test)]
mod tests {
    use marquee_model::{Film, Person};

    use super::*;

    #[test]
    fn rejects_unusable_base_urls() {
        assert!(matches!(ElasticBackend::new("not a url"), Err(SearchError::InvalidEndpoint(_))));
        assert!(matches!(
            ElasticBackend::new("mailto:search@example.com"),
            Err(SearchError::InvalidEndpoint(_))
        ));
        assert!(ElasticBackend::new("http://localhost:9200").is_ok());
    }

    #[test]
    fn endpoints_are_appended_to_base_path() {
        let backend = ElasticBackend::new("http://search.internal:9200/es/").unwrap();
        let url = backend.endpoint(&["movies", "_doc", "a/b"]).unwrap();
        assert_eq!(url.as_str(), "http://search.internal:9200/es/movies/_doc/a%2Fb");
    }

    #[test]
    fn get_found_and_missing() {
        let found = br#"{"_index":"movies","_id":"f1","found":true,"_source":{"id":"f1","title":"Alien"}}"#;
        let missing = br#"{"_index":"movies","_id":"f2","found":false}"#;

        let film: Option<Film> = parse_get(found).unwrap();
        assert_eq!(film.unwrap().title, "Alien");
        assert!(parse_get::<Film>(missing).unwrap().is_none());
    }

    #[test]
    fn mget_skips_missing_documents() {
        let body = br#"{"docs":[
            {"_id":"p1","found":true,"_source":{"id":"p1","full_name":"June Laverick"}},
            {"_id":"p2","found":false},
            {"_id":"p3","found":true,"_source":{"id":"p3","full_name":"Ivan Li"}}
        ]}"#;

        let persons: Vec<Person> = parse_mget(body).unwrap();
        let names: Vec<_> = persons.iter().map(|p| p.full_name.as_str()).collect();
        assert_eq!(names, ["June Laverick", "Ivan Li"]);
    }

    #[test]
    fn search_hits_in_order() {
        let body = br#"{"took":3,"hits":{"total":{"value":2},"hits":[
            {"_id":"f2","_score":2.0,"_source":{"id":"f2","title":"Aliens"}},
            {"_id":"f1","_score":1.0,"_source":{"id":"f1","title":"Alien"}}
        ]}}"#;

        let films: Vec<Film> = parse_search(body).unwrap();
        let ids: Vec<_> = films.iter().map(|f| f.id.as_str()).collect();
        assert_eq!(ids, ["f2", "f1"]);
    }

    #[test]
    fn malformed_documents_are_invalid_responses() {
        let body = br#"{"hits":{"hits":[{"_source":{"title":"no id"}}]}}"#;
        assert!(matches!(parse_search::<Film>(body), Err(SearchError::InvalidResponse(_))));
    }

    fn response(status: u16, body: &'static str) -> Response {
        Response::from(http::Response::builder().status(status).body(body).unwrap())
    }

    #[tokio::test]
    async fn not_found_is_no_body() {
        let bytes = body(response(404, r#"{"_index":"movies","found":false}"#)).await.unwrap();
        assert!(bytes.is_none());
    }

    #[tokio::test]
    async fn success_returns_body() {
        let bytes = body(response(200, r#"{"docs":[]}"#)).await.unwrap();
        assert_eq!(bytes.as_deref(), Some(br#"{"docs":[]}"#.as_slice()));
    }

    #[tokio::test]
    async fn client_errors_are_rejected() {
        let error = body(response(400, r#"{"error":{"reason":"bad"},"status":400}"#))
            .await
            .unwrap_err();

        match error {
            SearchError::Rejected { status, reason } => {
                assert_eq!(status, Some(400));
                assert_eq!(reason, "bad");
            }
            other => panic!("expected a rejection, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn server_errors_are_unavailable() {
        let error = body(response(503, "down")).await.unwrap_err();

        assert!(error.is_transient());
        match error {
            SearchError::Unavailable(cause) => assert_eq!(cause.to_string(), "503 Service Unavailable: down"),
            other => panic!("expected unavailable, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn empty_bulk_get_sends_nothing() {
        // Nothing listens here; any request would fail.
        let backend = ElasticBackend::new("http://192.0.2.1:9").unwrap();

        let films: Vec<Film> = backend.bulk_get_by_ids(&[]).await.unwrap();
        assert!(films.is_empty());
    }

    #[test]
    fn error_reasons() {
        assert_eq!(
            error_reason(br#"{"error":{"type":"parsing_exception","reason":"unknown query [bogus]"},"status":400}"#),
            "unknown query [bogus]"
        );
        assert_eq!(error_reason(br#"{"error":"Incorrect HTTP method"}"#), "Incorrect HTTP method");
        assert_eq!(error_reason(b"gateway down"), "gateway down");
    }
}
