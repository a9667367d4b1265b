//! Test fixtures: sample posts and an in-memory repository

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

use super::{Cursor, Page, PostData, RawPost};
use crate::error::{Error, Result};
use crate::prismic::{ContentRepository, Query};

pub fn raw_post(id: &str, date: &str) -> RawPost {
    RawPost {
        id: id.to_string(),
        uid: Some(format!("post-{}", id)),
        first_publication_date: Some(date.to_string()),
        data: PostData {
            title: format!("Post {}", id),
            subtitle: Some(format!("Subtitle {}", id)),
            author: Some("Joseph Oliveira".to_string()),
            ..PostData::default()
        },
    }
}

pub fn page(ids: &[&str], next_page: Option<&str>) -> Page {
    Page {
        results: ids
            .iter()
            .map(|id| raw_post(id, "2021-03-25T00:00:00Z"))
            .collect(),
        next_page: next_page.map(Cursor::new),
    }
}

/// Serves a first page plus pages keyed by cursor.
///
/// Unknown cursors that look like URLs are refused as foreign; other
/// unknown cursors fail like an unreachable server.
#[derive(Default)]
pub struct MockRepository {
    pub first: Page,
    pub pages: HashMap<String, Page>,
    pub documents: Vec<RawPost>,
    pub queries: Mutex<Vec<Query>>,
}

impl MockRepository {
    pub fn with_pages(first: Page, pages: Vec<(&str, Page)>) -> Self {
        Self {
            first,
            pages: pages
                .into_iter()
                .map(|(cursor, page)| (cursor.to_string(), page))
                .collect(),
            ..Self::default()
        }
    }
}

#[async_trait]
impl ContentRepository for MockRepository {
    async fn query(&self, query: &Query) -> Result<Page> {
        self.queries.lock().unwrap().push(query.clone());
        Ok(self.first.clone())
    }

    async fn next_page(&self, cursor: &Cursor) -> Result<Page> {
        if let Some(page) = self.pages.get(cursor.as_str()) {
            return Ok(page.clone());
        }
        if cursor.as_str().contains("://") {
            return Err(Error::ForeignCursor {
                endpoint: "mock".to_string(),
            });
        }
        Err(Error::Status {
            status: reqwest::StatusCode::SERVICE_UNAVAILABLE,
            url: cursor.to_string(),
        })
    }

    async fn get_by_uid(&self, doc_type: &str, uid: &str) -> Result<RawPost> {
        self.documents
            .iter()
            .find(|post| post.uid.as_deref() == Some(uid))
            .cloned()
            .ok_or_else(|| Error::NotFound {
                doc_type: doc_type.to_string(),
                uid: uid.to_string(),
            })
    }
}
