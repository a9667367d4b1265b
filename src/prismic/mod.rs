//! Content repository access
//!
//! [`ContentRepository`] is the seam between the blog and its headless CMS.
//! [`PrismicClient`] implements it against the Prismic REST API v2.

mod client;

use async_trait::async_trait;

use crate::content::{Cursor, Page, RawPost};
use crate::error::Result;

pub use client::{PrismicClient, DEFAULT_REF_TTL};

/// A source of post documents
#[async_trait]
pub trait ContentRepository: Send + Sync {
    /// Run a listing query and return its first page
    async fn query(&self, query: &Query) -> Result<Page>;

    /// Fetch the page a cursor returned by an earlier page points to
    async fn next_page(&self, cursor: &Cursor) -> Result<Page>;

    /// Look up a single document by its uid
    async fn get_by_uid(&self, doc_type: &str, uid: &str) -> Result<RawPost>;
}

/// A query predicate (`[at(document.type, "posts")]`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Predicate {
    name: &'static str,
    path: String,
    value: String,
}

impl Predicate {
    /// Field at `path` equals `value`
    pub fn at(path: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: "at",
            path: path.into(),
            value: value.into(),
        }
    }

    fn render(&self) -> String {
        let escaped = self.value.replace('\\', "\\\\").replace('"', "\\\"");
        format!("[{}({}, \"{}\")]", self.name, self.path, escaped)
    }
}

/// A listing query: predicates, field projection and page size
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    predicates: Vec<Predicate>,
    fetch: Vec<String>,
    page_size: Option<usize>,
}

impl Query {
    pub fn new(predicates: Vec<Predicate>) -> Self {
        Self {
            predicates,
            ..Self::default()
        }
    }

    /// All documents of one custom type
    pub fn document_type(doc_type: &str) -> Self {
        Self::new(vec![Predicate::at("document.type", doc_type)])
    }

    /// Only return the listed fields (`posts.title`)
    pub fn fetch<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fetch = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn page_size(mut self, page_size: usize) -> Self {
        self.page_size = Some(page_size);
        self
    }

    /// The `q` parameter: every predicate inside one pair of brackets
    pub fn predicates_param(&self) -> String {
        let inner: String = self.predicates.iter().map(Predicate::render).collect();
        format!("[{}]", inner)
    }

    /// Query-string parameters for the search endpoint
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![("q", self.predicates_param())];
        if !self.fetch.is_empty() {
            params.push(("fetch", self.fetch.join(",")));
        }
        if let Some(page_size) = self.page_size {
            params.push(("pageSize", page_size.to_string()));
        }
        params
    }
}
