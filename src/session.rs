//! Listing pagination session
//!
//! A session owns the posts displayed so far and the cursor of the next
//! page. More posts can only be requested while a cursor is present, and a
//! request borrows the session mutably until it settles, so two loads can
//! never interleave on the same session.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::content::{format_posts, Cursor, FormattedPost, Page};
use crate::error::Result;
use crate::helpers::DateFormatter;
use crate::prismic::ContentRepository;

/// Immutable view of a listing: posts plus the cursor of the next page
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PostPagination {
    pub results: Vec<FormattedPost>,
    pub next_page: Option<Cursor>,
}

impl PostPagination {
    /// Format a raw page
    pub fn from_page(page: &Page, dates: &DateFormatter) -> Result<Self> {
        Ok(Self {
            results: format_posts(&page.results, dates)?,
            next_page: page.next_page.clone(),
        })
    }
}

/// Displayed posts and cursor of one listing view
#[derive(Debug, Clone, Default)]
pub struct PaginationSession {
    posts: Vec<FormattedPost>,
    next_page: Option<Cursor>,
}

impl PaginationSession {
    pub fn new(initial: PostPagination) -> Self {
        Self {
            posts: initial.results,
            next_page: initial.next_page,
        }
    }

    pub fn posts(&self) -> &[FormattedPost] {
        &self.posts
    }

    pub fn next_page(&self) -> Option<&Cursor> {
        self.next_page.as_ref()
    }

    pub fn has_more(&self) -> bool {
        self.next_page.is_some()
    }

    pub fn snapshot(&self) -> PostPagination {
        PostPagination {
            results: self.posts.clone(),
            next_page: self.next_page.clone(),
        }
    }

    /// Offer to load the next page; `None` once the listing is exhausted
    pub fn load_more(&mut self) -> Option<LoadMore<'_>> {
        let cursor = self.next_page.clone()?;
        Some(LoadMore {
            session: self,
            cursor,
        })
    }
}

/// A pending request for the next page of a session
#[derive(Debug)]
pub struct LoadMore<'a> {
    session: &'a mut PaginationSession,
    cursor: Cursor,
}

impl LoadMore<'_> {
    pub fn cursor(&self) -> &Cursor {
        &self.cursor
    }

    /// Fetch and format the next page, then append it.
    ///
    /// On error the session is left exactly as it was. Dropping the future
    /// before it completes discards the page.
    pub async fn fetch<R>(self, repo: &R, dates: &DateFormatter) -> Result<usize>
    where
        R: ContentRepository + ?Sized,
    {
        let page = repo.next_page(&self.cursor).await?;
        let formatted = format_posts(&page.results, dates)?;

        let count = formatted.len();
        self.session.posts.extend(formatted);
        self.session.next_page = page.next_page;

        debug!(
            loaded = count,
            total = self.session.posts.len(),
            more = self.session.has_more(),
            "Appended next page"
        );
        Ok(count)
    }
}
