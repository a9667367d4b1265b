//! Props for the listing and detail pages
//!
//! A host pulls props from a [`DataProvider`] whenever it (re)generates a
//! page. Each result carries the staleness budget the host should honour.

use serde::Serialize;
use std::collections::HashSet;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::config::SiteConfig;
use crate::content::{format_post_detail, Cursor, PostDetail};
use crate::error::Result;
use crate::helpers::DateFormatter;
use crate::prismic::{ContentRepository, Query};
use crate::session::PostPagination;

/// Page props plus how long they may be served before refetching
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StaticProps<T> {
    pub props: T,
    #[serde(with = "seconds")]
    pub revalidate: Duration,
}

mod seconds {
    use serde::Serializer;
    use std::time::Duration;

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(duration.as_secs())
    }
}

/// Fetches and formats page props from a content repository
pub struct DataProvider<R> {
    repo: R,
    config: SiteConfig,
    dates: DateFormatter,
}

impl<R: ContentRepository> DataProvider<R> {
    pub fn new(repo: R, config: SiteConfig) -> Result<Self> {
        let dates = DateFormatter::from_config(&config)?;
        Ok(Self {
            repo,
            config,
            dates,
        })
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    pub fn dates(&self) -> &DateFormatter {
        &self.dates
    }

    pub fn config(&self) -> &SiteConfig {
        &self.config
    }

    /// The listing query: posts with only the listing fields, one page
    pub fn listing_query(&self) -> Query {
        let prismic = &self.config.prismic;
        Query::document_type(&prismic.document_type)
            .fetch(prismic.projected_fields())
            .page_size(prismic.page_size)
    }

    /// First page of the listing
    pub async fn home_props(&self) -> Result<StaticProps<PostPagination>> {
        let page = self.repo.query(&self.listing_query()).await?;
        let props = PostPagination::from_page(&page, &self.dates)?;
        debug!(
            posts = props.results.len(),
            more = props.next_page.is_some(),
            "Loaded home props"
        );

        Ok(StaticProps {
            props,
            revalidate: self.config.revalidate.listing(),
        })
    }

    /// The page a listing cursor points to, formatted
    pub async fn more_posts(&self, cursor: &Cursor) -> Result<PostPagination> {
        let page = self.repo.next_page(cursor).await?;
        PostPagination::from_page(&page, &self.dates)
    }

    /// Uid of every post, following the listing to its end. A cursor seen
    /// twice ends the walk.
    pub async fn post_paths(&self) -> Result<Vec<String>> {
        let query = Query::document_type(&self.config.prismic.document_type);
        let mut page = self.repo.query(&query).await?;
        let mut uids = Vec::new();
        let mut seen = HashSet::new();

        loop {
            uids.extend(page.results.iter().filter_map(|post| post.uid.clone()));
            match page.next_page.take() {
                Some(cursor) if !seen.insert(cursor.as_str().to_string()) => {
                    warn!("Listing cursor {} repeats, stopping", cursor);
                    break;
                }
                Some(cursor) => page = self.repo.next_page(&cursor).await?,
                None => break,
            }
        }

        info!("Found {} post paths", uids.len());
        Ok(uids)
    }

    /// Detail page props for `slug`
    pub async fn post_props(&self, slug: &str) -> Result<StaticProps<PostDetail>> {
        let post = self
            .repo
            .get_by_uid(&self.config.prismic.document_type, slug)
            .await?;
        let props = format_post_detail(
            &post,
            &self.dates,
            self.config.reading.words_per_minute,
        )?;

        Ok(StaticProps {
            props,
            revalidate: self.config.revalidate.post(),
        })
    }
}
