//! Normalization of raw posts into display models

use serde::{Deserialize, Serialize};

use super::post::RawPost;
use super::reading::reading_time;
use crate::error::Result;
use crate::helpers::DateFormatter;

/// Author shown when a post has none
pub const UNKNOWN_AUTHOR: &str = "Unknown";

/// A post as shown in the listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormattedPost {
    pub id: String,
    pub uid: Option<String>,
    /// Localized publication date ("25 mar 2021")
    pub first_publication_date: String,
    pub title: String,
    pub subtitle: Option<String>,
    pub author: String,
}

/// A post as shown on its detail page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostDetail {
    pub id: String,
    pub uid: Option<String>,
    pub title: String,
    pub banner_url: Option<String>,
    pub author: String,
    pub created_at: String,
    /// Minutes
    pub reading_time: usize,
    pub sections: Vec<Section>,
}

/// One rendered content block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub heading: String,
    pub html: String,
    /// Plain text, one line per block
    pub text: String,
}

fn author_or_unknown(author: Option<&str>) -> String {
    match author.map(str::trim) {
        Some(author) if !author.is_empty() => author.to_string(),
        _ => UNKNOWN_AUTHOR.to_string(),
    }
}

/// Format one post for the listing
pub fn format_post(post: &RawPost, dates: &DateFormatter) -> Result<FormattedPost> {
    let first_publication_date =
        dates.format_publication(&post.id, post.first_publication_date.as_deref())?;

    Ok(FormattedPost {
        id: post.id.clone(),
        uid: post.uid.clone(),
        first_publication_date,
        title: post.data.title.trim().to_string(),
        subtitle: post.data.subtitle.clone(),
        author: author_or_unknown(post.data.author.as_deref()),
    })
}

/// Format a sequence of posts, preserving order.
///
/// The first post that cannot be formatted fails the whole batch.
pub fn format_posts(posts: &[RawPost], dates: &DateFormatter) -> Result<Vec<FormattedPost>> {
    posts.iter().map(|post| format_post(post, dates)).collect()
}

/// Build the detail page model of a post
pub fn format_post_detail(
    post: &RawPost,
    dates: &DateFormatter,
    words_per_minute: usize,
) -> Result<PostDetail> {
    let created_at = dates.format_publication(&post.id, post.first_publication_date.as_deref())?;

    let sections = post
        .data
        .content
        .iter()
        .map(|block| Section {
            heading: block.heading.clone(),
            html: block.body.as_html(),
            text: block.body.as_text_lines(),
        })
        .collect();

    Ok(PostDetail {
        id: post.id.clone(),
        uid: post.uid.clone(),
        title: post.data.title.trim().to_string(),
        banner_url: post.banner_url().map(str::to_string),
        author: author_or_unknown(post.data.author.as_deref()),
        created_at,
        reading_time: reading_time(&post.data.content, words_per_minute),
        sections,
    })
}
