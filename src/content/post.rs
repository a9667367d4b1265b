//! Raw post documents as returned by the content repository

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

use super::rich_text::RichText;

/// Treats an explicit JSON `null` the same as a missing field
pub(super) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// A post document before normalization
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawPost {
    /// Repository-wide document id
    pub id: String,

    /// Slug used for routing to the detail page
    #[serde(default)]
    pub uid: Option<String>,

    /// First publication timestamp (ISO-8601)
    #[serde(default)]
    pub first_publication_date: Option<String>,

    #[serde(default)]
    pub data: PostData,
}

/// Custom fields of a post document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PostData {
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,

    #[serde(default)]
    pub subtitle: Option<String>,

    #[serde(default)]
    pub author: Option<String>,

    #[serde(default)]
    pub banner: Option<Banner>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub content: Vec<ContentBlock>,
}

/// Banner image; an empty image field arrives as `{}`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Banner {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub alt: Option<String>,
}

/// One section of a post body
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContentBlock {
    #[serde(default, deserialize_with = "null_as_default")]
    pub heading: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub body: RichText,
}

impl RawPost {
    /// Banner URL, if the banner field is filled in
    pub fn banner_url(&self) -> Option<&str> {
        self.data
            .banner
            .as_ref()
            .and_then(|b| b.url.as_deref())
            .filter(|url| !url.is_empty())
    }
}

/// Opaque token pointing at the next page of a listing query
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cursor(String);

impl Cursor {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One page of a listing query
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Page {
    #[serde(default, deserialize_with = "null_as_default")]
    pub results: Vec<RawPost>,

    /// Absent once the listing is exhausted
    #[serde(default)]
    pub next_page: Option<Cursor>,
}

impl Page {
    pub fn is_last(&self) -> bool {
        self.next_page.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_search_response() {
        let json = r#"{
            "page": 1,
            "results_per_page": 2,
            "next_page": "https://blog.cdn.prismic.io/api/v2/documents/search?page=2",
            "results": [
                {
                    "id": "YFx",
                    "uid": "como-utilizar-hooks",
                    "type": "posts",
                    "first_publication_date": "2021-03-15T19:25:28+0000",
                    "data": {
                        "title": "Como utilizar Hooks",
                        "subtitle": "Pensando em sincronização em vez de ciclos de vida",
                        "author": "Joseph Oliveira"
                    }
                },
                {
                    "id": "YFy",
                    "uid": null,
                    "first_publication_date": null,
                    "data": { "title": null, "author": null, "banner": {}, "content": null }
                }
            ]
        }"#;

        let page: Page = serde_json::from_str(json).unwrap();
        assert_eq!(page.results.len(), 2);
        assert_eq!(
            page.next_page.as_ref().map(Cursor::as_str),
            Some("https://blog.cdn.prismic.io/api/v2/documents/search?page=2")
        );

        let first = &page.results[0];
        assert_eq!(first.uid.as_deref(), Some("como-utilizar-hooks"));
        assert_eq!(first.data.author.as_deref(), Some("Joseph Oliveira"));
        assert!(first.data.content.is_empty());

        let second = &page.results[1];
        assert_eq!(second.first_publication_date, None);
        assert_eq!(second.data.title, "");
        assert_eq!(second.data.author, None);
        assert_eq!(second.banner_url(), None);
    }

    #[test]
    fn test_null_next_page_marks_last_page() {
        let page: Page = serde_json::from_str(r#"{"results": [], "next_page": null}"#).unwrap();
        assert!(page.is_last());
    }

    #[test]
    fn test_banner_url() {
        let json = r#"{
            "id": "1",
            "data": {
                "title": "t",
                "banner": { "url": "https://images.prismic.io/banner.png", "alt": null }
            }
        }"#;
        let post: RawPost = serde_json::from_str(json).unwrap();
        assert_eq!(
            post.banner_url(),
            Some("https://images.prismic.io/banner.png")
        );
    }
}
