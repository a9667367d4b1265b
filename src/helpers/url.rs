//! URL helper functions

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS, NON_ALPHANUMERIC};

/// Characters escaped inside a single path segment
const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'&')
    .add(b'\'')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Path of a post detail page
///
/// # Examples
/// ```ignore
/// post_path("como-utilizar-hooks") // -> "/post/como-utilizar-hooks"
/// ```
pub fn post_path(uid: &str) -> String {
    format!("/post/{}", utf8_percent_encode(uid, SEGMENT))
}

/// URL of the JSON endpoint returning the page a cursor points to
pub fn more_posts_url(cursor: &str) -> String {
    format!(
        "/api/posts?cursor={}",
        utf8_percent_encode(cursor, NON_ALPHANUMERIC)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_post_path() {
        assert_eq!(post_path("como-utilizar-hooks"), "/post/como-utilizar-hooks");
        assert_eq!(post_path("a b/c"), "/post/a%20b%2Fc");
    }

    #[test]
    fn test_more_posts_url() {
        assert_eq!(
            more_posts_url("https://x.io/api?page=2&a=b"),
            "/api/posts?cursor=https%3A%2F%2Fx%2Eio%2Fapi%3Fpage%3D2%26a%3Db"
        );
    }
}
