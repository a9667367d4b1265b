//! HTML helper functions

/// Simple HTML escaping for text and attribute values
pub fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Document title in the `Page | Site` form
///
/// # Examples
/// ```ignore
/// page_title("Home", "spacetraveling") // -> "Home | spacetraveling"
/// ```
pub fn page_title(page: &str, site: &str) -> String {
    if page.trim().is_empty() {
        site.to_string()
    } else {
        format!("{} | {}", page.trim(), site)
    }
}
