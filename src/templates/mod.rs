//! Built-in page templates using the Tera template engine
//!
//! Templates are embedded in the binary. Text coming from the repository is
//! escaped; rendered rich text is marked `safe` where it is inserted.

use serde::Serialize;
use std::collections::HashMap;
use tera::{Context, Tera};

use crate::config::SiteConfig;
use crate::content::PostDetail;
use crate::error::Result;
use crate::helpers::{escape_html, more_posts_url, page_title, post_path};
use crate::session::PostPagination;

/// Template renderer with the embedded blog theme
pub struct TemplateRenderer {
    tera: Tera,
}

impl TemplateRenderer {
    /// Create a new renderer with all templates loaded
    pub fn new() -> Result<Self> {
        let mut tera = Tera::default();
        tera.set_escape_fn(escape_html);

        tera.add_raw_templates(vec![
            ("layout.html", include_str!("layout.html")),
            ("index.html", include_str!("index.html")),
            ("post.html", include_str!("post.html")),
            ("not_found.html", include_str!("not_found.html")),
            (
                "partials/header.html",
                include_str!("partials/header.html"),
            ),
            (
                "partials/post_item.html",
                include_str!("partials/post_item.html"),
            ),
        ])?;

        tera.register_filter("post_path", post_path_filter);
        tera.register_filter("more_url", more_url_filter);

        Ok(Self { tera })
    }

    /// Render a template with given context
    pub fn render(&self, template_name: &str, context: &Context) -> Result<String> {
        Ok(self.tera.render(template_name, context)?)
    }

    /// The listing page. `live` enables the load-more button, which needs
    /// the server's JSON endpoint.
    pub fn render_home(
        &self,
        config: &SiteConfig,
        pagination: &PostPagination,
        live: bool,
    ) -> Result<String> {
        let mut context = base_context(config, &page_title("Home", &config.title));
        context.insert("pagination", pagination);
        context.insert("live", &live);
        self.render("index.html", &context)
    }

    pub fn render_post(&self, config: &SiteConfig, post: &PostDetail) -> Result<String> {
        let mut context = base_context(config, &page_title(&post.title, &config.title));
        context.insert("post", post);
        self.render("post.html", &context)
    }

    pub fn render_not_found(&self, config: &SiteConfig, message: &str) -> Result<String> {
        let mut context = base_context(config, &page_title("404", &config.title));
        context.insert("message", message);
        self.render("not_found.html", &context)
    }
}

fn base_context(config: &SiteConfig, title: &str) -> Context {
    let mut context = Context::new();
    context.insert("site", &SiteData::from(config));
    context.insert("page_title", title);
    context
}

/// Tera filter: uid to detail page path
fn post_path_filter(
    value: &tera::Value,
    _args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let uid = tera::try_get_value!("post_path", "value", Option<String>, value);
    Ok(tera::Value::String(match uid {
        Some(uid) => post_path(&uid),
        None => "#".to_string(),
    }))
}

/// Tera filter: cursor to load-more endpoint
fn more_url_filter(
    value: &tera::Value,
    _args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let cursor = tera::try_get_value!("more_url", "value", String, value);
    Ok(tera::Value::String(more_posts_url(&cursor)))
}

/// Site-wide values available to every template
#[derive(Debug, Clone, Serialize)]
pub struct SiteData {
    pub title: String,
    pub language: String,
    pub load_more_label: String,
    pub loading_label: String,
}

impl From<&SiteConfig> for SiteData {
    fn from(config: &SiteConfig) -> Self {
        Self {
            title: config.title.clone(),
            language: config.language.clone(),
            load_more_label: config.load_more_label.clone(),
            loading_label: config.loading_label.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{Cursor, FormattedPost, Section};

    fn pagination(next_page: Option<&str>) -> PostPagination {
        PostPagination {
            results: vec![FormattedPost {
                id: "1".to_string(),
                uid: Some("como-utilizar-hooks".to_string()),
                first_publication_date: "15 mar 2021".to_string(),
                title: "Como utilizar <Hooks>".to_string(),
                subtitle: None,
                author: "Joseph Oliveira".to_string(),
            }],
            next_page: next_page.map(Cursor::new),
        }
    }

    #[test]
    fn test_render_home() {
        let renderer = TemplateRenderer::new().unwrap();
        let html = renderer
            .render_home(&SiteConfig::default(), &pagination(Some("https://x.io/p2")), true)
            .unwrap();

        assert!(html.contains("<title>Home | spacetraveling</title>"));
        assert!(html.contains(r#"href="/post/como-utilizar-hooks""#));
        assert!(html.contains("Como utilizar &lt;Hooks&gt;"));
        assert!(html.contains("15 mar 2021"));
        assert!(html.contains("Carregar mais posts"));
        assert!(html.contains("/api/posts?cursor=https%3A%2F%2Fx%2Eio%2Fp2"));
    }

    #[test]
    fn test_load_more_hidden_when_exhausted_or_static() {
        let renderer = TemplateRenderer::new().unwrap();
        let config = SiteConfig::default();

        let exhausted = renderer.render_home(&config, &pagination(None), true).unwrap();
        assert!(!exhausted.contains("load-more"));

        let static_page = renderer
            .render_home(&config, &pagination(Some("https://x.io/p2")), false)
            .unwrap();
        assert!(!static_page.contains("load-more"));
    }

    #[test]
    fn test_render_post() {
        let renderer = TemplateRenderer::new().unwrap();
        let post = PostDetail {
            id: "1".to_string(),
            uid: Some("como-utilizar-hooks".to_string()),
            title: "Como utilizar Hooks".to_string(),
            banner_url: None,
            author: "Unknown".to_string(),
            created_at: "15 mar 2021".to_string(),
            reading_time: 4,
            sections: vec![Section {
                heading: "Proin et varius".to_string(),
                html: "<p><strong>Lorem</strong> ipsum</p>".to_string(),
                text: "Lorem ipsum".to_string(),
            }],
        };
        let html = renderer.render_post(&SiteConfig::default(), &post).unwrap();

        assert!(html.contains("<title>Como utilizar Hooks | spacetraveling</title>"));
        assert!(html.contains("4 min"));
        assert!(html.contains("<p><strong>Lorem</strong> ipsum</p>"));
        assert!(!html.contains("banner"));
    }

    #[test]
    fn test_render_not_found() {
        let renderer = TemplateRenderer::new().unwrap();
        let html = renderer
            .render_not_found(&SiteConfig::default(), "Post not found")
            .unwrap();
        assert!(html.contains("<h1>404</h1>"));
        assert!(html.contains("Post not found"));
    }
}
