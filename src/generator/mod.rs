//! Generator module - writes the listing and every post page as static HTML

use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};

use crate::prismic::ContentRepository;
use crate::provider::DataProvider;
use crate::templates::TemplateRenderer;

/// What a generation run produced
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Summary {
    pub posts: usize,
    pub skipped: Vec<String>,
}

/// Static site generator using Tera templates
pub struct Generator<'a, R> {
    provider: &'a DataProvider<R>,
    renderer: TemplateRenderer,
    public_dir: PathBuf,
}

impl<'a, R: ContentRepository> Generator<'a, R> {
    /// Create a new generator
    pub fn new(provider: &'a DataProvider<R>, public_dir: impl Into<PathBuf>) -> Result<Self> {
        Ok(Self {
            provider,
            renderer: TemplateRenderer::new()?,
            public_dir: public_dir.into(),
        })
    }

    /// Generate the entire site.
    ///
    /// The listing and the path list must load; a post that fails to load
    /// or render is skipped with a warning.
    pub async fn generate(&self) -> Result<Summary> {
        fs::create_dir_all(&self.public_dir)?;

        self.generate_index_page().await?;
        self.generate_not_found_page()?;

        let mut summary = Summary::default();
        for slug in self.provider.post_paths().await? {
            if !is_safe_slug(&slug) {
                tracing::warn!("Skipping post with unsafe uid {:?}", slug);
                summary.skipped.push(slug);
                continue;
            }

            match self.generate_post_page(&slug).await {
                Ok(()) => summary.posts += 1,
                Err(e) => {
                    tracing::warn!("Skipping post {}: {}", slug, e);
                    summary.skipped.push(slug);
                }
            }
        }

        Ok(summary)
    }

    /// Generate the listing's first page; without a server there is no
    /// load-more endpoint, so the button is left out
    async fn generate_index_page(&self) -> Result<()> {
        let home = self.provider.home_props().await?;
        let html = self
            .renderer
            .render_home(self.provider.config(), &home.props, false)?;
        write_page(&self.public_dir.join("index.html"), &html)
    }

    async fn generate_post_page(&self, slug: &str) -> Result<()> {
        let detail = self.provider.post_props(slug).await?;
        let html = self
            .renderer
            .render_post(self.provider.config(), &detail.props)?;
        write_page(
            &self.public_dir.join("post").join(slug).join("index.html"),
            &html,
        )
    }

    fn generate_not_found_page(&self) -> Result<()> {
        let html = self
            .renderer
            .render_not_found(self.provider.config(), "Page not found")?;
        write_page(&self.public_dir.join("404.html"), &html)
    }
}

fn write_page(output_path: &Path, html: &str) -> Result<()> {
    if let Some(parent) = output_path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(output_path, html)?;
    tracing::debug!("Generated: {:?}", output_path);
    Ok(())
}

/// A uid usable as a single directory name under `public/post`
fn is_safe_slug(slug: &str) -> bool {
    !slug.is_empty()
        && !slug.starts_with('.')
        && !slug.contains(['/', '\\', '\0'])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteConfig;
    use crate::content::fixtures::{page, raw_post, MockRepository};
    use tempfile::TempDir;

    fn provider(repo: MockRepository) -> DataProvider<MockRepository> {
        DataProvider::new(repo, SiteConfig::default()).unwrap()
    }

    #[tokio::test]
    async fn test_generate_writes_listing_and_posts() {
        let temp = TempDir::new().unwrap();
        let mut repo = MockRepository::with_pages(
            page(&["1", "2"], Some("p2")),
            vec![("p2", page(&["3"], None))],
        );
        repo.documents = vec![
            raw_post("1", "2021-03-25T00:00:00Z"),
            raw_post("2", "2021-03-25T00:00:00Z"),
            raw_post("3", "2021-03-25T00:00:00Z"),
        ];
        let provider = provider(repo);

        let summary = Generator::new(&provider, temp.path())
            .unwrap()
            .generate()
            .await
            .unwrap();
        assert_eq!(summary.posts, 3);
        assert!(summary.skipped.is_empty());

        let index = fs::read_to_string(temp.path().join("index.html")).unwrap();
        assert!(index.contains("Post 1"));
        assert!(!index.contains("load-more"));
        assert!(temp.path().join("404.html").exists());

        let post = fs::read_to_string(temp.path().join("post/post-3/index.html")).unwrap();
        assert!(post.contains("<h1>Post 3</h1>"));
    }

    #[tokio::test]
    async fn test_failed_post_is_skipped() {
        let temp = TempDir::new().unwrap();
        let mut repo = MockRepository::with_pages(page(&["1", "2"], None), vec![]);
        // post-2 is listed but cannot be fetched
        repo.documents = vec![raw_post("1", "2021-03-25T00:00:00Z")];
        let provider = provider(repo);

        let summary = Generator::new(&provider, temp.path())
            .unwrap()
            .generate()
            .await
            .unwrap();
        assert_eq!(summary.posts, 1);
        assert_eq!(summary.skipped, vec!["post-2"]);
        assert!(!temp.path().join("post/post-2").exists());
    }

    #[tokio::test]
    async fn test_unsafe_slug_is_skipped() {
        let temp = TempDir::new().unwrap();
        let mut listed = page(&["1"], None);
        listed.results[0].uid = Some("../escape".to_string());
        let provider = provider(MockRepository::with_pages(listed, vec![]));

        let summary = Generator::new(&provider, temp.path().join("public"))
            .unwrap()
            .generate()
            .await
            .unwrap();
        assert_eq!(summary.posts, 0);
        assert_eq!(summary.skipped, vec!["../escape"]);
        assert!(!temp.path().join("escape").exists());
    }

    #[test]
    fn test_is_safe_slug() {
        assert!(is_safe_slug("como-utilizar-hooks"));
        assert!(!is_safe_slug(""));
        assert!(!is_safe_slug(".."));
        assert!(!is_safe_slug("a/b"));
        assert!(!is_safe_slug("a\\b"));
    }
}
