//! Show a single post

use anyhow::{Context, Result};
use std::io::{self, Write};

use crate::content::PostDetail;
use crate::templates::TemplateRenderer;
use crate::Blog;

/// Print the post with uid `slug` as text, or its rendered page with `html`
pub async fn run(blog: &Blog, slug: &str, html: bool) -> Result<()> {
    let provider = blog.provider()?;
    let detail = provider
        .post_props(slug)
        .await
        .with_context(|| format!("Failed to load post {:?}", slug))?
        .props;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if html {
        let renderer = TemplateRenderer::new()?;
        writeln!(out, "{}", renderer.render_post(&blog.config, &detail)?)?;
    } else {
        write_text(&mut out, &detail)?;
    }

    Ok(())
}

/// Plain text rendition: header lines, then each section's text
pub fn write_text<O: Write>(out: &mut O, detail: &PostDetail) -> io::Result<()> {
    writeln!(out, "{}", detail.title)?;
    writeln!(
        out,
        "{} | {} | {} min",
        detail.created_at, detail.author, detail.reading_time
    )?;

    for section in &detail.sections {
        writeln!(out)?;
        if !section.heading.is_empty() {
            writeln!(out, "## {}", section.heading)?;
        }
        if !section.text.is_empty() {
            writeln!(out, "{}", section.text)?;
        }
    }

    Ok(())
}
