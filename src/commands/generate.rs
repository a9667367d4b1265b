//! Generate static files

use anyhow::{Context, Result};
use std::time::Instant;

use crate::generator::Generator;
use crate::Blog;

/// Fetch every post and write the static site
pub async fn run(blog: &Blog) -> Result<()> {
    let start = Instant::now();

    let provider = blog.provider()?;
    let generator = Generator::new(&provider, &blog.public_dir)?;
    let summary = generator
        .generate()
        .await
        .with_context(|| format!("Failed to generate {:?}", blog.public_dir))?;

    if !summary.skipped.is_empty() {
        tracing::warn!(
            "Skipped {} post(s): {}",
            summary.skipped.len(),
            summary.skipped.join(", ")
        );
    }

    let duration = start.elapsed();
    tracing::info!(
        "Generated {} posts in {:.2}s",
        summary.posts,
        duration.as_secs_f64()
    );

    Ok(())
}
