//! Print the path of every post

use anyhow::Result;

use crate::helpers::post_path;
use crate::Blog;

pub async fn run(blog: &Blog) -> Result<()> {
    let provider = blog.provider()?;
    for uid in provider.post_paths().await? {
        println!("{}", post_path(&uid));
    }
    Ok(())
}
