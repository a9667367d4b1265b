//! List posts in the terminal, one page at a time

use anyhow::Result;
use std::io::{self, BufRead, Write};

use crate::content::FormattedPost;
use crate::helpers::DateFormatter;
use crate::prismic::ContentRepository;
use crate::session::{PaginationSession, PostPagination};
use crate::Blog;

/// List the first page, then offer to load more until the listing ends.
/// With `all`, every page is loaded without asking.
pub async fn run(blog: &Blog, all: bool) -> Result<()> {
    let provider = blog.provider()?;
    let home = provider.home_props().await?;

    let stdin = io::stdin();
    let stdout = io::stdout();
    browse(
        provider.repository(),
        provider.dates(),
        home.props,
        &blog.config.load_more_label,
        all,
        &mut stdin.lock(),
        &mut stdout.lock(),
    )
    .await?;

    Ok(())
}

/// Drive a session from a terminal; returns it once the user stops or the
/// listing is exhausted
pub async fn browse<R, I, O>(
    repo: &R,
    dates: &DateFormatter,
    initial: PostPagination,
    label: &str,
    all: bool,
    input: &mut I,
    output: &mut O,
) -> Result<PaginationSession>
where
    R: ContentRepository + ?Sized,
    I: BufRead,
    O: Write,
{
    let mut session = PaginationSession::new(initial);
    for post in session.posts() {
        write_post(output, post)?;
    }

    loop {
        if !session.has_more() {
            break;
        }
        if !all && !confirm(label, input, output)? {
            break;
        }

        let shown = session.posts().len();
        let Some(request) = session.load_more() else {
            break;
        };
        match request.fetch(repo, dates).await {
            Ok(_) => {
                for post in &session.posts()[shown..] {
                    write_post(output, post)?;
                }
            }
            // Nothing was appended; asking again retries the same cursor
            Err(e) if !all => {
                tracing::warn!("Failed to load more posts: {}", e);
                writeln!(output, "Failed to load more posts: {}", e)?;
            }
            Err(e) => return Err(e.into()),
        }
    }

    writeln!(output, "{} posts", session.posts().len())?;
    Ok(session)
}

fn write_post<O: Write>(output: &mut O, post: &FormattedPost) -> io::Result<()> {
    writeln!(
        output,
        "  {} - {} ({})",
        post.first_publication_date, post.title, post.author
    )?;
    if let Some(subtitle) = &post.subtitle {
        writeln!(output, "      {}", subtitle)?;
    }
    Ok(())
}

/// Ask a yes/no question, defaulting to yes; end of input means no
fn confirm<I: BufRead, O: Write>(label: &str, input: &mut I, output: &mut O) -> Result<bool> {
    write!(output, "{}? [Y/n] ", label)?;
    output.flush()?;

    let mut answer = String::new();
    if input.read_line(&mut answer)? == 0 {
        return Ok(false);
    }
    let answer = answer.trim().to_lowercase();
    Ok(answer.is_empty() || answer == "y" || answer == "yes")
}
