//! Content module - post documents, rich text and their normalization

pub mod formatter;
mod post;
pub mod reading;
mod rich_text;

#[cfg(test)]
pub(crate) mod fixtures;

pub use formatter::{
    format_post, format_post_detail, format_posts, FormattedPost, PostDetail, Section,
    UNKNOWN_AUTHOR,
};
pub use post::{Banner, ContentBlock, Cursor, Page, PostData, RawPost};
pub use reading::reading_time;
pub use rich_text::{Embed, Fragment, FragmentKind, RichText, Span, SpanData, SpanKind};
