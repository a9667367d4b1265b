//! Helper functions shared by the formatter, templates and host
//!
//! Date formatting, HTML escaping and URL generation.

mod date;
mod html;
mod url;

pub use date::*;
pub use html::*;
pub use url::*;
