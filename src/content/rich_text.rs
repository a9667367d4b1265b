//! Structured rich text and its plain-text / HTML renderings

use serde::{Deserialize, Serialize};
use std::fmt::Write;

use super::post::null_as_default;
use crate::helpers::escape_html;

/// An ordered list of rich-text blocks
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RichText(pub Vec<Fragment>);

/// Block kinds the repository emits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FragmentKind {
    Heading1,
    Heading2,
    Heading3,
    Heading4,
    Heading5,
    Heading6,
    Paragraph,
    Preformatted,
    ListItem,
    OListItem,
    Image,
    Embed,
    #[serde(other)]
    Unknown,
}

impl FragmentKind {
    fn heading_level(self) -> Option<u8> {
        match self {
            FragmentKind::Heading1 => Some(1),
            FragmentKind::Heading2 => Some(2),
            FragmentKind::Heading3 => Some(3),
            FragmentKind::Heading4 => Some(4),
            FragmentKind::Heading5 => Some(5),
            FragmentKind::Heading6 => Some(6),
            _ => None,
        }
    }

    fn list_tag(self) -> Option<&'static str> {
        match self {
            FragmentKind::ListItem => Some("ul"),
            FragmentKind::OListItem => Some("ol"),
            _ => None,
        }
    }
}

/// A single rich-text block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fragment {
    #[serde(rename = "type")]
    pub kind: FragmentKind,

    #[serde(default, deserialize_with = "null_as_default")]
    pub text: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub spans: Vec<Span>,

    /// Image source (image blocks)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oembed: Option<Embed>,
}

impl Fragment {
    /// Plain text block of the given kind
    pub fn new(kind: FragmentKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
            spans: Vec::new(),
            url: None,
            alt: None,
            oembed: None,
        }
    }

    pub fn paragraph(text: impl Into<String>) -> Self {
        Self::new(FragmentKind::Paragraph, text)
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.spans.push(span);
        self
    }
}

/// Inline formatting over a range of a block's text.
///
/// Offsets count UTF-16 code units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    #[serde(rename = "type")]
    pub kind: SpanKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<SpanData>,
}

impl Span {
    pub fn new(kind: SpanKind, start: usize, end: usize) -> Self {
        Self {
            start,
            end,
            kind,
            data: None,
        }
    }

    pub fn link(start: usize, end: usize, url: impl Into<String>) -> Self {
        Self {
            start,
            end,
            kind: SpanKind::Hyperlink,
            data: Some(SpanData {
                url: Some(url.into()),
                ..SpanData::default()
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpanKind {
    Strong,
    Em,
    Hyperlink,
    Label,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpanData {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub target: Option<String>,
    #[serde(default)]
    pub label: Option<String>,
}

/// oEmbed payload of an embed block
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Embed {
    #[serde(default)]
    pub html: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub provider_name: Option<String>,
    #[serde(default)]
    pub embed_url: Option<String>,
}

impl RichText {
    pub fn new(fragments: Vec<Fragment>) -> Self {
        Self(fragments)
    }

    pub fn fragments(&self) -> &[Fragment] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Plain text of every block, joined with a single space
    pub fn as_text(&self) -> String {
        self.join_text(" ")
    }

    /// Plain text with one line per block
    pub fn as_text_lines(&self) -> String {
        self.join_text("\n")
    }

    fn join_text(&self, separator: &str) -> String {
        self.0
            .iter()
            .map(|f| f.text.as_str())
            .filter(|text| !text.is_empty())
            .collect::<Vec<_>>()
            .join(separator)
    }

    /// Render to HTML, grouping consecutive list items
    pub fn as_html(&self) -> String {
        let mut html = String::new();
        let mut open_list: Option<&'static str> = None;

        for fragment in &self.0 {
            let list = fragment.kind.list_tag();
            if list != open_list {
                if let Some(tag) = open_list {
                    let _ = write!(html, "</{}>", tag);
                }
                if let Some(tag) = list {
                    let _ = write!(html, "<{}>", tag);
                }
                open_list = list;
            }
            render_fragment(&mut html, fragment);
        }

        if let Some(tag) = open_list {
            let _ = write!(html, "</{}>", tag);
        }

        html
    }
}

fn render_fragment(html: &mut String, fragment: &Fragment) {
    if let Some(level) = fragment.kind.heading_level() {
        let _ = write!(
            html,
            "<h{}>{}</h{}>",
            level,
            render_spans(&fragment.text, &fragment.spans),
            level
        );
        return;
    }

    let text = || render_spans(&fragment.text, &fragment.spans);
    match fragment.kind {
        FragmentKind::Paragraph => {
            let _ = write!(html, "<p>{}</p>", text());
        }
        FragmentKind::Preformatted => {
            let _ = write!(html, "<pre>{}</pre>", text());
        }
        FragmentKind::ListItem | FragmentKind::OListItem => {
            let _ = write!(html, "<li>{}</li>", text());
        }
        FragmentKind::Image => {
            if let Some(url) = fragment.url.as_deref() {
                let _ = write!(
                    html,
                    r#"<p class="block-img"><img src="{}" alt="{}" /></p>"#,
                    escape_html(url),
                    escape_html(fragment.alt.as_deref().unwrap_or_default())
                );
            }
        }
        FragmentKind::Embed => {
            if let Some(embed) = &fragment.oembed {
                if let Some(inner) = embed.html.as_deref() {
                    let _ = write!(
                        html,
                        r#"<div data-oembed="{}" data-oembed-type="{}" data-oembed-provider="{}">{}</div>"#,
                        escape_html(embed.embed_url.as_deref().unwrap_or_default()),
                        escape_html(embed.kind.as_deref().unwrap_or_default()),
                        escape_html(&embed.provider_name.as_deref().unwrap_or_default().to_lowercase()),
                        inner
                    );
                }
            }
        }
        _ => {}
    }
}

/// Render a block's text with its spans applied.
///
/// Crossing spans are closed and reopened so the output stays well nested.
fn render_spans(text: &str, spans: &[Span]) -> String {
    let total = text.encode_utf16().count();

    let mut boundaries: Vec<usize> = spans
        .iter()
        .filter(|s| s.start < s.end)
        .flat_map(|s| [s.start, s.end])
        .chain([0, total])
        .filter(|&b| b <= total)
        .collect();
    boundaries.sort_unstable();
    boundaries.dedup();

    let mut out = String::with_capacity(text.len());
    let mut open: Vec<usize> = Vec::new();
    let mut chars = text.chars();
    let mut offset = 0;

    for window in boundaries.windows(2) {
        let (from, to) = (window[0], window[1]);

        let mut segment = String::new();
        while offset < to {
            match chars.next() {
                Some(c) => {
                    segment.push(c);
                    offset += c.len_utf16();
                }
                None => break,
            }
        }

        let mut active: Vec<usize> = spans
            .iter()
            .enumerate()
            .filter(|(_, s)| s.start < s.end && s.start <= from && s.end >= to)
            .map(|(i, _)| i)
            .collect();
        // Outer spans first: earliest start, then longest
        active.sort_by_key(|&i| (spans[i].start, std::cmp::Reverse(spans[i].end), i));

        let keep = open
            .iter()
            .zip(&active)
            .take_while(|(a, b)| a == b)
            .count();
        for i in open.split_off(keep).into_iter().rev() {
            out.push_str(close_tag(&spans[i]));
        }
        for &i in &active[keep..] {
            out.push_str(&open_tag(&spans[i]));
            open.push(i);
        }

        out.push_str(&escape_html(&segment).replace('\n', "<br />"));
    }

    for i in open.into_iter().rev() {
        out.push_str(close_tag(&spans[i]));
    }

    out
}

fn open_tag(span: &Span) -> String {
    let data = span.data.clone().unwrap_or_default();
    match span.kind {
        SpanKind::Strong => "<strong>".to_string(),
        SpanKind::Em => "<em>".to_string(),
        SpanKind::Hyperlink => {
            let href = escape_html(data.url.as_deref().unwrap_or("#"));
            match data.target.as_deref() {
                Some(target) => format!(
                    r#"<a href="{}" target="{}" rel="noopener">"#,
                    href,
                    escape_html(target)
                ),
                None => format!(r#"<a href="{}">"#, href),
            }
        }
        SpanKind::Label => format!(
            r#"<span class="{}">"#,
            escape_html(data.label.as_deref().unwrap_or_default())
        ),
        SpanKind::Unknown => "<span>".to_string(),
    }
}

fn close_tag(span: &Span) -> &'static str {
    match span.kind {
        SpanKind::Strong => "</strong>",
        SpanKind::Em => "</em>",
        SpanKind::Hyperlink => "</a>",
        SpanKind::Label | SpanKind::Unknown => "</span>",
    }
}
