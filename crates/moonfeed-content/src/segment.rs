/// Structured row content. The render layer composes output from these
/// segments instead of trusting a pre-built HTML string.

use std::fmt::Write;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Plain text, already stripped of markup.
    Text(String),
    /// A mention of the viewer, rendered with a highlight.
    Mention(String),
    /// A badge icon carried with the message.
    Icon(String),
}

/// A message body split into segments, in display order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Annotated {
    segments: Vec<Segment>,
}

impl Annotated {
    pub fn new() -> Self {
        Self::default()
    }

    /// A body with a single text segment (or none, for empty text).
    pub fn text(text: impl Into<String>) -> Self {
        let mut annotated = Self::new();
        annotated.push_text(text);
        annotated
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Append text, merging with a trailing text segment.
    pub fn push_text(&mut self, text: impl Into<String>) {
        let text = text.into();
        if text.is_empty() {
            return;
        }
        match self.segments.last_mut() {
            Some(Segment::Text(prev)) => prev.push_str(&text),
            _ => self.segments.push(Segment::Text(text)),
        }
    }

    pub fn push_mention(&mut self, name: impl Into<String>) {
        self.segments.push(Segment::Mention(name.into()));
    }

    /// Put a badge icon in front of the body.
    pub fn prepend_icon(&mut self, icon: impl Into<String>) {
        self.segments.insert(0, Segment::Icon(icon.into()));
    }

    pub fn mention_count(&self) -> usize {
        self.segments
            .iter()
            .filter(|s| matches!(s, Segment::Mention(_)))
            .count()
    }

    /// Text content without any annotation.
    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Text(text) | Segment::Mention(text) => out.push_str(text),
                Segment::Icon(_) => {}
            }
        }
        out
    }

    /// Safe HTML for the segments. Every piece of carried text is escaped,
    /// so the only tags in the output are the ones emitted here.
    pub fn to_markup(&self) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Text(text) => out.push_str(&escape_html(text)),
                Segment::Mention(name) => {
                    let _ = write!(out, "<mark>{}</mark>", escape_html(name));
                }
                Segment::Icon(icon) => {
                    let _ = write!(out, "<i class=\"icon\" data-icon=\"{}\"></i>", escape_html(icon));
                }
            }
        }
        out
    }
}

/// Escape text for both element content and quoted attribute values.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
