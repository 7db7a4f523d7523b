use regex::{Regex, RegexBuilder};
use tracing::warn;

use crate::segment::Annotated;

/// Marks whole-word, case-insensitive mentions of the viewer's own name.
///
/// Runs on sanitized text only. The matcher is compiled once per viewer name;
/// feed views keep one around and rebuild it when the name changes.
#[derive(Debug, Clone)]
pub struct Highlighter {
    name: String,
    matcher: Option<Regex>,
}

impl Highlighter {
    pub fn new(viewer_name: &str) -> Self {
        let name = viewer_name.trim();
        let matcher = if name.is_empty() {
            None
        } else {
            RegexBuilder::new(&regex::escape(name))
                .case_insensitive(true)
                .build()
                .map_err(|e| warn!("Cannot build mention matcher for '{}': {}", name, e))
                .ok()
        };
        Self {
            name: name.to_string(),
            matcher,
        }
    }

    pub fn viewer_name(&self) -> &str {
        &self.name
    }

    /// Split `sanitized` into text and mention segments.
    pub fn highlight(&self, sanitized: &str) -> Annotated {
        let Some(matcher) = &self.matcher else {
            return Annotated::text(sanitized);
        };

        let mut out = Annotated::new();
        let mut copied = 0;
        let mut search_from = 0;
        while let Some(m) = matcher.find_at(sanitized, search_from) {
            if is_word_boundary(sanitized, m.start(), m.end()) {
                out.push_text(&sanitized[copied..m.start()]);
                out.push_mention(self.name.clone());
                copied = m.end();
                search_from = m.end();
            } else {
                // Rejected inside a longer word; retry one character later so
                // an overlapping candidate is not skipped.
                search_from = next_char_boundary(sanitized, m.start());
            }
            if search_from >= sanitized.len() {
                break;
            }
        }
        out.push_text(&sanitized[copied..]);
        out
    }
}

/// One-shot form of [`Highlighter::highlight`].
pub fn highlight(sanitized: &str, viewer_name: &str) -> Annotated {
    Highlighter::new(viewer_name).highlight(sanitized)
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn is_word_boundary(text: &str, start: usize, end: usize) -> bool {
    let before = text[..start].chars().next_back();
    let after = text[end..].chars().next();
    !before.is_some_and(is_word_char) && !after.is_some_and(is_word_char)
}

fn next_char_boundary(text: &str, from: usize) -> usize {
    text[from..]
        .chars()
        .next()
        .map_or(text.len(), |c| from + c.len_utf8())
}
