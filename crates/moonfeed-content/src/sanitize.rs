//! Markup stripping for untrusted message text.
//!
//! The input is parsed as an HTML fragment by ammonia (html5ever underneath)
//! with an empty tag allowlist, so every element is dropped and only its text
//! survives. The content of script-like elements is dropped entirely. The
//! serializer's entity escapes are then decoded back to plain text.
//!
//! A single pass is not idempotent: `&lt;b&gt;` decodes to `<b>`, which a
//! second pass would strip. [`Sanitizer::sanitize`] therefore repeats the pass
//! until the text stops changing.

use std::collections::HashSet;
use std::sync::LazyLock;

use ammonia::Builder;
use tracing::warn;

/// Default cap on raw body size, in bytes.
pub const DEFAULT_MAX_BODY_BYTES: usize = 16 * 1024;

/// Passes allowed before a body is considered hostile.
const MAX_PASSES: usize = 8;

static TEXT_ONLY: LazyLock<Builder<'static>> = LazyLock::new(|| {
    let mut b = Builder::empty();
    b.clean_content_tags(
        [
            "script", "style", "iframe", "object", "embed", "noscript", "template", "svg",
            "math", "title", "textarea", "xmp", "noembed", "noframes",
        ]
        .into_iter()
        .collect::<HashSet<&'static str>>(),
    );
    b.strip_comments(true);
    b
});

#[derive(Debug, Clone, Copy)]
pub struct Sanitizer {
    max_body_bytes: usize,
}

impl Default for Sanitizer {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_BODY_BYTES)
    }
}

impl Sanitizer {
    pub fn new(max_body_bytes: usize) -> Self {
        Self { max_body_bytes }
    }

    /// Strip all markup from `raw`, returning its text content.
    ///
    /// Never fails: oversized bodies and bodies that keep producing new
    /// markup after decoding come back as an empty string.
    pub fn sanitize(&self, raw: &str) -> String {
        if raw.len() > self.max_body_bytes {
            warn!(
                "Dropping message body of {} bytes (limit {})",
                raw.len(),
                self.max_body_bytes
            );
            return String::new();
        }

        let mut current = raw.to_string();
        for _ in 0..MAX_PASSES {
            let next = strip_once(&current);
            if next == current {
                // Entity decoding can grow the text past the limit.
                if current.len() > self.max_body_bytes {
                    warn!(
                        "Dropping message body that decoded to {} bytes (limit {})",
                        current.len(),
                        self.max_body_bytes
                    );
                    return String::new();
                }
                return current;
            }
            current = next;
        }

        warn!("Message body did not settle after {} sanitize passes, dropping", MAX_PASSES);
        String::new()
    }
}

/// Sanitize with the default limits.
pub fn sanitize(raw: &str) -> String {
    Sanitizer::default().sanitize(raw)
}

fn strip_once(text: &str) -> String {
    if !text.contains(['<', '>', '&', '\r', '\0']) {
        return text.to_string();
    }
    let cleaned = TEXT_ONLY.clean(text).to_string();
    decode_serializer_escapes(&cleaned)
}

/// Undo html5ever's text-node escaping. The serializer only ever emits these
/// four entities for text content, so this is an exact inverse.
fn decode_serializer_escapes(escaped: &str) -> String {
    const ENTITIES: [(&str, char); 4] = [
        ("&amp;", '&'),
        ("&lt;", '<'),
        ("&gt;", '>'),
        ("&nbsp;", '\u{a0}'),
    ];

    let mut out = String::with_capacity(escaped.len());
    let mut rest = escaped;
    while let Some(pos) = rest.find('&') {
        out.push_str(&rest[..pos]);
        rest = &rest[pos..];
        match ENTITIES.iter().find(|(entity, _)| rest.starts_with(entity)) {
            Some((entity, c)) => {
                out.push(*c);
                rest = &rest[entity.len()..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}
