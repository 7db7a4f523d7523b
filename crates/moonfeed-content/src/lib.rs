/// Content-safety pipeline for feed rows.
///
/// Untrusted bodies go through [`sanitize`] first, then [`highlight`] marks
/// mentions of the viewer. The result is a list of [`Segment`]s, never an HTML
/// string; [`Annotated::to_markup`] produces escaped output when one is needed.

pub mod highlight;
pub mod sanitize;
pub mod segment;

pub use highlight::{Highlighter, highlight};
pub use sanitize::{DEFAULT_MAX_BODY_BYTES, Sanitizer, sanitize};
pub use segment::{Annotated, Segment, escape_html};
