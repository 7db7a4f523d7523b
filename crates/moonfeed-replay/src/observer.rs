/// Stand-in for the browser's layout pass: estimates how tall a rendered row
/// is once wrapped to the viewport width.

use moonfeed_engine::RenderedRow;
use moonfeed_types::MessageKind;

/// Average glyph advance, in pixels.
const GLYPH_WIDTH: u32 = 8;
const LINE_HEIGHT: u32 = 18;
/// Vertical padding around a standard row.
const ROW_PADDING: u32 = 6;
/// Banners get a taller frame.
const BANNER_PADDING: u32 = 16;

pub fn estimate_height(row: &RenderedRow, viewport_width: u32) -> u32 {
    let columns = (viewport_width / GLYPH_WIDTH).max(1) as usize;
    let chars = row.author.label().chars().count() + 2 + row.body.plain_text().chars().count();
    let lines = chars.div_ceil(columns).max(1) as u32;
    let padding = match row.kind {
        MessageKind::Standard => ROW_PADDING,
        MessageKind::LeaderBanner | MessageKind::PersonalBanner | MessageKind::SiteBanner => {
            BANNER_PADDING
        }
    };
    lines * LINE_HEIGHT + padding
}
