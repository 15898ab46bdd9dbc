//! Headless caret geometry.

use unicode_segmentation::UnicodeSegmentation;

use crate::traits::TextGeometry;
use crate::types::Rect;

/// Deterministic layout of a text surface without a browser.
///
/// Text is broken into visual lines at hard line breaks and, within a
/// paragraph, every `columns` graphemes. Every grapheme is `char_width` wide
/// and every line `line_height` tall. A caret sitting exactly on a soft wrap
/// point belongs to the following line, as in browsers.
#[derive(Debug, Clone)]
pub struct WrappedTextGeometry {
    /// Visual lines as `[start, end)` grapheme ranges (line breaks excluded).
    lines: Vec<(usize, usize)>,
    /// Whether a line ends in a hard break.
    hard_break: Vec<bool>,
    len: usize,
    char_width: f32,
    line_height: f32,
}

impl WrappedTextGeometry {
    pub fn new(text: &str, columns: usize, char_width: f32, line_height: f32) -> Self {
        let columns = columns.max(1);
        let mut lines = Vec::new();
        let mut hard_break = Vec::new();
        let mut start = 0;
        let mut col = 0;
        let mut len = 0;
        for g in text.graphemes(true) {
            if g == "\n" || g == "\r\n" {
                lines.push((start, len));
                hard_break.push(true);
                len += 1;
                start = len;
                col = 0;
                continue;
            }
            if col == columns {
                lines.push((start, len));
                hard_break.push(false);
                start = len;
                col = 0;
            }
            len += 1;
            col += 1;
        }
        lines.push((start, len));
        hard_break.push(false);

        Self {
            lines,
            hard_break,
            len,
            char_width,
            line_height,
        }
    }

    /// A monospace layout with 8px wide graphemes on 16px lines.
    pub fn monospace(text: &str, columns: usize) -> Self {
        Self::new(text, columns, 8.0, 16.0)
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// The visual line a caret at `offset` is drawn on.
    pub fn line_of(&self, offset: usize) -> usize {
        let offset = offset.min(self.len);
        let last = self.lines.len() - 1;
        for (n, &(start, end)) in self.lines.iter().enumerate() {
            if offset < start {
                continue;
            }
            if offset < end || (offset == end && (n == last || self.hard_break[n])) {
                return n;
            }
        }
        last
    }

    fn rect_at(&self, line: usize, col: usize) -> Rect {
        // Empty content renders no line box.
        let height = if self.len == 0 { 0.0 } else { self.line_height };
        Rect::new(
            col as f32 * self.char_width,
            line as f32 * self.line_height,
            0.0,
            height,
        )
    }
}

impl TextGeometry for WrappedTextGeometry {
    fn bounding_rect_of(&self, offset: usize) -> Option<Rect> {
        let line = self.line_of(offset);
        let (start, _) = self.lines[line];
        Some(self.rect_at(line, offset.min(self.len) - start))
    }

    fn first_line(&self) -> Option<Rect> {
        Some(self.rect_at(0, 0))
    }

    fn last_line(&self) -> Option<Rect> {
        let last = self.lines.len() - 1;
        let (start, end) = self.lines[last];
        Some(self.rect_at(last, end - start))
    }
}
