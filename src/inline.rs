//! Inline rich text: plain text plus formatting spans.
//!
//! Formatting is kept as a list of spans over grapheme offsets rather than as
//! embedded tags, so splitting, merging and toggling never have to repair a
//! tag tree. The HTML-like markup a browser surface produces is only a
//! serialization format: [`InlineText::from_markup`] parses it and
//! [`InlineText::to_markup`] renders a canonical, properly nested form.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use unicode_segmentation::UnicodeSegmentation;

use crate::error::{EditorError, Result};

/// An inline formatting mark.
///
/// Variant order is the nesting order used when rendering markup: links
/// wrap everything else, code is innermost.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Mark {
    Link(String),
    Bold,
    Italic,
    Underline,
    Warning,
    Code,
}

/// A mark without its payload, used to compare links regardless of target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MarkKind {
    Link,
    Bold,
    Italic,
    Underline,
    Warning,
    Code,
}

impl Mark {
    pub fn kind(&self) -> MarkKind {
        match self {
            Mark::Link(_) => MarkKind::Link,
            Mark::Bold => MarkKind::Bold,
            Mark::Italic => MarkKind::Italic,
            Mark::Underline => MarkKind::Underline,
            Mark::Warning => MarkKind::Warning,
            Mark::Code => MarkKind::Code,
        }
    }

    fn open_tag(&self) -> String {
        match self {
            Mark::Link(href) => format!("<a href=\"{}\">", escape_attr(href)),
            Mark::Bold => "<b>".to_string(),
            Mark::Italic => "<i>".to_string(),
            Mark::Underline => "<u>".to_string(),
            Mark::Warning => "<mark>".to_string(),
            Mark::Code => "<code>".to_string(),
        }
    }

    fn close_tag(&self) -> &'static str {
        match self {
            Mark::Link(_) => "</a>",
            Mark::Bold => "</b>",
            Mark::Italic => "</i>",
            Mark::Underline => "</u>",
            Mark::Warning => "</mark>",
            Mark::Code => "</code>",
        }
    }
}

/// A formatted range `[start, end)` in grapheme offsets.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub mark: Mark,
}

/// Rich inline text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InlineText {
    text: String,
    spans: Vec<Span>,
}

impl InlineText {
    pub fn new() -> Self {
        Self::default()
    }

    /// Unformatted text.
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            spans: Vec::new(),
        }
    }

    pub fn with_spans(text: impl Into<String>, spans: Vec<Span>) -> Self {
        let mut inline = Self {
            text: text.into(),
            spans,
        };
        inline.normalize();
        inline
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn spans(&self) -> &[Span] {
        &self.spans
    }

    /// Length in grapheme clusters.
    pub fn len(&self) -> usize {
        self.text.graphemes(true).count()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// True when nothing but whitespace is left.
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }

    /// Byte index of a grapheme offset, clamped to the end of the text.
    fn byte_index(&self, offset: usize) -> usize {
        self.text
            .grapheme_indices(true)
            .nth(offset)
            .map(|(i, _)| i)
            .unwrap_or(self.text.len())
    }

    /// Splits at a grapheme offset. Spans crossing the offset are cut in two.
    pub fn split_at(&self, offset: usize) -> (InlineText, InlineText) {
        let offset = offset.min(self.len());
        let at = self.byte_index(offset);
        let mut before = InlineText::plain(&self.text[..at]);
        let mut after = InlineText::plain(&self.text[at..]);

        for span in &self.spans {
            if span.start < offset {
                before.spans.push(Span {
                    start: span.start,
                    end: span.end.min(offset),
                    mark: span.mark.clone(),
                });
            }
            if span.end > offset {
                after.spans.push(Span {
                    start: span.start.saturating_sub(offset),
                    end: span.end - offset,
                    mark: span.mark.clone(),
                });
            }
        }
        before.normalize();
        after.normalize();
        (before, after)
    }

    /// Appends `other`, shifting its spans past the current end.
    pub fn append(&mut self, other: InlineText) {
        let shift = self.len();
        self.text.push_str(&other.text);
        self.spans
            .extend(other.spans.into_iter().map(|span| Span {
                start: span.start + shift,
                end: span.end + shift,
                mark: span.mark,
            }));
        self.normalize();
    }

    /// Whether every grapheme of `[start, end)` carries a mark of `kind`.
    pub fn is_marked(&self, start: usize, end: usize, kind: MarkKind) -> bool {
        if start >= end {
            return false;
        }
        let mut covered = start;
        let mut ranges: Vec<(usize, usize)> = self
            .spans
            .iter()
            .filter(|s| s.mark.kind() == kind)
            .map(|s| (s.start, s.end))
            .collect();
        ranges.sort_unstable();
        for (s, e) in ranges {
            if s > covered {
                break;
            }
            covered = covered.max(e);
            if covered >= end {
                return true;
            }
        }
        false
    }

    /// Toggles `mark` over `[start, end)`.
    ///
    /// A range already fully carrying the mark's kind loses it; otherwise
    /// the mark is applied to the whole range (replacing any link target).
    /// Returns whether anything changed.
    pub fn toggle(&mut self, start: usize, end: usize, mark: Mark) -> bool {
        let len = self.len();
        let (start, end) = (start.min(len), end.min(len));
        if start >= end {
            return false;
        }
        let kind = mark.kind();
        if self.is_marked(start, end, kind) {
            self.remove_kind(start, end, kind);
        } else {
            self.remove_kind(start, end, kind);
            self.spans.push(Span { start, end, mark });
        }
        self.normalize();
        true
    }

    fn remove_kind(&mut self, start: usize, end: usize, kind: MarkKind) {
        let mut kept = Vec::with_capacity(self.spans.len());
        for span in self.spans.drain(..) {
            if span.mark.kind() != kind || span.end <= start || span.start >= end {
                kept.push(span);
                continue;
            }
            if span.start < start {
                kept.push(Span {
                    start: span.start,
                    end: start,
                    mark: span.mark.clone(),
                });
            }
            if span.end > end {
                kept.push(Span {
                    start: end,
                    end: span.end,
                    mark: span.mark,
                });
            }
        }
        self.spans = kept;
    }

    /// Clamps, drops empty spans, and merges touching spans of equal marks.
    fn normalize(&mut self) {
        let len = self.len();
        let mut spans: Vec<Span> = self
            .spans
            .drain(..)
            .map(|mut s| {
                s.end = s.end.min(len);
                s
            })
            .filter(|s| s.start < s.end)
            .collect();
        spans.sort_by(|a, b| a.mark.cmp(&b.mark).then(a.start.cmp(&b.start)));

        let mut merged: Vec<Span> = Vec::with_capacity(spans.len());
        for span in spans {
            match merged.last_mut() {
                Some(last) if last.mark == span.mark && span.start <= last.end => {
                    last.end = last.end.max(span.end);
                }
                _ => merged.push(span),
            }
        }
        merged.sort_by(|a, b| a.start.cmp(&b.start).then(a.mark.cmp(&b.mark)));
        self.spans = merged;
    }

    /// Renders canonical markup with properly nested tags.
    pub fn to_markup(&self) -> String {
        let graphemes: Vec<&str> = self.text.graphemes(true).collect();
        let mut cuts: Vec<usize> = vec![0, graphemes.len()];
        for span in &self.spans {
            cuts.push(span.start);
            cuts.push(span.end);
        }
        cuts.sort_unstable();
        cuts.dedup();

        let mut out = String::with_capacity(self.text.len());
        let mut open: Vec<&Mark> = Vec::new();
        for pair in cuts.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            let mut active: Vec<&Mark> = self
                .spans
                .iter()
                .filter(|s| s.start <= a && s.end >= b)
                .map(|s| &s.mark)
                .collect();
            active.sort();
            active.dedup();

            let keep = open.iter().take_while(|m| active.contains(m)).count();
            while open.len() > keep {
                if let Some(mark) = open.pop() {
                    out.push_str(mark.close_tag());
                }
            }
            for mark in active {
                if !open.contains(&mark) {
                    out.push_str(&mark.open_tag());
                    open.push(mark);
                }
            }
            for g in &graphemes[a..b] {
                escape_text_into(g, &mut out);
            }
        }
        while let Some(mark) = open.pop() {
            out.push_str(mark.close_tag());
        }
        out
    }

    /// Parses HTML-like inline markup.
    ///
    /// Recognized tags become spans, `<br>` becomes a line break, and the
    /// text of unknown tags is kept with the tags dropped.
    pub fn from_markup(markup: &str) -> Result<Self> {
        let mut text = String::with_capacity(markup.len());
        // (tag name, mark, start byte)
        let mut open: Vec<(String, Mark, usize)> = Vec::new();
        let mut byte_spans: Vec<(usize, usize, Mark)> = Vec::new();

        let mut rest = markup;
        while let Some(ch) = rest.chars().next() {
            match ch {
                '<' => {
                    let close = rest.find('>').ok_or_else(|| {
                        EditorError::Markup(format!("unterminated tag in {markup:?}"))
                    })?;
                    let tag = &rest[1..close];
                    rest = &rest[close + 1..];
                    let tag = Tag::parse(tag);
                    match tag {
                        Tag::LineBreak => text.push('\n'),
                        Tag::Open(name, mark) => open.push((name, mark, text.len())),
                        Tag::Close(name) => {
                            if let Some(pos) = open.iter().rposition(|(n, _, _)| *n == name) {
                                let (_, mark, start) = open.remove(pos);
                                byte_spans.push((start, text.len(), mark));
                            }
                        }
                        Tag::Ignored => {}
                    }
                }
                '&' => {
                    let (decoded, consumed) = decode_entity(rest);
                    text.push_str(&decoded);
                    rest = &rest[consumed..];
                }
                _ => {
                    text.push(ch);
                    rest = &rest[ch.len_utf8()..];
                }
            }
        }
        for (_, mark, start) in open {
            byte_spans.push((start, text.len(), mark));
        }

        let starts: Vec<usize> = text.grapheme_indices(true).map(|(i, _)| i).collect();
        let to_offset = |byte: usize| starts.partition_point(|&s| s < byte);
        let spans = byte_spans
            .into_iter()
            .map(|(s, e, mark)| Span {
                start: to_offset(s),
                end: to_offset(e),
                mark,
            })
            .collect();
        Ok(Self::with_spans(text, spans))
    }
}

impl From<&str> for InlineText {
    fn from(text: &str) -> Self {
        InlineText::plain(text)
    }
}

impl Serialize for InlineText {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_markup())
    }
}

impl<'de> Deserialize<'de> for InlineText {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let markup = String::deserialize(deserializer)?;
        InlineText::from_markup(&markup).map_err(serde::de::Error::custom)
    }
}

enum Tag {
    Open(String, Mark),
    Close(String),
    LineBreak,
    Ignored,
}

impl Tag {
    fn parse(raw: &str) -> Tag {
        let raw = raw.trim();
        if let Some(name) = raw.strip_prefix('/') {
            return Tag::Close(name.trim().to_ascii_lowercase());
        }
        let raw = raw.trim_end_matches('/');
        let (name, attrs) = match raw.find(char::is_whitespace) {
            Some(i) => (&raw[..i], &raw[i..]),
            None => (raw, ""),
        };
        let name = name.to_ascii_lowercase();
        let mark = match name.as_str() {
            "br" => return Tag::LineBreak,
            "b" | "strong" => Mark::Bold,
            "i" | "em" => Mark::Italic,
            "u" => Mark::Underline,
            "mark" => Mark::Warning,
            "code" => Mark::Code,
            "a" => Mark::Link(attribute(attrs, "href").unwrap_or_default()),
            _ => return Tag::Ignored,
        };
        Tag::Open(name, mark)
    }
}

fn attribute(attrs: &str, name: &str) -> Option<String> {
    let lower = attrs.to_ascii_lowercase();
    let key = format!("{name}=");
    let at = lower.match_indices(&key).map(|(at, _)| at).find(|&at| {
        lower[..at].chars().next_back().is_none_or(char::is_whitespace)
    })?;
    let value = &attrs[at + name.len() + 1..];
    let quote = value.chars().next()?;
    let value = if quote == '"' || quote == '\'' {
        let body = &value[1..];
        &body[..body.find(quote).unwrap_or(body.len())]
    } else {
        value.split_whitespace().next().unwrap_or("")
    };
    Some(decode_all(value))
}

fn decode_all(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut rest = value;
    while let Some(ch) = rest.chars().next() {
        if ch == '&' {
            let (decoded, consumed) = decode_entity(rest);
            out.push_str(&decoded);
            rest = &rest[consumed..];
        } else {
            out.push(ch);
            rest = &rest[ch.len_utf8()..];
        }
    }
    out
}

/// Decodes the entity at the start of `input`, returning the text and the
/// number of bytes consumed. A lone `&` is kept literally.
fn decode_entity(input: &str) -> (String, usize) {
    let Some(end) = input.char_indices().take(10).find(|(_, c)| *c == ';').map(|(i, _)| i) else {
        return ("&".to_string(), 1);
    };
    let name = &input[1..end];
    let decoded = match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" | "#39" => Some('\''),
        "nbsp" => Some('\u{a0}'),
        _ => name
            .strip_prefix("#x")
            .and_then(|hex| u32::from_str_radix(hex, 16).ok())
            .or_else(|| name.strip_prefix('#').and_then(|dec| dec.parse().ok()))
            .and_then(char::from_u32),
    };
    match decoded {
        Some(c) => (c.to_string(), end + 1),
        None => ("&".to_string(), 1),
    }
}

fn escape_text_into(text: &str, out: &mut String) {
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\n' => out.push_str("<br>"),
            '\u{a0}' => out.push_str("&nbsp;"),
            _ => out.push(ch),
        }
    }
}

fn escape_attr(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
}
