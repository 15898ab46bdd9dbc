use crate::block::{ListItem, MediaRef};
use crate::inline::InlineText;
use crate::navigation;
use crate::types::{Direction, Rect};

/// Caret geometry of one rendered, editable surface.
///
/// Browser hosts answer these from collapsed selection ranges; headless
/// hosts can use [`crate::geometry::WrappedTextGeometry`]. Offsets are
/// grapheme offsets into the surface's text. `None` means the host could
/// not measure, which the navigation controller treats as "at the boundary".
pub trait TextGeometry {
    /// Rect of a caret collapsed at `offset`.
    fn bounding_rect_of(&self, offset: usize) -> Option<Rect>;

    /// Rect of a caret collapsed at the start of the first text node.
    fn first_line(&self) -> Option<Rect>;

    /// Rect of a caret collapsed at the end of the last text node.
    fn last_line(&self) -> Option<Rect>;
}

/// External collaborator that lets the user choose an asset.
pub trait MediaPicker {
    /// Returns the selection, or `None` if the picker was dismissed.
    fn pick(&mut self) -> Option<MediaRef>;
}

/// Something the caret can sit in: a text block's text or a list item.
///
/// Navigation rules are written once against this capability; kinds only
/// differ in how they are presented.
pub trait TextBearing {
    fn content(&self) -> &InlineText;

    fn set_content(&mut self, content: InlineText);

    fn is_empty(&self) -> bool {
        self.content().is_blank()
    }

    fn is_at_top_line(&self, geometry: &dyn TextGeometry, offset: usize) -> bool {
        navigation::classify_vertical_move(geometry, offset, Direction::Up)
    }

    fn is_at_bottom_line(&self, geometry: &dyn TextGeometry, offset: usize) -> bool {
        navigation::classify_vertical_move(geometry, offset, Direction::Down)
    }
}

impl TextBearing for InlineText {
    fn content(&self) -> &InlineText {
        self
    }

    fn set_content(&mut self, content: InlineText) {
        *self = content;
    }
}

impl TextBearing for ListItem {
    fn content(&self) -> &InlineText {
        &self.content
    }

    fn set_content(&mut self, content: InlineText) {
        self.content = content;
    }
}
