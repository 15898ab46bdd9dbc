use block_editor::traits::TextGeometry;
use block_editor::types::Rect;

/// Geometry with hand-placed rects, for layouts a wrapping model can't
/// produce (unmeasurable carets, zero-size boxes).
#[derive(Debug, Clone, Default)]
pub struct MockGeometry {
    pub caret: Option<Rect>,
    pub first: Option<Rect>,
    pub last: Option<Rect>,
}

impl MockGeometry {
    /// A single 16px tall line.
    pub fn single_line() -> Self {
        let line = Rect::new(0.0, 0.0, 0.0, 16.0);
        Self {
            caret: Some(line),
            first: Some(line),
            last: Some(line),
        }
    }

    /// Nothing can be measured.
    pub fn unmeasurable() -> Self {
        Self::default()
    }
}

impl TextGeometry for MockGeometry {
    fn bounding_rect_of(&self, _offset: usize) -> Option<Rect> {
        self.caret
    }

    fn first_line(&self) -> Option<Rect> {
        self.first
    }

    fn last_line(&self) -> Option<Rect> {
        self.last
    }
}
