use std::collections::VecDeque;

use block_editor::block::MediaRef;
use block_editor::traits::MediaPicker;

/// Hands out queued selections; `None` entries act as a dismissed picker.
#[derive(Default, Debug, Clone)]
pub struct MockPicker {
    queue: VecDeque<Option<MediaRef>>,
    pub opened: usize,
}

impl MockPicker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn then(mut self, selection: Option<MediaRef>) -> Self {
        self.queue.push_back(selection);
        self
    }
}

impl MediaPicker for MockPicker {
    fn pick(&mut self) -> Option<MediaRef> {
        self.opened += 1;
        self.queue.pop_front().flatten()
    }
}

pub fn sample_media() -> MediaRef {
    MediaRef {
        name: "sunset.jpg".to_string(),
        path: "/media/sunset.jpg".to_string(),
        background_color: "#ffeecc".to_string(),
    }
}
