#![allow(dead_code)]

pub mod mock_geometry;
pub mod mock_picker;
