use serde::Deserialize;

use crate::block::{DelimiterStyle, HeadingLevel};
use crate::error::Result;

/// Tunables for an editing session.
///
/// Every field has a default, so a host can deserialize a partial JSON
/// object and leave the rest alone.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EditorConfig {
    /// Deepest indentation Tab can push a list item to.
    pub max_list_level: u32,
    /// Level given to blocks converted into headings.
    pub default_heading_level: HeadingLevel,
    /// Style of newly inserted delimiters.
    pub default_delimiter: DelimiterStyle,
    /// Shape of newly inserted tables.
    pub table_rows: usize,
    pub table_cols: usize,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            max_list_level: 6,
            default_heading_level: HeadingLevel::default(),
            default_delimiter: DelimiterStyle::default(),
            table_rows: 2,
            table_cols: 2,
        }
    }
}

impl EditorConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
