//! Export size options

use crate::error::Error;
use crate::labels::Labels;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Pixel width of an exported code
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum ExportSize {
    /// 128 px
    Small,
    /// 256 px
    #[default]
    Medium,
    /// 512 px
    Large,
    /// 1024 px
    ExtraLarge,
}

impl ExportSize {
    /// Every option, smallest first
    pub const ALL: [ExportSize; 4] = [
        ExportSize::Small,
        ExportSize::Medium,
        ExportSize::Large,
        ExportSize::ExtraLarge,
    ];

    /// Width in pixels
    pub fn pixels(self) -> u32 {
        match self {
            ExportSize::Small => 128,
            ExportSize::Medium => 256,
            ExportSize::Large => 512,
            ExportSize::ExtraLarge => 1024,
        }
    }

    /// Localised option name
    pub fn label(self, labels: &Labels) -> &str {
        let index = Self::ALL.iter().position(|s| *s == self).unwrap_or(1);
        &labels.size_names[index]
    }
}

impl fmt::Display for ExportSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.pixels())
    }
}

impl TryFrom<u32> for ExportSize {
    type Error = Error;

    fn try_from(pixels: u32) -> Result<Self, Self::Error> {
        Self::ALL
            .into_iter()
            .find(|size| size.pixels() == pixels)
            .ok_or_else(|| Error::InvalidExportSize(pixels.to_string()))
    }
}

impl From<ExportSize> for u32 {
    fn from(size: ExportSize) -> Self {
        size.pixels()
    }
}

impl FromStr for ExportSize {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        match trimmed.to_ascii_lowercase().as_str() {
            "small" => return Ok(ExportSize::Small),
            "medium" => return Ok(ExportSize::Medium),
            "large" => return Ok(ExportSize::Large),
            "xl" | "extra-large" | "xlarge" => return Ok(ExportSize::ExtraLarge),
            _ => {}
        }
        trimmed
            .trim_end_matches("px")
            .parse::<u32>()
            .map_err(|_| Error::InvalidExportSize(trimmed.to_string()))
            .and_then(ExportSize::try_from)
    }
}
