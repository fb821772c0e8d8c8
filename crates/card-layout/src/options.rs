use crate::constants::{DEFAULT_MARGIN_MM, DEFAULT_QUALITY, MAX_QUALITY};
use crate::types::*;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Layout configuration
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct LayoutOptions {
    // Paper
    pub paper_size: PaperSize,
    pub orientation: Orientation,
    pub margin_mm: f32,

    // Layout mode
    pub double_sided: bool,
    pub quality: u8,
    pub grouping: bool,
    pub bleed_margin: bool,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            paper_size: PaperSize::Letter,
            orientation: Orientation::Portrait,
            margin_mm: DEFAULT_MARGIN_MM,
            double_sided: false,
            quality: DEFAULT_QUALITY,
            grouping: true,
            bleed_margin: false,
        }
    }
}

impl LayoutOptions {
    /// Load options from JSON file
    #[cfg(feature = "serde")]
    pub async fn load(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let options: Self = serde_json::from_slice(&bytes)
            .map_err(|e| LayoutError::Config(format!("Failed to parse config: {}", e)))?;
        options.validate()?;
        Ok(options)
    }

    /// Save options to JSON file
    #[cfg(feature = "serde")]
    pub async fn save(&self, path: impl AsRef<std::path::Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| LayoutError::Config(format!("Failed to serialize config: {}", e)))?;
        tokio::fs::write(path, json).await?;
        Ok(())
    }

    /// Resolve the paper geometry in points
    pub fn paper(&self) -> Result<Paper> {
        Paper::from_size(self.paper_size, self.orientation, self.margin_mm)
    }

    /// Validate the options
    pub fn validate(&self) -> Result<()> {
        validate_quality(self.quality)?;
        self.paper()?;
        Ok(())
    }
}

pub(crate) fn validate_quality(quality: u8) -> Result<()> {
    if quality > MAX_QUALITY {
        return Err(LayoutError::Config(format!(
            "Quality must be between 0 and {}, got {}",
            MAX_QUALITY, quality
        )));
    }
    Ok(())
}
