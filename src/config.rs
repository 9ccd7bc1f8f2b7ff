//! Configuration types for GhostFrame

use crate::color::ColorValues;
use crate::error::{Error, Result};
use crate::geometry::{AspectRatioMode, RegionOfInterest};
use crate::types::PixelFormat;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Rendering quality hint passed on to the painter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Quality {
    /// Let the back-end decide
    #[default]
    Default,
    /// Smooth scaling, antialiasing
    Best,
    /// Nearest-neighbour, no extras
    Fastest,
}

/// Renderer configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RendererConfig {
    /// Aspect-ratio policy
    pub aspect_ratio_mode: AspectRatioMode,
    /// Ratio used when the mode is `custom`
    pub custom_aspect_ratio: Option<f64>,
    /// Rendering quality
    pub quality: Quality,
    /// Pixel format requested from the decoder
    pub preferred_format: Option<PixelFormat>,
    /// Ask upstream to always convert to the preferred format
    pub force_preferred_format: bool,
    /// Scale in the renderer instead of upstream
    pub scale_in_renderer: bool,
    /// Zoom/pan region of the source frame
    pub region_of_interest: RegionOfInterest,
    /// Initial color values
    pub color: ColorValues,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            aspect_ratio_mode: AspectRatioMode::Video,
            custom_aspect_ratio: None,
            quality: Quality::Default,
            preferred_format: None,
            force_preferred_format: false,
            scale_in_renderer: true,
            region_of_interest: RegionOfInterest::full(),
            color: ColorValues::default(),
        }
    }
}

impl RendererConfig {
    pub fn with_aspect_ratio_mode(mut self, mode: AspectRatioMode) -> Self {
        self.aspect_ratio_mode = mode;
        self
    }

    /// Fixed ratio; switches the mode to custom
    pub fn with_custom_aspect_ratio(mut self, ratio: f64) -> Self {
        self.aspect_ratio_mode = AspectRatioMode::Custom;
        self.custom_aspect_ratio = Some(ratio);
        self
    }

    pub fn with_quality(mut self, quality: Quality) -> Self {
        self.quality = quality;
        self
    }

    pub fn with_preferred_format(mut self, format: PixelFormat) -> Self {
        self.preferred_format = Some(format);
        self
    }

    pub fn with_region_of_interest(mut self, roi: RegionOfInterest) -> Self {
        self.region_of_interest = roi;
        self
    }

    pub fn with_color(mut self, color: ColorValues) -> Self {
        self.color = color;
        self
    }

    /// Check values that cannot be expressed in the types
    pub fn validate(&self) -> Result<()> {
        match (self.aspect_ratio_mode, self.custom_aspect_ratio) {
            (AspectRatioMode::Custom, None) => {
                return Err(Error::Config(
                    "custom aspect ratio mode needs custom_aspect_ratio".into(),
                ));
            }
            (_, Some(r)) if !r.is_finite() || r <= 0.0 => {
                return Err(Error::Config(format!(
                    "custom_aspect_ratio must be positive, got {}",
                    r
                )));
            }
            _ => {}
        }
        Ok(())
    }

    /// Parse and validate a TOML document
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: Self = toml::from_str(s).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        tracing::debug!("Loaded renderer config from {}", path.display());
        Self::from_toml_str(&text)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::Config(e.to_string()))
    }
}
