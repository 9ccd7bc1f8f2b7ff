//! Output geometry
//!
//! Tracks source and surface sizes and derives the out rectangle: the part
//! of the surface the frame is drawn into after aspect-ratio fitting.
//! - Surface aspect ratio (stretch to the whole surface)
//! - Video aspect ratio (letterbox/pillarbox to the source ratio)
//! - Custom aspect ratio (caller supplied)

mod mapper;

pub use mapper::{CoordinateMapper, RegionOfInterest};

use crate::error::{Error, Result};
use crate::types::{Rect, Size};
use serde::{Deserialize, Serialize};

/// Policy deciding the out rectangle's ratio
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AspectRatioMode {
    /// Fill the whole surface
    Surface,
    /// Follow the source frame ratio
    #[default]
    Video,
    /// Ratio set explicitly by the caller
    Custom,
}

/// Geometry shared by the renderer, mutated in place
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeometryState {
    /// Size of the last received frame
    pub source: Size,
    /// Size from the last resize notification
    pub surface: Size,
    pub mode: AspectRatioMode,
    /// Out rectangle ratio (width / height)
    pub aspect_ratio_value: f64,
    /// Ratio of the source frame
    pub source_aspect_ratio: f64,
    /// Surface region occupied by the frame
    pub out_rect: Rect,
    /// Margins around the out rectangle must be cleared on next paint
    pub background_dirty: bool,
    /// Set while a mode-driven path is applying a ratio
    pub aspect_ratio_changed: bool,
}

/// Largest rectangle of `ratio` centered inside `surface`
///
/// One axis is filled exactly, the other is centered in the remaining gap.
pub fn fit_rect(surface: Size, ratio: f64) -> Result<Rect> {
    if surface.is_empty() {
        return Err(Error::InvalidGeometry(format!(
            "surface {} has a zero dimension",
            surface
        )));
    }
    if !ratio.is_finite() || ratio <= 0.0 {
        return Err(Error::InvalidGeometry(format!(
            "aspect ratio must be positive, got {}",
            ratio
        )));
    }

    let sw = surface.width as f64;
    let sh = surface.height as f64;

    let (width, height) = if ratio > sw / sh {
        // Wider than the surface: full width, letterbox
        let h = ((sw / ratio).round() as u32).clamp(1, surface.height);
        (surface.width, h)
    } else {
        // Taller or equal: full height, pillarbox
        let w = ((sh * ratio).round() as u32).clamp(1, surface.width);
        (w, surface.height)
    };

    Ok(Rect::new(
        ((surface.width - width) / 2) as i32,
        ((surface.height - height) / 2) as i32,
        width,
        height,
    ))
}

/// Aspect-ratio engine over a [`GeometryState`]
///
/// Every mutating call returns `Some(size)` when the backing frame buffer
/// must be resized to the new out rectangle.
#[derive(Debug, Default)]
pub struct GeometryEngine {
    state: GeometryState,
}

impl GeometryEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start in a specific mode (before any size is known)
    pub fn with_mode(mode: AspectRatioMode) -> Self {
        Self {
            state: GeometryState {
                mode,
                ..Default::default()
            },
        }
    }

    /// Start with a caller-supplied ratio, applied once the surface is laid out
    pub fn with_custom_ratio(ratio: f64) -> Result<Self> {
        if !ratio.is_finite() || ratio <= 0.0 {
            return Err(Error::InvalidGeometry(format!(
                "aspect ratio must be positive, got {}",
                ratio
            )));
        }
        Ok(Self {
            state: GeometryState {
                mode: AspectRatioMode::Custom,
                aspect_ratio_value: ratio,
                ..Default::default()
            },
        })
    }

    pub fn state(&self) -> &GeometryState {
        &self.state
    }

    pub fn out_rect(&self) -> Rect {
        self.state.out_rect
    }

    pub fn mode(&self) -> AspectRatioMode {
        self.state.mode
    }

    pub fn aspect_ratio(&self) -> f64 {
        self.state.aspect_ratio_value
    }

    /// Record the size of an incoming frame
    pub fn set_source_size(&mut self, width: u32, height: u32) -> Result<Option<Size>> {
        let size = Size::new(width, height);
        if size == self.state.source {
            return Ok(None);
        }
        let source_ratio = size.aspect_ratio().filter(|_| width > 0).ok_or_else(|| {
            Error::InvalidGeometry(format!("source size {} has a zero dimension", size))
        })?;

        self.state.aspect_ratio_changed = true;
        self.state.source = size;
        self.state.source_aspect_ratio = source_ratio;
        tracing::debug!("Source size {} (aspect ratio {:.4})", size, source_ratio);

        let resize = if self.state.mode == AspectRatioMode::Video
            || self.state.aspect_ratio_value <= 0.0
        {
            self.apply_ratio(source_ratio)
        } else {
            None
        };
        self.state.aspect_ratio_changed = false;
        Ok(resize)
    }

    /// Switch the aspect-ratio policy
    pub fn set_aspect_ratio_mode(&mut self, mode: AspectRatioMode) -> Result<Option<Size>> {
        if mode == self.state.mode {
            return Ok(None);
        }

        let ratio = match mode {
            AspectRatioMode::Surface => {
                if self.state.surface.is_empty() {
                    return Err(Error::InvalidGeometry(
                        "surface is not laid out yet".into(),
                    ));
                }
                self.state.surface.aspect_ratio()
            }
            AspectRatioMode::Video => {
                if self.state.source.is_empty() {
                    return Err(Error::InvalidGeometry(
                        "no source frame received yet".into(),
                    ));
                }
                Some(self.state.source_aspect_ratio)
            }
            AspectRatioMode::Custom => None,
        };

        tracing::debug!("Aspect ratio mode {:?} -> {:?}", self.state.mode, mode);
        self.state.aspect_ratio_changed = true;
        self.state.mode = mode;
        if mode == AspectRatioMode::Surface {
            self.state.out_rect = Rect::from_size(self.state.surface);
        }
        let resize = ratio.and_then(|r| self.apply_ratio(r));
        self.state.aspect_ratio_changed = false;
        Ok(resize)
    }

    /// Set an explicit out ratio; the mode becomes [`AspectRatioMode::Custom`]
    pub fn set_aspect_ratio_value(&mut self, ratio: f64) -> Result<Option<Size>> {
        if !ratio.is_finite() || ratio <= 0.0 {
            return Err(Error::InvalidGeometry(format!(
                "aspect ratio must be positive, got {}",
                ratio
            )));
        }
        if self.state.surface.is_empty() {
            return Err(Error::InvalidGeometry(
                "surface is not laid out yet".into(),
            ));
        }
        Ok(self.apply_ratio(ratio))
    }

    /// Record a new surface size; zero dimensions mean "not laid out"
    pub fn set_surface_size(&mut self, width: u32, height: u32) -> Option<Size> {
        if width == 0 || height == 0 {
            return None;
        }
        let size = Size::new(width, height);
        let surface_changed = std::mem::replace(&mut self.state.surface, size) != size;
        if self.state.mode == AspectRatioMode::Surface {
            self.state.aspect_ratio_value = width as f64 / height as f64;
        }

        let rect = fit_rect(size, self.state.aspect_ratio_value)
            .unwrap_or_else(|_| Rect::from_size(size));
        self.replace_out_rect(rect, surface_changed)
    }

    /// Consume the background-dirty flag
    pub fn take_background_dirty(&mut self) -> bool {
        std::mem::take(&mut self.state.background_dirty)
    }

    pub fn mark_background_dirty(&mut self) {
        self.state.background_dirty = true;
    }

    /// Shared tail of the mode-driven and explicit ratio paths
    fn apply_ratio(&mut self, ratio: f64) -> Option<Size> {
        let ratio_changed = self.state.aspect_ratio_value != ratio;
        self.state.aspect_ratio_value = ratio;
        if !self.state.aspect_ratio_changed {
            self.state.mode = AspectRatioMode::Custom;
        }
        if self.state.mode != AspectRatioMode::Surface {
            self.state.background_dirty = true;
        }

        // Not laid out yet; computed on the first surface size
        let Ok(rect) = fit_rect(self.state.surface, ratio) else {
            return None;
        };
        tracing::debug!("Out rect {} for aspect ratio {:.4}", rect, ratio);
        self.state.out_rect = rect;
        ratio_changed.then(|| rect.size())
    }

    fn replace_out_rect(&mut self, rect: Rect, surface_changed: bool) -> Option<Size> {
        let old = std::mem::replace(&mut self.state.out_rect, rect);
        // A grown surface exposes new margins even when the rect stays put
        if (old != rect || surface_changed) && rect != Rect::from_size(self.state.surface) {
            self.state.background_dirty = true;
        }
        if old == rect {
            return None;
        }
        tracing::debug!("Out rect {} -> {}", old, rect);
        (old.size() != rect.size()).then(|| rect.size())
    }
}
