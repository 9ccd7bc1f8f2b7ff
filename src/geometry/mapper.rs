//! Surface <-> frame coordinate mapping

use crate::error::{Error, Result};
use crate::types::{PointF, RectF, Size};
use serde::{Deserialize, Serialize};

/// Sub-rectangle of the source frame mapped onto the surface
///
/// Each component is read on its own: a magnitude strictly below 1 is a
/// fraction of the source size, anything else is in source pixels. A
/// region with a non-positive width or height selects the whole frame.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RegionOfInterest {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl RegionOfInterest {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// The whole source frame
    pub const fn full() -> Self {
        Self::new(0.0, 0.0, 0.0, 0.0)
    }

    pub fn is_full(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    /// Resolve into absolute source pixels
    pub fn resolve(&self, source: Size) -> RectF {
        let sw = source.width as f64;
        let sh = source.height as f64;
        if self.is_full() {
            return RectF::new(0.0, 0.0, sw, sh);
        }

        let scale = |v: f64, extent: f64| if v.abs() < 1.0 { v * extent } else { v };
        RectF::new(
            scale(self.x, sw),
            scale(self.y, sh),
            scale(self.width, sw),
            scale(self.height, sh),
        )
    }
}

impl From<RectF> for RegionOfInterest {
    fn from(r: RectF) -> Self {
        Self::new(r.x, r.y, r.width, r.height)
    }
}

/// Snapshot mapping between surface space and frame space
///
/// The region of interest is scaled uniformly onto the surface, driven by
/// the more constraining axis, and both centers coincide.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinateMapper {
    surface_center: PointF,
    roi: RectF,
    zoom: f64,
}

impl CoordinateMapper {
    pub fn new(surface: Size, source: Size, roi: &RegionOfInterest) -> Result<Self> {
        if surface.is_empty() {
            return Err(Error::DegenerateMapping(format!(
                "surface {} has a zero dimension",
                surface
            )));
        }

        let roi = roi.resolve(source);
        let zoom = (roi.width / surface.width as f64).max(roi.height / surface.height as f64);
        if !zoom.is_finite() || zoom <= 0.0 {
            return Err(Error::DegenerateMapping(format!(
                "region {:?} of source {} has no extent",
                roi, source
            )));
        }

        Ok(Self {
            surface_center: PointF::new(surface.width as f64 / 2.0, surface.height as f64 / 2.0),
            roi,
            zoom,
        })
    }

    /// Source pixels per surface pixel
    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    /// Resolved region of interest in source pixels
    pub fn roi(&self) -> RectF {
        self.roi
    }

    /// Surface point -> frame point
    pub fn to_frame(&self, p: PointF) -> PointF {
        self.roi.center() + (p - self.surface_center) * self.zoom
    }

    /// Frame point -> surface point
    pub fn to_surface(&self, q: PointF) -> PointF {
        self.surface_center + (q - self.roi.center()) / self.zoom
    }
}
