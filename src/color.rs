//! Color adjustment (brightness, contrast, hue, saturation)
//!
//! The renderer only stores the values. Whether a back-end can apply them is
//! negotiated through a [`ColorStrategy`] chosen at construction.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

/// Adjustable color property
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Adjustment {
    Brightness,
    Contrast,
    Hue,
    Saturation,
}

impl Adjustment {
    pub const ALL: [Adjustment; 4] = [
        Adjustment::Brightness,
        Adjustment::Contrast,
        Adjustment::Hue,
        Adjustment::Saturation,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Adjustment::Brightness => "brightness",
            Adjustment::Contrast => "contrast",
            Adjustment::Hue => "hue",
            Adjustment::Saturation => "saturation",
        }
    }
}

impl std::fmt::Display for Adjustment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Capability check for a rendering back-end
pub trait ColorStrategy: Send + Sync {
    /// Can this value be applied? Must not have side effects.
    fn try_apply(&self, kind: Adjustment, value: f64) -> bool;
}

/// Back-end without color support; rejects everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NoColorSupport;

impl ColorStrategy for NoColorSupport {
    fn try_apply(&self, _kind: Adjustment, _value: f64) -> bool {
        false
    }
}

/// Back-end with a color matrix accepting values in per-property ranges
#[derive(Debug, Clone)]
pub struct ColorMatrixSupport {
    brightness: Option<RangeInclusive<f64>>,
    contrast: Option<RangeInclusive<f64>>,
    hue: Option<RangeInclusive<f64>>,
    saturation: Option<RangeInclusive<f64>>,
}

impl ColorMatrixSupport {
    /// All four properties in `[-1, 1]`
    pub fn new() -> Self {
        Self {
            brightness: Some(-1.0..=1.0),
            contrast: Some(-1.0..=1.0),
            hue: Some(-1.0..=1.0),
            saturation: Some(-1.0..=1.0),
        }
    }

    /// Restrict one property, `None` disables it
    pub fn with_range(mut self, kind: Adjustment, range: Option<RangeInclusive<f64>>) -> Self {
        *self.range_mut(kind) = range;
        self
    }

    fn range(&self, kind: Adjustment) -> Option<&RangeInclusive<f64>> {
        match kind {
            Adjustment::Brightness => self.brightness.as_ref(),
            Adjustment::Contrast => self.contrast.as_ref(),
            Adjustment::Hue => self.hue.as_ref(),
            Adjustment::Saturation => self.saturation.as_ref(),
        }
    }

    fn range_mut(&mut self, kind: Adjustment) -> &mut Option<RangeInclusive<f64>> {
        match kind {
            Adjustment::Brightness => &mut self.brightness,
            Adjustment::Contrast => &mut self.contrast,
            Adjustment::Hue => &mut self.hue,
            Adjustment::Saturation => &mut self.saturation,
        }
    }
}

impl Default for ColorMatrixSupport {
    fn default() -> Self {
        Self::new()
    }
}

impl ColorStrategy for ColorMatrixSupport {
    fn try_apply(&self, kind: Adjustment, value: f64) -> bool {
        self.range(kind).is_some_and(|r| r.contains(&value))
    }
}

/// Stored color values
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorValues {
    pub brightness: f64,
    pub contrast: f64,
    pub hue: f64,
    pub saturation: f64,
}

impl ColorValues {
    pub fn get(&self, kind: Adjustment) -> f64 {
        match kind {
            Adjustment::Brightness => self.brightness,
            Adjustment::Contrast => self.contrast,
            Adjustment::Hue => self.hue,
            Adjustment::Saturation => self.saturation,
        }
    }

    fn slot(&mut self, kind: Adjustment) -> &mut f64 {
        match kind {
            Adjustment::Brightness => &mut self.brightness,
            Adjustment::Contrast => &mut self.contrast,
            Adjustment::Hue => &mut self.hue,
            Adjustment::Saturation => &mut self.saturation,
        }
    }
}

/// Color values gated by a strategy
pub struct ColorAdjustment {
    values: ColorValues,
    strategy: Box<dyn ColorStrategy>,
}

impl ColorAdjustment {
    pub fn new(strategy: Box<dyn ColorStrategy>) -> Self {
        Self {
            values: ColorValues::default(),
            strategy,
        }
    }

    pub fn values(&self) -> ColorValues {
        self.values
    }

    pub fn get(&self, kind: Adjustment) -> f64 {
        self.values.get(kind)
    }

    /// Store `value` if the strategy accepts it
    pub fn set(&mut self, kind: Adjustment, value: f64) -> Result<()> {
        if !self.strategy.try_apply(kind, value) {
            tracing::warn!("{} {} rejected by color strategy", kind, value);
            return Err(Error::UnsupportedAdjustment { kind, value });
        }
        *self.values.slot(kind) = value;
        Ok(())
    }

    /// Apply several values; stops at the first rejection
    pub fn set_all(&mut self, values: &ColorValues) -> Result<()> {
        for kind in Adjustment::ALL {
            let value = values.get(kind);
            if value != self.get(kind) {
                self.set(kind, value)?;
            }
        }
        Ok(())
    }
}

impl Default for ColorAdjustment {
    fn default() -> Self {
        Self::new(Box::new(NoColorSupport))
    }
}

impl std::fmt::Debug for ColorAdjustment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ColorAdjustment")
            .field("values", &self.values)
            .finish_non_exhaustive()
    }
}
