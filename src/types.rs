//! Common types used throughout GhostFrame

use serde::{Deserialize, Serialize};
use std::ops::{Add, Div, Mul, Sub};

/// Pixel dimensions of a frame or surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    // Common sizes
    pub const HD_720P: Self = Self::new(1280, 720);
    pub const FHD_1080P: Self = Self::new(1920, 1080);
    pub const UHD_4K: Self = Self::new(3840, 2160);

    /// Either dimension is zero
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Width / height, `None` when height is zero
    pub fn aspect_ratio(&self) -> Option<f64> {
        if self.height == 0 {
            None
        } else {
            Some(self.width as f64 / self.height as f64)
        }
    }
}

impl std::fmt::Display for Size {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

impl std::str::FromStr for Size {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let (w, h) = s
            .split_once(['x', 'X'])
            .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{}'", s))?;
        let width = w.trim().parse().map_err(|e| format!("bad width '{}': {}", w, e))?;
        let height = h.trim().parse().map_err(|e| format!("bad height '{}': {}", h, e))?;
        Ok(Self::new(width, height))
    }
}

/// Integer rectangle in surface space
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Rectangle anchored at the origin
    pub const fn from_size(size: Size) -> Self {
        Self::new(0, 0, size.width, size.height)
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Check that `self` lies fully inside `[0, bounds.width] x [0, bounds.height]`
    pub fn is_within(&self, bounds: Size) -> bool {
        self.x >= 0
            && self.y >= 0
            && self.x as i64 + self.width as i64 <= bounds.width as i64
            && self.y as i64 + self.height as i64 <= bounds.height as i64
    }
}

impl std::fmt::Display for Rect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}+{}+{}", self.width, self.height, self.x, self.y)
    }
}

/// Floating point coordinate
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PointF {
    pub x: f64,
    pub y: f64,
}

impl PointF {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance, handy for tolerance checks
    pub fn distance(&self, other: PointF) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

impl Add for PointF {
    type Output = PointF;

    fn add(self, rhs: PointF) -> PointF {
        PointF::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for PointF {
    type Output = PointF;

    fn sub(self, rhs: PointF) -> PointF {
        PointF::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for PointF {
    type Output = PointF;

    fn mul(self, rhs: f64) -> PointF {
        PointF::new(self.x * rhs, self.y * rhs)
    }
}

impl Div<f64> for PointF {
    type Output = PointF;

    fn div(self, rhs: f64) -> PointF {
        PointF::new(self.x / rhs, self.y / rhs)
    }
}

/// Floating point rectangle (source space)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RectF {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl RectF {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Positive extent on both axes
    pub fn is_valid(&self) -> bool {
        self.width > 0.0 && self.height > 0.0
    }

    pub fn center(&self) -> PointF {
        PointF::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}

impl From<Rect> for RectF {
    fn from(r: Rect) -> Self {
        RectF::new(r.x as f64, r.y as f64, r.width as f64, r.height as f64)
    }
}

/// Pixel format a surface may accept
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PixelFormat {
    /// NV12 - Y plane + interleaved UV
    Nv12,
    /// YUV420P - Planar YUV 4:2:0
    Yuv420p,
    /// BGRA - 32-bit BGRA
    Bgra,
    /// RGBA - 32-bit RGBA
    #[default]
    Rgba,
    /// RGB24 - 24-bit RGB
    Rgb24,
    /// P010 - 10-bit NV12 (HDR)
    P010,
}

impl PixelFormat {
    /// Bytes per pixel (approximate for planar formats)
    pub fn bytes_per_pixel(&self) -> f32 {
        match self {
            PixelFormat::Nv12 | PixelFormat::Yuv420p => 1.5,
            PixelFormat::Bgra | PixelFormat::Rgba => 4.0,
            PixelFormat::Rgb24 | PixelFormat::P010 => 3.0,
        }
    }

    /// Packed RGB layout that a plain painter can blit directly
    pub fn is_rgb(&self) -> bool {
        matches!(
            self,
            PixelFormat::Bgra | PixelFormat::Rgba | PixelFormat::Rgb24
        )
    }

    pub fn name(&self) -> &'static str {
        match self {
            PixelFormat::Nv12 => "nv12",
            PixelFormat::Yuv420p => "yuv420p",
            PixelFormat::Bgra => "bgra",
            PixelFormat::Rgba => "rgba",
            PixelFormat::Rgb24 => "rgb24",
            PixelFormat::P010 => "p010",
        }
    }
}

impl std::fmt::Display for PixelFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A decoded video frame handed to the renderer
#[derive(Debug, Clone)]
pub struct Frame {
    /// Raw frame data
    pub data: Vec<u8>,
    /// Frame width
    pub width: u32,
    /// Frame height
    pub height: u32,
    /// Pixel format
    pub format: PixelFormat,
    /// Presentation timestamp in microseconds
    pub pts: i64,
}

impl Frame {
    /// Create a new frame with allocated buffer
    pub fn new(width: u32, height: u32, format: PixelFormat) -> Self {
        let size = (width as f32 * height as f32 * format.bytes_per_pixel()) as usize;
        Self {
            data: vec![0u8; size],
            width,
            height,
            format,
            pts: 0,
        }
    }

    /// Create a frame from existing data
    pub fn from_data(data: Vec<u8>, width: u32, height: u32, format: PixelFormat) -> Self {
        Self {
            data,
            width,
            height,
            format,
            pts: 0,
        }
    }

    /// An empty frame, used to signal end of stream
    pub fn invalid() -> Self {
        Self::from_data(Vec::new(), 0, 0, PixelFormat::default())
    }

    pub fn with_pts(mut self, pts: i64) -> Self {
        self.pts = pts;
        self
    }

    /// Non-empty payload with non-zero dimensions
    pub fn is_valid(&self) -> bool {
        self.width > 0 && self.height > 0 && !self.data.is_empty()
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }
}

/// Renderer statistics, handed to every filter stage
#[derive(Debug, Clone, Default)]
pub struct RenderStats {
    /// Frames accepted by `receive`
    pub frames_received: u64,
    /// Invalid frames that cleared the current frame
    pub frames_invalid: u64,
    /// Paint passes that drew a frame
    pub frames_painted: u64,
    /// Paint passes in total
    pub paints: u64,
    /// Background clears
    pub background_clears: u64,
    /// Filter stages that returned an error
    pub filter_failures: u64,
    /// Presentation timestamp of the last painted frame
    pub last_pts: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_size_parse() {
        assert_eq!("1920x1080".parse::<Size>().unwrap(), Size::FHD_1080P);
        assert_eq!(" 800 X 450 ".parse::<Size>().unwrap(), Size::new(800, 450));
        assert!("1920".parse::<Size>().is_err());
        assert!("axb".parse::<Size>().is_err());
    }

    #[test]
    fn test_rect_containment() {
        let surface = Size::new(800, 800);
        assert!(Rect::new(0, 175, 800, 450).is_within(surface));
        assert!(!Rect::new(1, 0, 800, 800).is_within(surface));
        assert!(!Rect::new(-1, 0, 10, 10).is_within(surface));
    }

    #[test]
    fn test_frame_validity() {
        assert!(Frame::new(4, 4, PixelFormat::Rgba).is_valid());
        assert!(!Frame::invalid().is_valid());
        assert!(!Frame::from_data(vec![0; 16], 0, 4, PixelFormat::Rgba).is_valid());
    }

    #[test]
    fn test_point_ops() {
        let p = PointF::new(2.0, 4.0);
        assert_eq!(p * 0.5, PointF::new(1.0, 2.0));
        assert_eq!(p / 2.0 + PointF::new(1.0, 1.0), PointF::new(2.0, 3.0));
        assert_eq!(RectF::new(0.0, 0.0, 10.0, 20.0).center(), PointF::new(5.0, 10.0));
    }
}
