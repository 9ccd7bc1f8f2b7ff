//! GhostFrame - video renderer geometry and compositing core
//!
//! Sits between a decoded frame stream and a drawable surface.
//!
//! # Features
//!
//! - **Geometry**: aspect-ratio policies and letterbox/pillarbox out rectangle
//! - **Mapping**: pointer coordinates between surface and frame space
//! - **Filters**: post-processing chain with subtitle and OSD slots kept last
//! - **Sync**: one producer, one painter, a single pixel lock
//! - **Color**: brightness/contrast/hue/saturation negotiated per back-end
//!
//! # Example
//!
//! ```rust
//! use ghostframe::{Frame, PixelFormat, Rect, Surface, VideoRenderer};
//!
//! struct Window;
//!
//! impl Surface for Window {
//!     fn draw_frame(&self, _frame: &Frame, _target: Rect) {}
//! }
//!
//! fn main() -> ghostframe::Result<()> {
//!     let renderer = VideoRenderer::new(Window);
//!     renderer.resize_surface(800, 800)?;
//!     renderer.receive(Frame::new(1920, 1080, PixelFormat::Rgba))?;
//!     assert_eq!(renderer.video_rect(), Rect::new(0, 175, 800, 450));
//!     renderer.paint();
//!     Ok(())
//! }
//! ```

pub mod color;
pub mod config;
pub mod error;
pub mod filter;
pub mod geometry;
pub mod renderer;
pub mod sync;
pub mod types;

// Re-exports for convenience
pub use color::{Adjustment, ColorAdjustment, ColorMatrixSupport, ColorStrategy, NoColorSupport};
pub use config::{Quality, RendererConfig};
pub use error::{Error, Result};
pub use filter::{ChainReport, Filter, FilterChain, FilterContext, FilterSlot};
pub use geometry::{
    AspectRatioMode, CoordinateMapper, GeometryEngine, GeometryState, RegionOfInterest,
};
pub use renderer::{Surface, VideoRenderer};
pub use sync::{RenderState, RenderSync};
pub use types::{Frame, PixelFormat, PointF, Rect, RectF, RenderStats, Size};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
