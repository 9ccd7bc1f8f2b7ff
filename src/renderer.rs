//! Video renderer
//!
//! Ties geometry, coordinate mapping, the filter chain, color adjustment
//! and the frame handoff together over a [`Surface`] back-end.
//!
//! `receive` is called from the frame producer, `paint` from the painter.
//! Every change to pixel state (source geometry, buffer resize, the current
//! frame) happens under the pixel lock, so a paint never observes a receive
//! or a resize half done. Lock order is pixel lock, then geometry lock.

use crate::color::{Adjustment, ColorAdjustment, ColorStrategy, ColorValues};
use crate::config::{Quality, RendererConfig};
use crate::error::{Error, Result};
use crate::filter::{self, ChainReport, Filter, FilterChain, FilterContext};
use crate::geometry::{AspectRatioMode, CoordinateMapper, GeometryEngine, RegionOfInterest};
use crate::sync::{RenderState, RenderSync, Task};
use crate::types::{Frame, PixelFormat, PointF, Rect, RenderStats, Size};
use parking_lot::Mutex;
use std::sync::Arc;

/// Drawing back-end the renderer drives
pub trait Surface: Send + Sync {
    /// Resize the backing frame buffer; repeated identical sizes must be harmless
    fn resize_frame(&self, _width: u32, _height: u32) -> Result<()> {
        Ok(())
    }

    /// Clear the area around the out rectangle (pixel lock held)
    fn draw_background(&self) {}

    /// Draw a valid frame into `target` (pixel lock held)
    fn draw_frame(&self, frame: &Frame, target: Rect);

    /// Schedule a repaint
    fn request_redraw(&self) {}

    /// Can this back-end consume `format` directly?
    fn is_supported(&self, format: PixelFormat) -> bool {
        format.is_rgb()
    }
}

#[derive(Debug, Clone, Copy)]
struct Settings {
    preferred_format: PixelFormat,
    force_preferred: bool,
    scale_in_renderer: bool,
    quality: Quality,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            preferred_format: PixelFormat::Rgba,
            force_preferred: false,
            scale_in_renderer: true,
            quality: Quality::Default,
        }
    }
}

/// Renderer core over a drawing back-end
pub struct VideoRenderer<S: Surface> {
    surface: S,
    sync: RenderSync,
    geometry: Mutex<GeometryEngine>,
    roi: Mutex<RegionOfInterest>,
    filters: Mutex<FilterChain>,
    color: Mutex<ColorAdjustment>,
    settings: Mutex<Settings>,
    stats: Mutex<RenderStats>,
}

impl<S: Surface> VideoRenderer<S> {
    /// Renderer without color support
    pub fn new(surface: S) -> Self {
        Self::with_color_strategy(surface, Box::new(crate::color::NoColorSupport))
    }

    pub fn with_color_strategy(surface: S, strategy: Box<dyn ColorStrategy>) -> Self {
        Self {
            surface,
            sync: RenderSync::new(),
            geometry: Mutex::new(GeometryEngine::new()),
            roi: Mutex::new(RegionOfInterest::full()),
            filters: Mutex::new(FilterChain::new()),
            color: Mutex::new(ColorAdjustment::new(strategy)),
            settings: Mutex::new(Settings::default()),
            stats: Mutex::new(RenderStats::default()),
        }
    }

    /// Build a renderer and apply `config`
    pub fn with_config(
        surface: S,
        strategy: Box<dyn ColorStrategy>,
        config: &RendererConfig,
    ) -> Result<Self> {
        config.validate()?;
        let renderer = Self::with_color_strategy(surface, strategy);

        let engine = match (config.aspect_ratio_mode, config.custom_aspect_ratio) {
            (AspectRatioMode::Custom, Some(ratio)) => GeometryEngine::with_custom_ratio(ratio)?,
            (mode, _) => GeometryEngine::with_mode(mode),
        };
        *renderer.geometry.lock() = engine;
        *renderer.roi.lock() = config.region_of_interest;

        if let Some(format) = config.preferred_format {
            renderer.set_preferred_format(format)?;
        }
        {
            let mut settings = renderer.settings.lock();
            settings.force_preferred = config.force_preferred_format;
            settings.scale_in_renderer = config.scale_in_renderer;
            settings.quality = config.quality;
        }
        renderer.color.lock().set_all(&config.color)?;

        Ok(renderer)
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn open(&self) -> Result<()> {
        Ok(())
    }

    pub fn close(&self) -> Result<()> {
        Ok(())
    }

    // --- Frame handoff ---

    /// Deliver a frame (producer thread)
    ///
    /// An invalid frame clears the current one. Fails only when the backing
    /// buffer resize fails, in which case the frame is not stored.
    pub fn receive(&self, frame: impl Into<Arc<Frame>>) -> Result<()> {
        let frame = frame.into();
        if !frame.is_valid() {
            tracing::debug!("Invalid frame received, clearing current frame");
            self.sync.store(None);
            self.stats.lock().frames_invalid += 1;
            return Ok(());
        }

        let (width, height) = (frame.width, frame.height);
        self.sync.store_with(frame, || {
            let resize = self.geometry.lock().set_source_size(width, height)?;
            match resize {
                Some(size) => self.resize_frame(size),
                None => Ok(()),
            }
        })?;
        self.stats.lock().frames_received += 1;
        Ok(())
    }

    /// Paint the current frame and run the filter chain (painter thread)
    pub fn paint(&self) -> ChainReport {
        let (context, drew_background) = self.sync.paint_locked(|frame| {
            let (dirty, video_rect, surface) = {
                let mut geometry = self.geometry.lock();
                let dirty = geometry.take_background_dirty();
                (dirty, geometry.out_rect(), geometry.state().surface)
            };

            // Keep going after the background: the frame is drawn in the same pass
            if dirty {
                self.surface.draw_background();
            }

            let mut context = FilterContext {
                video_rect,
                surface,
                ..Default::default()
            };
            if let Some(frame) = frame.filter(|f| f.is_valid()) {
                self.surface.draw_frame(frame, video_rect);
                context.frame = frame.size();
                context.pts = Some(frame.pts);
            }
            (context, dirty)
        });

        let stats = {
            let mut stats = self.stats.lock();
            stats.paints += 1;
            if drew_background {
                stats.background_clears += 1;
            }
            if context.pts.is_some() {
                stats.frames_painted += 1;
                stats.last_pts = context.pts;
            }
            stats.clone()
        };

        let tasks = self.sync.drain_tasks();
        if tasks > 0 {
            tracing::trace!("Ran {} pending tasks", tasks);
        }

        let stages = self.filters.lock().snapshot();
        if stages.is_empty() {
            return ChainReport::default();
        }
        let report = filter::run_stages(&stages, &context, &stats);
        if report.failed > 0 {
            self.stats.lock().filter_failures += report.failed as u64;
        }
        report
    }

    /// Run `task` after the next paint, outside the pixel lock
    pub fn post_task(&self, task: impl FnOnce() + Send + 'static) {
        let task: Task = Box::new(task);
        self.sync.post_task(task);
    }

    pub fn render_state(&self) -> RenderState {
        self.sync.state()
    }

    pub fn current_frame(&self) -> Option<Arc<Frame>> {
        self.sync.current_frame()
    }

    pub fn stats(&self) -> RenderStats {
        self.stats.lock().clone()
    }

    // --- Geometry ---

    /// Surface resize notification; zero dimensions are ignored
    pub fn resize_surface(&self, width: u32, height: u32) -> Result<()> {
        self.update_geometry(|geometry| Ok(geometry.set_surface_size(width, height)))
    }

    pub fn set_aspect_ratio_mode(&self, mode: AspectRatioMode) -> Result<()> {
        self.update_geometry(|geometry| geometry.set_aspect_ratio_mode(mode))
    }

    pub fn aspect_ratio_mode(&self) -> AspectRatioMode {
        self.geometry.lock().mode()
    }

    /// Explicit out ratio; switches to [`AspectRatioMode::Custom`]
    pub fn set_aspect_ratio(&self, ratio: f64) -> Result<()> {
        self.update_geometry(|geometry| geometry.set_aspect_ratio_value(ratio))
    }

    pub fn aspect_ratio(&self) -> f64 {
        self.geometry.lock().aspect_ratio()
    }

    /// Surface region the frame occupies
    pub fn video_rect(&self) -> Rect {
        self.geometry.lock().out_rect()
    }

    pub fn surface_size(&self) -> Size {
        self.geometry.lock().state().surface
    }

    pub fn frame_size(&self) -> Size {
        self.geometry.lock().state().source
    }

    pub fn needs_background_update(&self) -> bool {
        self.geometry.lock().state().background_dirty
    }

    /// Apply a geometry change and any buffer resize it asks for, pixel lock held
    fn update_geometry(
        &self,
        update: impl FnOnce(&mut GeometryEngine) -> Result<Option<Size>>,
    ) -> Result<()> {
        self.sync.with_pixels_locked(|| {
            let resize = update(&mut self.geometry.lock())?;
            match resize {
                Some(size) => self.resize_frame(size),
                None => Ok(()),
            }
        })
    }

    fn resize_frame(&self, size: Size) -> Result<()> {
        tracing::debug!("Resizing frame buffer to {}", size);
        self.surface
            .resize_frame(size.width, size.height)
            .map_err(|e| match e {
                e @ Error::FrameResize { .. } => e,
                other => Error::FrameResize {
                    width: size.width,
                    height: size.height,
                    reason: other.to_string(),
                },
            })
    }

    // --- Region of interest ---

    pub fn set_region_of_interest(&self, roi: RegionOfInterest) {
        *self.roi.lock() = roi;
    }

    pub fn region_of_interest(&self) -> RegionOfInterest {
        *self.roi.lock()
    }

    /// Mapper for the current geometry and region of interest
    pub fn mapper(&self) -> Result<CoordinateMapper> {
        let (surface, source) = {
            let geometry = self.geometry.lock();
            (geometry.state().surface, geometry.state().source)
        };
        CoordinateMapper::new(surface, source, &self.region_of_interest())
    }

    /// Surface point -> frame point
    pub fn map_to_frame(&self, p: PointF) -> Result<PointF> {
        Ok(self.mapper()?.to_frame(p))
    }

    /// Frame point -> surface point
    pub fn map_from_frame(&self, p: PointF) -> Result<PointF> {
        Ok(self.mapper()?.to_surface(p))
    }

    // --- Filters ---

    pub fn append_filter(&self, filter: &Arc<dyn Filter>) {
        self.filters.lock().append(filter);
    }

    pub fn remove_filter(&self, filter: &Arc<dyn Filter>) -> bool {
        self.filters.lock().remove(filter)
    }

    pub fn set_subtitle_filter(&self, filter: Option<&Arc<dyn Filter>>) -> Option<Arc<dyn Filter>> {
        self.filters.lock().set_subtitle_filter(filter)
    }

    pub fn subtitle_filter(&self) -> Option<Arc<dyn Filter>> {
        self.filters.lock().subtitle_filter()
    }

    pub fn set_osd_filter(&self, filter: Option<&Arc<dyn Filter>>) -> Option<Arc<dyn Filter>> {
        self.filters.lock().set_osd_filter(filter)
    }

    pub fn osd_filter(&self) -> Option<Arc<dyn Filter>> {
        self.filters.lock().osd_filter()
    }

    pub fn filter_count(&self) -> usize {
        self.filters.lock().len()
    }

    // --- Color ---

    /// Store an adjustment and request a redraw if the back-end accepts it
    pub fn set_color(&self, kind: Adjustment, value: f64) -> Result<()> {
        self.color.lock().set(kind, value)?;
        self.surface.request_redraw();
        Ok(())
    }

    pub fn color(&self, kind: Adjustment) -> f64 {
        self.color.lock().get(kind)
    }

    pub fn color_values(&self) -> ColorValues {
        self.color.lock().values()
    }

    pub fn set_brightness(&self, value: f64) -> Result<()> {
        self.set_color(Adjustment::Brightness, value)
    }

    pub fn brightness(&self) -> f64 {
        self.color(Adjustment::Brightness)
    }

    pub fn set_contrast(&self, value: f64) -> Result<()> {
        self.set_color(Adjustment::Contrast, value)
    }

    pub fn contrast(&self) -> f64 {
        self.color(Adjustment::Contrast)
    }

    pub fn set_hue(&self, value: f64) -> Result<()> {
        self.set_color(Adjustment::Hue, value)
    }

    pub fn hue(&self) -> f64 {
        self.color(Adjustment::Hue)
    }

    pub fn set_saturation(&self, value: f64) -> Result<()> {
        self.set_color(Adjustment::Saturation, value)
    }

    pub fn saturation(&self) -> f64 {
        self.color(Adjustment::Saturation)
    }

    // --- Pixel format negotiation ---

    pub fn is_supported(&self, format: PixelFormat) -> bool {
        self.surface.is_supported(format)
    }

    pub fn set_preferred_format(&self, format: PixelFormat) -> Result<()> {
        if !self.is_supported(format) {
            tracing::warn!("Pixel format '{}' is not supported", format);
            return Err(Error::UnsupportedFormat(format));
        }
        self.settings.lock().preferred_format = format;
        Ok(())
    }

    pub fn preferred_format(&self) -> PixelFormat {
        self.settings.lock().preferred_format
    }

    pub fn force_preferred_format(&self, force: bool) {
        self.settings.lock().force_preferred = force;
    }

    pub fn is_preferred_format_forced(&self) -> bool {
        self.settings.lock().force_preferred
    }

    // --- Misc settings ---

    pub fn set_scale_in_renderer(&self, enabled: bool) {
        self.settings.lock().scale_in_renderer = enabled;
    }

    pub fn scale_in_renderer(&self) -> bool {
        self.settings.lock().scale_in_renderer
    }

    pub fn set_quality(&self, quality: Quality) {
        tracing::debug!("Quality: {:?}", quality);
        self.settings.lock().quality = quality;
    }

    pub fn quality(&self) -> Quality {
        self.settings.lock().quality
    }
}

impl<S: Surface + std::fmt::Debug> std::fmt::Debug for VideoRenderer<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VideoRenderer")
            .field("surface", &self.surface)
            .field("geometry", &*self.geometry.lock())
            .field("sync", &self.sync)
            .field("filters", &*self.filters.lock())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::ColorMatrixSupport;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        Resize(u32, u32),
        Background,
        Frame(u32, u32, Rect),
        Redraw,
    }

    #[derive(Debug, Default)]
    struct RecordingSurface {
        calls: Mutex<Vec<Call>>,
        fail_resize: AtomicBool,
    }

    impl RecordingSurface {
        fn take(&self) -> Vec<Call> {
            std::mem::take(&mut *self.calls.lock())
        }
    }

    impl Surface for RecordingSurface {
        fn resize_frame(&self, width: u32, height: u32) -> Result<()> {
            if self.fail_resize.load(Ordering::SeqCst) {
                return Err(Error::FrameResize {
                    width,
                    height,
                    reason: "out of memory".into(),
                });
            }
            self.calls.lock().push(Call::Resize(width, height));
            Ok(())
        }

        fn draw_background(&self) {
            self.calls.lock().push(Call::Background);
        }

        fn draw_frame(&self, frame: &Frame, target: Rect) {
            self.calls
                .lock()
                .push(Call::Frame(frame.width, frame.height, target));
        }

        fn request_redraw(&self) {
            self.calls.lock().push(Call::Redraw);
        }
    }

    fn frame(width: u32, height: u32) -> Frame {
        Frame::new(width, height, PixelFormat::Rgba)
    }

    #[test]
    fn test_letterbox_paint_cycle() {
        let renderer = VideoRenderer::new(RecordingSurface::default());
        renderer.resize_surface(800, 800).unwrap();
        renderer.receive(frame(1920, 1080)).unwrap();
        assert_eq!(renderer.render_state(), RenderState::FrameReady);
        assert!(renderer.needs_background_update());

        let calls = renderer.surface().take();
        assert_eq!(calls, vec![Call::Resize(800, 800), Call::Resize(800, 450)]);

        renderer.paint();
        let target = Rect::new(0, 175, 800, 450);
        assert_eq!(
            renderer.surface().take(),
            vec![Call::Background, Call::Frame(1920, 1080, target)]
        );
        assert_eq!(renderer.render_state(), RenderState::Idle);

        // Background is cleared once, the frame is drawn every time
        renderer.paint();
        assert_eq!(renderer.surface().take(), vec![Call::Frame(1920, 1080, target)]);

        let stats = renderer.stats();
        assert_eq!(stats.paints, 2);
        assert_eq!(stats.frames_painted, 2);
        assert_eq!(stats.background_clears, 1);
    }

    #[test]
    fn test_matching_ratio_fills_surface() {
        let renderer = VideoRenderer::new(RecordingSurface::default());
        renderer.resize_surface(800, 450).unwrap();
        renderer.receive(frame(1920, 1080)).unwrap();
        assert_eq!(renderer.video_rect(), Rect::new(0, 0, 800, 450));
        assert_eq!(renderer.frame_size(), Size::FHD_1080P);
        assert_eq!(renderer.surface_size(), Size::new(800, 450));
    }

    #[test]
    fn test_invalid_frame_clears_without_drawing() {
        let renderer = VideoRenderer::new(RecordingSurface::default());
        renderer.resize_surface(640, 480).unwrap();
        renderer.receive(frame(640, 480)).unwrap();
        renderer.receive(Frame::invalid()).unwrap();
        renderer.surface().take();

        renderer.paint();
        assert!(renderer
            .surface()
            .take()
            .iter()
            .all(|c| !matches!(c, Call::Frame(..))));
        assert_eq!(renderer.stats().frames_invalid, 1);
        assert_eq!(renderer.frame_size(), Size::new(640, 480));
    }

    #[test]
    fn test_resize_failure_rejects_frame() {
        let renderer = VideoRenderer::new(RecordingSurface::default());
        renderer.resize_surface(800, 800).unwrap();
        renderer.surface().fail_resize.store(true, Ordering::SeqCst);

        let err = renderer.receive(frame(1920, 1080)).unwrap_err();
        assert!(matches!(err, Error::FrameResize { .. }));
        assert!(renderer.current_frame().is_none());
        assert_eq!(renderer.render_state(), RenderState::Idle);
    }

    #[test]
    fn test_rejected_brightness_keeps_state() {
        let renderer = VideoRenderer::new(RecordingSurface::default());
        let err = renderer.set_brightness(5.0).unwrap_err();
        assert!(err.is_capability_failure());
        assert_eq!(renderer.brightness(), 0.0);
        assert!(renderer.surface().take().is_empty());
    }

    #[test]
    fn test_accepted_color_requests_redraw() {
        let renderer = VideoRenderer::with_color_strategy(
            RecordingSurface::default(),
            Box::new(ColorMatrixSupport::new()),
        );
        renderer.set_saturation(0.5).unwrap();
        renderer.set_contrast(-0.25).unwrap();
        assert_eq!(renderer.saturation(), 0.5);
        assert_eq!(renderer.contrast(), -0.25);
        assert_eq!(renderer.surface().take(), vec![Call::Redraw, Call::Redraw]);
        assert!(renderer.set_hue(3.0).is_err());
        assert!(renderer.surface().take().is_empty());
    }

    #[test]
    fn test_preferred_format_negotiation() {
        let renderer = VideoRenderer::new(RecordingSurface::default());
        assert_eq!(renderer.preferred_format(), PixelFormat::Rgba);

        renderer.set_preferred_format(PixelFormat::Bgra).unwrap();
        assert_eq!(renderer.preferred_format(), PixelFormat::Bgra);

        let err = renderer.set_preferred_format(PixelFormat::Nv12).unwrap_err();
        assert!(matches!(err, Error::UnsupportedFormat(PixelFormat::Nv12)));
        assert_eq!(renderer.preferred_format(), PixelFormat::Bgra);

        renderer.force_preferred_format(true);
        assert!(renderer.is_preferred_format_forced());
    }

    #[test]
    fn test_mapping_through_renderer() {
        let renderer = VideoRenderer::new(RecordingSurface::default());
        assert!(matches!(
            renderer.map_to_frame(PointF::new(1.0, 1.0)),
            Err(Error::DegenerateMapping(_))
        ));

        renderer.resize_surface(800, 450).unwrap();
        renderer.receive(frame(1920, 1080)).unwrap();
        renderer.set_region_of_interest(RegionOfInterest::new(0.5, 0.5, 0.5, 0.5));

        // Surface center lands on the center of the bottom-right quadrant
        let p = renderer.map_to_frame(PointF::new(400.0, 225.0)).unwrap();
        assert!(p.distance(PointF::new(1440.0, 810.0)) < 1e-9);
        let back = renderer.map_from_frame(p).unwrap();
        assert!(back.distance(PointF::new(400.0, 225.0)) < 1e-9);
    }

    struct CountingFilter {
        runs: AtomicUsize,
        saw_rect: Mutex<Option<Rect>>,
    }

    impl Filter for CountingFilter {
        fn name(&self) -> &str {
            "counting"
        }

        fn process(&self, context: &FilterContext, _stats: &RenderStats) -> Result<()> {
            self.runs.fetch_add(1, Ordering::SeqCst);
            *self.saw_rect.lock() = Some(context.video_rect);
            Ok(())
        }
    }

    struct BrokenFilter;

    impl Filter for BrokenFilter {
        fn process(&self, _context: &FilterContext, _stats: &RenderStats) -> Result<()> {
            Err(Error::filter("broken", "always fails"))
        }
    }

    #[test]
    fn test_filters_run_after_paint() {
        let renderer = VideoRenderer::new(RecordingSurface::default());
        renderer.resize_surface(800, 800).unwrap();
        renderer.receive(frame(1920, 1080)).unwrap();

        let counting = Arc::new(CountingFilter {
            runs: AtomicUsize::new(0),
            saw_rect: Mutex::new(None),
        });
        let osd: Arc<dyn Filter> = counting.clone();
        let broken: Arc<dyn Filter> = Arc::new(BrokenFilter);
        renderer.set_osd_filter(Some(&osd));
        renderer.append_filter(&broken);
        assert_eq!(renderer.filter_count(), 2);

        let report = renderer.paint();
        assert_eq!(report.processed, 1);
        assert_eq!(report.failed, 1);
        assert_eq!(counting.runs.load(Ordering::SeqCst), 1);
        assert_eq!(*counting.saw_rect.lock(), Some(Rect::new(0, 175, 800, 450)));
        assert_eq!(renderer.stats().filter_failures, 1);

        drop(osd);
        drop(counting);
        let report = renderer.paint();
        assert_eq!(report.skipped, 1);
    }

    #[test]
    fn test_pending_tasks_run_outside_lock() {
        let renderer = Arc::new(VideoRenderer::new(RecordingSurface::default()));
        renderer.resize_surface(320, 240).unwrap();
        renderer.receive(frame(320, 240)).unwrap();

        let observed = Arc::new(Mutex::new(None));
        let handle = renderer.clone();
        let seen = observed.clone();
        // Touches the pixel lock; would deadlock if run while painting
        renderer.post_task(move || {
            *seen.lock() = Some(handle.render_state());
        });
        renderer.paint();
        assert_eq!(*observed.lock(), Some(RenderState::Idle));
    }

    #[test]
    fn test_aspect_mode_changes_through_renderer() {
        let renderer = VideoRenderer::new(RecordingSurface::default());
        renderer.resize_surface(800, 800).unwrap();
        renderer.receive(frame(1920, 1080)).unwrap();
        renderer.surface().take();

        renderer.set_aspect_ratio_mode(AspectRatioMode::Surface).unwrap();
        assert_eq!(renderer.video_rect(), Rect::new(0, 0, 800, 800));
        assert_eq!(renderer.surface().take(), vec![Call::Resize(800, 800)]);

        // Same mode again: nothing happens
        renderer.set_aspect_ratio_mode(AspectRatioMode::Surface).unwrap();
        assert!(renderer.surface().take().is_empty());

        renderer.set_aspect_ratio(2.0).unwrap();
        assert_eq!(renderer.aspect_ratio_mode(), AspectRatioMode::Custom);
        assert_eq!(renderer.video_rect(), Rect::new(0, 200, 800, 400));
    }

    #[test]
    fn test_with_config() {
        let config = RendererConfig::default()
            .with_custom_aspect_ratio(2.0)
            .with_quality(Quality::Best)
            .with_preferred_format(PixelFormat::Bgra)
            .with_color(ColorValues {
                brightness: 0.3,
                ..Default::default()
            });
        let renderer = VideoRenderer::with_config(
            RecordingSurface::default(),
            Box::new(ColorMatrixSupport::new()),
            &config,
        )
        .unwrap();
        renderer.resize_surface(800, 800).unwrap();

        assert_eq!(renderer.video_rect(), Rect::new(0, 200, 800, 400));
        assert_eq!(renderer.quality(), Quality::Best);
        assert_eq!(renderer.preferred_format(), PixelFormat::Bgra);
        assert_eq!(renderer.brightness(), 0.3);

        // Color values the back-end cannot apply are a configuration failure
        let err = VideoRenderer::with_config(
            RecordingSurface::default(),
            Box::new(crate::color::NoColorSupport),
            &config,
        )
        .unwrap_err();
        assert!(err.is_capability_failure());
    }

    /// Surface that checks each draw against the geometry of the frame drawn
    #[derive(Default)]
    struct CheckingSurface {
        resizing: AtomicBool,
        drawn: AtomicUsize,
        mismatched: AtomicUsize,
        overlapped: AtomicUsize,
    }

    impl Surface for CheckingSurface {
        fn resize_frame(&self, _width: u32, _height: u32) -> Result<()> {
            self.resizing.store(true, Ordering::SeqCst);
            std::thread::sleep(std::time::Duration::from_micros(100));
            self.resizing.store(false, Ordering::SeqCst);
            Ok(())
        }

        fn draw_frame(&self, frame: &Frame, target: Rect) {
            if self.resizing.load(Ordering::SeqCst) {
                self.overlapped.fetch_add(1, Ordering::SeqCst);
            }
            let ratio = frame.width as f64 / frame.height as f64;
            let expected = crate::geometry::fit_rect(Size::new(640, 480), ratio).ok();
            if expected != Some(target) {
                self.mismatched.fetch_add(1, Ordering::SeqCst);
            }
            self.drawn.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn test_paint_sees_receive_whole() {
        let renderer = Arc::new(VideoRenderer::new(CheckingSurface::default()));
        renderer.resize_surface(640, 480).unwrap();

        // Alternating ratios make every receive move the out rect and resize
        let producer = {
            let renderer = renderer.clone();
            std::thread::spawn(move || {
                for i in 0..500i64 {
                    let (w, h) = if i % 2 == 0 { (16, 9) } else { (4, 3) };
                    let frame = Frame::new(w, h, PixelFormat::Rgba).with_pts(i);
                    renderer.receive(frame).unwrap();
                }
            })
        };

        let painter = {
            let renderer = renderer.clone();
            std::thread::spawn(move || {
                for _ in 0..3000 {
                    renderer.paint();
                }
            })
        };

        producer.join().unwrap();
        painter.join().unwrap();
        renderer.paint();

        let surface = renderer.surface();
        assert!(surface.drawn.load(Ordering::SeqCst) > 0);
        assert_eq!(surface.mismatched.load(Ordering::SeqCst), 0);
        assert_eq!(surface.overlapped.load(Ordering::SeqCst), 0);
        assert_eq!(renderer.stats().frames_received, 500);
        assert_eq!(renderer.stats().paints, 3001);
    }
}
