use crate::resource::Holders;
use crate::*;
use log::{debug, warn};
use std::ops::{Deref, DerefMut};
use std::rc::Rc;

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum AntialiasMode {
    None,
    #[default]
    Default,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum InterpolationQuality {
    None,
    Fast,
    #[default]
    Default,
    Good,
    Best,
}

impl InterpolationQuality {
    /// The native interpolation mode, if the backend supports this quality.
    #[inline]
    pub fn interpolation(&self) -> Option<Interpolation> {
        match self {
            Self::None | Self::Fast => Some(Interpolation::NearestNeighbor),
            Self::Default | Self::Good => Some(Interpolation::Linear),
            Self::Best => None,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum CompositionMode {
    Clear,
    Source,
    #[default]
    Over,
    In,
    Out,
    Atop,
    Dest,
    DestOver,
    DestIn,
    DestOut,
    DestAtop,
    Xor,
    Add,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum SessionState {
    /// No render target exists yet, or it was discarded.
    Uninitialized,
    /// A render target is bound; no frame is open.
    Idle,
    /// Between BeginDraw and EndDraw.
    Drawing,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct ContextOptions {
    /// Shift odd-width strokes by half a pixel.
    pub offset_enabled: bool,
    pub antialias: AntialiasMode,
    pub interpolation: InterpolationQuality,
}

impl Default for ContextOptions {
    #[inline]
    fn default() -> Self {
        Self {
            offset_enabled: false,
            antialias: AntialiasMode::Default,
            interpolation: InterpolationQuality::Default,
        }
    }
}

struct SavedState<B: Backend> {
    block: B::StateBlock,
    clip: Option<(Rect<f32>, Matrix)>,
    antialias: AntialiasMode,
    interpolation: InterpolationQuality,
    composition: CompositionMode,
}

/// Translates the target by half a pixel for one stroke and puts the exact
/// previous transform back when dropped.
struct OffsetScope<'a, B: Backend> {
    target: &'a mut B::RenderTarget,
    saved: Option<Matrix>,
}

impl<'a, B: Backend> OffsetScope<'a, B> {
    fn new(target: &'a mut B::RenderTarget, offset: bool) -> Self {
        let saved = offset.then(|| {
            let saved = target.transform();
            target.set_transform(&Matrix::translation(0.5, 0.5).then(&saved));
            saved
        });
        Self { target, saved }
    }
}

impl<'a, B: Backend> Deref for OffsetScope<'a, B> {
    type Target = B::RenderTarget;

    #[inline]
    fn deref(&self) -> &Self::Target {
        self.target
    }
}

impl<'a, B: Backend> DerefMut for OffsetScope<'a, B> {
    #[inline]
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.target
    }
}

impl<'a, B: Backend> Drop for OffsetScope<'a, B> {
    fn drop(&mut self) {
        if let Some(saved) = self.saved.take() {
            self.target.set_transform(&saved);
        }
    }
}

/// A drawing session on one surface.
///
/// The render target is created by the first call that needs it, and a frame
/// is opened (BeginDraw) by the first drawing call after the previous frame was
/// committed. `flush` and dropping the context commit the open frame.
pub struct Context<B: Backend> {
    backend: B,
    surface: B::Surface,
    target: Option<B::RenderTarget>,
    drawing: bool,
    clip: Option<(Rect<f32>, Matrix)>,
    clip_pushed: bool,
    states: Vec<SavedState<B>>,
    holders: Holders<B>,
    pen: Option<Pen<B>>,
    brush: Option<Brush<B>>,
    options: ContextOptions,
    composition: CompositionMode,
}

impl<B: Backend> Context<B> {
    pub(crate) fn new(backend: &B, surface: B::Surface, options: ContextOptions) -> Self {
        debug!("new context for {:?} surface", surface.kind());
        Self {
            backend: backend.clone(),
            surface,
            target: None,
            drawing: false,
            clip: None,
            clip_pushed: false,
            states: Vec::new(),
            holders: Holders::new(),
            pen: None,
            brush: None,
            options,
            composition: CompositionMode::Over,
        }
    }

    #[inline]
    pub fn surface(&self) -> &B::Surface {
        &self.surface
    }

    #[inline]
    pub fn native_target(&self) -> Option<&B::RenderTarget> {
        self.target.as_ref()
    }

    #[inline]
    pub fn state(&self) -> SessionState {
        match (&self.target, self.drawing) {
            (None, _) => SessionState::Uninitialized,
            (Some(_), false) => SessionState::Idle,
            (Some(_), true) => SessionState::Drawing,
        }
    }

    /// The surface's current client size.
    #[inline]
    pub fn size(&self) -> Size<u32> {
        self.surface.client_size()
    }

    fn ensure_target(&mut self) -> Result<()> {
        if self.target.is_none() {
            let mut target = self.backend.create_render_target(&self.surface)?;
            target.set_antialias_mode(self.options.antialias);
            let size = target.pixel_size();
            debug!(
                "created render target {:?} ({}x{})",
                target.id(),
                size.width,
                size.height
            );
            self.target = Some(target);
        }
        Ok(())
    }

    fn reconcile_size(&mut self) -> Result<()> {
        let wanted = self.surface.client_size();
        let target = self.target_mut()?;
        if same_size(&target.pixel_size(), &wanted) {
            return Ok(());
        }
        debug!(
            "resize render target {:?} to {}x{}",
            target.id(),
            wanted.width,
            wanted.height
        );
        match target.resize(wanted) {
            Ok(()) => Ok(()),
            Err(Error::DeviceLost) => {
                warn!("device lost while resizing; recreating the render target");
                self.discard();
                self.ensure_target()
            }
            Err(e) => Err(e),
        }
    }

    /// Binds a render target and opens a frame if none is open.
    fn activate(&mut self) -> Result<()> {
        self.ensure_target()?;
        self.reconcile_size()?;
        if !self.drawing {
            let clip = self.clip;
            let target = self.target_mut()?;
            target.begin_draw();
            if let Some((r, m)) = clip {
                push_clip::<B>(target, r, &m);
            }
            self.clip_pushed = clip.is_some();
            self.drawing = true;
        }
        Ok(())
    }

    #[inline]
    fn target_mut(&mut self) -> Result<&mut B::RenderTarget> {
        self.target
            .as_mut()
            .ok_or(Error::UsageFault("no render target is bound"))
    }

    /// Drops the render target and every realization made against it.
    fn discard(&mut self) {
        if let Some(target) = self.target.take() {
            let released = self.holders.release_all(target.id());
            debug!(
                "discarded render target {:?}, released {} resources",
                target.id(),
                released
            );
        }
        self.drawing = false;
        self.clip_pushed = false;
    }

    fn end_frame(&mut self) -> Result<()> {
        if !self.drawing {
            return Ok(());
        }
        self.drawing = false;
        let clip_pushed = std::mem::replace(&mut self.clip_pushed, false);
        let Some(target) = self.target.as_mut() else {
            return Ok(());
        };
        if clip_pushed {
            target.pop_axis_aligned_clip();
        }
        match target.end_draw() {
            Ok(()) => Ok(()),
            Err(Error::DeviceLost) => {
                warn!("device lost at end of frame; discarding the render target");
                self.discard();
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    /// Runs `f` inside an open frame. If `f` reports device loss, the render
    /// target is discarded and `f` runs once more against a new one.
    fn recovering<T>(&mut self, mut f: impl FnMut(&mut Self) -> Result<T>) -> Result<T> {
        self.activate()?;
        match f(self) {
            Err(Error::DeviceLost) => {
                warn!("device lost while realizing resources; recreating the render target");
                self.discard();
                self.activate()?;
                match f(self) {
                    Err(Error::DeviceLost) => {
                        self.discard();
                        Err(Error::Render(
                            "device lost again on a recreated render target".into(),
                        ))
                    }
                    r => r,
                }
            }
            r => r,
        }
    }

    /// Realizes a descriptor against the bound target and tracks it for bulk
    /// release.
    fn realize(&mut self, holder: Rc<dyn DeviceResource<B>>) -> Result<()> {
        self.recovering(|ctx| {
            holder.acquire(ctx.target_mut()?)?;
            ctx.holders.track(holder.clone());
            Ok(())
        })
    }

    /// Commits the open frame. The next drawing call opens a new one.
    #[inline]
    pub fn flush(&mut self) -> Result<()> {
        self.end_frame()
    }

    #[inline]
    pub fn set_pen(&mut self, pen: Option<Pen<B>>) {
        self.pen = pen;
    }

    #[inline]
    pub fn pen(&self) -> Option<&Pen<B>> {
        self.pen.as_ref()
    }

    #[inline]
    pub fn set_brush(&mut self, brush: Option<Brush<B>>) {
        self.brush = brush;
    }

    #[inline]
    pub fn brush(&self) -> Option<&Brush<B>> {
        self.brush.as_ref()
    }

    fn stroke_with(
        &mut self,
        f: impl FnOnce(&mut B::RenderTarget, &B::Brush, f32, &B::StrokeStyle),
    ) -> Result<()> {
        let Some(pen) = self.pen.clone() else {
            return Ok(());
        };
        if !pen.is_visible() {
            return Ok(());
        }
        self.realize(pen.holder())?;
        let offset = self.options.offset_enabled && (pen.width().floor() as i32).max(1) % 2 == 1;
        let target = self.target_mut()?;
        let brush = pen.brush(target.id())?;
        let mut scope = OffsetScope::<B>::new(target, offset);
        f(&mut scope, &brush, pen.width(), pen.stroke_style());
        Ok(())
    }

    fn fill_with(&mut self, f: impl FnOnce(&mut B::RenderTarget, &B::Brush)) -> Result<()> {
        let Some(brush) = self.brush.clone() else {
            return Ok(());
        };
        self.realize(brush.holder())?;
        let target = self.target_mut()?;
        let native = brush.native(target.id())?;
        f(target, &native);
        Ok(())
    }

    pub fn stroke_path(&mut self, path: &mut Path<B>) -> Result<()> {
        if self.pen.is_none() {
            return Ok(());
        }
        let geometry = path.render_geometry(path.fill_rule())?;
        self.stroke_with(|target, brush, width, style| {
            target.draw_geometry(&geometry, brush, width, Some(style))
        })
    }

    pub fn fill_path(&mut self, path: &mut Path<B>, rule: FillRule) -> Result<()> {
        if self.brush.is_none() {
            return Ok(());
        }
        let geometry = path.render_geometry(rule)?;
        self.fill_with(|target, brush| target.fill_geometry(&geometry, brush))
    }

    /// Fills with the brush, then strokes with the pen.
    pub fn draw_path(&mut self, path: &mut Path<B>, rule: FillRule) -> Result<()> {
        self.fill_path(path, rule)?;
        self.stroke_path(path)
    }

    fn draw_shape(&mut self, shape: Shape) -> Result<()> {
        self.fill_with(|target, brush| target.fill_shape(&shape, brush))?;
        self.stroke_with(|target, brush, width, style| {
            target.draw_shape(&shape, brush, width, Some(style))
        })
    }

    #[inline]
    pub fn draw_rectangle(&mut self, x: f32, y: f32, width: f32, height: f32) -> Result<()> {
        self.draw_shape(Shape::rectangle(x, y, width, height))
    }

    #[inline]
    pub fn draw_rounded_rectangle(
        &mut self,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        radius: f32,
    ) -> Result<()> {
        self.draw_shape(Shape::rounded_rectangle(x, y, width, height, radius))
    }

    /// Draws the ellipse inscribed in the given box.
    #[inline]
    pub fn draw_ellipse(&mut self, x: f32, y: f32, width: f32, height: f32) -> Result<()> {
        self.draw_shape(Shape::ellipse(x, y, width, height))
    }

    pub fn stroke_line(&mut self, x1: f32, y1: f32, x2: f32, y2: f32) -> Result<()> {
        let shape = Shape::line(x1, y1, x2, y2);
        self.stroke_with(|target, brush, width, style| {
            target.draw_shape(&shape, brush, width, Some(style))
        })
    }

    /// Strokes a polyline through `points`.
    pub fn stroke_lines(&mut self, points: &[Point<f32>]) -> Result<()> {
        let Some((first, rest)) = points.split_first() else {
            return Ok(());
        };
        let mut path = Path::new(&self.backend);
        path.move_to(first.x, first.y)?;
        for p in rest {
            path.line_to(p.x, p.y)?;
        }
        self.stroke_path(&mut path)
    }

    /// Fills and strokes the polygon through `points`.
    pub fn draw_lines(&mut self, points: &[Point<f32>], rule: FillRule) -> Result<()> {
        let Some((first, rest)) = points.split_first() else {
            return Ok(());
        };
        let mut path = Path::new(&self.backend);
        path.move_to(first.x, first.y)?;
        for p in rest {
            path.line_to(p.x, p.y)?;
        }
        path.close_subpath()?;
        self.draw_path(&mut path, rule)
    }

    pub fn clear(&mut self, color: impl Into<Rgba<f32>>) -> Result<()> {
        self.activate()?;
        self.target_mut()?.clear(color.into());
        Ok(())
    }

    pub fn draw_bitmap(
        &mut self,
        bitmap: &Bitmap<B>,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
    ) -> Result<()> {
        let interpolation = self
            .options
            .interpolation
            .interpolation()
            .unwrap_or_default();
        self.realize(bitmap.holder())?;
        let target = self.target_mut()?;
        let native = bitmap.native(target.id())?;
        target.draw_bitmap(&native, rect(x, y, width, height), 1.0, interpolation);
        Ok(())
    }

    pub fn draw_icon(&mut self, _icon: &SourceBitmap, _x: f32, _y: f32) -> Result<()> {
        Err(Error::NotImplemented("icon drawing"))
    }

    pub fn draw_text(&mut self, _text: &str, _x: f32, _y: f32) -> Result<()> {
        Err(Error::NotImplemented("text drawing"))
    }

    /// Width, height, descent and external leading of `text`.
    pub fn text_extent(&self, _text: &str) -> Result<(f32, f32, f32, f32)> {
        Err(Error::NotImplemented("text measurement"))
    }

    pub fn set_font(&mut self, _font: &Font) -> Result<()> {
        Err(Error::NotImplemented("fonts"))
    }

    pub fn begin_layer(&mut self, _opacity: f32) -> Result<()> {
        Err(Error::NotImplemented("layers"))
    }

    pub fn end_layer(&mut self) -> Result<()> {
        Err(Error::NotImplemented("layers"))
    }

    /// Replaces the active clip with an aliased axis-aligned rectangle. Clips do
    /// not nest.
    pub fn clip(&mut self, x: f32, y: f32, width: f32, height: f32) -> Result<()> {
        self.activate()?;
        self.reset_clip();
        let r = rect(x, y, width, height);
        let target = self.target_mut()?;
        let m = target.transform();
        target.push_axis_aligned_clip(r, AntialiasMode::None);
        self.clip = Some((r, m));
        self.clip_pushed = true;
        Ok(())
    }

    pub fn clip_region(&mut self, _path: &mut Path<B>) -> Result<()> {
        Err(Error::NotImplemented("non-rectangular clipping"))
    }

    pub fn reset_clip(&mut self) {
        if self.clip_pushed {
            if let Some(target) = self.target.as_mut() {
                target.pop_axis_aligned_clip();
            }
            self.clip_pushed = false;
        }
        self.clip = None;
    }

    /// The live transform of the render target, or identity when none is bound.
    #[inline]
    pub fn transform(&self) -> Matrix {
        self.target
            .as_ref()
            .map(|target| target.transform())
            .unwrap_or_default()
    }

    pub fn set_transform(&mut self, m: &Matrix) -> Result<()> {
        self.activate()?;
        self.target_mut()?.set_transform(m);
        Ok(())
    }

    /// Applies `m` before the current transform.
    pub fn concat_transform(&mut self, m: &Matrix) -> Result<()> {
        self.activate()?;
        let target = self.target_mut()?;
        let mut current = target.transform();
        current.concat(m);
        target.set_transform(&current);
        Ok(())
    }

    #[inline]
    pub fn translate(&mut self, dx: f32, dy: f32) -> Result<()> {
        self.concat_transform(&Matrix::translation(dx, dy))
    }

    #[inline]
    pub fn scale(&mut self, sx: f32, sy: f32) -> Result<()> {
        self.concat_transform(&Matrix::scaling(sx, sy))
    }

    #[inline]
    pub fn rotate(&mut self, radians: f32) -> Result<()> {
        self.concat_transform(&Matrix::rotation(radians))
    }

    pub fn push_state(&mut self) -> Result<()> {
        let backend = self.backend.clone();
        let mut block = self.recovering(|_| backend.create_state_block())?;
        self.target_mut()?.save_state(&mut block);
        self.states.push(SavedState {
            block,
            clip: self.clip,
            antialias: self.options.antialias,
            interpolation: self.options.interpolation,
            composition: self.composition,
        });
        Ok(())
    }

    pub fn pop_state(&mut self) -> Result<()> {
        if self.states.is_empty() {
            return Err(Error::StateStackUnderflow);
        }
        self.activate()?;
        let saved = self.states.pop().ok_or(Error::StateStackUnderflow)?;
        self.reset_clip();
        let target = self.target_mut()?;
        target.restore_state(&saved.block);
        if let Some((r, m)) = saved.clip {
            push_clip::<B>(target, r, &m);
            self.clip_pushed = true;
        }
        self.clip = saved.clip;
        self.options.antialias = saved.antialias;
        self.options.interpolation = saved.interpolation;
        self.composition = saved.composition;
        Ok(())
    }

    #[inline]
    pub fn state_depth(&self) -> usize {
        self.states.len()
    }

    pub fn set_antialias_mode(&mut self, mode: AntialiasMode) -> bool {
        self.options.antialias = mode;
        if let Some(target) = self.target.as_mut() {
            target.set_antialias_mode(mode);
        }
        true
    }

    #[inline]
    pub fn antialias_mode(&self) -> AntialiasMode {
        self.target
            .as_ref()
            .map(|target| target.antialias_mode())
            .unwrap_or(self.options.antialias)
    }

    pub fn set_interpolation_quality(&mut self, quality: InterpolationQuality) -> bool {
        if quality.interpolation().is_none() {
            return false;
        }
        self.options.interpolation = quality;
        true
    }

    #[inline]
    pub fn interpolation_quality(&self) -> InterpolationQuality {
        self.options.interpolation
    }

    pub fn set_composition_mode(&mut self, mode: CompositionMode) -> bool {
        if mode != CompositionMode::Over {
            return false;
        }
        self.composition = mode;
        true
    }

    #[inline]
    pub fn composition_mode(&self) -> CompositionMode {
        self.composition
    }

    #[inline]
    pub fn enable_offset(&mut self, enabled: bool) {
        self.options.offset_enabled = enabled;
    }

    #[inline]
    pub fn offset_enabled(&self) -> bool {
        self.options.offset_enabled
    }
}

/// Pushes `clip` in the coordinate space of `m`, leaving the target's
/// transform as it was.
fn push_clip<B: Backend>(target: &mut B::RenderTarget, clip: Rect<f32>, m: &Matrix) {
    let current = target.transform();
    target.set_transform(m);
    target.push_axis_aligned_clip(clip, AntialiasMode::None);
    target.set_transform(&current);
}

impl<B: Backend> Drop for Context<B> {
    fn drop(&mut self) {
        if let Err(e) = self.end_frame() {
            warn!("failed to end the frame while dropping the context: {}", e);
        }
        if let Some(target) = self.target.take() {
            self.holders.release_all(target.id());
            debug!("released render target {:?}", target.id());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recording::{Recorder, RecordingSurface};

    fn context(recorder: &Recorder) -> Context<Recorder> {
        Context::new(
            recorder,
            RecordingSurface::window(400, 300),
            ContextOptions::default(),
        )
    }

    #[test]
    fn lazy_activation() {
        let recorder = Recorder::new();
        let mut ctx = context(&recorder);
        assert_eq!(ctx.state(), SessionState::Uninitialized);
        assert!(ctx.transform().is_identity());
        assert_eq!(recorder.stats().render_targets, 0);
        ctx.clear(rgba8(255, 255, 255, 255)).unwrap();
        assert_eq!(ctx.state(), SessionState::Drawing);
        ctx.flush().unwrap();
        assert_eq!(ctx.state(), SessionState::Idle);
        assert_eq!(recorder.frames().len(), 1);
    }

    #[test]
    fn drop_commits_once() {
        let recorder = Recorder::new();
        {
            let mut ctx = context(&recorder);
            ctx.clear(rgba8(0, 0, 0, 255)).unwrap();
        }
        let stats = recorder.stats();
        assert_eq!(stats.begin_draws, 1);
        assert_eq!(stats.end_draws, 1);
        assert_eq!(stats.live_render_targets, 0);
        {
            let _ctx = context(&recorder);
        }
        assert_eq!(recorder.stats().end_draws, 1);
    }

    #[test]
    fn interpolation_quality_negotiation() {
        let recorder = Recorder::new();
        let mut ctx = context(&recorder);
        assert!(!ctx.set_interpolation_quality(InterpolationQuality::Best));
        assert_eq!(ctx.interpolation_quality(), InterpolationQuality::Default);
        assert!(ctx.set_interpolation_quality(InterpolationQuality::Fast));
        assert_eq!(ctx.interpolation_quality(), InterpolationQuality::Fast);
    }

    #[test]
    fn composition_mode_negotiation() {
        let recorder = Recorder::new();
        let mut ctx = context(&recorder);
        assert!(!ctx.set_composition_mode(CompositionMode::Xor));
        assert!(ctx.set_composition_mode(CompositionMode::Over));
        assert_eq!(ctx.composition_mode(), CompositionMode::Over);
    }

    #[test]
    fn antialias_mode_reaches_target() {
        let recorder = Recorder::new();
        let mut ctx = context(&recorder);
        assert!(ctx.set_antialias_mode(AntialiasMode::None));
        ctx.clear(rgba8(0, 0, 0, 255)).unwrap();
        assert_eq!(ctx.antialias_mode(), AntialiasMode::None);
        assert_eq!(
            ctx.native_target().map(|t| t.antialias_mode()),
            Some(AntialiasMode::None)
        );
    }

    #[test]
    fn concat_applies_operation_first() {
        let recorder = Recorder::new();
        let mut ctx = context(&recorder);
        ctx.translate(10.0, 0.0).unwrap();
        ctx.scale(2.0, 2.0).unwrap();
        assert_eq!(ctx.transform().transform_point(1.0, 1.0), (12.0, 2.0));
    }

    #[test]
    fn clips_do_not_nest() {
        let recorder = Recorder::new();
        let mut ctx = context(&recorder);
        ctx.clip(0.0, 0.0, 10.0, 10.0).unwrap();
        ctx.clip(5.0, 5.0, 10.0, 10.0).unwrap();
        ctx.reset_clip();
        ctx.reset_clip();
        ctx.flush().unwrap();
        assert_eq!(recorder.frames().len(), 1);
    }

    #[test]
    fn clip_survives_frames() {
        let recorder = Recorder::new();
        let mut ctx = context(&recorder);
        let brush = Brush::new(BrushKind::Solid(rgba8(0, 0, 0, 255)));
        ctx.set_brush(Some(brush));
        ctx.clip(0.0, 0.0, 10.0, 10.0).unwrap();
        ctx.flush().unwrap();
        ctx.draw_rectangle(0.0, 0.0, 20.0, 20.0).unwrap();
        ctx.flush().unwrap();
        let frame = recorder.last_frame().unwrap();
        assert_eq!(frame.commands[0].clip(), Some([0.0, 0.0, 10.0, 10.0]));
    }

    #[test]
    fn unsupported_operations() {
        let recorder = Recorder::new();
        let mut ctx = context(&recorder);
        assert_eq!(ctx.draw_text("x", 0.0, 0.0).unwrap_err(), ErrorKind::NotImplemented);
        assert_eq!(ctx.text_extent("x").unwrap_err(), ErrorKind::NotImplemented);
        assert_eq!(ctx.begin_layer(0.5).unwrap_err(), ErrorKind::NotImplemented);
        assert_eq!(ctx.end_layer().unwrap_err(), ErrorKind::NotImplemented);
        let mut path = Path::new(&recorder);
        assert_eq!(
            ctx.clip_region(&mut path).unwrap_err(),
            ErrorKind::NotImplemented
        );
        let icon = SourceBitmap::from_rgb(1, 1, vec![0, 0, 0]).unwrap();
        assert_eq!(
            ctx.draw_icon(&icon, 0.0, 0.0).unwrap_err(),
            ErrorKind::NotImplemented
        );
    }

    #[test]
    fn no_pen_no_stroke() {
        let recorder = Recorder::new();
        let mut ctx = context(&recorder);
        ctx.stroke_line(0.0, 0.0, 10.0, 10.0).unwrap();
        assert_eq!(ctx.state(), SessionState::Uninitialized);
    }

    #[test]
    fn resize_is_noticed_on_draw() {
        let recorder = Recorder::new();
        let surface = RecordingSurface::window(100, 100);
        let mut ctx = Context::new(&recorder, surface.clone(), ContextOptions::default());
        ctx.clear(rgba8(0, 0, 0, 255)).unwrap();
        ctx.flush().unwrap();
        surface.set_client_size(200, 150);
        ctx.clear(rgba8(0, 0, 0, 255)).unwrap();
        ctx.flush().unwrap();
        assert_eq!(recorder.last_frame().unwrap().size, (200, 150));
        assert_eq!(recorder.stats().render_targets, 1);
    }
}
