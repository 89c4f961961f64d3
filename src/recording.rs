//! A headless backend that keeps committed frames as display lists.
//!
//! Every native allocation is counted in [`Stats`], transient objects are
//! tracked while alive, and device loss or allocation failure can be scheduled
//! ahead of time. Geometry is held in plain memory and queried with the
//! helpers in `outline`.

use crate::outline::{self, Bounds, Figure, Segment};
use crate::*;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct Stats {
    pub render_targets: usize,
    pub live_render_targets: usize,
    pub solid_brushes: usize,
    pub linear_gradient_brushes: usize,
    pub radial_gradient_brushes: usize,
    pub gradient_stop_collections: usize,
    pub live_gradient_stop_collections: usize,
    pub stroke_styles: usize,
    pub bitmaps: usize,
    pub path_geometries: usize,
    pub ellipse_geometries: usize,
    pub transformed_geometries: usize,
    pub state_blocks: usize,
    pub begin_draws: usize,
    pub end_draws: usize,
    pub device_losses: usize,
    /// Drawing calls issued outside BeginDraw/EndDraw.
    pub stray_draws: usize,
}

#[derive(Debug, Default)]
struct RecorderState {
    stats: Stats,
    frames: Vec<Frame>,
    lose_device: bool,
    lose_device_on_allocation: bool,
    fail_allocations: usize,
}

#[derive(Clone, Debug, Default)]
pub struct Recorder(Rc<RefCell<RecorderState>>);

impl Recorder {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn stats(&self) -> Stats {
        self.0.borrow().stats
    }

    #[inline]
    pub fn frames(&self) -> Vec<Frame> {
        self.0.borrow().frames.clone()
    }

    #[inline]
    pub fn last_frame(&self) -> Option<Frame> {
        self.0.borrow().frames.last().cloned()
    }

    /// The next EndDraw on any target reports device loss and drops its frame.
    #[inline]
    pub fn lose_device_on_next_end_draw(&self) {
        self.0.borrow_mut().lose_device = true;
    }

    /// The next allocation made through a render target reports device loss.
    #[inline]
    pub fn lose_device_on_next_allocation(&self) {
        self.0.borrow_mut().lose_device_on_allocation = true;
    }

    /// The next `count` native allocations fail.
    #[inline]
    pub fn fail_next_allocations(&self, count: usize) {
        self.0.borrow_mut().fail_allocations = count;
    }

    fn allocate(&self, what: &'static str, count: impl FnOnce(&mut Stats)) -> Result<()> {
        let mut state = self.0.borrow_mut();
        if state.fail_allocations > 0 {
            state.fail_allocations -= 1;
            return Err(Error::creation(what, "injected allocation failure"));
        }
        count(&mut state.stats);
        Ok(())
    }

    fn allocate_on_device(&self, what: &'static str, count: impl FnOnce(&mut Stats)) -> Result<()> {
        {
            let mut state = self.0.borrow_mut();
            if std::mem::take(&mut state.lose_device_on_allocation) {
                state.stats.device_losses += 1;
                return Err(Error::DeviceLost);
            }
        }
        self.allocate(what, count)
    }

    #[inline]
    fn update(&self, f: impl FnOnce(&mut Stats)) {
        f(&mut self.0.borrow_mut().stats)
    }
}

/// A surface whose client size can be changed from the outside, as a window
/// being resized.
#[derive(Clone, Debug)]
pub struct RecordingSurface {
    kind: SurfaceKind,
    size: Rc<Cell<(u32, u32)>>,
}

impl RecordingSurface {
    #[inline]
    fn new(kind: SurfaceKind, width: u32, height: u32) -> Self {
        Self {
            kind,
            size: Rc::new(Cell::new((width, height))),
        }
    }

    #[inline]
    pub fn window(width: u32, height: u32) -> Self {
        Self::new(SurfaceKind::Window, width, height)
    }

    #[inline]
    pub fn memory(width: u32, height: u32) -> Self {
        Self::new(SurfaceKind::Memory, width, height)
    }

    #[inline]
    pub fn printer(width: u32, height: u32) -> Self {
        Self::new(SurfaceKind::Printer, width, height)
    }

    #[inline]
    pub fn metafile(width: u32, height: u32) -> Self {
        Self::new(SurfaceKind::EnhancedMetafile, width, height)
    }

    #[inline]
    pub fn set_client_size(&self, width: u32, height: u32) {
        self.size.set((width, height));
    }
}

impl Surface for RecordingSurface {
    #[inline]
    fn kind(&self) -> SurfaceKind {
        self.kind
    }

    #[inline]
    fn client_size(&self) -> Size<u32> {
        let (width, height) = self.size.get();
        pixel_size(width, height)
    }
}

#[derive(Clone, PartialEq, Debug)]
pub enum Paint {
    Solid([f32; 4]),
    Linear {
        start: [f32; 2],
        end: [f32; 2],
        stops: Vec<(f32, [f32; 4])>,
    },
    Radial {
        center: [f32; 2],
        offset: [f32; 2],
        radius: f32,
        stops: Vec<(f32, [f32; 4])>,
    },
}

#[derive(Clone, PartialEq, Debug)]
pub enum Command {
    Clear {
        color: [f32; 4],
        clip: Option<[f32; 4]>,
    },
    FillGeometry {
        bounds: [f32; 4],
        figures: usize,
        paint: Paint,
        transform: [f32; 6],
        clip: Option<[f32; 4]>,
    },
    StrokeGeometry {
        bounds: [f32; 4],
        figures: usize,
        paint: Paint,
        width: f32,
        transform: [f32; 6],
        clip: Option<[f32; 4]>,
    },
    FillShape {
        shape: Shape,
        paint: Paint,
        transform: [f32; 6],
        clip: Option<[f32; 4]>,
    },
    StrokeShape {
        shape: Shape,
        paint: Paint,
        width: f32,
        transform: [f32; 6],
        clip: Option<[f32; 4]>,
    },
    DrawBitmap {
        dest: [f32; 4],
        size: (u32, u32),
        opacity: f32,
        interpolation: Interpolation,
        transform: [f32; 6],
        clip: Option<[f32; 4]>,
    },
}

impl Command {
    /// The clip in effect, as `[x, y, width, height]` in device space.
    pub fn clip(&self) -> Option<[f32; 4]> {
        match self {
            Self::Clear { clip, .. }
            | Self::FillGeometry { clip, .. }
            | Self::StrokeGeometry { clip, .. }
            | Self::FillShape { clip, .. }
            | Self::StrokeShape { clip, .. }
            | Self::DrawBitmap { clip, .. } => *clip,
        }
    }

    pub fn transform(&self) -> Option<[f32; 6]> {
        match self {
            Self::Clear { .. } => None,
            Self::FillGeometry { transform, .. }
            | Self::StrokeGeometry { transform, .. }
            | Self::FillShape { transform, .. }
            | Self::StrokeShape { transform, .. }
            | Self::DrawBitmap { transform, .. } => Some(*transform),
        }
    }

    pub fn paint(&self) -> Option<&Paint> {
        match self {
            Self::FillGeometry { paint, .. }
            | Self::StrokeGeometry { paint, .. }
            | Self::FillShape { paint, .. }
            | Self::StrokeShape { paint, .. } => Some(paint),
            Self::Clear { .. } | Self::DrawBitmap { .. } => None,
        }
    }
}

/// One committed frame.
#[derive(Clone, PartialEq, Debug)]
pub struct Frame {
    pub size: (u32, u32),
    pub commands: Vec<Command>,
}

#[derive(Clone, Debug)]
pub struct RecordingBrush(Rc<Paint>);

impl RecordingBrush {
    #[inline]
    pub fn paint(&self) -> Paint {
        (*self.0).clone()
    }
}

#[derive(Debug)]
pub struct RecordingStops {
    recorder: Recorder,
    stops: Vec<(f32, [f32; 4])>,
}

impl Drop for RecordingStops {
    fn drop(&mut self) {
        self.recorder
            .update(|s| s.live_gradient_stop_collections -= 1);
    }
}

#[derive(Clone, Debug)]
pub struct RecordingStrokeStyle(Rc<StrokeStyleProperties>);

impl RecordingStrokeStyle {
    /// Identity of the underlying object; clones share it.
    #[inline]
    pub fn id(&self) -> usize {
        Rc::as_ptr(&self.0) as usize
    }

    #[inline]
    pub fn properties(&self) -> &StrokeStyleProperties {
        &self.0
    }
}

#[derive(Debug)]
pub struct RecordingStateBlock {
    transform: Matrix,
    antialias: AntialiasMode,
}

#[derive(Clone, Debug)]
pub struct RecordingBitmap(Rc<DevicePixels>);

impl RecordingBitmap {
    #[inline]
    pub fn pixels(&self) -> &DevicePixels {
        &self.0
    }
}

#[derive(Clone, Debug)]
enum Region {
    Figures(Vec<Figure>),
    Ellipse {
        center: Point<f32>,
        rx: f32,
        ry: f32,
    },
}

impl Region {
    fn add_bounds(&self, bounds: &mut Bounds, m: Option<&Matrix>) {
        let map = |p: Point<f32>| m.map_or(p, |m| m.apply(p));
        match self {
            Self::Figures(figures) => {
                for figure in figures {
                    bounds.extend(figure.flatten().into_iter().map(&map));
                }
            }
            Self::Ellipse { center, rx, ry } => match m {
                Some(m) if !m.is_identity() => {
                    bounds.extend(outline::ellipse_polygon(*center, *rx, *ry).into_iter().map(&map))
                }
                _ => bounds.extend([
                    pt(center.x - rx, center.y - ry),
                    pt(center.x + rx, center.y + ry),
                ]),
            },
        }
    }

    fn contains(&self, rule: FillRule, p: Point<f32>) -> bool {
        match self {
            Self::Figures(figures) => outline::figures_contain(figures, rule, p),
            Self::Ellipse { center, rx, ry } => outline::ellipse_contains(*center, *rx, *ry, p),
        }
    }

    fn transformed(&self, m: &Matrix) -> Self {
        match self {
            Self::Figures(figures) => {
                Self::Figures(figures.iter().map(|f| f.transformed(m)).collect())
            }
            Self::Ellipse { center, rx, ry } => {
                let mut points = outline::ellipse_polygon(*center, *rx, *ry)
                    .into_iter()
                    .map(|p| m.apply(p));
                let start = points.next().unwrap_or_else(|| m.apply(*center));
                Self::Figures(vec![Figure {
                    start,
                    segments: points.map(Segment::Line).collect(),
                    closed: true,
                }])
            }
        }
    }

    #[inline]
    fn figure_count(&self) -> usize {
        match self {
            Self::Figures(figures) => figures.len(),
            Self::Ellipse { .. } => 1,
        }
    }
}

#[derive(Clone, Debug)]
pub struct RecordingGeometry {
    rule: FillRule,
    regions: Rc<Vec<Region>>,
}

impl Geometry<RecordingSink> for RecordingGeometry {
    fn bounds(&self, transform: Option<&Matrix>) -> Result<Rect<f32>> {
        let mut bounds = Bounds::new();
        for region in self.regions.iter() {
            region.add_bounds(&mut bounds, transform);
        }
        Ok(bounds.to_rect())
    }

    fn contains(&self, point: Point<f32>, transform: Option<&Matrix>) -> Result<bool> {
        let point = match transform {
            Some(m) if !m.is_identity() => match m.inverted() {
                Ok(inverse) => inverse.apply(point),
                Err(_) => return Ok(false),
            },
            _ => point,
        };
        Ok(self
            .regions
            .iter()
            .any(|region| region.contains(self.rule, point)))
    }

    fn stream(&self, sink: &mut RecordingSink) -> Result<()> {
        sink.absorb(&self.regions);
        Ok(())
    }

    fn figure_count(&self) -> Result<usize> {
        Ok(self.regions.iter().map(Region::figure_count).sum())
    }
}

#[derive(Debug)]
pub struct RecordingSink {
    rule: FillRule,
    regions: Vec<Region>,
    figures: Vec<Figure>,
    current: Option<Figure>,
}

impl RecordingSink {
    fn new(rule: FillRule) -> Self {
        Self {
            rule,
            regions: Vec::new(),
            figures: Vec::new(),
            current: None,
        }
    }

    fn seal_figures(&mut self) {
        if let Some(figure) = self.current.take() {
            self.figures.push(figure);
        }
        if !self.figures.is_empty() {
            let figures = std::mem::take(&mut self.figures);
            self.regions.push(Region::Figures(figures));
        }
    }

    /// A lone figure region joins the figures being written so that fill
    /// rules apply across both; anything else is kept as separate regions.
    fn absorb(&mut self, regions: &[Region]) {
        match regions {
            [Region::Figures(figures)] => {
                if let Some(figure) = self.current.take() {
                    self.figures.push(figure);
                }
                self.figures.extend(figures.iter().cloned());
            }
            _ => {
                self.seal_figures();
                self.regions.extend(regions.iter().cloned());
            }
        }
    }

    #[inline]
    fn segment(&mut self, segment: Segment) {
        if let Some(figure) = self.current.as_mut() {
            figure.segments.push(segment);
        }
    }
}

impl GeometrySink<RecordingGeometry> for RecordingSink {
    fn begin_figure(&mut self, start: Point<f32>) {
        if let Some(figure) = self.current.replace(Figure::new(start)) {
            self.figures.push(figure);
        }
    }

    #[inline]
    fn add_line(&mut self, to: Point<f32>) {
        self.segment(Segment::Line(to));
    }

    #[inline]
    fn add_bezier(&mut self, c1: Point<f32>, c2: Point<f32>, to: Point<f32>) {
        self.segment(Segment::Bezier(c1, c2, to));
    }

    #[inline]
    fn add_arc(&mut self, arc: &ArcSegment) {
        self.segment(Segment::Arc(*arc));
    }

    fn end_figure(&mut self, end: FigureEnd) {
        if let Some(mut figure) = self.current.take() {
            figure.closed = end == FigureEnd::Closed;
            self.figures.push(figure);
        }
    }

    fn close(mut self) -> Result<RecordingGeometry> {
        self.seal_figures();
        Ok(RecordingGeometry {
            rule: self.rule,
            regions: Rc::new(self.regions),
        })
    }
}

#[inline]
fn rect_array(r: &Rect<f32>) -> [f32; 4] {
    [r.origin.x, r.origin.y, r.size.width, r.size.height]
}

fn intersect(a: [f32; 4], b: [f32; 4]) -> [f32; 4] {
    let x0 = a[0].max(b[0]);
    let y0 = a[1].max(b[1]);
    let x1 = (a[0] + a[2]).min(b[0] + b[2]);
    let y1 = (a[1] + a[3]).min(b[1] + b[3]);
    [x0, y0, (x1 - x0).max(0.0), (y1 - y0).max(0.0)]
}

fn paint_stops(stops: &[GradientStop]) -> Vec<(f32, [f32; 4])> {
    stops
        .iter()
        .map(|stop| (stop.position, rgba_array(&stop.color)))
        .collect()
}

#[derive(Debug)]
pub struct RecordingTarget {
    recorder: Recorder,
    id: TargetId,
    size: (u32, u32),
    drawing: bool,
    lost: bool,
    transform: Matrix,
    antialias: AntialiasMode,
    clips: Vec<[f32; 4]>,
    commands: Vec<Command>,
}

impl RecordingTarget {
    fn clip(&self) -> Option<[f32; 4]> {
        self.clips.iter().copied().reduce(intersect)
    }

    fn record(&mut self, command: impl FnOnce([f32; 6], Option<[f32; 4]>) -> Command) {
        if !self.drawing {
            self.recorder.update(|s| s.stray_draws += 1);
            return;
        }
        let command = command(self.transform.get(), self.clip());
        self.commands.push(command);
    }

    /// Commands recorded in the open frame.
    #[inline]
    pub fn pending(&self) -> &[Command] {
        &self.commands
    }
}

impl Drop for RecordingTarget {
    fn drop(&mut self) {
        self.recorder.update(|s| s.live_render_targets -= 1);
    }
}

impl RenderTarget<Recorder> for RecordingTarget {
    #[inline]
    fn id(&self) -> TargetId {
        self.id
    }

    #[inline]
    fn pixel_size(&self) -> Size<u32> {
        pixel_size(self.size.0, self.size.1)
    }

    fn resize(&mut self, size: Size<u32>) -> Result<()> {
        if self.lost {
            return Err(Error::DeviceLost);
        }
        self.size = (size.width, size.height);
        Ok(())
    }

    fn begin_draw(&mut self) {
        self.recorder.update(|s| s.begin_draws += 1);
        self.drawing = true;
        self.commands.clear();
    }

    fn end_draw(&mut self) -> Result<()> {
        if !self.drawing {
            return Err(Error::Render("EndDraw without BeginDraw".into()));
        }
        self.drawing = false;
        self.recorder.update(|s| s.end_draws += 1);
        let commands = std::mem::take(&mut self.commands);
        if !self.clips.is_empty() {
            self.clips.clear();
            return Err(Error::Render("unbalanced axis-aligned clip".into()));
        }
        let mut state = self.recorder.0.borrow_mut();
        if self.lost || std::mem::take(&mut state.lose_device) {
            self.lost = true;
            state.stats.device_losses += 1;
            return Err(Error::DeviceLost);
        }
        state.frames.push(Frame {
            size: self.size,
            commands,
        });
        Ok(())
    }

    #[inline]
    fn transform(&self) -> Matrix {
        self.transform
    }

    #[inline]
    fn set_transform(&mut self, m: &Matrix) {
        self.transform = *m;
    }

    #[inline]
    fn antialias_mode(&self) -> AntialiasMode {
        self.antialias
    }

    #[inline]
    fn set_antialias_mode(&mut self, mode: AntialiasMode) {
        self.antialias = mode;
    }

    fn push_axis_aligned_clip(&mut self, clip: Rect<f32>, _mode: AntialiasMode) {
        let [x, y, w, h] = rect_array(&clip);
        let mut bounds = Bounds::new();
        bounds.extend(
            [pt(x, y), pt(x + w, y), pt(x + w, y + h), pt(x, y + h)]
                .into_iter()
                .map(|p| self.transform.apply(p)),
        );
        self.clips.push(rect_array(&bounds.to_rect()));
    }

    #[inline]
    fn pop_axis_aligned_clip(&mut self) {
        self.clips.pop();
    }

    fn save_state(&mut self, block: &mut RecordingStateBlock) {
        block.transform = self.transform;
        block.antialias = self.antialias;
    }

    fn restore_state(&mut self, block: &RecordingStateBlock) {
        self.transform = block.transform;
        self.antialias = block.antialias;
    }

    fn create_solid_brush(&self, color: Rgba<f32>) -> Result<RecordingBrush> {
        self.recorder
            .allocate_on_device("solid color brush", |s| s.solid_brushes += 1)?;
        Ok(RecordingBrush(Rc::new(Paint::Solid(rgba_array(&color)))))
    }

    fn create_gradient_stops(
        &self,
        stops: &[GradientStop],
        _mode: GradientMode,
    ) -> Result<RecordingStops> {
        self.recorder.allocate_on_device("gradient stop collection", |s| {
            s.gradient_stop_collections += 1;
            s.live_gradient_stop_collections += 1;
        })?;
        Ok(RecordingStops {
            recorder: self.recorder.clone(),
            stops: paint_stops(stops),
        })
    }

    fn create_linear_brush(
        &self,
        start: Point<f32>,
        end: Point<f32>,
        stops: &RecordingStops,
    ) -> Result<RecordingBrush> {
        self.recorder
            .allocate_on_device("linear gradient brush", |s| s.linear_gradient_brushes += 1)?;
        Ok(RecordingBrush(Rc::new(Paint::Linear {
            start: [start.x, start.y],
            end: [end.x, end.y],
            stops: stops.stops.clone(),
        })))
    }

    fn create_radial_brush(
        &self,
        center: Point<f32>,
        offset: Point<f32>,
        radius: f32,
        stops: &RecordingStops,
    ) -> Result<RecordingBrush> {
        self.recorder
            .allocate_on_device("radial gradient brush", |s| s.radial_gradient_brushes += 1)?;
        Ok(RecordingBrush(Rc::new(Paint::Radial {
            center: [center.x, center.y],
            offset: [offset.x, offset.y],
            radius,
            stops: stops.stops.clone(),
        })))
    }

    fn create_bitmap(&self, pixels: &DevicePixels) -> Result<RecordingBitmap> {
        self.recorder.allocate_on_device("bitmap", |s| s.bitmaps += 1)?;
        Ok(RecordingBitmap(Rc::new(pixels.clone())))
    }

    fn clear(&mut self, color: Rgba<f32>) {
        let color = rgba_array(&color);
        self.record(|_, clip| Command::Clear { color, clip });
    }

    fn draw_geometry(
        &mut self,
        geometry: &RecordingGeometry,
        brush: &RecordingBrush,
        width: f32,
        _style: Option<&RecordingStrokeStyle>,
    ) {
        let bounds = geometry.bounds(None).map(|b| rect_array(&b)).unwrap_or_default();
        let figures = geometry.figure_count().unwrap_or_default();
        self.record(|transform, clip| Command::StrokeGeometry {
            bounds,
            figures,
            paint: brush.paint(),
            width,
            transform,
            clip,
        });
    }

    fn fill_geometry(&mut self, geometry: &RecordingGeometry, brush: &RecordingBrush) {
        let bounds = geometry.bounds(None).map(|b| rect_array(&b)).unwrap_or_default();
        let figures = geometry.figure_count().unwrap_or_default();
        self.record(|transform, clip| Command::FillGeometry {
            bounds,
            figures,
            paint: brush.paint(),
            transform,
            clip,
        });
    }

    fn draw_shape(
        &mut self,
        shape: &Shape,
        brush: &RecordingBrush,
        width: f32,
        _style: Option<&RecordingStrokeStyle>,
    ) {
        let shape = *shape;
        self.record(|transform, clip| Command::StrokeShape {
            shape,
            paint: brush.paint(),
            width,
            transform,
            clip,
        });
    }

    fn fill_shape(&mut self, shape: &Shape, brush: &RecordingBrush) {
        let shape = *shape;
        self.record(|transform, clip| Command::FillShape {
            shape,
            paint: brush.paint(),
            transform,
            clip,
        });
    }

    fn draw_bitmap(
        &mut self,
        bitmap: &RecordingBitmap,
        dest: Rect<f32>,
        opacity: f32,
        interpolation: Interpolation,
    ) {
        let size = (bitmap.0.width, bitmap.0.height);
        let dest = rect_array(&dest);
        self.record(|transform, clip| Command::DrawBitmap {
            dest,
            size,
            opacity,
            interpolation,
            transform,
            clip,
        });
    }
}

impl Backend for Recorder {
    type Surface = RecordingSurface;
    type RenderTarget = RecordingTarget;
    type Geometry = RecordingGeometry;
    type GeometrySink = RecordingSink;
    type StrokeStyle = RecordingStrokeStyle;
    type StateBlock = RecordingStateBlock;
    type Brush = RecordingBrush;
    type GradientStops = RecordingStops;
    type Bitmap = RecordingBitmap;

    #[inline]
    fn name(&self) -> &'static str {
        "recording"
    }

    #[inline]
    fn version(&self) -> (u32, u32, u32) {
        (1, 0, 0)
    }

    fn create_render_target(&self, surface: &RecordingSurface) -> Result<RecordingTarget> {
        match surface.kind() {
            SurfaceKind::Window | SurfaceKind::Memory => {}
            _ => return Err(Error::NotImplemented("render target for this surface")),
        }
        self.allocate("render target", |s| {
            s.render_targets += 1;
            s.live_render_targets += 1;
        })?;
        let size = surface.client_size();
        Ok(RecordingTarget {
            recorder: self.clone(),
            id: TargetId::next(),
            size: (size.width, size.height),
            drawing: false,
            lost: false,
            transform: Matrix::identity(),
            antialias: AntialiasMode::Default,
            clips: Vec::new(),
            commands: Vec::new(),
        })
    }

    fn create_stroke_style(&self, props: &StrokeStyleProperties) -> Result<RecordingStrokeStyle> {
        self.allocate("stroke style", |s| s.stroke_styles += 1)?;
        Ok(RecordingStrokeStyle(Rc::new(props.clone())))
    }

    fn create_state_block(&self) -> Result<RecordingStateBlock> {
        self.allocate("drawing state block", |s| s.state_blocks += 1)?;
        Ok(RecordingStateBlock {
            transform: Matrix::identity(),
            antialias: AntialiasMode::Default,
        })
    }

    fn open_path(&self, fill_rule: FillRule) -> Result<RecordingSink> {
        self.allocate("path geometry", |s| s.path_geometries += 1)?;
        Ok(RecordingSink::new(fill_rule))
    }

    fn create_ellipse(&self, center: Point<f32>, rx: f32, ry: f32) -> Result<RecordingGeometry> {
        self.allocate("ellipse geometry", |s| s.ellipse_geometries += 1)?;
        Ok(RecordingGeometry {
            rule: FillRule::default(),
            regions: Rc::new(vec![Region::Ellipse { center, rx, ry }]),
        })
    }

    fn combine_union(
        &self,
        a: &RecordingGeometry,
        b: &RecordingGeometry,
        sink: &mut RecordingSink,
    ) -> Result<()> {
        sink.seal_figures();
        sink.regions.extend(a.regions.iter().cloned());
        sink.regions.extend(b.regions.iter().cloned());
        Ok(())
    }

    fn transform_geometry(
        &self,
        geometry: &RecordingGeometry,
        m: &Matrix,
    ) -> Result<RecordingGeometry> {
        self.allocate("transformed geometry", |s| s.transformed_geometries += 1)?;
        Ok(RecordingGeometry {
            rule: geometry.rule,
            regions: Rc::new(geometry.regions.iter().map(|r| r.transformed(m)).collect()),
        })
    }
}
