use crate::*;
use log::{debug, trace};
use windows::core::Interface;
use windows::Foundation::Numerics::Matrix3x2;
use windows::Win32::{
    Foundation::*,
    Graphics::{Direct2D::Common::*, Direct2D::*, Dxgi::Common::*, Gdi::HDC, Imaging::*},
    System::Com::{CoCreateInstance, CLSCTX_INPROC_SERVER},
    UI::WindowsAndMessaging::GetClientRect,
};

fn failed(what: &'static str) -> impl FnOnce(windows::core::Error) -> Error {
    move |e| {
        if e.code() == D2DERR_RECREATE_TARGET {
            Error::DeviceLost
        } else {
            Error::creation(what, e)
        }
    }
}

#[inline]
fn matrix_ptr(m: &Option<Matrix3x2>) -> Option<*const Matrix3x2> {
    m.as_ref().map(|m| m as *const _)
}

#[derive(Clone, Copy, Debug)]
enum SurfaceHandle {
    Window(HWND),
    Dc(HDC),
}

/// A window or device context a [`Direct2D`] render target draws into.
#[derive(Debug)]
pub struct NativeSurface {
    kind: SurfaceKind,
    handle: SurfaceHandle,
    size: std::cell::Cell<(u32, u32)>,
}

impl NativeSurface {
    pub fn window(handle: impl WindowHandle) -> Result<Self> {
        let hwnd = handle
            .handle()
            .ok_or(Error::UsageFault("not a Win32 window handle"))?;
        Ok(Self {
            kind: SurfaceKind::Window,
            handle: SurfaceHandle::Window(hwnd),
            size: std::cell::Cell::new((0, 0)),
        })
    }

    /// A memory DC with a `width` x `height` bitmap selected into it.
    pub fn memory(hdc: HDC, width: u32, height: u32) -> Self {
        Self::from_dc(SurfaceKind::Memory, hdc, width, height)
    }

    pub fn printer(hdc: HDC, width: u32, height: u32) -> Self {
        Self::from_dc(SurfaceKind::Printer, hdc, width, height)
    }

    pub fn metafile(hdc: HDC, width: u32, height: u32) -> Self {
        Self::from_dc(SurfaceKind::EnhancedMetafile, hdc, width, height)
    }

    fn from_dc(kind: SurfaceKind, hdc: HDC, width: u32, height: u32) -> Self {
        Self {
            kind,
            handle: SurfaceHandle::Dc(hdc),
            size: std::cell::Cell::new((width, height)),
        }
    }

    /// Tells a device-context surface that its selected bitmap changed size.
    #[inline]
    pub fn set_size(&self, width: u32, height: u32) {
        self.size.set((width, height));
    }
}

impl Surface for NativeSurface {
    #[inline]
    fn kind(&self) -> SurfaceKind {
        self.kind
    }

    fn client_size(&self) -> Size<u32> {
        match self.handle {
            SurfaceHandle::Window(hwnd) => unsafe {
                let mut rc = RECT::default();
                if GetClientRect(hwnd, &mut rc).is_err() {
                    return pixel_size(0, 0);
                }
                pixel_size(
                    (rc.right - rc.left).max(0) as u32,
                    (rc.bottom - rc.top).max(0) as u32,
                )
            },
            SurfaceHandle::Dc(_) => {
                let (width, height) = self.size.get();
                pixel_size(width, height)
            }
        }
    }
}

#[derive(Clone, Debug)]
pub struct D2DGeometry(ID2D1Geometry);

impl D2DGeometry {
    #[inline]
    pub fn handle(&self) -> &ID2D1Geometry {
        &self.0
    }
}

impl Geometry<D2DSink> for D2DGeometry {
    fn bounds(&self, transform: Option<&Matrix>) -> Result<Rect<f32>> {
        let m = transform.map(|m| Matrix3x2::from(Wrapper(*m)));
        let r = unsafe {
            self.0
                .GetBounds(matrix_ptr(&m))
                .map_err(failed("geometry bounds"))?
        };
        Ok(Wrapper(r).into())
    }

    fn contains(&self, point: Point<f32>, transform: Option<&Matrix>) -> Result<bool> {
        let m = transform.map(|m| Matrix3x2::from(Wrapper(*m)));
        let hit = unsafe {
            self.0
                .FillContainsPoint(
                    Wrapper(point).into(),
                    matrix_ptr(&m),
                    D2D1_DEFAULT_FLATTENING_TOLERANCE,
                )
                .map_err(failed("hit test"))?
        };
        Ok(hit.as_bool())
    }

    fn stream(&self, sink: &mut D2DSink) -> Result<()> {
        unsafe {
            match self.0.cast::<ID2D1PathGeometry>() {
                Ok(path) => path.Stream(&sink.sink).map_err(failed("path stream")),
                Err(_) => self
                    .0
                    .Simplify(
                        D2D1_GEOMETRY_SIMPLIFICATION_OPTION_CUBICS_AND_LINES,
                        None,
                        D2D1_DEFAULT_FLATTENING_TOLERANCE,
                        &*sink.sink,
                    )
                    .map_err(failed("simplified geometry")),
            }
        }
    }

    fn figure_count(&self) -> Result<usize> {
        let path = match self.0.cast::<ID2D1PathGeometry>() {
            Ok(path) => path,
            Err(_) => {
                let mut factory = None;
                unsafe {
                    self.0.GetFactory(&mut factory);
                }
                let factory =
                    factory.ok_or_else(|| Error::creation("figure count", "no owning factory"))?;
                let mut sink = D2DSink::open(&factory, FillRule::Winding)?;
                self.stream(&mut sink)?;
                sink.finish()?
            }
        };
        let count = unsafe { path.GetFigureCount().map_err(failed("figure count"))? };
        Ok(count as usize)
    }
}

pub struct D2DSink {
    geometry: ID2D1PathGeometry,
    sink: ID2D1GeometrySink,
}

impl D2DSink {
    fn open(factory: &ID2D1Factory, fill_rule: FillRule) -> Result<Self> {
        unsafe {
            let geometry = factory
                .CreatePathGeometry()
                .map_err(failed("path geometry"))?;
            let sink = geometry.Open().map_err(failed("geometry sink"))?;
            sink.SetFillMode(match fill_rule {
                FillRule::EvenOdd => D2D1_FILL_MODE_ALTERNATE,
                FillRule::Winding => D2D1_FILL_MODE_WINDING,
            });
            Ok(Self { geometry, sink })
        }
    }

    fn finish(self) -> Result<ID2D1PathGeometry> {
        unsafe {
            self.sink.Close().map_err(failed("path geometry"))?;
        }
        Ok(self.geometry)
    }
}

impl GeometrySink<D2DGeometry> for D2DSink {
    #[inline]
    fn begin_figure(&mut self, start: Point<f32>) {
        unsafe {
            self.sink
                .BeginFigure(Wrapper(start).into(), D2D1_FIGURE_BEGIN_FILLED);
        }
    }

    #[inline]
    fn add_line(&mut self, to: Point<f32>) {
        unsafe {
            self.sink.AddLine(Wrapper(to).into());
        }
    }

    #[inline]
    fn add_bezier(&mut self, c1: Point<f32>, c2: Point<f32>, to: Point<f32>) {
        unsafe {
            self.sink.AddBezier(&D2D1_BEZIER_SEGMENT {
                point1: Wrapper(c1).into(),
                point2: Wrapper(c2).into(),
                point3: Wrapper(to).into(),
            });
        }
    }

    fn add_arc(&mut self, arc: &ArcSegment) {
        unsafe {
            self.sink.AddArc(&D2D1_ARC_SEGMENT {
                point: Wrapper(arc.end_point()).into(),
                size: D2D_SIZE_F {
                    width: arc.radius,
                    height: arc.radius,
                },
                rotationAngle: 0.0,
                sweepDirection: if arc.is_clockwise() {
                    D2D1_SWEEP_DIRECTION_CLOCKWISE
                } else {
                    D2D1_SWEEP_DIRECTION_COUNTER_CLOCKWISE
                },
                arcSize: if arc.is_large() {
                    D2D1_ARC_SIZE_LARGE
                } else {
                    D2D1_ARC_SIZE_SMALL
                },
            });
        }
    }

    #[inline]
    fn end_figure(&mut self, end: FigureEnd) {
        unsafe {
            self.sink.EndFigure(match end {
                FigureEnd::Open => D2D1_FIGURE_END_OPEN,
                FigureEnd::Closed => D2D1_FIGURE_END_CLOSED,
            });
        }
    }

    fn close(self) -> Result<D2DGeometry> {
        let path = self.finish()?;
        Ok(D2DGeometry(path.cast().map_err(failed("path geometry"))?))
    }
}

#[derive(Clone, Debug)]
pub struct D2DStrokeStyle(ID2D1StrokeStyle);

impl D2DStrokeStyle {
    #[inline]
    pub fn handle(&self) -> &ID2D1StrokeStyle {
        &self.0
    }
}

#[derive(Debug)]
pub struct D2DStateBlock(ID2D1DrawingStateBlock);

#[derive(Clone, Debug)]
pub struct D2DBrush(ID2D1Brush);

impl D2DBrush {
    #[inline]
    pub fn handle(&self) -> &ID2D1Brush {
        &self.0
    }
}

#[derive(Debug)]
pub struct D2DGradientStops(ID2D1GradientStopCollection);

#[derive(Clone, Debug)]
pub struct D2DBitmap(ID2D1Bitmap);

impl D2DBitmap {
    #[inline]
    pub fn handle(&self) -> &ID2D1Bitmap {
        &self.0
    }
}

#[derive(Debug)]
enum TargetKind {
    Hwnd(ID2D1HwndRenderTarget),
    Dc(ID2D1DCRenderTarget, HDC),
}

#[derive(Debug)]
pub struct D2DTarget {
    id: TargetId,
    kind: TargetKind,
    rt: ID2D1RenderTarget,
    size: Size<u32>,
}

impl D2DTarget {
    #[inline]
    pub fn handle(&self) -> &ID2D1RenderTarget {
        &self.rt
    }

    fn bind_dc(target: &ID2D1DCRenderTarget, hdc: HDC, size: Size<u32>) -> Result<()> {
        let rc = RECT {
            left: 0,
            top: 0,
            right: size.width as i32,
            bottom: size.height as i32,
        };
        unsafe { target.BindDC(hdc, &rc).map_err(failed("DC binding")) }
    }
}

impl RenderTarget<Direct2D> for D2DTarget {
    #[inline]
    fn id(&self) -> TargetId {
        self.id
    }

    #[inline]
    fn pixel_size(&self) -> Size<u32> {
        self.size
    }

    fn resize(&mut self, size: Size<u32>) -> Result<()> {
        match &self.kind {
            TargetKind::Hwnd(target) => unsafe {
                target
                    .Resize(&D2D_SIZE_U {
                        width: size.width,
                        height: size.height,
                    })
                    .map_err(failed("render target"))?;
            },
            TargetKind::Dc(target, hdc) => Self::bind_dc(target, *hdc, size)?,
        }
        self.size = size;
        Ok(())
    }

    #[inline]
    fn begin_draw(&mut self) {
        unsafe {
            self.rt.BeginDraw();
        }
    }

    fn end_draw(&mut self) -> Result<()> {
        unsafe {
            self.rt.EndDraw(None, None).map_err(|e| {
                if e.code() == D2DERR_RECREATE_TARGET {
                    Error::DeviceLost
                } else {
                    Error::Render(e.to_string())
                }
            })
        }
    }

    fn transform(&self) -> Matrix {
        let mut m = Matrix3x2::default();
        unsafe {
            self.rt.GetTransform(&mut m);
        }
        Wrapper(m).into()
    }

    #[inline]
    fn set_transform(&mut self, m: &Matrix) {
        unsafe {
            let m: Matrix3x2 = Wrapper(*m).into();
            self.rt.SetTransform(&m);
        }
    }

    fn antialias_mode(&self) -> AntialiasMode {
        if unsafe { self.rt.GetAntialiasMode() } == D2D1_ANTIALIAS_MODE_ALIASED {
            AntialiasMode::None
        } else {
            AntialiasMode::Default
        }
    }

    #[inline]
    fn set_antialias_mode(&mut self, mode: AntialiasMode) {
        unsafe {
            self.rt.SetAntialiasMode(native_antialias(mode));
        }
    }

    #[inline]
    fn push_axis_aligned_clip(&mut self, clip: Rect<f32>, mode: AntialiasMode) {
        unsafe {
            let clip: D2D_RECT_F = Wrapper(clip).into();
            self.rt.PushAxisAlignedClip(&clip, native_antialias(mode));
        }
    }

    #[inline]
    fn pop_axis_aligned_clip(&mut self) {
        unsafe {
            self.rt.PopAxisAlignedClip();
        }
    }

    #[inline]
    fn save_state(&mut self, block: &mut D2DStateBlock) {
        unsafe {
            self.rt.SaveDrawingState(&block.0);
        }
    }

    #[inline]
    fn restore_state(&mut self, block: &D2DStateBlock) {
        unsafe {
            self.rt.RestoreDrawingState(&block.0);
        }
    }

    fn create_solid_brush(&self, color: Rgba<f32>) -> Result<D2DBrush> {
        let color: D2D1_COLOR_F = Wrapper(color).into();
        unsafe {
            let brush = self
                .rt
                .CreateSolidColorBrush(&color, None)
                .map_err(failed("solid color brush"))?;
            Ok(D2DBrush(brush.cast().map_err(failed("solid color brush"))?))
        }
    }

    fn create_gradient_stops(
        &self,
        stops: &[GradientStop],
        mode: GradientMode,
    ) -> Result<D2DGradientStops> {
        let stops = stops
            .iter()
            .map(|stop| D2D1_GRADIENT_STOP {
                position: stop.position,
                color: Wrapper(stop.color).into(),
            })
            .collect::<Vec<_>>();
        let extend = match mode {
            GradientMode::Clamp => D2D1_EXTEND_MODE_CLAMP,
            GradientMode::Mirror => D2D1_EXTEND_MODE_MIRROR,
            GradientMode::Wrap => D2D1_EXTEND_MODE_WRAP,
        };
        let collection = unsafe {
            self.rt
                .CreateGradientStopCollection(&stops, D2D1_GAMMA_2_2, extend)
                .map_err(failed("gradient stop collection"))?
        };
        Ok(D2DGradientStops(collection))
    }

    fn create_linear_brush(
        &self,
        start: Point<f32>,
        end: Point<f32>,
        stops: &D2DGradientStops,
    ) -> Result<D2DBrush> {
        unsafe {
            let brush = self
                .rt
                .CreateLinearGradientBrush(
                    &D2D1_LINEAR_GRADIENT_BRUSH_PROPERTIES {
                        startPoint: Wrapper(start).into(),
                        endPoint: Wrapper(end).into(),
                    },
                    None,
                    &stops.0,
                )
                .map_err(failed("linear gradient brush"))?;
            Ok(D2DBrush(brush.cast().map_err(failed("linear gradient brush"))?))
        }
    }

    fn create_radial_brush(
        &self,
        center: Point<f32>,
        offset: Point<f32>,
        radius: f32,
        stops: &D2DGradientStops,
    ) -> Result<D2DBrush> {
        unsafe {
            let brush = self
                .rt
                .CreateRadialGradientBrush(
                    &D2D1_RADIAL_GRADIENT_BRUSH_PROPERTIES {
                        center: Wrapper(center).into(),
                        gradientOriginOffset: Wrapper(offset).into(),
                        radiusX: radius,
                        radiusY: radius,
                    },
                    None,
                    &stops.0,
                )
                .map_err(failed("radial gradient brush"))?;
            Ok(D2DBrush(brush.cast().map_err(failed("radial gradient brush"))?))
        }
    }

    fn create_bitmap(&self, pixels: &DevicePixels) -> Result<D2DBitmap> {
        let source = wic_bitmap(pixels)?;
        let bitmap = unsafe {
            self.rt
                .CreateBitmapFromWicBitmap(&*source, None)
                .map_err(failed("bitmap"))?
        };
        Ok(D2DBitmap(bitmap))
    }

    #[inline]
    fn clear(&mut self, color: Rgba<f32>) {
        let color: D2D1_COLOR_F = Wrapper(color).into();
        unsafe {
            self.rt.Clear(Some(&color));
        }
    }

    #[inline]
    fn draw_geometry(
        &mut self,
        geometry: &D2DGeometry,
        brush: &D2DBrush,
        width: f32,
        style: Option<&D2DStrokeStyle>,
    ) {
        unsafe {
            self.rt
                .DrawGeometry(&geometry.0, &brush.0, width, style.map(|s| &s.0));
        }
    }

    #[inline]
    fn fill_geometry(&mut self, geometry: &D2DGeometry, brush: &D2DBrush) {
        unsafe {
            self.rt.FillGeometry(&geometry.0, &brush.0, None);
        }
    }

    fn draw_shape(
        &mut self,
        shape: &Shape,
        brush: &D2DBrush,
        width: f32,
        style: Option<&D2DStrokeStyle>,
    ) {
        let style = style.map(|s| &s.0);
        let bounds: D2D_RECT_F = Wrapper(shape.bounds()).into();
        unsafe {
            match *shape {
                Shape::Line { x0, y0, x1, y1 } => self.rt.DrawLine(
                    Wrapper(pt(x0, y0)).into(),
                    Wrapper(pt(x1, y1)).into(),
                    &brush.0,
                    width,
                    style,
                ),
                Shape::Rectangle { .. } => self.rt.DrawRectangle(&bounds, &brush.0, width, style),
                Shape::RoundedRectangle { radius, .. } => self.rt.DrawRoundedRectangle(
                    &D2D1_ROUNDED_RECT {
                        rect: bounds,
                        radiusX: radius,
                        radiusY: radius,
                    },
                    &brush.0,
                    width,
                    style,
                ),
                Shape::Ellipse { cx, cy, rx, ry } => self.rt.DrawEllipse(
                    &D2D1_ELLIPSE {
                        point: Wrapper(pt(cx, cy)).into(),
                        radiusX: rx,
                        radiusY: ry,
                    },
                    &brush.0,
                    width,
                    style,
                ),
            }
        }
    }

    fn fill_shape(&mut self, shape: &Shape, brush: &D2DBrush) {
        let bounds: D2D_RECT_F = Wrapper(shape.bounds()).into();
        unsafe {
            match *shape {
                // a line encloses nothing
                Shape::Line { .. } => {}
                Shape::Rectangle { .. } => self.rt.FillRectangle(&bounds, &brush.0),
                Shape::RoundedRectangle { radius, .. } => self.rt.FillRoundedRectangle(
                    &D2D1_ROUNDED_RECT {
                        rect: bounds,
                        radiusX: radius,
                        radiusY: radius,
                    },
                    &brush.0,
                ),
                Shape::Ellipse { cx, cy, rx, ry } => self.rt.FillEllipse(
                    &D2D1_ELLIPSE {
                        point: Wrapper(pt(cx, cy)).into(),
                        radiusX: rx,
                        radiusY: ry,
                    },
                    &brush.0,
                ),
            }
        }
    }

    fn draw_bitmap(
        &mut self,
        bitmap: &D2DBitmap,
        dest: Rect<f32>,
        opacity: f32,
        interpolation: Interpolation,
    ) {
        let mode = match interpolation {
            Interpolation::NearestNeighbor => D2D1_BITMAP_INTERPOLATION_MODE_NEAREST_NEIGHBOR,
            Interpolation::Linear => D2D1_BITMAP_INTERPOLATION_MODE_LINEAR,
        };
        let dest: D2D_RECT_F = Wrapper(dest).into();
        unsafe {
            self.rt
                .DrawBitmap(&bitmap.0, Some(&dest), opacity, mode, None);
        }
    }
}

/// The process-wide imaging factory. COM must be initialized on the calling
/// thread before the first bitmap is realized.
struct ImagingFactory(IWICImagingFactory);

unsafe impl Send for ImagingFactory {}
unsafe impl Sync for ImagingFactory {}

fn imaging_factory() -> Result<&'static IWICImagingFactory> {
    static FACTORY: once_cell::sync::OnceCell<ImagingFactory> = once_cell::sync::OnceCell::new();
    FACTORY
        .get_or_try_init(|| unsafe {
            debug!("created WIC imaging factory");
            CoCreateInstance(&CLSID_WICImagingFactory, None, CLSCTX_INPROC_SERVER)
                .map(ImagingFactory)
                .map_err(failed("WIC imaging factory"))
        })
        .map(|factory| &factory.0)
}

/// Write access to the pixels of a WIC bitmap. The lock is released on drop.
struct PixelLock {
    lock: IWICBitmapLock,
    stride: usize,
    data: *mut u8,
    len: usize,
}

impl PixelLock {
    fn new(bitmap: &IWICBitmap, width: u32, height: u32) -> Result<Self> {
        let area = WICRect {
            X: 0,
            Y: 0,
            Width: width as i32,
            Height: height as i32,
        };
        unsafe {
            let lock = bitmap
                .Lock(&area, WICBitmapLockWrite.0 as u32)
                .map_err(failed("bitmap lock"))?;
            let stride = lock.GetStride().map_err(failed("bitmap lock"))? as usize;
            let mut len = 0;
            let mut data = std::ptr::null_mut();
            lock.GetDataPointer(&mut len, &mut data)
                .map_err(failed("bitmap lock"))?;
            Ok(Self {
                lock,
                stride,
                data,
                len: len as usize,
            })
        }
    }

    fn rows_mut(&mut self) -> std::slice::ChunksMut<'_, u8> {
        let data: &mut [u8] = if self.data.is_null() {
            &mut []
        } else {
            unsafe { std::slice::from_raw_parts_mut(self.data, self.len) }
        };
        data.chunks_mut(self.stride.max(1))
    }
}

impl Drop for PixelLock {
    fn drop(&mut self) {
        trace!("unlock {:?}", self.lock);
    }
}

/// Copies `pixels` into a WIC bitmap and converts it to premultiplied BGRA.
fn wic_bitmap(pixels: &DevicePixels) -> Result<IWICFormatConverter> {
    let factory = imaging_factory()?;
    let format = match pixels.format {
        PixelFormat::Pbgra32 => GUID_WICPixelFormat32bppPBGRA,
        PixelFormat::Bgr32 => GUID_WICPixelFormat32bppBGR,
    };
    unsafe {
        let bitmap = factory
            .CreateBitmap(pixels.width, pixels.height, &format, WICBitmapCacheOnLoad)
            .map_err(failed("WIC bitmap"))?;
        {
            let mut lock = PixelLock::new(&bitmap, pixels.width, pixels.height)?;
            let row = pixels.stride as usize;
            for (dst, src) in lock.rows_mut().zip(pixels.data.chunks(row.max(1))) {
                let n = dst.len().min(src.len());
                dst[..n].copy_from_slice(&src[..n]);
            }
        }
        let converter = factory
            .CreateFormatConverter()
            .map_err(failed("format converter"))?;
        converter
            .Initialize(
                &*bitmap,
                &GUID_WICPixelFormat32bppPBGRA,
                WICBitmapDitherTypeNone,
                None,
                0.0,
                WICBitmapPaletteTypeMedianCut,
            )
            .map_err(failed("format converter"))?;
        Ok(converter)
    }
}

#[inline]
fn native_antialias(mode: AntialiasMode) -> D2D1_ANTIALIAS_MODE {
    match mode {
        AntialiasMode::None => D2D1_ANTIALIAS_MODE_ALIASED,
        AntialiasMode::Default => D2D1_ANTIALIAS_MODE_PER_PRIMITIVE,
    }
}

/// The Direct2D backend. Cloning shares the underlying factory.
#[derive(Clone, Debug)]
pub struct Direct2D {
    factory: ID2D1Factory,
    options: RendererOptions,
}

impl Direct2D {
    pub fn new(options: &RendererOptions) -> Result<Self> {
        let factory_type = match options.threading {
            FactoryThreading::Single => D2D1_FACTORY_TYPE_SINGLE_THREADED,
            FactoryThreading::Multi => D2D1_FACTORY_TYPE_MULTI_THREADED,
        };
        let factory_options = D2D1_FACTORY_OPTIONS {
            debugLevel: match options.debug_level {
                DebugLevel::None => D2D1_DEBUG_LEVEL_NONE,
                DebugLevel::Error => D2D1_DEBUG_LEVEL_ERROR,
                DebugLevel::Warning => D2D1_DEBUG_LEVEL_WARNING,
                DebugLevel::Information => D2D1_DEBUG_LEVEL_INFORMATION,
            },
        };
        let factory: ID2D1Factory = unsafe {
            D2D1CreateFactory(factory_type, Some(&factory_options))
                .map_err(failed("Direct2D factory"))?
        };
        debug!("created Direct2D factory ({:?})", options.threading);
        Ok(Self {
            factory,
            options: *options,
        })
    }

    #[inline]
    pub fn factory(&self) -> &ID2D1Factory {
        &self.factory
    }

    #[inline]
    pub fn options(&self) -> &RendererOptions {
        &self.options
    }

    fn target_properties(alpha_mode: D2D1_ALPHA_MODE) -> D2D1_RENDER_TARGET_PROPERTIES {
        D2D1_RENDER_TARGET_PROPERTIES {
            pixelFormat: D2D1_PIXEL_FORMAT {
                format: DXGI_FORMAT_B8G8R8A8_UNORM,
                alphaMode: alpha_mode,
            },
            ..Default::default()
        }
    }
}

unsafe impl Send for Direct2D {}
unsafe impl Sync for Direct2D {}

impl Backend for Direct2D {
    type Surface = NativeSurface;
    type RenderTarget = D2DTarget;
    type Geometry = D2DGeometry;
    type GeometrySink = D2DSink;
    type StrokeStyle = D2DStrokeStyle;
    type StateBlock = D2DStateBlock;
    type Brush = D2DBrush;
    type GradientStops = D2DGradientStops;
    type Bitmap = D2DBitmap;

    #[inline]
    fn name(&self) -> &'static str {
        "Direct2D"
    }

    #[inline]
    fn version(&self) -> (u32, u32, u32) {
        (1, 0, 0)
    }

    fn create_render_target(&self, surface: &NativeSurface) -> Result<D2DTarget> {
        let size = surface.client_size();
        let kind = match (surface.kind, surface.handle) {
            (SurfaceKind::Window, SurfaceHandle::Window(hwnd)) => unsafe {
                let target = self
                    .factory
                    .CreateHwndRenderTarget(
                        &Self::target_properties(D2D1_ALPHA_MODE_PREMULTIPLIED),
                        &D2D1_HWND_RENDER_TARGET_PROPERTIES {
                            hwnd,
                            pixelSize: D2D_SIZE_U {
                                width: size.width,
                                height: size.height,
                            },
                            presentOptions: D2D1_PRESENT_OPTIONS_NONE,
                        },
                    )
                    .map_err(failed("HWND render target"))?;
                TargetKind::Hwnd(target)
            },
            (SurfaceKind::Memory, SurfaceHandle::Dc(hdc)) => {
                let target = unsafe {
                    self.factory
                        .CreateDCRenderTarget(&Self::target_properties(D2D1_ALPHA_MODE_IGNORE))
                        .map_err(failed("DC render target"))?
                };
                D2DTarget::bind_dc(&target, hdc, size)?;
                TargetKind::Dc(target, hdc)
            }
            (SurfaceKind::Printer, _) => return Err(Error::NotImplemented("printer contexts")),
            (SurfaceKind::EnhancedMetafile, _) => {
                return Err(Error::NotImplemented("enhanced metafile contexts"))
            }
            _ => return Err(Error::UsageFault("surface handle does not match its kind")),
        };
        let rt: ID2D1RenderTarget = match &kind {
            TargetKind::Hwnd(target) => target.cast(),
            TargetKind::Dc(target, _) => target.cast(),
        }
        .map_err(failed("render target"))?;
        let id = TargetId::next();
        trace!("D2D render target {:?}", id);
        Ok(D2DTarget { id, kind, rt, size })
    }

    fn create_stroke_style(&self, props: &StrokeStyleProperties) -> Result<D2DStrokeStyle> {
        let cap = |cap: CapStyle| match cap {
            CapStyle::Flat => D2D1_CAP_STYLE_FLAT,
            CapStyle::Square => D2D1_CAP_STYLE_SQUARE,
            CapStyle::Round => D2D1_CAP_STYLE_ROUND,
            CapStyle::Triangle => D2D1_CAP_STYLE_TRIANGLE,
        };
        let line_join = match props.line_join {
            LineJoin::Miter => D2D1_LINE_JOIN_MITER,
            LineJoin::Bevel => D2D1_LINE_JOIN_BEVEL,
            LineJoin::Round => D2D1_LINE_JOIN_ROUND,
            LineJoin::MiterOrBevel(_) => D2D1_LINE_JOIN_MITER_OR_BEVEL,
        };
        let (dash_cap, dash_style, dash_offset) = match props.dash.as_ref() {
            Some(dash) => {
                let style = match dash.style {
                    DashStyle::Solid => D2D1_DASH_STYLE_SOLID,
                    DashStyle::Dash => D2D1_DASH_STYLE_DASH,
                    DashStyle::Dot => D2D1_DASH_STYLE_DOT,
                    DashStyle::DashDot => D2D1_DASH_STYLE_DASH_DOT,
                    DashStyle::DashDotDot => D2D1_DASH_STYLE_DASH_DOT_DOT,
                    DashStyle::Custom(_) => D2D1_DASH_STYLE_CUSTOM,
                };
                (cap(dash.cap), style, dash.offset)
            }
            None => (D2D1_CAP_STYLE_FLAT, D2D1_DASH_STYLE_SOLID, 0.0),
        };
        let native = D2D1_STROKE_STYLE_PROPERTIES {
            startCap: cap(props.start_cap),
            endCap: cap(props.end_cap),
            dashCap: dash_cap,
            lineJoin: line_join,
            miterLimit: props.miter_limit(),
            dashStyle: dash_style,
            dashOffset: dash_offset,
        };
        let style = unsafe {
            self.factory
                .CreateStrokeStyle(&native, props.custom_dashes())
                .map_err(failed("stroke style"))?
        };
        Ok(D2DStrokeStyle(style))
    }

    fn create_state_block(&self) -> Result<D2DStateBlock> {
        let block = unsafe {
            self.factory
                .CreateDrawingStateBlock(None, None)
                .map_err(failed("drawing state block"))?
        };
        Ok(D2DStateBlock(block))
    }

    #[inline]
    fn open_path(&self, fill_rule: FillRule) -> Result<D2DSink> {
        D2DSink::open(&self.factory, fill_rule)
    }

    fn create_ellipse(&self, center: Point<f32>, rx: f32, ry: f32) -> Result<D2DGeometry> {
        unsafe {
            let ellipse = self
                .factory
                .CreateEllipseGeometry(&D2D1_ELLIPSE {
                    point: Wrapper(center).into(),
                    radiusX: rx,
                    radiusY: ry,
                })
                .map_err(failed("ellipse geometry"))?;
            Ok(D2DGeometry(ellipse.cast().map_err(failed("ellipse geometry"))?))
        }
    }

    fn combine_union(&self, a: &D2DGeometry, b: &D2DGeometry, sink: &mut D2DSink) -> Result<()> {
        unsafe {
            a.0.CombineWithGeometry(
                &b.0,
                D2D1_COMBINE_MODE_UNION,
                None,
                D2D1_DEFAULT_FLATTENING_TOLERANCE,
                &*sink.sink,
            )
            .map_err(failed("combined geometry"))
        }
    }

    fn transform_geometry(&self, geometry: &D2DGeometry, m: &Matrix) -> Result<D2DGeometry> {
        let m: Matrix3x2 = Wrapper(*m).into();
        unsafe {
            let transformed = self
                .factory
                .CreateTransformedGeometry(&geometry.0, &m)
                .map_err(failed("transformed geometry"))?;
            Ok(D2DGeometry(
                transformed.cast().map_err(failed("transformed geometry"))?,
            ))
        }
    }
}
