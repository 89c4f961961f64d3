use crate::*;
use log::debug;

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum FactoryThreading {
    Single,
    #[default]
    Multi,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum DebugLevel {
    #[default]
    None,
    Error,
    Warning,
    Information,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct RendererOptions {
    pub threading: FactoryThreading,
    pub debug_level: DebugLevel,
}

#[derive(Clone, PartialEq, Debug)]
pub struct FontSpec {
    pub face: String,
    pub size: f32,
}

/// A realized font. No backend creates one yet.
#[derive(Debug)]
pub struct Font {
    spec: FontSpec,
}

impl Font {
    #[inline]
    pub fn spec(&self) -> &FontSpec {
        &self.spec
    }
}

/// The entry point of a backend: creates contexts and every descriptor they
/// consume.
#[derive(Clone, Debug)]
pub struct Renderer<B: Backend> {
    backend: B,
}

impl<B: Backend> Renderer<B> {
    #[inline]
    pub fn new(backend: B) -> Self {
        debug!("renderer on {}", backend.name());
        Self { backend }
    }

    #[inline]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    #[inline]
    pub fn name(&self) -> &'static str {
        self.backend.name()
    }

    #[inline]
    pub fn version(&self) -> (u32, u32, u32) {
        self.backend.version()
    }

    #[inline]
    pub fn create_context(&self, surface: B::Surface) -> Result<Context<B>> {
        self.create_context_with(surface, ContextOptions::default())
    }

    /// Creates a context for a window or memory surface. The render target is
    /// only created by the first drawing call.
    pub fn create_context_with(
        &self,
        surface: B::Surface,
        options: ContextOptions,
    ) -> Result<Context<B>> {
        match surface.kind() {
            SurfaceKind::Window | SurfaceKind::Memory => {
                Ok(Context::new(&self.backend, surface, options))
            }
            SurfaceKind::Printer => Err(Error::NotImplemented("printer contexts")),
            SurfaceKind::EnhancedMetafile => {
                Err(Error::NotImplemented("enhanced metafile contexts"))
            }
        }
    }

    pub fn create_context_from_native_context(
        &self,
        _context: *mut std::ffi::c_void,
    ) -> Result<Context<B>> {
        Err(Error::NotImplemented("native context adoption"))
    }

    pub fn create_context_from_native_window(
        &self,
        _window: *mut std::ffi::c_void,
    ) -> Result<Context<B>> {
        Err(Error::NotImplemented("native window adoption"))
    }

    pub fn create_context_from_image(&self, _image: &SourceBitmap) -> Result<Context<B>> {
        Err(Error::NotImplemented("image contexts"))
    }

    pub fn create_measuring_context(&self) -> Result<Context<B>> {
        Err(Error::NotImplemented("measuring contexts"))
    }

    #[inline]
    pub fn create_path(&self) -> Path<B> {
        Path::new(&self.backend)
    }

    #[inline]
    pub fn create_matrix(&self, a: f32, b: f32, c: f32, d: f32, tx: f32, ty: f32) -> Matrix {
        Matrix::new(a, b, c, d, tx, ty)
    }

    #[inline]
    pub fn create_pen(&self, spec: PenSpec) -> Result<Pen<B>> {
        Pen::new(&self.backend, spec)
    }

    /// `None` for a transparent brush, which fills nothing.
    pub fn create_brush(&self, source: &BrushSource) -> Result<Option<Brush<B>>> {
        match &source.style {
            BrushStyle::Solid => Ok(Some(self.create_solid_brush(source.color))),
            BrushStyle::Transparent => Ok(None),
            BrushStyle::Hatch(_) => Err(Error::NotImplemented("hatch brush")),
            BrushStyle::Stipple(bitmap) => Ok(Some(Brush::new(BrushKind::Bitmap(
                Bitmap::new(bitmap.clone()),
            )))),
        }
    }

    #[inline]
    pub fn create_solid_brush(&self, color: impl Into<Rgba<f32>>) -> Brush<B> {
        Brush::new(BrushKind::Solid(color.into()))
    }

    pub fn create_linear_gradient_brush(
        &self,
        x1: f32,
        y1: f32,
        x2: f32,
        y2: f32,
        stops: &GradientStops,
    ) -> Brush<B> {
        Brush::new(BrushKind::LinearGradient {
            start: pt(x1, y1),
            end: pt(x2, y2),
            stops: stops.clone(),
        })
    }

    /// `(xo, yo)` is the gradient origin, `(xc, yc)` the center of the circle.
    pub fn create_radial_gradient_brush(
        &self,
        xo: f32,
        yo: f32,
        xc: f32,
        yc: f32,
        radius: f32,
        stops: &GradientStops,
    ) -> Brush<B> {
        Brush::new(BrushKind::RadialGradient {
            origin: pt(xo, yo),
            center: pt(xc, yc),
            radius,
            stops: stops.clone(),
        })
    }

    #[inline]
    pub fn create_bitmap(&self, source: SourceBitmap) -> Bitmap<B> {
        Bitmap::new(source)
    }

    #[inline]
    pub fn create_bitmap_from_native(&self, native: NativeBitmap<B>) -> Result<Bitmap<B>> {
        Bitmap::from_native(native)
    }

    pub fn create_sub_bitmap(
        &self,
        _bitmap: &Bitmap<B>,
        _x: f32,
        _y: f32,
        _width: f32,
        _height: f32,
    ) -> Result<Bitmap<B>> {
        Err(Error::NotImplemented("sub-bitmaps"))
    }

    pub fn create_bitmap_from_image(&self, _image: &[u8]) -> Result<Bitmap<B>> {
        Err(Error::NotImplemented("image import"))
    }

    pub fn create_image_from_bitmap(&self, _bitmap: &Bitmap<B>) -> Result<SourceBitmap> {
        Err(Error::NotImplemented("image export"))
    }

    pub fn create_font(&self, _spec: &FontSpec) -> Result<Font> {
        Err(Error::NotImplemented("fonts"))
    }
}

#[cfg(windows)]
impl Renderer<Direct2D> {
    /// The process-wide renderer, created on first use with a multi-threaded
    /// factory.
    pub fn global() -> Result<&'static Self> {
        static GLOBAL: once_cell::sync::OnceCell<Renderer<Direct2D>> =
            once_cell::sync::OnceCell::new();
        GLOBAL.get_or_try_init(|| Direct2D::new(&RendererOptions::default()).map(Renderer::new))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recording::{Recorder, RecordingSurface};

    #[test]
    fn identity() {
        let renderer = Renderer::new(Recorder::new());
        assert_eq!(renderer.name(), "recording");
        assert_eq!(renderer.version(), (1, 0, 0));
    }

    #[test]
    fn unsupported_surfaces() {
        let renderer = Renderer::new(Recorder::new());
        assert!(renderer
            .create_context(RecordingSurface::window(10, 10))
            .is_ok());
        assert!(renderer
            .create_context(RecordingSurface::memory(10, 10))
            .is_ok());
        assert_eq!(
            renderer
                .create_context(RecordingSurface::printer(10, 10))
                .err(),
            Some(Error::NotImplemented("printer contexts"))
        );
        assert_eq!(
            renderer
                .create_context(RecordingSurface::metafile(10, 10))
                .err()
                .map(|e| e.kind()),
            Some(ErrorKind::NotImplemented)
        );
        assert!(renderer
            .create_context_from_native_window(std::ptr::null_mut())
            .is_err());
        assert!(renderer.create_measuring_context().is_err());
    }

    #[test]
    fn brush_sources() {
        let renderer = Renderer::new(Recorder::new());
        assert!(renderer
            .create_brush(&BrushSource::transparent())
            .unwrap()
            .is_none());
        let hatch = BrushSource {
            color: rgba8(0, 0, 0, 255),
            style: BrushStyle::Hatch(HatchStyle::Cross),
        };
        assert_eq!(
            renderer.create_brush(&hatch).err().map(|e| e.kind()),
            Some(ErrorKind::NotImplemented)
        );
        let solid = renderer
            .create_brush(&BrushSource::solid(rgba8(0, 0, 0, 255)))
            .unwrap();
        assert!(matches!(solid.map(|b| b.kind().clone()), Some(BrushKind::Solid(_))));
    }

    #[test]
    fn unsupported_conversions() {
        let renderer = Renderer::new(Recorder::new());
        let bitmap = renderer.create_bitmap(SourceBitmap::from_rgb(1, 1, vec![0, 0, 0]).unwrap());
        assert!(renderer.create_sub_bitmap(&bitmap, 0.0, 0.0, 1.0, 1.0).is_err());
        assert!(renderer.create_image_from_bitmap(&bitmap).is_err());
        assert!(renderer.create_bitmap_from_image(&[]).is_err());
        let font = FontSpec {
            face: "Segoe UI".into(),
            size: 12.0,
        };
        assert!(renderer.create_font(&font).is_err());
    }
}
