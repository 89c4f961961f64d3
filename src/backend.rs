use crate::*;
use std::sync::atomic::{AtomicU64, Ordering};

/// Identifies one render target for its whole lifetime. A recreated target
/// never reuses the id of the one it replaces.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct TargetId(u64);

impl TargetId {
    pub(crate) fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

/// The native 2D API: a device-independent factory plus the native object
/// types it hands out.
///
/// A value of this type plays the factory role. It creates device-independent
/// objects (geometries, stroke styles, state blocks) and render targets;
/// device-dependent objects (brushes, bitmaps) are created by a render target.
pub trait Backend: Clone + 'static {
    type Surface: Surface + 'static;
    type RenderTarget: RenderTarget<Self> + 'static;
    type Geometry: Geometry<Self::GeometrySink> + 'static;
    type GeometrySink: GeometrySink<Self::Geometry> + 'static;
    type StrokeStyle: Clone + 'static;
    type StateBlock: 'static;
    type Brush: Clone + 'static;
    type GradientStops: 'static;
    type Bitmap: Clone + 'static;

    fn name(&self) -> &'static str;
    fn version(&self) -> (u32, u32, u32);

    fn create_render_target(&self, surface: &Self::Surface) -> Result<Self::RenderTarget>;
    fn create_stroke_style(&self, props: &StrokeStyleProperties) -> Result<Self::StrokeStyle>;
    fn create_state_block(&self) -> Result<Self::StateBlock>;

    /// Opens an empty path geometry for writing.
    fn open_path(&self, fill_rule: FillRule) -> Result<Self::GeometrySink>;
    fn create_ellipse(&self, center: Point<f32>, rx: f32, ry: f32) -> Result<Self::Geometry>;
    /// Writes the union of `a` and `b` into `sink`.
    fn combine_union(
        &self,
        a: &Self::Geometry,
        b: &Self::Geometry,
        sink: &mut Self::GeometrySink,
    ) -> Result<()>;
    fn transform_geometry(&self, geometry: &Self::Geometry, m: &Matrix)
        -> Result<Self::Geometry>;
}

/// Append-only writer of a path geometry. Once closed, the geometry can only be
/// read or streamed into another sink.
pub trait GeometrySink<G> {
    fn begin_figure(&mut self, start: Point<f32>);
    fn add_line(&mut self, to: Point<f32>);
    fn add_bezier(&mut self, c1: Point<f32>, c2: Point<f32>, to: Point<f32>);
    fn add_arc(&mut self, arc: &ArcSegment);
    fn end_figure(&mut self, end: FigureEnd);
    fn close(self) -> Result<G>;
}

pub trait Geometry<S>: Clone {
    /// Axis-aligned bounds after `transform`. Empty geometries report a
    /// zero-sized rectangle at the origin.
    fn bounds(&self, transform: Option<&Matrix>) -> Result<Rect<f32>>;
    fn contains(&self, point: Point<f32>, transform: Option<&Matrix>) -> Result<bool>;
    fn stream(&self, sink: &mut S) -> Result<()>;
    fn figure_count(&self) -> Result<usize>;
}

/// A device-bound pixel destination.
///
/// Drawing calls only record work; failures surface from `end_draw`.
pub trait RenderTarget<B: Backend> {
    fn id(&self) -> TargetId;
    fn pixel_size(&self) -> Size<u32>;
    fn resize(&mut self, size: Size<u32>) -> Result<()>;

    fn begin_draw(&mut self);
    fn end_draw(&mut self) -> Result<()>;

    fn transform(&self) -> Matrix;
    fn set_transform(&mut self, m: &Matrix);
    fn antialias_mode(&self) -> AntialiasMode;
    fn set_antialias_mode(&mut self, mode: AntialiasMode);
    fn push_axis_aligned_clip(&mut self, clip: Rect<f32>, mode: AntialiasMode);
    fn pop_axis_aligned_clip(&mut self);
    fn save_state(&mut self, block: &mut B::StateBlock);
    fn restore_state(&mut self, block: &B::StateBlock);

    fn create_solid_brush(&self, color: Rgba<f32>) -> Result<B::Brush>;
    fn create_gradient_stops(
        &self,
        stops: &[GradientStop],
        mode: GradientMode,
    ) -> Result<B::GradientStops>;
    fn create_linear_brush(
        &self,
        start: Point<f32>,
        end: Point<f32>,
        stops: &B::GradientStops,
    ) -> Result<B::Brush>;
    fn create_radial_brush(
        &self,
        center: Point<f32>,
        offset: Point<f32>,
        radius: f32,
        stops: &B::GradientStops,
    ) -> Result<B::Brush>;
    fn create_bitmap(&self, pixels: &DevicePixels) -> Result<B::Bitmap>;

    fn clear(&mut self, color: Rgba<f32>);
    fn draw_geometry(
        &mut self,
        geometry: &B::Geometry,
        brush: &B::Brush,
        width: f32,
        style: Option<&B::StrokeStyle>,
    );
    fn fill_geometry(&mut self, geometry: &B::Geometry, brush: &B::Brush);
    fn draw_shape(
        &mut self,
        shape: &Shape,
        brush: &B::Brush,
        width: f32,
        style: Option<&B::StrokeStyle>,
    );
    fn fill_shape(&mut self, shape: &Shape, brush: &B::Brush);
    fn draw_bitmap(
        &mut self,
        bitmap: &B::Bitmap,
        dest: Rect<f32>,
        opacity: f32,
        interpolation: Interpolation,
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn target_id_unique() {
        let a = TargetId::next();
        let b = TargetId::next();
        assert_ne!(a, b);
    }
}
