use crate::resource::Slot;
use crate::*;
use log::trace;
use std::rc::Rc;

#[derive(Clone, Copy, Debug)]
pub struct GradientStop {
    pub position: f32,
    pub color: Rgba<f32>,
}

impl GradientStop {
    #[inline]
    pub fn new(position: f32, color: impl Into<Rgba<f32>>) -> Self {
        Self {
            position,
            color: color.into(),
        }
    }
}

impl<T> From<(f32, T)> for GradientStop
where
    T: Into<Rgba<f32>>,
{
    #[inline]
    fn from(src: (f32, T)) -> Self {
        Self {
            position: src.0,
            color: src.1.into(),
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum GradientMode {
    #[default]
    Clamp,
    Mirror,
    Wrap,
}

/// An ordered sequence of gradient stops, from a start color at 0 to an end
/// color at 1 with any number of stops in between.
#[derive(Clone, Debug)]
pub struct GradientStops(Vec<GradientStop>);

impl GradientStops {
    pub fn new(start: impl Into<Rgba<f32>>, end: impl Into<Rgba<f32>>) -> Self {
        Self(vec![
            GradientStop::new(0.0, start),
            GradientStop::new(1.0, end),
        ])
    }

    /// Inserts a stop, keeping the sequence ordered by position.
    pub fn add(&mut self, stop: impl Into<GradientStop>) {
        let stop = stop.into();
        let index = self.0.partition_point(|s| s.position <= stop.position);
        self.0.insert(index, stop);
    }

    #[inline]
    pub fn as_slice(&self) -> &[GradientStop] {
        &self.0
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<T> From<&[T]> for GradientStops
where
    T: Into<GradientStop> + Clone,
{
    fn from(src: &[T]) -> Self {
        let mut stops = Self(Vec::with_capacity(src.len()));
        src.iter().cloned().for_each(|stop| stops.add(stop));
        stops
    }
}

/// The device-independent parameters of a brush.
#[derive(Clone)]
pub enum BrushKind<B: Backend> {
    Solid(Rgba<f32>),
    LinearGradient {
        start: Point<f32>,
        end: Point<f32>,
        stops: GradientStops,
    },
    RadialGradient {
        origin: Point<f32>,
        center: Point<f32>,
        radius: f32,
        stops: GradientStops,
    },
    Bitmap(Bitmap<B>),
}

pub(crate) struct BrushData<B: Backend> {
    kind: BrushKind<B>,
    realized: Slot<B::Brush>,
}

impl<B: Backend> BrushData<B> {
    fn create(&self, target: &B::RenderTarget) -> Result<B::Brush> {
        match &self.kind {
            BrushKind::Solid(color) => target.create_solid_brush(*color),
            BrushKind::LinearGradient { start, end, stops } => {
                let collection =
                    target.create_gradient_stops(stops.as_slice(), GradientMode::Clamp)?;
                target.create_linear_brush(*start, *end, &collection)
            }
            BrushKind::RadialGradient {
                origin,
                center,
                radius,
                stops,
            } => {
                let collection =
                    target.create_gradient_stops(stops.as_slice(), GradientMode::Clamp)?;
                let offset = pt(origin.x - center.x, origin.y - center.y);
                target.create_radial_brush(*center, offset, *radius, &collection)
            }
            BrushKind::Bitmap(_) => Err(Error::NotImplemented("bitmap brush")),
        }
    }
}

impl<B: Backend> DeviceResource<B> for BrushData<B> {
    fn acquire(&self, target: &B::RenderTarget) -> Result<()> {
        self.realized.ensure(target.id(), || {
            trace!("realize brush for {:?}", target.id());
            self.create(target)
        })
    }

    #[inline]
    fn release(&self) {
        self.realized.clear();
    }

    #[inline]
    fn realized_for(&self) -> Option<TargetId> {
        self.realized.owner()
    }
}

/// A shared brush descriptor holding exactly one realized native brush.
///
/// Gradient stop collections only live while the gradient brush is created.
#[derive(Clone)]
pub struct Brush<B: Backend>(Rc<BrushData<B>>);

impl<B: Backend> Brush<B> {
    pub(crate) fn new(kind: BrushKind<B>) -> Self {
        Self(Rc::new(BrushData {
            kind,
            realized: Slot::new(),
        }))
    }

    #[inline]
    pub fn kind(&self) -> &BrushKind<B> {
        &self.0.kind
    }

    #[inline]
    pub fn acquire(&self, target: &B::RenderTarget) -> Result<()> {
        self.0.acquire(target)
    }

    #[inline]
    pub fn release(&self) {
        self.0.release()
    }

    #[inline]
    pub fn realized_for(&self) -> Option<TargetId> {
        self.0.realized_for()
    }

    /// The native brush realized for `target`. There is no fallback to another
    /// variant; an unrealized brush is a usage fault.
    #[inline]
    pub fn native(&self, target: TargetId) -> Result<B::Brush> {
        self.0
            .realized
            .get(target)
            .ok_or(Error::UsageFault("brush is not realized for this render target"))
    }

    #[inline]
    pub(crate) fn holder(&self) -> Rc<dyn DeviceResource<B>> {
        self.0.clone()
    }
}

impl<B: Backend> std::fmt::Debug for Brush<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let kind = match &self.0.kind {
            BrushKind::Solid(_) => "Solid",
            BrushKind::LinearGradient { .. } => "LinearGradient",
            BrushKind::RadialGradient { .. } => "RadialGradient",
            BrushKind::Bitmap(_) => "Bitmap",
        };
        f.debug_struct("Brush")
            .field("kind", &kind)
            .field("realized_for", &self.0.realized.owner())
            .finish()
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum HatchStyle {
    BackwardDiagonal,
    CrossDiagonal,
    ForwardDiagonal,
    Cross,
    Horizontal,
    Vertical,
}

#[derive(Clone, Debug)]
pub enum BrushStyle {
    Solid,
    Transparent,
    Hatch(HatchStyle),
    Stipple(SourceBitmap),
}

/// The toolkit-side description of a brush.
#[derive(Clone, Debug)]
pub struct BrushSource {
    pub color: Rgba<f32>,
    pub style: BrushStyle,
}

impl BrushSource {
    #[inline]
    pub fn solid(color: impl Into<Rgba<f32>>) -> Self {
        Self {
            color: color.into(),
            style: BrushStyle::Solid,
        }
    }

    #[inline]
    pub fn transparent() -> Self {
        Self {
            color: Rgba {
                r: 0.0,
                g: 0.0,
                b: 0.0,
                a: 0.0,
            },
            style: BrushStyle::Transparent,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recording::{Recorder, RecordingSurface};

    fn stops() -> GradientStops {
        GradientStops::new(rgba8(0, 255, 0, 255), rgba8(255, 0, 0, 255))
    }

    #[test]
    fn stops_stay_ordered() {
        let mut s = stops();
        s.add((0.5, rgba8(0, 0, 255, 255)));
        s.add((0.25, rgba8(0, 0, 0, 255)));
        let positions = s.as_slice().iter().map(|s| s.position).collect::<Vec<_>>();
        assert_eq!(positions, vec![0.0, 0.25, 0.5, 1.0]);
        let s = GradientStops::from(&[(1.0, rgba8(0, 0, 0, 255)), (0.0, rgba8(0, 0, 0, 255))][..]);
        assert_eq!(s.as_slice()[0].position, 0.0);
    }

    #[test]
    fn gradient_acquire_is_idempotent() {
        let recorder = Recorder::new();
        let target = recorder
            .create_render_target(&RecordingSurface::window(50, 50))
            .unwrap();
        let brush = Brush::<Recorder>::new(BrushKind::LinearGradient {
            start: pt(0.0, 0.0),
            end: pt(50.0, 50.0),
            stops: stops(),
        });
        brush.acquire(&target).unwrap();
        brush.acquire(&target).unwrap();
        let stats = recorder.stats();
        assert_eq!(stats.linear_gradient_brushes, 1);
        assert_eq!(stats.gradient_stop_collections, 1);
        assert_eq!(stats.live_gradient_stop_collections, 0);
        assert!(brush.native(target.id()).is_ok());
    }

    #[test]
    fn radial_offset_is_origin_minus_center() {
        let recorder = Recorder::new();
        let target = recorder
            .create_render_target(&RecordingSurface::window(50, 50))
            .unwrap();
        let brush = Brush::<Recorder>::new(BrushKind::RadialGradient {
            origin: pt(12.0, 8.0),
            center: pt(10.0, 10.0),
            radius: 5.0,
            stops: stops(),
        });
        brush.acquire(&target).unwrap();
        match brush.native(target.id()).unwrap().paint() {
            recording::Paint::Radial { offset, .. } => assert_eq!(offset, [2.0, -2.0]),
            paint => panic!("unexpected paint {:?}", paint),
        }
    }

    #[test]
    fn bitmap_brush_is_not_implemented() {
        let recorder = Recorder::new();
        let target = recorder
            .create_render_target(&RecordingSurface::window(50, 50))
            .unwrap();
        let bitmap = Bitmap::new(SourceBitmap::from_rgb(1, 1, vec![0, 0, 0]).unwrap());
        let brush = Brush::<Recorder>::new(BrushKind::Bitmap(bitmap));
        assert_eq!(
            brush.acquire(&target).unwrap_err(),
            ErrorKind::NotImplemented
        );
        assert_eq!(
            brush.native(target.id()).unwrap_err(),
            ErrorKind::UsageFault
        );
    }

    #[test]
    fn realization_follows_target() {
        let recorder = Recorder::new();
        let surface = RecordingSurface::window(50, 50);
        let a = recorder.create_render_target(&surface).unwrap();
        let b = recorder.create_render_target(&surface).unwrap();
        let brush = Brush::<Recorder>::new(BrushKind::Solid(rgba8(0, 0, 0, 255)));
        brush.acquire(&a).unwrap();
        brush.acquire(&b).unwrap();
        assert_eq!(brush.realized_for(), Some(b.id()));
        assert!(brush.native(a.id()).is_err());
        assert_eq!(recorder.stats().solid_brushes, 2);
    }
}
