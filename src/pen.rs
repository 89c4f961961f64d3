use crate::resource::Slot;
use crate::*;
use log::trace;
use std::rc::Rc;

#[derive(Clone, PartialEq, Debug)]
pub enum PenStyle {
    Solid,
    Dot,
    LongDash,
    ShortDash,
    DotDash,
    UserDash(Vec<f32>),
    Transparent,
    Stipple,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum PenCap {
    Round,
    Projecting,
    Butt,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum PenJoin {
    Bevel,
    Miter,
    Round,
}

/// The toolkit-side description of a pen.
#[derive(Clone, Debug)]
pub struct PenSpec {
    pub color: Rgba<f32>,
    pub width: f32,
    pub style: PenStyle,
    pub cap: PenCap,
    pub join: PenJoin,
}

impl PenSpec {
    #[inline]
    pub fn new(color: impl Into<Rgba<f32>>, width: f32) -> Self {
        Self {
            color: color.into(),
            width,
            style: PenStyle::Solid,
            cap: PenCap::Round,
            join: PenJoin::Round,
        }
    }

    #[inline]
    pub fn style(mut self, style: PenStyle) -> Self {
        self.style = style;
        self
    }

    #[inline]
    pub fn cap(mut self, cap: PenCap) -> Self {
        self.cap = cap;
        self
    }

    #[inline]
    pub fn join(mut self, join: PenJoin) -> Self {
        self.join = join;
        self
    }

    pub fn stroke_style_properties(&self) -> StrokeStyleProperties {
        let cap = match self.cap {
            PenCap::Butt => CapStyle::Flat,
            PenCap::Projecting => CapStyle::Square,
            PenCap::Round => CapStyle::Round,
        };
        let line_join = match self.join {
            PenJoin::Bevel => LineJoin::Bevel,
            PenJoin::Miter => LineJoin::Miter,
            PenJoin::Round => LineJoin::Round,
        };
        let style = match &self.style {
            PenStyle::Dot => Some(DashStyle::Dot),
            PenStyle::LongDash => Some(DashStyle::Dash),
            PenStyle::ShortDash => Some(DashStyle::Custom(vec![2.0, 2.0])),
            PenStyle::DotDash => Some(DashStyle::DashDot),
            PenStyle::UserDash(dashes) => Some(DashStyle::Custom(dashes.clone())),
            PenStyle::Solid | PenStyle::Transparent | PenStyle::Stipple => None,
        };
        StrokeStyleProperties {
            start_cap: cap,
            end_cap: cap,
            line_join,
            dash: style.map(|style| Dash {
                cap,
                style,
                offset: 0.0,
            }),
        }
    }
}

pub(crate) struct PenData<B: Backend> {
    spec: PenSpec,
    width: f32,
    stroke_style: B::StrokeStyle,
    brush: Slot<B::Brush>,
}

impl<B: Backend> DeviceResource<B> for PenData<B> {
    fn acquire(&self, target: &B::RenderTarget) -> Result<()> {
        if self.spec.style == PenStyle::Stipple {
            return Ok(());
        }
        self.brush.ensure(target.id(), || {
            trace!("realize pen brush for {:?}", target.id());
            target.create_solid_brush(self.spec.color)
        })
    }

    #[inline]
    fn release(&self) {
        self.brush.clear();
    }

    #[inline]
    fn realized_for(&self) -> Option<TargetId> {
        self.brush.owner()
    }
}

/// A shared pen descriptor.
///
/// The stroke style is derived once when the pen is created and lives as long
/// as the pen. The solid brush is realized per render target on demand.
#[derive(Clone)]
pub struct Pen<B: Backend>(Rc<PenData<B>>);

impl<B: Backend> Pen<B> {
    pub(crate) fn new(backend: &B, spec: PenSpec) -> Result<Self> {
        let stroke_style = backend.create_stroke_style(&spec.stroke_style_properties())?;
        let width = if spec.width <= f32::EPSILON {
            1.0
        } else {
            spec.width
        };
        Ok(Self(Rc::new(PenData {
            spec,
            width,
            stroke_style,
            brush: Slot::new(),
        })))
    }

    #[inline]
    pub fn spec(&self) -> &PenSpec {
        &self.0.spec
    }

    /// The stroke width, with zero and negative widths clamped to 1.
    #[inline]
    pub fn width(&self) -> f32 {
        self.0.width
    }

    #[inline]
    pub fn stroke_style(&self) -> &B::StrokeStyle {
        &self.0.stroke_style
    }

    /// Whether strokes with this pen put anything on the target.
    #[inline]
    pub fn is_visible(&self) -> bool {
        !matches!(self.0.spec.style, PenStyle::Transparent | PenStyle::Stipple)
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

    /// The brush realized for `target`.
    #[inline]
    pub fn brush(&self, target: TargetId) -> Result<B::Brush> {
        self.0
            .brush
            .get(target)
            .ok_or(Error::UsageFault("pen is not realized for this render target"))
    }

    #[inline]
    pub(crate) fn holder(&self) -> Rc<dyn DeviceResource<B>> {
        self.0.clone()
    }
}

impl<B: Backend> std::fmt::Debug for Pen<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_struct("Pen")
            .field("spec", &self.0.spec)
            .field("realized_for", &self.0.brush.owner())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recording::{Recorder, RecordingSurface};

    #[test]
    fn width_is_clamped() {
        let recorder = Recorder::new();
        let pen = Pen::new(&recorder, PenSpec::new(rgba8(255, 0, 0, 255), 0.0)).unwrap();
        assert_eq!(pen.width(), 1.0);
        let pen = Pen::new(&recorder, PenSpec::new(rgba8(255, 0, 0, 255), -3.0)).unwrap();
        assert_eq!(pen.width(), 1.0);
        let pen = Pen::new(&recorder, PenSpec::new(rgba8(255, 0, 0, 255), 2.5)).unwrap();
        assert_eq!(pen.width(), 2.5);
    }

    #[test]
    fn stroke_style_mapping() {
        let spec = PenSpec::new(rgba8(0, 0, 0, 255), 1.0)
            .style(PenStyle::ShortDash)
            .cap(PenCap::Butt)
            .join(PenJoin::Bevel);
        let props = spec.stroke_style_properties();
        assert_eq!(props.start_cap, CapStyle::Flat);
        assert_eq!(props.line_join, LineJoin::Bevel);
        assert_eq!(props.custom_dashes(), Some(&[2.0, 2.0][..]));
        let props = PenSpec::new(rgba8(0, 0, 0, 255), 1.0).stroke_style_properties();
        assert_eq!(props.dash, None);
        assert_eq!(props.end_cap, CapStyle::Round);
    }

    #[test]
    fn stroke_style_survives_release() {
        let recorder = Recorder::new();
        let target = recorder
            .create_render_target(&RecordingSurface::window(100, 100))
            .unwrap();
        let pen = Pen::new(&recorder, PenSpec::new(rgba8(255, 0, 0, 255), 1.0)).unwrap();
        let id = pen.stroke_style().id();
        pen.acquire(&target).unwrap();
        assert!(pen.brush(target.id()).is_ok());
        pen.release();
        assert_eq!(pen.brush(target.id()).unwrap_err(), ErrorKind::UsageFault);
        pen.acquire(&target).unwrap();
        assert!(pen.brush(target.id()).is_ok());
        assert_eq!(pen.stroke_style().id(), id);
        let stats = recorder.stats();
        assert_eq!(stats.stroke_styles, 1);
        assert_eq!(stats.solid_brushes, 2);
    }

    #[test]
    fn stipple_is_not_realized() {
        let recorder = Recorder::new();
        let target = recorder
            .create_render_target(&RecordingSurface::window(10, 10))
            .unwrap();
        let pen = Pen::new(
            &recorder,
            PenSpec::new(rgba8(0, 0, 0, 255), 1.0).style(PenStyle::Stipple),
        )
        .unwrap();
        pen.acquire(&target).unwrap();
        assert_eq!(pen.realized_for(), None);
        assert!(!pen.is_visible());
        assert_eq!(recorder.stats().solid_brushes, 0);
    }
}
