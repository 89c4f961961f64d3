use crate::*;
use std::f32::consts::{FRAC_PI_2, PI, TAU};

const FULL_CIRCLE_EPSILON: f32 = 1e-4;

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum FillRule {
    #[default]
    EvenOdd,
    Winding,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum FigureEnd {
    Open,
    Closed,
}

/// A circular arc. Angles are in radians; a positive sweep runs clockwise on a
/// y-down surface.
#[derive(Clone, Copy, Debug)]
pub struct ArcSegment {
    pub center: Point<f32>,
    pub radius: f32,
    pub start_angle: f32,
    pub sweep_angle: f32,
}

impl ArcSegment {
    #[inline]
    pub fn point_at(&self, angle: f32) -> Point<f32> {
        pt(
            self.center.x + self.radius * angle.cos(),
            self.center.y + self.radius * angle.sin(),
        )
    }

    #[inline]
    pub fn start_point(&self) -> Point<f32> {
        self.point_at(self.start_angle)
    }

    #[inline]
    pub fn end_point(&self) -> Point<f32> {
        self.point_at(self.start_angle + self.sweep_angle)
    }

    #[inline]
    pub fn is_large(&self) -> bool {
        self.sweep_angle.abs() > PI
    }

    #[inline]
    pub fn is_clockwise(&self) -> bool {
        self.sweep_angle >= 0.0
    }
}

/// Signed sweep of an arc from `start` to `end`, or `None` for a full circle.
///
/// Spans beyond a full turn are reduced by whole turns; only a positive span
/// that lands on a whole turn becomes a circle.
fn arc_sweep(start: f32, end: f32, clockwise: bool) -> Option<f32> {
    let directed = if clockwise { end - start } else { start - end };
    let sweep = directed.rem_euclid(TAU);
    let whole_turn = sweep < FULL_CIRCLE_EPSILON || sweep > TAU - FULL_CIRCLE_EPSILON;
    if whole_turn && directed > FULL_CIRCLE_EPSILON {
        return None;
    }
    let sweep = if whole_turn { 0.0 } else { sweep };
    Some(if clockwise { sweep } else { -sweep })
}

/// Accumulates a device-independent path.
///
/// Edits go into an open geometry sink. Sealing (`flush`) closes the sink into
/// an immutable geometry; the next edit opens a new sink and streams the sealed
/// geometry into it before continuing.
pub struct Path<B: Backend> {
    backend: B,
    sealed: Option<B::Geometry>,
    sink: Option<B::GeometrySink>,
    fill_rule: FillRule,
    figure_open: bool,
    start: Point<f32>,
    current: Option<Point<f32>>,
    transform: Matrix,
    rendered: Option<(FillRule, B::Geometry)>,
}

impl<B: Backend> Path<B> {
    pub(crate) fn new(backend: &B) -> Self {
        Self {
            backend: backend.clone(),
            sealed: None,
            sink: None,
            fill_rule: FillRule::default(),
            figure_open: false,
            start: pt(0.0, 0.0),
            current: None,
            transform: Matrix::identity(),
            rendered: None,
        }
    }

    fn open(&mut self) -> Result<&mut B::GeometrySink> {
        self.rendered = None;
        let sink = match self.sink.take() {
            Some(sink) => sink,
            None => {
                let mut sink = self.backend.open_path(self.fill_rule)?;
                if let Some(sealed) = &self.sealed {
                    sealed.stream(&mut sink)?;
                }
                self.sealed = None;
                sink
            }
        };
        Ok(self.sink.insert(sink))
    }

    /// Opens a figure at the current point, or at `fallback` when there is none.
    fn figure(&mut self, fallback: Point<f32>) -> Result<&mut B::GeometrySink> {
        self.open()?;
        let sink = self
            .sink
            .as_mut()
            .ok_or(Error::UsageFault("geometry sink unavailable"))?;
        if !self.figure_open {
            let start = self.current.unwrap_or(fallback);
            sink.begin_figure(start);
            self.figure_open = true;
            self.start = start;
            self.current = Some(start);
        }
        Ok(sink)
    }

    pub fn move_to(&mut self, x: f32, y: f32) -> Result<()> {
        let p = pt(x, y);
        let figure_open = self.figure_open;
        let sink = self.open()?;
        if figure_open {
            sink.end_figure(FigureEnd::Open);
        }
        sink.begin_figure(p);
        self.figure_open = true;
        self.start = p;
        self.current = Some(p);
        Ok(())
    }

    pub fn line_to(&mut self, x: f32, y: f32) -> Result<()> {
        let p = pt(x, y);
        self.figure(p)?.add_line(p);
        self.current = Some(p);
        Ok(())
    }

    pub fn curve_to(&mut self, cx1: f32, cy1: f32, cx2: f32, cy2: f32, x: f32, y: f32) -> Result<()> {
        let (c1, c2, to) = (pt(cx1, cy1), pt(cx2, cy2), pt(x, y));
        self.figure(c1)?.add_bezier(c1, c2, to);
        self.current = Some(to);
        Ok(())
    }

    /// Quadratic curve, elevated to the equivalent cubic.
    pub fn quad_curve_to(&mut self, cx: f32, cy: f32, x: f32, y: f32) -> Result<()> {
        let q0 = self.current.unwrap_or(pt(cx, cy));
        let c1 = (q0.x + 2.0 / 3.0 * (cx - q0.x), q0.y + 2.0 / 3.0 * (cy - q0.y));
        let c2 = (x + 2.0 / 3.0 * (cx - x), y + 2.0 / 3.0 * (cy - y));
        if self.current.is_none() {
            self.move_to(q0.x, q0.y)?;
        }
        self.curve_to(c1.0, c1.1, c2.0, c2.1, x, y)
    }

    /// Adds a circular arc, first connecting the current point to the arc's
    /// start. Sweeps past a full turn are reduced by whole turns, and one that
    /// lands exactly on a full turn is added as a circle.
    pub fn add_arc(
        &mut self,
        x: f32,
        y: f32,
        radius: f32,
        start_angle: f32,
        end_angle: f32,
        clockwise: bool,
    ) -> Result<()> {
        let Some(sweep_angle) = arc_sweep(start_angle, end_angle, clockwise) else {
            return self.add_circle(x, y, radius);
        };
        let arc = ArcSegment {
            center: pt(x, y),
            radius,
            start_angle,
            sweep_angle,
        };
        let from = arc.start_point();
        let connect = self
            .current
            .map_or(false, |c| c.x != from.x || c.y != from.y);
        let sink = self.figure(from)?;
        if connect {
            sink.add_line(from);
        }
        if sweep_angle != 0.0 {
            sink.add_arc(&arc);
        }
        self.current = Some(arc.end_point());
        Ok(())
    }

    pub fn close_subpath(&mut self) -> Result<()> {
        if !self.figure_open {
            return Ok(());
        }
        self.open()?.end_figure(FigureEnd::Closed);
        self.figure_open = false;
        self.current = Some(self.start);
        Ok(())
    }

    /// Unites the ellipse inscribed in the given box with everything added so
    /// far.
    pub fn add_ellipse(&mut self, x: f32, y: f32, width: f32, height: f32) -> Result<()> {
        let (rx, ry) = (width / 2.0, height / 2.0);
        let center = pt(x + rx, y + ry);
        self.flush()?;
        let ellipse = self.backend.create_ellipse(center, rx, ry)?;
        let mut sink = self.backend.open_path(self.fill_rule)?;
        match &self.sealed {
            Some(sealed) => self.backend.combine_union(sealed, &ellipse, &mut sink)?,
            None => ellipse.stream(&mut sink)?,
        }
        self.sealed = None;
        self.sink = Some(sink);
        self.rendered = None;
        self.current = Some(pt(center.x + rx, center.y));
        Ok(())
    }

    #[inline]
    pub fn add_circle(&mut self, x: f32, y: f32, radius: f32) -> Result<()> {
        self.add_ellipse(x - radius, y - radius, radius * 2.0, radius * 2.0)
    }

    pub fn add_rectangle(&mut self, x: f32, y: f32, width: f32, height: f32) -> Result<()> {
        self.move_to(x, y)?;
        self.line_to(x + width, y)?;
        self.line_to(x + width, y + height)?;
        self.line_to(x, y + height)?;
        self.close_subpath()
    }

    pub fn add_rounded_rectangle(
        &mut self,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        radius: f32,
    ) -> Result<()> {
        if radius <= 0.0 {
            return self.add_rectangle(x, y, width, height);
        }
        let (right, bottom) = (x + width, y + height);
        self.move_to(x + radius, y)?;
        self.add_arc(right - radius, y + radius, radius, -FRAC_PI_2, 0.0, true)?;
        self.add_arc(right - radius, bottom - radius, radius, 0.0, FRAC_PI_2, true)?;
        self.add_arc(x + radius, bottom - radius, radius, FRAC_PI_2, PI, true)?;
        self.add_arc(x + radius, y + radius, radius, PI, PI + FRAC_PI_2, true)?;
        self.close_subpath()
    }

    /// Streams the content of `other` after the figures of this path.
    pub fn add_path(&mut self, other: &mut Path<B>) -> Result<()> {
        let geometry = other.render_geometry(other.fill_rule)?;
        let figure_open = self.figure_open;
        let sink = self.open()?;
        if figure_open {
            sink.end_figure(FigureEnd::Open);
        }
        geometry.stream(sink)?;
        self.figure_open = false;
        if let Some(p) = other.current_point() {
            self.current = Some(other.transform.apply(p));
        }
        Ok(())
    }

    /// Ends an open figure and seals the sink into an immutable geometry.
    pub fn flush(&mut self) -> Result<()> {
        if let Some(mut sink) = self.sink.take() {
            if self.figure_open {
                sink.end_figure(FigureEnd::Open);
                self.figure_open = false;
            }
            self.sealed = Some(sink.close()?);
        }
        Ok(())
    }

    /// Records a transform applied when the render-ready geometry is produced.
    /// The stored figures keep their coordinates.
    #[inline]
    pub fn transform(&mut self, m: &Matrix) {
        self.transform.concat(m);
        self.rendered = None;
    }

    #[inline]
    pub fn pending_transform(&self) -> Matrix {
        self.transform
    }

    #[inline]
    pub fn fill_rule(&self) -> FillRule {
        self.fill_rule
    }

    #[inline]
    pub fn current_point(&self) -> Option<Point<f32>> {
        self.current
    }

    /// The untransformed, sealed geometry.
    pub fn geometry(&mut self) -> Result<B::Geometry> {
        self.flush()?;
        if let Some(sealed) = &self.sealed {
            return Ok(sealed.clone());
        }
        let empty = self.backend.open_path(self.fill_rule)?.close()?;
        self.sealed = Some(empty.clone());
        Ok(empty)
    }

    /// The geometry handed to a render target: filled with `rule` and with the
    /// pending transform applied.
    pub fn render_geometry(&mut self, rule: FillRule) -> Result<B::Geometry> {
        if let Some((cached, geometry)) = &self.rendered {
            if *cached == rule {
                return Ok(geometry.clone());
            }
        }
        let mut geometry = self.geometry()?;
        if rule != self.fill_rule {
            let mut sink = self.backend.open_path(rule)?;
            geometry.stream(&mut sink)?;
            geometry = sink.close()?;
        }
        if !self.transform.is_identity() {
            geometry = self.backend.transform_geometry(&geometry, &self.transform)?;
        }
        self.rendered = Some((rule, geometry.clone()));
        Ok(geometry)
    }

    /// Axis-aligned bounds with the pending transform applied. An empty path
    /// reports a zero-sized rectangle.
    pub fn bounds(&mut self) -> Result<Rect<f32>> {
        let transform = self.transform;
        self.geometry()?.bounds(Some(&transform))
    }

    pub fn contains(&mut self, x: f32, y: f32, rule: FillRule) -> Result<bool> {
        self.render_geometry(rule)?.contains(pt(x, y), None)
    }

    pub fn figure_count(&mut self) -> Result<usize> {
        self.geometry()?.figure_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recording::Recorder;

    fn path() -> Path<Recorder> {
        Path::new(&Recorder::new())
    }

    #[test]
    fn arc_sweep_test() {
        assert_eq!(arc_sweep(0.0, TAU, true), None);
        assert_eq!(arc_sweep(TAU, 0.0, false), None);
        assert_eq!(arc_sweep(0.0, PI, true), Some(PI));
        assert_eq!(arc_sweep(0.0, PI, false), Some(-PI));
        let sweep = arc_sweep(0.0, -FRAC_PI_2, true).unwrap();
        assert!((sweep - 3.0 * FRAC_PI_2).abs() < 1e-5);
        assert_eq!(arc_sweep(1.0, 1.0, true), Some(0.0));
    }

    #[test]
    fn arc_sweep_reduces_extra_turns() {
        let sweep = arc_sweep(0.0, 3.0 * PI, true).unwrap();
        assert!((sweep - PI).abs() < 1e-4);
        let sweep = arc_sweep(3.0 * PI, 0.0, false).unwrap();
        assert!((sweep + PI).abs() < 1e-4);
        assert_eq!(arc_sweep(0.0, 2.0 * TAU, true), None);
        assert_eq!(arc_sweep(0.0, -TAU, true), Some(0.0));
        assert_eq!(arc_sweep(0.0, 1e-6, true), Some(0.0));
        assert_eq!(arc_sweep(0.0, -1e-6, true), Some(0.0));
    }

    #[test]
    fn arc_segment_test() {
        let arc = ArcSegment {
            center: pt(0.0, 0.0),
            radius: 10.0,
            start_angle: 0.0,
            sweep_angle: 3.0 * FRAC_PI_2,
        };
        assert!(arc.is_large());
        assert!(arc.is_clockwise());
        let end = arc.end_point();
        assert!(end.x.abs() < 1e-4 && (end.y + 10.0).abs() < 1e-4);
    }

    #[test]
    fn move_to_counts_figures() {
        let mut p = path();
        p.move_to(0.0, 0.0).unwrap();
        p.line_to(10.0, 0.0).unwrap();
        p.move_to(0.0, 10.0).unwrap();
        p.line_to(10.0, 10.0).unwrap();
        p.close_subpath().unwrap();
        assert_eq!(p.figure_count().unwrap(), 2);
    }

    #[test]
    fn edit_after_flush_keeps_content() {
        let mut p = path();
        p.add_rectangle(0.0, 0.0, 10.0, 10.0).unwrap();
        p.flush().unwrap();
        p.add_rectangle(20.0, 0.0, 10.0, 10.0).unwrap();
        assert_eq!(p.figure_count().unwrap(), 2);
        let b = p.bounds().unwrap();
        assert_eq!((b.origin.x, b.size.width), (0.0, 30.0));
    }

    #[test]
    fn line_to_without_current_point_starts_figure() {
        let mut p = path();
        p.line_to(5.0, 5.0).unwrap();
        let c = p.current_point().unwrap();
        assert_eq!((c.x, c.y), (5.0, 5.0));
        assert_eq!(p.figure_count().unwrap(), 1);
    }

    #[test]
    fn pending_transform_applies_at_render() {
        let mut p = path();
        p.add_rectangle(0.0, 0.0, 10.0, 10.0).unwrap();
        p.transform(&Matrix::translation(100.0, 0.0));
        let b = p.bounds().unwrap();
        assert_eq!((b.origin.x, b.origin.y), (100.0, 0.0));
        assert!(p.contains(105.0, 5.0, FillRule::EvenOdd).unwrap());
        assert!(!p.contains(5.0, 5.0, FillRule::EvenOdd).unwrap());
        let g = p.geometry().unwrap().bounds(None).unwrap();
        assert_eq!(g.origin.x, 0.0);
    }

    #[test]
    fn ellipse_unites() {
        let mut p = path();
        p.add_rectangle(0.0, 0.0, 10.0, 10.0).unwrap();
        p.add_circle(30.0, 5.0, 5.0).unwrap();
        assert!(p.contains(5.0, 5.0, FillRule::Winding).unwrap());
        assert!(p.contains(30.0, 5.0, FillRule::Winding).unwrap());
        assert!(!p.contains(20.0, 5.0, FillRule::Winding).unwrap());
        let b = p.bounds().unwrap();
        assert_eq!((b.origin.x, b.size.width), (0.0, 35.0));
    }

    #[test]
    fn empty_path_is_degenerate() {
        let mut p = path();
        let b = p.bounds().unwrap();
        assert_eq!((b.size.width, b.size.height), (0.0, 0.0));
        assert!(!p.contains(0.0, 0.0, FillRule::EvenOdd).unwrap());
        assert_eq!(p.figure_count().unwrap(), 0);
    }

    #[test]
    fn fill_rule_at_render() {
        let mut p = path();
        p.add_rectangle(0.0, 0.0, 10.0, 10.0).unwrap();
        p.add_rectangle(2.0, 2.0, 6.0, 6.0).unwrap();
        assert!(!p.contains(5.0, 5.0, FillRule::EvenOdd).unwrap());
        assert!(p.contains(5.0, 5.0, FillRule::Winding).unwrap());
    }

    #[test]
    fn add_path_streams_other() {
        let recorder = Recorder::new();
        let mut a = Path::new(&recorder);
        let mut b = Path::new(&recorder);
        a.add_rectangle(0.0, 0.0, 5.0, 5.0).unwrap();
        b.move_to(10.0, 10.0).unwrap();
        b.line_to(20.0, 20.0).unwrap();
        a.add_path(&mut b).unwrap();
        assert_eq!(a.figure_count().unwrap(), 2);
        let c = a.current_point().unwrap();
        assert_eq!((c.x, c.y), (20.0, 20.0));
    }

    #[test]
    fn rounded_rectangle_bounds() {
        let mut p = path();
        p.add_rounded_rectangle(0.0, 0.0, 40.0, 20.0, 5.0).unwrap();
        let b = p.bounds().unwrap();
        assert!((b.size.width - 40.0).abs() < 1e-3);
        assert!((b.size.height - 20.0).abs() < 1e-3);
        assert!(!p.contains(0.5, 0.5, FillRule::Winding).unwrap());
        assert!(p.contains(20.0, 10.0, FillRule::Winding).unwrap());
    }
}
