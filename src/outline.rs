use crate::*;
use std::f32::consts::PI;

const CUBIC_STEPS: usize = 16;
const ARC_STEP: f32 = PI / 32.0;
const ELLIPSE_STEPS: usize = 64;

#[derive(Clone, Copy, Debug)]
pub(crate) enum Segment {
    Line(Point<f32>),
    Bezier(Point<f32>, Point<f32>, Point<f32>),
    Arc(ArcSegment),
}

/// One figure of a geometry held in plain memory.
#[derive(Clone, Debug)]
pub(crate) struct Figure {
    pub start: Point<f32>,
    pub segments: Vec<Segment>,
    pub closed: bool,
}

impl Figure {
    #[inline]
    pub(crate) fn new(start: Point<f32>) -> Self {
        Self {
            start,
            segments: Vec::new(),
            closed: false,
        }
    }

    pub(crate) fn flatten(&self) -> Vec<Point<f32>> {
        let mut points = vec![self.start];
        let mut last = self.start;
        for segment in &self.segments {
            match *segment {
                Segment::Line(to) => points.push(to),
                Segment::Bezier(c1, c2, to) => flatten_cubic(last, c1, c2, to, &mut points),
                Segment::Arc(ref arc) => flatten_arc(arc, &mut points),
            }
            if let Some(p) = points.last() {
                last = *p;
            }
        }
        points
    }

    /// Bakes `m` into the figure. Curves are flattened into lines.
    pub(crate) fn transformed(&self, m: &Matrix) -> Self {
        let mut points = self.flatten().into_iter().map(|p| m.apply(p));
        let start = points.next().unwrap_or_else(|| m.apply(self.start));
        Self {
            start,
            segments: points.map(Segment::Line).collect(),
            closed: self.closed,
        }
    }
}

pub(crate) fn flatten_cubic(
    p0: Point<f32>,
    c1: Point<f32>,
    c2: Point<f32>,
    p3: Point<f32>,
    out: &mut Vec<Point<f32>>,
) {
    for i in 1..=CUBIC_STEPS {
        let t = i as f32 / CUBIC_STEPS as f32;
        let u = 1.0 - t;
        let w0 = u * u * u;
        let w1 = 3.0 * u * u * t;
        let w2 = 3.0 * u * t * t;
        let w3 = t * t * t;
        out.push(pt(
            w0 * p0.x + w1 * c1.x + w2 * c2.x + w3 * p3.x,
            w0 * p0.y + w1 * c1.y + w2 * c2.y + w3 * p3.y,
        ));
    }
}

/// Appends the arc's points after its start point.
pub(crate) fn flatten_arc(arc: &ArcSegment, out: &mut Vec<Point<f32>>) {
    let steps = ((arc.sweep_angle.abs() / ARC_STEP).ceil() as usize).max(1);
    for i in 1..=steps {
        let angle = arc.start_angle + arc.sweep_angle * i as f32 / steps as f32;
        out.push(arc.point_at(angle));
    }
}

pub(crate) fn ellipse_polygon(center: Point<f32>, rx: f32, ry: f32) -> Vec<Point<f32>> {
    (0..ELLIPSE_STEPS)
        .map(|i| {
            let angle = 2.0 * PI * i as f32 / ELLIPSE_STEPS as f32;
            pt(center.x + rx * angle.cos(), center.y + ry * angle.sin())
        })
        .collect()
}

#[inline]
pub(crate) fn ellipse_contains(center: Point<f32>, rx: f32, ry: f32, p: Point<f32>) -> bool {
    if rx <= 0.0 || ry <= 0.0 {
        return false;
    }
    let dx = (p.x - center.x) / rx;
    let dy = (p.y - center.y) / ry;
    dx * dx + dy * dy <= 1.0
}

/// Winding number of the closed polygon around `p`.
pub(crate) fn winding(polygon: &[Point<f32>], p: Point<f32>) -> i32 {
    if polygon.len() < 3 {
        return 0;
    }
    let mut wn = 0;
    for (i, a) in polygon.iter().enumerate() {
        let b = &polygon[(i + 1) % polygon.len()];
        let side = (b.x - a.x) * (p.y - a.y) - (p.x - a.x) * (b.y - a.y);
        if a.y <= p.y {
            if b.y > p.y && side > 0.0 {
                wn += 1;
            }
        } else if b.y <= p.y && side < 0.0 {
            wn -= 1;
        }
    }
    wn
}

/// Fill containment over every figure; open figures are filled as if closed.
pub(crate) fn figures_contain(figures: &[Figure], rule: FillRule, p: Point<f32>) -> bool {
    let wn: i32 = figures.iter().map(|f| winding(&f.flatten(), p)).sum();
    match rule {
        FillRule::EvenOdd => wn % 2 != 0,
        FillRule::Winding => wn != 0,
    }
}

#[derive(Clone, Copy, Debug)]
pub(crate) struct Bounds {
    min: Point<f32>,
    max: Point<f32>,
    empty: bool,
}

impl Bounds {
    #[inline]
    pub(crate) fn new() -> Self {
        Self {
            min: pt(0.0, 0.0),
            max: pt(0.0, 0.0),
            empty: true,
        }
    }

    pub(crate) fn add(&mut self, p: Point<f32>) {
        if self.empty {
            self.min = p;
            self.max = p;
            self.empty = false;
        } else {
            self.min = pt(self.min.x.min(p.x), self.min.y.min(p.y));
            self.max = pt(self.max.x.max(p.x), self.max.y.max(p.y));
        }
    }

    #[inline]
    pub(crate) fn extend(&mut self, points: impl IntoIterator<Item = Point<f32>>) {
        points.into_iter().for_each(|p| self.add(p));
    }

    #[inline]
    pub(crate) fn to_rect(self) -> Rect<f32> {
        rect(
            self.min.x,
            self.min.y,
            self.max.x - self.min.x,
            self.max.y - self.min.y,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(x: f32, y: f32, side: f32) -> Figure {
        let mut f = Figure::new(pt(x, y));
        f.segments.push(Segment::Line(pt(x + side, y)));
        f.segments.push(Segment::Line(pt(x + side, y + side)));
        f.segments.push(Segment::Line(pt(x, y + side)));
        f.closed = true;
        f
    }

    #[test]
    fn fill_rules() {
        let figures = [square(0.0, 0.0, 10.0), square(2.0, 2.0, 6.0)];
        assert!(figures_contain(&figures, FillRule::Winding, pt(5.0, 5.0)));
        assert!(!figures_contain(&figures, FillRule::EvenOdd, pt(5.0, 5.0)));
        assert!(figures_contain(&figures, FillRule::EvenOdd, pt(1.0, 1.0)));
        assert!(!figures_contain(&figures, FillRule::Winding, pt(11.0, 1.0)));
    }

    #[test]
    fn cubic_ends_on_target() {
        let mut out = vec![];
        flatten_cubic(pt(0.0, 0.0), pt(0.0, 10.0), pt(10.0, 10.0), pt(10.0, 0.0), &mut out);
        assert_eq!(out.len(), CUBIC_STEPS);
        let last = out[out.len() - 1];
        assert!((last.x - 10.0).abs() < 1e-4 && last.y.abs() < 1e-4);
    }

    #[test]
    fn bounds_test() {
        let mut b = Bounds::new();
        let r = b.to_rect();
        assert_eq!((r.size.width, r.size.height), (0.0, 0.0));
        b.extend([pt(3.0, -1.0), pt(-2.0, 4.0)]);
        let r = b.to_rect();
        assert_eq!((r.origin.x, r.origin.y), (-2.0, -1.0));
        assert_eq!((r.size.width, r.size.height), (5.0, 5.0));
    }

    #[test]
    fn ellipse_test() {
        assert!(ellipse_contains(pt(0.0, 0.0), 4.0, 2.0, pt(3.0, 0.5)));
        assert!(!ellipse_contains(pt(0.0, 0.0), 4.0, 2.0, pt(3.0, 1.9)));
        assert!(!ellipse_contains(pt(0.0, 0.0), 0.0, 2.0, pt(0.0, 0.0)));
    }
}
