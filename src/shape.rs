use crate::*;

/// The primitive shapes a render target draws without a path geometry.
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum Shape {
    Line {
        x0: f32,
        y0: f32,
        x1: f32,
        y1: f32,
    },
    Rectangle {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
    },
    RoundedRectangle {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        radius: f32,
    },
    Ellipse {
        cx: f32,
        cy: f32,
        rx: f32,
        ry: f32,
    },
}

impl Shape {
    #[inline]
    pub fn line(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self::Line { x0, y0, x1, y1 }
    }

    #[inline]
    pub fn rectangle(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self::Rectangle {
            x,
            y,
            width,
            height,
        }
    }

    #[inline]
    pub fn rounded_rectangle(x: f32, y: f32, width: f32, height: f32, radius: f32) -> Self {
        Self::RoundedRectangle {
            x,
            y,
            width,
            height,
            radius,
        }
    }

    /// The ellipse inscribed in the given bounding box.
    #[inline]
    pub fn ellipse(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self::Ellipse {
            cx: x + width / 2.0,
            cy: y + height / 2.0,
            rx: width / 2.0,
            ry: height / 2.0,
        }
    }

    pub fn bounds(&self) -> Rect<f32> {
        match *self {
            Self::Line { x0, y0, x1, y1 } => rect(
                x0.min(x1),
                y0.min(y1),
                (x1 - x0).abs(),
                (y1 - y0).abs(),
            ),
            Self::Rectangle {
                x,
                y,
                width,
                height,
            }
            | Self::RoundedRectangle {
                x,
                y,
                width,
                height,
                ..
            } => rect(x, y, width, height),
            Self::Ellipse { cx, cy, rx, ry } => rect(cx - rx, cy - ry, rx * 2.0, ry * 2.0),
        }
    }
}
