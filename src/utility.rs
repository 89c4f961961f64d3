#[cfg(windows)]
use raw_window_handle::RawWindowHandle;
#[cfg(windows)]
use windows::{
    Foundation::Numerics::{Matrix3x2, Vector2},
    Win32::{Foundation::HWND, Graphics::Direct2D::Common::*},
};

#[cfg(windows)]
#[derive(Clone, Copy, Debug)]
#[repr(transparent)]
pub(crate) struct Wrapper<T>(pub(crate) T);

pub type Point<T> = gecl::Point<T>;
pub type Size<T> = gecl::Size<T>;
pub type Rect<T> = gecl::Rect<T>;
pub type Rgba<T> = gecl::Rgba<T>;

#[inline]
pub(crate) fn pt(x: f32, y: f32) -> Point<f32> {
    Point { x, y }
}

#[inline]
pub(crate) fn rect(x: f32, y: f32, width: f32, height: f32) -> Rect<f32> {
    Rect::new(pt(x, y), Size { width, height })
}

#[inline]
pub(crate) fn pixel_size(width: u32, height: u32) -> Size<u32> {
    Size { width, height }
}

#[inline]
pub(crate) fn same_size(a: &Size<u32>, b: &Size<u32>) -> bool {
    a.width == b.width && a.height == b.height
}

#[inline]
pub(crate) fn rgba_array(color: &Rgba<f32>) -> [f32; 4] {
    [color.r, color.g, color.b, color.a]
}

/// Builds a color from 8-bit channels, as toolkit colors are stored.
#[inline]
pub fn rgba8(r: u8, g: u8, b: u8, a: u8) -> Rgba<f32> {
    Rgba {
        r: r as f32 / 255.0,
        g: g as f32 / 255.0,
        b: b as f32 / 255.0,
        a: a as f32 / 255.0,
    }
}

#[cfg(windows)]
impl From<Wrapper<Rgba<f32>>> for D2D1_COLOR_F {
    #[inline]
    fn from(src: Wrapper<Rgba<f32>>) -> Self {
        Self {
            r: src.0.r,
            g: src.0.g,
            b: src.0.b,
            a: src.0.a,
        }
    }
}

#[cfg(windows)]
impl From<Wrapper<Point<f32>>> for Vector2 {
    #[inline]
    fn from(src: Wrapper<Point<f32>>) -> Self {
        Self {
            X: src.0.x,
            Y: src.0.y,
        }
    }
}

#[cfg(windows)]
impl From<Wrapper<Rect<f32>>> for D2D_RECT_F {
    #[inline]
    fn from(src: Wrapper<Rect<f32>>) -> Self {
        Self {
            left: src.0.origin.x,
            top: src.0.origin.y,
            right: src.0.origin.x + src.0.size.width,
            bottom: src.0.origin.y + src.0.size.height,
        }
    }
}

#[cfg(windows)]
impl From<Wrapper<D2D_RECT_F>> for Rect<f32> {
    #[inline]
    fn from(src: Wrapper<D2D_RECT_F>) -> Self {
        let r = src.0;
        // an empty geometry reports an inverted rectangle
        if r.left > r.right || r.top > r.bottom {
            return rect(0.0, 0.0, 0.0, 0.0);
        }
        rect(r.left, r.top, r.right - r.left, r.bottom - r.top)
    }
}

#[cfg(windows)]
impl From<Wrapper<crate::Matrix>> for Matrix3x2 {
    #[inline]
    fn from(src: Wrapper<crate::Matrix>) -> Self {
        let m = src.0;
        Self {
            M11: m.a,
            M12: m.b,
            M21: m.c,
            M22: m.d,
            M31: m.tx,
            M32: m.ty,
        }
    }
}

#[cfg(windows)]
impl From<Wrapper<Matrix3x2>> for crate::Matrix {
    #[inline]
    fn from(src: Wrapper<Matrix3x2>) -> Self {
        let m = src.0;
        Self::new(m.M11, m.M12, m.M21, m.M22, m.M31, m.M32)
    }
}

/// Anything that names a native window. `None` when the handle does not
/// belong to a Win32 window.
#[cfg(windows)]
pub trait WindowHandle {
    fn handle(&self) -> Option<HWND>;
}

#[cfg(windows)]
impl WindowHandle for HWND {
    #[inline]
    fn handle(&self) -> Option<HWND> {
        Some(*self)
    }
}

#[cfg(windows)]
impl WindowHandle for RawWindowHandle {
    #[inline]
    fn handle(&self) -> Option<HWND> {
        match self {
            RawWindowHandle::Win32(handle) => Some(HWND(handle.hwnd as _)),
            _ => None,
        }
    }
}

#[cfg(windows)]
impl WindowHandle for *mut std::ffi::c_void {
    #[inline]
    fn handle(&self) -> Option<HWND> {
        Some(HWND(*self))
    }
}

#[cfg(windows)]
impl WindowHandle for isize {
    #[inline]
    fn handle(&self) -> Option<HWND> {
        Some(HWND(*self as _))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rgba8_test() {
        let c = rgba8(255, 0, 51, 255);
        assert_eq!(rgba_array(&c), [1.0, 0.0, 0.2, 1.0]);
    }

    #[test]
    fn rect_test() {
        let r = rect(10.0, 20.0, 30.0, 40.0);
        assert_eq!((r.origin.x, r.origin.y), (10.0, 20.0));
        assert_eq!((r.size.width, r.size.height), (30.0, 40.0));
    }
}
