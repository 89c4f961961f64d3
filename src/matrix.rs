use crate::*;

/// A 2x3 affine transform in row-vector form:
/// `x' = a*x + c*y + tx`, `y' = b*x + d*y + ty`.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Matrix {
    pub a: f32,
    pub b: f32,
    pub c: f32,
    pub d: f32,
    pub tx: f32,
    pub ty: f32,
}

impl Default for Matrix {
    #[inline]
    fn default() -> Self {
        Self::identity()
    }
}

impl Matrix {
    const TOLERANCE: f32 = 1e-5;

    #[inline]
    pub const fn new(a: f32, b: f32, c: f32, d: f32, tx: f32, ty: f32) -> Self {
        Self { a, b, c, d, tx, ty }
    }

    #[inline]
    pub const fn identity() -> Self {
        Self::new(1.0, 0.0, 0.0, 1.0, 0.0, 0.0)
    }

    #[inline]
    pub const fn translation(dx: f32, dy: f32) -> Self {
        Self::new(1.0, 0.0, 0.0, 1.0, dx, dy)
    }

    #[inline]
    pub const fn scaling(sx: f32, sy: f32) -> Self {
        Self::new(sx, 0.0, 0.0, sy, 0.0, 0.0)
    }

    /// Clockwise in a y-down coordinate space.
    #[inline]
    pub fn rotation(radians: f32) -> Self {
        let (sin, cos) = radians.sin_cos();
        Self::new(cos, sin, -sin, cos, 0.0, 0.0)
    }

    /// The transform that applies `self` first and `next` afterwards.
    pub fn then(&self, next: &Matrix) -> Matrix {
        Matrix {
            a: self.a * next.a + self.b * next.c,
            b: self.a * next.b + self.b * next.d,
            c: self.c * next.a + self.d * next.c,
            d: self.c * next.b + self.d * next.d,
            tx: self.tx * next.a + self.ty * next.c + next.tx,
            ty: self.tx * next.b + self.ty * next.d + next.ty,
        }
    }

    /// `self = other × self`: `other` is applied before the current transform.
    #[inline]
    pub fn concat(&mut self, other: &Matrix) {
        *self = other.then(self);
    }

    #[inline]
    pub fn translate(&mut self, dx: f32, dy: f32) {
        self.concat(&Self::translation(dx, dy));
    }

    #[inline]
    pub fn scale(&mut self, sx: f32, sy: f32) {
        self.concat(&Self::scaling(sx, sy));
    }

    #[inline]
    pub fn rotate(&mut self, radians: f32) {
        self.concat(&Self::rotation(radians));
    }

    #[inline]
    pub fn determinant(&self) -> f32 {
        self.a * self.d - self.b * self.c
    }

    pub fn inverted(&self) -> Result<Matrix> {
        let det = self.determinant();
        if det == 0.0 || !det.is_finite() {
            return Err(Error::NotInvertible);
        }
        let inv = Matrix {
            a: self.d / det,
            b: -self.b / det,
            c: -self.c / det,
            d: self.a / det,
            tx: (self.c * self.ty - self.d * self.tx) / det,
            ty: (self.b * self.tx - self.a * self.ty) / det,
        };
        if inv.get().iter().all(|v| v.is_finite()) {
            Ok(inv)
        } else {
            Err(Error::NotInvertible)
        }
    }

    /// Inverts in place. A singular matrix is left untouched.
    #[inline]
    pub fn invert(&mut self) -> Result<()> {
        *self = self.inverted()?;
        Ok(())
    }

    #[inline]
    pub fn get(&self) -> [f32; 6] {
        [self.a, self.b, self.c, self.d, self.tx, self.ty]
    }

    #[inline]
    pub fn is_identity(&self) -> bool {
        self.is_equal(&Self::identity())
    }

    pub fn is_equal(&self, other: &Matrix) -> bool {
        self.get()
            .iter()
            .zip(other.get().iter())
            .all(|(l, r)| (l - r).abs() <= Self::TOLERANCE * l.abs().max(r.abs()).max(1.0))
    }

    #[inline]
    pub fn transform_point(&self, x: f32, y: f32) -> (f32, f32) {
        (
            self.a * x + self.c * y + self.tx,
            self.b * x + self.d * y + self.ty,
        )
    }

    #[inline]
    pub fn transform_distance(&self, dx: f32, dy: f32) -> (f32, f32) {
        (self.a * dx + self.c * dy, self.b * dx + self.d * dy)
    }

    #[inline]
    pub(crate) fn apply(&self, p: Point<f32>) -> Point<f32> {
        let (x, y) = self.transform_point(p.x, p.y);
        pt(x, y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn coefficient() -> impl Strategy<Value = f32> {
        -10.0f32..10.0
    }

    fn matrix() -> impl Strategy<Value = Matrix> {
        (
            coefficient(),
            coefficient(),
            coefficient(),
            coefficient(),
            coefficient(),
            coefficient(),
        )
            .prop_map(|(a, b, c, d, tx, ty)| Matrix::new(a, b, c, d, tx, ty))
    }

    fn close(l: &Matrix, r: &Matrix) -> bool {
        l.get()
            .iter()
            .zip(r.get().iter())
            .all(|(l, r)| (l - r).abs() <= 1e-2 * l.abs().max(r.abs()).max(1.0))
    }

    proptest! {
        #[test]
        fn concat_is_associative(a in matrix(), b in matrix(), c in matrix()) {
            let mut left = a;
            left.concat(&b);
            left.concat(&c);
            let mut bc = b;
            bc.concat(&c);
            let mut right = a;
            right.concat(&bc);
            prop_assert!(close(&left, &right), "{:?} != {:?}", left, right);
        }

        #[test]
        fn translate_round_trip(dx in -1000.0f32..1000.0, dy in -1000.0f32..1000.0) {
            let mut m = Matrix::identity();
            m.translate(dx, dy);
            m.translate(-dx, -dy);
            prop_assert!(m.is_identity());
        }

        #[test]
        fn identity_is_neutral(m in matrix()) {
            let mut l = m;
            l.concat(&Matrix::identity());
            let mut r = Matrix::identity();
            r.concat(&m);
            prop_assert_eq!(l, m);
            prop_assert_eq!(r, m);
        }
    }

    #[test]
    fn concat_order() {
        // the concatenated matrix is applied first
        let mut m = Matrix::scaling(2.0, 2.0);
        m.concat(&Matrix::translation(10.0, 0.0));
        assert_eq!(m.transform_point(1.0, 1.0), (22.0, 2.0));
    }

    #[test]
    fn invert_test() {
        let mut m = Matrix::new(2.0, 0.0, 0.0, 4.0, 10.0, -8.0);
        let original = m;
        m.invert().unwrap();
        assert_eq!(m.transform_point(30.0, 0.0), (10.0, 2.0));
        let mut round = m;
        round.concat(&original);
        assert!(round.is_identity());
    }

    #[test]
    fn invert_singular() {
        let mut m = Matrix::new(1.0, 2.0, 2.0, 4.0, 5.0, 5.0);
        assert_eq!(m.invert().unwrap_err(), ErrorKind::NotInvertible);
        assert_eq!(m, Matrix::new(1.0, 2.0, 2.0, 4.0, 5.0, 5.0));
    }

    #[test]
    fn rotation_test() {
        let m = Matrix::rotation(std::f32::consts::FRAC_PI_2);
        let (x, y) = m.transform_point(1.0, 0.0);
        assert!(x.abs() < 1e-6 && (y - 1.0).abs() < 1e-6);
        assert_eq!(m.transform_distance(0.0, 0.0), (0.0, 0.0));
    }
}
