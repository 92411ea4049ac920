use std::fmt;
use std::ops::{Add, Div, Index, Mul, Sub};

#[derive(Clone, Copy, Debug, Default, PartialEq)]
/// 3D vector in Real Space
pub struct V3D {
    inner: [f64; 3],
}

impl V3D {
    pub const fn from([x, y, z]: [f64; 3]) -> Self {
        Self { inner: [x, y, z] }
    }

    pub const fn zero() -> Self {
        Self { inner: [0.0; 3] }
    }

    pub fn x(&self) -> f64 {
        self.inner[0]
    }

    pub fn y(&self) -> f64 {
        self.inner[1]
    }

    pub fn z(&self) -> f64 {
        self.inner[2]
    }

    pub fn dot_with(&self, other: &Self) -> f64 {
        self[0] * other[0] + self[1] * other[1] + self[2] * other[2]
    }

    /// L2 norm
    pub fn norm(&self) -> f64 {
        self.dot_with(self).sqrt()
    }

    pub fn cross(&self, other: &Self) -> Self {
        Self::from([
            self[1] * other[2] - self[2] * other[1],
            self[2] * other[0] - self[0] * other[2],
            self[0] * other[1] - self[1] * other[0],
        ])
    }

    /// Unit vector in the direction of `self`
    ///
    /// Returns `None` if the length is not larger than `min_norm` (or is not finite)
    pub fn normalize(&self, min_norm: f64) -> Option<Self> {
        let n = self.norm();
        if n.is_finite() && n > min_norm {
            Some(*self / n)
        } else {
            None
        }
    }

    /// Convex combination `(1 - t) * self + t * other`
    pub fn lerp(&self, other: &Self, t: f64) -> Self {
        *self * (1.0 - t) + *other * t
    }
}

impl From<[f64; 3]> for V3D {
    fn from(coords: [f64; 3]) -> Self {
        Self { inner: coords }
    }
}

impl Index<usize> for V3D {
    type Output = f64;
    fn index(&self, index: usize) -> &Self::Output {
        &self.inner[index]
    }
}

impl Add for V3D {
    type Output = Self;
    fn add(self, other: Self) -> Self {
        Self {
            inner: [self[0] + other[0], self[1] + other[1], self[2] + other[2]],
        }
    }
}

impl Sub for V3D {
    type Output = Self;
    fn sub(self, other: Self) -> Self {
        Self {
            inner: [self[0] - other[0], self[1] - other[1], self[2] - other[2]],
        }
    }
}

impl Mul<f64> for V3D {
    type Output = Self;
    fn mul(self, coefficient: f64) -> Self {
        Self {
            inner: [
                self[0] * coefficient,
                self[1] * coefficient,
                self[2] * coefficient,
            ],
        }
    }
}

impl Div<f64> for V3D {
    type Output = Self;
    fn div(self, divisor: f64) -> Self {
        Self {
            inner: [self[0] / divisor, self[1] / divisor, self[2] / divisor],
        }
    }
}

impl fmt::Display for V3D {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "({:.10}, {:.10}, {:.10})", self[0], self[1], self[2])
    }
}

/*
    | [x1, y1, z1] |  <- u
    | [x2, y2, z2] |  <- v
    | [x3, y3, z3] |  <- w
*/

#[derive(Clone, Copy, Debug, PartialEq)]
/// 3 by 3 Matrix stored by rows. Used to represent rotations between Real Space frames
pub struct M3D {
    pub u: V3D,
    pub v: V3D,
    pub w: V3D,
}

impl M3D {
    pub const fn from(r0: [f64; 3], r1: [f64; 3], r2: [f64; 3]) -> Self {
        Self {
            u: V3D::from(r0),
            v: V3D::from(r1),
            w: V3D::from(r2),
        }
    }

    pub const fn from_rows(u: V3D, v: V3D, w: V3D) -> Self {
        Self { u, v, w }
    }

    pub const fn identity() -> Self {
        Self::from([1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0])
    }

    pub fn row(&self, idx: usize) -> V3D {
        match idx {
            0 => self.u,
            1 => self.v,
            2 => self.w,
            _ => panic!("M3D only has 3 rows; cannot access row {}!", idx),
        }
    }

    #[inline]
    pub fn det(&self) -> f64 {
        self.u.dot_with(&self.v.cross(&self.w))
    }

    pub fn transpose(&self) -> Self {
        Self {
            u: V3D::from([self.u[0], self.v[0], self.w[0]]),
            v: V3D::from([self.u[1], self.v[1], self.w[1]]),
            w: V3D::from([self.u[2], self.v[2], self.w[2]]),
        }
    }

    /// Largest absolute entry of `self - other`
    pub fn max_abs_diff(&self, other: &Self) -> f64 {
        (0..3)
            .flat_map(|r| (0..3).map(move |c| (r, c)))
            .map(|(r, c)| (self.row(r)[c] - other.row(r)[c]).abs())
            .fold(0.0, f64::max)
    }
}

impl Mul<V3D> for M3D {
    type Output = V3D;
    fn mul(self, v: V3D) -> V3D {
        V3D::from([self.u.dot_with(&v), self.v.dot_with(&v), self.w.dot_with(&v)])
    }
}

impl Mul<Self> for M3D {
    type Output = Self;
    fn mul(self, other: Self) -> Self {
        let cols = other.transpose();
        Self {
            u: cols * self.u,
            v: cols * self.v,
            w: cols * self.w,
        }
    }
}

impl fmt::Display for M3D {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "u: [{:.5}, {:.5}, {:.5}]  v: [{:.5}, {:.5}, {:.5}]  w: [{:.5}, {:.5}, {:.5}]",
            self.u[0], self.u[1], self.u[2], self.v[0], self.v[1], self.v[2], self.w[0], self.w[1], self.w[2]
        )
    }
}
