//! Axial hex coordinates and the cube-space algebra built on them.
//!
//! A coordinate stores `(q, r)`; the third cube component is derived as
//! `s = -q - r`, so `q + r + s == 0` holds by construction. All algebra is
//! integer or fixed-point so that lines are identical on every client.

use std::fmt;
use std::ops::{Add, Sub};

use serde::{Deserialize, Serialize};

use crate::math::Fixed;

/// A hex-grid position in axial coordinates.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct HexCoord {
    q: i32,
    r: i32,
}

/// The six axial neighbor offsets, starting east and turning counter-clockwise.
pub const DIRECTIONS: [HexCoord; 6] = [
    HexCoord::new(1, 0),
    HexCoord::new(1, -1),
    HexCoord::new(0, -1),
    HexCoord::new(-1, 0),
    HexCoord::new(-1, 1),
    HexCoord::new(0, 1),
];

impl HexCoord {
    /// The origin hex.
    pub const ORIGIN: Self = Self::new(0, 0);

    /// Create a coordinate from axial components.
    #[must_use]
    pub const fn new(q: i32, r: i32) -> Self {
        Self { q, r }
    }

    /// Axial `q` component.
    #[must_use]
    pub const fn q(self) -> i32 {
        self.q
    }

    /// Axial `r` component.
    #[must_use]
    pub const fn r(self) -> i32 {
        self.r
    }

    /// Derived cube `s` component.
    #[must_use]
    pub const fn s(self) -> i32 {
        -self.q - self.r
    }

    /// Hex distance (Chebyshev distance in cube space).
    #[must_use]
    pub fn distance(self, other: Self) -> u32 {
        let dq = self.q.abs_diff(other.q);
        let dr = self.r.abs_diff(other.r);
        let ds = self.s().abs_diff(other.s());
        dq.max(dr).max(ds)
    }

    /// The six adjacent hexes, in [`DIRECTIONS`] order.
    #[must_use]
    pub fn neighbors(self) -> [Self; 6] {
        DIRECTIONS.map(|d| self + d)
    }

    /// Interpolate towards `other` by `t` and round to the nearest hex.
    ///
    /// Each cube component is rounded independently; the component with
    /// the largest rounding error is then recomputed from the other two so
    /// the result stays on the `q + r + s == 0` plane.
    #[must_use]
    pub fn lerp_round(self, other: Self, t: Fixed) -> Self {
        let lerp = |a: i32, b: i32| Fixed::from_num(a) + Fixed::from_num(b - a) * t;
        let qf = lerp(self.q, other.q);
        let rf = lerp(self.r, other.r);
        let sf = lerp(self.s(), other.s());

        let mut q = qf.round();
        let mut r = rf.round();
        let s = sf.round();

        let dq = (q - qf).abs();
        let dr = (r - rf).abs();
        let ds = (s - sf).abs();

        if dq > dr && dq > ds {
            q = -r - s;
        } else if dr > ds {
            r = -q - s;
        }

        Self::new(q.to_num::<i32>(), r.to_num::<i32>())
    }

    /// Every hex on the straight line from `self` to `end`, both inclusive.
    ///
    /// Returns `distance + 1` coordinates; `line(a, a)` is `[a]`.
    #[must_use]
    pub fn line(self, end: Self) -> Vec<Self> {
        let steps = self.distance(end);
        if steps == 0 {
            return vec![self];
        }

        let n = Fixed::from_num(steps);
        let mut out = Vec::with_capacity(steps as usize + 1);
        out.push(self);
        for i in 1..steps {
            out.push(self.lerp_round(end, Fixed::from_num(i) / n));
        }
        out.push(end);
        out
    }
}

impl Add for HexCoord {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self::new(self.q + rhs.q, self.r + rhs.r)
    }
}

impl Sub for HexCoord {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self::new(self.q - rhs.q, self.r - rhs.r)
    }
}

impl fmt::Display for HexCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.q, self.r)
    }
}
