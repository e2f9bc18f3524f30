use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Mul, Neg, Sub};
use std::str::FromStr;

/// An integer position or offset in map units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3 { x: 0, y: 0, z: 0 };
    pub const UP: Vec3 = Vec3 { x: 0, y: 0, z: 1 };
    pub const DOWN: Vec3 = Vec3 { x: 0, y: 0, z: -1 };

    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    pub fn min(self, other: Vec3) -> Vec3 {
        Vec3::new(
            self.x.min(other.x),
            self.y.min(other.y),
            self.z.min(other.z),
        )
    }

    pub fn max(self, other: Vec3) -> Vec3 {
        Vec3::new(
            self.x.max(other.x),
            self.y.max(other.y),
            self.z.max(other.z),
        )
    }

    /// Space-separated form used for keyvalues and seed strings, e.g. `"64 -128 0"`.
    pub fn join(&self, sep: &str) -> String {
        format!("{}{sep}{}{sep}{}", self.x, self.y, self.z)
    }

    /// Rotate by a `"pitch yaw roll"` angle triple, rounding back onto the unit grid.
    ///
    /// Roll is applied about X first, then pitch about Y, then yaw about Z.
    pub fn rotate_by_angles(self, angles: Angles) -> Vec3 {
        let (sp, cp) = angles.pitch.to_radians().sin_cos();
        let (sy, cy) = angles.yaw.to_radians().sin_cos();
        let (sr, cr) = angles.roll.to_radians().sin_cos();
        let (x, y, z) = (self.x as f64, self.y as f64, self.z as f64);

        // Roll
        let (y, z) = (y * cr - z * sr, y * sr + z * cr);
        // Pitch
        let (x, z) = (x * cp + z * sp, -x * sp + z * cp);
        // Yaw
        let (x, y) = (x * cy - y * sy, x * sy + y * cy);

        Vec3::new(x.round() as i32, y.round() as i32, z.round() as i32)
    }

    /// Centre of the 32-unit cell containing `self`, in X and Y only.
    pub fn snap_to_cell_center(self) -> Vec3 {
        Vec3::new(
            self.x.div_euclid(32) * 32 + 16,
            self.y.div_euclid(32) * 32 + 16,
            self.z,
        )
    }
}

impl fmt::Display for Vec3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.x, self.y, self.z)
    }
}

impl FromStr for Vec3 {
    type Err = String;

    /// Parses `"x y z"`; fractional components are floored onto the unit grid.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts = parse_triple(s)?;
        Ok(Vec3::new(
            parts[0].floor() as i32,
            parts[1].floor() as i32,
            parts[2].floor() as i32,
        ))
    }
}

impl From<(i32, i32, i32)> for Vec3 {
    fn from(t: (i32, i32, i32)) -> Self {
        Vec3::new(t.0, t.1, t.2)
    }
}

impl Add for Vec3 {
    type Output = Vec3;
    fn add(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Add<(i32, i32, i32)> for Vec3 {
    type Output = Vec3;
    fn add(self, rhs: (i32, i32, i32)) -> Vec3 {
        self + Vec3::from(rhs)
    }
}

impl AddAssign for Vec3 {
    fn add_assign(&mut self, rhs: Vec3) {
        *self = *self + rhs;
    }
}

impl Sub for Vec3 {
    type Output = Vec3;
    fn sub(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Sub<(i32, i32, i32)> for Vec3 {
    type Output = Vec3;
    fn sub(self, rhs: (i32, i32, i32)) -> Vec3 {
        self - Vec3::from(rhs)
    }
}

impl Mul<i32> for Vec3 {
    type Output = Vec3;
    fn mul(self, rhs: i32) -> Vec3 {
        Vec3::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

impl Neg for Vec3 {
    type Output = Vec3;
    fn neg(self) -> Vec3 {
        Vec3::new(-self.x, -self.y, -self.z)
    }
}

/// A `"pitch yaw roll"` orientation in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Angles {
    pub pitch: f64,
    pub yaw: f64,
    pub roll: f64,
}

impl Angles {
    pub const fn new(pitch: f64, yaw: f64, roll: f64) -> Self {
        Self { pitch, yaw, roll }
    }
}

impl fmt::Display for Angles {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.pitch, self.yaw, self.roll)
    }
}

impl FromStr for Angles {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts = parse_triple(s)?;
        Ok(Angles::new(parts[0], parts[1], parts[2]))
    }
}

fn parse_triple(s: &str) -> Result<[f64; 3], String> {
    let mut out = [0.0; 3];
    let mut parts = s.split_whitespace();
    for slot in out.iter_mut() {
        let part = parts
            .next()
            .ok_or_else(|| format!("Expected 3 components in '{}'", s))?;
        *slot = part
            .parse::<f64>()
            .map_err(|e| format!("Invalid component '{}' in '{}': {}", part, s, e))?;
    }
    if parts.next().is_some() {
        return Err(format!("Too many components in '{}'", s));
    }
    Ok(out)
}

/// Iterate `(x, y)` over `[min_x, max_x) x [min_y, max_y)` with the given stride, X outermost.
pub fn iter_grid(
    min_x: i32,
    max_x: i32,
    min_y: i32,
    max_y: i32,
    stride: i32,
) -> impl Iterator<Item = (i32, i32)> {
    let stride = stride.max(1) as usize;
    (min_x..max_x)
        .step_by(stride)
        .flat_map(move |x| (min_y..max_y).step_by(stride).map(move |y| (x, y)))
}
