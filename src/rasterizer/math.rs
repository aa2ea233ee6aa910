//! Vector and matrix math for 3D rendering
//! Everything runs on the Q23.8 [`Fixed`] scalar; angles enter only through
//! the sine/cosine table.

use std::ops::{Add, Mul, Neg, Sub};

use super::fixed::{Angle, Fixed, FIX_SHIFT};

/// 3D vector of fixed-point scalars. Used for positions, directions and
/// normals alike (normals are kept unit-length by convention).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Vec3 {
    pub x: Fixed,
    pub y: Fixed,
    pub z: Fixed,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3 {
        x: Fixed::ZERO,
        y: Fixed::ZERO,
        z: Fixed::ZERO,
    };
    pub const UP: Vec3 = Vec3 {
        x: Fixed::ZERO,
        y: Fixed::ONE,
        z: Fixed::ZERO,
    };

    pub const fn new(x: Fixed, y: Fixed, z: Fixed) -> Self {
        Self { x, y, z }
    }

    /// Shorthand for integer-valued vectors.
    pub const fn from_ints(x: i32, y: i32, z: i32) -> Self {
        Self {
            x: Fixed::from_int(x),
            y: Fixed::from_int(y),
            z: Fixed::from_int(z),
        }
    }

    pub fn dot(self, other: Vec3) -> Fixed {
        // Accumulate widened so the three products can't clip each other.
        let sum = self.x.raw() as i64 * other.x.raw() as i64
            + self.y.raw() as i64 * other.y.raw() as i64
            + self.z.raw() as i64 * other.z.raw() as i64;
        Fixed::from_raw((sum >> FIX_SHIFT) as i32)
    }

    pub fn cross(self, other: Vec3) -> Vec3 {
        Vec3 {
            x: self.y * other.z - self.z * other.y,
            y: self.z * other.x - self.x * other.z,
            z: self.x * other.y - self.y * other.x,
        }
    }

    pub fn length(self) -> Fixed {
        self.dot(self).sqrt()
    }

    /// Unit-length copy; the zero vector stays zero.
    pub fn unit(self) -> Vec3 {
        let len = self.length();
        if len == Fixed::ZERO {
            return Vec3::ZERO;
        }
        Vec3 {
            x: self.x / len,
            y: self.y / len,
            z: self.z / len,
        }
    }

    pub fn scaled(self, s: Fixed) -> Vec3 {
        Vec3 {
            x: self.x * s,
            y: self.y * s,
            z: self.z * s,
        }
    }
}

impl Add for Vec3 {
    type Output = Vec3;
    fn add(self, other: Vec3) -> Vec3 {
        Vec3 {
            x: self.x + other.x,
            y: self.y + other.y,
            z: self.z + other.z,
        }
    }
}

impl Sub for Vec3 {
    type Output = Vec3;
    fn sub(self, other: Vec3) -> Vec3 {
        Vec3 {
            x: self.x - other.x,
            y: self.y - other.y,
            z: self.z - other.z,
        }
    }
}

impl Neg for Vec3 {
    type Output = Vec3;
    fn neg(self) -> Vec3 {
        Vec3 {
            x: -self.x,
            y: -self.y,
            z: -self.z,
        }
    }
}

impl Mul<Fixed> for Vec3 {
    type Output = Vec3;
    fn mul(self, s: Fixed) -> Vec3 {
        self.scaled(s)
    }
}

/// Row-major 4x4 fixed-point matrix: rotations, the camera's view transform
/// and the perspective projection all share this one type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mat4 {
    pub m: [Fixed; 16],
}

impl Mat4 {
    pub const IDENTITY: Mat4 = {
        let mut m = [Fixed::ZERO; 16];
        m[0] = Fixed::ONE;
        m[5] = Fixed::ONE;
        m[10] = Fixed::ONE;
        m[15] = Fixed::ONE;
        Mat4 { m }
    };

    /// Rotation about the x axis.
    pub fn rot_x(angle: Angle) -> Mat4 {
        let (s, c) = (angle.sin(), angle.cos());
        let mut m = Mat4::IDENTITY;
        m.m[5] = c;
        m.m[6] = -s;
        m.m[9] = s;
        m.m[10] = c;
        m
    }

    /// Rotation about the y axis.
    pub fn rot_y(angle: Angle) -> Mat4 {
        let (s, c) = (angle.sin(), angle.cos());
        let mut m = Mat4::IDENTITY;
        m.m[0] = c;
        m.m[2] = s;
        m.m[8] = -s;
        m.m[10] = c;
        m
    }

    /// Rotation about the z axis.
    pub fn rot_z(angle: Angle) -> Mat4 {
        let (s, c) = (angle.sin(), angle.cos());
        let mut m = Mat4::IDENTITY;
        m.m[0] = c;
        m.m[1] = -s;
        m.m[4] = s;
        m.m[5] = c;
        m
    }

    /// Combined instance rotation. The composition order (yaw, then pitch,
    /// then roll applied to the vector) is shared by vertex rotation and
    /// face-normal rotation for lighting, so it must never diverge.
    pub fn yaw_pitch_roll(yaw: Angle, pitch: Angle, roll: Angle) -> Mat4 {
        Mat4::rot_y(yaw).mul(&Mat4::rot_x(pitch)).mul(&Mat4::rot_z(roll))
    }

    /// Matrix product `self * other`.
    pub fn mul(&self, other: &Mat4) -> Mat4 {
        let mut out = [Fixed::ZERO; 16];
        for row in 0..4 {
            for col in 0..4 {
                let mut acc = Fixed::ZERO;
                for k in 0..4 {
                    acc += self.m[row * 4 + k] * other.m[k * 4 + col];
                }
                out[row * 4 + col] = acc;
            }
        }
        Mat4 { m: out }
    }

    /// Transform a point (w = 1). When the bottom row yields a homogeneous
    /// w other than one (the perspective matrix does), the result is
    /// divided through by it.
    pub fn transform(&self, v: Vec3) -> Vec3 {
        let m = &self.m;
        let x = m[0] * v.x + m[1] * v.y + m[2] * v.z + m[3];
        let y = m[4] * v.x + m[5] * v.y + m[6] * v.z + m[7];
        let z = m[8] * v.x + m[9] * v.y + m[10] * v.z + m[11];
        let w = m[12] * v.x + m[13] * v.y + m[14] * v.z + m[15];
        if w == Fixed::ONE {
            Vec3 { x, y, z }
        } else {
            Vec3 {
                x: x / w,
                y: y / w,
                z: z / w,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vec3_dot() {
        let a = Vec3::from_ints(1, 2, 3);
        let b = Vec3::from_ints(4, 5, 6);
        assert_eq!(a.dot(b), Fixed::from_int(32));
    }

    #[test]
    fn test_vec3_cross() {
        let x = Vec3::from_ints(1, 0, 0);
        let y = Vec3::from_ints(0, 1, 0);
        assert_eq!(x.cross(y), Vec3::from_ints(0, 0, 1));
        assert_eq!(y.cross(x), Vec3::from_ints(0, 0, -1));
    }

    #[test]
    fn test_vec3_unit() {
        let v = Vec3::from_ints(0, 0, 5).unit();
        assert_eq!(v, Vec3::from_ints(0, 0, 1));
        assert_eq!(Vec3::ZERO.unit(), Vec3::ZERO);
    }

    #[test]
    fn test_identity_transform() {
        let v = Vec3::from_ints(3, -4, 5);
        assert_eq!(Mat4::IDENTITY.transform(v), v);
    }

    #[test]
    fn test_rot_y_quarter_turn() {
        let m = Mat4::rot_y(Angle::from_degrees(90));
        let v = m.transform(Vec3::from_ints(0, 0, 1));
        assert_eq!(v, Vec3::from_ints(1, 0, 0));
    }

    #[test]
    fn test_yaw_only_matches_rot_y() {
        let yaw = Angle::from_degrees(37);
        let a = Mat4::yaw_pitch_roll(yaw, Angle::ZERO, Angle::ZERO);
        let b = Mat4::rot_y(yaw);
        assert_eq!(a, b);
    }

    #[test]
    fn test_perspective_divide() {
        // Bottom row [0,0,-1,0] divides by -z.
        let mut m = Mat4::IDENTITY;
        m.m[14] = -Fixed::ONE;
        m.m[15] = Fixed::ZERO;
        let v = m.transform(Vec3::from_ints(4, 8, -2));
        assert_eq!(v.x, Fixed::from_int(2));
        assert_eq!(v.y, Fixed::from_int(4));
    }
}
