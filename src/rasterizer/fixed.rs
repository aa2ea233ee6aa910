//! Fixed-point scalar types
//! All hot-path arithmetic is integer-only; floats appear once at startup
//! to fill the sine table and in asset/camera setup.

use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign};
use std::sync::OnceLock;

/// Fractional bits of a spatial [`Fixed`] scalar.
pub const FIX_SHIFT: u32 = 8;
/// Fractional bits of an [`Angle`] (stored in turns).
pub const ANGLE_SHIFT: u32 = 12;

const SIN_LUT_LEN: usize = 512;

/// Q23.8 signed fixed-point scalar, the unit for all spatial coordinates,
/// matrix elements and shading factors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct Fixed(i32);

impl Fixed {
    pub const ZERO: Fixed = Fixed(0);
    pub const ONE: Fixed = Fixed(1 << FIX_SHIFT);

    /// Construct from an integer value.
    pub const fn from_int(n: i32) -> Self {
        Fixed(n << FIX_SHIFT)
    }

    /// Construct directly from raw Q23.8 bits.
    pub const fn from_raw(raw: i32) -> Self {
        Fixed(raw)
    }

    /// The raw Q23.8 representation.
    pub const fn raw(self) -> i32 {
        self.0
    }

    /// Truncate to an integer (arithmetic shift, floors toward -inf).
    pub const fn to_int(self) -> i32 {
        self.0 >> FIX_SHIFT
    }

    /// Setup-only conversion; never used per-frame.
    pub fn from_f32(v: f32) -> Self {
        Fixed((v * (1 << FIX_SHIFT) as f32).round() as i32)
    }

    /// Setup/test-only conversion back to a float.
    pub fn to_f32(self) -> f32 {
        self.0 as f32 / (1 << FIX_SHIFT) as f32
    }

    pub const fn abs(self) -> Self {
        Fixed(self.0.abs())
    }

    /// Widen to an [`Angle`]'s precision.
    pub const fn to_angle(self) -> Angle {
        Angle(self.0 << (ANGLE_SHIFT - FIX_SHIFT))
    }

    /// Square root of a non-negative scalar.
    pub fn sqrt(self) -> Self {
        debug_assert!(self.0 >= 0, "sqrt of negative fixed-point value");
        // sqrt(x * 2^8) * sqrt(2^8) = sqrt(x) * 2^8, so pre-shift once more.
        Fixed(isqrt64((self.0 as i64) << FIX_SHIFT) as i32)
    }

    pub fn clamp(self, lo: Fixed, hi: Fixed) -> Self {
        Fixed(self.0.clamp(lo.0, hi.0))
    }
}

impl Add for Fixed {
    type Output = Fixed;
    fn add(self, rhs: Fixed) -> Fixed {
        Fixed(self.0 + rhs.0)
    }
}

impl AddAssign for Fixed {
    fn add_assign(&mut self, rhs: Fixed) {
        self.0 += rhs.0;
    }
}

impl Sub for Fixed {
    type Output = Fixed;
    fn sub(self, rhs: Fixed) -> Fixed {
        Fixed(self.0 - rhs.0)
    }
}

impl SubAssign for Fixed {
    fn sub_assign(&mut self, rhs: Fixed) {
        self.0 -= rhs.0;
    }
}

impl Neg for Fixed {
    type Output = Fixed;
    fn neg(self) -> Fixed {
        Fixed(-self.0)
    }
}

impl Mul for Fixed {
    type Output = Fixed;
    fn mul(self, rhs: Fixed) -> Fixed {
        // Widen so intermediate products keep their high bits.
        Fixed(((self.0 as i64 * rhs.0 as i64) >> FIX_SHIFT) as i32)
    }
}

impl Div for Fixed {
    type Output = Fixed;
    fn div(self, rhs: Fixed) -> Fixed {
        Fixed((((self.0 as i64) << FIX_SHIFT) / rhs.0 as i64) as i32)
    }
}

/// Q19.12 signed fixed-point angle, measured in turns: `1 << 12` raw units
/// are one full revolution. The coarser spatial precision and this one are
/// bridged explicitly via [`Fixed::to_angle`] and [`Angle::to_fixed`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct Angle(i32);

impl Angle {
    pub const ZERO: Angle = Angle(0);
    /// One full revolution.
    pub const TURN: Angle = Angle(1 << ANGLE_SHIFT);

    pub const fn from_raw(raw: i32) -> Self {
        Angle(raw)
    }

    pub const fn raw(self) -> i32 {
        self.0
    }

    pub const fn from_degrees(deg: i32) -> Self {
        Angle(deg * (1 << ANGLE_SHIFT) / 360)
    }

    /// Setup-only conversion from fractional turns.
    pub fn from_turns_f32(turns: f32) -> Self {
        Angle((turns * (1 << ANGLE_SHIFT) as f32).round() as i32)
    }

    /// Narrow to the spatial precision.
    pub const fn to_fixed(self) -> Fixed {
        Fixed::from_raw(self.0 >> (ANGLE_SHIFT - FIX_SHIFT))
    }

    /// Sine, via the shared lookup table.
    pub fn sin(self) -> Fixed {
        let lut = sin_lut();
        // 4096 raw units per turn, 512 table entries: 8 raw units per step.
        // Arithmetic shift plus mask gives the right modular index for
        // negative angles too.
        let idx = ((self.0 >> 3) & (SIN_LUT_LEN as i32 - 1)) as usize;
        Fixed::from_raw(lut[idx] >> (ANGLE_SHIFT - FIX_SHIFT))
    }

    /// Cosine, as sine a quarter turn ahead.
    pub fn cos(self) -> Fixed {
        Angle(self.0 + (1 << (ANGLE_SHIFT - 2))).sin()
    }
}

impl Add for Angle {
    type Output = Angle;
    fn add(self, rhs: Angle) -> Angle {
        Angle(self.0.wrapping_add(rhs.0))
    }
}

impl AddAssign for Angle {
    fn add_assign(&mut self, rhs: Angle) {
        *self = *self + rhs;
    }
}

impl Sub for Angle {
    type Output = Angle;
    fn sub(self, rhs: Angle) -> Angle {
        Angle(self.0.wrapping_sub(rhs.0))
    }
}

impl SubAssign for Angle {
    fn sub_assign(&mut self, rhs: Angle) {
        *self = *self - rhs;
    }
}

impl Neg for Angle {
    type Output = Angle;
    fn neg(self) -> Angle {
        Angle(-self.0)
    }
}

/// Full-turn sine table, Q19.12 values, filled once at first use.
fn sin_lut() -> &'static [i32; SIN_LUT_LEN] {
    static LUT: OnceLock<[i32; SIN_LUT_LEN]> = OnceLock::new();
    LUT.get_or_init(|| {
        let mut table = [0i32; SIN_LUT_LEN];
        for (i, entry) in table.iter_mut().enumerate() {
            let phase = i as f64 / SIN_LUT_LEN as f64 * std::f64::consts::TAU;
            *entry = (phase.sin() * (1 << ANGLE_SHIFT) as f64).round() as i32;
        }
        table
    })
}

/// Integer square root (largest r with r*r <= n), restoring binary method.
fn isqrt64(n: i64) -> i64 {
    if n <= 0 {
        return 0;
    }
    let mut x = n as u64;
    let mut res: u64 = 0;
    let mut bit: u64 = 1 << 62;
    while bit > x {
        bit >>= 2;
    }
    while bit != 0 {
        if x >= res + bit {
            x -= res + bit;
            res = (res >> 1) + bit;
        } else {
            res >>= 1;
        }
        bit >>= 2;
    }
    res as i64
}
