use std::f64::consts;

use crate::{RgbD, RgbF, Vec2d, Vec3d};

pub trait FloatExt {
    fn sq(self) -> Self;
    fn lerp(self, other: Self, t: Self) -> Self;
}

impl FloatExt for f64 {
    fn sq(self) -> Self {
        self * self
    }
    fn lerp(self, other: Self, t: Self) -> Self {
        #[allow(clippy::suboptimal_flops)]
        {
            self * (1.0 - t) + other * t
        }
    }
}

pub trait SafeCast<Target> {
    fn safe_cast(self) -> Target;
}

impl SafeCast<RgbD> for RgbF {
    fn safe_cast(self) -> RgbD {
        RgbD {
            x: self.x as f64,
            y: self.y as f64,
            z: self.z as f64,
        }
    }
}

pub trait VecExt {
    type Scalar;
    #[must_use]
    fn luminance(self) -> Self::Scalar;
    #[must_use]
    fn sqrt(self) -> Self;
}

impl VecExt for Vec3d {
    type Scalar = f64;

    /// Returns the perceived brightness of the color (Rec. 709 weights)
    fn luminance(self) -> Self::Scalar {
        let lfac = Self::new(0.2126, 0.7152, 0.0722);
        self.dot(lfac)
    }

    fn sqrt(self) -> Self {
        Self {
            x: self.x.sqrt(),
            y: self.y.sqrt(),
            z: self.z.sqrt(),
        }
    }
}

/// reflects `vec` at the plane with normal `n`
pub fn reflect(n: Vec3d, vec: Vec3d) -> Vec3d {
    n * (n.dot(vec) * 2.0) - vec
}

/// perfect mirror direction of `omega` in the local shading frame
pub fn mirror(omega: Vec3d) -> Vec3d {
    Vec3d::new(-omega.x, -omega.y, omega.z)
}

/// Maps the unit square to the unit disk, preserving relative areas (Shirley-Chiu)
pub fn sample_disk_concentric(u: Vec2d) -> Vec2d {
    let u = u * 2.0 - Vec2d::ONE;
    if u.x == 0.0 && u.y == 0.0 {
        return u;
    }
    let (r, phi) = if u.x.abs() > u.y.abs() {
        (u.x, (u.y / u.x) * consts::FRAC_PI_4)
    } else {
        (u.y, consts::FRAC_PI_2 - (u.x / u.y) * consts::FRAC_PI_4)
    };
    let (sin_phi, cos_phi) = phi.sin_cos();
    Vec2d::new(cos_phi, sin_phi) * r
}

/* pdf is cos(theta) / pi */
pub fn sample_cosine_hemisphere_concentric(u: Vec2d) -> (Vec3d, f64) {
    let d = sample_disk_concentric(u);
    let z = (1.0 - d.length_squared()).max(0.0).sqrt();
    (Vec3d::new(d.x, d.y, z), z * consts::FRAC_1_PI)
}

pub fn pow5(v: f64) -> f64 {
    let v2 = v * v;
    v2 * v2 * v
}
