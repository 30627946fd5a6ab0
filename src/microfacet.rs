//! An implementation of the isotropic GGX Distribution and the Smith masking functions

use crate::{utils::FloatExt, Vec2d, Vec3d};
use std::f64::consts;

/// Isotropic GGX microsurface. Used by the specular lobes.
///
/// All functions work in the local shading frame, the macro surface normal is the z-axis.
///
/// # Mathematical background
/// * [Understanding the Masking-Shadowing Function in Microfacet-Based BRDFs](https://jcgt.org/published/0003/02/03/)
/// * [Sampling the GGX Distribution of Visible Normals](https://jcgt.org/published/0007/04/01/)
#[derive(Clone, Copy, Debug)]
pub struct Ggx {
    /// roughness. This value is not perceived linearly. A good approximation is
    /// alpha = perceived_roughness^2
    pub alpha: f64,
}

impl Ggx {
    #[must_use]
    pub const fn new(alpha: f64) -> Self {
        Self { alpha }
    }

    /// Distribution of normals / Normal Distribution Function
    /// This is the $D$ term in typical Cook-Torance / GGX model
    #[must_use]
    pub fn ndf(&self, cos_theta: f64) -> f64 {
        let a2 = self.alpha.sq();
        #[allow(clippy::suboptimal_flops)]
        let d = (cos_theta * a2 - cos_theta) * cos_theta + 1.0;
        a2 / (d * d * consts::PI)
    }

    /// density of [`Ggx::sample_ndf`] w.r.t. solid angle of the microfacet normal
    #[must_use]
    pub fn pdf_ndf(&self, cos_theta: f64) -> f64 {
        self.ndf(cos_theta) * cos_theta
    }

    /// Samples a microfacet normal proportional to `D(m) * cos(theta_m)`
    #[must_use]
    pub fn sample_ndf(&self, rnf: Vec2d) -> (Vec3d, f64) {
        let a2 = self.alpha.sq().max(1e-16);
        let phi = rnf.y * (2.0 * consts::PI);
        let tan_theta_sq = a2 * rnf.x / (1.0 - rnf.x);
        let cos_theta = 1.0 / (1.0 + tan_theta_sq).sqrt();
        #[allow(clippy::suboptimal_flops)]
        let r = (1.0 - cos_theta * cos_theta).max(0.0).sqrt();
        let (sin_phi, cos_phi) = phi.sin_cos();
        let m = Vec3d::new(cos_phi * r, sin_phi * r, cos_theta);
        (m, self.pdf_ndf(cos_theta))
    }

    /// density of [`Ggx::sample_vndf`] w.r.t. solid angle of the microfacet normal
    #[must_use]
    pub fn pdf_vndf(&self, omega: Vec3d, m: Vec3d) -> f64 {
        let g1 = self.g1(omega.z);
        let d = self.ndf(m.z);
        g1 * d * omega.dot(m).max(0.0) / omega.z
    }

    /// Samples the distribution of normals that are visible from `omega`
    #[must_use]
    pub fn sample_vndf(&self, omega: Vec3d, rnf: Vec2d) -> (Vec3d, f64) {
        let v_h: Vec3d = Vec3d::new(omega.x * self.alpha, omega.y * self.alpha, omega.z).normalize();

        #[allow(clippy::suboptimal_flops)]
        let lensq = v_h.x * v_h.x + v_h.y * v_h.y;
        let at1: Vec3d = if lensq > (1.0e-10) {
            Vec3d::new(-v_h.y, v_h.x, 0.0) / f64::sqrt(lensq)
        } else {
            Vec3d::new(1.0, 0.0, 0.0)
        };
        let at2: Vec3d = Vec3d::cross(v_h, at1);

        let r = rnf.x.sqrt();
        let phi: f64 = (2.0) * consts::PI * rnf.y;
        let (sin_phi, cos_phi) = phi.sin_cos();
        let t1 = r * cos_phi;
        let t2 = r * sin_phi;
        let s: f64 = (0.5) * ((1.0) + v_h.z);

        #[allow(clippy::suboptimal_flops)]
        let t2r = (1.0 - s) * (1.0 - t1 * t1).sqrt() + s * t2;

        #[allow(clippy::suboptimal_flops)]
        let m_h: Vec3d = at1 * t1 + at2 * t2r + v_h * (1.0 - t1 * t1 - t2r * t2r).max(0.0).sqrt();

        let m = Vec3d::new(self.alpha * m_h.x, self.alpha * m_h.y, m_h.z.max(0.0)).normalize();
        (m, self.pdf_vndf(omega, m))
    }

    /// Smith's auxiliary function $\Lambda$
    #[must_use]
    pub fn lambda(&self, cos_theta: f64) -> f64 {
        if cos_theta <= 0.0 {
            return 0.0;
        }
        let cos_theta_sq = cos_theta.sq();
        let tan_theta_sq = (1.0 - cos_theta_sq).max(0.0) / cos_theta_sq;
        #[allow(clippy::suboptimal_flops)]
        {
            0.5 * (-1.0 + (1.0 + self.alpha.sq() * tan_theta_sq).sqrt())
        }
    }

    /// shadowing function
    /// This is the `G_1` term in typical Cook-Torance / GGX model
    #[must_use]
    pub fn g1(&self, cos_theta: f64) -> f64 {
        if cos_theta <= 0.0 {
            return 0.0;
        }
        let cos_theta_sq = cos_theta.sq();
        let tan_theta_sq = (1.0 - cos_theta_sq).max(0.0) / cos_theta_sq;
        #[allow(clippy::suboptimal_flops)]
        {
            2.0 / (1.0 + (1.0 + self.alpha.sq() * tan_theta_sq).sqrt())
        }
    }
}

/// Masking-Shadowing function. The `G` term in typical Cook-Torance / GGX model.
///
/// Implementations are zero sized strategy types that are selected once as a generic parameter
/// of the specular lobes.
pub trait SmithMasking: Copy + Default + std::fmt::Debug {
    /// `G(omega_i, omega_o)` given the (positive) cosines of both directions
    fn masking(ggx: Ggx, cos_i: f64, cos_o: f64) -> f64;

    /// `G(omega_i, omega_o) / G1(omega_i)`, the throughput of a visible normal sample
    fn masking_over_g1_incident(ggx: Ggx, cos_i: f64, cos_o: f64) -> f64;
}

/// Separable Smith masking: `G = G1(omega_i) * G1(omega_o)`
#[derive(Clone, Copy, Debug, Default)]
pub struct SmithSeparable;

/// Height correlated Smith masking: `G = 1 / (1 + Lambda(omega_i) + Lambda(omega_o))`
#[derive(Clone, Copy, Debug, Default)]
pub struct SmithHeightCorrelated;

impl SmithMasking for SmithSeparable {
    fn masking(ggx: Ggx, cos_i: f64, cos_o: f64) -> f64 {
        1.0 / ((1.0 + ggx.lambda(cos_i)) * (1.0 + ggx.lambda(cos_o)))
    }

    fn masking_over_g1_incident(ggx: Ggx, _cos_i: f64, cos_o: f64) -> f64 {
        ggx.g1(cos_o)
    }
}

impl SmithMasking for SmithHeightCorrelated {
    fn masking(ggx: Ggx, cos_i: f64, cos_o: f64) -> f64 {
        1.0 / (1.0 + ggx.lambda(cos_i) + ggx.lambda(cos_o))
    }

    fn masking_over_g1_incident(ggx: Ggx, cos_i: f64, cos_o: f64) -> f64 {
        Self::masking(ggx, cos_i, cos_o) * (1.0 + ggx.lambda(cos_i))
    }
}
