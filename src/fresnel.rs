//! Fresnel terms used by the diffuse and specular lobes
use crate::{utils::pow5, RgbD};

/// Schlick's approximation with colored reflectance at normal (`f0`) and grazing (`f90`)
/// incidence
#[must_use]
pub fn schlick(f0: RgbD, f90: RgbD, cos_theta: f64) -> RgbD {
    f0 + (f90 - f0) * pow5((1.0 - cos_theta).max(0.0))
}

/// Scalar version of [`schlick`]
#[must_use]
pub fn schlick_scalar(f0: f64, f90: f64, cos_theta: f64) -> f64 {
    #[allow(clippy::suboptimal_flops)]
    {
        f0 + (f90 - f0) * pow5((1.0 - cos_theta).max(0.0))
    }
}

/// Result of [`dielectric`]
#[derive(Clone, Copy, Debug)]
pub struct DielectricFresnel {
    /// Unpolarized reflectance. `1.0` on total internal reflection
    pub reflectance: f64,
    /// Cosine of the refracted direction (always positive). `0.0` on total internal reflection
    pub cos_theta_t: f64,
}

/// Exact Fresnel reflectance of a dielectric interface.
///
/// # Arguments
/// * `eta` - relative index of refraction (incident IoR / transmitted IoR)
/// * `cos_theta_i` - cosine of the incident angle. Negative values mean the light arrives from
///   the other side, in which case `eta` is inverted.
#[must_use]
pub fn dielectric(eta: f64, cos_theta_i: f64) -> DielectricFresnel {
    #[allow(clippy::float_cmp)]
    if eta == 1.0 {
        return DielectricFresnel {
            reflectance: 0.0,
            cos_theta_t: cos_theta_i.abs(),
        };
    }

    let (eta, cos_theta_i) = if cos_theta_i < 0.0 {
        (1.0 / eta, -cos_theta_i)
    } else {
        (eta, cos_theta_i)
    };

    #[allow(clippy::suboptimal_flops)]
    let sin_theta_t_sq = eta * eta * (1.0 - cos_theta_i * cos_theta_i);
    if sin_theta_t_sq >= 1.0 {
        // total internal reflection
        return DielectricFresnel {
            reflectance: 1.0,
            cos_theta_t: 0.0,
        };
    }
    let cos_theta_t = (1.0 - sin_theta_t_sq).sqrt();

    #[allow(clippy::suboptimal_flops)]
    let rs = (eta * cos_theta_i - cos_theta_t) / (eta * cos_theta_i + cos_theta_t);
    #[allow(clippy::suboptimal_flops)]
    let rp = (cos_theta_i - eta * cos_theta_t) / (cos_theta_i + eta * cos_theta_t);

    #[allow(clippy::suboptimal_flops)]
    DielectricFresnel {
        reflectance: 0.5 * (rs * rs + rp * rp),
        cos_theta_t,
    }
}
