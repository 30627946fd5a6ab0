//! Lambertian diffuse reflection and diffuse transmission lobes
use std::f64::consts;

use crate::{
    config::BsdfConfig, utils, Bxdf, DiffuseReflection, LobeType, RgbD, SampleResponse, Vec2d,
    Vec3d,
};

/// Diffuse reflection with a constant albedo
#[derive(Copy, Clone, Debug)]
pub struct LambertDiffuse {
    /// The color. Every component should be in \[0,1\] to preserve physical validity.
    pub albedo: RgbD,
    pub min_cos_theta: f64,
}

impl DiffuseReflection for LambertDiffuse {
    fn from_material(albedo: RgbD, _roughness: f64, config: &BsdfConfig) -> Self {
        Self {
            albedo,
            min_cos_theta: config.min_cos_theta,
        }
    }

    fn albedo(&self) -> RgbD {
        self.albedo
    }
}

impl Bxdf for LambertDiffuse {
    fn eval(&self, omega_i: Vec3d, omega_o: Vec3d) -> RgbD {
        if omega_i.z.min(omega_o.z) < self.min_cos_theta {
            return RgbD::ZERO;
        }
        self.albedo * consts::FRAC_1_PI * omega_o.z
    }

    fn sample(&self, omega_i: Vec3d, rdf: Vec3d) -> Option<SampleResponse> {
        let (omega_o, pdf) = utils::sample_cosine_hemisphere_concentric(Vec2d::new(rdf.x, rdf.y));
        if omega_i.z.min(omega_o.z) < self.min_cos_theta {
            return None;
        }
        Some(SampleResponse {
            omega_o,
            pdf,
            weight: self.albedo,
            lobe: LobeType::DIFFUSE_REFLECTION,
            lobe_probability: 1.0,
        })
    }

    fn eval_pdf(&self, omega_i: Vec3d, omega_o: Vec3d) -> f64 {
        if omega_i.z.min(omega_o.z) < self.min_cos_theta {
            return 0.0;
        }
        consts::FRAC_1_PI * omega_o.z
    }
}

/// Diffuse transmission. Mirrors [`LambertDiffuse`] into the lower hemisphere.
#[derive(Copy, Clone, Debug)]
pub struct LambertTransmission {
    /// The transmitted color
    pub albedo: RgbD,
    pub min_cos_theta: f64,
}

impl LambertTransmission {
    #[must_use]
    pub const fn new(albedo: RgbD, config: &BsdfConfig) -> Self {
        Self {
            albedo,
            min_cos_theta: config.min_cos_theta,
        }
    }
}

impl Bxdf for LambertTransmission {
    fn eval(&self, omega_i: Vec3d, omega_o: Vec3d) -> RgbD {
        if omega_i.z.min(-omega_o.z) < self.min_cos_theta {
            return RgbD::ZERO;
        }
        self.albedo * consts::FRAC_1_PI * -omega_o.z
    }

    fn sample(&self, omega_i: Vec3d, rdf: Vec3d) -> Option<SampleResponse> {
        let (omega_o, pdf) = utils::sample_cosine_hemisphere_concentric(Vec2d::new(rdf.x, rdf.y));
        let omega_o = Vec3d::new(omega_o.x, omega_o.y, -omega_o.z);
        if omega_i.z.min(-omega_o.z) < self.min_cos_theta {
            return None;
        }
        Some(SampleResponse {
            omega_o,
            pdf,
            weight: self.albedo,
            lobe: LobeType::DIFFUSE_TRANSMISSION,
            lobe_probability: 1.0,
        })
    }

    fn eval_pdf(&self, omega_i: Vec3d, omega_o: Vec3d) -> f64 {
        if omega_i.z.min(-omega_o.z) < self.min_cos_theta {
            return 0.0;
        }
        consts::FRAC_1_PI * -omega_o.z
    }
}
