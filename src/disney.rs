//! Roughness dependent diffuse reflection after Burley (Disney) and its energy normalized
//! variant used in Frostbite

use std::f64::consts;

use crate::{
    config::BsdfConfig, fresnel, utils, utils::FloatExt, Bxdf, DiffuseReflection, LobeType, RgbD,
    SampleResponse, Vec2d, Vec3d,
};

/// Burley's diffuse model. Adds a Fresnel shaped retro-reflection that grows with roughness.
///
/// * Brent Burley. Physically-based shading at Disney, course notes, revised 2014.
#[derive(Copy, Clone, Debug)]
pub struct DisneyDiffuse {
    /// Determines the Color of the material. All components should be in \[0,1\]
    pub albedo: RgbD,
    /// Perceived roughness in \[0,1\] (not remapped)
    pub roughness: f64,
    pub min_cos_theta: f64,
}

/// [`DisneyDiffuse`] renormalized so that it does not reflect more than it receives.
///
/// * Sébastien Lagarde, Charles de Rousiers. Moving Frostbite to Physically Based Rendering,
///   SIGGRAPH 2014 course notes.
#[derive(Copy, Clone, Debug)]
pub struct FrostbiteDiffuse {
    /// Determines the Color of the material. All components should be in \[0,1\]
    pub albedo: RgbD,
    /// Perceived roughness in \[0,1\] (not remapped)
    pub roughness: f64,
    pub min_cos_theta: f64,
}

/// Weighting function that turns the Lambertian lobe into a roughness dependent one
trait DiffuseWeight {
    fn min_cos_theta(&self) -> f64;
    fn weight(&self, omega_i: Vec3d, omega_o: Vec3d) -> RgbD;
}

impl DiffuseWeight for DisneyDiffuse {
    fn min_cos_theta(&self) -> f64 {
        self.min_cos_theta
    }

    fn weight(&self, omega_i: Vec3d, omega_o: Vec3d) -> RgbD {
        let h = (omega_i + omega_o).normalize();
        let h_dot_o = omega_o.dot(h);
        #[allow(clippy::suboptimal_flops)]
        let fd90 = 0.5 + 2.0 * h_dot_o.sq() * self.roughness;
        let scatter_i = fresnel::schlick_scalar(1.0, fd90, omega_i.z);
        let scatter_o = fresnel::schlick_scalar(1.0, fd90, omega_o.z);
        self.albedo * scatter_i * scatter_o
    }
}

impl DiffuseWeight for FrostbiteDiffuse {
    fn min_cos_theta(&self) -> f64 {
        self.min_cos_theta
    }

    fn weight(&self, omega_i: Vec3d, omega_o: Vec3d) -> RgbD {
        let h = (omega_i + omega_o).normalize();
        let h_dot_o = omega_o.dot(h);
        let energy_bias = 0.0_f64.lerp(0.5, self.roughness);
        let energy_factor = 1.0_f64.lerp(1.0 / 1.51, self.roughness);
        #[allow(clippy::suboptimal_flops)]
        let fd90 = energy_bias + 2.0 * h_dot_o.sq() * self.roughness;
        let scatter_i = fresnel::schlick_scalar(1.0, fd90, omega_i.z);
        let scatter_o = fresnel::schlick_scalar(1.0, fd90, omega_o.z);
        self.albedo * (scatter_i * scatter_o * energy_factor)
    }
}

fn eval_weighted<W: DiffuseWeight>(lobe: &W, omega_i: Vec3d, omega_o: Vec3d) -> RgbD {
    if omega_i.z.min(omega_o.z) < lobe.min_cos_theta() {
        return RgbD::ZERO;
    }
    lobe.weight(omega_i, omega_o) * consts::FRAC_1_PI * omega_o.z
}

fn sample_weighted<W: DiffuseWeight>(
    lobe: &W,
    omega_i: Vec3d,
    rdf: Vec3d,
) -> Option<SampleResponse> {
    let (omega_o, pdf) = utils::sample_cosine_hemisphere_concentric(Vec2d::new(rdf.x, rdf.y));
    if omega_i.z.min(omega_o.z) < lobe.min_cos_theta() {
        return None;
    }
    Some(SampleResponse {
        omega_o,
        pdf,
        weight: lobe.weight(omega_i, omega_o),
        lobe: LobeType::DIFFUSE_REFLECTION,
        lobe_probability: 1.0,
    })
}

fn eval_pdf_weighted<W: DiffuseWeight>(lobe: &W, omega_i: Vec3d, omega_o: Vec3d) -> f64 {
    if omega_i.z.min(omega_o.z) < lobe.min_cos_theta() {
        return 0.0;
    }
    consts::FRAC_1_PI * omega_o.z
}

macro_rules! impl_weighted_diffuse {
    ($lobe:ty) => {
        impl DiffuseReflection for $lobe {
            fn from_material(albedo: RgbD, roughness: f64, config: &BsdfConfig) -> Self {
                Self {
                    albedo,
                    roughness,
                    min_cos_theta: config.min_cos_theta,
                }
            }

            fn albedo(&self) -> RgbD {
                self.albedo
            }
        }

        impl Bxdf for $lobe {
            fn eval(&self, omega_i: Vec3d, omega_o: Vec3d) -> RgbD {
                eval_weighted(self, omega_i, omega_o)
            }

            fn sample(&self, omega_i: Vec3d, rdf: Vec3d) -> Option<SampleResponse> {
                sample_weighted(self, omega_i, rdf)
            }

            fn eval_pdf(&self, omega_i: Vec3d, omega_o: Vec3d) -> f64 {
                eval_pdf_weighted(self, omega_i, omega_o)
            }
        }
    };
}

impl_weighted_diffuse!(DisneyDiffuse);
impl_weighted_diffuse!(FrostbiteDiffuse);
