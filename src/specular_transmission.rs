//! Rough dielectric interface: GGX reflection and refraction weighted by the exact Fresnel term.
//! Degenerates to perfect reflection / refraction for smooth surfaces.
use std::marker::PhantomData;

use crate::{
    config::{BsdfConfig, NormalSampling},
    fresnel,
    microfacet::{Ggx, SmithHeightCorrelated, SmithMasking},
    utils, Bxdf, LobeType, RgbD, SampleResponse, Vec2d, Vec3d,
};

/// Stand-in for an infinite refraction pdf when the half vector jacobian degenerates
pub const PDF_SENTINEL: f64 = f64::MAX;

/// Microfacet reflection and transmission through a dielectric interface, e.g. glass or water.
///
/// The choice between reflection and refraction is made with the dielectric Fresnel term,
/// drawn from `rdf.z`. An `alpha` of exactly `0.0` turns the lobe into delta reflection and
/// delta transmission.
#[derive(Clone, Copy, Debug)]
pub struct SpecularReflectionTransmissionMicrofacet<M = SmithHeightCorrelated> {
    /// Color of the transmitted light
    pub transmission_albedo: RgbD,

    /// GGX width, see [`BsdfConfig::ggx_alpha`]
    pub alpha: f64,

    /// relative index of refraction (incident IoR / transmitted IoR)
    pub eta: f64,

    /// lobes that may be sampled
    pub active_lobes: LobeType,

    pub config: BsdfConfig,
    masking: PhantomData<M>,
}

impl<M: SmithMasking> SpecularReflectionTransmissionMicrofacet<M> {
    #[must_use]
    pub const fn new(
        transmission_albedo: RgbD,
        alpha: f64,
        eta: f64,
        active_lobes: LobeType,
        config: BsdfConfig,
    ) -> Self {
        Self {
            transmission_albedo,
            alpha,
            eta,
            active_lobes,
            config,
            masking: PhantomData,
        }
    }

    #[must_use]
    pub const fn has_lobe(&self, lobe: LobeType) -> bool {
        self.active_lobes.intersects(lobe)
    }

    #[allow(clippy::float_cmp)]
    #[must_use]
    pub fn is_delta(&self) -> bool {
        self.alpha == 0.0
    }

    const fn ggx(&self) -> Ggx {
        Ggx::new(self.alpha)
    }

    /// Perfect refraction of `omega_i` about the shading normal. `cos_theta_t` comes from
    /// [`fresnel::dielectric`].
    #[must_use]
    pub fn refract_delta(&self, omega_i: Vec3d, cos_theta_t: f64) -> Vec3d {
        Vec3d::new(-omega_i.x * self.eta, -omega_i.y * self.eta, -cos_theta_t)
    }

    /// half vector of a reflection or refraction pair, flipped into the upper hemisphere
    fn half_vector(&self, omega_i: Vec3d, omega_o: Vec3d, is_reflection: bool) -> Vec3d {
        let m = if is_reflection {
            (omega_o + omega_i).normalize()
        } else {
            (omega_o + omega_i * self.eta).normalize()
        };
        m * m.z.signum()
    }

    /// jacobian of the refraction about the half vector, clamped to a finite value
    fn refraction_pdf(&self, pdf_m: f64, i_dot_m: f64, o_dot_m: f64) -> f64 {
        #[allow(clippy::suboptimal_flops)]
        let sqrt_denom = o_dot_m + self.eta * i_dot_m;
        let denom = sqrt_denom * sqrt_denom;
        if denom > f64::MIN_POSITIVE {
            pdf_m * o_dot_m.abs() / denom
        } else {
            PDF_SENTINEL
        }
    }

    fn lobes_enabled(&self, is_reflection: bool) -> bool {
        if is_reflection {
            self.has_lobe(LobeType::SPECULAR_REFLECTION)
        } else {
            self.has_lobe(LobeType::SPECULAR_TRANSMISSION)
        }
    }

    fn sample_delta(&self, omega_i: Vec3d, lobe_sample: f64) -> Option<SampleResponse> {
        let has_reflection = self.has_lobe(LobeType::DELTA_REFLECTION);
        let has_transmission = self.has_lobe(LobeType::DELTA_TRANSMISSION);
        if !(has_reflection || has_transmission) {
            return None;
        }

        let fresnel = fresnel::dielectric(self.eta, omega_i.z);
        let f = fresnel.reflectance;

        let mut is_reflection = has_reflection;
        let mut lobe_probability = 1.0;
        if has_reflection && has_transmission {
            is_reflection = lobe_sample < f;
            lobe_probability = if is_reflection { f } else { 1.0 - f };
        } else if has_transmission && f >= 1.0 {
            return None;
        }

        let mut weight = if is_reflection {
            RgbD::ONE
        } else {
            self.transmission_albedo
        };
        if !(has_reflection && has_transmission) {
            weight *= if is_reflection { f } else { 1.0 - f };
        }

        let omega_o = if is_reflection {
            utils::mirror(omega_i)
        } else {
            self.refract_delta(omega_i, fresnel.cos_theta_t)
        };

        if omega_o.z.abs() < self.config.min_cos_theta || (omega_o.z > 0.0) != is_reflection {
            return None;
        }

        Some(SampleResponse {
            omega_o,
            pdf: 0.0,
            weight,
            lobe: if is_reflection {
                LobeType::DELTA_REFLECTION
            } else {
                LobeType::DELTA_TRANSMISSION
            },
            lobe_probability,
        })
    }
}

impl<M: SmithMasking> Bxdf for SpecularReflectionTransmissionMicrofacet<M> {
    fn eval(&self, omega_i: Vec3d, omega_o: Vec3d) -> RgbD {
        if omega_i.z.min(omega_o.z.abs()) < self.config.min_cos_theta || self.is_delta() {
            return RgbD::ZERO;
        }

        let is_reflection = omega_o.z > 0.0;
        if !self.lobes_enabled(is_reflection) {
            return RgbD::ZERO;
        }

        let ggx = self.ggx();
        let m = self.half_vector(omega_i, omega_o, is_reflection);
        let i_dot_m = omega_i.dot(m);
        let o_dot_m = omega_o.dot(m);

        if !is_reflection && (i_dot_m <= 0.0 || o_dot_m >= 0.0) {
            return RgbD::ZERO;
        }

        let ndf = ggx.ndf(m.z);
        let masking_shadowing = M::masking(ggx, omega_i.z, omega_o.z.abs());
        let f = fresnel::dielectric(self.eta, i_dot_m).reflectance;

        if is_reflection {
            RgbD::splat(f * ndf * masking_shadowing * 0.25 / omega_i.z)
        } else {
            #[allow(clippy::suboptimal_flops)]
            let sqrt_denom = o_dot_m + self.eta * i_dot_m;
            let t = self.eta * self.eta * i_dot_m * o_dot_m / (omega_i.z * sqrt_denom * sqrt_denom);
            self.transmission_albedo * ((1.0 - f) * ndf * masking_shadowing * t.abs())
        }
    }

    fn sample(&self, omega_i: Vec3d, rdf: Vec3d) -> Option<SampleResponse> {
        if omega_i.z < self.config.min_cos_theta {
            return None;
        }

        let lobe_sample = rdf.z;
        if self.is_delta() {
            return self.sample_delta(omega_i, lobe_sample);
        }

        let has_reflection = self.has_lobe(LobeType::SPECULAR_REFLECTION);
        let has_transmission = self.has_lobe(LobeType::SPECULAR_TRANSMISSION);
        if !(has_reflection || has_transmission) {
            return None;
        }

        let ggx = self.ggx();
        let rnf = Vec2d::new(rdf.x, rdf.y);
        let (m, pdf_m) = match self.config.normal_sampling {
            NormalSampling::Vndf => ggx.sample_vndf(omega_i, rnf),
            NormalSampling::Ndf => ggx.sample_ndf(rnf),
        };

        let i_dot_m = omega_i.dot(m);
        // plain NDF sampling may pick normals facing away from the viewer
        if i_dot_m <= 0.0 {
            return None;
        }
        let fresnel = fresnel::dielectric(self.eta, i_dot_m);
        let f = fresnel.reflectance;

        let mut is_reflection = has_reflection;
        if has_reflection && has_transmission {
            is_reflection = lobe_sample < f;
        } else if has_transmission && f >= 1.0 {
            return None;
        }

        #[allow(clippy::suboptimal_flops)]
        let omega_o = if is_reflection {
            utils::reflect(m, omega_i)
        } else {
            m * (self.eta * i_dot_m - fresnel.cos_theta_t) - omega_i * self.eta
        };

        if omega_o.z.abs() < self.config.min_cos_theta || (omega_o.z > 0.0) != is_reflection {
            return None;
        }

        let o_dot_m = omega_o.dot(m);
        let cos_o = omega_o.z.abs();

        let mut weight = RgbD::splat(match self.config.normal_sampling {
            NormalSampling::Vndf => M::masking_over_g1_incident(ggx, omega_i.z, cos_o),
            NormalSampling::Ndf => {
                M::masking(ggx, omega_i.z, cos_o) * i_dot_m / (omega_i.z * m.z)
            }
        });

        let mut pdf = if is_reflection {
            pdf_m / (4.0 * o_dot_m)
        } else {
            weight *= self.transmission_albedo * (self.eta * self.eta);
            self.refraction_pdf(pdf_m, i_dot_m, o_dot_m)
        };

        let choice = if is_reflection { f } else { 1.0 - f };
        let mut lobe_probability = 1.0;
        if has_reflection && has_transmission {
            pdf *= choice;
            lobe_probability = choice;
        } else {
            weight *= choice;
        }

        Some(SampleResponse {
            omega_o,
            pdf,
            weight,
            lobe: if is_reflection {
                LobeType::SPECULAR_REFLECTION
            } else {
                LobeType::SPECULAR_TRANSMISSION
            },
            lobe_probability,
        })
    }

    fn eval_pdf(&self, omega_i: Vec3d, omega_o: Vec3d) -> f64 {
        if omega_i.z.min(omega_o.z.abs()) < self.config.min_cos_theta || self.is_delta() {
            return 0.0;
        }

        let is_reflection = omega_o.z > 0.0;
        let has_reflection = self.has_lobe(LobeType::SPECULAR_REFLECTION);
        let has_transmission = self.has_lobe(LobeType::SPECULAR_TRANSMISSION);
        if !self.lobes_enabled(is_reflection) {
            return 0.0;
        }

        let ggx = self.ggx();
        let m = self.half_vector(omega_i, omega_o, is_reflection);
        let i_dot_m = omega_i.dot(m);
        let o_dot_m = omega_o.dot(m);

        let f = fresnel::dielectric(self.eta, i_dot_m).reflectance;

        let pdf_m = match self.config.normal_sampling {
            NormalSampling::Vndf => ggx.pdf_vndf(omega_i, m),
            NormalSampling::Ndf => ggx.pdf_ndf(m.z),
        };

        let mut pdf = if is_reflection {
            pdf_m / (4.0 * o_dot_m)
        } else {
            // refraction needs the light to cross the microfacet
            if i_dot_m <= 0.0 || o_dot_m >= 0.0 {
                return 0.0;
            }
            self.refraction_pdf(pdf_m, i_dot_m, o_dot_m)
        };

        if has_reflection && has_transmission {
            pdf *= if is_reflection { f } else { 1.0 - f };
        }
        pdf
    }
}
