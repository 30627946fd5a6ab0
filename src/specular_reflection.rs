//! GGX specular reflection with a Schlick Fresnel term. Degenerates to a perfect mirror for
//! smooth surfaces.
use std::marker::PhantomData;

use crate::{
    config::{BsdfConfig, NormalSampling},
    fresnel,
    microfacet::{Ggx, SmithHeightCorrelated, SmithMasking},
    utils, Bxdf, LobeType, RgbD, SampleResponse, Vec2d, Vec3d,
};

/// Microfacet reflection lobe, e.g. for metals or the coating of plastics.
///
/// An `alpha` of exactly `0.0` turns the lobe into a delta reflection: [`Bxdf::eval`] and
/// [`Bxdf::eval_pdf`] return zero and [`Bxdf::sample`] returns the mirror direction.
#[derive(Clone, Copy, Debug)]
pub struct SpecularReflectionMicrofacet<M = SmithHeightCorrelated> {
    /// The `F0` color
    pub albedo: RgbD,

    /// GGX width, see [`BsdfConfig::ggx_alpha`]
    pub alpha: f64,

    /// lobes that may be sampled. Needs [`LobeType::SPECULAR_REFLECTION`] or
    /// [`LobeType::DELTA_REFLECTION`] depending on `alpha`
    pub active_lobes: LobeType,

    pub config: BsdfConfig,
    masking: PhantomData<M>,
}

impl<M: SmithMasking> SpecularReflectionMicrofacet<M> {
    #[must_use]
    pub const fn new(albedo: RgbD, alpha: f64, active_lobes: LobeType, config: BsdfConfig) -> Self {
        Self {
            albedo,
            alpha,
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

    fn sample_delta(&self, omega_i: Vec3d) -> Option<SampleResponse> {
        if !self.has_lobe(LobeType::DELTA_REFLECTION) {
            return None;
        }
        Some(SampleResponse {
            omega_o: utils::mirror(omega_i),
            pdf: 0.0,
            weight: fresnel::schlick(self.albedo, RgbD::ONE, omega_i.z),
            lobe: LobeType::DELTA_REFLECTION,
            lobe_probability: 1.0,
        })
    }
}

impl<M: SmithMasking> Bxdf for SpecularReflectionMicrofacet<M> {
    fn eval(&self, omega_i: Vec3d, omega_o: Vec3d) -> RgbD {
        if omega_i.z.min(omega_o.z) < self.config.min_cos_theta
            || self.is_delta()
            || !self.has_lobe(LobeType::SPECULAR_REFLECTION)
        {
            return RgbD::ZERO;
        }

        let ggx = self.ggx();
        let m = (omega_i + omega_o).normalize();
        let i_dot_m = omega_i.dot(m);

        let ndf = ggx.ndf(m.z);
        let masking_shadowing = M::masking(ggx, omega_i.z, omega_o.z);
        let fresnel = fresnel::schlick(self.albedo, RgbD::ONE, i_dot_m);

        // the 1 / cos(theta_o) of the BRDF cancels with the cosine term
        fresnel * (ndf * masking_shadowing * 0.25 / omega_i.z)
    }

    fn sample(&self, omega_i: Vec3d, rdf: Vec3d) -> Option<SampleResponse> {
        if omega_i.z < self.config.min_cos_theta {
            return None;
        }
        if self.is_delta() {
            return self.sample_delta(omega_i);
        }
        if !self.has_lobe(LobeType::SPECULAR_REFLECTION) {
            return None;
        }

        let ggx = self.ggx();
        let rnf = Vec2d::new(rdf.x, rdf.y);
        let (m, pdf_m) = match self.config.normal_sampling {
            NormalSampling::Vndf => ggx.sample_vndf(omega_i, rnf),
            NormalSampling::Ndf => ggx.sample_ndf(rnf),
        };

        let i_dot_m = omega_i.dot(m);
        let omega_o = utils::reflect(m, omega_i);
        if omega_o.z < self.config.min_cos_theta {
            return None;
        }

        let fresnel = fresnel::schlick(self.albedo, RgbD::ONE, i_dot_m);
        let weight = match self.config.normal_sampling {
            NormalSampling::Vndf => {
                fresnel * M::masking_over_g1_incident(ggx, omega_i.z, omega_o.z)
            }
            NormalSampling::Ndf => {
                let masking_shadowing = M::masking(ggx, omega_i.z, omega_o.z);
                fresnel * (masking_shadowing * i_dot_m / (omega_i.z * m.z))
            }
        };

        Some(SampleResponse {
            omega_o,
            // jacobian of the reflection about m
            pdf: pdf_m / (4.0 * i_dot_m),
            weight,
            lobe: LobeType::SPECULAR_REFLECTION,
            lobe_probability: 1.0,
        })
    }

    fn eval_pdf(&self, omega_i: Vec3d, omega_o: Vec3d) -> f64 {
        if omega_i.z.min(omega_o.z) < self.config.min_cos_theta
            || self.is_delta()
            || !self.has_lobe(LobeType::SPECULAR_REFLECTION)
        {
            return 0.0;
        }

        let ggx = self.ggx();
        let m = (omega_i + omega_o).normalize();
        let i_dot_m = omega_i.dot(m);
        let pdf_m = match self.config.normal_sampling {
            NormalSampling::Vndf => ggx.pdf_vndf(omega_i, m),
            NormalSampling::Ndf => ggx.pdf_ndf(m.z),
        };
        pdf_m / (4.0 * i_dot_m)
    }
}

#[cfg(test)]
mod tests {
    use super::SpecularReflectionMicrofacet;
    use crate::{
        config::{BsdfConfig, NormalSampling},
        fresnel,
        microfacet::{SmithHeightCorrelated, SmithSeparable},
        test_utils::{self, assert_eq_approx},
        Bxdf, LobeType, RgbD, Vec3d,
    };

    fn metal(alpha: f64, config: BsdfConfig) -> SpecularReflectionMicrofacet {
        SpecularReflectionMicrofacet::new(RgbD::new(0.9, 0.6, 0.3), alpha, LobeType::ALL, config)
    }

    #[test]
    fn specular_reflection() {
        for alpha in [0.01, 0.1, 0.5, 1.0] {
            let mat = metal(alpha, BsdfConfig::default());
            test_utils::test_bxdf_sample_eval(&mat);
            test_utils::test_bxdf_non_negative(&mat);
        }
    }

    #[test]
    fn specular_reflection_ndf_sampling() {
        let config = BsdfConfig {
            normal_sampling: NormalSampling::Ndf,
            ..Default::default()
        };
        for alpha in [0.1, 0.5] {
            let mat = metal(alpha, config);
            test_utils::test_bxdf_sample_eval(&mat);
        }
    }

    #[test]
    fn separable_masking() {
        let mat = SpecularReflectionMicrofacet::<SmithSeparable>::new(
            RgbD::ONE,
            0.3,
            LobeType::ALL,
            BsdfConfig::default(),
        );
        test_utils::test_bxdf_sample_eval(&mat);
    }

    #[test]
    fn pdf_integral() {
        for normal_sampling in [NormalSampling::Vndf, NormalSampling::Ndf] {
            let config = BsdfConfig {
                normal_sampling,
                ..Default::default()
            };
            test_utils::test_integrate_inverse_pdf(&metal(0.3, config));
        }
    }

    #[test]
    fn reciprocity() {
        let mat = SpecularReflectionMicrofacet::<SmithHeightCorrelated>::new(
            RgbD::ONE * 0.5,
            0.4,
            LobeType::ALL,
            BsdfConfig::default(),
        );
        let mut rd = fastrand::Rng::with_seed(31);
        for _ in 0..10_000 {
            let omega_i = test_utils::hemispherical_sample(&mut rd);
            let omega_o = test_utils::hemispherical_sample(&mut rd);
            // eval contains cos(theta_o), divide it out on both sides
            let forward = mat.eval(omega_i, omega_o) * omega_i.z;
            let backward = mat.eval(omega_o, omega_i) * omega_o.z;
            assert_eq_approx!(forward, backward, RgbD::splat(1e-9), RgbD::splat(1e-6));
        }
    }

    #[test]
    fn energy_conservation() {
        // a white conductor can only lose energy (single scattering)
        for alpha in [0.05, 0.3, 0.8] {
            let mat = SpecularReflectionMicrofacet::<SmithHeightCorrelated>::new(
                RgbD::ONE,
                alpha,
                LobeType::ALL,
                BsdfConfig::default(),
            );
            test_utils::test_energy_conservation(&mat, 0.7);
        }
    }

    #[test]
    fn delta_reflection() {
        let mat = metal(0.0, BsdfConfig::default());
        let omega_i = Vec3d::new(0.3, -0.2, 0.7).normalize();
        let sample = mat.sample(omega_i, Vec3d::splat(0.5)).unwrap();
        assert_eq!(sample.lobe, LobeType::DELTA_REFLECTION);
        assert_eq!(sample.pdf, 0.0);
        assert_eq!(sample.omega_o, Vec3d::new(-omega_i.x, -omega_i.y, omega_i.z));
        assert_eq_approx!(
            sample.weight,
            fresnel::schlick(mat.albedo, RgbD::ONE, omega_i.z),
            RgbD::splat(1e-12),
            RgbD::splat(1e-12)
        );
        assert_eq!(mat.eval(omega_i, sample.omega_o), RgbD::ZERO);
        assert_eq!(mat.eval_pdf(omega_i, sample.omega_o), 0.0);
    }

    #[test]
    fn delta_reflection_needs_flag() {
        let mat = SpecularReflectionMicrofacet::<SmithHeightCorrelated>::new(
            RgbD::ONE,
            0.0,
            LobeType::SPECULAR_REFLECTION,
            BsdfConfig::default(),
        );
        assert!(mat.sample(Vec3d::Z, Vec3d::splat(0.5)).is_none());

        let mat = SpecularReflectionMicrofacet::<SmithHeightCorrelated>::new(
            RgbD::ONE,
            0.2,
            LobeType::DELTA_REFLECTION,
            BsdfConfig::default(),
        );
        assert!(mat.sample(Vec3d::Z, Vec3d::splat(0.5)).is_none());
        assert_eq!(mat.eval(Vec3d::Z, Vec3d::Z), RgbD::ZERO);
    }
}
