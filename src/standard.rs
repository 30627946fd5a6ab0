//! The standard material: a weighted mixture of diffuse reflection, diffuse transmission,
//! specular reflection and dielectric reflection/transmission.
//!
//! The lobes are mixed with fixed fractions taken from the material parameters, while lobe
//! selection during sampling follows a separate set of probabilities that approximate how much
//! light each lobe reflects. The returned sample weights account for both.
use crate::{
    config::BsdfConfig,
    delta::{DeltaLobe, DeltaLobes},
    disney::FrostbiteDiffuse,
    fresnel,
    frame::ShadingFrame,
    lambert::LambertTransmission,
    material::{MaterialHeader, StandardBsdfData},
    microfacet::{SmithHeightCorrelated, SmithMasking},
    specular_reflection::SpecularReflectionMicrofacet,
    specular_transmission::SpecularReflectionTransmissionMicrofacet,
    utils::{SafeCast, VecExt},
    Bxdf, DiffuseReflection, LobeType, RgbD, SampleResponse, Vec3d, Vec4d,
};

/// largest float below one, recycled samples are clamped to it
const ONE_MINUS_EPSILON: f64 = 1.0 - f64::EPSILON / 2.0;

/// The four lobes of [`StandardBsdf`], in the order in which they partition the selection
/// interval
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Lobe {
    DiffuseReflection,
    DiffuseTransmission,
    SpecularReflection,
    SpecularReflectionTransmission,
}

impl Lobe {
    const ALL: [Self; 4] = [
        Self::DiffuseReflection,
        Self::DiffuseTransmission,
        Self::SpecularReflection,
        Self::SpecularReflectionTransmission,
    ];

    /// lobes whose density may overlap with this one. Reflection-only and transmission-only
    /// lobes never do.
    const fn overlapping(self) -> &'static [Self] {
        match self {
            Self::DiffuseReflection => &[
                Self::SpecularReflection,
                Self::SpecularReflectionTransmission,
            ],
            Self::DiffuseTransmission => &[Self::SpecularReflectionTransmission],
            Self::SpecularReflection => &[
                Self::DiffuseReflection,
                Self::SpecularReflectionTransmission,
            ],
            Self::SpecularReflectionTransmission => &[
                Self::DiffuseReflection,
                Self::DiffuseTransmission,
                Self::SpecularReflection,
            ],
        }
    }
}

/// Normalized probabilities of selecting each lobe in [`StandardBsdf::sample`]. They sum to one,
/// or are all zero if the surface can not scatter light towards the viewer.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct LobeProbabilities {
    pub diffuse_reflection: f64,
    pub diffuse_transmission: f64,
    pub specular_reflection: f64,
    pub specular_reflection_transmission: f64,
}

impl LobeProbabilities {
    #[must_use]
    pub fn sum(&self) -> f64 {
        self.diffuse_reflection
            + self.diffuse_transmission
            + self.specular_reflection
            + self.specular_reflection_transmission
    }

    const fn get(&self, lobe: Lobe) -> f64 {
        match lobe {
            Lobe::DiffuseReflection => self.diffuse_reflection,
            Lobe::DiffuseTransmission => self.diffuse_transmission,
            Lobe::SpecularReflection => self.specular_reflection,
            Lobe::SpecularReflectionTransmission => self.specular_reflection_transmission,
        }
    }

    fn normalized(self) -> Self {
        let sum = self.sum();
        if sum > 0.0 {
            let norm = 1.0 / sum;
            Self {
                diffuse_reflection: self.diffuse_reflection * norm,
                diffuse_transmission: self.diffuse_transmission * norm,
                specular_reflection: self.specular_reflection * norm,
                specular_reflection_transmission: self.specular_reflection_transmission * norm,
            }
        } else {
            Self::default()
        }
    }

    /// Finds the lobe whose interval contains `u` and returns it with the lower end of the
    /// interval
    fn select(&self, u: f64) -> Option<(Lobe, f64)> {
        let mut lower = 0.0;
        let mut last = None;
        for lobe in Lobe::ALL {
            let p = self.get(lobe);
            let upper = lower + p;
            if u < upper {
                return Some((lobe, lower));
            }
            if p > 0.0 {
                last = Some((lobe, lower));
            }
            lower = upper;
        }
        // rounding may leave a gap below one, it belongs to the last lobe that can be chosen
        last
    }
}

/// Approximate albedos of the lobes, e.g. for denoiser guide buffers
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct BsdfProperties {
    /// perceptual roughness
    pub roughness: f64,
    pub diffuse_reflection_albedo: RgbD,
    pub diffuse_transmission_albedo: RgbD,
    pub specular_reflection_albedo: RgbD,
    pub specular_transmission_albedo: RgbD,
    /// `F0` of the material, not weighted by any fraction
    pub specular_reflectance: RgbD,
    pub is_transmissive: bool,
}

/// The composite scattering function of the standard material at one shading point.
///
/// Built fresh for every shading point from the material parameters, the shading normal and the
/// view direction. All queries work in the local frame, see [`StandardBsdf::frame`].
///
/// `D` selects the diffuse reflection model and `M` the Smith masking function of both specular
/// lobes.
#[derive(Clone, Copy, Debug)]
pub struct StandardBsdf<D = FrostbiteDiffuse, M = SmithHeightCorrelated> {
    diffuse_reflection: D,
    diffuse_transmission: LambertTransmission,
    specular_reflection: SpecularReflectionMicrofacet<M>,
    specular_reflection_transmission: SpecularReflectionTransmissionMicrofacet<M>,

    diff_trans: f64,
    spec_trans: f64,
    probabilities: LobeProbabilities,

    exclude_from_delta_extraction: bool,
    roughness: f64,
    specular_reflectance: RgbD,

    omega_i: Vec3d,
    frame: ShadingFrame,
    config: BsdfConfig,
}

impl<D: DiffuseReflection, M: SmithMasking> StandardBsdf<D, M> {
    /// Sets up the lobes and their selection probabilities.
    ///
    /// # Arguments
    /// * `normal` - world space shading normal (normalized)
    /// * `view` - world space direction towards the viewer (normalized)
    #[must_use]
    pub fn new(
        header: MaterialHeader,
        normal: Vec3d,
        view: Vec3d,
        data: &StandardBsdfData,
        config: &BsdfConfig,
    ) -> Self {
        let frame = ShadingFrame::from_normal(normal);
        let omega_i = frame.to_local(view);
        let active_lobes = header.active_lobes;

        let diffuse: RgbD = data.diffuse.safe_cast();
        let specular: RgbD = data.specular.safe_cast();
        let transmission: RgbD = data.transmission.safe_cast();
        let roughness = f64::from(data.roughness);
        let metallic = f64::from(data.metallic);
        let eta = f64::from(data.eta);
        let diff_trans = f64::from(data.diffuse_transmission);
        let spec_trans = f64::from(data.specular_transmission);

        // solid objects are entered and left, so each crossing takes the square root
        let transmission_albedo = if header.thin_surface {
            transmission
        } else {
            transmission.sqrt()
        };

        let alpha = config.ggx_alpha(roughness);
        // a rough interface between equal media is ill-defined, it becomes a delta lobe
        #[allow(clippy::float_cmp)]
        let transmission_alpha = if eta == 1.0 { 0.0 } else { alpha };

        let probabilities = if omega_i.z < config.min_cos_theta {
            LobeProbabilities::default()
        } else {
            let dielectric = (1.0 - metallic) * (1.0 - spec_trans);
            let diffuse_weight = diffuse.luminance();
            let specular_weight = fresnel::schlick(specular, RgbD::ONE, omega_i.z).luminance();

            let gate = |lobes: LobeType, p: f64| {
                if active_lobes.intersects(lobes) {
                    p
                } else {
                    0.0
                }
            };
            LobeProbabilities {
                diffuse_reflection: gate(
                    LobeType::DIFFUSE_REFLECTION,
                    diffuse_weight * dielectric * (1.0 - diff_trans),
                ),
                diffuse_transmission: gate(
                    LobeType::DIFFUSE_TRANSMISSION,
                    diffuse_weight * dielectric * diff_trans,
                ),
                specular_reflection: gate(
                    LobeType::SPECULAR_REFLECTION | LobeType::DELTA_REFLECTION,
                    specular_weight * (1.0 - spec_trans),
                ),
                specular_reflection_transmission: gate(
                    LobeType::SPECULAR | LobeType::DELTA,
                    spec_trans,
                ),
            }
            .normalized()
        };

        Self {
            diffuse_reflection: D::from_material(diffuse, roughness, config),
            diffuse_transmission: LambertTransmission::new(transmission_albedo, config),
            specular_reflection: SpecularReflectionMicrofacet::new(
                specular,
                alpha,
                active_lobes,
                *config,
            ),
            specular_reflection_transmission: SpecularReflectionTransmissionMicrofacet::new(
                transmission_albedo,
                transmission_alpha,
                eta,
                active_lobes,
                *config,
            ),
            diff_trans,
            spec_trans,
            probabilities,
            exclude_from_delta_extraction: header.exclude_from_delta_extraction,
            roughness,
            specular_reflectance: specular,
            omega_i,
            frame,
            config: *config,
        }
    }

    /// The view direction in the local frame
    #[must_use]
    pub const fn omega_i(&self) -> Vec3d {
        self.omega_i
    }

    #[must_use]
    pub const fn frame(&self) -> &ShadingFrame {
        &self.frame
    }

    #[must_use]
    pub const fn lobe_probabilities(&self) -> LobeProbabilities {
        self.probabilities
    }

    /// fraction with which a lobe contributes to the mixture
    fn mixing_fraction(&self, lobe: Lobe) -> f64 {
        match lobe {
            Lobe::DiffuseReflection => (1.0 - self.spec_trans) * (1.0 - self.diff_trans),
            Lobe::DiffuseTransmission => (1.0 - self.spec_trans) * self.diff_trans,
            Lobe::SpecularReflection => 1.0 - self.spec_trans,
            Lobe::SpecularReflectionTransmission => self.spec_trans,
        }
    }

    fn lobe_eval(&self, lobe: Lobe, omega_i: Vec3d, omega_o: Vec3d) -> RgbD {
        match lobe {
            Lobe::DiffuseReflection => self.diffuse_reflection.eval(omega_i, omega_o),
            Lobe::DiffuseTransmission => self.diffuse_transmission.eval(omega_i, omega_o),
            Lobe::SpecularReflection => self.specular_reflection.eval(omega_i, omega_o),
            Lobe::SpecularReflectionTransmission => {
                self.specular_reflection_transmission.eval(omega_i, omega_o)
            }
        }
    }

    fn lobe_sample(&self, lobe: Lobe, omega_i: Vec3d, rdf: Vec3d) -> Option<SampleResponse> {
        match lobe {
            Lobe::DiffuseReflection => self.diffuse_reflection.sample(omega_i, rdf),
            Lobe::DiffuseTransmission => self.diffuse_transmission.sample(omega_i, rdf),
            Lobe::SpecularReflection => self.specular_reflection.sample(omega_i, rdf),
            Lobe::SpecularReflectionTransmission => {
                self.specular_reflection_transmission.sample(omega_i, rdf)
            }
        }
    }

    fn lobe_pdf(&self, lobe: Lobe, omega_i: Vec3d, omega_o: Vec3d) -> f64 {
        match lobe {
            Lobe::DiffuseReflection => self.diffuse_reflection.eval_pdf(omega_i, omega_o),
            Lobe::DiffuseTransmission => self.diffuse_transmission.eval_pdf(omega_i, omega_o),
            Lobe::SpecularReflection => self.specular_reflection.eval_pdf(omega_i, omega_o),
            Lobe::SpecularReflectionTransmission => self
                .specular_reflection_transmission
                .eval_pdf(omega_i, omega_o),
        }
    }

    /// Random numbers handed to the selected lobe. With recycling, the selection number is
    /// rescaled from the lobe's interval back to `0.0..1.0`.
    fn lobe_random(&self, u: Vec4d, lower: f64, probability: f64) -> Vec3d {
        if self.config.recycle_select_samples {
            let z = ((u.z - lower) / probability).clamp(0.0, ONE_MINUS_EPSILON);
            Vec3d::new(u.x, u.y, z)
        } else {
            Vec3d::new(u.x, u.y, u.w)
        }
    }

    /// Returns the value of the mixture times `|cos theta_o|`
    #[must_use]
    pub fn eval(&self, omega_i: Vec3d, omega_o: Vec3d) -> RgbD {
        Lobe::ALL
            .into_iter()
            .filter(|&lobe| self.probabilities.get(lobe) > 0.0)
            .map(|lobe| self.lobe_eval(lobe, omega_i, omega_o) * self.mixing_fraction(lobe))
            .sum()
    }

    /// Samples a lobe and then an outgoing direction from it.
    ///
    /// # Arguments
    /// * `omega_i` - The direction towards the viewer in the local frame
    /// * `u` - Random floats in `0.0..1.0`. `x` and `y` go to the selected lobe, `z` selects the
    ///   lobe. `w` is the lobe's own discrete choice unless the selection sample is recycled.
    ///
    /// # Return
    /// The pdf is the density of the whole mixture, and `0.0` if a delta lobe fired.
    /// `lobe_probability` is the product of the lobe selection probability and the lobe's
    /// internal choice.
    #[must_use]
    pub fn sample(&self, omega_i: Vec3d, u: Vec4d) -> Option<SampleResponse> {
        let (lobe, lower) = self.probabilities.select(u.z)?;
        let probability = self.probabilities.get(lobe);

        let mut response =
            self.lobe_sample(lobe, omega_i, self.lobe_random(u, lower, probability))?;

        response.weight *= self.mixing_fraction(lobe) / probability;
        response.pdf *= probability;
        response.lobe_probability *= probability;

        if response.lobe.is_delta() {
            response.pdf = 0.0;
            return Some(response);
        }

        for &other in lobe.overlapping() {
            let p = self.probabilities.get(other);
            if p > 0.0 {
                response.pdf += p * self.lobe_pdf(other, omega_i, response.omega_o);
            }
        }
        Some(response)
    }

    /// Density of [`StandardBsdf::sample`] producing `omega_o`
    #[must_use]
    pub fn eval_pdf(&self, omega_i: Vec3d, omega_o: Vec3d) -> f64 {
        Lobe::ALL
            .into_iter()
            .map(|lobe| (lobe, self.probabilities.get(lobe)))
            .filter(|&(_, p)| p > 0.0)
            .map(|(lobe, p)| p * self.lobe_pdf(lobe, omega_i, omega_o))
            .sum()
    }

    /// Returns the delta lobes of this surface and the selection probability of all other lobes.
    ///
    /// Each delta lobe carries its throughput, the Fresnel weighted albedo times the selection
    /// probability of the specular lobe it comes from, and its own selection probability.
    /// Nothing is reported if the surface has no specular lobes or is excluded from delta
    /// extraction. A delta lobe whose flag is not active is neither listed nor counted as
    /// non-delta, since sampling it always fails.
    #[must_use]
    pub fn eval_delta_lobes(&self, omega_i: Vec3d) -> DeltaLobes {
        let p = self.probabilities;
        let mut lobes = DeltaLobes::new(p.diffuse_reflection + p.diffuse_transmission);

        #[allow(clippy::float_cmp)]
        if p.specular_reflection + p.specular_reflection_transmission == 0.0
            || self.exclude_from_delta_extraction
        {
            return lobes;
        }

        let mut reflection = DeltaLobe {
            omega_o: Vec3d::new(-omega_i.x, -omega_i.y, omega_i.z),
            lobe: LobeType::DELTA_REFLECTION,
            ..Default::default()
        };
        let mut transmission = DeltaLobe {
            lobe: LobeType::DELTA_TRANSMISSION,
            ..Default::default()
        };

        if self.specular_reflection.is_delta() && p.specular_reflection > 0.0 {
            if self.specular_reflection.has_lobe(LobeType::DELTA_REFLECTION) {
                reflection.probability = p.specular_reflection;
                reflection.thp =
                    fresnel::schlick(self.specular_reflection.albedo, RgbD::ONE, omega_i.z)
                        * p.specular_reflection;
            }
        } else {
            lobes.non_delta_part += p.specular_reflection;
        }

        let srt = &self.specular_reflection_transmission;
        if srt.is_delta() && p.specular_reflection_transmission > 0.0 {
            let fresnel = fresnel::dielectric(srt.eta, omega_i.z);
            let f = fresnel.reflectance;
            let p_srt = p.specular_reflection_transmission;

            if srt.has_lobe(LobeType::DELTA_REFLECTION) {
                reflection.probability += p_srt * f;
                reflection.thp += RgbD::splat(f * p_srt);
            }
            if srt.has_lobe(LobeType::DELTA_TRANSMISSION) {
                transmission.omega_o = srt.refract_delta(omega_i, fresnel.cos_theta_t);
                transmission.probability = p_srt * (1.0 - f);
                transmission.thp = srt.transmission_albedo * ((1.0 - f) * p_srt);
            }
        } else {
            lobes.non_delta_part += p.specular_reflection_transmission;
        }

        for lobe in [reflection, transmission] {
            if lobe.probability > 0.0 {
                lobes.push(lobe);
            }
        }
        lobes
    }

    /// Approximate albedos from the mixing fractions and lobe colors
    #[must_use]
    pub fn properties(&self) -> BsdfProperties {
        BsdfProperties {
            roughness: self.roughness,
            diffuse_reflection_albedo: self.diffuse_reflection.albedo()
                * self.mixing_fraction(Lobe::DiffuseReflection),
            diffuse_transmission_albedo: self.diffuse_transmission.albedo
                * self.mixing_fraction(Lobe::DiffuseTransmission),
            specular_reflection_albedo: self.specular_reflection.albedo
                * self.mixing_fraction(Lobe::SpecularReflection),
            specular_transmission_albedo: self.specular_reflection_transmission.transmission_albedo
                * self.mixing_fraction(Lobe::SpecularReflectionTransmission),
            specular_reflectance: self.specular_reflectance,
            is_transmissive: self.diff_trans > 0.0 || self.spec_trans > 0.0,
        }
    }
}
