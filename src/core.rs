use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::config::BsdfConfig;

/// used for colors
pub type RgbD = glam::f64::DVec3;
/// used for colors
pub type RgbF = glam::f32::Vec3;

/// used for direction vectors
pub type Vec3d = glam::f64::DVec3;
/// used for direction vectors
pub type Vec2d = glam::f64::DVec2;
/// used for the random tuple handed to [`crate::standard::StandardBsdf::sample`]
pub type Vec4d = glam::f64::DVec4;

bitflags! {
    /// Flags for the scattering lobes of a surface.
    ///
    /// A material header carries a mask of the lobes that may participate; a successful
    /// [`Bxdf::sample`] reports exactly one of the single-lobe flags.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct LobeType: u32 {
        const DIFFUSE_REFLECTION = 0x01;
        const SPECULAR_REFLECTION = 0x02;
        const DELTA_REFLECTION = 0x04;

        const DIFFUSE_TRANSMISSION = 0x10;
        const SPECULAR_TRANSMISSION = 0x20;
        const DELTA_TRANSMISSION = 0x40;

        const DIFFUSE = Self::DIFFUSE_REFLECTION.bits() | Self::DIFFUSE_TRANSMISSION.bits();
        const SPECULAR = Self::SPECULAR_REFLECTION.bits() | Self::SPECULAR_TRANSMISSION.bits();
        const DELTA = Self::DELTA_REFLECTION.bits() | Self::DELTA_TRANSMISSION.bits();
        const NON_DELTA = Self::DIFFUSE.bits() | Self::SPECULAR.bits();

        const REFLECTION = Self::DIFFUSE_REFLECTION.bits()
            | Self::SPECULAR_REFLECTION.bits()
            | Self::DELTA_REFLECTION.bits();
        const TRANSMISSION = Self::DIFFUSE_TRANSMISSION.bits()
            | Self::SPECULAR_TRANSMISSION.bits()
            | Self::DELTA_TRANSMISSION.bits();

        const ALL = Self::REFLECTION.bits() | Self::TRANSMISSION.bits();
    }
}

impl LobeType {
    /// `true` if this is a singular (zero measure) scattering event
    #[must_use]
    pub const fn is_delta(self) -> bool {
        self.intersects(Self::DELTA)
    }

    /// `true` if light leaves on the opposite side of the surface
    #[must_use]
    pub const fn is_transmission(self) -> bool {
        self.intersects(Self::TRANSMISSION)
    }
}

impl Default for LobeType {
    fn default() -> Self {
        Self::ALL
    }
}

/// Contains the Data that is returned by [`Bxdf::sample`]
#[derive(Clone, Copy, Debug)]
pub struct SampleResponse {
    /// The direction to which light is scattered to (towards the light)
    pub omega_o: Vec3d,

    /// The probability density of choosing `omega_o` given `omega_i`. Always `0.0` for delta
    /// lobes since they have no finite density.
    pub pdf: f64,

    /// The Monte Carlo throughput `f(omega_i, omega_o) * |cos theta_o| / pdf`. Already contains
    /// the cosine term.
    pub weight: RgbD,

    /// The lobe that produced the sample
    pub lobe: LobeType,

    /// Probability of the discrete lobe choice that was made to produce this sample
    pub lobe_probability: f64,
}

/// A scattering lobe (or a combination of lobes) in the local shading frame.
///
/// The shading normal is the z-axis. `omega_i` points towards the viewer, `omega_o` towards
/// the light. In contrast to a plain BSDF value, [`Bxdf::eval`] already includes the
/// `|cos theta_o|` factor, so the integrator does not have to multiply it in again.
pub trait Bxdf {
    /// Returns the scattering value times `|cos theta_o|`.
    ///
    /// Returns zero for directions closer to the horizon than the minimum cosine and for lobes
    /// that are currently singular.
    fn eval(&self, omega_i: Vec3d, omega_o: Vec3d) -> RgbD;

    /// Samples an outgoing direction given the incident direction
    ///
    /// # Arguments
    /// * `omega_i` - The direction towards the viewer
    /// * `rdf` - Random floats in `0.0..1.0`. Lobes that branch internally use `z` for the
    ///   discrete choice.
    ///
    /// # Return
    /// `None` if no light can be transported along the sampled direction. See
    /// [`SampleResponse`]
    fn sample(&self, omega_i: Vec3d, rdf: Vec3d) -> Option<SampleResponse>;

    /// Returns the probability density of [`Bxdf::sample`] producing `omega_o` given `omega_i`
    fn eval_pdf(&self, omega_i: Vec3d, omega_o: Vec3d) -> f64;
}

/// A diffuse reflection model that can be plugged into [`crate::standard::StandardBsdf`].
///
/// Exactly one model is chosen per renderer configuration, as a generic parameter.
pub trait DiffuseReflection: Bxdf + Copy + std::fmt::Debug {
    /// Builds the lobe from the diffuse albedo and the (not remapped) roughness
    fn from_material(albedo: RgbD, roughness: f64, config: &BsdfConfig) -> Self;

    /// The diffuse color
    fn albedo(&self) -> RgbD;
}
