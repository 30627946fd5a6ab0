//! The resolved material parameters of a single shading point
use serde::{Deserialize, Serialize};

use crate::{config::BsdfConfig, utils::VecExt, utils::SafeCast, LobeType, RgbF};

/// Parameter block of the standard material, produced by an external material evaluation step.
///
/// Values are stored as [f32]s and widened to [f64] when a
/// [`crate::standard::StandardBsdf`] is built. All colors should be in \[0,1\].
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StandardBsdfData {
    /// Diffuse albedo
    pub diffuse: RgbF,

    /// Specular reflectance at normal incidence (`F0`)
    pub specular: RgbF,

    /// Perceptual roughness in \[0,1\]. The GGX alpha is `roughness^2`.
    pub roughness: f32,

    /// Metallic parameter. Blends between dielectric and conducting behavior.
    pub metallic: f32,

    /// Relative index of refraction (incident IoR / transmitted IoR)
    pub eta: f32,

    /// Transmission color
    pub transmission: RgbF,

    /// Diffuse transmission, blends between diffuse reflection and transmission lobes
    pub diffuse_transmission: f32,

    /// Specular transmission, blends between opaque dielectric and glass lobes
    pub specular_transmission: f32,
}

impl Default for StandardBsdfData {
    fn default() -> Self {
        Self {
            diffuse: RgbF::splat(0.8),
            specular: RgbF::splat(0.04),
            roughness: 0.5,
            metallic: 0.0,
            eta: 1.0 / 1.5,
            transmission: RgbF::ONE,
            diffuse_transmission: 0.0,
            specular_transmission: 0.0,
        }
    }
}

impl StandardBsdfData {
    /// Returns the set of lobes this parameter block is able to produce.
    ///
    /// Very smooth surfaces produce delta lobes instead of specular ones. A relative index of
    /// refraction of exactly one always refracts as a delta lobe since the light passes straight
    /// through.
    #[must_use]
    pub fn lobe_types(&self, config: &BsdfConfig) -> LobeType {
        #[allow(clippy::float_cmp)]
        let is_delta = config.ggx_alpha(f64::from(self.roughness)) == 0.0;
        let diffuse_weight = self.diffuse.safe_cast().luminance();
        let specular_transmission = f64::from(self.specular_transmission);
        let diffuse_transmission = f64::from(self.diffuse_transmission);

        let mut lobes = if is_delta {
            LobeType::DELTA_REFLECTION
        } else {
            LobeType::SPECULAR_REFLECTION
        };

        if diffuse_weight > 0.0 && specular_transmission < 1.0 {
            if diffuse_transmission < 1.0 {
                lobes |= LobeType::DIFFUSE_REFLECTION;
            }
            if diffuse_transmission > 0.0 {
                lobes |= LobeType::DIFFUSE_TRANSMISSION;
            }
        }

        #[allow(clippy::float_cmp)]
        if specular_transmission > 0.0 {
            lobes |= if is_delta || self.eta == 1.0 {
                LobeType::DELTA_TRANSMISSION
            } else {
                LobeType::SPECULAR_TRANSMISSION
            };
        }
        lobes
    }
}

/// Per material flags that do not vary over the surface
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MaterialHeader {
    /// The surface has no interior, light crosses the interface only once
    pub thin_surface: bool,

    /// Never report delta lobes to [`crate::standard::StandardBsdf::eval_delta_lobes`]
    pub exclude_from_delta_extraction: bool,

    /// Lobes that may participate in scattering
    pub active_lobes: LobeType,
}

impl Default for MaterialHeader {
    fn default() -> Self {
        Self {
            thin_surface: false,
            exclude_from_delta_extraction: false,
            active_lobes: LobeType::ALL,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{MaterialHeader, StandardBsdfData};
    use crate::{config::BsdfConfig, LobeType, RgbF};

    #[test]
    fn opaque_dielectric_lobes() {
        let data = StandardBsdfData::default();
        let lobes = data.lobe_types(&BsdfConfig::default());
        assert_eq!(
            lobes,
            LobeType::DIFFUSE_REFLECTION | LobeType::SPECULAR_REFLECTION
        );
    }

    #[test]
    fn smooth_glass_lobes() {
        let data = StandardBsdfData {
            roughness: 0.0,
            specular_transmission: 1.0,
            ..Default::default()
        };
        let lobes = data.lobe_types(&BsdfConfig::default());
        assert_eq!(lobes, LobeType::DELTA);

        // without delta lobes the surface stays (barely) rough
        let config = BsdfConfig {
            enable_delta_bsdf: false,
            ..Default::default()
        };
        assert_eq!(data.lobe_types(&config), LobeType::SPECULAR);
    }

    #[test]
    fn diffuse_transmission_lobes() {
        let data = StandardBsdfData {
            diffuse_transmission: 1.0,
            ..Default::default()
        };
        let lobes = data.lobe_types(&BsdfConfig::default());
        assert!(lobes.contains(LobeType::DIFFUSE_TRANSMISSION));
        assert!(!lobes.contains(LobeType::DIFFUSE_REFLECTION));

        let black = StandardBsdfData {
            diffuse: RgbF::ZERO,
            diffuse_transmission: 0.5,
            ..Default::default()
        };
        assert!(!black.lobe_types(&BsdfConfig::default()).intersects(LobeType::DIFFUSE));
    }

    #[test]
    fn matched_media_transmits_straight() {
        let data = StandardBsdfData {
            eta: 1.0,
            specular_transmission: 0.5,
            ..Default::default()
        };
        let lobes = data.lobe_types(&BsdfConfig::default());
        assert!(lobes.contains(LobeType::DELTA_TRANSMISSION));
        assert!(lobes.contains(LobeType::SPECULAR_REFLECTION));
    }

    #[test]
    fn json_material() {
        let data: StandardBsdfData =
            serde_json::from_str(r#"{ "diffuse": [0.1, 0.2, 0.3], "metallic": 1.0 }"#).unwrap();
        assert_eq!(data.diffuse, RgbF::new(0.1, 0.2, 0.3));
        assert_eq!(data.metallic, 1.0);
        assert_eq!(data.roughness, StandardBsdfData::default().roughness);

        let header: MaterialHeader =
            serde_json::from_str(r#"{
                "thin_surface": true,
                "active_lobes": "DIFFUSE_REFLECTION | SPECULAR_REFLECTION"
            }"#)
            .unwrap();
        assert!(header.thin_surface);
        assert_eq!(
            header.active_lobes,
            LobeType::DIFFUSE_REFLECTION | LobeType::SPECULAR_REFLECTION
        );

        let json = serde_json::to_string(&header).unwrap();
        assert_eq!(serde_json::from_str::<MaterialHeader>(&json).unwrap(), header);
    }
}
