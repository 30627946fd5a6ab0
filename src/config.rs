//! Tunable constants and feature toggles of the scattering model
use serde::{Deserialize, Serialize};

/// Errors for configurations that violate the contract of the scattering model
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("min_cos_theta must be finite and in (0, 1), got {0}")]
    MinCosTheta(f64),

    #[error("min_ggx_alpha must be finite and in [0, 1), got {0}")]
    MinGgxAlpha(f64),

    #[error("failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),
}

/// How microfacet normals are importance sampled
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NormalSampling {
    /// Sample the distribution of visible normals. Lower variance.
    #[default]
    Vndf,
    /// Sample the plain normal distribution. Mainly useful for validation.
    Ndf,
}

/// Immutable configuration that is threaded through the construction of every lobe.
///
/// A renderer creates this once (e.g. when its pipeline is built) and passes the same value to
/// every [`crate::standard::StandardBsdf`] it constructs.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BsdfConfig {
    /// Directions with a cosine below this value are treated as grazing and do not scatter
    pub min_cos_theta: f64,

    /// GGX alpha values below this are treated as perfectly smooth (delta) when
    /// `enable_delta_bsdf` is set, and clamped to it otherwise
    pub min_ggx_alpha: f64,

    /// Substitute delta reflection / transmission for very smooth surfaces
    pub enable_delta_bsdf: bool,

    /// Reuse the lobe selection random number for the sampled lobe instead of consuming a
    /// fourth dimension
    pub recycle_select_samples: bool,

    /// Strategy for sampling microfacet normals
    pub normal_sampling: NormalSampling,
}

impl BsdfConfig {
    pub const DEFAULT_MIN_COS_THETA: f64 = 1e-6;
    pub const DEFAULT_MIN_GGX_ALPHA: f64 = 0.0064;

    /// Checks the contract of all numeric parameters
    ///
    /// # Errors
    /// Returns a [`ConfigError`] naming the first parameter that is out of range
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.min_cos_theta.is_finite() || self.min_cos_theta <= 0.0 || self.min_cos_theta >= 1.0
        {
            log::warn!("rejecting min_cos_theta = {}", self.min_cos_theta);
            return Err(ConfigError::MinCosTheta(self.min_cos_theta));
        }
        if !self.min_ggx_alpha.is_finite() || self.min_ggx_alpha < 0.0 || self.min_ggx_alpha >= 1.0
        {
            log::warn!("rejecting min_ggx_alpha = {}", self.min_ggx_alpha);
            return Err(ConfigError::MinGgxAlpha(self.min_ggx_alpha));
        }
        Ok(())
    }

    /// Parses and validates a configuration. Missing fields take their default values.
    ///
    /// # Errors
    /// Fails if the json is malformed or the resulting configuration does not validate
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        log::debug!("bsdf configuration: {config:?}");
        Ok(config)
    }

    /// Maps a perceptual roughness to the GGX alpha that is used by the specular lobes.
    /// A result of `0.0` means the lobes degenerate to delta lobes.
    #[must_use]
    pub fn ggx_alpha(&self, roughness: f64) -> f64 {
        let alpha = roughness * roughness;
        if self.enable_delta_bsdf {
            if alpha < self.min_ggx_alpha {
                0.0
            } else {
                alpha
            }
        } else {
            alpha.max(self.min_ggx_alpha)
        }
    }
}

impl Default for BsdfConfig {
    fn default() -> Self {
        Self {
            min_cos_theta: Self::DEFAULT_MIN_COS_THETA,
            min_ggx_alpha: Self::DEFAULT_MIN_GGX_ALPHA,
            enable_delta_bsdf: true,
            recycle_select_samples: true,
            normal_sampling: NormalSampling::Vndf,
        }
    }
}
