//! Singular scattering events, extracted for a denoiser that handles them separately
use crate::{LobeType, RgbD, Vec3d};

/// Upper bound of delta lobes a surface can produce: one reflection and one transmission
pub const MAX_DELTA_LOBES: usize = 2;

/// A single delta lobe, e.g. the mirror reflection of a smooth coating
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DeltaLobe {
    /// throughput of the event (the Fresnel weighted albedo times the selection probability of
    /// the specular lobe it stems from)
    pub thp: RgbD,

    /// direction of the scattered light in the local frame
    pub omega_o: Vec3d,

    /// probability that [`crate::standard::StandardBsdf::sample`] chooses this event
    pub probability: f64,

    /// [`LobeType::DELTA_REFLECTION`] or [`LobeType::DELTA_TRANSMISSION`]
    pub lobe: LobeType,
}

impl DeltaLobe {
    const NONE: Self = Self {
        thp: RgbD::ZERO,
        omega_o: Vec3d::ZERO,
        probability: 0.0,
        lobe: LobeType::empty(),
    };
}

impl Default for DeltaLobe {
    fn default() -> Self {
        Self::NONE
    }
}

/// Fixed capacity list of delta lobes plus the probability mass of everything else
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct DeltaLobes {
    lobes: [DeltaLobe; MAX_DELTA_LOBES],
    count: usize,

    /// Probability that sampling picks a lobe with a finite density
    pub non_delta_part: f64,
}

impl DeltaLobes {
    #[must_use]
    pub const fn new(non_delta_part: f64) -> Self {
        Self {
            lobes: [DeltaLobe::NONE; MAX_DELTA_LOBES],
            count: 0,
            non_delta_part,
        }
    }

    /// Appends a lobe. Lobes beyond [`MAX_DELTA_LOBES`] are dropped and `false` is returned.
    pub fn push(&mut self, lobe: DeltaLobe) -> bool {
        if self.count == MAX_DELTA_LOBES {
            return false;
        }
        self.lobes[self.count] = lobe;
        self.count += 1;
        true
    }

    #[must_use]
    pub fn as_slice(&self) -> &[DeltaLobe] {
        &self.lobes[..self.count]
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.count
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.count == 0
    }

    #[must_use]
    pub fn iter(&self) -> std::slice::Iter<'_, DeltaLobe> {
        self.as_slice().iter()
    }

    /// summed selection probability of all delta lobes
    #[must_use]
    pub fn delta_part(&self) -> f64 {
        self.iter().map(|lobe| lobe.probability).sum()
    }
}

impl<'a> IntoIterator for &'a DeltaLobes {
    type Item = &'a DeltaLobe;
    type IntoIter = std::slice::Iter<'a, DeltaLobe>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
