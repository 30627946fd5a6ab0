pub trait ApproxEqual: Copy {
    fn equals_approx(self, other: Self, eps: Self, eps_rel: Self) -> bool;
    fn equals_approx_abs(self, other: Self, eps: Self) -> bool;
    fn equals_approx_rel(self, other: Self, eps: Self) -> bool;
}

macro_rules! assert_eq_approx {
    ($lhs:expr, $rhs:expr, $eps_abs:expr, $eps_rel:expr) => {
        assert!(
            $crate::test_utils::ApproxEqual::equals_approx($lhs, $rhs, $eps_abs, $eps_rel),
            r#"assert_eq_approx failed:
    {}: {:?}
    {}: {:?}
    {} (maximum absolute error): {:?}
    {} (maximum relative error): {:?}"#,
            stringify!($lhs),
            $lhs,
            stringify!($rhs),
            $rhs,
            stringify!($eps_abs),
            $eps_abs,
            stringify!($eps_rel),
            $eps_rel,
        );
    };

    ($lhs:expr, $rhs:expr, $eps_abs: expr, $eps_rel:expr, $($arg:tt)+) => {
        assert!($crate::test_utils::ApproxEqual::equals_approx($lhs, $rhs, $eps_abs, $eps_rel), $($arg)*);
    }
}

macro_rules! assert_eq_approx_abs {
    ($lhs:expr, $rhs:expr, $eps_abs:expr) => {
        assert!(
            $crate::test_utils::ApproxEqual::equals_approx_abs($lhs, $rhs, $eps_abs),
            r#"assert_eq_abs failed:
    {}: {:?}
    {}: {:?}
    {} (maximum absolute error): {:?}"#,
            stringify!($lhs),
            $lhs,
            stringify!($rhs),
            $rhs,
            stringify!($eps_abs),
            $eps_abs,
        )
    };

    ($lhs:expr, $rhs:expr, $eps_abs:expr, $($arg:tt)+) => {
        assert!($crate::test_utils::ApproxEqual::equals_approx_abs($lhs, $rhs, $eps_abs),
        $($arg)*);
    };
}

macro_rules! assert_in_range {
    ($value:expr, $lower:expr, $upper:expr) => {
        assert!(
            $lower <= $value && $value <= $upper,
            r#"assert_in_range failed:
    {} (value): {:?}
    {} (lower bound): {:?}
    {} (upper bound): {:?}"#,
            stringify!($value),
            $value,
            stringify!($lower),
            $lower,
            stringify!($upper),
            $upper
        )
    };
}

macro_rules! impl_approx_equal {
    ($scalar:ty, $vector:ty) => {
        impl ApproxEqual for $scalar {
            fn equals_approx(self, other: Self, eps: Self, eps_rel: Self) -> bool {
                #[allow(clippy::float_cmp)]
                if self == other || (self - other).abs() <= eps {
                    true
                } else {
                    let diff = (self - other).abs();
                    let max = self.abs().max(other.abs());
                    diff <= max * eps_rel
                }
            }

            fn equals_approx_abs(self, other: Self, eps: Self) -> bool {
                #[allow(clippy::float_cmp)]
                if self == other {
                    true
                } else {
                    (self - other).abs() <= eps
                }
            }

            fn equals_approx_rel(self, other: Self, eps: Self) -> bool {
                #[allow(clippy::float_cmp)]
                if self == other {
                    return true;
                }
                let diff = (self - other).abs();
                let max = self.abs().max(other.abs());
                diff <= max * eps
            }
        }

        impl ApproxEqual for $vector {
            fn equals_approx_rel(self, other: Self, eps: Self) -> bool {
                $crate::test_utils::ApproxEqual::equals_approx_rel(self.x, other.x, eps.x)
                    && $crate::test_utils::ApproxEqual::equals_approx_rel(self.y, other.y, eps.y)
                    && $crate::test_utils::ApproxEqual::equals_approx_rel(self.z, other.z, eps.z)
            }
            fn equals_approx_abs(self, other: Self, eps: Self) -> bool {
                $crate::test_utils::ApproxEqual::equals_approx_abs(self.x, other.x, eps.x)
                    && $crate::test_utils::ApproxEqual::equals_approx_abs(self.y, other.y, eps.y)
                    && $crate::test_utils::ApproxEqual::equals_approx_abs(self.z, other.z, eps.z)
            }
            fn equals_approx(self, other: Self, eps_abs: Self, eps_rel: Self) -> bool {
                $crate::test_utils::ApproxEqual::equals_approx(
                    self.x, other.x, eps_abs.x, eps_rel.x,
                ) && $crate::test_utils::ApproxEqual::equals_approx(
                    self.y, other.y, eps_abs.y, eps_rel.y,
                ) && $crate::test_utils::ApproxEqual::equals_approx(
                    self.z, other.z, eps_abs.z, eps_rel.z,
                )
            }
        }
    };
}

impl_approx_equal!(f64, Vec3d);

use std::f64::consts;

pub(crate) use assert_eq_approx;
pub(crate) use assert_eq_approx_abs;
pub(crate) use assert_in_range;

use crate::{
    microfacet::SmithMasking,
    specular_transmission::PDF_SENTINEL,
    standard::StandardBsdf,
    utils::{FloatExt, VecExt},
    Bxdf, DiffuseReflection, RgbD, SampleResponse, Vec3d, Vec4d,
};

pub trait SamplerExt {
    fn vec3d(&mut self) -> Vec3d;
    fn vec4d(&mut self) -> Vec4d;
}

impl SamplerExt for fastrand::Rng {
    fn vec3d(&mut self) -> Vec3d {
        Vec3d::new(self.f64(), self.f64(), self.f64())
    }

    fn vec4d(&mut self) -> Vec4d {
        Vec4d::new(self.f64(), self.f64(), self.f64(), self.f64())
    }
}

/// Common surface of single lobes and the composite for the Monte Carlo harnesses
pub trait Scatter {
    fn scatter_eval(&self, omega_i: Vec3d, omega_o: Vec3d) -> RgbD;
    fn scatter_pdf(&self, omega_i: Vec3d, omega_o: Vec3d) -> f64;
    fn scatter_sample(&self, omega_i: Vec3d, rd: &mut fastrand::Rng) -> Option<SampleResponse>;

    /// `true` if the sampled weight equals `eval / pdf`. Mixtures only satisfy this in
    /// expectation.
    fn weight_is_eval_over_pdf(&self) -> bool {
        true
    }
}

impl<T: Bxdf> Scatter for T {
    fn scatter_eval(&self, omega_i: Vec3d, omega_o: Vec3d) -> RgbD {
        self.eval(omega_i, omega_o)
    }

    fn scatter_pdf(&self, omega_i: Vec3d, omega_o: Vec3d) -> f64 {
        self.eval_pdf(omega_i, omega_o)
    }

    fn scatter_sample(&self, omega_i: Vec3d, rd: &mut fastrand::Rng) -> Option<SampleResponse> {
        self.sample(omega_i, rd.vec3d())
    }
}

impl<D: DiffuseReflection, M: SmithMasking> Scatter for StandardBsdf<D, M> {
    fn scatter_eval(&self, omega_i: Vec3d, omega_o: Vec3d) -> RgbD {
        self.eval(omega_i, omega_o)
    }

    fn scatter_pdf(&self, omega_i: Vec3d, omega_o: Vec3d) -> f64 {
        self.eval_pdf(omega_i, omega_o)
    }

    fn scatter_sample(&self, omega_i: Vec3d, rd: &mut fastrand::Rng) -> Option<SampleResponse> {
        self.sample(omega_i, rd.vec4d())
    }

    fn weight_is_eval_over_pdf(&self) -> bool {
        false
    }
}

/** sample a direction with density 1 / 4pi */
pub fn spherical_sample(rd: &mut fastrand::Rng) -> Vec3d {
    let u = rd.f64();
    let v = rd.f64();
    spherical_sample_uv(u, v)
}

fn spherical_sample_uv(u: f64, v: f64) -> Vec3d {
    #[allow(clippy::suboptimal_flops)]
    let cos_theta = 2.0 * u - 1.0;
    #[allow(clippy::suboptimal_flops)]
    let sin_theta = (1.0 - cos_theta * cos_theta).sqrt();
    let phi = v * 2.0 * consts::PI;
    let (sin_phi, cos_phi) = phi.sin_cos();
    Vec3d::new(sin_theta * sin_phi, sin_theta * cos_phi, cos_theta)
}

/** sample a direction in the upper hemisphere with density 1 / 2pi */
pub fn hemispherical_sample(rd: &mut fastrand::Rng) -> Vec3d {
    let omega = spherical_sample_uv(0.5_f64.mul_add(rd.f64(), 0.5), rd.f64());
    Vec3d::new(omega.x, omega.y, omega.z.abs())
}

/// a view direction that is not too close to the horizon for a stable estimate
pub fn view_sample(rd: &mut fastrand::Rng, min_cos: f64) -> Vec3d {
    loop {
        let omega = hemispherical_sample(rd);
        if omega.z >= min_cos {
            return omega;
        }
    }
}

#[allow(clippy::cast_lossless)]
pub fn test_energy_conservation<T: Scatter>(material: &T, allowed_energy_loss: f64) {
    let mut rd = fastrand::Rng::with_seed(0x0e4e_5c7);
    for _ in 0..16 {
        let omega_i = view_sample(&mut rd, 0.1);
        check_energy_conservation_at(material, omega_i, allowed_energy_loss, &mut rd);
    }
}

/// The mean sampled weight at `omega_i` is the directional albedo. It may not exceed one.
#[allow(clippy::cast_lossless)]
pub fn check_energy_conservation_at<T: Scatter>(
    material: &T,
    omega_i: Vec3d,
    allowed_energy_loss: f64,
    rd: &mut fastrand::Rng,
) {
    let num_samples = 50_000;
    let mut sum = RgbD::ZERO;
    let mut sum2 = RgbD::ZERO;
    for _ in 0..num_samples {
        if let Some(sample) = material.scatter_sample(omega_i, rd) {
            sum += sample.weight;
            sum2 += sample.weight * sample.weight;
        }
    }
    sum /= num_samples as f64;
    sum2 /= num_samples as f64;

    let variance = (sum2 - sum * sum).luminance() * num_samples as f64 / (num_samples - 1) as f64;
    let std_error = (variance.abs() / num_samples as f64).sqrt();
    let confidence = (4.0 * std_error).max(1e-3);

    for channel in [sum.x, sum.y, sum.z] {
        assert_in_range!(
            channel,
            1.0 - confidence - allowed_energy_loss,
            1.0 + confidence
        );
    }
}

/// Checks a single lobe or the composite for consistency between `sample` on one side and
/// `eval` and `eval_pdf` on the other
pub fn test_bxdf_sample_eval<T: Scatter>(material: &T) {
    let mut rd = fastrand::Rng::with_seed(0x5a3e);
    for _ in 0..10_000 {
        let omega_i = hemispherical_sample(&mut rd);
        check_sample_eval_at(material, omega_i, &mut rd);
    }
}

pub fn check_sample_eval_at<T: Scatter>(material: &T, omega_i: Vec3d, rd: &mut fastrand::Rng) {
    let Some(SampleResponse {
        omega_o,
        pdf,
        weight,
        lobe,
        lobe_probability,
    }) = material.scatter_sample(omega_i, rd)
    else {
        return;
    };

    assert_eq_approx_abs!(omega_o.length(), 1.0, 1e-9);
    assert!(weight.is_finite(), "weight: {weight:?}, omega_i: {omega_i:?}");
    assert!(weight.min_element() >= 0.0, "weight: {weight:?}");
    assert_in_range!(lobe_probability, 0.0, 1.0);
    assert_eq!(lobe.bits().count_ones(), 1, "lobe: {lobe:?}");
    assert_eq!(lobe.is_transmission(), omega_o.z < 0.0, "lobe: {lobe:?}");

    if lobe.is_delta() {
        #[allow(clippy::float_cmp)]
        {
            assert_eq!(pdf, 0.0, "delta samples carry no density");
        }
        return;
    }
    if pdf >= PDF_SENTINEL {
        return;
    }

    let c_pdf = material.scatter_pdf(omega_i, omega_o);
    assert!(
        pdf > 0.0 && c_pdf > 0.0,
        r#"
    PDFs must be greater than 0.
    pdf: {pdf},
    c_pdf: {c_pdf},
    omega_i: {omega_i:?},
    omega_o: {omega_o:?}"#
    );
    assert_eq_approx!(
        pdf,
        c_pdf,
        1e-9,
        1e-6,
        r#"
    PDFs must be equal for sample and eval_pdf,
    pdf: {pdf},
    c_pdf: {c_pdf},
    omega_i: {omega_i:?},
    omega_o: {omega_o:?}"#
    );

    if material.weight_is_eval_over_pdf() {
        let expected = material.scatter_eval(omega_i, omega_o) / c_pdf;
        assert_eq_approx!(
            weight,
            expected,
            RgbD::splat(1e-6),
            RgbD::splat(1e-5),
            r#"
    weight must be eval / pdf,
    weight: {weight:?},
    expected: {expected:?},
    omega_i: {omega_i:?},
    omega_o: {omega_o:?}"#
        );
    }
}

pub fn test_bxdf_non_negative<T: Scatter>(material: &T) {
    let mut rd = fastrand::Rng::with_seed(0x90e6);
    for _ in 0..10_000 {
        let omega_i = hemispherical_sample(&mut rd);
        let omega_o = spherical_sample(&mut rd);
        let value = material.scatter_eval(omega_i, omega_o);
        let pdf = material.scatter_pdf(omega_i, omega_o);
        assert!(value.is_finite(), "value: {value:?}");
        assert!(value.min_element() >= 0.0, "the value should always be positive");
        assert!(pdf >= 0.0, "the pdf should always be positive");
    }
}

/// Verifies that the pdf reported by `sample` and `eval_pdf` is the density the sampler
/// actually draws from.
///
/// Half of the directions come from the material and half are uniform on the sphere. The
/// expectation of `1 / (0.5 / 4pi + 0.5 * pdf)` over this mixture is the area of the sphere.
/// Failed and delta samples contribute zero.
pub fn test_integrate_inverse_pdf<T: Scatter>(material: &T) {
    let mut rd = fastrand::Rng::with_seed(0x1f0e);
    for _ in 0..8 {
        let omega_i = view_sample(&mut rd, 0.05);
        check_integrate_inverse_pdf_at(material, omega_i, &mut rd);
    }
}

#[allow(clippy::cast_lossless)]
pub fn check_integrate_inverse_pdf_at<T: Scatter>(
    material: &T,
    omega_i: Vec3d,
    rd: &mut fastrand::Rng,
) {
    const DOMAIN: f64 = 4.0 * consts::PI;
    let spheric_pdf = 1.0 / DOMAIN;

    let num_samples = 200_000;
    let mut sum = 0.0;
    let mut sum_of_squared = 0.0;
    for _ in 0..num_samples {
        let pdf_bsdf = if rd.bool() {
            match material.scatter_sample(omega_i, rd) {
                Some(sample) if !sample.lobe.is_delta() => sample.pdf,
                _ => continue,
            }
        } else {
            let omega_o = spherical_sample(rd);
            material.scatter_pdf(omega_i, omega_o)
        };
        #[allow(clippy::suboptimal_flops)]
        let value = 1.0 / (0.5 * spheric_pdf + 0.5 * pdf_bsdf);
        sum += value;
        sum_of_squared += value.sq();
    }
    sum /= DOMAIN * num_samples as f64;
    sum_of_squared /= DOMAIN.sq() * num_samples as f64;
    let variance_unscaled = sum_of_squared - sum.sq();

    let sample_standard_deviation =
        ((num_samples as f64) / (num_samples - 1) as f64 * variance_unscaled.max(0.0)).sqrt();
    let standard_error = sample_standard_deviation / (num_samples as f64).sqrt();
    let confidence_thres = (4.0 * standard_error).max(1e-3);

    assert_eq_approx_abs!(
        sum,
        1.0,
        confidence_thres,
        r#"
    expected the monte carlo test to approach 1.
    But it approached {sum} after {num_samples} Samples with a standard error of {standard_error}.
    Required Confidence is {confidence_thres}.
    omega_i: {omega_i:?}"#
    );
}
