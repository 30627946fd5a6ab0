#![warn(clippy::pedantic)]
#![warn(clippy::perf)]
#![warn(clippy::nursery)]
#![warn(clippy::suboptimal_flops)]
#![deny(clippy::return_self_not_must_use)]
#![allow(clippy::similar_names)]
#![deny(clippy::semicolon_if_nothing_returned)]
#![deny(clippy::must_use_candidate)]
#![deny(clippy::double_must_use)]
#![deny(clippy::use_self)]
#![deny(clippy::unreadable_literal)]
#![deny(clippy::explicit_iter_loop)]
// these are lints to enable later
#![allow(clippy::cast_lossless)]
#![allow(clippy::module_name_repetitions)]

//! The standard surface material of a pathtracer: a mixture of diffuse reflection, diffuse
//! transmission, GGX specular reflection and a rough dielectric interface, behind one
//! evaluation and sampling interface.
//!
//! # Design Decisions
//! Lighting calculations are done exclusively in [f64]s, since [`Bxdf`]s can be extremely
//! spiky. Material parameters ([`material::StandardBsdfData`]) are stored as [f32]s for a minimal
//! memory footprint and widened once when a [`standard::StandardBsdf`] is built.
//!
//! All lobes are computed in a local space. The surface is the xy-plane and the z-vector is the
//! shading normal. [`frame::ShadingFrame`] rotates directions in and out of that space.
//! `omega_i` always points towards the viewer and `omega_o` towards the light.
//!
//! In contrast to a plain BSDF value, `eval` already contains the `|cos theta_o|` factor. The
//! `weight` of a sample is the full Monte Carlo throughput `f * |cos theta_o| / pdf`.
//!
//! Sampling is deterministic. You are responsible for generating [f64]s in the range
//! `0.0..1.0`, passed as a [`Vec3d`] to single lobes or a [`Vec4d`] to the composite. That way
//! the random generator or low discrepancy sequence stays under your control.
//!
//! Very smooth surfaces turn into delta lobes (perfect mirror and perfect refraction). They have
//! no finite density, so their pdf is always reported as `0.0`.
//! [`standard::StandardBsdf::eval_delta_lobes`] lists them for renderers that treat them
//! separately.
//!
//! Tunable constants live in one immutable [`config::BsdfConfig`]. Model choices that are fixed
//! per renderer (the diffuse model and the Smith masking function) are generic parameters.
//!
//! This crate is built on [glam] for a simple but fast vector math library at the core.
//!
//! # References
//! * Brent Burley. Physically-based shading at Disney, course notes, revised 2014. In *ACM
//!     SIGGRAPH, Practical physically-based shading in film and game production,* 2012.
//! * Sébastien Lagarde, Charles de Rousiers. Moving Frostbite to Physically Based Rendering 3.0,
//!     *SIGGRAPH course notes,* 2014.
//! * Eric Heitz. Understanding the masking-shadowing function in microfacet-based brdfs.
//!     *Journal of Computer Graphics Techniques, 3(2):32–91,* 2014.
//! * Bruce Walter, Stephen R. Marschner, Hongsong Li, and Kenneth E. Torrance. Microfacet models for refraction through rough surfaces. In *Proceedings of the Eurographics Symposium on Rendering,* 2007.
//! * Eric Heitz, Sampling the GGX Distribution of Visible Normals, *Journal of Computer Graphics Techniques (JCGT)*, vol. 7, no. 4, 1–13, 2018
//!     <http://jcgt.org/published/0007/04/01/>
//! * Eric Veach. *Robust monte carlo methods for light transport simulation.* PhD thesis, Stanford University, 1997.

mod core;

pub use crate::core::{
    Bxdf, DiffuseReflection, LobeType, RgbD, RgbF, SampleResponse, Vec2d, Vec3d, Vec4d,
};

#[cfg(test)]
pub(crate) mod test_utils;
pub(crate) mod utils;

pub mod config;
pub mod delta;
pub mod disney;
pub mod frame;
pub mod fresnel;
pub mod lambert;
pub mod material;
pub mod microfacet;
pub mod specular_reflection;
pub mod specular_transmission;
pub mod standard;
