//! Splat-weight surface model and the dominant-layer lookup cache.
//!
//! A terrain surface is described by a grid of per-layer coverage weights
//! (a splat map). Gameplay code only ever needs "which material is under
//! this point", so this crate downsamples each surface once into a small
//! grid of dominant layer indices and answers every later query from that.

pub mod dominant;
pub mod surface;

pub use dominant::{DominantMap, SplatCache, DEFAULT_DOWNSAMPLE};
pub use surface::{SplatMap, SplatSource, SurfaceError, SurfaceId};
