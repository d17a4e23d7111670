//! WebGPU implementation of nearest-neighbor search.
//!
//! This module implements the search algorithm traits for WebGPU
//! by delegating to the generic implementations in `impl_generic/`.
//!
//! # Limitations
//!
//! - Only F32 point sets are supported (WGSL doesn't support F64); the
//!   host-side tree still traverses in f64 and narrows results back to F32.

mod nns;
