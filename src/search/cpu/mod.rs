//! CPU implementation of nearest-neighbor search.
//!
//! This module implements the search algorithm traits for CPU
//! by delegating to the generic implementations in `impl_generic/`.

mod nns;
