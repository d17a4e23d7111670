//! Algorithm trait definitions for nearest-neighbor search.

pub mod nns;
