//! Generic implementations of the search contracts.
//!
//! Written once over numr's runtime abstractions; the per-backend modules
//! delegate here without duplicating any logic. Result marshaling from host
//! rows into device tensors is internal plumbing of the query path.

mod build;
mod marshal;
mod query;

pub(crate) use build::tensor_to_host_f64;
pub(crate) use marshal::{float_tensor, index_tensor};

pub use build::nns_build_impl;
pub use query::{
    nns_search_hybrid_impl, nns_search_impl, nns_search_knn_impl, nns_search_radius_impl,
};
