//! Nearest-neighbor search over device-resident point sets.
//!
//! Coordinates and query results are device tensors; the spatial index is a
//! host-resident balanced k-d tree keyed by squared Euclidean distance. The
//! memory split is deliberate and one-directional: coordinates are mirrored
//! host-ward once per build, results are copied device-ward once per query
//! batch.
//!
//! # Runtime-Generic Architecture
//!
//! All operations are implemented generically over numr's `Runtime` trait.
//! The same code works on CPU, CUDA, and WebGPU backends with **zero
//! duplication**.
//!
//! ```text
//! search/
//! ├── mod.rs                # Exports only
//! ├── host_tree.rs          # Host-resident balanced k-d tree
//! ├── engine.rs             # Stateful KdTreeSearch surface
//! ├── traits/               # Algorithm trait definitions
//! │   └── nns.rs
//! ├── impl_generic/         # Generic implementations (written once)
//! │   ├── build.rs
//! │   ├── query.rs
//! │   └── marshal.rs
//! ├── cpu/                  # CPU trait impl (pure delegation)
//! │   └── ...
//! ├── cuda/                 # CUDA trait impl (pure delegation)
//! │   └── ...
//! └── wgpu/                 # WebGPU trait impl (pure delegation)
//!     └── ...
//! ```
//!
//! # Concurrency
//!
//! A built [`KdIndex`] is read-only; any number of searches may run against
//! a shared reference concurrently without locking. Replacing an index
//! requires exclusive access, so a rebuild can never race an in-flight
//! query on the same engine.
//!
//! # Backend Support
//!
//! - CPU (F32, F64)
//! - CUDA (F32, F64) - requires `cuda` feature
//! - WebGPU (F32 only) - requires `wgpu` feature

mod cpu;
mod engine;
mod host_tree;
pub mod impl_generic;
pub mod traits;

#[cfg(feature = "cuda")]
mod cuda;

#[cfg(feature = "wgpu")]
mod wgpu;

// Re-export the engine and the contract types
pub use engine::KdTreeSearch;
pub use traits::nns::{
    HybridResult, KdIndex, KnnResult, NeighborSearchAlgorithms, RadiusResult, SearchOutput,
    SearchParam,
};
