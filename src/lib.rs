//! cloudr - Device-Resident Point Cloud Nearest-Neighbor Search
//!
//! cloudr answers proximity queries over 3D point sets (and fixed-dimension
//! point sets in general) whose coordinates live in accelerator memory as
//! numr tensors. The spatial index, a balanced k-d tree under squared
//! Euclidean distance, is built and traversed host-side; query results are
//! marshaled back into device tensors for consumption by downstream GPU
//! stages.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                       cloudr                             │
//! │   (point clouds, bounding volumes, kd-tree search)      │
//! └──────────────────────────┬──────────────────────────────┘
//!                            │ uses
//! ┌──────────────────────────▼──────────────────────────────┐
//! │                        numr                              │
//! │     (tensors, dtypes, runtime clients, device ops)      │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! The memory split is deliberate: bulk coordinates and results stay
//! device-resident, the index owns the only host-side mirror, and data
//! crosses the boundary exactly twice: host-ward on build, device-ward on
//! result marshaling.
//!
//! # Modules
//!
//! - [`geometry`] - Point cloud container and bounding-volume utilities
//! - [`search`] - Index build, the three query modes, result marshaling
//! - [`error`] - Crate error taxonomy
//! - [`validation`] - Input validation helpers
//!
//! # Search modes
//!
//! - `Knn { knn }` - exact k-nearest, sorted ascending by squared distance
//! - `Radius { radius }` - everything within the radius, discovery order
//! - `Hybrid { radius, max_nn }` - radius-filtered, count-capped, sorted
//!
//! # Backend Support
//!
//! cloudr is generic over numr's `Runtime` trait. The same code works on:
//! - CPU (with SIMD acceleration)
//! - CUDA (NVIDIA GPUs)
//! - WebGPU (cross-platform GPU)
//!
//! # Feature Flags
//!
//! | Feature | Description | Dependencies |
//! |---------|-------------|--------------|
//! | `cuda`  | Enable CUDA GPU acceleration | CUDA 12.x, numr/cuda |
//! | `wgpu`  | Enable WebGPU cross-platform GPU | numr/wgpu |
//!
//! ## Backend Limitations
//!
//! - **WebGPU**: Only supports F32 precision (no F64)
//! - **CUDA**: Requires CUDA 12.x toolkit installed
//!
//! # Example
//!
//! ```ignore
//! use cloudr::{KdTreeSearch, PointCloud, SearchParam};
//! use numr::runtime::cpu::{CpuClient, CpuDevice};
//! use numr::tensor::Tensor;
//!
//! let device = CpuDevice::new();
//! let client = CpuClient::new(device.clone());
//!
//! let points = Tensor::from_slice(
//!     &[0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0],
//!     &[3, 3],
//!     &device,
//! );
//! let cloud = PointCloud::new(points)?;
//!
//! let mut engine = KdTreeSearch::new();
//! engine.set_geometry(&client, &cloud);
//!
//! let query = Tensor::from_slice(&[0.1, 0.0, 0.0], &[1, 3], &device);
//! let result = engine.search(&client, &query, &SearchParam::Knn { knn: 2 })?;
//! assert_eq!(result.num_neighbors(), 2);
//! # Ok::<(), cloudr::SearchError>(())
//! ```

pub mod error;
pub mod geometry;
pub mod search;
pub mod validation;

// Re-export main types for convenience
pub use error::{SearchError, SearchResult};
pub use geometry::{AxisAlignedBoundingBox, OrientedBoundingBox, PointCloud};
pub use search::{
    HybridResult, KdIndex, KdTreeSearch, KnnResult, NeighborSearchAlgorithms, RadiusResult,
    SearchOutput, SearchParam,
};

// Re-export numr types that users will commonly need
pub use numr::dtype::DType;
pub use numr::runtime::{Runtime, RuntimeClient};
pub use numr::tensor::Tensor;
