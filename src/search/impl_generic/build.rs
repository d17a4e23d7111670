//! Generic index build implementation.
//!
//! Copies the device-resident coordinates into a flat row-major host mirror
//! and constructs the balanced k-d tree over that mirror. The build is
//! synchronous: the device-to-host transfer and the tree construction have
//! both completed when this returns, so the index holds references only
//! into its own host buffer and never into the caller's device memory.

use numr::dtype::DType;
use numr::runtime::Runtime;
use numr::tensor::Tensor;
use tracing::debug;

use crate::error::{SearchError, SearchResult};
use crate::search::host_tree::HostKdTree;
use crate::search::traits::nns::KdIndex;
use crate::validation::{validate_points_2d, validate_points_dtype};

/// Read a float tensor back into a host f64 staging buffer.
pub(crate) fn tensor_to_host_f64<R: Runtime<DType = DType>>(
    tensor: &Tensor<R>,
) -> SearchResult<Vec<f64>> {
    let contiguous = tensor.contiguous()?;
    match tensor.dtype() {
        DType::F32 => {
            let values: Vec<f32> = contiguous.to_vec();
            Ok(values.into_iter().map(f64::from).collect())
        }
        DType::F64 => Ok(contiguous.to_vec()),
        dtype => Err(SearchError::InvalidParameter {
            parameter: "points".to_string(),
            message: format!("device-to-host transfer requires F32 or F64, got {dtype:?}"),
        }),
    }
}

/// Build a spatial index from an `[n, d]` device point set.
pub fn nns_build_impl<R: Runtime<DType = DType>>(points: &Tensor<R>) -> SearchResult<KdIndex<R>> {
    validate_points_dtype(points.dtype(), "nns_build")?;
    validate_points_2d(points.shape(), "nns_build")?;

    let n_points = points.shape()[0];
    let dimension = points.shape()[1];

    if n_points == 0 {
        return Err(SearchError::EmptyDataset {
            context: "nns_build".to_string(),
        });
    }

    let coords = tensor_to_host_f64(points)?;
    let tree = HostKdTree::build(coords, dimension);

    debug!(n_points, dimension, "built host kd-tree index");

    Ok(KdIndex {
        tree,
        dtype: points.dtype(),
        _runtime: std::marker::PhantomData,
    })
}
