//! Result marshaling: host-produced neighbor rows into device tensors.
//!
//! Distances are staged host-side as f64 and narrowed to the query dtype on
//! the way back to the device; indices and row-boundary metadata travel as
//! I64. Row order and per-row counts are preserved exactly.

use numr::dtype::DType;
use numr::runtime::Runtime;
use numr::tensor::Tensor;

use crate::error::{SearchError, SearchResult};
use crate::search::host_tree::Neighbor;
use crate::search::traits::nns::{HybridResult, KnnResult, RadiusResult};

/// Copy a host f64 staging buffer into a device tensor of the given dtype.
pub(crate) fn float_tensor<R: Runtime<DType = DType>>(
    values: &[f64],
    shape: &[usize],
    dtype: DType,
    device: &R::Device,
) -> SearchResult<Tensor<R>> {
    match dtype {
        DType::F32 => {
            let values_f32: Vec<f32> = values.iter().map(|&v| v as f32).collect();
            Ok(Tensor::<R>::from_slice(&values_f32, shape, device))
        }
        DType::F64 => Ok(Tensor::<R>::from_slice(values, shape, device)),
        _ => Err(SearchError::InvalidParameter {
            parameter: "dtype".to_string(),
            message: format!("result marshaling requires F32 or F64, got {dtype:?}"),
        }),
    }
}

/// Copy a host index buffer into a device I64 tensor.
pub(crate) fn index_tensor<R: Runtime<DType = DType>>(
    values: &[i64],
    shape: &[usize],
    device: &R::Device,
) -> Tensor<R> {
    Tensor::<R>::from_slice(values, shape, device)
}

/// Marshal fixed-stride k-nearest rows; every row holds exactly `k` entries.
pub(crate) fn marshal_knn<R: Runtime<DType = DType>>(
    rows: &[Vec<Neighbor>],
    k: usize,
    dtype: DType,
    device: &R::Device,
) -> SearchResult<KnnResult<R>> {
    let m = rows.len();
    let mut indices: Vec<i64> = Vec::with_capacity(m * k);
    let mut distances: Vec<f64> = Vec::with_capacity(m * k);
    for row in rows {
        debug_assert_eq!(row.len(), k);
        for neighbor in row {
            indices.push(neighbor.index as i64);
            distances.push(neighbor.distance2);
        }
    }

    Ok(KnnResult {
        indices: index_tensor(&indices, &[m, k], device),
        distances: float_tensor(&distances, &[m, k], dtype, device)?,
        num_neighbors: k,
    })
}

/// Marshal ragged radius rows with an explicit row-boundary table.
pub(crate) fn marshal_radius<R: Runtime<DType = DType>>(
    rows: &[Vec<Neighbor>],
    dtype: DType,
    device: &R::Device,
) -> SearchResult<RadiusResult<R>> {
    let m = rows.len();
    let total: usize = rows.iter().map(Vec::len).sum();

    let mut indices: Vec<i64> = Vec::with_capacity(total);
    let mut distances: Vec<f64> = Vec::with_capacity(total);
    let mut counts: Vec<i64> = Vec::with_capacity(m);
    let mut offsets: Vec<i64> = Vec::with_capacity(m + 1);
    offsets.push(0);
    for row in rows {
        for neighbor in row {
            indices.push(neighbor.index as i64);
            distances.push(neighbor.distance2);
        }
        counts.push(row.len() as i64);
        offsets.push(indices.len() as i64);
    }

    Ok(RadiusResult {
        indices: index_tensor(&indices, &[total], device),
        distances: float_tensor(&distances, &[total], dtype, device)?,
        counts: index_tensor(&counts, &[m], device),
        offsets: index_tensor(&offsets, &[m + 1], device),
        total_neighbors: total,
    })
}

/// Marshal hybrid rows at fixed stride `max_nn`, padding short rows with
/// index -1 / distance 0.
pub(crate) fn marshal_hybrid<R: Runtime<DType = DType>>(
    rows: &[Vec<Neighbor>],
    max_nn: usize,
    dtype: DType,
    device: &R::Device,
) -> SearchResult<HybridResult<R>> {
    let m = rows.len();
    let total: usize = rows.iter().map(Vec::len).sum();

    let mut indices: Vec<i64> = Vec::with_capacity(m * max_nn);
    let mut distances: Vec<f64> = Vec::with_capacity(m * max_nn);
    let mut counts: Vec<i64> = Vec::with_capacity(m);
    for row in rows {
        debug_assert!(row.len() <= max_nn);
        for neighbor in row {
            indices.push(neighbor.index as i64);
            distances.push(neighbor.distance2);
        }
        for _ in row.len()..max_nn {
            indices.push(-1);
            distances.push(0.0);
        }
        counts.push(row.len() as i64);
    }

    Ok(HybridResult {
        indices: index_tensor(&indices, &[m, max_nn], device),
        distances: float_tensor(&distances, &[m, max_nn], dtype, device)?,
        counts: index_tensor(&counts, &[m], device),
        max_nn,
        total_neighbors: total,
    })
}
