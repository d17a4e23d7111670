//! Validation helpers shared by the geometry and search modules.

use numr::dtype::DType;

use crate::error::{SearchError, SearchResult};

/// Validate point set dtype (must be F32 or F64).
pub fn validate_points_dtype(dtype: DType, op: &'static str) -> SearchResult<()> {
    match dtype {
        DType::F32 | DType::F64 => Ok(()),
        _ => Err(SearchError::InvalidParameter {
            parameter: "points".to_string(),
            message: format!("{op} requires F32 or F64 coordinates, got {dtype:?}"),
        }),
    }
}

/// Validate that a point set is 2-D `[n, d]` with d >= 1.
///
/// A zero-row set is accepted here; only the index build rejects it.
pub fn validate_points_2d(shape: &[usize], op: &'static str) -> SearchResult<()> {
    if shape.len() != 2 {
        return Err(SearchError::InvalidParameter {
            parameter: "points".to_string(),
            message: format!("{op} requires a 2-D point set [n, d], got {}-D", shape.len()),
        });
    }
    if shape[1] == 0 {
        return Err(SearchError::DimensionMismatch {
            expected: 1,
            actual: 0,
            context: op.to_string(),
        });
    }
    Ok(())
}

/// Validate a query shape against the indexed dimension.
///
/// Accepts a single point `[d]` or a batch `[m, d]`; returns the number of
/// query rows.
pub fn validate_query_shape(
    shape: &[usize],
    index_dim: usize,
    op: &'static str,
) -> SearchResult<usize> {
    let (rows, dim) = match shape.len() {
        1 => (1, shape[0]),
        2 => (shape[0], shape[1]),
        n => {
            return Err(SearchError::InvalidParameter {
                parameter: "query".to_string(),
                message: format!("{op} requires a query of shape [d] or [m, d], got {n}-D"),
            });
        }
    };
    if dim != index_dim {
        return Err(SearchError::DimensionMismatch {
            expected: index_dim,
            actual: dim,
            context: op.to_string(),
        });
    }
    Ok(rows)
}

/// Validate that a query dtype matches the indexed dtype.
pub fn validate_query_dtype(query: DType, index: DType, op: &'static str) -> SearchResult<()> {
    validate_points_dtype(query, op)?;
    if query != index {
        return Err(SearchError::InvalidParameter {
            parameter: "query".to_string(),
            message: format!("{op}: query dtype {query:?} does not match indexed dtype {index:?}"),
        });
    }
    Ok(())
}

/// Validate the neighbor count for a k-nearest-neighbors search.
///
/// Requesting more neighbors than the dataset holds is not an error; the
/// result is truncated to the dataset size by the dispatcher.
pub fn validate_knn(knn: usize, op: &'static str) -> SearchResult<()> {
    if knn == 0 {
        return Err(SearchError::InvalidParameter {
            parameter: "knn".to_string(),
            message: format!("{op} requires knn > 0"),
        });
    }
    Ok(())
}

/// Validate a search radius.
pub fn validate_radius(radius: f64, op: &'static str) -> SearchResult<()> {
    if !radius.is_finite() || radius < 0.0 {
        return Err(SearchError::InvalidParameter {
            parameter: "radius".to_string(),
            message: format!("{op} requires a finite radius >= 0, got {radius}"),
        });
    }
    Ok(())
}
