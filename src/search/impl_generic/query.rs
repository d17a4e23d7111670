//! Generic query dispatch implementation.
//!
//! Each batch flows host-ward once (a single device-to-host read of the
//! query tensor), every row is matched against the host tree, and the
//! collected rows are marshaled back onto the dispatching client's device.
//! The index is only read; concurrent searches against the same index are
//! safe.

use numr::dtype::DType;
use numr::runtime::{Runtime, RuntimeClient};
use numr::tensor::Tensor;

use crate::error::SearchResult;
use crate::search::host_tree::Neighbor;
use crate::search::impl_generic::build::tensor_to_host_f64;
use crate::search::impl_generic::marshal::{marshal_hybrid, marshal_knn, marshal_radius};
use crate::search::traits::nns::{
    HybridResult, KdIndex, KnnResult, RadiusResult, SearchOutput, SearchParam,
};
use crate::validation::{validate_knn, validate_query_dtype, validate_query_shape, validate_radius};

/// Read the query batch host-side, returning its rows and row count.
fn query_rows<R: Runtime<DType = DType>>(
    index: &KdIndex<R>,
    query: &Tensor<R>,
    op: &'static str,
) -> SearchResult<(Vec<f64>, usize)> {
    validate_query_dtype(query.dtype(), index.dtype(), op)?;
    let rows = validate_query_shape(query.shape(), index.dimension(), op)?;
    let host = tensor_to_host_f64(query)?;
    Ok((host, rows))
}

/// Dispatch on the `SearchParam` variant.
pub fn nns_search_impl<R, C>(
    client: &C,
    index: &KdIndex<R>,
    query: &Tensor<R>,
    param: &SearchParam,
) -> SearchResult<SearchOutput<R>>
where
    R: Runtime<DType = DType>,
    C: RuntimeClient<R>,
{
    match *param {
        SearchParam::Knn { knn } => {
            nns_search_knn_impl(client, index, query, knn).map(SearchOutput::Knn)
        }
        SearchParam::Radius { radius } => {
            nns_search_radius_impl(client, index, query, radius).map(SearchOutput::Radius)
        }
        SearchParam::Hybrid { radius, max_nn } => {
            nns_search_hybrid_impl(client, index, query, radius, max_nn).map(SearchOutput::Hybrid)
        }
    }
}

/// Exact k-nearest query; each row holds `min(knn, index.len())` neighbors
/// sorted ascending by squared distance.
pub fn nns_search_knn_impl<R, C>(
    client: &C,
    index: &KdIndex<R>,
    query: &Tensor<R>,
    knn: usize,
) -> SearchResult<KnnResult<R>>
where
    R: Runtime<DType = DType>,
    C: RuntimeClient<R>,
{
    validate_knn(knn, "nns_search_knn")?;
    let (host, m) = query_rows(index, query, "nns_search_knn")?;

    let dim = index.dimension();
    let k = knn.min(index.len());
    let rows: Vec<Vec<Neighbor>> = host
        .chunks(dim)
        .take(m)
        .map(|point| index.tree.knn(point, k))
        .collect();

    marshal_knn(&rows, k, index.dtype(), client.device())
}

/// Fixed-radius query; rows are ragged and kept in discovery order.
pub fn nns_search_radius_impl<R, C>(
    client: &C,
    index: &KdIndex<R>,
    query: &Tensor<R>,
    radius: f64,
) -> SearchResult<RadiusResult<R>>
where
    R: Runtime<DType = DType>,
    C: RuntimeClient<R>,
{
    validate_radius(radius, "nns_search_radius")?;
    let (host, m) = query_rows(index, query, "nns_search_radius")?;

    let dim = index.dimension();
    let radius2 = radius * radius;
    let rows: Vec<Vec<Neighbor>> = host
        .chunks(dim)
        .take(m)
        .map(|point| index.tree.radius(point, radius2))
        .collect();

    marshal_radius(&rows, index.dtype(), client.device())
}

/// Hybrid query: radius-filtered candidates capped at `max_nn`, sorted
/// ascending. `max_nn = 0` yields empty rows rather than an error.
pub fn nns_search_hybrid_impl<R, C>(
    client: &C,
    index: &KdIndex<R>,
    query: &Tensor<R>,
    radius: f64,
    max_nn: usize,
) -> SearchResult<HybridResult<R>>
where
    R: Runtime<DType = DType>,
    C: RuntimeClient<R>,
{
    validate_radius(radius, "nns_search_hybrid")?;
    let (host, m) = query_rows(index, query, "nns_search_hybrid")?;

    let dim = index.dimension();
    let radius2 = radius * radius;
    let rows: Vec<Vec<Neighbor>> = host
        .chunks(dim)
        .take(m)
        .map(|point| {
            if max_nn == 0 {
                Vec::new()
            } else {
                index.tree.hybrid(point, radius2, max_nn)
            }
        })
        .collect();

    marshal_hybrid(&rows, max_nn, index.dtype(), client.device())
}
