//! Nearest-neighbor search contract.
//!
//! Point coordinates and query results live in device memory as tensors;
//! the index itself is a host-resident balanced k-d tree keyed by squared
//! Euclidean distance. Building an index transfers the coordinates host-ward
//! once; every query batch flows host-ward, is matched against the tree, and
//! the per-query result rows are marshaled back into device tensors.

use numr::dtype::DType;
use numr::runtime::Runtime;
use numr::tensor::Tensor;

use crate::error::SearchResult;
use crate::search::host_tree::HostKdTree;

/// Search mode for a neighbor query.
///
/// A closed set of variants; the variant selects the dispatcher's algorithm.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SearchParam {
    /// The `knn` nearest neighbors, sorted ascending by squared distance.
    /// Requesting more neighbors than the dataset holds truncates to the
    /// dataset size.
    Knn { knn: usize },

    /// All neighbors with squared distance <= radius^2, in discovery order.
    Radius { radius: f64 },

    /// Up to `max_nn` neighbors within `radius`, sorted ascending.
    /// `max_nn = 0` yields an empty result rather than an error.
    Hybrid { radius: f64, max_nn: usize },
}

/// A built spatial index.
///
/// Owns the flat host-resident coordinate mirror and the tree metadata over
/// it, and no device memory. Read-only after construction: rebuilding always
/// produces a new instance, and results from a superseded index are stale by
/// contract. Queries against a shared `&KdIndex` are safe to run
/// concurrently.
#[derive(Debug, Clone)]
pub struct KdIndex<R: Runtime> {
    pub(crate) tree: HostKdTree,
    pub(crate) dtype: DType,
    pub(crate) _runtime: std::marker::PhantomData<R>,
}

impl<R: Runtime> KdIndex<R> {
    /// Dimensionality of the indexed points.
    pub fn dimension(&self) -> usize {
        self.tree.dim()
    }

    /// Number of indexed points.
    pub fn len(&self) -> usize {
        self.tree.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.len() == 0
    }

    /// Dtype of the source points; queries must match it.
    pub fn dtype(&self) -> DType {
        self.dtype
    }
}

/// Result of a k-nearest-neighbors query batch.
///
/// Fixed stride: row `i` holds the neighbors of query `i`.
#[derive(Debug, Clone)]
pub struct KnnResult<R: Runtime> {
    /// Dataset indices of the neighbors `[m, k]` (I64).
    pub indices: Tensor<R>,

    /// Squared Euclidean distances `[m, k]` (query dtype).
    pub distances: Tensor<R>,

    /// Neighbors per query row: `min(knn, point count)`.
    pub num_neighbors: usize,
}

impl<R: Runtime> KnnResult<R> {
    pub fn num_queries(&self) -> usize {
        self.indices.shape()[0]
    }

    /// Total neighbors across all query rows.
    pub fn total_neighbors(&self) -> usize {
        self.num_queries() * self.num_neighbors
    }
}

/// Result of a radius query batch (ragged).
///
/// Row boundaries are carried explicitly: query `i` owns
/// `indices[offsets[i]..offsets[i + 1]]`.
#[derive(Debug, Clone)]
pub struct RadiusResult<R: Runtime> {
    /// Dataset indices of all neighbors, concatenated `[total]` (I64).
    pub indices: Tensor<R>,

    /// Squared Euclidean distances, concatenated `[total]` (query dtype).
    pub distances: Tensor<R>,

    /// Neighbors per query `[m]` (I64).
    pub counts: Tensor<R>,

    /// Start offset per query plus a final total `[m + 1]` (I64).
    pub offsets: Tensor<R>,

    /// Total neighbors across all query rows.
    pub total_neighbors: usize,
}

impl<R: Runtime> RadiusResult<R> {
    pub fn num_queries(&self) -> usize {
        self.counts.shape()[0]
    }
}

/// Result of a hybrid (radius-bounded count) query batch.
///
/// Fixed stride `max_nn`; rows shorter than the stride are padded with
/// index -1 / distance 0, and `counts` records each row's valid prefix.
#[derive(Debug, Clone)]
pub struct HybridResult<R: Runtime> {
    /// Dataset indices `[m, max_nn]` (I64), -1 past the valid prefix.
    pub indices: Tensor<R>,

    /// Squared Euclidean distances `[m, max_nn]` (query dtype).
    pub distances: Tensor<R>,

    /// Valid neighbors per query `[m]` (I64).
    pub counts: Tensor<R>,

    /// Result stride per query row.
    pub max_nn: usize,

    /// Total valid neighbors across all query rows.
    pub total_neighbors: usize,
}

impl<R: Runtime> HybridResult<R> {
    pub fn num_queries(&self) -> usize {
        self.counts.shape()[0]
    }
}

/// Dynamically dispatched search result, one variant per `SearchParam` case.
#[derive(Debug, Clone)]
pub enum SearchOutput<R: Runtime> {
    Knn(KnnResult<R>),
    Radius(RadiusResult<R>),
    Hybrid(HybridResult<R>),
}

impl<R: Runtime> SearchOutput<R> {
    /// Total neighbors found across all query rows. Zero is a valid result,
    /// distinct from an error.
    pub fn num_neighbors(&self) -> usize {
        match self {
            Self::Knn(r) => r.total_neighbors(),
            Self::Radius(r) => r.total_neighbors,
            Self::Hybrid(r) => r.total_neighbors,
        }
    }

    /// Dataset index tensor of the underlying result.
    pub fn indices(&self) -> &Tensor<R> {
        match self {
            Self::Knn(r) => &r.indices,
            Self::Radius(r) => &r.indices,
            Self::Hybrid(r) => &r.indices,
        }
    }

    /// Squared-distance tensor of the underlying result.
    pub fn distances(&self) -> &Tensor<R> {
        match self {
            Self::Knn(r) => &r.distances,
            Self::Radius(r) => &r.distances,
            Self::Hybrid(r) => &r.distances,
        }
    }
}

/// Algorithmic contract for nearest-neighbor search.
///
/// All backends implementing neighbor search MUST implement this trait using
/// the EXACT SAME ALGORITHMS to ensure numerical parity.
pub trait NeighborSearchAlgorithms<R: Runtime> {
    /// Build a spatial index from a point set.
    ///
    /// Transfers the `[n, d]` device coordinates into a host mirror and
    /// constructs the k-d tree over it. Blocking: the returned index is
    /// fully queryable when this call returns.
    ///
    /// # Errors
    ///
    /// `EmptyDataset` for zero rows, `DimensionMismatch` for zero
    /// dimension, `InvalidParameter` for non-float coordinates.
    fn nns_build(&self, points: &Tensor<R>) -> SearchResult<KdIndex<R>>;

    /// Execute the search mode selected by `param` for a query point `[d]`
    /// or batch `[m, d]`. Output row order matches query order.
    fn nns_search(
        &self,
        index: &KdIndex<R>,
        query: &Tensor<R>,
        param: &SearchParam,
    ) -> SearchResult<SearchOutput<R>>;

    /// The `knn` nearest neighbors per query, sorted ascending; each row
    /// holds `min(knn, index.len())` entries.
    fn nns_search_knn(
        &self,
        index: &KdIndex<R>,
        query: &Tensor<R>,
        knn: usize,
    ) -> SearchResult<KnnResult<R>>;

    /// All neighbors with squared distance <= radius^2 per query.
    fn nns_search_radius(
        &self,
        index: &KdIndex<R>,
        query: &Tensor<R>,
        radius: f64,
    ) -> SearchResult<RadiusResult<R>>;

    /// Up to `max_nn` neighbors within `radius` per query, sorted ascending.
    fn nns_search_hybrid(
        &self,
        index: &KdIndex<R>,
        query: &Tensor<R>,
        radius: f64,
        max_nn: usize,
    ) -> SearchResult<HybridResult<R>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_param_is_copy() {
        let param = SearchParam::Hybrid {
            radius: 0.5,
            max_nn: 8,
        };
        let copy = param;
        assert_eq!(param, copy);
    }
}
