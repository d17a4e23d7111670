//! Stateful search engine consumed by binding layers.
//!
//! `KdTreeSearch` owns at most one built index. Ingesting new geometry
//! replaces the index atomically: the replacement is built first and only
//! swapped in on success, so a failed build leaves the previous index
//! untouched. Rebuild-versus-query races cannot occur: the setters take
//! `&mut self` while every search borrows `&self`.

use numr::dtype::DType;
use numr::runtime::{Runtime, RuntimeClient};
use numr::tensor::Tensor;
use tracing::warn;

use crate::error::{SearchError, SearchResult};
use crate::geometry::PointCloud;
use crate::search::impl_generic::{float_tensor, index_tensor};
use crate::search::traits::nns::{
    HybridResult, KdIndex, KnnResult, NeighborSearchAlgorithms, RadiusResult, SearchOutput,
    SearchParam,
};

/// Nearest-neighbor search engine over a device-resident point set.
#[derive(Debug)]
pub struct KdTreeSearch<R: Runtime> {
    index: Option<KdIndex<R>>,
}

impl<R: Runtime> Default for KdTreeSearch<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Runtime> KdTreeSearch<R> {
    /// An engine with no index; every search fails with
    /// `UninitializedIndex` until a successful `set_geometry` or
    /// `set_matrix_data`.
    pub fn new() -> Self {
        Self { index: None }
    }

    /// Build an engine directly from a point cloud.
    pub fn from_geometry<C>(client: &C, geometry: &PointCloud<R>) -> SearchResult<Self>
    where
        C: NeighborSearchAlgorithms<R>,
    {
        let index = client.nns_build(geometry.points())?;
        Ok(Self { index: Some(index) })
    }

    /// The currently built index, if any.
    pub fn index(&self) -> Option<&KdIndex<R>> {
        self.index.as_ref()
    }

    fn built_index(&self, op: &'static str) -> SearchResult<&KdIndex<R>> {
        self.index.as_ref().ok_or_else(|| SearchError::UninitializedIndex {
            context: op.to_string(),
        })
    }

    /// Ingest a point cloud, replacing any previous index.
    ///
    /// Returns false (keeping the previous index) if the source holds zero
    /// points or has invalid dimensionality.
    pub fn set_geometry<C>(&mut self, client: &C, geometry: &PointCloud<R>) -> bool
    where
        C: NeighborSearchAlgorithms<R>,
    {
        match client.nns_build(geometry.points()) {
            Ok(index) => {
                self.index = Some(index);
                true
            }
            Err(err) => {
                warn!(error = %err, "set_geometry: rejected geometry source");
                false
            }
        }
    }

    /// Ingest a raw row-major `[n, d]` coordinate matrix, replacing any
    /// previous index. Same validation and failure behavior as
    /// `set_geometry`.
    pub fn set_matrix_data<C>(&mut self, client: &C, data: &Tensor<R>) -> bool
    where
        C: NeighborSearchAlgorithms<R>,
    {
        match client.nns_build(data) {
            Ok(index) => {
                self.index = Some(index);
                true
            }
            Err(err) => {
                warn!(error = %err, "set_matrix_data: rejected coordinate matrix");
                false
            }
        }
    }

    /// Execute the search mode selected by `param`.
    pub fn search<C>(
        &self,
        client: &C,
        query: &Tensor<R>,
        param: &SearchParam,
    ) -> SearchResult<SearchOutput<R>>
    where
        C: NeighborSearchAlgorithms<R>,
    {
        client.nns_search(self.built_index("search")?, query, param)
    }

    /// The `knn` nearest neighbors per query, sorted ascending.
    pub fn search_knn<C>(
        &self,
        client: &C,
        query: &Tensor<R>,
        knn: usize,
    ) -> SearchResult<KnnResult<R>>
    where
        C: NeighborSearchAlgorithms<R>,
    {
        client.nns_search_knn(self.built_index("search_knn")?, query, knn)
    }

    /// All neighbors with squared distance <= radius^2 per query.
    pub fn search_radius<C>(
        &self,
        client: &C,
        query: &Tensor<R>,
        radius: f64,
    ) -> SearchResult<RadiusResult<R>>
    where
        C: NeighborSearchAlgorithms<R>,
    {
        client.nns_search_radius(self.built_index("search_radius")?, query, radius)
    }

    /// Up to `max_nn` neighbors within `radius` per query, sorted ascending.
    pub fn search_hybrid<C>(
        &self,
        client: &C,
        query: &Tensor<R>,
        radius: f64,
        max_nn: usize,
    ) -> SearchResult<HybridResult<R>>
    where
        C: NeighborSearchAlgorithms<R>,
    {
        client.nns_search_hybrid(self.built_index("search_hybrid")?, query, radius, max_nn)
    }

    /// Run a single-point search and copy the result into caller-supplied
    /// device buffers, returning the neighbor count.
    ///
    /// `indices` must be I64 and `distances` must match the query dtype;
    /// each buffer's element count declares its capacity. For fixed-stride
    /// modes the required capacity is knowable up front (`min(knn, len)` or
    /// `max_nn`); for `Radius` the destination must be sized from a prior
    /// search's row-boundary table (allocate-then-copy). On success both
    /// handles are replaced with the flat `[count]` result; on any error the
    /// buffers are left untouched.
    pub fn search_into<C>(
        &self,
        client: &C,
        query: &Tensor<R>,
        param: &SearchParam,
        indices: &mut Tensor<R>,
        distances: &mut Tensor<R>,
    ) -> SearchResult<usize>
    where
        R: Runtime<DType = DType>,
        C: NeighborSearchAlgorithms<R> + RuntimeClient<R>,
    {
        let query_rows = query.shape().first().copied().unwrap_or(0);
        if query.shape().len() == 2 && query_rows != 1 {
            return Err(SearchError::InvalidParameter {
                parameter: "query".to_string(),
                message: "search_into takes a single query point".to_string(),
            });
        }
        if indices.dtype() != DType::I64 {
            return Err(SearchError::InvalidParameter {
                parameter: "indices".to_string(),
                message: format!(
                    "search_into requires an I64 index buffer, got {:?}",
                    indices.dtype()
                ),
            });
        }
        if distances.dtype() != query.dtype() {
            return Err(SearchError::InvalidParameter {
                parameter: "distances".to_string(),
                message: format!(
                    "search_into requires a distance buffer matching the query dtype {:?}, got {:?}",
                    query.dtype(),
                    distances.dtype()
                ),
            });
        }

        let output = self.search(client, query, param)?;
        let count = output.num_neighbors();

        let capacity = indices
            .shape()
            .iter()
            .product::<usize>()
            .min(distances.shape().iter().product::<usize>());
        if count > capacity {
            return Err(SearchError::BufferTooSmall {
                required: count,
                capacity,
                context: "search_into".to_string(),
            });
        }

        let (flat_indices, flat_distances) = if count == 0 {
            (
                index_tensor(&[], &[0], client.device()),
                float_tensor(&[], &[0], query.dtype(), client.device())?,
            )
        } else {
            match output {
                SearchOutput::Knn(r) => (
                    r.indices.reshape(&[count])?,
                    r.distances.reshape(&[count])?,
                ),
                SearchOutput::Radius(r) => (r.indices, r.distances),
                SearchOutput::Hybrid(r) => (
                    r.indices.narrow(1, 0, count)?.contiguous()?.reshape(&[count])?,
                    r.distances.narrow(1, 0, count)?.contiguous()?.reshape(&[count])?,
                ),
            }
        };

        *indices = flat_indices;
        *distances = flat_distances;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use numr::runtime::cpu::{CpuClient, CpuDevice, CpuRuntime};

    fn setup() -> (CpuClient, CpuDevice) {
        let device = CpuDevice::new();
        let client = CpuClient::new(device.clone());
        (client, device)
    }

    fn corner_cloud(device: &CpuDevice) -> PointCloud<CpuRuntime> {
        PointCloud::new(Tensor::<CpuRuntime>::from_slice(
            &[
                0.0, 0.0, 0.0, //
                1.0, 0.0, 0.0, //
                0.0, 1.0, 0.0, //
                5.0, 5.0, 5.0,
            ],
            &[4, 3],
            device,
        ))
        .unwrap()
    }

    #[test]
    fn test_search_before_build_fails() {
        let (client, device) = setup();
        let engine = KdTreeSearch::<CpuRuntime>::new();
        let query = Tensor::<CpuRuntime>::from_slice(&[0.0, 0.0, 0.0], &[1, 3], &device);

        let result = engine.search_knn(&client, &query, 1);
        assert!(matches!(
            result,
            Err(SearchError::UninitializedIndex { .. })
        ));
    }

    #[test]
    fn test_set_geometry_builds_index() {
        let (client, device) = setup();
        let mut engine = KdTreeSearch::new();

        assert!(engine.set_geometry(&client, &corner_cloud(&device)));
        let index = engine.index().unwrap();
        assert_eq!(index.len(), 4);
        assert_eq!(index.dimension(), 3);
    }

    #[test]
    fn test_set_matrix_data_zero_rows_keeps_prior_index() {
        let (client, device) = setup();
        let mut engine = KdTreeSearch::new();
        assert!(engine.set_geometry(&client, &corner_cloud(&device)));

        let empty = Tensor::<CpuRuntime>::from_slice::<f64>(&[], &[0, 3], &device);
        assert!(!engine.set_matrix_data(&client, &empty));

        // The previous index is still queryable.
        let query = Tensor::<CpuRuntime>::from_slice(&[0.0, 0.0, 0.0], &[1, 3], &device);
        let result = engine.search_knn(&client, &query, 1).unwrap();
        let indices: Vec<i64> = result.indices.to_vec();
        assert_eq!(indices, vec![0]);
    }

    #[test]
    fn test_set_matrix_data_replaces_index() {
        let (client, device) = setup();
        let mut engine = KdTreeSearch::new();
        assert!(engine.set_geometry(&client, &corner_cloud(&device)));

        let replacement =
            Tensor::<CpuRuntime>::from_slice(&[7.0, 7.0, 7.0, 8.0, 8.0, 8.0], &[2, 3], &device);
        assert!(engine.set_matrix_data(&client, &replacement));
        assert_eq!(engine.index().unwrap().len(), 2);

        let query = Tensor::<CpuRuntime>::from_slice(&[7.0, 7.0, 7.0], &[1, 3], &device);
        let result = engine.search_knn(&client, &query, 1).unwrap();
        let indices: Vec<i64> = result.indices.to_vec();
        assert_eq!(indices, vec![0]);
    }

    #[test]
    fn test_search_dispatch_counts() {
        let (client, device) = setup();
        let engine = KdTreeSearch::from_geometry(&client, &corner_cloud(&device)).unwrap();
        let query = Tensor::<CpuRuntime>::from_slice(&[0.0, 0.0, 0.0], &[1, 3], &device);

        let knn = engine
            .search(&client, &query, &SearchParam::Knn { knn: 2 })
            .unwrap();
        assert_eq!(knn.num_neighbors(), 2);

        let radius = engine
            .search(&client, &query, &SearchParam::Radius { radius: 1.5 })
            .unwrap();
        assert_eq!(radius.num_neighbors(), 3);
    }

    #[test]
    fn test_search_into_copies_and_counts() {
        let (client, device) = setup();
        let engine = KdTreeSearch::from_geometry(&client, &corner_cloud(&device)).unwrap();
        let query = Tensor::<CpuRuntime>::from_slice(&[0.0, 0.0, 0.0], &[1, 3], &device);

        let mut indices = Tensor::<CpuRuntime>::from_slice(&[0i64; 4], &[4], &device);
        let mut distances = Tensor::<CpuRuntime>::from_slice(&[0.0f64; 4], &[4], &device);

        let count = engine
            .search_into(
                &client,
                &query,
                &SearchParam::Radius { radius: 1.5 },
                &mut indices,
                &mut distances,
            )
            .unwrap();

        assert_eq!(count, 3);
        assert_eq!(indices.shape(), &[3]);
        let mut got: Vec<i64> = indices.to_vec();
        got.sort_unstable();
        assert_eq!(got, vec![0, 1, 2]);
    }

    #[test]
    fn test_search_into_rejects_small_buffer() {
        let (client, device) = setup();
        let engine = KdTreeSearch::from_geometry(&client, &corner_cloud(&device)).unwrap();
        let query = Tensor::<CpuRuntime>::from_slice(&[0.0, 0.0, 0.0], &[1, 3], &device);

        let mut indices = Tensor::<CpuRuntime>::from_slice(&[0i64; 2], &[2], &device);
        let mut distances = Tensor::<CpuRuntime>::from_slice(&[0.0f64; 2], &[2], &device);

        let result = engine.search_into(
            &client,
            &query,
            &SearchParam::Radius { radius: 1.5 },
            &mut indices,
            &mut distances,
        );
        assert!(matches!(
            result,
            Err(SearchError::BufferTooSmall {
                required: 3,
                capacity: 2,
                ..
            })
        ));
        // Failed calls leave the destination untouched.
        assert_eq!(indices.shape(), &[2]);
    }

    #[test]
    fn test_search_into_hybrid_strips_padding() {
        let (client, device) = setup();
        let engine = KdTreeSearch::from_geometry(&client, &corner_cloud(&device)).unwrap();
        let query = Tensor::<CpuRuntime>::from_slice(&[0.0, 0.0, 0.0], &[1, 3], &device);

        let mut indices = Tensor::<CpuRuntime>::from_slice(&[0i64; 8], &[8], &device);
        let mut distances = Tensor::<CpuRuntime>::from_slice(&[0.0f64; 8], &[8], &device);

        let count = engine
            .search_into(
                &client,
                &query,
                &SearchParam::Hybrid {
                    radius: 1.5,
                    max_nn: 8,
                },
                &mut indices,
                &mut distances,
            )
            .unwrap();

        assert_eq!(count, 3);
        assert_eq!(indices.shape(), &[3]);
        let got: Vec<i64> = indices.to_vec();
        assert!(got.iter().all(|&i| i >= 0));
    }

    #[test]
    fn test_search_into_rejects_batch_query() {
        let (client, device) = setup();
        let engine = KdTreeSearch::from_geometry(&client, &corner_cloud(&device)).unwrap();
        let batch =
            Tensor::<CpuRuntime>::from_slice(&[0.0, 0.0, 0.0, 1.0, 0.0, 0.0], &[2, 3], &device);

        let mut indices = Tensor::<CpuRuntime>::from_slice(&[0i64; 16], &[16], &device);
        let mut distances = Tensor::<CpuRuntime>::from_slice(&[0.0f64; 16], &[16], &device);

        let result = engine.search_into(
            &client,
            &batch,
            &SearchParam::Knn { knn: 2 },
            &mut indices,
            &mut distances,
        );
        assert!(matches!(result, Err(SearchError::InvalidParameter { .. })));
    }
}
