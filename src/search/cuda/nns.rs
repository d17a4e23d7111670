//! CUDA implementation of nearest-neighbor search algorithms.

use crate::error::SearchResult;
use crate::search::impl_generic::{
    nns_build_impl, nns_search_hybrid_impl, nns_search_impl, nns_search_knn_impl,
    nns_search_radius_impl,
};
use crate::search::traits::nns::{
    HybridResult, KdIndex, KnnResult, NeighborSearchAlgorithms, RadiusResult, SearchOutput,
    SearchParam,
};
use numr::runtime::cuda::{CudaClient, CudaRuntime};
use numr::tensor::Tensor;

impl NeighborSearchAlgorithms<CudaRuntime> for CudaClient {
    fn nns_build(&self, points: &Tensor<CudaRuntime>) -> SearchResult<KdIndex<CudaRuntime>> {
        nns_build_impl(points)
    }

    fn nns_search(
        &self,
        index: &KdIndex<CudaRuntime>,
        query: &Tensor<CudaRuntime>,
        param: &SearchParam,
    ) -> SearchResult<SearchOutput<CudaRuntime>> {
        nns_search_impl(self, index, query, param)
    }

    fn nns_search_knn(
        &self,
        index: &KdIndex<CudaRuntime>,
        query: &Tensor<CudaRuntime>,
        knn: usize,
    ) -> SearchResult<KnnResult<CudaRuntime>> {
        nns_search_knn_impl(self, index, query, knn)
    }

    fn nns_search_radius(
        &self,
        index: &KdIndex<CudaRuntime>,
        query: &Tensor<CudaRuntime>,
        radius: f64,
    ) -> SearchResult<RadiusResult<CudaRuntime>> {
        nns_search_radius_impl(self, index, query, radius)
    }

    fn nns_search_hybrid(
        &self,
        index: &KdIndex<CudaRuntime>,
        query: &Tensor<CudaRuntime>,
        radius: f64,
        max_nn: usize,
    ) -> SearchResult<HybridResult<CudaRuntime>> {
        nns_search_hybrid_impl(self, index, query, radius, max_nn)
    }
}
