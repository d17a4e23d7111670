//! CPU implementation of nearest-neighbor search algorithms.

use crate::error::SearchResult;
use crate::search::impl_generic::{
    nns_build_impl, nns_search_hybrid_impl, nns_search_impl, nns_search_knn_impl,
    nns_search_radius_impl,
};
use crate::search::traits::nns::{
    HybridResult, KdIndex, KnnResult, NeighborSearchAlgorithms, RadiusResult, SearchOutput,
    SearchParam,
};
use numr::runtime::cpu::{CpuClient, CpuRuntime};
use numr::tensor::Tensor;

impl NeighborSearchAlgorithms<CpuRuntime> for CpuClient {
    fn nns_build(&self, points: &Tensor<CpuRuntime>) -> SearchResult<KdIndex<CpuRuntime>> {
        nns_build_impl(points)
    }

    fn nns_search(
        &self,
        index: &KdIndex<CpuRuntime>,
        query: &Tensor<CpuRuntime>,
        param: &SearchParam,
    ) -> SearchResult<SearchOutput<CpuRuntime>> {
        nns_search_impl(self, index, query, param)
    }

    fn nns_search_knn(
        &self,
        index: &KdIndex<CpuRuntime>,
        query: &Tensor<CpuRuntime>,
        knn: usize,
    ) -> SearchResult<KnnResult<CpuRuntime>> {
        nns_search_knn_impl(self, index, query, knn)
    }

    fn nns_search_radius(
        &self,
        index: &KdIndex<CpuRuntime>,
        query: &Tensor<CpuRuntime>,
        radius: f64,
    ) -> SearchResult<RadiusResult<CpuRuntime>> {
        nns_search_radius_impl(self, index, query, radius)
    }

    fn nns_search_hybrid(
        &self,
        index: &KdIndex<CpuRuntime>,
        query: &Tensor<CpuRuntime>,
        radius: f64,
        max_nn: usize,
    ) -> SearchResult<HybridResult<CpuRuntime>> {
        nns_search_hybrid_impl(self, index, query, radius, max_nn)
    }
}
