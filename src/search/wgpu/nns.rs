//! WebGPU implementation of nearest-neighbor search algorithms.

use crate::error::SearchResult;
use crate::search::impl_generic::{
    nns_build_impl, nns_search_hybrid_impl, nns_search_impl, nns_search_knn_impl,
    nns_search_radius_impl,
};
use crate::search::traits::nns::{
    HybridResult, KdIndex, KnnResult, NeighborSearchAlgorithms, RadiusResult, SearchOutput,
    SearchParam,
};
use numr::runtime::wgpu::{WgpuClient, WgpuRuntime};
use numr::tensor::Tensor;

impl NeighborSearchAlgorithms<WgpuRuntime> for WgpuClient {
    fn nns_build(&self, points: &Tensor<WgpuRuntime>) -> SearchResult<KdIndex<WgpuRuntime>> {
        nns_build_impl(points)
    }

    fn nns_search(
        &self,
        index: &KdIndex<WgpuRuntime>,
        query: &Tensor<WgpuRuntime>,
        param: &SearchParam,
    ) -> SearchResult<SearchOutput<WgpuRuntime>> {
        nns_search_impl(self, index, query, param)
    }

    fn nns_search_knn(
        &self,
        index: &KdIndex<WgpuRuntime>,
        query: &Tensor<WgpuRuntime>,
        knn: usize,
    ) -> SearchResult<KnnResult<WgpuRuntime>> {
        nns_search_knn_impl(self, index, query, knn)
    }

    fn nns_search_radius(
        &self,
        index: &KdIndex<WgpuRuntime>,
        query: &Tensor<WgpuRuntime>,
        radius: f64,
    ) -> SearchResult<RadiusResult<WgpuRuntime>> {
        nns_search_radius_impl(self, index, query, radius)
    }

    fn nns_search_hybrid(
        &self,
        index: &KdIndex<WgpuRuntime>,
        query: &Tensor<WgpuRuntime>,
        radius: f64,
        max_nn: usize,
    ) -> SearchResult<HybridResult<WgpuRuntime>> {
        nns_search_hybrid_impl(self, index, query, radius, max_nn)
    }
}
