//! Axis-aligned and oriented bounding boxes.
//!
//! Bounds, centers, and extents are small host-side scalars; containment
//! tests against full point sets run device-side and return the matching
//! dataset indices as an I64 tensor. These utilities share the point
//! containers with the search engine but do not depend on the spatial
//! index.

use numr::dtype::DType;
use numr::ops::{
    CompareOps, IndexingOps, LogicalOps, MatmulOps, ReduceOps, ScalarOps, TensorOps,
    TypeConversionOps,
};
use numr::runtime::{Runtime, RuntimeClient};
use numr::tensor::Tensor;

use crate::error::{SearchError, SearchResult};
use crate::search::impl_generic::{float_tensor, index_tensor, tensor_to_host_f64};
use crate::validation::{validate_points_2d, validate_points_dtype};

/// Axis-aligned bounding box with per-axis min and max bounds.
#[derive(Debug, Clone, PartialEq)]
pub struct AxisAlignedBoundingBox {
    pub min_bound: Vec<f64>,
    pub max_bound: Vec<f64>,
}

impl AxisAlignedBoundingBox {
    /// Create a box from explicit per-axis bounds.
    pub fn new(min_bound: Vec<f64>, max_bound: Vec<f64>) -> SearchResult<Self> {
        if min_bound.is_empty() || min_bound.len() != max_bound.len() {
            return Err(SearchError::DimensionMismatch {
                expected: min_bound.len().max(1),
                actual: max_bound.len(),
                context: "AxisAlignedBoundingBox::new".to_string(),
            });
        }
        Ok(Self {
            min_bound,
            max_bound,
        })
    }

    /// The box that encloses a device-resident `[n, d]` point set.
    pub fn create_from_points<R, C>(client: &C, points: &Tensor<R>) -> SearchResult<Self>
    where
        R: Runtime<DType = DType>,
        C: ReduceOps<R> + RuntimeClient<R>,
    {
        validate_points_dtype(points.dtype(), "AxisAlignedBoundingBox::create_from_points")?;
        validate_points_2d(points.shape(), "AxisAlignedBoundingBox::create_from_points")?;
        if points.shape()[0] == 0 {
            return Err(SearchError::EmptyDataset {
                context: "AxisAlignedBoundingBox::create_from_points".to_string(),
            });
        }

        let mins = client.min(points, &[0], false)?;
        let maxs = client.max(points, &[0], false)?;

        Ok(Self {
            min_bound: tensor_to_host_f64(&mins)?,
            max_bound: tensor_to_host_f64(&maxs)?,
        })
    }

    pub fn dimension(&self) -> usize {
        self.min_bound.len()
    }

    /// Per-axis edge lengths.
    pub fn get_extent(&self) -> Vec<f64> {
        self.max_bound
            .iter()
            .zip(&self.min_bound)
            .map(|(hi, lo)| hi - lo)
            .collect()
    }

    pub fn get_half_extent(&self) -> Vec<f64> {
        self.get_extent().into_iter().map(|e| e / 2.0).collect()
    }

    /// The largest per-axis edge length.
    pub fn get_max_extent(&self) -> f64 {
        self.get_extent().into_iter().fold(0.0, f64::max)
    }

    pub fn get_center(&self) -> Vec<f64> {
        self.min_bound
            .iter()
            .zip(&self.max_bound)
            .map(|(lo, hi)| (lo + hi) / 2.0)
            .collect()
    }

    pub fn volume(&self) -> f64 {
        self.get_extent().into_iter().product()
    }

    /// The eight corner points of a 3-D box as a device tensor `[8, 3]`.
    pub fn get_box_points<R: Runtime<DType = DType>>(
        &self,
        dtype: DType,
        device: &R::Device,
    ) -> SearchResult<Tensor<R>> {
        if self.dimension() != 3 {
            return Err(SearchError::DimensionMismatch {
                expected: 3,
                actual: self.dimension(),
                context: "AxisAlignedBoundingBox::get_box_points".to_string(),
            });
        }

        let mut corners = Vec::with_capacity(24);
        for mask in 0..8u32 {
            for axis in 0..3 {
                if mask & (1 << axis) == 0 {
                    corners.push(self.min_bound[axis]);
                } else {
                    corners.push(self.max_bound[axis]);
                }
            }
        }
        float_tensor(&corners, &[8, 3], dtype, device)
    }

    /// Dataset indices of the points inside the box (bounds inclusive),
    /// computed device-side and returned as an I64 tensor.
    pub fn get_point_indices_within_bounding_box<R, C>(
        &self,
        client: &C,
        points: &Tensor<R>,
    ) -> SearchResult<Tensor<R>>
    where
        R: Runtime<DType = DType>,
        C: CompareOps<R> + LogicalOps<R> + ReduceOps<R> + IndexingOps<R> + TypeConversionOps<R> + RuntimeClient<R>,
    {
        let op = "AxisAlignedBoundingBox::get_point_indices_within_bounding_box";
        validate_points_dtype(points.dtype(), op)?;
        validate_points_2d(points.shape(), op)?;
        if points.shape()[1] != self.dimension() {
            return Err(SearchError::DimensionMismatch {
                expected: self.dimension(),
                actual: points.shape()[1],
                context: op.to_string(),
            });
        }

        let dtype = points.dtype();
        let device = client.device();
        let d = self.dimension();
        let min_t = float_tensor::<R>(&self.min_bound, &[d], dtype, device)?
            .unsqueeze(0)?
            .broadcast_to(points.shape())?;
        let max_t = float_tensor::<R>(&self.max_bound, &[d], dtype, device)?
            .unsqueeze(0)?
            .broadcast_to(points.shape())?;

        let above = client.ge(points, &min_t)?;
        let below = client.le(points, &max_t)?;
        let inside = client.logical_and(&above, &below)?;

        select_rows_all_true(client, &inside, dtype)
    }
}

/// Oriented bounding box: center, rotation (columns are the box axes), and
/// full extent along each axis. 3-D only.
#[derive(Debug, Clone, PartialEq)]
pub struct OrientedBoundingBox {
    pub center: [f64; 3],
    /// Row-major 3x3 rotation matrix.
    pub rotation: [f64; 9],
    pub extent: [f64; 3],
}

impl OrientedBoundingBox {
    pub fn new(center: [f64; 3], rotation: [f64; 9], extent: [f64; 3]) -> Self {
        Self {
            center,
            rotation,
            extent,
        }
    }

    /// An axis-aligned box re-expressed with an identity rotation.
    pub fn create_from_axis_aligned_bounding_box(
        aabb: &AxisAlignedBoundingBox,
    ) -> SearchResult<Self> {
        if aabb.dimension() != 3 {
            return Err(SearchError::DimensionMismatch {
                expected: 3,
                actual: aabb.dimension(),
                context: "OrientedBoundingBox::create_from_axis_aligned_bounding_box".to_string(),
            });
        }

        let center = aabb.get_center();
        let extent = aabb.get_extent();
        Ok(Self {
            center: [center[0], center[1], center[2]],
            rotation: [1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0],
            extent: [extent[0], extent[1], extent[2]],
        })
    }

    pub fn volume(&self) -> f64 {
        self.extent.iter().product()
    }

    /// The eight corner points as a device tensor `[8, 3]`.
    pub fn get_box_points<R: Runtime<DType = DType>>(
        &self,
        dtype: DType,
        device: &R::Device,
    ) -> SearchResult<Tensor<R>> {
        let half = [
            self.extent[0] / 2.0,
            self.extent[1] / 2.0,
            self.extent[2] / 2.0,
        ];
        let mut corners = Vec::with_capacity(24);
        for mask in 0..8u32 {
            let signs = [
                if mask & 1 == 0 { -1.0 } else { 1.0 },
                if mask & 2 == 0 { -1.0 } else { 1.0 },
                if mask & 4 == 0 { -1.0 } else { 1.0 },
            ];
            for row in 0..3 {
                let mut value = self.center[row];
                for (col, sign) in signs.iter().enumerate() {
                    value += self.rotation[row * 3 + col] * sign * half[col];
                }
                corners.push(value);
            }
        }
        float_tensor(&corners, &[8, 3], dtype, device)
    }

    /// Dataset indices of the points inside the box, computed device-side:
    /// points are translated to the box center, rotated into the box frame,
    /// and tested against the half extents.
    pub fn get_point_indices_within_bounding_box<R, C>(
        &self,
        client: &C,
        points: &Tensor<R>,
    ) -> SearchResult<Tensor<R>>
    where
        R: Runtime<DType = DType>,
        C: TensorOps<R>
            + ScalarOps<R>
            + MatmulOps<R>
            + CompareOps<R>
            + LogicalOps<R>
            + ReduceOps<R>
            + IndexingOps<R>
            + TypeConversionOps<R>
            + RuntimeClient<R>,
    {
        let op = "OrientedBoundingBox::get_point_indices_within_bounding_box";
        validate_points_dtype(points.dtype(), op)?;
        validate_points_2d(points.shape(), op)?;
        if points.shape()[1] != 3 {
            return Err(SearchError::DimensionMismatch {
                expected: 3,
                actual: points.shape()[1],
                context: op.to_string(),
            });
        }

        let dtype = points.dtype();
        let device = client.device();
        let center_t = float_tensor::<R>(&self.center, &[3], dtype, device)?
            .unsqueeze(0)?
            .broadcast_to(points.shape())?;
        let rotation_t = float_tensor::<R>(&self.rotation, &[3, 3], dtype, device)?;
        let half: Vec<f64> = self.extent.iter().map(|e| e / 2.0).collect();
        let half_t = float_tensor::<R>(&half, &[3], dtype, device)?
            .unsqueeze(0)?
            .broadcast_to(points.shape())?;

        // Rows of (p - c) * R are the box-frame coordinates R^T (p - c).
        let centered = client.sub(points, &center_t)?;
        let local = client.matmul(&centered, &rotation_t)?;
        let magnitude = client.abs(&local)?;
        let inside = client.le(&magnitude, &half_t)?;

        select_rows_all_true(client, &inside, dtype)
    }
}

/// Reduce an `[n, d]` element-wise mask to the indices of rows that are true
/// on every axis.
fn select_rows_all_true<R, C>(
    client: &C,
    mask: &Tensor<R>,
    dtype: DType,
) -> SearchResult<Tensor<R>>
where
    R: Runtime<DType = DType>,
    C: CompareOps<R> + ReduceOps<R> + IndexingOps<R> + TypeConversionOps<R> + RuntimeClient<R>,
{
    let n = mask.shape()[0];
    let d = mask.shape()[1];
    let device = client.device();

    // Comparison ops may return the input dtype; normalize before counting.
    let mask_f = client.cast(mask, dtype)?;
    let counts = client.sum(&mask_f, &[1], false)?;
    let threshold = Tensor::<R>::full_scalar(&[], dtype, d as f64 - 0.5, device);
    let full_rows = client.ge(&counts, &threshold)?;
    let full_rows = client.cast(&full_rows, DType::U8)?;

    let all_indices: Vec<i64> = (0..n as i64).collect();
    let index_t = index_tensor::<R>(&all_indices, &[n], device);
    Ok(client.masked_select(&index_t, &full_rows)?)
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

    #[test]
    fn test_create_from_points() {
        let (client, device) = setup();
        let points = Tensor::<CpuRuntime>::from_slice(
            &[0.0, 0.0, 0.0, 1.0, 2.0, 3.0, -1.0, 0.5, 1.0],
            &[3, 3],
            &device,
        );

        let aabb = AxisAlignedBoundingBox::create_from_points(&client, &points).unwrap();
        assert_eq!(aabb.min_bound, vec![-1.0, 0.0, 0.0]);
        assert_eq!(aabb.max_bound, vec![1.0, 2.0, 3.0]);
        assert_eq!(aabb.get_extent(), vec![2.0, 2.0, 3.0]);
        assert_eq!(aabb.get_max_extent(), 3.0);
        assert_eq!(aabb.volume(), 12.0);
    }

    #[test]
    fn test_create_from_points_rejects_empty() {
        let (client, device) = setup();
        let points = Tensor::<CpuRuntime>::from_slice::<f64>(&[], &[0, 3], &device);

        let result = AxisAlignedBoundingBox::create_from_points(&client, &points);
        assert!(matches!(result, Err(SearchError::EmptyDataset { .. })));
    }

    #[test]
    fn test_box_points_are_corners() {
        let (_client, device) = setup();
        let aabb =
            AxisAlignedBoundingBox::new(vec![0.0, 0.0, 0.0], vec![1.0, 1.0, 1.0]).unwrap();

        let corners: Tensor<CpuRuntime> =
            aabb.get_box_points(DType::F64, &device).unwrap();
        assert_eq!(corners.shape(), &[8, 3]);

        let values: Vec<f64> = corners.to_vec();
        assert!(values.iter().all(|&v| v == 0.0 || v == 1.0));
        // First corner is the min bound, last is the max bound.
        assert_eq!(&values[0..3], &[0.0, 0.0, 0.0]);
        assert_eq!(&values[21..24], &[1.0, 1.0, 1.0]);
    }

    #[test]
    fn test_point_indices_within_aabb() {
        let (client, device) = setup();
        let aabb =
            AxisAlignedBoundingBox::new(vec![0.0, 0.0, 0.0], vec![1.0, 1.0, 1.0]).unwrap();
        let points = Tensor::<CpuRuntime>::from_slice(
            &[
                0.5, 0.5, 0.5, //
                2.0, 0.5, 0.5, //
                1.0, 1.0, 1.0, //
                -0.1, 0.5, 0.5,
            ],
            &[4, 3],
            &device,
        );

        let inside = aabb
            .get_point_indices_within_bounding_box(&client, &points)
            .unwrap();
        let indices: Vec<i64> = inside.to_vec();
        assert_eq!(indices, vec![0, 2]);
    }

    #[test]
    fn test_obb_from_aabb_volume_and_containment() {
        let (client, device) = setup();
        let aabb =
            AxisAlignedBoundingBox::new(vec![-1.0, -1.0, -1.0], vec![1.0, 1.0, 1.0]).unwrap();
        let obb = OrientedBoundingBox::create_from_axis_aligned_bounding_box(&aabb).unwrap();

        assert_eq!(obb.center, [0.0, 0.0, 0.0]);
        assert_eq!(obb.volume(), 8.0);

        let points = Tensor::<CpuRuntime>::from_slice(
            &[0.0, 0.0, 0.0, 0.9, -0.9, 0.9, 1.5, 0.0, 0.0],
            &[3, 3],
            &device,
        );
        let inside = obb
            .get_point_indices_within_bounding_box(&client, &points)
            .unwrap();
        let indices: Vec<i64> = inside.to_vec();
        assert_eq!(indices, vec![0, 1]);
    }

    #[test]
    fn test_rotated_obb_containment() {
        let (client, device) = setup();
        // Box rotated 45 degrees around z; half extents 1 along each axis.
        let s = std::f64::consts::FRAC_1_SQRT_2;
        let obb = OrientedBoundingBox::new(
            [0.0, 0.0, 0.0],
            [s, -s, 0.0, s, s, 0.0, 0.0, 0.0, 1.0],
            [2.0, 2.0, 2.0],
        );

        // (0.9, 0.9, 0) sits inside the unrotated unit cube but at ~1.27
        // along the rotated x axis, past the half extent of 1.
        let points = Tensor::<CpuRuntime>::from_slice(
            &[0.6, 0.6, 0.0, 0.9, 0.9, 0.0, 1.0, 0.0, 0.0],
            &[3, 3],
            &device,
        );
        let inside = obb
            .get_point_indices_within_bounding_box(&client, &points)
            .unwrap();
        let indices: Vec<i64> = inside.to_vec();
        assert_eq!(indices, vec![0, 2]);
    }
}
