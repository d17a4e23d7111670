//! Device-resident point cloud container.

use numr::dtype::DType;
use numr::runtime::Runtime;
use numr::tensor::Tensor;

use crate::error::SearchResult;
use crate::validation::{validate_points_2d, validate_points_dtype};

/// An ordered set of fixed-dimension points held in device memory.
///
/// The tensor is the source of truth for the coordinates; a host-side mirror
/// exists only inside a built spatial index. The storage is replaced
/// wholesale via [`set_points`](PointCloud::set_points); there is no
/// incremental edit.
#[derive(Debug, Clone)]
pub struct PointCloud<R: Runtime> {
    points: Tensor<R>,
}

impl<R: Runtime> PointCloud<R> {
    /// Wrap an `[n, d]` coordinate tensor.
    ///
    /// Rejects non-2-D storage, zero dimension, and non-float dtypes. A
    /// zero-row cloud is valid; it only fails once handed to an index build.
    pub fn new(points: Tensor<R>) -> SearchResult<Self>
    where
        R: Runtime<DType = DType>,
    {
        validate_points_dtype(points.dtype(), "PointCloud::new")?;
        validate_points_2d(points.shape(), "PointCloud::new")?;
        Ok(Self { points })
    }

    /// The device-resident coordinate tensor `[n, d]`.
    pub fn points(&self) -> &Tensor<R> {
        &self.points
    }

    /// Number of points.
    pub fn len(&self) -> usize {
        self.points.shape()[0]
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether the cloud holds at least one point.
    pub fn has_points(&self) -> bool {
        !self.is_empty()
    }

    /// Dimensionality of each point (3 for point clouds).
    pub fn dimension(&self) -> usize {
        self.points.shape()[1]
    }

    /// Replace the stored coordinates wholesale.
    ///
    /// The replacement is validated like [`new`](PointCloud::new); on error
    /// the previous storage is kept.
    pub fn set_points(&mut self, points: Tensor<R>) -> SearchResult<()>
    where
        R: Runtime<DType = DType>,
    {
        validate_points_dtype(points.dtype(), "PointCloud::set_points")?;
        validate_points_2d(points.shape(), "PointCloud::set_points")?;
        self.points = points;
        Ok(())
    }

    /// Consume the cloud, returning the coordinate tensor.
    pub fn into_points(self) -> Tensor<R> {
        self.points
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use numr::runtime::cpu::{CpuDevice, CpuRuntime};

    #[test]
    fn test_new_and_accessors() {
        let device = CpuDevice::new();
        let points =
            Tensor::<CpuRuntime>::from_slice(&[0.0, 0.0, 0.0, 1.0, 2.0, 3.0], &[2, 3], &device);
        let cloud = PointCloud::new(points).unwrap();

        assert_eq!(cloud.len(), 2);
        assert_eq!(cloud.dimension(), 3);
        assert!(cloud.has_points());
        assert!(!cloud.is_empty());
    }

    #[test]
    fn test_rejects_invalid_storage() {
        let device = CpuDevice::new();

        let one_d = Tensor::<CpuRuntime>::from_slice(&[0.0, 1.0, 2.0], &[3], &device);
        assert!(PointCloud::new(one_d).is_err());

        let zero_dim = Tensor::<CpuRuntime>::from_slice::<f64>(&[], &[3, 0], &device);
        assert!(PointCloud::new(zero_dim).is_err());

        let ints = Tensor::<CpuRuntime>::from_slice(&[1i64, 2, 3], &[1, 3], &device);
        assert!(PointCloud::new(ints).is_err());
    }

    #[test]
    fn test_set_points_keeps_storage_on_error() {
        let device = CpuDevice::new();
        let points =
            Tensor::<CpuRuntime>::from_slice(&[0.0, 0.0, 0.0, 1.0, 2.0, 3.0], &[2, 3], &device);
        let mut cloud = PointCloud::new(points).unwrap();

        let bad = Tensor::<CpuRuntime>::from_slice(&[0.0, 1.0], &[2], &device);
        assert!(cloud.set_points(bad).is_err());
        assert_eq!(cloud.len(), 2);

        let good = Tensor::<CpuRuntime>::from_slice(&[9.0, 9.0], &[1, 2], &device);
        cloud.set_points(good).unwrap();
        assert_eq!(cloud.len(), 1);
        assert_eq!(cloud.dimension(), 2);
    }
}
