//! Device-resident geometry containers and bounding-volume utilities.

mod bounding_volume;
mod point_cloud;

pub use bounding_volume::{AxisAlignedBoundingBox, OrientedBoundingBox};
pub use point_cloud::PointCloud;
