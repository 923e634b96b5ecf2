pub mod blob_detector;
pub mod color;
pub mod histogram;
pub mod keypoint;
pub mod optical_flow;
pub mod raster;
pub mod region;
pub mod video;
