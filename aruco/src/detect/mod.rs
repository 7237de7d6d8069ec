#[allow(clippy::needless_range_loop)]
pub mod image;
pub mod preprocess;
pub mod threshold;
pub mod contour;
pub mod polygon;
pub mod candidate;
pub mod dedup;
#[allow(clippy::needless_range_loop)]
pub mod homography;
pub mod warp;
pub mod decode;
pub mod detector;
