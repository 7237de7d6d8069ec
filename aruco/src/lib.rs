pub mod error;
pub mod dictionary;
pub mod bits;
pub mod hamming;
pub mod render;
pub mod detect;

pub use detect::candidate::CandidatePolicy;
pub use detect::detector::{Detector, DetectorConfig, Marker};
pub use detect::image::{Frame, ImageU8, PixelFormat};
pub use detect::polygon::Point;
pub use dictionary::Dimension;
pub use error::DetectError;
#[cfg(feature = "serde")]
pub use error::ConfigError;
