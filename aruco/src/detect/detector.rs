use log::debug;

use crate::dictionary::Dimension;
use crate::error::DetectError;
#[cfg(feature = "serde")]
use crate::error::ConfigError;

use super::candidate::{
    extract_candidates, normalize_windings, Candidate, CandidatePolicy, ExtractParams,
};
use super::contour::{find_contours, Contour};
use super::decode::decode_candidates;
use super::dedup::suppress_near_duplicates;
use super::image::{Frame, ImageU8};
use super::polygon::{Point, Polygon};
use super::preprocess::grayscale;
use super::threshold::adaptive_threshold;

/// A decoded marker.
///
/// `corners` start at the marker's top-left and run clockwise on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Marker {
    pub id: u32,
    pub corners: [Point; 4],
}

/// Detector configuration.
///
/// Length thresholds are fractions of the image width so that detection
/// behaves the same across resolutions.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DetectorConfig {
    /// Marker grid dimension searched for by [`Detector::detect`].
    pub dimension: Dimension,
    /// A pixel must be this much darker than its neighborhood mean to count
    /// as foreground in the adaptive threshold.
    pub adaptive_c: u8,
    /// Blur radius is `1 + width / blur_width_divisor`.
    pub blur_width_divisor: u32,
    /// Contours shorter than `width * min_contour_fraction` are dropped.
    pub min_contour_fraction: f64,
    /// Polygon simplification tolerance as a fraction of contour length.
    pub poly_epsilon: f64,
    /// Candidates closer than `width * min_marker_distance_fraction` are
    /// duplicates.
    pub min_marker_distance_fraction: f64,
    /// Side of the rectified marker image used for bit sampling.
    pub warp_size: u32,
    pub policy: CandidatePolicy,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            dimension: Dimension::Five,
            adaptive_c: 7,
            blur_width_divisor: 800,
            min_contour_fraction: 0.16,
            poly_epsilon: 0.05,
            min_marker_distance_fraction: 0.02,
            warp_size: 49,
            policy: CandidatePolicy::DiagonalProjection,
        }
    }
}

#[cfg(feature = "serde")]
impl DetectorConfig {
    /// Parse a TOML config. Missing keys keep their default values.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError::Parse(e.to_string()))
    }
}

/// A marker detector with reusable scratch buffers.
///
/// `detect` mutates the buffers in place, so one instance must not be shared
/// between threads running detection at the same time; use one detector per
/// thread. Buffers keep their allocation across calls.
#[derive(Debug, Default)]
pub struct Detector {
    pub config: DetectorConfig,
    gray: ImageU8,
    thresholded: ImageU8,
    blur: ImageU8,
    blur_tmp: ImageU8,
    warped: ImageU8,
    labels: Vec<i32>,
    contours: Vec<Contour>,
    polygons: Vec<Polygon>,
    candidates: Vec<Candidate>,
}

impl Detector {
    /// Create a detector with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: DetectorConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Detect markers of the configured dimension (5x5 by default) in a frame.
    pub fn detect(&mut self, frame: &Frame<'_>) -> Result<Vec<Marker>, DetectError> {
        self.detect_with_dimension(frame, self.config.dimension)
    }

    /// Detect markers of the given grid dimension in a frame.
    ///
    /// Markers come back in the order their outlines were found, scanning
    /// the image top to bottom.
    pub fn detect_with_dimension(
        &mut self,
        frame: &Frame<'_>,
        dimension: Dimension,
    ) -> Result<Vec<Marker>, DetectError> {
        let grid = dimension.grid_size() as u32;
        if self.config.warp_size < grid {
            return Err(DetectError::InvalidInput(format!(
                "warp size {} cannot hold a {grid}x{grid} cell grid",
                self.config.warp_size
            )));
        }
        if self.config.blur_width_divisor == 0 {
            return Err(DetectError::InvalidInput("blur width divisor must be non-zero".into()));
        }

        // Stage 1: Grayscale
        grayscale(frame, &mut self.gray)?;
        let width = self.gray.width;

        // Stage 2: Adaptive threshold
        let radius = 1 + width / self.config.blur_width_divisor;
        adaptive_threshold(
            &self.gray,
            &mut self.thresholded,
            &mut self.blur,
            &mut self.blur_tmp,
            radius,
            self.config.adaptive_c,
        );

        // Stage 3: Contours
        self.contours = find_contours(&self.thresholded, &mut self.labels);
        debug!("{} contours in {}x{} image", self.contours.len(), width, self.gray.height);

        // Stage 4: Candidates
        let params = ExtractParams {
            min_contour_points: grid as usize * 4,
            min_contour_len: width as f64 * self.config.min_contour_fraction,
            epsilon: self.config.poly_epsilon,
            min_edge_len: grid as f64,
            policy: self.config.policy,
        };
        let (polygons, mut candidates) = extract_candidates(&self.contours, &params);
        self.polygons = polygons;
        debug!("{} polygons, {} square candidates", self.polygons.len(), candidates.len());

        // Stage 5: Winding
        normalize_windings(&mut candidates);

        // Stage 6: Deduplication
        let min_dist = width as f64 * self.config.min_marker_distance_fraction;
        self.candidates = suppress_near_duplicates(candidates, min_dist);
        debug!("{} candidates after deduplication", self.candidates.len());

        // Stage 7: Decode
        let markers = decode_candidates(
            &self.gray,
            &self.candidates,
            dimension,
            self.config.warp_size,
            &mut self.warped,
        );
        debug!("{} markers decoded", markers.len());

        Ok(markers)
    }

    /// Contours traced by the last call.
    pub fn contours(&self) -> &[Contour] {
        &self.contours
    }

    /// Simplified polygons of the contours that passed the size filters.
    pub fn polygons(&self) -> &[Polygon] {
        &self.polygons
    }

    /// Candidates that reached the decoder in the last call.
    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    pub fn grayscale(&self) -> &ImageU8 {
        &self.gray
    }

    pub fn threshold_image(&self) -> &ImageU8 {
        &self.thresholded
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::decode::{decode_candidate, rotate_corners};
    use crate::render::render_marker;

    fn quad(coords: [(i32, i32); 4]) -> [Point; 4] {
        coords.map(|(x, y)| Point::new(x, y))
    }

    /// White scene with a 5x5 marker of `id`, 10 px cells, top-left at `(ox, oy)`.
    fn scene(id: u32, ox: u32, oy: u32) -> ImageU8 {
        let marker = render_marker(id, Dimension::Five, 10).unwrap();
        let mut img = ImageU8::filled(200, 200, 255);
        for y in 0..marker.height {
            for x in 0..marker.width {
                img.set(ox + x, oy + y, marker.get(x, y));
            }
        }
        img
    }

    #[test]
    fn detector_default_config() {
        let config = DetectorConfig::default();
        assert_eq!(config.dimension, Dimension::Five);
        assert_eq!(config.adaptive_c, 7);
        assert_eq!(config.blur_width_divisor, 800);
        assert!((config.min_contour_fraction - 0.16).abs() < 1e-12);
        assert!((config.poly_epsilon - 0.05).abs() < 1e-12);
        assert!((config.min_marker_distance_fraction - 0.02).abs() < 1e-12);
        assert_eq!(config.warp_size, 49);
        assert_eq!(config.policy, CandidatePolicy::DiagonalProjection);
    }

    #[test]
    fn detect_empty_image_no_markers() {
        let mut det = Detector::new();
        let img = ImageU8::filled(100, 100, 128);
        let markers = det.detect(&Frame::from(&img)).unwrap();
        assert!(markers.is_empty());
        assert!(det.candidates().is_empty());
    }

    #[test]
    fn detect_synthetic_marker() {
        let img = scene(0, 65, 65);
        let mut det = Detector::new();
        let markers = det.detect(&Frame::from(&img)).unwrap();
        assert_eq!(markers.len(), 1, "{markers:?}");
        assert_eq!(markers[0].id, 0);
        assert_eq!(markers[0].corners, quad([(65, 65), (134, 65), (134, 134), (65, 134)]));
    }

    #[test]
    fn introspection_reflects_last_call() {
        let img = scene(0, 65, 65);
        let mut det = Detector::new();
        let markers = det.detect(&Frame::from(&img)).unwrap();
        assert_eq!(markers.len(), 1);
        let outline = det
            .candidates()
            .iter()
            .find(|c| (0..4).any(|k| rotate_corners(&c.corners, k) == markers[0].corners));
        assert!(outline.is_some(), "{:?} not among {:?}", markers[0], det.candidates());
        assert!(!det.contours().is_empty());
        assert!(!det.polygons().is_empty());
        assert!(!det.candidates().is_empty());
        assert_eq!((det.grayscale().width, det.grayscale().height), (200, 200));
        assert_eq!(det.threshold_image().buf.len(), 200 * 200);

        det.detect(&Frame::from(&ImageU8::filled(50, 40, 255))).unwrap();
        assert!(det.contours().is_empty());
        assert!(det.candidates().is_empty());
        assert_eq!(det.grayscale().width, 50);
    }

    #[test]
    fn elongated_white_column_reaches_decoder() {
        // The white middle column of id 0 is traced as an 11x51 outline. Its
        // extremal width of about 52 against height 11 still passes the
        // squareness test, so it is only rejected by the border check.
        let img = scene(0, 65, 65);
        let mut det = Detector::new();
        let markers = det.detect(&Frame::from(&img)).unwrap();
        assert_eq!(markers.len(), 1);

        let candidates = det.candidates();
        assert_eq!(candidates.len(), 2, "{candidates:?}");
        assert_eq!(candidates[0].corners, quad([(134, 65), (134, 134), (65, 134), (65, 65)]));
        assert_eq!(candidates[1].corners, quad([(85, 74), (85, 125), (74, 125), (74, 74)]));

        let mut warped = ImageU8::default();
        let column = &candidates[1];
        let rejected = decode_candidate(det.grayscale(), column, Dimension::Five, 49, &mut warped);
        assert!(rejected.is_none());
        let outline = &candidates[0];
        let decoded = decode_candidate(det.grayscale(), outline, Dimension::Five, 49, &mut warped);
        assert_eq!(decoded, Some(markers[0]));
    }

    #[test]
    fn configured_dimension_is_used_by_detect() {
        let marker = render_marker(0, Dimension::Four, 10).unwrap();
        let mut img = ImageU8::filled(200, 200, 255);
        for y in 0..marker.height {
            for x in 0..marker.width {
                img.set(70 + x, 70 + y, marker.get(x, y));
            }
        }
        let frame = Frame::from(&img);

        let mut det = Detector::with_config(DetectorConfig {
            dimension: Dimension::Four,
            ..DetectorConfig::default()
        });
        let markers = det.detect(&frame).unwrap();
        assert_eq!(markers.len(), 1, "{markers:?}");
        assert_eq!(markers[0].id, 0);
        assert_eq!(det.detect_with_dimension(&frame, Dimension::Four).unwrap(), markers);
    }

    #[test]
    fn small_warp_size_is_invalid() {
        let mut det = Detector::with_config(DetectorConfig {
            warp_size: 6,
            ..DetectorConfig::default()
        });
        let img = ImageU8::filled(20, 20, 255);
        assert!(matches!(
            det.detect(&Frame::from(&img)),
            Err(DetectError::InvalidInput(_))
        ));
        // A 4x4 grid plus border fits in 6 pixels.
        assert!(det
            .detect_with_dimension(&Frame::from(&img), Dimension::Four)
            .is_ok());
    }

    #[test]
    fn zero_size_frame_is_invalid() {
        let mut det = Detector::new();
        let res = det.detect(&Frame::gray(0, 0, &[]));
        assert!(matches!(res, Err(DetectError::InvalidInput(_))));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn config_from_partial_toml() {
        let text = "dimension = 4\nadaptive_c = 9\npolicy = \"convex_quad\"\n";
        let config = DetectorConfig::from_toml_str(text).unwrap();
        assert_eq!(config.dimension, Dimension::Four);
        assert_eq!(config.adaptive_c, 9);
        assert_eq!(config.policy, CandidatePolicy::ConvexQuad);
        assert_eq!(config.warp_size, 49);

        assert!(DetectorConfig::from_toml_str("warp_size = \"big\"").is_err());
        assert!(DetectorConfig::from_toml_str("dimension = 6").is_err());
    }
}
