use log::trace;

use crate::bits::BitMatrix;
use crate::dictionary::Dimension;
use crate::hamming::find_exact_rotation;

use super::candidate::Candidate;
use super::detector::Marker;
use super::image::{ImageU8, Rect};
use super::threshold::{otsu, threshold_in_place};
use super::warp::warp;

/// Sample the cell grid of a binarized, rectified marker image.
///
/// The image is split into `(d + 2)²` square cells of `size / (d + 2)`
/// pixels. A cell is white when more than half its pixels are non-zero. Any
/// white cell on the outer ring means there is no black border and the
/// candidate is rejected; otherwise the inner `d x d` cells are the bits.
pub fn read_bits(binary: &ImageU8, dimension: Dimension) -> Option<BitMatrix> {
    let grid = dimension.grid_size();
    let cell = binary.width / grid as u32;
    if cell == 0 {
        return None;
    }
    let is_white = |row: usize, col: usize| {
        let rect = Rect::square(col as u32 * cell, row as u32 * cell, cell);
        binary.count_non_zero(rect) > (rect.area() >> 1) as usize
    };

    for row in 0..grid {
        let on_edge = row == 0 || row == grid - 1;
        let step = if on_edge { 1 } else { grid - 1 };
        for col in (0..grid).step_by(step) {
            if is_white(row, col) {
                trace!("border cell ({row}, {col}) is white");
                return None;
            }
        }
    }

    let n = dimension.size();
    let mut bits = BitMatrix::new(dimension);
    for i in 0..n {
        for j in 0..n {
            bits.set(i, j, is_white(i + 1, j + 1) as u8);
        }
    }
    Some(bits)
}

/// Rotate a corner list so that entry `i` becomes `corners[(shift + i) % 4]`.
pub fn rotate_corners<T: Copy>(corners: &[T; 4], shift: usize) -> [T; 4] {
    std::array::from_fn(|i| corners[(shift + i) % 4])
}

/// Decode one candidate against the dictionary of `dimension`.
///
/// `warped` is a scratch image. Returns `None` when the quad cannot be
/// rectified, the border is broken, or no rotation of the bits is a valid
/// marker.
pub fn decode_candidate(
    gray: &ImageU8,
    candidate: &Candidate,
    dimension: Dimension,
    warp_size: u32,
    warped: &mut ImageU8,
) -> Option<Marker> {
    if !warp(gray, warped, &candidate.corners, warp_size) {
        trace!("degenerate quad {:?}", candidate.corners);
        return None;
    }
    let level = otsu(warped);
    threshold_in_place(warped, level);

    let bits = read_bits(warped, dimension)?;
    let Some((rotation, oriented)) = find_exact_rotation(&bits) else {
        trace!("no rotation of {:?} matches the dictionary", candidate.corners);
        return None;
    };

    Some(Marker {
        id: oriented.to_id(),
        corners: rotate_corners(&candidate.corners, (4 - rotation) % 4),
    })
}

/// Decode every candidate in order, keeping the ones that are markers.
pub fn decode_candidates(
    gray: &ImageU8,
    candidates: &[Candidate],
    dimension: Dimension,
    warp_size: u32,
    warped: &mut ImageU8,
) -> Vec<Marker> {
    candidates
        .iter()
        .filter_map(|c| decode_candidate(gray, c, dimension, warp_size, warped))
        .collect()
}
