use crate::bits::BitMatrix;

/// Compute the Hamming distance between two equal-length bit rows.
pub fn row_distance(a: &[u8], b: &[u8]) -> u32 {
    a.iter().zip(b).filter(|(x, y)| x != y).count() as u32
}

/// Distance of a bit matrix to its dimension's dictionary.
///
/// Each row contributes its smallest distance to any of the four codewords.
/// A matrix is a valid marker exactly when this is 0.
pub fn dictionary_distance(bits: &BitMatrix) -> u32 {
    let words = bits.dimension().codewords();
    (0..bits.dimension().size())
        .map(|i| {
            words
                .iter()
                .map(|w| row_distance(bits.row(i), w))
                .min()
                .unwrap_or(0)
        })
        .sum()
}

/// Return the first rotation (ascending index) with zero dictionary distance,
/// together with the rotated matrix.
pub fn find_exact_rotation(bits: &BitMatrix) -> Option<(usize, BitMatrix)> {
    bits.rotations()
        .into_iter()
        .enumerate()
        .find(|(_, r)| dictionary_distance(r) == 0)
}
