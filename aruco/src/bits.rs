use crate::dictionary::{Dimension, MAX_DIM};

/// A square grid of marker data bits, `d x d` with `d` in {3, 4, 5}.
///
/// Cells are indexed `[row][col]`; each cell is 0 (black) or 1 (white).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BitMatrix {
    dimension: Dimension,
    cells: [[u8; MAX_DIM]; MAX_DIM],
}

impl BitMatrix {
    /// Create an all-zero matrix.
    pub fn new(dimension: Dimension) -> Self {
        Self {
            dimension,
            cells: [[0; MAX_DIM]; MAX_DIM],
        }
    }

    /// Build a matrix from row slices. Returns `None` if the shape does not
    /// match `dimension` or a cell is not 0/1.
    pub fn from_rows(dimension: Dimension, rows: &[&[u8]]) -> Option<Self> {
        let n = dimension.size();
        if rows.len() != n {
            return None;
        }
        let mut m = Self::new(dimension);
        for (i, row) in rows.iter().enumerate() {
            if row.len() != n || row.iter().any(|&b| b > 1) {
                return None;
            }
            m.cells[i][..n].copy_from_slice(row);
        }
        Some(m)
    }

    /// Encode an id as the unique matrix whose rows are all dictionary
    /// codewords and whose id columns spell `id`, two bits per row.
    pub fn from_id(id: u32, dimension: Dimension) -> Option<Self> {
        if id >= dimension.id_count() {
            return None;
        }
        let n = dimension.size();
        let [a, b] = dimension.id_columns();
        let mut m = Self::new(dimension);
        for i in 0..n {
            let shift = 2 * (n - 1 - i);
            let hi = ((id >> (shift + 1)) & 1) as u8;
            let lo = ((id >> shift) & 1) as u8;
            let word = dimension
                .codewords()
                .iter()
                .find(|w| w[a] == hi && w[b] == lo)?;
            m.cells[i][..n].copy_from_slice(word);
        }
        Some(m)
    }

    pub fn dimension(&self) -> Dimension {
        self.dimension
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> u8 {
        self.cells[row][col]
    }

    #[inline]
    pub fn set(&mut self, row: usize, col: usize, bit: u8) {
        self.cells[row][col] = bit & 1;
    }

    /// Row `i` as a slice of `d` bits.
    pub fn row(&self, i: usize) -> &[u8] {
        &self.cells[i][..self.dimension.size()]
    }

    /// Rotate 90 degrees: `dst[i][j] = src[d-1-j][i]`.
    pub fn rotate90(&self) -> Self {
        let n = self.dimension.size();
        let mut out = Self::new(self.dimension);
        for i in 0..n {
            for j in 0..n {
                out.cells[i][j] = self.cells[n - 1 - j][i];
            }
        }
        out
    }

    /// All four rotations, index `k` being `k` successive 90 degree turns.
    pub fn rotations(&self) -> [Self; 4] {
        let r1 = self.rotate90();
        let r2 = r1.rotate90();
        let r3 = r2.rotate90();
        [*self, r1, r2, r3]
    }

    /// Pack the two id columns of every row, MSB first.
    pub fn to_id(&self) -> u32 {
        let [a, b] = self.dimension.id_columns();
        let mut id = 0u32;
        for i in 0..self.dimension.size() {
            id = (id << 1) | self.cells[i][a] as u32;
            id = (id << 1) | self.cells[i][b] as u32;
        }
        id
    }
}
