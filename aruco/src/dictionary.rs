use crate::error::DetectError;

/// Largest supported inner grid dimension.
pub const MAX_DIM: usize = 5;

/// Inner data grid size of a marker.
///
/// Each dimension has exactly one valid code family: four codeword rows of
/// length `d`. Every row of a valid marker must equal one of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "usize", into = "usize"))]
pub enum Dimension {
    Three,
    Four,
    #[default]
    Five,
}

const CODEWORDS_3: [&[u8]; 4] = [&[0, 1, 0], &[0, 0, 1], &[1, 1, 0], &[1, 1, 1]];
const CODEWORDS_4: [&[u8]; 4] = [&[0, 0, 1, 0], &[0, 0, 1, 1], &[1, 1, 1, 0], &[1, 0, 1, 1]];
const CODEWORDS_5: [&[u8]; 4] = [
    &[1, 0, 0, 0, 0],
    &[1, 0, 1, 1, 1],
    &[0, 1, 0, 0, 1],
    &[0, 1, 1, 1, 0],
];

impl Dimension {
    pub const ALL: [Dimension; 3] = [Dimension::Three, Dimension::Four, Dimension::Five];

    /// Number of data cells per side.
    pub fn size(self) -> usize {
        match self {
            Dimension::Three => 3,
            Dimension::Four => 4,
            Dimension::Five => 5,
        }
    }

    /// Cells per side including the one-cell quiet border.
    pub fn grid_size(self) -> usize {
        self.size() + 2
    }

    /// The four valid codeword rows for this dimension.
    pub fn codewords(self) -> &'static [&'static [u8]; 4] {
        match self {
            Dimension::Three => &CODEWORDS_3,
            Dimension::Four => &CODEWORDS_4,
            Dimension::Five => &CODEWORDS_5,
        }
    }

    /// Column indices that carry the two id bits of each row, MSB first.
    pub fn id_columns(self) -> [usize; 2] {
        match self {
            Dimension::Three => [0, 2],
            Dimension::Four => [0, 3],
            Dimension::Five => [1, 3],
        }
    }

    /// Number of distinct ids: 2 bits per row.
    pub fn id_count(self) -> u32 {
        1 << (2 * self.size())
    }
}

impl TryFrom<usize> for Dimension {
    type Error = DetectError;

    fn try_from(value: usize) -> Result<Self, Self::Error> {
        match value {
            3 => Ok(Dimension::Three),
            4 => Ok(Dimension::Four),
            5 => Ok(Dimension::Five),
            other => Err(DetectError::InvalidInput(format!(
                "marker dimension must be 3, 4 or 5, got {other}"
            ))),
        }
    }
}

impl From<Dimension> for usize {
    fn from(value: Dimension) -> Self {
        value.size()
    }
}
