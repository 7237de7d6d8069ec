/// A 3x3 homography matrix.
#[derive(Debug, Clone, Copy)]
pub struct Homography {
    pub data: [[f64; 3]; 3],
}

impl Homography {
    /// Compute the homography mapping each `src[i]` onto `dst[i]`.
    ///
    /// Returns `None` when the correspondences are degenerate (three or more
    /// collinear points on either side).
    pub fn from_correspondences(src: &[[f64; 2]; 4], dst: &[[f64; 2]; 4]) -> Option<Self> {
        // Build 8x9 DLT system
        let mut a = [[0.0f64; 9]; 8];
        for i in 0..4 {
            let (sx, sy) = (src[i][0], src[i][1]);
            let (dx, dy) = (dst[i][0], dst[i][1]);

            let row0 = i * 2;
            a[row0][0] = sx;
            a[row0][1] = sy;
            a[row0][2] = 1.0;
            a[row0][6] = -sx * dx;
            a[row0][7] = -sy * dx;
            a[row0][8] = dx;

            let row1 = i * 2 + 1;
            a[row1][3] = sx;
            a[row1][4] = sy;
            a[row1][5] = 1.0;
            a[row1][6] = -sx * dy;
            a[row1][7] = -sy * dy;
            a[row1][8] = dy;
        }

        // Gaussian elimination with partial pivoting (8x9 augmented)
        for col in 0..8 {
            let mut max_val = a[col][col].abs();
            let mut max_row = col;
            for row in (col + 1)..8 {
                let v = a[row][col].abs();
                if v > max_val {
                    max_val = v;
                    max_row = row;
                }
            }
            if max_val < 1e-10 {
                return None;
            }

            if max_row != col {
                a.swap(col, max_row);
            }

            let pivot = a[col][col];
            for row in (col + 1)..8 {
                let factor = a[row][col] / pivot;
                for c in col..9 {
                    a[row][c] -= factor * a[col][c];
                }
            }
        }

        // Back-substitute with h[8] = 1
        let mut h = [0.0f64; 9];
        h[8] = 1.0;
        for row in (0..8).rev() {
            let mut sum = a[row][8];
            for c in (row + 1)..8 {
                sum -= a[row][c] * h[c];
            }
            h[row] = sum / a[row][row];
        }

        Some(Homography {
            data: [
                [h[0], h[1], h[2]],
                [h[3], h[4], h[5]],
                [h[6], h[7], h[8]],
            ],
        })
    }

    /// Map the pixel square `(0,0), (s,0), (s,s), (0,s)` with `s = size - 1`
    /// onto the quad `corners`, corner for corner.
    pub fn from_square(size: u32, corners: &[[f64; 2]; 4]) -> Option<Self> {
        let s = size.saturating_sub(1) as f64;
        let square = [[0.0, 0.0], [s, 0.0], [s, s], [0.0, s]];
        Self::from_correspondences(&square, corners)
    }

    /// Project a point through the homography.
    #[inline]
    pub fn project(&self, x: f64, y: f64) -> (f64, f64) {
        let h = &self.data;
        let xx = h[0][0] * x + h[0][1] * y + h[0][2];
        let yy = h[1][0] * x + h[1][1] * y + h[1][2];
        let zz = h[2][0] * x + h[2][1] * y + h[2][2];
        (xx / zz, yy / zz)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_square() {
        let corners = [[0.0, 0.0], [9.0, 0.0], [9.0, 9.0], [0.0, 9.0]];
        let h = Homography::from_square(10, &corners).unwrap();
        for (x, y) in [(0.0, 0.0), (4.5, 2.0), (9.0, 9.0)] {
            let (px, py) = h.project(x, y);
            assert!((px - x).abs() < 1e-9 && (py - y).abs() < 1e-9);
        }
    }

    #[test]
    fn scaling_square() {
        let corners = [[10.0, 10.0], [110.0, 10.0], [110.0, 110.0], [10.0, 110.0]];
        let h = Homography::from_square(11, &corners).unwrap();
        let (px, py) = h.project(5.0, 5.0);
        assert!((px - 60.0).abs() < 1e-6);
        assert!((py - 60.0).abs() < 1e-6);
    }

    #[test]
    fn project_all_corners_match() {
        let src = [[0.0, 0.0], [48.0, 0.0], [48.0, 48.0], [0.0, 48.0]];
        let corners = [[10.0, 20.0], [90.0, 15.0], [95.0, 85.0], [5.0, 90.0]];
        let h = Homography::from_correspondences(&src, &corners).unwrap();

        for i in 0..4 {
            let (px, py) = h.project(src[i][0], src[i][1]);
            assert!(
                (px - corners[i][0]).abs() < 1e-4 && (py - corners[i][1]).abs() < 1e-4,
                "corner {i}: expected ({}, {}), got ({px}, {py})",
                corners[i][0],
                corners[i][1],
            );
        }
    }

    #[test]
    fn corner_order_is_respected() {
        // Rotated assignment: square's (0,0) lands on the quad's top-right.
        let corners = [[40.0, 0.0], [40.0, 40.0], [0.0, 40.0], [0.0, 0.0]];
        let h = Homography::from_square(41, &corners).unwrap();
        let (px, py) = h.project(0.0, 0.0);
        assert!((px - 40.0).abs() < 1e-6 && py.abs() < 1e-6);
        let (px, py) = h.project(40.0, 0.0);
        assert!((px - 40.0).abs() < 1e-6 && (py - 40.0).abs() < 1e-6);
    }

    #[test]
    fn degenerate_returns_none() {
        let corners = [[5.0, 5.0], [5.0, 5.0], [5.0, 5.0], [5.0, 5.0]];
        assert!(Homography::from_square(49, &corners).is_none());
    }
}
