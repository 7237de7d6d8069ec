use smallvec::SmallVec;

/// A pixel coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Squared Euclidean distance, exact in integer arithmetic.
    #[inline]
    pub fn distance_sq(&self, other: &Point) -> i64 {
        let dx = (self.x - other.x) as i64;
        let dy = (self.y - other.y) as i64;
        dx * dx + dy * dy
    }

    #[inline]
    pub fn distance(&self, other: &Point) -> f64 {
        (self.distance_sq(other) as f64).sqrt()
    }
}

impl From<Point> for [f64; 2] {
    fn from(p: Point) -> Self {
        [p.x as f64, p.y as f64]
    }
}

/// A simplified contour. Marker outlines reduce to a handful of vertices.
pub type Polygon = SmallVec<[Point; 8]>;

/// Cross product of (a - o) and (b - o).
#[inline]
pub fn cross(o: Point, a: Point, b: Point) -> i64 {
    (a.x - o.x) as i64 * (b.y - o.y) as i64 - (a.y - o.y) as i64 * (b.x - o.x) as i64
}

/// Simplify a closed contour with the Douglas-Peucker algorithm.
///
/// Every dropped point lies within `epsilon` of the kept polyline. The curve
/// is split at two mutually distant points and each half is simplified on
/// its own. Kept vertices come out in contour order, starting with the one
/// closest to the contour's first point.
pub fn approx_poly_dp(contour: &[Point], epsilon: f64) -> Polygon {
    let n = contour.len();
    if n < 3 {
        return contour.iter().copied().collect();
    }

    let a = farthest_from(contour, 0).0;
    let (b, dist_sq) = farthest_from(contour, a);
    if (dist_sq as f64) <= epsilon * epsilon {
        return std::iter::once(contour[a]).collect();
    }

    let mut kept: SmallVec<[usize; 8]> = SmallVec::new();
    let b_unwrapped = if b > a { b } else { b + n };
    simplify_chain(contour, a, b_unwrapped, epsilon, &mut kept);
    simplify_chain(contour, b_unwrapped, a + n, epsilon, &mut kept);

    let first = kept
        .iter()
        .enumerate()
        .min_by_key(|&(_, &idx)| idx)
        .map_or(0, |(pos, _)| pos);
    kept.rotate_left(first);
    kept.iter().map(|&idx| contour[idx]).collect()
}

/// Index of, and squared distance to, the point farthest from `contour[from]`.
fn farthest_from(contour: &[Point], from: usize) -> (usize, i64) {
    let origin = contour[from];
    contour
        .iter()
        .enumerate()
        .map(|(i, p)| (i, origin.distance_sq(p)))
        .fold((from, 0), |best, cur| if cur.1 > best.1 { cur } else { best })
}

/// Simplify the open chain `start..=end` (indices taken modulo the contour
/// length), appending the index of every kept vertex except `end`.
fn simplify_chain(
    contour: &[Point],
    start: usize,
    end: usize,
    epsilon: f64,
    out: &mut SmallVec<[usize; 8]>,
) {
    let n = contour.len();
    let mut stack: SmallVec<[(usize, usize); 32]> = SmallVec::new();
    stack.push((start, end));

    while let Some((s, e)) = stack.pop() {
        let ps = contour[s % n];
        let pe = contour[e % n];

        let mut max_dist = 0.0f64;
        let mut split = s;
        if e > s + 1 {
            let len = ps.distance(&pe);
            for i in (s + 1)..e {
                let p = contour[i % n];
                let d = if len > 0.0 {
                    cross(ps, pe, p).abs() as f64 / len
                } else {
                    ps.distance(&p)
                };
                if d > max_dist {
                    max_dist = d;
                    split = i;
                }
            }
        }

        if max_dist > epsilon {
            // Left half goes on top so vertices come out in contour order.
            stack.push((split, e));
            stack.push((s, split));
        } else {
            out.push(s % n);
        }
    }
}

/// Sum of edge lengths of a closed point loop.
pub fn perimeter(points: &[Point]) -> f64 {
    closed_edges(points).map(|(a, b)| a.distance(b)).sum()
}

/// Shortest edge of a closed point loop, 0 for fewer than two points.
pub fn min_edge_length(points: &[Point]) -> f64 {
    if points.len() < 2 {
        return 0.0;
    }
    closed_edges(points)
        .map(|(a, b)| a.distance(b))
        .fold(f64::INFINITY, f64::min)
}

/// Whether a closed polygon turns consistently in one direction.
///
/// Collinear vertices are tolerated; a polygon with no turn at all is not
/// convex.
pub fn is_contour_convex(points: &[Point]) -> bool {
    let n = points.len();
    if n < 3 {
        return false;
    }
    let mut sign = 0i64;
    for i in 0..n {
        let c = cross(points[i], points[(i + 1) % n], points[(i + 2) % n]);
        if c == 0 {
            continue;
        }
        if sign == 0 {
            sign = c.signum();
        } else if c.signum() != sign {
            return false;
        }
    }
    sign != 0
}

fn closed_edges(points: &[Point]) -> impl Iterator<Item = (&Point, &Point)> {
    points.iter().zip(points.iter().cycle().skip(1))
}
