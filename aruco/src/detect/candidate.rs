use super::contour::Contour;
use super::polygon::{
    approx_poly_dp, cross, is_contour_convex, min_edge_length, perimeter, Point, Polygon,
};

#[cfg(feature = "parallel")]
use rayon::iter::{IntoParallelRefIterator, ParallelIterator};

/// Four marker corners.
///
/// Fresh from extraction the order is [top-right, bottom-right, bottom-left,
/// top-left]; after [`Candidate::normalize_winding`] the corners always turn
/// clockwise on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Candidate {
    pub corners: [Point; 4],
}

impl Candidate {
    pub fn new(corners: [Point; 4]) -> Self {
        Self { corners }
    }

    pub fn perimeter(&self) -> f64 {
        perimeter(&self.corners)
    }

    pub fn min_edge_length(&self) -> f64 {
        min_edge_length(&self.corners)
    }

    /// Swap corners 1 and 3 when corners 0, 1, 2 turn counter-clockwise.
    ///
    /// Idempotent: after one call the cross product is non-negative.
    pub fn normalize_winding(&mut self) {
        let [c0, c1, c2, _] = self.corners;
        if cross(c0, c1, c2) < 0 {
            self.corners.swap(1, 3);
        }
    }
}

/// How a simplified contour is turned into a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum CandidatePolicy {
    /// Fit a square from the extremal points along the diagonals x+y and x-y,
    /// whatever the polygon's vertex count.
    #[default]
    DiagonalProjection,
    /// Accept only simplified polygons with exactly four convex vertices.
    ConvexQuad,
}

/// Candidate extraction thresholds for one image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExtractParams {
    /// Contours with fewer points are too small to hold a marker grid.
    pub min_contour_points: usize,
    /// Second, image-scaled contour length threshold.
    pub min_contour_len: f64,
    /// Simplification tolerance as a fraction of contour length.
    pub epsilon: f64,
    /// Shortest acceptable quad edge in pixels.
    pub min_edge_len: f64,
    pub policy: CandidatePolicy,
}

/// Quad fitted to a polygon by [`fit_square`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SquareFit {
    /// Diagonal-projection corners: [top-right, bottom-right, bottom-left, top-left].
    pub quad: [Point; 4],
    /// Top edge length of the axis-extremal corner mapping.
    pub width: f64,
    /// Right edge length of the axis-extremal corner mapping.
    pub height: f64,
    pub is_square: bool,
}

/// Fit a square to a polygon from its extremal points.
///
/// Axis extremes (min/max x and y) orient the width and height measurement;
/// the returned quad is made of the points extremal along x+y and x-y, which
/// hug the corners of a rotated square more tightly. Returns `None` for an
/// empty polygon.
pub fn fit_square(poly: &[Point]) -> Option<SquareFit> {
    let first = *poly.first()?;
    let (mut right, mut left, mut top, mut bot) = (first, first, first, first);
    let (mut top_left, mut bot_right, mut top_right, mut bot_left) = (first, first, first, first);

    for &p in &poly[1..] {
        if p.x > right.x {
            right = p;
        }
        if p.y > bot.y {
            bot = p;
        }
        if p.x < left.x {
            left = p;
        }
        if p.y < top.y {
            top = p;
        }

        let g = p.x + p.y;
        if g < top_left.x + top_left.y {
            top_left = p;
        }
        if g > bot_right.x + bot_right.y {
            bot_right = p;
        }
        let g2 = p.x - p.y;
        if g2 < bot_left.x - bot_left.y {
            bot_left = p;
        }
        if g2 > top_right.x - top_right.y {
            top_right = p;
        }
    }

    // A topmost point right of the bottommost one means the square leans
    // left: the top point is its top-right corner.
    let (tr, tl, br) = if top.x > bot.x {
        (top, left, right)
    } else {
        (right, top, bot)
    };

    let width = tl.distance(&tr);
    let height = br.distance(&tr);
    // Literally width + height / 3; this loose bound is what accepts or
    // rejects candidates and must not be "corrected" to (width + height) / 3.
    let size_discrepancy = width + height / 3.0;
    let is_square = (width - height).abs() < size_discrepancy;

    Some(SquareFit {
        quad: [top_right, bot_right, bot_left, top_left],
        width,
        height,
        is_square,
    })
}

/// Result of evaluating one contour: the simplified polygon (if the contour
/// was long enough) and the candidate it yielded (if accepted).
type Evaluated = (Polygon, Option<Candidate>);

fn evaluate_contour(contour: &Contour, params: &ExtractParams) -> Option<Evaluated> {
    if contour.len() < params.min_contour_points
        || (contour.len() as f64) < params.min_contour_len
    {
        return None;
    }

    let poly = approx_poly_dp(&contour.points, contour.len() as f64 * params.epsilon);

    let quad = match params.policy {
        CandidatePolicy::DiagonalProjection => fit_square(&poly)
            .filter(|fit| fit.is_square)
            .map(|fit| fit.quad),
        CandidatePolicy::ConvexQuad => {
            if poly.len() == 4 && is_contour_convex(&poly) {
                Some([poly[0], poly[1], poly[2], poly[3]])
            } else {
                None
            }
        }
    };

    let candidate = quad
        .map(Candidate::new)
        .filter(|c| c.min_edge_length() >= params.min_edge_len);

    Some((poly, candidate))
}

/// Turn contours into square candidates.
///
/// Returns the polygons of every contour that passed the size filters (for
/// inspection) and the accepted candidates, both in contour order.
pub fn extract_candidates(
    contours: &[Contour],
    params: &ExtractParams,
) -> (Vec<Polygon>, Vec<Candidate>) {
    #[cfg(feature = "parallel")]
    let evaluated: Vec<Evaluated> = contours
        .par_iter()
        .filter_map(|c| evaluate_contour(c, params))
        .collect();

    #[cfg(not(feature = "parallel"))]
    let evaluated: Vec<Evaluated> = contours
        .iter()
        .filter_map(|c| evaluate_contour(c, params))
        .collect();

    let mut polygons = Vec::with_capacity(evaluated.len());
    let mut candidates = Vec::new();
    for (poly, candidate) in evaluated {
        polygons.push(poly);
        candidates.extend(candidate);
    }
    (polygons, candidates)
}

/// Bring every candidate into clockwise corner order.
pub fn normalize_windings(candidates: &mut [Candidate]) {
    for c in candidates.iter_mut() {
        c.normalize_winding();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pts(coords: &[(i32, i32)]) -> Vec<Point> {
        coords.iter().map(|&(x, y)| Point::new(x, y)).collect()
    }

    fn quad(coords: [(i32, i32); 4]) -> [Point; 4] {
        coords.map(|(x, y)| Point::new(x, y))
    }

    fn params(policy: CandidatePolicy) -> ExtractParams {
        ExtractParams {
            min_contour_points: 28,
            min_contour_len: 20.0,
            epsilon: 0.05,
            min_edge_len: 7.0,
            policy,
        }
    }

    /// Boundary of an axis-aligned square, one point per pixel step.
    fn square_contour(x0: i32, y0: i32, side: i32) -> Contour {
        let mut points = Vec::new();
        for y in 0..side {
            points.push(Point::new(x0, y0 + y));
        }
        for x in 0..side {
            points.push(Point::new(x0 + x, y0 + side));
        }
        for y in (1..=side).rev() {
            points.push(Point::new(x0 + side, y0 + y));
        }
        for x in (1..=side).rev() {
            points.push(Point::new(x0 + x, y0));
        }
        Contour { points, hole: false }
    }

    #[test]
    fn ideal_square_is_square() {
        let fit = fit_square(&pts(&[(0, 0), (10, 0), (10, 10), (0, 10)])).unwrap();
        assert!(fit.is_square);
        assert!((fit.width - 10.0).abs() < 1e-12);
        assert!((fit.height - 10.0).abs() < 1e-12);
        assert_eq!(fit.quad, quad([(10, 0), (10, 10), (0, 10), (0, 0)]));
    }

    #[test]
    fn collinear_quad_is_not_square() {
        // Vertical segment: width 0, height 15.
        let fit = fit_square(&pts(&[(0, 0), (0, 5), (0, 10), (0, 15)])).unwrap();
        assert!(!fit.is_square);
    }

    #[test]
    fn size_discrepancy_is_width_plus_third_of_height() {
        // Tall rectangle 10 wide, 40 high: |10 - 40| = 30 >= 10 + 40/3.
        let tall = fit_square(&pts(&[(0, 0), (10, 0), (10, 40), (0, 40)])).unwrap();
        assert!(!tall.is_square);
        // 10 wide, 25 high: 15 < 10 + 25/3 even though 15 > (10 + 25)/3.
        let loose = fit_square(&pts(&[(0, 0), (10, 0), (10, 25), (0, 25)])).unwrap();
        assert!(loose.is_square);
    }

    #[test]
    fn rotated_square_uses_diagonal_points() {
        let tilted = pts(&[(10, 0), (30, 10), (20, 30), (0, 20)]);
        let fit = fit_square(&tilted).unwrap();
        assert!(fit.is_square);
        // top-right = max(x - y), bottom-right = max(x + y), etc.
        assert_eq!(fit.quad, quad([(30, 10), (20, 30), (0, 20), (10, 0)]));
    }

    #[test]
    fn diagonal_ties_keep_first_point() {
        let diamond = pts(&[(20, 0), (40, 20), (20, 40), (0, 20)]);
        let fit = fit_square(&diamond).unwrap();
        assert!(fit.is_square);
        assert_eq!(fit.quad, quad([(20, 0), (40, 20), (20, 40), (20, 0)]));
    }

    #[test]
    fn fit_square_empty_polygon() {
        assert!(fit_square(&[]).is_none());
    }

    #[test]
    fn extract_accepts_square_contour() {
        let contours = vec![square_contour(10, 10, 30)];
        let (polys, cands) =
            extract_candidates(&contours, &params(CandidatePolicy::DiagonalProjection));
        assert_eq!(polys.len(), 1);
        assert_eq!(cands.len(), 1);
        assert_eq!(cands[0].corners, quad([(40, 10), (40, 40), (10, 40), (10, 10)]));
    }

    #[test]
    fn extract_convex_quad_policy() {
        let contours = vec![square_contour(5, 5, 20)];
        let (_, cands) = extract_candidates(&contours, &params(CandidatePolicy::ConvexQuad));
        assert_eq!(cands.len(), 1);
        let mut corners = cands[0].corners.to_vec();
        corners.sort_by_key(|p| (p.x, p.y));
        assert_eq!(corners, pts(&[(5, 5), (5, 25), (25, 5), (25, 25)]));
    }

    #[test]
    fn extract_skips_short_contours() {
        let contours = vec![square_contour(0, 0, 6)]; // 24 points < 28
        let (polys, cands) =
            extract_candidates(&contours, &params(CandidatePolicy::DiagonalProjection));
        assert!(polys.is_empty());
        assert!(cands.is_empty());
    }

    #[test]
    fn extract_rejects_short_edges() {
        let contours = vec![square_contour(0, 0, 30)];
        let mut p = params(CandidatePolicy::DiagonalProjection);
        p.min_edge_len = 31.0;
        let (polys, cands) = extract_candidates(&contours, &p);
        assert_eq!(polys.len(), 1);
        assert!(cands.is_empty());
    }

    #[test]
    fn extract_rejects_degenerate_contour() {
        // Contour folding back on itself along a line.
        let mut points = Vec::new();
        for x in 0..40 {
            points.push(Point::new(x, 0));
        }
        for x in (1..40).rev() {
            points.push(Point::new(x, 0));
        }
        let contours = vec![Contour { points, hole: false }];
        let (polys, cands) =
            extract_candidates(&contours, &params(CandidatePolicy::DiagonalProjection));
        assert_eq!(polys.len(), 1);
        assert!(cands.is_empty());
    }

    #[test]
    fn winding_fix_swaps_counter_clockwise() {
        let mut c = Candidate::new(quad([(10, 0), (0, 0), (0, 10), (10, 10)]));
        c.normalize_winding();
        assert_eq!(c.corners, quad([(10, 0), (10, 10), (0, 10), (0, 0)]));
    }

    #[test]
    fn winding_fix_is_idempotent() {
        let quads = [
            [(10, 0), (0, 0), (0, 10), (10, 10)],
            [(10, 0), (10, 10), (0, 10), (0, 0)],
            [(3, 1), (9, 4), (6, 12), (0, 8)],
            [(3, 1), (0, 8), (6, 12), (9, 4)],
        ];
        for q in quads {
            let mut once = Candidate::new(quad(q));
            once.normalize_winding();
            let mut twice = once;
            twice.normalize_winding();
            assert_eq!(once, twice);
            let [c0, c1, c2, _] = once.corners;
            assert!(cross(c0, c1, c2) >= 0);
        }
    }

    #[test]
    fn perimeter_of_candidate() {
        let c = Candidate::new(quad([(10, 0), (10, 10), (0, 10), (0, 0)]));
        assert!((c.perimeter() - 40.0).abs() < 1e-12);
        assert!((c.min_edge_length() - 10.0).abs() < 1e-12);
    }
}
