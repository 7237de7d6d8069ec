use super::candidate::Candidate;

/// Drop candidates that outline (nearly) the same square as another one.
///
/// Two candidates are near when the mean squared distance between their
/// corresponding corners is below `min_dist²`. Of each near pair the one with
/// the smaller perimeter is suppressed; on a tie the later one goes. Every
/// pair is compared, including pairs where one side is already suppressed.
/// Survivors keep their input order.
pub fn suppress_near_duplicates(candidates: Vec<Candidate>, min_dist: f64) -> Vec<Candidate> {
    let n = candidates.len();
    let limit = min_dist * min_dist;
    let mut suppressed = vec![false; n];

    for i in 0..n {
        for j in (i + 1)..n {
            if mean_corner_distance_sq(&candidates[i], &candidates[j]) < limit {
                // Keep the larger one
                if candidates[i].perimeter() < candidates[j].perimeter() {
                    suppressed[i] = true;
                } else {
                    suppressed[j] = true;
                }
            }
        }
    }

    candidates
        .into_iter()
        .zip(suppressed)
        .filter_map(|(c, gone)| (!gone).then_some(c))
        .collect()
}

fn mean_corner_distance_sq(a: &Candidate, b: &Candidate) -> f64 {
    let sum: i64 = a
        .corners
        .iter()
        .zip(&b.corners)
        .map(|(p, q)| p.distance_sq(q))
        .sum();
    sum as f64 / 4.0
}
