/// L2 norm, accumulated in f64 so long vectors keep their precision.
pub fn l2_norm(v: &[f32]) -> f64 {
    v.iter().map(|x| (*x as f64) * (*x as f64)).sum::<f64>().sqrt()
}

/// Scales `v` to unit length. Returns `None` for zero or non-finite norms,
/// which would make cosine similarity meaningless.
pub fn normalize(v: &[f32]) -> Option<Vec<f32>> {
    let norm = l2_norm(v);
    if norm == 0.0 || !norm.is_finite() {
        return None;
    }
    Some(v.iter().map(|x| ((*x as f64) / norm) as f32).collect())
}

/// Dot product of two equal-length vectors. For unit vectors this is the cosine similarity.
pub fn dot(a: &[f32], b: &[f32]) -> f64 {
    debug_assert_eq!(a.len(), b.len());
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (*x as f64) * (*y as f64))
        .sum()
}
