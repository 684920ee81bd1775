use std::cmp::Ordering;

/// Rank corpus vectors against a query vector and keep the top `k`.
///
/// All vectors are expected to be L2-normalized, so cosine similarity is a
/// plain dot product; an all-zero vector on either side contributes 0 to
/// every dot product, which gives the defined zero-similarity behavior
/// without a division guard. Selection is a full descending sort (fine at
/// this corpus scale) with ties broken by ascending corpus index, so equal
/// scores always come back in fetch order.
pub fn rank(query: &[f32], corpus: &[Vec<f32>], k: usize) -> Vec<(usize, f32)> {
    let mut scored: Vec<(usize, f32)> = corpus
        .iter()
        .enumerate()
        .map(|(i, doc)| (i, dot(query, doc)))
        .collect();
    scored.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.0.cmp(&b.0))
    });
    scored.truncate(k);
    scored
}

fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}
