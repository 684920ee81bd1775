use crate::tokenizer::tokenize;
use std::collections::HashMap;

/// Term to column index, assigned in first-seen order across the batch.
pub type Vocabulary = HashMap<String, usize>;

/// Build TF-IDF weight vectors for one batch of texts.
///
/// Weighting is the smoothed scheme `tf * (ln((1 + N) / (1 + df)) + 1)`
/// with N the batch size and df counted over this batch only, followed by
/// L2 normalization of each row. The constants match scikit-learn's
/// `TfidfVectorizer` defaults so scores are reproducible across runs.
///
/// Rows come back in input order, one per text. A text with no surviving
/// terms (empty, or all stopwords) yields an all-zero row; an all-zero row
/// is left unnormalized rather than divided by a zero norm.
pub fn vectorize(texts: &[&str]) -> (Vocabulary, Vec<Vec<f32>>) {
    let token_lists: Vec<Vec<String>> = texts.iter().map(|t| tokenize(t)).collect();

    let mut vocabulary: Vocabulary = HashMap::new();
    let mut df: Vec<u32> = Vec::new();
    for tokens in &token_lists {
        let mut seen_in_doc: Vec<bool> = vec![false; vocabulary.len()];
        for term in tokens {
            let next_id = vocabulary.len();
            let col = *vocabulary.entry(term.clone()).or_insert(next_id);
            if col == df.len() {
                df.push(1);
                seen_in_doc.push(true);
            } else if !seen_in_doc[col] {
                df[col] += 1;
                seen_in_doc[col] = true;
            }
        }
    }

    let n = texts.len() as f32;
    let idf: Vec<f32> = df
        .iter()
        .map(|&d| ((1.0 + n) / (1.0 + d as f32)).ln() + 1.0)
        .collect();

    let mut matrix: Vec<Vec<f32>> = Vec::with_capacity(token_lists.len());
    for tokens in &token_lists {
        let mut tf: HashMap<usize, u32> = HashMap::new();
        for term in tokens {
            *tf.entry(vocabulary[term]).or_insert(0) += 1;
        }
        let mut row = vec![0.0f32; vocabulary.len()];
        for (col, count) in tf {
            row[col] = count as f32 * idf[col];
        }
        let norm = row.iter().map(|w| w * w).sum::<f32>().sqrt();
        if norm > 0.0 {
            for w in &mut row {
                *w /= norm;
            }
        }
        matrix.push(row);
    }

    (vocabulary, matrix)
}
