use crate::document::Corpus;
use tracing::debug;

/// PageRank parameters
pub struct AuthorityRanker {
    damping: f64,
    iterations: usize,
}

impl Default for AuthorityRanker {
    fn default() -> Self {
        Self {
            damping: 0.85,
            iterations: 20,
        }
    }
}

impl AuthorityRanker {
    pub fn new(damping: f64, iterations: usize) -> Self {
        Self {
            damping,
            iterations,
        }
    }

    /// Run the fixed-point iteration and return the raw (unnormalized) scores.
    ///
    /// Every round reads only the previous round's scores. A document without
    /// outgoing links contributes to nobody; links to documents outside the
    /// corpus still count towards the source's out-degree.
    pub fn raw_scores(&self, corpus: &Corpus) -> Vec<f64> {
        let documents = corpus.documents();
        let positions = corpus.url_positions();
        let mut scores: Vec<f64> = documents.iter().map(|d| d.authority_score).collect();

        for round in 0..self.iterations {
            let mut inflow = vec![0.0; documents.len()];
            for (source, doc) in documents.iter().enumerate() {
                let degree = doc.out_degree();
                if degree == 0 {
                    continue;
                }
                let share = scores[source] / degree as f64;
                for link in &doc.links {
                    if let Some(&target) = positions.get(link.as_str()) {
                        inflow[target] += share;
                    }
                }
            }

            scores = inflow
                .into_iter()
                .map(|sum| self.damping * sum + (1.0 - self.damping))
                .collect();
            debug!(round, "authority iteration complete");
        }

        scores
    }

    /// Compute authority scores, max-normalize them and store them on the documents.
    pub fn rank(&self, corpus: &mut Corpus) {
        let mut scores = self.raw_scores(corpus);
        normalize_max(&mut scores);
        for (doc, score) in corpus.documents_mut().iter_mut().zip(scores) {
            doc.authority_score = score;
        }
    }
}

/// Floor for the denominator of the inverse normalization
pub const MIN_DIVISOR: f64 = 0.00001;

/// Scale into [0, 1] by dividing by the maximum. All-zero input stays zero.
pub fn normalize_max(values: &mut [f64]) {
    let max = values.iter().copied().fold(0.0_f64, f64::max);
    if max == 0.0 {
        return;
    }
    for value in values.iter_mut() {
        *value /= max;
    }
}

/// Invert so that the smallest value maps to 1 and larger values approach 0.
pub fn normalize_inverse(values: &mut [f64]) {
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    if !min.is_finite() {
        return;
    }
    for value in values.iter_mut() {
        *value = min / value.max(MIN_DIVISOR);
    }
}
