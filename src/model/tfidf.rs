//! TF-IDF text vectorization.
//!
//! Tokens are runs of two or more word characters in lower-cased text. The
//! vocabulary keeps the `max_features` most frequent terms across the corpus
//! (ties broken alphabetically) and is laid out in alphabetical order.
//! Weights are raw term counts times the smoothed inverse document frequency
//! `ln((1 + n) / (1 + df)) + 1`, and each row is L2-normalized.
//!
//! The vocabulary depends on the corpus seen by [`TfidfVectorizer::fit`];
//! matrices built from different fits are not comparable column for column.

use ndarray::Array2;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, warn};

static TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b\w\w+\b").expect("static regex"));

/// Split `text` into lower-cased tokens.
pub fn tokenize(text: &str) -> Vec<String> {
    let lower = text.to_lowercase();
    TOKEN
        .find_iter(&lower)
        .map(|m| m.as_str().to_string())
        .collect()
}

#[derive(Debug, Clone)]
pub struct TfidfVectorizer {
    max_features: usize,
    /// Terms in column order.
    terms: Vec<String>,
    index: HashMap<String, usize>,
    idf: Vec<f64>,
}

impl TfidfVectorizer {
    pub fn new(max_features: usize) -> Self {
        Self {
            max_features,
            terms: Vec::new(),
            index: HashMap::new(),
            idf: Vec::new(),
        }
    }

    /// Fitted vocabulary in column order.
    pub fn vocabulary(&self) -> &[String] {
        &self.terms
    }

    /// Learn the vocabulary and document frequencies from `docs`.
    pub fn fit<S: AsRef<str>>(&mut self, docs: &[S]) -> &mut Self {
        let mut term_freq: BTreeMap<String, usize> = BTreeMap::new();
        let mut doc_freq: HashMap<String, usize> = HashMap::new();

        for doc in docs {
            let mut seen: HashMap<String, usize> = HashMap::new();
            for token in tokenize(doc.as_ref()) {
                *seen.entry(token).or_default() += 1;
            }
            for (term, count) in seen {
                *term_freq.entry(term.clone()).or_default() += count;
                *doc_freq.entry(term).or_default() += 1;
            }
        }

        // BTreeMap iteration is alphabetical; the stable sort keeps that order among ties.
        let mut ranked: Vec<(String, usize)> = term_freq.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked.truncate(self.max_features);

        let mut terms: Vec<String> = ranked.into_iter().map(|(t, _)| t).collect();
        terms.sort();

        let n_docs = docs.len() as f64;
        self.idf = terms
            .iter()
            .map(|t| {
                let df = doc_freq.get(t).copied().unwrap_or(0) as f64;
                ((1.0 + n_docs) / (1.0 + df)).ln() + 1.0
            })
            .collect();
        self.index = terms
            .iter()
            .enumerate()
            .map(|(i, t)| (t.clone(), i))
            .collect();
        self.terms = terms;

        if self.terms.is_empty() {
            warn!(docs = docs.len(), "Empty vocabulary; text contributes no features");
        }
        debug!(vocabulary = self.terms.len(), "Fitted TF-IDF vocabulary");
        self
    }

    /// Weight `docs` against the fitted vocabulary. One row per document.
    pub fn transform<S: AsRef<str>>(&self, docs: &[S]) -> Array2<f64> {
        let mut out = Array2::<f64>::zeros((docs.len(), self.terms.len()));
        for (row, doc) in docs.iter().enumerate() {
            for token in tokenize(doc.as_ref()) {
                if let Some(&col) = self.index.get(&token) {
                    out[[row, col]] += 1.0;
                }
            }
            let mut r = out.row_mut(row);
            r.iter_mut().zip(&self.idf).for_each(|(w, idf)| *w *= idf);
            let norm = r.iter().map(|w| w * w).sum::<f64>().sqrt();
            if norm > 0.0 {
                r.mapv_inplace(|w| w / norm);
            }
        }
        out
    }

    pub fn fit_transform<S: AsRef<str>>(&mut self, docs: &[S]) -> Array2<f64> {
        self.fit(docs).transform(docs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_drops_single_chars() {
        assert_eq!(tokenize("A Rust guide, v2 & I/O!"), ["rust", "guide", "v2"]);
    }

    #[test]
    fn test_vocabulary_is_alphabetical() {
        let mut v = TfidfVectorizer::new(1000);
        v.fit(&["zeta alpha", "mid alpha"]);
        assert_eq!(v.vocabulary(), ["alpha", "mid", "zeta"]);
    }

    #[test]
    fn test_max_features_keeps_most_frequent() {
        let mut v = TfidfVectorizer::new(2);
        v.fit(&["common common rare", "common other", "other"]);
        assert_eq!(v.vocabulary(), ["common", "other"]);
    }

    #[test]
    fn test_rows_are_unit_length() {
        let mut v = TfidfVectorizer::new(1000);
        let x = v.fit_transform(&["test subtitle one", "test subtitle two", ""]);
        assert_eq!(x.dim(), (3, 4));
        for i in 0..2 {
            let norm: f64 = x.row(i).iter().map(|w| w * w).sum::<f64>().sqrt();
            assert!((norm - 1.0).abs() < 1e-12);
        }
        assert!(x.row(2).iter().all(|w| *w == 0.0));
    }

    #[test]
    fn test_rare_terms_weigh_more() {
        let mut v = TfidfVectorizer::new(1000);
        let x = v.fit_transform(&["shared unique", "shared"]);
        let shared = v.vocabulary().iter().position(|t| t == "shared").unwrap();
        let unique = v.vocabulary().iter().position(|t| t == "unique").unwrap();
        assert!(x[[0, unique]] > x[[0, shared]]);
        assert!((x[[1, shared]] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_empty_corpus_has_no_columns() {
        let mut v = TfidfVectorizer::new(1000);
        let x = v.fit_transform(&["", "a b"]);
        assert_eq!(x.dim(), (2, 0));
    }
}
