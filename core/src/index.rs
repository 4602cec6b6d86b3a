use crate::vectorizer::{cosine, SparseVector, TfidfVectorizer};
use crate::StoryRecord;
use std::collections::HashSet;

/// In-memory TF-IDF index over a small corpus, ranked by cosine similarity.
///
/// `fit` rebuilds everything from scratch; there is no incremental path.
/// Readers and `fit` must be serialized by the caller when shared across threads.
#[derive(Debug, Clone, Default)]
pub struct SemanticIndex {
    vectorizer: TfidfVectorizer,
    doc_ids: Vec<String>,
    vectors: Vec<SparseVector>,
}

impl SemanticIndex {
    pub fn new() -> Self { Self::default() }

    /// Replace the vocabulary and vectors with ones built from `items`.
    /// When an id repeats, the first occurrence wins and later ones are skipped.
    pub fn fit<I, S, T>(&mut self, items: I)
    where
        I: IntoIterator<Item = (S, T)>,
        S: Into<String>,
        T: AsRef<str>,
    {
        let mut seen: HashSet<String> = HashSet::new();
        let mut doc_ids = Vec::new();
        let mut texts = Vec::new();
        for (id, text) in items {
            let id = id.into();
            if !seen.insert(id.clone()) {
                tracing::debug!(%id, "skipping duplicate document id");
                continue;
            }
            doc_ids.push(id);
            texts.push(text.as_ref().to_string());
        }

        let (vectorizer, vectors) = TfidfVectorizer::fit_transform(&texts);
        tracing::info!(num_docs = doc_ids.len(), num_terms = vectorizer.vocabulary().len(), "fitted index");
        *self = Self { vectorizer, doc_ids, vectors };
    }

    pub fn fit_records(&mut self, records: &[StoryRecord]) {
        self.fit(records.iter().map(|r| (r.id.clone(), r.search_text())));
    }

    /// Top-`k` `(id, score)` pairs by descending cosine similarity.
    /// Equal scores keep the order documents had at fit time.
    pub fn search(&self, query: &str, k: usize) -> Vec<(String, f32)> {
        if self.vectors.is_empty() || k == 0 { return Vec::new(); }
        let qv = self.vectorizer.transform(query);
        let mut scored: Vec<(usize, f32)> = self
            .vectors
            .iter()
            .enumerate()
            .map(|(i, dv)| (i, cosine(&qv, dv)))
            .collect();
        // stable: ties stay in fit order
        scored.sort_by(|a, b| b.1.total_cmp(&a.1));
        scored
            .into_iter()
            .take(k)
            .map(|(i, score)| (self.doc_ids[i].clone(), score))
            .collect()
    }

    pub fn len(&self) -> usize { self.doc_ids.len() }
    pub fn is_empty(&self) -> bool { self.doc_ids.is_empty() }
    pub fn doc_ids(&self) -> &[String] { &self.doc_ids }
    pub fn vectors(&self) -> &[SparseVector] { &self.vectors }
    pub fn vectorizer(&self) -> &TfidfVectorizer { &self.vectorizer }
    pub fn vocabulary_len(&self) -> usize { self.vectorizer.vocabulary().len() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_before_fit_is_empty() {
        let idx = SemanticIndex::new();
        assert!(idx.search("anything", 5).is_empty());
    }

    #[test]
    fn duplicate_ids_first_wins() {
        let mut idx = SemanticIndex::new();
        idx.fit(vec![("a", "budget planning"), ("a", "customer renewal"), ("b", "quarterly review")]);
        assert_eq!(idx.doc_ids(), &["a".to_string(), "b".to_string()]);
        assert!(!idx.vectorizer().vocabulary().contains("renewal"));
        let hits = idx.search("budget", 1);
        assert_eq!(hits[0].0, "a");
    }

    #[test]
    fn ties_keep_fit_order() {
        let mut idx = SemanticIndex::new();
        idx.fit(vec![("x", "alpha beta"), ("y", "gamma delta"), ("z", "epsilon zeta")]);
        let hits = idx.search("nothing matches", 10);
        let ids: Vec<&str> = hits.iter().map(|(id, _)| id.as_str()).collect();
        assert_eq!(ids, vec!["x", "y", "z"]);
        assert!(hits.iter().all(|(_, s)| *s == 0.0));
    }

    #[test]
    fn zero_k_returns_nothing() {
        let mut idx = SemanticIndex::new();
        idx.fit(vec![("a", "budget planning")]);
        assert!(idx.search("budget", 0).is_empty());
    }
}
