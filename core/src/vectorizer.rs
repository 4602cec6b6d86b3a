use crate::tokenizer::tokenize;
use crate::TermId;
use std::collections::HashMap;

/// Sparse term vector with entries sorted by term id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SparseVector {
    dim: usize,
    entries: Vec<(TermId, f32)>,
}

impl SparseVector {
    pub fn dim(&self) -> usize { self.dim }
    pub fn entries(&self) -> &[(TermId, f32)] { &self.entries }
    pub fn is_empty(&self) -> bool { self.entries.is_empty() }

    pub fn norm(&self) -> f32 {
        self.entries.iter().map(|(_, w)| w * w).sum::<f32>().sqrt()
    }

    /// Dot product by merging the two sorted entry lists.
    pub fn dot(&self, other: &SparseVector) -> f32 {
        let (mut i, mut j, mut acc) = (0usize, 0usize, 0.0f32);
        while i < self.entries.len() && j < other.entries.len() {
            let (ta, wa) = self.entries[i];
            let (tb, wb) = other.entries[j];
            if ta == tb {
                acc += wa * wb;
                i += 1;
                j += 1;
            } else if ta < tb {
                i += 1;
            } else {
                j += 1;
            }
        }
        acc
    }
}

/// Cosine similarity in [0, 1]; exactly 0.0 when either side has zero magnitude.
pub fn cosine(a: &SparseVector, b: &SparseVector) -> f32 {
    let (na, nb) = (a.norm(), b.norm());
    if na == 0.0 || nb == 0.0 { return 0.0; }
    let sim = a.dot(b) / (na * nb);
    if sim.is_finite() { sim.clamp(0.0, 1.0) } else { 0.0 }
}

/// Term dictionary and document frequencies of one fitted corpus.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Vocabulary {
    pub dictionary: HashMap<String, TermId>,
    pub df: Vec<u32>,
}

impl Vocabulary {
    pub fn len(&self) -> usize { self.dictionary.len() }
    pub fn is_empty(&self) -> bool { self.dictionary.is_empty() }
    pub fn get(&self, term: &str) -> Option<TermId> { self.dictionary.get(term).copied() }
    pub fn contains(&self, term: &str) -> bool { self.dictionary.contains_key(term) }
}

/// Fitted TF-IDF state. Weights are raw term counts times smoothed idf,
/// `ln((1 + N) / (1 + df)) + 1`, L2-normalized per vector.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TfidfVectorizer {
    vocabulary: Vocabulary,
    idf: Vec<f32>,
    num_docs: u32,
}

impl TfidfVectorizer {
    /// Build the vocabulary from `docs` and return it with one vector per document, in input order.
    pub fn fit_transform<S: AsRef<str>>(docs: &[S]) -> (Self, Vec<SparseVector>) {
        let mut dictionary: HashMap<String, TermId> = HashMap::new();
        let mut df: Vec<u32> = Vec::new();
        let mut counts: Vec<HashMap<TermId, u32>> = Vec::with_capacity(docs.len());

        for doc in docs {
            let mut tf_counts: HashMap<TermId, u32> = HashMap::new();
            for term in tokenize(doc.as_ref()) {
                let next_id = dictionary.len() as TermId;
                let tid = *dictionary.entry(term).or_insert_with(|| {
                    df.push(0);
                    next_id
                });
                *tf_counts.entry(tid).or_insert(0) += 1;
            }
            for tid in tf_counts.keys() {
                df[*tid as usize] += 1;
            }
            counts.push(tf_counts);
        }

        let num_docs = docs.len() as u32;
        let n = num_docs as f32;
        let idf = df.iter().map(|&d| ((1.0 + n) / (1.0 + d as f32)).ln() + 1.0).collect();
        let vectorizer = Self { vocabulary: Vocabulary { dictionary, df }, idf, num_docs };
        let vectors = counts.into_iter().map(|c| vectorizer.weigh(c)).collect();
        (vectorizer, vectors)
    }

    /// Vectorize a query against the fitted vocabulary; unknown terms are dropped.
    pub fn transform(&self, text: &str) -> SparseVector {
        let mut tf_counts: HashMap<TermId, u32> = HashMap::new();
        for term in tokenize(text) {
            if let Some(tid) = self.vocabulary.get(&term) {
                *tf_counts.entry(tid).or_insert(0) += 1;
            }
        }
        self.weigh(tf_counts)
    }

    pub fn vocabulary(&self) -> &Vocabulary { &self.vocabulary }
    pub fn num_docs(&self) -> u32 { self.num_docs }
    pub fn idf(&self, term: &str) -> Option<f32> {
        self.vocabulary.get(term).map(|tid| self.idf[tid as usize])
    }

    fn weigh(&self, tf_counts: HashMap<TermId, u32>) -> SparseVector {
        let mut entries: Vec<(TermId, f32)> = tf_counts
            .into_iter()
            .map(|(tid, tf)| (tid, tf as f32 * self.idf[tid as usize]))
            .collect();
        entries.sort_by_key(|(tid, _)| *tid);
        let norm = entries.iter().map(|(_, w)| w * w).sum::<f32>().sqrt();
        if norm > 0.0 {
            for (_, w) in entries.iter_mut() { *w /= norm; }
        }
        SparseVector { dim: self.vocabulary.len(), entries }
    }
}
