use serde::{Deserialize, Serialize};

pub mod corpus;
pub mod engine;
pub mod error;
pub mod index;
pub mod tokenizer;

pub use corpus::MovieRecord;
pub use engine::{Engine, Recommender, DEFAULT_TOP_N};
pub use error::{EngineError, EngineResult};
pub use index::{CorpusIndex, IndexStats, Recommendation, ScoredDoc};

pub type TermId = u32;
pub type DocId = u32;

/// One indexed storyline. Only the index builds these; callers get `&Document`.
#[derive(Debug, Clone, Serialize)]
pub struct Document {
    pub title: String,
    pub raw_text: String,
    pub normalized_text: String,
    #[serde(skip)]
    pub vector: SparseVector,
}

/// L2-normalized tf-idf weights, sorted by term id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SparseVector {
    entries: Vec<(TermId, f64)>,
}

impl SparseVector {
    /// Builds a vector from raw weights, scaling it to unit length.
    /// A zero-norm input yields the empty vector.
    pub fn normalized(mut entries: Vec<(TermId, f64)>) -> Self {
        entries.retain(|(_, w)| *w != 0.0);
        entries.sort_by_key(|(tid, _)| *tid);
        let norm = entries.iter().map(|(_, w)| w * w).sum::<f64>().sqrt();
        if norm == 0.0 || !norm.is_finite() {
            return Self::default();
        }
        for (_, w) in entries.iter_mut() {
            *w /= norm;
        }
        Self { entries }
    }

    pub fn entries(&self) -> &[(TermId, f64)] { &self.entries }

    pub fn is_empty(&self) -> bool { self.entries.is_empty() }

    pub fn weight(&self, term: TermId) -> Option<f64> {
        self.entries
            .binary_search_by_key(&term, |(tid, _)| *tid)
            .ok()
            .map(|i| self.entries[i].1)
    }

    /// Cosine similarity. Both sides are unit length or empty, so this is a
    /// merge-join dot product; an empty side scores 0.
    pub fn cosine(&self, other: &SparseVector) -> f64 {
        let (a, b) = (&self.entries, &other.entries);
        let (mut i, mut j) = (0, 0);
        let mut dot = 0.0f64;
        while i < a.len() && j < b.len() {
            match a[i].0.cmp(&b[j].0) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => {
                    dot += a[i].1 * b[j].1;
                    i += 1;
                    j += 1;
                }
            }
        }
        dot.clamp(0.0, 1.0)
    }
}

/// How raw term counts and document frequencies become weights.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Weighting {
    /// Use `1 + ln(tf)` instead of the raw count.
    #[serde(default)]
    pub sublinear_tf: bool,
    #[serde(default)]
    pub idf: IdfScheme,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdfScheme {
    /// `ln((1 + N) / (1 + df)) + 1`
    #[default]
    Smooth,
    /// `ln(N / df)`
    Plain,
}

impl Weighting {
    pub fn tf(&self, count: u32) -> f64 {
        if count == 0 {
            0.0
        } else if self.sublinear_tf {
            1.0 + (count as f64).ln()
        } else {
            count as f64
        }
    }

    pub fn idf(&self, num_docs: u32, df: u32) -> f64 {
        let n = num_docs as f64;
        let df = df.max(1) as f64;
        match self.idf {
            IdfScheme::Smooth => ((1.0 + n) / (1.0 + df)).ln() + 1.0,
            IdfScheme::Plain => (n / df).ln(),
        }
    }
}
