use crate::corpus::{load_records, MovieRecord};
use crate::error::{EngineError, EngineResult};
use crate::tokenizer::tokenize;
use crate::{DocId, Document, SparseVector, TermId, Weighting};
use serde::Serialize;
use std::collections::HashMap;
use std::path::Path;

/// A document id paired with its similarity to the query.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoredDoc {
    pub doc_id: DocId,
    pub score: f64,
}

/// A ranked result as exposed across the UI boundary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub doc_id: DocId,
    pub rank: usize,
    #[serde(rename = "Movie Name")]
    pub movie_name: String,
    #[serde(rename = "Storyline")]
    pub storyline: String,
    pub score: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct IndexStats {
    pub num_docs: u32,
    pub num_terms: u32,
    /// Records dropped at load for lacking a storyline.
    pub dropped_records: u32,
}

/// Immutable tf-idf index over a movie corpus.
///
/// `documents[i]` is the document with id `i`; ids follow source order.
/// Vocabulary, idf and vectors are fixed at build time.
#[derive(Debug)]
pub struct CorpusIndex {
    documents: Vec<Document>,
    dictionary: HashMap<String, TermId>,
    terms: Vec<String>,
    df: Vec<u32>,
    idf: Vec<f64>,
    weighting: Weighting,
    dropped_records: u32,
}

impl CorpusIndex {
    /// Load `source` and build an index from it.
    pub fn from_source<P: AsRef<Path>>(source: P, weighting: Weighting) -> EngineResult<Self> {
        let records = load_records(source.as_ref())?;
        Self::build(records, weighting)
    }

    /// Build from raw records, dropping those without a usable storyline.
    pub fn build(records: Vec<MovieRecord>, weighting: Weighting) -> EngineResult<Self> {
        let total = records.len();
        let mut kept: Vec<(String, String)> = Vec::with_capacity(total);
        for record in records {
            let Some(storyline) = record.usable_storyline().map(str::to_string) else { continue };
            let title = record.title.unwrap_or_else(|| {
                tracing::debug!(doc_id = kept.len(), "record has no title");
                String::new()
            });
            kept.push((title, storyline));
        }
        let dropped_records = (total - kept.len()) as u32;
        if kept.is_empty() {
            tracing::warn!(total, "no usable records in corpus");
            return Err(EngineError::EmptyCorpus);
        }

        // Pass 1: vocabulary in first-occurrence order, and document frequencies.
        let mut index = CorpusIndex {
            documents: Vec::with_capacity(kept.len()),
            dictionary: HashMap::new(),
            terms: Vec::new(),
            df: Vec::new(),
            idf: Vec::new(),
            weighting,
            dropped_records,
        };
        let mut doc_tokens: Vec<Vec<String>> = Vec::with_capacity(kept.len());
        for (_, storyline) in &kept {
            let tokens = tokenize(storyline);
            let mut seen: Vec<TermId> = Vec::new();
            for token in &tokens {
                let tid = index.intern(token);
                if !seen.contains(&tid) {
                    seen.push(tid);
                    index.df[tid as usize] += 1;
                }
            }
            doc_tokens.push(tokens);
        }

        let n = kept.len() as u32;
        index.idf = index.df.iter().map(|&df_t| weighting.idf(n, df_t)).collect();

        // Pass 2: weigh each document exactly as a query would be weighed.
        for ((title, raw_text), tokens) in kept.into_iter().zip(doc_tokens) {
            let vector = index.weigh(&tokens);
            let normalized_text = tokens.join(" ");
            index.documents.push(Document { title, raw_text, normalized_text, vector });
        }

        tracing::info!(num_docs = n, num_terms = index.terms.len(), dropped = dropped_records, "corpus indexed");
        Ok(index)
    }

    fn intern(&mut self, term: &str) -> TermId {
        if let Some(&tid) = self.dictionary.get(term) {
            return tid;
        }
        let tid = self.terms.len() as TermId;
        self.dictionary.insert(term.to_string(), tid);
        self.terms.push(term.to_string());
        self.df.push(0);
        tid
    }

    /// tf-idf vector for a token sequence. Out-of-vocabulary tokens are dropped.
    fn weigh(&self, tokens: &[String]) -> SparseVector {
        let mut counts: HashMap<TermId, u32> = HashMap::new();
        for token in tokens {
            if let Some(&tid) = self.dictionary.get(token.as_str()) {
                *counts.entry(tid).or_insert(0) += 1;
            }
        }
        let weights = counts
            .into_iter()
            .map(|(tid, tf_raw)| (tid, self.weighting.tf(tf_raw) * self.idf[tid as usize]))
            .collect();
        SparseVector::normalized(weights)
    }

    /// Project free text into the index's vector space.
    pub fn project(&self, text: &str) -> SparseVector {
        self.weigh(&tokenize(text))
    }

    /// Cosine similarity of `query` against every document.
    pub fn scores(&self, query: &str) -> Vec<ScoredDoc> {
        let q = self.project(query);
        self.documents
            .iter()
            .enumerate()
            .map(|(i, doc)| ScoredDoc { doc_id: i as DocId, score: q.cosine(&doc.vector) })
            .collect()
    }

    /// Top `k` documents by descending score; equal scores keep corpus order.
    /// A zero `k` or a blank query yields nothing.
    pub fn search(&self, query: &str, k: usize) -> Vec<ScoredDoc> {
        if k == 0 || query.trim().is_empty() {
            return Vec::new();
        }
        let mut scored = self.scores(query);
        // stable: ties stay in id order
        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(k);
        scored
    }

    /// [`Self::search`] with each hit resolved to its title and storyline.
    pub fn recommend(&self, query: &str, k: usize) -> Vec<Recommendation> {
        self.search(query, k)
            .into_iter()
            .enumerate()
            .filter_map(|(rank, hit)| {
                self.document(hit.doc_id).map(|doc| Recommendation {
                    doc_id: hit.doc_id,
                    rank: rank + 1,
                    movie_name: doc.title.clone(),
                    storyline: doc.raw_text.clone(),
                    score: hit.score,
                })
            })
            .collect()
    }

    pub fn documents(&self) -> &[Document] { &self.documents }

    pub fn document(&self, doc_id: DocId) -> Option<&Document> { self.documents.get(doc_id as usize) }

    pub fn len(&self) -> usize { self.documents.len() }

    pub fn is_empty(&self) -> bool { self.documents.is_empty() }

    pub fn vocabulary_len(&self) -> usize { self.terms.len() }

    pub fn term_id(&self, term: &str) -> Option<TermId> { self.dictionary.get(term).copied() }

    /// Terms in id order.
    pub fn terms(&self) -> &[String] { &self.terms }

    pub fn idf(&self, term: &str) -> Option<f64> {
        self.term_id(term).map(|tid| self.idf[tid as usize])
    }

    pub fn document_frequency(&self, term: &str) -> Option<u32> {
        self.term_id(term).map(|tid| self.df[tid as usize])
    }

    pub fn weighting(&self) -> Weighting { self.weighting }

    pub fn stats(&self) -> IndexStats {
        IndexStats {
            num_docs: self.documents.len() as u32,
            num_terms: self.terms.len() as u32,
            dropped_records: self.dropped_records,
        }
    }
}
