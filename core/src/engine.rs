//! Process-wide index holder.
//!
//! One build runs at a time. A finished index is published by swapping an
//! `Arc` under a short write lock; queries clone the current `Arc` and score
//! without holding any lock, so they always see one whole index.

use crate::corpus::MovieRecord;
use crate::error::{EngineError, EngineResult};
use crate::index::{CorpusIndex, IndexStats, Recommendation};
use crate::Weighting;
use parking_lot::{Mutex, RwLock};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Number of recommendations handed to the presentation layer.
pub const DEFAULT_TOP_N: usize = 5;

pub struct Engine {
    weighting: Weighting,
    current: RwLock<Option<Arc<CorpusIndex>>>,
    build_lock: Mutex<()>,
}

impl Default for Engine {
    fn default() -> Self { Self::new(Weighting::default()) }
}

impl Engine {
    pub fn new(weighting: Weighting) -> Self {
        Self { weighting, current: RwLock::new(None), build_lock: Mutex::new(()) }
    }

    pub fn weighting(&self) -> Weighting { self.weighting }

    /// Load `source`, index it and publish the result. On failure the
    /// previously published index, if any, stays in place.
    pub fn build<P: AsRef<Path>>(&self, source: P) -> EngineResult<IndexStats> {
        let source = source.as_ref();
        let _guard = self.build_lock.lock();
        tracing::info!(source = %source.display(), "building index");
        match CorpusIndex::from_source(source, self.weighting) {
            Ok(index) => Ok(self.install(index)),
            Err(e) => {
                tracing::error!(source = %source.display(), error = %e, "index build failed");
                Err(e)
            }
        }
    }

    /// Index in-memory records and publish the result.
    pub fn build_from_records(&self, records: Vec<MovieRecord>) -> EngineResult<IndexStats> {
        let _guard = self.build_lock.lock();
        let index = CorpusIndex::build(records, self.weighting)?;
        Ok(self.install(index))
    }

    /// Publish an index built elsewhere.
    pub fn publish(&self, index: CorpusIndex) -> IndexStats {
        let _guard = self.build_lock.lock();
        self.install(index)
    }

    fn install(&self, index: CorpusIndex) -> IndexStats {
        let stats = index.stats();
        *self.current.write() = Some(Arc::new(index));
        tracing::info!(num_docs = stats.num_docs, num_terms = stats.num_terms, "index published");
        stats
    }

    /// The currently published index.
    pub fn snapshot(&self) -> Option<Arc<CorpusIndex>> { self.current.read().clone() }

    pub fn is_initialized(&self) -> bool { self.current.read().is_some() }

    pub fn stats(&self) -> EngineResult<IndexStats> {
        self.snapshot().map(|index| index.stats()).ok_or(EngineError::EngineNotInitialized)
    }

    /// Top `k` documents for `query`, each with its cosine score.
    pub fn recommend(&self, query: &str, k: usize) -> EngineResult<Vec<Recommendation>> {
        let index = self.snapshot().ok_or(EngineError::EngineNotInitialized)?;
        let results = index.recommend(query, k);
        tracing::debug!(k, hits = results.len(), "recommend");
        Ok(results)
    }
}

/// Boundary used by a presentation layer: initialize once from a fixed
/// corpus path, then ask for the top-N movies for a storyline.
pub struct Recommender {
    engine: Engine,
    source: PathBuf,
    top_n: usize,
}

impl Recommender {
    pub fn new(source: impl Into<PathBuf>, top_n: usize) -> Self {
        Self::with_engine(Engine::default(), source, top_n)
    }

    pub fn with_engine(engine: Engine, source: impl Into<PathBuf>, top_n: usize) -> Self {
        Self { engine, source: source.into(), top_n }
    }

    /// Build from the configured source. `false` means the caller should warn
    /// the user; an earlier index, if any, keeps serving.
    pub fn initialize(&self) -> bool { self.engine.build(&self.source).is_ok() }

    pub fn recommend(&self, query: &str) -> EngineResult<Vec<Recommendation>> {
        self.engine.recommend(query, self.top_n)
    }

    pub fn engine(&self) -> &Engine { &self.engine }

    pub fn source(&self) -> &Path { &self.source }

    pub fn top_n(&self) -> usize { self.top_n }
}
