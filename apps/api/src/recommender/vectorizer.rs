//! Vector Space Builder — TF-IDF over unigrams and bigrams.
//!
//! `fit` learns a vocabulary and IDF weights from the composed job corpus and
//! returns a [`CorpusMatrix`]: the fitted model plus one L2-normalized sparse
//! row per job. `CorpusMatrix::transform` projects new text into that space
//! without touching the learned state.
//!
//! Weighting:
//! - tf  = 1 + ln(count)            (sublinear)
//! - idf = ln((1 + n) / (1 + df)) + 1 (smoothed)
//! - a term is kept when `min_df ≤ df ≤ max_df · n`, then the `max_features`
//!   most frequent (corpus-wide count) terms survive
//! - feature indices follow lexicographic term order

use std::collections::{BTreeMap, HashMap, HashSet};

use once_cell::sync::Lazy;
use regex::Regex;
use uuid::Uuid;

use crate::recommender::features::ComposedJob;
use crate::recommender::RecommendError;

/// Two or more word characters, matching the classic TF-IDF token pattern.
static TOKEN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b\w\w+\b").expect("valid regex"));

#[derive(Debug, Clone, PartialEq)]
pub struct VectorizerConfig {
    /// Upper bound on vocabulary size. `None` keeps every surviving term.
    pub max_features: Option<usize>,
    /// Minimum number of documents a term must appear in.
    pub min_df: usize,
    /// Maximum share of documents a term may appear in, in (0, 1].
    pub max_df: f64,
    /// Inclusive n-gram range.
    pub ngram_range: (usize, usize),
    pub sublinear_tf: bool,
}

impl Default for VectorizerConfig {
    fn default() -> Self {
        Self {
            max_features: Some(10_000),
            min_df: 1,
            max_df: 0.85,
            ngram_range: (1, 2),
            sublinear_tf: true,
        }
    }
}

impl VectorizerConfig {
    pub fn validate(&self) -> Result<(), RecommendError> {
        if !(self.max_df > 0.0 && self.max_df <= 1.0) {
            return Err(RecommendError::InvalidConfig(format!(
                "max_df must be in (0, 1], got {}",
                self.max_df
            )));
        }
        let (lo, hi) = self.ngram_range;
        if lo == 0 || lo > hi {
            return Err(RecommendError::InvalidConfig(format!(
                "invalid ngram_range ({lo}, {hi})"
            )));
        }
        if self.max_features == Some(0) {
            return Err(RecommendError::InvalidConfig(
                "max_features must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Sparse vector: `(feature index, weight)` pairs sorted by index.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SparseVector {
    entries: Vec<(usize, f64)>,
}

impl SparseVector {
    fn from_unsorted(mut entries: Vec<(usize, f64)>) -> Self {
        entries.sort_unstable_by_key(|(idx, _)| *idx);
        Self { entries }
    }

    pub fn norm(&self) -> f64 {
        self.entries.iter().map(|(_, w)| w * w).sum::<f64>().sqrt()
    }

    fn l2_normalize(&mut self) {
        let norm = self.norm();
        if norm > 0.0 {
            for (_, w) in &mut self.entries {
                *w /= norm;
            }
        }
    }

    /// Dot product by merge-join over the sorted indices. For unit vectors
    /// this is the cosine similarity.
    pub fn dot(&self, other: &SparseVector) -> f64 {
        let (mut i, mut j) = (0, 0);
        let mut sum = 0.0;
        while i < self.entries.len() && j < other.entries.len() {
            let (a_idx, a_w) = self.entries[i];
            let (b_idx, b_w) = other.entries[j];
            match a_idx.cmp(&b_idx) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => {
                    sum += a_w * b_w;
                    i += 1;
                    j += 1;
                }
            }
        }
        sum
    }
}

/// A fitted term-weighting model plus the corpus rows it was fitted on.
///
/// Built fresh per request by [`fit`]; never mutated afterwards. Row `i`
/// belongs to `job_ids[i]`, in the order the corpus was supplied.
#[derive(Debug, Clone)]
pub struct CorpusMatrix {
    vocabulary: HashMap<String, usize>,
    idf: Vec<f64>,
    rows: Vec<SparseVector>,
    job_ids: Vec<Uuid>,
    row_by_job: HashMap<Uuid, usize>,
    ngram_range: (usize, usize),
    sublinear_tf: bool,
}

impl CorpusMatrix {
    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn vocabulary_size(&self) -> usize {
        self.vocabulary.len()
    }

    pub fn rows(&self) -> &[SparseVector] {
        &self.rows
    }

    pub fn job_ids(&self) -> &[Uuid] {
        &self.job_ids
    }

    /// Row index for a job. The first occurrence wins if an id was supplied twice.
    pub fn row_of(&self, job_id: Uuid) -> Option<usize> {
        self.row_by_job.get(&job_id).copied()
    }

    pub fn row(&self, idx: usize) -> Option<&SparseVector> {
        self.rows.get(idx)
    }

    /// Projects text into the fitted space. Terms outside the learned
    /// vocabulary are ignored; the result is L2-normalized unless it is zero.
    pub fn transform(&self, text: &str) -> SparseVector {
        let terms = analyze(text, self.ngram_range);
        let mut counts: HashMap<usize, u32> = HashMap::new();
        for term in &terms {
            if let Some(&idx) = self.vocabulary.get(term) {
                *counts.entry(idx).or_insert(0) += 1;
            }
        }
        self.weigh(counts)
    }

    fn weigh(&self, counts: HashMap<usize, u32>) -> SparseVector {
        let entries = counts
            .into_iter()
            .map(|(idx, count)| (idx, term_frequency(count, self.sublinear_tf) * self.idf[idx]))
            .collect();
        let mut vector = SparseVector::from_unsorted(entries);
        vector.l2_normalize();
        vector
    }
}

/// Free-function form of [`CorpusMatrix::transform`].
pub fn transform(text: &str, model: &CorpusMatrix) -> SparseVector {
    model.transform(text)
}

/// Fits the model on the composed corpus.
///
/// Fails with `EmptyCorpus` for zero documents and with `EmptyVocabulary` when
/// document-frequency pruning leaves no terms (for example a single-document
/// corpus under `max_df < 1`).
pub fn fit(corpus: &[ComposedJob], config: &VectorizerConfig) -> Result<CorpusMatrix, RecommendError> {
    config.validate()?;
    if corpus.is_empty() {
        return Err(RecommendError::EmptyCorpus);
    }

    let n_docs = corpus.len();
    let analyzed: Vec<Vec<String>> = corpus
        .iter()
        .map(|doc| analyze(&doc.text, config.ngram_range))
        .collect();

    // Corpus-wide counts and document frequencies, keyed in lexicographic order.
    let mut doc_freq: BTreeMap<&str, usize> = BTreeMap::new();
    let mut total_count: HashMap<&str, u64> = HashMap::new();
    for terms in &analyzed {
        let mut seen: HashSet<&str> = HashSet::new();
        for term in terms {
            *total_count.entry(term.as_str()).or_insert(0) += 1;
            if seen.insert(term.as_str()) {
                *doc_freq.entry(term.as_str()).or_insert(0) += 1;
            }
        }
    }

    if doc_freq.is_empty() {
        return Err(RecommendError::EmptyVocabulary);
    }

    let max_doc_count = config.max_df * n_docs as f64;
    let mut kept: Vec<&str> = doc_freq
        .iter()
        .filter(|(_, &df)| df >= config.min_df && (df as f64) <= max_doc_count)
        .map(|(term, _)| *term)
        .collect();

    if let Some(limit) = config.max_features {
        if kept.len() > limit {
            // Most frequent first; ties keep lexicographic order (stable sort).
            kept.sort_by(|a, b| total_count[b].cmp(&total_count[a]));
            kept.truncate(limit);
            kept.sort_unstable();
        }
    }

    if kept.is_empty() {
        return Err(RecommendError::EmptyVocabulary);
    }

    let vocabulary: HashMap<String, usize> = kept
        .iter()
        .enumerate()
        .map(|(idx, term)| (term.to_string(), idx))
        .collect();
    let idf: Vec<f64> = kept
        .iter()
        .map(|term| smoothed_idf(n_docs, doc_freq[term]))
        .collect();

    let mut job_ids = Vec::with_capacity(n_docs);
    let mut row_by_job = HashMap::with_capacity(n_docs);
    for (row, doc) in corpus.iter().enumerate() {
        job_ids.push(doc.job_id);
        row_by_job.entry(doc.job_id).or_insert(row);
    }

    let mut matrix = CorpusMatrix {
        vocabulary,
        idf,
        rows: Vec::new(),
        job_ids,
        row_by_job,
        ngram_range: config.ngram_range,
        sublinear_tf: config.sublinear_tf,
    };

    let rows: Vec<SparseVector> = analyzed
        .iter()
        .map(|terms| {
            let mut counts: HashMap<usize, u32> = HashMap::new();
            for term in terms {
                if let Some(&idx) = matrix.vocabulary.get(term) {
                    *counts.entry(idx).or_insert(0) += 1;
                }
            }
            matrix.weigh(counts)
        })
        .collect();
    matrix.rows = rows;

    Ok(matrix)
}

/// Tokenizes and expands text into the configured n-grams, in document order.
fn analyze(text: &str, (min_n, max_n): (usize, usize)) -> Vec<String> {
    let lowered = text.to_lowercase();
    let tokens: Vec<&str> = TOKEN_RE.find_iter(&lowered).map(|m| m.as_str()).collect();

    let mut terms = Vec::new();
    for n in min_n..=max_n {
        if n > tokens.len() {
            break;
        }
        for window in tokens.windows(n) {
            terms.push(window.join(" "));
        }
    }
    terms
}

fn term_frequency(count: u32, sublinear: bool) -> f64 {
    if sublinear {
        1.0 + (count as f64).ln()
    } else {
        count as f64
    }
}

fn smoothed_idf(n_docs: usize, df: usize) -> f64 {
    ((1.0 + n_docs as f64) / (1.0 + df as f64)).ln() + 1.0
}

#[cfg(test)]
impl SparseVector {
    pub fn entries(&self) -> &[(usize, f64)] {
        &self.entries
    }

    pub fn is_zero(&self) -> bool {
        self.entries.iter().all(|(_, w)| *w == 0.0)
    }
}

#[cfg(test)]
impl CorpusMatrix {
    pub fn feature_index(&self, term: &str) -> Option<usize> {
        self.vocabulary.get(term).copied()
    }

    pub fn idf(&self, term: &str) -> Option<f64> {
        self.feature_index(term).map(|idx| self.idf[idx])
    }
}
