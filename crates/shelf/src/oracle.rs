//! Similarity oracle abstraction over the precomputed model artifact.
//!
//! The model is trained elsewhere and shipped in one of two shapes: the fitted
//! vectors of a nearest-neighbor model, or a square pairwise similarity
//! matrix. Both answer the same question for the selector (which titles sit
//! closest to this one), so the selector only ever sees [`SimilarityOracle`].

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;

use crate::error::ArtifactError;
use crate::similarity;

/// A ranked neighbor of a query, closest first
#[derive(Debug, Clone, PartialEq)]
pub struct Neighbor {
  pub title: String,
  /// Lower is closer. Pairwise similarities are reported as `1 - similarity`.
  pub distance: f32,
}

/// Which artifact shape to load
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OracleKind {
  Knn,
  Pairwise,
}

/// Lookup interface the selector uses to find similar titles
#[cfg_attr(test, mockall::automock)]
pub trait SimilarityOracle {
  /// Whether `title` is part of the similarity index
  fn contains(&self, title: &str) -> bool;

  /// The `k` nearest titles to `title`, excluding itself. None if `title` is not indexed.
  fn nearest(&self, title: &str, k: usize) -> Option<Vec<Neighbor>>;

  /// The `k` nearest titles to the blend of `titles`, excluding those titles.
  /// None if none of `titles` is indexed.
  fn nearest_to_set(&self, titles: &[String], k: usize) -> Option<Vec<Neighbor>>;
}

/// Title <-> row position mapping shared by both shapes
#[derive(Debug, Clone)]
struct TitleIndex {
  titles: Vec<String>,
  positions: HashMap<String, usize>,
}

impl TitleIndex {
  fn new(titles: Vec<String>) -> Result<Self, ArtifactError> {
    let mut positions = HashMap::with_capacity(titles.len());
    for (i, title) in titles.iter().enumerate() {
      if positions.insert(title.clone(), i).is_some() {
        return Err(ArtifactError::malformed(format!("title '{title}' is indexed twice")));
      }
    }
    Ok(Self { titles, positions })
  }

  fn position(&self, title: &str) -> Option<usize> {
    self.positions.get(title).copied()
  }

  fn positions_of(&self, titles: &[String]) -> Vec<usize> {
    let mut seen = HashSet::new();
    titles.iter().filter_map(|t| self.position(t)).filter(|p| seen.insert(*p)).collect()
  }

  fn len(&self) -> usize {
    self.titles.len()
  }

  fn neighbors(&self, ranked: Vec<(usize, f32)>) -> Vec<Neighbor> {
    ranked
      .into_iter()
      .map(|(i, distance)| Neighbor { title: self.titles[i].clone(), distance })
      .collect()
  }
}

fn ascending(a: &(usize, f32), b: &(usize, f32)) -> Ordering {
  a.1.total_cmp(&b.1).then_with(|| a.0.cmp(&b.0))
}

/// Distance function used by the nearest-neighbor model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
  #[default]
  Euclidean,
  Cosine,
}

impl Metric {
  fn distance(self, a: &[f32], b: &[f32]) -> f32 {
    match self {
      Metric::Euclidean => similarity::euclidean_distance(a, b),
      Metric::Cosine => 1.0 - similarity::cosine_similarity(a, b),
    }
  }
}

#[derive(Debug, Deserialize)]
struct KnnArtifact {
  titles: Vec<String>,
  vectors: Vec<Vec<f32>>,
  #[serde(default)]
  metric: Metric,
}

/// Brute-force nearest-neighbor model over the fitted item vectors
#[derive(Debug, Clone)]
pub struct KnnIndex {
  index: TitleIndex,
  vectors: Vec<Vec<f32>>,
  metric: Metric,
}

impl KnnIndex {
  pub fn new(titles: Vec<String>, vectors: Vec<Vec<f32>>, metric: Metric) -> Result<Self, ArtifactError> {
    if titles.len() != vectors.len() {
      return Err(ArtifactError::malformed(format!(
        "{} titles but {} vectors",
        titles.len(),
        vectors.len()
      )));
    }
    if let Some(first) = vectors.first() {
      if vectors.iter().any(|v| v.len() != first.len()) {
        return Err(ArtifactError::malformed("vectors have differing dimensions"));
      }
    }
    Ok(Self { index: TitleIndex::new(titles)?, vectors, metric })
  }

  /// Positions and distances of the `n` fitted vectors closest to `query`, ascending
  pub fn kneighbors(&self, query: &[f32], n: usize) -> Vec<(usize, f32)> {
    let mut ranked: Vec<(usize, f32)> = self
      .vectors
      .iter()
      .enumerate()
      .map(|(i, v)| (i, self.metric.distance(query, v)))
      .collect();
    ranked.sort_by(ascending);
    ranked.truncate(n);
    ranked
  }

  fn nearest_excluding(&self, query: &[f32], exclude: &[usize], k: usize) -> Vec<Neighbor> {
    let ranked = self
      .kneighbors(query, k.saturating_add(exclude.len()))
      .into_iter()
      .filter(|(i, _)| !exclude.contains(i))
      .take(k)
      .collect();
    self.index.neighbors(ranked)
  }
}

impl SimilarityOracle for KnnIndex {
  fn contains(&self, title: &str) -> bool {
    self.index.position(title).is_some()
  }

  fn nearest(&self, title: &str, k: usize) -> Option<Vec<Neighbor>> {
    let position = self.index.position(title)?;
    Some(self.nearest_excluding(&self.vectors[position], &[position], k))
  }

  fn nearest_to_set(&self, titles: &[String], k: usize) -> Option<Vec<Neighbor>> {
    let positions = self.index.positions_of(titles);
    let blended = similarity::mean_vector(positions.iter().map(|&p| self.vectors[p].as_slice()))?;
    Some(self.nearest_excluding(&blended, &positions, k))
  }
}

#[derive(Debug, Deserialize)]
struct PairwiseArtifact {
  titles: Vec<String>,
  matrix: Vec<Vec<f32>>,
}

/// Square matrix of precomputed similarities, row `i` against every title
#[derive(Debug, Clone)]
pub struct PairwiseMatrix {
  index: TitleIndex,
  matrix: Vec<Vec<f32>>,
}

impl PairwiseMatrix {
  pub fn new(titles: Vec<String>, matrix: Vec<Vec<f32>>) -> Result<Self, ArtifactError> {
    let n = titles.len();
    if matrix.len() != n || matrix.iter().any(|row| row.len() != n) {
      return Err(ArtifactError::malformed(format!("similarity matrix is not {n}x{n}")));
    }
    Ok(Self { index: TitleIndex::new(titles)?, matrix })
  }

  fn nearest_excluding(&self, row: &[f32], exclude: &[usize], k: usize) -> Vec<Neighbor> {
    let mut ranked: Vec<(usize, f32)> = row
      .iter()
      .enumerate()
      .filter(|(i, _)| !exclude.contains(i))
      .map(|(i, similarity)| (i, 1.0 - similarity))
      .collect();
    ranked.sort_by(ascending);
    ranked.truncate(k);
    self.index.neighbors(ranked)
  }
}

impl SimilarityOracle for PairwiseMatrix {
  fn contains(&self, title: &str) -> bool {
    self.index.position(title).is_some()
  }

  fn nearest(&self, title: &str, k: usize) -> Option<Vec<Neighbor>> {
    let position = self.index.position(title)?;
    Some(self.nearest_excluding(&self.matrix[position], &[position], k))
  }

  fn nearest_to_set(&self, titles: &[String], k: usize) -> Option<Vec<Neighbor>> {
    let positions = self.index.positions_of(titles);
    let blended = similarity::mean_vector(positions.iter().map(|&p| self.matrix[p].as_slice()))?;
    Some(self.nearest_excluding(&blended, &positions, k))
  }
}

/// The similarity model picked at load time
#[derive(Debug, Clone)]
pub enum Oracle {
  Knn(KnnIndex),
  Pairwise(PairwiseMatrix),
}

impl Oracle {
  /// Load the similarity artifact. With no `kind`, the shape is detected from its keys.
  pub fn load(path: &Path, kind: Option<OracleKind>) -> Result<Self, ArtifactError> {
    let content = fs::read_to_string(path).map_err(|e| ArtifactError::read(path, e))?;
    let document: serde_json::Value =
      serde_json::from_str(&content).map_err(|e| ArtifactError::parse(path, e))?;

    let kind = match kind {
      Some(kind) => kind,
      None => detect_kind(&document).ok_or_else(|| ArtifactError::unknown_shape(path))?,
    };

    let oracle = match kind {
      OracleKind::Knn => {
        let artifact: KnnArtifact =
          serde_json::from_value(document).map_err(|e| ArtifactError::parse(path, e))?;
        Oracle::Knn(KnnIndex::new(artifact.titles, artifact.vectors, artifact.metric)?)
      }
      OracleKind::Pairwise => {
        let artifact: PairwiseArtifact =
          serde_json::from_value(document).map_err(|e| ArtifactError::parse(path, e))?;
        Oracle::Pairwise(PairwiseMatrix::new(artifact.titles, artifact.matrix)?)
      }
    };

    tracing::debug!(kind = ?oracle.kind(), size = oracle.len(), "loaded similarity model");
    Ok(oracle)
  }

  pub fn kind(&self) -> OracleKind {
    match self {
      Oracle::Knn(_) => OracleKind::Knn,
      Oracle::Pairwise(_) => OracleKind::Pairwise,
    }
  }

  /// Number of indexed titles
  pub fn len(&self) -> usize {
    match self {
      Oracle::Knn(knn) => knn.index.len(),
      Oracle::Pairwise(matrix) => matrix.index.len(),
    }
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  fn inner(&self) -> &dyn SimilarityOracle {
    match self {
      Oracle::Knn(knn) => knn,
      Oracle::Pairwise(matrix) => matrix,
    }
  }
}

impl SimilarityOracle for Oracle {
  fn contains(&self, title: &str) -> bool {
    self.inner().contains(title)
  }

  fn nearest(&self, title: &str, k: usize) -> Option<Vec<Neighbor>> {
    self.inner().nearest(title, k)
  }

  fn nearest_to_set(&self, titles: &[String], k: usize) -> Option<Vec<Neighbor>> {
    self.inner().nearest_to_set(titles, k)
  }
}

fn detect_kind(document: &serde_json::Value) -> Option<OracleKind> {
  let object = document.as_object()?;
  if object.contains_key("matrix") {
    Some(OracleKind::Pairwise)
  } else if object.contains_key("vectors") {
    Some(OracleKind::Knn)
  } else {
    None
  }
}
