//! Turns raw similarity neighbors into a short list of books for one user.
//!
//! The selector narrows the oracle's neighbors by genre and page length,
//! drops anything the user disliked, promotes what they liked, and samples
//! the result. Whenever a step would leave nothing to show it widens instead,
//! ending at a random pick from the requested genre.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::Serialize;
use std::collections::HashSet;

use crate::catalog::{Catalog, CatalogEntry, LengthPreference};
use crate::config::ShelfConfig;
use crate::error::BlendError;
use crate::oracle::SimilarityOracle;
use crate::ratings::{Rating, RatingHistory};

/// A recommended book as shown to the user
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Recommendation {
  pub title: String,
  pub thumbnail: String,
}

impl From<&CatalogEntry> for Recommendation {
  fn from(entry: &CatalogEntry) -> Self {
    Self { title: entry.title.clone(), thumbnail: entry.thumbnail.clone().unwrap_or_default() }
  }
}

/// Something the user should be told about how a selection was made
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Notice {
  /// Nothing similar survived filtering; the books are a random genre pick
  PersonalizationUnavailable,
}

impl Notice {
  pub fn message(self) -> &'static str {
    match self {
      Notice::PersonalizationUnavailable => {
        "No more personalized recommendations! Showing random books from the same genre."
      }
    }
  }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Selection {
  pub books: Vec<Recommendation>,
  pub notice: Option<Notice>,
}

impl Selection {
  pub fn is_empty(&self) -> bool {
    self.books.is_empty()
  }
}

/// Inputs for a single recommendation request
#[derive(Debug, Clone)]
pub struct SelectRequest<'a> {
  pub seed_book: &'a str,
  pub user_id: &'a str,
  pub genre: &'a str,
  pub length: Option<LengthPreference>,
  /// Fixes the sampling for this call; a fresh OS seed is drawn when unset
  pub rng_seed: Option<u64>,
}

impl SelectRequest<'_> {
  fn rng(&self) -> StdRng {
    match self.rng_seed {
      Some(seed) => StdRng::seed_from_u64(seed),
      None => StdRng::from_os_rng(),
    }
  }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SelectorSettings {
  pub neighbor_count: usize,
  pub max_results: usize,
  pub short_book_max_pages: u32,
  pub dislike_threshold: u8,
  pub like_threshold: u8,
}

impl Default for SelectorSettings {
  fn default() -> Self {
    Self::from(&ShelfConfig::default())
  }
}

impl From<&ShelfConfig> for SelectorSettings {
  fn from(config: &ShelfConfig) -> Self {
    Self {
      neighbor_count: config.neighbor_count,
      max_results: config.max_results,
      short_book_max_pages: config.short_book_max_pages,
      dislike_threshold: config.dislike_threshold,
      like_threshold: config.like_threshold,
    }
  }
}

pub struct Selector<'a> {
  catalog: &'a Catalog,
  oracle: &'a dyn SimilarityOracle,
  ratings: &'a dyn RatingHistory,
  settings: SelectorSettings,
}

impl<'a> Selector<'a> {
  pub fn new(
    catalog: &'a Catalog,
    oracle: &'a dyn SimilarityOracle,
    ratings: &'a dyn RatingHistory,
    settings: SelectorSettings,
  ) -> Self {
    Self { catalog, oracle, ratings, settings }
  }

  /// Recommend up to `max_results` books similar to the request's seed book.
  ///
  /// A seed the similarity model does not know yields an empty selection.
  /// With rating history the output is a random sample, so only its membership
  /// is stable across calls unless the request fixes `rng_seed`.
  pub fn select(&self, request: &SelectRequest) -> Selection {
    let Some(neighbors) = self.oracle.nearest(request.seed_book, self.settings.neighbor_count) else {
      tracing::debug!(seed = request.seed_book, "seed book is not in the similarity index");
      return Selection::default();
    };

    let mut rng = request.rng();
    let candidates = self.catalog.retain_known(neighbors.iter().map(|n| n.title.as_str()));
    let narrowed = self.narrow(candidates, request.genre, request.length);

    let history = self.ratings.history(request.user_id);
    let disliked: HashSet<&str> = history
      .iter()
      .filter(|r| r.rating <= self.settings.dislike_threshold)
      .map(|r| r.book_title.as_str())
      .collect();

    let pool = if history.is_empty() {
      narrowed.into_iter().take(self.settings.max_results).collect()
    } else {
      self.personalize(narrowed, request.seed_book, &history, &disliked, &mut rng)
    };

    if !pool.is_empty() {
      return Selection { books: pool.into_iter().map(Recommendation::from).collect(), notice: None };
    }

    tracing::debug!(genre = request.genre, "no personalized candidates left, sampling the genre");
    let mut genre_pool: Vec<&CatalogEntry> = self
      .catalog
      .in_genre(request.genre)
      .filter(|entry| !disliked.contains(entry.title.as_str()))
      .collect();
    genre_pool.shuffle(&mut rng);
    genre_pool.truncate(self.settings.max_results);

    Selection {
      books: genre_pool.into_iter().map(Recommendation::from).collect(),
      notice: Some(Notice::PersonalizationUnavailable),
    }
  }

  /// Genre and length narrowing with its two widening steps
  fn narrow<'c>(
    &self,
    candidates: Vec<&'c CatalogEntry>,
    genre: &str,
    length: Option<LengthPreference>,
  ) -> Vec<&'c CatalogEntry> {
    let in_genre: Vec<&CatalogEntry> =
      candidates.iter().copied().filter(|entry| entry.categories == genre).collect();

    if let Some(length) = length {
      let sized: Vec<&CatalogEntry> = in_genre
        .iter()
        .copied()
        .filter(|entry| length.matches(entry.num_pages, self.settings.short_book_max_pages))
        .collect();
      if !sized.is_empty() {
        return sized;
      }
    }

    if !in_genre.is_empty() {
      return in_genre;
    }

    // A genre the catalog has never heard of cannot be sampled later, so keep everything.
    if self.catalog.in_genre(genre).next().is_none() {
      return candidates;
    }

    Vec::new()
  }

  /// Drop disliked titles, union in liked ones other than the seed, dedupe, then sample
  fn personalize<'c>(
    &'c self,
    narrowed: Vec<&'c CatalogEntry>,
    seed_book: &str,
    history: &[Rating],
    disliked: &HashSet<&str>,
    rng: &mut StdRng,
  ) -> Vec<&'c CatalogEntry> {
    let liked = self.catalog.retain_known(
      history
        .iter()
        .filter(|r| r.rating >= self.settings.like_threshold && r.book_title != seed_book)
        .map(|r| r.book_title.as_str()),
    );

    let mut seen = HashSet::new();
    let mut pool: Vec<&CatalogEntry> = liked
      .into_iter()
      .chain(narrowed.into_iter().filter(|entry| !disliked.contains(entry.title.as_str())))
      .filter(|entry| seen.insert(entry.title.as_str()))
      .collect();

    pool.shuffle(rng);
    pool.truncate(self.settings.max_results);
    pool
  }

  /// Recommend books close to a blend of several liked titles, restricted to a genre.
  ///
  /// Results keep the similarity ranking. The genre match is a case-insensitive
  /// substring test against each book's categories.
  pub fn select_for_liked(&self, liked: &[String], genre: &str) -> Result<Vec<Recommendation>, BlendError> {
    if self.catalog.matching_genre(genre).next().is_none() {
      return Err(BlendError::unknown_genre(genre));
    }

    let neighbors = self
      .oracle
      .nearest_to_set(liked, self.settings.max_results)
      .ok_or(BlendError::NoLikedBooksIndexed)?;

    let needle = genre.to_lowercase();
    Ok(
      self
        .catalog
        .retain_known(neighbors.iter().map(|n| n.title.as_str()))
        .into_iter()
        .filter(|entry| entry.categories.to_lowercase().contains(&needle))
        .map(Recommendation::from)
        .collect(),
    )
  }
}
