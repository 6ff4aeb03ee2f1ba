//! The book catalog: every title the tool may recommend, with its genre,
//! page count, and cover thumbnail.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;

use crate::error::ArtifactError;

/// One book as stored in the catalog artifact
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CatalogEntry {
  pub title: String,
  pub categories: String,
  pub num_pages: u32,
  #[serde(default)]
  pub thumbnail: Option<String>,
}

/// Page-count bucket a reader can ask for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LengthPreference {
  /// At most the short-book page limit
  Short,
  /// More than the short-book page limit
  Long,
}

impl LengthPreference {
  pub fn matches(self, num_pages: u32, short_max_pages: u32) -> bool {
    match self {
      LengthPreference::Short => num_pages <= short_max_pages,
      LengthPreference::Long => num_pages > short_max_pages,
    }
  }
}

/// Immutable, title-keyed view over the catalog artifact
#[derive(Debug, Clone)]
pub struct Catalog {
  entries: Vec<CatalogEntry>,
  by_title: HashMap<String, usize>,
}

impl Catalog {
  /// Build a catalog, normalizing thumbnails that are not http(s) URLs to `placeholder`
  pub fn new(entries: Vec<CatalogEntry>, placeholder: &str) -> Result<Self, ArtifactError> {
    let mut by_title = HashMap::with_capacity(entries.len());
    let mut normalized = Vec::with_capacity(entries.len());

    for mut entry in entries {
      if by_title.contains_key(&entry.title) {
        return Err(ArtifactError::duplicate_title(entry.title));
      }
      let has_url = entry.thumbnail.as_deref().is_some_and(|t| t.starts_with("http"));
      if !has_url {
        entry.thumbnail = Some(placeholder.to_string());
      }
      by_title.insert(entry.title.clone(), normalized.len());
      normalized.push(entry);
    }

    Ok(Self { entries: normalized, by_title })
  }

  /// Load the catalog artifact (a JSON array of entries)
  pub fn load(path: &Path, placeholder: &str) -> Result<Self, ArtifactError> {
    let content = fs::read_to_string(path).map_err(|e| ArtifactError::read(path, e))?;
    let entries: Vec<CatalogEntry> =
      serde_json::from_str(&content).map_err(|e| ArtifactError::parse(path, e))?;
    tracing::debug!(count = entries.len(), path = %path.display(), "loaded catalog");
    Self::new(entries, placeholder)
  }

  pub fn get(&self, title: &str) -> Option<&CatalogEntry> {
    self.by_title.get(title).map(|&i| &self.entries[i])
  }

  pub fn contains(&self, title: &str) -> bool {
    self.by_title.contains_key(title)
  }

  pub fn entries(&self) -> &[CatalogEntry] {
    &self.entries
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  /// Books whose category is exactly `genre`, in catalog order
  pub fn in_genre<'a>(&'a self, genre: &'a str) -> impl Iterator<Item = &'a CatalogEntry> + 'a {
    self.entries.iter().filter(move |entry| entry.categories == genre)
  }

  /// Books whose category contains `genre`, ignoring case
  pub fn matching_genre<'a>(&'a self, genre: &str) -> impl Iterator<Item = &'a CatalogEntry> + 'a {
    let needle = genre.to_lowercase();
    self.entries.iter().filter(move |entry| entry.categories.to_lowercase().contains(&needle))
  }

  /// Genres with at least `min_books` entries, most populated first
  pub fn genres(&self, min_books: usize) -> Vec<(String, usize)> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for entry in &self.entries {
      *counts.entry(entry.categories.as_str()).or_insert(0) += 1;
    }

    let mut genres: Vec<(String, usize)> = counts
      .into_iter()
      .filter(|(_, count)| *count >= min_books)
      .map(|(genre, count)| (genre.to_string(), count))
      .collect();
    genres.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    genres
  }

  /// Titles present in both the catalog and `titles`, preserving `titles` order
  pub fn retain_known<'a, I>(&self, titles: I) -> Vec<&CatalogEntry>
  where
    I: IntoIterator<Item = &'a str>,
  {
    let mut seen = HashSet::new();
    titles
      .into_iter()
      .filter(|title| seen.insert(*title))
      .filter_map(|title| self.get(title))
      .collect()
  }
}
